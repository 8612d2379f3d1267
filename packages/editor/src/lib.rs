//! # Bdoc Editor
//!
//! Reconciliation engine that brings a mutable annotated-document store up
//! to date from snapshots and change logs.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ document: Document / ChangeLog wire model   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Reconciler                          │
//! │  - Snapshot application with selections     │
//! │  - Change log replay, command by command    │
//! │  - Id conflicts resolved by ConflictPolicy  │
//! │  - Offsets converted to the store's units   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ store: host DocumentStore (MemoryDocument)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The host owns the state**: the reconciler only mutates a store it
//!    is lent for the duration of one call
//! 2. **Text is fixed**: snapshots and logs never alter the target text
//! 3. **Fail fast**: the first failing command ends the call; earlier
//!    effects stay applied
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bdoc_editor::{ChangeLog, ConflictPolicy, MemoryDocument, Reconciler};
//!
//! let mut target = MemoryDocument::new("This is a simple 💩 document.");
//! let log = ChangeLog::from_json(&std::fs::read_to_string("changes.json")?)?;
//!
//! Reconciler::new()
//!     .conflict_policy(ConflictPolicy::UpdateFeatures)
//!     .apply_changelog(&mut target, &log)?;
//!
//! let snapshot = target.to_snapshot()?;
//! ```

mod document;
mod merge;
mod reconciler;
mod snapshot;
mod store;

pub use document::MemoryDocument;
pub use merge::{merge_annotation, ConflictPolicy, MergeOutcome};
pub use reconciler::{ReconcileOptions, ReconcileStats, Reconciler, Selection};
pub use snapshot::SnapshotBuilder;
pub use store::{AnnotationStore, DocumentStore};

// Re-export the data model for convenience
pub use bdoc_common::{BdocError, BdocResult, OffsetType};
pub use bdoc_document::{
    Annotation, AnnotationId, AnnotationSet, ChangeLog, ClearScope, Command, Document,
    FeatureMap, FeatureTarget, FeatureValue,
};
