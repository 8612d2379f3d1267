//! # Bdoc Document Model
//!
//! Snapshot and change-log data structures for annotated documents.
//!
//! ```text
//! Document
//!  ├─ text            (optional)
//!  ├─ features        (optional FeatureMap)
//!  ├─ annotation_sets (optional, name → AnnotationSet)
//!  │    └─ Annotation { id, type, start, end, features }
//!  └─ offset_type     (code units "j" | code points "p")
//!
//! ChangeLog
//!  ├─ changes         (ordered Commands)
//!  └─ offset_type
//! ```
//!
//! Both types are produced by an adapter reading a host document store and
//! consumed once by the reconciler in `bdoc-editor`.

mod annotation;
mod annotation_set;
mod changelog;
mod document;
mod features;

pub use annotation::{Annotation, AnnotationId};
pub use annotation_set::AnnotationSet;
pub use changelog::{ChangeLog, ClearScope, Command, FeatureTarget, RawChange};
pub use document::Document;
pub use features::{features_from_pairs, FeatureMap, FeatureValue};

// Re-export common types for convenience
pub use bdoc_common::{BdocError, BdocResult, OffsetType};
pub use bdoc_offsets::OffsetIndex;
