//! # In-Memory Document Store
//!
//! A host store that keeps everything in memory. It is what the CLI loads
//! JSON documents into, and what the tests reconcile against.
//!
//! The store always knows its text and keeps offsets in its own native unit
//! system (code units unless configured otherwise). Snapshots loaded into it
//! are converted on the way in.
//!
//! ```text
//! Snapshot ──from_snapshot──▶ MemoryDocument ──Reconciler──▶ MemoryDocument
//!                                   │
//!                                   └──to_snapshot──▶ Snapshot
//! ```

use crate::snapshot::SnapshotBuilder;
use crate::store::DocumentStore;
use bdoc_common::{BdocError, BdocResult, OffsetType};
use bdoc_document::{AnnotationSet, Document, FeatureMap};
use std::collections::BTreeMap;

/// Mutable annotated document held in memory.
///
/// Cloning is cheap enough to checkpoint before an apply and restore on
/// failure.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDocument {
    text: String,
    features: FeatureMap,
    sets: BTreeMap<String, AnnotationSet>,
    offset_type: OffsetType,
}

impl MemoryDocument {
    /// Create an empty document over the given text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            features: FeatureMap::new(),
            sets: BTreeMap::new(),
            offset_type: OffsetType::CodeUnit,
        }
    }

    /// Use a different native unit system. Only valid before annotations
    /// are added.
    pub fn with_offset_type(mut self, offset_type: OffsetType) -> Self {
        self.offset_type = offset_type;
        self
    }

    /// Build a store from a snapshot, converting its offsets to code units
    pub fn from_snapshot(snapshot: Document) -> BdocResult<Self> {
        Self::from_snapshot_as(snapshot, OffsetType::CodeUnit)
    }

    /// Build a store from a snapshot with the given native unit system.
    /// Annotations that arrive without an id get fresh ones here.
    pub fn from_snapshot_as(mut snapshot: Document, offset_type: OffsetType) -> BdocResult<Self> {
        if snapshot.text.is_none() {
            return Err(BdocError::precondition(
                "a document store needs the snapshot text",
            ));
        }
        snapshot.normalize();
        snapshot.fixup(offset_type)?;

        let mut sets = snapshot.annotation_sets.unwrap_or_default();
        for set in sets.values_mut() {
            set.assign_missing_ids();
        }

        Ok(Self {
            text: snapshot.text.unwrap_or_default(),
            features: snapshot.features.unwrap_or_default(),
            sets,
            offset_type,
        })
    }

    /// Full snapshot in the store's native unit system
    pub fn to_snapshot(&self) -> BdocResult<Document> {
        SnapshotBuilder::from_store(self)
            .with_offset_type(self.offset_type)
            .build()
    }

    /// Snapshot in the requested unit system
    pub fn to_snapshot_as(&self, offset_type: OffsetType) -> BdocResult<Document> {
        SnapshotBuilder::from_store(self)
            .with_offset_type(offset_type)
            .build()
    }

    /// Total annotations across all sets
    pub fn annotation_count(&self) -> usize {
        self.sets.values().map(AnnotationSet::len).sum()
    }
}

impl DocumentStore for MemoryDocument {
    type Set = AnnotationSet;

    fn text(&self) -> &str {
        &self.text
    }

    fn offset_type(&self) -> OffsetType {
        self.offset_type
    }

    fn features(&self) -> &FeatureMap {
        &self.features
    }

    fn features_mut(&mut self) -> &mut FeatureMap {
        &mut self.features
    }

    fn annotation_set(&self, name: &str) -> Option<&AnnotationSet> {
        self.sets.get(name)
    }

    fn annotation_set_mut(&mut self, name: &str) -> Option<&mut AnnotationSet> {
        self.sets.get_mut(name)
    }

    fn get_or_create_set(&mut self, name: &str) -> &mut AnnotationSet {
        self.sets
            .entry(name.to_string())
            .or_insert_with(|| AnnotationSet::new(name))
    }

    fn set_names(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }
}
