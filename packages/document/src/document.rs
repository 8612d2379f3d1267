//! # Document Snapshot
//!
//! Plain data representation of an annotated document as exchanged with
//! other tools: text, document features, named annotation sets, and the
//! unit system the annotation offsets are expressed in.
//!
//! Optional parts stay `None` when absent. An absent feature map means
//! "nothing to merge" while an empty one is an explicit, empty value.

use crate::annotation_set::AnnotationSet;
use crate::features::FeatureMap;
use bdoc_common::{BdocError, BdocResult, OffsetType};
use bdoc_offsets::OffsetIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Snapshot of an annotated document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_sets: Option<BTreeMap<String, AnnotationSet>>,

    #[serde(default)]
    pub offset_type: OffsetType,
}

impl Document {
    /// Create a document with text and nothing else
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_offset_type(mut self, offset_type: OffsetType) -> Self {
        self.offset_type = offset_type;
        self
    }

    pub fn annotation_set(&self, name: &str) -> Option<&AnnotationSet> {
        self.annotation_sets.as_ref()?.get(name)
    }

    /// Get the named set, creating it (and the set map) if absent
    pub fn annotation_set_mut(&mut self, name: &str) -> &mut AnnotationSet {
        self.annotation_sets
            .get_or_insert_with(BTreeMap::new)
            .entry(name.to_string())
            .or_insert_with(|| AnnotationSet::new(name))
    }

    /// Number of annotations across all sets
    pub fn annotation_count(&self) -> usize {
        self.annotation_sets
            .iter()
            .flat_map(|sets| sets.values())
            .map(AnnotationSet::len)
            .sum()
    }

    /// Convert every annotation offset to `target`.
    ///
    /// Short-circuits when the document already uses `target` or carries no
    /// annotations. Otherwise the text must be known. All offsets are
    /// converted before any is written back, so a failing conversion leaves
    /// the document untouched.
    pub fn fixup(&mut self, target: OffsetType) -> BdocResult<()> {
        if self.offset_type == target {
            return Ok(());
        }
        if self.annotation_count() == 0 {
            self.offset_type = target;
            return Ok(());
        }
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| BdocError::precondition("offset fixup requires known text"))?;

        let index = OffsetIndex::build(text);
        self.fixup_with(&index, target)
    }

    /// Like [`Document::fixup`] but with a caller-provided index over the text
    pub fn fixup_with(&mut self, index: &OffsetIndex, target: OffsetType) -> BdocResult<()> {
        if self.offset_type == target {
            return Ok(());
        }
        let from = self.offset_type;

        if let Some(sets) = self.annotation_sets.as_mut() {
            let mut converted = Vec::new();
            for set in sets.values() {
                for ann in set.iter() {
                    converted.push((
                        index.convert(ann.start, from, target)?,
                        index.convert(ann.end, from, target)?,
                    ));
                }
            }

            let spans = sets.values_mut().flat_map(|set| set.annotations.iter_mut());
            for (ann, (start, end)) in spans.zip(converted) {
                ann.start = start;
                ann.end = end;
            }
        }

        debug!(from = %from, to = %target, "Fixed up document offsets");
        self.offset_type = target;
        Ok(())
    }

    /// Decode from JSON, repairing set names and `max_annid`. Annotations
    /// without an id keep `None`.
    pub fn from_json(json: &str) -> BdocResult<Self> {
        let mut doc: Document = serde_json::from_str(json)?;
        doc.normalize();
        Ok(doc)
    }

    pub fn to_json(&self) -> BdocResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> BdocResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The map key is authoritative for a set's name
    pub fn normalize(&mut self) {
        if let Some(sets) = self.annotation_sets.as_mut() {
            for (name, set) in sets.iter_mut() {
                if set.name != *name {
                    set.name = name.clone();
                }
                set.normalize();
            }
        }
    }
}
