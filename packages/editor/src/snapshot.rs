//! Builds [`Document`] snapshots from a host store.
//!
//! The builder copies what the store holds, narrows it down to the selected
//! annotation sets and features, and converts offsets to the requested unit
//! system when [`SnapshotBuilder::build`] runs.

use crate::store::{AnnotationStore, DocumentStore};
use bdoc_common::{BdocError, BdocResult, OffsetType};
use bdoc_document::{AnnotationSet, Document, FeatureMap, FeatureValue};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    text: Option<String>,
    features: FeatureMap,
    sets: BTreeMap<String, AnnotationSet>,
    source_offset_type: OffsetType,
    offset_type: OffsetType,
}

impl SnapshotBuilder {
    /// Empty builder; offsets are taken to be code units
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from everything `store` holds
    pub fn from_store<S: DocumentStore + ?Sized>(store: &S) -> Self {
        let mut sets = BTreeMap::new();
        for name in store.set_names() {
            if let Some(source) = store.annotation_set(&name) {
                let mut set = AnnotationSet::new(name.clone());
                set.annotations = source.iter().cloned().collect();
                set.max_id = source.max_id();
                sets.insert(name, set);
            }
        }

        Self {
            text: Some(store.text().to_string()),
            features: store.features().clone(),
            sets,
            source_offset_type: store.offset_type(),
            offset_type: store.offset_type(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add or replace a whole annotation set
    pub fn add_set(mut self, set: AnnotationSet) -> Self {
        self.sets.insert(set.name.clone(), set);
        self
    }

    pub fn add_features(mut self, features: FeatureMap) -> Self {
        self.features.extend(features);
        self
    }

    pub fn add_feature(mut self, name: impl Into<String>, value: FeatureValue) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    /// Keep only the named sets. Every name must exist.
    pub fn annotation_set_names<I, N>(mut self, names: I) -> BdocResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut kept = BTreeMap::new();
        for name in names {
            let name = name.into();
            let set = self
                .sets
                .remove(&name)
                .ok_or_else(|| BdocError::not_found(format!("annotation set '{}'", name)))?;
            kept.insert(name, set);
        }
        self.sets = kept;
        Ok(self)
    }

    /// Keep only the named document features. Every name must exist.
    pub fn feature_names<I, N>(mut self, names: I) -> BdocResult<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let mut kept = FeatureMap::new();
        for name in names {
            let name = name.into();
            let value = self
                .features
                .remove(&name)
                .ok_or_else(|| BdocError::not_found(format!("feature '{}'", name)))?;
            kept.insert(name, value);
        }
        self.features = kept;
        Ok(self)
    }

    pub fn code_units(self) -> Self {
        self.with_offset_type(OffsetType::CodeUnit)
    }

    pub fn code_points(self) -> Self {
        self.with_offset_type(OffsetType::CodePoint)
    }

    pub fn with_offset_type(mut self, offset_type: OffsetType) -> Self {
        self.offset_type = offset_type;
        self
    }

    /// Assemble the snapshot. Empty feature maps and set collections are
    /// left out. Each set keeps its `max_annid`, raised to cover every id
    /// it holds, so ids freed by removals are not handed out again.
    pub fn build(self) -> BdocResult<Document> {
        let mut sets = self.sets;
        for set in sets.values_mut() {
            set.normalize();
        }

        let mut doc = Document {
            text: self.text,
            features: (!self.features.is_empty()).then_some(self.features),
            annotation_sets: (!sets.is_empty()).then_some(sets),
            offset_type: self.source_offset_type,
        };
        doc.fixup(self.offset_type)?;

        debug!(
            sets = doc.annotation_sets.as_ref().map_or(0, BTreeMap::len),
            annotations = doc.annotation_count(),
            offset_type = %doc.offset_type,
            "Built snapshot"
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use serde_json::json;

    const SAMPLE: &str = "This is a simple 💩 document. It has two sentences.";

    fn sample_store() -> MemoryDocument {
        let mut doc = MemoryDocument::new(SAMPLE);
        doc.features_mut().insert("lang".to_string(), json!("en"));
        doc.features_mut().insert("source".to_string(), json!("web"));

        let tokens = doc.get_or_create_set("");
        tokens.add(None, "Token", 0, 4, FeatureMap::new());
        tokens.add(None, "Token", 6, 8, FeatureMap::new());
        tokens.add(None, "Token", 17, 19, FeatureMap::new());

        doc.get_or_create_set("Sentences")
            .add(None, "Sentence", 0, 29, FeatureMap::new());
        doc
    }

    #[test]
    fn test_build_everything() {
        let snapshot = SnapshotBuilder::from_store(&sample_store()).build().unwrap();

        assert_eq!(snapshot.text.as_deref(), Some(SAMPLE));
        assert_eq!(snapshot.features.as_ref().unwrap().len(), 2);
        assert_eq!(snapshot.annotation_count(), 4);
        assert_eq!(snapshot.annotation_set("").unwrap().max_id, 2);
        assert_eq!(snapshot.offset_type, OffsetType::CodeUnit);
    }

    #[test]
    fn test_build_in_code_points() {
        let snapshot = SnapshotBuilder::from_store(&sample_store())
            .code_points()
            .build()
            .unwrap();

        let emoji = snapshot.annotation_set("").unwrap().get(2).unwrap();
        assert_eq!((emoji.start, emoji.end), (17, 18));
        assert_eq!(snapshot.offset_type, OffsetType::CodePoint);
    }

    #[test]
    fn test_select_sets_and_features() {
        let snapshot = SnapshotBuilder::from_store(&sample_store())
            .annotation_set_names(["Sentences"])
            .unwrap()
            .feature_names(["lang"])
            .unwrap()
            .build()
            .unwrap();

        let sets = snapshot.annotation_sets.as_ref().unwrap();
        assert_eq!(sets.keys().collect::<Vec<_>>(), vec!["Sentences"]);
        assert_eq!(snapshot.features.unwrap().keys().collect::<Vec<_>>(), vec!["lang"]);
    }

    #[test]
    fn test_unknown_selection_fails() {
        let err = SnapshotBuilder::from_store(&sample_store())
            .annotation_set_names(["Missing"])
            .unwrap_err();
        assert!(matches!(err, BdocError::NotFound(_)));

        let err = SnapshotBuilder::from_store(&sample_store())
            .feature_names(["missing"])
            .unwrap_err();
        assert!(matches!(err, BdocError::NotFound(_)));
    }

    #[test]
    fn test_max_id_raised_to_present_ids() {
        let mut set = AnnotationSet::new("decoded");
        set.annotations.push(bdoc_document::Annotation::new("X", 0, 1).with_id(4));

        let snapshot = SnapshotBuilder::new()
            .text("abc")
            .add_set(set)
            .build()
            .unwrap();

        assert_eq!(snapshot.annotation_set("decoded").unwrap().max_id, 4);
    }

    #[test]
    fn test_empty_parts_are_absent() {
        let snapshot = SnapshotBuilder::new().text("plain").build().unwrap();
        assert!(snapshot.features.is_none());
        assert!(snapshot.annotation_sets.is_none());

        let json = snapshot.to_json().unwrap();
        assert!(!json.contains("features"));
        assert!(!json.contains("annotation_sets"));
    }

    #[test]
    fn test_max_id_survives_removal() {
        let mut set = AnnotationSet::new("manual");
        set.add(Some(7), "X", 0, 1, FeatureMap::new());
        set.add(Some(9), "X", 1, 2, FeatureMap::new());
        set.remove(9);

        let snapshot = SnapshotBuilder::new()
            .text("abc")
            .add_set(set)
            .add_feature("k", json!(1))
            .build()
            .unwrap();

        assert_eq!(snapshot.annotation_set("manual").unwrap().max_id, 9);
        assert_eq!(snapshot.features.unwrap()["k"], json!(1));
    }
}
