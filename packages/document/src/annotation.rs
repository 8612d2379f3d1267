use crate::features::FeatureMap;
use serde::{Deserialize, Serialize};

/// Annotation identifier, unique within its owning set
pub type AnnotationId = i64;

/// A typed, feature-bearing span over the document text.
///
/// `end` is exclusive. Offsets are in the unit system of the owning
/// document or change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// `None` means "assign the next free id" when the annotation is added
    #[serde(default)]
    pub id: Option<AnnotationId>,

    #[serde(rename = "type")]
    pub ann_type: String,

    pub start: usize,
    pub end: usize,

    #[serde(default)]
    pub features: FeatureMap,
}

impl Annotation {
    pub fn new(ann_type: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            id: None,
            ann_type: ann_type.into(),
            start,
            end,
            features: FeatureMap::new(),
        }
    }

    pub fn with_id(mut self, id: AnnotationId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_features(mut self, features: FeatureMap) -> Self {
        self.features = features;
        self
    }

    /// Span length in the annotation's unit system
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
