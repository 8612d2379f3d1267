//! # Target Store Interface
//!
//! The reconciler never owns document state. It mutates a host store
//! through these two traits, so any annotated-document implementation can
//! be brought up to date from a snapshot or a change log.

use bdoc_common::OffsetType;
use bdoc_document::{Annotation, AnnotationId, AnnotationSet, FeatureMap};

/// One named annotation set inside a host store
pub trait AnnotationStore {
    fn get(&self, id: AnnotationId) -> Option<&Annotation>;

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation>;

    /// Insert an annotation and return its id.
    ///
    /// `None` allocates the next free id; `Some` stores under the given id,
    /// which the caller guarantees is not currently in use.
    fn insert(
        &mut self,
        id: Option<AnnotationId>,
        ann_type: &str,
        start: usize,
        end: usize,
        features: FeatureMap,
    ) -> AnnotationId;

    fn remove(&mut self, id: AnnotationId) -> Option<Annotation>;

    fn clear(&mut self);

    fn iter(&self) -> Box<dyn Iterator<Item = &Annotation> + '_>;

    /// Largest id ever allocated in this set, or -1
    fn max_id(&self) -> AnnotationId;
}

/// A mutable annotated document owned by the host
pub trait DocumentStore {
    type Set: AnnotationStore;

    fn text(&self) -> &str;

    /// Unit system the store's own offsets use
    fn offset_type(&self) -> OffsetType {
        OffsetType::CodeUnit
    }

    fn features(&self) -> &FeatureMap;

    fn features_mut(&mut self) -> &mut FeatureMap;

    fn annotation_set(&self, name: &str) -> Option<&Self::Set>;

    /// Existing set only; never creates
    fn annotation_set_mut(&mut self, name: &str) -> Option<&mut Self::Set>;

    fn get_or_create_set(&mut self, name: &str) -> &mut Self::Set;

    fn set_names(&self) -> Vec<String>;
}

impl AnnotationStore for AnnotationSet {
    fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        AnnotationSet::get(self, id)
    }

    fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        AnnotationSet::get_mut(self, id)
    }

    fn insert(
        &mut self,
        id: Option<AnnotationId>,
        ann_type: &str,
        start: usize,
        end: usize,
        features: FeatureMap,
    ) -> AnnotationId {
        self.add(id, ann_type, start, end, features)
    }

    fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        AnnotationSet::remove(self, id)
    }

    fn clear(&mut self) {
        AnnotationSet::clear(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &Annotation> + '_> {
        Box::new(AnnotationSet::iter(self))
    }

    fn max_id(&self) -> AnnotationId {
        self.max_id
    }
}
