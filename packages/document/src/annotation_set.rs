use crate::annotation::{Annotation, AnnotationId};
use crate::features::FeatureMap;
use serde::{Deserialize, Serialize};

/// Named list of annotations. The empty name is the default set.
///
/// Order carries no meaning. `max_id` only ever grows, so an id handed out
/// once is never allocated again by [`AnnotationSet::add`], even after the
/// annotation carrying it has been removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub annotations: Vec<Annotation>,

    #[serde(rename = "max_annid", default = "no_ids")]
    pub max_id: AnnotationId,
}

fn no_ids() -> AnnotationId {
    -1
}

impl AnnotationSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            max_id: no_ids(),
        }
    }

    /// Id that the next add without an explicit id will receive
    pub fn next_id(&self) -> AnnotationId {
        self.max_id + 1
    }

    /// Add an annotation, returning the id it was stored under.
    ///
    /// With `id == None` the next free id is allocated. With an explicit id
    /// any annotation already holding that id is replaced.
    pub fn add(
        &mut self,
        id: Option<AnnotationId>,
        ann_type: impl Into<String>,
        start: usize,
        end: usize,
        features: FeatureMap,
    ) -> AnnotationId {
        let id = match id {
            Some(id) => {
                self.remove(id);
                id
            }
            None => self.next_id(),
        };
        self.max_id = self.max_id.max(id);

        self.annotations.push(Annotation {
            id: Some(id),
            ann_type: ann_type.into(),
            start,
            end,
            features,
        });
        id
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == Some(id))
    }

    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == Some(id))
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    /// Remove the annotation with this id, keeping the order of the rest
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let pos = self.annotations.iter().position(|a| a.id == Some(id))?;
        Some(self.annotations.remove(pos))
    }

    pub fn clear(&mut self) {
        self.annotations.clear();
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.annotations.iter()
    }

    /// Largest id actually present, or -1
    pub fn largest_present_id(&self) -> AnnotationId {
        self.annotations
            .iter()
            .filter_map(|a| a.id)
            .max()
            .unwrap_or_else(no_ids)
    }

    /// Repair bookkeeping after decoding: raise `max_id` to cover every id
    /// present. Id-less annotations keep `None` so that a target store can
    /// allocate their ids on merge.
    pub fn normalize(&mut self) {
        self.max_id = self.max_id.max(self.largest_present_id());
    }

    /// Give id-less annotations fresh ids in list order
    pub fn assign_missing_ids(&mut self) {
        self.normalize();
        for ann in &mut self.annotations {
            if ann.id.is_none() {
                self.max_id += 1;
                ann.id = Some(self.max_id);
            }
        }
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_set_is_empty() {
        let set = AnnotationSet::new("");
        assert!(set.is_empty());
        assert_eq!(set.max_id, -1);
        assert_eq!(set.next_id(), 0);
    }

    #[test]
    fn test_add_allocates_sequential_ids() {
        let mut set = AnnotationSet::new("Tokens");
        let a = set.add(None, "Token", 0, 4, FeatureMap::new());
        let b = set.add(None, "Token", 5, 7, FeatureMap::new());

        assert_eq!((a, b), (0, 1));
        assert_eq!(set.max_id, 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_add_with_explicit_id_raises_max_id() {
        let mut set = AnnotationSet::new("");
        set.add(Some(5), "X", 0, 3, FeatureMap::new());
        assert_eq!(set.max_id, 5);

        let next = set.add(None, "X", 0, 1, FeatureMap::new());
        assert_eq!(next, 6);
    }

    #[test]
    fn test_explicit_id_replaces_existing() {
        let mut set = AnnotationSet::new("");
        set.add(Some(3), "Old", 0, 1, FeatureMap::new());
        set.add(Some(3), "New", 2, 4, FeatureMap::new());

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(3).unwrap().ann_type, "New");
    }

    #[test]
    fn test_remove_keeps_max_id() {
        let mut set = AnnotationSet::new("");
        set.add(None, "A", 0, 1, FeatureMap::new());
        set.add(None, "B", 1, 2, FeatureMap::new());

        let removed = set.remove(1).unwrap();
        assert_eq!(removed.ann_type, "B");
        assert!(set.remove(1).is_none());
        assert_eq!(set.max_id, 1);
        assert_eq!(set.next_id(), 2);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.next_id(), 2);
    }

    #[test]
    fn test_get_mut_updates_features() {
        let mut set = AnnotationSet::new("");
        let id = set.add(None, "Token", 0, 4, FeatureMap::new());
        set.get_mut(id)
            .unwrap()
            .features
            .insert("string".to_string(), json!("This"));

        assert_eq!(set.get(id).unwrap().features["string"], json!("This"));
    }

    #[test]
    fn test_normalize_keeps_missing_ids() {
        let mut set: AnnotationSet = serde_json::from_value(json!({
            "name": "",
            "annotations": [
                {"id": 4, "type": "A", "start": 0, "end": 1},
                {"type": "B", "start": 1, "end": 2}
            ]
        }))
        .unwrap();
        assert_eq!(set.max_id, -1);

        set.normalize();
        assert_eq!(set.max_id, 4);
        assert_eq!(set.annotations[1].id, None);
    }

    #[test]
    fn test_assign_missing_ids() {
        let mut set: AnnotationSet = serde_json::from_value(json!({
            "name": "",
            "annotations": [
                {"id": 4, "type": "A", "start": 0, "end": 1},
                {"type": "B", "start": 1, "end": 2}
            ],
            "max_annid": 2
        }))
        .unwrap();

        set.assign_missing_ids();
        assert_eq!(set.get(5).unwrap().ann_type, "B");
        assert_eq!(set.max_id, 5);
    }
}
