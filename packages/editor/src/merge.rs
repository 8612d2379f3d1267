//! # Annotation Merge
//!
//! Adds one annotation to a target set, resolving an id collision with an
//! existing annotation according to a [`ConflictPolicy`].
//!
//! ## Policy Semantics
//!
//! When no annotation with the given id exists (or no id is given), the
//! annotation is inserted, keeping the supplied id unless the policy is
//! `AddWithNewId`. Otherwise exactly one of:
//!
//! - `ReplaceAnnotation`: remove and re-insert under the same id
//! - `ReplaceFeatures`: span and type kept, features set to exactly the new map
//! - `UpdateFeatures`: new keys added, colliding keys overwritten
//! - `AddNewFeatures`: only keys not yet present are added
//! - `Ignore`: nothing changes
//! - `AddWithNewId`: inserted as a new annotation under a fresh id

use crate::store::AnnotationStore;
use bdoc_common::BdocError;
use bdoc_document::{AnnotationId, FeatureMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// What to do when an added annotation's id already exists in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    ReplaceAnnotation,
    ReplaceFeatures,
    UpdateFeatures,
    AddNewFeatures,
    Ignore,
    #[default]
    AddWithNewId,
}

impl ConflictPolicy {
    pub const ALL: [ConflictPolicy; 6] = [
        ConflictPolicy::ReplaceAnnotation,
        ConflictPolicy::ReplaceFeatures,
        ConflictPolicy::UpdateFeatures,
        ConflictPolicy::AddNewFeatures,
        ConflictPolicy::Ignore,
        ConflictPolicy::AddWithNewId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::ReplaceAnnotation => "replace_annotation",
            ConflictPolicy::ReplaceFeatures => "replace_features",
            ConflictPolicy::UpdateFeatures => "update_features",
            ConflictPolicy::AddNewFeatures => "add_new_features",
            ConflictPolicy::Ignore => "ignore",
            ConflictPolicy::AddWithNewId => "add_with_new_id",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = BdocError;

    /// Accepts `replace_features`, `replace-features` and `REPLACE_FEATURES`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ConflictPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == normalized)
            .ok_or_else(|| BdocError::precondition(format!("unknown conflict policy '{}'", s)))
    }
}

/// Which branch a merge took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Added(AnnotationId),
    Replaced(AnnotationId),
    FeaturesReplaced(AnnotationId),
    FeaturesUpdated(AnnotationId),
    FeaturesAdded(AnnotationId),
    Ignored(AnnotationId),
}

impl MergeOutcome {
    /// Id of the annotation that was added or touched
    pub fn id(&self) -> AnnotationId {
        match *self {
            MergeOutcome::Added(id)
            | MergeOutcome::Replaced(id)
            | MergeOutcome::FeaturesReplaced(id)
            | MergeOutcome::FeaturesUpdated(id)
            | MergeOutcome::FeaturesAdded(id)
            | MergeOutcome::Ignored(id) => id,
        }
    }
}

/// Merge one annotation into `set`. Absent `features` act as an empty map.
pub fn merge_annotation<T: AnnotationStore + ?Sized>(
    set: &mut T,
    id: Option<AnnotationId>,
    start: usize,
    end: usize,
    ann_type: &str,
    features: Option<&FeatureMap>,
    policy: ConflictPolicy,
) -> MergeOutcome {
    let new_features = || features.cloned().unwrap_or_default();

    let existing = match id {
        Some(id) if set.get(id).is_some() => id,
        _ => {
            let keep_id = if policy == ConflictPolicy::AddWithNewId {
                None
            } else {
                id
            };
            let added = set.insert(keep_id, ann_type, start, end, new_features());
            debug!(id = added, ann_type, start, end, "Added annotation");
            return MergeOutcome::Added(added);
        }
    };

    let outcome = match policy {
        ConflictPolicy::AddWithNewId => {
            MergeOutcome::Added(set.insert(None, ann_type, start, end, new_features()))
        }
        ConflictPolicy::ReplaceAnnotation => {
            set.remove(existing);
            set.insert(Some(existing), ann_type, start, end, new_features());
            MergeOutcome::Replaced(existing)
        }
        ConflictPolicy::ReplaceFeatures => {
            if let Some(ann) = set.get_mut(existing) {
                ann.features = new_features();
            }
            MergeOutcome::FeaturesReplaced(existing)
        }
        ConflictPolicy::UpdateFeatures => {
            if let (Some(ann), Some(features)) = (set.get_mut(existing), features) {
                for (name, value) in features {
                    ann.features.insert(name.clone(), value.clone());
                }
            }
            MergeOutcome::FeaturesUpdated(existing)
        }
        ConflictPolicy::AddNewFeatures => {
            if let (Some(ann), Some(features)) = (set.get_mut(existing), features) {
                for (name, value) in features {
                    ann.features
                        .entry(name.clone())
                        .or_insert_with(|| value.clone());
                }
            }
            MergeOutcome::FeaturesAdded(existing)
        }
        ConflictPolicy::Ignore => MergeOutcome::Ignored(existing),
    };

    debug!(existing, %policy, outcome = ?outcome, "Resolved annotation id conflict");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdoc_document::AnnotationSet;
    use serde_json::json;

    fn features(pairs: &[(&str, serde_json::Value)]) -> FeatureMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn set_with_existing() -> AnnotationSet {
        let mut set = AnnotationSet::new("");
        set.add(
            Some(5),
            "X",
            0,
            3,
            features(&[("a", json!(1)), ("b", json!(2))]),
        );
        set
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "replace-features".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::ReplaceFeatures
        );
        assert_eq!(
            "ADD_WITH_NEW_ID".parse::<ConflictPolicy>().unwrap(),
            ConflictPolicy::AddWithNewId
        );
        assert!("merge".parse::<ConflictPolicy>().is_err());

        for policy in ConflictPolicy::ALL {
            assert_eq!(policy.to_string().parse::<ConflictPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_absent_id_keeps_supplied_id() {
        let mut set = AnnotationSet::new("");
        let outcome = merge_annotation(
            &mut set,
            Some(5),
            0,
            3,
            "X",
            None,
            ConflictPolicy::ReplaceFeatures,
        );

        assert_eq!(outcome, MergeOutcome::Added(5));
        assert_eq!(set.max_id, 5);
    }

    #[test]
    fn test_add_with_new_id_ignores_supplied_id() {
        let mut set = AnnotationSet::new("");
        let outcome = merge_annotation(
            &mut set,
            Some(5),
            0,
            3,
            "X",
            None,
            ConflictPolicy::AddWithNewId,
        );

        assert_eq!(outcome, MergeOutcome::Added(0));
        assert_eq!(set.max_id, 0);
    }

    #[test]
    fn test_add_with_new_id_never_reuses_ids() {
        let mut set = set_with_existing();
        for expected in 6..10 {
            let before = set.max_id;
            let outcome = merge_annotation(
                &mut set,
                Some(5),
                1,
                2,
                "Y",
                None,
                ConflictPolicy::AddWithNewId,
            );
            assert_eq!(outcome, MergeOutcome::Added(expected));
            assert_eq!(set.max_id, before + 1);
        }
        assert_eq!(set.len(), 5);
        assert_eq!(set.get(5).unwrap().ann_type, "X");
    }

    #[test]
    fn test_replace_annotation_keeps_id() {
        let mut set = set_with_existing();
        let new = features(&[("c", json!(3))]);
        merge_annotation(
            &mut set,
            Some(5),
            1,
            2,
            "Y",
            Some(&new),
            ConflictPolicy::ReplaceAnnotation,
        );

        let ann = set.get(5).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!((ann.start, ann.end, ann.ann_type.as_str()), (1, 2, "Y"));
        assert_eq!(ann.features, new);
    }

    #[test]
    fn test_replace_features_is_exact() {
        let mut set = set_with_existing();
        let new = features(&[("a", json!("new"))]);
        for _ in 0..2 {
            merge_annotation(
                &mut set,
                Some(5),
                9,
                9,
                "Ignored",
                Some(&new),
                ConflictPolicy::ReplaceFeatures,
            );
        }

        let ann = set.get(5).unwrap();
        assert_eq!((ann.start, ann.end, ann.ann_type.as_str()), (0, 3, "X"));
        assert_eq!(ann.features, new);
    }

    #[test]
    fn test_update_features_overwrites_collisions() {
        let mut set = set_with_existing();
        let new = features(&[("a", json!(10)), ("c", json!(30))]);
        merge_annotation(
            &mut set,
            Some(5),
            0,
            3,
            "X",
            Some(&new),
            ConflictPolicy::UpdateFeatures,
        );

        assert_eq!(
            set.get(5).unwrap().features,
            features(&[("a", json!(10)), ("b", json!(2)), ("c", json!(30))])
        );
    }

    #[test]
    fn test_add_new_features_keeps_existing_values() {
        let mut set = set_with_existing();
        let new = features(&[("a", json!(10)), ("c", json!(30))]);
        merge_annotation(
            &mut set,
            Some(5),
            0,
            3,
            "X",
            Some(&new),
            ConflictPolicy::AddNewFeatures,
        );

        assert_eq!(
            set.get(5).unwrap().features,
            features(&[("a", json!(1)), ("b", json!(2)), ("c", json!(30))])
        );
    }

    #[test]
    fn test_ignore_changes_nothing() {
        let mut set = set_with_existing();
        let before = set.clone();
        let new = features(&[("z", json!(0))]);
        let outcome = merge_annotation(
            &mut set,
            Some(5),
            1,
            2,
            "Y",
            Some(&new),
            ConflictPolicy::Ignore,
        );

        assert_eq!(outcome, MergeOutcome::Ignored(5));
        assert_eq!(set, before);
    }

    #[test]
    fn test_without_id_always_adds() {
        let mut set = set_with_existing();
        let outcome = merge_annotation(
            &mut set,
            None,
            0,
            1,
            "Z",
            None,
            ConflictPolicy::Ignore,
        );

        assert_eq!(outcome, MergeOutcome::Added(6));
        assert!(set.get(6).unwrap().features.is_empty());
    }
}
