//! # Reconciler
//!
//! Brings a host [`DocumentStore`] up to date from a [`Document`] snapshot
//! or a [`ChangeLog`].
//!
//! ```text
//! Snapshot ──┐
//!            ├──▶ Reconciler ──▶ merge_annotation / feature edits ──▶ DocumentStore
//! ChangeLog ─┘        │
//!                     └── Pass (lazy OffsetIndex over the target text)
//! ```
//!
//! Incoming offsets are expressed in the snapshot's or log's unit system and
//! converted to the store's own. The conversion index is built at most once
//! per apply call, and only when the unit systems actually differ.
//!
//! Failures stop the apply call immediately. Effects of commands that ran
//! before the failing one stay applied; callers needing atomicity clone the
//! store first and restore it on error.

use crate::merge::{merge_annotation, ConflictPolicy, MergeOutcome};
use crate::store::{AnnotationStore, DocumentStore};
use bdoc_common::{BdocError, BdocResult, OffsetType};
use bdoc_document::{AnnotationId, ChangeLog, ClearScope, Command, Document, FeatureTarget};
use bdoc_offsets::{text_len, OffsetIndex};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// Either every name, or an explicit subset
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn none() -> Self {
        Selection::Only(BTreeSet::new())
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(names) => names.contains(name),
        }
    }

    /// Add a name; a no-op when everything is already selected
    pub fn insert(&mut self, name: impl Into<String>) {
        if let Selection::Only(names) = self {
            names.insert(name.into());
        }
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Selection::Only(iter.into_iter().map(Into::into).collect())
    }
}

/// What a snapshot application copies and how id collisions resolve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOptions {
    pub annotation_sets: Selection,
    pub features: Selection,
    pub conflict_policy: ConflictPolicy,
}

/// Counts reported after an apply call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub features_set: usize,
    pub annotations_added: usize,
    pub annotations_merged: usize,
    pub commands_applied: usize,
}

impl ReconcileStats {
    fn record(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::Added(_) => self.annotations_added += 1,
            _ => self.annotations_merged += 1,
        }
    }
}

/// Applies snapshots and change logs to a host store
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    /// Everything included, `AddWithNewId` on collisions
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// Copy no annotation sets, unless later selected by name
    pub fn no_annotation_sets(mut self) -> Self {
        self.options.annotation_sets = Selection::none();
        self
    }

    /// Restrict snapshot application to the named sets. The first call
    /// narrows "all" to just this set.
    pub fn use_annotation_set(mut self, name: impl Into<String>) -> Self {
        if self.options.annotation_sets == Selection::All {
            self.options.annotation_sets = Selection::none();
        }
        self.options.annotation_sets.insert(name);
        self
    }

    pub fn no_features(mut self) -> Self {
        self.options.features = Selection::none();
        self
    }

    pub fn use_feature(mut self, name: impl Into<String>) -> Self {
        if self.options.features == Selection::All {
            self.options.features = Selection::none();
        }
        self.options.features.insert(name);
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.options.conflict_policy = policy;
        self
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Merge a snapshot's included features and annotations into `target`.
    /// The target's text is never changed.
    #[instrument(skip_all, fields(policy = %self.options.conflict_policy))]
    pub fn apply_snapshot<S: DocumentStore>(
        &self,
        target: &mut S,
        snapshot: &Document,
    ) -> BdocResult<ReconcileStats> {
        let mut stats = ReconcileStats::default();
        let mut pass = Pass::new(snapshot.offset_type, target.offset_type());

        if let Some(features) = &snapshot.features {
            for (name, value) in features {
                if self.options.features.includes(name) {
                    target.features_mut().insert(name.clone(), value.clone());
                    stats.features_set += 1;
                }
            }
        }

        if let Some(sets) = &snapshot.annotation_sets {
            for (name, set) in sets {
                if !self.options.annotation_sets.includes(name) {
                    debug!(set = %name, "Skipping annotation set");
                    continue;
                }
                target.get_or_create_set(name);

                for ann in set {
                    let (start, end) = pass.convert_span(target.text(), ann.start, ann.end)?;
                    let outcome = merge_annotation(
                        target.get_or_create_set(name),
                        ann.id,
                        start,
                        end,
                        &ann.ann_type,
                        Some(&ann.features),
                        self.options.conflict_policy,
                    );
                    stats.record(outcome);
                }
            }
        }

        info!(
            features = stats.features_set,
            added = stats.annotations_added,
            merged = stats.annotations_merged,
            "Applied snapshot"
        );
        Ok(stats)
    }

    /// Replay every command of `log` against `target`, in order
    #[instrument(skip_all, fields(policy = %self.options.conflict_policy, commands = log.len()))]
    pub fn apply_changelog<S: DocumentStore>(
        &self,
        target: &mut S,
        log: &ChangeLog,
    ) -> BdocResult<ReconcileStats> {
        let mut stats = ReconcileStats::default();
        let mut pass = Pass::new(log.offset_type, target.offset_type());

        for (position, command) in log.iter().enumerate() {
            self.run_command(target, command, &mut pass, &mut stats)
                .map_err(|err| {
                    debug!(position, command = command.name(), %err, "Change log command failed");
                    err
                })?;
        }

        info!(
            commands = stats.commands_applied,
            added = stats.annotations_added,
            merged = stats.annotations_merged,
            "Applied change log"
        );
        Ok(stats)
    }

    /// Apply one command whose offsets are expressed in `offset_type`
    pub fn apply_command<S: DocumentStore>(
        &self,
        target: &mut S,
        command: &Command,
        offset_type: OffsetType,
    ) -> BdocResult<()> {
        let mut pass = Pass::new(offset_type, target.offset_type());
        let mut stats = ReconcileStats::default();
        self.run_command(target, command, &mut pass, &mut stats)
    }

    fn run_command<S: DocumentStore>(
        &self,
        target: &mut S,
        command: &Command,
        pass: &mut Pass,
        stats: &mut ReconcileStats,
    ) -> BdocResult<()> {
        match command {
            Command::FeaturesClear { scope } => match scope {
                ClearScope::Document => target.features_mut().clear(),
                ClearScope::Set(name) => {
                    if let Some(set) = target.annotation_set_mut(name) {
                        set.clear();
                    }
                }
            },

            Command::FeatureSet {
                target: owner,
                feature,
                value,
            } => match owner {
                FeatureTarget::Document => {
                    target.features_mut().insert(feature.clone(), value.clone());
                }
                FeatureTarget::Annotation { set, id } => {
                    let ann = existing_set(target, set)?
                        .get_mut(*id)
                        .ok_or_else(|| missing_annotation(set, *id))?;
                    ann.features.insert(feature.clone(), value.clone());
                }
            },

            Command::FeatureRemove {
                target: owner,
                feature,
            } => match owner {
                FeatureTarget::Document => {
                    target.features_mut().remove(feature);
                }
                FeatureTarget::Annotation { set, id } => {
                    let ann = existing_set(target, set)?
                        .get_mut(*id)
                        .ok_or_else(|| missing_annotation(set, *id))?;
                    ann.features.remove(feature);
                }
            },

            Command::AnnotationAdd {
                set,
                id,
                start,
                end,
                ann_type,
                features,
            } => {
                let (start, end) = pass.convert_span(target.text(), *start, *end)?;
                let outcome = merge_annotation(
                    target.get_or_create_set(set),
                    *id,
                    start,
                    end,
                    ann_type,
                    features.as_ref(),
                    self.options.conflict_policy,
                );
                stats.record(outcome);
            }

            Command::AnnotationRemove { set, id } => {
                if let Some(annotations) = target.annotation_set_mut(set) {
                    annotations
                        .remove(*id)
                        .ok_or_else(|| missing_annotation(set, *id))?;
                } else {
                    debug!(set = %set, id, "Remove on unknown set ignored");
                }
            }

            Command::AnnotationsClear { set } => {
                if let Some(annotations) = target.annotation_set_mut(set) {
                    annotations.clear();
                }
            }
        }

        stats.commands_applied += 1;
        Ok(())
    }
}

fn existing_set<'a, S: DocumentStore>(target: &'a mut S, name: &str) -> BdocResult<&'a mut S::Set> {
    target
        .annotation_set_mut(name)
        .ok_or_else(|| BdocError::not_found(format!("annotation set '{}'", name)))
}

fn missing_annotation(set: &str, id: AnnotationId) -> BdocError {
    BdocError::not_found(format!("annotation {} in set '{}'", id, set))
}

/// State shared by every annotation of one apply call
struct Pass {
    from: OffsetType,
    to: OffsetType,
    index: Option<OffsetIndex>,
    text_len: Option<usize>,
}

impl Pass {
    fn new(from: OffsetType, to: OffsetType) -> Self {
        Self {
            from,
            to,
            index: None,
            text_len: None,
        }
    }

    /// Validate an incoming span and express it in the store's units
    fn convert_span(&mut self, text: &str, start: usize, end: usize) -> BdocResult<(usize, usize)> {
        if start > end {
            return Err(BdocError::invalid_command(format!(
                "annotation start {} is after end {}",
                start, end
            )));
        }

        let (start, end) = if self.from == self.to {
            (start, end)
        } else {
            let index = self.index.get_or_insert_with(|| {
                debug!(len = text.len(), "Building offset index");
                OffsetIndex::build(text)
            });
            (
                index.convert(start, self.from, self.to)?,
                index.convert(end, self.from, self.to)?,
            )
        };

        let to = self.to;
        let len = *self.text_len.get_or_insert_with(|| text_len(text, to));
        if end > len {
            return Err(BdocError::OutOfRange { offset: end, len });
        }
        Ok((start, end))
    }
}
