//! # Change Log
//!
//! Ordered edit commands describing an incremental update to an annotated
//! document.
//!
//! ## Wire format
//!
//! Each command is a flat JSON object tagged by `"command"`:
//!
//! ```text
//! features:clear     [set]
//! feature:set        [set, id], feature, value
//! feature:remove     [set, id], feature
//! annotation:add     set, [id], start, end, type, [features]
//! annotation:remove  set, id
//! annotations:clear  set
//! ```
//!
//! A missing `set` addresses the document itself. Decoding goes through
//! [`RawChange`] so that unknown tags and missing fields surface as
//! `InvalidCommand` instead of generic decode errors.

use crate::annotation::AnnotationId;
use crate::features::{FeatureMap, FeatureValue};
use bdoc_common::{BdocError, BdocResult, OffsetType};
use bdoc_offsets::OffsetIndex;
use serde::{Deserialize, Deserializer, Serialize};

/// What a `features:clear` command empties
#[derive(Debug, Clone, PartialEq)]
pub enum ClearScope {
    /// The document feature map
    Document,
    /// All annotations of the named set
    Set(String),
}

/// Owner of the feature map a feature command edits
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureTarget {
    Document,
    Annotation { set: String, id: AnnotationId },
}

/// A single edit command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChange", into = "RawChange")]
pub enum Command {
    FeaturesClear {
        scope: ClearScope,
    },

    FeatureSet {
        target: FeatureTarget,
        feature: String,
        value: FeatureValue,
    },

    FeatureRemove {
        target: FeatureTarget,
        feature: String,
    },

    /// Add an annotation; an existing id is resolved by the conflict policy
    AnnotationAdd {
        set: String,
        id: Option<AnnotationId>,
        start: usize,
        end: usize,
        ann_type: String,
        features: Option<FeatureMap>,
    },

    AnnotationRemove {
        set: String,
        id: AnnotationId,
    },

    AnnotationsClear {
        set: String,
    },
}

impl Command {
    /// Wire tag of this command
    pub fn name(&self) -> &'static str {
        match self {
            Command::FeaturesClear { .. } => "features:clear",
            Command::FeatureSet { .. } => "feature:set",
            Command::FeatureRemove { .. } => "feature:remove",
            Command::AnnotationAdd { .. } => "annotation:add",
            Command::AnnotationRemove { .. } => "annotation:remove",
            Command::AnnotationsClear { .. } => "annotations:clear",
        }
    }

    /// Whether this command carries text offsets
    pub fn has_offsets(&self) -> bool {
        matches!(self, Command::AnnotationAdd { .. })
    }

    /// Convert the command's offsets between unit systems
    pub fn fixup_offsets(
        &mut self,
        index: &OffsetIndex,
        from: OffsetType,
        to: OffsetType,
    ) -> BdocResult<()> {
        if from == to {
            return Ok(());
        }
        if let Command::AnnotationAdd { start, end, .. } = self {
            let new_start = index.convert(*start, from, to)?;
            let new_end = index.convert(*end, from, to)?;
            *start = new_start;
            *end = new_end;
        }
        Ok(())
    }

    /// Decode one command from a JSON value
    pub fn from_value(value: serde_json::Value) -> BdocResult<Self> {
        let raw: RawChange = serde_json::from_value(value)
            .map_err(|e| BdocError::invalid_command(e.to_string()))?;
        Command::try_from(raw)
    }
}

/// Flat record matching one entry of the `changes` array on the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChange {
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnnotationId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,

    /// `Some(Null)` for an explicit `"value": null`, `None` when missing
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<FeatureValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ann_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureMap>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<FeatureValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FeatureValue::deserialize(deserializer).map(Some)
}

fn required<T>(field: Option<T>, command: &str, name: &str) -> BdocResult<T> {
    field.ok_or_else(|| {
        BdocError::invalid_command(format!("{} requires field '{}'", command, name))
    })
}

impl RawChange {
    fn feature_target(&self) -> BdocResult<FeatureTarget> {
        match &self.set {
            None => Ok(FeatureTarget::Document),
            Some(set) => Ok(FeatureTarget::Annotation {
                set: set.clone(),
                id: required(self.id, &self.command, "id")?,
            }),
        }
    }
}

impl TryFrom<RawChange> for Command {
    type Error = BdocError;

    fn try_from(raw: RawChange) -> Result<Self, Self::Error> {
        let cmd = raw.command.as_str();
        match cmd {
            "features:clear" => Ok(Command::FeaturesClear {
                scope: match raw.set {
                    None => ClearScope::Document,
                    Some(set) => ClearScope::Set(set),
                },
            }),
            "feature:set" => Ok(Command::FeatureSet {
                target: raw.feature_target()?,
                feature: required(raw.feature, cmd, "feature")?,
                value: required(raw.value, cmd, "value")?,
            }),
            "feature:remove" => Ok(Command::FeatureRemove {
                target: raw.feature_target()?,
                feature: required(raw.feature, cmd, "feature")?,
            }),
            "annotation:add" => Ok(Command::AnnotationAdd {
                set: required(raw.set, cmd, "set")?,
                id: raw.id,
                start: required(raw.start, cmd, "start")?,
                end: required(raw.end, cmd, "end")?,
                ann_type: required(raw.ann_type, cmd, "type")?,
                features: raw.features,
            }),
            "annotation:remove" => Ok(Command::AnnotationRemove {
                set: required(raw.set, cmd, "set")?,
                id: required(raw.id, cmd, "id")?,
            }),
            "annotations:clear" => Ok(Command::AnnotationsClear {
                set: required(raw.set, cmd, "set")?,
            }),
            other => Err(BdocError::invalid_command(format!(
                "unknown command '{}'",
                other
            ))),
        }
    }
}

fn split_target(target: FeatureTarget) -> (Option<String>, Option<AnnotationId>) {
    match target {
        FeatureTarget::Document => (None, None),
        FeatureTarget::Annotation { set, id } => (Some(set), Some(id)),
    }
}

impl From<Command> for RawChange {
    fn from(cmd: Command) -> Self {
        let command = cmd.name().to_string();
        match cmd {
            Command::FeaturesClear { scope } => RawChange {
                command,
                set: match scope {
                    ClearScope::Document => None,
                    ClearScope::Set(set) => Some(set),
                },
                ..Default::default()
            },
            Command::FeatureSet {
                target,
                feature,
                value,
            } => {
                let (set, id) = split_target(target);
                RawChange {
                    command,
                    set,
                    id,
                    feature: Some(feature),
                    value: Some(value),
                    ..Default::default()
                }
            }
            Command::FeatureRemove { target, feature } => {
                let (set, id) = split_target(target);
                RawChange {
                    command,
                    set,
                    id,
                    feature: Some(feature),
                    ..Default::default()
                }
            }
            Command::AnnotationAdd {
                set,
                id,
                start,
                end,
                ann_type,
                features,
            } => RawChange {
                command,
                set: Some(set),
                id,
                start: Some(start),
                end: Some(end),
                ann_type: Some(ann_type),
                features,
                ..Default::default()
            },
            Command::AnnotationRemove { set, id } => RawChange {
                command,
                set: Some(set),
                id: Some(id),
                ..Default::default()
            },
            Command::AnnotationsClear { set } => RawChange {
                command,
                set: Some(set),
                ..Default::default()
            },
        }
    }
}

/// Ordered commands plus the unit system their offsets are expressed in
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeLog {
    #[serde(default)]
    pub changes: Vec<Command>,

    #[serde(default)]
    pub offset_type: OffsetType,
}

#[derive(Deserialize)]
struct RawChangeLog {
    #[serde(default)]
    changes: Vec<serde_json::Value>,

    #[serde(default)]
    offset_type: Option<String>,
}

impl ChangeLog {
    pub fn new(offset_type: OffsetType) -> Self {
        Self {
            changes: Vec::new(),
            offset_type,
        }
    }

    pub fn push(&mut self, command: Command) {
        self.changes.push(command);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.changes.iter()
    }

    /// Convert all annotation offsets to `target` using an index over the
    /// text the log will be applied to.
    pub fn fixup(&mut self, index: &OffsetIndex, target: OffsetType) -> BdocResult<()> {
        if self.offset_type == target {
            return Ok(());
        }
        let from = self.offset_type;
        let mut converted = self.changes.clone();
        for command in &mut converted {
            command.fixup_offsets(index, from, target)?;
        }
        self.changes = converted;
        self.offset_type = target;
        Ok(())
    }

    /// Decode from JSON, reporting malformed commands as `InvalidCommand`
    /// and unknown offset literals as `Precondition`
    pub fn from_json(json: &str) -> BdocResult<Self> {
        let raw: RawChangeLog = serde_json::from_str(json)?;
        let offset_type = match raw.offset_type {
            Some(literal) => literal.parse()?,
            None => OffsetType::default(),
        };
        let changes = raw
            .changes
            .into_iter()
            .map(Command::from_value)
            .collect::<BdocResult<Vec<_>>>()?;

        Ok(Self {
            changes,
            offset_type,
        })
    }

    pub fn to_json(&self) -> BdocResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> BdocResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a ChangeLog {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
