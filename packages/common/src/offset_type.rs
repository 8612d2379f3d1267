use crate::error::BdocError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system in which annotation offsets are expressed.
///
/// On the wire this is the `offset_type` field: `"j"` for UTF-16 code units,
/// `"p"` for Unicode code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OffsetType {
    /// UTF-16 code units; a supplementary-plane character occupies two.
    #[default]
    CodeUnit,
    /// Unicode code points; every character occupies one.
    CodePoint,
}

impl OffsetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetType::CodeUnit => "j",
            OffsetType::CodePoint => "p",
        }
    }
}

impl FromStr for OffsetType {
    type Err = BdocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "j" => Ok(OffsetType::CodeUnit),
            "p" => Ok(OffsetType::CodePoint),
            other => Err(BdocError::precondition(format!(
                "offset type must be 'j' or 'p', got '{}'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for OffsetType {
    type Error = BdocError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OffsetType> for String {
    fn from(value: OffsetType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for OffsetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
