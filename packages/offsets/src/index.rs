use crate::utils::{is_high_surrogate, is_low_surrogate};
use bdoc_common::{BdocError, BdocResult, OffsetType};

/// Bidirectional map between UTF-16 code-unit offsets and code-point offsets
///
/// Built in one pass over the text. Every code unit maps to the code point it
/// belongs to (the low half of a surrogate pair maps to the same code point
/// as the high half), and every code point maps to the code unit where it
/// starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetIndex {
    unit_to_point: Vec<usize>,
    point_to_unit: Vec<usize>,
}

impl OffsetIndex {
    /// Build the index for a text
    pub fn build(text: &str) -> Self {
        let mut unit_to_point = Vec::with_capacity(text.len());
        let mut point_to_unit = Vec::with_capacity(text.len());

        let mut point = 0;
        for (unit_offset, unit) in text.encode_utf16().enumerate() {
            unit_to_point.push(point);
            if is_high_surrogate(unit) {
                // The pair starts here; the point counter moves on the low half
                point_to_unit.push(unit_offset);
            } else if is_low_surrogate(unit) {
                point += 1;
            } else {
                point += 1;
                point_to_unit.push(unit_offset);
            }
        }

        Self {
            unit_to_point,
            point_to_unit,
        }
    }

    /// Length of the indexed text in code units
    pub fn unit_len(&self) -> usize {
        self.unit_to_point.len()
    }

    /// Length of the indexed text in code points
    pub fn point_len(&self) -> usize {
        self.point_to_unit.len()
    }

    /// True when both index spaces coincide (no supplementary-plane characters)
    pub fn is_identity(&self) -> bool {
        self.unit_len() == self.point_len()
    }

    /// Length of the indexed text in the given unit system
    pub fn len_in(&self, offset_type: OffsetType) -> usize {
        match offset_type {
            OffsetType::CodeUnit => self.unit_len(),
            OffsetType::CodePoint => self.point_len(),
        }
    }

    /// Convert a code-unit offset to a code-point offset.
    ///
    /// The end-of-text position is valid and maps to the code-point length.
    pub fn to_code_point(&self, unit_offset: usize) -> BdocResult<usize> {
        lookup(&self.unit_to_point, unit_offset, self.point_len())
    }

    /// Convert a code-point offset to a code-unit offset.
    ///
    /// The end-of-text position is valid and maps to the code-unit length.
    pub fn to_code_unit(&self, point_offset: usize) -> BdocResult<usize> {
        lookup(&self.point_to_unit, point_offset, self.unit_len())
    }

    /// Convert an offset between unit systems; identical systems pass through
    /// after a range check.
    pub fn convert(&self, offset: usize, from: OffsetType, to: OffsetType) -> BdocResult<usize> {
        match (from, to) {
            (OffsetType::CodeUnit, OffsetType::CodePoint) => self.to_code_point(offset),
            (OffsetType::CodePoint, OffsetType::CodeUnit) => self.to_code_unit(offset),
            (same, _) => {
                let len = self.len_in(same);
                if offset > len {
                    Err(BdocError::OutOfRange { offset, len })
                } else {
                    Ok(offset)
                }
            }
        }
    }
}

fn lookup(table: &[usize], offset: usize, end_value: usize) -> BdocResult<usize> {
    match table.get(offset) {
        Some(mapped) => Ok(*mapped),
        None if offset == table.len() => Ok(end_value),
        None => Err(BdocError::OutOfRange {
            offset,
            len: table.len(),
        }),
    }
}
