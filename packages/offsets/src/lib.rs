//! Offset utilities for bdoc documents
//!
//! Maps text offsets between UTF-16 code units and Unicode code points.
//! The [`OffsetIndex`] is built once per text and shared by every
//! conversion in a fixup or reconciliation pass.

pub mod index;
pub mod utils;

pub use index::OffsetIndex;
pub use utils::{code_point_len, code_unit_len, text_len};
