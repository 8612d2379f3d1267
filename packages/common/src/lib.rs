//! Shared types for the bdoc crates: the error taxonomy and the offset
//! convention tag carried by documents and change logs.

pub mod error;
pub mod offset_type;
pub mod result;

pub use error::*;
pub use offset_type::*;
pub use result::*;
