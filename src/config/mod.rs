//! Core building blocks for settings
//!
//! This module contains the foundational types of the store:
//! - `Source` - Totally ordered precedence ranks
//! - `Property` - A single value with provenance and function chains
//! - `ValueKind` and the validator library - Type checks and reusable chain links

mod property;
mod source;
pub mod validators;

pub use property::{Property, PropertyBuilder};
pub use source::Source;
pub use validators::{Hook, Preprocessor, Validator, ValueKind};
