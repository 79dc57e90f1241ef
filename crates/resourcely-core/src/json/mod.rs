//! JSON equivalence normalisation.
//!
//! Two JSON strings that parse to the same structure should not be reported
//! as a change. [`is_equivalent`] performs that comparison and
//! [`JsonString`] carries an opaque document whose original byte form is kept.

mod equivalence;
mod value;

pub use equivalence::{JsonError, is_equivalent, parse, validate, values_equal};
pub use value::JsonString;
