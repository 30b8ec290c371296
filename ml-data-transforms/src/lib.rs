//! Composition helpers for ML data pipeline transformations
//!
//! The functions in this crate wrap one or more [`Transform`]s into a single
//! unary closure `Fn(Value) -> Result<Value>` that can be handed to
//! [`DatasetExt::map`](ml_data_core::DatasetExt::map):
//!
//! - [`make_partial`] binds the extra arguments of a transform,
//! - [`make_chained_transformation`] runs transforms one after another,
//! - [`make_combined_transformation`] runs one transform per component of a
//!   multi-component record and merges the resulting fields.

#![warn(missing_docs)]

mod chain;
mod combine;
mod tuple;

pub use chain::{make_chained_transformation, make_partial};
pub use combine::{make_combined_transformation, ComponentTransform};
pub use tuple::maybe_tuple;

// Re-export core types
pub use ml_data_core::{BoxedTransform, Error, Result, Transform, TransformChain, Value};
