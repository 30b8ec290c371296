//! Normalization of multi-output records

use ml_data_core::{Error, Result, Value};

/// Collect `items` into a [`Value::List`], unwrapping a single item
///
/// Map functions that may see one or several outputs use this so that the
/// single-output case stays a plain value.
pub fn maybe_tuple<I>(items: I) -> Result<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let mut items: Vec<Value> = items.into_iter().map(Into::into).collect();

    match items.len() {
        0 => Err(Error::out_of_bounds(0, 0)),
        1 => Ok(items.swap_remove(0)),
        _ => Ok(Value::List(items)),
    }
}
