//! Partial application and sequential chaining

use ml_data_core::{Result, Transform, TransformChain, Value};

/// Freeze the extra arguments of `transform`
///
/// The returned closure computes `transform(data, &args)`.
pub fn make_partial<A, T>(transform: T, args: A) -> impl Fn(Value) -> Result<Value> + Send + Sync
where
    A: Send + Sync,
    T: Transform<A>,
{
    move |data| transform.transform(data, &args)
}

/// Apply `transforms` one after another, each fed the same `args`
///
/// The output of one transform is the input of the next. An empty chain is
/// the identity.
pub fn make_chained_transformation<A>(
    transforms: impl Into<TransformChain<A>>,
    args: A,
) -> impl Fn(Value) -> Result<Value> + Send + Sync
where
    A: Send + Sync,
{
    let chain: TransformChain<A> = transforms.into();
    tracing::debug!(transforms = chain.len(), "built chained transformation");
    make_partial(chain, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml_data_core::{BoxedTransform, Dataset, DatasetExt, Error, InMemoryDataset};
    use std::sync::Arc;

    fn append(data: Value, suffix: &String) -> Result<Value> {
        match data {
            Value::String(s) => Ok(Value::String(s + suffix)),
            other => Err(Error::TypeMismatch(other.type_name().into())),
        }
    }

    fn wrap(data: Value, _: &String) -> Result<Value> {
        Ok(Value::List(vec![data]))
    }

    #[test]
    fn test_partial_binds_args() {
        let f = make_partial(append, "!".to_string());
        assert_eq!(f(Value::from("hi")).unwrap(), Value::from("hi!"));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let f = TransformChain::<String>::default().then(append).then(wrap);
        let chained = make_chained_transformation(f, "?".to_string());

        // wrap(append(x))
        assert_eq!(
            chained(Value::from("x")).unwrap(),
            Value::List(vec![Value::from("x?")])
        );
    }

    #[test]
    fn test_chain_from_boxed_transforms() {
        let boxed: BoxedTransform<String> = Arc::new(append);
        let chained = make_chained_transformation(vec![Arc::clone(&boxed), boxed], "-".to_string());
        assert_eq!(chained(Value::from("a")).unwrap(), Value::from("a--"));
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chained = make_chained_transformation(TransformChain::<()>::default(), ());
        assert_eq!(chained(Value::Int(3)).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_chain_propagates_errors() {
        let f = TransformChain::<String>::default().then(wrap).then(append);
        let chained = make_chained_transformation(f, "?".to_string());
        assert!(matches!(
            chained(Value::from("x")),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_chain_as_dataset_map() {
        let dataset: InMemoryDataset = ["a", "b"].into_iter().collect();
        let chained = make_chained_transformation(
            TransformChain::<String>::default().then(append),
            ".txt".to_string(),
        );

        let records = dataset.map(chained).collect_records().unwrap();
        assert_eq!(records, vec![Value::from("a.txt"), Value::from("b.txt")]);
    }
}
