//! Per-component transformation of multi-component records

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ml_data_core::{BoxedTransform, Error, Result, Transform, TransformChain, Value};

/// Transformation applied to one component of a record
pub enum ComponentTransform<A = ()> {
    /// A single transform
    Single(BoxedTransform<A>),

    /// Transforms applied in sequence
    Chain(TransformChain<A>),
}

impl<A> ComponentTransform<A> {
    /// Wrap a single transform
    pub fn single<T: Transform<A> + 'static>(transform: T) -> Self {
        ComponentTransform::Single(Arc::new(transform))
    }
}

impl<A> Transform<A> for ComponentTransform<A> {
    fn transform(&self, data: Value, args: &A) -> Result<Value> {
        match self {
            ComponentTransform::Single(transform) => transform.transform(data, args),
            ComponentTransform::Chain(chain) => chain.transform(data, args),
        }
    }
}

impl<A> Clone for ComponentTransform<A> {
    fn clone(&self) -> Self {
        match self {
            ComponentTransform::Single(transform) => ComponentTransform::Single(transform.clone()),
            ComponentTransform::Chain(chain) => ComponentTransform::Chain(chain.clone()),
        }
    }
}

impl<A> fmt::Debug for ComponentTransform<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentTransform::Single(_) => f.write_str("Single(..)"),
            ComponentTransform::Chain(chain) => f.debug_tuple("Chain").field(chain).finish(),
        }
    }
}

impl<A> From<BoxedTransform<A>> for ComponentTransform<A> {
    fn from(transform: BoxedTransform<A>) -> Self {
        ComponentTransform::Single(transform)
    }
}

impl<A> From<TransformChain<A>> for ComponentTransform<A> {
    fn from(chain: TransformChain<A>) -> Self {
        ComponentTransform::Chain(chain)
    }
}

impl<A> From<Vec<BoxedTransform<A>>> for ComponentTransform<A> {
    fn from(transforms: Vec<BoxedTransform<A>>) -> Self {
        ComponentTransform::Chain(TransformChain::new(transforms))
    }
}

/// Apply one transformation per component and merge the resulting fields
///
/// The returned closure expects a [`Value::List`] with at least as many
/// components as `transforms`. Component `i` is run through `transforms[i]`,
/// which must produce a [`Value::Map`]. When `name_prefix` is given, every
/// field name of component `i` becomes `"{name_prefix[i]}_{name}"`. All fields
/// are merged into one map; two components producing the same (prefixed)
/// name is an error.
///
/// An empty `name_prefix` is the same as none. A non-empty one must have one
/// entry per transform, otherwise construction fails.
pub fn make_combined_transformation<A>(
    transforms: Vec<ComponentTransform<A>>,
    name_prefix: Option<Vec<String>>,
    args: A,
) -> Result<impl Fn(Value) -> Result<Value> + Send + Sync>
where
    A: Send + Sync,
{
    let prefixes = match name_prefix {
        Some(prefixes) if !prefixes.is_empty() => {
            if prefixes.len() != transforms.len() {
                return Err(Error::InvalidArgument(format!(
                    "name_prefix must have one entry per transform: got {} prefixes for {} transforms",
                    prefixes.len(),
                    transforms.len()
                )));
            }
            Some(prefixes)
        }
        _ => None,
    };

    tracing::debug!(
        components = transforms.len(),
        prefixed = prefixes.is_some(),
        "built combined transformation"
    );

    Ok(move |data: Value| -> Result<Value> {
        let components = data.into_list()?;
        if components.len() < transforms.len() {
            return Err(Error::out_of_bounds(components.len(), components.len()));
        }

        let mut merged = BTreeMap::new();
        for (i, (transform, component)) in transforms.iter().zip(components).enumerate() {
            let fields = transform.transform(component, &args)?.into_map()?;

            for (name, value) in fields {
                let name = match &prefixes {
                    Some(prefixes) => format!("{}_{}", prefixes[i], name),
                    None => name,
                };

                match merged.entry(name) {
                    Entry::Occupied(entry) => {
                        return Err(Error::DuplicateField(entry.key().clone()));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(value);
                    }
                }
            }
        }

        Ok(Value::Map(merged))
    })
}
