//! Transform trait and implementations for record transformation

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::value::Value;

/// A transformation that processes one record
///
/// `A` is the bundle of extra arguments handed to the transformation on every
/// call, e.g. a data spec or hyperparameters. Closures of the shape
/// `Fn(Value, &A) -> Result<Value>` implement this trait directly.
pub trait Transform<A = ()>: Send + Sync {
    /// Transform a single record
    fn transform(&self, data: Value, args: &A) -> Result<Value>;
}

impl<A, F> Transform<A> for F
where
    F: Fn(Value, &A) -> Result<Value> + Send + Sync,
{
    fn transform(&self, data: Value, args: &A) -> Result<Value> {
        self(data, args)
    }
}

/// Shared, type-erased transformation
pub type BoxedTransform<A = ()> = Arc<dyn Transform<A>>;

/// A chain of transforms that can be executed as a single transform
pub struct TransformChain<A = ()> {
    /// The transforms in this chain
    transforms: Vec<BoxedTransform<A>>,
}

impl<A> TransformChain<A> {
    /// Create a new transform chain
    pub fn new(transforms: Vec<BoxedTransform<A>>) -> Self {
        Self { transforms }
    }

    /// Append a transform to the end of the chain
    #[must_use]
    pub fn then<T: Transform<A> + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    /// Get a reference to the transforms in this chain
    pub fn transforms(&self) -> &[BoxedTransform<A>] {
        &self.transforms
    }

    /// Number of transforms in this chain
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if this chain is the identity
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl<A> Default for TransformChain<A> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<A> Clone for TransformChain<A> {
    fn clone(&self) -> Self {
        Self::new(self.transforms.clone())
    }
}

impl<A> fmt::Debug for TransformChain<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformChain")
            .field("len", &self.transforms.len())
            .finish()
    }
}

impl<A> FromIterator<BoxedTransform<A>> for TransformChain<A> {
    fn from_iter<I: IntoIterator<Item = BoxedTransform<A>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<A> From<Vec<BoxedTransform<A>>> for TransformChain<A> {
    fn from(transforms: Vec<BoxedTransform<A>>) -> Self {
        Self::new(transforms)
    }
}

impl<A> Transform<A> for TransformChain<A> {
    fn transform(&self, data: Value, args: &A) -> Result<Value> {
        let mut current = data;

        for transform in &self.transforms {
            current = transform.transform(current, args)?;
        }

        Ok(current)
    }
}
