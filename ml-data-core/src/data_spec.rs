//! Dataset specification passed to user-defined transformations
//!
//! A [`DataSpec`] bundles whatever a transformation needs to know about the
//! dataset it runs on: the dataset handle, its size, decoders, vocabularies,
//! embeddings, and any dataset-specific extras. For datasets made of several
//! components, a field can hold one value per component
//! ([`SpecField::PerComponent`]). [`DataSpec::project`] slices out the view of
//! a single component, and [`DataSpec::inject`] writes it back.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// Name of the dataset handle field
pub const DATASET: &str = "dataset";
/// Name of the dataset size field
pub const DATASET_SIZE: &str = "dataset_size";
/// Name of the decoder field
pub const DECODER: &str = "decoder";
/// Name of the vocabulary field
pub const VOCAB: &str = "vocab";
/// Name of the embedding field
pub const EMBEDDING: &str = "embedding";

/// Fields every spec carries, absent until set
pub const RESERVED_FIELDS: [&str; 5] = [DATASET, DATASET_SIZE, DECODER, VOCAB, EMBEDDING];

/// Shared, type-erased field value
pub type Handle = Arc<dyn Any + Send + Sync>;

/// Value of a single spec field
#[derive(Clone, Default)]
pub enum SpecField {
    /// Field is declared but holds nothing
    #[default]
    Absent,

    /// One value shared by all components
    Scalar(Handle),

    /// One entry per component
    PerComponent(Vec<SpecField>),
}

impl SpecField {
    /// Wrap a single value
    pub fn scalar<T: Any + Send + Sync>(value: T) -> Self {
        SpecField::Scalar(Arc::new(value))
    }

    /// Wrap one value per component
    pub fn per_component<T, I>(values: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        SpecField::PerComponent(values.into_iter().map(SpecField::scalar).collect())
    }

    /// Check if this field holds nothing
    pub fn is_absent(&self) -> bool {
        matches!(self, SpecField::Absent)
    }

    /// Check if this field holds one entry per component
    pub fn is_per_component(&self) -> bool {
        matches!(self, SpecField::PerComponent(_))
    }

    /// Get the entry of component `index` of a per-component field
    pub fn component(&self, index: usize) -> Result<&SpecField> {
        match self {
            SpecField::PerComponent(items) => items
                .get(index)
                .ok_or_else(|| Error::out_of_bounds(index, items.len())),
            _ => Err(Error::TypeMismatch(
                "field does not hold per-component values".into(),
            )),
        }
    }

    /// Borrow the value of a scalar field as `T`
    ///
    /// Returns `Ok(None)` for an absent field.
    pub fn downcast_ref<T: Any>(&self) -> Result<Option<&T>> {
        match self {
            SpecField::Absent => Ok(None),
            SpecField::Scalar(handle) => handle
                .downcast_ref::<T>()
                .map(Some)
                .ok_or_else(|| Error::TypeMismatch(format!("field is not a {}", type_name::<T>()))),
            SpecField::PerComponent(_) => Err(Error::TypeMismatch(
                "field holds per-component values".into(),
            )),
        }
    }
}

impl fmt::Debug for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecField::Absent => f.write_str("Absent"),
            SpecField::Scalar(_) => f.write_str("Scalar(..)"),
            SpecField::PerComponent(items) => f.debug_tuple("PerComponent").field(items).finish(),
        }
    }
}

/// Dataset specification
#[derive(Debug, Clone)]
pub struct DataSpec {
    fields: BTreeMap<String, SpecField>,
}

impl DataSpec {
    /// Create a spec where every reserved field is absent
    pub fn new() -> Self {
        let fields = RESERVED_FIELDS
            .iter()
            .map(|name| ((*name).to_string(), SpecField::Absent))
            .collect();
        Self { fields }
    }

    /// Start building a spec
    pub fn builder() -> DataSpecBuilder {
        DataSpecBuilder::new()
    }

    /// Add new fields, overwriting existing fields of the same name
    pub fn add_spec<K, I>(&mut self, fields: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SpecField)>,
    {
        self.fields
            .extend(fields.into_iter().map(|(name, field)| (name.into(), field)));
    }

    /// Get a field by name
    pub fn field(&self, name: &str) -> Result<&SpecField> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::KeyNotFound(name.to_string()))
    }

    /// Borrow a scalar field as `T`
    pub fn get<T: Any>(&self, name: &str) -> Result<Option<&T>> {
        self.field(name)?.downcast_ref::<T>()
    }

    /// Check if a field is declared
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of all declared fields, in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over all fields
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecField)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no field is declared
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The dataset handle, if set
    pub fn dataset(&self) -> Result<Option<Arc<dyn Dataset>>> {
        Ok(self.get::<Arc<dyn Dataset>>(DATASET)?.cloned())
    }

    /// Number of samples in the dataset, if set
    pub fn dataset_size(&self) -> Result<Option<usize>> {
        Ok(self.get::<usize>(DATASET_SIZE)?.copied())
    }

    /// The decoder, if set as a single value
    pub fn decoder<T: Any>(&self) -> Result<Option<&T>> {
        self.get(DECODER)
    }

    /// The vocabulary, if set as a single value
    pub fn vocab<T: Any>(&self) -> Result<Option<&T>> {
        self.get(VOCAB)
    }

    /// The embedding, if set as a single value
    pub fn embedding<T: Any>(&self) -> Result<Option<&T>> {
        self.get(EMBEDDING)
    }

    /// Return the spec of the `index`-th component
    ///
    /// Per-component fields are replaced by their `index`-th entry, all other
    /// fields are carried over unchanged.
    pub fn project(&self, index: usize) -> Result<DataSpec> {
        let fields = self
            .fields
            .iter()
            .map(|(name, field)| -> Result<(String, SpecField)> {
                let projected = match field {
                    SpecField::PerComponent(_) => field.component(index)?.clone(),
                    other => other.clone(),
                };
                Ok((name.clone(), projected))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(DataSpec { fields })
    }

    /// Write the fields of `spec` back as the `index`-th component
    ///
    /// A per-component field gets its `index`-th entry replaced. A new field
    /// becomes a per-component field of `num_components` absent entries with
    /// `index` set. A field that currently holds a single value (or nothing)
    /// is overwritten as a whole.
    ///
    /// Nothing is modified when `index` is out of range for any field.
    pub fn inject(&mut self, index: usize, spec: &DataSpec, num_components: usize) -> Result<()> {
        for name in spec.fields.keys() {
            let len = match self.fields.get(name) {
                Some(SpecField::PerComponent(items)) => items.len(),
                Some(_) => continue,
                None => num_components,
            };
            if index >= len {
                return Err(Error::out_of_bounds(index, len));
            }
        }

        tracing::trace!(index, num_components, fields = spec.len(), "injecting component spec");

        for (name, value) in &spec.fields {
            match self.fields.get_mut(name) {
                Some(SpecField::PerComponent(items)) => items[index] = value.clone(),
                Some(existing) => *existing = value.clone(),
                None => {
                    let mut items = vec![SpecField::Absent; num_components];
                    items[index] = value.clone();
                    self.fields
                        .insert(name.clone(), SpecField::PerComponent(items));
                }
            }
        }

        Ok(())
    }
}

impl Default for DataSpec {
    fn default() -> Self {
        Self::new()
    }
}

/// A builder for creating data specs
#[derive(Debug, Default)]
pub struct DataSpecBuilder {
    spec: DataSpec,
}

impl DataSpecBuilder {
    /// Create a new builder with every reserved field absent
    pub fn new() -> Self {
        Self {
            spec: DataSpec::new(),
        }
    }

    /// Set the dataset handle
    #[must_use]
    pub fn dataset(self, dataset: Arc<dyn Dataset>) -> Self {
        self.field(DATASET, SpecField::scalar(dataset))
    }

    /// Set the number of samples
    #[must_use]
    pub fn dataset_size(self, size: usize) -> Self {
        self.field(DATASET_SIZE, SpecField::scalar(size))
    }

    /// Set a decoder shared by all components
    #[must_use]
    pub fn decoder<T: Any + Send + Sync>(self, decoder: T) -> Self {
        self.field(DECODER, SpecField::scalar(decoder))
    }

    /// Set one decoder per component
    #[must_use]
    pub fn decoders<T, I>(self, decoders: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        self.field(DECODER, SpecField::per_component(decoders))
    }

    /// Set a vocabulary shared by all components
    #[must_use]
    pub fn vocab<T: Any + Send + Sync>(self, vocab: T) -> Self {
        self.field(VOCAB, SpecField::scalar(vocab))
    }

    /// Set one vocabulary per component
    #[must_use]
    pub fn vocabs<T, I>(self, vocabs: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        self.field(VOCAB, SpecField::per_component(vocabs))
    }

    /// Set an embedding shared by all components
    #[must_use]
    pub fn embedding<T: Any + Send + Sync>(self, embedding: T) -> Self {
        self.field(EMBEDDING, SpecField::scalar(embedding))
    }

    /// Set one embedding per component
    #[must_use]
    pub fn embeddings<T, I>(self, embeddings: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        self.field(EMBEDDING, SpecField::per_component(embeddings))
    }

    /// Set an arbitrary dataset-specific field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: SpecField) -> Self {
        self.spec.fields.insert(name.into(), field);
        self
    }

    /// Build the spec
    pub fn build(self) -> DataSpec {
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataset;

    #[derive(Debug, PartialEq)]
    struct Decoder(&'static str);

    #[derive(Debug, PartialEq)]
    struct Vocab(usize);

    #[test]
    fn test_new_declares_reserved_fields() {
        let spec = DataSpec::new();
        assert_eq!(spec.len(), RESERVED_FIELDS.len());
        for name in RESERVED_FIELDS {
            assert!(spec.field(name).unwrap().is_absent());
        }
        assert!(spec.dataset().unwrap().is_none());
        assert_eq!(spec.dataset_size().unwrap(), None);
    }

    #[test]
    fn test_builder_sets_fields() {
        let dataset: Arc<dyn Dataset> = Arc::new(InMemoryDataset::from_iter(0..3));
        let spec = DataSpec::builder()
            .dataset(dataset)
            .dataset_size(3)
            .vocab(Vocab(100))
            .field("max_seq_length", SpecField::scalar(64_usize))
            .build();

        assert_eq!(spec.dataset().unwrap().and_then(|d| d.row_count()), Some(3));
        assert_eq!(spec.dataset_size().unwrap(), Some(3));
        assert_eq!(spec.vocab::<Vocab>().unwrap(), Some(&Vocab(100)));
        assert_eq!(spec.get::<usize>("max_seq_length").unwrap(), Some(&64));
        assert!(matches!(spec.vocab::<Decoder>(), Err(Error::TypeMismatch(_))));
        assert!(matches!(spec.get::<usize>("missing"), Err(Error::KeyNotFound(_))));
    }

    #[test]
    fn test_add_spec_overwrites() {
        let mut spec = DataSpec::builder().dataset_size(10).build();
        spec.add_spec([
            (DATASET_SIZE, SpecField::scalar(20_usize)),
            ("bos_token", SpecField::scalar("<BOS>")),
        ]);

        assert_eq!(spec.dataset_size().unwrap(), Some(20));
        assert_eq!(spec.get::<&str>("bos_token").unwrap(), Some(&"<BOS>"));
    }

    #[test]
    fn test_wrongly_typed_reserved_fields_are_errors() {
        let mut spec = DataSpec::new();
        spec.add_spec([
            (DATASET_SIZE, SpecField::scalar(10_i64)),
            (DATASET, SpecField::scalar(InMemoryDataset::default())),
        ]);

        assert!(matches!(spec.dataset_size(), Err(Error::TypeMismatch(_))));
        assert!(matches!(spec.dataset(), Err(Error::TypeMismatch(_))));

        let spec = DataSpec::builder()
            .decoders([Decoder("d0"), Decoder("d1")])
            .build();
        assert!(matches!(spec.decoder::<Decoder>(), Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn test_project_indexes_per_component_fields() {
        let spec = DataSpec::builder()
            .decoders([Decoder("d0"), Decoder("d1")])
            .vocab(Vocab(7))
            .build();

        let second = spec.project(1).unwrap();
        assert_eq!(second.decoder::<Decoder>().unwrap(), Some(&Decoder("d1")));
        assert_eq!(second.vocab::<Vocab>().unwrap(), Some(&Vocab(7)));
        assert!(second.field(EMBEDDING).unwrap().is_absent());

        assert!(matches!(
            spec.project(2),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_inject_creates_per_component_field() {
        let mut spec = DataSpec::new();
        let mut component = DataSpec::new();
        component.add_spec([("x", SpecField::scalar(5_i64))]);

        spec.inject(1, &component, 3).unwrap();

        let x = spec.field("x").unwrap();
        assert!(x.is_per_component());
        assert!(x.component(0).unwrap().is_absent());
        assert_eq!(x.component(1).unwrap().downcast_ref::<i64>().unwrap(), Some(&5));
        assert!(x.component(2).unwrap().is_absent());
        assert!(x.component(3).is_err());
    }

    #[test]
    fn test_inject_sets_entry_of_per_component_field() {
        let mut spec = DataSpec::builder()
            .decoders([Decoder("d0"), Decoder("d1")])
            .build();

        let mut component = spec.project(0).unwrap();
        component.add_spec([(DECODER, SpecField::scalar(Decoder("new")))]);
        spec.inject(0, &component, 2).unwrap();

        let decoder = spec.field(DECODER).unwrap();
        assert_eq!(
            decoder.component(0).unwrap().downcast_ref::<Decoder>().unwrap(),
            Some(&Decoder("new"))
        );
        assert_eq!(
            decoder.component(1).unwrap().downcast_ref::<Decoder>().unwrap(),
            Some(&Decoder("d1"))
        );
    }

    #[test]
    fn test_inject_overwrites_scalar_field() {
        let mut spec = DataSpec::builder().vocab(Vocab(1)).build();
        let component = DataSpec::builder().vocab(Vocab(2)).build();

        spec.inject(1, &component, 2).unwrap();

        // Single-valued fields are replaced, not turned into per-component ones
        assert_eq!(spec.vocab::<Vocab>().unwrap(), Some(&Vocab(2)));
    }

    #[test]
    fn test_inject_out_of_range_leaves_spec_unchanged() {
        let mut spec = DataSpec::builder().vocab(Vocab(1)).build();
        let mut component = DataSpec::builder().vocab(Vocab(2)).build();
        component.add_spec([("x", SpecField::scalar(1_i64))]);

        let err = spec.inject(2, &component, 2).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 2, len: 2 }));
        assert!(!spec.contains("x"));
        assert_eq!(spec.vocab::<Vocab>().unwrap(), Some(&Vocab(1)));
    }
}
