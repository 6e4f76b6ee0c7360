use std::{collections::HashMap, sync::Arc};

use crate::{BasicType, EnumHandle, Scalar, value::ScalarKey};

/// Dictionary of the distinct values of an enumerated attribute.
///
/// Handles are assigned in insertion order and never reused until
/// [`EnumStore::compacted`] rebuilds the dictionary in value order.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnumStore {
    values: Vec<Scalar>,
    index: HashMap<ScalarKey, EnumHandle>,
}

impl EnumStore {
    pub(crate) fn insert(&mut self, value: &Scalar) -> EnumHandle {
        let key = value.key();
        if let Some(handle) = self.index.get(&key) {
            return *handle;
        }
        let handle = EnumHandle::new(self.values.len() as u32);
        self.values.push(value.clone());
        self.index.insert(key, handle);
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: EnumHandle) -> Option<&Scalar> {
        self.values.get(handle.index())
    }

    #[inline]
    pub(crate) fn find(&self, value: &Scalar) -> Option<EnumHandle> {
        self.index.get(&value.key()).copied()
    }

    /// Looks up a value given in its textual form.
    pub(crate) fn find_str(&self, basic_type: BasicType, text: &str) -> Option<EnumHandle> {
        let value = match basic_type {
            BasicType::String => Scalar::Str(Arc::from(text)),
            BasicType::Float => Scalar::Float(text.trim().parse::<f32>().ok()? as f64),
            BasicType::Double => Scalar::Float(text.trim().parse().ok()?),
            _ => Scalar::Int(text.trim().parse().ok()?),
        };
        self.find(&value)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    /// Builds a dictionary holding only `live` values, with handles in value order.
    pub(crate) fn compacted<'a>(live: impl Iterator<Item = &'a Scalar>) -> Self {
        let mut values: Vec<Scalar> = live.cloned().collect();
        values.sort_by(Scalar::total_cmp);
        values.dedup_by(|a, b| a.key() == b.key());

        let index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.key(), EnumHandle::new(i as u32)))
            .collect();

        Self { values, index }
    }
}
