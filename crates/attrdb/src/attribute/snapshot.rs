use std::sync::Arc;

use crate::{
    AttributeConfig, AttributeRead, AttributeSearchContext, BlobConverter, DocId, EnumHandle,
    Entry, Generation, SearchContext, SearchContextParams, SortOrder, enum_pin::EnumPin,
};

use super::{AttributeData, AttributeShared};

/// Read access to one pinned generation of an [`crate::AttributeVector`].
///
/// Every read through a snapshot sees the same data, no matter how many
/// generations the writer publishes meanwhile. The generation is retained
/// until the last clone of the snapshot is dropped.
#[derive(Debug, Clone)]
pub struct AttributeSnapshot {
    shared: Arc<AttributeShared>,
    data: Arc<AttributeData>,
}

impl AttributeSnapshot {
    pub(crate) fn new(shared: Arc<AttributeShared>, data: Arc<AttributeData>) -> Self {
        Self { shared, data }
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.data.generation
    }

    /// A retention token for this snapshot's generation.
    pub fn guard(&self) -> AttributeGuard {
        AttributeGuard::new(Arc::clone(&self.data))
    }

    /// A retention token for this snapshot's generation that also keeps enum
    /// handles of the live attribute stable while held.
    ///
    /// `None` if the dictionary was compacted after this snapshot was taken:
    /// its handles no longer match the live attribute.
    pub fn enum_guard(&self) -> Option<AttributeEnumGuard> {
        let pin = self.shared.pins.pin();
        (self.shared.pins.epoch() == self.data.dictionary_epoch)
            .then(|| AttributeEnumGuard::new(self.guard(), pin))
    }
}

impl AttributeRead for AttributeSnapshot {
    fn name(&self) -> &str {
        &self.shared.name
    }

    fn config(&self) -> AttributeConfig {
        self.shared.config
    }

    fn num_docs(&self) -> u32 {
        self.data.num_docs()
    }

    fn max_value_count(&self) -> u32 {
        self.data.max_value_count
    }

    fn visit_values(&self, doc: DocId, f: &mut dyn FnMut(&Entry)) -> u32 {
        self.data.visit(doc, f)
    }

    fn find_enum(&self, value: &str) -> Option<EnumHandle> {
        self.data.find_enum(self.shared.config.basic_type(), value)
    }

    fn string_from_enum(&self, handle: EnumHandle) -> Option<Arc<str>> {
        self.data.string_from_enum(handle)
    }

    fn serialize_for_sort(
        &self,
        doc: DocId,
        order: SortOrder,
        buf: &mut [u8],
        converter: Option<&dyn BlobConverter>,
    ) -> Option<usize> {
        self.data
            .serialize_for_sort(self.shared.config, doc, order, buf, converter)
    }

    fn create_search_context(
        &self,
        term: &str,
        params: &SearchContextParams,
    ) -> Box<dyn SearchContext> {
        Box::new(AttributeSearchContext::new(self.clone(), term, params))
    }
}

/// Keeps one generation of an attribute vector from being reclaimed.
///
/// A guard gives no access to values; read through the vector or a snapshot.
#[derive(Debug)]
#[must_use = "The generation is only retained while the guard is held"]
pub struct AttributeGuard {
    data: Arc<AttributeData>,
}

impl AttributeGuard {
    pub(crate) fn new(data: Arc<AttributeData>) -> Self {
        Self { data }
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.data.generation
    }
}

/// An [`AttributeGuard`] that also defers enum dictionary compaction, so enum
/// handles read while it is held remain valid for the live attribute.
#[derive(Debug)]
#[must_use = "Enum handles are only stable while the guard is held"]
pub struct AttributeEnumGuard {
    guard: AttributeGuard,
    _pin: EnumPin,
}

impl AttributeEnumGuard {
    pub(crate) fn new(guard: AttributeGuard, pin: EnumPin) -> Self {
        Self { guard, _pin: pin }
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.guard.generation()
    }
}
