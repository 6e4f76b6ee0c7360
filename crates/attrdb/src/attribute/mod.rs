use std::{ops::Range, sync::Arc};

use arc_swap::ArcSwap;
use log::debug;
use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::{
    AttributeConfig, AttributeRead, AttributeSearchContext, BasicType, BlobConverter,
    CollectionType, DocId, DocumentWeightAttribute, EnumHandle, Entry, Error, Generation, NO_DOC,
    Result, Scalar, SearchContext, SearchContextParams, SortOrder, Weighted,
    column::CowColumn, enum_pin::EnumPins, enum_store::EnumStore, generation::GenerationTracker,
    serialize_sort_key,
};

mod snapshot;

pub use snapshot::*;

/// Values of one document. Single-value documents stay inline.
pub(crate) type DocEntries = SmallVec<[Entry; 1]>;

/// Attribute vector: per-document values of one field, stored in memory.
///
/// Readers are lock-free. Every read either loads the latest published
/// generation ([`AttributeRead`] on the vector itself) or works against a
/// pinned one ([`AttributeVector::snapshot`]). Updates go to a private
/// working copy and become visible on [`AttributeVector::commit`].
///
/// Document id 0 is reserved and always reads as undefined.
#[derive(Debug)]
pub struct AttributeVector {
    shared: Arc<AttributeShared>,
    current: ArcSwap<AttributeData>,
    writer: Mutex<AttributeWriter>,
}

/// Identity of a vector, shared with its snapshots.
#[derive(Debug)]
pub(crate) struct AttributeShared {
    pub(crate) name: String,
    pub(crate) config: AttributeConfig,
    pub(crate) pins: Arc<EnumPins>,
}

/// One published generation.
#[derive(Debug)]
pub(crate) struct AttributeData {
    pub(crate) generation: Generation,
    docs: CowColumn<DocEntries>,
    enum_store: Arc<EnumStore>,
    /// Compactions the dictionary of this generation has gone through.
    pub(crate) dictionary_epoch: u64,
    pub(crate) max_value_count: u32,
}

impl AttributeData {
    #[inline]
    pub(crate) fn num_docs(&self) -> u32 {
        self.docs.len() as u32
    }

    #[inline]
    fn entries(&self, doc: DocId) -> &[Entry] {
        match self.docs.get(doc as usize) {
            Some(entries) => entries.as_slice(),
            None => &[],
        }
    }

    pub(crate) fn visit(&self, doc: DocId, f: &mut dyn FnMut(&Entry)) -> u32 {
        let entries = self.entries(doc);
        entries.iter().for_each(|e| f(e));
        entries.len() as u32
    }

    pub(crate) fn find_enum(&self, basic_type: BasicType, value: &str) -> Option<EnumHandle> {
        self.enum_store.find_str(basic_type, value)
    }

    pub(crate) fn string_from_enum(&self, handle: EnumHandle) -> Option<Arc<str>> {
        self.enum_store.get(handle).map(Scalar::as_arc_str)
    }

    pub(crate) fn serialize_for_sort(
        &self,
        config: AttributeConfig,
        doc: DocId,
        order: SortOrder,
        buf: &mut [u8],
        converter: Option<&dyn BlobConverter>,
    ) -> Option<usize> {
        serialize_sort_key(config, self.entries(doc), order, buf, converter)
    }

    fn postings(&self, basic_type: BasicType, term: &str) -> Option<Vec<Weighted<DocId>>> {
        let handle = self.find_enum(basic_type, term)?;
        let postings = self
            .docs
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(doc, entries)| {
                entries
                    .iter()
                    .find(|e| e.handle() == handle)
                    .map(|e| Weighted::new(doc as DocId, e.weight()))
            })
            .collect();
        Some(postings)
    }
}

/// State owned by the ingestion path.
#[derive(Debug, Default)]
struct AttributeWriter {
    docs: CowColumn<DocEntries>,
    enum_store: Arc<EnumStore>,
    generation: Generation,
    dictionary_epoch: u64,
    max_value_count: u32,
    tracker: GenerationTracker<AttributeData>,
    dirty: bool,
}

impl AttributeWriter {
    fn check_doc(&self, doc: DocId) -> Result<()> {
        if doc == NO_DOC {
            return Err(Error::ReservedDocId);
        }
        if doc as usize >= self.docs.len() {
            return Err(Error::DocIdOutOfRange {
                doc,
                num_docs: self.docs.len() as u32,
            });
        }
        Ok(())
    }

    fn default_entries(&mut self, config: AttributeConfig) -> DocEntries {
        match config.collection_type() {
            CollectionType::Single => {
                let value = Scalar::undefined(config.basic_type());
                let mut entries = DocEntries::new();
                entries.push(Entry::new(value, 1, EnumHandle::INVALID));
                self.enumerate(config, &mut entries);
                entries
            }
            _ => DocEntries::new(),
        }
    }

    fn enumerate(&mut self, config: AttributeConfig, entries: &mut DocEntries) {
        if !config.is_enumerated() || entries.is_empty() {
            return;
        }
        let store = Arc::make_mut(&mut self.enum_store);
        for e in entries.iter_mut() {
            e.set_handle(store.insert(e.value()));
        }
    }

    fn push_doc(&mut self, config: AttributeConfig) -> DocId {
        let doc = self.docs.len() as DocId;
        let entries = self.default_entries(config);
        self.docs.push(entries);
        self.dirty = true;
        doc
    }

    fn store(&mut self, config: AttributeConfig, doc: DocId, mut entries: DocEntries) {
        self.enumerate(config, &mut entries);
        self.max_value_count = self.max_value_count.max(entries.len() as u32);
        self.docs.set(doc as usize, entries);
        self.dirty = true;
    }

    fn freeze(&self) -> AttributeData {
        AttributeData {
            generation: self.generation,
            docs: self.docs.clone(),
            enum_store: Arc::clone(&self.enum_store),
            dictionary_epoch: self.dictionary_epoch,
            max_value_count: self.max_value_count,
        }
    }

    fn publish_next(&mut self) -> Arc<AttributeData> {
        self.generation = self.generation.next();
        let data = Arc::new(self.freeze());
        self.tracker.publish(self.generation, &data);
        self.dirty = false;
        data
    }
}

impl AttributeVector {
    pub fn new(name: impl Into<String>, config: AttributeConfig) -> Self {
        let shared = Arc::new(AttributeShared {
            name: name.into(),
            config,
            pins: Arc::new(EnumPins::default()),
        });

        let mut writer = AttributeWriter {
            max_value_count: u32::from(config.collection_type() == CollectionType::Single),
            ..Default::default()
        };
        writer.push_doc(config);
        let data = Arc::new(writer.freeze());
        writer.tracker.publish(writer.generation, &data);
        writer.dirty = false;

        Self {
            shared,
            current: ArcSwap::new(data),
            writer: Mutex::new(writer),
        }
    }

    #[inline]
    fn config_ref(&self) -> AttributeConfig {
        self.shared.config
    }

    /// Appends a document holding the default value. Visible after the next commit.
    pub fn add_doc(&self) -> DocId {
        self.writer.lock().push_doc(self.config_ref())
    }

    /// Appends `count` documents, returning their ids.
    pub fn add_docs(&self, count: u32) -> Range<DocId> {
        let config = self.config_ref();
        let mut writer = self.writer.lock();
        let start = writer.docs.len() as DocId;
        (0..count).for_each(|_| {
            writer.push_doc(config);
        });
        start..start + count
    }

    /// Assigns the value of a single-value document.
    pub fn set(&self, doc: DocId, value: impl Into<Scalar>) -> Result<()> {
        self.assign(
            doc,
            CollectionType::Single,
            vec![Weighted::new(value.into(), 1)],
        )
    }

    /// Replaces the values of an array document, keeping their order.
    pub fn set_array<V: Into<Scalar>>(
        &self,
        doc: DocId,
        values: impl IntoIterator<Item = V>,
    ) -> Result<()> {
        let values = values
            .into_iter()
            .map(|v| Weighted::new(v.into(), 1))
            .collect();
        self.assign(doc, CollectionType::Array, values)
    }

    /// Replaces the values of a weighted set document.
    ///
    /// Values keep the position of their first occurrence; a repeated value
    /// takes the last weight given for it.
    pub fn set_weighted_set<V: Into<Scalar>>(
        &self,
        doc: DocId,
        values: impl IntoIterator<Item = (V, i32)>,
    ) -> Result<()> {
        let values = values
            .into_iter()
            .map(|(v, weight)| Weighted::new(v.into(), weight))
            .collect();
        self.assign(doc, CollectionType::WeightedSet, values)
    }

    /// Resets `doc` to the default value.
    pub fn clear_doc(&self, doc: DocId) -> Result<()> {
        let config = self.config_ref();
        let mut writer = self.writer.lock();
        writer.check_doc(doc)?;
        let entries = writer.default_entries(config);
        writer.store(config, doc, entries);
        Ok(())
    }

    fn assign(
        &self,
        doc: DocId,
        collection_type: CollectionType,
        values: Vec<Weighted<Scalar>>,
    ) -> Result<()> {
        let config = self.config_ref();
        if collection_type != config.collection_type() {
            return Err(Error::CollectionMismatch {
                attribute: self.shared.name.clone(),
                expected: config.collection_type(),
                found: collection_type,
            });
        }

        let mut entries = DocEntries::with_capacity(values.len());
        for Weighted { value, weight } in values {
            let value = self.normalize(value)?;
            if collection_type == CollectionType::WeightedSet {
                let key = value.key();
                if let Some(existing) = entries.iter_mut().find(|e| e.value().key() == key) {
                    existing.set_weight(weight);
                    continue;
                }
            }
            entries.push(Entry::new(value, weight, EnumHandle::INVALID));
        }

        let mut writer = self.writer.lock();
        writer.check_doc(doc)?;
        writer.store(config, doc, entries);
        Ok(())
    }

    fn normalize(&self, value: Scalar) -> Result<Scalar> {
        let basic_type = self.config_ref().basic_type();
        match (basic_type, value) {
            (BasicType::String, v @ Scalar::Str(_)) => Ok(v),
            (BasicType::Double, v @ Scalar::Float(_)) => Ok(v),
            (BasicType::Float, Scalar::Float(v)) => Ok(Scalar::Float(v as f32 as f64)),
            (t, Scalar::Int(v)) if t.is_integer() => {
                let (low, high) = t.int_range();
                if v < low || v > high {
                    return Err(Error::ValueOutOfRange {
                        value: v,
                        basic_type: t,
                    });
                }
                Ok(Scalar::Int(v))
            }
            (BasicType::Float, Scalar::Int(v)) => Ok(Scalar::Float(v as f32 as f64)),
            (BasicType::Double, Scalar::Int(v)) => Ok(Scalar::Float(v as f64)),
            (t, v) => Err(Error::TypeMismatch {
                attribute: self.shared.name.clone(),
                expected: t,
                found: v.kind(),
            }),
        }
    }

    /// Publishes pending updates as a new generation.
    ///
    /// Returns the generation now visible to readers. Without pending updates
    /// nothing is published.
    pub fn commit(&self) -> Generation {
        let mut writer = self.writer.lock();
        if !writer.dirty {
            return writer.generation;
        }
        let data = writer.publish_next();
        self.current.store(data);
        debug!(
            "{}: published generation {} ({} docs)",
            self.shared.name,
            writer.generation,
            writer.docs.len()
        );
        writer.generation
    }

    /// Rebuilds the enum dictionary from the values in use, in value order,
    /// and publishes it together with any pending updates.
    ///
    /// Every enum handle changes, so nothing is published while an enum guard
    /// is held; returns `false` in that case and for non-enumerated attributes.
    pub fn compact_enum_store(&self) -> bool {
        let config = self.config_ref();
        if !config.is_enumerated() {
            return false;
        }

        let mut writer = self.writer.lock();
        let store = EnumStore::compacted(
            writer
                .docs
                .iter()
                .flat_map(|entries| entries.iter().map(Entry::value)),
        );
        let mut docs = writer.docs.clone();
        for doc in 0..docs.len() {
            if let Some(entries) = docs.get_mut(doc) {
                for e in entries.iter_mut() {
                    e.set_handle(store.find(e.value()).unwrap_or(EnumHandle::INVALID));
                }
            }
        }

        let generation = writer.generation.next();
        let enum_store = Arc::new(store);
        let data = Arc::new(AttributeData {
            generation,
            docs: docs.clone(),
            enum_store: Arc::clone(&enum_store),
            dictionary_epoch: writer.dictionary_epoch + 1,
            max_value_count: writer.max_value_count,
        });

        if self
            .shared
            .pins
            .try_publish(|| self.current.store(Arc::clone(&data)))
            .is_none()
        {
            debug!(
                "{}: enum store compaction deferred, {} enum guard(s) held",
                self.shared.name,
                self.shared.pins.count()
            );
            return false;
        }

        writer.docs = docs;
        writer.enum_store = enum_store;
        writer.dictionary_epoch = data.dictionary_epoch;
        writer.generation = generation;
        writer.tracker.publish(generation, &data);
        writer.dirty = false;
        debug!(
            "{}: compacted enum store to {} values at generation {}",
            self.shared.name,
            data.enum_store.len(),
            generation
        );
        true
    }

    /// Latest published generation.
    pub fn generation(&self) -> Generation {
        self.current.load().generation
    }

    /// Oldest generation still pinned by a guard or snapshot.
    pub fn oldest_used_generation(&self) -> Generation {
        let mut writer = self.writer.lock();
        let current = writer.generation;
        writer.tracker.oldest_used(current)
    }

    /// Pins the latest generation for reading.
    pub fn snapshot(&self) -> AttributeSnapshot {
        AttributeSnapshot::new(Arc::clone(&self.shared), self.current.load_full())
    }

    /// Retains the latest generation without giving access to it.
    pub fn acquire_guard(&self) -> AttributeGuard {
        AttributeGuard::new(self.current.load_full())
    }

    /// Like [`AttributeVector::acquire_guard`], and additionally keeps enum
    /// handles stable until the guard is dropped.
    ///
    /// Never waits on readers. It waits on the writer only while a compaction
    /// is storing its generation.
    pub fn acquire_enum_guard(&self) -> AttributeEnumGuard {
        let pin = self.shared.pins.pin();
        AttributeEnumGuard::new(AttributeGuard::new(self.current.load_full()), pin)
    }

    /// Pins the latest generation for reading together with an enum guard of
    /// that same generation. Handles read through the snapshot stay valid for
    /// the live vector while the guard is held.
    pub fn enum_snapshot(&self) -> (AttributeSnapshot, AttributeEnumGuard) {
        let pin = self.shared.pins.pin();
        let data = self.current.load_full();
        let guard = AttributeEnumGuard::new(AttributeGuard::new(Arc::clone(&data)), pin);
        (AttributeSnapshot::new(Arc::clone(&self.shared), data), guard)
    }
}

impl AttributeRead for AttributeVector {
    fn name(&self) -> &str {
        &self.shared.name
    }

    fn config(&self) -> AttributeConfig {
        self.shared.config
    }

    fn num_docs(&self) -> u32 {
        self.current.load().num_docs()
    }

    fn max_value_count(&self) -> u32 {
        self.current.load().max_value_count
    }

    fn visit_values(&self, doc: DocId, f: &mut dyn FnMut(&Entry)) -> u32 {
        self.current.load().visit(doc, f)
    }

    fn find_enum(&self, value: &str) -> Option<EnumHandle> {
        self.current
            .load()
            .find_enum(self.shared.config.basic_type(), value)
    }

    fn string_from_enum(&self, handle: EnumHandle) -> Option<Arc<str>> {
        self.current.load().string_from_enum(handle)
    }

    fn serialize_for_sort(
        &self,
        doc: DocId,
        order: SortOrder,
        buf: &mut [u8],
        converter: Option<&dyn BlobConverter>,
    ) -> Option<usize> {
        self.current
            .load()
            .serialize_for_sort(self.shared.config, doc, order, buf, converter)
    }

    fn create_search_context(
        &self,
        term: &str,
        params: &SearchContextParams,
    ) -> Box<dyn SearchContext> {
        Box::new(AttributeSearchContext::new(self.snapshot(), term, params))
    }

    fn as_document_weight_attribute(&self) -> Option<&dyn DocumentWeightAttribute> {
        if self.shared.config.supports_document_weight() {
            Some(self)
        } else {
            None
        }
    }
}

impl DocumentWeightAttribute for AttributeVector {
    fn dictionary_size(&self) -> usize {
        self.current.load().enum_store.len()
    }

    fn lookup(&self, term: &str) -> Option<Vec<Weighted<DocId>>> {
        self.current
            .load()
            .postings(self.shared.config.basic_type(), term)
    }
}
