use std::sync::Arc;

use crate::{
    AttributeConfig, BasicType, BlobConverter, CollectionType, DocId, DocumentWeightAttribute,
    EnumHandle, Entry, FromEntry, SearchContext, SearchContextParams, SortOrder,
};

/// Per-document read access to an attribute.
///
/// Implementors provide one primitive, [`AttributeRead::visit_values`], plus
/// dictionary and introspection hooks. Every typed getter is derived from that
/// primitive, so a proxy only has to translate the document id once.
///
/// All reads are infallible. A document without values reads as undefined:
/// integer getters return [`BasicType::undefined_int`], float getters NaN,
/// string getters the empty string, enum getters [`EnumHandle::INVALID`], and
/// multi-value getters a count of 0.
pub trait AttributeRead: Send + Sync {
    // Required

    fn name(&self) -> &str;

    fn config(&self) -> AttributeConfig;

    /// Size of the document id space this attribute is addressed in.
    fn num_docs(&self) -> u32;

    /// Largest value count any document has had.
    fn max_value_count(&self) -> u32;

    /// Calls `f` for each value of `doc` in stored order and returns the count.
    fn visit_values(&self, doc: DocId, f: &mut dyn FnMut(&Entry)) -> u32;

    fn find_enum(&self, value: &str) -> Option<EnumHandle>;

    fn string_from_enum(&self, handle: EnumHandle) -> Option<Arc<str>>;

    /// Writes the sort key of `doc` into `buf`. See [`crate::serialize_sort_key`].
    fn serialize_for_sort(
        &self,
        doc: DocId,
        order: SortOrder,
        buf: &mut [u8],
        converter: Option<&dyn BlobConverter>,
    ) -> Option<usize>;

    fn create_search_context(
        &self,
        term: &str,
        params: &SearchContextParams,
    ) -> Box<dyn SearchContext>;

    // Provided

    fn as_document_weight_attribute(&self) -> Option<&dyn DocumentWeightAttribute> {
        None
    }

    #[inline]
    fn basic_type(&self) -> BasicType {
        self.config().basic_type()
    }

    #[inline]
    fn collection_type(&self) -> CollectionType {
        self.config().collection_type()
    }

    #[inline]
    fn fixed_width(&self) -> usize {
        self.basic_type().fixed_width()
    }

    #[inline]
    fn has_enum(&self) -> bool {
        self.config().is_enumerated()
    }

    fn value_count(&self, doc: DocId) -> u32 {
        self.visit_values(doc, &mut |_| {})
    }

    fn get_int(&self, doc: DocId) -> i64 {
        let mut first = None;
        self.visit_values(doc, &mut |e| {
            if first.is_none() {
                first = Some(e.value().as_int());
            }
        });
        first.unwrap_or_else(|| self.basic_type().undefined_int())
    }

    fn get_float(&self, doc: DocId) -> f64 {
        let mut first = None;
        self.visit_values(doc, &mut |e| {
            if first.is_none() {
                first = Some(e.value().as_float());
            }
        });
        first.unwrap_or(f64::NAN)
    }

    fn get_enum(&self, doc: DocId) -> EnumHandle {
        let mut first = None;
        self.visit_values(doc, &mut |e| {
            if first.is_none() {
                first = Some(e.handle());
            }
        });
        first.unwrap_or(EnumHandle::INVALID)
    }

    fn get_str(&self, doc: DocId) -> Arc<str> {
        let mut first = None;
        self.visit_values(doc, &mut |e| {
            if first.is_none() {
                first = Some(e.value().as_arc_str());
            }
        });
        first.unwrap_or_default()
    }

    /// Copies the first value of `doc` as UTF-8 into `buf`, never past its end.
    ///
    /// Returns the full length of the value; a result larger than `buf.len()`
    /// means the copy was truncated.
    fn get_string(&self, doc: DocId, buf: &mut [u8]) -> usize {
        let value = self.get_str(doc);
        let bytes = value.as_bytes();
        let n = bytes.len().min(buf.len());
        buf[..n].copy_from_slice(&bytes[..n]);
        bytes.len()
    }
}

/// Typed multi-value reads, available on every [`AttributeRead`].
pub trait AttributeReadExt: AttributeRead {
    /// Fills `buf` with up to `buf.len()` values of `doc` in stored order and
    /// returns the document's true value count.
    ///
    /// A count larger than `buf.len()` signals truncation; re-query with a
    /// larger buffer to get every value.
    fn get<T: FromEntry>(&self, doc: DocId, buf: &mut [T]) -> u32 {
        let mut i = 0;
        self.visit_values(doc, &mut |e| {
            if let Some(slot) = buf.get_mut(i) {
                *slot = T::from_entry(e);
            }
            i += 1;
        })
    }

    /// Collects every value of `doc`.
    fn get_all<T: FromEntry>(&self, doc: DocId) -> Vec<T> {
        let mut values = Vec::new();
        self.visit_values(doc, &mut |e| values.push(T::from_entry(e)));
        values
    }
}

impl<A: AttributeRead + ?Sized> AttributeReadExt for A {}
