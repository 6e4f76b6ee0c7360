mod context;
mod term;

pub use context::*;

use crate::DocId;

/// Options for building a search context.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchContextParams {
    cased: bool,
}

impl SearchContextParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match string terms case sensitively.
    pub fn with_cased(mut self, cased: bool) -> Self {
        self.cased = cased;
        self
    }

    #[inline]
    pub fn cased(&self) -> bool {
        self.cased
    }
}

/// Matches one query term against the documents of an attribute.
///
/// A context is built against a pinned generation, so its answers do not
/// change while it is alive.
pub trait SearchContext: Send + Sync {
    fn attribute_name(&self) -> &str;

    /// False if the term could not be parsed for the attribute's type.
    /// An invalid context matches nothing.
    fn is_valid(&self) -> bool;

    /// Documents are addressed in `[0, doc_id_limit)`.
    fn doc_id_limit(&self) -> DocId;

    /// The match weight if `doc` matches.
    fn matches(&self, doc: DocId) -> Option<i32>;

    /// Upper bound on the number of hits.
    fn approximate_hits(&self) -> usize {
        self.doc_id_limit() as usize
    }

    /// Prepares for iteration. A strict caller will visit every hit in order.
    fn fetch_postings(&mut self, _strict: bool) {}

    /// First hit at or after `from`.
    fn seek(&self, from: DocId) -> Option<(DocId, i32)> {
        (from.max(1)..self.doc_id_limit()).find_map(|doc| self.matches(doc).map(|w| (doc, w)))
    }
}

impl dyn SearchContext + '_ {
    /// Iterates every hit in document id order.
    pub fn hits(&self) -> Hits<'_> {
        Hits {
            context: self,
            next: 1,
        }
    }
}

/// Iterator over the hits of a [`SearchContext`].
pub struct Hits<'a> {
    context: &'a dyn SearchContext,
    next: DocId,
}

impl Iterator for Hits<'_> {
    type Item = (DocId, i32);

    fn next(&mut self) -> Option<Self::Item> {
        let (doc, weight) = self.context.seek(self.next)?;
        self.next = doc + 1;
        Some((doc, weight))
    }
}
