use attrdb::{DocId, ReferenceMapping, ReferenceSnapshot, SearchContext};
use log::debug;
use rayon::prelude::*;

use crate::CompositeReadGuard;

/// Matches a term against imported values.
///
/// Local ids are translated through a pinned reference snapshot and matched by
/// a context over the target attribute; a local document without a resolved
/// target never matches.
pub struct ImportedSearchContext {
    name: String,
    _guard: CompositeReadGuard,
    mapping: ReferenceSnapshot,
    target: Box<dyn SearchContext>,
    /// Local hits in id order, after a strict [`SearchContext::fetch_postings`].
    postings: Option<Vec<(DocId, i32)>>,
}

impl ImportedSearchContext {
    pub fn new(
        name: String,
        guard: CompositeReadGuard,
        mapping: ReferenceSnapshot,
        target: Box<dyn SearchContext>,
    ) -> Self {
        Self {
            name,
            _guard: guard,
            mapping,
            target,
            postings: None,
        }
    }

    fn lookup_match(&self, lid: DocId) -> Option<i32> {
        self.mapping
            .lookup(lid)
            .and_then(|target_lid| self.target.matches(target_lid))
    }
}

impl SearchContext for ImportedSearchContext {
    fn attribute_name(&self) -> &str {
        &self.name
    }

    fn is_valid(&self) -> bool {
        self.target.is_valid()
    }

    fn doc_id_limit(&self) -> DocId {
        self.mapping.num_docs()
    }

    fn matches(&self, doc: DocId) -> Option<i32> {
        self.lookup_match(doc)
    }

    fn approximate_hits(&self) -> usize {
        match &self.postings {
            Some(postings) => postings.len(),
            None => self.doc_id_limit() as usize,
        }
    }

    fn fetch_postings(&mut self, strict: bool) {
        self.target.fetch_postings(strict);
        if !strict || self.postings.is_some() {
            return;
        }

        let postings: Vec<(DocId, i32)> = if self.target.is_valid() {
            (1..self.doc_id_limit())
                .into_par_iter()
                .filter_map(|lid| self.lookup_match(lid).map(|weight| (lid, weight)))
                .collect()
        } else {
            Vec::new()
        };
        debug!("{}: fetched {} local postings", self.name, postings.len());
        self.postings = Some(postings);
    }

    fn seek(&self, from: DocId) -> Option<(DocId, i32)> {
        match &self.postings {
            Some(postings) => {
                let i = postings.partition_point(|(doc, _)| *doc < from);
                postings.get(i).copied()
            }
            None => (from.max(1)..self.doc_id_limit())
                .find_map(|doc| self.lookup_match(doc).map(|weight| (doc, weight))),
        }
    }
}
