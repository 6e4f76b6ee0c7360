use crate::{AttributeRead, AttributeSnapshot, CollectionType, DocId, SearchContext, SearchContextParams};

use super::term::Matcher;

/// Search context over the values a native attribute stores.
///
/// Holds an [`AttributeSnapshot`], so the generation it matches against stays
/// retained for the context's lifetime.
pub struct AttributeSearchContext {
    snapshot: AttributeSnapshot,
    matcher: Matcher,
}

impl AttributeSearchContext {
    pub fn new(snapshot: AttributeSnapshot, term: &str, params: &SearchContextParams) -> Self {
        let matcher = Matcher::parse(term, snapshot.basic_type(), params);
        Self { snapshot, matcher }
    }
}

impl SearchContext for AttributeSearchContext {
    fn attribute_name(&self) -> &str {
        self.snapshot.name()
    }

    fn is_valid(&self) -> bool {
        self.matcher.is_valid()
    }

    fn doc_id_limit(&self) -> DocId {
        self.snapshot.num_docs()
    }

    fn matches(&self, doc: DocId) -> Option<i32> {
        if !self.matcher.is_valid() {
            return None;
        }
        let collection = self.snapshot.collection_type();
        let mut hits = 0;
        let mut weight = None;
        self.snapshot.visit_values(doc, &mut |e| {
            if self.matcher.matches(e.value()) {
                hits += 1;
                if weight.is_none() {
                    weight = Some(e.weight());
                }
            }
        });
        match collection {
            _ if hits == 0 => None,
            CollectionType::Single => Some(1),
            CollectionType::Array => Some(hits),
            CollectionType::WeightedSet => weight,
        }
    }
}
