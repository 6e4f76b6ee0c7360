use crate::{DocId, Weighted};

/// Direct dictionary to weighted-postings access for weighted set attributes.
///
/// Only attributes that physically store their values offer this; see
/// [`crate::AttributeRead::as_document_weight_attribute`].
pub trait DocumentWeightAttribute: Send + Sync {
    /// Number of distinct values in the dictionary.
    fn dictionary_size(&self) -> usize;

    /// Documents holding `term`, ordered by document id, with the stored weight.
    /// `None` if the term is not in the dictionary.
    fn lookup(&self, term: &str) -> Option<Vec<Weighted<DocId>>>;
}
