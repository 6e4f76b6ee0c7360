use crate::DocId;

/// Read contract of a local document id to target document id translation.
pub trait ReferenceMapping: Send + Sync {
    /// Target document of `lid`, or `None` if it is not linked to a live target.
    fn lookup(&self, lid: DocId) -> Option<DocId>;

    /// Size of the local document id space.
    fn num_docs(&self) -> u32;
}
