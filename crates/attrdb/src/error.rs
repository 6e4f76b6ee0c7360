use std::result;

use thiserror::Error;

use crate::{BasicType, CollectionType, DocId};

pub type Result<T, E = Error> = result::Result<T, E>;

/// Error types for attribute updates.
///
/// Only the ingestion path can fail. Reads never return errors: a document
/// without a value reads as the undefined value of its type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Document id {doc} is out of range (num docs: {num_docs})")]
    DocIdOutOfRange { doc: DocId, num_docs: u32 },

    #[error("Document id 0 is reserved")]
    ReservedDocId,

    // Value errors
    #[error("Attribute '{attribute}' holds {expected:?} values, got {found}")]
    TypeMismatch {
        attribute: String,
        expected: BasicType,
        found: &'static str,
    },

    #[error("Value {value} does not fit in {basic_type:?}")]
    ValueOutOfRange { value: i64, basic_type: BasicType },

    #[error("Attribute '{attribute}' is {expected:?}, update was for {found:?}")]
    CollectionMismatch {
        attribute: String,
        expected: CollectionType,
        found: CollectionType,
    },
}
