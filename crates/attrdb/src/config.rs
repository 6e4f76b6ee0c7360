use crate::{BasicType, CollectionType};

/// Shape of an attribute vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeConfig {
    basic_type: BasicType,
    collection_type: CollectionType,
    /// Keep an enum dictionary over the stored values.
    fast_search: bool,
}

impl AttributeConfig {
    pub const fn new(basic_type: BasicType, collection_type: CollectionType) -> Self {
        Self {
            basic_type,
            collection_type,
            fast_search: false,
        }
    }

    pub const fn with_fast_search(mut self, fast_search: bool) -> Self {
        self.fast_search = fast_search;
        self
    }

    pub const fn with_collection_type(mut self, collection_type: CollectionType) -> Self {
        self.collection_type = collection_type;
        self
    }

    #[inline]
    pub const fn basic_type(&self) -> BasicType {
        self.basic_type
    }

    #[inline]
    pub const fn collection_type(&self) -> CollectionType {
        self.collection_type
    }

    #[inline]
    pub const fn fast_search(&self) -> bool {
        self.fast_search
    }

    /// String attributes are always enumerated.
    #[inline]
    pub const fn is_enumerated(&self) -> bool {
        self.fast_search || matches!(self.basic_type, BasicType::String)
    }

    /// Whether the document weight fast path can be offered for this shape.
    pub const fn supports_document_weight(&self) -> bool {
        matches!(self.collection_type, CollectionType::WeightedSet)
            && self.fast_search
            && (self.basic_type.is_integer() || matches!(self.basic_type, BasicType::String))
    }
}
