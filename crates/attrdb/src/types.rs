use std::fmt;

/// Document id within one document type's id space.
pub type DocId = u32;

/// Reserved document id meaning "no document".
pub const NO_DOC: DocId = 0;

/// Small integer referencing a deduplicated value in an attribute's enum dictionary.
///
/// Handles are only meaningful together with the dictionary that produced them.
/// They stay stable until the dictionary is compacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumHandle(u32);

impl EnumHandle {
    pub const INVALID: Self = Self(u32::MAX);

    pub const fn new(handle: u32) -> Self {
        Self(handle)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for EnumHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Stable identity of a document across target id reuse.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalId([u8; 12]);

impl GlobalId {
    pub const fn new(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl From<u64> for GlobalId {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 12];
        bytes[..8].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|b| write!(f, "{b:02x}"))
    }
}

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BasicType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    String,
}

impl BasicType {
    /// Width in bytes of one value, 0 for variable width types.
    pub const fn fixed_width(self) -> usize {
        match self {
            Self::Int8 => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float => 4,
            Self::Int64 | Self::Double => 8,
            Self::String => 0,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_floating_point(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Sentinel returned by integer reads of a missing value.
    pub const fn undefined_int(self) -> i64 {
        match self {
            Self::Int8 => i8::MIN as i64,
            Self::Int16 => i16::MIN as i64,
            Self::Int32 => i32::MIN as i64,
            _ => i64::MIN,
        }
    }

    /// Inclusive range of storable integers.
    pub(crate) const fn int_range(self) -> (i64, i64) {
        match self {
            Self::Int8 => (i8::MIN as i64, i8::MAX as i64),
            Self::Int16 => (i16::MIN as i64, i16::MAX as i64),
            Self::Int32 => (i32::MIN as i64, i32::MAX as i64),
            _ => (i64::MIN, i64::MAX),
        }
    }
}

/// How many values a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionType {
    Single,
    Array,
    WeightedSet,
}

impl CollectionType {
    pub const fn is_multi_value(self) -> bool {
        !matches!(self, Self::Single)
    }
}

/// A value with its weighted-set weight. Non weighted values carry weight 1.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Weighted<T> {
    pub value: T,
    pub weight: i32,
}

impl<T> Weighted<T> {
    pub const fn new(value: T, weight: i32) -> Self {
        Self { value, weight }
    }
}
