use std::{cmp::Ordering, fmt, sync::Arc};

use crate::{BasicType, EnumHandle, Weighted};

/// One stored attribute value.
#[derive(Debug, Clone)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(Arc<str>),
}

impl Scalar {
    /// The value a document reads as before anything was assigned to it.
    pub fn undefined(basic_type: BasicType) -> Self {
        match basic_type {
            BasicType::Int8 | BasicType::Int16 | BasicType::Int32 | BasicType::Int64 => {
                Self::Int(basic_type.undefined_int())
            }
            BasicType::Float | BasicType::Double => Self::Float(f64::NAN),
            BasicType::String => Self::Str(Arc::from("")),
        }
    }

    pub fn as_int(&self) -> i64 {
        match self {
            Self::Int(v) => *v,
            Self::Float(v) => *v as i64,
            Self::Str(s) => s.trim().parse().unwrap_or(0),
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Str(s) => s.trim().parse().unwrap_or(0.0),
        }
    }

    pub fn as_arc_str(&self) -> Arc<str> {
        match self {
            Self::Str(s) => Arc::clone(s),
            other => Arc::from(other.to_string()),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    pub(crate) fn key(&self) -> ScalarKey {
        match self {
            Self::Int(v) => ScalarKey::Int(*v),
            Self::Float(v) if v.is_nan() => ScalarKey::Float(f64::NAN.to_bits()),
            Self::Float(v) => ScalarKey::Float(v.to_bits()),
            Self::Str(s) => ScalarKey::Str(Arc::clone(s)),
        }
    }

    /// Total order used for dictionary layout and sort key selection.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Float(_) => 1,
            Self::Str(_) => 2,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Scalar {
            #[inline]
            fn from(value: $t) -> Self {
                Self::Int(value as i64)
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<Arc<str>> for Scalar {
    fn from(value: Arc<str>) -> Self {
        Self::Str(value)
    }
}

/// Hashable identity of a [`Scalar`]. NaNs collapse into one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ScalarKey {
    Int(i64),
    Float(u64),
    Str(Arc<str>),
}

/// A stored value as seen by readers: the value, its weight and its enum handle.
///
/// The handle is [`EnumHandle::INVALID`] for attributes without an enum dictionary.
#[derive(Debug, Clone)]
pub struct Entry {
    value: Scalar,
    weight: i32,
    handle: EnumHandle,
}

impl Entry {
    pub(crate) fn new(value: Scalar, weight: i32, handle: EnumHandle) -> Self {
        Self {
            value,
            weight,
            handle,
        }
    }

    #[inline]
    pub fn value(&self) -> &Scalar {
        &self.value
    }

    #[inline]
    pub fn weight(&self) -> i32 {
        self.weight
    }

    #[inline]
    pub fn handle(&self) -> EnumHandle {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: EnumHandle) {
        self.handle = handle;
    }

    pub(crate) fn set_weight(&mut self, weight: i32) {
        self.weight = weight;
    }
}

/// Buffer element kinds accepted by [`crate::AttributeReadExt::get`].
pub trait FromEntry: Sized {
    fn from_entry(entry: &Entry) -> Self;
}

impl FromEntry for i64 {
    #[inline]
    fn from_entry(entry: &Entry) -> Self {
        entry.value.as_int()
    }
}

impl FromEntry for f64 {
    #[inline]
    fn from_entry(entry: &Entry) -> Self {
        entry.value.as_float()
    }
}

impl FromEntry for String {
    fn from_entry(entry: &Entry) -> Self {
        entry.value.to_string()
    }
}

impl FromEntry for Arc<str> {
    #[inline]
    fn from_entry(entry: &Entry) -> Self {
        entry.value.as_arc_str()
    }
}

impl FromEntry for EnumHandle {
    #[inline]
    fn from_entry(entry: &Entry) -> Self {
        entry.handle
    }
}

impl<T: FromEntry> FromEntry for Weighted<T> {
    #[inline]
    fn from_entry(entry: &Entry) -> Self {
        Weighted::new(T::from_entry(entry), entry.weight)
    }
}
