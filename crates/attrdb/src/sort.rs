use std::borrow::Cow;

use crate::{AttributeConfig, BasicType, Entry, Scalar};

/// Direction of a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Transforms string bytes before they become a sort key (collation, case folding).
pub trait BlobConverter: Send + Sync {
    fn convert<'a>(&self, src: &'a [u8]) -> Cow<'a, [u8]>;
}

/// Writes the memcmp-comparable sort key of a document holding `values` into `buf`.
///
/// Multi-value documents sort by their smallest value when ascending and their
/// largest when descending; a document without values sorts as the undefined
/// value. Returns the key length, or `None` if `buf` is too small.
pub fn serialize_sort_key(
    config: AttributeConfig,
    values: &[Entry],
    order: SortOrder,
    buf: &mut [u8],
    converter: Option<&dyn BlobConverter>,
) -> Option<usize> {
    let selected = match order {
        SortOrder::Ascending => values.iter().map(Entry::value).min_by(|a, b| a.total_cmp(b)),
        SortOrder::Descending => values.iter().map(Entry::value).max_by(|a, b| a.total_cmp(b)),
    };
    let undefined;
    let value = match selected {
        Some(value) => value,
        None => {
            undefined = Scalar::undefined(config.basic_type());
            &undefined
        }
    };

    let len = match config.basic_type() {
        BasicType::String => write_string(value, buf, converter)?,
        BasicType::Float => write_fixed(&float_key(value.as_float() as f32), buf)?,
        BasicType::Double => write_fixed(&double_key(value.as_float()), buf)?,
        t => write_fixed(&int_key(value.as_int(), t.fixed_width()), buf)?,
    };

    if order == SortOrder::Descending {
        buf[..len].iter_mut().for_each(|b| *b = !*b);
    }
    Some(len)
}

fn write_fixed(key: &[u8], buf: &mut [u8]) -> Option<usize> {
    let dst = buf.get_mut(..key.len())?;
    dst.copy_from_slice(key);
    Some(key.len())
}

fn write_string(
    value: &Scalar,
    buf: &mut [u8],
    converter: Option<&dyn BlobConverter>,
) -> Option<usize> {
    let text = value.as_arc_str();
    let bytes = match converter {
        Some(converter) => converter.convert(text.as_bytes()),
        None => Cow::Borrowed(text.as_bytes()),
    };
    let len = bytes.len() + 1;
    let dst = buf.get_mut(..len)?;
    dst[..bytes.len()].copy_from_slice(&bytes);
    dst[bytes.len()] = 0;
    Some(len)
}

/// Big endian two's complement of `width` bytes with the sign bit flipped.
fn int_key(value: i64, width: usize) -> Vec<u8> {
    let bytes = (value as u64).to_be_bytes();
    let mut key = bytes[bytes.len() - width..].to_vec();
    key[0] ^= 0x80;
    key
}

fn float_key(value: f32) -> [u8; 4] {
    let bits = value.to_bits();
    let ordered = if bits >> 31 == 1 { !bits } else { bits | (1 << 31) };
    ordered.to_be_bytes()
}

fn double_key(value: f64) -> [u8; 8] {
    let bits = value.to_bits();
    let ordered = if bits >> 63 == 1 { !bits } else { bits | (1 << 63) };
    ordered.to_be_bytes()
}
