use std::ops::{Bound, RangeBounds};

use crate::{BasicType, Scalar, SearchContextParams};

/// A query term compiled for one attribute type.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Matcher {
    Int {
        low: i64,
        high: i64,
        undefined: i64,
    },
    Float {
        low: Bound<f64>,
        high: Bound<f64>,
    },
    Word {
        word: String,
        cased: bool,
    },
    Prefix {
        prefix: String,
        cased: bool,
    },
    Invalid,
}

impl Matcher {
    pub(crate) fn parse(term: &str, basic_type: BasicType, params: &SearchContextParams) -> Self {
        let parsed = match basic_type {
            BasicType::String => Self::parse_string(term, params.cased()),
            BasicType::Float => {
                Self::parse_float(term.trim(), |s| s.parse::<f32>().ok().map(f64::from))
            }
            BasicType::Double => Self::parse_float(term.trim(), |s| s.parse::<f64>().ok()),
            t => Self::parse_int(term.trim(), t.undefined_int()),
        };
        parsed.unwrap_or(Self::Invalid)
    }

    fn parse_string(term: &str, cased: bool) -> Option<Self> {
        let fold = |s: &str| if cased { s.to_owned() } else { s.to_lowercase() };
        Some(match term.strip_suffix('*') {
            Some(prefix) => Self::Prefix {
                prefix: fold(prefix),
                cased,
            },
            None => Self::Word {
                word: fold(term),
                cased,
            },
        })
    }

    fn parse_int(term: &str, undefined: i64) -> Option<Self> {
        let (low, high) = parse_bounds(term, |s| s.parse::<i64>().ok())?;
        let low = match low {
            Bound::Included(v) => v,
            Bound::Excluded(v) => v.checked_add(1)?,
            Bound::Unbounded => i64::MIN,
        };
        let high = match high {
            Bound::Included(v) => v,
            Bound::Excluded(v) => v.checked_sub(1)?,
            Bound::Unbounded => i64::MAX,
        };
        Some(Self::Int {
            low,
            high,
            undefined,
        })
    }

    /// Bounds are parsed at the precision values are stored with.
    fn parse_float(term: &str, parse: impl Fn(&str) -> Option<f64>) -> Option<Self> {
        let (low, high) = parse_bounds(term, parse)?;
        Some(Self::Float { low, high })
    }

    pub(crate) fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid)
    }

    pub(crate) fn matches(&self, value: &Scalar) -> bool {
        match self {
            Self::Int {
                low,
                high,
                undefined,
            } => {
                let v = value.as_int();
                v != *undefined && (*low..=*high).contains(&v)
            }
            Self::Float { low, high } => {
                let v = value.as_float();
                !v.is_nan() && (*low, *high).contains(&v)
            }
            Self::Word { word, cased } => fold_eq(value, *cased, |s| s == word),
            Self::Prefix { prefix, cased } => {
                fold_eq(value, *cased, |s| s.starts_with(prefix.as_str()))
            }
            Self::Invalid => false,
        }
    }
}

fn fold_eq(value: &Scalar, cased: bool, pred: impl FnOnce(&str) -> bool) -> bool {
    let text = value.as_arc_str();
    if cased {
        pred(&text)
    } else {
        pred(&text.to_lowercase())
    }
}

/// Parses `v`, `<v`, `>v` and `[low;high]` (either side may be empty).
fn parse_bounds<T: Copy>(
    term: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<(Bound<T>, Bound<T>)> {
    if let Some(rest) = term.strip_prefix('<') {
        return Some((Bound::Unbounded, Bound::Excluded(parse(rest.trim())?)));
    }
    if let Some(rest) = term.strip_prefix('>') {
        return Some((Bound::Excluded(parse(rest.trim())?), Bound::Unbounded));
    }
    if let Some(inner) = term.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let (low, high) = inner.split_once(';')?;
        let side = |s: &str| -> Option<Bound<T>> {
            let s = s.trim();
            if s.is_empty() {
                Some(Bound::Unbounded)
            } else {
                Some(Bound::Included(parse(s)?))
            }
        };
        return Some((side(low)?, side(high)?));
    }
    let v = parse(term)?;
    Some((Bound::Included(v), Bound::Included(v)))
}
