#![doc = include_str!("../README.md")]

mod attribute;
mod column;
mod config;
mod enum_pin;
mod enum_store;
mod error;
mod generation;
mod reference;
mod search;
mod sort;
mod traits;
mod types;
mod value;

pub use attribute::*;
pub use config::*;
pub use error::*;
pub use generation::Generation;
pub use reference::*;
pub use search::*;
pub use sort::*;
pub use traits::*;
pub use types::*;
pub use value::{Entry, FromEntry, Scalar};
