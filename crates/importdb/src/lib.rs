#![doc = include_str!("../README.md")]

pub use attrdb::*;

mod guard;
mod imported;
mod search_context;

pub use guard::*;
pub use imported::*;
pub use search_context::*;
