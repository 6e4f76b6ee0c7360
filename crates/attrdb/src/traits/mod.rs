mod document_weight;
mod read;
mod reference_mapping;

pub use document_weight::*;
pub use read::*;
pub use reference_mapping::*;
