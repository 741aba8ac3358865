// Pipeline modules organized by functionality
pub mod sequence_classification;

pub use sequence_classification::*;
