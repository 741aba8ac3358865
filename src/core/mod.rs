pub mod error;
pub mod result;

pub use error::{Error, Result};
pub use result::{DetailLevel, Label, LabeledText, Report, SequenceResult};
