pub mod core;
pub mod models;
pub mod pipelines;
pub mod utils;

// Re-export core types
pub use crate::core::{DetailLevel, Error, Label, LabeledText, Report, Result, SequenceResult};

// Re-export the pipeline entry point and model backends for easier access
pub use models::{BertSequenceClassifier, ModernBertSequenceClassifier};
pub use pipelines::sequence_classification::{EasySequenceClassifier, SequenceClassifierModel};
