//! Sequence classification pipeline.
//!
//! Wraps pretrained classification checkpoints behind one `tag_text` call:
//! the registry loads and caches a backend per model id, inputs are reordered
//! by length for efficient padding, and results come back as a detail-leveled
//! [`Report`](crate::core::Report).
//!
//! ## Main Types
//!
//! - [`EasySequenceClassifier`] - Lazy-loading registry and dispatcher
//! - [`SequenceClassifierModel`] - Trait both model backends implement
//! - [`LengthOrdering`] - The batch reordering permutation
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use easynlp::pipelines::sequence_classification::*;
//! use easynlp::DetailLevel;
//!
//! let mut classifier = EasySequenceClassifier::new();
//! let report = classifier.tag_text(
//!     &["I love this".to_string(), "This is terrible".to_string()],
//!     "clapAI/modernBERT-base-multilingual-sentiment",
//!     32,
//!     DetailLevel::Medium,
//! )?;
//! println!("{:?}", report.predictions);
//! # easynlp::Result::Ok(())
//! ```

pub mod model;
pub mod pipeline;
pub mod reorder;

pub use model::SequenceClassifierModel;
pub use pipeline::EasySequenceClassifier;
pub use reorder::LengthOrdering;
