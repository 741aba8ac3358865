use candle_core::Device;

use crate::core::{LabeledText, Result};

/// The uniform prediction contract both backends expose.
///
/// Implementations own their model, tokenizer, and label metadata; `predict`
/// runs the whole list through the model in mini batches of `batch_size` and
/// returns one [`LabeledText`] per input, in input order, each carrying the
/// full softmax score vector.
pub trait SequenceClassifierModel {
    fn predict(&self, texts: &[String], batch_size: usize) -> Result<Vec<LabeledText>>;

    /// Class names in the model's id order, the order score vectors follow.
    fn classes(&self) -> &[String];

    fn device(&self) -> &Device;
}
