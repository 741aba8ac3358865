//! Backend model wrappers for sequence classification.

pub mod bert;
pub mod modern_bert;

pub use bert::BertSequenceClassifier;
pub use modern_bert::ModernBertSequenceClassifier;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::core::{Error, LabeledText, Result};

/// One tokenized mini batch, padded to its longest member.
pub(crate) struct EncodedBatch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

/// Tokenize `texts` and pad every encoding to the longest in the batch.
pub(crate) fn encode_padded(
    tokenizer: &Tokenizer,
    texts: &[String],
    device: &Device,
) -> Result<EncodedBatch> {
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let encodings = tokenizer
        .encode_batch(refs, true)
        .map_err(|e| Error::Tokenization(e.to_string()))?;

    let pad_token_id = tokenizer
        .get_padding()
        .map(|p| p.pad_id)
        .or_else(|| tokenizer.token_to_id("<pad>"))
        .or_else(|| tokenizer.token_to_id("[PAD]"))
        .unwrap_or(0);

    let batch_size = encodings.len();
    let max_len = encodings.iter().map(|e| e.len()).max().unwrap_or(0);

    let mut all_ids: Vec<u32> = Vec::with_capacity(batch_size * max_len);
    let mut all_masks: Vec<u32> = Vec::with_capacity(batch_size * max_len);
    let mut all_type_ids: Vec<u32> = Vec::with_capacity(batch_size * max_len);

    for encoding in &encodings {
        let mut ids = encoding.get_ids().to_vec();
        let mut mask = encoding.get_attention_mask().to_vec();
        let mut type_ids = encoding.get_type_ids().to_vec();
        ids.resize(max_len, pad_token_id);
        mask.resize(max_len, 0);
        type_ids.resize(max_len, 0);
        all_ids.extend(ids);
        all_masks.extend(mask);
        all_type_ids.extend(type_ids);
    }

    Ok(EncodedBatch {
        input_ids: Tensor::from_vec(all_ids, (batch_size, max_len), device)?,
        attention_mask: Tensor::from_vec(all_masks, (batch_size, max_len), device)?,
        token_type_ids: Tensor::from_vec(all_type_ids, (batch_size, max_len), device)?,
    })
}

/// Zip a chunk of texts with its probability rows into labeled items,
/// checking that the model's output shape matches the input.
pub(crate) fn label_chunk(
    texts: &[String],
    probs: Vec<Vec<f32>>,
    classes: &[String],
) -> Result<Vec<LabeledText>> {
    if probs.len() != texts.len() {
        return Err(Error::ShapeMismatch(format!(
            "model returned {} rows for a batch of {}",
            probs.len(),
            texts.len()
        )));
    }

    texts
        .iter()
        .zip(probs)
        .map(|(text, row)| {
            if row.len() != classes.len() {
                return Err(Error::ShapeMismatch(format!(
                    "model returned {} scores for {} classes",
                    row.len(),
                    classes.len()
                )));
            }
            Ok(LabeledText::new(
                text.clone(),
                classes
                    .iter()
                    .zip(row)
                    .map(|(value, score)| crate::core::Label {
                        value: value.clone(),
                        score,
                    })
                    .collect(),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<String> {
        vec!["negative".to_string(), "positive".to_string()]
    }

    #[test]
    fn label_chunk_pairs_scores_with_classes() {
        let texts = vec!["good".to_string(), "bad".to_string()];
        let items = label_chunk(&texts, vec![vec![0.2, 0.8], vec![0.9, 0.1]], &classes()).unwrap();
        assert_eq!(items[0].prediction().unwrap().value, "positive");
        assert_eq!(items[1].prediction().unwrap().value, "negative");
    }

    #[test]
    fn row_count_mismatch_is_shape_error() {
        let texts = vec!["one".to_string(), "two".to_string()];
        let err = label_chunk(&texts, vec![vec![0.5, 0.5]], &classes()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }

    #[test]
    fn score_count_mismatch_is_shape_error() {
        let texts = vec!["one".to_string()];
        let err = label_chunk(&texts, vec![vec![0.5]], &classes()).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }
}
