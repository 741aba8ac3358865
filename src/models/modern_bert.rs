//! ModernBERT sequence classification backend.
//!
//! Candle ships a ready-made [`ModernBertForSequenceClassification`] whose
//! classification head is driven by the checkpoint's own label metadata, so
//! this wrapper only has to batch inputs and read probabilities back out.

use std::collections::HashMap;

use candle_core::{DType, Device};
use candle_nn::ops::softmax;
use candle_nn::VarBuilder;
use candle_transformers::models::modernbert::{
    ClassifierConfig, Config, ModernBertForSequenceClassification,
};
use tokenizers::Tokenizer;

use crate::core::{Error, LabeledText, Result};
use crate::pipelines::sequence_classification::SequenceClassifierModel;
use crate::utils::{ClassifierLabels, ModelFiles};

use super::{encode_padded, label_chunk};

pub struct ModernBertSequenceClassifier {
    model: ModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    classes: Vec<String>,
}

impl ModernBertSequenceClassifier {
    /// Load a ModernBERT classification checkpoint from the hub or a local
    /// directory.
    pub fn from_pretrained(model_id: &str, device: &Device) -> Result<Self> {
        let files = ModelFiles::resolve(model_id)?;
        let config_str = std::fs::read_to_string(&files.config)?;

        let mut config: Config = serde_json::from_str(&config_str)
            .map_err(|e| Error::Load(format!("failed to parse config for '{model_id}': {e}")))?;
        let labels: ClassifierLabels = serde_json::from_str(&config_str)
            .map_err(|e| Error::Load(format!("failed to parse id2label for '{model_id}': {e}")))?;
        let classes = labels.ordered_classes()?;

        // The checkpoint config may omit the classifier block; rebuild it from
        // id2label so the head is sized to the class count.
        let pooling = config
            .classifier_config
            .as_ref()
            .map(|c| c.classifier_pooling)
            .unwrap_or_default();
        let label2id: HashMap<String, String> = labels
            .id2label
            .iter()
            .map(|(id, label)| (label.clone(), id.clone()))
            .collect();
        config.classifier_config = Some(ClassifierConfig {
            id2label: labels.id2label.clone(),
            label2id,
            classifier_pooling: pooling,
        });

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, device)? }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, device)?
        };
        let model = ModernBertForSequenceClassification::load(vb, &config)
            .map_err(|e| Error::Load(format!("failed to build ModernBERT '{model_id}': {e}")))?;

        let tokenizer = files.load_tokenizer()?;

        tracing::info!(model_id, classes = classes.len(), "loaded ModernBERT classifier");

        Ok(Self {
            model,
            tokenizer,
            device: device.clone(),
            classes,
        })
    }
}

impl SequenceClassifierModel for ModernBertSequenceClassifier {
    fn predict(&self, texts: &[String], batch_size: usize) -> Result<Vec<LabeledText>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(batch_size.max(1)) {
            let batch = encode_padded(&self.tokenizer, chunk, &self.device)?;
            let logits = self
                .model
                .forward(&batch.input_ids, &batch.attention_mask)?;
            let probs = softmax(&logits, candle_core::D::Minus1)?.to_vec2::<f32>()?;
            results.extend(label_chunk(chunk, probs, &self.classes)?);
        }

        Ok(results)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
