//! BERT sequence classification backend.
//!
//! Candle's [`BertModel`] is the bare encoder, so the pooler and the
//! classification head are loaded by hand from the checkpoint: CLS hidden
//! state -> pooler dense -> tanh -> classifier -> softmax. Compatible with
//! standard `BertForSequenceClassification` checkpoints, whose weights live
//! under the `bert.*` and `classifier.*` prefixes.

use candle_core::{DType, Device, IndexOp, D};
use candle_nn::ops::softmax;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use tokenizers::Tokenizer;

use crate::core::{Error, LabeledText, Result};
use crate::pipelines::sequence_classification::SequenceClassifierModel;
use crate::utils::{ClassifierLabels, ModelFiles};

use super::{encode_padded, label_chunk};

pub struct BertSequenceClassifier {
    model: BertModel,
    pooler: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    device: Device,
    classes: Vec<String>,
}

impl BertSequenceClassifier {
    /// Load a BERT classification checkpoint from the hub or a local
    /// directory.
    pub fn from_pretrained(model_id: &str, device: &Device) -> Result<Self> {
        let files = ModelFiles::resolve(model_id)?;
        let config_str = std::fs::read_to_string(&files.config)?;

        let config: Config = serde_json::from_str(&config_str)
            .map_err(|e| Error::Load(format!("failed to parse config for '{model_id}': {e}")))?;
        let labels: ClassifierLabels = serde_json::from_str(&config_str)
            .map_err(|e| Error::Load(format!("failed to parse id2label for '{model_id}': {e}")))?;
        let classes = labels.ordered_classes()?;
        let num_classes = classes.len();

        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], DType::F32, device)? }
        } else {
            VarBuilder::from_pth(&files.weights, DType::F32, device)?
        };

        // Head weights come first, before BertModel consumes the builder.
        let pooler_vb = vb.pp("bert").pp("pooler").pp("dense");
        let pooler = Linear::new(
            pooler_vb
                .get((config.hidden_size, config.hidden_size), "weight")
                .map_err(|e| Error::Load(format!("missing pooler weights: {e}")))?,
            Some(
                pooler_vb
                    .get(config.hidden_size, "bias")
                    .map_err(|e| Error::Load(format!("missing pooler bias: {e}")))?,
            ),
        );

        let classifier_vb = vb.pp("classifier");
        let classifier = Linear::new(
            classifier_vb
                .get((num_classes, config.hidden_size), "weight")
                .map_err(|e| Error::Load(format!("missing classifier weights: {e}")))?,
            Some(
                classifier_vb
                    .get(num_classes, "bias")
                    .map_err(|e| Error::Load(format!("missing classifier bias: {e}")))?,
            ),
        );

        let model = BertModel::load(vb.pp("bert"), &config)
            .map_err(|e| Error::Load(format!("failed to build BERT '{model_id}': {e}")))?;

        let tokenizer = files.load_tokenizer()?;

        tracing::info!(model_id, classes = num_classes, "loaded BERT classifier");

        Ok(Self {
            model,
            pooler,
            classifier,
            tokenizer,
            device: device.clone(),
            classes,
        })
    }
}

impl SequenceClassifierModel for BertSequenceClassifier {
    fn predict(&self, texts: &[String], batch_size: usize) -> Result<Vec<LabeledText>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(batch_size.max(1)) {
            let batch = encode_padded(&self.tokenizer, chunk, &self.device)?;

            // [batch, seq_len, hidden]
            let hidden = self.model.forward(
                &batch.input_ids,
                &batch.token_type_ids,
                Some(&batch.attention_mask),
            )?;

            // CLS pooling, then the checkpoint's own head.
            let cls = hidden.i((.., 0))?;
            let pooled = self.pooler.forward(&cls)?.tanh()?;
            let logits = self.classifier.forward(&pooled)?;

            let probs = softmax(&logits, D::Minus1)?.to_vec2::<f32>()?;
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
