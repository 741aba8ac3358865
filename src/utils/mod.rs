//! Device selection and model file retrieval shared by both backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::Device;
use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;

use crate::core::{Error, Result};

/// Loads a device to be used for the model. Uses CUDA by default, falling
/// back to CPU if CUDA is not available.
pub fn load_device() -> Device {
    match Device::new_cuda(0) {
        Ok(device) => {
            tracing::info!("using CUDA device 0 for inference");
            device
        }
        Err(_) => {
            tracing::info!("CUDA unavailable, using CPU for inference");
            Device::Cpu
        }
    }
}

/// The config, weights, and tokenizer files backing one checkpoint.
#[derive(Debug)]
pub struct ModelFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
    pub tokenizer: PathBuf,
}

impl ModelFiles {
    /// Resolve a model id to local files. An existing directory is used as-is;
    /// anything else is treated as a Hugging Face hub repo id and fetched
    /// through the cached sync API. Weights prefer `model.safetensors` with a
    /// `pytorch_model.bin` fallback.
    pub fn resolve(model_id: &str) -> Result<Self> {
        let path = Path::new(model_id);
        if path.is_dir() {
            return Self::from_dir(path);
        }

        let api = Api::new().map_err(|e| Error::Load(format!("hub api init failed: {e}")))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config = repo
            .get("config.json")
            .map_err(|e| Error::Load(format!("config.json not found for '{model_id}': {e}")))?;
        let weights = repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))
            .map_err(|e| Error::Load(format!("weights not found for '{model_id}': {e}")))?;
        let tokenizer = repo
            .get("tokenizer.json")
            .map_err(|e| Error::Load(format!("tokenizer.json not found for '{model_id}': {e}")))?;

        Ok(Self {
            config,
            weights,
            tokenizer,
        })
    }

    fn from_dir(dir: &Path) -> Result<Self> {
        let config = dir.join("config.json");
        let tokenizer = dir.join("tokenizer.json");
        let safetensors = dir.join("model.safetensors");
        let weights = if safetensors.exists() {
            safetensors
        } else {
            dir.join("pytorch_model.bin")
        };

        for required in [&config, &weights, &tokenizer] {
            if !required.exists() {
                return Err(Error::Load(format!(
                    "missing {} in model directory {}",
                    required.display(),
                    dir.display()
                )));
            }
        }

        Ok(Self {
            config,
            weights,
            tokenizer,
        })
    }

    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        Tokenizer::from_file(&self.tokenizer).map_err(|e| {
            Error::Load(format!(
                "failed to load tokenizer from {}: {e}",
                self.tokenizer.display()
            ))
        })
    }
}

/// The `id2label` table embedded in a classification checkpoint's config.
#[derive(serde::Deserialize)]
pub struct ClassifierLabels {
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

impl ClassifierLabels {
    /// Class names sorted by numeric id, the order score vectors follow.
    pub fn ordered_classes(&self) -> Result<Vec<String>> {
        let mut entries: Vec<(usize, String)> = self
            .id2label
            .iter()
            .map(|(id, label)| {
                id.parse::<usize>()
                    .map(|idx| (idx, label.clone()))
                    .map_err(|_| Error::Load(format!("non-numeric class id '{id}' in id2label")))
            })
            .collect::<Result<_>>()?;
        if entries.is_empty() {
            return Err(Error::Load(
                "config.json carries no id2label mapping".to_string(),
            ));
        }
        entries.sort_by_key(|(idx, _)| *idx);
        Ok(entries.into_iter().map(|(_, label)| label).collect())
    }
}
