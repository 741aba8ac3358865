use thiserror::Error;

/// Errors surfaced by classifier loading and inference.
#[derive(Debug, Error)]
pub enum Error {
    /// Model or tokenizer files could not be located or parsed. The registry
    /// recovers from this by trying the alternate backend.
    #[error("model load failed: {0}")]
    Load(String),

    /// The tokenizer rejected an input.
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// The model produced an output whose shape disagrees with the input
    /// batch. Indicates a contract violation and is never recovered.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Hub(#[from] hf_hub::api::sync::ApiError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
