use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the digit recognition pipeline.
///
/// A blank canvas is not an error: `DigitPipeline::classify` reports it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Failed to load model from {path:?}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Preprocessing failed: {0}")]
    Preprocess(#[from] anyhow::Error),
}

impl ClassifyError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        ClassifyError::MalformedInput(msg.into())
    }
}
