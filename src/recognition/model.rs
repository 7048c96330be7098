use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, Tensor};
use std::path::{Path, PathBuf};

use crate::error::ClassifyError;
use crate::models::NormalizedInput;
use crate::recognition::classifier::{Classifier, LazyClassifier};

/// Where the model file is expected when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "assets/model.rten";

/// Environment variable overriding the model path
pub const MODEL_PATH_ENV: &str = "DIGITCV_MODEL";

/// Pre-trained digit classifier backed by an rten model file
pub struct RtenClassifier {
    model: Model,
}

impl RtenClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifyError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ClassifyError::ModelLoad {
                path: path.to_path_buf(),
                source: format!(
                    "model file not found. Convert the trained network to .rten and place it at {} \
                     (or set {})",
                    path.display(),
                    MODEL_PATH_ENV
                )
                .into(),
            });
        }

        let model = Model::load_file(path).map_err(|e| ClassifyError::ModelLoad {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        Ok(Self { model })
    }
}

impl Classifier for RtenClassifier {
    fn predict(&self, input: &NormalizedInput) -> Result<Vec<f32>, ClassifyError> {
        let tensor = NdTensor::from_data(input.shape(), input.as_slice().to_vec());

        let output = self
            .model
            .run_one(tensor.view().into(), None)
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        // The network emits [1, 10]; flatten whatever rank it reports
        let logits: Tensor<f32> = output
            .try_into()
            .map_err(|e| ClassifyError::Inference(format!("unexpected output type: {}", e)))?;

        Ok(logits.iter().copied().collect())
    }
}

/// Lazily loaded rten classifier for the given model path
pub fn lazy_rten_classifier(path: impl Into<PathBuf>) -> LazyClassifier<RtenClassifier> {
    let path = path.into();
    let load_path = path.clone();
    LazyClassifier::with_loader(path, move || RtenClassifier::load(&load_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_load_failure() {
        let err = RtenClassifier::load("does/not/exist.rten").err().unwrap();
        match err {
            ClassifyError::ModelLoad { path, .. } => {
                assert_eq!(path, PathBuf::from("does/not/exist.rten"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lazy_rten_classifier_defers_loading() {
        let lazy = lazy_rten_classifier("does/not/exist.rten");
        assert!(!lazy.is_loaded());
        assert!(lazy.ensure_loaded().is_err());
        assert!(!lazy.is_loaded());
    }
}
