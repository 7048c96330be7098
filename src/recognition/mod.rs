pub mod classifier;
pub mod model;
pub mod preprocessing;
pub mod steps;

use std::sync::Arc;

use crate::error::ClassifyError;
use crate::models::{
    CanvasBitmap, ClassProbabilities, INPUT_SIZE, NUM_CLASSES, NormalizedInput, Prediction,
};
use crate::pipeline::Preprocessor;
use classifier::Classifier;
use steps::{ClampStep, ResizeStep};

/// Turns a freehand drawing into a digit probability distribution
pub struct DigitPipeline {
    preprocessor: Preprocessor,
    classifier: Arc<dyn Classifier>,
}

impl DigitPipeline {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            preprocessor: build_standard_preprocessor(),
            classifier,
        }
    }

    /// Replace the preprocessing stages (e.g. one with debug output enabled)
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Classify a drawing.
    ///
    /// Returns `Ok(None)` for a blank canvas without touching the model.
    pub fn classify(&self, bitmap: &CanvasBitmap) -> Result<Option<Prediction>, ClassifyError> {
        if bitmap.is_blank() {
            tracing::debug!("Canvas is blank, skipping inference");
            return Ok(None);
        }

        let input = self.normalize(bitmap)?;
        let raw = self.classifier.predict(&input)?;
        let logits = validate_logits(&raw)?;

        let prediction = Prediction::from_probabilities(ClassProbabilities::from_logits(&logits));
        tracing::info!(
            digit = prediction.digit,
            confidence = prediction.confidence(),
            "Classified drawing"
        );
        Ok(Some(prediction))
    }

    /// Luma conversion followed by the preprocessing steps
    pub fn normalize(&self, bitmap: &CanvasBitmap) -> Result<NormalizedInput, ClassifyError> {
        let gray = preprocessing::to_luma(bitmap);
        let grid = self.preprocessor.run(gray)?;
        NormalizedInput::from_grid(grid)
    }
}

fn validate_logits(raw: &[f32]) -> Result<[f32; NUM_CLASSES], ClassifyError> {
    let logits: [f32; NUM_CLASSES] = raw.try_into().map_err(|_| {
        ClassifyError::Inference(format!(
            "expected {} scores from the model, got {}",
            NUM_CLASSES,
            raw.len()
        ))
    })?;
    if logits.iter().any(|x| !x.is_finite()) {
        return Err(ClassifyError::Inference(
            "model returned non-finite scores".to_string(),
        ));
    }
    Ok(logits)
}

/// Resize to the model's input shape, then clip interpolation overshoot
pub fn build_standard_preprocessor() -> Preprocessor {
    Preprocessor::new()
        .add_step(Arc::new(ResizeStep {
            width: INPUT_SIZE,
            height: INPUT_SIZE,
        }))
        .add_step(Arc::new(ClampStep { min: 0.0, max: 1.0 }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_logits_length() {
        assert!(validate_logits(&[0.0; 9]).is_err());
        assert!(validate_logits(&[0.0; 11]).is_err());
        assert!(validate_logits(&[0.0; 10]).is_ok());
    }

    #[test]
    fn test_validate_logits_rejects_nan() {
        let mut raw = [0.0f32; 10];
        raw[4] = f32::NAN;
        assert!(matches!(
            validate_logits(&raw),
            Err(ClassifyError::Inference(_))
        ));
    }

    #[test]
    fn test_standard_preprocessor_steps() {
        assert_eq!(
            build_standard_preprocessor().step_names(),
            vec!["Resize", "Clamp"]
        );
    }
}
