mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from digitcv for tests
pub use digitcv::{CanvasBitmap, ClassifyError, Classifier, DigitPipeline, NormalizedInput};
