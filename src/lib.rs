pub mod chat;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod recognition;
pub mod report;

pub use error::ClassifyError;
pub use models::{CanvasBitmap, ClassProbabilities, LumaGrid, NormalizedInput, Prediction};
pub use pipeline::{DebugConfig, PipelineContext, PreprocessStep, Preprocessor};
pub use recognition::DigitPipeline;
pub use recognition::classifier::{Classifier, LazyClassifier};
pub use recognition::model::RtenClassifier;
