use crate::error::ClassifyError;
use crate::models::NormalizedInput;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Opaque inference backend: 1x1x32x32 input in, raw scores out
pub trait Classifier: Send + Sync {
    fn predict(&self, input: &NormalizedInput) -> Result<Vec<f32>, ClassifyError>;
}

type Loader<C> = Box<dyn Fn() -> Result<C, ClassifyError> + Send + Sync>;

/// Loads its backend on first use and reuses it for every later call.
///
/// A failed load leaves the slot empty, so the next call retries.
pub struct LazyClassifier<C> {
    source: PathBuf,
    loader: Loader<C>,
    // Arc lets callers keep the backend after the lock is released
    slot: Mutex<Option<Arc<C>>>,
}

impl<C: Classifier> LazyClassifier<C> {
    pub fn with_loader(
        source: impl Into<PathBuf>,
        loader: impl Fn() -> Result<C, ClassifyError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: source.into(),
            loader: Box::new(loader),
            slot: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Load the backend now if it is not loaded yet
    pub fn ensure_loaded(&self) -> Result<Arc<C>, ClassifyError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(backend) = slot.as_ref() {
            return Ok(backend.clone());
        }

        tracing::info!("Loading model from {}", self.source.display());
        let backend = Arc::new((self.loader)()?);
        *slot = Some(backend.clone());
        tracing::info!("Model loaded");
        Ok(backend)
    }
}

impl<C: Classifier> Classifier for LazyClassifier<C> {
    fn predict(&self, input: &NormalizedInput) -> Result<Vec<f32>, ClassifyError> {
        let backend = self.ensure_loaded()?;
        backend.predict(input)
    }
}
