use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::LumaGrid;
use crate::recognition::preprocessing;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all preprocessing steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn debug_dir(&self) -> Option<&Path> {
        self.debug.as_ref().map(|d| d.output_dir.as_path())
    }
}

/// Trait that all preprocessing steps must implement
pub trait PreprocessStep: Send + Sync {
    /// Transform one grid into the next stage's grid
    fn process(&self, grid: LumaGrid, context: &PipelineContext) -> Result<LumaGrid>;

    /// Human-readable name for this step (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Composable preprocessing pipeline
#[derive(Clone, Default)]
pub struct Preprocessor {
    steps: Vec<Arc<dyn PreprocessStep>>,
    context: PipelineContext,
}

impl Preprocessor {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)
                .with_context(|| format!("Failed to read debug directory {}", output_dir.display()))?;
            if entries.count() > 0 {
                anyhow::bail!("Debug directory is not empty: {}", output_dir.display());
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });

        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PreprocessStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PreprocessStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order
    pub fn run(&self, input: LumaGrid) -> Result<LumaGrid> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: LumaGrid, num_steps: usize) -> Result<LumaGrid> {
        self.save_debug_output("00_input", &input)?;

        let mut grid = input;
        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let (w, h) = grid.dimensions();
            grid = step
                .process(grid, &self.context)
                .with_context(|| format!("Step '{}' failed", step.name()))?;
            tracing::debug!(
                step = step.name(),
                "{}x{} -> {}x{}",
                w,
                h,
                grid.width(),
                grid.height()
            );

            let step_dir_name = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.save_debug_output(&step_dir_name, &grid)?;
        }

        Ok(grid)
    }

    fn save_debug_output(&self, step_dir_name: &str, grid: &LumaGrid) -> Result<()> {
        let Some(root) = self.context.debug_dir() else {
            return Ok(());
        };

        let step_dir = root.join(step_dir_name);
        std::fs::create_dir_all(&step_dir)?;
        let output_path = step_dir.join("01.png");
        preprocessing::to_gray8(grid)
            .save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        tracing::debug!("saved {}/01.png", step_dir_name);
        Ok(())
    }
}
