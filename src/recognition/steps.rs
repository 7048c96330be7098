use crate::models::LumaGrid;
use crate::pipeline::{PipelineContext, PreprocessStep};
use crate::recognition::preprocessing;
use anyhow::Result;

/// Resample to a fixed shape with the bicubic kernel
pub struct ResizeStep {
    pub width: u32,
    pub height: u32,
}

impl PreprocessStep for ResizeStep {
    fn process(&self, grid: LumaGrid, _context: &PipelineContext) -> Result<LumaGrid> {
        if self.width == 0 || self.height == 0 {
            anyhow::bail!("Resize target must be non-empty, got {}x{}", self.width, self.height);
        }
        if grid.dimensions() == (self.width, self.height) {
            return Ok(grid);
        }
        Ok(preprocessing::resize_bicubic(&grid, self.width, self.height))
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Clip values into a closed range
pub struct ClampStep {
    pub min: f32,
    pub max: f32,
}

impl PreprocessStep for ClampStep {
    fn process(&self, grid: LumaGrid, _context: &PipelineContext) -> Result<LumaGrid> {
        Ok(preprocessing::clamp(&grid, self.min, self.max))
    }

    fn name(&self) -> &str {
        "Clamp"
    }
}
