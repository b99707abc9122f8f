use shading::{Frame, FrameInputs, Resolution};

use crate::error::RendererError;
use crate::host::{FrameStatus, FrameTarget};

/// CPU frame target backed by an RGBA8 buffer.
///
/// Used for headless runs and anywhere a GPU is not available; every pixel is
/// evaluated with the same shading function the GPU program implements.
#[derive(Debug, Clone)]
pub struct SoftwareTarget {
    frame: Frame,
}

impl SoftwareTarget {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            frame: Frame::new(resolution),
        }
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

impl FrameTarget for SoftwareTarget {
    fn label(&self) -> &'static str {
        "software"
    }

    fn resize(&mut self, resolution: Resolution) {
        self.frame.resize(resolution);
    }

    fn draw(&mut self, inputs: &FrameInputs) -> Result<FrameStatus, RendererError> {
        if self.frame.render(inputs) {
            Ok(FrameStatus::Presented)
        } else {
            Ok(FrameStatus::Skipped)
        }
    }
}
