//! The frame loop's owner.
//!
//! [`BackdropHost`] holds the two per-frame uniforms (resolution and elapsed
//! time) as plain values and hands them to its [`FrameTarget`] by reference
//! on every frame. Nothing about the frame lives in globals; the target only
//! ever sees the inputs of the frame it is drawing.

use shading::{FrameInputs, Resolution};
use tracing::{debug, info, trace};

use crate::error::RendererError;

/// Outcome of a single frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A full viewport was shaded and handed to the display.
    Presented,
    /// Nothing was drawn this time (zero-sized viewport, or the surface was
    /// being reconfigured); the next frame tries again.
    Skipped,
}

/// Something that can shade the whole viewport for a set of frame inputs.
pub trait FrameTarget {
    /// Short name for logs.
    fn label(&self) -> &'static str;
    /// Adapts to a new, non-degenerate viewport size.
    fn resize(&mut self, resolution: Resolution);
    /// Evaluates the shading function over every pixel and presents the result.
    fn draw(&mut self, inputs: &FrameInputs) -> Result<FrameStatus, RendererError>;
}

/// Owns the frame target and the uniforms fed to it.
pub struct BackdropHost<T: FrameTarget> {
    target: Option<T>,
    inputs: FrameInputs,
    frames_presented: u64,
    frames_skipped: u64,
}

impl<T: FrameTarget> BackdropHost<T> {
    /// Acquires the frame target and starts the clock at zero.
    ///
    /// `acquire` receives the initial resolution; its error (typically
    /// [`RendererError::ContextUnavailable`]) is returned untouched.
    pub fn initialize<F>(initial_resolution: Resolution, acquire: F) -> Result<Self, RendererError>
    where
        F: FnOnce(Resolution) -> Result<T, RendererError>,
    {
        let target = acquire(initial_resolution)?;
        info!(
            backend = target.label(),
            width = initial_resolution.width,
            height = initial_resolution.height,
            "backdrop host initialised"
        );
        Ok(Self {
            target: Some(target),
            inputs: FrameInputs::new(initial_resolution, 0.0),
            frames_presented: 0,
            frames_skipped: 0,
        })
    }

    /// Advances the clock to `clock_seconds` and draws one frame.
    ///
    /// Elapsed time never moves backwards: earlier or non-finite clock values
    /// keep the previous time. Degenerate viewports skip the draw.
    pub fn on_frame(&mut self, clock_seconds: f32) -> Result<FrameStatus, RendererError> {
        if clock_seconds.is_finite() && clock_seconds > self.inputs.elapsed {
            self.inputs.elapsed = clock_seconds;
        }

        let status = match self.target.as_mut() {
            Some(target) if !self.inputs.resolution.is_degenerate() => {
                target.draw(&self.inputs)?
            }
            _ => FrameStatus::Skipped,
        };

        match status {
            FrameStatus::Presented => self.frames_presented += 1,
            FrameStatus::Skipped => {
                self.frames_skipped += 1;
                trace!(
                    elapsed = self.inputs.elapsed,
                    width = self.inputs.resolution.width,
                    height = self.inputs.resolution.height,
                    "frame skipped"
                );
            }
        }
        Ok(status)
    }

    /// Records the live viewport size.
    ///
    /// Repeating the current size is a no-op. A zero-sized viewport is
    /// remembered (so frames are skipped) but never forwarded to the target.
    pub fn on_resize(&mut self, resolution: Resolution) {
        if resolution == self.inputs.resolution {
            return;
        }
        self.inputs.resolution = resolution;
        if resolution.is_degenerate() {
            debug!(
                width = resolution.width,
                height = resolution.height,
                "viewport collapsed; skipping frames until it has area again"
            );
            return;
        }
        if let Some(target) = self.target.as_mut() {
            target.resize(resolution);
        }
        debug!(
            width = resolution.width,
            height = resolution.height,
            "viewport resized"
        );
    }

    /// Releases the frame target and everything it owns.
    pub fn teardown(mut self) {
        self.release();
    }

    pub fn inputs(&self) -> &FrameInputs {
        &self.inputs
    }

    pub fn elapsed(&self) -> f32 {
        self.inputs.elapsed
    }

    pub fn resolution(&self) -> Resolution {
        self.inputs.resolution
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    fn release(&mut self) {
        if let Some(target) = self.target.take() {
            info!(
                backend = target.label(),
                presented = self.frames_presented,
                skipped = self.frames_skipped,
                elapsed = self.inputs.elapsed,
                "releasing backdrop host"
            );
            drop(target);
        }
    }
}

impl<T: FrameTarget> Drop for BackdropHost<T> {
    fn drop(&mut self) {
        self.release();
    }
}
