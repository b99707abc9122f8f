//! Renderer crate for Backdrop.
//!
//! Hosts the procedural background from the `shading` crate either in a
//! window (GPU, via `wgpu`) or headless (CPU, via [`SoftwareTarget`]):
//!
//! ```text
//!   CLI / backdrop
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ RenderMode::Windowed ──▶ winit loop ──▶ BackdropHost<GpuState>
//!          │                                                    │ on_frame / on_resize
//!          │                                                    ▼
//!          │                                       uniforms ─▶ GLSL fragment program
//!          │
//!          └──────▶ RenderMode::Headless ──▶ BackdropHost<SoftwareTarget> ─▶ shading::Frame
//! ```
//!
//! [`BackdropHost`] owns the two per-frame uniforms (resolution and elapsed
//! seconds) and is generic over the [`FrameTarget`] that turns them into
//! pixels. When no graphics context can be acquired the host reports
//! [`RendererError::ContextUnavailable`]; callers are expected to leave their
//! static background in place and carry on.

mod compile;
mod error;
mod gpu;
mod headless;
mod host;
mod runtime;
mod software;
mod types;
mod window;

use anyhow::Result;
use tracing::info;

pub use error::RendererError;
pub use gpu::GpuState;
pub use headless::HeadlessSummary;
pub use host::{BackdropHost, FrameStatus, FrameTarget};
pub use runtime::{
    BoxedTimeSource, FixedTimeSource, RenderPolicy, SteppedTimeSource, SystemTimeSource,
    TimeSample, TimeSource,
};
pub use shading;
pub use software::SoftwareTarget;
pub use types::{
    AdapterProfile, Antialiasing, ColorSpaceMode, GpuPowerPreference, RenderMode, RendererConfig,
};

/// Entry point used by the binary.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Runs until the window closes or the headless frame count is reached.
    ///
    /// A missing graphics context surfaces as a [`RendererError`] inside the
    /// returned `anyhow::Error`; use `downcast_ref` to tell it apart.
    pub fn run(&mut self) -> Result<()> {
        let (width, height) = self.config.surface_size;
        info!(
            mode = ?self.config.mode,
            width,
            height,
            policy = ?self.config.policy,
            "starting backdrop renderer"
        );
        match self.config.mode {
            RenderMode::Windowed => window::run_window(&self.config),
            RenderMode::Headless => headless::run_headless(&self.config).map(|_| ()),
        }
    }

    /// Headless run that hands back what it rendered.
    pub fn run_headless(&mut self) -> Result<HeadlessSummary> {
        headless::run_headless(&self.config)
    }
}
