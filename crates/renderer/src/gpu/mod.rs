//! GPU frame target.
//!
//! - `context` owns the wgpu instance, device and surface, and reconfigures
//!   the swapchain when the window resizes or the surface is lost.
//! - `pipeline` builds the one render pipeline and the quad it draws.
//! - `uniforms` mirrors the fragment program's `BackdropParams` block.
//! - `state` glues everything together behind [`GpuState`], which implements
//!   `FrameTarget` for the window loop.

mod context;
mod pipeline;
mod state;
mod uniforms;

pub use state::GpuState;
