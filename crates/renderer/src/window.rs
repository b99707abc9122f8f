use std::sync::Arc;

use anyhow::{anyhow, Result};
use shading::Resolution;
use tracing::{debug, error, info, trace};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::error::RendererError;
use crate::gpu::GpuState;
use crate::host::{BackdropHost, FrameStatus};
use crate::runtime::BoxedTimeSource;
use crate::types::RendererConfig;

/// Window plus the host drawing into it.
///
/// Field order matters: the host (and the surface inside it) drops before
/// the window it borrows the native handle from.
pub(crate) struct WindowState {
    host: Option<BackdropHost<GpuState>>,
    window: Arc<Window>,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self, RendererError> {
        let host = BackdropHost::initialize(resolution_of(window.inner_size()), |initial| {
            GpuState::new(
                window.as_ref(),
                initial,
                config.antialiasing,
                config.color_space,
                config.power_preference,
            )
        })?;
        if let Some(gpu) = host.target() {
            let profile = gpu.adapter_profile();
            info!(
                adapter = %profile.name,
                backend = ?profile.backend,
                device_type = ?profile.device_type,
                "rendering backdrop on GPU"
            );
        }
        Ok(Self {
            host: Some(host),
            window,
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn resolution(&self) -> Resolution {
        self.host
            .as_ref()
            .map(BackdropHost::resolution)
            .unwrap_or_default()
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(host) = self.host.as_mut() {
            host.on_resize(resolution_of(size));
        }
    }

    fn render_frame(&mut self, clock_seconds: f32) -> Result<FrameStatus, RendererError> {
        match self.host.as_mut() {
            Some(host) => host.on_frame(clock_seconds),
            None => Ok(FrameStatus::Skipped),
        }
    }

    fn teardown(&mut self) {
        if let Some(host) = self.host.take() {
            host.teardown();
        }
    }
}

fn resolution_of(size: PhysicalSize<u32>) -> Resolution {
    Resolution::new(size.width, size.height)
}

/// Whether the loop should queue another frame once events are drained.
///
/// A zero-sized viewport skips its frames without presenting, so nothing
/// would pace the loop; `Resized` re-arms the redraw when the area returns.
fn should_request_redraw(animated: bool, resolution: Resolution) -> bool {
    animated && !resolution.is_degenerate()
}

/// Opens the window and drives frames until it is closed.
pub(crate) fn run_window(config: &RendererConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.surface_size;
    let mut builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(width, height));
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| RendererError::context(format!("failed to create window: {err}")))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config)?;
    let mut time_source: BoxedTimeSource = config.time_source();
    let animated = time_source.is_animated();
    let mut failure: Option<RendererError> = None;

    state.window().request_redraw();

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    state.resize(new_size);
                    state.window().request_redraw();
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = state.window().inner_size();
                    debug!(width = size.width, height = size.height, "scale factor changed");
                    state.resize(size);
                    state.window().request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let sample = time_source.sample();
                    match state.render_frame(sample.seconds) {
                        Ok(status) => {
                            trace!(frame = sample.frame_index, ?status, "frame");
                        }
                        Err(err) => {
                            error!(error = %err, "rendering failed; closing window");
                            failure = Some(err);
                            elwt.exit();
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            if should_request_redraw(animated, state.resolution()) {
                state.window().request_redraw();
            }
            elwt.set_control_flow(ControlFlow::Wait);
        }
        Event::LoopExiting => {
            state.teardown();
        }
        _ => {}
    });

    state.teardown();
    run_result.map_err(|err| anyhow!("window event loop error: {err}"))?;
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
