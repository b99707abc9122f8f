use crate::runtime::{
    BoxedTimeSource, FixedTimeSource, RenderPolicy, SteppedTimeSource, SystemTimeSource,
};

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Match the browser canvas: shader output is written to the display unconverted.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and let an sRGB swapchain encode them.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Adapter selection hint passed to wgpu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    /// Prefer the integrated GPU; a background does not need the big one.
    #[default]
    Low,
    High,
}

/// Where frames go.
///
/// * `Windowed` opens a window (optionally borderless fullscreen) and renders
///   on the GPU at the display's redraw cadence until the window closes.
/// * `Headless` evaluates a fixed number of frames on the CPU without any
///   graphics context; useful on machines without a GPU and in CI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Windowed,
    Headless,
}

/// Summary of the adapter wgpu picked, logged at start-up.
#[derive(Debug, Clone)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension: limits.max_texture_dimension_2d,
        }
    }

    /// CPU rasterisers (llvmpipe, lavapipe, SwiftShader, WARP).
    pub fn is_software(&self) -> bool {
        if matches!(self.device_type, wgpu::DeviceType::Cpu) {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "lavapipe", "swiftshader", "softpipe", "microsoft basic render"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and the optional config file: how large
/// the surface should be, where frames go, and how time advances.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window or headless frame size in physical pixels.
    pub surface_size: (u32, u32),
    /// Presentation mode (window vs headless CPU evaluation).
    pub mode: RenderMode,
    /// Cover the whole monitor with a borderless window.
    pub fullscreen: bool,
    /// Window title.
    pub title: String,
    /// Whether time flows or stays pinned.
    pub policy: RenderPolicy,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Desired color handling for the swapchain.
    pub color_space: ColorSpaceMode,
    /// Adapter selection hint.
    pub power_preference: GpuPowerPreference,
    /// Number of frames evaluated in headless mode.
    pub headless_frames: u32,
    /// Simulated seconds between headless frames.
    pub headless_step: f32,
}

impl RendererConfig {
    /// Builds the time source matching the policy and presentation mode.
    ///
    /// Headless animation advances by a fixed step per frame so runs are
    /// reproducible; windowed animation follows the monotonic wall clock.
    pub fn time_source(&self) -> BoxedTimeSource {
        match (self.policy, self.mode) {
            (RenderPolicy::Still { time }, _) => Box::new(FixedTimeSource::new(time)),
            (RenderPolicy::Animate, RenderMode::Windowed) => Box::new(SystemTimeSource::new()),
            (RenderPolicy::Animate, RenderMode::Headless) => {
                Box::new(SteppedTimeSource::new(self.headless_step))
            }
        }
    }
}

impl Default for RendererConfig {
    /// A 720p animated window.
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            mode: RenderMode::default(),
            fullscreen: false,
            title: "Backdrop".to_string(),
            policy: RenderPolicy::default(),
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            power_preference: GpuPowerPreference::default(),
            headless_frames: 120,
            headless_step: 1.0 / 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, device_type: wgpu::DeviceType) -> AdapterProfile {
        AdapterProfile {
            name: name.to_string(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            max_texture_dimension: 8192,
        }
    }

    #[test]
    fn software_adapters_are_detected_by_type_or_name() {
        assert!(profile("anything", wgpu::DeviceType::Cpu).is_software());
        assert!(profile("llvmpipe (LLVM 17.0.6, 256 bits)", wgpu::DeviceType::Other).is_software());
        assert!(!profile("AMD Radeon RX 7800", wgpu::DeviceType::DiscreteGpu).is_software());
    }

    #[test]
    fn still_policy_pins_time_in_every_mode() {
        let mut config = RendererConfig {
            policy: RenderPolicy::Still { time: 4.0 },
            mode: RenderMode::Headless,
            ..RendererConfig::default()
        };
        let mut source = config.time_source();
        assert_eq!(source.sample().seconds, 4.0);
        assert_eq!(source.sample().seconds, 4.0);

        config.mode = RenderMode::Windowed;
        assert!(!config.time_source().is_animated());
    }

    #[test]
    fn headless_animation_steps_deterministically() {
        let config = RendererConfig {
            mode: RenderMode::Headless,
            headless_step: 0.5,
            ..RendererConfig::default()
        };
        let mut source = config.time_source();
        let samples: Vec<f32> = (0..3).map(|_| source.sample().seconds).collect();
        assert_eq!(samples, vec![0.0, 0.5, 1.0]);
    }
}
