use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use shading::Resolution;
use wgpu::TextureFormatFeatureFlags;

use crate::error::RendererError;
use crate::types::{AdapterProfile, Antialiasing, ColorSpaceMode, GpuPowerPreference};

/// Frames the swapchain may queue ahead; two keeps latency low without stalls.
const FRAME_LATENCY: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SurfaceColorSpace {
    Gamma,
    Linear,
}

/// Instance, device and configured surface for one window.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: Resolution,
    pub sample_count: u32,
    pub surface_format: wgpu::TextureFormat,
    pub color_space: SurfaceColorSpace,
    pub adapter_profile: AdapterProfile,
    /// Largest surface side the device accepts.
    pub max_dimension: u32,
}

impl GpuContext {
    /// Acquires a surface for `target` and a device able to present to it.
    ///
    /// Every failure up to and including device creation is reported as
    /// [`RendererError::ContextUnavailable`]; a surface larger than the
    /// device's texture limit is [`RendererError::SurfaceTooLarge`].
    ///
    /// # Safety contract
    ///
    /// The surface borrows the raw window handle. Callers must drop the
    /// context before the window it was created from.
    pub(crate) fn new<T>(
        target: &T,
        initial_size: Resolution,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
        gpu_power: GpuPowerPreference,
    ) -> Result<Self, RendererError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| RendererError::context(format!("no window handle: {err}")))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| RendererError::context(format!("no display handle: {err}")))?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| RendererError::context(format!("failed to create surface: {err}")))?;

        let power_preference = match gpu_power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| RendererError::context(format!("no suitable GPU adapter: {err}")))?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        let adapter_profile = AdapterProfile::from_wgpu(&adapter_info, &limits);
        let is_software = adapter_profile.is_software();
        tracing::debug!(
            name = %adapter_profile.name,
            backend = ?adapter_profile.backend,
            device_type = ?adapter_profile.device_type,
            is_software,
            "selected GPU adapter"
        );
        if is_software {
            tracing::warn!(
                name = %adapter_profile.name,
                "rendering on a software rasterizer; expect high CPU usage"
            );
        }

        let max_dimension = limits.max_texture_dimension_2d;
        let width = initial_size.width.max(1);
        let height = initial_size.height.max(1);
        if width > max_dimension || height > max_dimension {
            return Err(RendererError::SurfaceTooLarge {
                width,
                height,
                max: max_dimension,
            });
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let Some(&first_format) = surface_caps.formats.first() else {
            return Err(RendererError::context(
                "surface is not compatible with the selected adapter",
            ));
        };
        let color_space = match color_space {
            ColorSpaceMode::Auto | ColorSpaceMode::Gamma => SurfaceColorSpace::Gamma,
            ColorSpaceMode::Linear => SurfaceColorSpace::Linear,
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb() == (color_space == SurfaceColorSpace::Linear))
            .unwrap_or_else(|| {
                tracing::warn!(
                    ?first_format,
                    ?color_space,
                    "no surface format matches the requested color space; using the first one"
                );
                first_format
            });

        let format_features = adapter.get_texture_format_features(surface_format);
        let mut supported_samples = format_features.flags.supported_sample_counts();
        if !supported_samples.contains(&1) {
            supported_samples.push(1);
        }
        supported_samples.sort_unstable();
        supported_samples.dedup();

        let mut sample_count = select_sample_count(antialiasing, &supported_samples);
        if sample_count > 1
            && !format_features
                .flags
                .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
        {
            tracing::warn!(
                ?surface_format,
                "surface format does not support MSAA resolve; disabling MSAA"
            );
            sample_count = 1;
        }
        if is_software && sample_count > 1 {
            tracing::warn!(
                sample_count,
                "software rasterizer detected; disabling MSAA for performance"
            );
            sample_count = 1;
        }

        let mut required_features = wgpu::Features::empty();
        if sample_count > 4 {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("backdrop device"),
            required_features,
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| RendererError::context(format!("failed to create GPU device: {err}")))?;

        // Fifo is the only mode every backend must support.
        let present_mode = if surface_caps
            .present_modes
            .contains(&wgpu::PresentMode::Fifo)
        {
            wgpu::PresentMode::Fifo
        } else {
            surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo)
        };
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::debug!(?present_mode, ?surface_format, sample_count, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: FRAME_LATENCY,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size: initial_size,
            sample_count,
            surface_format,
            color_space,
            adapter_profile,
            max_dimension,
        })
    }

    /// Reconfigures the swapchain; zero-sized requests are ignored.
    ///
    /// Sides beyond the device limit are clamped; the compositor scales the
    /// smaller swapchain up to the window.
    pub(crate) fn resize(&mut self, new_size: Resolution) {
        if new_size.is_degenerate() {
            return;
        }
        let clamped = clamp_to_limit(new_size, self.max_dimension);
        if clamped != new_size {
            tracing::warn!(
                requested_width = new_size.width,
                requested_height = new_size.height,
                width = clamped.width,
                height = clamped.height,
                max = self.max_dimension,
                "surface exceeds the GPU texture limit; clamping"
            );
        }
        self.size = clamped;
        self.config.width = clamped.width;
        self.config.height = clamped.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Re-applies the current configuration after the surface was lost.
    pub(crate) fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}

/// Limits each side of `size` to `max` pixels.
pub(crate) fn clamp_to_limit(size: Resolution, max: u32) -> Resolution {
    Resolution::new(size.width.min(max), size.height.min(max))
}

/// Picks the MSAA sample count from the counts the surface format supports.
///
/// `supported` must be sorted ascending and contain `1`.
pub(crate) fn select_sample_count(antialiasing: Antialiasing, supported: &[u32]) -> u32 {
    match antialiasing {
        Antialiasing::Auto => supported.last().copied().unwrap_or(1),
        Antialiasing::Off => 1,
        Antialiasing::Samples(requested) => {
            if supported.contains(&requested) {
                return requested;
            }
            let fallback = supported
                .iter()
                .copied()
                .filter(|&count| count <= requested)
                .max()
                .unwrap_or_else(|| supported.first().copied().unwrap_or(1));
            tracing::warn!(
                requested,
                fallback,
                ?supported,
                "requested MSAA sample count not supported; falling back"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPPORTED: [u32; 3] = [1, 2, 4];

    #[test]
    fn auto_takes_the_highest_supported_count() {
        assert_eq!(select_sample_count(Antialiasing::Auto, &SUPPORTED), 4);
        assert_eq!(select_sample_count(Antialiasing::Auto, &[]), 1);
    }

    #[test]
    fn off_always_renders_single_sampled() {
        assert_eq!(select_sample_count(Antialiasing::Off, &SUPPORTED), 1);
    }

    #[test]
    fn unsupported_requests_fall_back_downward() {
        assert_eq!(select_sample_count(Antialiasing::Samples(2), &SUPPORTED), 2);
        assert_eq!(select_sample_count(Antialiasing::Samples(8), &SUPPORTED), 4);
        assert_eq!(select_sample_count(Antialiasing::Samples(3), &SUPPORTED), 2);
        assert_eq!(select_sample_count(Antialiasing::Samples(0), &SUPPORTED), 1);
    }

    #[test]
    fn oversized_resizes_clamp_to_the_texture_limit() {
        assert_eq!(
            clamp_to_limit(Resolution::new(16384, 4320), 8192),
            Resolution::new(8192, 4320)
        );
        assert_eq!(
            clamp_to_limit(Resolution::new(1920, 9000), 8192),
            Resolution::new(1920, 8192)
        );
        let fits = Resolution::new(1920, 1080);
        assert_eq!(clamp_to_limit(fits, 8192), fits);
    }
}
