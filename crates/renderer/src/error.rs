use thiserror::Error;

/// Failures surfaced by the backdrop host and its frame targets.
///
/// [`RendererError::ContextUnavailable`] and [`RendererError::SurfaceTooLarge`]
/// both mean no usable context for this surface; callers treat them as "leave
/// the static background in place" rather than a crash.
#[derive(Debug, Error)]
pub enum RendererError {
    /// No usable graphics context (missing adapter, surface, or device).
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("surface {width}x{height} exceeds the GPU limit of {max} pixels per side")]
    SurfaceTooLarge { width: u32, height: u32, max: u32 },
    #[error("GPU ran out of memory while presenting")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

impl RendererError {
    pub(crate) fn context(reason: impl std::fmt::Display) -> Self {
        Self::ContextUnavailable(reason.to_string())
    }

    /// True when the caller should fall back to the static background.
    pub fn is_context_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ContextUnavailable(_) | Self::SurfaceTooLarge { .. }
        )
    }
}
