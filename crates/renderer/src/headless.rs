use std::time::Instant;

use anyhow::Result;
use shading::{Resolution, BASE_BACKGROUND};
use tracing::{info, trace};

use crate::host::{BackdropHost, FrameStatus};
use crate::software::SoftwareTarget;
use crate::types::RendererConfig;

/// What a headless run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSummary {
    pub frames_presented: u64,
    pub frames_skipped: u64,
    /// Elapsed time of the last evaluated frame.
    pub final_elapsed: f32,
    /// Average colour of the last frame in `[0, 1]^3`.
    pub mean_color: [f32; 3],
}

/// Evaluates `config.headless_frames` frames on the CPU.
pub(crate) fn run_headless(config: &RendererConfig) -> Result<HeadlessSummary> {
    let (width, height) = config.surface_size;
    let mut host = BackdropHost::initialize(Resolution::new(width, height), |initial| {
        Ok(SoftwareTarget::new(initial))
    })?;
    let mut time_source = config.time_source();

    let started = Instant::now();
    for _ in 0..config.headless_frames {
        let sample = time_source.sample();
        let status = host.on_frame(sample.seconds)?;
        trace!(
            frame = sample.frame_index,
            elapsed = host.elapsed(),
            presented = status == FrameStatus::Presented,
            "headless frame"
        );
    }
    let wall = started.elapsed().as_secs_f32();

    let mean = host
        .target()
        .map(|target| target.frame().mean_color())
        .unwrap_or(BASE_BACKGROUND);
    let summary = HeadlessSummary {
        frames_presented: host.frames_presented(),
        frames_skipped: host.frames_skipped(),
        final_elapsed: host.elapsed(),
        mean_color: mean.to_array(),
    };
    let fps = if wall > 0.0 {
        summary.frames_presented as f32 / wall
    } else {
        0.0
    };
    info!(
        width,
        height,
        frames = summary.frames_presented,
        skipped = summary.frames_skipped,
        elapsed = summary.final_elapsed,
        mean_r = summary.mean_color[0],
        mean_g = summary.mean_color[1],
        mean_b = summary.mean_color[2],
        fps = fps.round(),
        "headless run complete"
    );
    host.teardown();
    Ok(summary)
}
