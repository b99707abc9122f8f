//! Procedural backdrop shading.
//!
//! A pure function of a normalised coordinate and elapsed time that paints
//! three layers of drifting ring bands over a dark base colour:
//!
//! ```text
//!   uv, elapsed ─▶ time = elapsed * 0.3
//!        │
//!        ├─▶ layer 0..3: rotate ─▶ scale ─▶ wave ─▶ tile ─▶ ring bands ─▶ tint
//!        │                                                     │
//!        ├─▶ grain(uv) ─▶ background                           │
//!        │                    │                                │
//!        └────────────────────┴──▶ mix(bg, bg + layers, 0.8) ◀─┘
//!                                        │
//!                                        └─▶ vignette ─▶ rgb
//! ```
//!
//! Nothing here holds state, so [`Frame::render`] evaluates rows in parallel
//! without synchronisation. The renderer crate runs the same algorithm as a
//! GLSL fragment program; this crate is the CPU reference and software path.

mod frame;
mod layer;
pub mod math;

use glam::{Vec2, Vec3, Vec4};

pub use frame::{pixel_to_uv, to_rgba8, Frame, FrameInputs, Resolution};
pub use glam;
pub use layer::{
    distort, layer_contribution, ring_field, Layer, LAYERS, RING_DENSITY, RING_DRIFT, RING_EDGE,
    TILE_FREQUENCY, TILE_PERIOD, WAVE_X_AMPLITUDE, WAVE_X_FREQUENCY, WAVE_Y_AMPLITUDE,
    WAVE_Y_FREQUENCY,
};

use math::{fract, mix3};

/// Dark blue-grey the layers are painted over.
pub const BASE_BACKGROUND: Vec3 = Vec3::new(0.08, 0.12, 0.18);

/// Elapsed seconds are slowed down by this factor before animating anything.
pub const TIME_SCALE: f32 = 0.3;

/// Amplitude of the static per-pixel grain added to the background.
pub const GRAIN_STRENGTH: f32 = 0.02;

/// How far the final colour moves from the background toward `background + layers`.
pub const LAYER_BLEND: f32 = 0.8;

/// Dot-product seed and multiplier of the `fract(sin(dot(uv, seed)) * scale)` hash.
pub const GRAIN_SEED: Vec2 = Vec2::new(12.9898, 78.233);
pub const GRAIN_SCALE: f32 = 43758.5453;

/// Vignette brightness at `|uv * VIGNETTE_FALLOFF| == 1`.
pub const VIGNETTE_FLOOR: f32 = 0.7;
pub const VIGNETTE_SPAN: f32 = 0.3;
pub const VIGNETTE_FALLOFF: f32 = 0.5;

/// Shades one pixel.
///
/// `uv` is expected in `[-1, 1]^2` and `elapsed` in seconds since the
/// renderer started, but any finite input produces a finite colour. Channels
/// are not clamped; they stay close to `[0, 1]` and the display clamps the rest.
pub fn shade(uv: Vec2, elapsed: f32) -> Vec3 {
    let time = elapsed * TIME_SCALE;

    let layers = LAYERS
        .iter()
        .fold(Vec3::ZERO, |acc, layer| acc + layer_contribution(uv, time, layer));

    let background = BASE_BACKGROUND + Vec3::splat(grain(uv) * GRAIN_STRENGTH);
    let color = mix3(background, background + layers, LAYER_BLEND);
    color * vignette(uv)
}

/// [`shade`] with the opaque alpha channel the surface expects.
pub fn shade_rgba(uv: Vec2, elapsed: f32) -> Vec4 {
    shade(uv, elapsed).extend(1.0)
}

/// Evaluates one fragment with the full per-frame uniform pair.
///
/// The resolution is carried along but does not feed the maths today.
pub fn fragment(uv: Vec2, inputs: &FrameInputs) -> Vec3 {
    shade(uv, inputs.elapsed)
}

/// Cheap hash of the coordinate in `[0, 1]`.
///
/// The upper bound is reachable: like GLSL's `fract`, a tiny negative product
/// rounds up to exactly `1.0` in f32.
///
/// Depends on `uv` only, so the grain is a fixed dither pattern rather than
/// animated noise.
pub fn grain(uv: Vec2) -> f32 {
    fract(uv.dot(GRAIN_SEED).sin() * GRAIN_SCALE)
}

/// Radial darkening factor: `1.0` at the centre, `0.7 + 0.3 * (1 - √2/2)` in the corners.
pub fn vignette(uv: Vec2) -> f32 {
    let falloff = 1.0 - (uv * VIGNETTE_FALLOFF).length();
    VIGNETTE_FLOOR + VIGNETTE_SPAN * falloff
}
