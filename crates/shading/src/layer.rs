use glam::{Vec2, Vec3};

use crate::math::{fract2, rotate, smoothstep};

/// Tiling frequency applied before `fract`; one cell spans `1 / TILE_FREQUENCY`.
pub const TILE_FREQUENCY: f32 = 1.5;

/// Spatial period of [`ring_field`] along either axis.
pub const TILE_PERIOD: f32 = 1.0 / TILE_FREQUENCY;

/// Number of concentric bands packed into one unit of distance.
pub const RING_DENSITY: f32 = 8.0;

/// Speed of the bands drifting through the distance field (per scaled second).
pub const RING_DRIFT: f32 = 2.0;

/// Width of the smoothstep ramp that turns the band field into thin rings.
pub const RING_EDGE: f32 = 0.1;

/// Horizontal wave: `x += sin(y * frequency + time * speed) * amplitude`.
pub const WAVE_X_FREQUENCY: f32 = 3.0;
pub const WAVE_X_AMPLITUDE: f32 = 0.3;

/// Vertical wave, read after the horizontal one has moved `x`.
pub const WAVE_Y_FREQUENCY: f32 = 2.0;
pub const WAVE_Y_AMPLITUDE: f32 = 0.2;

/// One of the stacked ring layers.
///
/// The fragment program is generated from [`LAYERS`], so this table is the
/// single source for both the CPU and GPU paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layer {
    pub index: u32,
    /// Fixed colour added where the rings light up.
    pub tint: Vec3,
    /// Circle radius inside each tile.
    pub radius: f32,
    /// Intensity multiplier; later layers contribute less.
    pub weight: f32,
    /// Angular speed, radians per scaled second.
    pub spin: f32,
    /// Zoom applied after rotation.
    pub scale: f32,
    /// Phase speed of the horizontal wave.
    pub wave_x_speed: f32,
    /// Phase speed of the vertical wave.
    pub wave_y_speed: f32,
}

/// Blue, purple, teal.
///
/// Layer `i` uses radius `0.2 - 0.05i`, weight `0.6 - 0.1i`, spin `0.1(i + 1)`,
/// scale `1 + 0.3i` and wave speeds `1 + 0.5i` / `1.2 + 0.3i`.
pub const LAYERS: [Layer; 3] = [
    Layer {
        index: 0,
        tint: Vec3::new(0.15, 0.25, 0.4),
        radius: 0.2,
        weight: 0.6,
        spin: 0.1,
        scale: 1.0,
        wave_x_speed: 1.0,
        wave_y_speed: 1.2,
    },
    Layer {
        index: 1,
        tint: Vec3::new(0.25, 0.15, 0.35),
        radius: 0.15,
        weight: 0.5,
        spin: 0.2,
        scale: 1.3,
        wave_x_speed: 1.5,
        wave_y_speed: 1.5,
    },
    Layer {
        index: 2,
        tint: Vec3::new(0.2, 0.3, 0.25),
        radius: 0.1,
        weight: 0.4,
        spin: 0.3,
        scale: 1.6,
        wave_x_speed: 2.0,
        wave_y_speed: 1.8,
    },
];

/// Rotates, scales and wave-distorts `uv` for one layer.
///
/// The vertical wave reads the horizontal coordinate after it has already been
/// displaced, so the two updates are not interchangeable.
pub fn distort(uv: Vec2, time: f32, layer: &Layer) -> Vec2 {
    let mut p = rotate(uv, time * layer.spin) * layer.scale;
    p.x += (p.y * WAVE_X_FREQUENCY + time * layer.wave_x_speed).sin() * WAVE_X_AMPLITUDE;
    p.y += (p.x * WAVE_Y_FREQUENCY + time * layer.wave_y_speed).cos() * WAVE_Y_AMPLITUDE;
    p
}

/// Ring intensity in `[0, 1]` for an already distorted point.
pub fn ring_field(p: Vec2, time: f32, layer: &Layer) -> f32 {
    let cell = fract2(p * TILE_FREQUENCY) - Vec2::splat(0.5);
    let distance = cell.length() - layer.radius;
    let band = (distance * RING_DENSITY + time * RING_DRIFT).sin().abs() / RING_DENSITY;
    1.0 - smoothstep(0.0, RING_EDGE, band)
}

/// Colour contributed by `layer` at `uv`; `time` is already scaled.
pub fn layer_contribution(uv: Vec2, time: f32, layer: &Layer) -> Vec3 {
    let p = distort(uv, time, layer);
    layer.tint * ring_field(p, time, layer) * layer.weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_table_follows_index_formulas() {
        for layer in &LAYERS {
            let i = layer.index as f32;
            assert!((layer.radius - (0.2 - i * 0.05)).abs() < 1e-6);
            assert!((layer.weight - (0.6 - i * 0.1)).abs() < 1e-6);
            assert!((layer.spin - 0.1 * (i + 1.0)).abs() < 1e-6);
            assert!((layer.scale - (1.0 + i * 0.3)).abs() < 1e-6);
            assert!((layer.wave_x_speed - (1.0 + i * 0.5)).abs() < 1e-6);
            assert!((layer.wave_y_speed - (1.2 + i * 0.3)).abs() < 1e-6);
        }
    }

    #[test]
    fn distort_at_origin_only_lifts_y() {
        // With no rotation and a zero x, only the cosine wave moves the point.
        let p = distort(Vec2::ZERO, 0.0, &LAYERS[0]);
        assert_eq!(p.x, 0.0);
        assert!((p.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn ring_field_stays_in_unit_range() {
        for step in 0..200 {
            let t = step as f32 * 0.173;
            let p = Vec2::new(t.sin() * 3.0, t.cos() * 5.0 - 1.0);
            for layer in &LAYERS {
                let value = ring_field(p, t, layer);
                assert!((0.0..=1.0).contains(&value), "value {value} out of range");
            }
        }
    }

    #[test]
    fn ring_field_is_bright_on_band_centres() {
        // A band centre sits where sin(d * 8) == 0, e.g. on the circle itself.
        let layer = &LAYERS[0];
        let on_circle = Vec2::new(0.5 + layer.radius, 0.5) / TILE_FREQUENCY;
        assert!((ring_field(on_circle, 0.0, layer) - 1.0).abs() < 1e-4);
    }
}
