//! GLSL built-ins with their shader-language semantics.
//!
//! `glam` ships similarly named helpers, but `fract` there truncates toward
//! zero; the fragment program relies on `x - floor(x)` so negative inputs wrap
//! into `[0, 1]` exactly as they do on the GPU.

use glam::{Vec2, Vec3};

/// `fract` with GLSL semantics: in `[0, 1]`.
///
/// Mathematically the result is below one, but a negative input closer to an
/// integer than half an ulp of one rounds to exactly `1.0`, as it does in GLSL.
#[inline]
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Component-wise [`fract`].
#[inline]
pub fn fract2(v: Vec2) -> Vec2 {
    Vec2::new(fract(v.x), fract(v.y))
}

/// Hermite interpolation between two edges, clamped to `[0, 1]`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Linear blend `a + (b - a) * t`.
#[inline]
pub fn mix3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Counter-clockwise rotation of `p` by `angle` radians.
#[inline]
pub fn rotate(p: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c * p.x - s * p.y, s * p.x + c * p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fract_wraps_negative_values_upward() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert!((fract(1.5) - 0.5).abs() < 1e-6);
        assert_eq!(fract(0.0), 0.0);
    }

    #[test]
    fn fract_of_tiny_negative_rounds_up_to_one() {
        assert_eq!(fract(-1e-9), 1.0);
        assert!(fract(-1e-3) < 1.0);
    }

    #[test]
    fn smoothstep_clamps_outside_edges() {
        assert_eq!(smoothstep(0.0, 0.1, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.1, 1.0), 1.0);
        assert!((smoothstep(0.0, 0.1, 0.05) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = rotate(Vec2::X, std::f32::consts::FRAC_PI_2);
        assert!((rotated - Vec2::Y).length() < 1e-6);
    }
}
