use glam::{Vec2, Vec3, Vec4};
use rayon::prelude::*;

use crate::fragment;

const BYTES_PER_PIXEL: usize = 4;

/// Viewport size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized side; nothing can be drawn at this size.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `1.0` for degenerate sizes.
    pub fn aspect(&self) -> f32 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl From<(u32, u32)> for Resolution {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Uniform pair shared by every pixel of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInputs {
    pub resolution: Resolution,
    /// Seconds since the renderer started.
    pub elapsed: f32,
}

impl FrameInputs {
    pub fn new(resolution: Resolution, elapsed: f32) -> Self {
        Self {
            resolution,
            elapsed,
        }
    }
}

/// Maps the centre of pixel `(x, y)` into `[-1, 1]^2`.
///
/// Row zero is the top of the image and maps to `uv.y ≈ 1`, matching the
/// clip-space rectangle the GPU path rasterises.
pub fn pixel_to_uv(x: u32, y: u32, resolution: Resolution) -> Vec2 {
    if resolution.is_degenerate() {
        return Vec2::ZERO;
    }
    let size = resolution.as_vec2();
    let centre = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / size;
    Vec2::new(centre.x * 2.0 - 1.0, 1.0 - centre.y * 2.0)
}

/// Converts a shaded colour into display bytes, clamping each channel.
pub fn to_rgba8(color: Vec4) -> [u8; 4] {
    let clamped = color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0;
    [
        clamped.x.round() as u8,
        clamped.y.round() as u8,
        clamped.z.round() as u8,
        clamped.w.round() as u8,
    ]
}

/// RGBA8 image evaluated on the CPU, one shading call per pixel.
#[derive(Debug, Clone)]
pub struct Frame {
    resolution: Resolution,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            pixels: vec![0; resolution.pixel_count() * BYTES_PER_PIXEL],
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Reallocates the pixel store when the size actually changes.
    pub fn resize(&mut self, resolution: Resolution) {
        if resolution == self.resolution {
            return;
        }
        self.resolution = resolution;
        self.pixels = vec![0; resolution.pixel_count() * BYTES_PER_PIXEL];
    }

    /// Shades every pixel for the given frame inputs.
    ///
    /// Rows are independent, so they are distributed across the rayon pool.
    /// Returns `false` without touching the buffer when the frame has no area.
    pub fn render(&mut self, inputs: &FrameInputs) -> bool {
        if self.resolution.is_degenerate() {
            return false;
        }
        let resolution = self.resolution;
        let stride = resolution.width as usize * BYTES_PER_PIXEL;
        self.pixels
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, texel) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                    let uv = pixel_to_uv(x as u32, y as u32, resolution);
                    let color = fragment(uv, inputs).extend(1.0);
                    texel.copy_from_slice(&to_rgba8(color));
                }
            });
        true
    }

    /// Raw RGBA8 bytes, row-major from the top-left corner.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.resolution.width || y >= self.resolution.height {
            return None;
        }
        let offset = (y as usize * self.resolution.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut texel = [0; 4];
        texel.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        Some(texel)
    }

    /// Average colour of the last rendered image in `[0, 1]^3`.
    pub fn mean_color(&self) -> Vec3 {
        let count = self.resolution.pixel_count();
        if count == 0 {
            return Vec3::ZERO;
        }
        let sum = self
            .pixels
            .par_chunks_exact(BYTES_PER_PIXEL)
            .map(|texel| Vec3::new(texel[0] as f32, texel[1] as f32, texel[2] as f32))
            .reduce(|| Vec3::ZERO, |a, b| a + b);
        sum / (count as f32 * 255.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shade_rgba;

    #[test]
    fn pixel_centres_span_the_unit_square() {
        let resolution = Resolution::new(4, 2);
        let top_left = pixel_to_uv(0, 0, resolution);
        let bottom_right = pixel_to_uv(3, 1, resolution);
        assert!((top_left - Vec2::new(-0.75, 0.5)).length() < 1e-6);
        assert!((bottom_right - Vec2::new(0.75, -0.5)).length() < 1e-6);
    }

    #[test]
    fn degenerate_resolution_maps_to_origin() {
        assert_eq!(pixel_to_uv(3, 7, Resolution::new(0, 600)), Vec2::ZERO);
        assert_eq!(Resolution::new(800, 0).aspect(), 1.0);
    }

    #[test]
    fn to_rgba8_clamps_out_of_range_channels() {
        assert_eq!(to_rgba8(Vec4::new(-0.5, 0.5, 1.5, 1.0)), [0, 128, 255, 255]);
    }

    #[test]
    fn render_writes_every_pixel_from_the_shader() {
        let resolution = Resolution::new(7, 5);
        let mut frame = Frame::new(resolution);
        let inputs = FrameInputs::new(resolution, 3.25);
        assert!(frame.render(&inputs));

        for (x, y) in [(0, 0), (6, 4), (3, 2)] {
            let expected = to_rgba8(shade_rgba(pixel_to_uv(x, y, resolution), 3.25));
            assert_eq!(frame.pixel(x, y), Some(expected));
        }
        assert!(frame.pixels().chunks_exact(4).all(|texel| texel[3] == 255));
    }

    #[test]
    fn render_skips_zero_area_frames() {
        let mut frame = Frame::new(Resolution::new(0, 10));
        assert!(!frame.render(&FrameInputs::new(frame.resolution(), 1.0)));
        assert!(frame.pixels().is_empty());
        assert_eq!(frame.mean_color(), Vec3::ZERO);
    }

    #[test]
    fn resize_reallocates_only_on_change() {
        let mut frame = Frame::new(Resolution::new(2, 2));
        frame.render(&FrameInputs::new(frame.resolution(), 0.0));
        let before = frame.pixels().to_vec();
        frame.resize(Resolution::new(2, 2));
        assert_eq!(frame.pixels(), before.as_slice());

        frame.resize(Resolution::new(3, 1));
        assert_eq!(frame.pixels().len(), 12);
        assert_eq!(frame.pixel(2, 0), Some([0, 0, 0, 0]));
        assert_eq!(frame.pixel(0, 1), None);
    }

    #[test]
    fn mean_color_stays_inside_the_unit_cube() {
        let mut frame = Frame::new(Resolution::new(32, 18));
        frame.render(&FrameInputs::new(frame.resolution(), 0.0));
        let mean = frame.mean_color();
        assert!(mean.cmpgt(Vec3::ZERO).all());
        assert!(mean.cmplt(Vec3::ONE).all());
    }
}
