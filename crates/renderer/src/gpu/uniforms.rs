use bytemuck::{Pod, Zeroable};
use shading::FrameInputs;

/// Host-side mirror of the `BackdropParams` std140 block.
///
/// `vec2` then two floats packs into exactly 16 bytes, so no hidden padding
/// sits between the fields.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct BackdropUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub _padding: f32,
}

impl BackdropUniforms {
    pub fn new(inputs: &FrameInputs) -> Self {
        let mut uniforms = Self::default();
        uniforms.update(inputs);
        uniforms
    }

    /// Copies the frame inputs in; returns whether anything changed.
    pub fn update(&mut self, inputs: &FrameInputs) -> bool {
        let next = Self {
            resolution: [
                inputs.resolution.width as f32,
                inputs.resolution.height as f32,
            ],
            time: inputs.elapsed,
            _padding: 0.0,
        };
        let changed = next != *self;
        *self = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use shading::Resolution;

    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(std::mem::size_of::<BackdropUniforms>(), 16);
        let uniforms = BackdropUniforms::new(&FrameInputs::new(Resolution::new(800, 600), 2.5));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniforms));
        assert_eq!(floats, &[800.0, 600.0, 2.5, 0.0]);
    }

    #[test]
    fn update_reports_changes_only() {
        let inputs = FrameInputs::new(Resolution::new(320, 200), 1.0);
        let mut uniforms = BackdropUniforms::new(&inputs);
        assert!(!uniforms.update(&inputs));
        assert!(uniforms.update(&FrameInputs::new(Resolution::new(320, 200), 1.5)));
        assert!(uniforms.update(&FrameInputs::new(Resolution::new(640, 400), 1.5)));
        assert_eq!(uniforms.resolution, [640.0, 400.0]);
    }
}
