use std::borrow::Cow;

use shading::glam::{Vec2, Vec3};
use shading::{
    BASE_BACKGROUND, GRAIN_SCALE, GRAIN_SEED, GRAIN_STRENGTH, LAYERS, LAYER_BLEND, RING_DENSITY,
    RING_DRIFT, RING_EDGE, TILE_FREQUENCY, TIME_SCALE, VIGNETTE_FALLOFF, VIGNETTE_FLOOR,
    VIGNETTE_SPAN, WAVE_X_AMPLITUDE, WAVE_X_FREQUENCY, WAVE_Y_AMPLITUDE, WAVE_Y_FREQUENCY,
};
use wgpu::naga::ShaderStage;

/// Compiles the pass-through quad vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("backdrop quad vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    })
}

/// Compiles the backdrop fragment program.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("backdrop fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(fragment_shader_source()),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    })
}

/// GPU twin of `shading::shade`.
///
/// Every tunable of the algorithm is emitted from the `shading` crate: the
/// scalar constants as a `const` prelude and the layer table as one unrolled
/// term per [`LAYERS`] entry. The hand-written parts only wire them together.
pub(crate) fn fragment_shader_source() -> String {
    let prelude = constants_prelude();
    let layers = layer_sum_function();
    format!("{FRAGMENT_HEADER}\n{prelude}\n{FRAGMENT_FUNCTIONS}\n{layers}\n{FRAGMENT_MAIN}")
}

/// Scalar constants shared with the CPU path, in declaration order.
fn float_constants() -> [(&'static str, f32); 14] {
    [
        ("TIME_SCALE", TIME_SCALE),
        ("GRAIN_SCALE", GRAIN_SCALE),
        ("GRAIN_STRENGTH", GRAIN_STRENGTH),
        ("LAYER_BLEND", LAYER_BLEND),
        ("TILE_FREQUENCY", TILE_FREQUENCY),
        ("RING_DENSITY", RING_DENSITY),
        ("RING_DRIFT", RING_DRIFT),
        ("RING_EDGE", RING_EDGE),
        ("WAVE_X_FREQUENCY", WAVE_X_FREQUENCY),
        ("WAVE_X_AMPLITUDE", WAVE_X_AMPLITUDE),
        ("WAVE_Y_FREQUENCY", WAVE_Y_FREQUENCY),
        ("WAVE_Y_AMPLITUDE", WAVE_Y_AMPLITUDE),
        ("VIGNETTE_FLOOR", VIGNETTE_FLOOR),
        ("VIGNETTE_SPAN", VIGNETTE_SPAN),
    ]
}

fn constants_prelude() -> String {
    let mut prelude = format!(
        "const vec3 BASE_BACKGROUND = {};\nconst vec2 GRAIN_SEED = {};\nconst float VIGNETTE_FALLOFF = {};\n",
        glsl_vec3(BASE_BACKGROUND),
        glsl_vec2(GRAIN_SEED),
        glsl_float(VIGNETTE_FALLOFF),
    );
    for (name, value) in float_constants() {
        prelude.push_str(&format!("const float {name} = {};\n", glsl_float(value)));
    }
    prelude
}

fn layer_sum_function() -> String {
    let terms: String = LAYERS
        .iter()
        .map(|layer| {
            format!(
                "    layers += {tint} * ringField(distortLayer(uv, time, {spin}, {scale}, {wave_x}, {wave_y}), time, {radius}) * {weight};\n",
                tint = glsl_vec3(layer.tint),
                spin = glsl_float(layer.spin),
                scale = glsl_float(layer.scale),
                wave_x = glsl_float(layer.wave_x_speed),
                wave_y = glsl_float(layer.wave_y_speed),
                radius = glsl_float(layer.radius),
                weight = glsl_float(layer.weight),
            )
        })
        .collect();
    format!(
        "vec3 layerContributions(vec2 uv, float time) {{\n    vec3 layers = vec3(0.0);\n{terms}    return layers;\n}}\n"
    )
}

/// Shortest round-tripping f32 text; `Debug` always keeps a `.` or exponent,
/// so the literal stays a float in GLSL.
fn glsl_float(value: f32) -> String {
    format!("{value:?}")
}

fn glsl_vec2(value: Vec2) -> String {
    format!("vec2({}, {})", glsl_float(value.x), glsl_float(value.y))
}

fn glsl_vec3(value: Vec3) -> String {
    format!(
        "vec3({}, {}, {})",
        glsl_float(value.x),
        glsl_float(value.y),
        glsl_float(value.z)
    )
}

/// Forwards the quad corner unchanged; `v_uv` spans `[-1, 1]^2` with `+y` up.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = a_position;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
";

/// The uniform block layout must match `BackdropUniforms` in `gpu/uniforms.rs`.
const FRAGMENT_HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform BackdropParams {
    vec2 uResolution;
    float uTime;
    float uPadding;
} params;
";

const FRAGMENT_FUNCTIONS: &str = r"vec2 rotate2d(vec2 p, float angle) {
    float s = sin(angle);
    float c = cos(angle);
    return vec2(c * p.x - s * p.y, s * p.x + c * p.y);
}

float grain(vec2 uv) {
    return fract(sin(dot(uv, GRAIN_SEED)) * GRAIN_SCALE);
}

vec2 distortLayer(vec2 uv, float time, float spin, float scale, float waveXSpeed, float waveYSpeed) {
    vec2 p = rotate2d(uv, time * spin) * scale;
    p.x += sin(p.y * WAVE_X_FREQUENCY + time * waveXSpeed) * WAVE_X_AMPLITUDE;
    p.y += cos(p.x * WAVE_Y_FREQUENCY + time * waveYSpeed) * WAVE_Y_AMPLITUDE;
    return p;
}

float ringField(vec2 p, float time, float radius) {
    vec2 cell = fract(p * TILE_FREQUENCY) - vec2(0.5);
    float d = length(cell) - radius;
    float band = abs(sin(d * RING_DENSITY + time * RING_DRIFT)) / RING_DENSITY;
    return 1.0 - smoothstep(0.0, RING_EDGE, band);
}

float vignette(vec2 uv) {
    return VIGNETTE_FLOOR + VIGNETTE_SPAN * (1.0 - length(uv * VIGNETTE_FALLOFF));
}
";

const FRAGMENT_MAIN: &str = r"void main() {
    vec2 uv = v_uv;
    float time = params.uTime * TIME_SCALE;

    vec3 layers = layerContributions(uv, time);
    vec3 background = BASE_BACKGROUND + vec3(grain(uv) * GRAIN_STRENGTH);
    vec3 color = mix(background, background + layers, LAYER_BLEND);

    outColor = vec4(color * vignette(uv), 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::naga::front::glsl::{Frontend, Options};
    use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};

    fn parse_and_validate(source: &str, stage: ShaderStage) {
        let module = Frontend::default()
            .parse(&Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"));
        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed validation: {err:?}"));
    }

    /// Numeric tokens in order of appearance, skipping identifiers like `vec3`.
    fn numeric_literals(text: &str) -> Vec<&str> {
        text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
            .filter(|token| token.starts_with(|c: char| c.is_ascii_digit()))
            .collect()
    }

    fn parse_floats(text: &str) -> Vec<f32> {
        numeric_literals(text)
            .into_iter()
            .map(|token| token.parse().unwrap())
            .collect()
    }

    #[test]
    fn vertex_shader_is_valid_glsl() {
        parse_and_validate(VERTEX_SHADER_GLSL, ShaderStage::Vertex);
    }

    #[test]
    fn fragment_shader_is_valid_glsl() {
        parse_and_validate(&fragment_shader_source(), ShaderStage::Fragment);
    }

    #[test]
    fn fragment_uniform_block_matches_host_layout() {
        let block = FRAGMENT_HEADER
            .split("uniform BackdropParams {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .expect("uniform block present");
        let members: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert_eq!(
            members,
            ["vec2 uResolution;", "float uTime;", "float uPadding;"]
        );
    }

    #[test]
    fn glsl_floats_keep_a_decimal_point() {
        assert_eq!(glsl_float(1.0), "1.0");
        assert_eq!(glsl_float(2.0), "2.0");
        assert_eq!(glsl_float(0.08), "0.08");
        assert_eq!(glsl_vec2(Vec2::new(0.5, 3.0)), "vec2(0.5, 3.0)");
    }

    #[test]
    fn prelude_declares_every_shared_constant() {
        let source = fragment_shader_source();
        let declared = |name: &str| -> Vec<f32> {
            let line = source
                .lines()
                .find(|line| line.starts_with("const ") && line.contains(&format!(" {name} = ")))
                .unwrap_or_else(|| panic!("{name} not declared"));
            let value = line.split(" = ").nth(1).unwrap();
            parse_floats(value)
        };

        for (name, value) in float_constants() {
            assert_eq!(declared(name), [value], "{name}");
        }
        assert_eq!(declared("VIGNETTE_FALLOFF"), [VIGNETTE_FALLOFF]);
        assert_eq!(declared("GRAIN_SEED"), GRAIN_SEED.to_array());
        assert_eq!(declared("BASE_BACKGROUND"), BASE_BACKGROUND.to_array());
    }

    #[test]
    fn layer_terms_reproduce_the_shading_table() {
        let source = fragment_shader_source();
        let terms: Vec<&str> = source
            .lines()
            .filter(|line| line.trim_start().starts_with("layers += "))
            .collect();
        assert_eq!(terms.len(), LAYERS.len());

        for (term, layer) in terms.iter().zip(&LAYERS) {
            let expected = [
                layer.tint.x,
                layer.tint.y,
                layer.tint.z,
                layer.spin,
                layer.scale,
                layer.wave_x_speed,
                layer.wave_y_speed,
                layer.radius,
                layer.weight,
            ];
            assert_eq!(parse_floats(term), expected, "layer {}", layer.index);
        }
    }

    #[test]
    fn hand_written_glsl_has_no_tuning_literals() {
        // Anything beyond these structural values must come from the prelude.
        for part in [FRAGMENT_FUNCTIONS, FRAGMENT_MAIN] {
            for literal in numeric_literals(part) {
                assert!(
                    ["0.0", "0.5", "1.0"].contains(&literal),
                    "literal {literal} is not generated from the shading crate"
                );
            }
        }
    }
}
