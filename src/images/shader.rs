// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! WGSL sources for the textured full-screen quad.

/// Passes position through and forwards the texture coordinate.
const QUAD_VERTEX: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coord: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) tex_coord: vec2<f32>) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = vec4<f32>(position, 0.0, 1.0);
    output.tex_coord = tex_coord;
    return output;
}
"#;

/// Samples the frame texture.
const TEXTURED_FRAGMENT: &str = r#"
@group(0) @binding(0) var frame_texture: texture_2d<f32>;
@group(0) @binding(1) var frame_sampler: sampler;

@fragment
fn fs_main(@location(0) tex_coord: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(frame_texture, frame_sampler, tex_coord);
}
"#;

#[derive(Debug, Clone)]
pub struct FragmentShader {
    pub(crate) label: &'static str,
    //may need additional type design for future backends
    pub(crate) wgsl_code: String,
}

#[derive(Debug, Clone)]
pub struct VertexShader {
    pub(crate) label: &'static str,
    //may need additional type design for future backends
    pub(crate) wgsl_code: String,
}

impl FragmentShader {
    pub fn new(label: &'static str, wgsl_code: String) -> Self {
        Self { label, wgsl_code }
    }
    /**
    Samples `frame_texture` (binding 0) with `frame_sampler` (binding 1).  Entry point `fs_main`.
    */
    pub fn textured() -> Self {
        Self::new("textured_fragment", TEXTURED_FRAGMENT.to_string())
    }
}

impl VertexShader {
    pub fn new(label: &'static str, wgsl_code: String) -> Self {
        Self { label, wgsl_code }
    }
    /**
    Takes position at location 0 and texture coordinate at location 1.  Entry point `vs_main`.
    */
    pub fn full_screen_quad() -> Self {
        Self::new("full_screen_quad_vertex", QUAD_VERTEX.to_string())
    }
}
