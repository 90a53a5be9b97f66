// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The full-screen quad every frame is drawn onto.

Four vertices drawn as a triangle strip, in the order bottom-left, bottom-right,
top-left, top-right.  Positions are in normalized device coordinates; texture
coordinates put `(0,0)` at the first byte of the uploaded frame.
*/

/// Number of vertices in the strip.
pub const QUAD_VERTEX_COUNT: u32 = 4;

/// How frame rows map onto the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TexCoordOrientation {
    /// The first row of the frame is drawn at the top of the screen.
    #[default]
    Upright,
    /// The first row of the frame is drawn at the bottom of the screen.
    FlipVertical,
}

/// One vertex: position then texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    /// Size of one vertex in a vertex buffer.
    pub const STRIDE: usize = std::mem::size_of::<QuadVertex>();
}

/// The quad's vertices for `orientation`.
pub const fn full_screen_quad(orientation: TexCoordOrientation) -> [QuadVertex; 4] {
    //v coordinate of the screen's top and bottom edges
    let (top, bottom) = match orientation {
        TexCoordOrientation::Upright => (0.0, 1.0),
        TexCoordOrientation::FlipVertical => (1.0, 0.0),
    };
    [
        QuadVertex { position: [-1.0, -1.0], tex_coord: [0.0, bottom] },
        QuadVertex { position: [1.0, -1.0], tex_coord: [1.0, bottom] },
        QuadVertex { position: [-1.0, 1.0], tex_coord: [0.0, top] },
        QuadVertex { position: [1.0, 1.0], tex_coord: [1.0, top] },
    ]
}

/**
Serializes vertices for upload into a vertex buffer, in native byte order.
*/
#[allow(dead_code)] //only the wgpu backend uploads vertices
pub(crate) fn vertex_bytes(vertices: &[QuadVertex]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vertices.len() * QuadVertex::STRIDE);
    for vertex in vertices {
        for f in vertex.position.iter().chain(vertex.tex_coord.iter()) {
            bytes.extend_from_slice(&f.to_ne_bytes());
        }
    }
    bytes
}

/**
Texture coordinate range spanned by the quad, as `(u_left, u_right, v_top, v_bottom)`.

The quad covers the whole screen, so a screen position maps to a texture coordinate by
linear interpolation between these edges.
*/
pub(crate) fn edge_tex_coords(vertices: &[QuadVertex; 4]) -> (f32, f32, f32, f32) {
    let [bottom_left, bottom_right, top_left, _] = vertices;
    (
        bottom_left.tex_coord[0],
        bottom_right.tex_coord[0],
        top_left.tex_coord[1],
        bottom_left.tex_coord[1],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_puts_first_row_on_top() {
        let quad = full_screen_quad(TexCoordOrientation::Upright);
        assert_eq!(edge_tex_coords(&quad), (0.0, 1.0, 0.0, 1.0));
        //top-left vertex samples the first texel
        assert_eq!(quad[2].position, [-1.0, 1.0]);
        assert_eq!(quad[2].tex_coord, [0.0, 0.0]);
    }

    #[test]
    fn flip_swaps_v_only() {
        let upright = full_screen_quad(TexCoordOrientation::Upright);
        let flipped = full_screen_quad(TexCoordOrientation::FlipVertical);
        for (u, f) in upright.iter().zip(flipped.iter()) {
            assert_eq!(u.position, f.position);
            assert_eq!(u.tex_coord[0], f.tex_coord[0]);
            assert_eq!(u.tex_coord[1], 1.0 - f.tex_coord[1]);
        }
    }

    #[test]
    fn vertex_bytes_layout() {
        let quad = full_screen_quad(TexCoordOrientation::Upright);
        let bytes = vertex_bytes(&quad);
        assert_eq!(bytes.len(), 4 * 16);
        assert_eq!(QuadVertex::STRIDE, 16);
        assert_eq!(&bytes[0..4], &(-1.0f32).to_ne_bytes());
        //tex_coord.y of the first vertex
        assert_eq!(&bytes[12..16], &1.0f32.to_ne_bytes());
    }
}
