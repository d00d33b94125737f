use bytemuck::{Pod, Zeroable};

/// A single tessellated vertex: position plus texture coordinate.
///
/// The layout is a fixed 16-byte `#[repr(C)]` record so a `&[Vertex]` can be
/// handed to a GPU upload path as raw bytes via [`vertices_as_bytes`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, s: f32, t: f32) -> Self {
        Self {
            position: [x, y],
            tex_coords: [s, t],
        }
    }
}

/// Reinterprets a vertex slice as its raw byte representation.
pub fn vertices_as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// The four corners of a bound texture region, in a fixed winding order:
/// `[s0, t0, s1, t1, s2, t2, s3, t3]`.
pub type TexCoords = [f32; 8];

/// Texture coordinates covering the full unit region.
pub const UNIT_TEX_COORDS: TexCoords = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];

/// Supplies the texture coordinates of the currently bound texture region.
///
/// Shapes consult this once per build; the texture itself (upload, binding,
/// reload) is owned by the embedding renderer.
pub trait TexCoordProvider {
    fn tex_coords(&self) -> TexCoords;
}

impl TexCoordProvider for TexCoords {
    fn tex_coords(&self) -> TexCoords {
        *self
    }
}

/// Maps a local shape-space fraction `(u, v)` in `[0, 1]²` bilinearly into
/// the region described by `coords`. Rotated or skewed regions (e.g. a
/// rotated atlas entry) map through all four corners, consistent with the
/// corner-based shapes.
pub(crate) fn interpolate_region(coords: &TexCoords, u: f32, v: f32) -> [f32; 2] {
    let w0 = (1.0 - u) * (1.0 - v);
    let w1 = u * (1.0 - v);
    let w2 = u * v;
    let w3 = (1.0 - u) * v;
    [
        coords[0] * w0 + coords[2] * w1 + coords[4] * w2 + coords[6] * w3,
        coords[1] * w0 + coords[3] * w1 + coords[5] * w2 + coords[7] * w3,
    ]
}

/// The corner coordinate pair at `corner` (0..4) of a region.
pub(crate) fn region_corner(coords: &TexCoords, corner: usize) -> [f32; 2] {
    [coords[corner * 2], coords[corner * 2 + 1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_a_16_byte_record() {
        assert_eq!(std::mem::size_of::<Vertex>(), 16);
        let quad = [Vertex::new(0.0, 0.0, 0.0, 0.0), Vertex::new(1.0, 2.0, 3.0, 4.0)];
        assert_eq!(vertices_as_bytes(&quad).len(), 32);
    }

    #[test]
    fn unit_region_interpolation_is_identity() {
        assert_eq!(interpolate_region(&UNIT_TEX_COORDS, 0.25, 0.75), [0.25, 0.75]);
    }

    #[test]
    fn rotated_regions_interpolate_through_all_four_corners() {
        // The unit region rotated a quarter turn: corner 0 of the shape maps
        // to (1, 0) in the texture, and so on around.
        let rotated: TexCoords = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        assert_eq!(interpolate_region(&rotated, 0.0, 0.0), [1.0, 0.0]);
        assert_eq!(interpolate_region(&rotated, 1.0, 0.0), [1.0, 1.0]);
        assert_eq!(interpolate_region(&rotated, 1.0, 1.0), [0.0, 1.0]);
        assert_eq!(interpolate_region(&rotated, 0.0, 1.0), [0.0, 0.0]);
        // The rotation fixes the region center.
        assert_eq!(interpolate_region(&rotated, 0.5, 0.5), [0.5, 0.5]);
    }
}
