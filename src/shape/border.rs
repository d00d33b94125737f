//! 9-slice border image: a 3x3 grid of quads where the four corners keep
//! their size, the four edges stretch along one axis and the center
//! stretches along both.

use std::sync::Arc;

use crate::batch::{BatchSink, DrawMode};
use crate::error::GeometryError;
use crate::shape::ShapeGeometry;
use crate::vertex::{interpolate_region, TexCoordProvider, Vertex, UNIT_TEX_COORDS};

/// How border thickness reacts when the shape size diverges from the
/// texture size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoScale {
    /// Keep the border at its texture-pixel thickness.
    #[default]
    Off,
    /// Scale both axes proportionally to the shape size.
    Both,
    /// Scale horizontally only.
    XOnly,
    /// Scale vertically only.
    YOnly,
    /// Scale vertically; horizontally take the lesser of scaled and original.
    YFullXLower,
    /// Scale horizontally; vertically take the lesser of scaled and original.
    XFullYLower,
    /// Take the lesser of scaled and original on both axes.
    BothLower,
}

/// The fixed 9-slice topology: 16 vertices in a 4x4 grid, 54 indices
/// covering the 18 triangles of the nine cells.
const GRID_INDICES: [u16; 54] = [
    1, 2, 6, 1, 6, 5, // bottom center
    2, 3, 7, 2, 7, 6, // bottom right
    5, 6, 10, 5, 10, 9, // center
    6, 7, 11, 6, 11, 10, // center right
    9, 10, 14, 9, 14, 13, // top center
    10, 11, 15, 10, 15, 14, // top right
    0, 1, 5, 0, 5, 4, // bottom left
    4, 5, 9, 4, 9, 8, // center left
    8, 9, 13, 8, 13, 12, // top left
];

/// A stretched image whose border slices keep their proportions.
///
/// `border` is in texture pixels, in the order bottom, right, top, left;
/// the texture pixel size is needed to relate it to the shape size and is
/// supplied through [`set_texture_size`](BorderImage::set_texture_size).
#[derive(Clone)]
pub struct BorderImage {
    pos: (f32, f32),
    size: (f32, f32),
    border: [f32; 4],
    display_border: Option<[f32; 4]>,
    auto_scale: AutoScale,
    texture_size: (f32, f32),
    texture: Option<Arc<dyn TexCoordProvider>>,
    points: Vec<f32>,
    dirty: bool,
}

impl BorderImage {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            pos,
            size,
            border: [16.0; 4],
            display_border: None,
            auto_scale: AutoScale::Off,
            texture_size: (1.0, 1.0),
            texture: None,
            points: Vec::new(),
            dirty: true,
        }
    }

    pub fn pos(&self) -> (f32, f32) {
        self.pos
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    pub fn border(&self) -> &[f32; 4] {
        &self.border
    }

    pub fn auto_scale(&self) -> AutoScale {
        self.auto_scale
    }

    pub fn set_pos(&mut self, pos: (f32, f32)) {
        if self.pos != pos {
            self.pos = pos;
            self.dirty = true;
        }
    }

    pub fn set_size(&mut self, size: (f32, f32)) {
        if self.size != size {
            self.size = size;
            self.dirty = true;
        }
    }

    /// Border thickness in texture pixels: bottom, right, top, left.
    pub fn set_border(&mut self, border: [f32; 4]) -> Result<(), GeometryError> {
        if border.iter().any(|&b| b < 0.0) {
            return Err(GeometryError::InvalidParameter {
                name: "border",
                reason: "border thickness must be non-negative",
            });
        }
        self.border = border;
        self.dirty = true;
        Ok(())
    }

    /// An explicit display border replaces the auto-scaled thickness
    /// outright. `None` returns control to [`AutoScale`].
    pub fn set_display_border(&mut self, border: Option<[f32; 4]>) -> Result<(), GeometryError> {
        if let Some(b) = border {
            if b.iter().any(|&v| v < 0.0) {
                return Err(GeometryError::InvalidParameter {
                    name: "display_border",
                    reason: "border thickness must be non-negative",
                });
            }
        }
        self.display_border = border;
        self.dirty = true;
        Ok(())
    }

    pub fn set_auto_scale(&mut self, auto_scale: AutoScale) {
        if self.auto_scale != auto_scale {
            self.auto_scale = auto_scale;
            self.dirty = true;
        }
    }

    /// Pixel size of the bound texture, used to relate border thickness to
    /// the shape size.
    pub fn set_texture_size(&mut self, size: (f32, f32)) -> Result<(), GeometryError> {
        if size.0 <= 0.0 || size.1 <= 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "texture_size",
                reason: "texture size must be positive",
            });
        }
        if self.texture_size != size {
            self.texture_size = size;
            self.dirty = true;
        }
        Ok(())
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }

    /// The border thickness in shape units after auto-scaling, bottom,
    /// right, top, left.
    pub fn display_border(&self) -> [f32; 4] {
        if let Some(b) = self.display_border {
            return b;
        }
        let [b0, b1, b2, b3] = self.border;
        let (tw, th) = self.texture_size;
        let (w, h) = self.size;
        let sx = |b: f32| b / tw * w;
        let sy = |b: f32| b / th * h;
        match self.auto_scale {
            AutoScale::Off => [b0, b1, b2, b3],
            AutoScale::Both => [sy(b0), sx(b1), sy(b2), sx(b3)],
            AutoScale::XOnly => [b0, sx(b1), b2, sx(b3)],
            AutoScale::YOnly => [sy(b0), b1, sy(b2), b3],
            AutoScale::YFullXLower => [sy(b0), sx(b1).min(b1), sy(b2), sx(b3).min(b3)],
            AutoScale::XFullYLower => [sy(b0).min(b0), sx(b1), sy(b2).min(b2), sx(b3)],
            AutoScale::BothLower => {
                [sy(b0).min(b0), sx(b1).min(b1), sy(b2).min(b2), sx(b3).min(b3)]
            }
        }
    }
}

impl ShapeGeometry for BorderImage {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        let (x, y) = self.pos;
        let (w, h) = self.size;
        if w <= 0.0 || h <= 0.0 {
            sink.clear_data();
            self.points.clear();
            self.dirty = false;
            return Ok(());
        }

        let [b0, b1, b2, b3] = self.display_border();
        let [sb0, sb1, sb2, sb3] = self.border;
        let (tw, th) = self.texture_size;
        let tc = self
            .texture
            .as_ref()
            .map(|t| t.tex_coords())
            .unwrap_or(UNIT_TEX_COORDS);

        // Grid positions in shape space and the matching texture fractions;
        // the texture side always uses the unscaled pixel border.
        let xs = [x, x + b3, x + w - b1, x + w];
        let ys = [y, y + b0, y + h - b2, y + h];
        let us = [0.0, sb3 / tw, 1.0 - sb1 / tw, 1.0];
        let vs = [0.0, sb0 / th, 1.0 - sb2 / th, 1.0];

        let mut vertices = [Vertex::default(); 16];
        for row in 0..4 {
            for col in 0..4 {
                let [s, t] = interpolate_region(&tc, us[col], vs[row]);
                vertices[row * 4 + col] = Vertex::new(xs[col], ys[row], s, t);
            }
        }

        sink.set_mode(DrawMode::Triangles);
        sink.set_data(&vertices, &GRID_INDICES)?;
        self.points.clear();
        self.points
            .extend_from_slice(&[x, y, x + w, y, x + w, y + h, x, y + h]);
        self.dirty = false;
        Ok(())
    }

    fn points(&self) -> &[f32] {
        &self.points
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VertexBatch;
    use crate::config::GeometryConfig;

    fn built(image: &mut BorderImage) -> VertexBatch {
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        image.build(&mut batch).unwrap();
        batch
    }

    #[test]
    fn fixed_topology_is_sixteen_vertices_fifty_four_indices() {
        let mut image = BorderImage::new((0.0, 0.0), (100.0, 100.0));
        image.set_texture_size((32.0, 32.0)).unwrap();
        image.set_border([8.0; 4]).unwrap();
        let batch = built(&mut image);
        assert_eq!(batch.vertex_count(), 16);
        assert_eq!(batch.index_count(), 54);
    }

    #[test]
    fn auto_scale_off_keeps_pixel_thickness() {
        let mut image = BorderImage::new((0.0, 0.0), (200.0, 100.0));
        image.set_texture_size((32.0, 32.0)).unwrap();
        image.set_border([8.0; 4]).unwrap();
        assert_eq!(image.display_border(), [8.0; 4]);
    }

    #[test]
    fn auto_scale_both_follows_the_shape_size() {
        let mut image = BorderImage::new((0.0, 0.0), (64.0, 128.0));
        image.set_texture_size((32.0, 32.0)).unwrap();
        image.set_border([8.0; 4]).unwrap();
        image.set_auto_scale(AutoScale::Both);
        // Vertical axes scale by 128/32, horizontal by 64/32.
        assert_eq!(image.display_border(), [32.0, 16.0, 32.0, 16.0]);
    }

    #[test]
    fn lower_modes_never_exceed_the_original_thickness() {
        let mut image = BorderImage::new((0.0, 0.0), (64.0, 128.0));
        image.set_texture_size((32.0, 32.0)).unwrap();
        image.set_border([8.0; 4]).unwrap();
        image.set_auto_scale(AutoScale::BothLower);
        // Scaled would be [32, 16, 32, 16]; all clamp back to 8.
        assert_eq!(image.display_border(), [8.0; 4]);
    }

    #[test]
    fn explicit_display_border_wins_over_auto_scale() {
        let mut image = BorderImage::new((0.0, 0.0), (64.0, 128.0));
        image.set_texture_size((32.0, 32.0)).unwrap();
        image.set_auto_scale(AutoScale::Both);
        image.set_display_border(Some([3.0, 4.0, 5.0, 6.0])).unwrap();
        assert_eq!(image.display_border(), [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn corner_cells_keep_their_size() {
        let mut image = BorderImage::new((0.0, 0.0), (100.0, 80.0));
        image.set_texture_size((32.0, 32.0)).unwrap();
        image.set_border([8.0, 8.0, 8.0, 8.0]).unwrap();
        let batch = built(&mut image);
        let v = batch.vertices();
        // Second grid column sits one border thickness in from the left.
        assert_eq!(v[1].position, [8.0, 0.0]);
        // Second row sits one border thickness up from the bottom.
        assert_eq!(v[4].position, [0.0, 8.0]);
        // Third column sits one border thickness in from the right.
        assert_eq!(v[2].position, [92.0, 0.0]);
    }
}
