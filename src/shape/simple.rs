//! Fixed-arity shapes: [`Triangle`], [`Quad`] and [`Rectangle`].

use std::sync::Arc;

use smallvec::SmallVec;

use crate::batch::{BatchSink, DrawMode};
use crate::error::GeometryError;
use crate::shape::{InsetShape, ShapeGeometry};
use crate::vertex::{region_corner, TexCoordProvider, Vertex, UNIT_TEX_COORDS};

/// A filled triangle from three explicit points.
#[derive(Clone, Default)]
pub struct Triangle {
    corners: [f32; 6],
    texture: Option<Arc<dyn TexCoordProvider>>,
    points: Vec<f32>,
    dirty: bool,
}

impl Triangle {
    pub fn new(corners: [f32; 6]) -> Self {
        Self {
            corners,
            texture: None,
            points: Vec::new(),
            dirty: true,
        }
    }

    /// Replaces the three corners. Exactly 6 coordinate values are required.
    pub fn set_points(&mut self, points: &[f32]) -> Result<(), GeometryError> {
        if points.len() != 6 {
            return Err(GeometryError::wrong_arity("Triangle", 6, points.len()));
        }
        self.corners.copy_from_slice(points);
        self.dirty = true;
        Ok(())
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }
}

impl ShapeGeometry for Triangle {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        let tc = self
            .texture
            .as_ref()
            .map(|t| t.tex_coords())
            .unwrap_or(UNIT_TEX_COORDS);
        let mut vertices: SmallVec<[Vertex; 4]> = SmallVec::new();
        for i in 0..3 {
            let [s, t] = region_corner(&tc, i);
            vertices.push(Vertex::new(self.corners[i * 2], self.corners[i * 2 + 1], s, t));
        }
        sink.set_mode(DrawMode::Triangles);
        sink.set_data(&vertices, &[0, 1, 2])?;
        self.points.clear();
        self.points.extend_from_slice(&self.corners);
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

/// A filled quadrilateral from four explicit points.
#[derive(Clone, Default)]
pub struct Quad {
    corners: [f32; 8],
    texture: Option<Arc<dyn TexCoordProvider>>,
    points: Vec<f32>,
    dirty: bool,
}

impl Quad {
    pub fn new(corners: [f32; 8]) -> Self {
        Self {
            corners,
            texture: None,
            points: Vec::new(),
            dirty: true,
        }
    }

    /// Replaces the four corners. Exactly 8 coordinate values are required;
    /// anything else is rejected before any mutation.
    pub fn set_points(&mut self, points: &[f32]) -> Result<(), GeometryError> {
        if points.len() != 8 {
            return Err(GeometryError::wrong_arity("Quad", 8, points.len()));
        }
        self.corners.copy_from_slice(points);
        self.dirty = true;
        Ok(())
    }

    /// The current corners, exactly as assigned.
    pub fn corner_points(&self) -> &[f32; 8] {
        &self.corners
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }
}

impl ShapeGeometry for Quad {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        let tc = self
            .texture
            .as_ref()
            .map(|t| t.tex_coords())
            .unwrap_or(UNIT_TEX_COORDS);
        let mut vertices: SmallVec<[Vertex; 4]> = SmallVec::new();
        for i in 0..4 {
            let [s, t] = region_corner(&tc, i);
            vertices.push(Vertex::new(self.corners[i * 2], self.corners[i * 2 + 1], s, t));
        }
        sink.set_mode(DrawMode::Triangles);
        sink.set_data(&vertices, &[0, 1, 2, 2, 3, 0])?;
        self.points.clear();
        self.points.extend_from_slice(&self.corners);
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

/// An axis-aligned filled rectangle derived from `pos` and `size`.
#[derive(Clone, Default)]
pub struct Rectangle {
    pos: (f32, f32),
    size: (f32, f32),
    texture: Option<Arc<dyn TexCoordProvider>>,
    points: Vec<f32>,
    dirty: bool,
}

impl Rectangle {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            pos,
            size,
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

    /// Moves the rectangle. Assigning the current value is a no-op and does
    /// not trigger a rebuild.
    pub fn set_pos(&mut self, pos: (f32, f32)) {
        if self.pos != pos {
            self.pos = pos;
            self.dirty = true;
        }
    }

    /// Resizes the rectangle, with the same value-equality short-circuit as
    /// [`set_pos`](Rectangle::set_pos).
    pub fn set_size(&mut self, size: (f32, f32)) {
        if self.size != size {
            self.size = size;
            self.dirty = true;
        }
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }

    pub(crate) fn texture_is_custom(&self) -> bool {
        self.texture.is_some()
    }

    /// The four corners in clockwise order from `pos`.
    fn corners(&self) -> [f32; 8] {
        let (x, y) = self.pos;
        let (w, h) = self.size;
        [x, y, x + w, y, x + w, y + h, x, y + h]
    }
}

impl ShapeGeometry for Rectangle {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        let tc = self
            .texture
            .as_ref()
            .map(|t| t.tex_coords())
            .unwrap_or(UNIT_TEX_COORDS);
        let corners = self.corners();
        let mut vertices: SmallVec<[Vertex; 4]> = SmallVec::new();
        for i in 0..4 {
            let [s, t] = region_corner(&tc, i);
            vertices.push(Vertex::new(corners[i * 2], corners[i * 2 + 1], s, t));
        }
        sink.set_mode(DrawMode::Triangles);
        sink.set_data(&vertices, &[0, 1, 2, 2, 3, 0])?;
        self.points.clear();
        self.points.extend_from_slice(&corners);
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

impl InsetShape for Rectangle {
    type Saved = ((f32, f32), (f32, f32));

    fn inset(&mut self, amount: f32) -> Self::Saved {
        let saved = (self.pos, self.size);
        self.pos = (self.pos.0 + amount, self.pos.1 + amount);
        self.size = (self.size.0 - 2.0 * amount, self.size.1 - 2.0 * amount);
        self.dirty = true;
        saved
    }

    fn restore(&mut self, saved: Self::Saved) {
        self.pos = saved.0;
        self.size = saved.1;
    }

    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn has_custom_texture(&self) -> bool {
        self.texture_is_custom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VertexBatch;
    use crate::config::GeometryConfig;

    #[test]
    fn rectangle_derives_clockwise_corners_and_quad_indices() {
        let mut rect = Rectangle::new((0.0, 0.0), (100.0, 100.0));
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        rect.build(&mut batch).unwrap();
        assert_eq!(
            rect.points(),
            &[0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0]
        );
        assert_eq!(batch.vertex_count(), 4);
        assert_eq!(batch.indices(), &[0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn rectangle_setters_short_circuit_on_equal_values() {
        let mut rect = Rectangle::new((1.0, 2.0), (3.0, 4.0));
        let mut batch = VertexBatch::new();
        rect.build(&mut batch).unwrap();
        rect.set_pos((1.0, 2.0));
        rect.set_size((3.0, 4.0));
        assert!(!rect.is_dirty());
        rect.set_size((5.0, 4.0));
        assert!(rect.is_dirty());
    }

    #[test]
    fn quad_rejects_wrong_arity_without_mutating() {
        let mut quad = Quad::new([0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        let err = quad
            .set_points(&[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidGeometry(_)));
        assert_eq!(quad.corner_points(), &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn quad_round_trips_exactly_eight_values() {
        let mut quad = Quad::default();
        let pts = [5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
        quad.set_points(&pts).unwrap();
        assert_eq!(quad.corner_points(), &pts);
    }
}
