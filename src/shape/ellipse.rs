//! Ellipse and pie-slice tessellation. Angles are in degrees, zero at
//! twelve o'clock, increasing clockwise.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::batch::{BatchSink, DrawMode};
use crate::config::INDEX_CEILING;
use crate::error::GeometryError;
use crate::math::ArcPoints;
use crate::shape::{InsetShape, ShapeGeometry};
use crate::vertex::{interpolate_region, TexCoordProvider, Vertex, UNIT_TEX_COORDS};

/// A filled ellipse, or a pie slice of one when the angle span is partial.
///
/// Tessellated as a triangle fan whose center vertex is appended after the
/// boundary ring. A full circle reuses boundary vertex 0 to close the fan
/// instead of duplicating it.
#[derive(Clone)]
pub struct Ellipse {
    pos: (f32, f32),
    size: (f32, f32),
    angle_start: f32,
    angle_end: f32,
    segments: Option<u32>,
    texture: Option<Arc<dyn TexCoordProvider>>,
    points: Vec<f32>,
    dirty: bool,
}

impl Ellipse {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            pos,
            size,
            angle_start: 0.0,
            angle_end: 360.0,
            segments: None,
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

    pub fn angles(&self) -> (f32, f32) {
        (self.angle_start, self.angle_end)
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

    /// Sets the angle span in degrees.
    pub fn set_angles(&mut self, angle_start: f32, angle_end: f32) {
        if (self.angle_start, self.angle_end) != (angle_start, angle_end) {
            self.angle_start = angle_start;
            self.angle_end = angle_end;
            self.dirty = true;
        }
    }

    /// Sets an explicit boundary segment count.
    ///
    /// Counts below 3 cannot form a triangulatable boundary; they log a
    /// warning and fall back to the span-derived automatic count. Counts
    /// whose fan would overflow the index ceiling are rejected.
    pub fn set_segments(&mut self, segments: u32) -> Result<(), GeometryError> {
        if segments as usize + 3 > INDEX_CEILING {
            return Err(GeometryError::CapacityExceeded {
                what: "segment",
                count: segments as usize,
                limit: INDEX_CEILING - 3,
            });
        }
        if segments < 3 {
            tracing::warn!(
                segments,
                "ellipse segment count below 3, falling back to automatic derivation"
            );
            self.segments = None;
        } else {
            self.segments = Some(segments);
        }
        self.dirty = true;
        Ok(())
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }

    /// The segment count the next build will use.
    pub fn resolved_segments(&self) -> usize {
        match self.segments {
            Some(s) => s as usize,
            None => ((self.angle_end - self.angle_start).abs() / 2.0).max(1.0) as usize,
        }
    }

    fn is_full_circle(&self) -> bool {
        let span = (self.angle_end - self.angle_start).abs();
        span == 360.0 || self.angle_start == self.angle_end
    }
}

impl ShapeGeometry for Ellipse {
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

        let segments = self.resolved_segments();
        let full = self.is_full_circle();
        let boundary = if full { segments } else { segments + 1 };
        let vertex_count = boundary + 1;
        let index_count = segments + 2;
        if index_count > INDEX_CEILING {
            return Err(GeometryError::CapacityExceeded {
                what: "index",
                count: index_count,
                limit: INDEX_CEILING,
            });
        }

        let tc = self
            .texture
            .as_ref()
            .map(|t| t.tex_coords())
            .unwrap_or(UNIT_TEX_COORDS);
        let rx = w / 2.0;
        let ry = h / 2.0;
        let (cx, cy) = (x + rx, y + ry);

        // Clockwise-from-top degrees map onto standard math angles as
        // pi/2 - theta; a full 360-degree span becomes a -2*pi sweep.
        let start = FRAC_PI_2 - self.angle_start.to_radians();
        let end = if full {
            start - 2.0 * std::f32::consts::PI
        } else {
            FRAC_PI_2 - self.angle_end.to_radians()
        };

        let mut vertices: Vec<Vertex> = Vec::new();
        vertices
            .try_reserve(vertex_count)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: vertex_count * std::mem::size_of::<Vertex>(),
            })?;
        let mut points: Vec<f32> = Vec::new();
        points
            .try_reserve(boundary * 2)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: boundary * 2 * std::mem::size_of::<f32>(),
            })?;

        let mut push = |vertices: &mut Vec<Vertex>, px: f32, py: f32| {
            let [s, t] = interpolate_region(&tc, (px - x) / w, (py - y) / h);
            vertices.push(Vertex::new(px, py, s, t));
            points.push(px);
            points.push(py);
        };

        for (ux, uy) in ArcPoints::new(start, end, segments) {
            push(&mut vertices, cx + ux * rx, cy + uy * ry);
        }
        if !full {
            // Explicit closing vertex at the exact end angle.
            push(&mut vertices, cx + end.cos() * rx, cy + end.sin() * ry);
        }
        // Fan center goes last.
        let [cs, ct] = interpolate_region(&tc, 0.5, 0.5);
        vertices.push(Vertex::new(cx, cy, cs, ct));

        let center = boundary as u16;
        let mut indices: Vec<u16> = Vec::new();
        indices
            .try_reserve(index_count)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: index_count * std::mem::size_of::<u16>(),
            })?;
        indices.push(center);
        indices.extend(0..boundary as u16);
        if full {
            // Reuse the first boundary vertex rather than duplicating it.
            indices.push(0);
        }

        sink.set_mode(DrawMode::TriangleFan);
        sink.set_data(&vertices, &indices)?;
        self.points = points;
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

impl InsetShape for Ellipse {
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
        self.texture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VertexBatch;
    use crate::config::GeometryConfig;

    #[test]
    fn full_circle_reuses_the_first_boundary_vertex() {
        let mut ellipse = Ellipse::new((0.0, 0.0), (100.0, 100.0));
        ellipse.set_segments(32).unwrap();
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        ellipse.build(&mut batch).unwrap();
        // Boundary ring of `segments` points plus the center, no duplicate.
        assert_eq!(batch.vertex_count(), 33);
        let indices = batch.indices();
        assert_eq!(indices[0], 32); // fan center
        assert_eq!(*indices.last().unwrap(), 0);
    }

    #[test]
    fn partial_span_adds_an_explicit_closing_vertex() {
        let mut ellipse = Ellipse::new((0.0, 0.0), (100.0, 100.0));
        ellipse.set_angles(0.0, 90.0);
        ellipse.set_segments(8).unwrap();
        let mut batch = VertexBatch::new();
        ellipse.build(&mut batch).unwrap();
        // 8 arc points + closing vertex + center.
        assert_eq!(batch.vertex_count(), 10);
        // Boundary starts at twelve o'clock and ends at three o'clock.
        let pts = ellipse.points();
        assert!((pts[0] - 50.0).abs() < 1e-3);
        assert!((pts[1] - 100.0).abs() < 1e-3);
        let n = pts.len();
        assert!((pts[n - 2] - 100.0).abs() < 1e-3);
        assert!((pts[n - 1] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn auto_segment_count_derives_from_the_angle_span() {
        let mut ellipse = Ellipse::new((0.0, 0.0), (10.0, 10.0));
        ellipse.set_angles(0.0, 90.0);
        assert_eq!(ellipse.resolved_segments(), 45);
        ellipse.set_angles(10.0, 11.0);
        assert_eq!(ellipse.resolved_segments(), 1);
    }

    #[test]
    fn undersized_segment_count_falls_back_to_auto() {
        let mut ellipse = Ellipse::new((0.0, 0.0), (10.0, 10.0));
        ellipse.set_segments(2).unwrap();
        assert_eq!(ellipse.resolved_segments(), 180);
    }

    #[test]
    fn zero_size_disables_itself_instead_of_erroring() {
        let mut ellipse = Ellipse::new((0.0, 0.0), (0.0, 100.0));
        let mut batch = VertexBatch::new();
        ellipse.build(&mut batch).unwrap();
        assert!(batch.is_empty());
        assert!(ellipse.points().is_empty());
        assert!(!ellipse.is_dirty());
    }
}
