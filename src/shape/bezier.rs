//! Bézier polyline: a single curve of arbitrary degree flattened to a line
//! strip, with optional closing and distance-correct dashing.

use crate::batch::{BatchSink, DrawMode};
use crate::config::INDEX_CEILING;
use crate::error::GeometryError;
use crate::math::bezier_point;
use crate::shape::ShapeGeometry;
use crate::vertex::Vertex;

/// A flattened Bézier curve drawn as a line strip.
///
/// The control polygon is a flat `(x, y)` list; the curve's degree is the
/// number of control points minus one. Dashing is active when `dash_offset`
/// is positive: the renderer is expected to bind a repeating 1D pattern
/// texture of [`dash_texture_size`](Bezier::dash_texture_size), and the
/// builder assigns running arc-length S coordinates so the pattern is
/// distance-correct rather than parameter-correct.
#[derive(Debug, Clone)]
pub struct Bezier {
    control: Vec<f32>,
    segments: u32,
    loop_closed: bool,
    dash_length: f32,
    dash_offset: f32,
    points: Vec<f32>,
    dirty: bool,
}

impl Default for Bezier {
    fn default() -> Self {
        Self::new()
    }
}

impl Bezier {
    pub fn new() -> Self {
        Self {
            control: Vec::new(),
            segments: 180,
            loop_closed: false,
            dash_length: 1.0,
            dash_offset: 0.0,
            points: Vec::new(),
            dirty: true,
        }
    }

    /// Replaces the control polygon. The list must hold an even number of
    /// values (flat `(x, y)` pairs).
    pub fn set_points(&mut self, control: &[f32]) -> Result<(), GeometryError> {
        if control.len() % 2 != 0 {
            return Err(GeometryError::InvalidGeometry(format!(
                "Bezier control points need an even coordinate count, got {}",
                control.len()
            )));
        }
        self.control.clear();
        self.control.extend_from_slice(control);
        self.dirty = true;
        Ok(())
    }

    pub fn control_points(&self) -> &[f32] {
        &self.control
    }

    /// Sets the flattening segment count. A curve needs at least 2 segments.
    pub fn set_segments(&mut self, segments: u32) -> Result<(), GeometryError> {
        if segments <= 1 {
            return Err(GeometryError::InvalidParameter {
                name: "segments",
                reason: "a curve needs at least 2 segments",
            });
        }
        if segments as usize + 2 > INDEX_CEILING {
            return Err(GeometryError::CapacityExceeded {
                what: "segment",
                count: segments as usize,
                limit: INDEX_CEILING - 2,
            });
        }
        if self.segments != segments {
            self.segments = segments;
            self.dirty = true;
        }
        Ok(())
    }

    /// Closes the curve by appending the first coordinate pair to the
    /// control polygon at build time.
    pub fn set_loop(&mut self, loop_closed: bool) {
        if self.loop_closed != loop_closed {
            self.loop_closed = loop_closed;
            self.dirty = true;
        }
    }

    pub fn set_dash_length(&mut self, dash_length: f32) -> Result<(), GeometryError> {
        if dash_length < 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "dash_length",
                reason: "must be non-negative",
            });
        }
        self.dash_length = dash_length;
        self.dirty = true;
        Ok(())
    }

    pub fn set_dash_offset(&mut self, dash_offset: f32) -> Result<(), GeometryError> {
        if dash_offset < 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "dash_offset",
                reason: "must be non-negative",
            });
        }
        self.dash_offset = dash_offset;
        self.dirty = true;
        Ok(())
    }

    pub fn is_dashed(&self) -> bool {
        self.dash_offset > 0.0
    }

    /// Size of the repeating 1D dash-pattern texture the renderer should
    /// bind, or `None` when the curve is solid.
    pub fn dash_texture_size(&self) -> Option<(u32, u32)> {
        self.is_dashed()
            .then(|| ((self.dash_length + self.dash_offset).max(1.0) as u32, 1))
    }
}

impl ShapeGeometry for Bezier {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        if self.control.is_empty() {
            sink.clear_data();
            self.points.clear();
            self.dirty = false;
            return Ok(());
        }

        let mut control = Vec::new();
        control
            .try_reserve(self.control.len() + 2)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: (self.control.len() + 2) * std::mem::size_of::<f32>(),
            })?;
        control.extend_from_slice(&self.control);
        if self.loop_closed {
            control.push(self.control[0]);
            control.push(self.control[1]);
        }

        let segments = self.segments as usize;
        let sample_count = segments + 1;
        let mut scratch = vec![0.0f32; control.len()];
        let mut points: Vec<f32> = Vec::new();
        points
            .try_reserve(sample_count * 2)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: sample_count * 2 * std::mem::size_of::<f32>(),
            })?;

        for i in 0..segments {
            let t = i as f32 / segments as f32;
            scratch.copy_from_slice(&control);
            let (px, py) = bezier_point(&mut scratch, t);
            points.push(px);
            points.push(py);
        }
        // Close with the original last control point, not a re-collapsed
        // sample, so float drift never shows at t = 1.
        let n = control.len();
        points.push(control[n - 2]);
        points.push(control[n - 1]);

        let mut vertices: Vec<Vertex> = Vec::new();
        vertices
            .try_reserve(sample_count)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: sample_count * std::mem::size_of::<Vertex>(),
            })?;
        let pattern_length = self.dash_length + self.dash_offset;
        let dashed = self.is_dashed() && pattern_length > 0.0;
        let mut distance = 0.0f32;
        for i in 0..sample_count {
            let (px, py) = (points[i * 2], points[i * 2 + 1]);
            if dashed && i > 0 {
                let dx = px - points[(i - 1) * 2];
                let dy = py - points[(i - 1) * 2 + 1];
                distance += (dx * dx + dy * dy).sqrt();
            }
            let s = if dashed { distance / pattern_length } else { 0.0 };
            vertices.push(Vertex::new(px, py, s, 0.0));
        }

        let indices: Vec<u16> = (0..sample_count as u16).collect();
        sink.set_mode(DrawMode::LineStrip);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VertexBatch;
    use crate::config::GeometryConfig;

    #[test]
    fn all_zero_control_points_sample_to_the_origin() {
        let mut bezier = Bezier::new();
        bezier.set_points(&[0.0; 8]).unwrap();
        bezier.set_segments(10).unwrap();
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        bezier.build(&mut batch).unwrap();
        assert_eq!(batch.vertex_count(), 11);
        for v in batch.vertices() {
            assert_eq!(v.position, [0.0, 0.0]);
        }
    }

    #[test]
    fn loop_appends_the_first_coordinate_pair() {
        let mut bezier = Bezier::new();
        bezier.set_points(&[0.0, 0.0, 10.0, 0.0, 10.0, 10.0]).unwrap();
        bezier.set_segments(4).unwrap();
        bezier.set_loop(true);
        let mut batch = VertexBatch::new();
        bezier.build(&mut batch).unwrap();
        let pts = bezier.points();
        assert_eq!(&pts[pts.len() - 2..], &[0.0, 0.0]);
    }

    #[test]
    fn dashing_assigns_running_arc_length_coordinates() {
        let mut bezier = Bezier::new();
        // A straight 100-unit horizontal line.
        bezier.set_points(&[0.0, 0.0, 100.0, 0.0]).unwrap();
        bezier.set_segments(4).unwrap();
        bezier.set_dash_length(6.0).unwrap();
        bezier.set_dash_offset(4.0).unwrap();
        assert_eq!(bezier.dash_texture_size(), Some((10, 1)));
        let mut batch = VertexBatch::new();
        bezier.build(&mut batch).unwrap();
        let vertices = batch.vertices();
        assert_eq!(vertices[0].tex_coords[0], 0.0);
        let last = vertices.last().unwrap().tex_coords[0];
        assert!((last - 10.0).abs() < 1e-3); // 100 units / 10-unit pattern
    }

    #[test]
    fn negative_dash_parameters_are_rejected() {
        let mut bezier = Bezier::new();
        assert!(bezier.set_dash_length(-1.0).is_err());
        assert!(bezier.set_dash_offset(-0.5).is_err());
    }

    #[test]
    fn single_segment_count_is_invalid_for_a_curve() {
        let mut bezier = Bezier::new();
        let err = bezier.set_segments(1).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidParameter { .. }));
    }
}
