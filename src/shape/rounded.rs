//! Rounded rectangle: a triangle fan around the center, with each corner
//! contributing either one sharp vertex or an arc of `segments` points plus
//! an explicit closing vertex.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::batch::{BatchSink, DrawMode};
use crate::config::INDEX_CEILING;
use crate::error::GeometryError;
use crate::math::ArcPoints;
use crate::shape::{InsetShape, ShapeGeometry};
use crate::vertex::{interpolate_region, TexCoordProvider, Vertex, UNIT_TEX_COORDS};

const FRAC_PI_2: f32 = PI / 2.0;

/// Corner radii and segment counts run clockwise from the top-left corner:
/// top-left, top-right, bottom-right, bottom-left.
#[derive(Clone)]
pub struct RoundedRectangle {
    pos: (f32, f32),
    size: (f32, f32),
    radius: [(f32, f32); 4],
    segments: [u32; 4],
    texture: Option<Arc<dyn TexCoordProvider>>,
    points: Vec<f32>,
    dirty: bool,
}

impl RoundedRectangle {
    pub fn new(pos: (f32, f32), size: (f32, f32)) -> Self {
        Self {
            pos,
            size,
            radius: [(10.0, 10.0); 4],
            segments: [10; 4],
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

    pub fn radius(&self) -> &[(f32, f32); 4] {
        &self.radius
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

    /// Sets per-corner `(rx, ry)` radii. One to four entries are accepted;
    /// missing corners replicate the last given entry. Negative radii are
    /// rejected before any mutation.
    pub fn set_radius(&mut self, radius: &[(f32, f32)]) -> Result<(), GeometryError> {
        if radius.is_empty() || radius.len() > 4 {
            return Err(GeometryError::InvalidParameter {
                name: "radius",
                reason: "expected between 1 and 4 corner entries",
            });
        }
        if radius.iter().any(|&(rx, ry)| rx < 0.0 || ry < 0.0) {
            return Err(GeometryError::InvalidParameter {
                name: "radius",
                reason: "corner radii must be non-negative",
            });
        }
        for i in 0..4 {
            self.radius[i] = radius[i.min(radius.len() - 1)];
        }
        self.dirty = true;
        Ok(())
    }

    /// Sets per-corner arc segment counts, with the same 1-to-4 replication
    /// rule as [`set_radius`](RoundedRectangle::set_radius). Zero makes a
    /// corner sharp.
    pub fn set_segments(&mut self, segments: &[u32]) -> Result<(), GeometryError> {
        if segments.is_empty() || segments.len() > 4 {
            return Err(GeometryError::InvalidParameter {
                name: "segments",
                reason: "expected between 1 and 4 corner entries",
            });
        }
        for i in 0..4 {
            self.segments[i] = segments[i.min(segments.len() - 1)];
        }
        self.dirty = true;
        Ok(())
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }

    /// Boundary vertex count contributed by corner `i` after radius clamping.
    fn corner_vertex_count(&self, corner: usize, w: f32, h: f32) -> usize {
        let (rx, ry) = self.radius[corner];
        if self.segments[corner] == 0 || rx.min(w / 2.0) <= 0.0 || ry.min(h / 2.0) <= 0.0 {
            1
        } else {
            self.segments[corner] as usize + 1
        }
    }
}

impl ShapeGeometry for RoundedRectangle {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        let (x, y) = self.pos;
        let (w, h) = self.size;
        if w <= 0.0 || h <= 0.0 {
            // Degenerate but valid during interactive resizing.
            sink.clear_data();
            self.points.clear();
            self.dirty = false;
            return Ok(());
        }

        let boundary: usize = (0..4).map(|i| self.corner_vertex_count(i, w, h)).sum();
        let index_count = boundary + 2;
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
        let tex_at = |px: f32, py: f32| interpolate_region(&tc, (px - x) / w, (py - y) / h);

        let mut vertices: Vec<Vertex> = Vec::new();
        vertices
            .try_reserve(boundary + 1)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: (boundary + 1) * std::mem::size_of::<Vertex>(),
            })?;
        let mut points: Vec<f32> = Vec::new();
        points
            .try_reserve(boundary * 2)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: boundary * 2 * std::mem::size_of::<f32>(),
            })?;

        // Fan center first.
        let (cx, cy) = (x + w / 2.0, y + h / 2.0);
        let [cs, ct] = tex_at(cx, cy);
        vertices.push(Vertex::new(cx, cy, cs, ct));

        let mut push_boundary = |vertices: &mut Vec<Vertex>, px: f32, py: f32| {
            let [s, t] = tex_at(px, py);
            vertices.push(Vertex::new(px, py, s, t));
            points.push(px);
            points.push(py);
        };

        // Clockwise from top-left: arc centers, sharp-corner positions and
        // the start angle of each quarter arc.
        let corner_table = |i: usize, rx: f32, ry: f32| -> (f32, f32, f32, f32, f32) {
            match i {
                0 => (x + rx, y + h - ry, x, y + h, PI),
                1 => (x + w - rx, y + h - ry, x + w, y + h, FRAC_PI_2),
                2 => (x + w - rx, y + ry, x + w, y, 0.0),
                _ => (x + rx, y + ry, x, y, -FRAC_PI_2),
            }
        };

        for i in 0..4 {
            let (rx, ry) = self.radius[i];
            // Radii never exceed half the shape extent.
            let rx = rx.min(w / 2.0);
            let ry = ry.min(h / 2.0);
            let segments = self.segments[i] as usize;
            let (ax, ay, sharp_x, sharp_y, angle_start) = corner_table(i, rx, ry);
            if segments == 0 || rx <= 0.0 || ry <= 0.0 {
                push_boundary(&mut vertices, sharp_x, sharp_y);
                continue;
            }
            let angle_end = angle_start - FRAC_PI_2;
            for (ux, uy) in ArcPoints::new(angle_start, angle_end, segments) {
                push_boundary(&mut vertices, ax + ux * rx, ay + uy * ry);
            }
            // Explicit closing vertex at the exact end angle.
            push_boundary(
                &mut vertices,
                ax + angle_end.cos() * rx,
                ay + angle_end.sin() * ry,
            );
        }

        let mut indices: Vec<u16> = Vec::new();
        indices
            .try_reserve(index_count)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: index_count * std::mem::size_of::<u16>(),
            })?;
        indices.extend(0..=boundary as u16);
        // Close the fan back to the first boundary vertex.
        indices.push(1);

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

impl InsetShape for RoundedRectangle {
    type Saved = ((f32, f32), (f32, f32), [(f32, f32); 4]);

    fn inset(&mut self, amount: f32) -> Self::Saved {
        let saved = (self.pos, self.size, self.radius);
        self.pos = (self.pos.0 + amount, self.pos.1 + amount);
        self.size = (self.size.0 - 2.0 * amount, self.size.1 - 2.0 * amount);
        for (rx, ry) in self.radius.iter_mut() {
            *rx = (*rx - amount).max(0.0);
            *ry = (*ry - amount).max(0.0);
        }
        self.dirty = true;
        saved
    }

    fn restore(&mut self, saved: Self::Saved) {
        self.pos = saved.0;
        self.size = saved.1;
        self.radius = saved.2;
    }

    fn size(&self) -> (f32, f32) {
        self.size
    }

    fn has_custom_texture(&self) -> bool {
        self.texture.is_some()
    }
}
