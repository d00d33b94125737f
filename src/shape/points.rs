//! Point clouds: every logical point expands to a small fixed marker. The
//! dominant interactive path is [`PointCloud::add_point`], which tessellates
//! only the new marker and appends it through the sink instead of rebuilding
//! the whole cloud.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::batch::{BatchSink, DrawMode};
use crate::config::MAX_POINT_COORDS;
use crate::error::GeometryError;
use crate::shape::ShapeGeometry;
use crate::vertex::{interpolate_region, region_corner, TexCoordProvider, Vertex, UNIT_TEX_COORDS};

/// Marker geometry expanded around each logical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerStyle {
    /// An axis-aligned quad: 4 vertices, 6 indices, triangle list.
    #[default]
    Square,
    /// A plus sign: 12 vertices, 14 indices, triangle strip. The strip walks
    /// the three columns of the glyph; column joins are collinear and the
    /// first and last index are doubled, so consecutive marker blocks stitch
    /// with degenerate triangles and no extra bridge indices.
    Plus,
}

impl MarkerStyle {
    pub fn vertices_per_point(self) -> usize {
        match self {
            MarkerStyle::Square => 4,
            MarkerStyle::Plus => 12,
        }
    }

    pub fn indices_per_point(self) -> usize {
        match self {
            MarkerStyle::Square => 6,
            MarkerStyle::Plus => 14,
        }
    }

    fn draw_mode(self) -> DrawMode {
        match self {
            MarkerStyle::Square => DrawMode::Triangles,
            MarkerStyle::Plus => DrawMode::TriangleStrip,
        }
    }
}

/// A cloud of identical markers centered on a flat `(x, y)` point list.
#[derive(Clone)]
pub struct PointCloud {
    points: Vec<f32>,
    point_size: f32,
    style: MarkerStyle,
    texture: Option<Arc<dyn TexCoordProvider>>,
    dirty: bool,
}

impl PointCloud {
    /// `point_size` is the marker half-extent: a size of 1 covers 2x2 units.
    pub fn new(style: MarkerStyle, point_size: f32) -> Self {
        Self {
            points: Vec::new(),
            point_size: point_size.max(f32::MIN_POSITIVE),
            style,
            texture: None,
            dirty: true,
        }
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Replaces the whole point list. Rejected without mutation when the
    /// coordinate count is odd or exceeds [`MAX_POINT_COORDS`].
    pub fn set_points(&mut self, points: &[f32]) -> Result<(), GeometryError> {
        if points.len() % 2 != 0 {
            return Err(GeometryError::InvalidGeometry(format!(
                "point list needs an even coordinate count, got {}",
                points.len()
            )));
        }
        if points.len() > MAX_POINT_COORDS {
            return Err(GeometryError::CapacityExceeded {
                what: "point coordinate",
                count: points.len(),
                limit: MAX_POINT_COORDS,
            });
        }
        self.points.clear();
        self.points.extend_from_slice(points);
        self.dirty = true;
        Ok(())
    }

    /// Changing the marker size moves every vertex, so this always forces a
    /// full rebuild.
    pub fn set_point_size(&mut self, point_size: f32) -> Result<(), GeometryError> {
        if point_size <= 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "point_size",
                reason: "must be positive",
            });
        }
        self.point_size = point_size;
        self.dirty = true;
        Ok(())
    }

    pub fn set_texture(&mut self, texture: Option<Arc<dyn TexCoordProvider>>) {
        self.texture = texture;
        self.dirty = true;
    }

    /// Appends one point. When the existing buffer is in sync this
    /// tessellates only the new marker and takes the sink's incremental
    /// append path; a pending full rebuild just absorbs the point.
    ///
    /// The point list is committed only after the sink accepts the marker,
    /// so a capacity failure leaves the cloud unchanged.
    pub fn add_point(
        &mut self,
        x: f32,
        y: f32,
        sink: &mut dyn BatchSink,
    ) -> Result<(), GeometryError> {
        if self.points.len() + 2 > MAX_POINT_COORDS {
            return Err(GeometryError::CapacityExceeded {
                what: "point coordinate",
                count: self.points.len() + 2,
                limit: MAX_POINT_COORDS,
            });
        }
        if !self.dirty {
            let tc = self.region();
            let mut vertices: SmallVec<[Vertex; 12]> = SmallVec::new();
            let mut indices: SmallVec<[u16; 14]> = SmallVec::new();
            self.marker(x, y, &tc, &mut vertices, &mut indices);
            if self.points.is_empty() {
                sink.set_mode(self.style.draw_mode());
            }
            tracing::trace!(x, y, "appending point marker incrementally");
            sink.append_data(&vertices, &indices)?;
        }
        self.points.push(x);
        self.points.push(y);
        Ok(())
    }

    fn region(&self) -> [f32; 8] {
        self.texture
            .as_ref()
            .map(|t| t.tex_coords())
            .unwrap_or(UNIT_TEX_COORDS)
    }

    /// Emits one marker's vertices and block-relative indices.
    fn marker(
        &self,
        x: f32,
        y: f32,
        tc: &[f32; 8],
        vertices: &mut SmallVec<[Vertex; 12]>,
        indices: &mut SmallVec<[u16; 14]>,
    ) {
        let s = self.point_size;
        match self.style {
            MarkerStyle::Square => {
                let corners = [
                    (x - s, y - s),
                    (x + s, y - s),
                    (x + s, y + s),
                    (x - s, y + s),
                ];
                for (i, &(px, py)) in corners.iter().enumerate() {
                    let [ts, tt] = region_corner(tc, i);
                    vertices.push(Vertex::new(px, py, ts, tt));
                }
                indices.extend_from_slice(&[0, 1, 2, 2, 3, 0]);
            }
            MarkerStyle::Plus => {
                // Three columns left to right; arm thickness is a third of
                // the glyph extent.
                let a = s / 3.0;
                let corners = [
                    (x - s, y - a),
                    (x - s, y + a),
                    (x - a, y - a),
                    (x - a, y + a),
                    (x - a, y - s),
                    (x - a, y + s),
                    (x + a, y - s),
                    (x + a, y + s),
                    (x + a, y - a),
                    (x + a, y + a),
                    (x + s, y - a),
                    (x + s, y + a),
                ];
                for &(px, py) in corners.iter() {
                    let [ts, tt] =
                        interpolate_region(tc, (px - (x - s)) / (2.0 * s), (py - (y - s)) / (2.0 * s));
                    vertices.push(Vertex::new(px, py, ts, tt));
                }
                indices.extend_from_slice(&[0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 11]);
            }
        }
    }
}

impl ShapeGeometry for PointCloud {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        let count = self.points.len() / 2;
        // The marker indices address vertices through the u16 block base;
        // past 65 536 vertices the cursor would wrap, so reject the build
        // outright just like the sink's append path does.
        let total_vertices = count * self.style.vertices_per_point();
        if total_vertices > u16::MAX as usize + 1 {
            return Err(GeometryError::CapacityExceeded {
                what: "vertex",
                count: total_vertices,
                limit: u16::MAX as usize + 1,
            });
        }
        let tc = self.region();

        let mut vertices: Vec<Vertex> = Vec::new();
        vertices
            .try_reserve(count * self.style.vertices_per_point())
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: count * self.style.vertices_per_point() * std::mem::size_of::<Vertex>(),
            })?;
        let mut indices: Vec<u16> = Vec::new();
        indices
            .try_reserve(count * self.style.indices_per_point())
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: count * self.style.indices_per_point() * std::mem::size_of::<u16>(),
            })?;

        let mut marker_vertices: SmallVec<[Vertex; 12]> = SmallVec::new();
        let mut marker_indices: SmallVec<[u16; 14]> = SmallVec::new();
        for i in 0..count {
            marker_vertices.clear();
            marker_indices.clear();
            self.marker(
                self.points[i * 2],
                self.points[i * 2 + 1],
                &tc,
                &mut marker_vertices,
                &mut marker_indices,
            );
            let base = vertices.len() as u16;
            vertices.extend_from_slice(&marker_vertices);
            indices.extend(marker_indices.iter().map(|idx| idx + base));
        }

        sink.set_mode(self.style.draw_mode());
        sink.set_data(&vertices, &indices)?;
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
