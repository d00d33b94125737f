//! Antialiasing outline: a thin constant-width ring of triangles traced
//! around an otherwise-aliased filled shape, plus the stencil composition
//! policy that keeps its overlapping triangles from double-blending, and the
//! [`Smooth`] decorator that wires the two together around any inset-capable
//! shape builder.

use crate::batch::{BatchSink, DrawMode};
use crate::error::GeometryError;
use crate::math::{perpendicular_offset, segment_angle, turn_direction};
use crate::shape::InsetShape;
use crate::vertex::Vertex;

/// Total width of the antialiasing ring, tuned against typical display
/// densities.
pub const OUTLINE_WIDTH: f32 = 2.5;

/// How much smaller a smoothed shape's fill is built on every edge, so the
/// fill-plus-outline composite matches the nominal size.
const INSET_COMPENSATION: f32 = 1.0;

/// Shapes whose smallest axis is within this many units of zero skip the
/// outline: the effect no longer reads as antialiasing and inward offsets
/// degenerate.
const MIN_SMOOTH_EXTENT: f32 = 4.0;

/// Consecutive points closer than this in both axes are collapsed before
/// miter computation, which is numerically unstable on near-zero segments.
const FILTER_DISTANCE: f32 = 1.0;

/// Stencil comparison modes consumed from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilCompare {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// One step of the outline draw composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionStep {
    StencilPush,
    /// Replay the wrapped shape's draw to populate the stencil mask.
    DrawMask,
    StencilUse(StencilCompare),
    DrawOutline,
    StencilUnuse,
    StencilPop,
}

/// Stencil primitives the embedding renderer exposes; this subsystem only
/// sequences them.
pub trait StencilOps {
    fn push(&mut self);
    fn pop(&mut self);
    fn use_compare(&mut self, compare: StencilCompare);
    fn unuse(&mut self);
}

/// Replays a shape's draw commands without color output, to populate a
/// stencil mask. A non-owning capability: the outline never owns or
/// mutates the shape behind it.
pub trait MaskReplay {
    fn replay(&mut self);
}

/// Draw-order steps for compositing the outline over a fill with the given
/// alpha.
///
/// Below full opacity the outline is bracketed by a stencil mask built from
/// the wrapped shape, so its overlapping triangles cannot accumulate alpha
/// twice. At alpha 1.0 no blending artifact is possible and the stencil
/// round-trip is skipped.
pub fn composition_plan(fill_alpha: f32) -> &'static [CompositionStep] {
    use CompositionStep::*;
    if fill_alpha < 1.0 {
        &[
            StencilPush,
            DrawMask,
            StencilUse(StencilCompare::Greater),
            DrawOutline,
            StencilUnuse,
            DrawMask,
            StencilPop,
        ]
    } else {
        &[DrawOutline]
    }
}

/// Walks a composition plan against the renderer's stencil primitives.
pub fn compose(
    plan: &[CompositionStep],
    stencil: &mut dyn StencilOps,
    mask: &mut dyn MaskReplay,
    draw_outline: &mut dyn FnMut(),
) {
    for step in plan {
        match step {
            CompositionStep::StencilPush => stencil.push(),
            CompositionStep::DrawMask => mask.replay(),
            CompositionStep::StencilUse(compare) => stencil.use_compare(*compare),
            CompositionStep::DrawOutline => draw_outline(),
            CompositionStep::StencilUnuse => stencil.unuse(),
            CompositionStep::StencilPop => stencil.pop(),
        }
    }
}

/// The outline ring generator.
///
/// Feed it a shape's boundary points; it filters near-duplicates and emits
/// a constant-width quad strip with miter-joint triangles at the corners.
/// With fewer than 3 usable points it disables itself and pushes empty
/// geometry, the expected steady state while a shape is interactively
/// resized through degeneracy.
#[derive(Debug, Clone)]
pub struct AntiAliasingOutline {
    points: Vec<f32>,
    close: bool,
    width: f32,
    dirty: bool,
}

impl Default for AntiAliasingOutline {
    fn default() -> Self {
        Self::new()
    }
}

impl AntiAliasingOutline {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            close: true,
            width: OUTLINE_WIDTH,
            dirty: true,
        }
    }

    /// Replaces the boundary ring. Near-duplicate consecutive points are
    /// collapsed, as is a closing duplicate of the first point.
    pub fn set_points(&mut self, points: &[f32], close: bool) {
        self.points.clear();
        for pair in points.chunks_exact(2) {
            let n = self.points.len();
            if n >= 2
                && (pair[0] - self.points[n - 2]).abs() < FILTER_DISTANCE
                && (pair[1] - self.points[n - 1]).abs() < FILTER_DISTANCE
            {
                continue;
            }
            self.points.push(pair[0]);
            self.points.push(pair[1]);
        }
        // Collapse a closing duplicate of the first point.
        let n = self.points.len();
        if n >= 4
            && (self.points[n - 2] - self.points[0]).abs() < FILTER_DISTANCE
            && (self.points[n - 1] - self.points[1]).abs() < FILTER_DISTANCE
        {
            self.points.truncate(n - 2);
        }
        if self.points.len() < 6 {
            self.points.clear();
        }
        self.close = close;
        self.dirty = true;
    }

    /// The filtered ring.
    pub fn points(&self) -> &[f32] {
        &self.points
    }

    /// False when filtering left fewer than 3 usable points.
    pub fn is_enabled(&self) -> bool {
        !self.points.is_empty()
    }

    /// Rebuilds the ring triangles and pushes them to `sink`; a disabled
    /// outline pushes empty geometry.
    pub fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        if !self.dirty {
            return Ok(());
        }
        if !self.is_enabled() {
            sink.set_mode(DrawMode::Triangles);
            sink.set_data(&[], &[])?;
            self.dirty = false;
            return Ok(());
        }

        let count = self.points.len() / 2;
        let segment_count = if self.close { count } else { count - 1 };
        // Each segment is a quad; each joint adds a miter triangle. An open
        // polyline has no joint at either end.
        let joint_count = if self.close { count } else { count - 2 };
        let max_vertices = segment_count * 4 + joint_count * 3;
        let max_indices = segment_count * 6 + joint_count * 3;
        // The per-segment cursors are u16; a ring this large would wrap them
        // and index the wrong quads.
        if max_vertices > u16::MAX as usize + 1 {
            return Err(GeometryError::CapacityExceeded {
                what: "vertex",
                count: max_vertices,
                limit: u16::MAX as usize + 1,
            });
        }

        let mut vertices: Vec<Vertex> = Vec::new();
        vertices
            .try_reserve(max_vertices)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: max_vertices * std::mem::size_of::<Vertex>(),
            })?;
        let mut indices: Vec<u16> = Vec::new();
        indices
            .try_reserve(max_indices)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: max_indices * std::mem::size_of::<u16>(),
            })?;

        let half = self.width / 2.0;
        let point = |i: usize| {
            let i = i % count;
            (self.points[i * 2], self.points[i * 2 + 1])
        };

        let mut prev_angle: Option<f32> = None;
        for seg in 0..segment_count {
            let (x0, y0) = point(seg);
            let (x1, y1) = point(seg + 1);
            let angle = segment_angle(x0, y0, x1, y1);
            let (ox, oy) = perpendicular_offset(angle, half);

            let base = vertices.len() as u16;
            vertices.push(Vertex::new(x0 + ox, y0 + oy, 0.0, 0.0));
            vertices.push(Vertex::new(x0 - ox, y0 - oy, 0.0, 0.0));
            vertices.push(Vertex::new(x1 + ox, y1 + oy, 0.0, 0.0));
            vertices.push(Vertex::new(x1 - ox, y1 - oy, 0.0, 0.0));
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);

            // Fill the notch between this segment's offset and the previous
            // one on the outer side of the turn.
            if let Some(prev) = prev_angle {
                let direction = turn_direction(prev, angle);
                let (px, py) = perpendicular_offset(prev, half);
                let joint = vertices.len() as u16;
                vertices.push(Vertex::new(x0, y0, 0.0, 0.0));
                vertices.push(Vertex::new(x0 + direction * px, y0 + direction * py, 0.0, 0.0));
                vertices.push(Vertex::new(x0 + direction * ox, y0 + direction * oy, 0.0, 0.0));
                indices.extend_from_slice(&[joint, joint + 1, joint + 2]);
            }
            prev_angle = Some(angle);
        }

        // A closed ring also needs the joint between the last and first
        // segments, at the ring's starting point.
        if self.close {
            if let Some(prev) = prev_angle {
                let (x0, y0) = point(0);
                let (x1, y1) = point(1);
                let angle = segment_angle(x0, y0, x1, y1);
                let direction = turn_direction(prev, angle);
                let (px, py) = perpendicular_offset(prev, half);
                let (ox, oy) = perpendicular_offset(angle, half);
                let joint = vertices.len() as u16;
                vertices.push(Vertex::new(x0, y0, 0.0, 0.0));
                vertices.push(Vertex::new(x0 + direction * px, y0 + direction * py, 0.0, 0.0));
                vertices.push(Vertex::new(x0 + direction * ox, y0 + direction * oy, 0.0, 0.0));
                indices.extend_from_slice(&[joint, joint + 1, joint + 2]);
            }
        }

        sink.set_mode(DrawMode::Triangles);
        sink.set_data(&vertices, &indices)?;
        self.dirty = false;
        Ok(())
    }
}

/// Decorates an inset-capable shape with an antialiasing outline.
///
/// On build, the wrapped shape is contracted by the outline compensation,
/// built into the fill sink, and its boundary feeds the outline ring built
/// into the outline sink; the nominal parameters are restored afterwards.
/// The outline is skipped for shapes with a custom texture region bound and
/// for shapes too small for the effect to read.
pub struct Smooth<S: InsetShape> {
    shape: S,
    outline: AntiAliasingOutline,
    outline_active: bool,
}

impl<S: InsetShape> Smooth<S> {
    pub fn new(shape: S) -> Self {
        Self {
            shape,
            outline: AntiAliasingOutline::new(),
            outline_active: false,
        }
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Parameter mutations go through here; they dirty the wrapped shape as
    /// usual and the next build refreshes both fill and outline.
    pub fn shape_mut(&mut self) -> &mut S {
        &mut self.shape
    }

    pub fn outline(&self) -> &AntiAliasingOutline {
        &self.outline
    }

    /// True when the last build produced an outline ring.
    pub fn outline_active(&self) -> bool {
        self.outline_active && self.outline.is_enabled()
    }

    /// Rebuilds the fill (inset when smoothing applies) and the outline.
    pub fn build(
        &mut self,
        fill_sink: &mut dyn BatchSink,
        outline_sink: &mut dyn BatchSink,
    ) -> Result<(), GeometryError> {
        let (w, h) = self.shape.size();
        let smoothable = !self.shape.has_custom_texture()
            && w.abs() > MIN_SMOOTH_EXTENT
            && h.abs() > MIN_SMOOTH_EXTENT;

        if !smoothable {
            self.shape.build(fill_sink)?;
            if self.outline_active {
                self.outline.set_points(&[], true);
                self.outline.build(outline_sink)?;
                self.outline_active = false;
            }
            return Ok(());
        }

        if self.shape.is_dirty() {
            let saved = self.shape.inset(INSET_COMPENSATION);
            let built = self.shape.build(fill_sink);
            if built.is_err() {
                self.shape.restore(saved);
                self.shape.mark_dirty();
                return built;
            }
            self.outline.set_points(self.shape.points(), true);
            self.shape.restore(saved);
            self.outline_active = true;
        }
        self.outline.build(outline_sink)
    }

    /// Draw-order steps for this frame, given the active fill alpha. Empty
    /// when the outline is disabled.
    pub fn composition_plan(&self, fill_alpha: f32) -> &'static [CompositionStep] {
        if self.outline_active() {
            composition_plan(fill_alpha)
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::VertexBatch;

    #[test]
    fn near_duplicate_points_disable_the_outline() {
        let mut outline = AntiAliasingOutline::new();
        outline.set_points(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 10.0], true);
        assert!(!outline.is_enabled());
        let mut batch = VertexBatch::new();
        batch
            .set_data(&[Vertex::default()], &[0])
            .expect("seed data");
        outline.build(&mut batch).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn closing_duplicate_is_collapsed() {
        let mut outline = AntiAliasingOutline::new();
        outline.set_points(
            &[0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0, 0.0, 0.0],
            true,
        );
        assert_eq!(outline.points().len(), 8);
    }

    #[test]
    fn closed_square_ring_has_a_quad_and_joint_per_segment() {
        let mut outline = AntiAliasingOutline::new();
        outline.set_points(&[0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0], true);
        let mut batch = VertexBatch::new();
        outline.build(&mut batch).unwrap();
        // 4 segments * (4 quad vertices + 3 joint vertices).
        assert_eq!(batch.vertex_count(), 4 * 4 + 4 * 3);
        assert_eq!(batch.index_count(), 4 * 6 + 4 * 3);
        assert_eq!(batch.mode(), DrawMode::Triangles);
    }

    #[test]
    fn open_polyline_has_interior_joints_only() {
        let mut outline = AntiAliasingOutline::new();
        outline.set_points(&[0.0, 0.0, 50.0, 0.0, 50.0, 50.0], false);
        let mut batch = VertexBatch::new();
        outline.build(&mut batch).unwrap();
        // 2 segments, 1 interior joint.
        assert_eq!(batch.vertex_count(), 2 * 4 + 3);
        assert_eq!(batch.index_count(), 2 * 6 + 3);
    }

    #[test]
    fn oversized_rings_are_rejected_before_the_cursor_wraps() {
        // A closed ring emits 7 vertices per point; 9400 points would need
        // 65 800, past what the u16 segment cursors can address.
        let mut outline = AntiAliasingOutline::new();
        let ring: Vec<f32> = (0..9400).flat_map(|i| [i as f32 * 2.0, 0.0]).collect();
        outline.set_points(&ring, true);
        assert!(outline.is_enabled());
        let mut batch = VertexBatch::with_config(crate::config::GeometryConfig::RELAXED);
        let err = outline.build(&mut batch).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::CapacityExceeded { what: "vertex", .. }
        ));
        assert!(batch.is_empty());
    }

    #[test]
    fn transparent_fill_uses_the_stencil_bracket() {
        use CompositionStep::*;
        assert_eq!(
            composition_plan(0.5),
            &[
                StencilPush,
                DrawMask,
                StencilUse(StencilCompare::Greater),
                DrawOutline,
                StencilUnuse,
                DrawMask,
                StencilPop,
            ]
        );
        assert_eq!(composition_plan(1.0), &[DrawOutline]);
    }
}
