//! Caller-supplied meshes. Unlike the fixed shapes, the vertex and index
//! data come from outside; the builder validates, converts to the packed
//! vertex layout and enforces the index ceiling per its configuration.

use crate::batch::{BatchSink, DrawMode};
use crate::config::{GeometryConfig, INDEX_CEILING};
use crate::error::GeometryError;
use crate::shape::ShapeGeometry;
use crate::vertex::Vertex;

/// Number of floats per mesh vertex: `x, y, s, t`.
const VERTEX_STRIDE: usize = 4;

/// A mesh built from flat caller-owned buffers.
///
/// # Staleness hazard
///
/// [`vertices_mut`](Mesh::vertices_mut) and [`indices_mut`](Mesh::indices_mut)
/// allow in-place edits without notifying the dirty flag. `build` re-checks
/// the stored buffer lengths on every call, so appends and truncations are
/// picked up, but a same-length in-place edit is invisible to the length
/// poll and requires an explicit [`mark_dirty`](ShapeGeometry::mark_dirty).
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<f32>,
    indices: Vec<u16>,
    mode: DrawMode,
    config: GeometryConfig,
    built_vertex_len: usize,
    built_index_len: usize,
    points: Vec<f32>,
    dirty: bool,
}

impl Mesh {
    pub fn new(mode: DrawMode, config: GeometryConfig) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            mode,
            config,
            built_vertex_len: 0,
            built_index_len: 0,
            points: Vec::new(),
            dirty: true,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        if self.mode != mode {
            self.mode = mode;
            self.dirty = true;
        }
    }

    /// Takes ownership of a flat `x, y, s, t` vertex buffer. The length must
    /// be a multiple of the 4-float stride.
    pub fn set_vertices(&mut self, vertices: Vec<f32>) -> Result<(), GeometryError> {
        if vertices.len() % VERTEX_STRIDE != 0 {
            return Err(GeometryError::InvalidGeometry(format!(
                "mesh vertices need a multiple of {VERTEX_STRIDE} values, got {}",
                vertices.len()
            )));
        }
        self.vertices = vertices;
        self.dirty = true;
        Ok(())
    }

    /// Takes ownership of the index buffer. Under a strict configuration the
    /// count must not exceed [`INDEX_CEILING`]; a relaxed configuration
    /// skips the check and leaves renderer behavior above the ceiling to
    /// the caller.
    pub fn set_indices(&mut self, indices: Vec<u16>) -> Result<(), GeometryError> {
        if indices.len() > INDEX_CEILING {
            if !self.config.relaxed_index_ceiling {
                return Err(GeometryError::CapacityExceeded {
                    what: "index",
                    count: indices.len(),
                    limit: INDEX_CEILING,
                });
            }
            tracing::warn!(
                count = indices.len(),
                "mesh index count exceeds the GLES2 ceiling; renderer behavior is undefined"
            );
        }
        self.indices = indices;
        self.dirty = true;
        Ok(())
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// In-place access to the vertex buffer. See the staleness hazard note
    /// on [`Mesh`].
    pub fn vertices_mut(&mut self) -> &mut Vec<f32> {
        &mut self.vertices
    }

    /// In-place access to the index buffer. See the staleness hazard note
    /// on [`Mesh`].
    pub fn indices_mut(&mut self) -> &mut Vec<u16> {
        &mut self.indices
    }

    fn needs_rebuild(&self) -> bool {
        self.dirty
            || self.vertices.len() != self.built_vertex_len
            || self.indices.len() != self.built_index_len
    }
}

impl ShapeGeometry for Mesh {
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError> {
        // The length poll runs on every call: external buffers may have been
        // grown or truncated through the `_mut` accessors.
        if !self.needs_rebuild() {
            return Ok(());
        }
        let vertex_count = self.vertices.len() / VERTEX_STRIDE;
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(GeometryError::InvalidGeometry(format!(
                "mesh index {bad} is out of range for {vertex_count} vertices"
            )));
        }

        let mut vertices: Vec<Vertex> = Vec::new();
        vertices
            .try_reserve(vertex_count)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: vertex_count * std::mem::size_of::<Vertex>(),
            })?;
        let mut points: Vec<f32> = Vec::new();
        points
            .try_reserve(vertex_count * 2)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: vertex_count * 2 * std::mem::size_of::<f32>(),
            })?;
        for chunk in self.vertices.chunks_exact(VERTEX_STRIDE) {
            vertices.push(Vertex::new(chunk[0], chunk[1], chunk[2], chunk[3]));
            points.push(chunk[0]);
            points.push(chunk[1]);
        }

        sink.set_mode(self.mode);
        sink.set_data(&vertices, &self.indices)?;
        self.built_vertex_len = self.vertices.len();
        self.built_index_len = self.indices.len();
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

    fn triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new(DrawMode::Triangles, GeometryConfig::STRICT);
        mesh.set_vertices(vec![
            0.0, 0.0, 0.0, 0.0, //
            10.0, 0.0, 1.0, 0.0, //
            10.0, 10.0, 1.0, 1.0,
        ])
        .unwrap();
        mesh.set_indices(vec![0, 1, 2]).unwrap();
        mesh
    }

    #[test]
    fn length_poll_catches_external_appends() {
        let mut mesh = triangle_mesh();
        let mut batch = VertexBatch::new();
        mesh.build(&mut batch).unwrap();
        assert_eq!(batch.vertex_count(), 3);

        // Grow the buffers through the unchecked accessors; no mark_dirty.
        mesh.vertices_mut().extend_from_slice(&[0.0, 10.0, 0.0, 1.0]);
        mesh.indices_mut().push(3);
        mesh.build(&mut batch).unwrap();
        assert_eq!(batch.vertex_count(), 4);
        assert_eq!(batch.index_count(), 4);
    }

    #[test]
    fn same_length_edits_need_an_explicit_mark() {
        let mut mesh = triangle_mesh();
        let mut batch = VertexBatch::new();
        mesh.build(&mut batch).unwrap();

        mesh.vertices_mut()[0] = 99.0;
        mesh.build(&mut batch).unwrap();
        // Invisible to the length poll.
        assert_eq!(batch.vertices()[0].position, [0.0, 0.0]);

        mesh.mark_dirty();
        mesh.build(&mut batch).unwrap();
        assert_eq!(batch.vertices()[0].position, [99.0, 0.0]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut mesh = triangle_mesh();
        mesh.set_indices(vec![0, 1, 7]).unwrap();
        let mut batch = VertexBatch::new();
        let err = mesh.build(&mut batch).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidGeometry(_)));
    }

    #[test]
    fn strict_config_enforces_the_ceiling_on_bulk_assignment() {
        let mut mesh = Mesh::new(DrawMode::Points, GeometryConfig::STRICT);
        let err = mesh.set_indices(vec![0; INDEX_CEILING + 1]).unwrap_err();
        assert!(matches!(err, GeometryError::CapacityExceeded { .. }));
        let mut relaxed = Mesh::new(DrawMode::Points, GeometryConfig::RELAXED);
        relaxed.set_indices(vec![0; INDEX_CEILING + 1]).unwrap();
    }
}
