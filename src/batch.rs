//! Geometry sinks. Shape builders push their finished vertex/index buffers
//! into a [`BatchSink`]; the embedding renderer decides what a push means
//! (usually a GPU buffer upload). [`VertexBatch`] is the in-memory reference
//! implementation used by the tests and by embedders that upload themselves.

use crate::config::GeometryConfig;
use crate::error::GeometryError;
use crate::vertex::Vertex;

/// How the paired index buffer is to be interpreted by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Receives finished geometry from shape builders.
///
/// `index count` for a single [`set_data`](BatchSink::set_data) call, or
/// cumulatively across [`append_data`](BatchSink::append_data) calls, must
/// never exceed [`crate::INDEX_CEILING`] under a strict configuration.
pub trait BatchSink {
    fn set_mode(&mut self, mode: DrawMode);

    /// Replaces all buffered geometry. All-or-nothing: on error the previous
    /// contents are untouched.
    fn set_data(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<(), GeometryError>;

    /// Extends the existing geometry. `indices` are relative to `vertices`
    /// and are renumbered by the current vertex cursor.
    fn append_data(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<(), GeometryError>;

    /// Empties the buffer.
    fn clear_data(&mut self);
}

/// An in-memory vertex/index batch.
#[derive(Debug, Clone, Default)]
pub struct VertexBatch {
    mode: DrawMode,
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    config: GeometryConfig,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::with_config(GeometryConfig::default())
    }

    pub fn with_config(config: GeometryConfig) -> Self {
        Self {
            mode: DrawMode::default(),
            vertices: Vec::new(),
            indices: Vec::new(),
            config,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.indices.is_empty()
    }

    /// Reserves space in both buffers, reporting failure instead of aborting.
    fn reserve(&mut self, vertices: usize, indices: usize) -> Result<(), GeometryError> {
        self.vertices
            .try_reserve(vertices)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: vertices * std::mem::size_of::<Vertex>(),
            })?;
        self.indices
            .try_reserve(indices)
            .map_err(|_| GeometryError::AllocationFailure {
                bytes: indices * std::mem::size_of::<u16>(),
            })?;
        Ok(())
    }
}

impl BatchSink for VertexBatch {
    fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
    }

    fn set_data(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<(), GeometryError> {
        self.config.check_index_count(indices.len())?;
        self.reserve(vertices.len(), indices.len())?;
        self.vertices.clear();
        self.indices.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);
        Ok(())
    }

    fn append_data(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<(), GeometryError> {
        self.config
            .check_index_count(self.indices.len() + indices.len())?;
        // The vertex cursor must stay addressable by u16 indices regardless
        // of the relaxed-ceiling setting.
        let total_vertices = self.vertices.len() + vertices.len();
        if total_vertices > u16::MAX as usize + 1 {
            return Err(GeometryError::CapacityExceeded {
                what: "vertex",
                count: total_vertices,
                limit: u16::MAX as usize + 1,
            });
        }
        self.reserve(vertices.len(), indices.len())?;
        let base = self.vertices.len() as u16;
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|i| i + base));
        Ok(())
    }

    fn clear_data(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::INDEX_CEILING;

    #[test]
    fn append_renumbers_indices_by_the_vertex_cursor() {
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        let quad = [Vertex::default(); 4];
        batch.set_data(&quad, &[0, 1, 2, 2, 3, 0]).unwrap();
        batch.append_data(&quad, &[0, 1, 2, 2, 3, 0]).unwrap();
        assert_eq!(batch.vertex_count(), 8);
        assert_eq!(&batch.indices()[6..], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn strict_config_rejects_indices_beyond_the_ceiling() {
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        let indices = vec![0u16; INDEX_CEILING + 1];
        let err = batch.set_data(&[Vertex::default()], &indices).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::CapacityExceeded { what: "index", .. }
        ));
        // All-or-nothing: nothing was stored.
        assert!(batch.is_empty());
    }

    #[test]
    fn relaxed_config_accepts_indices_beyond_the_ceiling() {
        let mut batch = VertexBatch::with_config(GeometryConfig::RELAXED);
        let indices = vec![0u16; INDEX_CEILING + 1];
        batch.set_data(&[Vertex::default()], &indices).unwrap();
        assert_eq!(batch.index_count(), INDEX_CEILING + 1);
    }

    #[test]
    fn cumulative_appends_hit_the_ceiling() {
        let mut batch = VertexBatch::with_config(GeometryConfig::STRICT);
        let indices = vec![0u16; 40_000];
        batch.set_data(&[Vertex::default()], &indices).unwrap();
        let before = batch.index_count();
        let err = batch
            .append_data(&[Vertex::default()], &indices)
            .unwrap_err();
        assert!(matches!(err, GeometryError::CapacityExceeded { .. }));
        assert_eq!(batch.index_count(), before);
    }
}
