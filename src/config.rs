use crate::error::GeometryError;

/// Hard ceiling on the number of `u16` indices a single batch may hold.
///
/// This is the OpenGL ES2 limit; exceeding it is an error rather than a
/// silent truncation, unless [`GeometryConfig::relaxed_index_ceiling`] opts
/// out for bulk index assignment.
pub const INDEX_CEILING: usize = 65_535;

/// Hard cap on flat coordinate values held by a point cloud, i.e. roughly
/// 16 383 logical points.
pub const MAX_POINT_COORDS: usize = (1 << 15) - 2;

/// Limits configuration threaded into sinks and shapes at construction
/// time, instead of an ambient process-wide flag. The `Default` is platform
/// dependent: relaxed on desktop targets, strict on constrained ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryConfig {
    /// Skip the [`INDEX_CEILING`] check for bulk index assignment. Renderer
    /// behavior above the ceiling is undefined; this is a caller-opt-in
    /// unsafe mode for platforms known to cope.
    pub relaxed_index_ceiling: bool,
}

impl GeometryConfig {
    pub const STRICT: Self = Self {
        relaxed_index_ceiling: false,
    };

    pub const RELAXED: Self = Self {
        relaxed_index_ceiling: true,
    };

    pub(crate) fn check_index_count(&self, count: usize) -> Result<(), GeometryError> {
        if !self.relaxed_index_ceiling && count > INDEX_CEILING {
            return Err(GeometryError::CapacityExceeded {
                what: "index",
                count,
                limit: INDEX_CEILING,
            });
        }
        Ok(())
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        if cfg!(any(
            target_os = "android",
            target_os = "ios",
            target_family = "wasm"
        )) {
            Self::STRICT
        } else {
            Self::RELAXED
        }
    }
}
