use thiserror::Error;

/// Errors produced by shape parameter validation and geometry builds.
///
/// Parameter errors are raised synchronously from the setter, before any
/// mutation is committed. [`GeometryError::AllocationFailure`] aborts only the
/// current build and leaves the dirty flag set so a later draw can retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// Point data that cannot form the requested shape, e.g. the wrong
    /// coordinate count for a fixed-arity shape.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// An out-of-range numeric parameter.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },

    /// A point-cloud coordinate cap or index-ceiling overrun.
    #[error("{what} count {count} exceeds the limit of {limit}")]
    CapacityExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    /// A working-buffer allocation failed mid-build. Nothing was pushed to
    /// the sink; previously built geometry is untouched.
    #[error("failed to allocate a {bytes}-byte working buffer")]
    AllocationFailure { bytes: usize },
}

impl GeometryError {
    pub(crate) fn wrong_arity(shape: &str, expected: usize, got: usize) -> Self {
        GeometryError::InvalidGeometry(format!(
            "{shape} expects exactly {expected} coordinate values, got {got}"
        ))
    }
}
