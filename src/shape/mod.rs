//! Shape builders: declarative parameters in, vertex/index buffers out.
//!
//! Every builder follows the same lifecycle: setters validate before
//! mutating, then mark the shape dirty; [`ShapeGeometry::build`] is invoked
//! lazily right before the geometry is consumed for drawing, recomputes the
//! buffers from the current parameters, pushes them to the sink and clears
//! the dirty flag. Several parameter changes between draws collapse into a
//! single rebuild.

mod bezier;
mod border;
mod ellipse;
mod mesh;
mod points;
mod rounded;
mod simple;

pub use bezier::Bezier;
pub use border::{AutoScale, BorderImage};
pub use ellipse::Ellipse;
pub use mesh::Mesh;
pub use points::{MarkerStyle, PointCloud};
pub use rounded::RoundedRectangle;
pub use simple::{Quad, Rectangle, Triangle};

use crate::batch::BatchSink;
use crate::error::GeometryError;

/// The contract every shape builder implements.
pub trait ShapeGeometry {
    /// Recomputes the geometry if parameters changed since the last build
    /// and pushes it to `sink`. No-op when clean, so calling it once per
    /// frame is free for unchanged shapes. Mesh-style shapes additionally
    /// re-check their external buffer lengths on every call.
    fn build(&mut self, sink: &mut dyn BatchSink) -> Result<(), GeometryError>;

    /// The flattened `(x, y)` boundary sequence from the last successful
    /// build. Stale after a parameter change until the next build.
    fn points(&self) -> &[f32];

    fn is_dirty(&self) -> bool;

    /// Forces the next [`build`](ShapeGeometry::build) to regenerate.
    fn mark_dirty(&mut self);
}

/// Fixed shapes that can contract their edges in place, so a smoothing
/// outline can compensate for its own half-width. The decorator snapshots
/// parameters through [`inset`](InsetShape::inset) and puts them back with
/// [`restore`](InsetShape::restore) after the inset build, without touching
/// the dirty flag.
pub trait InsetShape: ShapeGeometry {
    /// Saved parameter state returned by `inset` and consumed by `restore`.
    type Saved;

    /// Contracts every edge by `amount` units (rounded corners also shrink
    /// their radii by `amount`, clamped at zero) and returns the previous
    /// parameters.
    fn inset(&mut self, amount: f32) -> Self::Saved;

    /// Restores parameters captured by [`inset`](InsetShape::inset). Does
    /// not mark the shape dirty: the pushed (inset) geometry stays valid
    /// until the next real parameter change.
    fn restore(&mut self, saved: Self::Saved);

    /// Current nominal size, used by the smoothing policy layer.
    fn size(&self) -> (f32, f32);

    /// True when a non-default texture region is bound.
    fn has_custom_texture(&self) -> bool;
}
