//! 2D shape tessellation: declarative shape parameters in, renderer-ready
//! vertex and index buffers out.
//!
//! Each shape builder ([`Rectangle`], [`Ellipse`], [`RoundedRectangle`],
//! [`Bezier`], [`PointCloud`], [`BorderImage`], [`Mesh`], ...) owns its
//! parameters, validates them eagerly in setters and tessellates lazily: the
//! geometry is recomputed only when [`ShapeGeometry::build`] runs on a dirty
//! shape. Output lands in any [`BatchSink`]; [`VertexBatch`] is the built-in
//! CPU-side implementation.
//!
//! Antialiasing for filled shapes is handled by [`Smooth`], which shrinks the
//! fill by a fixed compensation and traces an [`AntiAliasingOutline`] ring
//! around the original boundary.
//!
//! # Examples
//!
//! ```
//! use tessellar::{Rectangle, ShapeGeometry, VertexBatch};
//!
//! let mut rect = Rectangle::new((10.0, 10.0), (100.0, 50.0));
//! let mut batch = VertexBatch::new();
//! rect.build(&mut batch)?;
//! assert_eq!(batch.vertex_count(), 4);
//! assert_eq!(batch.index_count(), 6);
//!
//! // Unchanged shapes rebuild nothing.
//! rect.build(&mut batch)?;
//!
//! rect.set_size((200.0, 50.0));
//! assert!(rect.is_dirty());
//! # Ok::<(), tessellar::GeometryError>(())
//! ```

mod batch;
mod config;
mod error;
mod math;
mod outline;
mod shape;
mod vertex;

pub use batch::{BatchSink, DrawMode, VertexBatch};
pub use config::{GeometryConfig, INDEX_CEILING, MAX_POINT_COORDS};
pub use error::GeometryError;
pub use outline::{
    composition_plan, compose, AntiAliasingOutline, CompositionStep, MaskReplay, Smooth,
    StencilCompare, StencilOps, OUTLINE_WIDTH,
};
pub use shape::{
    AutoScale, Bezier, BorderImage, Ellipse, InsetShape, MarkerStyle, Mesh, PointCloud, Quad,
    Rectangle, RoundedRectangle, ShapeGeometry, Triangle,
};
pub use vertex::{vertices_as_bytes, TexCoordProvider, TexCoords, Vertex, UNIT_TEX_COORDS};
