//! Surface mesh types and the mesh-to-point-cloud flattening pipeline.
//!
//! The reconstruction engine owns its scene and produces a triangle-soup
//! mesh whose storage may live in host or accelerator memory. Flattening
//! borrows the mesh read-only, materializes the triangle buffer on the host
//! when needed, and emits every vertex as a point.

mod flatten;
mod memory;
mod types;

pub use flatten::{flatten, MeshSource, StaticMeshSource};
pub use memory::{DeviceBuffer, MockDeviceBuffer, TriangleStore};
pub use types::{Point3D, PointCloud3D, Triangle, TriangleMesh};
