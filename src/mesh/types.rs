//! Mesh and point cloud data types.

use super::memory::TriangleStore;
use serde::{Deserialize, Serialize};

/// 3D point with float coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Single triangle, three vertices in winding order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Triangle {
    pub p0: Point3D,
    pub p1: Point3D,
    pub p2: Point3D,
}

/// Triangle-soup surface mesh.
///
/// The triangle buffer resides in exactly one memory domain at a time (see
/// [`TriangleStore`]); `triangle_count` is the number of valid triangles,
/// which may be less than the buffer capacity.
pub struct TriangleMesh {
    store: TriangleStore,
    triangle_count: usize,
}

impl TriangleMesh {
    /// Wrap a triangle store with its valid-triangle count.
    pub fn new(store: TriangleStore, triangle_count: usize) -> Self {
        Self {
            store,
            triangle_count,
        }
    }

    /// Convenience constructor for a fully host-resident mesh
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let triangle_count = triangles.len();
        Self {
            store: TriangleStore::Host(triangles),
            triangle_count,
        }
    }

    pub fn store(&self) -> &TriangleStore {
        &self.store
    }

    /// Number of valid triangles
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Capacity of the backing triangle buffer
    pub fn max_triangles(&self) -> usize {
        self.store.capacity()
    }
}

/// Flat, ordered point collection produced by flattening a mesh.
///
/// Points appear in triangle-then-vertex order, three per triangle, with
/// vertices shared between triangles duplicated. Not guaranteed free of
/// degenerate or duplicate points, hence `is_dense = false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud3D {
    pub points: Vec<Point3D>,
    pub is_dense: bool,
}

impl PointCloud3D {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
