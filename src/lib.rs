/*!
This is a halfedge based polygon mesh library with integer keyed vertices and
faces, in the spirit of the [COMPAS](https://compas.dev) datastructures.

# Overview

+ The connectivity of a mesh is a [`Topology`]: a nested map from every vertex
  to its neighbors, recording for every directed edge (halfedge) the face on
  its left, or nothing if the halfedge is on the boundary. Faces are stored as
  cycles of vertex keys.

+ A [`Mesh`] wraps a [`Topology`] and stores [`Attributes`] for vertices,
  faces and edges. Vertex positions are the `x`, `y` and `z` attributes.
  Geometric queries such as face normals, areas and edge lengths use
  [`glam::DVec3`].

+ Topological operators: inserting a vertex into a face, swapping the edge
  between two triangles, splitting edges and triangulating faces. Every
  operator keeps the halfedge map consistent with the face cycles, which can
  be verified with [`Mesh::check_topology`].

+ [`delaunay_mesh`] triangulates points in the XY plane incrementally, with
  optional boundary and hole polygons. Input points are jittered with a seeded
  random number generator, see [`DelaunayOptions`].

+ A [`Network`] is an undirected graph of lines in the plane.
  [`Network::find_faces`] finds the faces of its planar embedding and returns
  them as a mesh, optionally broken at a set of vertices with
  [`Mesh::break_faces`].

+ Optional features: `subdiv` enables triangle, quad and Catmull-Clark
  subdivision, `obj` enables loading meshes from OBJ files with
  [`tobj`](https://crates.io/crates/tobj). Both are enabled by default.
*/

mod attribute;
mod check;
mod delaunay;
mod edit;
mod element;
mod error;
mod iterator;
mod macros;
mod math;
mod mesh;
mod network;
mod planar;
mod topol;

#[cfg(feature = "obj")]
mod obj;
#[cfg(feature = "subdiv")]
mod subdiv;

pub mod predicates;

pub use attribute::{AttrValue, Attributes};
pub use delaunay::{DEFAULT_SEED, DelaunayOptions, delaunay_from_points, delaunay_mesh};
pub use element::{FH, Handle, VH};
pub use error::Error;
pub use iterator::FaceHalfedgeIter;
pub use mesh::{Mesh, MeshConfig, VertexPolicy};
pub use network::Network;
pub use topol::Topology;
