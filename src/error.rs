use crate::element::{FH, VH};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Topology.
    #[error("vertex {0} does not exist")]
    VertexNotFound(VH),
    #[error("face {0} does not exist")]
    FaceNotFound(FH),
    #[error("there is no halfedge from {0} to {1}")]
    HalfedgeNotFound(VH, VH),
    #[error("edge ({0}, {1}) is on the boundary")]
    BoundaryEdge(VH, VH),
    #[error("face {0} is not a triangle")]
    NotATriangle(FH),
    #[error("swapping edge ({0}, {1}) would duplicate an existing edge")]
    DegenerateSwap(VH, VH),
    #[error("edge ({0}, {0}) connects a vertex to itself")]
    DegenerateEdge(VH),
    #[error("vertex {0} already exists")]
    VertexExists(VH),
    #[error("all {0} keys are in use")]
    KeysExhausted(&'static str),
    #[error("vertex {0} is not part of face {1}")]
    VertexNotInFace(VH, FH),
    // Topology check.
    #[error("face {0} has fewer than three distinct vertices")]
    DegenerateFace(FH),
    #[error("halfedge ({0}, {1}) should belong to face {2:?} but is recorded as {3:?}")]
    InconsistentHalfedge(VH, VH, Option<FH>, Option<FH>),
    #[error("halfedge ({0}, {1}) has no mirror entry")]
    MissingMirror(VH, VH),
    // Attributes.
    #[error("attribute `{0}` does not exist")]
    MissingAttribute(String),
    #[error("attribute `{0}` has an unexpected type")]
    AttributeTypeMismatch(String),
    // Geometry.
    #[error("at least three points are required, got {0}")]
    NotEnoughPoints(usize),
    #[error("no face contains point {0}")]
    PointLocationFailed(usize),
    #[error("index {0} is out of bounds for {1} vertices")]
    OutOfBoundsAccess(usize, usize),
    // Obj.
    #[error("unable to load obj file: {0}")]
    ObjLoadFailed(String),
    #[error("{0} is not a valid number of coordinates")]
    IncorrectNumberOfCoordinates(usize),
}
