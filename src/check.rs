use std::collections::BTreeSet;

use crate::{
    element::FH,
    error::Error,
    iterator,
    mesh::Mesh,
    topol::Topology,
};

fn check_faces(topol: &Topology) -> Result<(), Error> {
    for f in topol.faces() {
        let cycle = topol.face_vertices(f)?;
        if cycle.iter().collect::<BTreeSet<_>>().len() < 3 {
            return Err(Error::DegenerateFace(f));
        }
        if let Some(v) = cycle.iter().find(|v| !topol.has_vertex(**v)) {
            return Err(Error::VertexNotFound(*v));
        }
        // Every halfedge of the face must point back to the face.
        for (u, v) in iterator::cycle_halfedges(cycle) {
            let recorded = topol.halfedge_face(u, v).ok().flatten();
            if recorded != Some(f) {
                return Err(Error::InconsistentHalfedge(u, v, Some(f), recorded));
            }
        }
    }
    Ok(())
}

fn check_halfedges(topol: &Topology) -> Result<(), Error> {
    for (u, v) in topol.halfedges() {
        if u == v {
            return Err(Error::DegenerateEdge(u));
        }
        if !topol.has_vertex(v) {
            return Err(Error::VertexNotFound(v));
        }
        if !topol.has_edge(v, u) {
            return Err(Error::MissingMirror(u, v));
        }
        // A face recorded on a halfedge must contain that halfedge.
        if let Some(f) = topol.halfedge_face(u, v)? {
            let found = match topol.face_vertices(f) {
                Ok(cycle) => iterator::cycle_halfedges(cycle).any(|h| h == (u, v)),
                Err(_) => false,
            };
            if !found {
                let expected: Option<FH> = None;
                return Err(Error::InconsistentHalfedge(u, v, expected, Some(f)));
            }
        }
    }
    Ok(())
}

impl Topology {
    /// Check the consistency of the halfedge index with the faces.
    pub fn check(&self) -> Result<(), Error> {
        check_faces(self)?;
        check_halfedges(self)?;
        Ok(())
    }
}

impl Mesh {
    /// Check the topology of the mesh.
    ///
    /// This function will return an error if any errors are found in the
    /// topology, i.e. a face whose cycle is not reflected in the halfedge
    /// index, or a halfedge that claims a face which does not contain it.
    pub fn check_topology(&self) -> Result<(), Error> {
        self.topology().check()
    }
}
