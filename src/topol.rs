use std::collections::{BTreeMap, BTreeSet};

use crate::{
    element::{Handle, KeyCounter, FH, VH},
    error::Error,
    iterator::{self, FaceHalfedgeIter},
};

/// Connectivity of a mesh.
///
/// Every vertex owns a map from its neighbors to the face on the left of the
/// outgoing halfedge, or `None` if that side of the edge is on the boundary.
/// Once either side of an edge is known, both directed entries exist. Faces
/// are stored as closed vertex cycles without a repeated closing vertex.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    halfedge: BTreeMap<VH, BTreeMap<VH, Option<FH>>>,
    faces: BTreeMap<FH, Vec<VH>>,
    vkeys: KeyCounter,
    fkeys: KeyCounter,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_vertices(&self) -> usize {
        self.halfedge.len()
    }

    pub fn num_halfedges(&self) -> usize {
        self.halfedge.values().map(|nbrs| nbrs.len()).sum()
    }

    pub fn num_edges(&self) -> usize {
        self.num_halfedges() / 2
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.halfedge.keys().copied()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<'_> {
        self.faces.keys().copied()
    }

    /// All directed halfedges, whether or not a face is on their left.
    pub fn halfedges(&self) -> impl Iterator<Item = (VH, VH)> + use<'_> {
        self.halfedge
            .iter()
            .flat_map(|(u, nbrs)| nbrs.keys().map(move |v| (*u, *v)))
    }

    /// Every undirected edge once, as `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (VH, VH)> + use<'_> {
        self.halfedges().filter(|(u, v)| u < v)
    }

    pub fn has_vertex(&self, v: VH) -> bool {
        self.halfedge.contains_key(&v)
    }

    pub fn has_face(&self, f: FH) -> bool {
        self.faces.contains_key(&f)
    }

    pub fn has_edge(&self, u: VH, v: VH) -> bool {
        self.halfedge
            .get(&u)
            .is_some_and(|nbrs| nbrs.contains_key(&v))
    }

    /// The key the next automatically keyed vertex will receive, if any are
    /// left.
    pub fn next_vertex_key(&self) -> Option<VH> {
        self.vkeys.peek().map(VH::from)
    }

    /// The key the next automatically keyed face will receive, if any are
    /// left.
    pub fn next_face_key(&self) -> Option<FH> {
        self.fkeys.peek().map(FH::from)
    }

    pub(crate) fn outgoing(&self, v: VH) -> Result<&BTreeMap<VH, Option<FH>>, Error> {
        self.halfedge.get(&v).ok_or(Error::VertexNotFound(v))
    }

    /// The face on the left of the halfedge from `u` to `v`.
    pub fn halfedge_face(&self, u: VH, v: VH) -> Result<Option<FH>, Error> {
        self.outgoing(u)?
            .get(&v)
            .copied()
            .ok_or(Error::HalfedgeNotFound(u, v))
    }

    fn set_halfedge_face(&mut self, u: VH, v: VH, f: Option<FH>) {
        self.halfedge.entry(u).or_default().insert(v, f);
    }

    pub(crate) fn remove_edge(&mut self, u: VH, v: VH) {
        if let Some(nbrs) = self.halfedge.get_mut(&u) {
            nbrs.remove(&v);
        }
        if let Some(nbrs) = self.halfedge.get_mut(&v) {
            nbrs.remove(&u);
        }
    }

    /// Add a vertex with the given key, or the next automatic key. Adding a
    /// vertex that exists does nothing.
    pub fn add_vertex(&mut self, key: Option<VH>) -> Result<VH, Error> {
        match key {
            Some(v) => Ok(self.add_vertex_with_key(v)),
            None => {
                let v = self
                    .vkeys
                    .generate()
                    .ok_or(Error::KeysExhausted("vertex"))?
                    .into();
                self.halfedge.entry(v).or_default();
                Ok(v)
            }
        }
    }

    pub(crate) fn add_vertex_with_key(&mut self, v: VH) -> VH {
        self.vkeys.observe(v.index());
        self.halfedge.entry(v).or_default();
        v
    }

    /// Register an edge without a face on either side.
    pub fn add_edge(&mut self, u: VH, v: VH) -> Result<(), Error> {
        if u == v {
            return Err(Error::DegenerateEdge(u));
        }
        for w in [u, v] {
            if !self.has_vertex(w) {
                return Err(Error::VertexNotFound(w));
            }
        }
        self.halfedge.entry(u).or_default().entry(v).or_insert(None);
        self.halfedge.entry(v).or_default().entry(u).or_insert(None);
        Ok(())
    }

    /// Clean up a vertex cycle before it becomes a face. Repeated consecutive
    /// vertices are collapsed and a closing vertex equal to the first one is
    /// dropped. Returns `None` if fewer than three distinct vertices remain.
    pub fn normalize_cycle(verts: &[VH]) -> Option<Vec<VH>> {
        let mut cycle: Vec<VH> = Vec::with_capacity(verts.len());
        for v in verts {
            if cycle.last() != Some(v) {
                cycle.push(*v);
            }
        }
        while cycle.len() > 1 && cycle.first() == cycle.last() {
            cycle.pop();
        }
        if cycle.iter().collect::<BTreeSet<_>>().len() < 3 {
            None
        } else {
            Some(cycle)
        }
    }

    /// Add a face. All vertices must already exist. Returns `Ok(None)` without
    /// changing anything if the cycle is degenerate. If a face with the
    /// explicit `key` exists, it is replaced.
    pub fn add_face(&mut self, verts: &[VH], key: Option<FH>) -> Result<Option<FH>, Error> {
        let cycle = match Self::normalize_cycle(verts) {
            Some(cycle) => cycle,
            None => return Ok(None),
        };
        if let Some(v) = cycle.iter().find(|v| !self.has_vertex(**v)) {
            return Err(Error::VertexNotFound(*v));
        }
        let f = match key {
            Some(f) => {
                if self.has_face(f) {
                    self.delete_face(f)?;
                }
                self.fkeys.observe(f.index());
                f
            }
            None => self
                .fkeys
                .generate()
                .ok_or(Error::KeysExhausted("face"))?
                .into(),
        };
        for (u, v) in iterator::cycle_halfedges(&cycle) {
            self.set_halfedge_face(u, v, Some(f));
            self.halfedge.entry(v).or_default().entry(u).or_insert(None);
        }
        self.faces.insert(f, cycle);
        Ok(Some(f))
    }

    /// Delete a face and return its vertex cycle. Edges left without a face
    /// on either side are removed from the halfedge index.
    pub fn delete_face(&mut self, f: FH) -> Result<Vec<VH>, Error> {
        let cycle = self.faces.remove(&f).ok_or(Error::FaceNotFound(f))?;
        for (u, v) in iterator::cycle_halfedges(&cycle) {
            if self.halfedge_face(u, v).ok().flatten() == Some(f) {
                self.set_halfedge_face(u, v, None);
            }
            let this = self.halfedge_face(u, v).ok().flatten();
            let mirror = self.halfedge_face(v, u).ok().flatten();
            if this.is_none() && mirror.is_none() {
                self.remove_edge(u, v);
            }
        }
        Ok(cycle)
    }

    /// Delete a vertex along with all faces and edges incident on it. Returns
    /// the deleted faces.
    pub fn delete_vertex(&mut self, v: VH) -> Result<Vec<FH>, Error> {
        let nbrs: Vec<VH> = self.outgoing(v)?.keys().copied().collect();
        let faces: BTreeSet<FH> = nbrs
            .iter()
            .flat_map(|n| [self.halfedge_face(v, *n), self.halfedge_face(*n, v)])
            .filter_map(|f| f.ok().flatten())
            .collect();
        for f in &faces {
            self.delete_face(*f)?;
        }
        for n in nbrs {
            self.remove_edge(v, n);
        }
        self.halfedge.remove(&v);
        Ok(faces.into_iter().collect())
    }

    pub fn face_vertices(&self, f: FH) -> Result<&[VH], Error> {
        self.faces
            .get(&f)
            .map(|cycle| cycle.as_slice())
            .ok_or(Error::FaceNotFound(f))
    }

    pub fn face_degree(&self, f: FH) -> Result<usize, Error> {
        Ok(self.face_vertices(f)?.len())
    }

    pub fn face_halfedges(&self, f: FH) -> Result<FaceHalfedgeIter<'_>, Error> {
        iterator::fh_iter(self, f)
    }

    fn face_vertex_position(&self, f: FH, v: VH) -> Result<(usize, &[VH]), Error> {
        let cycle = self.face_vertices(f)?;
        let i = cycle
            .iter()
            .position(|w| *w == v)
            .ok_or(Error::VertexNotInFace(v, f))?;
        Ok((i, cycle))
    }

    /// The vertex before `v` in the cycle of `f`.
    pub fn face_vertex_ancestor(&self, f: FH, v: VH) -> Result<VH, Error> {
        let (i, cycle) = self.face_vertex_position(f, v)?;
        Ok(cycle[(i + cycle.len() - 1) % cycle.len()])
    }

    /// The vertex after `v` in the cycle of `f`.
    pub fn face_vertex_descendant(&self, f: FH, v: VH) -> Result<VH, Error> {
        let (i, cycle) = self.face_vertex_position(f, v)?;
        Ok(cycle[(i + 1) % cycle.len()])
    }

    /// Faces sharing an edge with `f`, in the order of its halfedges.
    pub fn face_neighbors(&self, f: FH) -> Result<Vec<FH>, Error> {
        let mut out: Vec<FH> = Vec::new();
        for nf in iterator::ff_iter(self, f)? {
            if !out.contains(&nf) {
                out.push(nf);
            }
        }
        Ok(out)
    }

    /// The halfedge of `f1` whose opposite halfedge belongs to `f2`.
    pub fn face_adjacency_halfedge(&self, f1: FH, f2: FH) -> Result<Option<(VH, VH)>, Error> {
        if !self.has_face(f2) {
            return Err(Error::FaceNotFound(f2));
        }
        Ok(self
            .face_halfedges(f1)?
            .find(|(u, v)| self.halfedge_face(*v, *u).ok().flatten() == Some(f2)))
    }

    pub fn vertex_neighbors(&self, v: VH) -> Result<impl Iterator<Item = VH> + use<'_>, Error> {
        Ok(self.outgoing(v)?.keys().copied())
    }

    pub fn vertex_degree(&self, v: VH) -> Result<usize, Error> {
        Ok(self.outgoing(v)?.len())
    }

    /// Faces incident on `v`, without duplicates.
    pub fn vertex_faces(&self, v: VH) -> Result<Vec<FH>, Error> {
        let faces: BTreeSet<FH> = iterator::vf_iter(self, v)?.collect();
        Ok(faces.into_iter().collect())
    }

    /// Faces on the left of `(u, v)` and of `(v, u)`.
    pub fn edge_faces(&self, u: VH, v: VH) -> Result<(Option<FH>, Option<FH>), Error> {
        Ok((self.halfedge_face(u, v)?, self.halfedge_face(v, u)?))
    }

    pub fn is_edge_on_boundary(&self, u: VH, v: VH) -> Result<bool, Error> {
        let (a, b) = self.edge_faces(u, v)?;
        Ok(a.is_none() || b.is_none())
    }

    /// A vertex is on the boundary if any of its edges is.
    pub fn is_vertex_on_boundary(&self, v: VH) -> Result<bool, Error> {
        for n in self.vertex_neighbors(v)? {
            if self.is_edge_on_boundary(v, n)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn vertices_on_boundary(&self) -> Vec<VH> {
        self.vertices()
            .filter(|v| self.is_vertex_on_boundary(*v).unwrap_or(false))
            .collect()
    }

    /// Euler characteristic, `V - E + F`.
    pub fn euler(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }
}
