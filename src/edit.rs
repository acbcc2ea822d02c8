use glam::DVec3;

use crate::{
    attribute::Attributes,
    element::{FH, VH},
    error::Error,
    iterator,
    mesh::Mesh,
    topol::Topology,
};

impl Topology {
    /**
     * Split a face into a fan of triangles around a new vertex.
     *
     * ```text
     *   3---------2          3---------2
     *   |         |          | \     / |
     *   |         |          |  \   /  |
     *   |    f    |   ==>    |    v    |
     *   |         |          |  /   \  |
     *   |         |          | /     \ |
     *   0---------1          0---------1
     * ```
     *
     * One triangle `[a, b, v]` is created for every halfedge `(a, b)` of the
     * face. The new vertex and the new faces, in the order of the halfedges
     * of `f`, are returned.
     */
    pub fn insert_vertex(&mut self, f: FH, key: Option<VH>) -> Result<(VH, Vec<FH>), Error> {
        if !self.has_face(f) {
            return Err(Error::FaceNotFound(f));
        }
        if let Some(v) = key {
            if self.has_vertex(v) {
                return Err(Error::VertexExists(v));
            }
        }
        let v = self.add_vertex(key)?;
        let cycle = self.delete_face(f)?;
        let mut faces = Vec::with_capacity(cycle.len());
        for (a, b) in iterator::cycle_halfedges(&cycle) {
            if let Some(nf) = self.add_face(&[a, b, v], None)? {
                faces.push(nf);
            }
        }
        Ok((v, faces))
    }

    /**
     * Flip the edge shared by two triangles.
     *
     * ```text
     *        v                  v
     *      / | \              /   \
     *     /  |  \            /     \
     *    b   |   a   ==>    b-------a
     *     \  |  /            \     /
     *      \ | /              \   /
     *        u                  u
     * ```
     *
     * The faces on either side of the edge are replaced by `[a, u, b]` and
     * `[b, v, a]`, returned in that order. `a` is the vertex before `u` in the
     * face on the left of `(u, v)` and `b` is the vertex before `v` in the
     * face on the left of `(v, u)`. Flipping the new edge restores the
     * original triangles.
     */
    pub fn swap_edge(&mut self, u: VH, v: VH) -> Result<(FH, FH), Error> {
        let (fuv, fvu) = match self.edge_faces(u, v)? {
            (Some(fuv), Some(fvu)) => (fuv, fvu),
            _ => return Err(Error::BoundaryEdge(u, v)),
        };
        for f in [fuv, fvu] {
            if self.face_degree(f)? != 3 {
                return Err(Error::NotATriangle(f));
            }
        }
        let a = self.face_vertex_ancestor(fuv, u)?;
        let b = self.face_vertex_ancestor(fvu, v)?;
        // The new diagonal must not exist yet.
        if a == b || self.has_edge(a, b) {
            return Err(Error::DegenerateSwap(u, v));
        }
        self.delete_face(fuv)?;
        self.delete_face(fvu)?;
        let f1 = self
            .add_face(&[a, u, b], None)?
            .ok_or(Error::DegenerateSwap(u, v))?;
        let f2 = self
            .add_face(&[b, v, a], None)?
            .ok_or(Error::DegenerateSwap(u, v))?;
        Ok((f1, f2))
    }

    /// Split the edge between `u` and `v` by inserting a new vertex into the
    /// cycles of the faces on both sides. Face keys are preserved.
    pub fn split_edge(&mut self, u: VH, v: VH, key: Option<VH>) -> Result<VH, Error> {
        if let Some(w) = key {
            if self.has_vertex(w) {
                return Err(Error::VertexExists(w));
            }
        }
        let (fuv, fvu) = self.edge_faces(u, v)?;
        let w = self.add_vertex(key)?;
        for (f, a, b) in [(fuv, u, v), (fvu, v, u)] {
            let Some(f) = f else { continue };
            let mut cycle = self.delete_face(f)?;
            let n = cycle.len();
            let i = (0..n)
                .find(|i| cycle[*i] == a && cycle[(i + 1) % n] == b)
                .ok_or(Error::InconsistentHalfedge(a, b, Some(f), None))?;
            cycle.insert(i + 1, w);
            self.add_face(&cycle, Some(f))?;
        }
        if self.has_edge(u, v) {
            // Naked edge without faces on either side.
            self.remove_edge(u, v);
            self.add_edge(u, w)?;
            self.add_edge(w, v)?;
        }
        Ok(w)
    }

    /// Triplets of vertices of the fan triangulation of a face, starting at
    /// its first vertex.
    pub fn triangulated_face_vertices(
        &self,
        f: FH,
    ) -> Result<impl Iterator<Item = [VH; 3]> + use<'_>, Error> {
        let cycle = self.face_vertices(f)?;
        Ok((1..cycle.len().saturating_sub(1)).map(move |i| [cycle[0], cycle[i], cycle[i + 1]]))
    }

    /// Fan triangulate a face from its first vertex. The first triangle keeps
    /// the key of the face. Returns the keys of all the triangles.
    pub fn triangulate_face(&mut self, f: FH) -> Result<Vec<FH>, Error> {
        if self.face_degree(f)? == 3 {
            return Ok(vec![f]);
        }
        let tris: Vec<[VH; 3]> = self.triangulated_face_vertices(f)?.collect();
        self.delete_face(f)?;
        let mut out = Vec::with_capacity(tris.len());
        for (i, tri) in tris.iter().enumerate() {
            let key = if i == 0 { Some(f) } else { None };
            if let Some(nf) = self.add_face(tri, key)? {
                out.push(nf);
            }
        }
        Ok(out)
    }

    pub fn triangulate(&mut self) -> Result<Vec<FH>, Error> {
        let faces: Vec<FH> = self.faces().collect();
        let mut out = Vec::with_capacity(faces.len());
        for f in faces {
            out.extend(self.triangulate_face(f)?);
        }
        Ok(out)
    }
}

impl Mesh {
    /// Split a face into a fan of triangles around a new vertex. The vertex is
    /// placed at `pos`, or at the centroid of the face if `pos` is `None`. The
    /// new faces get the default face attributes.
    pub fn insert_vertex(
        &mut self,
        f: FH,
        key: Option<VH>,
        pos: Option<DVec3>,
    ) -> Result<(VH, Vec<FH>), Error> {
        let pos = match pos {
            Some(pos) => pos,
            None => self.face_centroid(f)?,
        };
        let (v, faces) = self.topol.insert_vertex(f, key)?;
        self.add_vertex_with_key(v, Attributes::xyz(pos.x, pos.y, pos.z));
        self.remove_face_attributes(f);
        for nf in &faces {
            self.insert_face_attributes(*nf, self.default_face_attributes().clone());
        }
        self.prune_edge_attributes();
        Ok((v, faces))
    }

    /// Flip the edge shared by two triangles. See [`Topology::swap_edge`].
    pub fn swap_edge(&mut self, u: VH, v: VH) -> Result<(FH, FH), Error> {
        let (fuv, fvu) = self.edge_faces(u, v)?;
        let (f1, f2) = self.topol.swap_edge(u, v)?;
        for f in [fuv, fvu].into_iter().flatten() {
            self.remove_face_attributes(f);
        }
        for f in [f1, f2] {
            self.insert_face_attributes(f, self.default_face_attributes().clone());
        }
        self.prune_edge_attributes();
        log::trace!("Swapped edge ({u}, {v}) into faces {f1} and {f2}");
        Ok((f1, f2))
    }

    /// Split an edge at parameter `t`, measured from `u`. The two halves of the
    /// edge inherit its attributes.
    pub fn split_edge(&mut self, u: VH, v: VH, t: f64) -> Result<VH, Error> {
        let pos = self.edge_point(u, v, t)?;
        let attrs = self.edge_attributes(u, v).cloned();
        let w = self.topol.split_edge(u, v, None)?;
        self.add_vertex_with_key(w, Attributes::xyz(pos.x, pos.y, pos.z));
        if let Some(attrs) = attrs {
            self.set_edge_attributes(u, w, attrs.clone());
            self.set_edge_attributes(w, v, attrs);
        }
        self.prune_edge_attributes();
        Ok(w)
    }

    /// Fan triangulate a face. The new triangles copy the attributes of the
    /// face.
    pub fn triangulate_face(&mut self, f: FH) -> Result<Vec<FH>, Error> {
        let attrs = self.face_attributes(f)?.clone();
        let faces = self.topol.triangulate_face(f)?;
        for nf in &faces {
            self.insert_face_attributes(*nf, attrs.clone());
        }
        Ok(faces)
    }

    pub fn triangulate(&mut self) -> Result<Vec<FH>, Error> {
        let faces: Vec<FH> = self.faces().collect();
        let mut out = Vec::with_capacity(faces.len());
        for f in faces {
            out.extend(self.triangulate_face(f)?);
        }
        Ok(out)
    }
}
