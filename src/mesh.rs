use std::collections::BTreeMap;

use glam::DVec3;

use crate::{
    attribute::{AttrValue, Attributes},
    element::{FH, VH},
    error::Error,
    iterator::FaceHalfedgeIter,
    topol::Topology,
};

/// What `add_face` does with vertices it does not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexPolicy {
    /// Create the missing vertices with the default vertex attributes.
    #[default]
    AutoCreate,
    /// Refuse the face with [`Error::VertexNotFound`].
    Strict,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MeshConfig {
    pub vertex_policy: VertexPolicy,
}

impl MeshConfig {
    pub fn with_vertex_policy(mut self, policy: VertexPolicy) -> Self {
        self.vertex_policy = policy;
        self
    }
}

/// Polygon mesh with integer keyed vertices and faces.
///
/// The connectivity lives in a [`Topology`]. Vertices, faces and edges carry
/// [`Attributes`]; vertex positions are the `x`, `y` and `z` attributes.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) topol: Topology,
    vdata: BTreeMap<VH, Attributes>,
    fdata: BTreeMap<FH, Attributes>,
    edata: BTreeMap<(VH, VH), Attributes>,
    default_vertex: Attributes,
    default_face: Attributes,
    default_edge: Attributes,
    config: MeshConfig,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    pub fn new() -> Self {
        Self::with_config(MeshConfig::default())
    }

    pub fn with_config(config: MeshConfig) -> Self {
        Mesh {
            topol: Topology::new(),
            vdata: BTreeMap::new(),
            fdata: BTreeMap::new(),
            edata: BTreeMap::new(),
            default_vertex: Attributes::xyz(0.0, 0.0, 0.0),
            default_face: Attributes::new(),
            default_edge: Attributes::new(),
            config,
        }
    }

    /// Empty mesh with the same configuration and default attributes.
    pub(crate) fn empty_like(&self) -> Mesh {
        Mesh {
            default_vertex: self.default_vertex.clone(),
            default_face: self.default_face.clone(),
            default_edge: self.default_edge.clone(),
            ..Mesh::with_config(self.config)
        }
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topol
    }

    pub fn default_vertex_attributes(&self) -> &Attributes {
        &self.default_vertex
    }

    pub fn default_face_attributes(&self) -> &Attributes {
        &self.default_face
    }

    pub fn default_edge_attributes(&self) -> &Attributes {
        &self.default_edge
    }

    /// Set a default vertex attribute. Existing vertices are not modified.
    pub fn set_default_vertex_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.default_vertex.set(name, value);
    }

    pub fn set_default_face_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.default_face.set(name, value);
    }

    pub fn set_default_edge_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.default_edge.set(name, value);
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.topol.vertices()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<'_> {
        self.topol.faces()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = (VH, VH)> + use<'_> {
        self.topol.halfedges()
    }

    /// Every undirected edge once. An edge with attributes is reported in the
    /// orientation its attributes were stored with, all others as
    /// `(smaller, larger)`.
    pub fn edges(&self) -> impl Iterator<Item = (VH, VH)> + use<'_> {
        self.topol.edges().map(|(u, v)| {
            if self.edata.contains_key(&(v, u)) {
                (v, u)
            } else {
                (u, v)
            }
        })
    }

    pub fn has_vertex(&self, v: VH) -> bool {
        self.topol.has_vertex(v)
    }

    pub fn has_face(&self, f: FH) -> bool {
        self.topol.has_face(f)
    }

    pub fn has_edge(&self, u: VH, v: VH) -> bool {
        self.topol.has_edge(u, v)
    }

    /// Add a vertex with the next automatic key. Fails only when every key
    /// has been used.
    pub fn add_vertex(&mut self, attrs: Attributes) -> Result<VH, Error> {
        let v = self.topol.add_vertex(None)?;
        self.vdata.insert(v, self.default_vertex.merged(&attrs));
        Ok(v)
    }

    pub fn add_vertex_at(&mut self, pos: DVec3) -> Result<VH, Error> {
        self.add_vertex(Attributes::xyz(pos.x, pos.y, pos.z))
    }

    /// Add a vertex with an explicit key. If the vertex already exists, its
    /// attributes are updated with `attrs`.
    pub fn add_vertex_with_key(&mut self, key: VH, attrs: Attributes) -> VH {
        let v = self.topol.add_vertex_with_key(key);
        match self.vdata.get_mut(&v) {
            Some(data) => data.update(&attrs),
            None => {
                self.vdata.insert(v, self.default_vertex.merged(&attrs));
            }
        }
        v
    }

    /// Register an edge that has no faces yet.
    pub fn add_edge(&mut self, u: VH, v: VH) -> Result<(), Error> {
        self.topol.add_edge(u, v)
    }

    /// Add a face with an automatic key and default attributes.
    ///
    /// Returns `Ok(None)` if the cycle has fewer than three distinct vertices.
    pub fn add_face(&mut self, verts: &[VH]) -> Result<Option<FH>, Error> {
        self.add_face_with(verts, None, Attributes::new())
    }

    pub fn add_tri_face(&mut self, v0: VH, v1: VH, v2: VH) -> Result<Option<FH>, Error> {
        self.add_face(&[v0, v1, v2])
    }

    pub fn add_quad_face(&mut self, v0: VH, v1: VH, v2: VH, v3: VH) -> Result<Option<FH>, Error> {
        self.add_face(&[v0, v1, v2, v3])
    }

    /// Add a face with an optional explicit key and attributes.
    pub fn add_face_with(
        &mut self,
        verts: &[VH],
        key: Option<FH>,
        attrs: Attributes,
    ) -> Result<Option<FH>, Error> {
        if Topology::normalize_cycle(verts).is_none() {
            log::warn!("Ignoring degenerate face {:?}", verts);
            return Ok(None);
        }
        for v in verts {
            if self.has_vertex(*v) {
                continue;
            }
            match self.config.vertex_policy {
                VertexPolicy::AutoCreate => {
                    log::debug!("Creating missing vertex {} referenced by a face", v);
                    self.add_vertex_with_key(*v, Attributes::new());
                }
                VertexPolicy::Strict => return Err(Error::VertexNotFound(*v)),
            }
        }
        let replaced = key.is_some_and(|f| self.has_face(f));
        let f = self.topol.add_face(verts, key)?;
        if let Some(f) = f {
            self.fdata.insert(f, self.default_face.merged(&attrs));
        }
        if replaced {
            self.prune_edge_attributes();
        }
        Ok(f)
    }

    pub fn delete_face(&mut self, f: FH) -> Result<(), Error> {
        self.topol.delete_face(f)?;
        self.fdata.remove(&f);
        self.prune_edge_attributes();
        Ok(())
    }

    /// Delete a vertex along with every face and edge incident on it.
    pub fn delete_vertex(&mut self, v: VH) -> Result<(), Error> {
        let faces = self.topol.delete_vertex(v)?;
        for f in faces {
            self.fdata.remove(&f);
        }
        self.vdata.remove(&v);
        self.prune_edge_attributes();
        Ok(())
    }

    /// Drop the attributes of edges that no longer exist.
    pub(crate) fn prune_edge_attributes(&mut self) {
        let topol = &self.topol;
        self.edata.retain(|(u, v), _| topol.has_edge(*u, *v));
    }

    pub(crate) fn remove_face_attributes(&mut self, f: FH) -> Option<Attributes> {
        self.fdata.remove(&f)
    }

    pub(crate) fn insert_face_attributes(&mut self, f: FH, attrs: Attributes) {
        self.fdata.insert(f, attrs);
    }

    pub fn vertex_attributes(&self, v: VH) -> Result<&Attributes, Error> {
        self.vdata.get(&v).ok_or(Error::VertexNotFound(v))
    }

    pub fn vertex_attributes_mut(&mut self, v: VH) -> Result<&mut Attributes, Error> {
        self.vdata.get_mut(&v).ok_or(Error::VertexNotFound(v))
    }

    pub fn vertex_attribute(&self, v: VH, name: &str) -> Result<&AttrValue, Error> {
        self.vertex_attributes(v)?
            .get(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))
    }

    pub fn set_vertex_attribute(
        &mut self,
        v: VH,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), Error> {
        self.vertex_attributes_mut(v)?.set(name, value);
        Ok(())
    }

    pub fn face_attributes(&self, f: FH) -> Result<&Attributes, Error> {
        self.fdata.get(&f).ok_or(Error::FaceNotFound(f))
    }

    pub fn face_attributes_mut(&mut self, f: FH) -> Result<&mut Attributes, Error> {
        self.fdata.get_mut(&f).ok_or(Error::FaceNotFound(f))
    }

    pub fn face_attribute(&self, f: FH, name: &str) -> Result<&AttrValue, Error> {
        self.face_attributes(f)?
            .get(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))
    }

    pub fn set_face_attribute(
        &mut self,
        f: FH,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), Error> {
        self.face_attributes_mut(f)?.set(name, value);
        Ok(())
    }

    /// The key under which the attributes of edge `(u, v)` are stored.
    fn edge_data_key(&self, u: VH, v: VH) -> Result<(VH, VH), Error> {
        if !self.has_edge(u, v) {
            return Err(Error::HalfedgeNotFound(u, v));
        }
        Ok(if self.edata.contains_key(&(v, u)) {
            (v, u)
        } else {
            (u, v)
        })
    }

    /// Read an edge attribute. Either orientation of the edge can be used;
    /// the default edge attributes are returned for edges without their own.
    pub fn edge_attribute(&self, u: VH, v: VH, name: &str) -> Result<&AttrValue, Error> {
        let key = self.edge_data_key(u, v)?;
        self.edata
            .get(&key)
            .and_then(|data| data.get(name))
            .or_else(|| self.default_edge.get(name))
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))
    }

    pub fn set_edge_attribute(
        &mut self,
        u: VH,
        v: VH,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), Error> {
        let key = self.edge_data_key(u, v)?;
        let defaults = self.default_edge.clone();
        self.edata
            .entry(key)
            .or_insert(defaults)
            .set(name, value);
        Ok(())
    }

    pub(crate) fn edge_attributes(&self, u: VH, v: VH) -> Option<&Attributes> {
        self.edata.get(&(u, v)).or_else(|| self.edata.get(&(v, u)))
    }

    pub(crate) fn set_edge_attributes(&mut self, u: VH, v: VH, attrs: Attributes) {
        self.edata.insert((u, v), attrs);
    }

    pub fn halfedge_face(&self, u: VH, v: VH) -> Result<Option<FH>, Error> {
        self.topol.halfedge_face(u, v)
    }

    pub fn face_vertices(&self, f: FH) -> Result<&[VH], Error> {
        self.topol.face_vertices(f)
    }

    pub fn face_degree(&self, f: FH) -> Result<usize, Error> {
        self.topol.face_degree(f)
    }

    pub fn face_halfedges(&self, f: FH) -> Result<FaceHalfedgeIter<'_>, Error> {
        self.topol.face_halfedges(f)
    }

    pub fn face_vertex_ancestor(&self, f: FH, v: VH) -> Result<VH, Error> {
        self.topol.face_vertex_ancestor(f, v)
    }

    pub fn face_vertex_descendant(&self, f: FH, v: VH) -> Result<VH, Error> {
        self.topol.face_vertex_descendant(f, v)
    }

    pub fn face_neighbors(&self, f: FH) -> Result<Vec<FH>, Error> {
        self.topol.face_neighbors(f)
    }

    pub fn face_adjacency_halfedge(&self, f1: FH, f2: FH) -> Result<Option<(VH, VH)>, Error> {
        self.topol.face_adjacency_halfedge(f1, f2)
    }

    /// The edge shared by two faces, oriented the way its attributes are
    /// stored. Without edge attributes, the orientation is that of the
    /// halfedge of `f1`.
    pub fn face_adjacency_edge(&self, f1: FH, f2: FH) -> Result<Option<(VH, VH)>, Error> {
        Ok(self
            .face_adjacency_halfedge(f1, f2)?
            .map(|(u, v)| {
                if self.edata.contains_key(&(v, u)) {
                    (v, u)
                } else {
                    (u, v)
                }
            }))
    }

    pub fn vertex_neighbors(&self, v: VH) -> Result<impl Iterator<Item = VH> + use<'_>, Error> {
        self.topol.vertex_neighbors(v)
    }

    pub fn vertex_degree(&self, v: VH) -> Result<usize, Error> {
        self.topol.vertex_degree(v)
    }

    pub fn vertex_faces(&self, v: VH) -> Result<Vec<FH>, Error> {
        self.topol.vertex_faces(v)
    }

    pub fn edge_faces(&self, u: VH, v: VH) -> Result<(Option<FH>, Option<FH>), Error> {
        self.topol.edge_faces(u, v)
    }

    pub fn is_edge_on_boundary(&self, u: VH, v: VH) -> Result<bool, Error> {
        self.topol.is_edge_on_boundary(u, v)
    }

    pub fn is_vertex_on_boundary(&self, v: VH) -> Result<bool, Error> {
        self.topol.is_vertex_on_boundary(v)
    }

    pub fn vertices_on_boundary(&self) -> Vec<VH> {
        self.topol.vertices_on_boundary()
    }

    pub fn euler(&self) -> i64 {
        self.topol.euler()
    }

    /// Build a mesh from positions and faces given as indices into the
    /// positions. Vertex keys are the indices of the positions.
    pub fn from_vertices_and_faces(points: &[DVec3], faces: &[Vec<usize>]) -> Result<Self, Error> {
        let mut mesh = Mesh::with_config(MeshConfig::default().with_vertex_policy(VertexPolicy::Strict));
        for (i, p) in points.iter().enumerate() {
            mesh.add_vertex_with_key(VH::from(i as u32), Attributes::xyz(p.x, p.y, p.z));
        }
        let mut fvs: Vec<VH> = Vec::new();
        for face in faces {
            fvs.clear();
            for i in face {
                if *i >= points.len() {
                    return Err(Error::OutOfBoundsAccess(*i, points.len()));
                }
                fvs.push(VH::from(*i as u32));
            }
            mesh.add_face(&fvs)?;
        }
        mesh.config = MeshConfig::default();
        Ok(mesh)
    }

    /// Positions of the vertices and the faces as indices into them. Vertices
    /// are numbered in the order of their keys.
    pub fn to_vertices_and_faces(&self) -> Result<(Vec<DVec3>, Vec<Vec<usize>>), Error> {
        let index: BTreeMap<VH, usize> = self
            .vertices()
            .enumerate()
            .map(|(i, v)| (v, i))
            .collect();
        let points = self
            .vertices()
            .map(|v| self.vertex_coordinates(v))
            .collect::<Result<Vec<_>, Error>>()?;
        let mut faces = Vec::with_capacity(self.num_faces());
        for f in self.faces() {
            faces.push(
                self.face_vertices(f)?
                    .iter()
                    .map(|v| index.get(v).copied().ok_or(Error::VertexNotFound(*v)))
                    .collect::<Result<Vec<_>, Error>>()?,
            );
        }
        Ok((points, faces))
    }
}
