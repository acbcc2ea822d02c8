use std::collections::BTreeMap;

use glam::DVec3;

use crate::{
    element::{FH, VH},
    error::Error,
    mesh::Mesh,
};

fn edge_key(u: VH, v: VH) -> (VH, VH) {
    if u < v { (u, v) } else { (v, u) }
}

/// Positions of the points that replace the vertices, edges and faces of a
/// mesh in one round of quad subdivision.
struct QuadPoints {
    vertices: BTreeMap<VH, DVec3>,
    edges: BTreeMap<(VH, VH), DVec3>,
    faces: BTreeMap<FH, DVec3>,
}

impl Mesh {
    /// Compute the subdivision points. Without `smooth`, the vertices stay
    /// where they are and the edge and face points are midpoints and
    /// centroids. With `smooth`, interior points follow the Catmull-Clark
    /// rules. Boundary vertices and points on boundary edges are never moved.
    fn quad_points(&self, smooth: bool) -> Result<QuadPoints, Error> {
        let faces = self
            .faces()
            .map(|f| Ok((f, self.face_centroid(f)?)))
            .collect::<Result<BTreeMap<_, _>, Error>>()?;
        let face_point = |f: FH| faces.get(&f).copied().ok_or(Error::FaceNotFound(f));
        let mut edges = BTreeMap::new();
        for (u, v) in self.edges() {
            let mid = self.edge_midpoint(u, v)?;
            let point = match self.edge_faces(u, v)? {
                (Some(f1), Some(f2)) if smooth => {
                    (2.0 * mid + face_point(f1)? + face_point(f2)?) / 4.0
                }
                _ => mid,
            };
            edges.insert(edge_key(u, v), point);
        }
        let mut vertices = BTreeMap::new();
        for v in self.vertices() {
            let pos = self.vertex_coordinates(v)?;
            let vfaces = self.vertex_faces(v)?;
            if !smooth || vfaces.is_empty() || self.is_vertex_on_boundary(v)? {
                vertices.insert(v, pos);
                continue;
            }
            let mut favg = DVec3::ZERO;
            for f in &vfaces {
                favg += face_point(*f)?;
            }
            favg /= vfaces.len() as f64;
            let mut ravg = DVec3::ZERO;
            let mut n = 0usize;
            for u in self.vertex_neighbors(v)? {
                ravg += self.edge_midpoint(v, u)?;
                n += 1;
            }
            let n = n as f64;
            ravg /= n;
            vertices.insert(v, (favg + 2.0 * ravg + (n - 3.0) * pos) / n);
        }
        Ok(QuadPoints {
            vertices,
            edges,
            faces,
        })
    }

    /**
     * One round of quad subdivision. The old vertices keep their keys and
     * attributes, followed by the new edge points and then the face points.
     *
     * ```text
     *   v3--------m2-------v2
     *   |         |         |
     *   |         |         |
     *   m3--------c--------m1      f = [v0, v1, v2, v3] becomes
     *   |         |         |      [v0, m0, c, m3], [v1, m1, c, m0], ...
     *   |         |         |
     *   v0--------m0-------v1
     * ```
     */
    fn subdivide_quad_once(&self, smooth: bool) -> Result<Mesh, Error> {
        let points = self.quad_points(smooth)?;
        let mut out = self.empty_like();
        for (v, pos) in &points.vertices {
            out.add_vertex_with_key(*v, self.vertex_attributes(*v)?.clone());
            out.set_vertex_coordinates(*v, *pos)?;
        }
        let mids = points
            .edges
            .iter()
            .map(|(e, pos)| Ok((*e, out.add_vertex_at(*pos)?)))
            .collect::<Result<BTreeMap<(VH, VH), VH>, Error>>()?;
        let mid = |u: VH, v: VH| {
            mids.get(&edge_key(u, v))
                .copied()
                .ok_or(Error::HalfedgeNotFound(u, v))
        };
        for (f, pos) in &points.faces {
            let c = out.add_vertex_at(*pos)?;
            let attrs = self.face_attributes(*f)?;
            let fvs = self.face_vertices(*f)?;
            let n = fvs.len();
            for i in 0..n {
                let (prev, curr, next) = (fvs[(i + n - 1) % n], fvs[i], fvs[(i + 1) % n]);
                out.add_face_with(
                    &[curr, mid(curr, next)?, c, mid(prev, curr)?],
                    None,
                    attrs.clone(),
                )?;
            }
        }
        for (u, v) in self.edges() {
            let m = mid(u, v)?;
            if self.edge_faces(u, v)? == (None, None) {
                out.add_edge(u, m)?;
                out.add_edge(m, v)?;
            }
            if let Some(attrs) = self.edge_attributes(u, v) {
                out.set_edge_attributes(u, m, attrs.clone());
                out.set_edge_attributes(m, v, attrs.clone());
            }
        }
        Ok(out)
    }

    /// Subdivide every face into a fan of triangles around its centroid, `k`
    /// times. The new faces copy the attributes of the face they replace.
    pub fn subdivide_tri(&self, k: usize) -> Result<Mesh, Error> {
        let mut mesh = self.clone();
        for _ in 0..k {
            let faces: Vec<FH> = mesh.faces().collect();
            for f in faces {
                let attrs = mesh.face_attributes(f)?.clone();
                let (_, fan) = mesh.insert_vertex(f, None, None)?;
                for nf in fan {
                    *mesh.face_attributes_mut(nf)? = attrs.clone();
                }
            }
        }
        log::debug!(
            "Triangle subdivision: {} faces after {} rounds",
            mesh.num_faces(),
            k
        );
        Ok(mesh)
    }

    /// Split every edge at its midpoint and every face into quads around its
    /// centroid, `k` times. Vertex positions are not smoothed.
    pub fn subdivide_quad(&self, k: usize) -> Result<Mesh, Error> {
        let mut mesh = self.clone();
        for _ in 0..k {
            mesh = mesh.subdivide_quad_once(false)?;
        }
        log::debug!(
            "Quad subdivision: {} faces after {} rounds",
            mesh.num_faces(),
            k
        );
        Ok(mesh)
    }

    /// Catmull-Clark subdivision, `k` times. This has the topology of
    /// [`Mesh::subdivide_quad`]. Vertices on the boundary are fixed and
    /// boundary edges are split at their midpoints.
    pub fn subdivide_catmull_clark(&self, k: usize) -> Result<Mesh, Error> {
        let mut mesh = self.clone();
        for _ in 0..k {
            mesh = mesh.subdivide_quad_once(true)?;
        }
        log::debug!(
            "Catmull-Clark subdivision: {} faces after {} rounds",
            mesh.num_faces(),
            k
        );
        Ok(mesh)
    }
}

#[cfg(test)]
mod test {
    use glam::{dvec3, DVec3};

    use crate::{
        macros::assert_f64_eq,
        mesh::{
            test::{split_unit_square, unit_square},
            Mesh,
        },
        topol::test::vhs,
    };

    fn unit_box() -> Mesh {
        let points: Vec<DVec3> = [
            (0.0, 0.0, 0.0),
            (1.0, 0.0, 0.0),
            (1.0, 1.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 0.0, 1.0),
            (1.0, 1.0, 1.0),
            (0.0, 1.0, 1.0),
        ]
        .into_iter()
        .map(|(x, y, z)| dvec3(x, y, z))
        .collect();
        let faces = vec![
            vec![0, 3, 2, 1],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![1, 2, 6, 5],
            vec![2, 3, 7, 6],
            vec![3, 0, 4, 7],
        ];
        Mesh::from_vertices_and_faces(&points, &faces).expect("Cannot create box")
    }

    /// Two by two grid of unit quads.
    fn quad_patch() -> Mesh {
        let points: Vec<DVec3> = (0..9)
            .map(|i| dvec3((i % 3) as f64, (i / 3) as f64, 0.0))
            .collect();
        let faces = vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![3, 4, 7, 6],
            vec![4, 5, 8, 7],
        ];
        Mesh::from_vertices_and_faces(&points, &faces).expect("Cannot create patch")
    }

    #[test]
    fn t_subdivide_tri() {
        let mut mesh = split_unit_square();
        mesh.set_face_attribute(0.into(), "tag", "a")
            .expect("Cannot set attribute");
        let sub = mesh.subdivide_tri(1).expect("Cannot subdivide");
        assert_eq!(sub.num_vertices(), 6);
        assert_eq!(sub.num_faces(), 6);
        assert_eq!(sub.num_edges(), 11);
        assert_f64_eq!(sub.area().expect("Cannot compute area"), 1.0);
        assert_eq!(
            sub.faces()
                .filter(|f| sub.face_attribute(*f, "tag").is_ok())
                .count(),
            3
        );
        sub.check_topology().expect("Topological errors found");
        // The input is left alone.
        assert_eq!(mesh.num_faces(), 2);
        let sub = mesh.subdivide_tri(2).expect("Cannot subdivide");
        assert_eq!(sub.num_faces(), 18);
    }

    #[test]
    fn t_subdivide_quad() {
        let mesh = split_unit_square();
        let (nv, ne, nf) = (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces());
        let sub = mesh.subdivide_quad(1).expect("Cannot subdivide");
        assert_eq!(sub.num_vertices(), nv + ne + nf);
        assert_eq!(sub.num_faces(), 6);
        assert_eq!(sub.num_edges(), 16);
        assert!(sub.faces().all(|f| sub.face_degree(f).expect("Missing face") == 4));
        assert_f64_eq!(sub.area().expect("Cannot compute area"), 1.0);
        // Old vertices keep their keys and positions.
        assert_eq!(
            sub.vertex_coordinates(2.into()).expect("Missing vertex"),
            dvec3(1.0, 1.0, 0.0)
        );
        assert!(sub.vertices().any(|v| {
            sub.vertex_coordinates(v).expect("Missing vertex") == dvec3(0.5, 0.0, 0.0)
        }));
        sub.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_subdivide_quad_wire_edge() {
        let mut mesh = unit_square();
        mesh.add_face(&vhs(&[0, 1, 2])).expect("Cannot add face");
        mesh.add_edge(2.into(), 3.into()).expect("Cannot add edge");
        let sub = mesh.subdivide_quad(1).expect("Cannot subdivide");
        assert_eq!(sub.num_faces(), 3);
        // Three edges of the triangle and the wire edge, each split in two,
        // plus three spokes.
        assert_eq!(sub.num_edges(), 11);
        sub.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_box_catmull_clark() {
        let mesh = unit_box().subdivide_catmull_clark(1).expect("Cannot subdivide");
        assert_eq!(26, mesh.num_vertices());
        assert_eq!(48, mesh.num_edges());
        assert_eq!(24, mesh.num_faces());
        assert_eq!(mesh.euler(), 2);
        mesh.check_topology().expect("Topological errors found");
        let corner = mesh.vertex_coordinates(0.into()).expect("Missing vertex");
        for c in corner.to_array() {
            assert_f64_eq!(c, 2.0 / 9.0);
        }
        let corner = mesh.vertex_coordinates(6.into()).expect("Missing vertex");
        for c in corner.to_array() {
            assert_f64_eq!(c, 7.0 / 9.0);
        }
    }

    #[test]
    fn t_patch_catmull_clark() {
        let mesh = quad_patch();
        let sub = mesh.subdivide_catmull_clark(1).expect("Cannot subdivide");
        assert_eq!(sub.num_vertices(), 25);
        assert_eq!(sub.num_faces(), 16);
        // Boundary vertices stay, and a flat regular grid stays regular.
        for v in [0u32, 2, 6, 8, 1, 3] {
            assert_eq!(
                sub.vertex_coordinates(v.into()).expect("Missing vertex"),
                mesh.vertex_coordinates(v.into()).expect("Missing vertex")
            );
        }
        assert_eq!(
            sub.vertex_coordinates(4.into()).expect("Missing vertex"),
            dvec3(1.0, 1.0, 0.0)
        );
        assert_f64_eq!(sub.area().expect("Cannot compute area"), 4.0);
        sub.check_topology().expect("Topological errors found");
        let sub = mesh.subdivide_catmull_clark(2).expect("Cannot subdivide");
        assert_eq!(sub.num_vertices(), 81);
        assert_eq!(sub.num_faces(), 64);
    }
}
