use std::{
    collections::{BTreeMap, BTreeSet},
    f64::consts::TAU,
};

use glam::{dvec2, DVec3};

use crate::{
    element::VH,
    error::Error,
    mesh::Mesh,
    network::Network,
    predicates::is_ccw_xy,
    topol::Topology,
};

/// Whether `c` lies in the wedge swept counter-clockwise around `a`, from the
/// direction of `b1` to the direction of `b2`.
fn is_in_ccw_wedge(a: DVec3, b1: DVec3, b2: DVec3, c: DVec3) -> bool {
    if is_ccw_xy(a, b1, b2, false) {
        is_ccw_xy(a, b1, c, false) && !is_ccw_xy(a, b2, c, false)
    } else {
        is_ccw_xy(a, b1, c, false) || !is_ccw_xy(a, b2, c, false)
    }
}

/// Clockwise angle in `[0, 2pi)` from the direction `(-1, -1)` to `d`.
fn clockwise_angle_from_southwest(d: DVec3) -> f64 {
    let r = dvec2(-1.0, -1.0);
    let d = d.truncate();
    let ccw = r.perp_dot(d).atan2(r.dot(d));
    (TAU - ccw).rem_euclid(TAU)
}

impl Network {
    /// Neighbors of every node in counter-clockwise order around it. Each
    /// neighbor is inserted into the wedge between two already sorted
    /// neighbors that contains it.
    pub fn sort_neighbors(&self) -> Result<BTreeMap<VH, Vec<VH>>, Error> {
        let mut out = BTreeMap::new();
        for v in self.nodes() {
            let a = self.node_coordinates(v)?;
            let nbrs = self.neighbors(v)?;
            let mut ordered: Vec<(VH, DVec3)> = Vec::with_capacity(nbrs.len());
            for n in nbrs {
                let c = self.node_coordinates(*n)?;
                let len = ordered.len();
                let pos = (0..len)
                    .find(|i| is_in_ccw_wedge(a, ordered[*i].1, ordered[(i + 1) % len].1, c))
                    .map_or(len, |i| i + 1);
                ordered.insert(pos, (*n, c));
            }
            out.insert(v, ordered.into_iter().map(|(n, _)| n).collect());
        }
        Ok(out)
    }

    /// The node the walk around the outer face starts from: the lowest leaf,
    /// or the lowest node if there are no leaves. Lowest means smallest `y`,
    /// then smallest `x`.
    fn seed_node(&self) -> Result<Option<VH>, Error> {
        let candidates: Vec<VH> = match self.leaves().collect::<Vec<_>>() {
            leaves if leaves.is_empty() => self.nodes().collect(),
            leaves => leaves,
        };
        let mut best: Option<(VH, DVec3)> = None;
        for v in candidates {
            let p = self.node_coordinates(v)?;
            let lower = match best {
                Some((_, q)) => p.y.total_cmp(&q.y).then(p.x.total_cmp(&q.x)).is_lt(),
                None => true,
            };
            if lower {
                best = Some((v, p));
            }
        }
        Ok(best.map(|(v, _)| v))
    }

    /// The neighbor of `v` with the smallest clockwise angle from the
    /// direction `(-1, -1)`.
    fn first_neighbor(&self, v: VH) -> Result<Option<VH>, Error> {
        let a = self.node_coordinates(v)?;
        let mut best: Option<(VH, f64)> = None;
        for n in self.neighbors(v)? {
            let angle = clockwise_angle_from_southwest(self.node_coordinates(*n)? - a);
            if best.is_none_or(|(_, b)| angle < b) {
                best = Some((*n, angle));
            }
        }
        Ok(best.map(|(n, _)| n))
    }

    /**
     * Find the faces of a planar straight line embedding of the network.
     *
     * Every face is traced by walking along directed edges, always turning
     * into the neighbor that comes right before the previous node in the
     * counter-clockwise order around the current node, until the first
     * directed edge comes up again. This traces the face on the left of the
     * starting edge.
     *
     * ```text
     *   2           sorted(1) = [3, 2, 0]
     *   | \
     *   |  \        0 -> 1 -> 2 -> 0 is the inner face,
     *   0---1---3   3 -> 1 -> 0 -> 2 -> 1 -> 3 the outer face.
     * ```
     *
     * The outer face is traced first, starting at the lowest leaf. Then every
     * directed edge without a face, in the order in which the edges were
     * added. The returned mesh has the nodes of the network with the same keys
     * and attributes, and every edge of the network. If any `breakpoints` are
     * given, the faces are broken at them with [`Mesh::break_faces`].
     *
     * The result is only meaningful if no two edges cross, see
     * [`Network::is_crossed`].
     */
    pub fn find_faces(&self, breakpoints: &[VH]) -> Result<Mesh, Error> {
        let mut mesh = Mesh::new();
        for v in self.nodes() {
            mesh.add_vertex_with_key(v, self.node_attributes(v)?.clone());
        }
        for (u, v) in self.edges() {
            mesh.add_edge(u, v)?;
        }
        let sorted = self.sort_neighbors()?;
        if let Some(u) = self.seed_node()? {
            if let Some(v) = self.first_neighbor(u)? {
                trace_face(&mut mesh, &sorted, u, v)?;
            }
        }
        for (u, v) in self.edges() {
            for (a, b) in [(u, v), (v, u)] {
                if mesh.halfedge_face(a, b)?.is_none() {
                    trace_face(&mut mesh, &sorted, a, b)?;
                }
            }
        }
        log::debug!(
            "Found {} faces in a network with {} nodes and {} edges",
            mesh.num_faces(),
            self.num_nodes(),
            self.num_edges()
        );
        if breakpoints.is_empty() {
            Ok(mesh)
        } else {
            mesh.break_faces(breakpoints)
        }
    }
}

/// Walk the face on the left of the directed edge from `u` to `v` and add it
/// to the mesh.
fn trace_face(
    mesh: &mut Mesh,
    sorted: &BTreeMap<VH, Vec<VH>>,
    u: VH,
    v: VH,
) -> Result<(), Error> {
    let start = (u, v);
    let mut cycle = vec![u];
    let (mut u, mut v) = start;
    loop {
        cycle.push(v);
        let nbrs = sorted.get(&v).ok_or(Error::VertexNotFound(v))?;
        let i = nbrs
            .iter()
            .position(|n| *n == u)
            .ok_or(Error::HalfedgeNotFound(v, u))?;
        let next = nbrs[(i + nbrs.len() - 1) % nbrs.len()];
        (u, v) = (v, next);
        if (u, v) == start {
            break;
        }
    }
    log::trace!("Traced face {:?}", cycle);
    mesh.add_face(&cycle)?;
    Ok(())
}

/// Split a closed cycle into the chains between consecutive cut positions.
/// Each chain includes the cut vertices at both its ends.
fn cut_cycle(cycle: &[VH], cuts: &[usize]) -> Vec<Vec<VH>> {
    let n = cycle.len();
    (0..cuts.len())
        .map(|i| {
            let from = cuts[i];
            let to = cuts[(i + 1) % cuts.len()];
            let len = (to + n - from) % n;
            (0..=len).map(|k| cycle[(from + k) % n]).collect()
        })
        .collect()
}

impl Mesh {
    /**
     * Break faces at the given vertices.
     *
     * A face passing through two or more breakpoints is replaced by the
     * chains of its cycle between consecutive breakpoints, each closed into a
     * face of its own. A face passing through a single breakpoint is cut at the
     * breakpoint and at the vertex half way round its cycle. Chains that are
     * too short to form a face are dropped. The new faces copy the attributes
     * of the face they come from.
     */
    pub fn break_faces(mut self, breakpoints: &[VH]) -> Result<Mesh, Error> {
        let breakpoints: BTreeSet<VH> = breakpoints.iter().copied().collect();
        let faces: Vec<_> = self.faces().collect();
        for f in faces {
            let cycle = self.face_vertices(f)?.to_vec();
            let n = cycle.len();
            let mut cuts: Vec<usize> = (0..n).filter(|i| breakpoints.contains(&cycle[*i])).collect();
            match cuts.len() {
                0 => continue,
                1 => cuts.push((cuts[0] + n / 2) % n),
                _ => {}
            }
            cuts.sort_unstable();
            let chains = cut_cycle(&cycle, &cuts);
            let valid = chains
                .iter()
                .filter(|c| Topology::normalize_cycle(c).is_some())
                .count();
            if valid < 2 {
                continue;
            }
            let attrs = self.face_attributes(f)?.clone();
            self.delete_face(f)?;
            for chain in chains {
                self.add_face_with(&chain, None, attrs.clone())?;
            }
        }
        log::debug!("Broke faces into {} faces", self.num_faces());
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use super::{clockwise_angle_from_southwest, cut_cycle};
    use crate::{
        element::VH,
        macros::assert_f64_eq,
        mesh::test::unit_square,
        network::{
            test::{grid_lines, triangle_with_tail},
            Network,
        },
        topol::test::vhs,
    };

    /// Rotate the cycle to start at its smallest vertex.
    fn canonical(cycle: &[VH]) -> Vec<VH> {
        let mut out = cycle.to_vec();
        if let Some(i) = (0..out.len()).min_by_key(|i| out[*i]) {
            out.rotate_left(i);
        }
        out
    }

    #[test]
    fn t_clockwise_angle() {
        assert_f64_eq!(clockwise_angle_from_southwest(dvec3(-1.0, -1.0, 0.0)), 0.0);
        // West is one eighth of a turn clockwise from south west.
        assert_f64_eq!(
            clockwise_angle_from_southwest(dvec3(-1.0, 0.0, 0.0)),
            std::f64::consts::FRAC_PI_4
        );
        assert_f64_eq!(
            clockwise_angle_from_southwest(dvec3(0.0, -1.0, 0.0)),
            7.0 * std::f64::consts::FRAC_PI_4
        );
    }

    #[test]
    fn t_sort_neighbors() {
        let mut net = Network::new();
        let c = net
            .add_node_at(dvec3(0.0, 0.0, 0.0))
            .expect("Cannot add node");
        // Added in a scrambled order: north, east, west, south.
        for (x, y) in [(0.0, 1.0), (1.0, 0.0), (-1.0, 0.0), (0.0, -1.0)] {
            let n = net.add_node_at(dvec3(x, y, 0.0)).expect("Cannot add node");
            net.add_edge(c, n).expect("Cannot add edge");
        }
        let sorted = net.sort_neighbors().expect("Cannot sort neighbors");
        let around = &sorted[&c];
        // East, north, west, south up to rotation.
        assert_eq!(canonical(around), vhs(&[1, 3, 4, 2]));
        assert_eq!(sorted[&VH::from(1u32)], vhs(&[0]));
    }

    #[test]
    fn t_triangle_with_tail() {
        let net = triangle_with_tail();
        let sorted = net.sort_neighbors().expect("Cannot sort neighbors");
        assert_eq!(canonical(&sorted[&VH::from(1u32)]), vhs(&[0, 3, 2]));
        let mesh = net.find_faces(&[]).expect("Cannot find faces");
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 4);
        let mut faces: Vec<Vec<VH>> = mesh
            .faces()
            .map(|f| canonical(mesh.face_vertices(f).expect("Missing face")))
            .collect();
        faces.sort();
        assert_eq!(faces, [vhs(&[0, 1, 2]), vhs(&[0, 2, 1, 3, 1])]);
        // The outer face is found first.
        assert_eq!(
            mesh.face_vertices(0.into()).expect("Missing face"),
            vhs(&[3, 1, 0, 2, 1])
        );
        mesh.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_break_at_leaf() {
        let net = triangle_with_tail();
        let unbroken = net.find_faces(&[]).expect("Cannot find faces");
        let broken = net.find_faces(&vhs(&[3])).expect("Cannot find faces");
        assert_eq!(broken.num_faces(), unbroken.num_faces() + 1);
        let mut faces: Vec<Vec<VH>> = broken
            .faces()
            .map(|f| canonical(broken.face_vertices(f).expect("Missing face")))
            .collect();
        faces.sort();
        assert_eq!(faces, [vhs(&[0, 1, 2]), vhs(&[0, 2, 1, 3]), vhs(&[0, 3, 1])]);
        broken.check_topology().expect("Topological errors found");
    }

    #[test]
    fn t_break_square_at_corners() {
        let mut mesh = unit_square();
        let f = mesh
            .add_face(&vhs(&[0, 1, 2, 3]))
            .expect("Error")
            .expect("Face is degenerate");
        mesh.set_face_attribute(f, "panel", 3i64)
            .expect("Cannot set attribute");
        let mesh = mesh.break_faces(&vhs(&[2, 0])).expect("Cannot break faces");
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.face_vertices(1.into()).expect("Missing face"), vhs(&[0, 1, 2]));
        assert_eq!(mesh.face_vertices(2.into()).expect("Missing face"), vhs(&[2, 3, 0]));
        for f in mesh.faces() {
            assert_eq!(
                mesh.face_attribute(f, "panel").expect("Missing attribute").as_int(),
                Some(3)
            );
        }
        mesh.check_topology().expect("Topological errors found");
        // A triangle cut at one of its corners has nothing to split.
        let mesh = mesh.break_faces(&vhs(&[1])).expect("Cannot break faces");
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.face_vertices(1.into()).expect("Missing face"), vhs(&[0, 1, 2]));
    }

    #[test]
    fn t_grid_faces() {
        let net = Network::from_lines(&grid_lines(3), 3).expect("Cannot create network");
        assert!(!net.is_crossed().expect("Missing coordinates"));
        let mesh = net.find_faces(&[]).expect("Cannot find faces");
        // Nine cells and the outer face.
        assert_eq!(mesh.num_faces(), 10);
        let degrees: Vec<usize> = mesh
            .faces()
            .map(|f| mesh.face_degree(f).expect("Missing face"))
            .collect();
        assert_eq!(degrees.iter().filter(|d| **d == 4).count(), 9);
        assert_eq!(degrees.iter().filter(|d| **d == 12).count(), 1);
        assert_eq!(mesh.euler(), 2);
        mesh.check_topology().expect("Topological errors found");
        for f in mesh.faces() {
            if mesh.face_degree(f).expect("Missing face") == 4 {
                assert_f64_eq!(mesh.face_area(f).expect("Cannot compute area"), 1.0);
            }
        }
    }

    #[test]
    fn t_cut_cycle() {
        let cycle = vhs(&[0, 1, 2, 3, 4]);
        assert_eq!(
            cut_cycle(&cycle, &[1, 3]),
            [vhs(&[1, 2, 3]), vhs(&[3, 4, 0, 1])]
        );
        assert_eq!(cut_cycle(&cycle, &[0, 2]), [vhs(&[0, 1, 2]), vhs(&[2, 3, 4, 0])]);
    }
}
