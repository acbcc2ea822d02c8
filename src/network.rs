use std::collections::{BTreeMap, BTreeSet};

use glam::{dvec3, DVec3};

use crate::{
    attribute::Attributes,
    element::{Handle, KeyCounter, VH},
    error::Error,
    predicates::is_intersection_segment_segment_xy,
};

/// Undirected graph with integer keyed nodes embedded in space.
///
/// Node positions are the `x`, `y` and `z` attributes of the nodes. Edges are
/// kept in the order they were added, which is the order in which faces are
/// searched for by [`Network::find_faces`].
#[derive(Debug, Clone)]
pub struct Network {
    nodes: BTreeMap<VH, Attributes>,
    adjacency: BTreeMap<VH, Vec<VH>>,
    edges: Vec<(VH, VH)>,
    edge_set: BTreeSet<(VH, VH)>,
    keys: KeyCounter,
    default_node: Attributes,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

fn edge_key(u: VH, v: VH) -> (VH, VH) {
    if u < v { (u, v) } else { (v, u) }
}

/// String key of a point, with coordinates rounded to `precision` digits.
fn geometric_key(p: DVec3, precision: usize) -> String {
    // Avoid distinct keys for 0 and -0.
    let fix = |x: f64| if x == 0.0 { 0.0 } else { x };
    format!(
        "{:.*},{:.*},{:.*}",
        precision,
        fix(p.x),
        precision,
        fix(p.y),
        precision,
        fix(p.z)
    )
}

impl Network {
    pub fn new() -> Self {
        Network {
            nodes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            edges: Vec::new(),
            edge_set: BTreeSet::new(),
            keys: KeyCounter::default(),
            default_node: Attributes::xyz(0.0, 0.0, 0.0),
        }
    }

    /// Build a network from line segments. Endpoints that coincide after
    /// rounding their coordinates to `precision` digits become the same node.
    /// Segments that collapse to a single node are skipped.
    pub fn from_lines(lines: &[[DVec3; 2]], precision: usize) -> Result<Self, Error> {
        let mut net = Network::new();
        let mut gkeys: BTreeMap<String, VH> = BTreeMap::new();
        for line in lines {
            let mut ends = [VH::from(0u32); 2];
            for (end, p) in ends.iter_mut().zip(line) {
                let gkey = geometric_key(*p, precision);
                *end = match gkeys.get(&gkey) {
                    Some(v) => *v,
                    None => {
                        let v = net.add_node_at(*p)?;
                        gkeys.insert(gkey, v);
                        v
                    }
                };
            }
            let [u, v] = ends;
            if u != v {
                net.add_edge(u, v)?;
            }
        }
        log::debug!(
            "Network with {} nodes and {} edges from {} lines",
            net.num_nodes(),
            net.num_edges(),
            lines.len()
        );
        Ok(net)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.nodes.keys().copied()
    }

    /// Edges in the order they were added, oriented as they were added.
    pub fn edges(&self) -> impl Iterator<Item = (VH, VH)> + use<'_> {
        self.edges.iter().copied()
    }

    pub fn has_node(&self, v: VH) -> bool {
        self.nodes.contains_key(&v)
    }

    /// Whether the nodes are connected, in either orientation.
    pub fn has_edge(&self, u: VH, v: VH) -> bool {
        self.edge_set.contains(&edge_key(u, v))
    }

    pub fn add_node(&mut self, attrs: Attributes) -> Result<VH, Error> {
        let v = self
            .keys
            .generate()
            .ok_or(Error::KeysExhausted("node"))?
            .into();
        self.insert_node(v, attrs);
        Ok(v)
    }

    pub fn add_node_at(&mut self, pos: DVec3) -> Result<VH, Error> {
        self.add_node(Attributes::xyz(pos.x, pos.y, pos.z))
    }

    /// Add a node with an explicit key. If the node already exists, its
    /// attributes are updated with `attrs`.
    pub fn add_node_with_key(&mut self, key: VH, attrs: Attributes) -> VH {
        self.keys.observe(key.index());
        match self.nodes.get_mut(&key) {
            Some(data) => data.update(&attrs),
            None => self.insert_node(key, attrs),
        }
        key
    }

    fn insert_node(&mut self, v: VH, attrs: Attributes) {
        self.nodes.insert(v, self.default_node.merged(&attrs));
        self.adjacency.entry(v).or_default();
    }

    /// Connect two existing nodes. Adding an edge that already exists, in
    /// either orientation, does nothing.
    pub fn add_edge(&mut self, u: VH, v: VH) -> Result<(), Error> {
        if u == v {
            return Err(Error::DegenerateEdge(u));
        }
        for w in [u, v] {
            if !self.has_node(w) {
                return Err(Error::VertexNotFound(w));
            }
        }
        if !self.edge_set.insert(edge_key(u, v)) {
            return Ok(());
        }
        self.edges.push((u, v));
        self.adjacency.entry(u).or_default().push(v);
        self.adjacency.entry(v).or_default().push(u);
        Ok(())
    }

    /// Neighbors of a node, in the order the edges were added.
    pub fn neighbors(&self, v: VH) -> Result<&[VH], Error> {
        self.adjacency
            .get(&v)
            .map(|nbrs| nbrs.as_slice())
            .ok_or(Error::VertexNotFound(v))
    }

    pub fn degree(&self, v: VH) -> Result<usize, Error> {
        Ok(self.neighbors(v)?.len())
    }

    /// Nodes with exactly one neighbor.
    pub fn leaves(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.adjacency
            .iter()
            .filter(|(_, nbrs)| nbrs.len() == 1)
            .map(|(v, _)| *v)
    }

    pub fn node_attributes(&self, v: VH) -> Result<&Attributes, Error> {
        self.nodes.get(&v).ok_or(Error::VertexNotFound(v))
    }

    pub fn node_attributes_mut(&mut self, v: VH) -> Result<&mut Attributes, Error> {
        self.nodes.get_mut(&v).ok_or(Error::VertexNotFound(v))
    }

    pub fn node_coordinates(&self, v: VH) -> Result<DVec3, Error> {
        let attrs = self.node_attributes(v)?;
        Ok(dvec3(
            attrs.float("x")?,
            attrs.float("y")?,
            attrs.float("z")?,
        ))
    }

    /// Whether any two edges cross in the XY plane. Edges sharing a node are
    /// not tested against each other. This is not checked by
    /// [`Network::find_faces`].
    pub fn is_crossed(&self) -> Result<bool, Error> {
        let segments = self
            .edges
            .iter()
            .map(|(u, v)| Ok(((*u, *v), self.node_coordinates(*u)?, self.node_coordinates(*v)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        for (i, ((u1, v1), a, b)) in segments.iter().enumerate() {
            for ((u2, v2), c, d) in &segments[(i + 1)..] {
                if u1 == u2 || u1 == v2 || v1 == u2 || v1 == v2 {
                    continue;
                }
                if is_intersection_segment_segment_xy(*a, *b, *c, *d) {
                    log::debug!("Edges ({u1}, {v1}) and ({u2}, {v2}) cross");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use glam::dvec3;

    use super::Network;
    use crate::{attribute::Attributes, element::VH, error::Error, topol::test::vhs};

    /**
     * A triangle with a pendant edge.
     * ```text
     *   2
     *   | \
     *   |  \
     *   0---1---3
     * ```
     */
    pub(crate) fn triangle_with_tail() -> Network {
        let mut net = Network::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (2.0, 0.0)] {
            net.add_node_at(dvec3(x, y, 0.0)).expect("Cannot add node");
        }
        for (u, v) in [(0u32, 1u32), (1, 2), (2, 0), (1, 3)] {
            net.add_edge(u.into(), v.into()).expect("Cannot add edge");
        }
        net
    }

    /// Lines of an `n` by `n` grid of unit squares.
    pub(crate) fn grid_lines(n: usize) -> Vec<[glam::DVec3; 2]> {
        let mut lines = Vec::new();
        for i in 0..=n {
            for j in 0..n {
                let (i, j) = (i as f64, j as f64);
                lines.push([dvec3(j, i, 0.0), dvec3(j + 1.0, i, 0.0)]);
                lines.push([dvec3(i, j, 0.0), dvec3(i, j + 1.0, 0.0)]);
            }
        }
        lines
    }

    #[test]
    fn t_network_basics() {
        let mut net = triangle_with_tail();
        assert_eq!(net.num_nodes(), 4);
        assert_eq!(net.num_edges(), 4);
        assert_eq!(net.leaves().collect::<Vec<_>>(), vhs(&[3]));
        assert_eq!(net.degree(1.into()).expect("Missing node"), 3);
        assert_eq!(net.neighbors(1.into()).expect("Missing node"), vhs(&[0, 2, 3]));
        // Duplicates in either orientation are ignored.
        net.add_edge(1.into(), 0.into()).expect("Cannot add edge");
        assert_eq!(net.num_edges(), 4);
        assert!(net.has_edge(3.into(), 1.into()));
        assert!(matches!(
            net.add_edge(2.into(), 2.into()),
            Err(Error::DegenerateEdge(_))
        ));
        assert!(matches!(
            net.add_edge(2.into(), 9.into()),
            Err(Error::VertexNotFound(_))
        ));
        assert_eq!(
            net.node_coordinates(3.into()).expect("Missing node"),
            dvec3(2.0, 0.0, 0.0)
        );
    }

    #[test]
    fn t_node_keys() {
        let mut net = Network::new();
        let attrs: Attributes = [("x", 1.0)].into_iter().collect();
        assert_eq!(net.add_node_with_key(5.into(), attrs), 5.into());
        assert_eq!(
            net.add_node(Attributes::new()).expect("Cannot add node"),
            6.into()
        );
        let attrs: Attributes = [("y", 2.0)].into_iter().collect();
        net.add_node_with_key(5.into(), attrs);
        assert_eq!(net.num_nodes(), 2);
        assert_eq!(
            net.node_coordinates(5.into()).expect("Missing node"),
            dvec3(1.0, 2.0, 0.0)
        );
    }

    #[test]
    fn t_from_lines() {
        let net = Network::from_lines(&grid_lines(2), 3).expect("Cannot create network");
        assert_eq!(net.num_nodes(), 9);
        assert_eq!(net.num_edges(), 12);
        assert_eq!(net.leaves().count(), 0);
        let corner: VH = net
            .nodes()
            .find(|v| net.node_coordinates(*v).expect("Missing node") == dvec3(1.0, 1.0, 0.0))
            .expect("Missing node");
        assert_eq!(net.degree(corner).expect("Missing node"), 4);
        // Endpoints within the precision are merged.
        let net = Network::from_lines(
            &[
                [dvec3(0.0, 0.0, 0.0), dvec3(1.0, 0.0, 0.0)],
                [dvec3(1.0001, 0.0, 0.0), dvec3(1.0, 1.0, 0.0)],
                [dvec3(-0.0, 0.0, 0.0), dvec3(0.0004, 0.0, 0.0)],
            ],
            2,
        )
        .expect("Cannot create network");
        assert_eq!(net.num_nodes(), 3);
        assert_eq!(net.num_edges(), 2);
    }

    #[test]
    fn t_is_crossed() {
        let net = Network::from_lines(&grid_lines(2), 3).expect("Cannot create network");
        assert!(!net.is_crossed().expect("Missing coordinates"));
        let net = Network::from_lines(
            &[
                [dvec3(0.0, 0.0, 0.0), dvec3(1.0, 1.0, 0.0)],
                [dvec3(0.0, 1.0, 0.0), dvec3(1.0, 0.0, 0.0)],
            ],
            3,
        )
        .expect("Cannot create network");
        assert!(net.is_crossed().expect("Missing coordinates"));
    }
}
