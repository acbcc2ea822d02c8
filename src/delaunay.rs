use glam::{dvec3, DVec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::{
    attribute::Attributes,
    element::{Handle, FH, VH},
    error::Error,
    iterator,
    mesh::Mesh,
    predicates::{
        bounding_box_xy, centroid_points, is_point_in_polygon_xy, is_point_in_triangle_xy, Circle,
    },
};

/// Seed used for the jitter unless another one is provided.
pub const DEFAULT_SEED: u64 = 0x5eed_de1a_0000_0001;

/// Scale of the enclosing triangle relative to the diagonal of the bounding
/// box of the input.
const SUPER_TRIANGLE_SCALE: f64 = 300.0;

/// Options for the incremental Delaunay triangulation.
#[derive(Debug, Clone)]
pub struct DelaunayOptions {
    /// Every point is moved by a random amount in `[-tiny, tiny]` along `x` and
    /// `y` before it is inserted, to break ties between co-circular and
    /// collinear points.
    pub tiny: f64,
    /// Seed of the jitter. The same input and seed produce the same output.
    pub seed: u64,
    /// Faces whose centroid is outside this polygon are removed.
    pub boundary: Option<Vec<DVec3>>,
    /// Faces whose centroid is inside any of these polygons are removed.
    pub holes: Vec<Vec<DVec3>>,
}

impl Default for DelaunayOptions {
    fn default() -> Self {
        DelaunayOptions {
            tiny: 1e-12,
            seed: DEFAULT_SEED,
            boundary: None,
            holes: Vec::new(),
        }
    }
}

impl DelaunayOptions {
    pub fn with_tiny(mut self, tiny: f64) -> Self {
        self.tiny = tiny.abs();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_boundary(mut self, boundary: Vec<DVec3>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_hole(mut self, hole: Vec<DVec3>) -> Self {
        self.holes.push(hole);
        self
    }
}

/**
 * Add a triangle enclosing all the points to an empty mesh, and return its
 * vertices. The vertices are keyed after the points, i.e. `n`, `n + 1` and
 * `n + 2`.
 *
 * ```text
 *               s0
 *              /  \
 *             /    \
 *            /  c   \
 *           /        \
 *         s1----------s2
 * ```
 */
fn add_super_triangle(mesh: &mut Mesh, points: &[DVec3]) -> Result<[VH; 3], Error> {
    let n = points.len();
    let center = centroid_points(points);
    let diagonal = match bounding_box_xy(points) {
        Some((min, max)) => (max - min).length(),
        None => 0.0,
    };
    let d = SUPER_TRIANGLE_SCALE * if diagonal > 0.0 { diagonal } else { 1.0 };
    let s3 = 3f64.sqrt() * d;
    let corners = [
        dvec3(center.x, center.y + 2.0 * d, 0.0),
        dvec3(center.x - s3, center.y - d, 0.0),
        dvec3(center.x + s3, center.y - d, 0.0),
    ];
    let mut verts = [VH::from(0u32); 3];
    for (i, (v, pos)) in verts.iter_mut().zip(corners).enumerate() {
        *v = mesh.add_vertex_with_key(
            VH::from((n + i) as u32),
            Attributes::xyz(pos.x, pos.y, pos.z),
        );
    }
    mesh.add_face(&verts)?
        .ok_or(Error::NotEnoughPoints(n))?;
    log::debug!(
        "Enclosing triangle with vertices {:?} around {}",
        verts,
        center
    );
    Ok(verts)
}

/// The first face, in key order, that contains the point.
fn locate_point(mesh: &Mesh, p: DVec3) -> Result<Option<FH>, Error> {
    for f in mesh.faces() {
        let abc = mesh.face_coordinates(f)?;
        if abc.len() == 3 && is_point_in_triangle_xy(p, abc[0], abc[1], abc[2]) {
            return Ok(Some(f));
        }
    }
    Ok(None)
}

/// Flip edges until the triangles around `v` satisfy the Delaunay condition.
fn legalize(mesh: &mut Mesh, v: VH, p: DVec3, mut stack: Vec<FH>) -> Result<usize, Error> {
    let mut nflips = 0usize;
    while let Some(f) = stack.pop() {
        if !mesh.has_face(f) {
            continue;
        }
        // The edge of the face opposite to the new vertex.
        let Some((a, b)) = iterator::fh_iter(mesh.topology(), f)?.find(|(a, b)| *a != v && *b != v)
        else {
            continue;
        };
        let Some(nf) = mesh.halfedge_face(b, a)? else {
            continue;
        };
        let abc = mesh.face_coordinates(nf)?;
        if abc.len() != 3 {
            continue;
        }
        let inside = Circle::circumcircle(abc[0], abc[1], abc[2])
            .is_some_and(|circle| circle.contains(p));
        if inside {
            let (f1, f2) = mesh.swap_edge(a, b)?;
            stack.push(f1);
            stack.push(f2);
            nflips += 1;
        }
    }
    Ok(nflips)
}

/// Remove the faces outside the boundary or inside any of the holes.
fn cull_faces(mesh: &mut Mesh, opts: &DelaunayOptions) -> Result<usize, Error> {
    if opts.boundary.is_none() && opts.holes.is_empty() {
        return Ok(0);
    }
    let faces: Vec<FH> = mesh.faces().collect();
    let mut culled = 0usize;
    for f in faces {
        let c = mesh.face_centroid(f)?;
        let outside = opts
            .boundary
            .as_ref()
            .is_some_and(|boundary| !is_point_in_polygon_xy(c, boundary));
        let in_hole = opts.holes.iter().any(|hole| is_point_in_polygon_xy(c, hole));
        if outside || in_hole {
            mesh.delete_face(f)?;
            culled += 1;
        }
    }
    Ok(culled)
}

/**
 * Delaunay triangulation of points in the XY plane.
 *
 * The points are inserted one at a time into a triangle enclosing all of them.
 * Every insertion splits the containing face into three, after which edges are
 * flipped until the neighborhood of the new point is Delaunay again. The
 * enclosing triangle is removed at the end, and the faces are culled against
 * the boundary and holes of `opts`.
 *
 * The vertex keys of the returned mesh are the indices of the points, and the
 * vertices keep the original positions of the points. Exactly co-circular or
 * collinear points are only handled by the jitter, so the choice among
 * equivalent triangulations depends on the seed.
 */
pub fn delaunay_mesh(points: &[DVec3], opts: &DelaunayOptions) -> Result<Mesh, Error> {
    let n = points.len();
    if n < 3 {
        return Err(Error::NotEnoughPoints(n));
    }
    let mut mesh = Mesh::new();
    let super_verts = add_super_triangle(&mut mesh, points)?;
    let mut rng = Pcg32::seed_from_u64(opts.seed);
    let tiny = opts.tiny.abs();
    let mut nflips = 0usize;
    for (i, p) in points.iter().enumerate() {
        let p = dvec3(
            p.x + rng.gen_range(-tiny..=tiny),
            p.y + rng.gen_range(-tiny..=tiny),
            0.0,
        );
        let f = locate_point(&mesh, p)?.ok_or(Error::PointLocationFailed(i))?;
        let (v, faces) = mesh.insert_vertex(f, Some(VH::from(i as u32)), Some(p))?;
        nflips += legalize(&mut mesh, v, p, faces)?;
    }
    for v in super_verts {
        mesh.delete_vertex(v)?;
    }
    let culled = cull_faces(&mut mesh, opts)?;
    for (i, p) in points.iter().enumerate() {
        mesh.set_vertex_coordinates(VH::from(i as u32), *p)?;
    }
    log::debug!(
        "Triangulated {} points into {} faces with {} flips, {} faces culled",
        n,
        mesh.num_faces(),
        nflips,
        culled
    );
    Ok(mesh)
}

/// Delaunay triangulation of points in the XY plane, as triples of indices
/// into `points`. See [`delaunay_mesh`].
pub fn delaunay_from_points(
    points: &[DVec3],
    opts: &DelaunayOptions,
) -> Result<Vec<[usize; 3]>, Error> {
    let mesh = delaunay_mesh(points, opts)?;
    let mut out = Vec::with_capacity(mesh.num_faces());
    for f in mesh.faces() {
        match mesh.face_vertices(f)? {
            [a, b, c] => out.push([a, b, c].map(|v| v.index() as usize)),
            _ => return Err(Error::NotATriangle(f)),
        }
    }
    Ok(out)
}
