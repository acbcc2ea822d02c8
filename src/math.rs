use glam::{dvec3, DVec3};

use crate::{
    element::{FH, VH},
    error::Error,
    mesh::Mesh,
};

impl Mesh {
    /// Position of a vertex, read from its `x`, `y` and `z` attributes.
    pub fn vertex_coordinates(&self, v: VH) -> Result<DVec3, Error> {
        let attrs = self.vertex_attributes(v)?;
        Ok(dvec3(
            attrs.float("x")?,
            attrs.float("y")?,
            attrs.float("z")?,
        ))
    }

    pub fn set_vertex_coordinates(&mut self, v: VH, pos: DVec3) -> Result<(), Error> {
        let attrs = self.vertex_attributes_mut(v)?;
        attrs.set("x", pos.x);
        attrs.set("y", pos.y);
        attrs.set("z", pos.z);
        Ok(())
    }

    /// Positions of the vertices of a face, in cycle order.
    pub fn face_coordinates(&self, f: FH) -> Result<Vec<DVec3>, Error> {
        self.face_vertices(f)?
            .iter()
            .map(|v| self.vertex_coordinates(*v))
            .collect()
    }

    /// Average of the vertex positions of the face.
    pub fn face_centroid(&self, f: FH) -> Result<DVec3, Error> {
        let points = self.face_coordinates(f)?;
        Ok(points.iter().sum::<DVec3>() / points.len() as f64)
    }

    /// Area weighted normal of the face using Newell's method. The length of
    /// the returned vector is twice the area of the face.
    fn face_newell_vector(&self, f: FH) -> Result<DVec3, Error> {
        let points = self.face_coordinates(f)?;
        let n = points.len();
        Ok((0..n).fold(DVec3::ZERO, |total, i| {
            let (a, b) = {
                let pc = points[i];
                let pn = points[(i + 1) % n];
                (pc - pn, pc + pn)
            };
            total + dvec3(a.y * b.z, a.z * b.x, a.x * b.y)
        }))
    }

    /// Unit normal of the face. A degenerate face has a zero normal.
    pub fn face_normal(&self, f: FH) -> Result<DVec3, Error> {
        Ok(self.face_newell_vector(f)?.normalize_or_zero())
    }

    pub fn face_area(&self, f: FH) -> Result<f64, Error> {
        Ok(self.face_newell_vector(f)?.length() * 0.5)
    }

    /// Total area of all faces.
    pub fn area(&self) -> Result<f64, Error> {
        self.faces().map(|f| self.face_area(f)).sum()
    }

    /// Vector from `u` to `v`.
    pub fn edge_vector(&self, u: VH, v: VH) -> Result<DVec3, Error> {
        Ok(self.vertex_coordinates(v)? - self.vertex_coordinates(u)?)
    }

    pub fn edge_length(&self, u: VH, v: VH) -> Result<f64, Error> {
        Ok(self.edge_vector(u, v)?.length())
    }

    pub fn edge_midpoint(&self, u: VH, v: VH) -> Result<DVec3, Error> {
        self.edge_point(u, v, 0.5)
    }

    /// Point at parameter `t` on the segment from `u` to `v`.
    pub fn edge_point(&self, u: VH, v: VH, t: f64) -> Result<DVec3, Error> {
        let a = self.vertex_coordinates(u)?;
        let b = self.vertex_coordinates(v)?;
        Ok(a.lerp(b, t))
    }
}

#[cfg(test)]
mod test {
    use glam::dvec3;

    use crate::{
        attribute::Attributes,
        error::Error,
        macros::assert_f64_eq,
        mesh::test::{split_unit_square, unit_square},
        topol::test::vhs,
    };

    #[test]
    fn t_square_geometry() {
        let mut mesh = unit_square();
        let f = mesh
            .add_face(&vhs(&[0, 1, 2, 3]))
            .expect("Error")
            .expect("Face is degenerate");
        assert_eq!(mesh.face_normal(f).expect("Cannot compute normal"), dvec3(0.0, 0.0, 1.0));
        assert_f64_eq!(mesh.face_area(f).expect("Cannot compute area"), 1.0);
        assert_eq!(
            mesh.face_centroid(f).expect("Cannot compute centroid"),
            dvec3(0.5, 0.5, 0.0)
        );
        assert_f64_eq!(
            mesh.edge_length(0.into(), 2.into()).expect("Cannot compute length"),
            2f64.sqrt()
        );
        assert_eq!(
            mesh.edge_midpoint(1.into(), 3.into()).expect("Cannot compute midpoint"),
            dvec3(0.5, 0.5, 0.0)
        );
    }

    #[test]
    fn t_clockwise_face_normal() {
        let mut mesh = unit_square();
        let f = mesh
            .add_face(&vhs(&[0, 3, 2, 1]))
            .expect("Error")
            .expect("Face is degenerate");
        assert_eq!(mesh.face_normal(f).expect("Cannot compute normal"), dvec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn t_total_area() {
        let mesh = split_unit_square();
        assert_f64_eq!(mesh.area().expect("Cannot compute area"), 1.0);
        for f in mesh.faces() {
            assert_f64_eq!(mesh.face_area(f).expect("Cannot compute area"), 0.5);
        }
    }

    #[test]
    fn t_missing_coordinates() {
        let mut mesh = unit_square();
        let v = mesh.add_vertex(Attributes::new()).expect("Cannot add vertex");
        mesh.vertex_attributes_mut(v)
            .expect("Missing vertex")
            .remove("z");
        assert!(matches!(
            mesh.vertex_coordinates(v),
            Err(Error::MissingAttribute(name)) if name == "z"
        ));
        mesh.set_vertex_coordinates(v, dvec3(1.0, 2.0, 3.0))
            .expect("Cannot set coordinates");
        assert_eq!(mesh.vertex_coordinates(v).expect("Missing vertex"), dvec3(1.0, 2.0, 3.0));
    }
}
