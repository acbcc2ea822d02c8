use std::path::Path;

use glam::DVec3;

use crate::{attribute::Attributes, element::VH, error::Error, mesh::Mesh};

impl Mesh {
    /// Load a polygon mesh from an OBJ file. The vertices of all models in the
    /// file are numbered consecutively, starting at zero.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let options = tobj::LoadOptions::default();
        let (models, _) =
            tobj::load_obj(path, &options).map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        let mut outmesh = Mesh::new();
        let mut voffset = 0u32;
        let mut fvs: Vec<VH> = Vec::new();
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            let nverts = (mesh.positions.len() / 3) as u32;
            for (i, triplet) in mesh.positions.chunks(3).enumerate() {
                outmesh.add_vertex_with_key(
                    (voffset + i as u32).into(),
                    Attributes::xyz(triplet[0], triplet[1], triplet[2]),
                );
            }
            // Without arities, every face is a triangle.
            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|a| *a as usize).collect()
            };
            let mut start = 0usize;
            for size in arities {
                let indices = mesh
                    .indices
                    .get(start..(start + size))
                    .ok_or(Error::OutOfBoundsAccess(start + size, mesh.indices.len()))?;
                start += size;
                fvs.clear();
                for i in indices {
                    if *i >= nverts {
                        return Err(Error::OutOfBoundsAccess(*i as usize, nverts as usize));
                    }
                    fvs.push((i + voffset).into());
                }
                outmesh.add_face(&fvs)?;
            }
            voffset += nverts;
        }
        log::debug!(
            "Loaded {} vertices and {} faces from {}",
            outmesh.num_vertices(),
            outmesh.num_faces(),
            path.display()
        );
        Ok(outmesh)
    }

    /// Positions of all vertices, in key order.
    pub fn vertex_positions(&self) -> Result<Vec<DVec3>, Error> {
        self.vertices().map(|v| self.vertex_coordinates(v)).collect()
    }
}
