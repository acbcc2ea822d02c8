use crate::{
    element::{FH, VH},
    error::Error,
    topol::Topology,
};

/// Iterator over the halfedges of a closed vertex cycle. The last vertex is
/// connected back to the first.
pub struct FaceHalfedgeIter<'a> {
    cycle: &'a [VH],
    current: usize,
}

impl<'a> FaceHalfedgeIter<'a> {
    pub(crate) fn new(cycle: &'a [VH]) -> Self {
        FaceHalfedgeIter { cycle, current: 0 }
    }
}

impl Iterator for FaceHalfedgeIter<'_> {
    type Item = (VH, VH);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.cycle.len();
        if self.current >= n {
            return None;
        }
        let i = self.current;
        self.current += 1;
        Some((self.cycle[i], self.cycle[(i + 1) % n]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cycle.len() - self.current.min(self.cycle.len());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FaceHalfedgeIter<'_> {}

/// Halfedges of the given cycle.
pub(crate) fn cycle_halfedges(cycle: &[VH]) -> FaceHalfedgeIter<'_> {
    FaceHalfedgeIter::new(cycle)
}

/// Halfedges of a face, in the order of its vertex cycle.
pub(crate) fn fh_iter(topol: &Topology, f: FH) -> Result<FaceHalfedgeIter<'_>, Error> {
    Ok(FaceHalfedgeIter::new(topol.face_vertices(f)?))
}

/// Faces across the edges of a face. Boundary edges are skipped.
pub(crate) fn ff_iter(topol: &Topology, f: FH) -> Result<impl Iterator<Item = FH> + use<'_>, Error> {
    Ok(fh_iter(topol, f)?.filter_map(move |(u, v)| match topol.halfedge_face(v, u) {
        Ok(Some(nf)) if nf != f => Some(nf),
        _ => None,
    }))
}

/// Faces on the left of the outgoing halfedges of a vertex.
pub(crate) fn vf_iter(topol: &Topology, v: VH) -> Result<impl Iterator<Item = FH> + use<'_>, Error> {
    Ok(topol.outgoing(v)?.values().filter_map(|f| *f))
}

#[cfg(test)]
mod test {
    use super::cycle_halfedges;
    use crate::element::{Handle, VH};

    #[test]
    fn t_cycle_halfedges_wrap() {
        let cycle: Vec<VH> = [0u32, 1, 2, 3].iter().map(|i| i.into()).collect();
        let pairs: Vec<_> = cycle_halfedges(&cycle)
            .map(|(u, v)| (u.index(), v.index()))
            .collect();
        assert_eq!(pairs, [(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(cycle_halfedges(&cycle).len(), 4);
    }
}
