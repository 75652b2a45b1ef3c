use crate::{PointTrait, VecPointCloud};

/// index of the center closest to `p` under L1 distance, lowest index wins ties
pub fn nearest_center<P: PointTrait>(p: &P, centers: &[P]) -> Option<usize> {
    let mut nearest: Option<(usize, P::Scalar)> = None;
    for (i, center) in centers.iter().enumerate() {
        let d = p.l1_distance(center);
        match nearest {
            Some((_, min)) if d >= min => {}
            _ => nearest = Some((i, d)),
        }
    }
    nearest.map(|(i, _)| i)
}

/// assign every point to its nearest center
pub fn assign<P: PointTrait>(points: &[P], centers: &[P]) -> Vec<Option<usize>> {
    points.iter().map(|p| nearest_center(p, centers)).collect()
}

/// Split a cloud into one segment per center.
///
/// Segments keep the input order of their points and may be empty. Every point
/// lands in exactly one segment unless `centers` is empty.
pub fn partition<P: PointTrait>(pc: &VecPointCloud<P>, centers: &[P]) -> Vec<VecPointCloud<P>> {
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); centers.len()];
    for (i, segment) in assign(pc.as_slice(), centers).into_iter().enumerate() {
        if let Some(segment) = segment {
            members[segment].push(i);
        }
    }

    members.iter().map(|indices| pc.select(indices)).collect()
}
