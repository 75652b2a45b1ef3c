use num_traits::{Float, NumCast, Zero};
use rstar::PointDistance;

use crate::{PointCloudError, PointTrait, VecPointCloud};

/// mean of all points
pub fn barycenter<P>(points: &[P]) -> Option<P>
where
    P: PointTrait,
    P::Scalar: Float,
{
    let n: P::Scalar = NumCast::from(points.len())?;
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(P::splat(P::Scalar::zero()), |acc, p| acc.add(p));
    Some(sum.div(&P::splat(n)))
}

/// Farthest point sampling.
///
/// Greedily picks `k` distinct points, starting from the barycenter as the
/// initial reference. Every step keeps, for each candidate, the minimum squared
/// distance to all points picked so far and selects the candidate maximizing it.
/// Ties go to the lowest index. Returns indices in selection order.
pub fn farthest_point_indices<P>(points: &[P], k: usize) -> Result<Vec<usize>, PointCloudError>
where
    P: PointTrait,
    P::Scalar: Float,
{
    if k > points.len() {
        return Err(PointCloudError::InvalidSampleCount {
            requested: k,
            available: points.len(),
        });
    }

    let Some(mut reference) = barycenter(points) else {
        return Ok(Vec::new());
    };

    let mut distance = vec![P::Scalar::infinity(); points.len()];
    let mut selected = vec![false; points.len()];
    let mut indices = Vec::with_capacity(k);

    for _ in 0..k {
        let mut farthest: Option<(usize, P::Scalar)> = None;

        for (i, p) in points.iter().enumerate() {
            if selected[i] {
                continue;
            }

            let d = reference.distance_2(p);
            if d < distance[i] {
                distance[i] = d;
            }

            match farthest {
                Some((_, max)) if distance[i] <= max => {}
                _ => farthest = Some((i, distance[i])),
            }
        }

        let Some((index, _)) = farthest else {
            break;
        };

        selected[index] = true;
        indices.push(index);
        reference = points[index].clone();
    }

    Ok(indices)
}

/// farthest point sampling over a cloud, sampled points keep their colors
pub fn farthest_point_sampling<P>(
    pc: &VecPointCloud<P>,
    k: usize,
) -> Result<VecPointCloud<P>, PointCloudError>
where
    P: PointTrait,
    P::Scalar: Float,
{
    let indices = farthest_point_indices(pc.as_slice(), k)?;
    Ok(pc.select(&indices))
}
