use num_traits::Float;
use rstar::PointDistance;

use crate::{sample::farthest_point_indices, PointCloudError, PointTrait, VecPointCloud};

/// Exclusion zones around a set of centers.
///
/// A point is excluded when its Euclidean distance to any center is strictly
/// below the radius.
#[derive(Debug, Clone)]
pub struct Mask<P: PointTrait> {
    centers: Vec<P>,
    radius: P::Scalar,
}

impl<P> Mask<P>
where
    P: PointTrait,
    P::Scalar: Float,
{
    pub fn new(centers: Vec<P>, radius: P::Scalar) -> Self {
        Mask { centers, radius }
    }

    /// Zones around the first `keep` of `samples` farthest point samples.
    ///
    /// `samples` is capped at the cloud size.
    pub fn from_samples(
        points: &[P],
        samples: usize,
        keep: usize,
        radius: P::Scalar,
    ) -> Result<Self, PointCloudError> {
        let indices = farthest_point_indices(points, samples.min(points.len()))?;
        let centers = indices
            .iter()
            .take(keep)
            .map(|i| points[*i].clone())
            .collect();
        Ok(Mask::new(centers, radius))
    }

    pub fn centers(&self) -> &[P] {
        &self.centers
    }

    pub fn excludes(&self, p: &P) -> bool {
        let radius_2 = self.radius * self.radius;
        self.centers.iter().any(|c| c.distance_2(p) < radius_2)
    }

    /// drop every excluded point
    pub fn apply(&self, pc: &VecPointCloud<P>) -> VecPointCloud<P> {
        pc.retain(|p| !self.excludes(p))
    }
}

#[cfg(test)]
mod tests {
    use crate::Point;

    use super::*;

    #[test]
    fn boundary() {
        let mask = Mask::new(vec![Point::<f64, 3>::new([0., 0., 0.])], 0.05);

        assert!(mask.excludes(&Point::new([0., 0., 0.])));
        assert!(mask.excludes(&Point::new([0.049, 0., 0.])));
        assert!(!mask.excludes(&Point::new([0.05, 0., 0.])));
        assert!(!mask.excludes(&Point::new([0., -0.05, 0.])));
        assert!(!mask.excludes(&Point::new([0.2, 0.2, 0.2])));
    }

    #[test]
    fn centers_are_excluded() {
        let points: Vec<Point<f64, 3>> = (0..30)
            .map(|i| {
                let t = i as f64 / 30.;
                Point::new([t - 0.5, (t * 7.).sin() * 0.5, (t * 3.).cos() * 0.5])
            })
            .collect();
        let pc = VecPointCloud::new(points.clone());

        let mask = Mask::from_samples(&points, 128, 4, 0.05).unwrap();
        assert_eq!(mask.centers().len(), 4);

        let kept = mask.apply(&pc);
        assert!(kept.len() <= pc.len() - 4);
        for center in mask.centers() {
            assert!(!kept.as_slice().contains(center));
        }
        assert!(kept.as_slice().iter().all(|p| !mask.excludes(p)));
    }
}
