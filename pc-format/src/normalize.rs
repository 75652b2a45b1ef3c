use num_traits::{Float, Zero};

use crate::{PointCloudError, PointTrait, VecPointCloud, AABB};

/// Bounding box standardization into the canonical box `[-0.5, 0.5]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Standardization<P: PointTrait> {
    /// midpoint of the bounding box
    pub center: P,
    /// largest extent of the bounding box over all axes
    pub scale: P::Scalar,
}

impl<P> Standardization<P>
where
    P: PointTrait,
    P::Scalar: Float,
{
    pub fn from_points(points: &[P]) -> Result<Self, PointCloudError> {
        if points.is_empty() {
            return Err(PointCloudError::EmptyPointCloud);
        }

        // NaN and infinite coordinates
        if points
            .iter()
            .any(|p| p.coords().iter().any(|c| !Float::is_finite(*c)))
        {
            return Err(PointCloudError::DegenerateGeometry);
        }

        let aabb = AABB::from_points(points.iter());
        let scale = aabb.max_extent();

        if scale <= P::Scalar::zero() {
            return Err(PointCloudError::DegenerateGeometry);
        }

        Ok(Self {
            center: aabb.center(),
            scale,
        })
    }

    #[inline]
    pub fn apply(&self, p: &P) -> P {
        p.sub(&self.center).div(&P::splat(self.scale))
    }

    /// apply to every point of a cloud, clamping colors into `[0, 1]`
    pub fn standardize(&self, pc: &VecPointCloud<P>) -> VecPointCloud<P> {
        pc.clone()
            .map_points(|p| self.apply(&p))
            .map_colors(|rgb| rgb.map(|c| c.clamp(0., 1.)))
    }
}

/// rescale and recenter a cloud into `[-0.5, 0.5]`, clamping colors into `[0, 1]`
pub fn standardize<P>(pc: &VecPointCloud<P>) -> Result<VecPointCloud<P>, PointCloudError>
where
    P: PointTrait,
    P::Scalar: Float,
{
    let standardization = Standardization::from_points(pc.as_slice())?;
    Ok(standardization.standardize(pc))
}
