use rstar::Envelope;

use crate::PointTrait;

/// Axis aligned bounding box, wraps [rstar::AABB]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB<P: PointTrait>(rstar::AABB<P>);

impl<P: PointTrait> std::ops::Deref for AABB<P> {
    type Target = rstar::AABB<P>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<P> AABB<P>
where
    P: PointTrait,
{
    /// Returns the AABB's lower corner.
    ///
    /// This is the point contained within the AABB with the smallest coordinate value in each
    /// dimension.
    pub fn lower(&self) -> P {
        self.0.lower()
    }

    /// Returns the AABB's upper corner.
    ///
    /// This is the point contained within the AABB with the largest coordinate value in each
    /// dimension.
    pub fn upper(&self) -> P {
        self.0.upper()
    }

    /// Creates a new AABB encompassing two points.
    pub fn from_corners(p1: P, p2: P) -> Self {
        AABB(rstar::AABB::from_corners(p1, p2))
    }

    /// Creates a new AABB encompassing a collection of points.
    ///
    /// An empty collection yields the inverted empty envelope.
    pub fn from_points<'a, I>(i: I) -> Self
    where
        I: IntoIterator<Item = &'a P> + 'a,
        P: 'a,
    {
        i.into_iter()
            .fold(AABB(rstar::AABB::new_empty()), |aabb, p| aabb.add_point(p))
    }

    /// Midpoint between the lower and upper corner.
    pub fn center(&self) -> P {
        self.0.center()
    }

    /// Per-axis size of the box.
    pub fn extent(&self) -> P {
        self.upper().sub(&self.lower())
    }

    /// Largest per-axis size of the box.
    pub fn max_extent(&self) -> P::Scalar {
        let extent = self.extent();
        (1..P::DIMENSIONS).fold(extent.nth(0), |max, i| {
            if extent.nth(i) > max {
                extent.nth(i)
            } else {
                max
            }
        })
    }

    pub fn contains_point(&self, point: &P) -> bool {
        self.0.contains_point(point)
    }

    pub fn contains_aabb(&self, other: &Self) -> bool {
        self.0.contains_envelope(&other.0)
    }

    /// Returns the AABB that contains `self` and another point.
    fn add_point(&self, point: &P) -> Self {
        let lower = self.lower();
        let upper = self.upper();
        AABB(rstar::AABB::from_corners(
            P::generate(|i| {
                if lower.nth(i) < point.nth(i) {
                    lower.nth(i)
                } else {
                    point.nth(i)
                }
            }),
            P::generate(|i| {
                if upper.nth(i) > point.nth(i) {
                    upper.nth(i)
                } else {
                    point.nth(i)
                }
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::Point;

    use super::*;

    #[test]
    fn bounds() {
        let points = [
            Point::<f64, 3>::new([0.0, 1.0, 2.0]),
            Point::new([2.0, 0.0, 1.0]),
            Point::new([1.0, 4.0, 0.0]),
        ];
        let aabb = AABB::from_points(points.iter());

        assert_eq!(aabb.lower(), Point::new([0.0, 0.0, 0.0]));
        assert_eq!(aabb.upper(), Point::new([2.0, 4.0, 2.0]));
        assert_eq!(aabb.center(), Point::new([1.0, 2.0, 1.0]));
        assert_eq!(aabb.extent(), Point::new([2.0, 4.0, 2.0]));
        assert_eq!(aabb.max_extent(), 4.0);
        assert!(points.iter().all(|p| aabb.contains_point(p)));
    }

    #[test]
    fn single_point() {
        let p = Point::<f64, 3>::new([1.0, 1.0, 1.0]);
        let aabb = AABB::from_points([p].iter());

        assert_eq!(aabb, AABB::from_corners(p, p));
        assert_eq!(aabb.max_extent(), 0.0);
    }

    #[test]
    fn containment() {
        let outer: AABB<Point<f64, 3>> =
            AABB::from_corners(Point::new([-0.5; 3]), Point::new([0.5; 3]));
        let inner: AABB<Point<f64, 3>> =
            AABB::from_corners(Point::new([-0.25; 3]), Point::new([0.5; 3]));

        assert!(outer.contains_aabb(&inner));
        assert!(!inner.contains_aabb(&outer));
    }
}
