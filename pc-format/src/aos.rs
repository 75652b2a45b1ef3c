use arrow::datatypes::{Field, Schema, SchemaRef};

use crate::{schema::color_field, PointCloudError, PointCloudTrait, PointTrait, Rgb};

/// Point cloud
///
/// Colors are stored beside the locations and are either present for every
/// point or absent for the whole cloud.
#[derive(Clone, Debug, PartialEq)]
pub struct VecPointCloud<P>
where
    P: PointTrait,
{
    points: Vec<P>,
    colors: Option<Vec<Rgb>>,
}

impl<P> VecPointCloud<P>
where
    P: PointTrait,
{
    /// uncolored cloud
    pub fn new(points: Vec<P>) -> Self {
        Self {
            points,
            colors: None,
        }
    }

    /// colored cloud, one color per point
    pub fn with_colors(points: Vec<P>, colors: Vec<Rgb>) -> Result<Self, PointCloudError> {
        if points.len() != colors.len() {
            return Err(PointCloudError::ColorMismatch {
                points: points.len(),
                colors: colors.len(),
            });
        }

        Ok(Self {
            points,
            colors: Some(colors),
        })
    }

    pub fn as_slice(&self) -> &[P] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_colored(&self) -> bool {
        self.colors.is_some()
    }

    /// color of the nth point
    pub fn color(&self, index: usize) -> Option<Rgb> {
        self.colors
            .as_ref()
            .and_then(|colors| colors.get(index).copied())
    }

    /// iterate points together with their colors
    pub fn iter(&self) -> impl Iterator<Item = (&P, Option<Rgb>)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (p, self.color(i)))
    }

    /// gather the points at `indices`, keeping their colors
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            points: indices.iter().map(|i| self.points[*i].clone()).collect(),
            colors: self
                .colors
                .as_ref()
                .map(|colors| indices.iter().map(|i| colors[*i]).collect()),
        }
    }

    /// keep the points matching `predicate`
    pub fn retain(&self, mut predicate: impl FnMut(&P) -> bool) -> Self {
        let indices: Vec<usize> = self
            .points
            .iter()
            .enumerate()
            .filter(|(_, p)| predicate(*p))
            .map(|(i, _)| i)
            .collect();
        self.select(&indices)
    }

    /// transform locations, colors are untouched
    pub fn map_points(self, f: impl FnMut(P) -> P) -> Self {
        Self {
            points: self.points.into_iter().map(f).collect(),
            colors: self.colors,
        }
    }

    /// transform colors, locations are untouched
    pub fn map_colors(self, f: impl FnMut(Rgb) -> Rgb) -> Self {
        Self {
            points: self.points,
            colors: self.colors.map(|colors| colors.into_iter().map(f).collect()),
        }
    }

    pub fn into_parts(self) -> (Vec<P>, Option<Vec<Rgb>>) {
        (self.points, self.colors)
    }
}

impl<P> PointCloudTrait for VecPointCloud<P>
where
    P: PointTrait,
    <P as rstar::Point>::Scalar: num_traits::NumCast,
{
    fn schema(&self) -> SchemaRef {
        let schema = P::schema();
        if self.colors.is_none() {
            return schema;
        }

        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields.extend(
            ["red", "green", "blue"]
                .iter()
                .enumerate()
                .map(|(i, name)| color_field(name, i, arrow::datatypes::DataType::Float64)),
        );
        Schema::new(fields).into()
    }

    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn colors(&self) -> Option<&[Rgb]> {
        self.colors.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use crate::{aabb::AABB, point::Point, point::PointTrait, schema};

    use super::*;

    fn cloud() -> VecPointCloud<Point<f64, 3>> {
        VecPointCloud::new(vec![
            Point::<f64, 3>::new([0.0, 1.0, 2.0]),
            Point::new([2.0, 0.0, 1.0]),
            Point::new([1.0, 2.0, 0.0]),
        ])
    }

    #[test]
    fn aabb() {
        let pc = cloud();

        assert_eq!(pc.num_points(), 3);
        assert_eq!(
            AABB::from_points(pc.as_slice()),
            AABB::from_corners(Point::new([0.0, 0.0, 0.0]), Point::new([2.0, 2.0, 2.0]))
        );
    }

    #[test]
    fn filter() {
        // filter by axis aligned bounding box
        let pc = cloud();

        let aabb: AABB<Point<f64, 3>> =
            AABB::from_corners(Point::new([-0.5; 3]), Point::new([1.5, 1.5, 2.5]));

        let filtered = pc.retain(|p| aabb.contains_point(p));
        assert_eq!(filtered.num_points(), 1);
        assert_eq!(filtered.as_slice()[0], Point::new([0.0, 1.0, 2.0]));
    }

    #[test]
    fn colors() {
        let (points, _) = cloud().into_parts();

        let mismatch = VecPointCloud::with_colors(points.clone(), vec![[1.0, 0.0, 0.0]]);
        assert!(matches!(
            mismatch,
            Err(PointCloudError::ColorMismatch {
                points: 3,
                colors: 1
            })
        ));

        let pc = VecPointCloud::with_colors(
            points,
            vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        )
        .unwrap();
        assert!(pc.is_colored());
        assert_eq!(schema::colors(&pc.schema()), Some([3, 4, 5]));

        let selected = pc.select(&[2, 0]);
        assert_eq!(selected.color(0), Some([0.0, 0.0, 1.0]));
        assert_eq!(selected.color(1), Some([1.0, 0.0, 0.0]));
        assert_eq!(selected.as_slice()[0], Point::new([1.0, 2.0, 0.0]));
    }

    #[test]
    fn scale() {
        // scale aspect-correct into the unit cube
        let pc = cloud();

        let aabb = AABB::from_points(pc.as_slice());
        let scale = Point::splat(aabb.max_extent());
        let lower = aabb.lower();

        let scaled = pc.clone().map_points(|p| p.sub(&lower).div(&scale));

        let unit_cube: AABB<Point<f64, 3>> =
            AABB::from_corners(Point::new([0.; 3]), Point::new([1.; 3]));

        assert_eq!(pc.num_points(), scaled.num_points());
        assert!(unit_cube.contains_aabb(&AABB::from_points(scaled.as_slice())))
    }
}
