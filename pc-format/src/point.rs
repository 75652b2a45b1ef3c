use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
};

use arrow::datatypes::{ArrowNativeType, DataType, Fields, Schema, SchemaRef};
use num_traits::{Bounded, Num, NumCast, Signed, Zero};

use crate::schema::location_field;

/// RGB color, channels in [0, 1]
pub type Rgb = [f64; 3];

/// Coordinate trait
pub trait Coord
where
    Self: Bounded + Num + NumCast + Signed + PartialOrd + Clone + Copy + Debug + ArrowNativeType,
{
    const DATA_TYPE: DataType;
}

// Coordinate trait implementations
impl Coord for f64 {
    const DATA_TYPE: DataType = DataType::Float64;
}
impl Coord for f32 {
    const DATA_TYPE: DataType = DataType::Float32;
}

/// Point trait
pub trait PointTrait: rstar::Point + std::marker::Send {
    fn schema() -> SchemaRef;

    fn coords(&self) -> &[Self::Scalar];

    fn add(&self, other: &Self) -> Self {
        Self::generate(|i| self.nth(i).add(other.nth(i)))
    }

    fn sub(&self, other: &Self) -> Self {
        Self::generate(|i| self.nth(i).sub(other.nth(i)))
    }

    fn mul(&self, other: &Self) -> Self {
        Self::generate(|i| self.nth(i).mul(other.nth(i)))
    }

    fn div(&self, other: &Self) -> Self {
        Self::generate(|i| self.nth(i).div(other.nth(i)))
    }

    /// same value on every axis
    fn splat(value: Self::Scalar) -> Self {
        Self::generate(|_| value)
    }

    /// sum of absolute per-axis differences
    fn l1_distance(&self, other: &Self) -> Self::Scalar {
        (0..Self::DIMENSIONS).fold(Self::Scalar::zero(), |acc, i| {
            acc + Signed::abs(&(self.nth(i) - other.nth(i)))
        })
    }
}

/// Point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<T, const D: usize> {
    location: [T; D],
}

impl<T: Coord, const D: usize> Point<T, D> {
    pub fn new(location: [T; D]) -> Self {
        Point { location }
    }

    pub fn into_array(self) -> [T; D] {
        self.location
    }
}

impl<T: Coord, const D: usize> PointTrait for Point<T, D> {
    fn schema() -> SchemaRef {
        Schema::new(Fields::from_iter((1..=D).map(|i| {
            let name = match i {
                1 => "x".to_string(),
                2 => "y".to_string(),
                3 => "z".to_string(),
                _ => format!("d{i}"),
            };
            location_field(&name, i, T::DATA_TYPE)
        })))
        .into()
    }

    fn coords(&self) -> &[T] {
        &self.location
    }
}

impl<T: Coord, const D: usize> rstar::Point for Point<T, D> {
    type Scalar = T;

    const DIMENSIONS: usize = D;

    #[inline]
    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        let mut i = 0;
        let coords = [(); D].map(|_| {
            let res = generator(i);
            i += 1;
            res
        });

        Point { location: coords }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        self.location[index]
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        &mut self.location[index]
    }
}

#[cfg(test)]
mod tests {
    use rstar::PointDistance;

    use crate::{aos::VecPointCloud, pointcloud::PointCloudTrait};

    use super::*;

    #[test]
    fn schema() {
        let pc = VecPointCloud::new(vec![Point::<f64, 3>::new([1., 1., 1.])]);
        let schema = pc.schema();

        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(2).name(), "z");
        assert_eq!(crate::schema::dimensions(&schema), vec![0, 1, 2]);
    }

    #[test]
    fn ops() {
        let one: Point<f64, 3> = Point::splat(1.);
        let two: Point<f64, 3> = Point::splat(2.);
        let three: Point<f64, 3> = Point::splat(3.);
        let four: Point<f64, 3> = Point::splat(4.);

        assert_eq!(one.add(&one), two);
        assert_eq!(three.sub(&one), two);
        assert_eq!(two.mul(&two), four);
        assert_eq!(four.div(&two), two);
    }

    #[test]
    fn distances() {
        let a: Point<f64, 3> = Point::new([0., 0., 0.]);
        let b: Point<f64, 3> = Point::new([1., -2., 2.]);

        assert_eq!(a.l1_distance(&b), 5.);
        assert_eq!(b.l1_distance(&a), 5.);
        assert_eq!(a.distance_2(&b), 9.);
    }
}
