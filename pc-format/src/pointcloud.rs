use arrow::datatypes::SchemaRef;

use crate::Rgb;

/// Point cloud trait
pub trait PointCloudTrait: Sized {
    fn schema(&self) -> SchemaRef;

    /// number of points the cloud is made of
    fn num_points(&self) -> usize;

    /// per point colors, either one for every point or none at all
    fn colors(&self) -> Option<&[Rgb]>;
}
