pub mod aabb;
pub use aabb::AABB;

pub mod aos;
pub use aos::VecPointCloud;

pub mod compute;

pub mod mask;
pub use mask::Mask;

pub mod normalize;
pub use normalize::{standardize, Standardization};

pub mod partition;

pub mod point;
pub use point::{Coord, Point, PointTrait, Rgb};

pub mod pointcloud;
pub use pointcloud::PointCloudTrait;

pub mod sample;
pub use sample::{farthest_point_indices, farthest_point_sampling};

pub mod schema;

#[derive(thiserror::Error, Debug)]
pub enum PointCloudError {
    #[error("arrow error")]
    ArrowError(#[from] arrow::error::ArrowError),
    #[error("io error")]
    IoError(#[from] std::io::Error),
    #[error("schema validation error: {0}")]
    SchemaError(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("decoding error: {0}")]
    Decode(String),
    #[error("point cloud is empty")]
    EmptyPointCloud,
    #[error("degenerate geometry: zero extent or non-finite coordinates")]
    DegenerateGeometry,
    #[error("cannot sample {requested} points from a cloud of {available}")]
    InvalidSampleCount { requested: usize, available: usize },
    #[error("got {colors} colors for {points} points")]
    ColorMismatch { points: usize, colors: usize },
}
