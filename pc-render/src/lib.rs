use pc_format::{Point, VecPointCloud};

pub mod color;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod scene;

pub use color::{ColorSource, Colorizer};
pub use config::{RenderArgs, RenderConfig};
pub use error::RenderError;
pub use renderer::{Mitsuba, SceneRenderer};
pub use scene::{SceneBuilder, SceneDocument};

/// point type of the rendering pipeline
pub type Point3 = Point<f64, 3>;

/// point cloud type of the rendering pipeline
pub type Cloud = VecPointCloud<Point3>;
