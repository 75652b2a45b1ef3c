use nalgebra::Vector3;

use pc_format::{partition::nearest_center, Rgb};

use crate::{Point3, RenderConfig};

/// flat gray of the `white` mode
pub const WHITE: Rgb = [0.6, 0.6, 0.6];

/// Where the color of a point comes from, in order of priority.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSource<'a> {
    /// one fixed color for every point
    Flat(Rgb),
    /// the color loaded with the point
    Stored,
    /// position of the L1 nearest center
    Nearest(&'a [Point3]),
    /// position of the point itself
    Position,
}

impl<'a> ColorSource<'a> {
    pub fn select(config: &RenderConfig, colored: bool, centers: &'a [Point3]) -> Self {
        if config.white {
            ColorSource::Flat(WHITE)
        } else if let Some(rgb) = config.rgb {
            ColorSource::Flat(rgb)
        } else if colored {
            ColorSource::Stored
        } else if !centers.is_empty() {
            ColorSource::Nearest(centers)
        } else {
            ColorSource::Position
        }
    }
}

/// Clamp into `[contrast, 1]` and scale to unit length.
pub fn unit_color(v: [f64; 3], contrast: f64) -> Rgb {
    let v = Vector3::from(v.map(|c| c.clamp(contrast, 1.))).normalize();
    [v.x, v.y, v.z]
}

/// Procedural point colors
#[derive(Debug, Clone, Copy)]
pub struct Colorizer<'a> {
    source: ColorSource<'a>,
    contrast: f64,
}

impl<'a> Colorizer<'a> {
    /// `centers` live in the unit cube, like the points passed to [Colorizer::color]
    pub fn new(config: &RenderConfig, colored: bool, centers: &'a [Point3]) -> Self {
        Colorizer {
            source: ColorSource::select(config, colored, centers),
            contrast: config.contrast,
        }
    }

    pub fn source(&self) -> ColorSource<'a> {
        self.source
    }

    /// Color of a point shifted into the unit cube, `stored` is its loaded color.
    pub fn color(&self, p: &Point3, stored: Option<Rgb>) -> Rgb {
        match self.source {
            ColorSource::Flat(rgb) => rgb,
            ColorSource::Stored => match stored {
                Some(rgb) => rgb,
                None => unit_color(p.into_array(), self.contrast),
            },
            ColorSource::Nearest(centers) => {
                let source = nearest_center(p, centers).map_or(*p, |i| centers[i]);
                unit_color(source.into_array(), self.contrast)
            }
            ColorSource::Position => unit_color(p.into_array(), self.contrast),
        }
    }
}
