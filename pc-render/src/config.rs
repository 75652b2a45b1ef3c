use std::path::PathBuf;

use clap::Args;

use pc_format::Rgb;

use crate::RenderError;

/// Rendering arguments
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Input point cloud (ply, las, laz, parquet, arrow, txt, csv, xyz)
    pub path: PathBuf,

    /// Field separator of delimited text input
    #[arg(long, default_value = ",")]
    pub separator: String,

    /// Downsample to this many points
    #[arg(long)]
    pub num: Option<usize>,

    /// Seed of the downsampling
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Color by the nearest of `center-num` farthest point samples
    #[arg(long)]
    pub knn: bool,

    /// Number of farthest point samples for knn colors and segments
    #[arg(long, default_value_t = 24)]
    pub center_num: usize,

    /// Split into segments around the samples and render each separately
    #[arg(long)]
    pub part: bool,

    /// Render in flat gray
    #[arg(long)]
    pub white: bool,

    /// Render in a fixed color, three values in 0..=255
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    pub rgb: Vec<i64>,

    /// Rotation around x, y and z in degrees
    #[arg(long, num_args = 1.., allow_negative_numbers = true)]
    pub rot: Vec<f64>,

    /// Image width and height
    #[arg(long, num_args = 1.., default_values_t = [800u32, 800])]
    pub res: Vec<u32>,

    /// Sphere radius
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.025)]
    pub radius: f64,

    /// Lower bound of position derived color channels
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0004)]
    pub contrast: f64,

    /// Drop points around farthest point samples
    #[arg(long)]
    pub mask: bool,

    /// Camera position
    #[arg(long, num_args = 1.., allow_negative_numbers = true, default_values_t = [2.75, 2.75, 2.75])]
    pub view: Vec<f64>,

    /// Translation of every sphere
    #[arg(long, num_args = 1.., allow_negative_numbers = true, default_values_t = [0., 0., 0.])]
    pub translate: Vec<f64>,

    /// Per axis scale of every sphere position
    #[arg(long, num_args = 1.., allow_negative_numbers = true, default_values_t = [1., 1., 1.])]
    pub scale: Vec<f64>,

    /// Samples per pixel
    #[arg(long, default_value_t = 256)]
    pub spp: u32,

    /// Directory of the transient scene files
    #[arg(long, env = "PC_RENDER_WORKDIR", default_value = "workdir")]
    pub workdir: PathBuf,

    /// Output image
    #[arg(long, default_value = "result.png")]
    pub output: PathBuf,

    /// Renderer executable
    #[arg(long, env = "PC_RENDER_RENDERER", default_value = "mitsuba")]
    pub renderer: PathBuf,
}

/// Validated, immutable rendering configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub path: PathBuf,
    pub separator: String,
    pub num: Option<usize>,
    pub seed: u64,
    pub knn: bool,
    pub center_num: usize,
    pub part: bool,
    pub white: bool,
    /// fixed color override in `[0, 1]`
    pub rgb: Option<Rgb>,
    /// euler angles in degrees
    pub rotation: Option<[f64; 3]>,
    pub resolution: [u32; 2],
    pub radius: f64,
    pub contrast: f64,
    pub mask: bool,
    pub view: [f64; 3],
    pub translate: [f64; 3],
    pub scale: [f64; 3],
    pub spp: u32,
    pub workdir: PathBuf,
    pub output: PathBuf,
    pub renderer: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            path: PathBuf::new(),
            separator: ",".to_string(),
            num: None,
            seed: 0,
            knn: false,
            center_num: 24,
            part: false,
            white: false,
            rgb: None,
            rotation: None,
            resolution: [800, 800],
            radius: 0.025,
            contrast: 0.0004,
            mask: false,
            view: [2.75; 3],
            translate: [0.; 3],
            scale: [1.; 3],
            spp: 256,
            workdir: PathBuf::from("workdir"),
            output: PathBuf::from("result.png"),
            renderer: PathBuf::from("mitsuba"),
        }
    }
}

fn triple(name: &str, values: &[f64], errors: &mut Vec<String>) -> [f64; 3] {
    match values {
        [x, y, z] => {
            if !values.iter().all(|v| v.is_finite()) {
                errors.push(format!("{name} has non finite components {values:?}"));
            }
            [*x, *y, *z]
        }
        _ => {
            errors.push(format!(
                "{name} needs exactly 3 components, got {}",
                values.len()
            ));
            [0.; 3]
        }
    }
}

impl TryFrom<RenderArgs> for RenderConfig {
    type Error = RenderError;

    fn try_from(args: RenderArgs) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let rgb = if args.rgb.is_empty() {
            None
        } else if args.rgb.len() != 3 {
            errors.push(format!(
                "rgb needs exactly 3 components, got {}",
                args.rgb.len()
            ));
            None
        } else if let Some(c) = args.rgb.iter().find(|c| !(0..=255).contains(*c)) {
            errors.push(format!("rgb component {c} is outside 0..=255"));
            None
        } else {
            Some([0, 1, 2].map(|i| args.rgb[i] as f64 / 255.))
        };

        let rotation = if args.rot.is_empty() {
            None
        } else {
            Some(triple("rot", &args.rot, &mut errors))
        };

        let resolution = match args.res.as_slice() {
            [width, height] => {
                if *width == 0 || *height == 0 {
                    errors.push(format!("resolution {width}x{height} is empty"));
                }
                [*width, *height]
            }
            res => {
                errors.push(format!(
                    "res needs exactly 2 components, got {}",
                    res.len()
                ));
                [0; 2]
            }
        };

        if !(args.radius > 0. && args.radius.is_finite()) {
            errors.push(format!("radius {} is not positive", args.radius));
        }
        if !(args.contrast > 0. && args.contrast <= 1.) {
            errors.push(format!("contrast {} is outside (0, 1]", args.contrast));
        }
        if args.center_num == 0 {
            errors.push("center_num is zero".to_string());
        }
        if args.num == Some(0) {
            errors.push("num is zero".to_string());
        }
        if args.spp == 0 {
            errors.push("spp is zero".to_string());
        }

        let view = triple("view", &args.view, &mut errors);
        let translate = triple("translate", &args.translate, &mut errors);
        let scale = triple("scale", &args.scale, &mut errors);

        if !errors.is_empty() {
            return Err(RenderError::InvalidConfig(errors.join("; ")));
        }

        Ok(RenderConfig {
            path: args.path,
            separator: args.separator,
            num: args.num,
            seed: args.seed,
            knn: args.knn,
            center_num: args.center_num,
            part: args.part,
            white: args.white,
            rgb,
            rotation,
            resolution,
            radius: args.radius,
            contrast: args.contrast,
            mask: args.mask,
            view,
            translate,
            scale,
            spp: args.spp,
            workdir: args.workdir,
            output: args.output,
            renderer: args.renderer,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn config(args: &[&str]) -> Result<RenderConfig, RenderError> {
        let cli = Cli::try_parse_from(["pc-render"].iter().chain(args)).unwrap();
        RenderConfig::try_from(cli.args)
    }

    fn violations(args: &[&str]) -> String {
        match config(args) {
            Err(RenderError::InvalidConfig(message)) => message,
            other => panic!("expected invalid configuration, got {other:?}"),
        }
    }

    #[test]
    fn defaults() {
        let config = config(&["cloud.ply"]).unwrap();
        assert_eq!(
            config,
            RenderConfig {
                path: PathBuf::from("cloud.ply"),
                ..Default::default()
            }
        );
    }

    #[test]
    fn vectors() {
        let config = config(&[
            "cloud.ply",
            "--rot",
            "90",
            "0",
            "-45",
            "--rgb",
            "255",
            "0",
            "51",
            "--translate",
            "0",
            "-0.5",
            "0",
            "--res",
            "640",
            "480",
        ])
        .unwrap();

        assert_eq!(config.rotation, Some([90., 0., -45.]));
        assert_eq!(config.rgb, Some([1., 0., 0.2]));
        assert_eq!(config.translate, [0., -0.5, 0.]);
        assert_eq!(config.resolution, [640, 480]);
    }

    #[test]
    fn wrong_component_counts() {
        assert!(violations(&["a.ply", "--rot", "1", "2"]).contains("rot"));
        assert!(violations(&["a.ply", "--view", "1", "2", "3", "4"]).contains("view"));
        assert!(violations(&["a.ply", "--rgb", "1"]).contains("rgb"));
        assert!(violations(&["a.ply", "--res", "800"]).contains("res"));
    }

    #[test]
    fn out_of_range() {
        assert!(violations(&["a.ply", "--rgb", "0", "256", "0"]).contains("256"));
        assert!(violations(&["a.ply", "--rgb", "-1", "0", "0"]).contains("-1"));
        assert!(violations(&["a.ply", "--res", "0", "800"]).contains("resolution"));
        assert!(violations(&["a.ply", "--center-num", "0"]).contains("center_num"));
        assert!(violations(&["a.ply", "--radius", "0"]).contains("radius"));
        assert!(violations(&["a.ply", "--contrast", "-0.1"]).contains("contrast"));
        assert!(violations(&["a.ply", "--num", "0"]).contains("num"));
    }

    #[test]
    fn every_violation_reported() {
        let message = violations(&["a.ply", "--rot", "1", "--center-num", "0", "--spp", "0"]);
        assert_eq!(message.split("; ").count(), 3);
    }
}
