use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use nalgebra::{Rotation3, Vector3};
use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

use pc_format::{
    farthest_point_sampling, partition::partition, Mask, Point, PointCloudTrait, PointTrait, Rgb,
    Standardization,
};
use pc_io::ReadOptions;

use crate::{
    color::Colorizer,
    renderer::{render_document, SceneRenderer},
    scene::{SceneBuilder, SceneDocument},
    Cloud, Point3, RenderConfig, RenderError,
};

/// height of the spheres above the unit cube floor
pub const LIFT: f64 = 0.0125;

/// farthest point samples drawn for the mask
pub const MASK_SAMPLES: usize = 128;
/// leading mask samples that become exclusion zones
pub const MASK_CENTERS: usize = 64;
/// exclusion radius around mask centers
pub const MASK_RADIUS: f64 = 0.05;

/// Decode the input and apply the optional downsampling.
pub fn load(config: &RenderConfig) -> Result<Cloud, RenderError> {
    let options = ReadOptions {
        separator: config.separator.clone(),
    };
    let pc = pc_io::read(&config.path, &options)?;

    Ok(downsample(&pc, config.num, config.seed))
}

/// Seeded random subset of `num` points, input order preserved.
pub fn downsample(pc: &Cloud, num: Option<usize>, seed: u64) -> Cloud {
    match num {
        Some(num) if num < pc.len() => {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut indices = rand::seq::index::sample(&mut rng, pc.len(), num).into_vec();
            indices.sort_unstable();

            tracing::info!("Downsampled {} to {} points", pc.len(), num);
            pc.select(&indices)
        }
        _ => pc.clone(),
    }
}

/// Euler rotation, angles in degrees
pub fn rotate(pc: Cloud, angles: [f64; 3]) -> Cloud {
    let [roll, pitch, yaw] = angles.map(f64::to_radians);
    let rotation = Rotation3::from_euler_angles(roll, pitch, yaw);

    pc.map_points(|p| {
        let v = rotation * Vector3::from(p.into_array());
        Point::new([v.x, v.y, v.z])
    })
}

/// renderer axes are (z, x, y) of the cloud
pub fn to_renderer_frame(p: &Point3) -> Point3 {
    let [x, y, z] = p.into_array();
    Point::new([z, x, y])
}

/// part images look at the cloud from the mirrored side
pub fn to_part_frame(p: &Point3) -> Point3 {
    let [x, y, z] = p.into_array();
    Point::new([-x, y, z])
}

/// Standardize, rotate and move into the renderer frame.
pub fn prepare(pc: &Cloud, config: &RenderConfig) -> Result<Cloud, RenderError> {
    let standardization = Standardization::from_points(pc.as_slice())?;
    tracing::info!(
        "Center: {:?}, Scale: {}",
        standardization.center.coords(),
        standardization.scale
    );

    let pc = standardization.standardize(pc);
    let pc = match config.rotation {
        Some(angles) => rotate(pc, angles),
        None => pc,
    };

    Ok(pc.map_points(|p| to_renderer_frame(&p)))
}

/// Drop points close to the mask samples, if masking is enabled.
pub fn mask(pc: &Cloud, config: &RenderConfig) -> Result<Cloud, RenderError> {
    if !config.mask {
        return Ok(pc.clone());
    }

    let mask = Mask::from_samples(pc.as_slice(), MASK_SAMPLES, MASK_CENTERS, MASK_RADIUS)?;
    let kept = mask.apply(pc);
    tracing::info!("Masked {} of {} points", pc.len() - kept.len(), pc.len());

    Ok(kept)
}

/// Farthest point samples of a prepared cloud shifted into the unit cube,
/// empty unless knn coloring is enabled.
pub fn knn_centers(pc: &Cloud, config: &RenderConfig) -> Result<Vec<Point3>, RenderError> {
    if !config.knn {
        return Ok(Vec::new());
    }

    let centers = farthest_point_sampling(pc, config.center_num)?;
    Ok(centers
        .as_slice()
        .iter()
        .map(|c| c.add(&Point::splat(0.5)))
        .collect())
}

/// Colored sphere positions, lifted onto the floor.
///
/// Colors are computed on the unlifted positions shifted into the unit cube.
pub fn shapes(pc: &Cloud, colorizer: &Colorizer) -> Vec<(Point3, Rgb)> {
    pc.iter()
        .map(|(p, stored)| {
            let rgb = colorizer.color(&p.add(&Point::splat(0.5)), stored);
            (p.add(&Point::new([0., 0., LIFT])), rgb)
        })
        .collect()
}

/// Scene document of a prepared cloud.
pub fn scene(pc: &Cloud, centers: &[Point3], config: &RenderConfig, radius: f64) -> SceneDocument {
    let colorizer = Colorizer::new(config, pc.is_colored(), centers);
    tracing::debug!("Coloring {} points by {:?}", pc.num_points(), colorizer.source());

    SceneBuilder::new(config, radius).build(shapes(pc, &colorizer))
}

/// Non-empty segments around the farthest point samples of `prepared`, keyed
/// by sample index.
pub fn segments(
    prepared: &Cloud,
    visible: &Cloud,
    config: &RenderConfig,
) -> Result<Vec<(usize, Cloud)>, RenderError> {
    let centers = farthest_point_sampling(prepared, config.center_num)?;

    Ok(partition(visible, centers.as_slice())
        .into_iter()
        .enumerate()
        .filter(|(i, segment)| {
            if segment.is_empty() {
                tracing::debug!("Skipping empty segment {i}");
            }
            !segment.is_empty()
        })
        .collect())
}

/// Scene document of one segment, re-standardized on its own.
pub fn segment_scene(segment: &Cloud, config: &RenderConfig) -> Result<SceneDocument, RenderError> {
    let segment = Standardization::from_points(segment.as_slice())?.standardize(segment);
    Ok(scene(&segment, &[], config, config.radius * 2.))
}

/// `<stem>_<index>.<ext>` next to `output`
pub fn part_output(output: &Path, index: usize) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    let name = match output.extension() {
        Some(ext) => format!("{stem}_{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{index}"),
    };
    output.with_file_name(name)
}

fn settle(config: &RenderConfig) -> Duration {
    Duration::from_millis(config.resolution[0] as u64)
}

fn scene_name(config: &RenderConfig) -> String {
    match config.path.file_stem() {
        Some(stem) => stem.to_string_lossy().into_owned(),
        None => "scene".to_string(),
    }
}

/// Render a loaded cloud, returns the written images.
///
/// In part mode every non-empty segment is rendered into its own image. A
/// failing segment does not stop the others, the first failure is returned.
pub fn render(
    pc: &Cloud,
    config: &RenderConfig,
    renderer: &dyn SceneRenderer,
) -> Result<Vec<PathBuf>, RenderError> {
    let prepared = prepare(pc, config)?;
    let visible = mask(&prepared, config)?;

    if !config.part {
        let centers = knn_centers(&prepared, config)?;
        let document = scene(&visible, &centers, config, config.radius);
        render_document(
            renderer,
            &document,
            &config.workdir,
            &scene_name(config),
            &config.output,
            settle(config),
        )?;
        return Ok(vec![config.output.clone()]);
    }

    let prepared = prepared.map_points(|p| to_part_frame(&p));
    let visible = visible.map_points(|p| to_part_frame(&p));

    let segments = segments(&prepared, &visible, config)?;
    tracing::info!("Rendering {} segments", segments.len());

    let documents: Vec<(usize, Result<SceneDocument, RenderError>)> = segments
        .par_iter()
        .map(|(i, segment)| (*i, segment_scene(segment, config)))
        .collect();

    let mut images = Vec::new();
    let mut failure = None;

    for (i, document) in documents {
        let output = part_output(&config.output, i);
        let result = document.and_then(|document| {
            render_document(
                renderer,
                &document,
                &config.workdir,
                &format!("{}_{i}", scene_name(config)),
                &output,
                settle(config),
            )
        });

        match result {
            Ok(()) => images.push(output),
            Err(e) => {
                tracing::error!("Segment {i} failed: {e}");
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(images),
    }
}

/// Final sphere positions and colors, for viewers.
pub fn viewer_cloud(pc: &Cloud, config: &RenderConfig) -> Result<Cloud, RenderError> {
    let prepared = prepare(pc, config)?;
    let visible = mask(&prepared, config)?;
    let centers = knn_centers(&prepared, config)?;

    let colorizer = Colorizer::new(config, visible.is_colored(), &centers);
    let builder = SceneBuilder::new(config, config.radius);

    let (points, colors): (Vec<Point3>, Vec<Rgb>) = shapes(&visible, &colorizer)
        .into_iter()
        .map(|(p, rgb)| (builder.place(&p), rgb))
        .unzip();

    Ok(Cloud::with_colors(points, colors)?)
}

/// Write the viewer cloud as ascii ply.
pub fn export(pc: &Cloud, config: &RenderConfig, target: &Path) -> Result<(), RenderError> {
    let cloud = viewer_cloud(pc, config)?;
    pc_io::ply::write_cloud(target, &cloud)?;
    tracing::info!("Exported {} points to {}", cloud.len(), target.display());
    Ok(())
}
