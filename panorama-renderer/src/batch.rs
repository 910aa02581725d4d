/// Batch orchestration: scene discovery and parallel rendering.
use crate::config::{Feature, RenderConfig};
use crate::error::{RenderError, RenderResult};
use crate::loader::load_scene;
use crate::projection::ProjectionParams;
use crate::renderer::PanoramaRenderer;
use crate::summary::{BatchSummary, SceneOutcome, SkippedFeature};
use constants::dataset::SCENE_PREFIX;
use image::{ImageFormat, RgbaImage};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// One scene to render and where its images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneJob {
    pub site: String,
    pub scene: String,
    pub scene_dir: PathBuf,
    /// `<output_root>/<site>/<scene>`
    pub output_dir: PathBuf,
}

impl SceneJob {
    /// Output image path `<scene>_<feature>.png`
    pub fn image_path(&self, feature: Feature) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.png", self.scene, feature.name()))
    }
}

/// Discovers scene directories under `input_dir`.
///
/// Scene folders directly inside `input_dir` belong to the site named after
/// `input_dir`; any other sub-folder is treated as a site and searched for
/// scene folders one level down. Results are sorted by site then scene.
pub fn discover_scenes(
    input_dir: &Path,
    output_dir: &Path,
    sites: Option<&[String]>,
) -> RenderResult<Vec<SceneJob>> {
    if !input_dir.is_dir() {
        return Err(RenderError::InvalidConfig(format!(
            "input directory does not exist: {}",
            input_dir.display()
        )));
    }

    let input_site = input_dir
        .canonicalize()?
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut jobs = Vec::new();
    for (name, path) in sub_directories(input_dir)? {
        if name.starts_with(SCENE_PREFIX) {
            jobs.push(scene_job(&input_site, &name, path, output_dir));
        } else {
            for (scene, scene_path) in sub_directories(&path)? {
                if scene.starts_with(SCENE_PREFIX) {
                    jobs.push(scene_job(&name, &scene, scene_path, output_dir));
                }
            }
        }
    }

    if let Some(sites) = sites {
        jobs.retain(|job| sites.contains(&job.site));
    }

    jobs.sort_by(|a, b| (&a.site, &a.scene).cmp(&(&b.site, &b.scene)));
    Ok(jobs)
}

fn scene_job(site: &str, scene: &str, scene_dir: PathBuf, output_dir: &Path) -> SceneJob {
    SceneJob {
        site: site.to_string(),
        scene: scene.to_string(),
        scene_dir,
        output_dir: output_dir.join(site).join(scene),
    }
}

fn sub_directories(dir: &Path) -> RenderResult<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            dirs.push((name, path));
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Renders every selected feature of one scene.
///
/// Failures to load coordinates or to project the scene are reported in
/// the outcome and leave no output behind. A feature whose attribute is
/// absent, or whose image cannot be written, is skipped individually. The
/// scene output directory is only created for the first image written.
pub fn render_scene(job: &SceneJob, config: &RenderConfig, params: &ProjectionParams) -> SceneOutcome {
    let cloud = match load_scene(&job.scene_dir) {
        Ok(cloud) => cloud,
        Err(e) => {
            warn!("Failed to load {}: {}", job.scene_dir.display(), e);
            return SceneOutcome::failed(&job.site, &job.scene, e.to_string());
        }
    };

    let renderer = match PanoramaRenderer::new(&cloud, params) {
        Ok(renderer) => renderer,
        Err(e) => {
            warn!("Skipping {}/{}: {}", job.site, job.scene, e);
            return SceneOutcome::failed(&job.site, &job.scene, e.to_string());
        }
    };

    debug!(
        "{}/{}: {} points, attributes {:?}",
        job.site,
        job.scene,
        cloud.len(),
        cloud.attribute_names()
    );

    let mut outcome = SceneOutcome::new(&job.site, &job.scene);
    outcome.point_count = cloud.len();
    outcome.dropped_points = cloud.len() - renderer.projection().len();

    for &feature in config.features.features() {
        let result = renderer
            .render(feature, config.normalize_depth, &config.class_weights)
            .and_then(|image| {
                fs::create_dir_all(&job.output_dir)?;
                save_image_atomic(&image, &job.image_path(feature))
            });

        match result {
            Ok(path) => {
                debug!("Saved {}", path.display());
                outcome.written.push(feature);
            }
            Err(e) => {
                debug!("{}/{}: {} not rendered: {}", job.site, job.scene, feature, e);
                outcome.skipped.push(SkippedFeature {
                    feature,
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}

/// Encode to a temporary file and rename, so a failed write leaves no
/// partial image at `path`.
pub fn save_image_atomic(image: &RgbaImage, path: &Path) -> RenderResult<PathBuf> {
    let tmp_path = path.with_extension("png.tmp");
    if let Err(e) = image.save_with_format(&tmp_path, ImageFormat::Png) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(path.to_path_buf())
}

/// Executes the complete batch: discover scenes, render them on a fixed
/// size worker pool and collect per-scene outcomes.
pub fn run_batch(config: &RenderConfig) -> RenderResult<BatchSummary> {
    config.validate()?;

    let jobs = discover_scenes(
        &config.input_dir,
        &config.output_dir,
        config.sites.as_deref(),
    )?;
    info!("Number of scenes found: {}", jobs.len());

    fs::create_dir_all(&config.output_dir)?;
    let params = ProjectionParams::from_config(config);
    info!(
        "Rendering {}x{} panoramas with {} workers",
        params.width, params.height, config.workers
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;

    let pb = ProgressBar::new(jobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/blue}] {pos}/{len} scenes ({percent}%) {msg}")
            .unwrap()
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message("Rendering point clouds to panoramas");

    let outcomes: Vec<SceneOutcome> = pool.install(|| {
        jobs.par_iter()
            .map(|job| {
                let outcome = render_scene(job, config, &params);
                pb.inc(1);
                outcome
            })
            .collect()
    });

    pb.finish_with_message("Scenes processed");

    Ok(BatchSummary::from_outcomes(config, outcomes))
}
