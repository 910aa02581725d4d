/// Point cloud to panorama renderer main entry point
use clap::Parser;
use panorama_renderer::{FovPolicy, RenderConfig, run_batch};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "panorama-renderer",
    version,
    about = "Render point cloud scenes to spherical panorama images"
)]
struct Args {
    /// Directory which contains the site or scene folders
    #[arg(long, alias = "input")]
    data: Option<PathBuf>,

    /// Output directory
    #[arg(long)]
    output: Option<PathBuf>,

    /// Optional JSON config file, overridden by flags given here
    #[arg(long)]
    config: Option<PathBuf>,

    /// Features to render: all, or a comma list of depth, color, intensity, normal, segment
    #[arg(long)]
    features: Option<String>,

    /// Upscale factor for rendering
    #[arg(long)]
    upscale: Option<u32>,

    /// Whether to crop empty borders of the output images
    #[arg(long, action = clap::ArgAction::Set)]
    crop: Option<bool>,

    /// Number of parallel workers
    #[arg(long)]
    workers: Option<usize>,

    /// Vertical field of view above the horizon in degrees
    #[arg(long)]
    fov_up: Option<f64>,

    /// Vertical field of view below the horizon in degrees
    #[arg(long)]
    fov_down: Option<f64>,

    /// Points outside the field of view: drop-points or skip-scene
    #[arg(long)]
    fov_policy: Option<String>,

    /// Fraction of empty pixels at which a border row is cropped
    #[arg(long)]
    crop_threshold: Option<f64>,

    /// Comma separated list of sites to render
    #[arg(long)]
    sites: Option<String>,
}

impl Args {
    /// Layer flags over the config file (or defaults)
    fn into_config(self) -> Result<RenderConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::from_json_file(path)?,
            None => RenderConfig::default(),
        };

        if let Some(data) = self.data {
            config.input_dir = data;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(features) = self.features {
            config.features = features.parse()?;
        }
        if let Some(upscale) = self.upscale {
            config.upscale = upscale;
        }
        if let Some(crop) = self.crop {
            config.crop = crop;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(fov_up) = self.fov_up {
            config.fov_up_deg = fov_up;
        }
        if let Some(fov_down) = self.fov_down {
            config.fov_down_deg = fov_down;
        }
        if let Some(policy) = self.fov_policy {
            config.fov_policy = policy.parse::<FovPolicy>()?;
        }
        if let Some(threshold) = self.crop_threshold {
            config.crop_threshold = threshold;
        }
        if let Some(sites) = self.sites {
            config.sites = Some(
                sites
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_configuration(config: &RenderConfig) {
    let features: Vec<&str> = config.features.features().iter().map(|f| f.name()).collect();

    println!("--- CONFIGURATION ------------------------------");
    println!("  Input Directory:    {}", config.input_dir.display());
    println!("  Output Directory:   {}", config.output_dir.display());
    println!("  Features to Render: {}", features.join(", "));
    println!("  Upscale Factor:     {}", config.upscale);
    println!("  Crop Images:        {}", config.crop);
    println!("  Number of Workers:  {}", config.workers);
    println!(
        "  Field of View:      +{}° / -{}° ({:?})",
        config.fov_up_deg, config.fov_down_deg, config.fov_policy
    );
    println!("------------------------------------------------");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config()?;
    print_configuration(&config);

    let summary = run_batch(&config)?;
    summary.write(&config.output_dir)?;
    summary.print();

    Ok(())
}
