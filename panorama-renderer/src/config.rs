/// Typed batch configuration with defaults, validated once at load time.
use crate::error::{RenderError, RenderResult};
use constants::class::default_class_weights;
use constants::dataset::is_known_site;
use constants::render_settings::{
    DEFAULT_CROP_THRESHOLD, DEFAULT_FOV_DOWN_DEG, DEFAULT_FOV_UP_DEG, DEFAULT_WORKERS,
};
use constants::texture::{BASE_RESOLUTION, DEFAULT_ASPECT, DEFAULT_UPSCALE, MAX_PIXELS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output feature rendered per scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Depth,
    Color,
    Intensity,
    Normal,
    Segment,
}

impl Feature {
    /// Features produced by the literal "all"
    pub const ALL: [Feature; 4] = [
        Feature::Depth,
        Feature::Color,
        Feature::Intensity,
        Feature::Normal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Depth => "depth",
            Feature::Color => "color",
            Feature::Intensity => "intensity",
            Feature::Normal => "normal",
            Feature::Segment => "segment",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "depth" => Ok(Feature::Depth),
            "color" | "colour" => Ok(Feature::Color),
            "intensity" => Ok(Feature::Intensity),
            "normal" => Ok(Feature::Normal),
            "segment" => Ok(Feature::Segment),
            other => Err(RenderError::UnknownFeature(other.to_string())),
        }
    }
}

/// Ordered, duplicate-free subset of features to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FeatureSpec", into = "Vec<Feature>")]
pub struct FeatureSelection(Vec<Feature>);

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureSpec {
    Text(String),
    List(Vec<String>),
}

impl FeatureSelection {
    pub fn all() -> Self {
        Self(Feature::ALL.to_vec())
    }

    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> RenderResult<Self> {
        let mut features = Vec::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case("all") {
                for feature in Feature::ALL {
                    if !features.contains(&feature) {
                        features.push(feature);
                    }
                }
                continue;
            }
            let feature = name.parse::<Feature>()?;
            if !features.contains(&feature) {
                features.push(feature);
            }
        }

        if features.is_empty() {
            return Err(RenderError::InvalidConfig(
                "feature selection is empty".to_string(),
            ));
        }
        Ok(Self(features))
    }
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for FeatureSelection {
    type Err = RenderError;

    /// Parses "all" or a comma-separated list such as "depth,normal".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_names(s.split(','))
    }
}

impl TryFrom<FeatureSpec> for FeatureSelection {
    type Error = RenderError;

    fn try_from(spec: FeatureSpec) -> Result<Self, Self::Error> {
        match spec {
            FeatureSpec::Text(text) => text.parse(),
            FeatureSpec::List(list) => Self::from_names(list.iter().map(String::as_str)),
        }
    }
}

impl From<FeatureSelection> for Vec<Feature> {
    fn from(selection: FeatureSelection) -> Self {
        selection.0
    }
}

/// What to do with points whose elevation lies outside the field of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FovPolicy {
    /// Drop offending points and render the rest of the scene.
    #[default]
    DropPoints,
    /// Reject the whole scene.
    SkipScene,
}

impl FromStr for FovPolicy {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "drop-points" | "drop" => Ok(FovPolicy::DropPoints),
            "skip-scene" | "skip" => Ok(FovPolicy::SkipScene),
            other => Err(RenderError::InvalidConfig(format!(
                "unknown field of view policy '{}'",
                other
            ))),
        }
    }
}

/// Batch rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding site or scene folders.
    pub input_dir: PathBuf,
    /// Root of the `<site>/<scene>/` output tree.
    pub output_dir: PathBuf,
    pub features: FeatureSelection,
    pub upscale: u32,
    pub crop: bool,
    pub workers: usize,
    /// Horizontal and vertical aspect components.
    pub aspect: (u32, u32),
    pub fov_up_deg: f64,
    pub fov_down_deg: f64,
    pub fov_policy: FovPolicy,
    /// Fraction of empty pixels at which a border row is trimmed.
    pub crop_threshold: f64,
    pub normalize_depth: bool,
    /// Voting weight per semantic class id.
    pub class_weights: Vec<f64>,
    /// Restrict the batch to these sites.
    pub sites: Option<Vec<String>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            features: FeatureSelection::all(),
            upscale: DEFAULT_UPSCALE,
            crop: true,
            workers: DEFAULT_WORKERS,
            aspect: DEFAULT_ASPECT,
            fov_up_deg: DEFAULT_FOV_UP_DEG,
            fov_down_deg: DEFAULT_FOV_DOWN_DEG,
            fov_policy: FovPolicy::default(),
            crop_threshold: DEFAULT_CROP_THRESHOLD,
            normalize_depth: true,
            class_weights: default_class_weights(),
            sites: None,
        }
    }
}

impl RenderConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> RenderResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check every field once so that the pipeline can rely on them.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| -> RenderResult<()> { Err(RenderError::InvalidConfig(msg)) };

        if self.input_dir.as_os_str().is_empty() {
            return invalid("input directory is required".to_string());
        }
        if self.output_dir.as_os_str().is_empty() {
            return invalid("output directory is required".to_string());
        }
        if self.upscale == 0 {
            return invalid("upscale must be a positive integer".to_string());
        }
        if self.workers == 0 {
            return invalid("workers must be a positive integer".to_string());
        }
        if self.aspect.0 == 0 || self.aspect.1 == 0 {
            return invalid(format!("aspect {:?} must be positive", self.aspect));
        }
        let side = |component: u32| {
            BASE_RESOLUTION
                .checked_mul(component)
                .and_then(|v| v.checked_mul(self.upscale))
        };
        match (side(self.aspect.0), side(self.aspect.1)) {
            (Some(width), Some(height)) if width as u64 * height as u64 <= MAX_PIXELS => {}
            _ => {
                return invalid(format!(
                    "aspect {:?} with upscale {} exceeds the {} pixel raster limit",
                    self.aspect, self.upscale, MAX_PIXELS
                ));
            }
        }
        for (name, value) in [("fov_up_deg", self.fov_up_deg), ("fov_down_deg", self.fov_down_deg)] {
            if !(value > 0.0 && value <= 180.0) {
                return invalid(format!("{} = {} must lie in (0, 180]", name, value));
            }
        }
        if !(self.crop_threshold > 0.0 && self.crop_threshold <= 1.0) {
            return invalid(format!(
                "crop_threshold = {} must lie in (0, 1]",
                self.crop_threshold
            ));
        }
        if self.class_weights.is_empty() || self.class_weights.len() > u8::MAX as usize + 1 {
            return invalid("class_weights must hold between 1 and 256 entries".to_string());
        }
        if self.class_weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return invalid("class_weights must be finite and non-negative".to_string());
        }
        if let Some(sites) = &self.sites {
            if let Some(unknown) = sites.iter().find(|s| !is_known_site(s)) {
                return Err(RenderError::UnknownSite(unknown.clone()));
            }
        }
        Ok(())
    }
}
