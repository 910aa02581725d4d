/// Batch summary generation for rendered scenes.
use crate::config::{Feature, RenderConfig};
use crate::error::RenderResult;
use constants::dataset::SUMMARY_FILE;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Feature that was selected but not produced for a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFeature {
    pub feature: Feature,
    pub reason: String,
}

/// Result of rendering a single scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneOutcome {
    pub site: String,
    pub scene: String,
    /// Features written to disk, in selection order.
    pub written: Vec<Feature>,
    pub skipped: Vec<SkippedFeature>,
    /// Set when the scene failed as a whole and nothing was written.
    pub error: Option<String>,
    pub point_count: usize,
    /// Points excluded from projection (zero radius or outside the field of view).
    pub dropped_points: usize,
}

impl SceneOutcome {
    pub fn new(site: &str, scene: &str) -> Self {
        Self {
            site: site.to_string(),
            scene: scene.to_string(),
            written: Vec::new(),
            skipped: Vec::new(),
            error: None,
            point_count: 0,
            dropped_points: 0,
        }
    }

    pub fn failed(site: &str, scene: &str, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(site, scene)
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics over a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub config: RenderConfig,
    pub rendered: usize,
    pub failed: usize,
    pub images_written: usize,
    /// Per-scene outcomes sorted by site then scene.
    pub scenes: Vec<SceneOutcome>,
}

impl BatchSummary {
    pub fn from_outcomes(config: &RenderConfig, mut scenes: Vec<SceneOutcome>) -> Self {
        scenes.sort_by(|a, b| (&a.site, &a.scene).cmp(&(&b.site, &b.scene)));
        let rendered = scenes.iter().filter(|s| s.is_rendered()).count();

        Self {
            config: config.clone(),
            rendered,
            failed: scenes.len() - rendered,
            images_written: scenes.iter().map(|s| s.written.len()).sum(),
            scenes,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &SceneOutcome> {
        self.scenes.iter().filter(|s| !s.is_rendered())
    }

    /// Write the summary as pretty JSON at the output root.
    pub fn write(&self, output_dir: &Path) -> RenderResult<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let summary_path = output_dir.join(SUMMARY_FILE);
        fs::write(&summary_path, serde_json::to_string_pretty(self)?)?;
        info!("Generated batch summary: {}", summary_path.display());
        Ok(summary_path)
    }

    /// Prints summary for verification and debugging.
    pub fn print(&self) {
        println!("Batch Summary:");
        println!("  Scenes rendered: {}", self.rendered);
        println!("  Scenes failed:   {}", self.failed);
        println!("  Images written:  {}", self.images_written);

        for scene in self.failures() {
            println!(
                "  FAILED {}/{}: {}",
                scene.site,
                scene.scene,
                scene.error.as_deref().unwrap_or("unknown error")
            );
        }

        let skipped: usize = self.scenes.iter().map(|s| s.skipped.len()).sum();
        if skipped > 0 {
            println!("  Features skipped for missing data: {}", skipped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_orders_outcomes() {
        let mut ok = SceneOutcome::new("site_01", "scene_02");
        ok.written = vec![Feature::Depth, Feature::Color];
        let failed = SceneOutcome::failed("site_01", "scene_01", "bad coords".to_string());
        let config = RenderConfig::new("in", "out");

        let summary = BatchSummary::from_outcomes(&config, vec![ok, failed]);
        assert_eq!(summary.rendered, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.images_written, 2);
        assert_eq!(summary.scenes[0].scene, "scene_01");
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn summary_serialises_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig::new("in", dir.path());
        let summary =
            BatchSummary::from_outcomes(&config, vec![SceneOutcome::new("site_00", "scene_00")]);

        let path = summary.write(dir.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["rendered"], 1);
        assert_eq!(value["config"]["features"][0], "depth");
    }
}
