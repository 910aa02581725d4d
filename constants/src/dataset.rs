/// Scene directories are recognised by this name prefix
pub const SCENE_PREFIX: &str = "scene";

/// Per-scene attribute array files
pub const COORD_FILE: &str = "coord.npy";
pub const COLOR_FILE: &str = "color.npy";
pub const INTENSITY_FILE: &str = "intensity.npy";
pub const NORMAL_FILE: &str = "normal.npy";
pub const SEGMENT_FILE: &str = "segment.npy";
pub const INSTANCE_FILE: &str = "instance.npy";

/// Batch summary written at the output root
pub const SUMMARY_FILE: &str = "render_summary.json";

/// Known acquisition sites of the dataset
pub const SITE_IDS: &[&str] = &[
    "site_00", "site_01", "site_02", "site_03", "site_04", "site_05", "site_06", "site_07",
    "site_08", "site_09", "site_10", "site_11", "site_12", "site_13",
];

pub fn is_known_site(name: &str) -> bool {
    SITE_IDS.contains(&name)
}
