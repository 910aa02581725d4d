//! Spherical panorama rendering of point cloud scenes.
pub mod batch;
pub mod colormap;
pub mod config;
pub mod crop;
pub mod error;
pub mod laz;
pub mod loader;
pub mod point_cloud;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod summary;
pub mod voting;

pub use batch::{SceneJob, discover_scenes, render_scene, run_batch};
pub use config::{Feature, FeatureSelection, FovPolicy, RenderConfig};
pub use error::{RenderError, RenderResult};
pub use point_cloud::PointCloud;
pub use projection::{ProjectionParams, SphericalProjection};
pub use renderer::PanoramaRenderer;
pub use summary::{BatchSummary, SceneOutcome};
