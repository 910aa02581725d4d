pub mod class;
pub mod dataset;
pub mod render_settings;
pub mod texture;
