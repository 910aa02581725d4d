/// Vertical field of view above the sensor horizon, in degrees
pub const DEFAULT_FOV_UP_DEG: f64 = 90.0;

/// Vertical field of view below the sensor horizon, in degrees
pub const DEFAULT_FOV_DOWN_DEG: f64 = 90.0;

/// Rows with at least this fraction of empty pixels are trimmed by the cropper
pub const DEFAULT_CROP_THRESHOLD: f64 = 0.999;

/// Default number of scenes rendered concurrently
pub const DEFAULT_WORKERS: usize = 8;
