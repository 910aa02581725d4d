/// Base panorama resolution before aspect ratio and upscaling are applied
pub const BASE_RESOLUTION: u32 = 256;

/// Default horizontal:vertical aspect ratio of the panorama
pub const DEFAULT_ASPECT: (u32, u32) = (3, 1);

/// Default upscale factor applied on top of the base resolution
pub const DEFAULT_UPSCALE: u32 = 4;

/// Largest raster accepted, in pixels per image
pub const MAX_PIXELS: u64 = 1 << 28;

/// Background colour for untouched pixels (white, fully transparent)
pub const BACKGROUND_RGBA: [u8; 4] = [255, 255, 255, 0];
