/// RGBA raster assembly with last-write-wins collision handling
use constants::texture::BACKGROUND_RGBA;
use image::{Rgba, RgbaImage};

/// Grid marking pixels that received at least one projected point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl PresenceMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set(&mut self, x: u32, y: u32) {
        let idx = self.index(x, y);
        self.cells[idx] = true;
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    /// Number of populated pixels
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Populated flags of row `y`
    pub fn row(&self, y: u32) -> &[bool] {
        let start = y as usize * self.width as usize;
        &self.cells[start..start + self.width as usize]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Blank raster filled with the transparent white background
pub fn blank_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(BACKGROUND_RGBA))
}

/// Convert a unit-range channel value to a byte
pub fn unit_to_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Scatter per-point colours into an RGBA raster at (u, v).
///
/// `rgb` holds one unit-range triple per point. When several points share a
/// pixel the later one overwrites the earlier one; there is no depth test and
/// no blending. Coordinates outside the raster are ignored.
pub fn assemble_image_rgba(
    u: &[u32],
    v: &[u32],
    rgb: &[[f64; 3]],
    height: u32,
    width: u32,
) -> (RgbaImage, PresenceMask) {
    let mut image = blank_image(width, height);
    let mut mask = PresenceMask::new(width, height);

    for ((&x, &y), colour) in u.iter().zip(v).zip(rgb) {
        if x >= width || y >= height {
            continue;
        }
        image.put_pixel(
            x,
            y,
            Rgba([
                unit_to_byte(colour[0]),
                unit_to_byte(colour[1]),
                unit_to_byte(colour[2]),
                255,
            ]),
        );
        mask.set(x, y);
    }

    (image, mask)
}
