/// Trimming of near-empty top and bottom rows
use crate::raster::PresenceMask;
use image::RgbaImage;
use image::imageops::crop_imm;

/// Row range `[top, bottom)` to keep.
///
/// A row is kept when its fraction of empty pixels is below `threshold`.
/// When no row qualifies the full height is returned.
pub fn row_bounds(mask: &PresenceMask, threshold: f64) -> (u32, u32) {
    let height = mask.height();
    let width = mask.width().max(1) as f64;

    let keep: Vec<bool> = (0..height)
        .map(|y| {
            let empty = mask.row(y).iter().filter(|&&c| !c).count();
            (empty as f64 / width) < threshold
        })
        .collect();

    let top = keep.iter().position(|&k| k).unwrap_or(0) as u32;
    let bottom = keep
        .iter()
        .rposition(|&k| k)
        .map_or(height, |last| last as u32 + 1);

    (top, bottom)
}

/// Crop `image` to the populated row band of `mask`, keeping the full width.
pub fn crop_empty_borders(image: &RgbaImage, mask: &PresenceMask, threshold: f64) -> RgbaImage {
    let (top, bottom) = row_bounds(mask, threshold);
    crop_imm(image, 0, top, image.width(), bottom - top).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::assemble_image_rgba;

    #[test]
    fn empty_mask_leaves_image_unchanged() {
        let (image, mask) = assemble_image_rgba(&[], &[], &[], 8, 4);
        assert_eq!(row_bounds(&mask, 0.999), (0, 8));

        let cropped = crop_empty_borders(&image, &mask, 0.999);
        assert_eq!(cropped.dimensions(), (4, 8));
        assert_eq!(cropped, image);
    }

    #[test]
    fn trims_empty_rows_on_both_sides() {
        let u = [0, 1, 2, 3, 0];
        let v = [2, 2, 3, 3, 5];
        let rgb = [[0.0, 0.0, 1.0]; 5];
        let (image, mask) = assemble_image_rgba(&u, &v, &rgb, 8, 4);

        assert_eq!(row_bounds(&mask, 0.999), (2, 6));
        let cropped = crop_empty_borders(&image, &mask, 0.999);
        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.get_pixel(0, 0), image.get_pixel(0, 2));
    }

    #[test]
    fn threshold_controls_which_rows_count() {
        // row 1 is half full, row 4 is a quarter full
        let (_, mask) = assemble_image_rgba(
            &[0, 1, 2],
            &[1, 1, 4],
            &[[1.0, 1.0, 1.0]; 3],
            6,
            4,
        );
        assert_eq!(row_bounds(&mask, 0.999), (1, 5));
        assert_eq!(row_bounds(&mask, 0.6), (1, 2));
        assert_eq!(row_bounds(&mask, 0.25), (0, 6));
    }
}
