/// Scalar to RGB colour mappings used by the channel renderers
use colorous::VIRIDIS;

fn unit(t: f64) -> f64 {
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

/// Reversed viridis: 0 is yellow, 1 is dark purple
pub fn viridis_r(t: f64) -> [f64; 3] {
    let colour = VIRIDIS.eval_continuous(1.0 - unit(t));
    [
        colour.r as f64 / 255.0,
        colour.g as f64 / 255.0,
        colour.b as f64 / 255.0,
    ]
}

/// Linear grayscale: 0 is black, 1 is white
pub fn gray(t: f64) -> [f64; 3] {
    let t = unit(t);
    [t, t, t]
}

/// Map a unit normal from [-1, 1] per component to [0, 1]
pub fn normal_to_rgb(normal: [f64; 3]) -> [f64; 3] {
    normal.map(|n| unit((n + 1.0) / 2.0))
}

/// Scale 0-255 colour to the unit range
pub fn byte_rgb(color: [f64; 3]) -> [f64; 3] {
    color.map(|c| unit(c / 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance(rgb: [f64; 3]) -> f64 {
        0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]
    }

    #[test]
    fn viridis_reversed_darkens_with_distance() {
        assert!(luminance(viridis_r(0.0)) > luminance(viridis_r(0.5)));
        assert!(luminance(viridis_r(0.5)) > luminance(viridis_r(1.0)));
        assert_eq!(viridis_r(-3.0), viridis_r(0.0));
        assert_eq!(viridis_r(7.0), viridis_r(1.0));
    }

    #[test]
    fn gray_is_linear_and_clamped() {
        assert_eq!(gray(0.25), [0.25; 3]);
        assert_eq!(gray(1.5), [1.0; 3]);
        assert_eq!(gray(f64::NAN), [0.0; 3]);
    }

    #[test]
    fn normals_map_to_unit_cube() {
        assert_eq!(normal_to_rgb([0.0, 0.0, 1.0]), [0.5, 0.5, 1.0]);
        assert_eq!(normal_to_rgb([-1.0, 1.0, 0.0]), [0.0, 1.0, 0.5]);
    }
}
