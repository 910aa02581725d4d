/// Spherical (equirectangular) projection for a sensor fixed at the origin
use crate::config::{FovPolicy, RenderConfig};
use crate::error::{RenderError, RenderResult};
use crate::point_cloud::{PointCloud, radius};
use constants::render_settings::{
    DEFAULT_CROP_THRESHOLD, DEFAULT_FOV_DOWN_DEG, DEFAULT_FOV_UP_DEG,
};
use constants::texture::BASE_RESOLUTION;
use log::debug;
use std::f64::consts::PI;

/// Slack for elevations sitting exactly on a field of view limit
const FOV_EPSILON: f64 = 1e-9;

/// Output raster size and sensor model shared by every feature of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub width: u32,
    pub height: u32,
    pub fov_up_deg: f64,
    pub fov_down_deg: f64,
    pub crop: bool,
    pub crop_threshold: f64,
    pub fov_policy: FovPolicy,
}

impl ProjectionParams {
    /// Size is base resolution x aspect component x upscale on each axis
    pub fn new(aspect: (u32, u32), upscale: u32) -> Self {
        Self {
            width: BASE_RESOLUTION * aspect.0 * upscale,
            height: BASE_RESOLUTION * aspect.1 * upscale,
            fov_up_deg: DEFAULT_FOV_UP_DEG,
            fov_down_deg: DEFAULT_FOV_DOWN_DEG,
            crop: true,
            crop_threshold: DEFAULT_CROP_THRESHOLD,
            fov_policy: FovPolicy::default(),
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            fov_up_deg: config.fov_up_deg,
            fov_down_deg: config.fov_down_deg,
            crop: config.crop,
            crop_threshold: config.crop_threshold,
            fov_policy: config.fov_policy,
            ..Self::new(config.aspect, config.upscale)
        }
    }

    pub fn fov_up(&self) -> f64 {
        self.fov_up_deg.to_radians()
    }

    pub fn fov_down(&self) -> f64 {
        self.fov_down_deg.to_radians()
    }
}

/// Why a point produced no pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Zero or non-finite radius, angles are undefined.
    Degenerate,
    /// Elevation outside [-fov_down, fov_up].
    OutsideFov,
}

/// Column for a point. atan2 wraps at +-pi onto the two image edges,
/// so a full sweep is seamless horizontally.
pub fn azimuth_pixel(x: f64, y: f64, width: u32) -> u32 {
    let last = width.saturating_sub(1) as f64;
    let angle = y.atan2(x);
    let u = (0.5 * (1.0 - angle / PI) * last).round();
    u.clamp(0.0, last) as u32
}

/// Row for a point. Larger elevation maps to a smaller row (top of image).
/// `fov_up` and `fov_down` are in radians.
pub fn elevation_pixel(
    z: f64,
    radius: f64,
    fov_up: f64,
    fov_down: f64,
    height: u32,
) -> Result<u32, Rejection> {
    if !(radius > 0.0 && radius.is_finite()) || !z.is_finite() {
        return Err(Rejection::Degenerate);
    }

    let phi = (z / radius).clamp(-1.0, 1.0).asin();
    if phi > fov_up + FOV_EPSILON || phi < -fov_down - FOV_EPSILON {
        return Err(Rejection::OutsideFov);
    }

    let last = height.saturating_sub(1) as f64;
    let v = ((1.0 - (phi + fov_down) / (fov_up + fov_down)) * last).round();
    Ok(v.clamp(0.0, last) as u32)
}

/// Azimuth in radians at the centre of column `u`
pub fn pixel_azimuth(u: u32, width: u32) -> f64 {
    let last = width.saturating_sub(1).max(1) as f64;
    PI * (1.0 - 2.0 * u as f64 / last)
}

/// Elevation in radians at the centre of row `v`
pub fn pixel_elevation(v: u32, fov_up: f64, fov_down: f64, height: u32) -> f64 {
    let last = height.saturating_sub(1).max(1) as f64;
    (1.0 - v as f64 / last) * (fov_up + fov_down) - fov_down
}

/// Pixel coordinates of every accepted point of one scene.
/// Built once per scene and shared by all renderers.
#[derive(Debug, Clone)]
pub struct SphericalProjection {
    params: ProjectionParams,
    u: Vec<u32>,
    v: Vec<u32>,
    /// Index of each accepted point in the source cloud.
    source: Vec<usize>,
    radius: Vec<f64>,
    degenerate: usize,
    outside_fov: usize,
}

impl SphericalProjection {
    /// Project all points, skipping degenerate ones and applying the
    /// field of view policy to points outside the vertical limits.
    pub fn project(cloud: &PointCloud, params: &ProjectionParams) -> RenderResult<Self> {
        let (fov_up, fov_down) = (params.fov_up(), params.fov_down());
        let n = cloud.len();

        let mut projection = Self {
            params: *params,
            u: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
            source: Vec::with_capacity(n),
            radius: Vec::with_capacity(n),
            degenerate: 0,
            outside_fov: 0,
        };

        for (idx, point) in cloud.coords().iter().enumerate() {
            let r = radius(point);
            match elevation_pixel(point[2], r, fov_up, fov_down, params.height) {
                Ok(v) => {
                    projection.u.push(azimuth_pixel(point[0], point[1], params.width));
                    projection.v.push(v);
                    projection.source.push(idx);
                    projection.radius.push(r);
                }
                Err(Rejection::Degenerate) => projection.degenerate += 1,
                Err(Rejection::OutsideFov) => projection.outside_fov += 1,
            }
        }

        if projection.outside_fov > 0 && params.fov_policy == FovPolicy::SkipScene {
            return Err(RenderError::FieldOfView {
                count: projection.outside_fov,
            });
        }

        debug!(
            "Projected {}/{} points ({} degenerate, {} outside field of view)",
            projection.len(),
            n,
            projection.degenerate,
            projection.outside_fov
        );

        Ok(projection)
    }

    pub fn params(&self) -> &ProjectionParams {
        &self.params
    }

    pub fn u(&self) -> &[u32] {
        &self.u
    }

    pub fn v(&self) -> &[u32] {
        &self.v
    }

    /// Radius of each accepted point
    pub fn radius(&self) -> &[f64] {
        &self.radius
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn degenerate(&self) -> usize {
        self.degenerate
    }

    pub fn outside_fov(&self) -> usize {
        self.outside_fov
    }

    /// Select per-point values of the accepted points, in projection order
    pub fn gather<T: Copy>(&self, values: &[T]) -> Vec<T> {
        self.source.iter().map(|&idx| values[idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u32 = 3072;
    const H: u32 = 1024;

    #[test]
    fn params_follow_aspect_and_upscale() {
        let params = ProjectionParams::new((3, 1), 4);
        assert_eq!((params.width, params.height), (3072, 1024));
    }

    #[test]
    fn positive_x_axis_maps_to_centre_column() {
        assert_eq!(azimuth_pixel(1.0, 0.0, W), ((W - 1) as f64 / 2.0).round() as u32);
        assert_eq!(azimuth_pixel(42.0, 0.0, 257), 128);
    }

    #[test]
    fn negative_x_axis_wraps_to_image_edges() {
        assert_eq!(azimuth_pixel(-1.0, 0.0, W), 0);
        assert_eq!(azimuth_pixel(-1.0, -1e-12, W), W - 1);
    }

    #[test]
    fn elevation_row_is_non_increasing_in_angle() {
        let (up, down) = (30f64.to_radians(), 25f64.to_radians());
        let mut previous = u32::MAX;
        for step in 0..=100 {
            let phi = -down + (up + down) * step as f64 / 100.0;
            let v = elevation_pixel(phi.sin(), 1.0, up, down, H).unwrap();
            assert!(v <= previous, "row {} after {} at phi {}", v, previous, phi);
            previous = v;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn degenerate_and_out_of_view_points_are_rejected() {
        let (up, down) = (10f64.to_radians(), 10f64.to_radians());
        assert_eq!(elevation_pixel(0.0, 0.0, up, down, H), Err(Rejection::Degenerate));
        assert_eq!(
            elevation_pixel(f64::NAN, 1.0, up, down, H),
            Err(Rejection::Degenerate)
        );
        assert_eq!(elevation_pixel(1.0, 1.0, up, down, H), Err(Rejection::OutsideFov));
        assert_eq!(elevation_pixel(-1.0, 1.0, up, down, H), Err(Rejection::OutsideFov));
    }

    #[test]
    fn full_sphere_accepts_poles() {
        let (up, down) = (90f64.to_radians(), 90f64.to_radians());
        assert_eq!(elevation_pixel(2.0, 2.0, up, down, H), Ok(0));
        assert_eq!(elevation_pixel(-2.0, 2.0, up, down, H), Ok(H - 1));
    }

    #[test]
    fn inverse_mapping_recovers_angles_within_one_pixel() {
        let params = ProjectionParams::new((3, 1), 4);
        let (up, down) = (params.fov_up(), params.fov_down());
        let az_step = 2.0 * PI / (params.width - 1) as f64;
        let el_step = (up + down) / (params.height - 1) as f64;

        for &(azimuth, elevation) in &[(0.7f64, 0.3f64), (-2.1, -0.9), (3.0, 1.2), (-0.2, 0.0)] {
            let point = [
                5.0 * elevation.cos() * azimuth.cos(),
                5.0 * elevation.cos() * azimuth.sin(),
                5.0 * elevation.sin(),
            ];
            let u = azimuth_pixel(point[0], point[1], params.width);
            let v = elevation_pixel(point[2], radius(&point), up, down, params.height).unwrap();

            assert!((pixel_azimuth(u, params.width) - azimuth).abs() <= az_step);
            assert!((pixel_elevation(v, up, down, params.height) - elevation).abs() <= el_step);
        }
    }

    #[test]
    fn projection_skips_origin_and_applies_drop_policy() {
        let cloud = PointCloud::new(vec![
            [1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 1.0, 0.1],
        ]);
        let mut params = ProjectionParams::new((1, 1), 1);
        params.fov_up_deg = 45.0;
        params.fov_down_deg = 45.0;

        let projection = SphericalProjection::project(&cloud, &params).unwrap();
        assert_eq!(projection.len(), 2);
        assert_eq!(projection.degenerate(), 1);
        assert_eq!(projection.outside_fov(), 1);
        assert_eq!(projection.gather(&[10, 11, 12, 13]), vec![10, 13]);
        assert!(projection.u().iter().all(|&u| u < params.width));
        assert!(projection.v().iter().all(|&v| v < params.height));
    }

    #[test]
    fn skip_scene_policy_rejects_the_scene() {
        let cloud = PointCloud::new(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let mut params = ProjectionParams::new((1, 1), 1);
        params.fov_up_deg = 45.0;
        params.fov_policy = FovPolicy::SkipScene;

        let err = SphericalProjection::project(&cloud, &params).unwrap_err();
        assert!(matches!(err, RenderError::FieldOfView { count: 1 }));
    }
}
