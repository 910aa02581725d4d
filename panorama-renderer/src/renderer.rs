/// Channel renderers producing one panorama per feature
use crate::colormap::{byte_rgb, gray, normal_to_rgb, viridis_r};
use crate::config::Feature;
use crate::crop::crop_empty_borders;
use crate::error::{RenderError, RenderResult};
use crate::point_cloud::PointCloud;
use crate::projection::{ProjectionParams, SphericalProjection};
use crate::raster::{PresenceMask, assemble_image_rgba};
use crate::voting::class_voting;
use constants::class::class_colour;
use image::RgbaImage;

/// Renders the features of one scene from a shared projection.
/// All outputs have the same raster size, so they are pixel-aligned
/// before cropping.
pub struct PanoramaRenderer<'a> {
    cloud: &'a PointCloud,
    projection: SphericalProjection,
}

impl<'a> PanoramaRenderer<'a> {
    pub fn new(cloud: &'a PointCloud, params: &ProjectionParams) -> RenderResult<Self> {
        let projection = SphericalProjection::project(cloud, params)?;
        Ok(Self { cloud, projection })
    }

    pub fn projection(&self) -> &SphericalProjection {
        &self.projection
    }

    /// Whether the cloud carries the attribute `feature` needs
    pub fn supports(&self, feature: Feature) -> bool {
        match feature {
            Feature::Depth => true,
            Feature::Color => self.cloud.color().is_some(),
            Feature::Intensity => self.cloud.intensity().is_some(),
            Feature::Normal => self.cloud.normal().is_some(),
            Feature::Segment => self.cloud.segment().is_some(),
        }
    }

    /// Render one feature with the given depth normalisation and class weights
    pub fn render(
        &self,
        feature: Feature,
        normalize_depth: bool,
        class_weights: &[f64],
    ) -> RenderResult<RgbaImage> {
        match feature {
            Feature::Depth => self.depth_image(normalize_depth),
            Feature::Color => self.color_image(),
            Feature::Intensity => self.intensity_image(),
            Feature::Normal => self.normal_image(),
            Feature::Segment => self.segment_image(class_weights),
        }
    }

    /// Radius through reversed viridis, near points bright and far points dark
    pub fn depth_image(&self, normalize: bool) -> RenderResult<RgbaImage> {
        let radius = self.projection.radius();
        let max_radius = radius.iter().copied().fold(0.0, f64::max);
        let scale = if normalize && max_radius > 0.0 {
            1.0 / max_radius
        } else {
            1.0
        };

        let rgb: Vec<[f64; 3]> = radius.iter().map(|r| viridis_r(r * scale)).collect();
        Ok(self.assemble(&rgb))
    }

    pub fn intensity_image(&self) -> RenderResult<RgbaImage> {
        let intensity = self
            .cloud
            .intensity()
            .ok_or(RenderError::MissingAttribute {
                attribute: "intensity",
            })?;

        let rgb: Vec<[f64; 3]> = self
            .projection
            .gather(intensity)
            .into_iter()
            .map(gray)
            .collect();
        Ok(self.assemble(&rgb))
    }

    pub fn color_image(&self) -> RenderResult<RgbaImage> {
        let color = self
            .cloud
            .color()
            .ok_or(RenderError::MissingAttribute { attribute: "color" })?;

        let rgb: Vec<[f64; 3]> = self
            .projection
            .gather(color)
            .into_iter()
            .map(byte_rgb)
            .collect();
        Ok(self.assemble(&rgb))
    }

    pub fn normal_image(&self) -> RenderResult<RgbaImage> {
        let normal = self
            .cloud
            .normal()
            .ok_or(RenderError::MissingAttribute { attribute: "normal" })?;

        let rgb: Vec<[f64; 3]> = self
            .projection
            .gather(normal)
            .into_iter()
            .map(normal_to_rgb)
            .collect();
        Ok(self.assemble(&rgb))
    }

    /// Semantic classes resolved by weighted vote and coloured per class
    pub fn segment_image(&self, class_weights: &[f64]) -> RenderResult<RgbaImage> {
        let segment = self
            .cloud
            .segment()
            .ok_or(RenderError::MissingAttribute {
                attribute: "segment",
            })?;

        let params = self.projection.params();
        let labels = class_voting(
            self.projection.u(),
            self.projection.v(),
            &self.projection.gather(segment),
            params.height,
            params.width,
            class_weights,
        );
        let (image, mask) = labels.to_rgba(class_colour);
        Ok(self.finish(image, &mask))
    }

    fn assemble(&self, rgb: &[[f64; 3]]) -> RgbaImage {
        let params = self.projection.params();
        let (image, mask) = assemble_image_rgba(
            self.projection.u(),
            self.projection.v(),
            rgb,
            params.height,
            params.width,
        );
        self.finish(image, &mask)
    }

    fn finish(&self, image: RgbaImage, mask: &PresenceMask) -> RgbaImage {
        let params = self.projection.params();
        if params.crop {
            crop_empty_borders(&image, mask, params.crop_threshold)
        } else {
            image
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn params(crop: bool) -> ProjectionParams {
        let mut params = ProjectionParams::new((1, 1), 1);
        params.crop = crop;
        params
    }

    fn ring() -> PointCloud {
        let coords = (0..64)
            .map(|i| {
                let a = i as f64 / 64.0 * std::f64::consts::TAU;
                [a.cos() * (1.0 + i as f64), a.sin() * (1.0 + i as f64), 0.0]
            })
            .collect();
        PointCloud::new(coords)
    }

    #[test]
    fn missing_attribute_is_reported() {
        let cloud = ring();
        let renderer = PanoramaRenderer::new(&cloud, &params(false)).unwrap();

        for feature in [Feature::Color, Feature::Intensity, Feature::Normal, Feature::Segment] {
            assert!(!renderer.supports(feature));
            let err = renderer.render(feature, true, &[1.0]).unwrap_err();
            assert!(matches!(err, RenderError::MissingAttribute { .. }));
        }
        assert!(renderer.supports(Feature::Depth));
    }

    #[test]
    fn uncropped_outputs_share_raster_size() {
        let n = ring().len();
        let cloud = ring()
            .with_color(vec![[255.0, 0.0, 0.0]; n])
            .unwrap()
            .with_intensity(vec![0.5; n])
            .unwrap()
            .with_normal(vec![[0.0, 0.0, 1.0]; n])
            .unwrap()
            .with_segment(vec![3; n])
            .unwrap();
        let renderer = PanoramaRenderer::new(&cloud, &params(false)).unwrap();

        for feature in [
            Feature::Depth,
            Feature::Color,
            Feature::Intensity,
            Feature::Normal,
            Feature::Segment,
        ] {
            let image = renderer.render(feature, true, &[1.0, 1.0, 1.0, 4.0]).unwrap();
            assert_eq!(image.dimensions(), (256, 256), "{}", feature);
        }
    }

    #[test]
    fn horizon_ring_crops_to_a_single_band() {
        let n = ring().len();
        let cloud = ring().with_color(vec![[0.0, 0.0, 255.0]; n]).unwrap();
        let renderer = PanoramaRenderer::new(&cloud, &params(true)).unwrap();

        let image = renderer.color_image().unwrap();
        assert_eq!(image.width(), 256);
        assert_eq!(image.height(), 1);
        assert!(image.pixels().any(|p| *p == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn nearest_point_is_brightest_in_depth() {
        let cloud = PointCloud::new(vec![[1.0, 0.0, 0.0], [0.0, 10.0, 0.0]]);
        let renderer = PanoramaRenderer::new(&cloud, &params(false)).unwrap();
        let image = renderer.depth_image(true).unwrap();

        let projection = renderer.projection();
        let near = image.get_pixel(projection.u()[0], projection.v()[0]);
        let far = image.get_pixel(projection.u()[1], projection.v()[1]);
        let brightness = |p: &Rgba<u8>| p[0] as u32 + p[1] as u32 + p[2] as u32;
        assert!(brightness(near) > brightness(far));
        assert_eq!(near[3], 255);
    }
}
