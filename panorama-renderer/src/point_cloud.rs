/// Per-scene point cloud with optional per-point attributes
use crate::error::{RenderError, RenderResult};

/// Point cloud held for the duration of one scene.
/// Every present attribute has exactly one entry per coordinate.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    coords: Vec<[f64; 3]>,
    color: Option<Vec<[f64; 3]>>,
    intensity: Option<Vec<f64>>,
    normal: Option<Vec<[f64; 3]>>,
    segment: Option<Vec<i64>>,
    instance: Option<Vec<i64>>,
}

impl PointCloud {
    pub fn new(coords: Vec<[f64; 3]>) -> Self {
        Self {
            coords,
            ..Default::default()
        }
    }

    /// Attach RGB colour in the 0-255 range
    pub fn with_color(mut self, color: Vec<[f64; 3]>) -> RenderResult<Self> {
        self.check_len("color", color.len())?;
        self.color = Some(color);
        Ok(self)
    }

    /// Attach scalar intensity in the 0-1 range
    pub fn with_intensity(mut self, intensity: Vec<f64>) -> RenderResult<Self> {
        self.check_len("intensity", intensity.len())?;
        self.intensity = Some(intensity);
        Ok(self)
    }

    /// Attach unit normal vectors
    pub fn with_normal(mut self, normal: Vec<[f64; 3]>) -> RenderResult<Self> {
        self.check_len("normal", normal.len())?;
        self.normal = Some(normal);
        Ok(self)
    }

    pub fn with_segment(mut self, segment: Vec<i64>) -> RenderResult<Self> {
        self.check_len("segment", segment.len())?;
        self.segment = Some(segment);
        Ok(self)
    }

    pub fn with_instance(mut self, instance: Vec<i64>) -> RenderResult<Self> {
        self.check_len("instance", instance.len())?;
        self.instance = Some(instance);
        Ok(self)
    }

    fn check_len(&self, attribute: &'static str, found: usize) -> RenderResult<()> {
        if found != self.coords.len() {
            return Err(RenderError::ShapeMismatch {
                attribute,
                expected: vec![self.coords.len() as u64],
                found: vec![found as u64],
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    pub fn color(&self) -> Option<&[[f64; 3]]> {
        self.color.as_deref()
    }

    pub fn intensity(&self) -> Option<&[f64]> {
        self.intensity.as_deref()
    }

    pub fn normal(&self) -> Option<&[[f64; 3]]> {
        self.normal.as_deref()
    }

    pub fn segment(&self) -> Option<&[i64]> {
        self.segment.as_deref()
    }

    pub fn instance(&self) -> Option<&[i64]> {
        self.instance.as_deref()
    }

    /// Names of the optional attributes present on this cloud
    pub fn attribute_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.color.is_some() {
            names.push("color");
        }
        if self.intensity.is_some() {
            names.push("intensity");
        }
        if self.normal.is_some() {
            names.push("normal");
        }
        if self.segment.is_some() {
            names.push("segment");
        }
        if self.instance.is_some() {
            names.push("instance");
        }
        names
    }
}

/// Euclidean distance of a point from the sensor origin
pub fn radius(point: &[f64; 3]) -> f64 {
    (point[0] * point[0] + point[1] * point[1] + point[2] * point[2]).sqrt()
}
