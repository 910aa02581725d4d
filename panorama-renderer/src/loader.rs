/// Loading of per-scene attribute arrays from NumPy files
use crate::error::{RenderError, RenderResult};
use crate::laz;
use crate::point_cloud::PointCloud;
use constants::dataset::{
    COLOR_FILE, COORD_FILE, INSTANCE_FILE, INTENSITY_FILE, NORMAL_FILE, SEGMENT_FILE,
};
use log::{debug, warn};
use npyz::{DType, NpyFile, Order, TypeChar};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Flattened numeric array with its shape
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub shape: Vec<u64>,
    pub values: Vec<f64>,
}

impl NumericArray {
    /// Number of rows, the leading dimension
    pub fn rows(&self) -> u64 {
        self.shape.first().copied().unwrap_or(0)
    }

    fn into_triples(self, attribute: &'static str, rows: u64) -> RenderResult<Vec<[f64; 3]>> {
        if self.shape != [rows, 3] {
            return Err(RenderError::ShapeMismatch {
                attribute,
                expected: vec![rows, 3],
                found: self.shape,
            });
        }
        Ok(self
            .values
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect())
    }

    fn into_column(self, attribute: &'static str, rows: u64) -> RenderResult<Vec<f64>> {
        if self.shape != [rows] && self.shape != [rows, 1] {
            return Err(RenderError::ShapeMismatch {
                attribute,
                expected: vec![rows],
                found: self.shape,
            });
        }
        Ok(self.values)
    }
}

/// Read a `.npy` file of any float or integer dtype into f64 values in
/// row-major order.
pub fn read_npy(path: &Path) -> RenderResult<NumericArray> {
    let file = File::open(path)?;
    let npy_error = |source: io::Error| RenderError::Npy {
        path: path.to_path_buf(),
        source,
    };
    let npy = NpyFile::new(BufReader::new(file)).map_err(npy_error)?;

    let shape = npy.shape().to_vec();
    let order = npy.order();
    let values = decode_values(npy, path)?;

    let values = if matches!(order, Order::Fortran) && shape.len() == 2 {
        transpose_fortran(&values, shape[0] as usize, shape[1] as usize)
    } else {
        values
    };

    Ok(NumericArray { shape, values })
}

fn decode_values<R: Read>(npy: NpyFile<R>, path: &Path) -> RenderResult<Vec<f64>> {
    let npy_error = |source: io::Error| RenderError::Npy {
        path: path.to_path_buf(),
        source,
    };
    let unsupported = |dtype: &DType| RenderError::UnsupportedDtype {
        path: path.to_path_buf(),
        dtype: dtype.descr(),
    };

    let dtype = npy.dtype();
    let type_str = match &dtype {
        DType::Plain(type_str) => type_str.clone(),
        other => return Err(unsupported(other)),
    };

    let values = match (type_str.type_char(), type_str.size_field()) {
        (TypeChar::Float, 4) => widen(npy.into_vec::<f32>(), |x| x as f64),
        (TypeChar::Float, 8) => npy.into_vec::<f64>(),
        (TypeChar::Int, 1) => widen(npy.into_vec::<i8>(), |x| x as f64),
        (TypeChar::Int, 2) => widen(npy.into_vec::<i16>(), |x| x as f64),
        (TypeChar::Int, 4) => widen(npy.into_vec::<i32>(), |x| x as f64),
        (TypeChar::Int, 8) => widen(npy.into_vec::<i64>(), |x| x as f64),
        (TypeChar::Uint, 1) => widen(npy.into_vec::<u8>(), |x| x as f64),
        (TypeChar::Uint, 2) => widen(npy.into_vec::<u16>(), |x| x as f64),
        (TypeChar::Uint, 4) => widen(npy.into_vec::<u32>(), |x| x as f64),
        (TypeChar::Uint, 8) => widen(npy.into_vec::<u64>(), |x| x as f64),
        _ => return Err(unsupported(&dtype)),
    };

    values.map_err(npy_error)
}

fn widen<T>(values: io::Result<Vec<T>>, f: impl Fn(T) -> f64) -> io::Result<Vec<f64>> {
    values.map(|v| v.into_iter().map(f).collect())
}

fn transpose_fortran(values: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    for r in 0..rows {
        for c in 0..cols {
            out.push(values[c * rows + r]);
        }
    }
    out
}

/// Load a scene directory into a point cloud.
///
/// Coordinates are mandatory and any failure to read them fails the scene.
/// Optional attributes are loaded independently; a missing or malformed
/// attribute is left absent. Directories without `coord.npy` fall back to a
/// single `.las`/`.laz` file.
pub fn load_scene(scene_dir: &Path) -> RenderResult<PointCloud> {
    let coord_path = scene_dir.join(COORD_FILE);
    if !coord_path.exists() {
        if let Some(las_path) = find_las_file(scene_dir)? {
            debug!("Loading {} as LAS", las_path.display());
            return laz::load_las_cloud(&las_path);
        }
    }

    let coords = read_npy(&coord_path)?;
    let rows = coords.rows();
    let mut cloud = PointCloud::new(coords.into_triples("coord", rows)?);

    if let Some(color) = load_optional(scene_dir, COLOR_FILE, |a| a.into_triples("color", rows)) {
        cloud = cloud.with_color(color)?;
    }
    if let Some(intensity) = load_optional(scene_dir, INTENSITY_FILE, |a| {
        a.into_column("intensity", rows)
    }) {
        cloud = cloud.with_intensity(intensity)?;
    }
    if let Some(normal) = load_optional(scene_dir, NORMAL_FILE, |a| a.into_triples("normal", rows))
    {
        cloud = cloud.with_normal(normal)?;
    }
    if let Some(segment) = load_optional(scene_dir, SEGMENT_FILE, |a| {
        a.into_column("segment", rows)
    }) {
        cloud = cloud.with_segment(to_ids(segment))?;
    }
    if let Some(instance) = load_optional(scene_dir, INSTANCE_FILE, |a| {
        a.into_column("instance", rows)
    }) {
        cloud = cloud.with_instance(to_ids(instance))?;
    }

    Ok(cloud)
}

fn to_ids(values: Vec<f64>) -> Vec<i64> {
    values.into_iter().map(|v| v as i64).collect()
}

fn load_optional<T>(
    scene_dir: &Path,
    file_name: &str,
    shape: impl FnOnce(NumericArray) -> RenderResult<T>,
) -> Option<T> {
    let path = scene_dir.join(file_name);
    if !path.exists() {
        debug!("{} not present, attribute unavailable", path.display());
        return None;
    }

    match read_npy(&path).and_then(shape) {
        Ok(values) => Some(values),
        Err(e) => {
            warn!("Ignoring {}: {}", path.display(), e);
            None
        }
    }
}

fn find_las_file(scene_dir: &Path) -> RenderResult<Option<PathBuf>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(scene_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            if ext_str == "laz" || ext_str == "las" {
                candidates.push(path);
            }
        }
    }
    candidates.sort();
    Ok(candidates.into_iter().next())
}
