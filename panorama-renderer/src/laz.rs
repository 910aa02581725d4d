use crate::error::RenderResult;
use crate::point_cloud::PointCloud;
use las::Reader;
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
pub fn create_reader(file_path: &Path) -> RenderResult<Reader> {
    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

/// Load a LAS/LAZ scan as a point cloud.
/// Colour is rescaled from 16 bit to 0-255, intensity to 0-1 and the
/// classification becomes the segment attribute.
pub fn load_las_cloud(file_path: &Path) -> RenderResult<PointCloud> {
    let mut reader = create_reader(file_path)?;
    let total_points = reader.header().number_of_points() as usize;

    let mut coords = Vec::with_capacity(total_points);
    let mut colors = Vec::with_capacity(total_points);
    let mut intensity = Vec::with_capacity(total_points);
    let mut segment = Vec::with_capacity(total_points);
    let mut has_colour = true;

    for point_result in reader.points() {
        let point = point_result?;
        coords.push([point.x, point.y, point.z]);
        intensity.push(point.intensity as f64 / u16::MAX as f64);
        segment.push(u8::from(point.classification) as i64);

        match point.color {
            Some(c) => colors.push([
                c.red as f64 / 257.0,
                c.green as f64 / 257.0,
                c.blue as f64 / 257.0,
            ]),
            None => has_colour = false,
        }
    }

    debug!(
        "Read {} points from {} (colour: {})",
        coords.len(),
        file_path.display(),
        has_colour
    );

    let mut cloud = PointCloud::new(coords)
        .with_intensity(intensity)?
        .with_segment(segment)?;
    if has_colour {
        cloud = cloud.with_color(colors)?;
    }
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_scene;
    use las::point::{Classification, Format};
    use las::{Builder, Color, Point, Writer};

    fn write_las(path: &Path, points: &[([f64; 3], Option<Color>, u16, u8)]) {
        let mut builder = Builder::from((1, 2));
        builder.point_format = Format::new(2).unwrap();
        let header = builder.into_header().unwrap();
        let mut writer = Writer::from_path(path, header).unwrap();
        for &([x, y, z], color, intensity, class) in points {
            writer
                .write_point(Point {
                    x,
                    y,
                    z,
                    intensity,
                    color,
                    classification: Classification::new(class).unwrap(),
                    ..Default::default()
                })
                .unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn las_attributes_are_rescaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.las");
        let colour = Color {
            red: 65535,
            green: 0,
            blue: 257 * 128,
        };
        write_las(
            &path,
            &[
                ([1.5, -2.0, 0.25], Some(colour), u16::MAX, 5),
                ([0.0, 3.0, -1.0], Some(colour), 0, 2),
            ],
        );

        let cloud = load_las_cloud(&path).unwrap();
        assert_eq!(cloud.len(), 2);
        let first = cloud.coords()[0];
        assert!((first[0] - 1.5).abs() < 1e-3);
        assert!((first[1] + 2.0).abs() < 1e-3);
        assert!((first[2] - 0.25).abs() < 1e-3);
        assert_eq!(cloud.color().unwrap()[0], [255.0, 0.0, 128.0]);
        assert_eq!(cloud.intensity().unwrap(), &[1.0, 0.0]);
        assert_eq!(cloud.segment().unwrap(), &[5, 2]);
    }

    #[test]
    fn scene_without_coordinates_falls_back_to_las() {
        let dir = tempfile::tempdir().unwrap();
        write_las(&dir.path().join("b.las"), &[([2.0, 0.0, 0.0], None, 100, 1)]);

        let cloud = load_scene(dir.path()).unwrap();
        assert_eq!(cloud.len(), 1);
        assert!(cloud.color().is_none());
        assert_eq!(cloud.segment().unwrap(), &[1]);
    }
}
