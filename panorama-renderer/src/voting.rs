/// Weighted majority voting of discrete class labels per pixel
use crate::raster::{PresenceMask, blank_image};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

/// Per-pixel class labels; `None` marks pixels that received no vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelImage {
    width: u32,
    height: u32,
    labels: Vec<Option<u8>>,
}

impl LabelImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        self.labels[y as usize * self.width as usize + x as usize]
    }

    /// Number of pixels holding a label
    pub fn assigned(&self) -> usize {
        self.labels.iter().filter(|l| l.is_some()).count()
    }

    /// Colour assigned pixels with `palette`, leaving the rest as background
    pub fn to_rgba(&self, palette: impl Fn(u8) -> [u8; 3]) -> (RgbaImage, PresenceMask) {
        let mut image = blank_image(self.width, self.height);
        let mut mask = PresenceMask::new(self.width, self.height);

        for (idx, label) in self.labels.iter().enumerate() {
            if let Some(class) = label {
                let x = (idx % self.width as usize) as u32;
                let y = (idx / self.width as usize) as u32;
                let [r, g, b] = palette(*class);
                image.put_pixel(x, y, Rgba([r, g, b, 255]));
                mask.set(x, y);
            }
        }

        (image, mask)
    }
}

/// Resolve competing class ids per pixel by weighted vote.
///
/// Raw vote counts are multiplied by `weights[class]` and the highest
/// weighted score wins, ties going to the lowest class index. The result
/// does not depend on input order. Class ids outside `0..weights.len()`
/// and coordinates outside the raster are ignored.
pub fn class_voting(
    u: &[u32],
    v: &[u32],
    classes: &[i64],
    height: u32,
    width: u32,
    weights: &[f64],
) -> LabelImage {
    let num_classes = weights.len();
    let mut votes: HashMap<usize, Vec<u32>> = HashMap::new();

    for ((&x, &y), &class) in u.iter().zip(v).zip(classes) {
        if x >= width || y >= height || class < 0 || class as usize >= num_classes {
            continue;
        }
        let pixel = y as usize * width as usize + x as usize;
        votes.entry(pixel).or_insert_with(|| vec![0; num_classes])[class as usize] += 1;
    }

    let mut labels = vec![None; width as usize * height as usize];
    for (pixel, counts) in votes {
        labels[pixel] = Some(weighted_argmax(&counts, weights) as u8);
    }

    LabelImage {
        width,
        height,
        labels,
    }
}

fn weighted_argmax(counts: &[u32], weights: &[f64]) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (class, (&count, &weight)) in counts.iter().zip(weights).enumerate() {
        let score = count as f64 * weight;
        if score > best_score {
            best = class;
            best_score = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use constants::class::default_class_weights;

    #[test]
    fn heavier_class_wins_equal_raw_votes() {
        let weights = [1.0, 1.0, 1.0, 4.0];
        let labels = class_voting(&[1, 1], &[0, 0], &[0, 3], 2, 2, &weights);
        assert_eq!(labels.get(1, 0), Some(3));
        assert_eq!(labels.get(0, 0), None);
        assert_eq!(labels.assigned(), 1);
    }

    #[test]
    fn raw_majority_beats_smaller_weight_gap() {
        let weights = default_class_weights();
        // 5 votes for class 2 (weight 1) against 1 vote for class 3 (weight 4)
        let labels = class_voting(
            &[0; 6],
            &[0; 6],
            &[2, 2, 3, 2, 2, 2],
            1,
            1,
            &weights,
        );
        assert_eq!(labels.get(0, 0), Some(2));
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let weights = [1.0, 2.0, 2.0];
        let forward = class_voting(&[0, 0, 0], &[0, 0, 0], &[1, 2, 0], 1, 1, &weights);
        let backward = class_voting(&[0, 0, 0], &[0, 0, 0], &[0, 2, 1], 1, 1, &weights);
        // classes 1 and 2 tie on weighted score, lowest index wins
        assert_eq!(forward.get(0, 0), Some(1));
        assert_eq!(forward, backward);
    }

    #[test]
    fn unknown_class_ids_are_ignored() {
        let weights = [1.0, 1.0];
        let labels = class_voting(&[0, 1], &[0, 0], &[-1, 9], 1, 2, &weights);
        assert_eq!(labels.assigned(), 0);
    }

    #[test]
    fn label_palette_marks_presence() {
        let labels = class_voting(&[1], &[1], &[0], 2, 2, &[1.0]);
        let (image, mask) = labels.to_rgba(|_| [9, 8, 7]);
        assert_eq!(*image.get_pixel(1, 1), Rgba([9, 8, 7, 255]));
        assert_eq!(mask.count(), 1);
    }
}
