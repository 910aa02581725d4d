/// Semantic class with its voting weight and display colour
pub struct ClassInfo {
    pub id: u8,
    pub weight: f64,
    pub colour: [u8; 3],
}

/// Class table used for per-pixel label voting.
/// Rare structural classes outweigh frequent background classes.
pub const CLASS_MAP: &[ClassInfo] = &[
    ClassInfo {
        id: 0,
        weight: 1.0,
        colour: [174, 199, 232],
    },
    ClassInfo {
        id: 1,
        weight: 1.0,
        colour: [152, 223, 138],
    },
    ClassInfo {
        id: 2,
        weight: 1.0,
        colour: [31, 119, 180],
    },
    ClassInfo {
        id: 3,
        weight: 4.0,
        colour: [255, 187, 120],
    },
    ClassInfo {
        id: 4,
        weight: 16.0,
        colour: [188, 189, 34],
    },
    ClassInfo {
        id: 5,
        weight: 16.0,
        colour: [140, 86, 75],
    },
    ClassInfo {
        id: 6,
        weight: 16.0,
        colour: [255, 152, 150],
    },
    ClassInfo {
        id: 7,
        weight: 16.0,
        colour: [214, 39, 40],
    },
    ClassInfo {
        id: 8,
        weight: 64.0,
        colour: [197, 176, 213],
    },
    ClassInfo {
        id: 9,
        weight: 64.0,
        colour: [148, 103, 189],
    },
    ClassInfo {
        id: 10,
        weight: 64.0,
        colour: [196, 156, 148],
    },
    ClassInfo {
        id: 11,
        weight: 64.0,
        colour: [23, 190, 207],
    },
    ClassInfo {
        id: 12,
        weight: 64.0,
        colour: [247, 182, 210],
    },
];

/// Default voting weights, indexed by class id
pub fn default_class_weights() -> Vec<f64> {
    CLASS_MAP.iter().map(|c| c.weight).collect()
}

/// Display colour for a class id, grey for ids outside the table
pub fn class_colour(id: u8) -> [u8; 3] {
    CLASS_MAP
        .iter()
        .find(|c| c.id == id)
        .map_or([127, 127, 127], |c| c.colour)
}
