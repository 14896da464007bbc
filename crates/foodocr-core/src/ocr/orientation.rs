//! Bounding-box based text orientation detection.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::annotations::BoundingPoly;

/// Orientation of a piece of detected text relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrientation {
    Up,
    Down,
    Left,
    Right,
    Unknown,
}

impl ImageOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Unknown => "unknown",
        }
    }
}

impl BoundingPoly {
    /// Classify the polygon's orientation from its vertex order.
    ///
    /// The vision API emits vertices clockwise starting at the top-left of
    /// the *text*, so for a rotated word the two topmost vertices in image
    /// coordinates land on a rotation-specific index pair:
    /// (0,1) up, (1,2) left, (2,3) down, (0,3) right.
    pub fn detect_orientation(&self) -> ImageOrientation {
        if self.vertices.len() != 4 {
            return ImageOrientation::Unknown;
        }

        let mut indices: Vec<usize> = (0..4).collect();
        indices.sort_by_key(|&i| (self.vertices[i].y, i));

        let mut topmost = [indices[0], indices[1]];
        topmost.sort_unstable();

        match (topmost[0], topmost[1]) {
            (0, 1) => ImageOrientation::Up,
            (1, 2) => ImageOrientation::Left,
            (2, 3) => ImageOrientation::Down,
            (0, 3) => ImageOrientation::Right,
            _ => ImageOrientation::Unknown,
        }
    }
}

/// Aggregated word-level orientation votes for a document.
#[derive(Debug, Clone, Serialize)]
pub struct OrientationResult {
    /// Majority orientation (`Unknown` when no word was classified).
    pub orientation: ImageOrientation,
    /// Per-orientation word counts, kept for debugging.
    pub count: HashMap<ImageOrientation, usize>,
}

impl OrientationResult {
    const VOTE_ORDER: [ImageOrientation; 5] = [
        ImageOrientation::Up,
        ImageOrientation::Down,
        ImageOrientation::Left,
        ImageOrientation::Right,
        ImageOrientation::Unknown,
    ];

    /// Majority vote over word-level classifications.
    pub fn from_counts(count: HashMap<ImageOrientation, usize>) -> Self {
        let mut orientation = ImageOrientation::Unknown;
        let mut best = 0usize;

        for candidate in Self::VOTE_ORDER {
            let votes = count.get(&candidate).copied().unwrap_or(0);
            if votes > best {
                best = votes;
                orientation = candidate;
            }
        }

        Self { orientation, count }
    }

    /// Total number of classified words.
    pub fn total(&self) -> usize {
        self.count.values().sum()
    }

    /// Clockwise rotation (degrees) needed to bring the text upright.
    pub fn rotation(&self) -> u16 {
        match self.orientation {
            ImageOrientation::Up | ImageOrientation::Unknown => 0,
            ImageOrientation::Right => 90,
            ImageOrientation::Down => 180,
            ImageOrientation::Left => 270,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::annotations::Vertex;
    use pretty_assertions::assert_eq;

    fn poly(vertices: [(i32, i32); 4]) -> BoundingPoly {
        BoundingPoly {
            vertices: vertices
                .iter()
                .map(|&(x, y)| Vertex { x, y })
                .collect(),
        }
    }

    #[test]
    fn test_detect_orientation_upright() {
        // Clockwise from top-left, text reading left to right.
        let upright = poly([(0, 0), (100, 0), (100, 20), (0, 20)]);
        assert_eq!(upright.detect_orientation(), ImageOrientation::Up);
    }

    #[test]
    fn test_detect_orientation_rotation_consistency() {
        // Rotating the vertex order by one position walks the lookup table.
        let vertices = [(0, 0), (100, 0), (100, 20), (0, 20)];
        let expected = [
            ImageOrientation::Up,
            ImageOrientation::Left,
            ImageOrientation::Down,
            ImageOrientation::Right,
        ];

        for (shift, want) in expected.iter().enumerate() {
            let mut rotated = vertices;
            rotated.rotate_right(shift);
            assert_eq!(poly(rotated).detect_orientation(), *want, "shift {shift}");
        }
    }

    #[test]
    fn test_detect_orientation_degenerate() {
        let triangle = BoundingPoly {
            vertices: vec![Vertex { x: 0, y: 0 }, Vertex { x: 1, y: 0 }, Vertex { x: 1, y: 1 }],
        };
        assert_eq!(triangle.detect_orientation(), ImageOrientation::Unknown);
    }

    #[test]
    fn test_orientation_result_majority() {
        let mut count = HashMap::new();
        count.insert(ImageOrientation::Left, 8);
        count.insert(ImageOrientation::Up, 2);

        let result = OrientationResult::from_counts(count);
        assert_eq!(result.orientation, ImageOrientation::Left);
        assert_eq!(result.rotation(), 270);
        assert_eq!(result.total(), 10);
    }

    #[test]
    fn test_orientation_result_empty() {
        let result = OrientationResult::from_counts(HashMap::new());
        assert_eq!(result.orientation, ImageOrientation::Unknown);
        assert_eq!(result.rotation(), 0);
    }
}
