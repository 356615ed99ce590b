// SPDX-License-Identifier: GPL-3.0-only

//! Key outline geometry.
//!
//! Keys reference an outline by integer id. The keyboard keeps the outline
//! table; a missing id is a lookup failure, never a crash.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Polygon describing the shape of a key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    /// Radius of rounded corners
    #[serde(default)]
    pub corner_radius: f64,

    #[serde(default)]
    pub points: Vec<Point>,
}

impl Outline {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            corner_radius: 0.0,
            points,
        }
    }

    /// Bounding box of the outline, or `None` for an outline with no points.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.points.first()?;
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);

        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        Some(Bounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_bounds() {
        let outline = Outline::new(vec![
            Point::new(2.0, 1.0),
            Point::new(42.0, 1.0),
            Point::new(42.0, 51.0),
            Point::new(2.0, 51.0),
        ]);
        let bounds = outline.bounds().unwrap();
        assert_eq!(bounds.x, 2.0);
        assert_eq!(bounds.y, 1.0);
        assert_eq!(bounds.width, 40.0);
        assert_eq!(bounds.height, 50.0);
    }

    #[test]
    fn test_empty_outline_has_no_bounds() {
        assert!(Outline::default().bounds().is_none());
    }
}
