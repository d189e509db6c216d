use serde::{Deserialize, Serialize};
use std::fmt;

/// Точка на карте в тайлах
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Квадрат евклидова расстояния (без корня, для сравнения с порогами)
    #[must_use]
    pub fn dist_sq(self, other: Point2D) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Прямоугольник `[x, x + width) × [y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect2D {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect2D::new(10, 10, 5, 5);
        assert!(r.contains(Point2D::new(10, 10)));
        assert!(r.contains(Point2D::new(14, 14)));
        assert!(!r.contains(Point2D::new(15, 14)));
        assert!(!r.contains(Point2D::new(9, 12)));
    }

    #[test]
    fn point_display_matches_text_dump() {
        assert_eq!(Point2D::new(1234, -5).to_string(), "(1234, -5)");
        assert_eq!(Point2D::new(0, 0).dist_sq(Point2D::new(3, 4)), 25);
    }
}
