use serde::Serialize;

/// A point in host canvas coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: Point) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        dx * dx + dy * dy
    }

    /// Point at `radius` from `self` along `angle_deg`, measured counter-clockwise from +x
    /// with y pointing up.
    pub fn polar(&self, radius: f64, angle_deg: f64) -> Point {
        let rad = angle_deg.to_radians();
        Point::new(self.x + radius * rad.cos(), self.y - radius * rad.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Angle of `point` around `center`, in degrees clockwise from 12 o'clock, in `[0, 360)`.
pub fn clockwise_from_top(center: Point, point: Point) -> f64 {
    let (dx, dy) = (point.x - center.x, point.y - center.y);
    // flip y so "up" is 90 degrees
    let angle = (-dy).atan2(dx).to_degrees().rem_euclid(360.0);
    (90.0 - angle).rem_euclid(360.0)
}
