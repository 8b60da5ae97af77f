//! Segment type and the two measurements the selection pipeline relies on.

use std::fmt;

/// A straight line candidate between two integer pixel endpoints.
///
/// The endpoints are ordered: `angle` is measured from `(x1, y1)` towards
/// `(x2, y2)`, so a segment and its reverse report angles 180° apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Segment {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Euclidean distance between the endpoints.
    pub fn length(&self) -> f64 {
        segment_length(self)
    }

    /// Orientation in degrees, in `(-180, 180]`.
    pub fn angle(&self) -> f64 {
        segment_angle(self)
    }

    /// Same endpoints, opposite direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.x2, self.y2, self.x1, self.y1)
    }

    pub fn start(&self) -> (i32, i32) {
        (self.x1, self.y1)
    }

    pub fn end(&self) -> (i32, i32) {
        (self.x2, self.y2)
    }
}

impl From<[i32; 4]> for Segment {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<Segment> for [i32; 4] {
    fn from(segment: Segment) -> Self {
        [segment.x1, segment.y1, segment.x2, segment.y2]
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})-({},{})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Euclidean length of a segment.
///
/// ```
/// use runway_lines::{Segment, segment_length};
///
/// assert_eq!(segment_length(&Segment::new(0, 0, 3, 4)), 5.0);
/// ```
pub fn segment_length(segment: &Segment) -> f64 {
    let dx = f64::from(segment.x2 - segment.x1);
    let dy = f64::from(segment.y2 - segment.y1);
    dx.hypot(dy)
}

/// Direction of the vector from the first endpoint to the second, in degrees.
///
/// Image coordinates grow downwards, so a segment pointing "down" the image
/// has a positive angle. Degenerate segments report `0.0`.
pub fn segment_angle(segment: &Segment) -> f64 {
    let dx = f64::from(segment.x2 - segment.x1);
    let dy = f64::from(segment.y2 - segment.y1);
    dy.atan2(dx).to_degrees()
}
