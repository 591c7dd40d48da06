//! Vector geometry for route pruning: distances, the cylinder preselection
//! around the origin-destination axis, and the sphere tests used by the
//! neighbour annulus filter.

use serde::{Deserialize, Serialize};

/// Cartesian position in light-years, Sol at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let d = other.sub(self);
        d.norm()
    }

    fn sub(&self, other: &Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

/// Whether `point` lies inside the cylinder of the given radius whose axis
/// runs from `start` to `end` (caps included).
///
/// https://stackoverflow.com/questions/47932955/how-to-check-if-a-3d-point-is-inside-a-cylinder/47933302#47933302
pub fn in_cylinder(start: &Position, end: &Position, radius: f64, point: &Position) -> bool {
    let axis = end.sub(start);
    let comp = radius * axis.norm();
    point.sub(start).dot(&axis) >= 0.0
        && point.sub(end).dot(&axis) <= 0.0
        && point.sub(start).cross(&axis).norm() <= comp
}

/// Whether `point` lies strictly inside the sphere with the given center and
/// radius: (x-cx)^2 + (y-cy)^2 + (z-cz)^2 < r^2.
pub fn in_sphere(point: &Position, center: &Position, radius: f64) -> bool {
    let d = point.sub(center);
    d.dot(&d) < radius * radius
}
