use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D vector in arena coordinates (pixels, y pointing down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `degrees` (0° is +x, 90° is +y).
    #[must_use]
    pub fn from_heading(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Heading of this vector in degrees, within `(-180, 180]`.
    #[must_use]
    pub fn heading(self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Scales the vector down to `max` if it is longer.
    #[must_use]
    pub fn clamp_length(self, max: f64) -> Self {
        let length = self.length();
        if length > max && length > 0.0 {
            self * (max / length)
        } else {
            self
        }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Normalizes an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// Signed difference `target - current` in degrees, within `(-180, 180]`.
///
/// Positive values mean `target` is reached by turning right (clockwise on screen).
#[must_use]
pub fn angle_diff(target: f64, current: f64) -> f64 {
    let diff = normalize_degrees(target - current);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_heading_round_trip() {
        for degrees in [0.0, 45.0, 90.0, 135.0, -90.0, -135.0] {
            assert!(approx(Vec2::from_heading(degrees).heading(), degrees), "{degrees}");
        }
        assert!(approx(Vec2::from_heading(90.0).y, 1.0));
    }

    #[test]
    fn test_angle_diff_takes_shortest_turn() {
        assert!(approx(angle_diff(10.0, 350.0), 20.0));
        assert!(approx(angle_diff(350.0, 10.0), -20.0));
        assert!(approx(angle_diff(180.0, 0.0), 180.0));
        assert!(approx(angle_diff(-90.0, 90.0), 180.0));
        assert!(approx(angle_diff(45.0, 45.0), 0.0));
    }

    #[test]
    fn test_clamp_length() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.clamp_length(10.0), v);
        assert!(approx(v.clamp_length(2.5).length(), 2.5));
        assert_eq!(Vec2::ZERO.clamp_length(1.0), Vec2::ZERO);
    }
}
