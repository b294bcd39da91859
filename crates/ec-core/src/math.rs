use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EcError, EcResult};

/// A three-component vector as written in spawnargs (`"x y z"`).
///
/// Serialised as a plain `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// Construct a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Parse a whitespace-separated triple such as `"-16 -16 0"`.
    ///
    /// Extra trailing components are ignored, missing or non-numeric ones are
    /// an error.
    pub fn parse(value: &str) -> EcResult<Self> {
        let invalid = || EcError::InvalidVector {
            value: value.to_string(),
            expected: 3,
        };
        let mut parts = value.split_whitespace().map(str::parse::<f64>);
        let mut next = || parts.next().and_then(Result::ok).ok_or_else(invalid);
        Ok(Self::new(next()?, next()?, next()?))
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vector3> for [f64; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

/// An RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Vector4 {
    /// Red.
    pub x: f64,
    /// Green.
    pub y: f64,
    /// Blue.
    pub z: f64,
    /// Alpha.
    pub w: f64,
}

impl Vector4 {
    /// Construct a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Extend an RGB triple with an alpha value.
    pub const fn from_rgb(rgb: Vector3, alpha: f64) -> Self {
        Self::new(rgb.x, rgb.y, rgb.z, alpha)
    }
}

impl From<[f64; 4]> for Vector4 {
    fn from([x, y, z, w]: [f64; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl From<Vector4> for [f64; 4] {
    fn from(v: Vector4) -> Self {
        [v.x, v.y, v.z, v.w]
    }
}

impl fmt::Display for Vector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.z, self.w)
    }
}

/// Axis-aligned bounding box declared by `editor_mins` / `editor_maxs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    /// Minimum corner.
    pub mins: Vector3,
    /// Maximum corner.
    pub maxs: Vector3,
}

impl Aabb {
    /// Build a box from two corners.
    pub const fn from_min_max(mins: Vector3, maxs: Vector3) -> Self {
        Self { mins, maxs }
    }

    /// Centre point of the box.
    pub fn origin(&self) -> Vector3 {
        Vector3::new(
            (self.mins.x + self.maxs.x) * 0.5,
            (self.mins.y + self.maxs.y) * 0.5,
            (self.mins.z + self.maxs.z) * 0.5,
        )
    }

    /// Half-size of the box along each axis.
    pub fn extents(&self) -> Vector3 {
        Vector3::new(
            (self.maxs.x - self.mins.x) * 0.5,
            (self.maxs.y - self.mins.y) * 0.5,
            (self.maxs.z - self.mins.z) * 0.5,
        )
    }
}
