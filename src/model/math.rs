//! Small vector and rotation types for parameter values.
//!
//! Rotations follow the usual game-engine convention: Euler angles in degrees,
//! applied Z first, then X, then Y (`q = qy * qx * qz`). Angles read back from a
//! quaternion are wrapped to `[0, 360)`.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Unit quaternion rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS, JsonSchema)]
#[ts(export)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Build a rotation from Euler angles in degrees.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_euler(angles: Vec3) -> Self {
        let axis = |deg: f32, pick: fn(f64, f64) -> (f64, f64, f64, f64)| {
            let half = f64::from(deg).to_radians() * 0.5;
            pick(half.sin(), half.cos())
        };
        let qx = axis(angles.x, |s, c| (s, 0.0, 0.0, c));
        let qy = axis(angles.y, |s, c| (0.0, s, 0.0, c));
        let qz = axis(angles.z, |s, c| (0.0, 0.0, s, c));
        let (x, y, z, w) = hamilton(hamilton(qy, qx), qz);
        Self {
            x: x as f32,
            y: y as f32,
            z: z as f32,
            w: w as f32,
        }
    }

    /// Euler angles in degrees, each wrapped to `[0, 360)`.
    pub fn to_euler(self) -> Vec3 {
        let (x, y, z, w) = (
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.z),
            f64::from(self.w),
        );
        let norm = (x * x + y * y + z * z + w * w).sqrt();
        if norm == 0.0 {
            return Vec3::ZERO;
        }
        let (x, y, z, w) = (x / norm, y / norm, z / norm, w / norm);

        let m00 = 1.0 - 2.0 * (y * y + z * z);
        let m02 = 2.0 * (x * z + w * y);
        let m10 = 2.0 * (x * y + w * z);
        let m11 = 1.0 - 2.0 * (x * x + z * z);
        let m12 = 2.0 * (y * z - w * x);
        let m20 = 2.0 * (x * z - w * y);
        let m22 = 1.0 - 2.0 * (x * x + y * y);

        let sin_x = (-m12).clamp(-1.0, 1.0);
        let (ax, ay, az) = if sin_x.abs() > 0.999_999 {
            // Gimbal lock: fold the Z rotation into Y.
            (sin_x.asin(), (-m20).atan2(m00), 0.0)
        } else {
            (sin_x.asin(), m02.atan2(m22), m10.atan2(m11))
        };

        Vec3::new(wrap_degrees(ax), wrap_degrees(ay), wrap_degrees(az))
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn hamilton(
    (ax, ay, az, aw): (f64, f64, f64, f64),
    (bx, by, bz, bw): (f64, f64, f64, f64),
) -> (f64, f64, f64, f64) {
    (
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    )
}

#[allow(clippy::cast_possible_truncation)]
fn wrap_degrees(radians: f64) -> f32 {
    let wrapped = radians.to_degrees().rem_euclid(360.0);
    if wrapped >= 360.0 - 1e-6 {
        0.0
    } else {
        wrapped as f32
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Quat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "euler{}", self.to_euler())
    }
}
