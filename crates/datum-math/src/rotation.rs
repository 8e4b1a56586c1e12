//! Rotations applied to frame bases.

use nalgebra::{Matrix3, Rotation3};

use crate::{Dir3, Vec3};

/// A proper rotation, stored as its 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    matrix: Matrix3<f64>,
}

impl Rotation {
    /// The identity rotation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Rotation from Euler angles in degrees about X, Y and Z.
    ///
    /// The matrix is `Rx * Ry * Rz`, so a vector is turned about Z first,
    /// then Y, then X.
    pub fn from_euler_degrees(x_deg: f64, y_deg: f64, z_deg: f64) -> Self {
        let rx = Self::about_axis(&Vec3::x_axis(), x_deg);
        let ry = Self::about_axis(&Vec3::y_axis(), y_deg);
        let rz = Self::about_axis(&Vec3::z_axis(), z_deg);
        rx.after(&ry).after(&rz)
    }

    /// Rotation about `axis` by `angle_deg` degrees, right-handed.
    pub fn about_axis(axis: &Dir3, angle_deg: f64) -> Self {
        Self {
            matrix: Rotation3::from_axis_angle(axis, angle_deg.to_radians()).into_inner(),
        }
    }

    /// The rotation matrix.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Rotate a vector.
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        self.matrix * v
    }

    /// `self` after `other`: applying the result equals applying `other`, then `self`.
    pub fn after(&self, other: &Rotation) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}
