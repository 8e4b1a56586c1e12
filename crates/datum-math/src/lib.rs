#![warn(missing_docs)]

//! Math types for datum.
//!
//! Thin wrappers around nalgebra providing the types anchor resolution is
//! written in: points, vectors, directions, rigid transforms, rotations,
//! the basis tolerance, and the orthonormal [`Frame`].

use nalgebra::{Matrix3, Unit, Vector3};

mod frame;
mod rotation;

pub use frame::{apply_offset, compose_frame, Frame, FrameError};
pub use rotation::Rotation;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A rigid transform: a linear block followed by a translation.
///
/// Maps local coordinates of a frame into world space; `Frame::to_transform`
/// is the usual way to get one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    linear: Matrix3<f64>,
    translation: Vec3,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: Vec3::zeros(),
        }
    }

    /// Pure translation.
    pub fn translation(v: Vec3) -> Self {
        Self {
            linear: Matrix3::identity(),
            translation: v,
        }
    }

    /// Pure rotation about the origin.
    pub fn rotation(r: &Rotation) -> Self {
        Self {
            linear: *r.matrix(),
            translation: Vec3::zeros(),
        }
    }

    /// `p ↦ linear · p + translation`.
    pub fn from_parts(linear: &Matrix3<f64>, translation: &Vec3) -> Self {
        Self {
            linear: *linear,
            translation: *translation,
        }
    }

    /// `self` after `inner`: applying the result equals applying `inner`, then `self`.
    pub fn then(&self, inner: &Transform) -> Self {
        Self {
            linear: self.linear * inner.linear,
            translation: self.linear * inner.translation + self.translation,
        }
    }

    /// The 3x3 block.
    pub fn linear_part(&self) -> Matrix3<f64> {
        self.linear
    }

    /// The translation column.
    pub fn translation_part(&self) -> Vec3 {
        self.translation
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.linear * p.coords + self.translation)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        self.linear * v
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Numerical tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Allowed deviation from unit length, and from zero for the pairwise
    /// dot products, of a frame basis.
    pub orthonormal: f64,
}

impl Tolerance {
    /// 1e-9 on basis checks.
    pub const DEFAULT: Self = Self { orthonormal: 1e-9 };
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
