//! Orthonormal frames and frame-relative offsets.
//!
//! A [`Frame`] is an origin plus an orthonormal basis `(tangent, bitangent,
//! normal)`. Offsets attached to an anchor are read in that basis, never in
//! world axes: `[0, 0, 5]` relative to a bottom face moves *out* of the face,
//! which is world −Z.

use nalgebra::Matrix3;
use thiserror::Error;

use crate::{Dir3, Point3, Rotation, Tolerance, Transform, Vec3};

/// Lengths below this are treated as zero when building a basis.
const DEGENERATE_LENGTH: f64 = 1e-12;

/// Errors raised when a frame basis fails the orthonormality invariant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    /// A basis vector has (near) zero length.
    #[error("{axis} vector is zero-length")]
    ZeroLength {
        /// Which basis vector.
        axis: &'static str,
    },

    /// A basis vector is not unit length.
    #[error("{axis} vector has length {length}, expected 1")]
    NotUnit {
        /// Which basis vector.
        axis: &'static str,
        /// Its measured length.
        length: f64,
    },

    /// Two basis vectors are not perpendicular.
    #[error("{first} and {second} are not orthogonal (dot = {dot})")]
    NotOrthogonal {
        /// First basis vector.
        first: &'static str,
        /// Second basis vector.
        second: &'static str,
        /// Their dot product.
        dot: f64,
    },

    /// The origin or a basis vector holds NaN or infinity.
    #[error("frame has non-finite components")]
    NonFinite,
}

/// An origin plus an orthonormal basis.
///
/// Immutable once constructed; every constructor checks the invariant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    origin: Point3,
    tangent: Dir3,
    bitangent: Dir3,
    normal: Dir3,
}

impl Frame {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// World frame: origin at zero, basis `(X, Y, Z)`.
    pub fn identity() -> Self {
        Self {
            origin: Point3::origin(),
            tangent: Vec3::x_axis(),
            bitangent: Vec3::y_axis(),
            normal: Vec3::z_axis(),
        }
    }

    /// Build a frame, checking orthonormality with the default tolerance.
    pub fn new(
        origin: Point3,
        tangent: Vec3,
        bitangent: Vec3,
        normal: Vec3,
    ) -> Result<Self, FrameError> {
        Self::with_tolerance(
            origin,
            tangent,
            bitangent,
            normal,
            Tolerance::DEFAULT.orthonormal,
        )
    }

    /// Build a frame, checking orthonormality against `tolerance`.
    pub fn with_tolerance(
        origin: Point3,
        tangent: Vec3,
        bitangent: Vec3,
        normal: Vec3,
        tolerance: f64,
    ) -> Result<Self, FrameError> {
        check_basis(&origin, &tangent, &bitangent, &normal, tolerance)?;
        Ok(Self {
            origin,
            tangent: Dir3::new_unchecked(tangent),
            bitangent: Dir3::new_unchecked(bitangent),
            normal: Dir3::new_unchecked(normal),
        })
    }

    /// Build a frame from a normal and a reference direction for the tangent.
    ///
    /// The tangent is `reference` projected onto the plane perpendicular to
    /// `normal`. When that projection vanishes the world X, Y, Z axes are
    /// tried in order. `bitangent = normal × tangent`.
    pub fn from_normal(origin: Point3, normal: Vec3, reference: Vec3) -> Result<Self, FrameError> {
        if !normal.iter().all(|c| c.is_finite()) || !reference.iter().all(|c| c.is_finite()) {
            return Err(FrameError::NonFinite);
        }
        let n_len = normal.norm();
        if n_len < DEGENERATE_LENGTH {
            return Err(FrameError::ZeroLength { axis: "normal" });
        }
        let n = normal / n_len;

        let tangent = [reference, Vec3::x(), Vec3::y(), Vec3::z()]
            .iter()
            .map(|r| r - n * r.dot(&n))
            .find(|t| t.norm() > 1e-6)
            .map(|t| t.normalize())
            .ok_or(FrameError::ZeroLength { axis: "tangent" })?;
        let bitangent = n.cross(&tangent);
        Self::new(origin, tangent, bitangent, n)
    }

    /// The same basis at a different origin.
    pub fn with_origin(&self, origin: Point3) -> Result<Self, FrameError> {
        if !origin.iter().all(|c| c.is_finite()) {
            return Err(FrameError::NonFinite);
        }
        Ok(Self { origin, ..*self })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Origin point.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// First in-plane direction.
    pub fn tangent(&self) -> Vec3 {
        self.tangent.into_inner()
    }

    /// Second in-plane direction.
    pub fn bitangent(&self) -> Vec3 {
        self.bitangent.into_inner()
    }

    /// Outward / up direction.
    pub fn normal(&self) -> Vec3 {
        self.normal.into_inner()
    }

    /// Basis as matrix columns `[tangent | bitangent | normal]`.
    pub fn basis(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.tangent(), self.bitangent(), self.normal()])
    }

    /// `origin + x·tangent + y·bitangent + z·normal`.
    pub fn apply_offset(&self, offset: &Vec3) -> Point3 {
        self.origin
            + self.tangent.as_ref() * offset.x
            + self.bitangent.as_ref() * offset.y
            + self.normal.as_ref() * offset.z
    }

    /// Express a world point in this frame's coordinates (inverse of [`Frame::apply_offset`]).
    pub fn to_local(&self, point: &Point3) -> Vec3 {
        let d = point - self.origin;
        Vec3::new(
            d.dot(self.tangent.as_ref()),
            d.dot(self.bitangent.as_ref()),
            d.dot(self.normal.as_ref()),
        )
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Move by `offset` in this basis, then turn the basis by `rotation`.
    ///
    /// The rotation is expressed in this frame's local axes, so the new basis
    /// is `basis · R`. The offset uses the basis *before* rotation.
    pub fn compose(&self, offset: &Vec3, rotation: Option<&Rotation>) -> Result<Self, FrameError> {
        let origin = self.apply_offset(offset);
        let basis = match rotation {
            Some(r) => self.basis() * r.matrix(),
            None => self.basis(),
        };
        Self::new(
            origin,
            basis.column(0).into_owned(),
            basis.column(1).into_owned(),
            basis.column(2).into_owned(),
        )
    }

    /// Rigid transform mapping local coordinates of this frame into world space.
    pub fn to_transform(&self) -> Transform {
        Transform::from_parts(&self.basis(), &self.origin.coords)
    }

    /// Carry this frame through a rigid transform.
    pub fn transformed(&self, transform: &Transform) -> Result<Self, FrameError> {
        Self::new(
            transform.apply_point(&self.origin),
            transform.apply_vec(&self.tangent()),
            transform.apply_vec(&self.bitangent()),
            transform.apply_vec(&self.normal()),
        )
    }

    /// Re-check the invariant against a (possibly stricter) tolerance.
    pub fn check(&self, tolerance: f64) -> Result<(), FrameError> {
        check_basis(
            &self.origin,
            self.tangent.as_ref(),
            self.bitangent.as_ref(),
            self.normal.as_ref(),
            tolerance,
        )
    }

    /// Component-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Frame, eps: f64) -> bool {
        (self.origin - other.origin).norm() <= eps
            && (self.tangent() - other.tangent()).norm() <= eps
            && (self.bitangent() - other.bitangent()).norm() <= eps
            && (self.normal() - other.normal()).norm() <= eps
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

/// `frame.origin + offset.x·tangent + offset.y·bitangent + offset.z·normal`.
pub fn apply_offset(frame: &Frame, offset: &Vec3) -> Point3 {
    frame.apply_offset(offset)
}

/// Derive a frame from `base` by a local offset and optional local rotation.
pub fn compose_frame(
    base: &Frame,
    offset: &Vec3,
    rotation: Option<&Rotation>,
) -> Result<Frame, FrameError> {
    base.compose(offset, rotation)
}

fn check_basis(
    origin: &Point3,
    tangent: &Vec3,
    bitangent: &Vec3,
    normal: &Vec3,
    tolerance: f64,
) -> Result<(), FrameError> {
    let finite = origin
        .iter()
        .chain(tangent.iter())
        .chain(bitangent.iter())
        .chain(normal.iter())
        .all(|c| c.is_finite());
    if !finite {
        return Err(FrameError::NonFinite);
    }

    let axes = [
        ("tangent", tangent),
        ("bitangent", bitangent),
        ("normal", normal),
    ];
    for (axis, v) in axes {
        let length = v.norm();
        if length < DEGENERATE_LENGTH {
            return Err(FrameError::ZeroLength { axis });
        }
        if (length - 1.0).abs() > tolerance {
            return Err(FrameError::NotUnit { axis, length });
        }
    }

    for (i, j) in [(0, 1), (0, 2), (1, 2)] {
        let dot = axes[i].1.dot(axes[j].1);
        if dot.abs() > tolerance {
            return Err(FrameError::NotOrthogonal {
                first: axes[i].0,
                second: axes[j].0,
                dot,
            });
        }
    }
    Ok(())
}
