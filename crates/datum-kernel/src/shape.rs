//! Local bounds of IR shapes.
//!
//! Booleans are bounded conservatively: a union by the hull of both
//! operands, a difference by its left operand, an intersection by the
//! overlap of both.

use datum::GeometryError;
use datum_ir::{Shape, Vec3 as IrVec3};
use datum_math::{Point3, Rotation, Transform, Vec3};

use crate::bbox::Aabb3;

/// Bounding box of `shape` in the part's local frame.
pub fn local_bounds(shape: &Shape) -> Result<Aabb3, GeometryError> {
    match shape {
        Shape::Box { size } => {
            positive("box size", &[size.x, size.y, size.z])?;
            Ok(Aabb3::new(Point3::origin(), Point3::new(size.x, size.y, size.z)))
        }
        Shape::Cylinder { radius, height } => {
            positive("cylinder", &[*radius, *height])?;
            Ok(standing(*radius, *height))
        }
        Shape::Sphere { radius } => {
            positive("sphere radius", &[*radius])?;
            let r = Vec3::repeat(*radius);
            Ok(Aabb3::new(Point3::from(-r), Point3::from(r)))
        }
        Shape::Cone {
            radius_bottom,
            radius_top,
            height,
        } => {
            finite("cone", &[*radius_bottom, *radius_top, *height])?;
            if *radius_bottom < 0.0 || *radius_top < 0.0 {
                return Err(GeometryError::Degenerate(
                    "cone radii must not be negative".into(),
                ));
            }
            let r = radius_bottom.max(*radius_top);
            positive("cone", &[r, *height])?;
            Ok(standing(r, *height))
        }
        Shape::Union { left, right } => Ok(local_bounds(left)?.union(&local_bounds(right)?)),
        Shape::Difference { left, right } => {
            // the subtrahend still has to be valid geometry
            local_bounds(right)?;
            local_bounds(left)
        }
        Shape::Intersection { left, right } => local_bounds(left)?
            .intersection(&local_bounds(right)?)
            .ok_or_else(|| GeometryError::Degenerate("intersection is empty".into())),
        Shape::Translate { child, offset } => {
            let v = vector("translation", offset)?;
            Ok(local_bounds(child)?.translated(&v))
        }
        Shape::Rotate { child, angles } => {
            let a = vector("rotation", angles)?;
            let rotation = Rotation::from_euler_degrees(a.x, a.y, a.z);
            let t = Transform::rotation(&rotation);
            Ok(local_bounds(child)?.transformed(&t))
        }
    }
}

fn standing(radius: f64, height: f64) -> Aabb3 {
    Aabb3::new(
        Point3::new(-radius, -radius, 0.0),
        Point3::new(radius, radius, height),
    )
}

fn finite(what: &str, values: &[f64]) -> Result<(), GeometryError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::Unsupported(format!(
            "{what} has non-finite parameters"
        )))
    }
}

fn positive(what: &str, values: &[f64]) -> Result<(), GeometryError> {
    finite(what, values)?;
    if values.iter().all(|v| *v > 0.0) {
        Ok(())
    } else {
        Err(GeometryError::Degenerate(format!(
            "{what} dimensions must be positive, got {values:?}"
        )))
    }
}

fn vector(what: &str, v: &IrVec3) -> Result<Vec3, GeometryError> {
    finite(what, &[v.x, v.y, v.z])?;
    Ok(Vec3::new(v.x, v.y, v.z))
}
