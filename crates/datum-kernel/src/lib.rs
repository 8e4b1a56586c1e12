#![warn(missing_docs)]

//! Analytic geometry engine for datum.
//!
//! Answers every anchor query from a shape's axis-aligned bounds in its
//! local frame, carried into world space by the part's placement. That is
//! exact for boxes and for the axis-aligned bounds of the other primitives,
//! and conservative for booleans.
//!
//! # Example
//!
//! ```
//! use datum::{Assembly, BuildConfig};
//! use datum_ir::{Design, Positioning, Shape, Vec3};
//! use datum_kernel::AnalyticKernel;
//!
//! let design = Design::new()
//!     .part("base", Shape::Box { size: Vec3::new(10.0, 10.0, 20.0) }, None)
//!     .part(
//!         "lid",
//!         Shape::Box { size: Vec3::new(10.0, 10.0, 2.0) },
//!         Some(Positioning::at("base.face_top", [0.0, 0.0, 5.0])),
//!     );
//! let mut kernel = AnalyticKernel::new();
//! let assembly = Assembly::from_design(&mut kernel, &design, &BuildConfig::default()).unwrap();
//! let lid = assembly.part("lid").unwrap();
//! assert_eq!(lid.placement().origin().z, 25.0);
//! ```

mod bbox;
mod shape;

pub use bbox::Aabb3;
pub use shape::local_bounds;

use datum::{Axis, FaceSelector, GeometryError, GeometryQuery, LocalExtents};
use datum_ir::Shape;
use datum_math::{Frame, Point3};
use slotmap::SlotMap;
use tracing::trace;

slotmap::new_key_type! {
    /// Handle of a realized solid.
    pub struct SolidId;
}

#[derive(Debug, Clone)]
struct Solid {
    bounds: Aabb3,
    placement: Frame,
}

impl Solid {
    fn extents(&self) -> LocalExtents {
        LocalExtents::new(self.bounds.center(), self.bounds.half_extents())
    }
}

/// Bounds-based [`GeometryQuery`] implementation for [`Shape`] trees.
#[derive(Debug, Default)]
pub struct AnalyticKernel {
    solids: SlotMap<SolidId, Solid>,
}

impl AnalyticKernel {
    /// Empty kernel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of realized solids.
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// Whether nothing has been realized.
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Local-frame bounds of a solid.
    pub fn local_bounds(&self, id: SolidId) -> Result<Aabb3, GeometryError> {
        Ok(self.solid(id)?.bounds)
    }

    /// World-space bounds of a solid, re-fitted to the world axes.
    pub fn world_bounds(&self, id: SolidId) -> Result<Aabb3, GeometryError> {
        let solid = self.solid(id)?;
        Ok(solid.bounds.transformed(&solid.placement.to_transform()))
    }

    fn solid(&self, id: SolidId) -> Result<&Solid, GeometryError> {
        self.solids
            .get(id)
            .ok_or_else(|| GeometryError::UnknownHandle(format!("{id:?}")))
    }
}

impl GeometryQuery for AnalyticKernel {
    type Params = Shape;
    type Handle = SolidId;

    fn realize(&mut self, params: &Shape) -> Result<SolidId, GeometryError> {
        let bounds = shape::local_bounds(params)?;
        let id = self.solids.insert(Solid {
            bounds,
            placement: Frame::identity(),
        });
        trace!(?id, min = ?bounds.min, max = ?bounds.max, "realized solid");
        Ok(id)
    }

    fn place(&mut self, handle: SolidId, placement: &Frame) -> Result<(), GeometryError> {
        let solid = self
            .solids
            .get_mut(handle)
            .ok_or_else(|| GeometryError::UnknownHandle(format!("{handle:?}")))?;
        solid.placement = *placement;
        Ok(())
    }

    fn bounding_center(&self, handle: SolidId) -> Result<Point3, GeometryError> {
        let solid = self.solid(handle)?;
        Ok(solid.extents().bounding_center(&solid.placement))
    }

    fn local_origin(&self, handle: SolidId) -> Result<Point3, GeometryError> {
        Ok(self.solid(handle)?.placement.origin())
    }

    fn face_anchor(&self, handle: SolidId, face: FaceSelector) -> Result<Frame, GeometryError> {
        let solid = self.solid(handle)?;
        solid.extents().face_anchor(&solid.placement, face)
    }

    fn axis_anchor(&self, handle: SolidId, axis: Axis) -> Result<Frame, GeometryError> {
        let solid = self.solid(handle)?;
        solid.extents().axis_anchor(&solid.placement, axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datum_ir::Vec3 as IrVec3;
    use datum_math::Vec3;

    #[test]
    fn realize_and_query() {
        let mut kernel = AnalyticKernel::new();
        let id = kernel
            .realize(&Shape::Cylinder {
                radius: 1.0,
                height: 4.0,
            })
            .unwrap();
        assert_eq!(kernel.len(), 1);
        assert_eq!(kernel.bounding_center(id).unwrap(), Point3::new(0.0, 0.0, 2.0));
        let top = kernel.face_anchor(id, FaceSelector::Top).unwrap();
        assert_eq!(top.origin(), Point3::new(0.0, 0.0, 4.0));
        let side = kernel.face_anchor(id, FaceSelector::Left).unwrap();
        assert_eq!(side.origin(), Point3::new(-1.0, 0.0, 2.0));
        assert_eq!(side.normal(), -Vec3::x());
    }

    #[test]
    fn placement_carries_bounds() {
        let mut kernel = AnalyticKernel::new();
        let id = kernel
            .realize(&Shape::Box {
                size: IrVec3::new(1.0, 2.0, 3.0),
            })
            .unwrap();
        let at = Frame::identity()
            .with_origin(Point3::new(0.0, 0.0, 10.0))
            .unwrap();
        kernel.place(id, &at).unwrap();
        assert_eq!(kernel.local_origin(id).unwrap(), Point3::new(0.0, 0.0, 10.0));
        let world = kernel.world_bounds(id).unwrap();
        assert_eq!(world.max, Point3::new(1.0, 2.0, 13.0));
        assert_eq!(kernel.local_bounds(id).unwrap().max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut other = AnalyticKernel::new();
        let foreign = other.realize(&Shape::Sphere { radius: 1.0 }).unwrap();
        let kernel = AnalyticKernel::new();
        assert!(matches!(
            kernel.axis_anchor(foreign, Axis::Z),
            Err(GeometryError::UnknownHandle(_))
        ));
    }

    #[test]
    fn degenerate_shape_is_not_stored() {
        let mut kernel = AnalyticKernel::new();
        assert!(kernel.realize(&Shape::Sphere { radius: -1.0 }).is_err());
        assert!(kernel.is_empty());
    }
}
