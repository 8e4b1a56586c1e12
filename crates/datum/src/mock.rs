//! Synthetic geometry engine for tests.
//!
//! Every part is an axis-aligned box spanning `[0, size]` in its local
//! frame. Answers are exact, so resolver tests can compare frames without
//! a real kernel behind them.

use datum_math::{Frame, Point3, Vec3};

use crate::error::GeometryError;
use crate::query::{Axis, FaceSelector, GeometryQuery, LocalExtents};

#[derive(Debug, Clone)]
struct SyntheticBox {
    size: Vec3,
    placement: Frame,
}

/// Deterministic test double; params are box sizes, handles are indices.
#[derive(Debug, Clone, Default)]
pub struct SyntheticEngine {
    boxes: Vec<SyntheticBox>,
}

impl SyntheticEngine {
    /// Empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of realized boxes.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether nothing was realized.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    fn get(&self, handle: usize) -> Result<&SyntheticBox, GeometryError> {
        self.boxes
            .get(handle)
            .ok_or_else(|| GeometryError::UnknownHandle(handle.to_string()))
    }

    fn extents(b: &SyntheticBox) -> LocalExtents {
        let half = b.size * 0.5;
        LocalExtents::new(Point3::from(half), half)
    }
}

impl GeometryQuery for SyntheticEngine {
    type Params = [f64; 3];
    type Handle = usize;

    fn realize(&mut self, params: &[f64; 3]) -> Result<usize, GeometryError> {
        if params.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(GeometryError::Degenerate(format!(
                "box size {params:?} must be positive"
            )));
        }
        self.boxes.push(SyntheticBox {
            size: Vec3::new(params[0], params[1], params[2]),
            placement: Frame::identity(),
        });
        Ok(self.boxes.len() - 1)
    }

    fn place(&mut self, handle: usize, placement: &Frame) -> Result<(), GeometryError> {
        let b = self
            .boxes
            .get_mut(handle)
            .ok_or_else(|| GeometryError::UnknownHandle(handle.to_string()))?;
        b.placement = *placement;
        Ok(())
    }

    fn bounding_center(&self, handle: usize) -> Result<Point3, GeometryError> {
        let b = self.get(handle)?;
        Ok(Self::extents(b).bounding_center(&b.placement))
    }

    fn local_origin(&self, handle: usize) -> Result<Point3, GeometryError> {
        Ok(self.get(handle)?.placement.origin())
    }

    fn face_anchor(&self, handle: usize, face: FaceSelector) -> Result<Frame, GeometryError> {
        let b = self.get(handle)?;
        Self::extents(b).face_anchor(&b.placement, face)
    }

    fn axis_anchor(&self, handle: usize, axis: Axis) -> Result<Frame, GeometryError> {
        let b = self.get(handle)?;
        Self::extents(b).axis_anchor(&b.placement, axis)
    }
}
