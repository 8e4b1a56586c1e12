//! Axis-aligned bounds in a part's local frame.

use datum_math::{Point3, Transform, Vec3};

/// Axis-aligned bounding box in 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb3 {
    /// Create an AABB from min and max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Create an empty (inverted) AABB suitable for expansion.
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Expand this AABB to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &Aabb3) -> Aabb3 {
        Aabb3::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Overlap of both, or `None` when they share no volume.
    pub fn intersection(&self, other: &Aabb3) -> Option<Aabb3> {
        let b = Aabb3::new(self.min.sup(&other.min), self.max.inf(&other.max));
        b.has_volume().then_some(b)
    }

    /// Whether every extent is strictly positive and finite.
    pub fn has_volume(&self) -> bool {
        let d = self.max - self.min;
        d.iter().all(|v| v.is_finite() && *v > 0.0)
    }

    /// The eight corners.
    pub fn corners(&self) -> [Point3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, b.y, b.z),
            Point3::new(b.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after a transform, re-fitted to the axes.
    pub fn transformed(&self, t: &Transform) -> Aabb3 {
        let mut out = Aabb3::empty();
        for c in self.corners() {
            out.include_point(&t.apply_point(&c));
        }
        out
    }

    /// Shift by `v`.
    pub fn translated(&self, v: &Vec3) -> Aabb3 {
        Aabb3::new(self.min + v, self.max + v)
    }

    /// Centre point.
    pub fn center(&self) -> Point3 {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Half the size along each axis.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}
