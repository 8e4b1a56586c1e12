//! The capability interface the resolver needs from a geometry engine, and
//! the auto-anchor contract built on it.
//!
//! Every part gets the same eleven anchors regardless of how its geometry
//! was built: `center`, `origin`, six `face_*` anchors and three `axis_*`
//! anchors. References downstream never need to know whether a part is a
//! primitive or a boolean result.
//!
//! # Face basis convention
//!
//! A face anchor's origin is the face centroid and its `normal` the outward
//! normal. The `tangent` is the part's local X axis projected onto the face
//! plane (local Y for the ±X faces), and `bitangent = normal × tangent`.
//! Engines compute this in the part's local frame and carry it into world
//! space with the placement transform, so the convention survives rotation.

use std::fmt;

use datum_math::{Frame, FrameError, Point3, Vec3};

use crate::error::{AnchorError, GeometryError, Result};
use crate::path::ReferencePath;
use crate::registry::{Anchor, AnchorKind};

/// Name of the bounding-centre anchor.
pub const CENTER: &str = "center";

/// Name of the local-origin anchor.
pub const ORIGIN: &str = "origin";

/// One of the six bounding faces of a part, in the part's local axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceSelector {
    /// +Z
    Top,
    /// −Z
    Bottom,
    /// −X
    Left,
    /// +X
    Right,
    /// −Y
    Front,
    /// +Y
    Back,
}

impl FaceSelector {
    /// All faces, in auto-anchor order.
    pub const ALL: [FaceSelector; 6] = [
        FaceSelector::Top,
        FaceSelector::Bottom,
        FaceSelector::Left,
        FaceSelector::Right,
        FaceSelector::Front,
        FaceSelector::Back,
    ];

    /// Anchor name, e.g. `face_top`.
    pub fn anchor_name(self) -> &'static str {
        match self {
            FaceSelector::Top => "face_top",
            FaceSelector::Bottom => "face_bottom",
            FaceSelector::Left => "face_left",
            FaceSelector::Right => "face_right",
            FaceSelector::Front => "face_front",
            FaceSelector::Back => "face_back",
        }
    }

    /// Outward normal in the part's local axes.
    pub fn local_normal(self) -> Vec3 {
        match self {
            FaceSelector::Top => Vec3::z(),
            FaceSelector::Bottom => -Vec3::z(),
            FaceSelector::Left => -Vec3::x(),
            FaceSelector::Right => Vec3::x(),
            FaceSelector::Front => -Vec3::y(),
            FaceSelector::Back => Vec3::y(),
        }
    }

    /// Face frame in local axes at `centroid`, following the basis convention.
    pub fn local_frame(self, centroid: Point3) -> std::result::Result<Frame, FrameError> {
        Frame::from_normal(centroid, self.local_normal(), Vec3::x())
    }
}

/// One of the three principal axes of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Local X.
    X,
    /// Local Y.
    Y,
    /// Local Z.
    Z,
}

impl Axis {
    /// All axes, in auto-anchor order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Anchor name, e.g. `axis_z`.
    pub fn anchor_name(self) -> &'static str {
        match self {
            Axis::X => "axis_x",
            Axis::Y => "axis_y",
            Axis::Z => "axis_z",
        }
    }

    /// Axis frame in local axes: `normal` along the axis, cyclic in-plane basis.
    pub fn local_frame(self, origin: Point3) -> std::result::Result<Frame, FrameError> {
        let (t, b, n) = match self {
            Axis::X => (Vec3::y(), Vec3::z(), Vec3::x()),
            Axis::Y => (Vec3::z(), Vec3::x(), Vec3::y()),
            Axis::Z => (Vec3::x(), Vec3::y(), Vec3::z()),
        };
        Frame::new(origin, t, b, n)
    }
}

/// A part's bounds in its local frame, as centre and half extents.
///
/// Engines that answer queries from bounds share this: faces sit at the
/// centre plus or minus the half extents, axes pass through the centre,
/// and every frame is carried into world space by the placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalExtents {
    /// Centre of the bounds.
    pub center: Point3,
    /// Half the size along each local axis.
    pub half: Vec3,
}

impl LocalExtents {
    /// Extents centred at `center` reaching `half` along each axis.
    pub fn new(center: Point3, half: Vec3) -> Self {
        Self { center, half }
    }

    /// World-space centre under `placement`.
    pub fn bounding_center(&self, placement: &Frame) -> Point3 {
        placement.apply_offset(&self.center.coords)
    }

    /// World-space frame of a bounding face under `placement`.
    pub fn face_anchor(
        &self,
        placement: &Frame,
        face: FaceSelector,
    ) -> std::result::Result<Frame, GeometryError> {
        let centroid = self.center + face.local_normal().component_mul(&self.half);
        Ok(face
            .local_frame(centroid)?
            .transformed(&placement.to_transform())?)
    }

    /// World-space frame of a principal axis under `placement`.
    pub fn axis_anchor(
        &self,
        placement: &Frame,
        axis: Axis,
    ) -> std::result::Result<Frame, GeometryError> {
        Ok(axis
            .local_frame(self.center)?
            .transformed(&placement.to_transform())?)
    }
}

/// Local anchor names every part receives, in registration order.
pub fn auto_anchor_names() -> impl Iterator<Item = &'static str> {
    [CENTER, ORIGIN]
        .into_iter()
        .chain(FaceSelector::ALL.into_iter().map(FaceSelector::anchor_name))
        .chain(Axis::ALL.into_iter().map(Axis::anchor_name))
}

/// Whether `name` is one of the auto-anchor names.
pub fn is_auto_anchor_name(name: &str) -> bool {
    auto_anchor_names().any(|n| n == name)
}

/// What the resolver asks of a geometry engine.
///
/// Handles are opaque and owned by the engine; the resolver only passes them
/// back. Queries must be answered in world space for the handle's current
/// placement and must not depend on resolver state.
pub trait GeometryQuery {
    /// Geometry construction parameters for one part.
    type Params;
    /// Opaque reference to realized geometry.
    type Handle: Copy + fmt::Debug;

    /// Build geometry in its local frame.
    fn realize(
        &mut self,
        params: &Self::Params,
    ) -> std::result::Result<Self::Handle, GeometryError>;

    /// Move the geometry so its local origin and axes coincide with `placement`.
    fn place(
        &mut self,
        handle: Self::Handle,
        placement: &Frame,
    ) -> std::result::Result<(), GeometryError>;

    /// Centre of the bounding extents.
    fn bounding_center(&self, handle: Self::Handle) -> std::result::Result<Point3, GeometryError>;

    /// The geometry's local origin.
    fn local_origin(&self, handle: Self::Handle) -> std::result::Result<Point3, GeometryError>;

    /// Centroid and outward-normal frame of a bounding face.
    fn face_anchor(
        &self,
        handle: Self::Handle,
        face: FaceSelector,
    ) -> std::result::Result<Frame, GeometryError>;

    /// Frame at the bounding centre whose normal is the given axis.
    fn axis_anchor(
        &self,
        handle: Self::Handle,
        axis: Axis,
    ) -> std::result::Result<Frame, GeometryError>;
}

/// Derive the auto-anchors of a placed part.
///
/// `center` and `origin` take the placement basis; faces and axes come from
/// the engine.
pub(crate) fn derive_auto_anchors<E: GeometryQuery>(
    engine: &E,
    part: &str,
    handle: E::Handle,
    placement: &Frame,
) -> Result<Vec<Anchor>> {
    let geometry = |source| AnchorError::Geometry {
        part: part.to_string(),
        source,
    };
    let invalid = |name: &str, source| AnchorError::InvalidFrame {
        path: format!("{part}.{name}"),
        source,
    };

    let mut frames: Vec<(&'static str, Frame)> = Vec::with_capacity(11);

    let center = engine.bounding_center(handle).map_err(geometry)?;
    frames.push((
        CENTER,
        placement
            .with_origin(center)
            .map_err(|e| invalid(CENTER, e))?,
    ));

    let origin = engine.local_origin(handle).map_err(geometry)?;
    frames.push((
        ORIGIN,
        placement
            .with_origin(origin)
            .map_err(|e| invalid(ORIGIN, e))?,
    ));

    for face in FaceSelector::ALL {
        frames.push((
            face.anchor_name(),
            engine.face_anchor(handle, face).map_err(geometry)?,
        ));
    }
    for axis in Axis::ALL {
        frames.push((
            axis.anchor_name(),
            engine.axis_anchor(handle, axis).map_err(geometry)?,
        ));
    }

    Ok(frames
        .into_iter()
        .map(|(name, frame)| {
            Anchor::new(ReferencePath::scoped(part, name), frame, AnchorKind::Auto)
        })
        .collect())
}
