#![warn(missing_docs)]

//! Anchor and frame resolution for declarative 3D assemblies.
//!
//! Parts and custom anchors are declared in order, each optionally
//! positioned relative to an earlier anchor. Building an assembly realizes
//! every part through a [`GeometryQuery`] engine, derives its auto-anchors
//! (`center`, `origin`, `face_*`, `axis_*`), and registers every frame
//! under a reference path such as `base.face_top`.
//!
//! ```ignore
//! use datum::{Assembly, BuildConfig, Declaration, PositioningSpec};
//!
//! let decls = vec![
//!     Declaration::part("base", base_params, None),
//!     Declaration::part(
//!         "lid",
//!         lid_params,
//!         Some(PositioningSpec::new("base.face_top", [0.0, 0.0, 5.0])),
//!     ),
//! ];
//! let assembly = Assembly::build(&mut engine, decls, &BuildConfig::default())?;
//! let top = assembly.resolve("lid.face_top")?;
//! ```

mod config;
mod declaration;
mod driver;
mod error;
mod graph;
mod path;
mod query;
mod registry;
mod resolver;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{BuildConfig, ConfigError};
pub use declaration::{
    from_design, AnchorDeclaration, Declaration, PartDeclaration, PositioningSpec,
};
pub use driver::{Assembly, PlacedPart};
pub use error::{AnchorError, GeometryError, Result};
pub use graph::{NodeId, ReferenceGraph, ResolutionState};
pub use path::ReferencePath;
pub use query::{
    auto_anchor_names, is_auto_anchor_name, Axis, FaceSelector, GeometryQuery, LocalExtents,
    CENTER, ORIGIN,
};
pub use registry::{Anchor, AnchorKind, AnchorRegistry};
pub use resolver::Resolver;

pub use datum_math::{Frame, FrameError, Point3, Rotation, Vec3};
