//! Declarations as the resolver consumes them.
//!
//! The loader's `anchors:` and `references:` forms have already been folded
//! into one shape here; [`from_design`] performs that normalization for
//! `datum-ir` documents.

use datum_ir::{Declaration as IrDeclaration, Design, Positioning, Shape};
use datum_math::{Rotation, Vec3};

use crate::error::{AnchorError, Result};

/// Position relative to an existing anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PositioningSpec {
    /// Reference path of the anchor positioned against.
    pub target: String,
    /// Offset in the target's local basis; must hold three finite numbers.
    pub offset: Vec<f64>,
    /// Optional Euler angles in degrees, in the target's local axes.
    pub rotation: Option<Vec<f64>>,
}

impl PositioningSpec {
    /// Position at `target` with a local offset.
    pub fn new(target: impl Into<String>, offset: [f64; 3]) -> Self {
        Self {
            target: target.into(),
            offset: offset.to_vec(),
            rotation: None,
        }
    }

    /// Add a local rotation in Euler degrees.
    pub fn with_rotation(mut self, angles: [f64; 3]) -> Self {
        self.rotation = Some(angles.to_vec());
        self
    }

    /// The validated offset vector. `owner` names the declaration for errors.
    pub fn offset_vector(&self, owner: &str) -> Result<Vec3> {
        triple(&self.offset, owner, "offset")
    }

    /// The validated rotation, if any.
    pub fn rotation(&self, owner: &str) -> Result<Option<Rotation>> {
        self.rotation
            .as_deref()
            .map(|angles| {
                let v = triple(angles, owner, "rotation")?;
                Ok(Rotation::from_euler_degrees(v.x, v.y, v.z))
            })
            .transpose()
    }
}

fn triple(values: &[f64], owner: &str, what: &str) -> Result<Vec3> {
    if values.len() != 3 {
        return Err(AnchorError::InvalidOffset {
            path: owner.to_string(),
            reason: format!("{what} needs 3 components, got {}", values.len()),
        });
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(AnchorError::InvalidOffset {
            path: owner.to_string(),
            reason: format!("{what} component {bad} is not finite"),
        });
    }
    Ok(Vec3::new(values[0], values[1], values[2]))
}

impl From<&Positioning> for PositioningSpec {
    fn from(p: &Positioning) -> Self {
        Self {
            target: p.target.clone(),
            offset: p.offset.clone(),
            rotation: p.rotation.clone(),
        }
    }
}

/// A part: geometry parameters plus optional placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PartDeclaration<P> {
    /// Unique part name.
    pub name: String,
    /// Engine-specific construction parameters.
    pub params: P,
    /// Where the part's local origin goes; world origin when absent.
    pub positioning: Option<PositioningSpec>,
}

/// A custom anchor: a frame derived from another anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorDeclaration {
    /// `name` for a top-level anchor, `part.name` for a part-scoped one.
    pub name: String,
    /// Where the anchor sits.
    pub positioning: PositioningSpec,
}

/// One declaration, in the order it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration<P> {
    /// A part.
    Part(PartDeclaration<P>),
    /// A custom anchor.
    Anchor(AnchorDeclaration),
}

impl<P> Declaration<P> {
    /// Declare a part.
    pub fn part(name: impl Into<String>, params: P, positioning: Option<PositioningSpec>) -> Self {
        Declaration::Part(PartDeclaration {
            name: name.into(),
            params,
            positioning,
        })
    }

    /// Declare a custom anchor.
    pub fn anchor(name: impl Into<String>, positioning: PositioningSpec) -> Self {
        Declaration::Anchor(AnchorDeclaration {
            name: name.into(),
            positioning,
        })
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Part(p) => &p.name,
            Declaration::Anchor(a) => &a.name,
        }
    }

    /// Positioning, if any.
    pub fn positioning(&self) -> Option<&PositioningSpec> {
        match self {
            Declaration::Part(p) => p.positioning.as_ref(),
            Declaration::Anchor(a) => Some(&a.positioning),
        }
    }
}

/// Flatten a design into resolver declarations.
///
/// A part's inline anchors are scoped to it (`part.name`) and follow it
/// directly in declaration order.
pub fn from_design(design: &Design) -> Vec<Declaration<Shape>> {
    let mut out = Vec::with_capacity(design.declarations.len());
    for decl in &design.declarations {
        match decl {
            IrDeclaration::Part(part) => {
                out.push(Declaration::part(
                    part.name.clone(),
                    part.shape.clone(),
                    part.position.as_ref().map(PositioningSpec::from),
                ));
                for anchor in &part.anchors {
                    out.push(Declaration::anchor(
                        format!("{}.{}", part.name, anchor.name),
                        PositioningSpec::from(&anchor.position),
                    ));
                }
            }
            IrDeclaration::Anchor(anchor) => out.push(Declaration::anchor(
                anchor.name.clone(),
                PositioningSpec::from(&anchor.position),
            )),
        }
    }
    out
}
