//! Declaration documents for datum assemblies.
//!
//! A [`Design`] is the loader-facing shape of an assembly: an ordered list of
//! part and custom-anchor declarations. It is purely declarative; anchor
//! resolution happens in the `datum` crate.
//!
//! Designs load from JSON or TOML. The `anchor` and `reference` keys are
//! synonyms, as are a part's inline `anchors` and `references` lists.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a design document.
#[derive(Error, Debug)]
pub enum IrError {
    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The JSON text is malformed or has the wrong shape.
    #[error("invalid JSON design: {0}")]
    Json(#[from] serde_json::Error),
    /// The TOML text is malformed or has the wrong shape.
    #[error("invalid TOML design: {0}")]
    Toml(#[from] toml::de::Error),
    /// The file extension names no known format.
    #[error("unknown design format: {0:?} (expected .json or .toml)")]
    UnknownFormat(String),
}

/// 3D vector with f64 components (conventionally millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Geometry construction parameters for a part.
///
/// Primitives sit in their local frame as follows:
/// boxes from the origin corner, cylinders and cones standing on the origin
/// along +Z, spheres centred on the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Shape {
    /// Axis-aligned box with one corner at the origin.
    Box {
        /// Size along each axis.
        size: Vec3,
    },
    /// Cylinder along +Z, base centred on the origin.
    Cylinder {
        /// Radius of the cylinder.
        radius: f64,
        /// Height of the cylinder.
        height: f64,
    },
    /// Sphere centred on the origin.
    Sphere {
        /// Radius of the sphere.
        radius: f64,
    },
    /// Cone or frustum along +Z, base centred on the origin.
    Cone {
        /// Bottom radius.
        radius_bottom: f64,
        /// Top radius (0 for a point).
        radius_top: f64,
        /// Height of the cone.
        height: f64,
    },
    /// Boolean union of two shapes.
    Union {
        /// Left operand.
        left: Box<Shape>,
        /// Right operand.
        right: Box<Shape>,
    },
    /// Boolean difference (left minus right).
    Difference {
        /// Left operand (base).
        left: Box<Shape>,
        /// Right operand (subtracted).
        right: Box<Shape>,
    },
    /// Boolean intersection of two shapes.
    Intersection {
        /// Left operand.
        left: Box<Shape>,
        /// Right operand.
        right: Box<Shape>,
    },
    /// Translation of a shape within the part's local frame.
    Translate {
        /// Shape to translate.
        child: Box<Shape>,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation of a shape within the part's local frame, Euler angles in degrees.
    Rotate {
        /// Shape to rotate.
        child: Box<Shape>,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
}

fn default_offset() -> Vec<f64> {
    vec![0.0, 0.0, 0.0]
}

/// Where something sits relative to an existing anchor.
///
/// `offset` and `rotation` stay raw number lists here so that a wrong arity
/// is reported by the resolver against the declaration that carried it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Positioning {
    /// Reference path of the anchor to position against (`part.anchor` or `anchor`).
    #[serde(alias = "relative_to")]
    pub target: String,
    /// Offset in the target's local basis `[tangent, bitangent, normal]`.
    #[serde(default = "default_offset")]
    pub offset: Vec<f64>,
    /// Euler angles in degrees, applied in the target's local axes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Vec<f64>>,
}

impl Positioning {
    /// Position at `target` with a local offset.
    pub fn at(target: impl Into<String>, offset: [f64; 3]) -> Self {
        Self {
            target: target.into(),
            offset: offset.to_vec(),
            rotation: None,
        }
    }

    /// Add a local rotation (Euler degrees).
    pub fn rotated(mut self, angles: [f64; 3]) -> Self {
        self.rotation = Some(angles.to_vec());
        self
    }
}

/// A user-declared anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorDecl {
    /// Anchor name; `part.name` scopes it to a part.
    pub name: String,
    /// Anchor placement.
    #[serde(alias = "at")]
    pub position: Positioning,
}

/// A part declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDecl {
    /// Part name, unique in the design.
    pub name: String,
    /// Geometry construction parameters.
    pub shape: Shape,
    /// Placement of the part's local origin; world origin when absent.
    #[serde(default, alias = "at", skip_serializing_if = "Option::is_none")]
    pub position: Option<Positioning>,
    /// Anchors scoped to this part, declared right after it.
    #[serde(default, alias = "references", skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<AnchorDecl>,
}

/// One entry of a design, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    /// A part.
    Part(PartDecl),
    /// A top-level or part-scoped custom anchor.
    #[serde(alias = "reference")]
    Anchor(AnchorDecl),
}

/// A datum design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Design {
    /// Format version string (e.g. "0.1").
    #[serde(default = "default_version")]
    pub version: String,
    /// Optional assembly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declarations in the order they were written.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

fn default_version() -> String {
    "0.1".to_string()
}

impl Default for Design {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            declarations: Vec::new(),
        }
    }
}

impl Design {
    /// Create a new empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a part declaration.
    pub fn part(
        mut self,
        name: impl Into<String>,
        shape: Shape,
        position: Option<Positioning>,
    ) -> Self {
        self.declarations.push(Declaration::Part(PartDecl {
            name: name.into(),
            shape,
            position,
            anchors: Vec::new(),
        }));
        self
    }

    /// Append a custom anchor declaration.
    pub fn anchor(mut self, name: impl Into<String>, position: Positioning) -> Self {
        self.declarations.push(Declaration::Anchor(AnchorDecl {
            name: name.into(),
            position,
        }));
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deserialize from TOML string.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a `.json` or `.toml` design file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IrError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        let text = std::fs::read_to_string(path)?;
        match ext.as_str() {
            "json" => Ok(Self::from_json(&text)?),
            "toml" => Ok(Self::from_toml(&text)?),
            _ => Err(IrError::UnknownFormat(ext)),
        }
    }

    /// Number of parts declared.
    pub fn part_count(&self) -> usize {
        self.declarations
            .iter()
            .filter(|d| matches!(d, Declaration::Part(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn block(x: f64, y: f64, z: f64) -> Shape {
        Shape::Box {
            size: Vec3::new(x, y, z),
        }
    }

    #[test]
    fn roundtrip_design() {
        let design = Design::new()
            .part("base", block(10.0, 10.0, 20.0), None)
            .part(
                "lid",
                Shape::Difference {
                    left: Box::new(block(10.0, 10.0, 2.0)),
                    right: Box::new(Shape::Cylinder {
                        radius: 1.0,
                        height: 2.0,
                    }),
                },
                Some(Positioning::at("base.face_top", [0.0, 0.0, 5.0])),
            )
            .anchor(
                "handle",
                Positioning::at("lid.face_top", [1.0, 0.0, 0.0]).rotated([0.0, 0.0, 90.0]),
            );

        let json = design.to_json().expect("serialize");
        let restored = Design::from_json(&json).expect("deserialize");
        assert_eq!(design, restored);
        assert_eq!(restored.part_count(), 2);
        assert_eq!(restored.declarations.len(), 3);
    }

    #[test]
    fn empty_design() {
        let design = Design::from_json("{}").unwrap();
        assert_eq!(design.version, "0.1");
        assert!(design.name.is_none());
        assert!(design.declarations.is_empty());
    }

    #[test]
    fn serde_tagged_shape() {
        let shape = block(1.0, 2.0, 3.0);
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains(r#""type":"Box""#));
        let restored: Shape = serde_json::from_str(&json).unwrap();
        assert_eq!(shape, restored);
    }

    #[test]
    fn offset_defaults_to_zero() {
        let p: Positioning = serde_json::from_str(r#"{"target": "base.center"}"#).unwrap();
        assert_eq!(p.offset, vec![0.0, 0.0, 0.0]);
        assert!(p.rotation.is_none());
    }

    #[test]
    fn offset_arity_is_preserved_for_the_resolver() {
        let p: Positioning =
            serde_json::from_str(r#"{"target": "base.center", "offset": [1.0, 2.0]}"#).unwrap();
        assert_eq!(p.offset.len(), 2);
    }

    #[test]
    fn reference_is_a_synonym_for_anchor() {
        let json = r#"{
            "declarations": [
                {"part": {"name": "base", "shape": {"type": "Sphere", "radius": 2.0}}},
                {"reference": {"name": "tip", "at": {"relative_to": "base.face_top"}}},
                {"anchor": {"name": "tail", "position": {"target": "base.face_bottom"}}}
            ]
        }"#;
        let design = Design::from_json(json).unwrap();
        assert_eq!(design.declarations.len(), 3);
        match &design.declarations[1] {
            Declaration::Anchor(a) => {
                assert_eq!(a.name, "tip");
                assert_eq!(a.position.target, "base.face_top");
            }
            other => panic!("expected Anchor, got {other:?}"),
        }
        assert!(matches!(design.declarations[2], Declaration::Anchor(_)));
    }

    #[test]
    fn inline_references_are_part_anchors() {
        let json = r#"{
            "declarations": [
                {"part": {
                    "name": "plate",
                    "shape": {"type": "Box", "size": {"x": 4.0, "y": 4.0, "z": 1.0}},
                    "references": [{"name": "hole", "at": {"target": "plate.face_top"}}]
                }}
            ]
        }"#;
        let design = Design::from_json(json).unwrap();
        match &design.declarations[0] {
            Declaration::Part(p) => {
                assert_eq!(p.anchors.len(), 1);
                assert_eq!(p.anchors[0].name, "hole");
                assert!(p.position.is_none());
            }
            other => panic!("expected Part, got {other:?}"),
        }
    }

    #[test]
    fn parses_toml() {
        let text = r#"
            name = "stack"

            [[declarations]]
            [declarations.part]
            name = "base"
            shape = { type = "Box", size = { x = 10.0, y = 10.0, z = 20.0 } }

            [[declarations]]
            [declarations.part]
            name = "cap"
            shape = { type = "Cone", radius_bottom = 5.0, radius_top = 0.0, height = 4.0 }
            at = { target = "base.face_top", offset = [0.0, 0.0, 5.0] }
        "#;
        let design = Design::from_toml(text).unwrap();
        assert_eq!(design.name.as_deref(), Some("stack"));
        assert_eq!(design.part_count(), 2);
        match &design.declarations[1] {
            Declaration::Part(p) => {
                let pos = p.position.as_ref().expect("position");
                assert_eq!(pos.target, "base.face_top");
                assert_eq!(pos.offset, vec![0.0, 0.0, 5.0]);
            }
            other => panic!("expected Part, got {other:?}"),
        }
    }

    #[test]
    fn load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("design.json");
        let design = Design::new().part("base", block(1.0, 1.0, 1.0), None);
        std::fs::write(&json_path, design.to_json().unwrap()).unwrap();
        assert_eq!(Design::load(&json_path).unwrap(), design);

        let yaml_path = dir.path().join("design.yaml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(f, "declarations: []").unwrap();
        assert!(matches!(
            Design::load(&yaml_path),
            Err(IrError::UnknownFormat(ext)) if ext == "yaml"
        ));
    }
}
