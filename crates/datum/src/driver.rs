//! Build driver: realize parts, register their anchors, and hand back the
//! finished assembly.

use datum_ir::{Design, Shape};
use datum_math::Frame;
use tracing::debug;

use crate::config::BuildConfig;
use crate::declaration::{from_design, Declaration, PartDeclaration};
use crate::error::{AnchorError, Result};
use crate::query::{derive_auto_anchors, GeometryQuery};
use crate::registry::{Anchor, AnchorRegistry};
use crate::resolver::Resolver;

/// A realized part and where it was placed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPart<H> {
    name: String,
    handle: H,
    placement: Frame,
}

impl<H: Copy> PlacedPart<H> {
    /// Part name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Engine handle of the placed geometry.
    pub fn handle(&self) -> H {
        self.handle
    }

    /// Frame the part's local origin and axes were moved to.
    pub fn placement(&self) -> &Frame {
        &self.placement
    }
}

/// Result of a successful build: every anchor plus the placed parts, in
/// declaration order.
#[derive(Debug, Clone)]
pub struct Assembly<H> {
    registry: AnchorRegistry,
    parts: Vec<PlacedPart<H>>,
}

impl<H: Copy> Assembly<H> {
    pub(crate) fn new(registry: AnchorRegistry, parts: Vec<PlacedPart<H>>) -> Self {
        Self { registry, parts }
    }

    /// Resolve every declaration against `engine`.
    ///
    /// Stops at the first error; nothing partial is returned.
    pub fn build<E>(
        engine: &mut E,
        declarations: Vec<Declaration<E::Params>>,
        config: &BuildConfig,
    ) -> Result<Self>
    where
        E: GeometryQuery<Handle = H>,
    {
        let mut resolver = Resolver::new(engine, declarations, config)?;
        resolver.resolve_all()?;
        Ok(resolver.into_assembly())
    }

    /// Build a loaded design document.
    pub fn from_design<E>(engine: &mut E, design: &Design, config: &BuildConfig) -> Result<Self>
    where
        E: GeometryQuery<Params = Shape, Handle = H>,
    {
        Self::build(engine, from_design(design), config)
    }

    /// Frame at `path`. A bare part name means that part's origin.
    pub fn resolve(&self, path: &str) -> Result<Frame> {
        match self.registry.resolve(path) {
            Err(AnchorError::UnknownAnchor { .. }) if self.part(path).is_some() => self
                .registry
                .resolve(&format!("{path}.{}", crate::query::ORIGIN)),
            other => other,
        }
    }

    /// Placed part by name.
    pub fn part(&self, name: &str) -> Option<&PlacedPart<H>> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Placed parts in declaration order.
    pub fn parts(&self) -> &[PlacedPart<H>] {
        &self.parts
    }

    /// All anchors.
    pub fn registry(&self) -> &AnchorRegistry {
        &self.registry
    }

    /// Anchors scoped to one part: its auto-anchors, then its custom ones.
    pub fn anchors_of<'a>(&'a self, part: &'a str) -> impl Iterator<Item = &'a Anchor> + 'a {
        self.registry.anchors_of(part)
    }
}

/// Realize one part at `placement` and register its auto-anchors.
pub(crate) fn realize_part<E: GeometryQuery>(
    engine: &mut E,
    part: &PartDeclaration<E::Params>,
    placement: Frame,
    registry: &mut AnchorRegistry,
) -> Result<PlacedPart<E::Handle>> {
    let geometry = |source| AnchorError::Geometry {
        part: part.name.clone(),
        source,
    };
    let handle = engine.realize(&part.params).map_err(geometry)?;
    engine.place(handle, &placement).map_err(geometry)?;

    let anchors = derive_auto_anchors(&*engine, &part.name, handle, &placement)?;
    let count = anchors.len();
    for anchor in anchors {
        registry.insert(anchor)?;
    }
    debug!(part = %part.name, ?handle, anchors = count, "placed part");

    Ok(PlacedPart {
        name: part.name.clone(),
        handle,
        placement,
    })
}
