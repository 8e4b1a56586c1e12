//! Depth-first anchor resolution over the reference graph.
//!
//! Nodes are resolved in declaration order. Before a node's frame is
//! computed its positioning target is resolved; the walk runs on an explicit
//! stack so long anchor chains never exhaust the call stack. A target that
//! is declared later is a forward reference and is rejected, unless its
//! chain closes a cycle, which is reported as such.

use datum_math::Frame;
use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::declaration::{Declaration, PositioningSpec};
use crate::driver::{realize_part, Assembly, PlacedPart};
use crate::error::{AnchorError, Result};
use crate::graph::{NodeId, ReferenceGraph, ResolutionState};
use crate::path::ReferencePath;
use crate::query::GeometryQuery;
use crate::registry::{Anchor, AnchorKind, AnchorRegistry};

/// Owns one build pass: graph, registry, and the placed parts so far.
pub struct Resolver<'e, E: GeometryQuery> {
    engine: &'e mut E,
    graph: ReferenceGraph<E::Params>,
    registry: AnchorRegistry,
    parts: Vec<PlacedPart<E::Handle>>,
}

/// What to do with the node on top of the stack.
enum Step {
    /// Resolve this dependency first.
    Descend(NodeId),
    /// Dependencies are done; compute with this base frame.
    Compute(Option<Frame>),
}

impl<'e, E: GeometryQuery> Resolver<'e, E> {
    /// Prepare a build over `declarations`.
    pub fn new(
        engine: &'e mut E,
        declarations: Vec<Declaration<E::Params>>,
        config: &BuildConfig,
    ) -> Result<Self> {
        config.validate()?;
        let graph = ReferenceGraph::build(declarations)?;
        debug!(nodes = graph.len(), "built reference graph");
        Ok(Self {
            engine,
            graph,
            registry: AnchorRegistry::new(config.tolerance),
            parts: Vec::new(),
        })
    }

    /// Resolve every node in declaration order.
    pub fn resolve_all(&mut self) -> Result<()> {
        let ids: Vec<NodeId> = self.graph.ids().collect();
        for id in ids {
            if self.graph.state(id) == ResolutionState::Declared {
                self.resolve(id)?;
            }
        }
        info!(
            parts = self.parts.len(),
            anchors = self.registry.len(),
            "resolved all declarations"
        );
        Ok(())
    }

    /// Resolve one node (and whatever it depends on), returning its frame.
    ///
    /// For a part the frame is its placement; for a custom anchor it is the
    /// anchor's own frame.
    pub fn resolve(&mut self, id: NodeId) -> Result<Frame> {
        match self.graph.state(id) {
            ResolutionState::Resolved => return self.cached(id),
            ResolutionState::Failed => return Err(self.failure(id)),
            ResolutionState::Resolving => {
                let key = self.graph.key(id).to_string();
                return Err(AnchorError::CircularDependency {
                    cycle: vec![key.clone(), key],
                });
            }
            ResolutionState::Declared => {}
        }

        let mut stack = vec![id];
        self.graph.node_mut(id).state = ResolutionState::Resolving;

        while let Some(&top) = stack.last() {
            let step = match self.next_step(top, &stack) {
                Ok(step) => step,
                Err(err) => return Err(self.abort(&stack, err)),
            };
            match step {
                Step::Descend(dep) => {
                    self.graph.node_mut(dep).state = ResolutionState::Resolving;
                    stack.push(dep);
                }
                Step::Compute(base) => match self.compute(top, base) {
                    Ok(frame) => {
                        let node = self.graph.node_mut(top);
                        node.state = ResolutionState::Resolved;
                        node.frame = Some(frame);
                        debug!(node = %node.key, "resolved");
                        stack.pop();
                    }
                    Err(err) => return Err(self.abort(&stack, err)),
                },
            }
        }

        self.cached(id)
    }

    /// Resolve the node that provides `path` and return the anchor's frame.
    pub fn resolve_path(&mut self, path: &str) -> Result<Frame> {
        let unknown = || AnchorError::UnknownAnchor {
            path: path.to_string(),
        };
        let target = ReferencePath::parse(path).ok_or_else(unknown)?;
        let provider = self.graph.provider(&target).ok_or_else(unknown)?;
        self.resolve(provider)?;
        self.registry.resolve(&self.graph.registry_path(&target))
    }

    /// Resolution state of the node declared as `name`.
    pub fn state(&self, name: &str) -> Option<ResolutionState> {
        self.graph.node(name).map(|id| self.graph.state(id))
    }

    /// Node declared as `name`.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.graph.node(name)
    }

    /// Anchors registered so far.
    pub fn registry(&self) -> &AnchorRegistry {
        &self.registry
    }

    /// Finish the build, dropping the graph and its resolution state.
    pub fn into_assembly(self) -> Assembly<E::Handle> {
        Assembly::new(self.registry, self.parts)
    }

    fn cached(&self, id: NodeId) -> Result<Frame> {
        self.graph
            .frame(id)
            .ok_or_else(|| AnchorError::UnknownAnchor {
                path: self.graph.key(id).to_string(),
            })
    }

    fn failure(&self, id: NodeId) -> AnchorError {
        self.graph
            .node_ref(id)
            .failure
            .clone()
            .unwrap_or_else(|| AnchorError::UnknownAnchor {
                path: self.graph.key(id).to_string(),
            })
    }

    /// Mark everything on the stack failed and hand the error back.
    fn abort(&mut self, stack: &[NodeId], err: AnchorError) -> AnchorError {
        if let Some(&top) = stack.last() {
            warn!(error = %err, node = %self.graph.key(top), "resolution failed");
        }
        for &id in stack {
            let node = self.graph.node_mut(id);
            node.state = ResolutionState::Failed;
            node.failure = Some(err.clone());
        }
        err
    }

    fn next_step(&self, id: NodeId, stack: &[NodeId]) -> Result<Step> {
        let Some(spec) = self.graph.positioning(id) else {
            return Ok(Step::Compute(None));
        };
        let from = self.graph.key(id);
        let undefined = || AnchorError::UndefinedReference {
            from: from.to_string(),
            target: spec.target.clone(),
        };

        let target = ReferencePath::parse(&spec.target).ok_or_else(undefined)?;
        let dep = self.graph.provider(&target).ok_or_else(undefined)?;

        if dep.index() > id.index() {
            if let Some(cycle) = self.graph.trace_cycle(dep, stack) {
                return Err(AnchorError::CircularDependency { cycle });
            }
            return Err(undefined());
        }

        match self.graph.state(dep) {
            ResolutionState::Resolved => {
                match self.registry.resolve(&self.graph.registry_path(&target)) {
                    Ok(base) => Ok(Step::Compute(Some(base))),
                    Err(AnchorError::UnknownAnchor { .. }) => Err(undefined()),
                    Err(err) => Err(err),
                }
            }
            ResolutionState::Declared => Ok(Step::Descend(dep)),
            ResolutionState::Resolving => {
                let pos = stack.iter().position(|&n| n == dep).unwrap_or(0);
                let mut cycle: Vec<String> = stack[pos..]
                    .iter()
                    .map(|&n| self.graph.key(n).to_string())
                    .collect();
                cycle.push(self.graph.key(dep).to_string());
                Err(AnchorError::CircularDependency { cycle })
            }
            ResolutionState::Failed => Err(self.failure(dep)),
        }
    }

    fn compute(&mut self, id: NodeId, base: Option<Frame>) -> Result<Frame> {
        let key = self.graph.key(id).to_string();
        let placement = match (self.graph.positioning(id), base) {
            (Some(spec), Some(base)) => place(spec, &base, &key)?,
            _ => Frame::identity(),
        };

        match &self.graph.node_ref(id).declaration {
            Declaration::Part(part) => {
                let placed = realize_part(&mut *self.engine, part, placement, &mut self.registry)?;
                self.parts.push(placed);
            }
            Declaration::Anchor(_) => {
                let path = ReferencePath::parse(&key)
                    .ok_or_else(|| AnchorError::InvalidPath { path: key.clone() })?;
                self.registry
                    .insert(Anchor::new(path, placement, AnchorKind::Named))?;
            }
        }
        Ok(placement)
    }
}

/// Frame of a positioned entity: `spec` applied to `base` in `base`'s local basis.
fn place(spec: &PositioningSpec, base: &Frame, owner: &str) -> Result<Frame> {
    let offset = spec.offset_vector(owner)?;
    let rotation = spec.rotation(owner)?;
    base.compose(&offset, rotation.as_ref())
        .map_err(|source| AnchorError::InvalidFrame {
            path: owner.to_string(),
            source,
        })
}
