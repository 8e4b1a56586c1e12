//! The reference graph: one node per declaration, one edge per positioning
//! target.
//!
//! Each declaration positions against at most one target, so following
//! edges from any node walks a single chain. Resolution state lives on the
//! nodes and is dropped with the graph when a build finishes.

use std::collections::HashMap;

use datum_math::Frame;

use crate::declaration::{Declaration, PositioningSpec};
use crate::error::{AnchorError, Result};
use crate::path::ReferencePath;

/// Index of a node, equal to its declaration position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a node is in its resolution lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Not visited yet.
    Declared,
    /// On the resolution stack; meeting it again means a cycle.
    Resolving,
    /// Frame computed and anchors registered.
    Resolved,
    /// Resolution failed; terminal.
    Failed,
}

#[derive(Debug)]
pub(crate) struct Node<P> {
    pub(crate) key: String,
    pub(crate) declaration: Declaration<P>,
    pub(crate) state: ResolutionState,
    pub(crate) frame: Option<Frame>,
    pub(crate) failure: Option<AnchorError>,
}

/// Declarations indexed by name, with per-node resolution state.
#[derive(Debug)]
pub struct ReferenceGraph<P> {
    nodes: Vec<Node<P>>,
    index: HashMap<String, NodeId>,
}

impl<P> ReferenceGraph<P> {
    /// Build the graph from declarations in order.
    ///
    /// Rejects malformed names, names used twice, and part-scoped anchors
    /// whose part is not declared before them.
    pub fn build(declarations: Vec<Declaration<P>>) -> Result<Self> {
        let mut nodes = Vec::with_capacity(declarations.len());
        let mut index = HashMap::with_capacity(declarations.len());

        for declaration in declarations {
            let key = declaration.name().to_string();
            let path = ReferencePath::parse(&key)
                .ok_or_else(|| AnchorError::InvalidPath { path: key.clone() })?;
            if matches!(declaration, Declaration::Part(_)) && path.is_scoped() {
                return Err(AnchorError::InvalidPath { path: key });
            }
            if index.contains_key(&key) {
                return Err(AnchorError::AmbiguousAnchor { path: key });
            }
            index.insert(key.clone(), NodeId(nodes.len()));
            nodes.push(Node {
                key,
                declaration,
                state: ResolutionState::Declared,
                frame: None,
                failure: None,
            });
        }

        let graph = Self { nodes, index };
        for (position, node) in graph.nodes.iter().enumerate() {
            if let Declaration::Anchor(_) = node.declaration {
                if let Some(part) = ReferencePath::parse(&node.key).and_then(|p| {
                    p.part().map(str::to_string)
                }) {
                    // the owning part has to come first
                    let declared_before = graph
                        .part_node(&part)
                        .is_some_and(|id| id.index() < position);
                    if !declared_before {
                        return Err(AnchorError::UndefinedReference {
                            from: node.key.clone(),
                            target: part,
                        });
                    }
                }
            }
        }
        Ok(graph)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Node declared under `name`.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Declared name of a node.
    pub fn key(&self, id: NodeId) -> &str {
        &self.nodes[id.0].key
    }

    /// Current resolution state of a node.
    pub fn state(&self, id: NodeId) -> ResolutionState {
        self.nodes[id.0].state
    }

    /// Cached frame of a resolved node.
    pub fn frame(&self, id: NodeId) -> Option<Frame> {
        self.nodes[id.0].frame
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<P> {
        &mut self.nodes[id.0]
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> &Node<P> {
        &self.nodes[id.0]
    }

    fn part_node(&self, name: &str) -> Option<NodeId> {
        self.node(name)
            .filter(|id| matches!(self.nodes[id.0].declaration, Declaration::Part(_)))
    }

    /// The node that provides the anchor at `target`.
    ///
    /// A custom anchor declared under the exact path wins; otherwise a scoped
    /// path is provided by its part, and a bare name by the part of that name.
    pub fn provider(&self, target: &ReferencePath) -> Option<NodeId> {
        if let Some(id) = self.node(target.as_str()) {
            return Some(id);
        }
        target.part().and_then(|part| self.part_node(part))
    }

    /// Registry path that `target` resolves to once its provider is resolved.
    ///
    /// A bare name that names a part means that part's `origin`.
    pub fn registry_path(&self, target: &ReferencePath) -> String {
        if !target.is_scoped() && self.part_node(target.as_str()).is_some() {
            return format!("{}.{}", target.as_str(), crate::query::ORIGIN);
        }
        target.as_str().to_string()
    }

    /// Positioning spec of a node, if any.
    pub fn positioning(&self, id: NodeId) -> Option<&PositioningSpec> {
        self.nodes[id.0].declaration.positioning()
    }

    /// Provider of a node's positioning target, if the target names one.
    fn dependency(&self, id: NodeId) -> Option<NodeId> {
        let spec = self.positioning(id)?;
        let target = ReferencePath::parse(&spec.target)?;
        self.provider(&target)
    }

    /// Follow dependency edges from `start` looking for a cycle.
    ///
    /// `stack` holds the nodes currently resolving, outermost first. Returns
    /// the node names along the cycle with the first repeated at the end.
    pub(crate) fn trace_cycle(&self, start: NodeId, stack: &[NodeId]) -> Option<Vec<String>> {
        let mut walk = vec![start];
        let mut current = start;
        while let Some(next) = self.dependency(current) {
            if let Some(pos) = walk.iter().position(|&n| n == next) {
                let mut cycle: Vec<NodeId> = walk[pos..].to_vec();
                cycle.push(next);
                return Some(self.names(&cycle));
            }
            if self.state(next) == ResolutionState::Resolving {
                let pos = stack.iter().position(|&n| n == next)?;
                let mut cycle: Vec<NodeId> = stack[pos..].to_vec();
                cycle.extend(walk);
                cycle.push(next);
                return Some(self.names(&cycle));
            }
            if self.state(next) == ResolutionState::Resolved {
                return None;
            }
            walk.push(next);
            current = next;
        }
        None
    }

    fn names(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| self.key(id).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, target: Option<&str>) -> Declaration<()> {
        Declaration::part(name, (), target.map(|t| PositioningSpec::new(t, [0.0; 3])))
    }

    #[test]
    fn nodes_follow_declaration_order() {
        let graph = ReferenceGraph::build(vec![
            part("base", None),
            part("lid", Some("base.face_top")),
            Declaration::anchor("pivot", PositioningSpec::new("lid.center", [0.0; 3])),
        ])
        .unwrap();
        assert_eq!(graph.len(), 3);
        let keys: Vec<_> = graph.ids().map(|id| graph.key(id)).collect();
        assert_eq!(keys, vec!["base", "lid", "pivot"]);
        assert!(graph
            .ids()
            .all(|id| graph.state(id) == ResolutionState::Declared));
    }

    #[test]
    fn duplicate_names_are_ambiguous() {
        let err = ReferenceGraph::build(vec![part("a", None), part("a", None)]).unwrap_err();
        assert_eq!(err, AnchorError::AmbiguousAnchor { path: "a".into() });

        // a bare anchor may not shadow a part either
        let err = ReferenceGraph::build(vec![
            part("a", None),
            Declaration::anchor("a", PositioningSpec::new("a.center", [0.0; 3])),
        ])
        .unwrap_err();
        assert_eq!(err, AnchorError::AmbiguousAnchor { path: "a".into() });
    }

    #[test]
    fn part_names_cannot_be_scoped() {
        let err = ReferenceGraph::build(vec![part("a.b", None)]).unwrap_err();
        assert_eq!(err, AnchorError::InvalidPath { path: "a.b".into() });
    }

    #[test]
    fn scoped_anchor_needs_its_part() {
        let err = ReferenceGraph::build(vec![
            part("a", None),
            Declaration::anchor("ghost.mount", PositioningSpec::new("a.center", [0.0; 3])),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            AnchorError::UndefinedReference {
                from: "ghost.mount".into(),
                target: "ghost".into()
            }
        );
    }

    #[test]
    fn scoped_anchor_after_its_part_only() {
        let err = ReferenceGraph::build(vec![
            part("base", None),
            Declaration::anchor("lid.mount", PositioningSpec::new("base.face_top", [0.0; 3])),
            part("lid", None),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            AnchorError::UndefinedReference {
                from: "lid.mount".into(),
                target: "lid".into()
            }
        );
    }

    #[test]
    fn provider_lookup() {
        let graph = ReferenceGraph::build(vec![
            part("base", None),
            Declaration::anchor("base.mount", PositioningSpec::new("base.face_top", [0.0; 3])),
            Declaration::anchor("pivot", PositioningSpec::new("base.mount", [0.0; 3])),
        ])
        .unwrap();
        let p = |s: &str| ReferencePath::parse(s).unwrap();
        assert_eq!(graph.provider(&p("base.face_top")), graph.node("base"));
        assert_eq!(graph.provider(&p("base.mount")), graph.node("base.mount"));
        assert_eq!(graph.provider(&p("pivot")), graph.node("pivot"));
        assert_eq!(graph.provider(&p("base")), graph.node("base"));
        assert_eq!(graph.provider(&p("pivot.x")), None);
        assert_eq!(graph.provider(&p("missing.center")), None);

        assert_eq!(graph.registry_path(&p("base")), "base.origin");
        assert_eq!(graph.registry_path(&p("pivot")), "pivot");
        assert_eq!(graph.registry_path(&p("base.mount")), "base.mount");
    }

    #[test]
    fn trace_finds_cycle_through_resolving_node() {
        let mut graph = ReferenceGraph::build(vec![
            part("a", Some("b.center")),
            part("b", Some("a.center")),
        ])
        .unwrap();
        let a = graph.node("a").unwrap();
        let b = graph.node("b").unwrap();
        graph.node_mut(a).state = ResolutionState::Resolving;
        assert_eq!(
            graph.trace_cycle(b, &[a]),
            Some(vec!["a".to_string(), "b".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn trace_finds_cycle_not_through_caller() {
        let graph = ReferenceGraph::build(vec![
            part("a", Some("b.center")),
            part("b", Some("c.center")),
            part("c", Some("b.center")),
        ])
        .unwrap();
        let b = graph.node("b").unwrap();
        assert_eq!(
            graph.trace_cycle(b, &[]),
            Some(vec!["b".to_string(), "c".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn trace_without_cycle() {
        let graph = ReferenceGraph::build(vec![
            part("a", Some("b.center")),
            part("b", Some("c.center")),
            part("c", None),
        ])
        .unwrap();
        let b = graph.node("b").unwrap();
        assert_eq!(graph.trace_cycle(b, &[graph.node("a").unwrap()]), None);
    }
}
