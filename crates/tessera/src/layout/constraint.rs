//! Minimum-gap constraints between horizontal positions.
//!
//! Every edge `from -> to` with weight `gap` states `to >= from + gap`. The
//! graph is built incrementally while tiles are created and is solved once by
//! the [resolver](super::resolve).

use log::trace;
use petgraph::{Graph, graph::NodeIndex};

use crate::{
    error::LayoutError,
    layout::position::{Position, PositionArena},
};

/// A node of the constraint graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    label: String,
}

impl GraphNode {
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A solvable position: a graph node paired with the arena handle that
/// receives its value.
///
/// Only anchors can take part in constraints; derived positions are computed
/// from anchors after solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    node: NodeIndex,
    position: Position,
}

impl Anchor {
    pub fn position(self) -> Position {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn node(self) -> NodeIndex {
        self.node
    }
}

/// Directed graph of minimum-gap constraints.
///
/// Edges are kept in insertion order, which is also the order the resolver
/// relaxes them in. Duplicate edges are allowed; only the largest gap between
/// two anchors has any effect.
///
/// # Examples
///
/// ```
/// # use tessera::layout::{ConstraintGraph, PositionArena, resolve};
/// let mut arena = PositionArena::new();
/// let mut graph = ConstraintGraph::new();
/// let a = graph.add_anchor(&mut arena, "a");
/// let b = graph.add_anchor(&mut arena, "b");
/// graph.set_origin(a);
/// graph.ensure_gap(a, b, 30.0).unwrap();
///
/// resolve(&graph, &mut arena).unwrap();
/// assert_eq!(arena.current_value(b.position()).unwrap(), 30.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstraintGraph {
    graph: Graph<GraphNode, f32>,
    origin: Option<NodeIndex>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and the arena position that will receive its value.
    pub fn add_anchor(&mut self, arena: &mut PositionArena, label: &str) -> Anchor {
        let node = self.graph.add_node(GraphNode {
            label: label.to_string(),
        });
        let position = arena.graph(node, label);
        Anchor { node, position }
    }

    /// Pins `anchor` to zero after solving; every other value is shifted by
    /// the same amount.
    ///
    /// Without an origin the solved values are left as the relaxation
    /// produced them, with the leftmost unconstrained nodes at zero.
    pub fn set_origin(&mut self, anchor: Anchor) {
        self.origin = Some(anchor.node);
    }

    pub fn origin(&self) -> Option<NodeIndex> {
        self.origin
    }

    /// Declares `to >= from + min_gap`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Internal`] if `min_gap` is not a finite number.
    pub fn ensure_gap(&mut self, from: Anchor, to: Anchor, min_gap: f32) -> Result<(), LayoutError> {
        if !min_gap.is_finite() {
            return Err(LayoutError::Internal(format!(
                "gap from {} to {} is not finite: {min_gap}",
                self.label(from.node),
                self.label(to.node)
            )));
        }

        trace!(
            from = self.label(from.node),
            to = self.label(to.node),
            min_gap;
            "Adding constraint"
        );
        self.graph.add_edge(from.node, to.node, min_gap);
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn label(&self, node: NodeIndex) -> &str {
        self.graph
            .node_weight(node)
            .map(GraphNode::label)
            .unwrap_or("?")
    }

    /// Edges as `(from, to, min_gap)` in insertion order.
    pub(crate) fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, f32)> + '_ {
        self.graph
            .raw_edges()
            .iter()
            .map(|edge| (edge.source(), edge.target(), edge.weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_keep_insertion_order() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let a = graph.add_anchor(&mut arena, "a");
        let b = graph.add_anchor(&mut arena, "b");
        let c = graph.add_anchor(&mut arena, "c");

        graph.ensure_gap(b, c, 2.0).unwrap();
        graph.ensure_gap(a, b, 1.0).unwrap();
        graph.ensure_gap(a, b, 3.0).unwrap();

        let gaps: Vec<f32> = graph.edges().map(|(_, _, gap)| gap).collect();
        assert_eq!(gaps, vec![2.0, 1.0, 3.0]);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn test_non_finite_gap_is_rejected() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let a = graph.add_anchor(&mut arena, "a");
        let b = graph.add_anchor(&mut arena, "b");

        let err = graph.ensure_gap(a, b, f32::NAN).unwrap_err();
        assert!(err.is_internal());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_anchor_labels_flow_to_arena() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let anchor = graph.add_anchor(&mut arena, "bob.right");

        assert_eq!(graph.label(anchor.node()), "bob.right");
        assert_eq!(arena.describe(anchor.position()), "bob.right");
    }
}
