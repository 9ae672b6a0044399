//! Solving the constraint graph and evaluating derived positions.
//!
//! The graph is solved as a longest-path problem from an implicit source that
//! reaches every node with weight zero: every node starts at `0` and each
//! round relaxes all edges in insertion order, raising `to` to `from + gap`
//! when that is strictly larger. With `n` nodes the longest simple path has
//! fewer than `n` edges, so values settle after at most `n` rounds; a node
//! that still moves in round `n + 1` sits on a positive cycle.
//!
//! After convergence the origin anchor is translated to exactly zero, then
//! every derived position is evaluated in creation order.

use log::{debug, trace};

use crate::{
    error::LayoutError,
    layout::{
        constraint::ConstraintGraph,
        position::{Position, PositionArena, PositionKind},
    },
};

/// Statistics about a completed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    rounds: usize,
    nodes: usize,
    edges: usize,
}

impl Resolution {
    /// Relaxation rounds run, including the final round that changed nothing.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn nodes(&self) -> usize {
        self.nodes
    }

    pub fn edges(&self) -> usize {
        self.edges
    }
}

/// Solves `graph` and resolves every position in `arena`.
///
/// The result depends only on the set of nodes and the order edges were
/// added, never on timing or hashing.
///
/// # Errors
///
/// - [`LayoutError::InfeasibleConstraints`] if the graph has a cycle whose
///   gaps add up to more than zero. The error names the nodes that were
///   still moving.
/// - [`LayoutError::UnresolvedPosition`] or [`LayoutError::Internal`] if a
///   derived position cannot be evaluated, which indicates a construction
///   defect.
pub fn resolve(graph: &ConstraintGraph, arena: &mut PositionArena) -> Result<Resolution, LayoutError> {
    let node_count = graph.node_count();
    let edges: Vec<_> = graph.edges().collect();
    let mut values = vec![0.0_f32; node_count];

    let max_rounds = node_count + 1;
    let mut rounds = 0;
    loop {
        rounds += 1;
        let mut moved = Vec::new();
        for &(from, to, gap) in &edges {
            let candidate = values[from.index()] + gap;
            if candidate > values[to.index()] {
                trace!(
                    from = graph.label(from),
                    to = graph.label(to),
                    value = candidate;
                    "Relaxed constraint"
                );
                values[to.index()] = candidate;
                moved.push(to);
            }
        }
        debug!(round = rounds, moved = moved.len(); "Relaxation round finished");

        if moved.is_empty() {
            break;
        }
        if rounds >= max_rounds {
            let mut nodes: Vec<String> = moved
                .into_iter()
                .map(|node| graph.label(node).to_string())
                .collect();
            nodes.sort();
            nodes.dedup();
            return Err(LayoutError::InfeasibleConstraints { nodes, rounds });
        }
    }

    let shift = graph
        .origin()
        .map(|origin| values[origin.index()])
        .unwrap_or(0.0);

    let mut graph_values = Vec::new();
    let mut derived = Vec::new();
    for (position, kind) in arena.kinds() {
        match kind {
            PositionKind::Graph(node) => {
                let value = values.get(node.index()).copied().ok_or_else(|| {
                    LayoutError::Internal(format!(
                        "{} refers to a node outside the constraint graph",
                        arena.describe(position)
                    ))
                })?;
                graph_values.push((position, value - shift));
            }
            PositionKind::Fixed => {}
            _ => derived.push(position),
        }
    }
    for (position, value) in graph_values {
        arena.assign(position, value)?;
    }

    for position in derived {
        let value = evaluate(arena, position)?;
        arena.assign(position, value)?;
    }

    let resolution = Resolution {
        rounds,
        nodes: node_count,
        edges: edges.len(),
    };
    debug!(
        rounds = resolution.rounds,
        nodes = resolution.nodes,
        edges = resolution.edges,
        shift;
        "Constraint graph resolved"
    );
    Ok(resolution)
}

/// Evaluates a derived position from inputs that must already be resolved.
fn evaluate(arena: &PositionArena, position: Position) -> Result<f32, LayoutError> {
    let kind = arena
        .kind(position)
        .ok_or_else(|| LayoutError::Internal(format!("{position:?} is missing from the arena")))?;

    match kind {
        PositionKind::Offset { base, delta } => Ok(arena.current_value(*base)? + delta),
        PositionKind::Max(inputs) => inputs.iter().try_fold(f32::NEG_INFINITY, |acc, input| {
            Ok(acc.max(arena.current_value(*input)?))
        }),
        PositionKind::Min(inputs) => inputs.iter().try_fold(f32::INFINITY, |acc, input| {
            Ok(acc.min(arena.current_value(*input)?))
        }),
        PositionKind::Graph(_) | PositionKind::Fixed => arena.current_value(position),
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::layout::constraint::Anchor;

    fn anchors(graph: &mut ConstraintGraph, arena: &mut PositionArena, labels: &[&str]) -> Vec<Anchor> {
        labels
            .iter()
            .map(|label| graph.add_anchor(arena, label))
            .collect()
    }

    fn value(arena: &PositionArena, anchor: Anchor) -> f32 {
        arena.current_value(anchor.position()).unwrap()
    }

    #[test]
    fn test_chain_sums_gaps() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let nodes = anchors(&mut graph, &mut arena, &["a", "b", "c"]);
        graph.set_origin(nodes[0]);
        graph.ensure_gap(nodes[0], nodes[1], 10.0).unwrap();
        graph.ensure_gap(nodes[1], nodes[2], 15.0).unwrap();

        resolve(&graph, &mut arena).unwrap();

        assert_approx_eq!(f32, value(&arena, nodes[0]), 0.0);
        assert_approx_eq!(f32, value(&arena, nodes[1]), 10.0);
        assert_approx_eq!(f32, value(&arena, nodes[2]), 25.0);
    }

    #[test]
    fn test_longest_path_wins() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let nodes = anchors(&mut graph, &mut arena, &["a", "b", "c"]);
        graph.set_origin(nodes[0]);
        graph.ensure_gap(nodes[0], nodes[2], 12.0).unwrap();
        graph.ensure_gap(nodes[0], nodes[1], 10.0).unwrap();
        graph.ensure_gap(nodes[1], nodes[2], 10.0).unwrap();

        resolve(&graph, &mut arena).unwrap();

        assert_approx_eq!(f32, value(&arena, nodes[2]), 20.0);
    }

    #[test]
    fn test_origin_is_pinned_to_zero() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let nodes = anchors(&mut graph, &mut arena, &["left", "origin", "right"]);
        graph.set_origin(nodes[1]);
        graph.ensure_gap(nodes[0], nodes[1], 40.0).unwrap();
        graph.ensure_gap(nodes[1], nodes[2], 5.0).unwrap();

        resolve(&graph, &mut arena).unwrap();

        assert_approx_eq!(f32, value(&arena, nodes[0]), -40.0);
        assert_approx_eq!(f32, value(&arena, nodes[1]), 0.0);
        assert_approx_eq!(f32, value(&arena, nodes[2]), 5.0);
    }

    #[test]
    fn test_positive_cycle_is_infeasible() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let nodes = anchors(&mut graph, &mut arena, &["a", "b"]);
        graph.ensure_gap(nodes[0], nodes[1], 5.0).unwrap();
        graph.ensure_gap(nodes[1], nodes[0], 5.0).unwrap();

        let err = resolve(&graph, &mut arena).unwrap_err();
        match err {
            LayoutError::InfeasibleConstraints { nodes, rounds } => {
                assert_eq!(nodes, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(rounds, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_weight_cycle_is_feasible() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let nodes = anchors(&mut graph, &mut arena, &["a", "b"]);
        graph.ensure_gap(nodes[0], nodes[1], 0.0).unwrap();
        graph.ensure_gap(nodes[1], nodes[0], 0.0).unwrap();

        let resolution = resolve(&graph, &mut arena).unwrap();
        assert_eq!(resolution.rounds(), 1);
        assert_approx_eq!(f32, value(&arena, nodes[0]), value(&arena, nodes[1]));
    }

    #[test]
    fn test_derived_positions_follow_graph() {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let nodes = anchors(&mut graph, &mut arena, &["a", "b"]);
        graph.set_origin(nodes[0]);
        graph.ensure_gap(nodes[0], nodes[1], 30.0).unwrap();

        let shifted = arena.add_fixed(nodes[0].position(), -8.0);
        let fixed = arena.fixed(100.0);
        let max = arena.max_of(&[nodes[1].position(), shifted]).unwrap();
        let min = arena.min_of(&[shifted, fixed]).unwrap();
        let nested = arena.add_fixed(max, 2.0);

        resolve(&graph, &mut arena).unwrap();

        assert_approx_eq!(f32, arena.current_value(shifted).unwrap(), -8.0);
        assert_approx_eq!(f32, arena.current_value(max).unwrap(), 30.0);
        assert_approx_eq!(f32, arena.current_value(min).unwrap(), -8.0);
        assert_approx_eq!(f32, arena.current_value(nested).unwrap(), 32.0);
        assert_approx_eq!(f32, arena.current_value(fixed).unwrap(), 100.0);
    }

    #[test]
    fn test_empty_graph_resolves() {
        let mut arena = PositionArena::new();
        let graph = ConstraintGraph::new();
        let resolution = resolve(&graph, &mut arena).unwrap();
        assert_eq!(resolution.rounds(), 1);
        assert_eq!(resolution.nodes(), 0);
        assert_eq!(resolution.edges(), 0);
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        /// Random forward edges `(from, to, gap)` with `from < to`, which can
        /// never form a cycle.
        fn forward_edges(nodes: usize) -> impl Strategy<Value = Vec<(usize, usize, f32)>> {
            prop::collection::vec(
                (0..nodes, 0..nodes, 0.0f32..200.0).prop_filter_map(
                    "edge must go forward",
                    |(a, b, gap)| (a < b).then_some((a, b, gap)),
                ),
                0..40,
            )
        }

        fn build(nodes: usize, edges: &[(usize, usize, f32)]) -> (ConstraintGraph, PositionArena, Vec<Anchor>) {
            let mut arena = PositionArena::new();
            let mut graph = ConstraintGraph::new();
            let labels: Vec<String> = (0..nodes).map(|idx| format!("n{idx}")).collect();
            let anchors: Vec<Anchor> = labels
                .iter()
                .map(|label| graph.add_anchor(&mut arena, label))
                .collect();
            graph.set_origin(anchors[0]);
            for &(from, to, gap) in edges {
                graph.ensure_gap(anchors[from], anchors[to], gap).unwrap();
            }
            (graph, arena, anchors)
        }

        fn check_every_constraint_satisfied(nodes: usize, edges: Vec<(usize, usize, f32)>) {
            let (graph, mut arena, anchors) = build(nodes, &edges);
            resolve(&graph, &mut arena).unwrap();

            for (from, to, gap) in edges {
                let from = arena.current_value(anchors[from].position()).unwrap();
                let to = arena.current_value(anchors[to].position()).unwrap();
                assert!(to - from >= gap - 1e-3, "{to} - {from} < {gap}");
            }
            assert_eq!(arena.current_value(anchors[0].position()).unwrap(), 0.0);
        }

        fn check_resolution_is_deterministic(nodes: usize, edges: Vec<(usize, usize, f32)>) {
            let (graph, mut first, anchors) = build(nodes, &edges);
            let (_, mut second, _) = build(nodes, &edges);
            resolve(&graph, &mut first).unwrap();
            resolve(&graph, &mut second).unwrap();

            for anchor in anchors {
                assert_eq!(
                    first.current_value(anchor.position()).unwrap().to_bits(),
                    second.current_value(anchor.position()).unwrap().to_bits()
                );
            }
        }

        fn check_looser_duplicate_changes_nothing(
            nodes: usize,
            edges: Vec<(usize, usize, f32)>,
            shrink: f32,
        ) {
            let (graph, mut baseline, anchors) = build(nodes, &edges);
            resolve(&graph, &mut baseline).unwrap();

            let mut duplicated = edges.clone();
            duplicated.extend(
                edges
                    .iter()
                    .map(|&(from, to, gap)| (from, to, (gap - shrink).max(0.0))),
            );
            let (graph, mut relaxed, _) = build(nodes, &duplicated);
            resolve(&graph, &mut relaxed).unwrap();

            for anchor in anchors {
                assert_eq!(
                    baseline.current_value(anchor.position()).unwrap(),
                    relaxed.current_value(anchor.position()).unwrap()
                );
            }
        }

        proptest! {
            #[test]
            fn every_constraint_satisfied(edges in forward_edges(8)) {
                check_every_constraint_satisfied(8, edges);
            }

            #[test]
            fn resolution_is_deterministic(edges in forward_edges(6)) {
                check_resolution_is_deterministic(6, edges);
            }

            #[test]
            fn looser_duplicate_changes_nothing(edges in forward_edges(6), shrink in 0.0f32..50.0) {
                check_looser_duplicate_changes_nothing(6, edges, shrink);
            }
        }
    }
}
