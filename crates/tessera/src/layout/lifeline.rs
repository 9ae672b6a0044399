//! Participant lifelines and their horizontal anchors.
//!
//! Each lifeline owns three graph anchors: its center line and a virtual left
//! and right edge. Anything that widens a lifeline locally (its head, a
//! self-message loop, a note beside it, nested activations) pushes a virtual
//! edge instead of the center, and the spacing between neighbours is declared
//! from one lifeline's right edge to the next one's left edge.

use indexmap::IndexMap;
use log::debug;

use tessera_core::{geometry::Size, identifier::Id};

use crate::{
    error::LayoutError,
    layout::{
        constraint::{Anchor, ConstraintGraph},
        position::PositionArena,
    },
};

/// The three anchors of a lifeline plus its place in the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifelineAnchors {
    id: Id,
    index: usize,
    left: Anchor,
    center: Anchor,
    right: Anchor,
}

impl LifelineAnchors {
    pub fn id(&self) -> Id {
        self.id
    }

    /// Left-to-right position among all lifelines, starting at zero.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn left(&self) -> Anchor {
        self.left
    }

    pub fn center(&self) -> Anchor {
        self.center
    }

    pub fn right(&self) -> Anchor {
        self.right
    }
}

/// A participant column.
#[derive(Debug, Clone)]
pub struct Lifeline {
    anchors: LifelineAnchors,
    display: String,
    head: Size,
}

impl Lifeline {
    pub fn anchors(&self) -> LifelineAnchors {
        self.anchors
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Size of the participant head, padding included.
    pub fn head(&self) -> Size {
        self.head
    }
}

/// Lifelines in left-to-right order.
#[derive(Debug, Clone)]
pub struct Lifelines {
    entries: IndexMap<Id, Lifeline>,
    spacing: f32,
    frame_left: Anchor,
    frame_right: Anchor,
}

impl Lifelines {
    /// Creates an empty registry. Every lifeline is kept between
    /// `frame_left` and `frame_right`.
    pub fn new(spacing: f32, frame_left: Anchor, frame_right: Anchor) -> Self {
        Self {
            entries: IndexMap::new(),
            spacing,
            frame_left,
            frame_right,
        }
    }

    pub fn get(&self, id: Id) -> Option<&Lifeline> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lifeline> {
        self.entries.values()
    }

    /// Appends a lifeline to the right of every existing one.
    ///
    /// Declares the head half-widths around the center, the spacing from the
    /// previous lifeline's right edge, and containment in the frame. The first
    /// lifeline's center becomes the graph origin.
    pub fn register(
        &mut self,
        graph: &mut ConstraintGraph,
        arena: &mut PositionArena,
        id: Id,
        display: &str,
        head: Size,
    ) -> Result<LifelineAnchors, LayoutError> {
        let name = id.to_string();
        let left = graph.add_anchor(arena, &format!("{name}.left"));
        let center = graph.add_anchor(arena, &format!("{name}.center"));
        let right = graph.add_anchor(arena, &format!("{name}.right"));

        let half_head = head.width() / 2.0;
        graph.ensure_gap(left, center, half_head)?;
        graph.ensure_gap(center, right, half_head)?;
        graph.ensure_gap(self.frame_left, left, 0.0)?;
        graph.ensure_gap(right, self.frame_right, 0.0)?;

        match self.entries.last() {
            Some((_, previous)) => {
                graph.ensure_gap(previous.anchors.right, left, self.spacing)?;
            }
            None => graph.set_origin(center),
        }

        let anchors = LifelineAnchors {
            id,
            index: self.entries.len(),
            left,
            center,
            right,
        };
        debug!(
            participant = name.as_str(),
            index = anchors.index,
            head_width = head.width();
            "Lifeline registered"
        );

        self.entries.insert(
            id,
            Lifeline {
                anchors,
                display: display.to_string(),
                head,
            },
        );
        Ok(anchors)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::layout::resolve;

    fn setup() -> (ConstraintGraph, PositionArena, Lifelines) {
        let mut arena = PositionArena::new();
        let mut graph = ConstraintGraph::new();
        let frame_left = graph.add_anchor(&mut arena, "frame.left");
        let frame_right = graph.add_anchor(&mut arena, "frame.right");
        (graph, arena, Lifelines::new(20.0, frame_left, frame_right))
    }

    #[test]
    fn test_registration_spaces_heads() {
        let (mut graph, mut arena, mut lifelines) = setup();
        let a = lifelines
            .register(&mut graph, &mut arena, Id::new("a"), "A", Size::new(60.0, 30.0))
            .unwrap();
        let b = lifelines
            .register(&mut graph, &mut arena, Id::new("b"), "B", Size::new(40.0, 30.0))
            .unwrap();

        resolve(&graph, &mut arena).unwrap();

        let x = |anchor: Anchor| arena.current_value(anchor.position()).unwrap();
        assert_approx_eq!(f32, x(a.center()), 0.0);
        assert_approx_eq!(f32, x(a.left()), -30.0);
        assert_approx_eq!(f32, x(a.right()), 30.0);
        // 30 (half of a) + 20 spacing + 20 (half of b)
        assert_approx_eq!(f32, x(b.center()), 70.0);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn test_frame_contains_lifelines() {
        let (mut graph, mut arena, mut lifelines) = setup();
        let frame_left = lifelines.frame_left;
        let frame_right = lifelines.frame_right;
        lifelines
            .register(&mut graph, &mut arena, Id::new("solo"), "Solo", Size::new(50.0, 30.0))
            .unwrap();

        resolve(&graph, &mut arena).unwrap();

        assert_approx_eq!(f32, arena.current_value(frame_left.position()).unwrap(), -25.0);
        assert_approx_eq!(f32, arena.current_value(frame_right.position()).unwrap(), 25.0);
    }

    #[test]
    fn test_lookup_keeps_order() {
        let (mut graph, mut arena, mut lifelines) = setup();
        for name in ["c", "a", "b"] {
            lifelines
                .register(&mut graph, &mut arena, Id::new(name), name, Size::default())
                .unwrap();
        }

        let order: Vec<String> = lifelines.iter().map(|l| l.display().to_string()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
        assert!(lifelines.contains(Id::new("a")));
        assert_eq!(lifelines.get(Id::new("b")).unwrap().anchors().index(), 2);
        assert_eq!(lifelines.len(), 3);
    }
}
