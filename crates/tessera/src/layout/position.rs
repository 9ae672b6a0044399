//! Lazily resolved horizontal coordinates.
//!
//! A [`Position`] is a small copyable handle into a [`PositionArena`]. Tiles
//! create and combine positions long before any coordinate is known; the
//! arena records how each derived position is computed and only evaluates it
//! after the constraint graph has been solved.
//!
//! Positions are appended, never removed, and a derived position can only be
//! built from positions that already exist. Creation order is therefore a
//! valid evaluation order.

use petgraph::graph::NodeIndex;

use crate::error::LayoutError;

/// Handle to a coordinate owned by a [`PositionArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(usize);

/// How a position obtains its value.
#[derive(Debug, Clone)]
pub(crate) enum PositionKind {
    /// Solved by the constraint graph.
    Graph(NodeIndex),
    /// Known at construction time.
    Fixed,
    Offset {
        base: Position,
        delta: f32,
    },
    Max(Vec<Position>),
    Min(Vec<Position>),
}

#[derive(Debug, Clone)]
struct Slot {
    kind: PositionKind,
    label: Option<String>,
    value: Option<f32>,
}

/// Owns every position of one layout session.
///
/// # Examples
///
/// ```
/// # use tessera::layout::PositionArena;
/// let mut arena = PositionArena::new();
/// let start = arena.fixed(10.0);
/// let end = arena.add_fixed(start, 5.0);
///
/// assert_eq!(arena.current_value(start).unwrap(), 10.0);
/// // Derived positions stay unresolved until the resolver runs.
/// assert!(arena.current_value(end).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PositionArena {
    slots: Vec<Slot>,
}

impl PositionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of positions created so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn push(&mut self, kind: PositionKind, label: Option<String>, value: Option<f32>) -> Position {
        self.slots.push(Slot { kind, label, value });
        Position(self.slots.len() - 1)
    }

    /// Creates a position whose value is already known.
    pub fn fixed(&mut self, value: f32) -> Position {
        self.push(PositionKind::Fixed, None, Some(value))
    }

    /// Creates a position that tracks a constraint graph node.
    pub(crate) fn graph(&mut self, node: NodeIndex, label: &str) -> Position {
        self.push(PositionKind::Graph(node), Some(label.to_string()), None)
    }

    /// Creates a position equal to `base` shifted by `delta`.
    ///
    /// The sum is evaluated when the arena is resolved, so `base` may still be
    /// unknown.
    pub fn add_fixed(&mut self, base: Position, delta: f32) -> Position {
        self.push(PositionKind::Offset { base, delta }, None, None)
    }

    /// Creates a position equal to the largest of `positions`.
    ///
    /// Returns `None` when `positions` is empty: the maximum of nothing has no
    /// value, and callers must decide what an empty extent means for them.
    pub fn max_of(&mut self, positions: &[Position]) -> Option<Position> {
        match positions {
            [] => None,
            [single] => Some(*single),
            _ => Some(self.push(PositionKind::Max(positions.to_vec()), None, None)),
        }
    }

    /// Creates a position equal to the smallest of `positions`.
    ///
    /// Returns `None` when `positions` is empty.
    pub fn min_of(&mut self, positions: &[Position]) -> Option<Position> {
        match positions {
            [] => None,
            [single] => Some(*single),
            _ => Some(self.push(PositionKind::Min(positions.to_vec()), None, None)),
        }
    }

    /// Returns the resolved value of `position`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnresolvedPosition`] if the position has not been
    /// resolved yet. Reading a position early is a phase-ordering defect.
    pub fn current_value(&self, position: Position) -> Result<f32, LayoutError> {
        self.slot(position)?
            .value
            .ok_or_else(|| LayoutError::UnresolvedPosition(self.describe(position)))
    }

    pub fn is_resolved(&self, position: Position) -> bool {
        self.slots
            .get(position.0)
            .is_some_and(|slot| slot.value.is_some())
    }

    /// A human-readable name for `position`, used in diagnostics.
    pub fn describe(&self, position: Position) -> String {
        match self.slots.get(position.0) {
            Some(Slot {
                label: Some(label), ..
            }) => label.clone(),
            Some(Slot { kind, .. }) => {
                let kind = match kind {
                    PositionKind::Graph(_) => "graph",
                    PositionKind::Fixed => "fixed",
                    PositionKind::Offset { .. } => "offset",
                    PositionKind::Max(_) => "max",
                    PositionKind::Min(_) => "min",
                };
                format!("{kind} position #{}", position.0)
            }
            None => format!("unknown position #{}", position.0),
        }
    }

    fn slot(&self, position: Position) -> Result<&Slot, LayoutError> {
        self.slots.get(position.0).ok_or_else(|| {
            LayoutError::Internal(format!(
                "position #{} does not belong to this arena",
                position.0
            ))
        })
    }

    pub(crate) fn kind(&self, position: Position) -> Option<&PositionKind> {
        self.slots.get(position.0).map(|slot| &slot.kind)
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = (Position, &PositionKind)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| (Position(idx), &slot.kind))
    }

    /// Stores the final value of `position`.
    ///
    /// A resolved position is immutable; assigning it twice is an internal
    /// error.
    pub(crate) fn assign(&mut self, position: Position, value: f32) -> Result<(), LayoutError> {
        let label = self.describe(position);
        let slot = self.slots.get_mut(position.0).ok_or_else(|| {
            LayoutError::Internal(format!(
                "position #{} does not belong to this arena",
                position.0
            ))
        })?;
        if slot.value.is_some() {
            return Err(LayoutError::Internal(format!("{label} was resolved twice")));
        }
        slot.value = Some(value);
        Ok(())
    }
}
