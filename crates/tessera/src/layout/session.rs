//! One layout run over one diagram.
//!
//! [`LayoutSession`] owns all mutable state of a run: the constraint graph,
//! the position arena, the lifeline registry and the per-participant
//! activation depth. Tiles receive the session explicitly when they are
//! constructed; nothing is shared between sessions.
//!
//! Phases run strictly in order: lifelines and tiles are built, tiles declare
//! constraints, the vertical pass assigns Y coordinates, the constraint graph
//! is resolved, and finally activations and the resolved snapshot are
//! derived.

use std::collections::HashMap;

use log::{debug, info};

use tessera_core::{
    geometry::Size,
    identifier::Id,
    text::{TextMeasure, TextStyle},
};

use crate::{
    config::LayoutConfig,
    error::LayoutError,
    event::{Diagram, SequenceEvent},
    layout::{
        activation::collect_activations,
        constraint::{Anchor, ConstraintGraph},
        lifeline::{LifelineAnchors, Lifelines},
        position::PositionArena,
        resolved::ResolvedLayout,
        resolver::resolve,
        stacker,
        tile::{
            DelayTile, DividerTile, FragmentBuilder, LayoutTile, LifeEventKind, LifeEventTile,
            MessageTile, NoteOnMessageTile, NoteTile, SelfMessageTile, SpacerTile, Tile,
            WrappedMessage,
        },
    },
};

/// State of a single layout run.
pub struct LayoutSession<'a> {
    config: &'a LayoutConfig,
    measure: &'a dyn TextMeasure,
    graph: ConstraintGraph,
    positions: PositionArena,
    lifelines: Lifelines,
    frame_left: Anchor,
    frame_right: Anchor,
    activation_depth: HashMap<Id, u32>,
}

impl<'a> LayoutSession<'a> {
    pub fn new(config: &'a LayoutConfig, measure: &'a dyn TextMeasure) -> Self {
        let mut graph = ConstraintGraph::new();
        let mut positions = PositionArena::new();
        let frame_left = graph.add_anchor(&mut positions, "frame.left");
        let frame_right = graph.add_anchor(&mut positions, "frame.right");

        Self {
            config,
            measure,
            graph,
            positions,
            lifelines: Lifelines::new(config.participant_spacing(), frame_left, frame_right),
            frame_left,
            frame_right,
            activation_depth: HashMap::new(),
        }
    }

    pub fn config(&self) -> &'a LayoutConfig {
        self.config
    }

    pub fn positions(&mut self) -> &mut PositionArena {
        &mut self.positions
    }

    /// Left and right anchors that enclose every lifeline.
    pub fn frame(&self) -> (Anchor, Anchor) {
        (self.frame_left, self.frame_right)
    }

    /// Measures a label in the label text style, padding included.
    pub fn measure_label(&self, text: &str) -> Result<Size, LayoutError> {
        Ok(self.measure.measure_block(text, self.config.text())?)
    }

    /// Measures text in `style` without the style's padding.
    pub fn measure_text(&self, text: &str, style: &TextStyle) -> Result<Size, LayoutError> {
        Ok(self.measure.measure(text, style)?)
    }

    /// Adds a declared participant.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateParticipant`] if `id` already has a
    /// lifeline.
    pub fn declare(&mut self, id: Id, display: &str) -> Result<LifelineAnchors, LayoutError> {
        if self.lifelines.contains(id) {
            return Err(LayoutError::DuplicateParticipant(id));
        }
        self.register(id, display)
    }

    /// Returns the lifeline of `id`, creating it on first reference.
    pub fn lifeline(&mut self, id: Id) -> Result<LifelineAnchors, LayoutError> {
        match self.lifelines.get(id) {
            Some(lifeline) => Ok(lifeline.anchors()),
            None => self.register(id, &id.to_string()),
        }
    }

    fn register(&mut self, id: Id, display: &str) -> Result<LifelineAnchors, LayoutError> {
        let head = self
            .measure_label(display)?
            .add_padding(self.config.head_padding());
        self.lifelines
            .register(&mut self.graph, &mut self.positions, id, display, head)
    }

    /// Opens an activation on `id` and returns its nesting level.
    pub fn open_activation(&mut self, id: Id) -> u32 {
        let depth = self.activation_depth.entry(id).or_insert(0);
        let level = *depth;
        *depth += 1;
        level
    }

    /// Closes the innermost activation on `id`, if any.
    pub fn close_activation(&mut self, id: Id) {
        if let Some(depth) = self.activation_depth.get_mut(&id) {
            *depth = depth.saturating_sub(1);
        }
    }

    /// How far the innermost open activation bar on `id` reaches right of
    /// the lifeline center. Zero when nothing is open.
    pub fn activation_reach(&self, id: Id) -> f32 {
        match self.activation_depth.get(&id).copied().unwrap_or(0) {
            0 => 0.0,
            depth => {
                self.config.activation_width() / 2.0
                    + (depth - 1) as f32 * self.config.activation_nesting_offset()
            }
        }
    }

    /// Forgets every open activation on `id`.
    pub fn clear_activations(&mut self, id: Id) {
        self.activation_depth.remove(&id);
    }

    /// Hands the graph and arena to unit tests that drive phases by hand.
    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (ConstraintGraph, PositionArena) {
        (self.graph, self.positions)
    }

    /// Runs every phase and returns the resolved layout.
    pub fn run(mut self, diagram: &Diagram) -> Result<ResolvedLayout, LayoutError> {
        for participant in diagram.participants() {
            self.declare(participant.id(), participant.display())?;
        }

        let mut tiles = self.build_tiles(diagram.events())?;
        for tile in &tiles {
            tile.add_constraints(&mut self.graph)?;
        }
        debug!(
            tiles = tiles.len(),
            lifelines = self.lifelines.len(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count();
            "Constraints declared"
        );

        let head_height = self
            .lifelines
            .iter()
            .map(|lifeline| lifeline.head().height())
            .fold(0.0, f32::max);
        let bottom = stacker::stack(&mut tiles, head_height + self.config.row_padding());

        let resolution = resolve(&self.graph, &mut self.positions)?;
        info!(
            rounds = resolution.rounds(),
            nodes = resolution.nodes(),
            edges = resolution.edges();
            "Horizontal positions resolved"
        );

        let activations = collect_activations(
            &tiles,
            &self.lifelines,
            &self.positions,
            self.config,
            bottom,
        )?;

        ResolvedLayout::build(
            self.config.clone(),
            self.lifelines,
            self.positions,
            tiles,
            activations,
            head_height,
            bottom,
        )
    }

    /// Turns events into tiles, nesting fragment content inside its fragment.
    fn build_tiles(&mut self, events: &[SequenceEvent]) -> Result<Vec<Tile>, LayoutError> {
        let mut root = Vec::new();
        let mut open: Vec<FragmentBuilder> = Vec::new();

        for event in events {
            match event {
                SequenceEvent::FragmentStart { operator, guard } => {
                    open.push(FragmentBuilder::new(self, operator, guard.as_deref())?);
                }
                SequenceEvent::FragmentElse { guard } => {
                    let fragment = open.last_mut().ok_or_else(|| {
                        LayoutError::UnbalancedFragment(
                            "else section outside of any fragment".to_string(),
                        )
                    })?;
                    fragment.start_section(self, guard.as_deref())?;
                }
                SequenceEvent::FragmentEnd => {
                    let fragment = open.pop().ok_or_else(|| {
                        LayoutError::UnbalancedFragment(
                            "fragment end without a matching start".to_string(),
                        )
                    })?;
                    let tile = Tile::Fragment(fragment.finish(self)?);
                    match open.last_mut() {
                        Some(parent) => parent.push(tile),
                        None => root.push(tile),
                    }
                }
                other => {
                    let tile = self.tile_for(other)?;
                    match open.last_mut() {
                        Some(parent) => parent.push(tile),
                        None => root.push(tile),
                    }
                }
            }
        }

        if let Some(fragment) = open.last() {
            return Err(LayoutError::UnbalancedFragment(format!(
                "{} fragment left open ({} in total)",
                fragment.operator(),
                open.len()
            )));
        }

        Ok(root)
    }

    fn tile_for(&mut self, event: &SequenceEvent) -> Result<Tile, LayoutError> {
        let tile = match event {
            SequenceEvent::Message {
                from,
                to,
                label,
                style,
                note,
            } => {
                let message = if from == to {
                    WrappedMessage::SelfMessage(SelfMessageTile::new(
                        self,
                        *from,
                        label.as_deref(),
                        *style,
                    )?)
                } else {
                    WrappedMessage::Message(MessageTile::new(
                        self,
                        *from,
                        *to,
                        label.as_deref(),
                        *style,
                    )?)
                };
                match note {
                    Some(note) => Tile::NoteOnMessage(NoteOnMessageTile::new(
                        self,
                        message,
                        note.side(),
                        note.text(),
                    )?),
                    None => message.into_tile(),
                }
            }
            SequenceEvent::Note { placement, text } => {
                Tile::Note(NoteTile::new(self, *placement, text)?)
            }
            SequenceEvent::Activate(id) => {
                Tile::LifeEvent(LifeEventTile::new(self, LifeEventKind::Activate, *id)?)
            }
            SequenceEvent::Deactivate(id) => {
                Tile::LifeEvent(LifeEventTile::new(self, LifeEventKind::Deactivate, *id)?)
            }
            SequenceEvent::Destroy(id) => {
                Tile::LifeEvent(LifeEventTile::new(self, LifeEventKind::Destroy, *id)?)
            }
            SequenceEvent::Divider(label) => {
                Tile::Divider(DividerTile::new(self, label.as_deref())?)
            }
            SequenceEvent::Delay(label) => Tile::Delay(DelayTile::new(self, label.as_deref())?),
            SequenceEvent::Spacer(height) => Tile::Spacer(SpacerTile::new(self, *height)),
            SequenceEvent::FragmentStart { .. }
            | SequenceEvent::FragmentElse { .. }
            | SequenceEvent::FragmentEnd => {
                return Err(LayoutError::Internal(
                    "fragment markers are not tiles".to_string(),
                ));
            }
        };
        Ok(tile)
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::text::MonospaceMeasure;

    use super::*;
    use crate::event::NotePlacement;

    fn session_tiles(events: Vec<SequenceEvent>) -> Result<Vec<Tile>, LayoutError> {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        session.build_tiles(&events)
    }

    #[test]
    fn test_undeclared_participants_registered_on_first_reference() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        session.declare(Id::new("b"), "Bob").unwrap();
        session
            .build_tiles(&[
                SequenceEvent::message("c", "a", None),
                SequenceEvent::message("a", "b", None),
            ])
            .unwrap();

        let order: Vec<usize> = ["b", "c", "a"]
            .iter()
            .map(|name| session.lifeline(Id::new(name)).unwrap().index())
            .collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_duplicate_declaration_is_rejected() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        session.declare(Id::new("a"), "A").unwrap();
        assert!(matches!(
            session.declare(Id::new("a"), "A again"),
            Err(LayoutError::DuplicateParticipant(_))
        ));
    }

    #[test]
    fn test_message_kinds() {
        let tiles = session_tiles(vec![
            SequenceEvent::message("a", "b", Some("call")),
            SequenceEvent::message("a", "a", Some("self")),
            SequenceEvent::message("a", "b", None).with_note(crate::event::NoteSide::Right, "n"),
            SequenceEvent::note(NotePlacement::Over(Id::new("a")), "over"),
        ])
        .unwrap();

        let kinds: Vec<_> = tiles.iter().map(|tile| tile.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                crate::layout::TileKind::Message,
                crate::layout::TileKind::SelfMessage,
                crate::layout::TileKind::NoteOnMessage,
                crate::layout::TileKind::Note,
            ]
        );
    }

    #[test]
    fn test_fragments_nest_their_content() {
        let tiles = session_tiles(vec![
            SequenceEvent::FragmentStart {
                operator: "alt".to_string(),
                guard: Some("ok".to_string()),
            },
            SequenceEvent::message("a", "b", None),
            SequenceEvent::FragmentStart {
                operator: "loop".to_string(),
                guard: None,
            },
            SequenceEvent::message("b", "a", None),
            SequenceEvent::FragmentEnd,
            SequenceEvent::FragmentElse {
                guard: Some("error".to_string()),
            },
            SequenceEvent::message("a", "a", None),
            SequenceEvent::FragmentEnd,
        ])
        .unwrap();

        assert_eq!(tiles.len(), 1);
        assert_eq!(Tile::flatten(&tiles).len(), 5);
        match &tiles[0] {
            Tile::Fragment(fragment) => assert_eq!(fragment.sections().len(), 2),
            other => panic!("unexpected tile: {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_fragments_are_rejected() {
        let unclosed = session_tiles(vec![SequenceEvent::FragmentStart {
            operator: "opt".to_string(),
            guard: None,
        }]);
        assert!(matches!(unclosed, Err(LayoutError::UnbalancedFragment(_))));

        let stray_end = session_tiles(vec![SequenceEvent::FragmentEnd]);
        assert!(matches!(stray_end, Err(LayoutError::UnbalancedFragment(_))));

        let stray_else = session_tiles(vec![SequenceEvent::FragmentElse { guard: None }]);
        assert!(matches!(stray_else, Err(LayoutError::UnbalancedFragment(_))));
    }

    #[test]
    fn test_activation_depth_tracking() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        let a = Id::new("a");

        assert_eq!(session.open_activation(a), 0);
        assert_eq!(session.open_activation(a), 1);
        session.close_activation(a);
        assert_eq!(session.open_activation(a), 1);
        session.clear_activations(a);
        assert_eq!(session.open_activation(a), 0);
    }
}
