//! Tiles: the rows of a sequence diagram.
//!
//! Every event of the diagram body becomes one [`Tile`]. A tile takes part in
//! all phases of a layout session:
//!
//! 1. **Construction** - measures its text and creates the positions it needs
//! 2. **Constraints** - declares minimum gaps between lifeline anchors
//! 3. **Vertical pass** - receives its top Y exactly once, reports its height
//! 4. **Drawing** - emits primitives once every position is resolved
//!
//! The set of tiles is closed, so dispatch goes through the [`Tile`] enum;
//! the per-variant behavior lives behind the [`LayoutTile`] trait.

mod divider;
mod fragment;
mod life_event;
mod message;
mod note;
mod note_on_message;
mod self_message;
mod spacer;

pub use divider::{DelayTile, DividerTile};
pub use fragment::{FragmentBuilder, FragmentSection, FragmentTile};
pub use life_event::{LifeEventKind, LifeEventTile};
pub use message::MessageTile;
pub use note::NoteTile;
pub use note_on_message::{NoteOnMessageTile, WrappedMessage};
pub use self_message::SelfMessageTile;
pub use spacer::SpacerTile;

use tessera_core::{
    draw::{DrawSink, LineStyle, VisualKind},
    geometry::Point,
    identifier::Id,
};

use crate::{
    config::LayoutConfig,
    error::LayoutError,
    event::ArrowStyle,
    layout::{
        activation::{ActivationBox, message_endpoint_x},
        constraint::ConstraintGraph,
        lifeline::LifelineAnchors,
        position::{Position, PositionArena},
    },
};

/// Discriminant of a [`Tile`], exposed in resolved layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Message,
    SelfMessage,
    Note,
    NoteOnMessage,
    LifeEvent,
    Divider,
    Delay,
    Spacer,
    Fragment,
}

/// Behavior shared by every tile variant.
pub trait LayoutTile {
    fn kind(&self) -> TileKind;

    /// Declares the horizontal constraints this tile needs.
    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError>;

    /// Height of the row. Independent of the tile's Y.
    fn preferred_height(&self) -> f32;

    /// Assigns the top Y of the row. Called exactly once per tile.
    fn callback_y(&mut self, y: f32);

    /// The top Y, once the vertical pass has reached this tile.
    fn y(&self) -> Option<f32>;

    fn min_x(&self) -> Position;

    fn max_x(&self) -> Position;

    /// Emits primitives. Every position this tile uses must be resolved.
    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError>;
}

/// One row of the diagram.
#[derive(Debug, Clone)]
pub enum Tile {
    Message(MessageTile),
    SelfMessage(SelfMessageTile),
    Note(NoteTile),
    NoteOnMessage(NoteOnMessageTile),
    LifeEvent(LifeEventTile),
    Divider(DividerTile),
    Delay(DelayTile),
    Spacer(SpacerTile),
    Fragment(FragmentTile),
}

impl Tile {
    fn inner(&self) -> &dyn LayoutTile {
        match self {
            Self::Message(tile) => tile,
            Self::SelfMessage(tile) => tile,
            Self::Note(tile) => tile,
            Self::NoteOnMessage(tile) => tile,
            Self::LifeEvent(tile) => tile,
            Self::Divider(tile) => tile,
            Self::Delay(tile) => tile,
            Self::Spacer(tile) => tile,
            Self::Fragment(tile) => tile,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn LayoutTile {
        match self {
            Self::Message(tile) => tile,
            Self::SelfMessage(tile) => tile,
            Self::Note(tile) => tile,
            Self::NoteOnMessage(tile) => tile,
            Self::LifeEvent(tile) => tile,
            Self::Divider(tile) => tile,
            Self::Delay(tile) => tile,
            Self::Spacer(tile) => tile,
            Self::Fragment(tile) => tile,
        }
    }

    /// Depth-first list of `tiles` and every tile nested inside them, in
    /// vertical order.
    pub fn flatten(tiles: &[Tile]) -> Vec<&Tile> {
        let mut flat = Vec::new();
        for tile in tiles {
            tile.collect_into(&mut flat);
        }
        flat
    }

    fn collect_into<'a>(&'a self, flat: &mut Vec<&'a Tile>) {
        flat.push(self);
        if let Self::Fragment(fragment) = self {
            for section in fragment.sections() {
                for child in section.tiles() {
                    child.collect_into(flat);
                }
            }
        }
    }

    /// Arrow Y and both ends for tiles that draw a message arrow.
    pub fn arrow(&self) -> Option<(f32, [Id; 2])> {
        match self {
            Self::Message(tile) => tile.arrow(),
            Self::SelfMessage(tile) => tile.arrow(),
            Self::NoteOnMessage(tile) => tile.message().arrow(),
            _ => None,
        }
    }

    /// Kind, participant and Y of a life event tile.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Internal`] if the tile has not been placed yet.
    pub fn life_event(&self) -> Result<Option<(LifeEventKind, Id, f32)>, LayoutError> {
        match self {
            Self::LifeEvent(tile) => {
                let y = placed_y(tile.y(), TileKind::LifeEvent)?;
                Ok(Some((tile.event(), tile.participant(), y)))
            }
            _ => Ok(None),
        }
    }
}

impl LayoutTile for Tile {
    fn kind(&self) -> TileKind {
        self.inner().kind()
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        self.inner().add_constraints(graph)
    }

    fn preferred_height(&self) -> f32 {
        self.inner().preferred_height()
    }

    fn callback_y(&mut self, y: f32) {
        self.inner_mut().callback_y(y);
    }

    fn y(&self) -> Option<f32> {
        self.inner().y()
    }

    fn min_x(&self) -> Position {
        self.inner().min_x()
    }

    fn max_x(&self) -> Position {
        self.inner().max_x()
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        self.inner().draw(ctx, sink)
    }
}

/// Everything a tile can read while drawing.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    positions: &'a PositionArena,
    activations: &'a [ActivationBox],
    config: &'a LayoutConfig,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        positions: &'a PositionArena,
        activations: &'a [ActivationBox],
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            positions,
            activations,
            config,
        }
    }

    pub fn x(&self, position: Position) -> Result<f32, LayoutError> {
        self.positions.current_value(position)
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    /// Where a message at `y` touches `lifeline` when heading for `target_x`.
    pub fn endpoint_x(
        &self,
        lifeline: LifelineAnchors,
        y: f32,
        target_x: f32,
    ) -> Result<f32, LayoutError> {
        let lifeline_x = self.x(lifeline.center().position())?;
        Ok(message_endpoint_x(
            self.activations,
            lifeline.id(),
            lifeline_x,
            y,
            target_x,
        ))
    }
}

/// Reads a tile's Y, failing if the vertical pass has not placed it.
pub(crate) fn placed_y(y: Option<f32>, kind: TileKind) -> Result<f32, LayoutError> {
    y.ok_or_else(|| LayoutError::Internal(format!("{kind:?} tile used before the vertical pass")))
}

/// Line style of a message shaft.
pub(crate) fn shaft_style(style: ArrowStyle) -> LineStyle {
    match style {
        ArrowStyle::Return => LineStyle::Dashed,
        ArrowStyle::Sync | ArrowStyle::Async => LineStyle::Solid,
    }
}

/// Draws an arrow head whose tip is at `tip`, pointing right for a positive
/// `direction` and left otherwise.
pub(crate) fn draw_arrow_head(
    sink: &mut dyn DrawSink,
    kind: VisualKind,
    tip: Point,
    direction: f32,
    size: f32,
    style: ArrowStyle,
) {
    let back = if direction >= 0.0 { -size } else { size };
    let upper = Point::new(tip.x() + back, tip.y() - size / 2.0);
    let lower = Point::new(tip.x() + back, tip.y() + size / 2.0);

    match style {
        ArrowStyle::Sync => sink.polygon(kind, &[tip, upper, lower], true),
        ArrowStyle::Async | ArrowStyle::Return => {
            sink.polyline(kind, &[upper, tip, lower], LineStyle::Solid)
        }
    }
}
