use tessera_core::{
    draw::DrawSink,
    geometry::{Bounds, Size},
    identifier::Id,
};

use crate::{
    error::LayoutError,
    event::NoteSide,
    layout::{
        constraint::ConstraintGraph,
        lifeline::LifelineAnchors,
        position::Position,
        session::LayoutSession,
        tile::{
            DrawContext, LayoutTile, MessageTile, SelfMessageTile, Tile, TileKind,
            note::{draw_note, note_size},
            placed_y,
        },
    },
};

/// A message that can carry an attached note.
#[derive(Debug, Clone)]
pub enum WrappedMessage {
    Message(MessageTile),
    SelfMessage(SelfMessageTile),
}

impl WrappedMessage {
    fn inner(&self) -> &dyn LayoutTile {
        match self {
            Self::Message(tile) => tile,
            Self::SelfMessage(tile) => tile,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn LayoutTile {
        match self {
            Self::Message(tile) => tile,
            Self::SelfMessage(tile) => tile,
        }
    }

    pub(crate) fn into_tile(self) -> Tile {
        match self {
            Self::Message(tile) => Tile::Message(tile),
            Self::SelfMessage(tile) => Tile::SelfMessage(tile),
        }
    }

    pub(crate) fn arrow(&self) -> Option<(f32, [Id; 2])> {
        match self {
            Self::Message(tile) => tile.arrow(),
            Self::SelfMessage(tile) => tile.arrow(),
        }
    }

    /// Leftmost and rightmost lifeline the message touches.
    fn outer_lifelines(&self) -> (LifelineAnchors, LifelineAnchors) {
        match self {
            Self::Message(tile) => tile.span(),
            Self::SelfMessage(tile) => (tile.lifeline(), tile.lifeline()),
        }
    }

    /// How far the message reaches right of its rightmost lifeline center.
    fn right_extent(&self) -> f32 {
        match self {
            Self::Message(_) => 0.0,
            Self::SelfMessage(tile) => tile.loop_extent(),
        }
    }
}

/// A message and a note laid out on the same row.
///
/// The message keeps its own constraints and arrow position; the note is
/// placed beside the message's outermost lifeline on the requested side.
#[derive(Debug, Clone)]
pub struct NoteOnMessageTile {
    message: WrappedMessage,
    side: NoteSide,
    text: String,
    size: Size,
    gap: f32,
    row_padding: f32,
    note_min: Position,
    note_max: Position,
    min_x: Position,
    max_x: Position,
    y: Option<f32>,
}

impl NoteOnMessageTile {
    pub fn new(
        session: &mut LayoutSession<'_>,
        message: WrappedMessage,
        side: NoteSide,
        text: &str,
    ) -> Result<Self, LayoutError> {
        let size = note_size(session, text)?;
        let config = session.config();
        let gap = config.note_gap();
        let width = size.width();
        let (leftmost, _) = message.outer_lifelines();
        let message_min = message.inner().min_x();
        let message_max = message.inner().max_x();

        let positions = session.positions();
        let (note_min, note_max) = match side {
            NoteSide::Left => {
                let center = leftmost.center().position();
                (
                    positions.add_fixed(center, -(gap + width)),
                    positions.add_fixed(center, -gap),
                )
            }
            NoteSide::Right => {
                let note_min = positions.add_fixed(message_max, gap);
                (note_min, positions.add_fixed(note_min, width))
            }
        };
        let min_x = positions
            .min_of(&[message_min, note_min])
            .unwrap_or(note_min);
        let max_x = positions
            .max_of(&[message_max, note_max])
            .unwrap_or(note_max);

        Ok(Self {
            message,
            side,
            text: text.to_string(),
            size,
            gap,
            row_padding: config.row_padding(),
            note_min,
            note_max,
            min_x,
            max_x,
            y: None,
        })
    }

    pub fn message(&self) -> &WrappedMessage {
        &self.message
    }

    pub fn side(&self) -> NoteSide {
        self.side
    }
}

impl LayoutTile for NoteOnMessageTile {
    fn kind(&self) -> TileKind {
        TileKind::NoteOnMessage
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        self.message.inner().add_constraints(graph)?;

        let (leftmost, rightmost) = self.message.outer_lifelines();
        let width = self.size.width();
        match self.side {
            NoteSide::Left => graph.ensure_gap(leftmost.left(), leftmost.center(), self.gap + width),
            NoteSide::Right => graph.ensure_gap(
                rightmost.center(),
                rightmost.right(),
                self.message.right_extent() + self.gap + width,
            ),
        }
    }

    fn preferred_height(&self) -> f32 {
        self.message
            .inner()
            .preferred_height()
            .max(self.size.height() + 2.0 * self.row_padding)
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "note on message placed twice");
        self.y = Some(y);
        self.message.inner_mut().callback_y(y);
    }

    fn y(&self) -> Option<f32> {
        self.y
    }

    fn min_x(&self) -> Position {
        self.min_x
    }

    fn max_x(&self) -> Position {
        self.max_x
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        let y = placed_y(self.y, TileKind::NoteOnMessage)?;
        self.message.inner().draw(ctx, sink)?;

        let top = y + self.row_padding;
        let bounds = Bounds::from_spans(
            (ctx.x(self.note_min)?, ctx.x(self.note_max)?),
            (top, top + self.size.height()),
        );
        draw_note(
            sink,
            bounds,
            &self.text,
            ctx.config().note_padding(),
            ctx.config().text(),
        );
        Ok(())
    }
}
