use tessera_core::{
    draw::{DrawSink, LineStyle, TextAnchor, VisualKind},
    geometry::{Bounds, Insets, Point, Size},
    text::TextStyle,
};

use crate::{
    error::LayoutError,
    event::NotePlacement,
    layout::{
        constraint::ConstraintGraph,
        lifeline::LifelineAnchors,
        position::Position,
        session::LayoutSession,
        tile::{DrawContext, LayoutTile, TileKind, placed_y},
    },
};

const CORNER_FOLD_SIZE: f32 = 10.0;

/// Outer size of a note holding `text`, including padding and the folded
/// corner.
pub(crate) fn note_size(session: &LayoutSession<'_>, text: &str) -> Result<Size, LayoutError> {
    let config = session.config();
    let padding = config.note_padding();
    let text_size = session.measure_text(text, config.text())?;
    Ok(text_size.add_padding(Insets::new(
        padding.top(),
        padding.right() + CORNER_FOLD_SIZE,
        padding.bottom(),
        padding.left(),
    )))
}

/// Draws a dog-eared note body with `text` inside `bounds`.
pub(crate) fn draw_note(
    sink: &mut dyn DrawSink,
    bounds: Bounds,
    text: &str,
    padding: Insets,
    style: &TextStyle,
) {
    let fold_x = bounds.max_x() - CORNER_FOLD_SIZE;
    let fold_y = bounds.min_y() + CORNER_FOLD_SIZE;

    sink.polygon(
        VisualKind::Note,
        &[
            Point::new(bounds.min_x(), bounds.min_y()),
            Point::new(fold_x, bounds.min_y()),
            Point::new(bounds.max_x(), fold_y),
            Point::new(bounds.max_x(), bounds.max_y()),
            Point::new(bounds.min_x(), bounds.max_y()),
        ],
        false,
    );
    sink.polyline(
        VisualKind::Note,
        &[
            Point::new(fold_x, bounds.min_y()),
            Point::new(fold_x, fold_y),
            Point::new(bounds.max_x(), fold_y),
        ],
        LineStyle::Solid,
    );

    let block = Bounds::from_spans(
        (bounds.min_x(), fold_x),
        (bounds.min_y(), bounds.max_y()),
    );
    sink.text(
        VisualKind::Note,
        block,
        text,
        TextAnchor::Start,
        &style.clone().with_padding(padding),
    );
}

/// Where a standalone note sits, with its lifelines resolved.
#[derive(Debug, Clone, Copy)]
enum Placement {
    LeftOf(LifelineAnchors),
    RightOf(LifelineAnchors),
    Over(LifelineAnchors),
    /// Lifelines in left-to-right order.
    Across(LifelineAnchors, LifelineAnchors),
}

/// A standalone note on its own row.
#[derive(Debug, Clone)]
pub struct NoteTile {
    placement: Placement,
    text: String,
    size: Size,
    gap: f32,
    overhang: f32,
    row_padding: f32,
    min_x: Position,
    max_x: Position,
    y: Option<f32>,
}

impl NoteTile {
    pub fn new(
        session: &mut LayoutSession<'_>,
        placement: NotePlacement,
        text: &str,
    ) -> Result<Self, LayoutError> {
        let placement = match placement {
            NotePlacement::LeftOf(id) => Placement::LeftOf(session.lifeline(id)?),
            NotePlacement::RightOf(id) => Placement::RightOf(session.lifeline(id)?),
            NotePlacement::Over(id) => Placement::Over(session.lifeline(id)?),
            NotePlacement::Across(first, second) if first == second => {
                Placement::Over(session.lifeline(first)?)
            }
            NotePlacement::Across(first, second) => {
                let first = session.lifeline(first)?;
                let second = session.lifeline(second)?;
                if first.index() < second.index() {
                    Placement::Across(first, second)
                } else {
                    Placement::Across(second, first)
                }
            }
        };

        let size = note_size(session, text)?;
        let config = session.config();
        let gap = config.note_gap();
        let overhang = config.note_overhang();
        let width = size.width();

        let positions = session.positions();
        let (min_x, max_x) = match placement {
            Placement::LeftOf(lifeline) => {
                let center = lifeline.center().position();
                (
                    positions.add_fixed(center, -(gap + width)),
                    positions.add_fixed(center, -gap),
                )
            }
            Placement::RightOf(lifeline) => {
                let center = lifeline.center().position();
                (
                    positions.add_fixed(center, gap),
                    positions.add_fixed(center, gap + width),
                )
            }
            Placement::Over(lifeline) => {
                let center = lifeline.center().position();
                (
                    positions.add_fixed(center, -width / 2.0),
                    positions.add_fixed(center, width / 2.0),
                )
            }
            Placement::Across(left, right) => {
                // At least as wide as the text, and reaching past both lifelines.
                let min_x = positions.add_fixed(left.center().position(), -overhang);
                let past_right = positions.add_fixed(right.center().position(), overhang);
                let text_right = positions.add_fixed(min_x, width);
                let max_x = positions
                    .max_of(&[past_right, text_right])
                    .unwrap_or(past_right);
                (min_x, max_x)
            }
        };

        Ok(Self {
            placement,
            text: text.to_string(),
            size,
            gap,
            overhang,
            row_padding: config.row_padding(),
            min_x,
            max_x,
            y: None,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

impl LayoutTile for NoteTile {
    fn kind(&self) -> TileKind {
        TileKind::Note
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        let width = self.size.width();
        match self.placement {
            Placement::LeftOf(lifeline) => {
                graph.ensure_gap(lifeline.left(), lifeline.center(), width + self.gap)
            }
            Placement::RightOf(lifeline) => {
                graph.ensure_gap(lifeline.center(), lifeline.right(), width + self.gap)
            }
            Placement::Over(lifeline) => {
                graph.ensure_gap(lifeline.left(), lifeline.center(), width / 2.0)?;
                graph.ensure_gap(lifeline.center(), lifeline.right(), width / 2.0)
            }
            Placement::Across(left, right) => {
                graph.ensure_gap(left.left(), left.center(), self.overhang)?;
                graph.ensure_gap(right.center(), right.right(), self.overhang)?;
                graph.ensure_gap(
                    left.center(),
                    right.center(),
                    (width - 2.0 * self.overhang).max(0.0),
                )
            }
        }
    }

    fn preferred_height(&self) -> f32 {
        self.size.height() + 2.0 * self.row_padding
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "note placed twice");
        self.y = Some(y);
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
        let y = placed_y(self.y, TileKind::Note)?;
        let top = y + self.row_padding;
        let bounds = Bounds::from_spans(
            (ctx.x(self.min_x)?, ctx.x(self.max_x)?),
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
