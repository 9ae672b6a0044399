use tessera_core::{
    draw::{DrawSink, TextAnchor, VisualKind},
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

use crate::{
    error::LayoutError,
    event::ArrowStyle,
    layout::{
        constraint::ConstraintGraph,
        lifeline::LifelineAnchors,
        position::Position,
        session::LayoutSession,
        tile::{DrawContext, LayoutTile, TileKind, draw_arrow_head, placed_y, shaft_style},
    },
};

/// A message from a lifeline to itself, drawn as a loop to the right.
///
/// The loop only widens its own lifeline: it pushes the lifeline's right
/// edge, and the participant spacing keeps the next lifeline clear of it.
#[derive(Debug, Clone)]
pub struct SelfMessageTile {
    lifeline: LifelineAnchors,
    label: Option<String>,
    label_size: Size,
    style: ArrowStyle,
    /// Distance from the lifeline center to the loop's vertical segment.
    loop_extent: f32,
    loop_height: f32,
    margin: f32,
    row_padding: f32,
    arrow_head: f32,
    loop_right: Position,
    y: Option<f32>,
}

impl SelfMessageTile {
    pub fn new(
        session: &mut LayoutSession<'_>,
        participant: Id,
        label: Option<&str>,
        style: ArrowStyle,
    ) -> Result<Self, LayoutError> {
        let lifeline = session.lifeline(participant)?;
        let label_size = match label {
            Some(text) => session.measure_label(text)?,
            None => Size::default(),
        };
        let config = session.config();
        // The loop has to clear the innermost open activation bar.
        let loop_extent = (label_size.width() + config.message_margin())
            .max(config.self_loop_width())
            .max(session.activation_reach(participant) + config.message_margin());
        let loop_right = session
            .positions()
            .add_fixed(lifeline.center().position(), loop_extent);

        Ok(Self {
            lifeline,
            label: label.map(str::to_string),
            label_size,
            style,
            loop_extent,
            loop_height: config.self_loop_height(),
            margin: config.message_margin(),
            row_padding: config.row_padding(),
            arrow_head: config.arrow_head(),
            loop_right,
            y: None,
        })
    }

    pub fn lifeline(&self) -> LifelineAnchors {
        self.lifeline
    }

    /// How far the loop reaches right of the lifeline center.
    pub fn loop_extent(&self) -> f32 {
        self.loop_extent
    }

    fn arrow_offset(&self) -> f32 {
        self.row_padding + self.label_size.height()
    }

    pub(crate) fn arrow(&self) -> Option<(f32, [Id; 2])> {
        self.y.map(|y| {
            (
                y + self.arrow_offset(),
                [self.lifeline.id(), self.lifeline.id()],
            )
        })
    }
}

impl LayoutTile for SelfMessageTile {
    fn kind(&self) -> TileKind {
        TileKind::SelfMessage
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        graph.ensure_gap(
            self.lifeline.center(),
            self.lifeline.right(),
            self.loop_extent + self.margin,
        )
    }

    fn preferred_height(&self) -> f32 {
        self.arrow_offset() + self.loop_height + self.arrow_head / 2.0 + self.row_padding
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "self message placed twice");
        self.y = Some(y);
    }

    fn y(&self) -> Option<f32> {
        self.y
    }

    fn min_x(&self) -> Position {
        self.lifeline.center().position()
    }

    fn max_x(&self) -> Position {
        self.loop_right
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        let y = placed_y(self.y, TileKind::SelfMessage)?;
        let top = y + self.arrow_offset();
        let bottom = top + self.loop_height;

        let center_x = ctx.x(self.lifeline.center().position())?;
        let loop_x = ctx.x(self.loop_right)?;
        let start_x = ctx.endpoint_x(self.lifeline, top, loop_x)?;
        let end_x = ctx.endpoint_x(self.lifeline, bottom, loop_x)?;

        sink.polyline(
            VisualKind::SelfMessage,
            &[
                Point::new(start_x, top),
                Point::new(loop_x, top),
                Point::new(loop_x, bottom),
                Point::new(end_x, bottom),
            ],
            shaft_style(self.style),
        );
        draw_arrow_head(
            sink,
            VisualKind::SelfMessage,
            Point::new(end_x, bottom),
            -1.0,
            self.arrow_head,
            self.style,
        );

        if let Some(label) = &self.label {
            let block = Bounds::new_from_top_left(
                Point::new(center_x + self.margin / 2.0, y + self.row_padding),
                self.label_size,
            );
            sink.text(
                VisualKind::SelfMessage,
                block,
                label,
                TextAnchor::Start,
                ctx.config().text(),
            );
        }
        Ok(())
    }
}
