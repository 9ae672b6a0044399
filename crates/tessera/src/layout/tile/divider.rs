//! Rows that span the whole diagram: dividers and delays.

use tessera_core::{
    draw::{DrawSink, LineStyle, TextAnchor, VisualKind},
    geometry::{Bounds, Point, Size},
};

use crate::{
    error::LayoutError,
    layout::{
        constraint::{Anchor, ConstraintGraph},
        position::Position,
        session::LayoutSession,
        tile::{DrawContext, LayoutTile, TileKind, placed_y},
    },
};

/// Label shared by frame-wide rows.
#[derive(Debug, Clone)]
struct FrameLabel {
    text: Option<String>,
    size: Size,
}

impl FrameLabel {
    fn measure(session: &LayoutSession<'_>, text: Option<&str>) -> Result<Self, LayoutError> {
        let size = match text {
            Some(text) => session.measure_label(text)?,
            None => Size::default(),
        };
        Ok(Self {
            text: text.map(str::to_string),
            size,
        })
    }

    /// Keeps the frame at least as wide as the label plus margins.
    fn add_constraints(
        &self,
        graph: &mut ConstraintGraph,
        frame: (Anchor, Anchor),
        margin: f32,
    ) -> Result<(), LayoutError> {
        if self.text.is_none() {
            return Ok(());
        }
        graph.ensure_gap(frame.0, frame.1, self.size.width() + 2.0 * margin)
    }

    /// Label block centered on `center`.
    fn block(&self, center: Point) -> Bounds {
        Bounds::new_from_top_left(
            Point::new(
                center.x() - self.size.width() / 2.0,
                center.y() - self.size.height() / 2.0,
            ),
            self.size,
        )
    }
}

/// A horizontal separator across every lifeline, with an optional title.
#[derive(Debug, Clone)]
pub struct DividerTile {
    frame: (Anchor, Anchor),
    label: FrameLabel,
    height: f32,
    margin: f32,
    y: Option<f32>,
}

impl DividerTile {
    pub fn new(session: &mut LayoutSession<'_>, label: Option<&str>) -> Result<Self, LayoutError> {
        let label = FrameLabel::measure(session, label)?;
        let config = session.config();
        let height = config
            .divider_height()
            .max(label.size.height() + 2.0 * config.row_padding());

        Ok(Self {
            frame: session.frame(),
            label,
            height,
            margin: config.message_margin(),
            y: None,
        })
    }
}

impl LayoutTile for DividerTile {
    fn kind(&self) -> TileKind {
        TileKind::Divider
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        self.label.add_constraints(graph, self.frame, self.margin)
    }

    fn preferred_height(&self) -> f32 {
        self.height
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "divider placed twice");
        self.y = Some(y);
    }

    fn y(&self) -> Option<f32> {
        self.y
    }

    fn min_x(&self) -> Position {
        self.frame.0.position()
    }

    fn max_x(&self) -> Position {
        self.frame.1.position()
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        let y = placed_y(self.y, TileKind::Divider)?;
        let left = ctx.x(self.frame.0.position())?;
        let right = ctx.x(self.frame.1.position())?;
        let mid_y = y + self.height / 2.0;

        for offset in [-1.5, 1.5] {
            sink.line(
                VisualKind::Divider,
                Point::new(left, mid_y + offset),
                Point::new(right, mid_y + offset),
                LineStyle::Solid,
            );
        }

        if let Some(text) = &self.label.text {
            let block = self.label.block(Point::new((left + right) / 2.0, mid_y));
            sink.rect(VisualKind::Divider, block, LineStyle::Solid);
            sink.text(
                VisualKind::Divider,
                block,
                text,
                TextAnchor::Middle,
                ctx.config().text(),
            );
        }
        Ok(())
    }
}

/// Elided time. Lifelines are drawn dotted through a delay row.
#[derive(Debug, Clone)]
pub struct DelayTile {
    frame: (Anchor, Anchor),
    label: FrameLabel,
    height: f32,
    margin: f32,
    y: Option<f32>,
}

impl DelayTile {
    pub fn new(session: &mut LayoutSession<'_>, label: Option<&str>) -> Result<Self, LayoutError> {
        let label = FrameLabel::measure(session, label)?;
        let config = session.config();
        let height = config
            .delay_height()
            .max(label.size.height() + 2.0 * config.row_padding());

        Ok(Self {
            frame: session.frame(),
            label,
            height,
            margin: config.message_margin(),
            y: None,
        })
    }
}

impl LayoutTile for DelayTile {
    fn kind(&self) -> TileKind {
        TileKind::Delay
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        self.label.add_constraints(graph, self.frame, self.margin)
    }

    fn preferred_height(&self) -> f32 {
        self.height
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "delay placed twice");
        self.y = Some(y);
    }

    fn y(&self) -> Option<f32> {
        self.y
    }

    fn min_x(&self) -> Position {
        self.frame.0.position()
    }

    fn max_x(&self) -> Position {
        self.frame.1.position()
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        let y = placed_y(self.y, TileKind::Delay)?;
        let Some(text) = &self.label.text else {
            return Ok(());
        };

        let left = ctx.x(self.frame.0.position())?;
        let right = ctx.x(self.frame.1.position())?;
        let block = self
            .label
            .block(Point::new((left + right) / 2.0, y + self.height / 2.0));
        sink.text(
            VisualKind::Delay,
            block,
            text,
            TextAnchor::Middle,
            ctx.config().text(),
        );
        Ok(())
    }
}
