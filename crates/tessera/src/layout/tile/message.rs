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

/// A message between two different lifelines.
///
/// The label sits centered above the arrow. The two lifeline centers are
/// kept at least the label width plus a margin on each side apart.
#[derive(Debug, Clone)]
pub struct MessageTile {
    from: LifelineAnchors,
    to: LifelineAnchors,
    label: Option<String>,
    label_size: Size,
    style: ArrowStyle,
    margin: f32,
    row_padding: f32,
    arrow_head: f32,
    y: Option<f32>,
}

impl MessageTile {
    pub fn new(
        session: &mut LayoutSession<'_>,
        from: Id,
        to: Id,
        label: Option<&str>,
        style: ArrowStyle,
    ) -> Result<Self, LayoutError> {
        let from = session.lifeline(from)?;
        let to = session.lifeline(to)?;
        let label_size = match label {
            Some(text) => session.measure_label(text)?,
            None => Size::default(),
        };
        let config = session.config();

        Ok(Self {
            from,
            to,
            label: label.map(str::to_string),
            label_size,
            style,
            margin: config.message_margin(),
            row_padding: config.row_padding(),
            arrow_head: config.arrow_head(),
            y: None,
        })
    }

    /// The lifelines in left-to-right order.
    pub fn span(&self) -> (LifelineAnchors, LifelineAnchors) {
        if self.from.index() <= self.to.index() {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    fn arrow_offset(&self) -> f32 {
        self.row_padding + self.label_size.height() + self.arrow_head / 2.0
    }

    pub(crate) fn arrow(&self) -> Option<(f32, [Id; 2])> {
        self.y
            .map(|y| (y + self.arrow_offset(), [self.from.id(), self.to.id()]))
    }
}

impl LayoutTile for MessageTile {
    fn kind(&self) -> TileKind {
        TileKind::Message
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        let (left, right) = self.span();
        graph.ensure_gap(
            left.center(),
            right.center(),
            self.label_size.width() + 2.0 * self.margin,
        )
    }

    fn preferred_height(&self) -> f32 {
        self.row_padding + self.label_size.height() + self.arrow_head + self.row_padding
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "message placed twice");
        self.y = Some(y);
    }

    fn y(&self) -> Option<f32> {
        self.y
    }

    fn min_x(&self) -> Position {
        self.span().0.center().position()
    }

    fn max_x(&self) -> Position {
        self.span().1.center().position()
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        let y = placed_y(self.y, TileKind::Message)?;
        let arrow_y = y + self.arrow_offset();

        let from_center = ctx.x(self.from.center().position())?;
        let to_center = ctx.x(self.to.center().position())?;
        let start_x = ctx.endpoint_x(self.from, arrow_y, to_center)?;
        let end_x = ctx.endpoint_x(self.to, arrow_y, from_center)?;

        sink.line(
            VisualKind::Message,
            Point::new(start_x, arrow_y),
            Point::new(end_x, arrow_y),
            shaft_style(self.style),
        );
        draw_arrow_head(
            sink,
            VisualKind::Message,
            Point::new(end_x, arrow_y),
            end_x - start_x,
            self.arrow_head,
            self.style,
        );

        if let Some(label) = &self.label {
            let mid_x = (from_center + to_center) / 2.0;
            let block = Bounds::new_from_top_left(
                Point::new(mid_x - self.label_size.width() / 2.0, y + self.row_padding),
                self.label_size,
            );
            sink.text(
                VisualKind::Message,
                block,
                label,
                TextAnchor::Middle,
                ctx.config().text(),
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use tessera_core::{
        draw::{DrawCommand, LineStyle, RecordingSink},
        text::MonospaceMeasure,
    };

    use super::*;
    use crate::{config::LayoutConfig, layout::resolve};

    #[test]
    fn test_label_width_separates_lifelines() {
        let config = LayoutConfig::default().with_participant_spacing(0.0);
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);

        let label = "a fairly long message label";
        let tile = MessageTile::new(
            &mut session,
            Id::new("client"),
            Id::new("server"),
            Some(label),
            ArrowStyle::Sync,
        )
        .unwrap();
        let label_size = session.measure_label(label).unwrap();
        let (left, right) = tile.span();

        let (mut graph, mut arena) = session.into_parts();
        tile.add_constraints(&mut graph).unwrap();
        resolve(&graph, &mut arena).unwrap();

        let gap = arena.current_value(right.center().position()).unwrap()
            - arena.current_value(left.center().position()).unwrap();
        assert_approx_eq!(
            f32,
            gap,
            label_size.width() + 2.0 * config.message_margin(),
            epsilon = 1e-3
        );
        assert_approx_eq!(
            f32,
            tile.preferred_height(),
            2.0 * config.row_padding() + label_size.height() + config.arrow_head()
        );
    }

    #[test]
    fn test_reversed_message_spans_left_to_right() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        session.declare(Id::new("a"), "A").unwrap();
        session.declare(Id::new("b"), "B").unwrap();

        let tile =
            MessageTile::new(&mut session, Id::new("b"), Id::new("a"), None, ArrowStyle::Return)
                .unwrap();
        let (left, right) = tile.span();
        assert_eq!(left.id(), "a");
        assert_eq!(right.id(), "b");
        assert_eq!(tile.min_x(), left.center().position());
        assert_eq!(tile.max_x(), right.center().position());
    }

    #[test]
    fn test_draw_leftward_return_message() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        let a = session.declare(Id::new("a"), "A").unwrap();
        let b = session.declare(Id::new("b"), "B").unwrap();

        let mut tile =
            MessageTile::new(&mut session, Id::new("b"), Id::new("a"), Some("ok"), ArrowStyle::Return)
                .unwrap();
        tile.callback_y(100.0);

        let (mut graph, mut arena) = session.into_parts();
        tile.add_constraints(&mut graph).unwrap();
        resolve(&graph, &mut arena).unwrap();

        let ctx = DrawContext::new(&arena, &[], &config);
        let mut sink = RecordingSink::new();
        tile.draw(&ctx, &mut sink).unwrap();

        let a_x = arena.current_value(a.center().position()).unwrap();
        let b_x = arena.current_value(b.center().position()).unwrap();
        match &sink.commands()[0] {
            DrawCommand::Line { from, to, line, .. } => {
                assert_approx_eq!(f32, from.x(), b_x);
                assert_approx_eq!(f32, to.x(), a_x);
                assert_eq!(*line, LineStyle::Dashed);
                assert_approx_eq!(f32, from.y(), tile.arrow().unwrap().0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(sink.texts(), vec!["ok"]);
    }
}
