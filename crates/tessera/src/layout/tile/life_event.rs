use tessera_core::{
    draw::{DrawSink, LineStyle, VisualKind},
    geometry::Point,
    identifier::Id,
};

use crate::{
    error::LayoutError,
    layout::{
        constraint::ConstraintGraph,
        lifeline::LifelineAnchors,
        position::Position,
        session::LayoutSession,
        tile::{DrawContext, LayoutTile, TileKind, placed_y},
    },
};

/// What happens to a lifeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeEventKind {
    Activate,
    Deactivate,
    Destroy,
}

/// Activation changes and destruction of a participant.
///
/// Activate and deactivate take no vertical space; the activation bars they
/// delimit are built after the vertical pass. An activation still widens its
/// lifeline so that nested bars never reach into the neighbour's spacing.
#[derive(Debug, Clone)]
pub struct LifeEventTile {
    event: LifeEventKind,
    lifeline: LifelineAnchors,
    /// Half-width the lifeline needs on each side for this event.
    half_width: f32,
    right_reach: f32,
    height: f32,
    y: Option<f32>,
}

impl LifeEventTile {
    pub fn new(
        session: &mut LayoutSession<'_>,
        event: LifeEventKind,
        participant: Id,
    ) -> Result<Self, LayoutError> {
        let lifeline = session.lifeline(participant)?;
        let config = session.config();

        let (half_width, right_reach, height) = match event {
            LifeEventKind::Activate => {
                let level = session.open_activation(participant);
                let half = config.activation_width() / 2.0;
                (
                    half,
                    half + level as f32 * config.activation_nesting_offset(),
                    0.0,
                )
            }
            LifeEventKind::Deactivate => {
                session.close_activation(participant);
                (0.0, 0.0, 0.0)
            }
            LifeEventKind::Destroy => {
                session.clear_activations(participant);
                let half = config.destroy_size() / 2.0;
                (half, half, config.destroy_size() + config.row_padding())
            }
        };

        Ok(Self {
            event,
            lifeline,
            half_width,
            right_reach,
            height,
            y: None,
        })
    }

    pub fn event(&self) -> LifeEventKind {
        self.event
    }

    pub fn participant(&self) -> Id {
        self.lifeline.id()
    }
}

impl LayoutTile for LifeEventTile {
    fn kind(&self) -> TileKind {
        TileKind::LifeEvent
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        if self.event == LifeEventKind::Deactivate {
            return Ok(());
        }
        graph.ensure_gap(self.lifeline.left(), self.lifeline.center(), self.half_width)?;
        graph.ensure_gap(self.lifeline.center(), self.lifeline.right(), self.right_reach)
    }

    fn preferred_height(&self) -> f32 {
        self.height
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "life event placed twice");
        self.y = Some(y);
    }

    fn y(&self) -> Option<f32> {
        self.y
    }

    fn min_x(&self) -> Position {
        self.lifeline.center().position()
    }

    fn max_x(&self) -> Position {
        self.lifeline.center().position()
    }

    fn draw(&self, ctx: &DrawContext<'_>, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        let y = placed_y(self.y, TileKind::LifeEvent)?;
        if self.event != LifeEventKind::Destroy {
            return Ok(());
        }

        let x = ctx.x(self.lifeline.center().position())?;
        let half = self.half_width;
        sink.line(
            VisualKind::Destroy,
            Point::new(x - half, y),
            Point::new(x + half, y + 2.0 * half),
            LineStyle::Solid,
        );
        sink.line(
            VisualKind::Destroy,
            Point::new(x + half, y),
            Point::new(x - half, y + 2.0 * half),
            LineStyle::Solid,
        );
        Ok(())
    }
}
