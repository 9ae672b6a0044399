use log::warn;

use tessera_core::draw::DrawSink;

use crate::{
    error::LayoutError,
    layout::{
        constraint::{Anchor, ConstraintGraph},
        position::Position,
        session::LayoutSession,
        tile::{DrawContext, LayoutTile, TileKind},
    },
};

/// Blank vertical space.
#[derive(Debug, Clone)]
pub struct SpacerTile {
    frame: (Anchor, Anchor),
    height: f32,
    y: Option<f32>,
}

impl SpacerTile {
    /// Creates a spacer. Negative or non-finite heights become zero.
    pub fn new(session: &mut LayoutSession<'_>, height: f32) -> Self {
        let height = if height.is_finite() && height >= 0.0 {
            height
        } else {
            warn!(height; "Invalid spacer height, using zero");
            0.0
        };
        Self {
            frame: session.frame(),
            height,
            y: None,
        }
    }
}

impl LayoutTile for SpacerTile {
    fn kind(&self) -> TileKind {
        TileKind::Spacer
    }

    fn add_constraints(&self, _graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        Ok(())
    }

    fn preferred_height(&self) -> f32 {
        self.height
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "spacer placed twice");
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

    fn draw(&self, _ctx: &DrawContext<'_>, _sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::text::MonospaceMeasure;

    use super::*;
    use crate::config::LayoutConfig;

    #[test]
    fn test_invalid_heights_become_zero() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);

        assert_eq!(SpacerTile::new(&mut session, 12.5).preferred_height(), 12.5);
        assert_eq!(SpacerTile::new(&mut session, -3.0).preferred_height(), 0.0);
        assert_eq!(SpacerTile::new(&mut session, f32::NAN).preferred_height(), 0.0);
    }
}
