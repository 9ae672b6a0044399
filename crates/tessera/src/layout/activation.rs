//! Activation bars on lifelines.
//!
//! Activation bars are not tiles: they are derived after the vertical pass
//! from the Y coordinates of activate, deactivate and destroy events. Each
//! participant keeps a stack of open activations; the stack depth at the time
//! an activation opens is its nesting level, which shifts the bar to the
//! right so nested periods stay visible.

use std::collections::HashMap;

use log::warn;

use tessera_core::{geometry::Bounds, identifier::Id};

use crate::{
    config::LayoutConfig,
    error::LayoutError,
    layout::{
        lifeline::Lifelines,
        position::PositionArena,
        tile::{LifeEventKind, Tile},
    },
};

/// A resolved activation bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationBox {
    participant: Id,
    nesting_level: u32,
    bounds: Bounds,
}

impl ActivationBox {
    pub fn participant(&self) -> Id {
        self.participant
    }

    /// Zero for an outermost activation, one for the first nested one, and so on.
    pub fn nesting_level(&self) -> u32 {
        self.nesting_level
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Check if this activation box is active at the given Y coordinate.
    fn is_active_at_y(&self, y: f32) -> bool {
        self.bounds.contains_y(y)
    }

    /// The edge a message arriving from or leaving towards `target_x` touches.
    fn intersection_x(&self, target_x: f32) -> f32 {
        if target_x > self.bounds.center().x() {
            self.bounds.max_x()
        } else {
            self.bounds.min_x()
        }
    }
}

/// An activation that has opened but not yet closed.
#[derive(Debug, Clone)]
struct ActivationTiming {
    participant: Id,
    start_y: f32,
    nesting_level: u32,
}

impl ActivationTiming {
    fn to_activation_box(&self, end_y: f32, lifeline_x: f32, config: &LayoutConfig) -> ActivationBox {
        let end_y = end_y.max(self.start_y + config.min_activation_height());
        let center_x =
            lifeline_x + self.nesting_level as f32 * config.activation_nesting_offset();
        let half_width = config.activation_width() / 2.0;

        ActivationBox {
            participant: self.participant,
            nesting_level: self.nesting_level,
            bounds: Bounds::from_spans(
                (center_x - half_width, center_x + half_width),
                (self.start_y, end_y),
            ),
        }
    }
}

/// Find the innermost activation box of `participant` that is active at `y`.
///
/// When several nested boxes cover `y`, the one with the highest nesting
/// level wins so that messages attach to the bar drawn on top.
pub fn find_active_activation_box(
    activation_boxes: &[ActivationBox],
    participant: Id,
    y: f32,
) -> Option<&ActivationBox> {
    if !y.is_finite() {
        warn!(y; "Invalid message Y coordinate, skipping activation box search");
        return None;
    }

    activation_boxes
        .iter()
        .filter(|activation_box| activation_box.participant() == participant)
        .filter(|activation_box| activation_box.is_active_at_y(y))
        .max_by_key(|activation_box| activation_box.nesting_level())
}

/// The X coordinate where a message touches `participant`.
///
/// Falls back to the lifeline itself when no activation is active at `y`.
pub fn message_endpoint_x(
    activation_boxes: &[ActivationBox],
    participant: Id,
    lifeline_x: f32,
    y: f32,
    target_x: f32,
) -> f32 {
    find_active_activation_box(activation_boxes, participant, y)
        .map(|activation_box| activation_box.intersection_x(target_x))
        .unwrap_or(lifeline_x)
}

/// Builds activation boxes from stacked tiles.
///
/// An activation that directly follows a message touching its participant
/// starts at that message's arrow; a deactivation directly following such a
/// message ends there. Otherwise the life event's own Y is used. Fragment
/// sections are walked one at a time and a message never anchors a life event
/// across a section boundary. Activations still open at the end are closed at
/// `bottom_y`.
pub(crate) fn collect_activations(
    tiles: &[Tile],
    lifelines: &Lifelines,
    arena: &PositionArena,
    config: &LayoutConfig,
    bottom_y: f32,
) -> Result<Vec<ActivationBox>, LayoutError> {
    let mut collector = ActivationCollector {
        lifelines,
        arena,
        config,
        stacks: HashMap::new(),
        boxes: Vec::new(),
        last_arrow: None,
    };
    collector.walk(tiles)?;
    collector.finish(bottom_y)
}

struct ActivationCollector<'a> {
    lifelines: &'a Lifelines,
    arena: &'a PositionArena,
    config: &'a LayoutConfig,
    stacks: HashMap<Id, Vec<ActivationTiming>>,
    boxes: Vec<ActivationBox>,
    last_arrow: Option<(f32, [Id; 2])>,
}

impl ActivationCollector<'_> {
    fn lifeline_x(&self, participant: Id) -> Result<f32, LayoutError> {
        let lifeline = self.lifelines.get(participant).ok_or_else(|| {
            LayoutError::Internal(format!("activation on unregistered participant {participant}"))
        })?;
        self.arena.current_value(lifeline.anchors().center().position())
    }

    fn walk(&mut self, tiles: &[Tile]) -> Result<(), LayoutError> {
        for tile in tiles {
            if let Tile::Fragment(fragment) = tile {
                for section in fragment.sections() {
                    self.last_arrow = None;
                    self.walk(section.tiles())?;
                }
                self.last_arrow = None;
                continue;
            }
            self.visit(tile)?;
        }
        Ok(())
    }

    fn visit(&mut self, tile: &Tile) -> Result<(), LayoutError> {
        if let Some(arrow) = tile.arrow() {
            self.last_arrow = Some(arrow);
            return Ok(());
        }
        let Some((kind, participant, event_y)) = tile.life_event()? else {
            self.last_arrow = None;
            return Ok(());
        };

        let anchored_y = match self.last_arrow {
            Some((arrow_y, ends)) if ends.contains(&participant) => arrow_y,
            _ => event_y,
        };

        match kind {
            LifeEventKind::Activate => {
                let stack = self.stacks.entry(participant).or_default();
                stack.push(ActivationTiming {
                    participant,
                    start_y: anchored_y,
                    nesting_level: stack.len() as u32,
                });
            }
            LifeEventKind::Deactivate => {
                let timing = self.stacks.get_mut(&participant).and_then(Vec::pop);
                match timing {
                    Some(timing) => {
                        let x = self.lifeline_x(participant)?;
                        self.boxes
                            .push(timing.to_activation_box(anchored_y, x, self.config));
                    }
                    None => {
                        warn!(
                            participant = participant.to_string();
                            "Deactivate without a matching activate"
                        );
                    }
                }
            }
            LifeEventKind::Destroy => {
                if let Some(stack) = self.stacks.remove(&participant) {
                    let x = self.lifeline_x(participant)?;
                    self.boxes.extend(
                        stack
                            .iter()
                            .rev()
                            .map(|timing| timing.to_activation_box(event_y, x, self.config)),
                    );
                }
            }
        }
        Ok(())
    }

    fn finish(mut self, bottom_y: f32) -> Result<Vec<ActivationBox>, LayoutError> {
        // Close leftovers in participant order for a deterministic result.
        for lifeline in self.lifelines.iter() {
            let participant = lifeline.anchors().id();
            let Some(stack) = self.stacks.remove(&participant) else {
                continue;
            };
            if stack.is_empty() {
                continue;
            }
            warn!(
                participant = participant.to_string(),
                open = stack.len();
                "Activation left open, closing at diagram bottom"
            );
            let x = self.lifeline_x(participant)?;
            self.boxes.extend(
                stack
                    .iter()
                    .rev()
                    .map(|timing| timing.to_activation_box(bottom_y, x, self.config)),
            );
        }
        Ok(self.boxes)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn activation(participant: &str, level: u32, start_y: f32, end_y: f32) -> ActivationBox {
        ActivationTiming {
            participant: Id::new(participant),
            start_y,
            nesting_level: level,
        }
        .to_activation_box(end_y, 100.0, &LayoutConfig::default())
    }

    #[test]
    fn test_activation_box_is_active_at_y() {
        let activation_box = activation("user", 0, 50.0, 150.0);

        assert!(activation_box.is_active_at_y(50.0));
        assert!(activation_box.is_active_at_y(100.0));
        assert!(activation_box.is_active_at_y(150.0));
        assert!(!activation_box.is_active_at_y(49.0));
        assert!(!activation_box.is_active_at_y(151.0));
    }

    #[test]
    fn test_activation_box_intersection_x() {
        let activation_box = activation("user", 0, 0.0, 100.0);

        assert_approx_eq!(f32, activation_box.intersection_x(200.0), 105.0);
        assert_approx_eq!(f32, activation_box.intersection_x(0.0), 95.0);
    }

    #[test]
    fn test_activation_box_nesting_offset() {
        let outer = activation("user", 0, 0.0, 100.0);
        let nested = activation("user", 2, 0.0, 100.0);

        assert_approx_eq!(f32, outer.bounds().center().x(), 100.0);
        assert_approx_eq!(f32, nested.bounds().center().x(), 110.0);
    }

    #[test]
    fn test_zero_length_activation_gets_minimum_height() {
        let activation_box = activation("user", 0, 40.0, 40.0);
        assert_approx_eq!(
            f32,
            activation_box.bounds().height(),
            LayoutConfig::default().min_activation_height()
        );
    }

    #[test]
    fn test_find_active_activation_box_prefers_innermost() {
        let boxes = vec![
            activation("user", 0, 0.0, 200.0),
            activation("user", 1, 50.0, 100.0),
            activation("server", 0, 0.0, 200.0),
        ];
        let user = Id::new("user");

        let found = find_active_activation_box(&boxes, user, 75.0).unwrap();
        assert_eq!(found.nesting_level(), 1);

        let found = find_active_activation_box(&boxes, user, 150.0).unwrap();
        assert_eq!(found.nesting_level(), 0);

        assert!(find_active_activation_box(&boxes, user, 250.0).is_none());
        assert!(find_active_activation_box(&boxes, Id::new("nobody"), 75.0).is_none());
    }

    #[test]
    fn test_find_active_activation_box_rejects_non_finite_y() {
        let boxes = vec![activation("user", 0, 0.0, 200.0)];
        assert!(find_active_activation_box(&boxes, Id::new("user"), f32::NAN).is_none());
        assert!(find_active_activation_box(&boxes, Id::new("user"), f32::INFINITY).is_none());
    }

    #[test]
    fn test_message_endpoint_fallback() {
        let boxes = vec![activation("user", 0, 0.0, 50.0)];
        let user = Id::new("user");

        assert_approx_eq!(f32, message_endpoint_x(&boxes, user, 100.0, 25.0, 300.0), 105.0);
        assert_approx_eq!(f32, message_endpoint_x(&boxes, user, 100.0, 80.0, 300.0), 100.0);
        assert_approx_eq!(f32, message_endpoint_x(&[], user, 100.0, 25.0, 300.0), 100.0);
    }
}
