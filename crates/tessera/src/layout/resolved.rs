//! Resolved layout snapshot.
//!
//! [`ResolvedLayout`] is what a layout session hands back once every
//! position has a value: lifeline geometry, the placement of every tile,
//! activation boxes and the overall bounds. It can replay the diagram into
//! any [`DrawSink`].

use log::debug;

use tessera_core::{
    draw::{DrawSink, LineStyle, SvgSink, TextAnchor, VisualKind},
    geometry::{Bounds, Point},
    identifier::Id,
};

use crate::{
    config::LayoutConfig,
    error::LayoutError,
    layout::{
        activation::ActivationBox,
        lifeline::Lifelines,
        position::PositionArena,
        tile::{DrawContext, LayoutTile, LifeEventKind, Tile, TileKind, placed_y},
    },
};

/// Final geometry of one participant.
#[derive(Debug, Clone)]
pub struct ResolvedLifeline {
    id: Id,
    display: String,
    x: f32,
    head: Bounds,
    line_start: f32,
    line_end: f32,
    destroyed: bool,
}

impl ResolvedLifeline {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// X of the lifeline's center.
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Bounds of the participant head box.
    pub fn head(&self) -> Bounds {
        self.head
    }

    /// Y span of the vertical line below the head.
    pub fn line_span(&self) -> (f32, f32) {
        (self.line_start, self.line_end)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Where a tile ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    kind: TileKind,
    bounds: Bounds,
}

impl TilePlacement {
    pub fn kind(&self) -> TileKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// A fully resolved sequence diagram.
#[derive(Debug)]
pub struct ResolvedLayout {
    config: LayoutConfig,
    positions: PositionArena,
    tiles: Vec<Tile>,
    lifelines: Vec<ResolvedLifeline>,
    placements: Vec<TilePlacement>,
    activations: Vec<ActivationBox>,
    delays: Vec<(f32, f32)>,
    bounds: Bounds,
}

impl ResolvedLayout {
    /// Reads every resolved value out of the session state.
    pub(crate) fn build(
        config: LayoutConfig,
        lifelines: Lifelines,
        positions: PositionArena,
        tiles: Vec<Tile>,
        activations: Vec<ActivationBox>,
        head_height: f32,
        bottom: f32,
    ) -> Result<Self, LayoutError> {
        let flat = Tile::flatten(&tiles);

        let mut placements = Vec::with_capacity(flat.len());
        let mut delays = Vec::new();
        let mut destroyed_at: Vec<(Id, f32)> = Vec::new();
        for tile in &flat {
            let y = placed_y(tile.y(), tile.kind())?;
            let height = tile.preferred_height();
            let min_x = positions.current_value(tile.min_x())?;
            let max_x = positions.current_value(tile.max_x())?;
            placements.push(TilePlacement {
                kind: tile.kind(),
                bounds: Bounds::from_spans((min_x, max_x), (y, y + height)),
            });

            if tile.kind() == TileKind::Delay {
                delays.push((y, y + height));
            }
            if let Some((LifeEventKind::Destroy, id, y)) = tile.life_event()? {
                destroyed_at.push((id, y));
            }
        }

        let mut resolved_lifelines = Vec::with_capacity(lifelines.len());
        for lifeline in lifelines.iter() {
            let anchors = lifeline.anchors();
            let x = positions.current_value(anchors.center().position())?;
            let head_size = lifeline.head();
            let head = Bounds::new_from_top_left(
                Point::new(
                    x - head_size.width() / 2.0,
                    head_height - head_size.height(),
                ),
                head_size,
            );

            let destroyed = destroyed_at
                .iter()
                .find(|(id, _)| *id == anchors.id())
                .map(|(_, y)| *y);
            let line_end = match destroyed {
                Some(y) => y + config.destroy_size() / 2.0,
                None => bottom + config.lifeline_tail(),
            };

            resolved_lifelines.push(ResolvedLifeline {
                id: anchors.id(),
                display: lifeline.display().to_string(),
                x,
                head,
                line_start: head_height,
                line_end,
                destroyed: destroyed.is_some(),
            });
        }

        let bounds = resolved_lifelines
            .iter()
            .flat_map(|lifeline| {
                [
                    lifeline.head,
                    Bounds::from_spans(
                        (lifeline.x, lifeline.x),
                        (lifeline.line_start, lifeline.line_end),
                    ),
                ]
            })
            .chain(placements.iter().map(TilePlacement::bounds))
            .chain(activations.iter().map(ActivationBox::bounds))
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default();

        debug!(
            lifelines = resolved_lifelines.len(),
            tiles = placements.len(),
            activations = activations.len(),
            width = bounds.width(),
            height = bounds.height();
            "Layout snapshot built"
        );

        Ok(Self {
            config,
            positions,
            tiles,
            lifelines: resolved_lifelines,
            placements,
            activations,
            delays,
            bounds,
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lifelines in left-to-right order.
    pub fn lifelines(&self) -> &[ResolvedLifeline] {
        &self.lifelines
    }

    pub fn lifeline(&self, id: Id) -> Option<&ResolvedLifeline> {
        self.lifelines.iter().find(|lifeline| lifeline.id == id)
    }

    /// Placement of every tile, nested tiles included, in vertical order.
    pub fn placements(&self) -> &[TilePlacement] {
        &self.placements
    }

    pub fn activations(&self) -> &[ActivationBox] {
        &self.activations
    }

    /// The top-level tiles, with their resolved state.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Union of everything the diagram draws.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Replays the diagram into `sink`.
    pub fn draw(&self, sink: &mut dyn DrawSink) -> Result<(), LayoutError> {
        for lifeline in &self.lifelines {
            self.draw_lifeline(lifeline, sink);
            sink.rect(VisualKind::ParticipantHead, lifeline.head, LineStyle::Solid);
            sink.text(
                VisualKind::ParticipantHead,
                lifeline.head,
                &lifeline.display,
                TextAnchor::Middle,
                self.config.text(),
            );
        }

        for activation in &self.activations {
            sink.rect(VisualKind::Activation, activation.bounds(), LineStyle::Solid);
        }

        let ctx = DrawContext::new(&self.positions, &self.activations, &self.config);
        for tile in &self.tiles {
            tile.draw(&ctx, sink)?;
        }
        Ok(())
    }

    /// Draws the vertical line, dotted through delay rows.
    fn draw_lifeline(&self, lifeline: &ResolvedLifeline, sink: &mut dyn DrawSink) {
        let x = lifeline.x;
        let end = lifeline.line_end;
        let segment = |from: f32, to: f32, style: LineStyle, sink: &mut dyn DrawSink| {
            if to > from {
                sink.line(
                    VisualKind::Lifeline,
                    Point::new(x, from),
                    Point::new(x, to),
                    style,
                );
            }
        };

        let mut current = lifeline.line_start;
        for &(delay_start, delay_end) in &self.delays {
            if delay_start >= end {
                break;
            }
            segment(current, delay_start, LineStyle::Dashed, sink);
            segment(current.max(delay_start), delay_end.min(end), LineStyle::Dotted, sink);
            current = current.max(delay_end);
        }
        segment(current, end, LineStyle::Dashed, sink);
    }

    /// Renders the diagram as an SVG document.
    pub fn to_svg(&self) -> Result<String, LayoutError> {
        let mut sink = SvgSink::new();
        self.draw(&mut sink)?;
        Ok(sink
            .into_document(self.bounds, self.config.diagram_margin())
            .to_string())
    }
}
