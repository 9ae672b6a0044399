//! Combined fragments (`alt`, `loop`, `opt`, ...).
//!
//! A fragment is a frame around the tiles between its start and end markers.
//! Its content is split into sections by `else` markers; each section may
//! carry a guard. The operator sits in a tab in the upper-left corner and
//! sections are separated by dashed lines.
//!
//! Horizontally the frame encloses the extents of every nested tile plus
//! padding, and is never narrower than its header. A fragment without any
//! content spans the whole diagram frame.

use log::debug;

use tessera_core::{
    draw::{DrawSink, LineStyle, TextAnchor, VisualKind},
    geometry::{Bounds, Point, Size},
};

use crate::{
    error::LayoutError,
    layout::{
        constraint::ConstraintGraph,
        position::Position,
        session::LayoutSession,
        stacker,
        tile::{DrawContext, LayoutTile, Tile, TileKind, placed_y},
    },
};

/// Size of the cut corner of the operator tab.
const TAB_NOTCH: f32 = 6.0;

/// One `else`-delimited part of a fragment.
#[derive(Debug, Clone)]
pub struct FragmentSection {
    guard: Option<String>,
    guard_size: Size,
    tiles: Vec<Tile>,
    y: Option<f32>,
}

impl FragmentSection {
    fn new(session: &LayoutSession<'_>, guard: Option<&str>) -> Result<Self, LayoutError> {
        let guard = guard.map(|guard| format!("[{guard}]"));
        let guard_size = match &guard {
            Some(text) => session.measure_label(text)?,
            None => Size::default(),
        };
        Ok(Self {
            guard,
            guard_size,
            tiles: Vec::new(),
            y: None,
        })
    }

    /// The guard as drawn, brackets included.
    pub fn guard(&self) -> Option<&str> {
        self.guard.as_deref()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Top of the section, once placed.
    pub fn y(&self) -> Option<f32> {
        self.y
    }

    fn content_height(&self) -> f32 {
        self.tiles.iter().map(LayoutTile::preferred_height).sum()
    }
}

/// Collects the tiles of a fragment while its events are being read.
#[derive(Debug)]
pub struct FragmentBuilder {
    operator: String,
    operator_size: Size,
    sections: Vec<FragmentSection>,
}

impl FragmentBuilder {
    /// Starts a fragment whose first section has `guard`.
    pub fn new(
        session: &mut LayoutSession<'_>,
        operator: &str,
        guard: Option<&str>,
    ) -> Result<Self, LayoutError> {
        Ok(Self {
            operator: operator.to_string(),
            operator_size: session.measure_label(operator)?,
            sections: vec![FragmentSection::new(session, guard)?],
        })
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Closes the current section and opens a new one.
    pub fn start_section(
        &mut self,
        session: &mut LayoutSession<'_>,
        guard: Option<&str>,
    ) -> Result<(), LayoutError> {
        self.sections.push(FragmentSection::new(session, guard)?);
        Ok(())
    }

    /// Appends a tile to the current section.
    pub fn push(&mut self, tile: Tile) {
        if let Some(section) = self.sections.last_mut() {
            section.tiles.push(tile);
        }
    }

    /// Builds the fragment tile and its derived horizontal extent.
    pub fn finish(self, session: &mut LayoutSession<'_>) -> Result<FragmentTile, LayoutError> {
        let config = session.config();
        let padding = config.fragment_padding();
        let row_padding = config.row_padding();
        let (frame_left, frame_right) = session.frame();

        let header_width = self.header_width(padding);
        let header_heights = self.header_heights(row_padding);

        let mut mins = Vec::new();
        let mut maxs = Vec::new();
        for tile in self.sections.iter().flat_map(|section| &section.tiles) {
            mins.push(tile.min_x());
            maxs.push(tile.max_x());
        }

        let positions = session.positions();
        let (min_x, max_x) = match (positions.min_of(&mins), positions.max_of(&maxs)) {
            (Some(min), Some(max)) => {
                let min_x = positions.add_fixed(min, -padding);
                let padded_max = positions.add_fixed(max, padding);
                let header_end = positions.add_fixed(min_x, header_width);
                let max_x = positions
                    .max_of(&[padded_max, header_end])
                    .unwrap_or(padded_max);
                (min_x, max_x)
            }
            _ => {
                debug!(operator = self.operator.as_str(); "Empty fragment spans the frame");
                let max_x = positions.add_fixed(frame_left.position(), header_width);
                let max_x = positions
                    .max_of(&[frame_right.position(), max_x])
                    .unwrap_or(max_x);
                (frame_left.position(), max_x)
            }
        };

        Ok(FragmentTile {
            operator: self.operator,
            operator_size: self.operator_size,
            sections: self.sections,
            header_heights,
            padding,
            min_x,
            max_x,
            y: None,
        })
    }

    /// Narrowest width that fits the operator tab and every guard.
    fn header_width(&self, padding: f32) -> f32 {
        let tab = self.operator_size.width() + TAB_NOTCH;
        self.sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let lead = if index == 0 { tab } else { 0.0 };
                lead + padding + section.guard_size.width() + padding
            })
            .fold(tab, f32::max)
    }

    /// Height reserved above the content of each section.
    fn header_heights(&self, row_padding: f32) -> Vec<f32> {
        self.sections
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let header = if index == 0 {
                    self.operator_size.height().max(section.guard_size.height())
                } else {
                    section.guard_size.height()
                };
                header + row_padding
            })
            .collect()
    }
}

/// A framed group of tiles.
#[derive(Debug, Clone)]
pub struct FragmentTile {
    operator: String,
    operator_size: Size,
    sections: Vec<FragmentSection>,
    header_heights: Vec<f32>,
    padding: f32,
    min_x: Position,
    max_x: Position,
    y: Option<f32>,
}

impl FragmentTile {
    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn sections(&self) -> &[FragmentSection] {
        &self.sections
    }

    fn draw_tab(&self, sink: &mut dyn DrawSink, ctx: &DrawContext<'_>, top_left: Point) {
        let width = self.operator_size.width() + TAB_NOTCH;
        let height = self.operator_size.height();
        let (x, y) = (top_left.x(), top_left.y());
        sink.polygon(
            VisualKind::Fragment,
            &[
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height - TAB_NOTCH),
                Point::new(x + width - TAB_NOTCH, y + height),
                Point::new(x, y + height),
            ],
            false,
        );
        sink.text(
            VisualKind::Fragment,
            Bounds::new_from_top_left(top_left, self.operator_size),
            &self.operator,
            TextAnchor::Middle,
            ctx.config().text(),
        );
    }
}

impl LayoutTile for FragmentTile {
    fn kind(&self) -> TileKind {
        TileKind::Fragment
    }

    fn add_constraints(&self, graph: &mut ConstraintGraph) -> Result<(), LayoutError> {
        for tile in self.sections.iter().flat_map(|section| &section.tiles) {
            tile.add_constraints(graph)?;
        }
        Ok(())
    }

    fn preferred_height(&self) -> f32 {
        let sections: f32 = self
            .sections
            .iter()
            .zip(&self.header_heights)
            .map(|(section, header)| header + section.content_height())
            .sum();
        sections + self.padding
    }

    fn callback_y(&mut self, y: f32) {
        debug_assert!(self.y.is_none(), "fragment placed twice");
        self.y = Some(y);

        let mut current = y;
        for (section, header) in self.sections.iter_mut().zip(&self.header_heights) {
            section.y = Some(current);
            current = stacker::stack(&mut section.tiles, current + header);
        }
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
        let y = placed_y(self.y, TileKind::Fragment)?;
        let left = ctx.x(self.min_x)?;
        let right = ctx.x(self.max_x)?;
        let frame = Bounds::from_spans((left, right), (y, y + self.preferred_height()));

        sink.rect(VisualKind::Fragment, frame, LineStyle::Solid);
        self.draw_tab(sink, ctx, frame.min_point());

        let tab_width = self.operator_size.width() + TAB_NOTCH;
        for (index, section) in self.sections.iter().enumerate() {
            let section_y = placed_y(section.y, TileKind::Fragment)?;
            if index > 0 {
                sink.line(
                    VisualKind::Fragment,
                    Point::new(left, section_y),
                    Point::new(right, section_y),
                    LineStyle::Dashed,
                );
            }
            if let Some(guard) = &section.guard {
                let lead = if index == 0 { tab_width } else { 0.0 };
                let block = Bounds::new_from_top_left(
                    Point::new(left + lead + self.padding, section_y),
                    section.guard_size,
                );
                sink.text(
                    VisualKind::Fragment,
                    block,
                    guard,
                    TextAnchor::Start,
                    ctx.config().text(),
                );
            }
            for tile in &section.tiles {
                tile.draw(ctx, sink)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use tessera_core::{draw::RecordingSink, identifier::Id, text::MonospaceMeasure};

    use super::*;
    use crate::{
        config::LayoutConfig,
        event::ArrowStyle,
        layout::{resolve, tile::MessageTile},
    };

    fn message(session: &mut LayoutSession<'_>, from: &str, to: &str) -> Tile {
        Tile::Message(
            MessageTile::new(session, Id::new(from), Id::new(to), None, ArrowStyle::Sync).unwrap(),
        )
    }

    #[test]
    fn test_fragment_encloses_content_with_padding() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);

        let mut builder = FragmentBuilder::new(&mut session, "alt", Some("ok")).unwrap();
        let tile = message(&mut session, "a", "b");
        builder.push(tile);
        builder.start_section(&mut session, Some("failed")).unwrap();
        let tile = message(&mut session, "b", "c");
        builder.push(tile);
        let mut fragment = builder.finish(&mut session).unwrap();

        assert_eq!(fragment.operator(), "alt");
        assert_eq!(fragment.sections()[0].guard(), Some("[ok]"));
        fragment.callback_y(100.0);

        let (mut graph, mut arena) = session.into_parts();
        fragment.add_constraints(&mut graph).unwrap();
        assert!(graph.edge_count() > 0);
        resolve(&graph, &mut arena).unwrap();

        let x = |position: Position| arena.current_value(position).unwrap();
        let first = &fragment.sections()[0].tiles()[0];
        let last = &fragment.sections()[1].tiles()[0];
        assert_approx_eq!(
            f32,
            x(fragment.min_x()),
            x(first.min_x()) - config.fragment_padding()
        );
        assert!(x(fragment.max_x()) >= x(last.max_x()) + config.fragment_padding() - 1e-3);

        // Children are stacked below their section headers.
        let second_top = fragment.sections()[1].y().unwrap();
        assert!(first.y().unwrap() > 100.0);
        assert_approx_eq!(
            f32,
            second_top,
            first.y().unwrap() + first.preferred_height()
        );
        assert!(last.y().unwrap() > second_top);

        let ctx = DrawContext::new(&arena, &[], &config);
        let mut sink = RecordingSink::new();
        fragment.draw(&ctx, &mut sink).unwrap();
        let texts = sink.texts();
        assert!(texts.contains(&"alt"));
        assert!(texts.contains(&"[failed]"));
        assert_eq!(sink.of_kind(VisualKind::Message).count(), 4);
    }

    #[test]
    fn test_empty_fragment_spans_frame_and_header() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);
        let (frame_left, frame_right) = session.frame();

        let header = session.measure_label("critical").unwrap().width();
        let builder = FragmentBuilder::new(&mut session, "critical", None).unwrap();
        let mut fragment = builder.finish(&mut session).unwrap();
        assert_eq!(fragment.min_x(), frame_left.position());
        fragment.callback_y(0.0);

        let (graph, mut arena) = session.into_parts();
        resolve(&graph, &mut arena).unwrap();

        let width = arena.current_value(fragment.max_x()).unwrap()
            - arena.current_value(frame_left.position()).unwrap();
        assert!(width >= arena.current_value(frame_right.position()).unwrap() - 1e-3);
        assert!(width >= header);
    }

    #[test]
    fn test_height_includes_headers_and_bottom_padding() {
        let config = LayoutConfig::default();
        let measure = MonospaceMeasure::default();
        let mut session = LayoutSession::new(&config, &measure);

        let mut builder = FragmentBuilder::new(&mut session, "loop", None).unwrap();
        let tile = message(&mut session, "a", "b");
        let child_height = tile.preferred_height();
        builder.push(tile);
        let fragment = builder.finish(&mut session).unwrap();

        let operator_height = session.measure_label("loop").unwrap().height();
        assert_approx_eq!(
            f32,
            fragment.preferred_height(),
            operator_height + config.row_padding() + child_height + config.fragment_padding()
        );
    }
}
