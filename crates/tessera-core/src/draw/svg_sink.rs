//! SVG rendering of draw primitives.

use log::debug;
use svg::{
    Document,
    node::{
        Text as TextNode,
        element::{self as svg_element, Group},
    },
};

use crate::{
    draw::{DrawSink, LineStyle, RenderLayer, TextAnchor, VisualKind},
    geometry::{Bounds, Point},
    text::TextStyle,
};

type SvgNode = Box<dyn svg::Node>;

/// Collects primitives as SVG nodes grouped by [`RenderLayer`].
///
/// Nodes keep their call order within a layer; layers are emitted bottom to
/// top when the document is built.
///
/// ```
/// # use tessera_core::draw::{DrawSink, LineStyle, SvgSink, VisualKind};
/// # use tessera_core::geometry::{Bounds, Point};
/// let mut sink = SvgSink::new();
/// sink.line(VisualKind::Lifeline, Point::new(0.0, 0.0), Point::new(0.0, 100.0), LineStyle::Dashed);
/// let document = sink.into_document(Bounds::from_spans((0.0, 10.0), (0.0, 100.0)), 10.0);
/// assert!(document.to_string().contains("data-layer=\"lifeline\""));
/// ```
#[derive(Debug, Default)]
pub struct SvgSink {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl SvgSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn push(&mut self, layer: RenderLayer, node: impl svg::Node) {
        self.items.push((layer, Box::new(node)));
    }

    /// Builds the document whose view box is `bounds` grown by `margin` on
    /// every side, consuming the sink.
    pub fn into_document(mut self, bounds: Bounds, margin: f32) -> Document {
        let width = bounds.width() + 2.0 * margin;
        let height = bounds.height() + 2.0 * margin;
        debug!(width, height, nodes = self.items.len(); "Building SVG document");

        let mut document = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.min_x() - margin,
                    bounds.min_y() - margin,
                    width,
                    height
                ),
            )
            .set("width", width)
            .set("height", height);

        self.items.sort_by_key(|(layer, _)| *layer);

        let mut current: Option<(RenderLayer, Group)> = None;
        for (layer, node) in self.items {
            current = match current {
                Some((current_layer, group)) if current_layer == layer => {
                    Some((layer, group.add(node)))
                }
                Some((_, group)) => {
                    document = document.add(group);
                    Some((layer, Self::layer_group(layer).add(node)))
                }
                None => Some((layer, Self::layer_group(layer).add(node))),
            };
        }
        if let Some((_, group)) = current {
            document = document.add(group);
        }

        document
    }

    fn layer_group(layer: RenderLayer) -> Group {
        Group::new().set("data-layer", layer.name())
    }

    fn fill_for(kind: VisualKind) -> &'static str {
        match kind {
            VisualKind::ParticipantHead => "#eef2ff",
            VisualKind::Note => "#fffacd",
            VisualKind::Activation => "white",
            VisualKind::Divider => "#eeeeee",
            _ => "none",
        }
    }

    fn points_attr(points: &[Point]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", p.x(), p.y()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn dasharray(line: LineStyle) -> &'static str {
        line.dasharray().unwrap_or("none")
    }
}

impl DrawSink for SvgSink {
    fn rect(&mut self, kind: VisualKind, bounds: Bounds, line: LineStyle) {
        let rect = svg_element::Rectangle::new()
            .set("class", kind.name())
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("fill", Self::fill_for(kind))
            .set("stroke", "black")
            .set("stroke-dasharray", Self::dasharray(line));
        self.push(kind.layer(), rect);
    }

    fn line(&mut self, kind: VisualKind, from: Point, to: Point, line: LineStyle) {
        let segment = svg_element::Line::new()
            .set("class", kind.name())
            .set("x1", from.x())
            .set("y1", from.y())
            .set("x2", to.x())
            .set("y2", to.y())
            .set("stroke", "black")
            .set("stroke-dasharray", Self::dasharray(line));
        self.push(kind.layer(), segment);
    }

    fn polyline(&mut self, kind: VisualKind, points: &[Point], line: LineStyle) {
        let chain = svg_element::Polyline::new()
            .set("class", kind.name())
            .set("points", Self::points_attr(points))
            .set("fill", "none")
            .set("stroke", "black")
            .set("stroke-dasharray", Self::dasharray(line));
        self.push(kind.layer(), chain);
    }

    fn polygon(&mut self, kind: VisualKind, points: &[Point], filled: bool) {
        let fill = if filled { "black" } else { Self::fill_for(kind) };
        let shape = svg_element::Polygon::new()
            .set("class", kind.name())
            .set("points", Self::points_attr(points))
            .set("fill", fill)
            .set("stroke", "black");
        self.push(kind.layer(), shape);
    }

    fn text(
        &mut self,
        kind: VisualKind,
        block: Bounds,
        content: &str,
        anchor: TextAnchor,
        style: &TextStyle,
    ) {
        let padding = style.padding();
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return;
        }

        let line_height = (block.height() - padding.vertical_sum()) / lines.len() as f32;
        let (x, text_anchor) = match anchor {
            TextAnchor::Start => (block.min_x() + padding.left(), "start"),
            TextAnchor::Middle => (block.center().x(), "middle"),
            TextAnchor::End => (block.max_x() - padding.right(), "end"),
        };

        let mut text = svg_element::Text::new("")
            .set("class", kind.name())
            .set("text-anchor", text_anchor)
            .set("font-family", style.font_family())
            .set("font-size", style.font_size());

        for (idx, line) in lines.into_iter().enumerate() {
            // Baseline at roughly 80% of the line box.
            let baseline = block.min_y() + padding.top() + line_height * (idx as f32 + 0.8);
            let tspan = svg_element::TSpan::new("")
                .set("x", x)
                .set("y", baseline)
                .add(TextNode::new(line));
            text = text.add(tspan);
        }

        self.push(RenderLayer::Text, text);
    }
}
