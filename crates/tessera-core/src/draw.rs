//! Draw-sink contract between the layout engine and a renderer.
//!
//! Once every position is resolved, tiles describe themselves as a handful of
//! primitives (rectangles, lines, polygons and text blocks) pushed into a
//! [`DrawSink`]. The engine never looks at what the sink produces, so the same
//! layout can feed a vector writer, a rasterizer or a test recorder.
//!
//! - [`SvgSink`] - Collects SVG nodes per [`RenderLayer`] and builds a document
//! - [`RecordingSink`] - Stores every call as a [`DrawCommand`]

mod layer;
mod recording;
mod svg_sink;

pub use layer::RenderLayer;
pub use recording::{DrawCommand, RecordingSink};
pub use svg_sink::SvgSink;

use crate::{
    geometry::{Bounds, Point},
    text::TextStyle,
};

/// What a primitive belongs to.
///
/// Sinks use the kind to choose styling and stacking order; the engine uses
/// it to tag every primitive a tile emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    ParticipantHead,
    Lifeline,
    Activation,
    Destroy,
    Message,
    SelfMessage,
    Note,
    Divider,
    Delay,
    Fragment,
}

impl VisualKind {
    /// The layer primitives of this kind are stacked on.
    pub fn layer(self) -> RenderLayer {
        match self {
            Self::Lifeline => RenderLayer::Lifeline,
            Self::Fragment => RenderLayer::Fragment,
            Self::ParticipantHead | Self::Divider | Self::Delay => RenderLayer::Content,
            Self::Activation | Self::Destroy => RenderLayer::Activation,
            Self::Note => RenderLayer::Note,
            Self::Message | Self::SelfMessage => RenderLayer::Arrow,
        }
    }

    /// Returns a short lowercase name, used as a CSS class by [`SvgSink`].
    pub fn name(self) -> &'static str {
        match self {
            Self::ParticipantHead => "participant",
            Self::Lifeline => "lifeline",
            Self::Activation => "activation",
            Self::Destroy => "destroy",
            Self::Message => "message",
            Self::SelfMessage => "self-message",
            Self::Note => "note",
            Self::Divider => "divider",
            Self::Delay => "delay",
            Self::Fragment => "fragment",
        }
    }
}

/// Stroke pattern of a line or outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// SVG `stroke-dasharray` value, `None` for solid strokes.
    pub fn dasharray(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("2,3"),
        }
    }
}

/// Horizontal alignment of a text block inside its bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

/// Receiver of resolved drawing primitives.
///
/// All coordinates are absolute diagram coordinates.
pub trait DrawSink {
    /// An axis-aligned rectangle outline (filled according to the kind).
    fn rect(&mut self, kind: VisualKind, bounds: Bounds, line: LineStyle);

    /// A straight segment.
    fn line(&mut self, kind: VisualKind, from: Point, to: Point, line: LineStyle);

    /// An open chain of segments.
    fn polyline(&mut self, kind: VisualKind, points: &[Point], line: LineStyle);

    /// A closed shape.
    fn polygon(&mut self, kind: VisualKind, points: &[Point], filled: bool);

    /// A text block laid out inside `block`, which already includes the
    /// style's padding.
    fn text(
        &mut self,
        kind: VisualKind,
        block: Bounds,
        content: &str,
        anchor: TextAnchor,
        style: &TextStyle,
    );
}
