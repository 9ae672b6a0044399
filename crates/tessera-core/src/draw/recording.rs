//! A sink that records primitives instead of rendering them.

use crate::{
    draw::{DrawSink, LineStyle, TextAnchor, VisualKind},
    geometry::{Bounds, Point},
    text::TextStyle,
};

/// One primitive received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        kind: VisualKind,
        bounds: Bounds,
        line: LineStyle,
    },
    Line {
        kind: VisualKind,
        from: Point,
        to: Point,
        line: LineStyle,
    },
    Polyline {
        kind: VisualKind,
        points: Vec<Point>,
        line: LineStyle,
    },
    Polygon {
        kind: VisualKind,
        points: Vec<Point>,
        filled: bool,
    },
    Text {
        kind: VisualKind,
        block: Bounds,
        content: String,
        anchor: TextAnchor,
    },
}

impl DrawCommand {
    pub fn kind(&self) -> VisualKind {
        match self {
            Self::Rect { kind, .. }
            | Self::Line { kind, .. }
            | Self::Polyline { kind, .. }
            | Self::Polygon { kind, .. }
            | Self::Text { kind, .. } => *kind,
        }
    }
}

/// Keeps every primitive in call order.
///
/// ```
/// # use tessera_core::draw::{DrawSink, LineStyle, RecordingSink, VisualKind};
/// # use tessera_core::geometry::Point;
/// let mut sink = RecordingSink::new();
/// sink.line(VisualKind::Message, Point::new(0.0, 0.0), Point::new(10.0, 0.0), LineStyle::Solid);
/// assert_eq!(sink.commands().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands of one kind, in call order.
    pub fn of_kind(&self, kind: VisualKind) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |command| command.kind() == kind)
    }

    /// Text contents in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSink for RecordingSink {
    fn rect(&mut self, kind: VisualKind, bounds: Bounds, line: LineStyle) {
        self.commands.push(DrawCommand::Rect { kind, bounds, line });
    }

    fn line(&mut self, kind: VisualKind, from: Point, to: Point, line: LineStyle) {
        self.commands.push(DrawCommand::Line {
            kind,
            from,
            to,
            line,
        });
    }

    fn polyline(&mut self, kind: VisualKind, points: &[Point], line: LineStyle) {
        self.commands.push(DrawCommand::Polyline {
            kind,
            points: points.to_vec(),
            line,
        });
    }

    fn polygon(&mut self, kind: VisualKind, points: &[Point], filled: bool) {
        self.commands.push(DrawCommand::Polygon {
            kind,
            points: points.to_vec(),
            filled,
        });
    }

    fn text(
        &mut self,
        kind: VisualKind,
        block: Bounds,
        content: &str,
        anchor: TextAnchor,
        _style: &TextStyle,
    ) {
        self.commands.push(DrawCommand::Text {
            kind,
            block,
            content: content.to_string(),
            anchor,
        });
    }
}
