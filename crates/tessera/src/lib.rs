//! Tessera - tile-based sequence diagram layout.
//!
//! A [`Diagram`](event::Diagram) is a list of participants and an ordered list
//! of events. Laying it out turns every event into a tile, collects the
//! horizontal constraints the tiles need, stacks the tiles vertically and
//! resolves all lifeline positions in one pass. The result is a
//! [`ResolvedLayout`](layout::ResolvedLayout) that can be inspected or drawn
//! into any [`DrawSink`](draw::DrawSink).
//!
//! Text measurement is pluggable through [`TextMeasure`].

pub mod config;
pub mod event;
pub mod layout;

mod error;

pub use tessera_core::{draw, geometry, identifier, text};

pub use error::LayoutError;

use log::info;

use config::LayoutConfig;
use event::Diagram;
use layout::{LayoutSession, ResolvedLayout};
use text::TextMeasure;

/// Entry point for laying out sequence diagrams.
///
/// # Examples
///
/// ```rust
/// use tessera::{SequenceLayout, event::{Diagram, SequenceEvent}, text::MonospaceMeasure};
///
/// let diagram = Diagram::new()
///     .with_participant("client", "Client")
///     .with_participant("server", "Server")
///     .with_event(SequenceEvent::message("client", "server", Some("GET /")));
///
/// let layout = SequenceLayout::default()
///     .layout(&diagram, &MonospaceMeasure::default())
///     .expect("layout failed");
///
/// assert_eq!(layout.lifelines().len(), 2);
/// assert!(layout.lifelines()[0].x() < layout.lifelines()[1].x());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequenceLayout {
    config: LayoutConfig,
}

impl SequenceLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out `diagram`, measuring text with `measure`.
    ///
    /// # Errors
    ///
    /// Fails on malformed input (duplicate participants, unbalanced
    /// fragments), on measurement failures and on internal consistency
    /// errors such as infeasible constraints.
    pub fn layout(
        &self,
        diagram: &Diagram,
        measure: &dyn TextMeasure,
    ) -> Result<ResolvedLayout, LayoutError> {
        info!(
            participants = diagram.participants().len(),
            events = diagram.events().len();
            "Laying out sequence diagram"
        );
        let layout = LayoutSession::new(&self.config, measure).run(diagram)?;
        info!(
            lifelines = layout.lifelines().len(),
            tiles = layout.placements().len(),
            width = layout.bounds().width(),
            height = layout.bounds().height();
            "Sequence diagram laid out"
        );
        Ok(layout)
    }

    /// Lays out `diagram` and renders it to an SVG string.
    pub fn render_svg(
        &self,
        diagram: &Diagram,
        measure: &dyn TextMeasure,
    ) -> Result<String, LayoutError> {
        self.layout(diagram, measure)?.to_svg()
    }
}
