//! Configuration for sequence layout.
//!
//! [`LayoutConfig`] collects every spacing constant the tiles use when they
//! declare constraints and heights. It implements [`serde::Deserialize`] so it
//! can be loaded from an external file; every field is optional there and
//! falls back to its default.
//!
//! # Example
//!
//! ```
//! # use tessera::config::LayoutConfig;
//! let config = LayoutConfig::default().with_participant_spacing(40.0);
//! assert_eq!(config.participant_spacing(), 40.0);
//! ```

use serde::Deserialize;

use tessera_core::{geometry::Insets, text::TextStyle};

/// Spacing and sizing constants for sequence layout.
///
/// All values are in diagram units (pixels for SVG output).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum gap between the right edge of one lifeline and the left edge of the next.
    participant_spacing: f32,
    /// Horizontal margin on each side of a message label.
    message_margin: f32,
    /// Minimum horizontal extent of a self-message loop.
    self_loop_width: f32,
    /// Vertical drop of a self-message loop.
    self_loop_height: f32,
    /// Vertical padding above and below every row.
    row_padding: f32,
    /// Size of arrow heads.
    arrow_head: f32,
    /// Gap between a lifeline (or message end) and a note beside it.
    note_gap: f32,
    /// How far a note spanning two lifelines reaches past each of them.
    note_overhang: f32,
    /// Padding between a note's outline and its text.
    note_padding: Insets,
    /// Padding between a participant head's outline and its name.
    head_padding: Insets,
    /// Width of an activation bar.
    activation_width: f32,
    /// Horizontal shift of each nested activation bar.
    activation_nesting_offset: f32,
    /// Height given to an activation that opens and closes at the same Y.
    min_activation_height: f32,
    /// Minimum height of a divider row.
    divider_height: f32,
    /// Height of a delay row.
    delay_height: f32,
    /// Padding between a fragment frame and its content.
    fragment_padding: f32,
    /// Extra space below the last tile before lifelines end.
    lifeline_tail: f32,
    /// Size of the cross drawn for a destroyed participant.
    destroy_size: f32,
    /// Margin around the diagram in rendered output.
    diagram_margin: f32,
    /// Text style for every label.
    text: TextStyle,
}

impl LayoutConfig {
    pub fn participant_spacing(&self) -> f32 {
        self.participant_spacing
    }

    pub fn message_margin(&self) -> f32 {
        self.message_margin
    }

    pub fn self_loop_width(&self) -> f32 {
        self.self_loop_width
    }

    pub fn self_loop_height(&self) -> f32 {
        self.self_loop_height
    }

    pub fn row_padding(&self) -> f32 {
        self.row_padding
    }

    pub fn arrow_head(&self) -> f32 {
        self.arrow_head
    }

    pub fn note_gap(&self) -> f32 {
        self.note_gap
    }

    pub fn note_overhang(&self) -> f32 {
        self.note_overhang
    }

    pub fn note_padding(&self) -> Insets {
        self.note_padding
    }

    pub fn head_padding(&self) -> Insets {
        self.head_padding
    }

    pub fn activation_width(&self) -> f32 {
        self.activation_width
    }

    pub fn activation_nesting_offset(&self) -> f32 {
        self.activation_nesting_offset
    }

    pub fn min_activation_height(&self) -> f32 {
        self.min_activation_height
    }

    pub fn divider_height(&self) -> f32 {
        self.divider_height
    }

    pub fn delay_height(&self) -> f32 {
        self.delay_height
    }

    pub fn fragment_padding(&self) -> f32 {
        self.fragment_padding
    }

    pub fn lifeline_tail(&self) -> f32 {
        self.lifeline_tail
    }

    pub fn destroy_size(&self) -> f32 {
        self.destroy_size
    }

    pub fn diagram_margin(&self) -> f32 {
        self.diagram_margin
    }

    pub fn text(&self) -> &TextStyle {
        &self.text
    }

    /// Sets the minimum gap between neighbouring lifelines (builder style).
    pub fn with_participant_spacing(mut self, spacing: f32) -> Self {
        self.participant_spacing = spacing;
        self
    }

    /// Sets the margin on each side of a message label (builder style).
    pub fn with_message_margin(mut self, margin: f32) -> Self {
        self.message_margin = margin;
        self
    }

    /// Sets the minimum self-message loop width (builder style).
    pub fn with_self_loop_width(mut self, width: f32) -> Self {
        self.self_loop_width = width;
        self
    }

    /// Sets the vertical row padding (builder style).
    pub fn with_row_padding(mut self, padding: f32) -> Self {
        self.row_padding = padding;
        self
    }

    /// Sets the gap between notes and what they are attached to (builder style).
    pub fn with_note_gap(mut self, gap: f32) -> Self {
        self.note_gap = gap;
        self
    }

    /// Sets the label text style (builder style).
    pub fn with_text(mut self, text: TextStyle) -> Self {
        self.text = text;
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            participant_spacing: 20.0,
            message_margin: 10.0,
            self_loop_width: 40.0,
            self_loop_height: 14.0,
            row_padding: 6.0,
            arrow_head: 8.0,
            note_gap: 8.0,
            note_overhang: 12.0,
            note_padding: Insets::symmetric(6.0, 10.0),
            head_padding: Insets::symmetric(6.0, 12.0),
            activation_width: 10.0,
            activation_nesting_offset: 5.0,
            min_activation_height: 10.0,
            divider_height: 20.0,
            delay_height: 30.0,
            fragment_padding: 10.0,
            lifeline_tail: 20.0,
            destroy_size: 14.0,
            diagram_margin: 10.0,
            text: TextStyle::default(),
        }
    }
}
