//! Text measurement contract used by the layout engine.
//!
//! The layout engine never inspects fonts itself. Every label, note body and
//! participant name is measured once, up front, through a [`TextMeasure`]
//! implementation and the resulting [`Size`] is all the engine retains.
//!
//! # Overview
//!
//! - [`TextStyle`] - Font family, size and padding applied to a text block
//! - [`TextMeasure`] - The "measure text -> width/height" service
//! - [`FontMeasure`] - Measurement with real font shaping through `cosmic-text`
//! - [`MonospaceMeasure`] - Deterministic fixed-advance approximation
//!
//! # Quick Start
//!
//! ```
//! # use tessera_core::text::{MonospaceMeasure, TextMeasure, TextStyle};
//! let measure = MonospaceMeasure::default();
//! let style = TextStyle::default();
//! let size = measure.measure_block("hello()", &style).unwrap();
//! assert!(size.width() > 0.0);
//! ```

use std::sync::Mutex;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{Insets, Size};

/// Failure to measure a block of text.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("font size must be positive, got {0}")]
    InvalidFontSize(u16),

    #[error("font system is unavailable: {0}")]
    FontSystemUnavailable(String),

    #[error("cannot measure {text:?}: {reason}")]
    Unmeasurable { text: String, reason: String },
}

/// Visual style of a text block as far as measurement is concerned.
///
/// # Default Values
///
/// | Property | Default |
/// |----------|---------|
/// | Font family | `"sans-serif"` |
/// | Font size | `13` |
/// | Padding | `2` vertical, `4` horizontal |
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    font_family: String,
    font_size: u16,
    padding: Insets,
}

impl TextStyle {
    /// Creates a style with the given family and size and the default padding.
    pub fn new(font_family: &str, font_size: u16) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size,
            ..Self::default()
        }
    }

    /// Sets the padding around the text content (builder style).
    pub fn with_padding(mut self, padding: Insets) -> Self {
        self.padding = padding;
        self
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    fn checked_font_size(&self) -> Result<f32, MeasureError> {
        if self.font_size == 0 {
            return Err(MeasureError::InvalidFontSize(self.font_size));
        }
        Ok(self.font_size as f32)
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: String::from("sans-serif"),
            font_size: 13,
            padding: Insets::symmetric(2.0, 4.0),
        }
    }
}

/// Measures text content for a given style.
///
/// Implementations must be pure: the same text and style always produce the
/// same size.
pub trait TextMeasure {
    /// Returns the size of `text` without the style's padding.
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Size, MeasureError>;

    /// Returns the size of `text` including the style's padding.
    fn measure_block(&self, text: &str, style: &TextStyle) -> Result<Size, MeasureError> {
        Ok(self.measure(text, style)?.add_padding(style.padding()))
    }
}

/// Fixed-advance text measurement.
///
/// Every character advances by `font_size * advance_ratio` and every line is
/// `font_size * line_height_ratio` tall. Useful when no fonts are installed
/// and in tests that need exact numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    advance_ratio: f32,
    line_height_ratio: f32,
}

impl MonospaceMeasure {
    pub fn new(advance_ratio: f32, line_height_ratio: f32) -> Self {
        Self {
            advance_ratio,
            line_height_ratio,
        }
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(0.6, 1.2)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Size, MeasureError> {
        let font_size = style.checked_font_size()?;
        if text.is_empty() {
            return Ok(Size::default());
        }

        let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let line_count = text.lines().count().max(1);

        Ok(Size::new(
            longest as f32 * font_size * self.advance_ratio,
            line_count as f32 * font_size * self.line_height_ratio,
        ))
    }
}

/// Text measurement through real font shaping.
///
/// Keeps one `cosmic-text` [`FontSystem`] alive for its whole lifetime since
/// loading system fonts is expensive. Measurements are serialized through a
/// mutex, so a single `FontMeasure` can be shared across layout sessions.
pub struct FontMeasure {
    font_system: Mutex<FontSystem>,
}

impl FontMeasure {
    /// Loads the system fonts.
    pub fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }
}

impl Default for FontMeasure {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMeasure").finish_non_exhaustive()
    }
}

impl TextMeasure for FontMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Size, MeasureError> {
        let font_size = style.checked_font_size()?;
        if text.is_empty() {
            return Ok(Size::default());
        }

        let mut font_system = self
            .font_system
            .lock()
            .map_err(|err| MeasureError::FontSystemUnavailable(err.to_string()))?;

        // Points to pixels at standard DPI.
        let font_size_px = font_size * 1.33;
        let metrics = Metrics::new(font_size_px, font_size_px * 1.15);

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(Family::Name(style.font_family()));

        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                max_width = max_width.max(last.x + last.w);
            }
            total_height += metrics.line_height;
        }

        if total_height == 0.0 {
            debug!(text; "No layout runs produced, falling back to estimated advance");
            max_width = text.chars().count() as f32 * font_size_px * 0.55;
            total_height = metrics.line_height;
        }

        if !max_width.is_finite() || !total_height.is_finite() {
            return Err(MeasureError::Unmeasurable {
                text: text.to_string(),
                reason: "shaping produced a non-finite extent".to_string(),
            });
        }

        Ok(Size::new(max_width, total_height))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_monospace_single_line() {
        let measure = MonospaceMeasure::new(0.5, 1.0);
        let style = TextStyle::new("mono", 10);
        let size = measure.measure("abcd", &style).unwrap();
        assert_approx_eq!(f32, size.width(), 20.0);
        assert_approx_eq!(f32, size.height(), 10.0);
    }

    #[test]
    fn test_monospace_multiline_uses_longest_line() {
        let measure = MonospaceMeasure::new(0.5, 1.0);
        let style = TextStyle::new("mono", 10);
        let size = measure.measure("ab\nabcdef\nabc", &style).unwrap();
        assert_approx_eq!(f32, size.width(), 30.0);
        assert_approx_eq!(f32, size.height(), 30.0);
    }

    #[test]
    fn test_monospace_empty_text_is_zero() {
        let size = MonospaceMeasure::default()
            .measure("", &TextStyle::default())
            .unwrap();
        assert!(size.is_zero());
    }

    #[test]
    fn test_measure_block_adds_padding() {
        let measure = MonospaceMeasure::new(0.5, 1.0);
        let style = TextStyle::new("mono", 10).with_padding(Insets::uniform(3.0));
        let size = measure.measure_block("ab", &style).unwrap();
        assert_approx_eq!(f32, size.width(), 16.0);
        assert_approx_eq!(f32, size.height(), 16.0);
    }

    #[test]
    fn test_zero_font_size_is_rejected() {
        let style = TextStyle::new("mono", 0);
        let err = MonospaceMeasure::default().measure("x", &style).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidFontSize(0)));
    }

    #[test]
    fn test_font_measure_larger_font_is_larger() {
        let measure = FontMeasure::new();
        let small = measure.measure("Test", &TextStyle::new("Arial", 12)).unwrap();
        let large = measure.measure("Test", &TextStyle::new("Arial", 24)).unwrap();
        assert!(large.width() > small.width());
        assert!(large.height() > small.height());
    }
}
