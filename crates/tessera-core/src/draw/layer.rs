//! Stacking order of drawing primitives.

/// Rendering layers, bottom to top.
///
/// The `Ord` derive follows declaration order, so sorting primitives by
/// layer yields the paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Dashed participant lifelines
    Lifeline,
    /// Combined fragment frames
    Fragment,
    /// Participant heads, dividers and delays
    Content,
    /// Activation bars and destroy marks
    Activation,
    /// Note bodies
    Note,
    /// Message arrows
    Arrow,
    /// All text, painted last so nothing covers a label
    Text,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lifeline => "lifeline",
            Self::Fragment => "fragment",
            Self::Content => "content",
            Self::Activation => "activation",
            Self::Note => "note",
            Self::Arrow => "arrow",
            Self::Text => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_topmost() {
        let mut layers = vec![
            RenderLayer::Text,
            RenderLayer::Lifeline,
            RenderLayer::Note,
            RenderLayer::Arrow,
        ];
        layers.sort();
        assert_eq!(layers.first(), Some(&RenderLayer::Lifeline));
        assert_eq!(layers.last(), Some(&RenderLayer::Text));
    }
}
