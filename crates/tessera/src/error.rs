//! Error types for layout operations.
//!
//! This module provides [`LayoutError`], the single failure type a layout
//! session reports. Internal errors point at a defect in the engine (phase
//! ordering, constraint declarations); the caller is expected to render an
//! error placeholder for the diagram instead of a partial layout.

use thiserror::Error;

use tessera_core::{identifier::Id, text::MeasureError};

/// The main error type for layout operations.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("unresolved position: {0} was read before it was resolved")]
    UnresolvedPosition(String),

    #[error(
        "infeasible constraints: {} still moving after {rounds} relaxation rounds",
        .nodes.join(", ")
    )]
    InfeasibleConstraints { nodes: Vec<String>, rounds: usize },

    #[error("measurement failed: {0}")]
    Measure(#[from] MeasureError),

    #[error("participant {0} is declared twice")]
    DuplicateParticipant(Id),

    #[error("unbalanced fragment: {0}")]
    UnbalancedFragment(String),

    #[error("internal layout error: {0}")]
    Internal(String),
}

impl LayoutError {
    /// Returns true for errors caused by the engine itself rather than by the
    /// diagram or the text measurement service.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedPosition(_) | Self::InfeasibleConstraints { .. } | Self::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_message_lists_nodes() {
        let err = LayoutError::InfeasibleConstraints {
            nodes: vec!["a.center".to_string(), "b.center".to_string()],
            rounds: 3,
        };
        assert_eq!(
            err.to_string(),
            "infeasible constraints: a.center, b.center still moving after 3 relaxation rounds"
        );
        assert!(err.is_internal());
    }

    #[test]
    fn test_measure_error_is_not_internal() {
        let err = LayoutError::from(MeasureError::InvalidFontSize(0));
        assert!(!err.is_internal());
        assert!(err.to_string().starts_with("measurement failed"));
    }
}
