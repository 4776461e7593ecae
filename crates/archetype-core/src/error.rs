//! Scoring error types.
//!
//! These represent invalid inputs to the scoring engine. Loading and I/O
//! failures are reported through `anyhow` with context instead.

use thiserror::Error;

/// Errors raised while scoring an assessment.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    /// A Likert answer outside the 1..=5 range.
    #[error("likert value {0} is outside 1..=5")]
    InvalidLikert(i64),

    /// An answer references a question the instrument does not define.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// A weight or archetype references a dimension the instrument does not define.
    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    /// Matching weights are unusable (negative, non-finite, or all zero).
    #[error("invalid matching weights: {0}")]
    InvalidWeights(String),

    /// Monte Carlo settings are unusable.
    #[error("invalid simulation settings: {0}")]
    InvalidSimulation(String),
}

impl ScoringError {
    /// Returns `true` if the error came from user-supplied answers rather
    /// than from the instrument definition.
    pub fn is_answer_error(&self) -> bool {
        matches!(
            self,
            ScoringError::InvalidLikert(_) | ScoringError::UnknownQuestion(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_errors_are_classified() {
        assert!(ScoringError::InvalidLikert(7).is_answer_error());
        assert!(ScoringError::UnknownQuestion("q9".into()).is_answer_error());
        assert!(!ScoringError::InvalidWeights("all zero".into()).is_answer_error());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ScoringError::InvalidLikert(0).to_string(),
            "likert value 0 is outside 1..=5"
        );
        assert_eq!(
            ScoringError::UnknownDimension("empathy".into()).to_string(),
            "unknown dimension: empathy"
        );
    }
}
