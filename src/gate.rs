//! Confidence gate
//!
//! Decides whether an extraction may enter the parser or must go back to a
//! human first. Rules run in order; the first one that fires wins.

use crate::config::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::error::PipelineError;
use crate::models::{Gate, InputType, OriginalInput, ParserInput, ReviewStage};
use crate::Result;
use tracing::{debug, warn};

pub const UNCONFIRMED_REASON: &str = "User did not confirm extracted text";
pub const LOW_CONFIDENCE_REASON: &str =
    "Low extraction confidence. Please review and confirm the text.";

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceGate {
    threshold: f64,
}

impl ConfidenceGate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Build the parser input, or ask for review.
    ///
    /// Low confidence is refused even when the user confirmed; callers are
    /// expected to run a second confirmation step upstream for those.
    pub fn admit(
        &self,
        input_type: InputType,
        original_input: OriginalInput,
        extracted_text: impl Into<String>,
        confidence: f64,
        user_confirmed: bool,
    ) -> Result<Gate<ParserInput>> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(PipelineError::InvalidInput(format!(
                "confidence must be within [0, 1], got {}",
                confidence
            )));
        }

        if !user_confirmed {
            warn!(%input_type, "Confidence gate: extraction not confirmed");
            return Ok(Gate::needs_human(ReviewStage::ConfidenceGate, UNCONFIRMED_REASON));
        }

        if confidence < self.threshold {
            warn!(
                %input_type,
                confidence,
                threshold = self.threshold,
                "Confidence gate: extraction confidence below threshold"
            );
            return Ok(Gate::needs_human(ReviewStage::ConfidenceGate, LOW_CONFIDENCE_REASON));
        }

        debug!(%input_type, confidence, "Confidence gate passed");

        Ok(Gate::Proceed(ParserInput {
            input_type,
            original_input,
            extracted_text: extracted_text.into(),
            confidence,
            user_confirmed,
        }))
    }
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

/// String-typed entry point for callers holding a raw `input_type`.
///
/// An unknown `input_type` is an argument error, never a review request.
pub fn build_parser_input(
    input_type: &str,
    original_input: OriginalInput,
    extracted_text: impl Into<String>,
    confidence: f64,
    user_confirmed: bool,
) -> Result<Gate<ParserInput>> {
    let input_type: InputType = input_type.parse()?;
    ConfidenceGate::default().admit(
        input_type,
        original_input,
        extracted_text,
        confidence,
        user_confirmed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_input(text: &str) -> OriginalInput {
        OriginalInput::Text(text.to_string())
    }

    #[test]
    fn test_invalid_input_type_is_an_error() {
        let result = build_parser_input("video", text_input("x"), "x^2 = 4", 1.0, true);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_unconfirmed_needs_human() {
        let gate = build_parser_input("text", text_input("x"), "x^2 - 4 = 0", 1.0, false).unwrap();
        let review = gate.review().unwrap();
        assert_eq!(review.stage, ReviewStage::ConfidenceGate);
        assert_eq!(review.reason, UNCONFIRMED_REASON);
    }

    #[test]
    fn test_low_confidence_needs_human_even_when_confirmed() {
        for confidence in [0.0, 0.3, 0.6, 0.7499] {
            let gate = build_parser_input("image", text_input("x"), "x^2 - 4 = 0", confidence, true)
                .unwrap();
            assert_eq!(gate.review().unwrap().reason, LOW_CONFIDENCE_REASON);
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let gate = build_parser_input("audio", text_input("x"), "x^2 - 4 = 0", 0.75, true).unwrap();
        let input = gate.into_proceed().unwrap();
        assert_eq!(input.input_type, InputType::Audio);
        assert_eq!(input.extracted_text, "x^2 - 4 = 0");
    }

    #[test]
    fn test_out_of_range_confidence_is_an_error() {
        let gate = ConfidenceGate::default();
        for confidence in [-0.1, 1.5, f64::NAN] {
            let result = gate.admit(InputType::Text, text_input("x"), "x = 1", confidence, true);
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_custom_threshold() {
        let gate = ConfidenceGate::new(0.9);
        let result = gate
            .admit(InputType::Image, text_input("x"), "x^2 - 1 = 0", 0.8, true)
            .unwrap();
        assert!(!result.is_proceed());
    }
}
