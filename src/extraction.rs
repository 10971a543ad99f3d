//! OCR / ASR collaborator handles
//!
//! Recognition models live outside this crate. A [`TextExtractor`] is an
//! explicit service handle built once at startup and passed to whoever
//! needs it; nothing here is a process-wide singleton.

use crate::error::PipelineError;
use crate::models::InputType;
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Confidence assumed when a transcript does not report one
pub const DEFAULT_TRANSCRIPT_CONFIDENCE: f64 = 0.5;

/// Spoken phrases and their symbols, longest phrases first
const ASR_PHRASES: &[(&str, &str)] = &[
    ("square root of", "√"),
    ("raised to the power of", "^"),
    ("raised to", "^"),
    ("divided by", "/"),
    ("times", "*"),
    ("minus", "-"),
    ("plus", "+"),
    ("equal to", "="),
    ("integral of", "∫"),
    ("limit x tends to", "lim x→"),
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LETTER_DOUBLE_TWO: Regex = Regex::new(r"([a-zA-Z])\s*22\b").unwrap();
    static ref LETTER_TWO: Regex = Regex::new(r"([a-zA-Z])\s*2\b").unwrap();
    static ref LONE_DOUBLE_TWO: Regex = Regex::new(r"\b22\b").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub confidence: f64,
}

#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;
    async fn extract(&self, input_type: InputType, source: &Path) -> Result<Extraction>;
}

/// Spoken math to symbols, e.g. "x squared minus four" style transcripts
pub fn asr_to_math(text: &str) -> String {
    let mut text = text.to_lowercase();
    for (phrase, symbol) in ASR_PHRASES {
        text = text.replace(phrase, symbol);
    }
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Undo the usual OCR loss of superscripts: `x2` and `x 22` read as `x^2`
pub fn repair_ocr_exponents(text: &str) -> String {
    let text = LETTER_DOUBLE_TWO.replace_all(text, "${1}^2");
    let text = LETTER_TWO.replace_all(&text, "${1}^2");
    LONE_DOUBLE_TWO.replace_all(&text, "^2").into_owned()
}

#[derive(Debug, Deserialize)]
struct Transcript {
    text: String,
    confidence: Option<f64>,
}

/// Reads `{"text": ..., "confidence": ...}` written by an external OCR or
/// ASR tool and applies the matching clean-up
pub struct TranscriptExtractor;

#[async_trait::async_trait]
impl TextExtractor for TranscriptExtractor {
    fn name(&self) -> &'static str {
        "transcript"
    }

    async fn extract(&self, input_type: InputType, source: &Path) -> Result<Extraction> {
        let raw = tokio::fs::read_to_string(source).await.map_err(|e| {
            PipelineError::Extraction(format!("cannot read {}: {}", source.display(), e))
        })?;
        let transcript: Transcript = serde_json::from_str(&raw).map_err(|e| {
            PipelineError::Extraction(format!("{} is not a transcript: {}", source.display(), e))
        })?;

        let extraction = match input_type {
            InputType::Text => Extraction {
                text: transcript.text,
                confidence: 1.0,
            },
            InputType::Image => Extraction {
                text: repair_ocr_exponents(&transcript.text),
                confidence: transcript.confidence.unwrap_or(DEFAULT_TRANSCRIPT_CONFIDENCE),
            },
            InputType::Audio => Extraction {
                text: asr_to_math(&transcript.text),
                confidence: transcript.confidence.unwrap_or(DEFAULT_TRANSCRIPT_CONFIDENCE),
            },
        };

        debug!(
            %input_type,
            source = %source.display(),
            confidence = extraction.confidence,
            "Transcript extracted"
        );
        Ok(extraction)
    }
}
