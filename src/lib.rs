//! Math Mentor
//!
//! A pipeline that turns typed, scanned or spoken math problems into
//! verified solutions:
//! - gates low-confidence or unconfirmed extractions for human review
//! - parses and classifies the problem, asking again when it is ambiguous
//! - routes on surface syntax to an exact symbolic strategy
//! - validates the answer shape and verifies the result
//! - remembers verified solutions and user feedback
//!
//! PIPELINE:
//! INPUT → GATE → PARSE → ROUTE → RECALL? → SOLVE → VERIFY → SAVE

pub mod agent;
pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod extraction;
pub mod gate;
pub mod math;
pub mod memory;
pub mod models;
pub mod parser;
pub mod retrieval;
pub mod router;
pub mod solver;
pub mod validator;
pub mod verification;

pub use error::Result;

// Re-export common types
pub use agent::MathMentor;
pub use gate::build_parser_input;
pub use math::normalize_math_text;
pub use models::*;
pub use validator::AnswerValidator;
