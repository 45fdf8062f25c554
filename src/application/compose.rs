//! # Response Composition
//!
//! Assembles the final chat response from the assistant's prose and the
//! rendered results of any dispatched actions.

use crate::application::extract::strip_spans;
use crate::domain::types::Outcome;

/// Renders the outcomes of one action into a single text block.
///
/// Most actions produce exactly one outcome; project creation produces one
/// line per file plus a summary.
pub fn render_block(outcomes: &[Outcome]) -> String {
    outcomes
        .iter()
        .map(Outcome::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the reply text sent back to the user.
///
/// With no action results the reply passes through untouched. Otherwise the
/// extracted JSON spans are stripped from the prose and the result blocks are
/// appended, double-newline separated, in the order the actions appeared.
pub fn compose_response(reply: &str, spans: &[(usize, usize)], blocks: &[String]) -> String {
    if blocks.is_empty() {
        return reply.to_string();
    }
    let cleaned = strip_spans(reply, spans);
    let joined = blocks.join("\n\n");
    if cleaned.is_empty() {
        joined
    } else {
        format!("{cleaned}\n\n{joined}")
    }
}
