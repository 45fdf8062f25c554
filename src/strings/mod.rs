//! # Strings Module
//!
//! Centralizes user-facing strings and prompt text.
//! Ensures consistency in messaging and easier updates.

pub mod messages;
pub mod prompts;
