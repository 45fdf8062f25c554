//! # Interface Layer
//!
//! The editor-facing boundary: the newline-delimited JSON protocol that
//! runs over the process stdio.

pub mod protocol;
