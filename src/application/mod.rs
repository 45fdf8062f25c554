//! # Application Layer
//!
//! Contains the core logic of the backend: action extraction and dispatch,
//! the file operation handlers, the confirmation gate and the per-session
//! orchestration.

pub mod compose;
pub mod confirm;
pub mod dispatch;
pub mod extract;
pub mod runner;
pub mod search;
pub mod session;
pub mod workspace;
