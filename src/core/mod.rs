//! Core chat components
//!
//! The chat loop controller and the helper that names new transcripts.

mod session;
mod slogan;

pub use session::{ChatSession, InputMode, SessionOptions, SessionSummary};
