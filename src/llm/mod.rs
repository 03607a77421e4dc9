//! Text-generation seam.
//!
//! This module provides the note-summarization interface and its
//! OpenAI-compatible HTTP implementation.

pub mod client;

pub use client::{LlmError, NoteSummarizer, OpenAiClient};
