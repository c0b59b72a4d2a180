//! Google Custom Search API client
//!
//! Builds CSE requests, executes them with a bounded timeout, and
//! validates the response. Recoverable failures come back as an absent
//! outcome; transport failures propagate as errors.

mod client;
mod types;

pub use client::CseClient;
pub use types::*;
