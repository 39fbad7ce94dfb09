//! Optional model-backed diagram enhancement
//!
//! The generated diagram is sent to one configured chat-completion provider,
//! a JSON graph is pulled back out of the reply, and new nodes and edges are
//! merged in additively. Failures never abort the run.

pub mod bridge;
pub mod enhancer;
pub mod merge;
pub mod prompt;
pub mod providers;
pub mod response;


pub use bridge::*;
pub use enhancer::Enhancer;
pub use merge::merge_diagrams;
pub use prompt::{SYSTEM_PROMPT, build_prompt};
pub use providers::create_provider;
pub use response::{extract_json, parse_reply, validate_response};
