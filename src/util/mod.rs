//! Utilities Module - shared constants
//!
//! - `constants`: Centralized timeouts and sampling defaults

pub mod constants;

// Re-export public types
pub use constants::{
    CONNECT_TIMEOUT, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_SCENE_TEMPERATURE,
    DEFAULT_TEMPERATURE, INFER_TIMEOUT, OPENAI_BASE_URL,
};
