//! Centralized constants for Plotline runtime configuration
//!
//! All timeout and sampling defaults in one place for easy tuning.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════
// Provider Timeouts
// ═══════════════════════════════════════════════════════════════

/// Timeout for one generation call (long outlines and scene text)
pub const INFER_TIMEOUT: Duration = Duration::from_secs(180);

/// Timeout for establishing HTTP connections
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default OpenAI-compatible endpoint root
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// ═══════════════════════════════════════════════════════════════
// Sampling Defaults
// ═══════════════════════════════════════════════════════════════

pub const DEFAULT_MODEL: &str = "gpt-4";

/// Structured stages favour consistency
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Scene prose gets a little more room
pub const DEFAULT_SCENE_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 2048;

// ═══════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_positive() {
        assert!(INFER_TIMEOUT.as_secs() > 0);
        assert!(CONNECT_TIMEOUT.as_secs() > 0);
    }

    #[test]
    fn infer_timeout_exceeds_connect() {
        assert!(INFER_TIMEOUT > CONNECT_TIMEOUT);
    }

    #[test]
    fn temperatures_in_range() {
        for t in [DEFAULT_TEMPERATURE, DEFAULT_SCENE_TEMPERATURE] {
            assert!((0.0..=2.0).contains(&t));
        }
        assert!(DEFAULT_SCENE_TEMPERATURE > DEFAULT_TEMPERATURE);
    }
}
