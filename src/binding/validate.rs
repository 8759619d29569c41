//! Task ID Validation
//!
//! Task IDs must be snake_case so they can appear in template references:
//! - Start with lowercase letter
//! - Contain only lowercase letters, digits, underscores
//! - Not a reserved reference word (`args`, `input`, `tasks`, `parent_output`)
//!
//! Dots are the field path separator in `task.output.field`.

use crate::error::{PlotlineError, Result};

/// Words that start a non-task reference
pub const RESERVED_IDS: &[&str] = &["args", "input", "tasks", "parent_output"];

const SHAPE: &str = "must start with lowercase letter (a-z), then lowercase letters, digits, or underscores";

/// Validate a task ID (single pass, no regex)
pub fn validate_task_id(id: &str) -> Result<()> {
    let Some(&first) = id.as_bytes().first() else {
        return Err(invalid(id, "cannot be empty"));
    };

    if !first.is_ascii_lowercase() {
        return Err(invalid(id, SHAPE));
    }

    if !id.bytes().skip(1).all(is_id_byte) {
        return Err(invalid(id, SHAPE));
    }

    if RESERVED_IDS.contains(&id) {
        return Err(invalid(id, "reserved reference word"));
    }

    Ok(())
}

#[inline]
pub(super) fn is_id_byte(byte: u8) -> bool {
    byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'_'
}

fn invalid(id: &str, reason: &str) -> PlotlineError {
    PlotlineError::InvalidTaskId {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ═══════════════════════════════════════════════════════════════
    // Valid task IDs
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn valid_ids() {
        for id in ["w", "plot_architect", "scene_shaper", "step2", "a__b", "v2_parser"] {
            assert!(validate_task_id(id).is_ok(), "{}", id);
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // Invalid task IDs - PLOT-027
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn reject_empty() {
        let err = validate_task_id("").unwrap_err();
        assert!(err.to_string().contains("PLOT-027"));
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn reject_bad_shape() {
        for id in ["Plot", "2nd_act", "_hidden", "scene-shaper", "plot.architect", "café"] {
            assert!(
                matches!(validate_task_id(id), Err(PlotlineError::InvalidTaskId { .. })),
                "{}",
                id
            );
        }
    }

    #[test]
    fn reject_reserved_words() {
        for id in RESERVED_IDS {
            let err = validate_task_id(id).unwrap_err();
            assert!(err.to_string().contains("reserved"));
        }
    }
}
