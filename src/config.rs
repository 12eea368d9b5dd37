//! World tuning knobs
//!
//! Kept in one serde-friendly struct so hosts can load them from their own
//! settings files alongside everything else.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Construction-time configuration for a [`crate::World`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length of one grid cell, in world units. Pick something close
    /// to the size of a typical body; the value is fixed for the lifetime
    /// of the world.
    pub cell_size: f32,
    /// Response used when neither the body's response map nor its
    /// "default" entry names one.
    pub default_response: String,
    /// Hard cap on responses applied during a single move. Exceeding it is
    /// an internal invariant violation: logged, and resolution aborts with
    /// the best-effort position.
    pub max_resolve_steps: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            cell_size: consts::DEFAULT_CELL_SIZE,
            default_response: consts::DEFAULT_RESPONSE.to_string(),
            max_resolve_steps: consts::DEFAULT_MAX_RESOLVE_STEPS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorldConfig::default();
        assert_eq!(config.cell_size, 64.0);
        assert_eq!(config.default_response, "slide");
        assert_eq!(config.max_resolve_steps, 64);
    }
}
