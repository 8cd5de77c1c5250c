//! Surface configuration
//!
//! Tunables for the binding engine. Derives serde so a host can embed
//! `SurfaceConfig` in its own configuration file; every field has a default
//! so an empty table is valid.

use serde::{Deserialize, Serialize};

/// Engine tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SurfaceConfig {
    /// Two presses of the same control within this window raise a
    /// double-press event before the second press.
    #[serde(default = "default_double_press_window_ms")]
    pub double_press_window_ms: u64,

    /// Divisor applied to an encoder's effective range while fine mode is
    /// engaged (a divisor of 4 means four times more ticks per full scale).
    /// A divisor of 0 is treated as 1.
    #[serde(default = "default_fine_mode_divisor")]
    pub fine_mode_divisor: u16,

    /// Upper bound on `rows * per_row` for a single value set.
    #[serde(default = "default_max_value_set_slots")]
    pub max_value_set_slots: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            double_press_window_ms: default_double_press_window_ms(),
            fine_mode_divisor: default_fine_mode_divisor(),
            max_value_set_slots: default_max_value_set_slots(),
        }
    }
}

fn default_double_press_window_ms() -> u64 {
    400
}

fn default_fine_mode_divisor() -> u16 {
    4
}

fn default_max_value_set_slots() -> usize {
    100
}
