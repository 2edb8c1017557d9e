//! Creature size categories

use serde::{Deserialize, Serialize};

/// Creature size category.
///
/// Only the three sizes playable races use are modeled; the modifier
/// methods follow the usual d20 size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeCategory {
    Small,
    Medium,
    Large,
}

impl Default for SizeCategory {
    fn default() -> Self {
        SizeCategory::Medium
    }
}

impl SizeCategory {
    /// Size modifier to AC and attack rolls.
    pub fn attack_and_ac_modifier(&self) -> i32 {
        match self {
            SizeCategory::Small => 1,
            SizeCategory::Medium => 0,
            SizeCategory::Large => -1,
        }
    }

    /// Special size modifier to CMB and CMD (inverse of the AC modifier).
    pub fn combat_maneuver_modifier(&self) -> i32 {
        -self.attack_and_ac_modifier()
    }
}
