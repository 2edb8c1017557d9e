//! Weapon and armor entities.

use serde::{Deserialize, Serialize};

use crate::value_objects::DamageDice;

/// Weapon training category required to use a weapon without penalty.
///
/// Ordered by rank: exotic training implies nothing about martial weapons,
/// but a martial weapon is also covered by exotic training in that weapon's
/// specific id, never by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponTraining {
    Simple,
    Martial,
    Exotic,
}

/// How a weapon is wielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeaponHandling {
    Light,
    OneHanded,
    TwoHanded,
    Ranged,
}

/// A weapon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    /// Unique identifier for this weapon
    pub id: String,
    /// Display name
    pub name: String,
    /// Training category required for proficient use
    pub training: WeaponTraining,
    /// How the weapon is wielded
    pub handling: WeaponHandling,
    /// Base damage for a medium wielder
    pub damage: DamageDice,
    /// Lowest d20 roll that threatens a critical (20 or 19)
    #[serde(default = "default_crit_range")]
    pub crit_range: u8,
    /// Critical damage multiplier
    #[serde(default = "default_crit_multiplier")]
    pub crit_multiplier: u8,
    /// Fighter-style weapon group this weapon belongs to (e.g. "blades")
    #[serde(default)]
    pub group: Option<String>,
    /// Weight in pounds
    #[serde(default)]
    pub weight: u32,
    /// Masterwork quality (+1 to attack, does not stack with enhancement)
    #[serde(default)]
    pub masterwork: bool,
    /// Magical enhancement bonus (+N to attack and damage)
    #[serde(default)]
    pub enhancement: i32,
}

fn default_crit_range() -> u8 {
    20
}

fn default_crit_multiplier() -> u8 {
    2
}

impl Weapon {
    /// Create a new weapon with required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        training: WeaponTraining,
        handling: WeaponHandling,
        damage: DamageDice,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            training,
            handling,
            damage,
            crit_range: 20,
            crit_multiplier: 2,
            group: None,
            weight: 0,
            masterwork: false,
            enhancement: 0,
        }
    }

    /// Builder: set the critical profile.
    pub fn with_crit(mut self, range: u8, multiplier: u8) -> Self {
        self.crit_range = range;
        self.crit_multiplier = multiplier;
        self
    }

    /// Builder: set the weapon group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Builder: set the weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_ranged(&self) -> bool {
        self.handling == WeaponHandling::Ranged
    }

    pub fn is_light(&self) -> bool {
        self.handling == WeaponHandling::Light
    }

    /// Quality bonus to attack rolls: enhancement, or +1 for masterwork.
    pub fn attack_quality_bonus(&self) -> i32 {
        if self.enhancement > 0 {
            self.enhancement
        } else if self.masterwork {
            1
        } else {
            0
        }
    }

    /// Quality bonus to damage rolls: enhancement only.
    pub fn damage_quality_bonus(&self) -> i32 {
        self.enhancement
    }
}

/// Armor category for proficiency purposes.
///
/// Tower shields are their own category: generic shield training never
/// covers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArmorCategory {
    Light,
    Medium,
    Heavy,
    Shield,
    TowerShield,
}

impl ArmorCategory {
    pub fn is_shield(&self) -> bool {
        matches!(self, ArmorCategory::Shield | ArmorCategory::TowerShield)
    }
}

/// A suit of armor or a shield.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Armor {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Proficiency category
    pub category: ArmorCategory,
    /// Armor (or shield) bonus to AC
    pub ac_bonus: i32,
    /// Maximum DEX bonus to AC allowed while worn (None = uncapped)
    #[serde(default)]
    pub max_dex: Option<i32>,
    /// Armor check penalty (stored as a non-positive number)
    #[serde(default)]
    pub check_penalty: i32,
    /// Weight in pounds
    #[serde(default)]
    pub weight: u32,
    /// Magical enhancement bonus to AC
    #[serde(default)]
    pub enhancement: i32,
}

impl Armor {
    /// Create a new armor entry with required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: ArmorCategory,
        ac_bonus: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            ac_bonus,
            max_dex: None,
            check_penalty: 0,
            weight: 0,
            enhancement: 0,
        }
    }

    /// Builder: set the maximum DEX bonus.
    pub fn with_max_dex(mut self, max_dex: i32) -> Self {
        self.max_dex = Some(max_dex);
        self
    }

    /// Builder: set the armor check penalty.
    pub fn with_check_penalty(mut self, penalty: i32) -> Self {
        self.check_penalty = penalty;
        self
    }

    /// Builder: set the weight.
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn is_shield(&self) -> bool {
        self.category.is_shield()
    }

    /// Total AC bonus including enhancement.
    pub fn total_ac_bonus(&self) -> i32 {
        self.ac_bonus + self.enhancement
    }
}
