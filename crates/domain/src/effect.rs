//! Effects: declarative rule consequences attached to sources.
//!
//! Racial traits, class features, and feats declare effects. An effect is a
//! closed sum type over effect kinds, with an optional boolean activation
//! condition and an optional growth table that rescales its payload as the
//! granting source's contextual level increases. Effects are template data:
//! a character never mutates one, it only supplies the input an effect asks
//! for (e.g. the arcane school choice).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::{ArmorCategory, WeaponTraining};
use crate::value_objects::{Ability, Bonus, NamedBonus};

/// Which saving throw a save bonus applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveTarget {
    Fortitude,
    Reflex,
    Will,
    All,
}

impl SaveTarget {
    /// Whether a bonus targeting `self` contributes to `save`.
    pub fn applies_to(&self, save: SaveTarget) -> bool {
        *self == SaveTarget::All || *self == save
    }
}

/// Maximum value of an effect-granted tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackerMax {
    Fixed(u32),
    Formula(String),
}

/// One rule consequence, dispatched exhaustively by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    /// Bonus to an ability score
    AbilityBonus { ability: Ability, bonus: Bonus },
    /// Bonus to one save or all saves
    SaveBonus { save: SaveTarget, bonus: Bonus },
    /// Bonus to armor class
    ArmorClassBonus { bonus: Bonus },
    /// Bonus to all attack rolls
    AttackRollBonus { bonus: Bonus },
    /// Bonus to all weapon damage rolls
    DamageRollBonus { bonus: Bonus },
    /// Bonus to one skill
    SkillBonus { skill: String, bonus: Bonus },
    /// Bonus to initiative
    InitiativeBonus { bonus: Bonus },
    /// Bonus to maximum hit points
    HitPointBonus { bonus: Bonus },
    /// Bonus to land speed
    SpeedBonus { bonus: Bonus },
    /// Grant a specific feat without consuming a slot
    GrantFeat { feat: String },
    /// Grant an extra selectable feat slot at the level the source is gained
    GrantFeatSlot,
    /// Grant weapon/armor/shield proficiencies
    GrantProficiency {
        #[serde(default)]
        weapon_training: Vec<WeaponTraining>,
        #[serde(default)]
        weapons: Vec<String>,
        #[serde(default)]
        armor_training: Vec<ArmorCategory>,
        #[serde(default)]
        armor: Vec<String>,
        #[serde(default)]
        shield_training: Vec<ArmorCategory>,
        #[serde(default)]
        shields: Vec<String>,
    },
    /// Fighter-style weapon training: attack bonus per weapon group, the
    /// highest-ranked matching group applies
    WeaponGroupTraining { groups: BTreeMap<String, i32> },
    /// Grant spellcasting as the named class
    GrantSpellcasting { class: String },
    /// Arcane-school-like choice: needs a focused school input plus
    /// `forbidden_count` forbidden school inputs
    SchoolChoice { forbidden_count: u8 },
    /// Add a non-weapon attack option
    AddAttackOption {
        name: String,
        /// To-hit ability; defaults to STR when absent
        #[serde(default)]
        ability: Option<Ability>,
        /// Base damage string ("1d6")
        #[serde(default)]
        damage: Option<String>,
        #[serde(default = "default_crit_range")]
        crit_range: u8,
        #[serde(default = "default_crit_multiplier")]
        crit_multiplier: u8,
        #[serde(default)]
        attack_bonuses: Vec<NamedBonus>,
        #[serde(default)]
        damage_bonuses: Vec<NamedBonus>,
        /// Overrides the two-handed damage multiplier for this option
        #[serde(default)]
        ability_multiplier: Option<f64>,
    },
    /// Add a consumable resource tracker
    AddTracker { name: String, max: TrackerMax },
    /// Melee attacks use this ability instead of STR
    MeleeAbilityOverride { ability: Ability },
    /// Soften two-weapon fighting penalties (the Two-Weapon Fighting feat)
    ReduceTwoWeaponPenalty,
    /// Waive two-weapon fighting penalties entirely
    IgnoreTwoWeaponPenalty,
}

fn default_crit_range() -> u8 {
    20
}

fn default_crit_multiplier() -> u8 {
    2
}

impl EffectKind {
    /// Whether this effect kind asks the character for input.
    pub fn requires_input(&self) -> bool {
        matches!(self, EffectKind::SchoolChoice { .. })
    }
}

/// One tier of a growth table: the payload the effect takes once the
/// source's contextual level reaches `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthTier {
    pub level: u8,
    #[serde(flatten)]
    pub kind: EffectKind,
}

/// An effect declared by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    /// Identifier, stable within the declaring source; used to key effect
    /// inputs and the growth cache
    pub id: String,
    #[serde(flatten)]
    pub kind: EffectKind,
    /// Boolean activation condition; absent means always active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    /// Level-indexed payload overrides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub growth: Vec<GrowthTier>,
}

impl Effect {
    /// Create a new effect.
    pub fn new(id: impl Into<String>, kind: EffectKind) -> Self {
        Self {
            id: id.into(),
            kind,
            when: None,
            growth: Vec::new(),
        }
    }

    /// Builder: set the activation condition.
    pub fn with_when(mut self, when: impl Into<String>) -> Self {
        self.when = Some(when.into());
        self
    }

    /// Builder: add a growth tier.
    pub fn with_growth(mut self, level: u8, kind: EffectKind) -> Self {
        self.growth.push(GrowthTier { level, kind });
        self
    }

    /// Resolve the payload for a contextual level: the highest tier whose
    /// `level` does not exceed it, or the base payload when no tier
    /// qualifies. Returns the tier index alongside for cache keying.
    pub fn resolve_growth(&self, contextual_level: u8) -> (Option<usize>, &EffectKind) {
        let mut best: Option<usize> = None;
        for (index, tier) in self.growth.iter().enumerate() {
            if tier.level > contextual_level {
                continue;
            }
            match best {
                Some(current) if self.growth[current].level >= tier.level => {}
                _ => best = Some(index),
            }
        }
        match best {
            Some(index) => (Some(index), &self.growth[index].kind),
            None => (None, &self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::BonusType;

    fn skill_bonus(amount: i32) -> EffectKind {
        EffectKind::SkillBonus {
            skill: "perception".into(),
            bonus: Bonus::new(amount, BonusType::Racial),
        }
    }

    fn grown_effect() -> Effect {
        Effect::new("keen-senses", skill_bonus(2))
            .with_growth(1, skill_bonus(2))
            .with_growth(5, skill_bonus(4))
            .with_growth(10, skill_bonus(6))
    }

    #[test]
    fn growth_picks_highest_tier_at_or_below_level() {
        let effect = grown_effect();
        let (tier, kind) = effect.resolve_growth(7);
        assert_eq!(tier, Some(1));
        assert_eq!(*kind, skill_bonus(4));

        let (tier, kind) = effect.resolve_growth(10);
        assert_eq!(tier, Some(2));
        assert_eq!(*kind, skill_bonus(6));
    }

    #[test]
    fn growth_below_minimum_returns_base_payload() {
        let effect = grown_effect();
        let (tier, kind) = effect.resolve_growth(0);
        assert_eq!(tier, None);
        assert_eq!(*kind, skill_bonus(2));
    }

    #[test]
    fn growth_without_table_returns_base_payload() {
        let effect = Effect::new("flat", skill_bonus(1));
        let (tier, kind) = effect.resolve_growth(20);
        assert_eq!(tier, None);
        assert_eq!(*kind, skill_bonus(1));
    }

    #[test]
    fn effect_serialization_flattens_kind_tag() {
        let effect = Effect::new(
            "ability",
            EffectKind::AbilityBonus {
                ability: Ability::Strength,
                bonus: Bonus::new(2, BonusType::Racial),
            },
        );
        let json = serde_json::to_string(&effect).expect("serialize");
        assert!(json.contains("\"type\":\"ability_bonus\""));
        assert!(json.contains("\"id\":\"ability\""));
        let back: Effect = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(effect, back);
    }

    #[test]
    fn unit_kind_round_trips() {
        let effect = Effect::new("twf-waiver", EffectKind::IgnoreTwoWeaponPenalty);
        let json = serde_json::to_string(&effect).expect("serialize");
        let back: Effect = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(effect, back);
    }

    #[test]
    fn school_choice_requires_input() {
        assert!(EffectKind::SchoolChoice { forbidden_count: 2 }.requires_input());
        assert!(!skill_bonus(1).requires_input());
    }

    #[test]
    fn growth_tier_round_trips_with_flattened_payload() {
        let effect = grown_effect();
        let json = serde_json::to_string(&effect).expect("serialize");
        let back: Effect = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(effect, back);
    }

    #[test]
    fn save_target_application() {
        assert!(SaveTarget::All.applies_to(SaveTarget::Will));
        assert!(SaveTarget::Will.applies_to(SaveTarget::Will));
        assert!(!SaveTarget::Fortitude.applies_to(SaveTarget::Will));
    }
}
