//! Upgrade: the bundle of choices made at a single character level.
//!
//! Upgrades are appended to the character's history once committed and never
//! edited afterwards; the one optional *pending* upgrade is the only mutable
//! instance. Maps are `BTreeMap` snapshots so serialization order is stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::Ability;

/// How the level's hit points were determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HitPointGain {
    /// A die was rolled (or the player typed a roll in)
    Rolled { value: u8 },
    /// Take the fixed average value (die/2 + 1)
    Average,
}

/// The favored-class bonus chosen for this level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FavoredClassBonus {
    None,
    HitPoint,
    SkillPoint,
}

impl Default for FavoredClassBonus {
    fn default() -> Self {
        FavoredClassBonus::None
    }
}

/// One level's choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    /// Class taken at this level
    pub class_id: String,
    /// Hit points gained
    pub hit_points: HitPointGain,
    /// Skill-rank deltas bought this level (skill id → delta, never totals)
    #[serde(default)]
    pub skill_ranks: BTreeMap<String, i32>,
    /// Positional feat selections; unfilled slots stay `None`
    #[serde(default)]
    pub feats: Vec<Option<String>>,
    /// Spells learned this level
    #[serde(default)]
    pub spells_learned: Vec<String>,
    /// Ability-score increase (every 4th level)
    #[serde(default)]
    pub ability_increase: Option<Ability>,
    /// Favored-class bonus choice
    #[serde(default)]
    pub favored_class: FavoredClassBonus,
    /// Effect-input values keyed by "(source kind):(source id):(slot suffix)"
    #[serde(default)]
    pub effect_inputs: BTreeMap<String, String>,
}

impl Upgrade {
    /// Create a fresh upgrade for a class.
    pub fn new(class_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            hit_points: HitPointGain::Average,
            skill_ranks: BTreeMap::new(),
            feats: Vec::new(),
            spells_learned: Vec::new(),
            ability_increase: None,
            favored_class: FavoredClassBonus::None,
            effect_inputs: BTreeMap::new(),
        }
    }

    /// Set the skill-rank delta for a skill; a delta of 0 removes the entry.
    pub fn set_skill_rank(&mut self, skill_id: impl Into<String>, delta: i32) {
        let id = skill_id.into();
        if delta == 0 {
            self.skill_ranks.remove(&id);
        } else {
            self.skill_ranks.insert(id, delta);
        }
    }

    /// Skill points spent this level.
    pub fn skill_points_used(&self) -> i32 {
        self.skill_ranks.values().sum()
    }

    /// Set a positional feat slot, growing the slot vector as needed.
    pub fn set_feat_slot(&mut self, slot: usize, feat_id: Option<String>) {
        if self.feats.len() <= slot {
            self.feats.resize(slot + 1, None);
        }
        self.feats[slot] = feat_id;
    }

    /// Feat ids chosen in filled slots.
    pub fn chosen_feats(&self) -> impl Iterator<Item = &str> {
        self.feats.iter().flatten().map(String::as_str)
    }

    /// Record a learned spell.
    pub fn learn_spell(&mut self, spell_id: impl Into<String>) {
        let id = spell_id.into();
        if !self.spells_learned.contains(&id) {
            self.spells_learned.push(id);
        }
    }

    /// Store an effect-input value under a composed key.
    pub fn set_effect_input(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.effect_inputs.insert(key.into(), value.into());
    }

    /// Read an effect-input value.
    pub fn effect_input(&self, key: &str) -> Option<&str> {
        self.effect_inputs.get(key).map(String::as_str)
    }
}

/// Compose the key an effect-input value is stored under.
pub fn effect_input_key(source_kind: &str, source_id: &str, suffix: &str) -> String {
    format!("{}:{}:{}", source_kind, source_id, suffix)
}
