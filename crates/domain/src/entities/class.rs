//! Class entity: progressions, features, and spellcasting profile.

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::value_objects::Ability;

/// Base attack bonus progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BabProgression {
    Full,
    ThreeQuarters,
    Half,
}

impl BabProgression {
    /// Base attack bonus at a class level.
    pub fn bab_at(&self, level: u8) -> i32 {
        let level = level as i32;
        match self {
            BabProgression::Full => level,
            BabProgression::ThreeQuarters => level * 3 / 4,
            BabProgression::Half => level / 2,
        }
    }

    /// Iterative attack sequence for a class level: bab, bab-5, bab-10, ...
    /// while positive, always at least one entry.
    pub fn attacks_at(&self, level: u8) -> Vec<i32> {
        attack_sequence(self.bab_at(level))
    }
}

/// Expand a base attack bonus into its iterative attack sequence.
pub fn attack_sequence(bab: i32) -> Vec<i32> {
    let mut attacks = vec![bab];
    let mut next = bab - 5;
    while next > 0 {
        attacks.push(next);
        next -= 5;
    }
    attacks
}

/// Saving throw progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveProgression {
    Good,
    Poor,
}

impl SaveProgression {
    /// Base save bonus at a class level.
    pub fn at(&self, level: u8) -> i32 {
        let level = level as i32;
        match self {
            SaveProgression::Good => 2 + level / 2,
            SaveProgression::Poor => level / 3,
        }
    }
}

/// How a class casts spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastingKind {
    /// Prepares from a spellbook; supports school specialization.
    WizardLike,
    /// Spontaneous casting from a known list; no preparation.
    SorcererLike,
    /// Prepares from the full class list.
    ClericLike,
}

impl CastingKind {
    /// Whether this caster prepares spells into slots.
    pub fn prepares(&self) -> bool {
        !matches!(self, CastingKind::SorcererLike)
    }
}

/// Spellcasting profile for a class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spellcasting {
    /// Casting style discriminant
    pub kind: CastingKind,
    /// Ability that powers casting (bonus slots, DCs)
    pub ability: Ability,
    /// Spells per day: one row per class level (row 0 = class level 1),
    /// each row indexed by spell level. A missing column means that spell
    /// level is not yet castable; class levels past the last row use it.
    pub spells_per_day: Vec<Vec<u8>>,
}

impl Spellcasting {
    /// Table slots for a spell level at a class level, before ability
    /// bonuses. `None` when the spell level is not castable yet.
    pub fn table_slots(&self, class_level: u8, spell_level: u8) -> Option<u8> {
        if class_level == 0 || self.spells_per_day.is_empty() {
            return None;
        }
        let row_index = (class_level as usize - 1).min(self.spells_per_day.len() - 1);
        self.spells_per_day[row_index]
            .get(spell_level as usize)
            .copied()
    }

    /// Highest castable spell level at a class level.
    pub fn max_spell_level(&self, class_level: u8) -> Option<u8> {
        if class_level == 0 || self.spells_per_day.is_empty() {
            return None;
        }
        let row_index = (class_level as usize - 1).min(self.spells_per_day.len() - 1);
        let row = &self.spells_per_day[row_index];
        if row.is_empty() {
            None
        } else {
            Some(row.len() as u8 - 1)
        }
    }
}

/// A class feature gained at a specific class level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeature {
    /// Unique identifier for this feature
    pub id: String,
    /// Display name
    pub name: String,
    /// Class level at which the feature is gained
    pub level: u8,
    /// Full description
    #[serde(default)]
    pub description: String,
    /// Effects declared by this feature
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl ClassFeature {
    /// Create a new class feature.
    pub fn new(id: impl Into<String>, name: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            description: String::new(),
            effects: Vec::new(),
        }
    }

    /// Builder: add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A character class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    /// Unique identifier for this class
    pub id: String,
    /// Display name
    pub name: String,
    /// Full description
    #[serde(default)]
    pub description: String,
    /// Hit die size (d6, d8, d10, ...)
    pub hit_die: u8,
    /// Base attack bonus progression
    pub bab: BabProgression,
    /// Fortitude save progression
    pub fortitude: SaveProgression,
    /// Reflex save progression
    pub reflex: SaveProgression,
    /// Will save progression
    pub will: SaveProgression,
    /// Skill points granted per level (before INT modifier)
    pub skill_points: u8,
    /// Ids of this class's class skills
    #[serde(default)]
    pub class_skills: Vec<String>,
    /// Features gained as class levels accrue
    #[serde(default)]
    pub features: Vec<ClassFeature>,
    /// Spellcasting profile, if the class casts
    #[serde(default)]
    pub spellcasting: Option<Spellcasting>,
}

impl Class {
    /// Create a new class with required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        hit_die: u8,
        bab: BabProgression,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            hit_die,
            bab,
            fortitude: SaveProgression::Poor,
            reflex: SaveProgression::Poor,
            will: SaveProgression::Poor,
            skill_points: 2,
            class_skills: Vec::new(),
            features: Vec::new(),
            spellcasting: None,
        }
    }

    /// Builder: set save progressions.
    pub fn with_saves(
        mut self,
        fortitude: SaveProgression,
        reflex: SaveProgression,
        will: SaveProgression,
    ) -> Self {
        self.fortitude = fortitude;
        self.reflex = reflex;
        self.will = will;
        self
    }

    /// Builder: set skill points per level.
    pub fn with_skill_points(mut self, points: u8) -> Self {
        self.skill_points = points;
        self
    }

    /// Builder: set class skills.
    pub fn with_class_skills(
        mut self,
        skills: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.class_skills = skills.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Builder: add a feature.
    pub fn with_feature(mut self, feature: ClassFeature) -> Self {
        self.features.push(feature);
        self
    }

    /// Builder: set the spellcasting profile.
    pub fn with_spellcasting(mut self, spellcasting: Spellcasting) -> Self {
        self.spellcasting = Some(spellcasting);
        self
    }

    /// Features gained at or below a class level.
    pub fn features_at(&self, class_level: u8) -> impl Iterator<Item = &ClassFeature> {
        self.features.iter().filter(move |f| f.level <= class_level)
    }

    /// Whether a skill id is a class skill.
    pub fn is_class_skill(&self, skill_id: &str) -> bool {
        self.class_skills.iter().any(|s| s == skill_id)
    }
}
