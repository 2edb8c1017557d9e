//! Feat entity.

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::value_objects::Ability;

/// A feat a character can select into a feat slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feat {
    /// Unique identifier for this feat
    pub id: String,
    /// Display name of the feat
    pub name: String,
    /// Full description of what the feat does
    #[serde(default)]
    pub description: String,
    /// Requirements to take this feat
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    /// Effects declared by the feat
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Whether this feat can be taken multiple times
    #[serde(default)]
    pub repeatable: bool,
    /// Tags for filtering and categorization
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Feat {
    /// Create a new feat with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            prerequisites: Vec::new(),
            effects: Vec::new(),
            repeatable: false,
            tags: Vec::new(),
        }
    }

    /// Builder: add a prerequisite.
    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    /// Builder: add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Builder: add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A prerequisite for acquiring a feat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prerequisite {
    /// Minimum ability score requirement
    MinAbility { ability: Ability, value: i32 },
    /// Minimum base attack bonus
    MinBab { value: i32 },
    /// Minimum character level
    MinLevel { level: u8 },
    /// Must have another feat
    HasFeat { feat: String },
    /// Free-form requirement, checked by eye
    Custom { description: String },
}

impl Prerequisite {
    /// Create a minimum ability prerequisite.
    pub fn min_ability(ability: Ability, value: i32) -> Self {
        Prerequisite::MinAbility { ability, value }
    }

    /// Create a minimum BAB prerequisite.
    pub fn min_bab(value: i32) -> Self {
        Prerequisite::MinBab { value }
    }

    /// Create a has-feat prerequisite.
    pub fn has_feat(feat: impl Into<String>) -> Self {
        Prerequisite::HasFeat { feat: feat.into() }
    }
}
