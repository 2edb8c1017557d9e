//! Race entity and racial traits.

use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::value_objects::SizeCategory;

/// A playable race.
///
/// This is read-only rule content: a character references a race by id and
/// never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    /// Unique identifier for this race
    pub id: String,
    /// Display name of the race
    pub name: String,
    /// Size category
    #[serde(default)]
    pub size: SizeCategory,
    /// Base land speed in feet
    pub speed: u32,
    /// Full description
    #[serde(default)]
    pub description: String,
    /// Traits granted by this race
    #[serde(default)]
    pub traits: Vec<RacialTrait>,
}

impl Race {
    /// Create a new race with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, speed: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: SizeCategory::Medium,
            speed,
            description: String::new(),
            traits: Vec::new(),
        }
    }

    /// Builder: set the size category.
    pub fn with_size(mut self, size: SizeCategory) -> Self {
        self.size = size;
        self
    }

    /// Builder: add a racial trait.
    pub fn with_trait(mut self, racial_trait: RacialTrait) -> Self {
        self.traits.push(racial_trait);
        self
    }
}

/// A racial trait, carrying the effects it declares.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RacialTrait {
    /// Unique identifier for this trait
    pub id: String,
    /// Display name of the trait
    pub name: String,
    /// Full description of what the trait does
    #[serde(default)]
    pub description: String,
    /// Effects declared by this trait
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl RacialTrait {
    /// Create a new racial trait.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
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
