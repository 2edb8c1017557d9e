//! Ability scores and modifiers
//!
//! Base scores are stored raw; racial and effect bonuses are applied at read
//! time by the rules layer so a score is never persisted pre-summed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the six abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// All six abilities in display order.
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Three-letter abbreviation ("STR", "DEX", ...).
    pub fn abbrev(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    /// Lowercase key used in formula variables ("str", "dex", ...).
    pub fn key(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }

    /// Ability modifier for a score: floor((score - 10) / 2).
    pub fn modifier_for(score: i32) -> i32 {
        let diff = score - 10;
        if diff >= 0 {
            diff / 2
        } else {
            (diff - 1) / 2 // Floor division for negative
        }
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

impl std::str::FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "str" | "strength" => Ok(Ability::Strength),
            "dex" | "dexterity" => Ok(Ability::Dexterity),
            "con" | "constitution" => Ok(Ability::Constitution),
            "int" | "intelligence" => Ok(Ability::Intelligence),
            "wis" | "wisdom" => Ok(Ability::Wisdom),
            "cha" | "charisma" => Ok(Ability::Charisma),
            _ => Err(DomainError::parse(format!("Unknown ability: {}", s))),
        }
    }
}

/// The six base ability scores of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityScores {
    strength: i32,
    dexterity: i32,
    constitution: i32,
    intelligence: i32,
    wisdom: i32,
    charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::all(10)
    }
}

impl AbilityScores {
    /// Create scores with every ability set to the same value.
    pub fn all(value: i32) -> Self {
        Self {
            strength: value,
            dexterity: value,
            constitution: value,
            intelligence: value,
            wisdom: value,
            charisma: value,
        }
    }

    /// Get the base score for an ability.
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Set the base score for an ability.
    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    /// Builder: set one ability.
    pub fn with(mut self, ability: Ability, value: i32) -> Self {
        self.set(ability, value);
        self
    }

    /// Base modifier for an ability (before race/effect bonuses).
    pub fn modifier(&self, ability: Ability) -> i32 {
        Ability::modifier_for(self.get(ability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_follows_floor_division() {
        assert_eq!(Ability::modifier_for(10), 0);
        assert_eq!(Ability::modifier_for(11), 0);
        assert_eq!(Ability::modifier_for(12), 1);
        assert_eq!(Ability::modifier_for(16), 3);
        assert_eq!(Ability::modifier_for(18), 4);
        assert_eq!(Ability::modifier_for(9), -1);
        assert_eq!(Ability::modifier_for(8), -1);
        assert_eq!(Ability::modifier_for(7), -2);
        assert_eq!(Ability::modifier_for(3), -4);
    }

    #[test]
    fn scores_default_to_ten() {
        let scores = AbilityScores::default();
        for ability in Ability::ALL {
            assert_eq!(scores.get(ability), 10);
            assert_eq!(scores.modifier(ability), 0);
        }
    }

    #[test]
    fn builder_sets_single_ability() {
        let scores = AbilityScores::default()
            .with(Ability::Strength, 16)
            .with(Ability::Intelligence, 8);
        assert_eq!(scores.get(Ability::Strength), 16);
        assert_eq!(scores.modifier(Ability::Strength), 3);
        assert_eq!(scores.modifier(Ability::Intelligence), -1);
        assert_eq!(scores.get(Ability::Wisdom), 10);
    }

    #[test]
    fn ability_from_str_accepts_abbrev_and_full() {
        assert_eq!("STR".parse::<Ability>().ok(), Some(Ability::Strength));
        assert_eq!("wisdom".parse::<Ability>().ok(), Some(Ability::Wisdom));
        assert!("luck".parse::<Ability>().is_err());
    }

    #[test]
    fn serialization_round_trip() {
        let scores = AbilityScores::default().with(Ability::Dexterity, 14);
        let json = serde_json::to_string(&scores).expect("serialize");
        let back: AbilityScores = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(scores, back);
    }
}
