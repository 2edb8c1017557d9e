//! Skill definition entity.

use serde::{Deserialize, Serialize};

use crate::value_objects::Ability;

/// A skill definition from the rule content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillDef {
    /// Unique identifier for this skill
    pub id: String,
    /// Display name
    pub name: String,
    /// Ability whose modifier feeds the skill total
    pub ability: Ability,
    /// Whether the skill can be used untrained
    #[serde(default)]
    pub trained_only: bool,
    /// Whether the armor check penalty applies to this skill
    #[serde(default)]
    pub armor_check_penalty: bool,
}

impl SkillDef {
    /// Create a new skill definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>, ability: Ability) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ability,
            trained_only: false,
            armor_check_penalty: false,
        }
    }

    /// Builder: mark as trained-only.
    pub fn trained_only(mut self) -> Self {
        self.trained_only = true;
        self
    }

    /// Builder: mark as subject to armor check penalty.
    pub fn with_armor_check_penalty(mut self) -> Self {
        self.armor_check_penalty = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_builder_flags() {
        let stealth = SkillDef::new("stealth", "Stealth", Ability::Dexterity)
            .with_armor_check_penalty();
        assert!(stealth.armor_check_penalty);
        assert!(!stealth.trained_only);

        let spellcraft = SkillDef::new("spellcraft", "Spellcraft", Ability::Intelligence)
            .trained_only();
        assert!(spellcraft.trained_only);
    }
}
