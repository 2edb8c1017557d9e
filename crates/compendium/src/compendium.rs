//! The compendium: every content collection behind one `RuleContent` door.

use serde::Deserialize;
use thiserror::Error;

use herosmith_domain::{
    Armor, Class, DomainError, Feat, Race, RuleContent, SkillDef, Spell, Weapon,
};

use crate::collection::Collection;

const SRD_JSON: &str = include_str!("../data/srd.json");

/// Error while loading content data.
#[derive(Debug, Error)]
pub enum CompendiumError {
    /// Content JSON failed to parse.
    #[error("Content parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw content file shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    #[serde(default)]
    pub races: Vec<Race>,
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub feats: Vec<Feat>,
    #[serde(default)]
    pub spells: Vec<Spell>,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
    #[serde(default)]
    pub armor: Vec<Armor>,
    #[serde(default)]
    pub skills: Vec<SkillDef>,
}

/// Indexed rule content.
pub struct Compendium {
    pub races: Collection<Race>,
    pub classes: Collection<Class>,
    pub feats: Collection<Feat>,
    pub spells: Collection<Spell>,
    pub weapons: Collection<Weapon>,
    pub armor: Collection<Armor>,
    pub skills: Collection<SkillDef>,
}

impl Compendium {
    /// Load the embedded SRD-flavored dataset.
    pub fn builtin() -> Result<Self, CompendiumError> {
        let data: ContentData = serde_json::from_str(SRD_JSON)?;
        Ok(Self::from_data(data))
    }

    /// Index a parsed content file.
    pub fn from_data(data: ContentData) -> Self {
        let compendium = Self {
            races: Collection::new("Race", data.races),
            classes: Collection::new("Class", data.classes),
            feats: Collection::new("Feat", data.feats),
            spells: Collection::new("Spell", data.spells),
            weapons: Collection::new("Weapon", data.weapons),
            armor: Collection::new("Armor", data.armor),
            skills: Collection::new("Skill", data.skills),
        };
        tracing::info!(
            races = compendium.races.len(),
            classes = compendium.classes.len(),
            feats = compendium.feats.len(),
            spells = compendium.spells.len(),
            weapons = compendium.weapons.len(),
            armor = compendium.armor.len(),
            skills = compendium.skills.len(),
            "content loaded"
        );
        compendium
    }
}

impl RuleContent for Compendium {
    fn race(&self, id: &str) -> Result<&Race, DomainError> {
        self.races.get_by_id(id)
    }

    fn class(&self, id: &str) -> Result<&Class, DomainError> {
        self.classes.get_by_id(id)
    }

    fn feat(&self, id: &str) -> Result<&Feat, DomainError> {
        self.feats.get_by_id(id)
    }

    fn spell(&self, id: &str) -> Result<&Spell, DomainError> {
        self.spells.get_by_id(id)
    }

    fn weapon(&self, id: &str) -> Result<&Weapon, DomainError> {
        self.weapons.get_by_id(id)
    }

    fn armor(&self, id: &str) -> Result<&Armor, DomainError> {
        self.armor.get_by_id(id)
    }

    fn skill(&self, id: &str) -> Result<&SkillDef, DomainError> {
        self.skills.get_by_id(id)
    }

    fn skills(&self) -> Vec<&SkillDef> {
        self.skills.iter().collect()
    }
}
