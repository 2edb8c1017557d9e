//! Spell entity.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// School of magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
    Universal,
}

impl SpellSchool {
    /// All schools a wizard can specialize in (universal excluded).
    pub const SPECIALIZABLE: [SpellSchool; 8] = [
        SpellSchool::Abjuration,
        SpellSchool::Conjuration,
        SpellSchool::Divination,
        SpellSchool::Enchantment,
        SpellSchool::Evocation,
        SpellSchool::Illusion,
        SpellSchool::Necromancy,
        SpellSchool::Transmutation,
    ];
}

impl fmt::Display for SpellSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpellSchool::Abjuration => "abjuration",
            SpellSchool::Conjuration => "conjuration",
            SpellSchool::Divination => "divination",
            SpellSchool::Enchantment => "enchantment",
            SpellSchool::Evocation => "evocation",
            SpellSchool::Illusion => "illusion",
            SpellSchool::Necromancy => "necromancy",
            SpellSchool::Transmutation => "transmutation",
            SpellSchool::Universal => "universal",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for SpellSchool {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abjuration" => Ok(SpellSchool::Abjuration),
            "conjuration" => Ok(SpellSchool::Conjuration),
            "divination" => Ok(SpellSchool::Divination),
            "enchantment" => Ok(SpellSchool::Enchantment),
            "evocation" => Ok(SpellSchool::Evocation),
            "illusion" => Ok(SpellSchool::Illusion),
            "necromancy" => Ok(SpellSchool::Necromancy),
            "transmutation" => Ok(SpellSchool::Transmutation),
            "universal" => Ok(SpellSchool::Universal),
            other => Err(DomainError::parse(format!("Unknown school: {}", other))),
        }
    }
}

/// A spell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    /// Unique identifier for this spell
    pub id: String,
    /// Display name of the spell
    pub name: String,
    /// School of magic
    pub school: SpellSchool,
    /// Spell level per class id (the same spell may sit at different levels
    /// on different class lists)
    #[serde(default)]
    pub levels: BTreeMap<String, u8>,
    /// Full description of the spell's effects
    #[serde(default)]
    pub description: String,
}

impl Spell {
    /// Create a new spell with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>, school: SpellSchool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            school,
            levels: BTreeMap::new(),
            description: String::new(),
        }
    }

    /// Builder: place the spell at a level on a class list.
    pub fn with_level(mut self, class_id: impl Into<String>, level: u8) -> Self {
        self.levels.insert(class_id.into(), level);
        self
    }

    /// The spell's level on a class's list, if the class can cast it.
    pub fn level_for(&self, class_id: &str) -> Option<u8> {
        self.levels.get(class_id).copied()
    }
}
