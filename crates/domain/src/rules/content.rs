//! Rule-content lookup boundary.
//!
//! The engine reads static rule data (races, classes, feats, spells, gear,
//! skills) through this trait. Implementations are read-only collections;
//! the reference implementation lives in the compendium crate.

use crate::entities::{Armor, Class, Feat, Race, SkillDef, Spell, Weapon};
use crate::error::DomainError;

/// Read-only lookup services for rule content.
///
/// Every lookup fails with [`DomainError::NotFound`] for an absent id.
/// Callers in the rules layer generally let that propagate as fatal; the
/// one deliberate exception is class lookup during effect resolution,
/// which degrades instead (see `rules::effects`).
pub trait RuleContent {
    fn race(&self, id: &str) -> Result<&Race, DomainError>;
    fn class(&self, id: &str) -> Result<&Class, DomainError>;
    fn feat(&self, id: &str) -> Result<&Feat, DomainError>;
    fn spell(&self, id: &str) -> Result<&Spell, DomainError>;
    fn weapon(&self, id: &str) -> Result<&Weapon, DomainError>;
    fn armor(&self, id: &str) -> Result<&Armor, DomainError>;
    fn skill(&self, id: &str) -> Result<&SkillDef, DomainError>;

    /// Every skill definition, for full-sheet skill listings.
    fn skills(&self) -> Vec<&SkillDef>;
}
