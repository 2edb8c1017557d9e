//! Spellbook: per-class known/prepared spell state and cast tracking.
//!
//! The spellbook stores flat id lists; leveled partitioning and slot math
//! live in the rules layer, which knows the class's spell list. Preparation
//! is deliberately not budget-enforced here: `rules::spellbook` reports the
//! budget and the UI disables over-preparation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-class spell state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spellbook {
    /// Class this book belongs to
    class_id: String,
    /// Known spell ids (unique)
    #[serde(default)]
    known: Vec<String>,
    /// Prepared spell ids; duplicates allowed (a spell may be prepared into
    /// several slots)
    #[serde(default)]
    prepared: Vec<String>,
    /// Casts used today per spell level
    #[serde(default)]
    casts_used: BTreeMap<u8, u8>,
}

impl Spellbook {
    /// Create an empty spellbook for a class.
    pub fn new(class_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            known: Vec::new(),
            prepared: Vec::new(),
            casts_used: BTreeMap::new(),
        }
    }

    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    pub fn known(&self) -> &[String] {
        &self.known
    }

    pub fn prepared(&self) -> &[String] {
        &self.prepared
    }

    pub fn knows(&self, spell_id: &str) -> bool {
        self.known.iter().any(|id| id == spell_id)
    }

    /// Learn a spell; duplicates are ignored.
    pub fn learn(&mut self, spell_id: impl Into<String>) {
        let id = spell_id.into();
        if !self.known.contains(&id) {
            self.known.push(id);
        }
    }

    /// Forget a spell and any preparations of it.
    pub fn forget(&mut self, spell_id: &str) {
        self.known.retain(|id| id != spell_id);
        self.prepared.retain(|id| id != spell_id);
    }

    /// Prepare a spell into a slot. Duplicates are allowed; the budget is
    /// advisory and reported by the rules layer.
    pub fn prepare(&mut self, spell_id: impl Into<String>) {
        self.prepared.push(spell_id.into());
    }

    /// Remove one prepared copy of a spell.
    pub fn unprepare(&mut self, spell_id: &str) -> bool {
        if let Some(pos) = self.prepared.iter().position(|id| id == spell_id) {
            self.prepared.remove(pos);
            return true;
        }
        false
    }

    /// Number of prepared copies of a spell.
    pub fn prepared_count(&self, spell_id: &str) -> usize {
        self.prepared.iter().filter(|id| *id == spell_id).count()
    }

    /// Casts used today at a spell level.
    pub fn casts_used(&self, spell_level: u8) -> u8 {
        self.casts_used.get(&spell_level).copied().unwrap_or(0)
    }

    /// Record a cast at a spell level.
    pub fn cast(&mut self, spell_level: u8) {
        *self.casts_used.entry(spell_level).or_insert(0) += 1;
    }

    /// Reset all cast tracking (a new day).
    pub fn reset_casts(&mut self) {
        self.casts_used.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learn_is_idempotent() {
        let mut book = Spellbook::new("wizard");
        book.learn("magic-missile");
        book.learn("magic-missile");
        assert_eq!(book.known().len(), 1);
        assert!(book.knows("magic-missile"));
    }

    #[test]
    fn prepare_allows_duplicates() {
        let mut book = Spellbook::new("wizard");
        book.learn("magic-missile");
        book.prepare("magic-missile");
        book.prepare("magic-missile");
        assert_eq!(book.prepared_count("magic-missile"), 2);

        assert!(book.unprepare("magic-missile"));
        assert_eq!(book.prepared_count("magic-missile"), 1);
    }

    #[test]
    fn forget_removes_preparations() {
        let mut book = Spellbook::new("wizard");
        book.learn("shield");
        book.prepare("shield");
        book.forget("shield");
        assert!(!book.knows("shield"));
        assert_eq!(book.prepared_count("shield"), 0);
    }

    #[test]
    fn cast_tracking_per_level() {
        let mut book = Spellbook::new("sorcerer");
        book.cast(1);
        book.cast(1);
        book.cast(2);
        assert_eq!(book.casts_used(1), 2);
        assert_eq!(book.casts_used(2), 1);
        assert_eq!(book.casts_used(3), 0);

        book.reset_casts();
        assert_eq!(book.casts_used(1), 0);
    }
}
