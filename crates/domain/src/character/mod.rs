//! Character aggregate.
//!
//! The character owns base identity, ability scores, the upgrade history,
//! equipment, trackers, spellbooks, and user-authored manual effects. Every
//! derived quantity (attack options, AC, saves, spell slots) is computed by
//! the rules layer from this state on each read; nothing derived is stored
//! here.

mod equipment;
mod spellbook;
mod tracker;
mod upgrade;

pub use equipment::{Equipment, OffHandItem};
pub use spellbook::Spellbook;
pub use tracker::Tracker;
pub use upgrade::{effect_input_key, FavoredClassBonus, HitPointGain, Upgrade};

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::error::DomainError;
use crate::ids::{CharacterId, TrackerId};
use crate::value_objects::{Ability, AbilityScores};

/// A user-authored effect attached directly to the character.
///
/// Manual effects carry user-typed formulas; their validation errors are
/// surfaced to the user instead of crashing derivation (see the rules layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualEffect {
    pub name: String,
    pub effect: Effect,
    /// Toggled off to suspend the effect without deleting it
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// A character being built or played.
///
/// # Invariants
///
/// - `level() == max(1, number of upgrades)` counting the pending upgrade
/// - committed upgrades are append-only; only the pending upgrade mutates
/// - base ability scores are stored raw, never pre-summed with bonuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    id: CharacterId,
    name: String,
    base_abilities: AbilityScores,
    race_id: Option<String>,
    /// Committed upgrades, one per finished level
    upgrades: Vec<Upgrade>,
    /// The upgrade currently being edited
    pending: Option<Upgrade>,
    equipment: Equipment,
    trackers: Vec<Tracker>,
    /// Spellbooks keyed by class id
    spellbooks: BTreeMap<String, Spellbook>,
    manual_effects: Vec<ManualEffect>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Character {
    /// Create a new character.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CharacterId::new(),
            name: name.into(),
            base_abilities: AbilityScores::default(),
            race_id: None,
            upgrades: Vec::new(),
            pending: None,
            equipment: Equipment::new(),
            trackers: Vec::new(),
            spellbooks: BTreeMap::new(),
            manual_effects: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_abilities(&self) -> &AbilityScores {
        &self.base_abilities
    }

    pub fn race_id(&self) -> Option<&str> {
        self.race_id.as_deref()
    }

    /// Committed upgrades only.
    pub fn committed_upgrades(&self) -> &[Upgrade] {
        &self.upgrades
    }

    /// The upgrade currently being edited, if any.
    pub fn pending_upgrade(&self) -> Option<&Upgrade> {
        self.pending.as_ref()
    }

    /// All upgrades in level order, the pending one last.
    pub fn all_upgrades(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter().chain(self.pending.iter())
    }

    /// Character level: one per upgrade (pending included), minimum 1.
    pub fn level(&self) -> u8 {
        let count = self.upgrades.len() + usize::from(self.pending.is_some());
        count.max(1) as u8
    }

    /// Levels taken in a class, counting the pending upgrade.
    pub fn class_level(&self, class_id: &str) -> u8 {
        self.all_upgrades()
            .filter(|u| u.class_id == class_id)
            .count() as u8
    }

    /// Class ids with levels, ordered by first appearance.
    pub fn class_levels(&self) -> Vec<(String, u8)> {
        let mut ordered: Vec<(String, u8)> = Vec::new();
        for upgrade in self.all_upgrades() {
            if let Some(entry) = ordered.iter_mut().find(|(id, _)| *id == upgrade.class_id) {
                entry.1 += 1;
            } else {
                ordered.push((upgrade.class_id.clone(), 1));
            }
        }
        ordered
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn trackers(&self) -> &[Tracker] {
        &self.trackers
    }

    pub fn spellbooks(&self) -> impl Iterator<Item = &Spellbook> {
        self.spellbooks.values()
    }

    pub fn spellbook(&self, class_id: &str) -> Option<&Spellbook> {
        self.spellbooks.get(class_id)
    }

    pub fn manual_effects(&self) -> &[ManualEffect] {
        &self.manual_effects
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // =========================================================================
    // Mutation entry points
    // =========================================================================

    /// Set one base ability score.
    pub fn set_base_ability(&mut self, ability: Ability, value: i32) {
        self.base_abilities.set(ability, value);
        self.touch();
    }

    /// Select or clear the race.
    pub fn set_race(&mut self, race_id: Option<String>) {
        self.race_id = race_id;
        self.touch();
    }

    /// Start editing the next level. Fails while another upgrade is pending.
    pub fn start_upgrade(&mut self, class_id: impl Into<String>) -> Result<&mut Upgrade, DomainError> {
        if self.pending.is_some() {
            return Err(DomainError::validation(
                "An upgrade is already being edited",
            ));
        }
        self.touch();
        Ok(self.pending.insert(Upgrade::new(class_id)))
    }

    /// Mutable access to the pending upgrade.
    pub fn pending_upgrade_mut(&mut self) -> Option<&mut Upgrade> {
        self.touch();
        self.pending.as_mut()
    }

    /// Discard the pending upgrade wholesale.
    pub fn cancel_upgrade(&mut self) -> Option<Upgrade> {
        let dropped = self.pending.take();
        if dropped.is_some() {
            self.touch();
        }
        dropped
    }

    /// Commit the pending upgrade to the history. Completeness is a rules
    /// query (`rules::CharacterRules::validate_upgrade`); callers gate the
    /// finish action on it, this method only requires that an upgrade exists.
    pub fn finish_upgrade(&mut self) -> Result<(), DomainError> {
        let upgrade = self
            .pending
            .take()
            .ok_or_else(|| DomainError::validation("No upgrade is being edited"))?;
        self.upgrades.push(upgrade);
        self.touch();
        Ok(())
    }

    /// Mutable equipment access.
    pub fn equipment_mut(&mut self) -> &mut Equipment {
        self.touch();
        &mut self.equipment
    }

    /// Add a tracker and return its id.
    pub fn add_tracker(&mut self, tracker: Tracker) -> TrackerId {
        let id = tracker.id();
        self.trackers.push(tracker);
        self.touch();
        id
    }

    /// Remove a tracker by id.
    pub fn remove_tracker(&mut self, id: TrackerId) -> bool {
        let before = self.trackers.len();
        self.trackers.retain(|t| t.id() != id);
        let removed = self.trackers.len() < before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Mutable access to a tracker.
    pub fn tracker_mut(&mut self, id: TrackerId) -> Option<&mut Tracker> {
        self.touch();
        self.trackers.iter_mut().find(|t| t.id() == id)
    }

    /// Spellbook for a class, created on first access.
    pub fn spellbook_mut(&mut self, class_id: &str) -> &mut Spellbook {
        self.touch();
        self.spellbooks
            .entry(class_id.to_string())
            .or_insert_with(|| Spellbook::new(class_id))
    }

    /// Reconcile effect-derived trackers against the currently-derived set
    /// `(effect id, name, max)`: stale readonly trackers disappear, new
    /// ones appear full, surviving ones keep their spent charges.
    pub fn sync_effect_trackers(&mut self, derived: &[(String, String, u32)]) {
        self.trackers.retain(|t| match t.source_effect() {
            Some(source) => derived.iter().any(|(id, _, _)| id == source),
            None => true,
        });
        for (effect_id, name, max) in derived {
            match self
                .trackers
                .iter_mut()
                .find(|t| t.source_effect() == Some(effect_id.as_str()))
            {
                Some(tracker) => tracker.sync_from_effect(name.clone(), *max),
                None => {
                    self.trackers
                        .push(Tracker::from_effect(name.clone(), *max, effect_id.clone()));
                }
            }
        }
        self.touch();
    }

    /// Attach a user-authored effect.
    pub fn add_manual_effect(&mut self, effect: ManualEffect) {
        self.manual_effects.push(effect);
        self.touch();
    }

    /// Remove a manual effect by position.
    pub fn remove_manual_effect(&mut self, index: usize) -> Option<ManualEffect> {
        if index >= self.manual_effects.len() {
            return None;
        }
        self.touch();
        Some(self.manual_effects.remove(index))
    }
}
