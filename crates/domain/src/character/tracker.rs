//! Trackers: generic consumable resources.

use serde::{Deserialize, Serialize};

use crate::ids::TrackerId;

/// A consumable resource, user-defined or derived from an effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    id: TrackerId,
    name: String,
    max: u32,
    current: u32,
    /// Effect-derived trackers are readonly: their name and max come from
    /// the effect and only `current` moves.
    readonly: bool,
    /// Id of the effect that created this tracker, when derived
    source_effect: Option<String>,
}

impl Tracker {
    /// Create a user-defined tracker, starting full.
    pub fn new(name: impl Into<String>, max: u32) -> Self {
        Self {
            id: TrackerId::new(),
            name: name.into(),
            max,
            current: max,
            readonly: false,
            source_effect: None,
        }
    }

    /// Create a tracker derived from an effect.
    pub fn from_effect(name: impl Into<String>, max: u32, effect_id: impl Into<String>) -> Self {
        Self {
            id: TrackerId::new(),
            name: name.into(),
            max,
            current: max,
            readonly: true,
            source_effect: Some(effect_id.into()),
        }
    }

    pub fn id(&self) -> TrackerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn source_effect(&self) -> Option<&str> {
        self.source_effect.as_deref()
    }

    /// Spend one charge. Returns false when empty.
    pub fn spend(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Refill to maximum.
    pub fn restore_all(&mut self) {
        self.current = self.max;
    }

    /// Set the current value, clamped to the maximum.
    pub fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }

    /// Refresh an effect-derived tracker from its effect (name or max may
    /// have grown); the current value is clamped, not reset.
    pub(crate) fn sync_from_effect(&mut self, name: impl Into<String>, max: u32) {
        self.name = name.into();
        self.max = max;
        self.current = self.current.min(max);
    }

    /// Rename and resize a user-defined tracker; refused on readonly ones.
    pub fn reconfigure(&mut self, name: impl Into<String>, max: u32) -> bool {
        if self.readonly {
            return false;
        }
        self.name = name.into();
        self.max = max;
        self.current = self.current.min(max);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_and_restore() {
        let mut tracker = Tracker::new("Rage rounds", 6);
        assert!(tracker.spend());
        assert!(tracker.spend());
        assert_eq!(tracker.current(), 4);
        tracker.restore_all();
        assert_eq!(tracker.current(), 6);
    }

    #[test]
    fn spend_fails_when_empty() {
        let mut tracker = Tracker::new("Ki pool", 1);
        assert!(tracker.spend());
        assert!(!tracker.spend());
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn effect_trackers_are_readonly() {
        let mut tracker = Tracker::from_effect("Channel Energy", 5, "channel-energy");
        assert!(tracker.is_readonly());
        assert_eq!(tracker.source_effect(), Some("channel-energy"));
        assert!(!tracker.reconfigure("Renamed", 10));
        assert_eq!(tracker.max(), 5);
    }

    #[test]
    fn set_current_clamps_to_max() {
        let mut tracker = Tracker::new("Arrows", 20);
        tracker.set_current(50);
        assert_eq!(tracker.current(), 20);
    }
}
