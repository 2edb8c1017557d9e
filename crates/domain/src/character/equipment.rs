//! Equipment state: what the character holds, wears, and carries.

use serde::{Deserialize, Serialize};

/// What occupies the off hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OffHandItem {
    Weapon { id: String },
    Shield { id: String },
}

impl OffHandItem {
    pub fn weapon_id(&self) -> Option<&str> {
        match self {
            OffHandItem::Weapon { id } => Some(id),
            OffHandItem::Shield { .. } => None,
        }
    }

    pub fn shield_id(&self) -> Option<&str> {
        match self {
            OffHandItem::Shield { id } => Some(id),
            OffHandItem::Weapon { .. } => None,
        }
    }
}

/// Held/worn/carried equipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    /// Weapon held in the main hand
    main_hand: Option<String>,
    /// Weapon or shield held in the off hand
    off_hand: Option<OffHandItem>,
    /// Armor worn
    armor: Option<String>,
    /// Whether the main-hand weapon is gripped with both hands
    #[serde(default)]
    two_handed_grip: bool,
    /// Item ids carried in the pack
    #[serde(default)]
    carried: Vec<String>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn main_hand(&self) -> Option<&str> {
        self.main_hand.as_deref()
    }

    pub fn off_hand(&self) -> Option<&OffHandItem> {
        self.off_hand.as_ref()
    }

    pub fn armor(&self) -> Option<&str> {
        self.armor.as_deref()
    }

    pub fn two_handed_grip(&self) -> bool {
        self.two_handed_grip
    }

    pub fn carried(&self) -> &[String] {
        &self.carried
    }

    /// Hold a weapon in the main hand.
    pub fn hold_main_hand(&mut self, weapon_id: impl Into<String>) {
        self.main_hand = Some(weapon_id.into());
    }

    /// Empty the main hand; releasing the weapon also releases the grip.
    pub fn unhold_main_hand(&mut self) {
        self.main_hand = None;
        self.two_handed_grip = false;
    }

    /// Hold a weapon in the off hand; dual wielding drops the two-handed grip.
    pub fn hold_off_hand_weapon(&mut self, weapon_id: impl Into<String>) {
        self.off_hand = Some(OffHandItem::Weapon {
            id: weapon_id.into(),
        });
        self.two_handed_grip = false;
    }

    /// Strap a shield to the off hand.
    pub fn hold_shield(&mut self, shield_id: impl Into<String>) {
        self.off_hand = Some(OffHandItem::Shield {
            id: shield_id.into(),
        });
        self.two_handed_grip = false;
    }

    /// Empty the off hand.
    pub fn unhold_off_hand(&mut self) {
        self.off_hand = None;
    }

    /// Wear armor.
    pub fn wear_armor(&mut self, armor_id: impl Into<String>) {
        self.armor = Some(armor_id.into());
    }

    /// Remove worn armor.
    pub fn unwear_armor(&mut self) {
        self.armor = None;
    }

    /// Grip the main-hand weapon with both hands. Requires an empty off hand;
    /// the request is ignored otherwise.
    pub fn set_two_handed_grip(&mut self, two_handed: bool) {
        if two_handed && self.off_hand.is_some() {
            return;
        }
        self.two_handed_grip = two_handed;
    }

    /// Whether a weapon is held in each hand.
    pub fn is_dual_wielding(&self) -> bool {
        self.main_hand.is_some()
            && matches!(self.off_hand, Some(OffHandItem::Weapon { .. }))
    }

    /// Add an item to the pack.
    pub fn add_carried(&mut self, item_id: impl Into<String>) {
        self.carried.push(item_id.into());
    }

    /// Remove one copy of an item from the pack.
    pub fn remove_carried(&mut self, item_id: &str) -> bool {
        if let Some(pos) = self.carried.iter().position(|id| id == item_id) {
            self.carried.remove(pos);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_handed_grip_requires_free_off_hand() {
        let mut equipment = Equipment::new();
        equipment.hold_main_hand("longsword");
        equipment.set_two_handed_grip(true);
        assert!(equipment.two_handed_grip());

        equipment.hold_shield("heavy-steel-shield");
        assert!(!equipment.two_handed_grip());

        equipment.set_two_handed_grip(true);
        assert!(!equipment.two_handed_grip()); // refused while off hand is full
    }

    #[test]
    fn dual_wield_detection() {
        let mut equipment = Equipment::new();
        equipment.hold_main_hand("longsword");
        assert!(!equipment.is_dual_wielding());

        equipment.hold_off_hand_weapon("dagger");
        assert!(equipment.is_dual_wielding());

        equipment.hold_shield("heavy-steel-shield");
        assert!(!equipment.is_dual_wielding());
        assert_eq!(
            equipment.off_hand().and_then(|o| o.shield_id()),
            Some("heavy-steel-shield")
        );
    }

    #[test]
    fn unhold_main_releases_grip() {
        let mut equipment = Equipment::new();
        equipment.hold_main_hand("greatsword");
        equipment.set_two_handed_grip(true);
        equipment.unhold_main_hand();
        assert!(!equipment.two_handed_grip());
        assert_eq!(equipment.main_hand(), None);
    }

    #[test]
    fn carried_items_remove_single_copy() {
        let mut equipment = Equipment::new();
        equipment.add_carried("rope");
        equipment.add_carried("rope");
        assert!(equipment.remove_carried("rope"));
        assert_eq!(equipment.carried().len(), 1);
        assert!(!equipment.remove_carried("lantern"));
    }
}
