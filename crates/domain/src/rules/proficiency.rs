//! Proficiency resolution from granted effects.

use std::collections::BTreeSet;

use crate::effect::EffectKind;
use crate::entities::{Armor, ArmorCategory, Weapon, WeaponTraining};

use super::{CharacterRules, ResolvedEffect};

/// The character's aggregated proficiency sets.
///
/// Membership is tested by training category first, then by specific item
/// id. Tower shields are never covered by the normal shield category: they
/// must be granted by the tower-shield category or by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Proficiencies {
    pub weapon_training: BTreeSet<WeaponTraining>,
    pub weapons: BTreeSet<String>,
    pub armor_training: BTreeSet<ArmorCategory>,
    pub armor: BTreeSet<String>,
    pub shield_training: BTreeSet<ArmorCategory>,
    pub shields: BTreeSet<String>,
}

impl Proficiencies {
    /// Aggregate every proficiency-granting effect.
    pub fn from_effects(effects: &[ResolvedEffect]) -> Self {
        let mut proficiencies = Self::default();
        for effect in effects {
            if let EffectKind::GrantProficiency {
                weapon_training,
                weapons,
                armor_training,
                armor,
                shield_training,
                shields,
            } = &effect.kind
            {
                proficiencies.weapon_training.extend(weapon_training.iter().copied());
                proficiencies.weapons.extend(weapons.iter().cloned());
                proficiencies.armor_training.extend(armor_training.iter().copied());
                proficiencies.armor.extend(armor.iter().cloned());
                proficiencies.shield_training.extend(shield_training.iter().copied());
                proficiencies.shields.extend(shields.iter().cloned());
            }
        }
        proficiencies
    }

    /// Whether a weapon can be used without the non-proficiency penalty.
    pub fn has_weapon(&self, weapon: &Weapon) -> bool {
        self.weapon_training.contains(&weapon.training) || self.weapons.contains(&weapon.id)
    }

    /// Whether worn armor is proficient.
    pub fn has_armor(&self, armor: &Armor) -> bool {
        self.armor_training.contains(&armor.category) || self.armor.contains(&armor.id)
    }

    /// Whether a shield is proficient. Tower shields require their own
    /// category or an explicit id grant.
    pub fn has_shield(&self, shield: &Armor) -> bool {
        match shield.category {
            ArmorCategory::TowerShield => {
                self.shield_training.contains(&ArmorCategory::TowerShield)
                    || self.shields.contains(&shield.id)
            }
            _ => {
                self.shield_training.contains(&shield.category)
                    || self.shields.contains(&shield.id)
            }
        }
    }
}

impl CharacterRules<'_> {
    /// The character's current proficiency sets.
    pub fn proficiencies(&self) -> Proficiencies {
        Proficiencies::from_effects(self.effects())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::effects::{EffectSource, EffectSourceKind};

    fn grant(kind: EffectKind) -> ResolvedEffect {
        ResolvedEffect {
            kind,
            effect_id: "prof".into(),
            when: None,
            source: EffectSource {
                kind: EffectSourceKind::ClassFeature,
                id: "training".into(),
                name: "Training".into(),
            },
            grown_tier: None,
        }
    }

    fn martial_grant() -> ResolvedEffect {
        grant(EffectKind::GrantProficiency {
            weapon_training: vec![WeaponTraining::Simple, WeaponTraining::Martial],
            weapons: vec![],
            armor_training: vec![ArmorCategory::Light, ArmorCategory::Medium],
            armor: vec![],
            shield_training: vec![ArmorCategory::Shield],
            shields: vec![],
        })
    }

    #[test]
    fn training_category_covers_weapons() {
        let proficiencies = Proficiencies::from_effects(&[martial_grant()]);
        let longsword = Weapon::new(
            "longsword",
            "Longsword",
            WeaponTraining::Martial,
            crate::entities::WeaponHandling::OneHanded,
            crate::value_objects::DamageDice::parse("1d8").expect("damage"),
        );
        assert!(proficiencies.has_weapon(&longsword));

        let whip = Weapon::new(
            "whip",
            "Whip",
            WeaponTraining::Exotic,
            crate::entities::WeaponHandling::OneHanded,
            crate::value_objects::DamageDice::parse("1d3").expect("damage"),
        );
        assert!(!proficiencies.has_weapon(&whip));
    }

    #[test]
    fn specific_id_covers_single_weapon() {
        let proficiencies = Proficiencies::from_effects(&[grant(EffectKind::GrantProficiency {
            weapon_training: vec![],
            weapons: vec!["whip".into()],
            armor_training: vec![],
            armor: vec![],
            shield_training: vec![],
            shields: vec![],
        })]);
        let whip = Weapon::new(
            "whip",
            "Whip",
            WeaponTraining::Exotic,
            crate::entities::WeaponHandling::OneHanded,
            crate::value_objects::DamageDice::parse("1d3").expect("damage"),
        );
        assert!(proficiencies.has_weapon(&whip));
    }

    #[test]
    fn tower_shields_never_ride_on_normal_shield_training() {
        let proficiencies = Proficiencies::from_effects(&[martial_grant()]);
        let heavy = Armor::new("heavy-steel-shield", "Heavy Steel Shield", ArmorCategory::Shield, 2);
        let tower = Armor::new("tower-shield", "Tower Shield", ArmorCategory::TowerShield, 4);
        assert!(proficiencies.has_shield(&heavy));
        assert!(!proficiencies.has_shield(&tower));

        let with_tower = Proficiencies::from_effects(&[
            martial_grant(),
            grant(EffectKind::GrantProficiency {
                weapon_training: vec![],
                weapons: vec![],
                armor_training: vec![],
                armor: vec![],
                shield_training: vec![ArmorCategory::TowerShield],
                shields: vec![],
            }),
        ]);
        assert!(with_tower.has_shield(&tower));
    }

    #[test]
    fn tower_shield_by_specific_id() {
        let proficiencies = Proficiencies::from_effects(&[grant(EffectKind::GrantProficiency {
            weapon_training: vec![],
            weapons: vec![],
            armor_training: vec![],
            armor: vec![],
            shield_training: vec![],
            shields: vec!["tower-shield".into()],
        })]);
        let tower = Armor::new("tower-shield", "Tower Shield", ArmorCategory::TowerShield, 4);
        assert!(proficiencies.has_shield(&tower));
    }

    #[test]
    fn grants_accumulate_across_effects() {
        let extra = grant(EffectKind::GrantProficiency {
            weapon_training: vec![WeaponTraining::Exotic],
            weapons: vec![],
            armor_training: vec![ArmorCategory::Heavy],
            armor: vec![],
            shield_training: vec![],
            shields: vec![],
        });
        let proficiencies = Proficiencies::from_effects(&[martial_grant(), extra]);
        assert!(proficiencies.weapon_training.contains(&WeaponTraining::Exotic));
        assert!(proficiencies.armor_training.contains(&ArmorCategory::Heavy));
        assert!(proficiencies.armor_training.contains(&ArmorCategory::Light));
    }
}
