//! Spellbook derivation: slots per day, leveled spell lists, preparation
//! budgets, and cast tracking.
//!
//! Over-preparation is advisory: `prepare` on the spellbook state never
//! rejects, `can_prepare` here is the signal the UI disables on.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::effect::EffectKind;
use crate::entities::{CastingKind, SpellSchool};
use crate::error::DomainError;

use super::CharacterRules;

/// Slot accounting for one spell level of one casting class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUsage {
    /// Table slots plus ability bonus slots
    pub slots: u32,
    /// Extra slot reserved for the focused school (wizard-like only)
    pub school_slots: u32,
    /// Slot cost of everything prepared at this level (forbidden school
    /// spells cost double)
    pub used: u32,
    /// Portion of `used` not eligible for the school slot
    pub non_school_used: u32,
}

impl SlotUsage {
    /// Slots still free, school slot included.
    pub fn remaining(&self) -> u32 {
        (self.slots + self.school_slots).saturating_sub(self.used)
    }
}

impl CharacterRules<'_> {
    /// Class ids the character casts as: classes with levels and a casting
    /// profile, plus classes granted by effects.
    pub fn casting_classes(&self) -> Vec<String> {
        let mut classes = Vec::new();
        for (class_id, _) in self.character().class_levels() {
            if let Ok(class) = self.content().class(&class_id) {
                if class.spellcasting.is_some() && !classes.contains(&class_id) {
                    classes.push(class_id);
                }
            }
        }
        for effect in self.effects() {
            if let EffectKind::GrantSpellcasting { class } = &effect.kind {
                if !classes.contains(class) {
                    classes.push(class.clone());
                }
            }
        }
        classes
    }

    /// Effective casting level in a class: class levels, or character level
    /// for effect-granted casting.
    fn casting_level(&self, class_id: &str) -> u8 {
        let class_level = self.character().class_level(class_id);
        let granted = self.effects().iter().any(
            |e| matches!(&e.kind, EffectKind::GrantSpellcasting { class } if class == class_id),
        );
        if granted {
            class_level.max(self.character().level())
        } else {
            class_level
        }
    }

    /// Spells castable per day at a spell level: class table plus ability
    /// bonus slots. 0th-level spells are never ability-bonused. `None` when
    /// the spell level is not castable at all.
    pub fn spells_per_day(
        &self,
        class_id: &str,
        spell_level: u8,
    ) -> Result<Option<u32>, DomainError> {
        let class = self.content().class(class_id)?;
        let Some(casting) = &class.spellcasting else {
            return Ok(None);
        };
        let level = self.casting_level(class_id);
        let Some(table) = casting.table_slots(level, spell_level) else {
            return Ok(None);
        };
        let mut slots = table as u32;
        if spell_level > 0 {
            let modifier = self.ability_modifier(casting.ability);
            if modifier >= spell_level as i32 {
                slots += ((modifier - spell_level as i32) / 4 + 1) as u32;
            }
        }
        Ok(Some(slots))
    }

    /// The focused (specialized) school, once its input has been supplied.
    ///
    /// Fails with [`DomainError::InvalidInput`] when the supplied value is
    /// not a specializable school.
    pub fn focused_school(&self) -> Result<Option<SpellSchool>, DomainError> {
        let Some(effect) = self
            .effects()
            .iter()
            .find(|e| matches!(e.kind, EffectKind::SchoolChoice { .. }))
        else {
            return Ok(None);
        };
        let key = effect.input_key("school");
        let Some(value) = self.last_input(&key) else {
            return Ok(None);
        };
        let school = SpellSchool::from_str(value)
            .map_err(|_| DomainError::invalid_input(format!("unknown school: {}", value)))?;
        if !SpellSchool::SPECIALIZABLE.contains(&school) {
            return Err(DomainError::invalid_input(format!(
                "cannot specialize in {}",
                school
            )));
        }
        Ok(Some(school))
    }

    /// Schools forbidden by the specialization choice.
    pub fn forbidden_schools(&self) -> Result<Vec<SpellSchool>, DomainError> {
        let Some(effect) = self
            .effects()
            .iter()
            .find(|e| matches!(e.kind, EffectKind::SchoolChoice { .. }))
        else {
            return Ok(Vec::new());
        };
        let EffectKind::SchoolChoice { forbidden_count } = effect.kind else {
            return Ok(Vec::new());
        };
        let mut schools = Vec::new();
        for slot in 1..=forbidden_count {
            let key = effect.input_key(&format!("forbidden{}", slot));
            if let Some(value) = self.last_input(&key) {
                let school = SpellSchool::from_str(value).map_err(|_| {
                    DomainError::invalid_input(format!("unknown school: {}", value))
                })?;
                schools.push(school);
            }
        }
        Ok(schools)
    }

    /// Most recent input stored under a key, scanning the upgrade history.
    fn last_input(&self, key: &str) -> Option<&str> {
        let mut found = None;
        for upgrade in self.character().all_upgrades() {
            if let Some(value) = upgrade.effect_input(key) {
                found = Some(value);
            }
        }
        found
    }

    /// Slot accounting at one spell level for a preparing caster.
    pub fn slot_usage(
        &self,
        class_id: &str,
        spell_level: u8,
    ) -> Result<Option<SlotUsage>, DomainError> {
        let class = self.content().class(class_id)?;
        let Some(casting) = &class.spellcasting else {
            return Ok(None);
        };
        let Some(slots) = self.spells_per_day(class_id, spell_level)? else {
            return Ok(None);
        };

        let wizard_like = casting.kind == CastingKind::WizardLike;
        let focused = if wizard_like { self.focused_school()? } else { None };
        let forbidden = if wizard_like {
            self.forbidden_schools()?
        } else {
            Vec::new()
        };
        let school_slots = u32::from(focused.is_some() && spell_level > 0);

        let mut used = 0u32;
        let mut non_school_used = 0u32;
        if let Some(book) = self.character().spellbook(class_id) {
            for spell_id in book.prepared() {
                let spell = self.content().spell(spell_id)?;
                if spell.level_for(class_id) != Some(spell_level) {
                    continue;
                }
                let cost = if forbidden.contains(&spell.school) { 2 } else { 1 };
                used += cost;
                if focused != Some(spell.school) {
                    non_school_used += cost;
                }
            }
        }

        Ok(Some(SlotUsage {
            slots,
            school_slots,
            used,
            non_school_used,
        }))
    }

    /// Whether one more preparation of a spell fits the slot budget.
    ///
    /// Always false for spontaneous casters and for spells not on the
    /// class's list.
    pub fn can_prepare(&self, class_id: &str, spell_id: &str) -> Result<bool, DomainError> {
        let class = self.content().class(class_id)?;
        let Some(casting) = &class.spellcasting else {
            return Ok(false);
        };
        if !casting.kind.prepares() {
            return Ok(false);
        }
        let spell = self.content().spell(spell_id)?;
        let Some(spell_level) = spell.level_for(class_id) else {
            return Ok(false);
        };
        let Some(usage) = self.slot_usage(class_id, spell_level)? else {
            return Ok(false);
        };

        let wizard_like = casting.kind == CastingKind::WizardLike;
        let focused = if wizard_like { self.focused_school()? } else { None };
        let forbidden = if wizard_like {
            self.forbidden_schools()?
        } else {
            Vec::new()
        };
        let cost = if forbidden.contains(&spell.school) { 2 } else { 1 };

        let fits_total = usage.used + cost <= usage.slots + usage.school_slots;
        let fits_base = focused == Some(spell.school)
            || usage.non_school_used + cost <= usage.slots;
        Ok(fits_total && fits_base)
    }

    /// Known spells partitioned by their level on the class's list.
    pub fn known_spells(&self, class_id: &str) -> Result<BTreeMap<u8, Vec<String>>, DomainError> {
        let mut ids: Vec<&str> = Vec::new();
        if let Some(book) = self.character().spellbook(class_id) {
            ids.extend(book.known().iter().map(String::as_str));
        }
        for upgrade in self.character().all_upgrades() {
            if upgrade.class_id == class_id {
                for id in &upgrade.spells_learned {
                    if !ids.contains(&id.as_str()) {
                        ids.push(id);
                    }
                }
            }
        }

        let mut by_level: BTreeMap<u8, Vec<String>> = BTreeMap::new();
        for id in ids {
            let spell = self.content().spell(id)?;
            if let Some(level) = spell.level_for(class_id) {
                by_level.entry(level).or_default().push(id.to_string());
            }
        }
        Ok(by_level)
    }

    /// Prepared spells partitioned by level, duplicates retained.
    pub fn prepared_spells(
        &self,
        class_id: &str,
    ) -> Result<BTreeMap<u8, Vec<String>>, DomainError> {
        let mut by_level: BTreeMap<u8, Vec<String>> = BTreeMap::new();
        if let Some(book) = self.character().spellbook(class_id) {
            for id in book.prepared() {
                let spell = self.content().spell(id)?;
                if let Some(level) = spell.level_for(class_id) {
                    by_level.entry(level).or_default().push(id.clone());
                }
            }
        }
        Ok(by_level)
    }

    /// Casts left today at a spell level: prepared copies for preparing
    /// casters, spells per day for spontaneous ones.
    pub fn casts_remaining(
        &self,
        class_id: &str,
        spell_level: u8,
    ) -> Result<Option<u32>, DomainError> {
        let class = self.content().class(class_id)?;
        let Some(casting) = &class.spellcasting else {
            return Ok(None);
        };
        let limit = if casting.kind.prepares() {
            self.prepared_spells(class_id)?
                .get(&spell_level)
                .map(|spells| spells.len() as u32)
                .unwrap_or(0)
        } else {
            match self.spells_per_day(class_id, spell_level)? {
                Some(slots) => slots,
                None => return Ok(None),
            }
        };
        let used = self
            .character()
            .spellbook(class_id)
            .map(|book| book.casts_used(spell_level) as u32)
            .unwrap_or(0);
        Ok(Some(limit.saturating_sub(used)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{effect_input_key, Character};
    use crate::effect::Effect;
    use crate::value_objects::Ability;
    use crate::entities::{
        BabProgression, Class, ClassFeature, Race, SaveProgression, Spell, Spellcasting,
    };
    use crate::rules::testutil::TestContent;

    fn wizard() -> Class {
        Class::new("wizard", "Wizard", 6, BabProgression::Half)
            .with_saves(SaveProgression::Poor, SaveProgression::Poor, SaveProgression::Good)
            .with_feature(
                ClassFeature::new("arcane-school", "Arcane School", 1).with_effect(Effect::new(
                    "school",
                    EffectKind::SchoolChoice { forbidden_count: 2 },
                )),
            )
            .with_spellcasting(Spellcasting {
                kind: CastingKind::WizardLike,
                ability: Ability::Intelligence,
                spells_per_day: vec![vec![3, 1], vec![4, 2], vec![4, 2, 1]],
            })
    }

    fn sorcerer() -> Class {
        Class::new("sorcerer", "Sorcerer", 6, BabProgression::Half)
            .with_spellcasting(Spellcasting {
                kind: CastingKind::SorcererLike,
                ability: Ability::Charisma,
                spells_per_day: vec![vec![3, 3], vec![4, 4]],
            })
    }

    fn spells() -> Vec<Spell> {
        vec![
            Spell::new("magic-missile", "Magic Missile", SpellSchool::Evocation)
                .with_level("wizard", 1)
                .with_level("sorcerer", 1),
            Spell::new("shield", "Shield", SpellSchool::Abjuration).with_level("wizard", 1),
            Spell::new("charm-person", "Charm Person", SpellSchool::Enchantment)
                .with_level("wizard", 1),
            Spell::new("detect-magic", "Detect Magic", SpellSchool::Divination)
                .with_level("wizard", 0)
                .with_level("sorcerer", 0),
        ]
    }

    fn content() -> TestContent {
        let mut content = TestContent::new()
            .with_class(wizard())
            .with_class(sorcerer())
            .with_race(Race::new("human", "Human", 30));
        for spell in spells() {
            content = content.with_spell(spell);
        }
        content
    }

    fn wizard_character(int: i32, levels: u8) -> Character {
        let mut character = Character::new("Ezren");
        character.set_race(Some("human".into()));
        character.set_base_ability(Ability::Intelligence, int);
        for _ in 0..levels {
            character.start_upgrade("wizard").expect("start");
            character.finish_upgrade().expect("finish");
        }
        character
    }

    fn choose_school(character: &mut Character, focused: &str, forbidden: [&str; 2]) {
        let base = |suffix: &str| effect_input_key("class_feature", "arcane-school", suffix);
        // inputs ride on the first upgrade
        let upgrade = match character.pending_upgrade_mut() {
            Some(u) => u,
            None => panic!("expected pending upgrade"),
        };
        upgrade.set_effect_input(base("school"), focused);
        upgrade.set_effect_input(base("forbidden1"), forbidden[0]);
        upgrade.set_effect_input(base("forbidden2"), forbidden[1]);
    }

    #[test]
    fn spells_per_day_adds_ability_bonus_except_level_zero() {
        let content = content();
        let character = wizard_character(16, 1); // INT +3
        let rules = CharacterRules::new(&character, &content).expect("rules");

        // 0th level: table only, never ability-bonused
        assert_eq!(rules.spells_per_day("wizard", 0).expect("spd"), Some(3));
        // 1st level: 1 table + 1 bonus (mod 3 >= 1)
        assert_eq!(rules.spells_per_day("wizard", 1).expect("spd"), Some(2));
        // 2nd level: not castable yet
        assert_eq!(rules.spells_per_day("wizard", 2).expect("spd"), None);
    }

    #[test]
    fn forbidden_school_spells_cost_double() {
        let content = content();
        let mut character = wizard_character(16, 0);
        character.start_upgrade("wizard").expect("start");
        choose_school(&mut character, "evocation", ["enchantment", "necromancy"]);
        character.finish_upgrade().expect("finish");

        character.spellbook_mut("wizard").learn("charm-person");
        character.spellbook_mut("wizard").prepare("charm-person"); // forbidden

        let rules = CharacterRules::new(&character, &content).expect("rules");
        let usage = rules.slot_usage("wizard", 1).expect("usage").expect("some");
        assert_eq!(usage.used, 2); // double cost
        assert_eq!(usage.school_slots, 1); // focused school extra slot

        // a non-forbidden spell costs one
        character.spellbook_mut("wizard").unprepare("charm-person");
        character.spellbook_mut("wizard").prepare("shield");
        let rules = CharacterRules::new(&character, &content).expect("rules");
        let usage = rules.slot_usage("wizard", 1).expect("usage").expect("some");
        assert_eq!(usage.used, 1);
        assert_eq!(usage.non_school_used, 1);
    }

    #[test]
    fn can_prepare_reports_budget_exhaustion() {
        let content = content();
        let mut character = wizard_character(12, 1); // INT +1: 1 table + 1 bonus = 2 slots
        character.spellbook_mut("wizard").learn("magic-missile");
        character.spellbook_mut("wizard").learn("shield");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert!(rules.can_prepare("wizard", "magic-missile").expect("ok"));

        character.spellbook_mut("wizard").prepare("magic-missile");
        character.spellbook_mut("wizard").prepare("magic-missile");
        let rules = CharacterRules::new(&character, &content).expect("rules");
        // both slots consumed by duplicate preparation
        assert!(!rules.can_prepare("wizard", "shield").expect("ok"));
        let usage = rules.slot_usage("wizard", 1).expect("usage").expect("some");
        assert_eq!(usage.used, 2);
        assert_eq!(usage.remaining(), 0);
    }

    #[test]
    fn school_slot_takes_only_focused_spells() {
        let content = content();
        let mut character = wizard_character(12, 0); // 2 base slots at level 1
        character.start_upgrade("wizard").expect("start");
        choose_school(&mut character, "evocation", ["enchantment", "necromancy"]);
        character.finish_upgrade().expect("finish");
        character.spellbook_mut("wizard").learn("magic-missile");
        character.spellbook_mut("wizard").learn("shield");
        // fill both generic slots with abjuration
        character.spellbook_mut("wizard").prepare("shield");
        character.spellbook_mut("wizard").prepare("shield");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        // the school slot remains, but only for evocation
        assert!(rules.can_prepare("wizard", "magic-missile").expect("ok"));
        assert!(!rules.can_prepare("wizard", "shield").expect("ok"));
    }

    #[test]
    fn unknown_school_input_is_invalid() {
        let content = content();
        let mut character = wizard_character(12, 0);
        character.start_upgrade("wizard").expect("start");
        choose_school(&mut character, "chronomancy", ["enchantment", "necromancy"]);
        character.finish_upgrade().expect("finish");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        let err = rules.focused_school().expect_err("invalid");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn spontaneous_casters_never_prepare() {
        let content = content();
        let mut character = Character::new("Seoni");
        character.set_race(Some("human".into()));
        character.set_base_ability(Ability::Charisma, 16);
        character.start_upgrade("sorcerer").expect("start");
        character.finish_upgrade().expect("finish");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert!(!rules.can_prepare("sorcerer", "magic-missile").expect("ok"));
        // casts come straight off spells per day: 3 table + 1 bonus
        assert_eq!(
            rules.casts_remaining("sorcerer", 1).expect("ok"),
            Some(4)
        );
    }

    #[test]
    fn cast_tracking_counts_down() {
        let content = content();
        let mut character = wizard_character(12, 1);
        character.spellbook_mut("wizard").learn("magic-missile");
        character.spellbook_mut("wizard").prepare("magic-missile");
        character.spellbook_mut("wizard").cast(1);

        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert_eq!(rules.casts_remaining("wizard", 1).expect("ok"), Some(0));

        character.spellbook_mut("wizard").reset_casts();
        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert_eq!(rules.casts_remaining("wizard", 1).expect("ok"), Some(1));
    }

    #[test]
    fn known_spells_partition_by_class_list_level() {
        let content = content();
        let mut character = wizard_character(12, 1);
        character.spellbook_mut("wizard").learn("magic-missile");
        character.spellbook_mut("wizard").learn("detect-magic");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        let known = rules.known_spells("wizard").expect("known");
        assert_eq!(known.get(&0).map(Vec::len), Some(1));
        assert_eq!(known.get(&1).map(Vec::len), Some(1));
    }

    #[test]
    fn casting_classes_lists_spellcasters_only() {
        let content = content().with_class(Class::new(
            "fighter",
            "Fighter",
            10,
            BabProgression::Full,
        ));
        let mut character = Character::new("Gish");
        character.set_race(Some("human".into()));
        for class in ["fighter", "wizard"] {
            character.start_upgrade(class).expect("start");
            character.finish_upgrade().expect("finish");
        }
        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert_eq!(rules.casting_classes(), vec!["wizard".to_string()]);
    }
}
