//! Status aggregation: HP, saves, AC variants, BAB, combat maneuvers,
//! initiative, speed, skills, and upgrade validation.

use crate::character::{FavoredClassBonus, HitPointGain, Upgrade};
use crate::effect::{EffectKind, SaveTarget};
use crate::error::DomainError;
use crate::value_objects::{Ability, Bonus, BonusType, NamedBonus};

use super::{CharacterRules, StatValue};

/// Skill-point accounting for one upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillPoints {
    pub used: i32,
    pub budget: i32,
    pub remaining: i32,
}

/// Validation snapshot for one upgrade. An incomplete upgrade is a valid,
/// displayable state; this reports what is missing, it never errors.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeValidation {
    pub level: u8,
    pub feat_slots: usize,
    pub feats_filled: usize,
    pub skill_points: SkillPoints,
    pub ability_increase_required: bool,
    pub ability_increase_chosen: bool,
    pub complete: bool,
}

/// Which AC variant to derive.
enum AcVariant {
    Normal,
    FlatFooted,
    Touch,
}

impl CharacterRules<'_> {
    // =========================================================================
    // Base attack bonus
    // =========================================================================

    /// Per-class iterative attack arrays as named bonuses (base type).
    pub(crate) fn class_bab_bonuses(&self) -> Vec<NamedBonus> {
        let mut bonuses = Vec::new();
        for (class_id, class_level) in self.character().class_levels() {
            let Ok(class) = self.content().class(&class_id) else {
                continue;
            };
            bonuses.push(NamedBonus::new(
                class.name.clone(),
                Bonus::new(class.bab.attacks_at(class_level), BonusType::Base),
            ));
        }
        bonuses
    }

    /// The iterative attack sequence, index-aligned across classes.
    pub fn base_attack_bonuses(&self) -> Vec<i32> {
        let bonuses = crate::value_objects::aggregate(self.class_bab_bonuses());
        crate::value_objects::sum_amounts(&bonuses)
    }

    /// Highest base attack bonus.
    pub fn max_bab(&self) -> i32 {
        self.base_attack_bonuses().first().copied().unwrap_or(0)
    }

    // =========================================================================
    // Hit points, saves, initiative, speed
    // =========================================================================

    /// Maximum hit points: per-level hit-die gains (first level maxed),
    /// CON modifier per level, favored-class picks, and effects.
    pub fn hit_points(&self) -> StatValue {
        let mut bonuses = Vec::new();

        let mut dice_total = 0;
        for (index, upgrade) in self.character().all_upgrades().enumerate() {
            let Ok(class) = self.content().class(&upgrade.class_id) else {
                continue;
            };
            let die = class.hit_die as i32;
            dice_total += if index == 0 {
                die
            } else {
                match upgrade.hit_points {
                    HitPointGain::Rolled { value } => value as i32,
                    HitPointGain::Average => die / 2 + 1,
                }
            };
        }
        if dice_total != 0 {
            bonuses.push(NamedBonus::scalar("Hit dice", dice_total, BonusType::Dice));
        }

        let con = self.ability_modifier(Ability::Constitution);
        if con != 0 {
            bonuses.push(NamedBonus::scalar(
                "CON modifier",
                con * self.character().level() as i32,
                BonusType::Dice,
            ));
        }

        let favored = self
            .character()
            .all_upgrades()
            .filter(|u| u.favored_class == FavoredClassBonus::HitPoint)
            .count() as i32;
        if favored != 0 {
            bonuses.push(NamedBonus::scalar(
                "Favored class",
                favored,
                BonusType::Untyped,
            ));
        }

        for effect in self.effects() {
            if let EffectKind::HitPointBonus { bonus } = &effect.kind {
                bonuses.push(NamedBonus::new(
                    effect.source.name.clone(),
                    self.resolve_bonus(bonus),
                ));
            }
        }

        StatValue::from_bonuses(bonuses)
    }

    /// One of the three saving throws.
    pub fn save(&self, target: SaveTarget) -> StatValue {
        let mut bonuses = Vec::new();

        for (class_id, class_level) in self.character().class_levels() {
            let Ok(class) = self.content().class(&class_id) else {
                continue;
            };
            let progression = match target {
                SaveTarget::Fortitude => class.fortitude,
                SaveTarget::Reflex => class.reflex,
                _ => class.will,
            };
            bonuses.push(NamedBonus::scalar(
                class.name.clone(),
                progression.at(class_level),
                BonusType::Base,
            ));
        }

        let ability = match target {
            SaveTarget::Fortitude => Ability::Constitution,
            SaveTarget::Reflex => Ability::Dexterity,
            _ => Ability::Wisdom,
        };
        bonuses.push(NamedBonus::scalar(
            format!("{} modifier", ability),
            self.ability_modifier(ability),
            BonusType::Dice,
        ));

        for effect in self.effects() {
            if let EffectKind::SaveBonus { save, bonus } = &effect.kind {
                if save.applies_to(target) {
                    bonuses.push(NamedBonus::new(
                        effect.source.name.clone(),
                        self.resolve_bonus(bonus),
                    ));
                }
            }
        }

        StatValue::from_bonuses(bonuses)
    }

    /// Initiative modifier.
    pub fn initiative(&self) -> StatValue {
        let mut bonuses = vec![NamedBonus::scalar(
            "DEX modifier",
            self.ability_modifier(Ability::Dexterity),
            BonusType::Dice,
        )];
        for effect in self.effects() {
            if let EffectKind::InitiativeBonus { bonus } = &effect.kind {
                bonuses.push(NamedBonus::new(
                    effect.source.name.clone(),
                    self.resolve_bonus(bonus),
                ));
            }
        }
        StatValue::from_bonuses(bonuses)
    }

    /// Land speed in feet.
    pub fn speed(&self) -> StatValue {
        let base = self
            .character()
            .race_id()
            .and_then(|id| self.content().race(id).ok())
            .map(|race| race.speed as i32)
            .unwrap_or(30);
        let mut bonuses = vec![NamedBonus::scalar("Base speed", base, BonusType::Untyped)];
        for effect in self.effects() {
            if let EffectKind::SpeedBonus { bonus } = &effect.kind {
                bonuses.push(NamedBonus::new(
                    effect.source.name.clone(),
                    self.resolve_bonus(bonus),
                ));
            }
        }
        StatValue::from_bonuses(bonuses)
    }

    // =========================================================================
    // Armor class and combat maneuvers
    // =========================================================================

    /// Normal armor class.
    pub fn armor_class(&self) -> StatValue {
        self.ac_value(AcVariant::Normal)
    }

    /// Flat-footed AC: no DEX, no bonus types that need reaction (dodge).
    pub fn armor_class_flat_footed(&self) -> StatValue {
        self.ac_value(AcVariant::FlatFooted)
    }

    /// Touch AC: no armor, shield, or natural armor types.
    pub fn armor_class_touch(&self) -> StatValue {
        self.ac_value(AcVariant::Touch)
    }

    fn ac_value(&self, variant: AcVariant) -> StatValue {
        let mut bonuses = vec![NamedBonus::scalar("Base", 10, BonusType::Untyped)];

        if !matches!(variant, AcVariant::FlatFooted) {
            let dex = self.ability_modifier(Ability::Dexterity);
            bonuses.push(NamedBonus::scalar(
                "DEX modifier",
                self.capped_dex(dex),
                BonusType::Dice,
            ));
        }

        let equipment = self.character().equipment();
        if let Some(armor) = equipment
            .armor()
            .and_then(|id| self.content().armor(id).ok())
        {
            bonuses.push(NamedBonus::scalar(
                armor.name.clone(),
                armor.total_ac_bonus(),
                BonusType::Armor,
            ));
        }
        if let Some(shield) = equipment
            .off_hand()
            .and_then(|o| o.shield_id())
            .and_then(|id| self.content().armor(id).ok())
        {
            bonuses.push(NamedBonus::scalar(
                shield.name.clone(),
                shield.total_ac_bonus(),
                BonusType::Shield,
            ));
        }

        let size = self.race_size().attack_and_ac_modifier();
        if size != 0 {
            bonuses.push(NamedBonus::scalar("Size", size, BonusType::Size));
        }

        for effect in self.effects() {
            if let EffectKind::ArmorClassBonus { bonus } = &effect.kind {
                bonuses.push(NamedBonus::new(
                    effect.source.name.clone(),
                    self.resolve_bonus(bonus),
                ));
            }
        }

        bonuses.retain(|b| match variant {
            AcVariant::Normal => true,
            AcVariant::FlatFooted => b.bonus.kind.applies_flat_footed(),
            AcVariant::Touch => b.bonus.kind.applies_touch(),
        });

        StatValue::from_bonuses(bonuses)
    }

    /// DEX modifier capped by worn armor and shield.
    fn capped_dex(&self, dex: i32) -> i32 {
        let equipment = self.character().equipment();
        let mut capped = dex;
        for armor in equipment
            .armor()
            .into_iter()
            .chain(equipment.off_hand().and_then(|o| o.shield_id()))
            .filter_map(|id| self.content().armor(id).ok())
        {
            if let Some(cap) = armor.max_dex {
                capped = capped.min(cap);
            }
        }
        capped
    }

    pub(crate) fn race_size(&self) -> crate::value_objects::SizeCategory {
        self.character()
            .race_id()
            .and_then(|id| self.content().race(id).ok())
            .map(|race| race.size)
            .unwrap_or_default()
    }

    /// Combat maneuver bonus.
    pub fn cmb(&self) -> StatValue {
        let mut bonuses = vec![
            NamedBonus::scalar("BAB", self.max_bab(), BonusType::Base),
            NamedBonus::scalar(
                "STR modifier",
                self.ability_modifier(Ability::Strength),
                BonusType::Dice,
            ),
        ];
        let size = self.race_size().combat_maneuver_modifier();
        if size != 0 {
            bonuses.push(NamedBonus::scalar("Size", size, BonusType::Size));
        }
        StatValue::from_bonuses(bonuses)
    }

    /// Combat maneuver defense.
    pub fn cmd(&self) -> StatValue {
        let mut bonuses = vec![
            NamedBonus::scalar("Base", 10, BonusType::Untyped),
            NamedBonus::scalar("BAB", self.max_bab(), BonusType::Base),
            NamedBonus::scalar(
                "STR modifier",
                self.ability_modifier(Ability::Strength),
                BonusType::Dice,
            ),
            NamedBonus::scalar(
                "DEX modifier",
                self.ability_modifier(Ability::Dexterity),
                BonusType::Dice,
            ),
        ];
        let size = self.race_size().combat_maneuver_modifier();
        if size != 0 {
            bonuses.push(NamedBonus::scalar("Size", size, BonusType::Size));
        }
        StatValue::from_bonuses(bonuses)
    }

    // =========================================================================
    // Skills
    // =========================================================================

    /// Total ranks bought in a skill across all upgrades.
    pub fn skill_ranks(&self, skill_id: &str) -> i32 {
        self.character()
            .all_upgrades()
            .filter_map(|u| u.skill_ranks.get(skill_id))
            .sum()
    }

    /// Whether any held class lists the skill as a class skill.
    pub fn is_class_skill(&self, skill_id: &str) -> bool {
        self.character()
            .class_levels()
            .iter()
            .filter_map(|(class_id, _)| self.content().class(class_id).ok())
            .any(|class| class.is_class_skill(skill_id))
    }

    /// Armor check penalty from worn armor and held shield (non-positive).
    pub fn armor_check_penalty(&self) -> i32 {
        let equipment = self.character().equipment();
        equipment
            .armor()
            .into_iter()
            .chain(equipment.off_hand().and_then(|o| o.shield_id()))
            .filter_map(|id| self.content().armor(id).ok())
            .map(|armor| armor.check_penalty)
            .sum()
    }

    /// Full breakdown for one skill.
    pub fn skill_total(&self, skill_id: &str) -> Result<StatValue, DomainError> {
        let def = self.content().skill(skill_id)?;
        let ranks = self.skill_ranks(skill_id);
        let mut bonuses = Vec::new();

        if ranks != 0 {
            bonuses.push(NamedBonus::scalar("Ranks", ranks, BonusType::Untyped));
        }
        bonuses.push(NamedBonus::scalar(
            format!("{} modifier", def.ability),
            self.ability_modifier(def.ability),
            BonusType::Dice,
        ));
        if ranks > 0 && self.is_class_skill(skill_id) {
            bonuses.push(NamedBonus::scalar("Class skill", 3, BonusType::Untyped));
        }
        if def.armor_check_penalty {
            let penalty = self.armor_check_penalty();
            if penalty != 0 {
                bonuses.push(NamedBonus::scalar(
                    "Armor check penalty",
                    penalty,
                    BonusType::Untyped,
                ));
            }
        }
        for effect in self.effects() {
            if let EffectKind::SkillBonus { skill, bonus } = &effect.kind {
                if skill == skill_id {
                    bonuses.push(NamedBonus::new(
                        effect.source.name.clone(),
                        self.resolve_bonus(bonus),
                    ));
                }
            }
        }

        Ok(StatValue::from_bonuses(bonuses))
    }

    /// Totals for every skill the content defines.
    pub fn skill_totals(&self) -> Result<Vec<(String, StatValue)>, DomainError> {
        let mut totals = Vec::new();
        for def in self.content().skills() {
            totals.push((def.id.clone(), self.skill_total(&def.id)?));
        }
        Ok(totals)
    }

    /// Skill-point accounting for one upgrade.
    pub fn skill_points(&self, upgrade: &Upgrade) -> SkillPoints {
        let class_points = self
            .content()
            .class(&upgrade.class_id)
            .map(|class| class.skill_points as i32)
            .unwrap_or(0);
        let int = self.ability_modifier(Ability::Intelligence);
        let mut budget = (class_points + int).max(1);
        if upgrade.favored_class == FavoredClassBonus::SkillPoint {
            budget += 1;
        }
        let used = upgrade.skill_points_used();
        SkillPoints {
            used,
            budget,
            remaining: budget - used,
        }
    }

    // =========================================================================
    // Feat slots and upgrade validation
    // =========================================================================

    /// Feat slots available to the upgrade at a 0-based level index: one at
    /// every odd level, plus slot-granting effects gained at exactly that
    /// level (racial slots at level 1, class-feature slots at the class
    /// level the upgrade reaches).
    pub fn feat_slots(&self, level_index: usize) -> usize {
        let upgrades: Vec<&Upgrade> = self.character().all_upgrades().collect();
        let Some(upgrade) = upgrades.get(level_index) else {
            return 0;
        };
        let level = level_index + 1;
        let mut slots = usize::from(level % 2 == 1);

        if level == 1 {
            if let Some(race) = self
                .character()
                .race_id()
                .and_then(|id| self.content().race(id).ok())
            {
                slots += race
                    .traits
                    .iter()
                    .flat_map(|t| &t.effects)
                    .filter(|e| matches!(e.kind, EffectKind::GrantFeatSlot))
                    .count();
            }
        }

        let class_level_reached = upgrades[..=level_index]
            .iter()
            .filter(|u| u.class_id == upgrade.class_id)
            .count() as u8;
        if let Ok(class) = self.content().class(&upgrade.class_id) {
            slots += class
                .features
                .iter()
                .filter(|f| f.level == class_level_reached)
                .flat_map(|f| &f.effects)
                .filter(|e| matches!(e.kind, EffectKind::GrantFeatSlot))
                .count();
        }

        slots
    }

    /// Validate the upgrade at a 0-based level index.
    pub fn validate_upgrade_at(&self, level_index: usize) -> Option<UpgradeValidation> {
        let upgrades: Vec<&Upgrade> = self.character().all_upgrades().collect();
        let upgrade = upgrades.get(level_index)?;
        let level = (level_index + 1) as u8;

        let feat_slots = self.feat_slots(level_index);
        let feats_filled = upgrade.chosen_feats().count();
        let skill_points = self.skill_points(upgrade);
        let ability_increase_required = level % 4 == 0;
        let ability_increase_chosen = upgrade.ability_increase.is_some();

        let complete = feats_filled == feat_slots
            && skill_points.remaining == 0
            && (!ability_increase_required || ability_increase_chosen);

        Some(UpgradeValidation {
            level,
            feat_slots,
            feats_filled,
            skill_points,
            ability_increase_required,
            ability_increase_chosen,
            complete,
        })
    }

    /// Validate the pending upgrade, if one is being edited.
    pub fn validate_pending(&self) -> Option<UpgradeValidation> {
        self.character().pending_upgrade()?;
        self.validate_upgrade_at(self.character().committed_upgrades().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::effect::Effect;
    use crate::entities::{
        Armor, ArmorCategory, BabProgression, Class, ClassFeature, Race, RacialTrait,
        SaveProgression, SkillDef,
    };
    use crate::rules::testutil::TestContent;
    use crate::value_objects::SizeCategory;

    fn fighter() -> Class {
        Class::new("fighter", "Fighter", 10, BabProgression::Full)
            .with_saves(SaveProgression::Good, SaveProgression::Poor, SaveProgression::Poor)
            .with_skill_points(2)
            .with_class_skills(["climb", "swim"])
    }

    fn wizard() -> Class {
        Class::new("wizard", "Wizard", 6, BabProgression::Half)
            .with_saves(SaveProgression::Poor, SaveProgression::Poor, SaveProgression::Good)
            .with_skill_points(2)
    }

    fn base_content() -> TestContent {
        TestContent::new()
            .with_class(fighter())
            .with_class(wizard())
            .with_race(Race::new("human", "Human", 30))
            .with_skill(SkillDef::new("perception", "Perception", Ability::Wisdom))
            .with_skill(SkillDef::new("climb", "Climb", Ability::Strength).with_armor_check_penalty())
    }

    fn leveled(content_class: &str, levels: u8) -> Character {
        let mut character = Character::new("Test");
        character.set_race(Some("human".into()));
        for _ in 0..levels {
            character.start_upgrade(content_class).expect("start");
            character.finish_upgrade().expect("finish");
        }
        character
    }

    #[test]
    fn bab_arrays_sum_index_aligned_across_classes() {
        let content = base_content();
        let mut character = leveled("fighter", 6);
        for _ in 0..2 {
            character.start_upgrade("wizard").expect("start");
            character.finish_upgrade().expect("finish");
        }
        let rules = CharacterRules::new(&character, &content).expect("rules");
        // fighter 6 -> [6, 1], wizard 2 -> [1]; index-aligned sum
        assert_eq!(rules.base_attack_bonuses(), vec![7, 1]);
        assert_eq!(rules.max_bab(), 7);
    }

    #[test]
    fn hit_points_max_first_level_then_average() {
        let content = base_content();
        let mut character = leveled("fighter", 1);
        character.set_base_ability(Ability::Constitution, 14);
        character.start_upgrade("fighter").expect("start");
        if let Some(u) = character.pending_upgrade_mut() {
            u.hit_points = HitPointGain::Rolled { value: 7 };
        }
        character.finish_upgrade().expect("finish");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        // 10 (max at 1st) + 7 (rolled) + 2 CON * 2 levels
        assert_eq!(rules.hit_points().total, 21);
    }

    #[test]
    fn favored_class_hit_point_choice_adds_one() {
        let content = base_content();
        let mut character = Character::new("Test");
        character.set_race(Some("human".into()));
        character.start_upgrade("fighter").expect("start");
        if let Some(u) = character.pending_upgrade_mut() {
            u.favored_class = FavoredClassBonus::HitPoint;
        }
        character.finish_upgrade().expect("finish");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert_eq!(rules.hit_points().total, 11); // 10 + 1 favored
    }

    #[test]
    fn saves_combine_progression_ability_and_effects() {
        let content = TestContent::new()
            .with_class(fighter())
            .with_race(
                Race::new("dwarf", "Dwarf", 20).with_trait(
                    RacialTrait::new("hardy", "Hardy").with_effect(Effect::new(
                        "hardy",
                        EffectKind::SaveBonus {
                            save: SaveTarget::All,
                            bonus: Bonus::new(2, BonusType::Racial),
                        },
                    )),
                ),
            );
        let mut character = Character::new("Test");
        character.set_race(Some("dwarf".into()));
        character.set_base_ability(Ability::Constitution, 14);
        character.start_upgrade("fighter").expect("start");
        character.finish_upgrade().expect("finish");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        // fort: 2 (good) + 2 (CON) + 2 (hardy)
        assert_eq!(rules.save(SaveTarget::Fortitude).total, 6);
        // will: 0 (poor) + 0 (WIS) + 2 (hardy)
        assert_eq!(rules.save(SaveTarget::Will).total, 2);
    }

    #[test]
    fn ac_variants_filter_bonus_types() {
        let content = base_content()
            .with_armor(
                Armor::new("chainmail", "Chainmail", ArmorCategory::Medium, 6)
                    .with_max_dex(2)
                    .with_check_penalty(-5),
            )
            .with_armor(
                Armor::new("heavy-steel-shield", "Heavy Steel Shield", ArmorCategory::Shield, 2)
                    .with_check_penalty(-2),
            )
            .with_feat(
                crate::entities::Feat::new("dodge", "Dodge").with_effect(Effect::new(
                    "dodge",
                    EffectKind::ArmorClassBonus {
                        bonus: Bonus::new(1, BonusType::Dodge),
                    },
                )),
            );

        let mut character = leveled("fighter", 1);
        character.set_base_ability(Ability::Dexterity, 18); // +4, capped at +2
        character.start_upgrade("fighter").expect("start");
        if let Some(u) = character.pending_upgrade_mut() {
            u.set_feat_slot(0, Some("dodge".into()));
        }
        character.finish_upgrade().expect("finish");
        character.equipment_mut().wear_armor("chainmail");
        character.equipment_mut().hold_shield("heavy-steel-shield");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        // 10 + 2 (capped DEX) + 6 armor + 2 shield + 1 dodge
        assert_eq!(rules.armor_class().total, 21);
        // flat-footed loses DEX and dodge
        assert_eq!(rules.armor_class_flat_footed().total, 18);
        // touch loses armor and shield
        assert_eq!(rules.armor_class_touch().total, 13);
    }

    #[test]
    fn small_race_shifts_ac_and_maneuvers() {
        let content = TestContent::new()
            .with_class(fighter())
            .with_race(Race::new("halfling", "Halfling", 20).with_size(SizeCategory::Small));
        let mut character = Character::new("Test");
        character.set_race(Some("halfling".into()));
        character.start_upgrade("fighter").expect("start");
        character.finish_upgrade().expect("finish");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        assert_eq!(rules.armor_class().total, 11); // 10 + 1 size
        assert_eq!(rules.cmb().total, 0); // 1 BAB + 0 STR - 1 size
        assert_eq!(rules.cmd().total, 10); // 10 + 1 - 1
    }

    #[test]
    fn skill_totals_include_class_skill_and_check_penalty() {
        let content = base_content().with_armor(
            Armor::new("chainmail", "Chainmail", ArmorCategory::Medium, 6)
                .with_check_penalty(-5),
        );
        let mut character = Character::new("Test");
        character.set_race(Some("human".into()));
        character.set_base_ability(Ability::Strength, 14);
        character.start_upgrade("fighter").expect("start");
        if let Some(u) = character.pending_upgrade_mut() {
            u.set_skill_rank("climb", 1);
        }
        character.finish_upgrade().expect("finish");
        character.equipment_mut().wear_armor("chainmail");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        // 1 rank + 2 STR + 3 class skill - 5 ACP
        assert_eq!(rules.skill_total("climb").expect("skill").total, 1);
        // perception: no ranks, WIS 0, not a class skill, no ACP
        assert_eq!(rules.skill_total("perception").expect("skill").total, 0);
        assert!(rules.skill_total("stealth").is_err());
    }

    #[test]
    fn skill_point_budget_counts_single_rank() {
        let content = base_content();
        let mut character = Character::new("Test");
        character.set_race(Some("human".into()));
        character.start_upgrade("fighter").expect("start");
        if let Some(u) = character.pending_upgrade_mut() {
            u.set_skill_rank("perception", 1);
        }

        let rules = CharacterRules::new(&character, &content).expect("rules");
        let pending = rules.character().pending_upgrade().expect("pending");
        let points = rules.skill_points(pending);
        assert_eq!(points.used, 1);
        assert_eq!(points.budget, 2);
        assert_eq!(points.remaining, 1);
    }

    #[test]
    fn low_int_still_grants_one_skill_point() {
        let content = base_content();
        let mut character = leveled("fighter", 1);
        character.set_base_ability(Ability::Intelligence, 6); // -2
        let rules = CharacterRules::new(&character, &content).expect("rules");
        let upgrade = &rules.character().committed_upgrades()[0];
        assert_eq!(rules.skill_points(upgrade).budget, 1);
    }

    #[test]
    fn feat_slots_on_odd_levels_plus_granted_slots() {
        let bonus_feat_fighter = Class::new("fighter", "Fighter", 10, BabProgression::Full)
            .with_feature(
                ClassFeature::new("bonus-feat-1", "Bonus Feat", 1)
                    .with_effect(Effect::new("slot", EffectKind::GrantFeatSlot)),
            )
            .with_feature(
                ClassFeature::new("bonus-feat-2", "Bonus Feat", 2)
                    .with_effect(Effect::new("slot", EffectKind::GrantFeatSlot)),
            );
        let human = Race::new("human", "Human", 30).with_trait(
            RacialTrait::new("skilled", "Skilled")
                .with_effect(Effect::new("slot", EffectKind::GrantFeatSlot)),
        );
        let content = TestContent::new().with_class(bonus_feat_fighter).with_race(human);

        let character = {
            let mut c = Character::new("Test");
            c.set_race(Some("human".into()));
            for _ in 0..4 {
                c.start_upgrade("fighter").expect("start");
                c.finish_upgrade().expect("finish");
            }
            c
        };
        let rules = CharacterRules::new(&character, &content).expect("rules");
        // level 1: odd (1) + racial (1) + fighter bonus feat 1 (1)
        assert_eq!(rules.feat_slots(0), 3);
        // level 2: even (0) + fighter bonus feat at class level 2 (1)
        assert_eq!(rules.feat_slots(1), 1);
        // level 3: odd only
        assert_eq!(rules.feat_slots(2), 1);
        // level 4: even, no grants
        assert_eq!(rules.feat_slots(3), 0);
    }

    #[test]
    fn upgrade_validation_reports_incomplete_states() {
        let content = base_content();
        let mut character = Character::new("Test");
        character.set_race(Some("human".into()));
        character.start_upgrade("fighter").expect("start");

        let rules = CharacterRules::new(&character, &content).expect("rules");
        let validation = rules.validate_pending().expect("pending");
        assert_eq!(validation.level, 1);
        assert_eq!(validation.feat_slots, 1);
        assert_eq!(validation.feats_filled, 0);
        assert!(!validation.complete);

        if let Some(u) = character.pending_upgrade_mut() {
            u.set_feat_slot(0, Some("dodge".into()));
            u.set_skill_rank("perception", 2);
        }
        let content = content.with_feat(crate::entities::Feat::new("dodge", "Dodge"));
        let rules = CharacterRules::new(&character, &content).expect("rules");
        let validation = rules.validate_pending().expect("pending");
        assert_eq!(validation.feats_filled, 1);
        assert_eq!(validation.skill_points.remaining, 0);
        assert!(validation.complete);
    }

    #[test]
    fn fourth_level_requires_ability_increase() {
        let content = base_content();
        let mut character = leveled("fighter", 3);
        character.start_upgrade("fighter").expect("start");
        if let Some(u) = character.pending_upgrade_mut() {
            u.set_skill_rank("perception", 2);
        }
        let rules = CharacterRules::new(&character, &content).expect("rules");
        let validation = rules.validate_pending().expect("pending");
        assert!(validation.ability_increase_required);
        assert!(!validation.complete);

        if let Some(u) = character.pending_upgrade_mut() {
            u.ability_increase = Some(Ability::Strength);
        }
        let rules = CharacterRules::new(&character, &content).expect("rules");
        let validation = rules.validate_pending().expect("pending");
        assert!(validation.ability_increase_chosen);
        assert!(validation.complete);
    }
}
