//! Attack option derivation.
//!
//! One option per held weapon (main hand, off hand) plus one per
//! attack-granting effect. Missing inputs never error here: an incomplete
//! build is a valid transient state and simply contributes no bonus.

use crate::effect::EffectKind;
use crate::entities::Weapon;
use crate::value_objects::{
    sum_amounts, sum_max_amount, Ability, AmountFormula, Bonus, BonusAmount, BonusType,
    DamageDice, NamedBonus,
};

use super::{CharacterRules, ResolvedEffect, StatValue};

/// A fully-resolved combat action.
#[derive(Debug, Clone, PartialEq)]
pub struct AttackOption {
    pub name: String,
    /// Ability used for to-hit
    pub ability: Ability,
    /// Base damage dice, sized for the wielder
    pub damage: Option<DamageDice>,
    pub crit_range: u8,
    pub crit_multiplier: u8,
    /// Attack bonus breakdown, stacking applied
    pub attack_bonuses: Vec<NamedBonus>,
    /// Damage bonus breakdown, stacking applied
    pub damage_bonuses: Vec<NamedBonus>,
    /// Final to-hit modifier per attack in the iterative sequence
    pub attack_totals: Vec<i32>,
    /// Final flat damage modifier
    pub damage_total: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hand {
    Main,
    Off,
}

// Two-weapon fighting penalties (main, off) by (feat, light off-hand).
fn twf_penalty(feat: bool, light_off_hand: bool) -> (i32, i32) {
    match (feat, light_off_hand) {
        (false, false) => (-6, -10),
        (true, false) => (-2, -6),
        (false, true) => (-4, -4),
        (true, true) => (-2, -2),
    }
}

impl CharacterRules<'_> {
    /// Every attack option the character currently has.
    pub fn attack_options(&self) -> Vec<AttackOption> {
        let mut options = Vec::new();
        let equipment = self.character().equipment();

        if let Some(weapon) = equipment
            .main_hand()
            .and_then(|id| self.content().weapon(id).ok())
        {
            options.push(self.weapon_option(weapon, Hand::Main));
        }
        if let Some(weapon) = equipment
            .off_hand()
            .and_then(|o| o.weapon_id())
            .and_then(|id| self.content().weapon(id).ok())
        {
            options.push(self.weapon_option(weapon, Hand::Off));
        }

        for effect in self.effects() {
            if let EffectKind::AddAttackOption { .. } = &effect.kind {
                options.push(self.effect_option(effect));
            }
        }

        options
    }

    /// Ability used for melee to-hit: STR unless overridden by an effect.
    fn melee_ability(&self) -> Ability {
        self.effects()
            .iter()
            .find_map(|e| match &e.kind {
                EffectKind::MeleeAbilityOverride { ability } => Some(*ability),
                _ => None,
            })
            .unwrap_or(Ability::Strength)
    }

    /// Two-weapon penalties for the current equipment state, unless waived.
    fn twf_penalties(&self) -> Option<(i32, i32)> {
        let equipment = self.character().equipment();
        if !equipment.is_dual_wielding() {
            return None;
        }
        if self
            .effects()
            .iter()
            .any(|e| matches!(e.kind, EffectKind::IgnoreTwoWeaponPenalty))
        {
            return None;
        }
        let feat = self
            .effects()
            .iter()
            .any(|e| matches!(e.kind, EffectKind::ReduceTwoWeaponPenalty));
        let light = equipment
            .off_hand()
            .and_then(|o| o.weapon_id())
            .and_then(|id| self.content().weapon(id).ok())
            .map(|w| w.is_light())
            .unwrap_or(false);
        Some(twf_penalty(feat, light))
    }

    fn weapon_option(&self, weapon: &Weapon, hand: Hand) -> AttackOption {
        let equipment = self.character().equipment();
        let proficiencies = self.proficiencies();
        let ability = if weapon.is_ranged() {
            Ability::Dexterity
        } else {
            self.melee_ability()
        };
        let two_handed =
            hand == Hand::Main && equipment.two_handed_grip() && !weapon.is_ranged();

        // --- attack bonuses ---
        let mut attack = vec![
            NamedBonus::new(
                "Base attack",
                Bonus::new(self.base_attack_bonuses(), BonusType::Base),
            ),
            NamedBonus::scalar(
                format!("{} modifier", ability),
                self.ability_modifier(ability),
                BonusType::Dice,
            ),
        ];
        let size = self.race_size().attack_and_ac_modifier();
        if size != 0 {
            attack.push(NamedBonus::scalar("Size", size, BonusType::Size));
        }
        if let Some(rank) = self.weapon_group_rank(weapon) {
            attack.push(NamedBonus::scalar("Weapon training", rank, BonusType::Untyped));
        }
        if weapon.attack_quality_bonus() != 0 {
            attack.push(NamedBonus::scalar(
                "Weapon quality",
                weapon.attack_quality_bonus(),
                BonusType::Enhancement,
            ));
        }
        if !proficiencies.has_weapon(weapon) {
            attack.push(NamedBonus::scalar("Non-proficient", -4, BonusType::Untyped));
        }
        if let Some((main_penalty, off_penalty)) = self.twf_penalties() {
            let penalty = match hand {
                Hand::Main => main_penalty,
                Hand::Off => off_penalty,
            };
            attack.push(NamedBonus::scalar(
                "Two-weapon fighting",
                penalty,
                BonusType::Untyped,
            ));
        }
        // An unfamiliar shield on the off arm drags the weapon arm; counted
        // once, on the main-hand option.
        if hand == Hand::Main {
            if let Some(shield) = equipment
                .off_hand()
                .and_then(|o| o.shield_id())
                .and_then(|id| self.content().armor(id).ok())
            {
                if !proficiencies.has_shield(shield) && shield.check_penalty != 0 {
                    attack.push(NamedBonus::scalar(
                        "Shield non-proficiency",
                        shield.check_penalty,
                        BonusType::Untyped,
                    ));
                }
            }
        }
        for effect in self.effects() {
            if let EffectKind::AttackRollBonus { bonus } = &effect.kind {
                attack.push(NamedBonus::new(
                    effect.source.name.clone(),
                    self.resolve_bonus(bonus),
                ));
            }
        }

        // --- damage bonuses ---
        let mut damage = Vec::new();
        if !weapon.is_ranged() {
            let strength = self.ability_modifier(Ability::Strength);
            let multiplier = match hand {
                Hand::Off => 0.5,
                Hand::Main if two_handed => 1.5,
                Hand::Main => 1.0,
            };
            let amount = (strength as f64 * multiplier).floor() as i32;
            if amount != 0 {
                damage.push(NamedBonus::scalar(
                    "STR modifier",
                    amount,
                    BonusType::Dice,
                ));
            }
        }
        if weapon.damage_quality_bonus() != 0 {
            damage.push(NamedBonus::scalar(
                "Weapon quality",
                weapon.damage_quality_bonus(),
                BonusType::Enhancement,
            ));
        }
        for effect in self.effects() {
            if let EffectKind::DamageRollBonus { bonus } = &effect.kind {
                damage.push(NamedBonus::new(
                    effect.source.name.clone(),
                    self.resolve_bonus(bonus),
                ));
            }
        }

        self.finish_option(
            weapon.name.clone(),
            ability,
            Some(weapon.damage.scaled_for_size(self.race_size())),
            weapon.crit_range,
            weapon.crit_multiplier,
            attack,
            damage,
        )
    }

    fn effect_option(&self, effect: &ResolvedEffect) -> AttackOption {
        let EffectKind::AddAttackOption {
            name,
            ability,
            damage,
            crit_range,
            crit_multiplier,
            attack_bonuses,
            damage_bonuses,
            ability_multiplier,
        } = &effect.kind
        else {
            return self.finish_option(
                effect.source.name.clone(),
                Ability::Strength,
                None,
                20,
                2,
                Vec::new(),
                Vec::new(),
            );
        };

        let ability = ability.unwrap_or(Ability::Strength);
        let two_handed = self.character().equipment().two_handed_grip();
        let multiplier = ability_multiplier.unwrap_or(if two_handed && ability == Ability::Strength
        {
            1.5
        } else {
            1.0
        });

        let mut attack = vec![
            NamedBonus::new(
                "Base attack",
                Bonus::new(self.base_attack_bonuses(), BonusType::Base),
            ),
            NamedBonus::scalar(
                format!("{} modifier", ability),
                self.ability_modifier(ability),
                BonusType::Dice,
            ),
        ];
        let size = self.race_size().attack_and_ac_modifier();
        if size != 0 {
            attack.push(NamedBonus::scalar("Size", size, BonusType::Size));
        }
        for named in attack_bonuses {
            attack.push(NamedBonus::new(
                named.name.clone(),
                self.resolve_bonus(&named.bonus),
            ));
        }

        let mut damage_list = Vec::new();
        let ability_amount =
            (self.ability_modifier(ability) as f64 * multiplier).floor() as i32;
        if ability_amount != 0 {
            damage_list.push(NamedBonus::scalar(
                format!("{} modifier", ability),
                ability_amount,
                BonusType::Dice,
            ));
        }
        for named in damage_bonuses {
            let mut resolved = self.resolve_bonus(&named.bonus);
            // Formula bonuses riding on the multiplied ability scale with it.
            if multiplier != 1.0 && formula_targets_ability(&named.bonus, ability) {
                if let BonusAmount::Scalar(value) = resolved.amount {
                    resolved.amount =
                        BonusAmount::Scalar((value as f64 * multiplier).floor() as i32);
                }
            }
            damage_list.push(NamedBonus::new(named.name.clone(), resolved));
        }

        self.finish_option(
            name.clone(),
            ability,
            damage.as_deref().and_then(|d| DamageDice::parse(d).ok()),
            *crit_range,
            *crit_multiplier,
            attack,
            damage_list,
        )
    }

    /// Highest-ranked weapon-group training bonus matching the weapon.
    fn weapon_group_rank(&self, weapon: &Weapon) -> Option<i32> {
        let group = weapon.group.as_deref()?;
        self.effects()
            .iter()
            .filter_map(|e| match &e.kind {
                EffectKind::WeaponGroupTraining { groups } => groups.get(group).copied(),
                _ => None,
            })
            .max()
    }

    fn finish_option(
        &self,
        name: String,
        ability: Ability,
        damage: Option<DamageDice>,
        crit_range: u8,
        crit_multiplier: u8,
        attack: Vec<NamedBonus>,
        damage_bonuses: Vec<NamedBonus>,
    ) -> AttackOption {
        let attack_value = StatValue::from_bonuses(attack);
        let attack_totals = sum_amounts(&attack_value.bonuses);
        let damage_value = StatValue::from_bonuses(damage_bonuses);
        let damage_total = sum_max_amount(&damage_value.bonuses);
        AttackOption {
            name,
            ability,
            damage,
            crit_range,
            crit_multiplier,
            attack_bonuses: attack_value.bonuses,
            damage_bonuses: damage_value.bonuses,
            attack_totals,
            damage_total,
        }
    }
}

/// Whether a bonus's formula reads the given ability's modifier variable.
fn formula_targets_ability(bonus: &Bonus, ability: Ability) -> bool {
    let var = format!("{}_mod", ability.key());
    match &bonus.amount_formula {
        Some(AmountFormula::One(formula)) => formula.contains(&var),
        Some(AmountFormula::PerAttack(formulas)) => formulas.iter().any(|f| f.contains(&var)),
        None => false,
    }
}
