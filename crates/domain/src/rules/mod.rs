//! The rules layer: every derived quantity on the character sheet.
//!
//! A [`CharacterRules`] view is constructed over `(&Character, &dyn
//! RuleContent)` per read chain and recomputes from current state; nothing
//! here survives a mutation except the growth cache inside the resolver,
//! which is keyed by immutable template identity. Read again after any
//! mutation and the numbers are current - there is no invalidation step.

mod attack;
mod content;
mod effects;
mod proficiency;
mod spellbook;
mod status;
mod variables;

#[cfg(test)]
pub(crate) mod testutil;

pub use attack::AttackOption;
pub use content::RuleContent;
pub use effects::{EffectResolver, EffectSource, EffectSourceKind, ResolvedEffect};
pub use proficiency::Proficiencies;
pub use spellbook::SlotUsage;
pub use status::{SkillPoints, UpgradeValidation};

use crate::character::{Character, ManualEffect};
use crate::effect::EffectKind;
use crate::entities::Feat;
use crate::error::DomainError;
use crate::value_objects::{
    aggregate, sum_max_amount, Ability, AmountFormula, Bonus, BonusAmount, BonusType,
    FormulaContext, NamedBonus,
};

/// A derived stat: its scalar total and the bonuses that produced it,
/// stacking already applied (ignored losers retained for display).
#[derive(Debug, Clone, PartialEq)]
pub struct StatValue {
    pub total: i32,
    pub bonuses: Vec<NamedBonus>,
}

impl StatValue {
    /// Aggregate a bonus list into a stat value.
    pub fn from_bonuses(bonuses: Vec<NamedBonus>) -> Self {
        let bonuses = aggregate(bonuses);
        let total = sum_max_amount(&bonuses);
        Self { total, bonuses }
    }
}

/// A computation view over a character and its rule content.
///
/// Construction resolves every effect the character holds; derived getters
/// are side-effect-free reads over that snapshot.
pub struct CharacterRules<'a> {
    character: &'a Character,
    content: &'a dyn RuleContent,
    effects: Vec<ResolvedEffect>,
    context: FormulaContext,
    abilities: Vec<(Ability, StatValue)>,
}

impl std::fmt::Debug for CharacterRules<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterRules")
            .field("character", &self.character)
            .field("effects", &self.effects)
            .field("context", &self.context)
            .field("abilities", &self.abilities)
            .finish_non_exhaustive()
    }
}

impl<'a> CharacterRules<'a> {
    /// Build the view. Fails on rule-content integrity errors (unknown race
    /// or feat ids); an unknown class degrades per the effect-resolution
    /// contract.
    pub fn new(character: &'a Character, content: &'a dyn RuleContent) -> Result<Self, DomainError> {
        let resolver = EffectResolver::new(character, content);
        let raw = resolver.all_effects()?;
        let base_ctx = variables::base_context(character, content);

        // Ability totals resolve against the base table so their own gates
        // (level, equipment) work without the modifiers they produce.
        let mut abilities = Vec::with_capacity(6);
        for ability in Ability::ALL {
            let mut list = vec![NamedBonus::scalar(
                "Base score",
                character.base_abilities().get(ability),
                BonusType::Untyped,
            )];
            for effect in &raw {
                if let EffectKind::AbilityBonus {
                    ability: target,
                    bonus,
                } = &effect.kind
                {
                    if *target == ability && effect_active(effect, &base_ctx) {
                        list.push(NamedBonus::new(
                            effect.source.name.clone(),
                            resolve_bonus(bonus, &base_ctx),
                        ));
                    }
                }
            }
            abilities.push((ability, StatValue::from_bonuses(list)));
        }

        let mut context = base_ctx;
        let modifiers: Vec<(Ability, i32)> = abilities
            .iter()
            .map(|(ability, value)| (*ability, Ability::modifier_for(value.total)))
            .collect();
        variables::add_ability_modifiers(&mut context, &modifiers);

        let effects = raw
            .into_iter()
            .filter(|effect| effect_active(effect, &context))
            .collect();

        Ok(Self {
            character,
            content,
            effects,
            context,
            abilities,
        })
    }

    pub fn character(&self) -> &Character {
        self.character
    }

    pub fn content(&self) -> &dyn RuleContent {
        self.content
    }

    /// Every active effect, grown and condition-filtered.
    pub fn effects(&self) -> &[ResolvedEffect] {
        &self.effects
    }

    /// Effects that still need user input.
    pub fn effects_needing_input(&self) -> Vec<&ResolvedEffect> {
        self.effects
            .iter()
            .filter(|e| e.kind.requires_input())
            .collect()
    }

    /// The formula variable table for this view.
    pub fn context(&self) -> &FormulaContext {
        &self.context
    }

    /// Full ability breakdown.
    pub fn ability(&self, ability: Ability) -> &StatValue {
        match self.abilities.iter().find(|(a, _)| *a == ability) {
            Some((_, value)) => value,
            None => unreachable!("all six abilities are always resolved"),
        }
    }

    /// Resolved ability score (base plus race/effect bonuses).
    pub fn ability_score(&self, ability: Ability) -> i32 {
        self.ability(ability).total
    }

    /// Resolved ability modifier.
    pub fn ability_modifier(&self, ability: Ability) -> i32 {
        Ability::modifier_for(self.ability_score(ability))
    }

    /// Resolve a bonus's amount formula against this view's variables.
    pub(crate) fn resolve_bonus(&self, bonus: &Bonus) -> Bonus {
        resolve_bonus(bonus, &self.context)
    }

    /// Validate a user-authored manual effect's formulas, surfacing
    /// [`DomainError::Formula`] instead of silently disabling it.
    pub fn validate_manual_effect(&self, manual: &ManualEffect) -> Result<(), DomainError> {
        if let Some(when) = &manual.effect.when {
            self.context.parse_boolean(when)?;
        }
        for bonus in kind_bonuses(&manual.effect.kind) {
            match &bonus.amount_formula {
                Some(AmountFormula::One(formula)) => {
                    self.context.parse_number(formula)?;
                }
                Some(AmountFormula::PerAttack(formulas)) => {
                    for formula in formulas {
                        self.context.parse_number(formula)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Whether the character satisfies a feat's prerequisites.
    pub fn meets_prerequisites(&self, feat: &Feat) -> bool {
        use crate::entities::Prerequisite;
        feat.prerequisites.iter().all(|prereq| match prereq {
            Prerequisite::MinAbility { ability, value } => self.ability_score(*ability) >= *value,
            Prerequisite::MinBab { value } => self.max_bab() >= *value,
            Prerequisite::MinLevel { level } => self.character.level() >= *level,
            Prerequisite::HasFeat { feat } => self.has_feat(feat),
            Prerequisite::Custom { .. } => true,
        })
    }

    /// Trackers the active effects currently derive, as
    /// `(effect id, name, max)` - formula maxima resolved and floored.
    /// Feed the result to [`Character::sync_effect_trackers`].
    pub fn derived_trackers(&self) -> Vec<(String, String, u32)> {
        self.effects
            .iter()
            .filter_map(|effect| match &effect.kind {
                EffectKind::AddTracker { name, max } => {
                    let max = match max {
                        crate::effect::TrackerMax::Fixed(value) => *value,
                        crate::effect::TrackerMax::Formula(formula) => self
                            .context
                            .parse_number(formula)
                            .map(|v| v.floor().max(0.0) as u32)
                            .unwrap_or(0),
                    };
                    let key = format!("{}:{}", effect.source.id, effect.effect_id);
                    Some((key, name.clone(), max))
                }
                _ => None,
            })
            .collect()
    }

    /// Whether the character holds a feat, chosen or effect-granted.
    pub fn has_feat(&self, feat_id: &str) -> bool {
        self.character
            .all_upgrades()
            .flat_map(|u| u.chosen_feats())
            .any(|id| id == feat_id)
            || self
                .effects
                .iter()
                .any(|e| e.source.kind == EffectSourceKind::Feat && e.source.id == feat_id)
            || self.effects.iter().any(
                |e| matches!(&e.kind, EffectKind::GrantFeat { feat } if feat == feat_id),
            )
    }
}

/// Evaluate an effect's activation condition; an unparseable condition on
/// shipped content deactivates the effect instead of failing the sheet.
fn effect_active(effect: &ResolvedEffect, ctx: &FormulaContext) -> bool {
    match &effect.when {
        None => true,
        Some(when) => ctx.parse_boolean(when).unwrap_or(false),
    }
}

/// Resolve a bonus's amount formula, flooring fractional results. Falls
/// back to the stored amount when the formula does not evaluate.
fn resolve_bonus(bonus: &Bonus, ctx: &FormulaContext) -> Bonus {
    let mut resolved = bonus.clone();
    resolved.ignored = false;
    match &bonus.amount_formula {
        Some(AmountFormula::One(formula)) => {
            if let Ok(value) = ctx.parse_number(formula) {
                resolved.amount = BonusAmount::Scalar(value.floor() as i32);
            }
        }
        Some(AmountFormula::PerAttack(formulas)) => {
            let values: Result<Vec<i32>, DomainError> = formulas
                .iter()
                .map(|f| ctx.parse_number(f).map(|v| v.floor() as i32))
                .collect();
            if let Ok(values) = values {
                resolved.amount = BonusAmount::PerAttack(values);
            }
        }
        None => {}
    }
    resolved
}

/// The bonus payloads carried by an effect kind.
fn kind_bonuses(kind: &EffectKind) -> Vec<&Bonus> {
    match kind {
        EffectKind::AbilityBonus { bonus, .. }
        | EffectKind::SaveBonus { bonus, .. }
        | EffectKind::ArmorClassBonus { bonus }
        | EffectKind::AttackRollBonus { bonus }
        | EffectKind::DamageRollBonus { bonus }
        | EffectKind::SkillBonus { bonus, .. }
        | EffectKind::InitiativeBonus { bonus }
        | EffectKind::HitPointBonus { bonus }
        | EffectKind::SpeedBonus { bonus } => vec![bonus],
        EffectKind::AddAttackOption {
            attack_bonuses,
            damage_bonuses,
            ..
        } => attack_bonuses
            .iter()
            .chain(damage_bonuses.iter())
            .map(|nb| &nb.bonus)
            .collect(),
        _ => Vec::new(),
    }
}
