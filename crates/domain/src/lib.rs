//! Herosmith domain: the character rules engine.
//!
//! Static rule data (races, classes, feats, spells, gear, skills) plus a
//! character's choices flow through effect resolution into the derived
//! numbers on a sheet: attack options, armor class, saves, skill totals,
//! spell slots. Stacking semantics are explicit - same-typed bonuses
//! compete, dice and ability modifiers add - and every derived stat keeps
//! its full bonus breakdown for display.
//!
//! Derivation is pull-based: build a [`rules::CharacterRules`] view over
//! `(&Character, &dyn RuleContent)` and read; after any mutation, build and
//! read again.

pub mod character;
pub mod effect;
pub mod entities;
pub mod error;
pub mod ids;
pub mod rules;
pub mod value_objects;

pub use character::{
    effect_input_key, Character, Equipment, FavoredClassBonus, HitPointGain, ManualEffect,
    OffHandItem, Spellbook, Tracker, Upgrade,
};
pub use effect::{Effect, EffectKind, GrowthTier, SaveTarget, TrackerMax};
pub use entities::{
    attack_sequence, Armor, ArmorCategory, BabProgression, CastingKind, Class, ClassFeature,
    Feat, Prerequisite, Race, RacialTrait, SaveProgression, SkillDef, Spell, SpellSchool,
    Spellcasting, Weapon, WeaponHandling, WeaponTraining,
};
pub use error::DomainError;
pub use ids::{CharacterId, TrackerId};
pub use rules::{
    AttackOption, CharacterRules, EffectResolver, EffectSource, EffectSourceKind, Proficiencies,
    ResolvedEffect, RuleContent, SkillPoints, SlotUsage, StatValue, UpgradeValidation,
};
pub use value_objects::{
    aggregate, sum_amounts, sum_max_amount, Ability, AbilityScores, AmountFormula, Bonus,
    BonusAmount, BonusType, DamageDice, DiceParseError, FormulaContext, NamedBonus, SizeCategory,
};
