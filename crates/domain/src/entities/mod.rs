//! Rule-content entities: read-only template data addressed by stable
//! string ids. Characters reference these by id and never mutate them.

mod class;
mod feat;
mod gear;
mod race;
mod skill;
mod spell;

pub use class::{
    attack_sequence, BabProgression, CastingKind, Class, ClassFeature, SaveProgression,
    Spellcasting,
};
pub use feat::{Feat, Prerequisite};
pub use gear::{Armor, ArmorCategory, Weapon, WeaponHandling, WeaponTraining};
pub use race::{Race, RacialTrait};
pub use skill::SkillDef;
pub use spell::{Spell, SpellSchool};
