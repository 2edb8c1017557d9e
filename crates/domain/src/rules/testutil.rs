//! In-memory rule content for rules-layer tests.

use crate::entities::{Armor, Class, Feat, Race, SkillDef, Spell, Weapon};
use crate::error::DomainError;

use super::content::RuleContent;

/// A tiny hand-assembled content set.
#[derive(Default)]
pub struct TestContent {
    races: Vec<Race>,
    classes: Vec<Class>,
    feats: Vec<Feat>,
    spells: Vec<Spell>,
    weapons: Vec<Weapon>,
    armor: Vec<Armor>,
    skills: Vec<SkillDef>,
}

impl TestContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_race(mut self, race: Race) -> Self {
        self.races.push(race);
        self
    }

    pub fn with_class(mut self, class: Class) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_feat(mut self, feat: Feat) -> Self {
        self.feats.push(feat);
        self
    }

    pub fn with_spell(mut self, spell: Spell) -> Self {
        self.spells.push(spell);
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapons.push(weapon);
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor.push(armor);
        self
    }

    pub fn with_skill(mut self, skill: SkillDef) -> Self {
        self.skills.push(skill);
        self
    }
}

fn find<'a, T>(
    entries: &'a [T],
    id: &str,
    entity_type: &'static str,
    get_id: impl Fn(&T) -> &str,
) -> Result<&'a T, DomainError> {
    entries
        .iter()
        .find(|e| get_id(e) == id)
        .ok_or_else(|| DomainError::not_found(entity_type, id))
}

impl RuleContent for TestContent {
    fn race(&self, id: &str) -> Result<&Race, DomainError> {
        find(&self.races, id, "Race", |r| &r.id)
    }

    fn class(&self, id: &str) -> Result<&Class, DomainError> {
        find(&self.classes, id, "Class", |c| &c.id)
    }

    fn feat(&self, id: &str) -> Result<&Feat, DomainError> {
        find(&self.feats, id, "Feat", |f| &f.id)
    }

    fn spell(&self, id: &str) -> Result<&Spell, DomainError> {
        find(&self.spells, id, "Spell", |s| &s.id)
    }

    fn weapon(&self, id: &str) -> Result<&Weapon, DomainError> {
        find(&self.weapons, id, "Weapon", |w| &w.id)
    }

    fn armor(&self, id: &str) -> Result<&Armor, DomainError> {
        find(&self.armor, id, "Armor", |a| &a.id)
    }

    fn skill(&self, id: &str) -> Result<&SkillDef, DomainError> {
        find(&self.skills, id, "Skill", |s| &s.id)
    }

    fn skills(&self) -> Vec<&SkillDef> {
        self.skills.iter().collect()
    }
}
