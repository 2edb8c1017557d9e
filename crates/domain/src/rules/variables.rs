//! Formula variable tables built from character state.
//!
//! The table is rebuilt from current state before every evaluation; there
//! is no subscription machinery to invalidate. Ability modifiers join the
//! table in a second step because resolving them needs the base table (an
//! ability-bonus effect may itself carry a gate on level or equipment).

use crate::character::Character;
use crate::entities::attack_sequence;
use crate::value_objects::{Ability, FormulaContext};

use super::content::RuleContent;

/// Build the base variable table: level, per-class levels, max BAB,
/// equipped-item identity, grip state, and carry load.
pub fn base_context(character: &Character, content: &dyn RuleContent) -> FormulaContext {
    let mut ctx = FormulaContext::new();
    ctx.set_number("level", character.level() as f64);

    let mut bab = 0;
    for (class_id, class_level) in character.class_levels() {
        let var = format!("{}_level", class_id.replace('-', "_"));
        ctx.set_number(var, class_level as f64);
        if let Ok(class) = content.class(&class_id) {
            bab += class.bab.bab_at(class_level);
        }
    }
    ctx.set_number("bab", bab as f64);
    ctx.set_number(
        "attacks",
        attack_sequence(bab).len() as f64,
    );

    let equipment = character.equipment();
    ctx.set_text("main_hand", equipment.main_hand().unwrap_or(""));
    ctx.set_text(
        "off_hand",
        equipment
            .off_hand()
            .and_then(|o| o.weapon_id().or_else(|| o.shield_id()))
            .unwrap_or(""),
    );
    ctx.set_text("armor", equipment.armor().unwrap_or(""));
    ctx.set_bool("two_handed", equipment.two_handed_grip());
    ctx.set_bool("dual_wielding", equipment.is_dual_wielding());

    ctx.set_number("load", carry_load(character, content));

    ctx
}

/// Add resolved ability modifiers ("str_mod" ... "cha_mod") to a table.
pub fn add_ability_modifiers(ctx: &mut FormulaContext, modifiers: &[(Ability, i32)]) {
    for (ability, modifier) in modifiers {
        ctx.set_number(format!("{}_mod", ability.key()), *modifier as f64);
    }
}

/// Total weight of equipped and carried gear, in pounds. Items the content
/// does not know weigh nothing.
fn carry_load(character: &Character, content: &dyn RuleContent) -> f64 {
    let equipment = character.equipment();
    let mut load = 0u32;

    for weapon_id in equipment
        .main_hand()
        .into_iter()
        .chain(equipment.off_hand().and_then(|o| o.weapon_id()))
    {
        if let Ok(weapon) = content.weapon(weapon_id) {
            load += weapon.weight;
        }
    }
    for armor_id in equipment
        .armor()
        .into_iter()
        .chain(equipment.off_hand().and_then(|o| o.shield_id()))
    {
        if let Ok(armor) = content.armor(armor_id) {
            load += armor.weight;
        }
    }
    for item_id in equipment.carried() {
        if let Ok(weapon) = content.weapon(item_id) {
            load += weapon.weight;
        } else if let Ok(armor) = content.armor(item_id) {
            load += armor.weight;
        }
    }

    load as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BabProgression, Class, Weapon, WeaponHandling, WeaponTraining};
    use crate::rules::testutil::TestContent;
    use crate::value_objects::DamageDice;

    fn content() -> TestContent {
        TestContent::new()
            .with_class(Class::new("fighter", "Fighter", 10, BabProgression::Full))
            .with_weapon(
                Weapon::new(
                    "longsword",
                    "Longsword",
                    WeaponTraining::Martial,
                    WeaponHandling::OneHanded,
                    DamageDice::parse("1d8").expect("damage"),
                )
                .with_weight(4),
            )
    }

    #[test]
    fn base_context_exposes_levels_and_equipment() {
        let content = content();
        let mut character = Character::new("Test");
        for _ in 0..6 {
            character.start_upgrade("fighter").expect("start");
            character.finish_upgrade().expect("finish");
        }
        character.equipment_mut().hold_main_hand("longsword");

        let ctx = base_context(&character, &content);
        assert_eq!(ctx.parse_number("level").expect("level"), 6.0);
        assert_eq!(ctx.parse_number("fighter_level").expect("cl"), 6.0);
        assert_eq!(ctx.parse_number("bab").expect("bab"), 6.0);
        assert_eq!(ctx.parse_number("attacks").expect("attacks"), 2.0);
        assert_eq!(ctx.parse_number("load").expect("load"), 4.0);
        assert!(ctx
            .parse_boolean("main_hand == \"longsword\"")
            .expect("gate"));
        assert!(!ctx.parse_boolean("two_handed").expect("grip"));
    }

    #[test]
    fn ability_modifiers_join_the_table() {
        let content = content();
        let character = Character::new("Test");
        let mut ctx = base_context(&character, &content);
        add_ability_modifiers(&mut ctx, &[(Ability::Strength, 3), (Ability::Dexterity, 1)]);
        assert_eq!(ctx.parse_number("str_mod + dex_mod").expect("mods"), 4.0);
    }
}
