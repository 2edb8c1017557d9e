//! Effect resolution: collect and grow every effect a character holds.
//!
//! Effects come from four source kinds: racial traits, class features,
//! feats (slot-chosen or effect-granted), and user-authored manual effects.
//! Growth tables resolve against the source's contextual level - character
//! level for traits, feats, and manual effects; level-in-that-class for
//! class features. Grown payloads are cached under the deterministic key
//! `(source id : effect id, tier index)`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::character::Character;
use crate::effect::{Effect, EffectKind};
use crate::error::DomainError;

use super::content::RuleContent;

/// What kind of source declared an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSourceKind {
    RacialTrait,
    ClassFeature,
    Feat,
    Manual,
}

impl EffectSourceKind {
    /// Stable string used in effect-input keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectSourceKind::RacialTrait => "racial_trait",
            EffectSourceKind::ClassFeature => "class_feature",
            EffectSourceKind::Feat => "feat",
            EffectSourceKind::Manual => "manual",
        }
    }
}

/// The source an effect was collected from.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSource {
    pub kind: EffectSourceKind,
    pub id: String,
    pub name: String,
}

/// An effect with its growth resolved for the current character state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEffect {
    /// The grown payload
    pub kind: EffectKind,
    /// Identifier of the declaring effect, stable within its source
    pub effect_id: String,
    /// Activation condition copied from the declaration
    pub when: Option<String>,
    pub source: EffectSource,
    /// Which growth tier produced the payload, if any
    pub grown_tier: Option<usize>,
}

impl ResolvedEffect {
    /// Key under which this effect's input values are stored on upgrades.
    pub fn input_key(&self, suffix: &str) -> String {
        crate::character::effect_input_key(self.source.kind.as_str(), &self.source.id, suffix)
    }
}

/// Walks a character's sources and collects their effects.
pub struct EffectResolver<'a> {
    character: &'a Character,
    content: &'a dyn RuleContent,
    growth_cache: RefCell<HashMap<(String, usize), EffectKind>>,
}

impl<'a> EffectResolver<'a> {
    pub fn new(character: &'a Character, content: &'a dyn RuleContent) -> Self {
        Self {
            character,
            content,
            growth_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Every effect declared by every currently-held source, grown to the
    /// source's contextual level.
    ///
    /// Race and feat lookups propagate [`DomainError::NotFound`]; a class
    /// that cannot be found degrades to no features rather than failing,
    /// so a transiently-broken multiclass build keeps rendering.
    pub fn all_effects(&self) -> Result<Vec<ResolvedEffect>, DomainError> {
        let mut resolved = Vec::new();
        let character_level = self.character.level();

        if let Some(race_id) = self.character.race_id() {
            let race = self.content.race(race_id)?;
            for racial_trait in &race.traits {
                let source = EffectSource {
                    kind: EffectSourceKind::RacialTrait,
                    id: racial_trait.id.clone(),
                    name: racial_trait.name.clone(),
                };
                for effect in &racial_trait.effects {
                    resolved.push(self.grow(effect, character_level, &source));
                }
            }
        }

        for (class_id, class_level) in self.character.class_levels() {
            let Ok(class) = self.content.class(&class_id) else {
                continue; // degrade: unknown class contributes no features
            };
            for feature in class.features_at(class_level) {
                let source = EffectSource {
                    kind: EffectSourceKind::ClassFeature,
                    id: feature.id.clone(),
                    name: feature.name.clone(),
                };
                for effect in &feature.effects {
                    resolved.push(self.grow(effect, class_level, &source));
                }
            }
        }

        // Feats chosen in upgrade slots, then feats granted by effects
        // already collected (race and class sources only - granted feats do
        // not themselves grant feats).
        let mut feat_ids: Vec<String> = self
            .character
            .all_upgrades()
            .flat_map(|u| u.chosen_feats().map(str::to_string))
            .collect();
        for effect in &resolved {
            if let EffectKind::GrantFeat { feat } = &effect.kind {
                feat_ids.push(feat.clone());
            }
        }
        for feat_id in feat_ids {
            let feat = self.content.feat(&feat_id)?;
            let source = EffectSource {
                kind: EffectSourceKind::Feat,
                id: feat.id.clone(),
                name: feat.name.clone(),
            };
            for effect in &feat.effects {
                resolved.push(self.grow(effect, character_level, &source));
            }
        }

        for manual in self.character.manual_effects() {
            if !manual.enabled {
                continue;
            }
            let source = EffectSource {
                kind: EffectSourceKind::Manual,
                id: manual.effect.id.clone(),
                name: manual.name.clone(),
            };
            resolved.push(self.grow(&manual.effect, character_level, &source));
        }

        Ok(resolved)
    }

    /// Resolve growth through the identity-keyed cache.
    fn grow(&self, effect: &Effect, contextual_level: u8, source: &EffectSource) -> ResolvedEffect {
        let (tier, kind) = effect.resolve_growth(contextual_level);
        let kind = match tier {
            Some(index) => {
                let key = (format!("{}:{}", source.id, effect.id), index);
                self.growth_cache
                    .borrow_mut()
                    .entry(key)
                    .or_insert_with(|| kind.clone())
                    .clone()
            }
            None => kind.clone(),
        };
        ResolvedEffect {
            kind,
            effect_id: effect.id.clone(),
            when: effect.when.clone(),
            source: source.clone(),
            grown_tier: tier,
        }
    }
}
