//! Named bonuses and tabletop stacking rules
//!
//! A bonus is a magnitude tagged with a "type" that determines whether several
//! bonuses of the same type add together or compete. Non-stacking types keep
//! only the single largest contribution active; the losers are retained with
//! `ignored = true` so the UI can still attribute them.

use serde::{Deserialize, Serialize};

/// Bonus type, determining stacking behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusType {
    Alchemical,
    Armor,
    /// Base attack bonus segments. Stack (one per class).
    Base,
    Circumstance,
    Competence,
    Deflection,
    /// Dice and ability-modifier contributions. Always stack.
    Dice,
    Dodge,
    Enhancement,
    Inherent,
    Insight,
    Luck,
    Morale,
    NaturalArmor,
    Profane,
    Racial,
    Resistance,
    Sacred,
    Shield,
    Size,
    Trait,
    Untyped,
}

impl BonusType {
    /// Whether multiple bonuses of this type add together.
    pub fn stacks(&self) -> bool {
        matches!(
            self,
            BonusType::Base
                | BonusType::Circumstance
                | BonusType::Dice
                | BonusType::Dodge
                | BonusType::Untyped
        )
    }

    /// Whether this bonus type still applies to flat-footed AC.
    pub fn applies_flat_footed(&self) -> bool {
        !matches!(self, BonusType::Dodge)
    }

    /// Whether this bonus type still applies to touch AC.
    pub fn applies_touch(&self) -> bool {
        !matches!(
            self,
            BonusType::Armor | BonusType::Shield | BonusType::NaturalArmor
        )
    }
}

/// A bonus magnitude: a scalar, or one entry per attack in a sequence
/// (e.g. iterative base attack bonuses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BonusAmount {
    Scalar(i32),
    PerAttack(Vec<i32>),
}

impl BonusAmount {
    /// The magnitude used for non-stacking comparison: the scalar itself,
    /// or the greatest element of a per-attack array (0 when empty).
    pub fn magnitude(&self) -> i32 {
        match self {
            BonusAmount::Scalar(value) => *value,
            BonusAmount::PerAttack(values) => values.iter().copied().max().unwrap_or(0),
        }
    }

    /// Number of attack entries (1 for scalars).
    pub fn len(&self) -> usize {
        match self {
            BonusAmount::Scalar(_) => 1,
            BonusAmount::PerAttack(values) => values.len(),
        }
    }

    /// Whether this amount carries no entries at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, BonusAmount::PerAttack(values) if values.is_empty())
    }

    /// Value applied to attack `index` in a sequence. Scalars apply to every
    /// attack; arrays align by index and pad with 0.
    pub fn at(&self, index: usize) -> i32 {
        match self {
            BonusAmount::Scalar(value) => *value,
            BonusAmount::PerAttack(values) => values.get(index).copied().unwrap_or(0),
        }
    }
}

impl From<i32> for BonusAmount {
    fn from(value: i32) -> Self {
        BonusAmount::Scalar(value)
    }
}

impl From<Vec<i32>> for BonusAmount {
    fn from(values: Vec<i32>) -> Self {
        BonusAmount::PerAttack(values)
    }
}

/// A formula-driven amount, resolved against character variables before
/// aggregation: one formula, or one per attack in a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountFormula {
    One(String),
    PerAttack(Vec<String>),
}

/// A single bonus contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bonus {
    pub amount: BonusAmount,
    #[serde(rename = "type")]
    pub kind: BonusType,
    /// Formula(s) resolved into `amount` by the rules layer before
    /// aggregation; retained for display and re-resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_formula: Option<AmountFormula>,
    /// Set by aggregation: true when a same-typed larger bonus supersedes
    /// this one. Ignored bonuses contribute nothing but stay listed.
    #[serde(default)]
    pub ignored: bool,
}

impl Bonus {
    /// Create a new bonus.
    pub fn new(amount: impl Into<BonusAmount>, kind: BonusType) -> Self {
        Self {
            amount: amount.into(),
            kind,
            amount_formula: None,
            ignored: false,
        }
    }

    /// Builder: attach an amount formula.
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.amount_formula = Some(AmountFormula::One(formula.into()));
        self
    }
}

/// A bonus with a display name attributing its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedBonus {
    pub name: String,
    pub bonus: Bonus,
}

impl NamedBonus {
    /// Create a named bonus.
    pub fn new(name: impl Into<String>, bonus: Bonus) -> Self {
        Self {
            name: name.into(),
            bonus,
        }
    }

    /// Shorthand for a named scalar bonus.
    pub fn scalar(name: impl Into<String>, amount: i32, kind: BonusType) -> Self {
        Self::new(name, Bonus::new(amount, kind))
    }
}

/// Apply stacking rules to a list of bonuses.
///
/// Bonuses are partitioned by type. For each non-stacking type exactly one
/// bonus stays active: the one with the greatest magnitude (array amounts
/// compare by their max element); ties keep the first-seen. Stacking types
/// mark every member active. Aggregation is idempotent.
pub fn aggregate(mut bonuses: Vec<NamedBonus>) -> Vec<NamedBonus> {
    let mut seen_types: Vec<BonusType> = Vec::new();

    for i in 0..bonuses.len() {
        let kind = bonuses[i].bonus.kind;
        if seen_types.contains(&kind) {
            continue;
        }
        seen_types.push(kind);

        if kind.stacks() {
            for entry in bonuses.iter_mut().filter(|b| b.bonus.kind == kind) {
                entry.bonus.ignored = false;
            }
            continue;
        }

        // Non-stacking: find the first index holding the greatest magnitude.
        let mut best = i;
        for (j, entry) in bonuses.iter().enumerate().skip(i + 1) {
            if entry.bonus.kind == kind
                && entry.bonus.amount.magnitude() > bonuses[best].bonus.amount.magnitude()
            {
                best = j;
            }
        }
        for (j, entry) in bonuses.iter_mut().enumerate() {
            if entry.bonus.kind == kind {
                entry.bonus.ignored = j != best;
            }
        }
    }

    bonuses
}

/// Sum of active amounts, with per-attack arrays reduced by `max` first.
pub fn sum_max_amount(bonuses: &[NamedBonus]) -> i32 {
    bonuses
        .iter()
        .filter(|b| !b.bonus.ignored)
        .map(|b| b.bonus.amount.magnitude())
        .sum()
}

/// Element-wise sum of active amounts across a multi-attack sequence.
///
/// Scalars apply to every attack; arrays align by index and pad with 0.
/// The result length is the longest active array (1 when all are scalar,
/// empty for an empty input).
pub fn sum_amounts(bonuses: &[NamedBonus]) -> Vec<i32> {
    let active: Vec<&NamedBonus> = bonuses.iter().filter(|b| !b.bonus.ignored).collect();
    if active.is_empty() {
        return Vec::new();
    }
    let len = active
        .iter()
        .map(|b| b.bonus.amount.len())
        .max()
        .unwrap_or(1)
        .max(1);

    (0..len)
        .map(|i| active.iter().map(|b| b.bonus.amount.at(i)).sum())
        .collect()
}
