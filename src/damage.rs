//! Combat damage distributions
//!
//! Composes attack outcome probabilities with damage dice into one final
//! distribution: the hit branch rolls the damage dice, the crit branch
//! rolls the doubled pool, both shifted by the flat modifier, and the
//! miss probability lands on zero damage.

use std::collections::BTreeMap;

use num_rational::BigRational;
use num_traits::Zero;
use tracing::debug;

use crate::attack::{resolve_outcomes, CritThreshold, OutcomeProbabilities, RollPolicy};
use crate::dice::DicePool;
use crate::drv::{Drv, DrvError};

/// One attack, fully parameterized
#[derive(Debug, Clone)]
pub struct AttackProfile {
    /// Target armor class
    pub armor_class: i64,
    /// Bonus added to the d20 roll
    pub attack_bonus: i64,
    /// Damage dice rolled on a hit (doubled on a crit)
    pub damage_dice: DicePool,
    /// Flat damage modifier (not doubled on a crit)
    pub damage_modifier: i64,
    /// Roll policy for the attack roll
    pub policy: RollPolicy,
    /// Natural rolls that crit
    pub crit_threshold: CritThreshold,
}

impl AttackProfile {
    /// Exact miss/hit/crit probabilities for this attack
    pub fn outcome_probabilities(&self) -> OutcomeProbabilities {
        resolve_outcomes(
            self.armor_class,
            self.attack_bonus,
            self.policy,
            self.crit_threshold,
        )
    }

    /// Final damage distribution for this attack
    pub fn damage_distribution(&self) -> Result<Drv, DrvError> {
        attack_damage(
            self.armor_class,
            self.attack_bonus,
            &self.damage_dice,
            self.damage_modifier,
            self.policy,
            self.crit_threshold,
        )
    }
}

/// Damage distribution of a single attack
///
/// Blends the hit and crit damage sub-distributions, weighted by their
/// outcome probabilities, and places the miss probability at zero damage.
/// The miss assignment overwrites any hit/crit mass already at zero (a
/// modifier can pull minimum damage down to zero); when that drops
/// probability mass, the final validation fails and the error is
/// returned to the caller.
pub fn attack_damage(
    armor_class: i64,
    attack_bonus: i64,
    damage_dice: &DicePool,
    damage_modifier: i64,
    policy: RollPolicy,
    crit_threshold: CritThreshold,
) -> Result<Drv, DrvError> {
    let outcomes = resolve_outcomes(armor_class, attack_bonus, policy, crit_threshold);

    let hit = shift_outcomes(
        scale_probabilities(&damage_dice.to_drv(), &outcomes.hit),
        damage_modifier,
    );
    let crit = shift_outcomes(
        scale_probabilities(&damage_dice.double().to_drv(), &outcomes.crit),
        damage_modifier,
    );

    let mut combined = piecewise_sum(hit, crit);
    combined.insert(0, outcomes.miss.clone());

    debug!(
        armor_class,
        attack_bonus,
        %damage_dice,
        damage_modifier,
        ?policy,
        "composed attack damage distribution"
    );

    Drv::new(combined)
}

/// Multiply every probability by `k` (yields a sub-distribution)
fn scale_probabilities(drv: &Drv, k: &BigRational) -> BTreeMap<i64, BigRational> {
    drv.support()
        .into_iter()
        .map(|outcome| (outcome, drv.probability(outcome) * k))
        .collect()
}

/// Add `delta` to every outcome, probabilities unchanged
fn shift_outcomes(
    pmf: BTreeMap<i64, BigRational>,
    delta: i64,
) -> BTreeMap<i64, BigRational> {
    pmf.into_iter()
        .map(|(outcome, prob)| (outcome + delta, prob))
        .collect()
}

/// Pointwise sum over the union of outcome keys
fn piecewise_sum(
    a: BTreeMap<i64, BigRational>,
    b: BTreeMap<i64, BigRational>,
) -> BTreeMap<i64, BigRational> {
    let mut sum = a;
    for (outcome, prob) in b {
        *sum.entry(outcome).or_insert_with(BigRational::zero) += prob;
    }
    sum
}
