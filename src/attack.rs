//! Attack roll outcome resolution
//!
//! Classifies a d20 attack roll against armor class as miss, hit, or
//! critical hit, and computes the exact probability of each outcome by
//! enumerating the full sample space of the chosen roll policy:
//! - Normal: 20 equally likely rolls
//! - Advantage/disadvantage: all 400 ordered pairs, reduced by max/min
//! - Best-of-three: all 8000 ordered triples, reduced by max

use num_rational::BigRational;
use num_traits::Zero;
use tracing::debug;

use crate::drv::ratio;

/// Result of a single attack roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackOutcome {
    Miss,
    Hit,
    Crit,
}

/// How many d20s are rolled and how they reduce to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollPolicy {
    /// One d20
    #[default]
    Normal,
    /// Two d20s, keep the higher
    Advantage,
    /// Two d20s, keep the lower
    Disadvantage,
    /// Three d20s, keep the highest
    BestOfThree,
}

impl RollPolicy {
    /// Parse from string
    pub fn parse(s: &str) -> Option<RollPolicy> {
        match s.to_lowercase().as_str() {
            "normal" | "straight" | "flat" => Some(RollPolicy::Normal),
            "advantage" | "adv" => Some(RollPolicy::Advantage),
            "disadvantage" | "disadv" | "dis" => Some(RollPolicy::Disadvantage),
            "best-of-three" | "best_of_three" | "best3" => Some(RollPolicy::BestOfThree),
            _ => None,
        }
    }
}

/// Natural rolls that always crit, regardless of armor class
///
/// Stored as the lowest natural roll that crits; the usual variants are
/// 20, 19-20, and 18-20. A natural 1 always misses, so the threshold
/// never reaches below 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CritThreshold {
    min_natural: u8,
}

impl CritThreshold {
    /// Crit on a natural 20 only (the default rule)
    pub fn natural_20() -> Self {
        Self { min_natural: 20 }
    }

    /// Crit on 19-20
    pub fn natural_19() -> Self {
        Self { min_natural: 19 }
    }

    /// Crit on 18-20
    pub fn natural_18() -> Self {
        Self { min_natural: 18 }
    }

    /// Crit on `min_natural` and above; `None` outside 2..=20
    pub fn at_least(min_natural: u8) -> Option<Self> {
        (2..=20).contains(&min_natural).then_some(Self { min_natural })
    }

    /// Lowest natural roll that crits
    pub fn min_natural(&self) -> u8 {
        self.min_natural
    }

    /// Whether the given natural roll crits
    pub fn contains(&self, roll: u8) -> bool {
        roll >= self.min_natural
    }
}

impl Default for CritThreshold {
    fn default() -> Self {
        Self::natural_20()
    }
}

/// Exact probability of each attack outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeProbabilities {
    pub miss: BigRational,
    pub hit: BigRational,
    pub crit: BigRational,
}

impl OutcomeProbabilities {
    /// Probability of one outcome
    pub fn probability(&self, outcome: AttackOutcome) -> &BigRational {
        match outcome {
            AttackOutcome::Miss => &self.miss,
            AttackOutcome::Hit => &self.hit,
            AttackOutcome::Crit => &self.crit,
        }
    }

    /// Sum over all outcomes (exactly 1 for any resolved attack)
    pub fn total(&self) -> BigRational {
        &self.miss + &self.hit + &self.crit
    }
}

/// Classify one reduced natural roll
///
/// Precedence: a natural 1 always misses, then the crit threshold, then
/// the roll-plus-bonus comparison against armor class.
pub fn classify_natural_roll(
    roll: u8,
    armor_class: i64,
    attack_bonus: i64,
    crit_threshold: CritThreshold,
) -> AttackOutcome {
    if roll == 1 {
        return AttackOutcome::Miss;
    }
    if crit_threshold.contains(roll) {
        return AttackOutcome::Crit;
    }
    if i64::from(roll) + attack_bonus >= armor_class {
        AttackOutcome::Hit
    } else {
        AttackOutcome::Miss
    }
}

/// Exact outcome probabilities for an attack under the given roll policy
///
/// Enumerates every equally weighted sample the policy can produce, so
/// the three probabilities sum to exactly 1 by construction.
pub fn resolve_outcomes(
    armor_class: i64,
    attack_bonus: i64,
    policy: RollPolicy,
    crit_threshold: CritThreshold,
) -> OutcomeProbabilities {
    let samples = reduced_rolls(policy);
    let weight = ratio(1, samples.len() as i64);

    let mut miss = BigRational::zero();
    let mut hit = BigRational::zero();
    let mut crit = BigRational::zero();
    for roll in samples {
        match classify_natural_roll(roll, armor_class, attack_bonus, crit_threshold) {
            AttackOutcome::Miss => miss += &weight,
            AttackOutcome::Hit => hit += &weight,
            AttackOutcome::Crit => crit += &weight,
        }
    }

    debug!(
        armor_class,
        attack_bonus,
        ?policy,
        crit_min = crit_threshold.min_natural(),
        %miss,
        %hit,
        %crit,
        "resolved attack outcomes"
    );

    OutcomeProbabilities { miss, hit, crit }
}

/// Every reduced roll the policy can produce, one entry per sample
fn reduced_rolls(policy: RollPolicy) -> Vec<u8> {
    let d20 = 1..=20u8;
    match policy {
        RollPolicy::Normal => d20.collect(),
        RollPolicy::Advantage => d20
            .flat_map(|a| (1..=20u8).map(move |b| a.max(b)))
            .collect(),
        RollPolicy::Disadvantage => d20
            .flat_map(|a| (1..=20u8).map(move |b| a.min(b)))
            .collect(),
        RollPolicy::BestOfThree => d20
            .flat_map(|a| {
                (1..=20u8).flat_map(move |b| (1..=20u8).map(move |c| a.max(b).max(c)))
            })
            .collect(),
    }
}
