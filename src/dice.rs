//! Dice pools and dice notation
//!
//! A `DicePool` is a multiset of die sizes, e.g. `{4: 2, 6: 3}` for
//! "2d4 + 3d6". Counts are signed so pools can be subtracted; only
//! positive counts contribute dice when building a distribution.
//! `DiceFormula` parses notation like "2d4+3d6+2".

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::drv::Drv;

/// Dice construction and parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("empty dice formula")]
    Empty,

    #[error("invalid dice format: {0}")]
    InvalidFormat(String),

    #[error("dice count must be at least 1")]
    InvalidDiceCount,

    #[error("a die must have at least one side")]
    ZeroSidedDie,
}

/// A multiset of dice: die size -> signed count
///
/// Carries no probability data; `to_drv` builds the sum distribution by
/// convolving one uniform die per count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DicePool {
    dice: BTreeMap<u32, i32>,
}

impl DicePool {
    /// An empty pool (its distribution is the point mass at 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pool from (sides, count) pairs
    ///
    /// Duplicate sizes are summed; zero-sided dice are rejected.
    pub fn from_counts<I>(counts: I) -> Result<Self, DiceError>
    where
        I: IntoIterator<Item = (u32, i32)>,
    {
        let mut dice: BTreeMap<u32, i32> = BTreeMap::new();
        for (sides, count) in counts {
            if sides == 0 {
                return Err(DiceError::ZeroSidedDie);
            }
            *dice.entry(sides).or_insert(0) += count;
        }
        Ok(Self {
            dice: normalized(dice),
        })
    }

    /// Signed count of dice with the given number of sides
    pub fn count(&self, sides: u32) -> i32 {
        self.dice.get(&sides).copied().unwrap_or(0)
    }

    /// Iterate (sides, count) pairs in ascending die size
    pub fn counts(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.dice.iter().map(|(&sides, &count)| (sides, count))
    }

    /// True if the pool holds no dice
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// Merge two pools by summing per-size counts
    ///
    /// Negative counts subtract; sizes that cancel to zero disappear.
    pub fn add(&self, other: &DicePool) -> DicePool {
        let mut dice = self.dice.clone();
        for (&sides, &count) in &other.dice {
            *dice.entry(sides).or_insert(0) += count;
        }
        DicePool {
            dice: normalized(dice),
        }
    }

    /// Double the COUNT of every die size (roll twice as many dice)
    ///
    /// This is the critical-hit rule: extra dice, never doubled outcomes.
    pub fn double(&self) -> DicePool {
        DicePool {
            dice: self.dice.iter().map(|(&s, &c)| (s, 2 * c)).collect(),
        }
    }

    /// Distribution of the summed roll
    ///
    /// Starts from the point mass at 0 and convolves in one uniform die
    /// per count. Non-positive counts contribute no dice.
    pub fn to_drv(&self) -> Drv {
        let mut result = Drv::point_mass(0);
        for (&sides, &count) in &self.dice {
            let die = Drv::uniform_die(sides).expect("pool die sizes are validated positive");
            for _ in 0..count.max(0) {
                result = &result + &die;
            }
        }
        result
    }
}

fn normalized(dice: BTreeMap<u32, i32>) -> BTreeMap<u32, i32> {
    dice.into_iter().filter(|&(_, count)| count != 0).collect()
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dice.is_empty() {
            return write!(f, "0");
        }
        for (i, (&sides, &count)) in self.dice.iter().enumerate() {
            if i == 0 {
                write!(f, "{}d{}", count, sides)?;
            } else if count < 0 {
                write!(f, "-{}d{}", -count, sides)?;
            } else {
                write!(f, "+{}d{}", count, sides)?;
            }
        }
        Ok(())
    }
}

/// A parsed dice formula: a pool plus a flat modifier
///
/// E.g. "2d6+3" or "2d4+3d6-1". "dY" is shorthand for "1dY".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceFormula {
    pool: DicePool,
    modifier: i64,
}

impl DiceFormula {
    /// Assemble a formula from parts
    pub fn new(pool: DicePool, modifier: i64) -> Self {
        Self { pool, modifier }
    }

    /// The dice portion of the formula
    pub fn pool(&self) -> &DicePool {
        &self.pool
    }

    /// The flat modifier
    pub fn modifier(&self) -> i64 {
        self.modifier
    }

    /// Distribution of the full formula (dice sum plus modifier)
    pub fn to_drv(&self) -> Drv {
        &self.pool.to_drv() + &Drv::point_mass(self.modifier)
    }

    /// Parse notation like "2d6+3", "d20", "2d4+3d6-1"
    ///
    /// Case-insensitive and whitespace-tolerant.
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let cleaned: String = input.split_whitespace().collect();
        let lower = cleaned.to_lowercase();
        if lower.is_empty() {
            return Err(DiceError::Empty);
        }

        let mut dice: BTreeMap<u32, i32> = BTreeMap::new();
        let mut modifier: i64 = 0;

        let mut rest = lower.as_str();
        let mut sign: i64 = 1;
        if let Some(stripped) = rest.strip_prefix('-') {
            sign = -1;
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix('+') {
            rest = stripped;
        }

        loop {
            let end = rest.find(['+', '-']).unwrap_or(rest.len());
            let term = &rest[..end];
            if term.is_empty() {
                return Err(DiceError::InvalidFormat(format!(
                    "empty term in '{}'",
                    input.trim()
                )));
            }

            if let Some(d_pos) = term.find('d') {
                let count_str = &term[..d_pos];
                let count: i32 = if count_str.is_empty() {
                    1 // "d20" means "1d20"
                } else {
                    count_str.parse().map_err(|_| {
                        DiceError::InvalidFormat(format!("invalid dice count '{}'", count_str))
                    })?
                };
                if count == 0 {
                    return Err(DiceError::InvalidDiceCount);
                }

                let sides_str = &term[d_pos + 1..];
                let sides: u32 = sides_str.parse().map_err(|_| {
                    DiceError::InvalidFormat(format!("invalid die size '{}'", sides_str))
                })?;
                if sides == 0 {
                    return Err(DiceError::ZeroSidedDie);
                }

                *dice.entry(sides).or_insert(0) += sign as i32 * count;
            } else {
                let value: i64 = term.parse().map_err(|_| {
                    DiceError::InvalidFormat(format!("invalid modifier '{}'", term))
                })?;
                modifier += sign * value;
            }

            if end == rest.len() {
                break;
            }
            sign = if rest.as_bytes()[end] == b'-' { -1 } else { 1 };
            rest = &rest[end + 1..];
        }

        Ok(Self {
            pool: DicePool {
                dice: normalized(dice),
            },
            modifier,
        })
    }
}

impl FromStr for DiceFormula {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceFormula::parse(s)
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pool.is_empty() {
            return write!(f, "{}", self.modifier);
        }
        write!(f, "{}", self.pool)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drv::ratio;

    fn pool(counts: &[(u32, i32)]) -> DicePool {
        DicePool::from_counts(counts.iter().copied()).unwrap()
    }

    #[test]
    fn test_add_merges_counts() {
        let merged = pool(&[(4, 2), (6, 3)]).add(&pool(&[(6, 1)]));
        assert_eq!(merged, pool(&[(4, 2), (6, 4)]));
    }

    #[test]
    fn test_add_commutative() {
        let a = pool(&[(4, 2), (6, 3)]);
        let b = pool(&[(6, 1), (8, 2)]);
        assert_eq!(a.add(&b), b.add(&a));
    }

    #[test]
    fn test_add_negative_counts_subtract() {
        let reduced = pool(&[(6, 3)]).add(&pool(&[(6, -1)]));
        assert_eq!(reduced, pool(&[(6, 2)]));
    }

    #[test]
    fn test_add_cancelling_counts_vanish() {
        let cancelled = pool(&[(6, 2)]).add(&pool(&[(6, -2)]));
        assert_eq!(cancelled, DicePool::new());
        assert!(cancelled.is_empty());
    }

    #[test]
    fn test_double_doubles_counts_not_values() {
        let doubled = pool(&[(12, 1), (6, 3)]).double();
        assert_eq!(doubled, pool(&[(12, 2), (6, 6)]));
        // the doubled pool still rolls d12 faces, just twice as many dice
        assert_eq!(doubled.to_drv().max().unwrap(), 2 * 12 + 6 * 6);
        assert_eq!(doubled.to_drv().min().unwrap(), 8);
    }

    #[test]
    fn test_from_counts_rejects_zero_sides() {
        assert_eq!(
            DicePool::from_counts([(0, 1)]),
            Err(DiceError::ZeroSidedDie)
        );
    }

    #[test]
    fn test_from_counts_merges_duplicates() {
        let merged = DicePool::from_counts([(6, 1), (6, 2)]).unwrap();
        assert_eq!(merged.count(6), 3);
    }

    #[test]
    fn test_to_drv_single_die_is_uniform() {
        assert_eq!(pool(&[(6, 1)]).to_drv(), Drv::uniform_die(6).unwrap());
    }

    #[test]
    fn test_to_drv_two_d6() {
        let two_d6 = pool(&[(6, 2)]).to_drv();
        assert_eq!(two_d6.probability(7), ratio(1, 6));
        assert_eq!(two_d6.probability(2), ratio(1, 36));
    }

    #[test]
    fn test_to_drv_empty_pool_is_point_mass() {
        assert_eq!(DicePool::new().to_drv(), Drv::point_mass(0));
    }

    #[test]
    fn test_to_drv_ignores_negative_counts() {
        assert_eq!(pool(&[(6, -2)]).to_drv(), Drv::point_mass(0));
    }

    #[test]
    fn test_parse_basic() {
        let formula: DiceFormula = "2d6+3".parse().unwrap();
        assert_eq!(formula.pool(), &pool(&[(6, 2)]));
        assert_eq!(formula.modifier(), 3);
    }

    #[test]
    fn test_parse_implicit_one() {
        let formula: DiceFormula = "d20".parse().unwrap();
        assert_eq!(formula.pool(), &pool(&[(20, 1)]));
        assert_eq!(formula.modifier(), 0);
    }

    #[test]
    fn test_parse_multi_term() {
        let formula: DiceFormula = "2d4+3d6+2".parse().unwrap();
        assert_eq!(formula.pool(), &pool(&[(4, 2), (6, 3)]));
        assert_eq!(formula.modifier(), 2);
    }

    #[test]
    fn test_parse_negative_modifier() {
        let formula: DiceFormula = "2d6-1".parse().unwrap();
        assert_eq!(formula.modifier(), -1);
    }

    #[test]
    fn test_parse_subtracted_dice() {
        let formula: DiceFormula = "3d6-1d6".parse().unwrap();
        assert_eq!(formula.pool(), &pool(&[(6, 2)]));
    }

    #[test]
    fn test_parse_whitespace_and_case() {
        let formula: DiceFormula = "  2D6 + 3  ".parse().unwrap();
        assert_eq!(formula.pool(), &pool(&[(6, 2)]));
        assert_eq!(formula.modifier(), 3);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(DiceFormula::parse(""), Err(DiceError::Empty));
        assert_eq!(DiceFormula::parse("0d6"), Err(DiceError::InvalidDiceCount));
        assert_eq!(DiceFormula::parse("2d0"), Err(DiceError::ZeroSidedDie));
        assert!(matches!(
            DiceFormula::parse("abc"),
            Err(DiceError::InvalidFormat(_))
        ));
        assert!(matches!(
            DiceFormula::parse("2d"),
            Err(DiceError::InvalidFormat(_))
        ));
        assert!(matches!(
            DiceFormula::parse("2d6+"),
            Err(DiceError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_formula_to_drv_applies_modifier() {
        let formula: DiceFormula = "1d4+2".parse().unwrap();
        let drv = formula.to_drv();
        assert_eq!(drv.support(), vec![3, 4, 5, 6]);
        assert_eq!(drv.probability(3), ratio(1, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(pool(&[(4, 2), (6, 3)]).to_string(), "2d4+3d6");
        assert_eq!(
            DiceFormula::parse("2d6+3").unwrap().to_string(),
            "2d6+3"
        );
        assert_eq!(
            DiceFormula::parse("2d6-1").unwrap().to_string(),
            "2d6-1"
        );
    }
}
