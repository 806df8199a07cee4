//! Discrete random variables with exact rational probabilities
//!
//! A `Drv` maps integer outcomes to `BigRational` probabilities:
//! - Construction validates sum-to-1 and non-negativity (never renormalizes)
//! - `+` is convolution (sum of independent variables)
//! - `*` is the independent product
//! - Summary statistics stay exact; only `std_dev` leaves the rational domain

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Mul};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use rand::Rng;
use thiserror::Error;

/// Distribution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrvError {
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("distribution has empty support")]
    EmptySupport,
}

/// Build an exact rational from a numerator/denominator pair.
///
/// Convenience for assembling probability maps. Panics if `den` is zero.
pub fn ratio(num: i64, den: i64) -> BigRational {
    BigRational::new(BigInt::from(num), BigInt::from(den))
}

fn big(value: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(value))
}

/// A discrete random variable over integer outcomes
///
/// Immutable once constructed; every combinator returns a new `Drv`.
/// Zero-probability entries are stripped at construction, so equality
/// compares positive-probability support only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drv {
    pmf: BTreeMap<i64, BigRational>,
}

impl Drv {
    /// Create a distribution from an outcome -> probability map
    ///
    /// Fails unless the probabilities sum to exactly 1 and none is negative.
    pub fn new(pmf: BTreeMap<i64, BigRational>) -> Result<Self, DrvError> {
        let mut sum = BigRational::zero();
        for prob in pmf.values() {
            sum += prob;
        }
        if !sum.is_one() {
            return Err(DrvError::InvalidDistribution(format!(
                "probabilities sum to {}, expected exactly 1",
                sum
            )));
        }

        for (outcome, prob) in &pmf {
            if prob.is_negative() {
                return Err(DrvError::InvalidDistribution(format!(
                    "negative probability {} for outcome {}",
                    prob, outcome
                )));
            }
        }

        let pmf = pmf.into_iter().filter(|(_, p)| p.is_positive()).collect();
        Ok(Self { pmf })
    }

    /// The distribution that always produces `outcome`
    ///
    /// `point_mass(0)` is the identity element of convolution.
    pub fn point_mass(outcome: i64) -> Self {
        let mut pmf = BTreeMap::new();
        pmf.insert(outcome, BigRational::one());
        Self { pmf }
    }

    /// A fair die: probability `1/sides` for each face `1..=sides`
    pub fn uniform_die(sides: u32) -> Result<Self, DrvError> {
        if sides == 0 {
            return Err(DrvError::InvalidDistribution(
                "a die must have at least one side".to_string(),
            ));
        }
        let face_prob = ratio(1, i64::from(sides));
        let pmf = (1..=i64::from(sides))
            .map(|face| (face, face_prob.clone()))
            .collect();
        Ok(Self { pmf })
    }

    /// Probability of `outcome`, exact zero if absent
    pub fn probability(&self, outcome: i64) -> BigRational {
        self.pmf
            .get(&outcome)
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    /// Outcomes with strictly positive probability, ascending
    pub fn support(&self) -> Vec<i64> {
        self.pmf.keys().copied().collect()
    }

    /// Smallest outcome in the support
    pub fn min(&self) -> Result<i64, DrvError> {
        self.pmf.keys().next().copied().ok_or(DrvError::EmptySupport)
    }

    /// Largest outcome in the support
    pub fn max(&self) -> Result<i64, DrvError> {
        self.pmf
            .keys()
            .next_back()
            .copied()
            .ok_or(DrvError::EmptySupport)
    }

    /// Expected value, exact
    pub fn mean(&self) -> BigRational {
        let mut mean = BigRational::zero();
        for (outcome, prob) in &self.pmf {
            mean += prob * big(*outcome);
        }
        mean
    }

    /// Variance E[X^2] - E[X]^2, exact
    pub fn variance(&self) -> BigRational {
        let mut second_moment = BigRational::zero();
        for (outcome, prob) in &self.pmf {
            second_moment += prob * big(*outcome) * big(*outcome);
        }
        let mean = self.mean();
        second_moment - &mean * &mean
    }

    /// Standard deviation as a float (the only inexact statistic)
    pub fn std_dev(&self) -> f64 {
        self.variance().to_f64().unwrap_or(f64::NAN).sqrt()
    }

    /// Draw one outcome at random, weighted by probability
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let target: f64 = rng.random();
        let mut cumulative = 0.0;
        let mut last = 0;
        for (outcome, prob) in &self.pmf {
            cumulative += prob.to_f64().unwrap_or(0.0);
            last = *outcome;
            if target < cumulative {
                return *outcome;
            }
        }
        last
    }

    fn convolve(&self, other: &Drv) -> Drv {
        let mut pmf: BTreeMap<i64, BigRational> = BTreeMap::new();
        for (x, px) in &self.pmf {
            for (y, py) in &other.pmf {
                *pmf.entry(x + y).or_insert_with(BigRational::zero) += px * py;
            }
        }
        Drv::new(pmf).expect("convolution of valid distributions sums to 1")
    }

    fn product(&self, other: &Drv) -> Drv {
        let mut pmf: BTreeMap<i64, BigRational> = BTreeMap::new();
        for (x, px) in &self.pmf {
            for (y, py) in &other.pmf {
                *pmf.entry(x * y).or_insert_with(BigRational::zero) += px * py;
            }
        }
        Drv::new(pmf).expect("product of valid distributions sums to 1")
    }
}

impl Add for &Drv {
    type Output = Drv;

    /// Convolution: the distribution of the sum of two independent variables
    fn add(self, other: &Drv) -> Drv {
        self.convolve(other)
    }
}

impl Add for Drv {
    type Output = Drv;

    fn add(self, other: Drv) -> Drv {
        self.convolve(&other)
    }
}

impl Mul for &Drv {
    type Output = Drv;

    /// Distribution of the product of two independent variables
    fn mul(self, other: &Drv) -> Drv {
        self.product(other)
    }
}

impl Mul for Drv {
    type Output = Drv;

    fn mul(self, other: Drv) -> Drv {
        self.product(&other)
    }
}

impl fmt::Display for Drv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (outcome, prob) in &self.pmf {
            let pct = prob.to_f64().unwrap_or(f64::NAN) * 100.0;
            writeln!(f, "{:>3} {:>7.2}%", outcome, pct)?;
        }
        let mean = self.mean();
        let variance = self.variance();
        writeln!(f, "mean: {:.2} ({})", mean.to_f64().unwrap_or(f64::NAN), mean)?;
        writeln!(f, "std_dev: {:.2}", self.std_dev())?;
        write!(
            f,
            "variance: {:.2} ({})",
            variance.to_f64().unwrap_or(f64::NAN),
            variance
        )
    }
}
