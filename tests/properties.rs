//! Algebraic property tests
//!
//! Randomized checks of the distribution algebra and the outcome
//! resolver: exact normalization by construction, convolution laws,
//! and sum-to-1 across arbitrary attack parameters.

use std::collections::BTreeMap;

use diceodds::{resolve_outcomes, CritThreshold, Drv, RollPolicy};
use num_rational::BigRational;
use num_traits::One;
use proptest::prelude::*;

/// A small random distribution with exact probabilities weight/total
fn arb_drv() -> impl Strategy<Value = Drv> {
    prop::collection::btree_map(-20i64..20, 1i64..10, 1..5).prop_map(|weights| {
        let total: i64 = weights.values().sum();
        let pmf: BTreeMap<i64, BigRational> = weights
            .into_iter()
            .map(|(outcome, w)| (outcome, diceodds::ratio(w, total)))
            .collect();
        Drv::new(pmf).expect("weights normalize exactly")
    })
}

fn arb_policy() -> impl Strategy<Value = RollPolicy> {
    prop_oneof![
        Just(RollPolicy::Normal),
        Just(RollPolicy::Advantage),
        Just(RollPolicy::Disadvantage),
        Just(RollPolicy::BestOfThree),
    ]
}

proptest! {
    #[test]
    fn convolution_is_commutative(a in arb_drv(), b in arb_drv()) {
        prop_assert_eq!(&a + &b, &b + &a);
    }

    #[test]
    fn convolution_is_associative(a in arb_drv(), b in arb_drv(), c in arb_drv()) {
        prop_assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
    }

    #[test]
    fn point_mass_zero_is_identity(a in arb_drv()) {
        prop_assert_eq!(&a + &Drv::point_mass(0), a);
    }

    #[test]
    fn convolution_mass_sums_to_one(a in arb_drv(), b in arb_drv()) {
        let sum = &a + &b;
        let total: BigRational = sum
            .support()
            .into_iter()
            .map(|v| sum.probability(v))
            .sum();
        prop_assert!(total.is_one());
    }

    #[test]
    fn convolution_support_bounds(a in arb_drv(), b in arb_drv()) {
        let sum = &a + &b;
        prop_assert_eq!(sum.min().unwrap(), a.min().unwrap() + b.min().unwrap());
        prop_assert_eq!(sum.max().unwrap(), a.max().unwrap() + b.max().unwrap());
    }

    #[test]
    fn product_mass_sums_to_one(a in arb_drv(), b in arb_drv()) {
        let product = &a * &b;
        let total: BigRational = product
            .support()
            .into_iter()
            .map(|v| product.probability(v))
            .sum();
        prop_assert!(total.is_one());
    }

    #[test]
    fn outcome_probabilities_sum_to_one(
        armor_class in -5i64..40,
        attack_bonus in -10i64..15,
        policy in arb_policy(),
        crit_min in 2u8..=20,
    ) {
        let crit = CritThreshold::at_least(crit_min).unwrap();
        let probs = resolve_outcomes(armor_class, attack_bonus, policy, crit);
        prop_assert!(probs.total().is_one());
    }

    #[test]
    fn mean_is_within_support_bounds(a in arb_drv()) {
        let mean = a.mean();
        let min = BigRational::from_integer(a.min().unwrap().into());
        let max = BigRational::from_integer(a.max().unwrap().into());
        prop_assert!(min <= mean && mean <= max);
    }
}
