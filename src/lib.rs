//! diceodds - exact-probability d20 combat calculator
//!
//! Models tabletop attack resolution with exact rational arithmetic:
//! - Discrete random variables with convolution and product algebra
//! - Dice pools and dice notation (e.g. "2d4+3d6+2")
//! - Attack outcome probabilities under normal, advantage, disadvantage,
//!   and best-of-three roll policies
//! - Final damage distributions blending hit, crit, and miss branches
//!
//! No floating point enters the core; only `std_dev` and rendering are
//! inexact.

pub mod attack;
pub mod damage;
pub mod dice;
pub mod drv;

pub use attack::{
    classify_natural_roll, resolve_outcomes, AttackOutcome, CritThreshold, OutcomeProbabilities,
    RollPolicy,
};
pub use damage::{attack_damage, AttackProfile};
pub use dice::{DiceError, DiceFormula, DicePool};
pub use drv::{ratio, Drv, DrvError};
