//! diceodds - exact-probability d20 combat calculator CLI

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use diceodds::{AttackProfile, CritThreshold, DiceFormula, RollPolicy};

/// Print exact miss/hit/crit odds and the damage distribution for an attack
#[derive(Parser, Debug)]
#[command(
    name = "diceodds",
    version,
    about = "Exact-probability d20 attack calculator"
)]
struct Args {
    /// Target armor class
    #[arg(short, long, default_value_t = 15)]
    armor_class: i64,

    /// Bonus added to the d20 attack roll
    #[arg(short = 'b', long, default_value_t = 5)]
    attack_bonus: i64,

    /// Damage formula, e.g. "2d6+3"
    #[arg(short, long, default_value = "2d6+3")]
    damage: String,

    /// Roll policy: normal, advantage, disadvantage, best-of-three
    #[arg(short, long, default_value = "normal")]
    policy: String,

    /// Lowest natural roll that counts as a critical hit
    #[arg(short, long, default_value_t = 20)]
    crit: u8,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diceodds=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let Some(policy) = RollPolicy::parse(&args.policy) else {
        bail!("unknown roll policy '{}'", args.policy);
    };
    let Some(crit_threshold) = CritThreshold::at_least(args.crit) else {
        bail!("crit threshold must be between 2 and 20, got {}", args.crit);
    };
    let formula: DiceFormula = args.damage.parse()?;

    let profile = AttackProfile {
        armor_class: args.armor_class,
        attack_bonus: args.attack_bonus,
        damage_dice: formula.pool().clone(),
        damage_modifier: formula.modifier(),
        policy,
        crit_threshold,
    };

    let outcomes = profile.outcome_probabilities();
    println!(
        "{} vs AC {} ({:?}, crits on {}+)",
        formula,
        profile.armor_class,
        profile.policy,
        profile.crit_threshold.min_natural()
    );
    println!(
        "miss: {}  hit: {}  crit: {}",
        outcomes.miss, outcomes.hit, outcomes.crit
    );
    println!();
    println!("{}", profile.damage_distribution()?);

    Ok(())
}
