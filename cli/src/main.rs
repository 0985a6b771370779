use std::path::Path;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use engine::{
    confidence_breakdown, confidence_estimate, content, cycle::weapon_dispersion_sources,
    evaluate, simulate_aiming, AimThresholds, AmmoProfile, CharacterProfile, Evaluation,
    EvaluationConfig, GunProfile, Scenario, ShotRng, SizeClass, SkillTimings,
};

#[derive(Copy, Clone, ValueEnum)]
enum Size {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl From<Size> for SizeClass {
    fn from(size: Size) -> Self {
        match size {
            Size::Tiny => SizeClass::Tiny,
            Size::Small => SizeClass::Small,
            Size::Medium => SizeClass::Medium,
            Size::Large => SizeClass::Large,
            Size::Huge => SizeClass::Huge,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// List builtin characters, guns and ammunition
    List,
    /// Compare sustained DPS for gun=ammo pairings across ranges
    Compare {
        /// Character: builtin id or profile file path
        #[arg(long, default_value = "recruit")]
        character: String,
        /// Pairing like "service_pistol=9mm"; repeatable. Defaults to the
        /// builtin arsenal.
        #[arg(long = "pair")]
        pairs: Vec<String>,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Monte Carlo trials per shot
        #[arg(long, default_value_t = 10_000)]
        trials: usize,
        /// Evaluated ranges in tiles
        #[arg(long, value_delimiter = ',', default_values_t = vec![1.0, 5.0, 10.0, 20.0, 30.0])]
        ranges: Vec<f64>,
        /// Target size class
        #[arg(long, value_enum, default_value_t = Size::Medium)]
        size: Size,
        /// Ambient light on the target
        #[arg(long, default_value_t = 0.0)]
        light: f64,
        /// Emit the full results as JSON instead of tables
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show aim-threshold timings for one gun
    Aim {
        #[arg(long, default_value = "recruit")]
        character: String,
        #[arg(long, default_value = "service_pistol")]
        gun: String,
        /// Target range in tiles
        #[arg(long, default_value_t = 10.0)]
        range: f64,
        #[arg(long, value_enum, default_value_t = Size::Medium)]
        size: Size,
        /// Print the per-move recoil trace
        #[arg(long, default_value_t = false)]
        verbose: bool,
    },
    /// Deterministic hit-confidence preview per aim threshold
    Confidence {
        #[arg(long, default_value = "recruit")]
        character: String,
        #[arg(long, default_value = "service_pistol")]
        gun: String,
        #[arg(long, default_value = "9mm")]
        ammo: String,
        #[arg(long, default_value_t = 10.0)]
        range: f64,
        #[arg(long, value_enum, default_value_t = Size::Medium)]
        size: Size,
    },
}

#[derive(Parser)]
#[command(name = "deadeye-cli")]
#[command(about = "Ranged-combat effectiveness calculator")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn resolve_character(id: &str) -> Result<CharacterProfile> {
    let path = Path::new(id);
    if path.exists() {
        content::load_character(path)
    } else {
        content::builtin_character(id)
    }
}

fn resolve_gun(id: &str) -> Result<GunProfile> {
    let path = Path::new(id);
    if path.exists() {
        content::load_gun(path)
    } else {
        content::builtin_gun(id)
    }
}

fn resolve_ammo(id: &str) -> Result<AmmoProfile> {
    let path = Path::new(id);
    if path.exists() {
        content::load_ammo(path)
    } else {
        content::builtin_ammo_profile(id)
    }
}

fn parse_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((gun, ammo)) if !gun.is_empty() && !ammo.is_empty() => {
            Ok((gun.to_string(), ammo.to_string()))
        }
        _ => bail!("invalid pairing '{}' (expected gun=ammo)", pair),
    }
}

fn default_pairs() -> Vec<(String, String)> {
    [
        ("service_pistol", "9mm"),
        ("hunting_rifle", "308"),
        ("combat_shotgun", "00_buckshot"),
        ("recurve_bow", "field_arrow"),
    ]
    .into_iter()
    .map(|(g, a)| (g.to_string(), a.to_string()))
    .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::List => {
            println!("characters:");
            let mut ids: Vec<_> = content::builtin_characters().into_keys().collect();
            ids.sort_unstable();
            for id in ids {
                println!("  {id}");
            }
            println!("guns:");
            let mut ids: Vec<_> = content::builtin_guns().into_keys().collect();
            ids.sort_unstable();
            for id in ids {
                println!("  {id}");
            }
            println!("ammo:");
            let mut ids: Vec<_> = content::builtin_ammo().into_keys().collect();
            ids.sort_unstable();
            for id in ids {
                println!("  {id}");
            }
        }
        Cmd::Compare {
            character,
            pairs,
            seed,
            trials,
            ranges,
            size,
            light,
            json,
        } => {
            let character = resolve_character(&character)?;
            let pairs = if pairs.is_empty() {
                default_pairs()
            } else {
                pairs
                    .iter()
                    .map(|p| parse_pair(p))
                    .collect::<Result<Vec<_>>>()?
            };
            let config = EvaluationConfig {
                ranges,
                trials,
                target_size: size.into(),
                light,
                ..EvaluationConfig::default()
            };
            let timings = SkillTimings::default();
            let mut rng = ShotRng::from_seed(seed);

            let mut reports = Vec::new();
            for (gun_id, ammo_id) in pairs {
                let gun = resolve_gun(&gun_id)?;
                let ammo = resolve_ammo(&ammo_id)?;
                let outcome = evaluate(
                    &character,
                    &gun,
                    Some(&ammo),
                    &config,
                    &timings,
                    &mut rng,
                    |_| {},
                );
                if json {
                    reports.push(outcome);
                    continue;
                }
                match outcome {
                    Evaluation::Computed(results) => {
                        println!(
                            "{} [{}]: {:.0} dmg/hit, {:.0} moves/attack",
                            results.gun, results.ammo, results.damage_per_hit, results.attack_moves
                        );
                        for mode in &results.modes {
                            println!("  mode {}", mode.mode);
                            println!(
                                "    {:>6} {:>10} {:>10} {:>10}",
                                "range", "sustained", "mag dump", "precise"
                            );
                            for dps in &mode.per_range {
                                println!(
                                    "    {:>6.0} {:>10.2} {:>10.2} {:>10.2}",
                                    dps.range, dps.sustained, dps.mag_dump, dps.precise_per_shot
                                );
                            }
                        }
                    }
                    Evaluation::NotComputable(reason) => {
                        println!("{gun_id} [{ammo_id}]: skipped, {reason}");
                    }
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            }
        }
        Cmd::Aim {
            character,
            gun,
            range,
            size,
            verbose,
        } => {
            let character = resolve_character(&character)?;
            let gun = resolve_gun(&gun)?;
            let scenario = Scenario::at_range(range, size.into());
            let limit = engine::weapon::most_accurate_sight_limit(&character, &gun);
            let thresholds = AimThresholds::from_limit(limit);
            let mut trace = Vec::new();
            let progress = simulate_aiming(&character, &gun, &scenario, &thresholds, |line| {
                trace.push(line)
            });
            if verbose {
                for line in &trace {
                    println!("{line}");
                }
            }
            println!("{} at {:.0} tiles:", gun.name, range);
            println!(
                "  start    recoil {:>7.1} (move {})",
                progress.start.recoil, progress.start.moves
            );
            for (label, checkpoint) in [
                ("regular", progress.regular),
                ("careful", progress.careful),
                ("precise", progress.precise),
            ] {
                match checkpoint {
                    Some(at) => {
                        println!("  {label:<8} recoil {:>7.1} (move {})", at.recoil, at.moves)
                    }
                    None => println!("  {label:<8} not reached"),
                }
            }
            println!(
                "  finish   recoil {:>7.1} after {} moves{}",
                progress.final_recoil,
                progress.moves_spent,
                if progress.capped { " (move cap)" } else { "" }
            );
        }
        Cmd::Confidence {
            character,
            gun,
            ammo,
            range,
            size,
        } => {
            let character = resolve_character(&character)?;
            let gun = resolve_gun(&gun)?;
            let ammo = resolve_ammo(&ammo)?;
            let size: SizeClass = size.into();
            let limit = engine::weapon::most_accurate_sight_limit(&character, &gun);
            let thresholds = AimThresholds::from_limit(limit);
            println!("{} [{}] at {:.0} tiles:", gun.name, ammo.name, range);
            for (label, recoil) in [
                ("regular", thresholds.regular),
                ("careful", thresholds.careful),
                ("precise", Some(thresholds.precise)),
            ] {
                let Some(recoil) = recoil else { continue };
                let sources = weapon_dispersion_sources(&character, &gun, &ammo, recoil);
                let tiers = confidence_breakdown(confidence_estimate(&sources, range, size));
                println!(
                    "  {label:<8} great {:>3}%  normal {:>3}%  graze {:>3}%  miss {:>3}%",
                    tiers.great, tiers.normal, tiers.graze, tiers.miss
                );
            }
        }
    }
    Ok(())
}
