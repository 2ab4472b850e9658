//! proficiency-sim - balance simulator
//!
//! Replays a seeded stream of actions through one domain's progression and
//! prints how the proficiency grows, to check how fast a skill can be maxed.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use proficiency::data::{export_default_tuning, TuningLoader};
use proficiency::progression::{
    gain_instrument_proficiency, gain_magic_proficiency, gain_singing_proficiency,
    gain_summoning_proficiency, ActionHistory, Activity, Domain, EventBase,
    LevelMatchup, MagicEvent, MaintenanceTick, Outcome, PerformanceEvent, ProfileSet,
    SingingEvent, SummonCast, SummonEvent, PROFICIENCY_MILESTONES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum Scenario {
    /// Practice alone, rotating techniques
    Practice,
    /// Real battles, rotating techniques
    Battle,
    /// Real battles, the same technique every time
    Spam,
    /// Alternate practice, spar and battle while rotating techniques
    Varied,
}

#[derive(Debug, Parser)]
#[command(name = "proficiency-sim", version, about = "Simulate proficiency growth for one domain")]
struct Args {
    /// Proficiency domain (magic, weapon, instrument, singing, summoning)
    #[arg(short, long, default_value = "magic")]
    domain: Domain,

    #[arg(short, long, value_enum, default_value_t = Scenario::Battle)]
    scenario: Scenario,

    /// Number of actions to simulate
    #[arg(short = 'n', long, default_value_t = 50)]
    actions: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Character level (sets the cap)
    #[arg(short, long, default_value_t = 39)]
    level: u32,

    /// Starting proficiency
    #[arg(long, default_value_t = 0.0)]
    start: f64,

    /// Directory holding progression.ron
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Print a JSON summary instead of the step log
    #[arg(long)]
    json: bool,

    /// Write the built-in tuning to this directory and exit
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct Summary {
    domain: Domain,
    scenario: Scenario,
    actions: u32,
    seed: u64,
    cap: f64,
    start: f64,
    end: f64,
    gains_applied: u32,
    milestones_crossed: usize,
    trajectory: Vec<f64>,
}

const TECHNIQUES: [&str; 5] = ["alpha", "bravo", "charlie", "delta", "echo"];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(dir) = &args.export {
        let path = export_default_tuning(dir)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let loader = match &args.tuning {
        Some(dir) => TuningLoader::from_dir(dir),
        None => TuningLoader::new(),
    };
    log::info!(
        "Simulating {} x{} ({:?}) with {} tuning",
        args.domain,
        args.actions,
        args.scenario,
        if loader.is_default() { "built-in" } else { "file" }
    );

    let summary = simulate(&args, loader.profiles());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for (i, pair) in summary.trajectory.windows(2).enumerate() {
            let gained = pair[1] - pair[0];
            if gained > 0.0 {
                println!("{:>5}  {:>7.2} -> {:>7.2}  (+{:.2})", i + 1, pair[0], pair[1], gained);
            } else {
                println!("{:>5}  {:>7.2}", i + 1, pair[1]);
            }
        }
        println!(
            "{} / {:?}: {:.2} -> {:.2} of cap {:.0} after {} actions ({} gains, {} milestones)",
            summary.domain,
            summary.scenario,
            summary.start,
            summary.end,
            summary.cap,
            summary.actions,
            summary.gains_applied,
            summary.milestones_crossed
        );
    }

    log::info!("Simulation finished");
    Ok(())
}

fn simulate(args: &Args, profiles: &ProfileSet) -> Summary {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let cap = profiles.cap(args.domain).cap_at(args.level, 0.0);
    let level = LevelMatchup::even(args.level as f64);
    let mut history = ActionHistory::default();
    let mut used: HashSet<&str> = HashSet::new();
    let mut p = args.start;
    let mut trajectory = Vec::with_capacity(args.actions as usize + 1);
    trajectory.push(p);
    let mut gains_applied = 0;

    for step in 0..args.actions {
        let (activity, id) = match args.scenario {
            Scenario::Practice => (Activity::Practice, TECHNIQUES[step as usize % TECHNIQUES.len()]),
            Scenario::Battle => (Activity::Battle, TECHNIQUES[step as usize % TECHNIQUES.len()]),
            Scenario::Spam => (Activity::Battle, TECHNIQUES[0]),
            Scenario::Varied => {
                let activity = [Activity::Practice, Activity::Spar, Activity::Battle][step as usize % 3];
                (activity, TECHNIQUES[step as usize % TECHNIQUES.len()])
            }
        };

        let base = EventBase::new(p, cap, activity, level);
        let n_same = history.n_same_for(id);
        let recent = history.recent();

        let next = match args.domain {
            Domain::Magic | Domain::Weapon => {
                let profile = if args.domain == Domain::Magic { &profiles.magic } else { &profiles.weapon };
                let mut event = MagicEvent::new(base, Outcome::Success);
                event.n_same = n_same;
                event.recent = recent;
                event.is_new_use = !used.contains(id);
                gain_magic_proficiency(&event, profile, &mut rng)
            }
            Domain::Instrument => {
                let mut event = PerformanceEvent::new(base, Outcome::Success, 3);
                event.n_same = n_same;
                event.recent = recent;
                gain_instrument_proficiency(&event, &profiles.instrument, &mut rng)
            }
            Domain::Singing => {
                let mut event = SingingEvent::new(base, Outcome::Success, 4.0);
                event.n_same = n_same;
                event.recent = recent;
                event.allies_affected = 3;
                event.enemies_pressuring = if activity == Activity::Battle { 2 } else { 0 };
                gain_singing_proficiency(&event, &profiles.singing, &mut rng)
            }
            Domain::Summoning => {
                let event = if step % 3 == 2 {
                    SummonEvent::MaintenanceTick(MaintenanceTick {
                        base,
                        maintained_sec: 5.0,
                        enemies_engaged: if activity == Activity::Battle { 2 } else { 0 },
                        allies_benefiting: 3,
                        n_same_summon: n_same,
                    })
                } else {
                    SummonEvent::Cast(SummonCast {
                        base,
                        outcome: Outcome::Success,
                        n_same_summon: n_same,
                        recent_summons: recent,
                    })
                };
                gain_summoning_proficiency(&event, &profiles.summoning, &mut rng)
            }
        };

        if next > p {
            gains_applied += 1;
        }
        history.record(id);
        used.insert(id);
        p = next;
        trajectory.push(p);
    }

    let milestones_crossed = PROFICIENCY_MILESTONES
        .iter()
        .filter(|m| args.start < **m && p >= **m)
        .count();

    Summary {
        domain: args.domain,
        scenario: args.scenario,
        actions: args.actions,
        seed: args.seed,
        cap,
        start: args.start,
        end: p,
        gains_applied,
        milestones_crossed,
        trajectory,
    }
}
