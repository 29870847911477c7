mod config;
mod session;

use anyhow::{Result, bail, ensure};
use clap::Parser;

use config::SimConfig;
use session::{Session, Summary};
use weapon_logic::{FireDedup, LinkConditions, WeaponConfig};

#[derive(Parser)]
#[command(name = "weapon-sim")]
#[command(about = "Headless authority/controller/observer fire-control session")]
struct Args {
    #[arg(short, long, default_value_t = 60)]
    tick_rate: u32,

    #[arg(long, default_value_t = 16, help = "Frame length fed to the fixed timestep")]
    frame_ms: u32,

    #[arg(short, long, default_value_t = 3.0, help = "Seconds of scripted input")]
    duration: f64,

    #[arg(long, default_value_t = 1.0, help = "Seconds between shots")]
    time_between_shots: f32,

    #[arg(long, help = "Fire rate in rounds per minute, overrides --time-between-shots")]
    rpm: Option<f32>,

    #[arg(long, default_value_t = 0.0, help = "Time the controller presses fire")]
    hold_at: f64,

    #[arg(long, default_value_t = 2.0, help = "Time the controller releases fire")]
    release_at: f64,

    #[arg(long, help = "Raise authority shots locally only")]
    no_multicast: bool,

    #[arg(long, help = "Drop relayed shots the controller already predicted, within this many seconds")]
    dedup_tolerance: Option<f64>,

    #[arg(long, default_value_t = 0, help = "Minimum latency in ms")]
    min_latency: u32,

    #[arg(long, default_value_t = 0, help = "Maximum latency in ms")]
    max_latency: u32,

    #[arg(long, default_value_t = 0, help = "Jitter in ms")]
    jitter: u32,

    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    ensure!(args.duration > 0.0, "duration must be positive");
    ensure!(
        args.release_at >= args.hold_at,
        "release time {} is before hold time {}",
        args.release_at,
        args.hold_at
    );

    let weapon = match args.rpm {
        Some(rpm) => WeaponConfig::from_rounds_per_minute(rpm),
        None => WeaponConfig::new(args.time_between_shots),
    };

    let fire_dedup = match args.dedup_tolerance {
        Some(tolerance) => {
            ensure!(tolerance >= 0.0, "dedup tolerance must not be negative");
            FireDedup::SuppressConfirmed { tolerance }
        }
        None => FireDedup::DeliverAll,
    };

    let link = if args.max_latency > 0 || args.min_latency > 0 || args.jitter > 0 {
        LinkConditions::latency(args.min_latency, args.max_latency, args.jitter)
    } else {
        LinkConditions::default()
    };

    let config = SimConfig {
        tick_rate: args.tick_rate,
        frame_ms: args.frame_ms,
        duration: args.duration,
        hold_at: args.hold_at,
        release_at: args.release_at,
        weapon,
        multicast_fire: !args.no_multicast,
        fire_dedup,
        link,
        seed: args.seed,
        ..Default::default()
    };

    log::info!(
        "Session started: {} Hz, {:.3}s between shots, hold {:.2}..{:.2}",
        config.tick_rate,
        config.weapon.time_between_shots,
        config.hold_at,
        config.release_at
    );

    let mut session = Session::new(config);
    let summary = session.run();
    report(&summary);

    if !summary.converged() {
        bail!("participants did not converge on the authority state");
    }

    Ok(())
}

fn report(summary: &Summary) {
    log::info!(
        "Session finished at {:.3}s after {} steps",
        summary.elapsed,
        summary.steps
    );

    for p in &summary.participants {
        log::info!(
            "peer {} {:<10} state={:<9} predicted={:<3} authoritative={:<3} changes={} packets sent={} received={} rejected={}",
            p.peer.0,
            p.role.as_str(),
            p.state.as_str(),
            p.tally.predicted,
            p.tally.authoritative,
            p.tally.state_changes,
            p.packets_sent,
            p.packets_received,
            p.packets_rejected
        );
        if let (Some(first), Some(last)) = (p.tally.first_shot, p.tally.last_shot) {
            log::info!("  shots from {first:.3}s to {last:.3}s");
        }
    }

    match summary.authority_state() {
        Some(state) if summary.converged() => {
            log::info!("All participants converged on {}", state.as_str());
        }
        _ => log::warn!("Participants diverged from the authority state"),
    }
}
