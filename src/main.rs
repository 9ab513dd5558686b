use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use ntuple_2048::config::{BonusScope, EnvironmentConfig, PlayerConfig, DEFAULT_LEARNING_RATE};
use ntuple_2048::environment::Environment;
use ntuple_2048::episode::Episode;
use ntuple_2048::player::Player;
use ntuple_2048::stats::Statistics;

#[derive(Debug, Parser)]
#[command(name = "ntuple-2048", version, about = "Train an n-tuple 2048 player against the biased tile generator")]
struct Args {
    /// Episodes to play
    #[arg(short = 'n', long, default_value_t = 1000)]
    total: u64,

    /// Episodes per statistics block
    #[arg(long, default_value_t = 1000)]
    block: usize,

    /// TD learning rate per weight entry
    #[arg(long, default_value_t = DEFAULT_LEARNING_RATE)]
    alpha: f32,

    /// Seed for the tile generator (OS entropy when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Load weights from this file instead of starting from zero
    #[arg(long, value_name = "FILE")]
    load: Option<PathBuf>,

    /// Save weights to this file when training finishes
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,

    /// Lifetime of the bonus-tile budget: "lifetime" or "episode"
    #[arg(long, default_value_t = BonusScope::Lifetime)]
    bonus_scope: BonusScope,

    /// Append block summaries as JSON lines to this file
    #[arg(long, value_name = "FILE")]
    stats_out: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let player_cfg = PlayerConfig { learning_rate: args.alpha, load: args.load.clone(), save: args.save.clone() };
    let env_cfg = EnvironmentConfig { seed: args.seed, bonus_scope: args.bonus_scope };
    log::info!("player: {}", serde_json::to_string(&player_cfg)?);
    log::info!("environment: {}", serde_json::to_string(&env_cfg)?);

    let mut player = Player::new(player_cfg).context("failed to initialize the player")?;
    let mut env = Environment::new(env_cfg);
    let mut stats = Statistics::new(args.block);
    let mut stats_out = match &args.stats_out {
        Some(path) => Some(BufWriter::new(
            File::options().create(true).append(true).open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => None,
    };

    let pb = if args.quiet {
        None
    } else {
        let pb = ProgressBar::new(args.total);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} episodes ({eta}) {msg}")?
                .progress_chars("=>-"),
        );
        Some(pb)
    };

    let start = Instant::now();
    let mut best_score = 0u64;
    for _ in 0..args.total {
        let summary = Episode::new().play(&mut player, &mut env);
        best_score = best_score.max(summary.score);
        if let Some(pb) = &pb {
            pb.inc(1);
            pb.set_message(format!("best {}", best_score));
        }
        if let Some(block) = stats.record(summary) {
            match &pb {
                Some(pb) => pb.suspend(|| log::info!("\n{}", block)),
                None => log::info!("\n{}", block),
            }
            if let Some(out) = stats_out.as_mut() {
                serde_json::to_writer(&mut *out, &block)?;
                out.write_all(b"\n")?;
            }
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    if let Some(mut out) = stats_out {
        out.flush()?;
    }

    log::info!(
        "{} episodes in {:.1}s, best score {}, bonus tiles {} / regular {}",
        stats.episodes(),
        start.elapsed().as_secs_f64(),
        best_score,
        env.bonus_placed(),
        env.regular_placed()
    );
    player.save_weights().context("failed to save weights")?;
    Ok(())
}
