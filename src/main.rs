use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use ddqn::config::TrainingConfig;
use ddqn::environment::{CartPole, RoomNavigation};
use ddqn::logging::init_tracing;
use ddqn::model::ModelPaths;
use ddqn::trainer::run_training_on;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EnvKind {
    Cartpole,
    Rooms,
}

/// Train a double deep Q-network.
#[derive(Parser, Debug)]
#[command(name = "ddqn-train", version, about)]
struct Args {
    /// JSON training configuration; missing keys use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "cartpole")]
    env: EnvKind,

    /// Override the number of episodes
    #[arg(long)]
    episodes: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding a previously saved online/offline pair to resume from
    #[arg(long)]
    load: Option<PathBuf>,

    /// Directory to save the trained online/offline pair to
    #[arg(long)]
    save: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    if let Some(episodes) = args.episodes {
        config.num_episodes = episodes;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(dir) = &args.save {
        config.persistence.paths = ModelPaths::in_dir(dir, "");
        config.persistence.save_on_finish = true;
    }
    config.validate().context("invalid configuration")?;

    let resume = args.load.as_ref().map(|dir| ModelPaths::in_dir(dir, ""));
    let env_seed = config.seed.map(|seed| seed.wrapping_add(1));
    let report = match args.env {
        EnvKind::Cartpole => {
            let mut env = env_seed.map(CartPole::seeded).unwrap_or_default();
            run_training_on(&config, &mut env, resume.as_ref())
        }
        EnvKind::Rooms => run_training_on(&config, &mut RoomNavigation::new(), resume.as_ref()),
    }
    .context("training failed")?;

    println!(
        "episodes: {}  learning steps: {}  solved: {}  final running average: {:.2}",
        report.episodes_run,
        report.learning_steps,
        report.solved,
        report.running_averages.last().copied().unwrap_or(0.0),
    );
    Ok(())
}
