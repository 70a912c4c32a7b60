use anyhow::Result;
use clap::{Parser, ValueEnum};
use escape_bunny::modes::{EvaluateConfig, EvaluateMode, TrainConfig, TrainMode};
use escape_bunny::sim::SimulationConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "escape_bunny")]
#[command(version, about = "Predator/prey grid simulation with a Q-learning prey")]
struct Cli {
    /// Run mode
    #[arg(long, default_value = "train")]
    mode: Mode,

    /// JSON configuration file; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Map the world is built from
    #[arg(long)]
    map: Option<PathBuf>,

    /// Map the pursuer plans over (defaults to the world map)
    #[arg(long)]
    maze: Option<PathBuf>,

    /// Policy file to resume training from or to evaluate
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Directory trained policies are saved to and picked up from
    #[arg(long, default_value = "resources/brain")]
    brain_dir: PathBuf,

    /// Directory metrics snapshots are written to
    #[arg(long, default_value = "resources/data")]
    data_dir: PathBuf,

    /// Number of ticks to run (training runs until Ctrl+C when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Pause between ticks in milliseconds
    #[arg(long, default_value = "0")]
    delay_ms: u64,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Train the prey headless and save its policy
    Train,
    /// Watch a trained policy with exploration disabled
    Evaluate,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

impl Cli {
    fn sim_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(map) = &self.map {
            config.map_path = map.clone();
        }
        if let Some(maze) = &self.maze {
            config.maze_path = Some(maze.clone());
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let sim_config = cli.sim_config()?;
    let tick_delay = Duration::from_millis(cli.delay_ms);

    match cli.mode {
        Mode::Train => {
            let mut config = TrainConfig::new(sim_config);
            config.resume_from = cli.policy;
            config.brain_dir = cli.brain_dir;
            config.data_dir = cli.data_dir;
            config.max_ticks = cli.ticks;
            config.tick_delay = tick_delay;

            let mut train_mode = TrainMode::new(config)?;
            train_mode.run().await?;
        }
        Mode::Evaluate => {
            let mut config = EvaluateConfig::new(sim_config);
            config.policy = cli.policy;
            config.brain_dir = cli.brain_dir;
            if let Some(ticks) = cli.ticks {
                config.ticks = ticks;
            }
            config.tick_delay = tick_delay;

            let mut evaluate_mode = EvaluateMode::new(config)?;
            evaluate_mode.run().await?;
        }
    }

    Ok(())
}
