//! Command-line front end for the hybrid chess engine

use anyhow::{Context, Result};
use chess_engine::{
    AgentMode, Board, EngineConfig, HybridAgent, PipelineConfig, QLearningAgent,
};
use clap::{Parser, Subcommand, ValueEnum};
use hybrid_chess::core::{load_settings, save_settings, settings_path, Difficulty};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the Q-table through self-play
    Train {
        #[arg(short, long, default_value_t = 1_000)]
        episodes: u32,

        #[arg(long)]
        seed: Option<u64>,

        /// Where the trained table is written
        #[arg(short, long)]
        output: PathBuf,

        /// Continue training from an existing table
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Choose one move for a position
    Decide {
        #[arg(short, long)]
        fen: Option<String>,

        #[command(flatten)]
        agent: AgentArgs,
    },

    /// Let the agent play a game against itself
    Play {
        #[arg(short, long)]
        fen: Option<String>,

        #[arg(long, default_value_t = 200)]
        max_plies: u32,

        #[command(flatten)]
        agent: AgentArgs,
    },

    /// Write the current settings (or defaults) to the settings file
    InitSettings,
}

#[derive(clap::Args, Debug)]
struct AgentArgs {
    /// Trained Q-table
    #[arg(short, long)]
    qtable: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Hybrid,
    Search,
    Learned,
}

impl From<Mode> for AgentMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Hybrid => AgentMode::Hybrid,
            Mode::Search => AgentMode::Search,
            Mode::Learned => AgentMode::Learned,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let settings = load_settings(args.settings.as_deref());

    match args.command {
        Command::Train {
            episodes,
            seed,
            output,
            input,
        } => {
            let config = settings.engine.learning.clone();
            let mut agent = match input {
                Some(path) => QLearningAgent::load(&path, config)
                    .with_context(|| format!("loading Q-table from {}", path.display()))?,
                None => QLearningAgent::new(config),
            };
            let mut rng = StdRng::seed_from_u64(seed.unwrap_or(settings.seed));
            let stats = agent.train(episodes, &mut rng)?;
            agent
                .save(&output)
                .with_context(|| format!("saving Q-table to {}", output.display()))?;
            info!(
                "Trained {} episodes: {} white wins, {} black wins, {} draws, {} unfinished; {} positions stored",
                stats.episodes,
                stats.white_wins,
                stats.black_wins,
                stats.draws,
                stats.unfinished,
                agent.table().len()
            );
        }
        Command::Decide { fen, agent } => {
            let mut board = start_board(fen.as_deref())?;
            let mut hybrid = build_agent(&settings, &agent)?;
            let decision = hybrid.decide(&mut board)?;
            match decision.score {
                Some(score) => println!("bestmove {} ({}, score {})", decision.uci(), decision.source, score),
                None => println!("bestmove {} ({})", decision.uci(), decision.source),
            }
        }
        Command::Play {
            fen,
            max_plies,
            agent,
        } => {
            let board = start_board(fen.as_deref())?;
            let mut hybrid = build_agent(&settings, &agent)?;
            let report = hybrid.play_game(&board, max_plies)?;
            for record in &report.decisions {
                println!(
                    "{:>3} {:<6} {:<8} {}",
                    record.ply,
                    record.uci,
                    record.source,
                    record.opening.unwrap_or("")
                );
            }
            println!("{}", report.record);
        }
        Command::InitSettings => {
            let path = args.settings.unwrap_or_else(settings_path);
            save_settings(&settings, &path)?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn start_board(fen: Option<&str>) -> Result<Board> {
    Ok(match fen {
        Some(fen) => Board::from_fen(fen)?,
        None => Board::new(),
    })
}

fn build_agent(
    settings: &hybrid_chess::core::EngineSettings,
    args: &AgentArgs,
) -> Result<HybridAgent> {
    let mut config: EngineConfig = settings.effective_config();
    if let Some(difficulty) = args.difficulty {
        info!("Difficulty: {}", difficulty.description());
        difficulty.apply(&mut config.search);
    }
    if let Some(mode) = args.mode {
        let preset = PipelineConfig::for_mode(mode.into());
        config.pipeline.use_book = preset.use_book;
        config.pipeline.use_learned = preset.use_learned;
        config.pipeline.use_search = preset.use_search;
    }

    let learner = match args.qtable.as_deref().or(settings.qtable_path.as_deref()) {
        Some(path) => load_table(path, &config)?,
        None => QLearningAgent::new(config.learning.clone()),
    };
    let seed = args.seed.unwrap_or(settings.seed);
    Ok(HybridAgent::from_config(&config, learner, seed)?)
}

fn load_table(path: &Path, config: &EngineConfig) -> Result<QLearningAgent> {
    QLearningAgent::load_or_empty(path, config.learning.clone())
        .with_context(|| format!("loading Q-table from {}", path.display()))
}
