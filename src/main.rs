use chordforge::config::{Config, FitnessWeights};
use chordforge::error::CfResult;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON fitness weight profile. Weight flags given explicitly still win.
    #[arg(global = true, long)]
    weights: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search accompaniments for a MIDI melody and write the best ones as MIDI files.
    Generate(cmd::generate::GenerateArgs),
    /// Score a hand-written progression against a MIDI melody.
    Score(cmd::score::ScoreArgs),
    /// List the supported keys and their chord vocabulary.
    Keys(cmd::keys::KeysArgs),
}

/// Applies the weights file (if any) under explicit CLI flags, then validates.
fn resolve_config(
    config: &Config,
    weights_path: Option<&str>,
    sub_matches: Option<&ArgMatches>,
) -> CfResult<Config> {
    let mut config = config.clone();
    if let Some(path) = weights_path {
        info!("⚖️  Loading Weights from: {}", path);
        let mut file_weights = FitnessWeights::load_from_file(path)?;
        if let Some(m) = sub_matches {
            file_weights.merge_from_cli(&config.weights, m);
        }
        config.weights = file_weights;
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let sub_matches = matches.subcommand().map(|(_, m)| m);
    let weights = cli.weights.as_deref();

    let outcome = match &cli.command {
        Commands::Generate(args) => resolve_config(&args.config, weights, sub_matches)
            .and_then(|config| cmd::generate::run(args, config)),
        Commands::Score(args) => resolve_config(&args.config, weights, sub_matches)
            .and_then(|config| cmd::score::run(args, config)),
        Commands::Keys(args) => {
            cmd::keys::run(args);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}
