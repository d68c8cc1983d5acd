use crate::reports;
use chordforge::api::{harmonize, Collaborators};
use chordforge::config::Config;
use chordforge::core_types::{KeyContext, Mode};
use chordforge::error::CfResult;
use chordforge::optimizer::{GenerationStats, ProgressCallback};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Tonic such as "C", "F#" or "Bb". Detected from the melody when absent.
    #[arg(long)]
    pub key: Option<String>,

    #[arg(long, default_value_t = Mode::Major)]
    pub mode: Mode,

    /// Write per-generation statistics to this CSV file.
    #[arg(long)]
    pub stats_csv: Option<PathBuf>,

    /// Stop early once the best score reaches this value.
    #[arg(long)]
    pub target_score: Option<f32>,
}

struct TargetScore {
    target: Option<f32>,
}

impl ProgressCallback for TargetScore {
    fn on_generation(&self, stats: &GenerationStats, best_score: f32) -> bool {
        match self.target {
            Some(t) if best_score >= t => {
                info!(
                    "🎯 Target {:.1} reached at generation {} ({:.1})",
                    t, stats.generation, best_score
                );
                false
            }
            _ => true,
        }
    }
}

pub fn run(args: &GenerateArgs, config: Config) -> CfResult<()> {
    info!("📂 Reading melody: {}", args.input.display());
    let bytes = std::fs::read(&args.input)?;

    let key = args.key.as_deref().map(|t| KeyContext::new(t, args.mode));
    let progress = TargetScore {
        target: args.target_score,
    };
    let outcome = harmonize(&bytes, &config, key, &Collaborators::default(), &progress)?;

    reports::print_melody_summary(outcome.performance.melody.notes());
    println!(
        "🔑 Key: {} | {:.3}s per chord",
        outcome.key, outcome.chord_duration
    );

    std::fs::create_dir_all(&args.output_dir)?;
    let mut written = Vec::with_capacity(outcome.rendered.len());
    for rendered in outcome.rendered {
        let path = rendered.save_in(&args.output_dir)?;
        written.push((rendered, path));
    }
    reports::print_archive(&written);
    reports::print_final_stats(&outcome.result.logbook);

    if let Some(path) = &args.stats_csv {
        outcome.result.logbook.save_csv(path)?;
        info!("📈 Statistics written to {}", path.display());
    }

    match outcome.result.best_score() {
        Some(best) => println!("Score: {:.2}", best),
        None => warn!("⚠️  Archive is empty"),
    }
    Ok(())
}
