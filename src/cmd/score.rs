use crate::reports;
use chordforge::analysis::{KeyDetector, ProfileKeyDetector};
use chordforge::chords::ChordType;
use chordforge::config::{validate_chord_duration, Config};
use chordforge::core_types::{parse_pitch_name, Chord, Individual, KeyContext, Mode, Note};
use chordforge::error::{CfResult, ChordForgeError};
use chordforge::midi::{MelodyExtractor, MidiMelodyExtractor};
use chordforge::naming::TriadNamer;
use chordforge::optimizer::initialization::slot_count;
use chordforge::scorer::FitnessEvaluator;
use clap::Args;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub input: PathBuf,

    /// Slots separated by '|', notes by spaces: "C2 E2 G2|G2 B2 D3"
    #[arg(short, long)]
    pub chords: String,

    #[arg(long)]
    pub key: Option<String>,

    #[arg(long, default_value_t = Mode::Major)]
    pub mode: Mode,
}

/// Builds an individual from a hand-written progression, one slot per `chord_duration`.
pub fn parse_progression(text: &str, chord_duration: f64, velocity: u8) -> CfResult<Individual> {
    let mut chords = Vec::new();
    for (i, slot) in text.split('|').enumerate() {
        let pitches = slot
            .split_whitespace()
            .map(|name| {
                parse_pitch_name(name).ok_or_else(|| {
                    ChordForgeError::Data(format!("Bad pitch '{}' in slot {}", name, i))
                })
            })
            .collect::<CfResult<Vec<u8>>>()?;
        if pitches.is_empty() {
            return Err(ChordForgeError::Data(format!("Slot {} is empty", i)));
        }

        let start = i as f64 * chord_duration;
        let end = start + chord_duration;
        let kind = ChordType::from_pitches(&pitches).unwrap_or(ChordType::Major);
        let notes = pitches
            .iter()
            .map(|&p| Note::new(p as i32, start, end, velocity as i32))
            .collect();
        chords.push(Chord::new(kind, notes));
    }
    Ok(Individual::new(chords))
}

pub fn run(args: &ScoreArgs, config: Config) -> CfResult<()> {
    let bytes = std::fs::read(&args.input)?;
    let performance = MidiMelodyExtractor.extract(&bytes)?;
    reports::print_melody_summary(performance.melody.notes());

    let key = match &args.key {
        Some(t) => KeyContext::new(t.as_str(), args.mode),
        None => {
            let k = ProfileKeyDetector.detect(&performance.melody)?;
            info!("🔑 Detected key: {}", k);
            k
        }
    };
    let chord_duration = config
        .search
        .chord_duration
        .unwrap_or_else(|| performance.chord_duration());
    validate_chord_duration(chord_duration)?;

    let individual = parse_progression(&args.chords, chord_duration, config.voicing.velocity)?;
    let expected = slot_count(performance.melody.end_time(), chord_duration);
    if individual.len() != expected {
        warn!(
            "⚠️  Progression has {} slots, the melody fits {}",
            individual.len(),
            expected
        );
    }

    let evaluator = FitnessEvaluator::new(&key, &performance.melody, config.weights, &TriadNamer)?;
    let details = evaluator.evaluate_detailed(&individual);

    println!("\n🔎 === {} | {:.3}s per chord === 🔎", key, chord_duration);
    reports::print_fitness_breakdown(&individual, &details);
    println!("Score: {:.2}", details.total);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progression() {
        let ind = parse_progression("C2 E2 G2 | G2 B2 D3", 0.5, 90).unwrap();
        assert_eq!(ind.len(), 2);
        assert_eq!(ind.chords()[0].pitches(), vec![36, 40, 43]);
        assert_eq!(ind.chords()[0].kind(), ChordType::Major);
        assert_eq!(ind.chords()[1].start(), 0.5);
        assert_eq!(ind.chords()[1].end(), 1.0);
        assert!(!ind.is_evaluated());
    }

    #[test]
    fn test_parse_progression_rejects_bad_input() {
        assert!(parse_progression("C2 X9", 1.0, 90).is_err());
        assert!(parse_progression("C2 E2 G2||C2", 1.0, 90).is_err());
    }
}
