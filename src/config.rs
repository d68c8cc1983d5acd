use crate::chords::{parse_chord_types, ChordType};
use crate::error::{CfResult, ChordForgeError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const ALL_CHORD_TYPES: &str = "major,minor,diminished,suspended_second,suspended_fourth,\
major_first_inversion,minor_first_inversion,major_second_inversion,minor_second_inversion";

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub weights: FitnessWeights,
    #[command(flatten)]
    pub voicing: VoicingParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 400)]
    pub population_size: usize,
    #[arg(long, default_value_t = 0.5)]
    pub crossover_prob: f64,
    #[arg(long, default_value_t = 0.3)]
    pub mutation_prob: f64,
    #[arg(long, default_value_t = 40)]
    pub generations_per_epoch: usize,
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,
    #[arg(long, default_value_t = 3)]
    pub archive_capacity: usize,
    #[arg(long, default_value_t = 3)]
    pub tournament_size: usize,

    // Seconds per chord. Derived from the input's tempo when absent.
    #[arg(long)]
    pub chord_duration: Option<f64>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            population_size: 400,
            crossover_prob: 0.5,
            mutation_prob: 0.3,
            generations_per_epoch: 40,
            epochs: 10,
            archive_capacity: 3,
            tournament_size: 3,
            chord_duration: None,
            seed: None,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    // === VOICING ===
    #[arg(long, default_value_t = 15.0)]
    pub penalty_voice_spacing: f32,
    #[arg(long, default_value_t = 12)]
    pub max_voice_spacing: u8,
    #[arg(long, default_value_t = 1.4)]
    pub penalty_unison: f32,

    // === MELODY RELATION ===
    #[arg(long, default_value_t = 1000.0)]
    pub bonus_melody_doubling: f32,
    // Semitones between melody and chord base that count as doubling.
    #[arg(long, default_value_t = 24)]
    pub doubling_interval: u8,
    #[arg(long, default_value_t = 25.0)]
    pub bonus_bass_octave: f32,
    #[arg(long, default_value_t = 10.0)]
    pub penalty_bass_octave: f32,

    // === HARMONY ===
    #[arg(long, default_value_t = 30.0)]
    pub bonus_in_key: f32,
    #[arg(long, default_value_t = 30.0)]
    pub penalty_out_of_key: f32,

    // === GLOBAL SHAPE ===
    #[arg(long, default_value_t = 100.0)]
    pub penalty_per_register: f32,
    #[arg(long, default_value_t = 100.0)]
    pub bonus_cadence: f32,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            penalty_voice_spacing: 15.0,
            max_voice_spacing: 12,
            penalty_unison: 1.4,
            bonus_melody_doubling: 1000.0,
            doubling_interval: 24,
            bonus_bass_octave: 25.0,
            penalty_bass_octave: 10.0,
            bonus_in_key: 30.0,
            penalty_out_of_key: 30.0,
            penalty_per_register: 100.0,
            bonus_cadence: 100.0,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicingParams {
    #[arg(long, default_value_t = 36)]
    pub base_pitch_min: u8,
    #[arg(long, default_value_t = 47)]
    pub base_pitch_max: u8,
    #[arg(long, default_value_t = 100)]
    pub velocity: u8,
    #[arg(long, default_value = ALL_CHORD_TYPES)]
    pub chord_types: String,
}

impl Default for VoicingParams {
    fn default() -> Self {
        Self {
            base_pitch_min: 36,
            base_pitch_max: 47,
            velocity: 100,
            chord_types: ALL_CHORD_TYPES.to_string(),
        }
    }
}

impl VoicingParams {
    pub fn get_chord_types(&self) -> CfResult<Vec<ChordType>> {
        parse_chord_types(&self.chord_types)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Checks everything the search needs before any candidate is built.
    pub fn validate(&self) -> CfResult<()> {
        let s = &self.search;
        if s.population_size == 0 {
            return Err(ChordForgeError::Config(
                "population_size must be positive".to_string(),
            ));
        }
        if s.archive_capacity == 0 {
            return Err(ChordForgeError::Config(
                "archive_capacity must be positive".to_string(),
            ));
        }
        if s.tournament_size == 0 {
            return Err(ChordForgeError::Config(
                "tournament_size must be positive".to_string(),
            ));
        }
        for (name, p) in [
            ("crossover_prob", s.crossover_prob),
            ("mutation_prob", s.mutation_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ChordForgeError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if let Some(d) = s.chord_duration {
            validate_chord_duration(d)?;
        }
        if self.voicing.base_pitch_min > self.voicing.base_pitch_max {
            return Err(ChordForgeError::Config(format!(
                "base_pitch_min ({}) exceeds base_pitch_max ({})",
                self.voicing.base_pitch_min, self.voicing.base_pitch_max
            )));
        }
        if self.voicing.get_chord_types()?.is_empty() {
            return Err(ChordForgeError::Config(
                "chord_types must name at least one chord type".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn validate_chord_duration(d: f64) -> CfResult<()> {
    if d.is_finite() && d > 0.0 {
        Ok(())
    } else {
        Err(ChordForgeError::Config(format!(
            "chord_duration must be positive, got {}",
            d
        )))
    }
}

impl FitnessWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CfResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrites fields with CLI values, but only those typed explicitly on the command line.
    pub fn merge_from_cli(&mut self, cli_weights: &FitnessWeights, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_weights.$field.clone();
                }
            };
        }

        update_if_present!(penalty_voice_spacing, "penalty_voice_spacing");
        update_if_present!(max_voice_spacing, "max_voice_spacing");
        update_if_present!(penalty_unison, "penalty_unison");

        update_if_present!(bonus_melody_doubling, "bonus_melody_doubling");
        update_if_present!(doubling_interval, "doubling_interval");
        update_if_present!(bonus_bass_octave, "bonus_bass_octave");
        update_if_present!(penalty_bass_octave, "penalty_bass_octave");

        update_if_present!(bonus_in_key, "bonus_in_key");
        update_if_present!(penalty_out_of_key, "penalty_out_of_key");

        update_if_present!(penalty_per_register, "penalty_per_register");
        update_if_present!(bonus_cadence, "bonus_cadence");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_weights_json_uses_defaults_for_missing_fields() {
        let w: FitnessWeights = serde_json::from_str(r#"{"bonus_cadence": 5.0}"#).unwrap();
        assert_eq!(w.bonus_cadence, 5.0);
        assert_eq!(w.bonus_melody_doubling, 1000.0);
        assert_eq!(w.doubling_interval, 24);
    }
}
