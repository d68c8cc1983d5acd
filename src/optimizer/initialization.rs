use crate::chords::ChordVoicingFactory;
use crate::config::validate_chord_duration;
use crate::core_types::{Chord, Individual, Melody};
use crate::error::{CfResult, ChordForgeError};
use fastrand::Rng;

// Absorbs float error in `end / duration` so that e.g. 3.0 / 0.1 yields 30 slots.
const SLOT_EPSILON: f64 = 1e-9;

/// Most chord slots one individual may hold.
pub const MAX_SLOTS: usize = 4096;

/// Number of whole chord slots that fit before the melody ends. Saturates at
/// `usize::MAX` when the ratio overflows.
pub fn slot_count(melody_end: f64, chord_duration: f64) -> usize {
    if melody_end <= 0.0 || chord_duration <= 0.0 {
        return 0;
    }
    (melody_end / chord_duration + SLOT_EPSILON).floor() as usize
}

/// Builds random individuals that cover a melody at a fixed chord cadence.
pub struct PopulationSeeder<'a> {
    factory: &'a ChordVoicingFactory,
    chord_duration: f64,
    slots: usize,
}

impl<'a> PopulationSeeder<'a> {
    pub fn new(
        factory: &'a ChordVoicingFactory,
        melody: &Melody,
        chord_duration: f64,
    ) -> CfResult<Self> {
        validate_chord_duration(chord_duration)?;
        if melody.is_empty() {
            return Err(ChordForgeError::Config("Melody has no notes".to_string()));
        }
        let slots = slot_count(melody.end_time(), chord_duration);
        if slots == 0 {
            return Err(ChordForgeError::Config(format!(
                "Melody ({:.3}s) is shorter than one chord ({:.3}s)",
                melody.end_time(),
                chord_duration
            )));
        }
        if slots > MAX_SLOTS {
            return Err(ChordForgeError::Config(format!(
                "Chord duration {}s splits a {:.3}s melody into more than {} chords",
                chord_duration,
                melody.end_time(),
                MAX_SLOTS
            )));
        }
        Ok(Self {
            factory,
            chord_duration,
            slots,
        })
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn chord_duration(&self) -> f64 {
        self.chord_duration
    }

    /// Time window of slot `i`.
    pub fn window(&self, i: usize) -> (f64, f64) {
        (
            i as f64 * self.chord_duration,
            (i + 1) as f64 * self.chord_duration,
        )
    }

    pub fn seed_chords(&self, rng: &mut Rng) -> Vec<Chord> {
        (0..self.slots)
            .map(|i| {
                let (start, end) = self.window(i);
                self.factory.random_chord(rng).with_window(start, end)
            })
            .collect()
    }

    pub fn seed_individual(&self, rng: &mut Rng) -> Individual {
        Individual::new(self.seed_chords(rng))
    }

    pub fn seed_population(&self, n: usize, rng: &mut Rng) -> Vec<Individual> {
        (0..n).map(|_| self.seed_individual(rng)).collect()
    }
}
