#![allow(dead_code)] // Not every test binary uses every helper

use chordforge::config::Config;
use chordforge::core_types::{Melody, Note};
use chordforge::midi::encode_performance;
use std::path::{Path, PathBuf};

pub fn melody(notes: &[(u8, f64, f64)]) -> Melody {
    Melody::new(
        notes
            .iter()
            .map(|&(p, s, e)| Note::new(p as i32, s, e, 90))
            .collect(),
    )
}

/// C4 then E4, one second each.
pub fn two_note_melody() -> Melody {
    melody(&[(60, 0.0, 1.0), (64, 1.0, 2.0)])
}

/// C major scale up and back down, one second per note.
pub fn scale_melody() -> Melody {
    let pitches = [60, 62, 64, 65, 67, 65, 64, 62, 60];
    Melody::new(
        pitches
            .iter()
            .enumerate()
            .map(|(i, &p)| Note::new(p, i as f64, i as f64 + 1.0, 90))
            .collect(),
    )
}

/// Small, seeded search: population 20, 5 generations, 1 epoch, 1s chords.
pub fn small_config(seed: u64) -> Config {
    let mut cfg = Config::default();
    cfg.search.population_size = 20;
    cfg.search.generations_per_epoch = 5;
    cfg.search.epochs = 1;
    cfg.search.chord_duration = Some(1.0);
    cfg.search.seed = Some(seed);
    cfg
}

pub fn midi_bytes(melody: &Melody, bpm: f64) -> Vec<u8> {
    encode_performance(melody.notes(), &[], &[], bpm).expect("Failed to encode MIDI")
}

pub fn write_midi(dir: &Path, name: &str, melody: &Melody, bpm: f64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, midi_bytes(melody, bpm)).expect("Failed to write MIDI");
    path
}
