use crate::core_types::{KeyContext, Melody, Mode};
use crate::error::{CfResult, ChordForgeError};

/// Detects the tonal center of a melody.
pub trait KeyDetector {
    fn detect(&self, melody: &Melody) -> CfResult<KeyContext>;
}

// Krumhansl-Kessler probe-tone ratings, tonic first.
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

// Tonic spellings that exist in the key tables.
const MAJOR_TONICS: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
const MINOR_TONICS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// Duration-weighted pitch-class histogram of a melody.
/// Falls back to note counts when every note has zero length.
pub fn pitch_class_histogram(melody: &Melody) -> [f64; 12] {
    let mut hist = [0.0; 12];
    for note in melody.notes() {
        hist[(note.pitch % 12) as usize] += (note.end - note.start).max(0.0);
    }
    if hist.iter().all(|&v| v == 0.0) {
        for note in melody.notes() {
            hist[(note.pitch % 12) as usize] += 1.0;
        }
    }
    hist
}

fn correlation(xs: &[f64; 12], ys: &[f64; 12]) -> f64 {
    let mx = xs.iter().sum::<f64>() / 12.0;
    let my = ys.iter().sum::<f64>() / 12.0;
    let mut num = 0.0;
    let mut dx = 0.0;
    let mut dy = 0.0;
    for i in 0..12 {
        let a = xs[i] - mx;
        let b = ys[i] - my;
        num += a * b;
        dx += a * a;
        dy += b * b;
    }
    if dx == 0.0 || dy == 0.0 {
        0.0
    } else {
        num / (dx * dy).sqrt()
    }
}

/// Krumhansl-Schmuckler key finding: correlates the melody's histogram with
/// each of the 24 rotated key profiles and keeps the best match.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfileKeyDetector;

impl ProfileKeyDetector {
    /// Correlation of the melody with every key, best first.
    pub fn rank(&self, melody: &Melody) -> Vec<(KeyContext, f64)> {
        let hist = pitch_class_histogram(melody);
        let mut ranked = Vec::with_capacity(24);
        for (mode, profile, names) in [
            (Mode::Major, &MAJOR_PROFILE, &MAJOR_TONICS),
            (Mode::Minor, &MINOR_PROFILE, &MINOR_TONICS),
        ] {
            for tonic in 0..12 {
                let mut rotated = [0.0; 12];
                for (pc, slot) in rotated.iter_mut().enumerate() {
                    *slot = profile[(pc + 12 - tonic) % 12];
                }
                ranked.push((
                    KeyContext::new(names[tonic], mode),
                    correlation(&hist, &rotated),
                ));
            }
        }
        // Stable sort keeps major-before-minor and C-first order on ties.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl KeyDetector for ProfileKeyDetector {
    fn detect(&self, melody: &Melody) -> CfResult<KeyContext> {
        if melody.is_empty() {
            return Err(ChordForgeError::Data(
                "Cannot detect the key of an empty melody".to_string(),
            ));
        }
        self.rank(melody)
            .into_iter()
            .next()
            .map(|(key, _)| key)
            .ok_or_else(|| ChordForgeError::Data("No key candidates".to_string()))
    }
}
