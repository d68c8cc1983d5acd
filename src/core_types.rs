use crate::chords::ChordType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumIter, EnumString};

pub const MAX_PITCH: u8 = 127;
pub const MAX_VELOCITY: u8 = 127;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Sharp spelling of a pitch class (`0..12`).
pub fn pitch_class_name(pc: u8) -> &'static str {
    SHARP_NAMES[(pc % 12) as usize]
}

/// Scientific pitch name, MIDI 60 is "C4".
pub fn pitch_name(pitch: u8) -> String {
    format!("{}{}", pitch_class_name(pitch % 12), octave_register(pitch))
}

/// Octave number of a MIDI pitch in scientific notation (MIDI 0 is octave -1).
#[inline(always)]
pub fn octave_register(pitch: u8) -> i8 {
    (pitch / 12) as i8 - 1
}

/// Parses a spelled pitch class such as "C", "F#", "Bb" or "E#".
/// Any number of sharps/flats is accepted; the result wraps to `0..12`.
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    let (pc, rest) = split_pitch_class(name)?;
    if rest.is_empty() {
        Some(pc)
    } else {
        None
    }
}

/// Splits a leading spelled pitch class off `s`, returning it and the remainder.
pub fn split_pitch_class(s: &str) -> Option<(u8, &str)> {
    let mut chars = s.char_indices();
    let (_, letter) = chars.next()?;
    let natural: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let mut offset = 0i32;
    let mut split_at = s.len();
    for (i, c) in chars {
        match c {
            '#' => offset += 1,
            'b' => offset -= 1,
            _ => {
                split_at = i;
                break;
            }
        }
    }

    let pc = (natural + offset).rem_euclid(12) as u8;
    Some((pc, &s[split_at..]))
}

/// Parses a scientific pitch name ("C4", "Bb2", "F#-1") into a MIDI number.
pub fn parse_pitch_name(name: &str) -> Option<u8> {
    let (pc, rest) = split_pitch_class(name.trim())?;
    let octave: i32 = rest.parse().ok()?;
    let midi = (octave + 1) * 12 + pc as i32;
    if (0..=MAX_PITCH as i32).contains(&midi) {
        Some(midi as u8)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub start: f64,
    pub end: f64,
    pub velocity: u8,
}

impl Note {
    /// Pitch and velocity are clamped into the MIDI range.
    pub fn new(pitch: i32, start: f64, end: f64, velocity: i32) -> Self {
        Self {
            pitch: pitch.clamp(0, MAX_PITCH as i32) as u8,
            start,
            end,
            velocity: velocity.clamp(0, MAX_VELOCITY as i32) as u8,
        }
    }
}

/// A block chord: notes share one time window and are kept in ascending pitch order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    kind: ChordType,
    notes: Vec<Note>,
}

impl Chord {
    pub fn new(kind: ChordType, mut notes: Vec<Note>) -> Self {
        notes.sort_by_key(|n| n.pitch);
        Self { kind, notes }
    }

    pub fn kind(&self) -> ChordType {
        self.kind
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    pub fn pitch_set(&self) -> BTreeSet<u8> {
        self.notes.iter().map(|n| n.pitch).collect()
    }

    /// Lowest sounding pitch. Chords are never empty once built by the factory.
    pub fn base_pitch(&self) -> u8 {
        self.notes.first().map(|n| n.pitch).unwrap_or(0)
    }

    pub fn base_pitch_class(&self) -> u8 {
        self.base_pitch() % 12
    }

    pub fn register(&self) -> i8 {
        octave_register(self.base_pitch())
    }

    pub fn start(&self) -> f64 {
        self.notes.first().map(|n| n.start).unwrap_or(0.0)
    }

    pub fn end(&self) -> f64 {
        self.notes.first().map(|n| n.end).unwrap_or(0.0)
    }

    pub fn retime(&mut self, start: f64, end: f64) {
        for note in &mut self.notes {
            note.start = start;
            note.end = end;
        }
    }

    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.retime(start, end);
        self
    }

    pub fn display_pitches(&self) -> String {
        self.notes
            .iter()
            .map(|n| pitch_name(n.pitch))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One candidate accompaniment. The cached fitness is cleared by every mutating accessor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    chords: Vec<Chord>,
    #[serde(default)]
    fitness: Option<f32>,
}

impl Individual {
    pub fn new(chords: Vec<Chord>) -> Self {
        Self {
            chords,
            fitness: None,
        }
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn chords_mut(&mut self) -> &mut Vec<Chord> {
        self.invalidate();
        &mut self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn fitness(&self) -> Option<f32> {
        self.fitness
    }

    pub fn set_fitness(&mut self, score: f32) {
        self.fitness = Some(score);
    }

    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Replaces the chord in `slot`, keeping the slot's time window.
    pub fn replace_chord(&mut self, slot: usize, chord: Chord) {
        let (start, end) = {
            let old = &self.chords[slot];
            (old.start(), old.end())
        };
        self.chords[slot] = chord.with_window(start, end);
        self.invalidate();
    }

    /// Octave register of each slot's base note.
    pub fn register_sequence(&self) -> Vec<i8> {
        self.chords.iter().map(Chord::register).collect()
    }

    /// Same chord content, ignoring the cached score.
    pub fn same_content(&self, other: &Individual) -> bool {
        self.chords == other.chords
    }
}

/// Monophonic line the accompaniment is fitted to. Notes are kept ordered by onset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Melody {
    notes: Vec<Note>,
}

impl Melody {
    pub fn new(mut notes: Vec<Note>) -> Self {
        notes.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// End time of the last note.
    pub fn end_time(&self) -> f64 {
        self.notes.last().map(|n| n.end).unwrap_or(0.0)
    }

    /// Pitch of the last note whose onset is at or before `t`.
    /// A note containing `t` always satisfies that condition, so it needs no separate lookup.
    pub fn pitch_at(&self, t: f64) -> Option<u8> {
        let idx = self.notes.partition_point(|n| n.start <= t);
        if idx == 0 {
            None
        } else {
            Some(self.notes[idx - 1].pitch)
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyContext {
    pub tonic: String,
    pub mode: Mode,
}

impl KeyContext {
    pub fn new(tonic: impl Into<String>, mode: Mode) -> Self {
        Self {
            tonic: tonic.into(),
            mode,
        }
    }

    pub fn major(tonic: impl Into<String>) -> Self {
        Self::new(tonic, Mode::Major)
    }

    pub fn minor(tonic: impl Into<String>) -> Self {
        Self::new(tonic, Mode::Minor)
    }
}

impl std::fmt::Display for KeyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode)
    }
}
