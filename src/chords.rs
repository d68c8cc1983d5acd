use crate::config::VoicingParams;
use crate::core_types::{Chord, Note};
use crate::error::{CfResult, ChordForgeError};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Closed set of chord templates. Each variant carries its semitone shifts from the base note.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChordType {
    Major,
    Minor,
    Diminished,
    SuspendedSecond,
    SuspendedFourth,
    MajorFirstInversion,
    MinorFirstInversion,
    MajorSecondInversion,
    MinorSecondInversion,
}

impl ChordType {
    pub fn shifts(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::SuspendedSecond => &[0, 2, 7],
            Self::SuspendedFourth => &[0, 5, 7],
            // Third in the bass: E G C
            Self::MajorFirstInversion => &[0, 3, 8],
            // C E A
            Self::MinorFirstInversion => &[0, 4, 9],
            // Fifth in the bass: G C E
            Self::MajorSecondInversion => &[0, 5, 9],
            // E A C
            Self::MinorSecondInversion => &[0, 5, 8],
        }
    }

    #[inline(always)]
    pub fn voice_count(&self) -> usize {
        self.shifts().len()
    }

    pub fn all() -> Vec<ChordType> {
        ChordType::iter().collect()
    }

    /// Template whose shifts match the intervals of `pitches` above their lowest note.
    pub fn from_pitches(pitches: &[u8]) -> Option<ChordType> {
        let base = *pitches.iter().min()?;
        let mut shifts: Vec<u8> = pitches.iter().map(|p| p - base).collect();
        shifts.sort_unstable();
        ChordType::iter().find(|t| t.shifts() == shifts.as_slice())
    }
}

/// Parses a comma separated list of chord type names (`"major,minor"`).
pub fn parse_chord_types(list: &str) -> CfResult<Vec<ChordType>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ChordType>()
                .map_err(|_| ChordForgeError::Config(format!("Unknown chord type '{}'", s)))
        })
        .collect()
}

/// Builds concrete voicings from the chord templates it was configured with.
#[derive(Debug, Clone)]
pub struct ChordVoicingFactory {
    templates: Vec<ChordType>,
    base_min: u8,
    base_max: u8,
    velocity: u8,
}

impl ChordVoicingFactory {
    pub fn new(params: &VoicingParams) -> CfResult<Self> {
        Self::with_templates(
            params.get_chord_types()?,
            params.base_pitch_min,
            params.base_pitch_max,
            params.velocity,
        )
    }

    pub fn with_templates(
        templates: Vec<ChordType>,
        base_min: u8,
        base_max: u8,
        velocity: u8,
    ) -> CfResult<Self> {
        if templates.is_empty() {
            return Err(ChordForgeError::Config(
                "Chord template table is empty".to_string(),
            ));
        }
        if base_min > base_max {
            return Err(ChordForgeError::Config(format!(
                "Base pitch band is inverted ({} > {})",
                base_min, base_max
            )));
        }
        Ok(Self {
            templates,
            base_min,
            base_max,
            velocity,
        })
    }

    /// Deterministic voicing of `kind` on `base_pitch`, with placeholder `[0, 0)` timing.
    pub fn build_chord(&self, kind: ChordType, base_pitch: u8) -> Chord {
        let notes = kind
            .shifts()
            .iter()
            .map(|&shift| Note::new(base_pitch as i32 + shift as i32, 0.0, 0.0, self.velocity as i32))
            .collect();
        Chord::new(kind, notes)
    }

    pub fn create_chord(&self, kind: ChordType, rng: &mut Rng) -> Chord {
        let base = rng.u8(self.base_min..=self.base_max);
        self.build_chord(kind, base)
    }

    pub fn random_chord(&self, rng: &mut Rng) -> Chord {
        let kind = self.templates[rng.usize(0..self.templates.len())];
        self.create_chord(kind, rng)
    }
}

impl Default for ChordVoicingFactory {
    fn default() -> Self {
        Self {
            templates: ChordType::all(),
            base_min: 36,
            base_max: 47,
            velocity: 100,
        }
    }
}
