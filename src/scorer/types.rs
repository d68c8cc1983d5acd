use serde::Serialize;

#[derive(Debug, Default, Clone, Serialize)]
pub struct FitnessBreakdown {
    // Top-line Score
    pub total: f32,

    // Weighted Terms (signed contributions)
    pub voicing: f32,
    pub doubling: f32,
    pub bass: f32,
    pub harmony: f32,
    pub register: f32,
    pub cadence: f32,

    // Counters
    pub slots: usize,
    pub spacing_violations: usize,
    pub unison_chords: usize,
    pub doubled_slots: usize,
    pub bass_octave_slots: usize,
    pub in_key_slots: usize,
    pub registers_used: usize,
    pub cadence_closed: bool,

    // Per-slot labels as returned by the chord namer
    pub labels: Vec<Option<String>>,
}

/// Term sums shared by the fast and detailed paths.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TermSums {
    pub voicing: f32,
    pub doubling: f32,
    pub bass: f32,
    pub harmony: f32,
    pub register: f32,
    pub cadence: f32,
}

impl TermSums {
    #[inline(always)]
    pub fn total(&self) -> f32 {
        self.voicing + self.doubling + self.bass + self.harmony + self.register + self.cadence
    }
}
