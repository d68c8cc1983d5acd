use super::types::TermSums;
use super::{FitnessBreakdown, FitnessEvaluator};
use crate::core_types::{Chord, Individual};
use std::collections::BTreeSet;

struct VoicingCheck {
    spacing_violations: usize,
    has_unison: bool,
}

fn check_voicing(chord: &Chord, max_spacing: u8) -> VoicingCheck {
    let mut spacing_violations = 0;
    let mut has_unison = false;
    for pair in chord.notes().windows(2) {
        let interval = pair[1].pitch as i32 - pair[0].pitch as i32;
        if interval > max_spacing as i32 || interval < 0 {
            spacing_violations += 1;
        }
        if interval == 0 {
            has_unison = true;
        }
    }
    VoicingCheck {
        spacing_violations,
        has_unison,
    }
}

struct SlotOutcome {
    spacing_violations: usize,
    has_unison: bool,
    doubled: bool,
    bass_octave: bool,
    in_key: bool,
    label: Option<String>,
}

fn analyze_slot(ev: &FitnessEvaluator<'_>, chord: &Chord) -> SlotOutcome {
    let w = &ev.weights;
    let voicing = check_voicing(chord, w.max_voice_spacing);

    let base = chord.base_pitch() as i32;
    let melody_pitch = ev.melody.pitch_at(chord.start()).map(|p| p as i32);

    let doubled = melody_pitch
        .map(|m| m - base == w.doubling_interval as i32)
        .unwrap_or(false);
    let bass_octave = melody_pitch.map(|m| base == m - 12).unwrap_or(false);

    let label = ev.namer.name(&chord.pitches());
    let in_key = label
        .as_deref()
        .map(|l| ev.vocabulary.contains(l))
        .unwrap_or(false);

    SlotOutcome {
        spacing_violations: voicing.spacing_violations,
        has_unison: voicing.has_unison,
        doubled,
        bass_octave,
        in_key,
        label,
    }
}

fn accumulate(ev: &FitnessEvaluator<'_>, sums: &mut TermSums, slot: &SlotOutcome) {
    let w = &ev.weights;
    sums.voicing -= w.penalty_voice_spacing * slot.spacing_violations as f32;
    if slot.has_unison {
        sums.voicing -= w.penalty_unison;
    }
    if slot.doubled {
        sums.doubling += w.bonus_melody_doubling;
    }
    if slot.bass_octave {
        sums.bass += w.bonus_bass_octave;
    } else {
        sums.bass -= w.penalty_bass_octave;
    }
    if slot.in_key {
        sums.harmony += w.bonus_in_key;
    } else {
        sums.harmony -= w.penalty_out_of_key;
    }
}

fn registers_used(individual: &Individual) -> usize {
    individual
        .chords()
        .iter()
        .map(Chord::register)
        .collect::<BTreeSet<_>>()
        .len()
}

fn is_cadence_closed(individual: &Individual) -> bool {
    match (individual.chords().first(), individual.chords().last()) {
        (Some(first), Some(last)) => first.pitch_set() == last.pitch_set(),
        _ => false,
    }
}

fn finish(ev: &FitnessEvaluator<'_>, sums: &mut TermSums, individual: &Individual) -> (usize, bool) {
    let registers = registers_used(individual);
    sums.register -= ev.weights.penalty_per_register * registers as f32;

    let closed = is_cadence_closed(individual);
    if closed {
        sums.cadence += ev.weights.bonus_cadence;
    }
    (registers, closed)
}

/// Fast Path: Used by the evolution loop.
pub fn score_full(ev: &FitnessEvaluator<'_>, individual: &Individual) -> f32 {
    let mut sums = TermSums::default();
    for chord in individual.chords() {
        let slot = analyze_slot(ev, chord);
        accumulate(ev, &mut sums, &slot);
    }
    finish(ev, &mut sums, individual);
    sums.total()
}

/// Detailed Path: Used by reports.
pub fn score_debug(ev: &FitnessEvaluator<'_>, individual: &Individual) -> FitnessBreakdown {
    let mut d = FitnessBreakdown {
        slots: individual.len(),
        ..Default::default()
    };
    let mut sums = TermSums::default();

    for chord in individual.chords() {
        let slot = analyze_slot(ev, chord);
        accumulate(ev, &mut sums, &slot);

        d.spacing_violations += slot.spacing_violations;
        if slot.has_unison {
            d.unison_chords += 1;
        }
        if slot.doubled {
            d.doubled_slots += 1;
        }
        if slot.bass_octave {
            d.bass_octave_slots += 1;
        }
        if slot.in_key {
            d.in_key_slots += 1;
        }
        d.labels.push(slot.label);
    }

    let (registers, closed) = finish(ev, &mut sums, individual);
    d.registers_used = registers;
    d.cadence_closed = closed;

    d.voicing = sums.voicing;
    d.doubling = sums.doubling;
    d.bass = sums.bass;
    d.harmony = sums.harmony;
    d.register = sums.register;
    d.cadence = sums.cadence;
    d.total = sums.total();
    d
}
