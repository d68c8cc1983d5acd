pub mod engine;
pub mod types;

pub use self::types::FitnessBreakdown;
use crate::config::FitnessWeights;
use crate::core_types::{Individual, KeyContext, Melody};
use crate::error::CfResult;
use crate::keys::{KeyConstraintTable, KeyVocabulary};
use crate::naming::ChordNamer;

/// Scores candidates against one melody in one key. Scoring is pure: the same
/// individual always gets the same score.
pub struct FitnessEvaluator<'a> {
    pub weights: FitnessWeights,
    pub vocabulary: KeyVocabulary,
    pub melody: &'a Melody,
    pub namer: &'a dyn ChordNamer,
}

impl<'a> FitnessEvaluator<'a> {
    /// Fails with a data error when the key is not in the key tables.
    pub fn new(
        key: &KeyContext,
        melody: &'a Melody,
        weights: FitnessWeights,
        namer: &'a dyn ChordNamer,
    ) -> CfResult<Self> {
        let vocabulary = KeyConstraintTable::lookup(key)?;
        Ok(Self {
            weights,
            vocabulary,
            melody,
            namer,
        })
    }

    pub fn evaluate(&self, individual: &Individual) -> f32 {
        engine::score_full(self, individual)
    }

    pub fn evaluate_detailed(&self, individual: &Individual) -> FitnessBreakdown {
        engine::score_debug(self, individual)
    }

    /// Scores every individual without a cached fitness. Returns how many were scored.
    pub fn evaluate_invalid(&self, population: &mut [Individual]) -> usize {
        let mut count = 0;
        for ind in population.iter_mut().filter(|i| !i.is_evaluated()) {
            let score = self.evaluate(ind);
            ind.set_fitness(score);
            count += 1;
        }
        count
    }
}

/// One-shot scoring of a single individual.
pub fn evaluate(
    key: &KeyContext,
    melody: &Melody,
    individual: &Individual,
    weights: &FitnessWeights,
    namer: &dyn ChordNamer,
) -> CfResult<f32> {
    let evaluator = FitnessEvaluator::new(key, melody, weights.clone(), namer)?;
    Ok(evaluator.evaluate(individual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::{ChordType, ChordVoicingFactory};
    use crate::core_types::{Chord, Note};
    use crate::naming::TriadNamer;

    fn melody_c_e() -> Melody {
        Melody::new(vec![
            Note::new(60, 0.0, 1.0, 90),
            Note::new(64, 1.0, 2.0, 90),
        ])
    }

    fn slot(chord: Chord, i: usize) -> Chord {
        chord.with_window(i as f64, (i + 1) as f64)
    }

    fn individual(chords: Vec<Chord>) -> Individual {
        Individual::new(chords.into_iter().enumerate().map(|(i, c)| slot(c, i)).collect())
    }

    fn evaluator(melody: &Melody) -> FitnessEvaluator<'_> {
        FitnessEvaluator::new(
            &KeyContext::major("C"),
            melody,
            FitnessWeights::default(),
            &TriadNamer,
        )
        .unwrap()
    }

    #[test]
    fn test_hand_computed_score() {
        let melody = melody_c_e();
        let ev = evaluator(&melody);
        let f = ChordVoicingFactory::default();

        // C2 major under C4: doubling, in key. C2 major under E4: in key only.
        let ind = individual(vec![
            f.build_chord(ChordType::Major, 36),
            f.build_chord(ChordType::Major, 36),
        ]);
        let d = ev.evaluate_detailed(&ind);

        assert_eq!(d.doubled_slots, 1);
        assert_eq!(d.bass_octave_slots, 0);
        assert_eq!(d.in_key_slots, 2);
        assert_eq!(d.registers_used, 1);
        assert!(d.cadence_closed);
        // 1000 - 20 + 60 - 100 + 100
        assert_eq!(d.total, 1040.0);
        assert_eq!(ev.evaluate(&ind), d.total);
    }

    #[test]
    fn test_bass_octave_and_registers() {
        let melody = melody_c_e();
        let ev = evaluator(&melody);
        let f = ChordVoicingFactory::default();

        // C3 minor under C4 (bass octave, out of key); E3 minor under E4 (bass octave, in key).
        let ind = individual(vec![
            f.build_chord(ChordType::Minor, 48),
            f.build_chord(ChordType::Minor, 52),
        ]);
        let d = ev.evaluate_detailed(&ind);

        assert_eq!(d.bass_octave_slots, 2);
        assert_eq!(d.bass, 50.0);
        assert_eq!(d.harmony, 0.0);
        assert_eq!(d.register, -100.0);
        assert!(!d.cadence_closed);
        assert_eq!(d.labels, vec![Some("Cm".to_string()), Some("Em".to_string())]);
    }

    #[test]
    fn test_voicing_penalties() {
        let melody = melody_c_e();
        let ev = evaluator(&melody);
        let wide = Chord::new(
            ChordType::Major,
            vec![
                Note::new(36, 0.0, 1.0, 100),
                Note::new(52, 0.0, 1.0, 100),
                Note::new(52, 0.0, 1.0, 100),
            ],
        );
        let d = ev.evaluate_detailed(&Individual::new(vec![wide]));
        assert_eq!(d.spacing_violations, 1);
        assert_eq!(d.unison_chords, 1);
        assert!((d.voicing - (-16.4)).abs() < 1e-4);
    }

    #[test]
    fn test_no_melody_pitch_means_bass_penalty() {
        let melody = Melody::new(vec![Note::new(60, 0.5, 1.0, 90)]);
        let ev = evaluator(&melody);
        let f = ChordVoicingFactory::default();
        let ind = individual(vec![f.build_chord(ChordType::Major, 48)]);
        let d = ev.evaluate_detailed(&ind);
        assert_eq!(d.doubled_slots, 0);
        assert_eq!(d.bass, -10.0);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let melody = melody_c_e();
        let res = FitnessEvaluator::new(
            &KeyContext::minor("Fb"),
            &melody,
            FitnessWeights::default(),
            &TriadNamer,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_one_shot_matches_evaluator() {
        let melody = melody_c_e();
        let f = ChordVoicingFactory::default();
        let ind = individual(vec![
            f.build_chord(ChordType::Major, 36),
            f.build_chord(ChordType::Minor, 40),
        ]);
        let weights = FitnessWeights::default();
        let once = evaluate(&KeyContext::major("C"), &melody, &ind, &weights, &TriadNamer).unwrap();
        assert_eq!(once, evaluator(&melody).evaluate(&ind));
    }
}
