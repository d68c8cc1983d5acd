mod common;

use chordforge::api::generate;
use chordforge::chords::ChordVoicingFactory;
use chordforge::config::FitnessWeights;
use chordforge::core_types::{Individual, KeyContext, Melody, Note};
use chordforge::naming::TriadNamer;
use chordforge::optimizer::crossover::crossover_one_point;
use chordforge::optimizer::mutation::mutate_slot;
use chordforge::optimizer::PopulationSeeder;
use chordforge::scorer::FitnessEvaluator;
use common::small_config;
use fastrand::Rng;
use proptest::prelude::*;

// --- STRATEGIES ---

prop_compose! {
    fn arb_melody()(
        pitches in proptest::collection::vec(48u8..84, 2..10),
        step in prop_oneof![Just(0.5f64), Just(1.0f64), Just(1.5f64)]
    ) -> Melody {
        Melody::new(
            pitches
                .iter()
                .enumerate()
                .map(|(i, &p)| Note::new(p as i32, i as f64 * step, (i + 1) as f64 * step, 90))
                .collect(),
        )
    }
}

fn arb_key() -> impl Strategy<Value = KeyContext> {
    (
        prop::sample::select(vec!["C", "G", "D", "F", "Bb", "E", "A", "F#"]),
        any::<bool>(),
    )
        .prop_map(|(tonic, major)| {
            if major {
                KeyContext::major(tonic)
            } else {
                KeyContext::minor(tonic)
            }
        })
}

fn seeded_pair(melody: &Melody, seed: u64) -> (Individual, Individual, Rng) {
    let factory = ChordVoicingFactory::default();
    let seeder = PopulationSeeder::new(&factory, melody, 0.5).expect("melody long enough");
    let mut rng = Rng::with_seed(seed);
    let a = seeder.seed_individual(&mut rng);
    let b = seeder.seed_individual(&mut rng);
    (a, b, rng)
}

fn sorted_pitch_sets(inds: &[&Individual]) -> Vec<Vec<u8>> {
    let mut sets: Vec<Vec<u8>> = inds
        .iter()
        .flat_map(|i| i.chords().iter().map(|c| c.pitches()))
        .collect();
    sets.sort();
    sets
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_archive_is_bounded_and_ranked(melody in arb_melody(), key in arb_key(), seed in any::<u64>()) {
        let mut cfg = small_config(seed);
        cfg.search.chord_duration = Some(0.5);
        cfg.search.archive_capacity = 4;
        let slots = (melody.end_time() / 0.5 + 1e-9).floor() as usize;

        let archive = generate(&melody, &key, &cfg, &TriadNamer).unwrap();

        prop_assert!(!archive.is_empty());
        prop_assert!(archive.len() <= 4);
        for ind in &archive {
            prop_assert_eq!(ind.len(), slots);
            prop_assert!(ind.fitness().map(f32::is_finite).unwrap_or(false));
        }
        let scores: Vec<f32> = archive.iter().filter_map(Individual::fitness).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn prop_scoring_is_pure(melody in arb_melody(), key in arb_key(), seed in any::<u64>()) {
        let (a, _, _) = seeded_pair(&melody, seed);
        let ev = FitnessEvaluator::new(&key, &melody, FitnessWeights::default(), &TriadNamer).unwrap();
        let first = ev.evaluate(&a);
        prop_assert_eq!(first, ev.evaluate(&a));
        prop_assert_eq!(first, ev.evaluate_detailed(&a).total);
    }

    #[test]
    fn prop_mutation_touches_one_slot(melody in arb_melody(), seed in any::<u64>()) {
        let factory = ChordVoicingFactory::default();
        let (mut a, _, mut rng) = seeded_pair(&melody, seed);
        let before = a.clone();

        let slot = mutate_slot(&mut a, &factory, &mut rng).unwrap();

        prop_assert_eq!(a.len(), before.len());
        for (i, (x, y)) in before.chords().iter().zip(a.chords()).enumerate() {
            prop_assert_eq!(x.start(), y.start());
            prop_assert_eq!(x.end(), y.end());
            if i != slot {
                prop_assert_eq!(x, y);
            }
        }
    }

    #[test]
    fn prop_crossover_conserves_chords(melody in arb_melody(), seed in any::<u64>()) {
        let (mut a, mut b, mut rng) = seeded_pair(&melody, seed);
        let before = sorted_pitch_sets(&[&a, &b]);
        let (len_a, len_b) = (a.len(), b.len());

        crossover_one_point(&mut a, &mut b, &mut rng);

        prop_assert_eq!(a.len(), len_a);
        prop_assert_eq!(b.len(), len_b);
        prop_assert_eq!(sorted_pitch_sets(&[&a, &b]), before);
        for (i, chord) in a.chords().iter().enumerate() {
            prop_assert_eq!(chord.start(), i as f64 * 0.5);
        }
    }
}
