mod common;

use chordforge::api::{generate, run_search};
use chordforge::chords::{ChordType, ChordVoicingFactory};
use chordforge::config::FitnessWeights;
use chordforge::core_types::{Individual, KeyContext};
use chordforge::error::ChordForgeError;
use chordforge::naming::TriadNamer;
use chordforge::optimizer::{GenerationStats, PopulationSeeder, ProgressCallback, Silent};
use chordforge::scorer::FitnessEvaluator;
use common::{melody, scale_melody, small_config, two_note_melody};
use fastrand::Rng;
use std::cell::Cell;

#[test]
fn test_two_note_melody_in_c_major() {
    let archive = generate(
        &two_note_melody(),
        &KeyContext::major("C"),
        &small_config(7),
        &TriadNamer,
    )
    .expect("search failed");

    assert!(!archive.is_empty());
    assert!(archive.len() <= 3);
    assert_eq!(archive[0].len(), 2);
    let best = archive[0].fitness().expect("archived entries are scored");
    assert!(best.is_finite());

    let scores: Vec<f32> = archive.iter().filter_map(Individual::fitness).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "Not ranked: {:?}", scores);
}

#[test]
fn test_archive_bound_and_lengths() {
    let mut cfg = small_config(11);
    cfg.search.archive_capacity = 5;
    let melody = scale_melody();

    let archive = generate(&melody, &KeyContext::major("C"), &cfg, &TriadNamer).unwrap();

    assert!(archive.len() <= 5);
    for ind in &archive {
        assert_eq!(ind.len(), 9);
        for (i, chord) in ind.chords().iter().enumerate() {
            assert_eq!(chord.start(), i as f64);
            assert_eq!(chord.end(), (i + 1) as f64);
        }
    }
}

#[test]
fn test_same_seed_same_archive() {
    let melody = scale_melody();
    let key = KeyContext::major("C");
    let cfg = small_config(2024);

    let a = generate(&melody, &key, &cfg, &TriadNamer).unwrap();
    let b = generate(&melody, &key, &cfg, &TriadNamer).unwrap();

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(&b) {
        assert!(x.same_content(y));
        assert_eq!(x.fitness(), y.fitness());
    }
}

#[test]
fn test_logbook_shape() {
    let mut cfg = small_config(5);
    cfg.search.epochs = 2;
    cfg.search.generations_per_epoch = 3;

    let result = run_search(
        &scale_melody(),
        &KeyContext::major("C"),
        &cfg,
        &TriadNamer,
        &Silent,
    )
    .unwrap();

    assert_eq!(result.generations_run, 6);
    assert!(!result.cancelled);
    // Seed population plus one record per generation.
    assert_eq!(result.logbook.len(), 7);
    assert_eq!(result.logbook.records[0].evaluations, 20);
    assert_eq!(result.logbook.records[0].generation, 0);
    assert_eq!(result.logbook.records[6].epoch, 1);

    // The archive never forgets the best of the seed population.
    let best = result.best_score().unwrap();
    assert!(best >= result.logbook.records[0].max);
    assert!(result
        .logbook
        .records
        .iter()
        .all(|s| s.min <= s.mean && s.mean <= s.max));
}

struct StopAfter {
    generations: usize,
    calls: Cell<usize>,
}

impl ProgressCallback for StopAfter {
    fn on_generation(&self, _stats: &GenerationStats, _best: f32) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.calls.get() < self.generations
    }
}

#[test]
fn test_callback_cancels_between_generations() {
    let stop = StopAfter {
        generations: 2,
        calls: Cell::new(0),
    };
    let mut cfg = small_config(9);
    cfg.search.epochs = 3;

    let result = run_search(
        &scale_melody(),
        &KeyContext::major("C"),
        &cfg,
        &TriadNamer,
        &stop,
    )
    .unwrap();

    assert!(result.cancelled);
    assert_eq!(result.generations_run, 2);
    assert_eq!(stop.calls.get(), 2);
    assert_eq!(result.logbook.len(), 3);
    assert!(!result.hall_of_fame.is_empty());
}

#[test]
fn test_doubling_and_cadence_beat_random() {
    // Four seconds of C4: C2 major doubles the melody two octaves down in every slot,
    // stays in key, uses one register and closes on its opening chord.
    let melody = melody(&[(60, 0.0, 4.0)]);
    let key = KeyContext::major("C");
    let factory = ChordVoicingFactory::default();
    let evaluator =
        FitnessEvaluator::new(&key, &melody, FitnessWeights::default(), &TriadNamer).unwrap();

    let crafted = Individual::new(
        (0..4)
            .map(|i| {
                factory
                    .build_chord(ChordType::Major, 36)
                    .with_window(i as f64, i as f64 + 1.0)
            })
            .collect(),
    );
    let crafted_score = evaluator.evaluate(&crafted);
    assert_eq!(crafted_score, 4080.0);

    let seeder = PopulationSeeder::new(&factory, &melody, 1.0).unwrap();
    let mut rng = Rng::with_seed(31);
    for ind in seeder.seed_population(200, &mut rng) {
        if ind.same_content(&crafted) {
            continue;
        }
        assert!(
            crafted_score > evaluator.evaluate(&ind),
            "Random individual outscored the crafted one"
        );
    }
}

#[test]
fn test_minor_key_search_runs() {
    let melody = melody(&[(57, 0.0, 1.0), (60, 1.0, 2.0), (64, 2.0, 3.0), (57, 3.0, 4.0)]);
    let archive = generate(&melody, &KeyContext::minor("A"), &small_config(3), &TriadNamer).unwrap();
    assert!(!archive.is_empty());
    assert_eq!(archive[0].len(), 4);
}

#[test]
fn test_vanishing_chord_duration_is_config_error() {
    for duration in [1e-300, 1e-7] {
        let mut cfg = small_config(1);
        cfg.search.chord_duration = Some(duration);
        let res = generate(
            &melody(&[(61, 0.0, 10.0)]),
            &KeyContext::minor("Db"),
            &cfg,
            &TriadNamer,
        );
        assert!(
            matches!(res, Err(ChordForgeError::Config(_))),
            "duration {} was accepted",
            duration
        );
    }
}
