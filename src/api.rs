use crate::analysis::{KeyDetector, ProfileKeyDetector};
use crate::chords::ChordVoicingFactory;
use crate::config::Config;
use crate::core_types::{Individual, KeyContext, Melody};
use crate::error::{CfResult, ChordForgeError};
use crate::midi::{MelodyExtractor, MidiMelodyExtractor, Performance};
use crate::naming::{ChordNamer, TriadNamer};
use crate::optimizer::{
    ChordReplacement, EvolutionLoop, EvolutionOptions, EvolutionResult, OnePointCrossover,
    PopulationSeeder, ProgressCallback, Silent, TournamentSelection,
};
use crate::render::{MidiRenderer, RenderedAccompaniment, Renderer};
use crate::scorer::FitnessEvaluator;
use tracing::info;

/// Runs the full search and returns the archive together with the per-generation logbook.
///
/// `config.search.chord_duration` must be set; callers reading MIDI derive it
/// from the file's tempo first (see [`harmonize`]).
pub fn run_search<CB: ProgressCallback>(
    melody: &Melody,
    key: &KeyContext,
    config: &Config,
    namer: &dyn ChordNamer,
    callback: &CB,
) -> CfResult<EvolutionResult> {
    config.validate()?;
    let chord_duration = config.search.chord_duration.ok_or_else(|| {
        ChordForgeError::Config("chord_duration is required".to_string())
    })?;

    let factory = ChordVoicingFactory::new(&config.voicing)?;
    let seeder = PopulationSeeder::new(&factory, melody, chord_duration)?;
    let evaluator = FitnessEvaluator::new(key, melody, config.weights.clone(), namer)?;

    let selection = TournamentSelection::new(config.search.tournament_size);
    let crossover = OnePointCrossover;
    let mutation = ChordReplacement::new(&factory);

    info!(
        "🎼 Harmonizing {} notes in {} | {} slots of {:.3}s | pop {} | {}x{} generations",
        melody.notes().len(),
        key,
        seeder.slots(),
        chord_duration,
        config.search.population_size,
        config.search.epochs,
        config.search.generations_per_epoch
    );

    let engine = EvolutionLoop::new(
        &seeder,
        &evaluator,
        &selection,
        &crossover,
        &mutation,
        EvolutionOptions::from(config),
    );
    let result = engine.run(callback);

    if let Some(best) = result.best_score() {
        info!(
            "✅ Done after {} generations, {} evaluations. Best: {:.2}",
            result.generations_run,
            result.logbook.total_evaluations(),
            best
        );
    }
    Ok(result)
}

/// Archive of the best accompaniments found for `melody` in `key`, best first.
pub fn generate(
    melody: &Melody,
    key: &KeyContext,
    config: &Config,
    namer: &dyn ChordNamer,
) -> CfResult<Vec<Individual>> {
    let result = run_search(melody, key, config, namer, &Silent)?;
    Ok(result.hall_of_fame.into_entries())
}

/// The pluggable parts of the file-to-file pipeline.
pub struct Collaborators<'a> {
    pub extractor: &'a dyn MelodyExtractor,
    pub detector: &'a dyn KeyDetector,
    pub namer: &'a dyn ChordNamer,
    pub renderer: &'a dyn Renderer,
}

impl Default for Collaborators<'static> {
    fn default() -> Self {
        Self {
            extractor: &MidiMelodyExtractor,
            detector: &ProfileKeyDetector,
            namer: &TriadNamer,
            renderer: &MidiRenderer,
        }
    }
}

pub struct Harmonization {
    pub performance: Performance,
    pub key: KeyContext,
    pub chord_duration: f64,
    pub result: EvolutionResult,
    pub rendered: Vec<RenderedAccompaniment>,
}

/// MIDI bytes in, rendered accompaniments out.
///
/// The key is detected from the melody unless `key` is given. A missing
/// chord duration is derived from the file's resolution and opening tempo.
pub fn harmonize<CB: ProgressCallback>(
    midi: &[u8],
    config: &Config,
    key: Option<KeyContext>,
    parts: &Collaborators,
    callback: &CB,
) -> CfResult<Harmonization> {
    let performance = parts.extractor.extract(midi)?;

    let key = match key {
        Some(k) => k,
        None => {
            let detected = parts.detector.detect(&performance.melody)?;
            info!("🔑 Detected key: {}", detected);
            detected
        }
    };

    let mut config = config.clone();
    let chord_duration = match config.search.chord_duration {
        Some(d) => d,
        None => {
            let d = performance.chord_duration();
            info!(
                "⏱  Chord duration {:.3}s from {} ppq at {:.1} bpm",
                d, performance.resolution, performance.tempo_bpm
            );
            d
        }
    };
    config.search.chord_duration = Some(chord_duration);

    let result = run_search(&performance.melody, &key, &config, parts.namer, callback)?;
    let rendered = parts
        .renderer
        .render(result.hall_of_fame.entries(), &performance)?;

    Ok(Harmonization {
        performance,
        key,
        chord_duration,
        result,
        rendered,
    })
}
