use super::hall_of_fame::HallOfFame;
use super::initialization::PopulationSeeder;
use super::stats::{GenerationStats, Logbook};
use super::{Crossover, Mutation, Selection};
use crate::config::Config;
use crate::core_types::Individual;
use crate::scorer::FitnessEvaluator;
use std::time::Instant;
use tracing::{debug, info};

pub struct EvolutionOptions {
    pub population_size: usize,
    pub crossover_prob: f64,
    pub mutation_prob: f64,
    pub generations_per_epoch: usize,
    pub epochs: usize,
    pub archive_capacity: usize,
    pub seed: Option<u64>,
}

impl From<&Config> for EvolutionOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            population_size: cfg.search.population_size,
            crossover_prob: cfg.search.crossover_prob,
            mutation_prob: cfg.search.mutation_prob,
            generations_per_epoch: cfg.search.generations_per_epoch,
            epochs: cfg.search.epochs,
            archive_capacity: cfg.search.archive_capacity,
            seed: cfg.search.seed,
        }
    }
}

pub struct EvolutionResult {
    pub hall_of_fame: HallOfFame,
    pub logbook: Logbook,
    pub generations_run: usize,
    pub cancelled: bool,
}

impl EvolutionResult {
    pub fn best_score(&self) -> Option<f32> {
        self.hall_of_fame.best().and_then(Individual::fitness)
    }
}

/// A trait for receiving updates after every generation.
/// Boolean return value indicates if the search should continue (true) or abort (false).
pub trait ProgressCallback {
    fn on_generation(&self, stats: &GenerationStats, best_score: f32) -> bool;
}

/// Callback that never reports and never cancels.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_generation(&self, _stats: &GenerationStats, _best_score: f32) -> bool {
        true
    }
}

/// Generational loop: select, vary, evaluate, archive.
pub struct EvolutionLoop<'a, S, C, M> {
    seeder: &'a PopulationSeeder<'a>,
    evaluator: &'a FitnessEvaluator<'a>,
    selection: &'a S,
    crossover: &'a C,
    mutation: &'a M,
    options: EvolutionOptions,
}

impl<'a, S, C, M> EvolutionLoop<'a, S, C, M>
where
    S: Selection,
    C: Crossover,
    M: Mutation,
{
    pub fn new(
        seeder: &'a PopulationSeeder<'a>,
        evaluator: &'a FitnessEvaluator<'a>,
        selection: &'a S,
        crossover: &'a C,
        mutation: &'a M,
        options: EvolutionOptions,
    ) -> Self {
        Self {
            seeder,
            evaluator,
            selection,
            crossover,
            mutation,
            options,
        }
    }

    pub fn run<CB: ProgressCallback>(&self, callback: &CB) -> EvolutionResult {
        let opts = &self.options;
        let mut rng = if let Some(s) = opts.seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };
        let start_time = Instant::now();

        // 1. Seed
        let mut population = self.seeder.seed_population(opts.population_size, &mut rng);
        let evaluations = self.evaluator.evaluate_invalid(&mut population);

        let mut hof = HallOfFame::new(opts.archive_capacity);
        hof.update(&population);

        let mut logbook = Logbook::default();
        logbook.push(GenerationStats::compute(0, 0, evaluations, &population));

        info!(
            "🧬 Seeded {} candidates of {} chords (best {:.1})",
            population.len(),
            self.seeder.slots(),
            best_of(&hof)
        );

        let mut generation = 0;
        let mut cancelled = false;

        // 2. Generations
        'epochs: for epoch in 0..opts.epochs {
            for _ in 0..opts.generations_per_epoch {
                generation += 1;

                let mut offspring =
                    self.selection
                        .select(&population, opts.population_size, &mut rng);

                for i in (1..offspring.len()).step_by(2) {
                    if rng.f64() < opts.crossover_prob {
                        let (head, tail) = offspring.split_at_mut(i);
                        self.crossover.mate(&mut head[i - 1], &mut tail[0], &mut rng);
                    }
                }

                for ind in offspring.iter_mut() {
                    if rng.f64() < opts.mutation_prob {
                        self.mutation.mutate(ind, &mut rng);
                    }
                }

                let evaluations = self.evaluator.evaluate_invalid(&mut offspring);
                hof.update(&offspring);
                population = offspring;

                let stats = GenerationStats::compute(epoch, generation, evaluations, &population);
                debug!(
                    "Gen {:4} | evals {:4} | avg {:9.2} | std {:8.2} | min {:9.2} | max {:9.2}",
                    generation, evaluations, stats.mean, stats.std, stats.min, stats.max
                );
                logbook.push(stats);

                if !callback.on_generation(&stats, best_of(&hof)) {
                    cancelled = true;
                    break 'epochs;
                }
            }

            info!(
                "Epoch {:3}/{} | Best: {:.1} | {:.1}s",
                epoch + 1,
                opts.epochs,
                best_of(&hof),
                start_time.elapsed().as_secs_f32()
            );
        }

        if cancelled {
            info!("⏹  Search cancelled after {} generations", generation);
        }

        EvolutionResult {
            hall_of_fame: hof,
            logbook,
            generations_run: generation,
            cancelled,
        }
    }
}

fn best_of(hof: &HallOfFame) -> f32 {
    hof.best()
        .and_then(Individual::fitness)
        .unwrap_or(f32::NEG_INFINITY)
}
