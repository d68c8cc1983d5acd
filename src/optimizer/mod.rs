pub mod crossover;
pub mod hall_of_fame;
pub mod initialization;
pub mod mutation;
pub mod runner;
pub mod selection;
pub mod stats;

pub use self::crossover::OnePointCrossover;
pub use self::hall_of_fame::HallOfFame;
pub use self::initialization::PopulationSeeder;
pub use self::mutation::ChordReplacement;
pub use self::runner::{EvolutionLoop, EvolutionOptions, EvolutionResult, ProgressCallback, Silent};
pub use self::selection::TournamentSelection;
pub use self::stats::{GenerationStats, Logbook};

use crate::core_types::Individual;
use fastrand::Rng;

/// Builds the next population from the current one. Returned individuals are owned copies.
pub trait Selection {
    fn select(&self, population: &[Individual], count: usize, rng: &mut Rng) -> Vec<Individual>;
}

/// Recombines two individuals in place.
pub trait Crossover {
    fn mate(&self, a: &mut Individual, b: &mut Individual, rng: &mut Rng);
}

/// Perturbs one individual in place.
pub trait Mutation {
    fn mutate(&self, individual: &mut Individual, rng: &mut Rng);
}
