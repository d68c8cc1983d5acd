use super::Selection;
use crate::core_types::Individual;
use fastrand::Rng;

#[inline(always)]
fn score_of(ind: &Individual) -> f32 {
    ind.fitness().unwrap_or(f32::NEG_INFINITY)
}

/// Draws `k` contestants with replacement and returns the index of the best one.
/// Earlier draws win ties.
pub fn tournament(population: &[Individual], k: usize, rng: &mut Rng) -> usize {
    let n = population.len();
    let mut best = rng.usize(0..n);
    for _ in 1..k {
        let challenger = rng.usize(0..n);
        if score_of(&population[challenger]) > score_of(&population[best]) {
            best = challenger;
        }
    }
    best
}

pub struct TournamentSelection {
    pub size: usize,
}

impl TournamentSelection {
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Selection for TournamentSelection {
    fn select(&self, population: &[Individual], count: usize, rng: &mut Rng) -> Vec<Individual> {
        if population.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|_| population[tournament(population, self.size, rng)].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(values: &[f32]) -> Vec<Individual> {
        values
            .iter()
            .map(|&v| {
                let mut ind = Individual::new(vec![]);
                ind.set_fitness(v);
                ind
            })
            .collect()
    }

    #[test]
    fn test_keeps_population_size() {
        let pop = scored(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut rng = Rng::with_seed(11);
        let selected = TournamentSelection::default().select(&pop, pop.len(), &mut rng);
        assert_eq!(selected.len(), pop.len());
    }

    #[test]
    fn test_pressure_towards_better_scores() {
        let pop = scored(&(0..50).map(|v| v as f32).collect::<Vec<_>>());
        let mut rng = Rng::with_seed(5);
        let selected = TournamentSelection::default().select(&pop, 2000, &mut rng);
        let mean: f32 =
            selected.iter().filter_map(|i| i.fitness()).sum::<f32>() / selected.len() as f32;
        // Uniform sampling would average 24.5; the best of three averages ~36.
        assert!(mean > 32.0, "mean was {}", mean);
    }

    #[test]
    fn test_single_contestant_is_uniform_draw() {
        let pop = scored(&[1.0, 100.0]);
        let mut rng = Rng::with_seed(8);
        let selected = TournamentSelection::new(1).select(&pop, 400, &mut rng);
        let low = selected.iter().filter(|i| i.fitness() == Some(1.0)).count();
        assert!(low > 100 && low < 300);
    }
}
