use crate::core_types::Individual;

/// Bounded archive of the best individuals ever seen, best first.
///
/// Ties keep the entry that arrived first. An individual whose chords already
/// appear in the archive is not stored twice.
#[derive(Debug, Clone)]
pub struct HallOfFame {
    capacity: usize,
    entries: Vec<Individual>,
}

impl HallOfFame {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn entries(&self) -> &[Individual] {
        &self.entries
    }

    pub fn best(&self) -> Option<&Individual> {
        self.entries.first()
    }

    /// Lowest archived score, if any.
    pub fn min_score(&self) -> Option<f32> {
        self.entries.last().and_then(Individual::fitness)
    }

    /// Offers one scored individual. Returns whether it was archived.
    pub fn insert(&mut self, candidate: &Individual) -> bool {
        if self.capacity == 0 {
            return false;
        }
        let Some(score) = candidate.fitness() else {
            return false;
        };
        let beats_min = self.min_score().map(|m| score > m).unwrap_or(true);
        if self.is_full() && !beats_min {
            return false;
        }
        if self.entries.iter().any(|e| e.same_content(candidate)) {
            return false;
        }

        if self.is_full() {
            self.entries.pop();
        }
        let pos = self
            .entries
            .partition_point(|e| e.fitness().map(|f| f >= score).unwrap_or(false));
        self.entries.insert(pos, candidate.clone());
        true
    }

    pub fn update(&mut self, population: &[Individual]) -> usize {
        population.iter().filter(|ind| self.insert(ind)).count()
    }

    pub fn into_entries(self) -> Vec<Individual> {
        self.entries
    }
}
