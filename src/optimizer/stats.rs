use crate::core_types::Individual;
use crate::error::CfResult;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// Fitness statistics of one generation's population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub epoch: usize,
    pub generation: usize,
    pub evaluations: usize,
    pub mean: f32,
    pub std: f32,
    pub min: f32,
    pub max: f32,
}

impl GenerationStats {
    /// Population standard deviation (no Bessel correction). Unscored individuals are skipped.
    pub fn compute(
        epoch: usize,
        generation: usize,
        evaluations: usize,
        population: &[Individual],
    ) -> Self {
        let scores: Vec<f64> = population
            .iter()
            .filter_map(Individual::fitness)
            .map(f64::from)
            .collect();

        if scores.is_empty() {
            return Self {
                epoch,
                generation,
                evaluations,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Self {
            epoch,
            generation,
            evaluations,
            mean: mean as f32,
            std: var.sqrt() as f32,
            min: min as f32,
            max: max as f32,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Logbook {
    pub records: Vec<GenerationStats>,
}

impl Logbook {
    pub fn push(&mut self, stats: GenerationStats) {
        self.records.push(stats);
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_evaluations(&self) -> usize {
        self.records.iter().map(|r| r.evaluations).sum()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> CfResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> CfResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(file)
    }
}
