use super::Mutation;
use crate::chords::ChordVoicingFactory;
use crate::core_types::Individual;
use fastrand::Rng;

// Redraws allowed when the fresh chord repeats the old pitches.
const MAX_REDRAWS: usize = 8;

/// Replaces one uniformly chosen slot with a fresh random chord. Returns the slot index.
pub fn mutate_slot(
    individual: &mut Individual,
    factory: &ChordVoicingFactory,
    rng: &mut Rng,
) -> Option<usize> {
    if individual.is_empty() {
        return None;
    }
    let slot = rng.usize(0..individual.len());
    let old_pitches = individual.chords()[slot].pitches();

    let mut chord = factory.random_chord(rng);
    for _ in 0..MAX_REDRAWS {
        if chord.pitches() != old_pitches {
            break;
        }
        chord = factory.random_chord(rng);
    }
    individual.replace_chord(slot, chord);
    Some(slot)
}

/// Point mutation over chord slots.
pub struct ChordReplacement<'a> {
    pub factory: &'a ChordVoicingFactory,
}

impl<'a> ChordReplacement<'a> {
    pub fn new(factory: &'a ChordVoicingFactory) -> Self {
        Self { factory }
    }
}

impl Mutation for ChordReplacement<'_> {
    fn mutate(&self, individual: &mut Individual, rng: &mut Rng) {
        mutate_slot(individual, self.factory, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Melody, Note};
    use crate::optimizer::initialization::PopulationSeeder;

    #[test]
    fn test_only_one_slot_touched() {
        let factory = ChordVoicingFactory::default();
        let melody = Melody::new(vec![Note::new(60, 0.0, 6.0, 90)]);
        let seeder = PopulationSeeder::new(&factory, &melody, 1.0).unwrap();
        let mut rng = Rng::with_seed(3);

        for _ in 0..100 {
            let mut ind = seeder.seed_individual(&mut rng);
            ind.set_fitness(1.0);
            let before = ind.clone();

            let slot = mutate_slot(&mut ind, &factory, &mut rng).unwrap();

            assert_eq!(ind.len(), before.len());
            assert!(!ind.is_evaluated());
            for (i, (a, b)) in before.chords().iter().zip(ind.chords()).enumerate() {
                if i == slot {
                    assert_ne!(a.pitches(), b.pitches());
                } else {
                    assert_eq!(a, b);
                }
                assert_eq!(a.start(), b.start());
                assert_eq!(a.end(), b.end());
            }
        }
    }

    #[test]
    fn test_empty_individual_is_untouched() {
        let factory = ChordVoicingFactory::default();
        let mut rng = Rng::with_seed(3);
        let mut ind = Individual::new(vec![]);
        assert_eq!(mutate_slot(&mut ind, &factory, &mut rng), None);
    }
}
