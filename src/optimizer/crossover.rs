use super::Crossover;
use crate::core_types::Individual;
use fastrand::Rng;

/// Single-point crossover: swaps the chord suffixes of `a` and `b` after a random cut.
/// Returns the cut index, or `None` when the parents are too short to mix.
pub fn crossover_one_point(a: &mut Individual, b: &mut Individual, rng: &mut Rng) -> Option<usize> {
    debug_assert_eq!(a.len(), b.len(), "Parents seeded for different melodies");
    let len = a.len().min(b.len());
    if len < 2 {
        return None;
    }

    let cut = rng.usize(1..len);
    let (left, right) = (a.chords_mut(), b.chords_mut());
    left[cut..len].swap_with_slice(&mut right[cut..len]);
    Some(cut)
}

pub struct OnePointCrossover;

impl Crossover for OnePointCrossover {
    fn mate(&self, a: &mut Individual, b: &mut Individual, rng: &mut Rng) {
        crossover_one_point(a, b, rng);
    }
}
