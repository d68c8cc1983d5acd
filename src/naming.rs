use crate::core_types::pitch_class_name;

/// Canonical chord label lookup for a set of pitches.
pub trait ChordNamer {
    /// Returns `None` when the pitch set is not a recognised chord.
    fn name(&self, pitches: &[u8]) -> Option<String>;
}

const TRIAD_PATTERNS: [([u8; 3], &str); 6] = [
    ([0, 4, 7], ""),
    ([0, 3, 7], "m"),
    ([0, 3, 6], "o"),
    ([0, 4, 8], "+"),
    ([0, 2, 7], "sus2"),
    ([0, 5, 7], "sus4"),
];

/// Names three-pitch-class chords with sharp spelling ("C", "F#m", "Bo", "Dsus4").
/// Roots are tried starting from the bass, so symmetric or ambiguous sets
/// (augmented, sus2/sus4) are read from the lowest note.
#[derive(Debug, Default, Clone, Copy)]
pub struct TriadNamer;

impl ChordNamer for TriadNamer {
    fn name(&self, pitches: &[u8]) -> Option<String> {
        let mut sorted = pitches.to_vec();
        sorted.sort_unstable();

        let mut classes: Vec<u8> = Vec::with_capacity(3);
        for p in sorted {
            let pc = p % 12;
            if !classes.contains(&pc) {
                classes.push(pc);
            }
        }
        if classes.len() != 3 {
            return None;
        }

        for &root in &classes {
            let mut intervals: Vec<u8> = classes.iter().map(|&pc| (pc + 12 - root) % 12).collect();
            intervals.sort_unstable();
            if let Some((_, suffix)) = TRIAD_PATTERNS
                .iter()
                .find(|(pattern, _)| pattern[..] == intervals[..])
            {
                return Some(format!("{}{}", pitch_class_name(root), suffix));
            }
        }
        None
    }
}
