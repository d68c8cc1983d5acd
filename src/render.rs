use crate::core_types::{Individual, Note};
use crate::error::CfResult;
use crate::midi::{encode_performance, Performance};
use std::path::{Path, PathBuf};
use tracing::info;

/// One archive entry prepared for output.
#[derive(Debug, Clone)]
pub struct RenderedAccompaniment {
    /// 1-based position in the archive, before deduplication.
    pub rank: usize,
    pub fitness: Option<f32>,
    pub registers: Vec<i8>,
    pub notes: Vec<Note>,
    pub midi: Vec<u8>,
}

impl RenderedAccompaniment {
    pub fn file_name(&self) -> String {
        format!("accompaniment_{}.mid", self.rank)
    }

    pub fn save_in(&self, dir: &Path) -> CfResult<PathBuf> {
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.midi)?;
        Ok(path)
    }
}

pub trait Renderer {
    fn render(
        &self,
        archive: &[Individual],
        performance: &Performance,
    ) -> CfResult<Vec<RenderedAccompaniment>>;
}

/// Drops entries whose per-slot octave register sequence equals one already kept.
/// Returns the kept entries with their archive index, in archive order.
pub fn dedup_by_register(archive: &[Individual]) -> Vec<(usize, &Individual)> {
    let mut seen: Vec<Vec<i8>> = Vec::new();
    let mut kept = Vec::new();
    for (i, ind) in archive.iter().enumerate() {
        let registers = ind.register_sequence();
        if seen.contains(&registers) {
            continue;
        }
        seen.push(registers);
        kept.push((i, ind));
    }
    kept
}

/// Flattens an individual into notes. The final chord sustains until `end_time`.
pub fn accompaniment_notes(individual: &Individual, end_time: f64) -> Vec<Note> {
    let last = individual.len().saturating_sub(1);
    let mut notes = Vec::new();
    for (slot, chord) in individual.chords().iter().enumerate() {
        for note in chord.notes() {
            let mut n = *note;
            if slot == last {
                n.end = end_time.max(n.start);
            }
            notes.push(n);
        }
    }
    notes
}

/// Renders each distinct archive entry to a MIDI file holding the input's
/// melody and parts plus the accompaniment.
#[derive(Debug, Default, Clone, Copy)]
pub struct MidiRenderer;

impl Renderer for MidiRenderer {
    fn render(
        &self,
        archive: &[Individual],
        performance: &Performance,
    ) -> CfResult<Vec<RenderedAccompaniment>> {
        let kept = dedup_by_register(archive);
        if kept.len() < archive.len() {
            info!(
                "Skipping {} archive entries with duplicate register sequences",
                archive.len() - kept.len()
            );
        }

        kept.into_iter()
            .map(|(i, ind)| {
                let notes = accompaniment_notes(ind, performance.end_time);
                let midi = encode_performance(
                    performance.melody.notes(),
                    &performance.parts,
                    &notes,
                    performance.tempo_bpm,
                )?;
                Ok(RenderedAccompaniment {
                    rank: i + 1,
                    fitness: ind.fitness(),
                    registers: ind.register_sequence(),
                    notes,
                    midi,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chords::{ChordType, ChordVoicingFactory};
    use crate::core_types::Melody;
    use crate::midi::{MelodyExtractor, MidiMelodyExtractor, Part};

    fn ind(bases: &[u8]) -> Individual {
        let f = ChordVoicingFactory::default();
        Individual::new(
            bases
                .iter()
                .enumerate()
                .map(|(i, &b)| {
                    f.build_chord(ChordType::Major, b)
                        .with_window(i as f64, i as f64 + 1.0)
                })
                .collect(),
        )
    }

    fn performance() -> Performance {
        Performance {
            melody: Melody::new(vec![
                Note::new(60, 0.0, 1.0, 90),
                Note::new(64, 1.0, 2.5, 90),
            ]),
            resolution: 480,
            tempo_bpm: 120.0,
            end_time: 2.5,
            parts: Vec::new(),
        }
    }

    #[test]
    fn test_dedup_by_register() {
        // 36 and 40 share register 2; 48 is register 3.
        let archive = vec![ind(&[36, 48]), ind(&[40, 50]), ind(&[48, 36])];
        let kept: Vec<usize> = dedup_by_register(&archive).iter().map(|(i, _)| *i).collect();
        assert_eq!(kept, vec![0, 2]);
    }

    #[test]
    fn test_last_chord_extends_to_end() {
        let notes = accompaniment_notes(&ind(&[36, 38]), 2.5);
        assert_eq!(notes.len(), 6);
        assert!(notes[..3].iter().all(|n| n.end == 1.0));
        assert!(notes[3..].iter().all(|n| n.start == 1.0 && n.end == 2.5));
    }

    #[test]
    fn test_render_keeps_archive_rank() {
        let archive = vec![ind(&[36, 38]), ind(&[37, 39]), ind(&[48, 50])];
        let rendered = MidiRenderer.render(&archive, &performance()).unwrap();
        let ranks: Vec<usize> = rendered.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 3]);
        assert_eq!(rendered[1].file_name(), "accompaniment_3.mid");

        let reread = MidiMelodyExtractor.extract(&rendered[0].midi).unwrap();
        assert_eq!(reread.melody.notes().len(), 2);
        assert_eq!(reread.end_time, 2.5);
    }

    #[test]
    fn test_render_carries_other_parts() {
        let mut perf = performance();
        perf.parts.push(Part {
            name: "Bass".to_string(),
            channel: 2,
            program: 33,
            notes: vec![Note::new(40, 0.0, 2.5, 80)],
        });

        let rendered = MidiRenderer.render(&[ind(&[36, 38])], &perf).unwrap();
        let reread = MidiMelodyExtractor.extract(&rendered[0].midi).unwrap();

        let names: Vec<&str> = reread.parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bass", "Accompaniment"]);
        assert_eq!(reread.parts[0].notes, perf.parts[0].notes);
        assert_eq!(reread.parts[1].notes.len(), 6);
    }
}
