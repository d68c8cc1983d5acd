// MIDI input and output.
//
// Reading: the first track that carries notes is the melody; later note
// tracks are kept as parts. Ticks are converted to seconds through the file's
// tempo map, so tempo changes are honoured. Writing: SMF format 1 with a tempo
// track, the melody on channel 0, the carried parts, then the accompaniment on
// channel 1. Melody and accompaniment use the acoustic piano program.

use crate::core_types::{Melody, Note};
use crate::error::{CfResult, ChordForgeError};
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ticks per quarter note in written files.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Microseconds per quarter note when a file sets no tempo (120 bpm).
pub const DEFAULT_TEMPO: u32 = 500_000;

const MELODY_CHANNEL: u8 = 0;
const ACCOMPANIMENT_CHANNEL: u8 = 1;
const PERCUSSION_CHANNEL: u8 = 9;
const LAST_CHANNEL: u8 = 15;
const PIANO_PROGRAM: u8 = 0;

/// Seconds per chord slot derived from a file's resolution and tempo.
pub fn chord_duration_from_tempo(resolution: u16, bpm: f64) -> f64 {
    resolution as f64 * bpm / 100_000.0 * 2.0
}

/// A parsed input file: the melody plus the timing facts needed downstream.
#[derive(Debug, Clone)]
pub struct Performance {
    pub melody: Melody,
    pub resolution: u16,
    /// Tempo in effect at the start of the file.
    pub tempo_bpm: f64,
    /// Latest note end over every track, in seconds.
    pub end_time: f64,
    /// Note tracks after the melody track, in file order.
    pub parts: Vec<Part>,
}

/// A non-melody note track of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    /// Channel of the track's first note.
    pub channel: u8,
    pub program: u8,
    pub notes: Vec<Note>,
}

impl Performance {
    pub fn chord_duration(&self) -> f64 {
        chord_duration_from_tempo(self.resolution, self.tempo_bpm)
    }
}

pub trait MelodyExtractor {
    fn extract(&self, bytes: &[u8]) -> CfResult<Performance>;
}

#[derive(Debug, Clone, Copy)]
struct TempoPoint {
    tick: u64,
    seconds: f64,
    micros_per_quarter: u32,
}

/// Piecewise-linear tick to seconds mapping.
#[derive(Debug, Clone)]
struct TempoMap {
    resolution: f64,
    points: Vec<TempoPoint>,
}

impl TempoMap {
    fn from_tracks(tracks: &[Track], resolution: u16) -> Self {
        let mut changes: Vec<(u64, u32)> = Vec::new();
        for track in tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta.as_int() as u64;
                if let TrackEventKind::Meta(MetaMessage::Tempo(t)) = event.kind {
                    changes.push((tick, t.as_int()));
                }
            }
        }
        changes.sort_by_key(|&(tick, _)| tick);

        let resolution = resolution.max(1) as f64;
        let mut points = vec![TempoPoint {
            tick: 0,
            seconds: 0.0,
            micros_per_quarter: DEFAULT_TEMPO,
        }];
        for (tick, micros) in changes {
            let Some(last) = points.last_mut() else {
                continue;
            };
            if tick == last.tick {
                last.micros_per_quarter = micros;
                continue;
            }
            let seconds = last.seconds
                + (tick - last.tick) as f64 * last.micros_per_quarter as f64 / 1e6 / resolution;
            points.push(TempoPoint {
                tick,
                seconds,
                micros_per_quarter: micros,
            });
        }
        Self { resolution, points }
    }

    fn seconds(&self, tick: u64) -> f64 {
        let idx = self.points.partition_point(|p| p.tick <= tick).max(1) - 1;
        let p = self.points[idx];
        p.seconds + (tick - p.tick) as f64 * p.micros_per_quarter as f64 / 1e6 / self.resolution
    }

    fn initial_bpm(&self) -> f64 {
        60_000_000.0 / self.points[0].micros_per_quarter.max(1) as f64
    }
}

/// Pairs note-on/note-off events of one track. A note-on with velocity 0 ends
/// a note. Overlapping notes of the same key close first-in first-out; notes
/// still sounding when the track ends close at its last tick.
fn track_notes(track: &Track, tempo: &TempoMap) -> Vec<Note> {
    let mut open: HashMap<(u8, u8), Vec<(u64, u8)>> = HashMap::new();
    let mut notes = Vec::new();
    let mut tick = 0u64;

    let close = |key: u8, start: u64, vel: u8, end: u64, notes: &mut Vec<Note>| {
        let (s, e) = (tempo.seconds(start), tempo.seconds(end));
        if e > s {
            notes.push(Note::new(key as i32, s, e, vel as i32));
        }
    };

    for event in track {
        tick += event.delta.as_int() as u64;
        let TrackEventKind::Midi { channel, message } = event.kind else {
            continue;
        };
        let channel = channel.as_int();
        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                open.entry((channel, key.as_int()))
                    .or_default()
                    .push((tick, vel.as_int()));
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                if let Some(pending) = open.get_mut(&(channel, key.as_int())) {
                    if !pending.is_empty() {
                        let (start, vel) = pending.remove(0);
                        close(key.as_int(), start, vel, tick, &mut notes);
                    }
                }
            }
            _ => {}
        }
    }

    let mut dangling: Vec<(u8, u64, u8)> = open
        .into_iter()
        .flat_map(|((_, key), pending)| pending.into_iter().map(move |(s, v)| (key, s, v)))
        .collect();
    if !dangling.is_empty() {
        warn!("{} notes never released, closing at end of track", dangling.len());
        dangling.sort_unstable();
        for (key, start, vel) in dangling {
            close(key, start, vel, tick, &mut notes);
        }
    }

    notes.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.pitch.cmp(&b.pitch)));
    notes
}

/// Name, first note channel and first program of a track.
fn track_voice(track: &Track, index: usize) -> (String, u8, u8) {
    let mut name = None;
    let mut channel = None;
    let mut program = None;
    for event in track {
        match event.kind {
            TrackEventKind::Meta(MetaMessage::TrackName(bytes)) if name.is_none() => {
                name = Some(String::from_utf8_lossy(bytes).into_owned());
            }
            TrackEventKind::Midi {
                channel: ch,
                message,
            } => match message {
                MidiMessage::ProgramChange { program: p } if program.is_none() => {
                    program = Some(p.as_int());
                }
                MidiMessage::NoteOn { .. } if channel.is_none() => channel = Some(ch.as_int()),
                _ => {}
            },
            _ => {}
        }
    }
    (
        name.unwrap_or_else(|| format!("Part {}", index)),
        channel.unwrap_or(MELODY_CHANNEL),
        program.unwrap_or(PIANO_PROGRAM),
    )
}

/// Reads Standard MIDI Files with metrical timing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MidiMelodyExtractor;

impl MelodyExtractor for MidiMelodyExtractor {
    fn extract(&self, bytes: &[u8]) -> CfResult<Performance> {
        let smf = Smf::parse(bytes)?;
        let resolution = match smf.header.timing {
            Timing::Metrical(ticks) => ticks.as_int(),
            Timing::Timecode(..) => {
                return Err(ChordForgeError::Data(
                    "SMPTE timecode MIDI files are not supported".to_string(),
                ))
            }
        };

        let tempo = TempoMap::from_tracks(&smf.tracks, resolution);
        let per_track: Vec<Vec<Note>> = smf
            .tracks
            .iter()
            .map(|track| track_notes(track, &tempo))
            .collect();

        let end_time = per_track
            .iter()
            .flatten()
            .map(|n| n.end)
            .fold(0.0, f64::max);

        let mut note_tracks = per_track
            .into_iter()
            .zip(&smf.tracks)
            .enumerate()
            .filter(|(_, (notes, _))| !notes.is_empty());
        let Some((index, (notes, _))) = note_tracks.next() else {
            return Err(ChordForgeError::Data(
                "MIDI file contains no notes".to_string(),
            ));
        };
        let parts: Vec<Part> = note_tracks
            .map(|(i, (notes, track))| {
                let (name, channel, program) = track_voice(track, i);
                Part {
                    name,
                    channel,
                    program,
                    notes,
                }
            })
            .collect();

        debug!(
            "Melody from track {}: {} notes, {} ppq, {:.1} bpm, {:.2}s",
            index,
            notes.len(),
            resolution,
            tempo.initial_bpm(),
            end_time
        );
        if !parts.is_empty() {
            debug!("Keeping {} further note tracks as parts", parts.len());
        }

        Ok(Performance {
            melody: Melody::new(notes),
            resolution,
            tempo_bpm: tempo.initial_bpm(),
            end_time,
            parts,
        })
    }
}

fn seconds_to_ticks(seconds: f64, bpm: f64) -> u64 {
    (seconds * bpm / 60.0 * TICKS_PER_QUARTER as f64).round().max(0.0) as u64
}

fn note_track<'a>(
    name: &'a [u8],
    channel: u8,
    program: u8,
    notes: &[Note],
    bpm: f64,
) -> Track<'a> {
    let channel = u4::new(channel);
    let mut track: Track<'a> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(name)),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(program.min(127)),
                },
            },
        },
    ];

    // (tick, is_on, key, vel); note-offs sort ahead of note-ons on the same tick.
    let mut events: Vec<(u64, bool, u8, u8)> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let on = seconds_to_ticks(note.start, bpm);
        let off = seconds_to_ticks(note.end, bpm).max(on);
        events.push((on, true, note.pitch, note.velocity));
        events.push((off, false, note.pitch, 0));
    }
    events.sort_by_key(|&(tick, is_on, key, _)| (tick, is_on, key));

    let mut last_tick = 0u64;
    for (tick, is_on, key, vel) in events {
        let delta = (tick - last_tick).min(0x0FFF_FFFF) as u32;
        last_tick = tick;
        let key = u7::new(key.min(127));
        let message = if is_on {
            MidiMessage::NoteOn {
                key,
                vel: u7::new(vel.min(127)),
            }
        } else {
            MidiMessage::NoteOff { key, vel: u7::new(0) }
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi { channel, message },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    track
}

/// Output channel of each carried part. Percussion stays on its channel; other
/// parts take the channels left over by the melody and accompaniment, sharing
/// the last one when they run out.
fn part_channels(parts: &[Part]) -> Vec<u8> {
    let mut free = (0..=LAST_CHANNEL).filter(|&c| {
        c != MELODY_CHANNEL && c != ACCOMPANIMENT_CHANNEL && c != PERCUSSION_CHANNEL
    });
    let mut shared = 0;
    let channels = parts
        .iter()
        .map(|part| {
            if part.channel == PERCUSSION_CHANNEL {
                return PERCUSSION_CHANNEL;
            }
            free.next().unwrap_or_else(|| {
                shared += 1;
                LAST_CHANNEL
            })
        })
        .collect();
    if shared > 0 {
        warn!("{} parts share channel {} for lack of free channels", shared + 1, LAST_CHANNEL);
    }
    channels
}

/// Builds an SMF at a fixed tempo: melody, the carried parts, then the accompaniment.
pub fn performance_to_smf<'a>(
    melody: &[Note],
    parts: &'a [Part],
    accompaniment: &[Note],
    bpm: f64,
) -> Smf<'a> {
    let bpm = if bpm.is_finite() && bpm > 0.0 { bpm } else { 120.0 };
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let micros = (60_000_000.0 / bpm).round().clamp(1.0, 0xFF_FFFF as f64) as u32;
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);
    smf.tracks.push(note_track(
        b"Melody",
        MELODY_CHANNEL,
        PIANO_PROGRAM,
        melody,
        bpm,
    ));
    for (part, channel) in parts.iter().zip(part_channels(parts)) {
        smf.tracks.push(note_track(
            part.name.as_bytes(),
            channel,
            part.program,
            &part.notes,
            bpm,
        ));
    }
    smf.tracks.push(note_track(
        b"Accompaniment",
        ACCOMPANIMENT_CHANNEL,
        PIANO_PROGRAM,
        accompaniment,
        bpm,
    ));
    smf
}

/// Serialized form of [`performance_to_smf`].
pub fn encode_performance(
    melody: &[Note],
    parts: &[Part],
    accompaniment: &[Note],
    bpm: f64,
) -> CfResult<Vec<u8>> {
    let smf = performance_to_smf(melody, parts, accompaniment, bpm);
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}
