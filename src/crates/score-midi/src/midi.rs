use log::debug;
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use score_core::ScoreElement;

use crate::instruments::part_instrument_name;
use crate::note::key_to_pitch;

/// Default grid: twelfths of a quarter note, which holds sixteenths and triplets
pub const DEFAULT_QUANTIZE_DIVISIONS: u32 = 12;

/// Errors that make a whole file unreadable
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse MIDI data: {0}")]
    Midi(#[from] midly::Error),

    #[error("unsupported timing: {0}")]
    Timing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Offsets and durations snap to `1/quantize_divisions` of a quarter; 0 keeps raw ticks
    pub quantize_divisions: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            quantize_divisions: DEFAULT_QUANTIZE_DIVISIONS,
        }
    }
}

/// A parsed file flattened into score elements in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub elements: Vec<ScoreElement>,
    pub part_count: usize,
    pub note_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct SoundingNote {
    key: u8,
    onset: u64,
    end: u64,
}

/// Notes collected for one (track, channel) pair
#[derive(Debug, Default)]
struct PartBuilder {
    program: Option<u8>,
    open: HashMap<u8, VecDeque<u64>>,
    notes: Vec<SoundingNote>,
}

impl PartBuilder {
    fn open(&mut self, key: u8, tick: u64) {
        self.open.entry(key).or_default().push_back(tick);
    }

    /// Close the earliest open note for `key`; false if none was open
    fn close(&mut self, key: u8, tick: u64) -> bool {
        match self.open.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(onset) => {
                self.notes.push(SoundingNote {
                    key,
                    onset,
                    end: tick,
                });
                true
            }
            None => false,
        }
    }

    /// Close anything still sounding at `end_tick` and return every note
    fn finish(mut self, end_tick: u64) -> Vec<SoundingNote> {
        for (key, onsets) in self.open {
            for onset in onsets {
                self.notes.push(SoundingNote {
                    key,
                    onset,
                    end: end_tick,
                });
            }
        }
        self.notes.sort_by_key(|n| (n.onset, n.key));
        self.notes
    }
}

/// Converts ticks to (optionally quantized) quarter lengths
#[derive(Debug, Clone, Copy)]
struct Clock {
    ticks_per_quarter: f64,
    divisions: u32,
}

impl Clock {
    fn quarters(&self, ticks: u64) -> f64 {
        let quarters = ticks as f64 / self.ticks_per_quarter;
        if self.divisions == 0 {
            return quarters;
        }
        let divisions = self.divisions as f64;
        (quarters * divisions).round() / divisions
    }

    /// Quarter length of a sounding span, never shorter than one grid step
    /// (one tick when unquantized)
    fn duration(&self, ticks: u64) -> f64 {
        let quarters = self.quarters(ticks);
        if quarters > 0.0 {
            quarters
        } else if self.divisions == 0 {
            1.0 / self.ticks_per_quarter
        } else {
            1.0 / self.divisions as f64
        }
    }
}

/// Read and parse a MIDI file from disk
pub fn read_score(path: &Path, options: &ReaderOptions) -> Result<Score, ReadError> {
    let data = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_score(&data, options)
}

/// Parse SMF bytes into score elements.
///
/// Every (track, channel) pair that sounds at least one note becomes a part,
/// introduced by an instrument marker. Notes sharing an onset inside a part
/// are merged into a chord.
pub fn parse_score(data: &[u8], options: &ReaderOptions) -> Result<Score, ReadError> {
    let smf = Smf::parse(data)?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int() as f64,
        // Timecode counts ticks per second; a quarter is half a second at 120 BPM
        Timing::Timecode(fps, subframe) => fps.as_f32() as f64 * subframe as f64 / 2.0,
    };
    if ticks_per_quarter <= 0.0 {
        return Err(ReadError::Timing(format!(
            "{} ticks per quarter note",
            ticks_per_quarter
        )));
    }

    let clock = Clock {
        ticks_per_quarter,
        divisions: options.quantize_divisions,
    };

    let mut score = Score::default();

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut tick: u64 = 0;
        let mut track_name: Option<String> = None;
        let mut parts: BTreeMap<u8, PartBuilder> = BTreeMap::new();

        for event in track {
            tick += event.delta.as_int() as u64;

            match event.kind {
                TrackEventKind::Midi { channel, message } => {
                    let part = parts.entry(channel.as_int()).or_default();
                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            part.open(key.as_int(), tick);
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            if !part.close(key.as_int(), tick) {
                                debug!(
                                    "Track {}: note-off for key {} at tick {} without a sounding note",
                                    track_idx,
                                    key.as_int(),
                                    tick
                                );
                            }
                        }
                        MidiMessage::ProgramChange { program } => {
                            part.program.get_or_insert(program.as_int());
                        }
                        _ => {}
                    }
                }
                TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
                    if let Ok(name_str) = std::str::from_utf8(name) {
                        let cleaned = name_str.trim_end_matches('\0').trim();
                        if !cleaned.is_empty() {
                            track_name = Some(cleaned.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        for (channel, part) in parts {
            let program = part.program;
            let notes = part.finish(tick);
            if notes.is_empty() {
                continue;
            }

            score.part_count += 1;
            score.note_count += notes.len();
            score.elements.push(ScoreElement::Instrument {
                name: part_instrument_name(channel, program, track_name.as_deref()),
            });
            push_part_elements(&notes, &clock, &mut score.elements);
        }
    }

    Ok(score)
}

/// Emit notes and chords for one part, ordered by onset
fn push_part_elements(notes: &[SoundingNote], clock: &Clock, elements: &mut Vec<ScoreElement>) {
    let mut start = 0;
    while start < notes.len() {
        let offset = clock.quarters(notes[start].onset);
        let mut end = start + 1;
        while end < notes.len() && clock.quarters(notes[end].onset) == offset {
            end += 1;
        }
        let group = &notes[start..end];

        let mut keys: Vec<u8> = group.iter().map(|n| n.key).collect();
        keys.sort_unstable();
        keys.dedup();

        if keys.len() == 1 {
            elements.push(ScoreElement::Note {
                pitch: key_to_pitch(keys[0]),
                offset,
            });
        } else {
            let longest = group.iter().map(|n| n.end - n.onset).max().unwrap_or(0);
            let duration = clock.duration(longest);
            elements.push(ScoreElement::Chord {
                pitches: keys.into_iter().map(key_to_pitch).collect(),
                duration,
                offset,
            });
        }

        start = end;
    }
}
