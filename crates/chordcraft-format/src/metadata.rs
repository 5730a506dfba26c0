//! Song-level metadata — tempo, key, time signature, and the chord skeleton.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default tempo when the document carries no `bpm` field.
pub const DEFAULT_BPM: u32 = 120;

/// Default key label when the document carries no `key` field.
pub const DEFAULT_KEY: &str = "Unknown";

/// Placeholder chord line emitted when the skeleton is empty.
pub const EMPTY_CHORDS_LINE: &str = "| N | N | N | N |";

/// A musical time signature (e.g., 4/4, 3/4, 6/8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Beats per bar. Must be > 0.
    pub numerator: u32,
    /// Beat unit. Must be > 0.
    pub denominator: u32,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for TimeSignature {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (num, den) = s
            .split_once('/')
            .ok_or_else(|| format!("time signature '{s}' is not of the form n/d"))?;
        let numerator: u32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid time signature numerator '{num}'"))?;
        let denominator: u32 = den
            .trim()
            .parse()
            .map_err(|_| format!("invalid time signature denominator '{den}'"))?;
        if numerator == 0 || denominator == 0 {
            return Err(format!("time signature '{s}' has a zero component"));
        }
        Ok(Self::new(numerator, denominator))
    }
}

/// Tempo, key, time signature, and chord skeleton for one document.
///
/// Every field has a documented default so that a document missing the
/// `meta` block (or individual fields within it) still parses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// Tempo in beats per minute. Must be > 0.
    pub bpm: u32,
    /// Free-text key label (e.g., "C major", "A minor", "Unknown").
    pub key: String,
    /// Time signature, default 4/4.
    pub time: TimeSignature,
    /// Ordered chord labels. May be empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chords: Vec<String>,
}

impl Default for SongMetadata {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            key: DEFAULT_KEY.to_string(),
            time: TimeSignature::default(),
            chords: Vec::new(),
        }
    }
}

impl SongMetadata {
    /// Create metadata with the given tempo and key, 4/4 time, no chords.
    pub fn new(bpm: u32, key: impl Into<String>) -> Self {
        Self {
            bpm,
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the time signature.
    pub fn with_time_signature(mut self, time: TimeSignature) -> Self {
        self.time = time;
        self
    }

    /// Append a chord label to the skeleton.
    pub fn with_chord(mut self, chord: impl Into<String>) -> Self {
        self.chords.push(chord.into());
        self
    }

    /// Render the chord skeleton as a pipe-delimited line.
    ///
    /// An empty skeleton renders as the `| N | N | N | N |` placeholder.
    pub fn chords_line(&self) -> String {
        if self.chords.is_empty() {
            EMPTY_CHORDS_LINE.to_string()
        } else {
            format!("| {} |", self.chords.join(" | "))
        }
    }

    /// Parse a pipe-delimited chord line back into chord labels.
    ///
    /// `N` cells are placeholders for "no chord" and are dropped, so the
    /// placeholder line round-trips to an empty skeleton.
    pub fn parse_chords_line(line: &str) -> Vec<String> {
        line.split('|')
            .map(str::trim)
            .filter(|cell| !cell.is_empty() && *cell != "N")
            .map(str::to_string)
            .collect()
    }
}
