//! Note-event mini-language — one `PLAY` statement per line.
//!
//! Grammar (case-sensitive keywords):
//!
//! ```text
//! PLAY <pitch-token> FOR <float>s AT <float>s [VELOCITY <float>]
//! ```
//!
//! A `<pitch-token>` is either a single symbol (`C#4`, `Kick`) or a
//! comma-joined chord cluster (`C4,E4,G4`) that expands into one event per
//! pitch, all sharing the same start, duration, and velocity.
//!
//! Lines starting with the `PLAY` token that fail the grammar are skipped
//! with a per-line diagnostic; all other lines (blank, `//` comments,
//! anything else) are silently ignored.

use serde::{Deserialize, Serialize};

/// Velocity assigned to events whose statement omits the `VELOCITY` clause.
pub const DEFAULT_VELOCITY: f64 = 0.8;

/// One symbolic note: pitch, onset, duration, and loudness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Symbolic pitch name (e.g., `C#4`) or percussion label.
    pub pitch: String,
    /// Onset in seconds from the start of the piece. >= 0.
    pub start: f64,
    /// Length in seconds. > 0.
    pub duration: f64,
    /// Loudness in [0.0, 1.0].
    pub velocity: f64,
}

impl NoteEvent {
    /// Create an event with the default velocity.
    pub fn new(pitch: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            pitch: pitch.into(),
            start,
            duration,
            velocity: DEFAULT_VELOCITY,
        }
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }
}

/// A recovered per-line parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based line number within the parsed text.
    pub line: usize,
    pub message: String,
}

/// Result of parsing a block of text: the events that parsed, plus
/// diagnostics for every `PLAY` line that did not.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub events: Vec<NoteEvent>,
    pub diagnostics: Vec<LineDiagnostic>,
}

/// Parse all `PLAY` statements in `text`.
///
/// Parse failures never abort the whole text: a malformed `PLAY` line is
/// skipped and recorded in [`ParseOutcome::diagnostics`].
pub fn parse(text: &str) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        // The trigger is the literal token `PLAY` followed by whitespace
        // (or nothing). Lines like `PLAYER ...` are not statements.
        if line != "PLAY" && !line.starts_with("PLAY ") && !line.starts_with("PLAY\t") {
            continue;
        }
        match parse_statement(line) {
            Ok(events) => outcome.events.extend(events),
            Err(message) => {
                tracing::warn!(line = line_no, %message, "Skipping malformed PLAY line");
                outcome.diagnostics.push(LineDiagnostic {
                    line: line_no,
                    message,
                });
            }
        }
    }

    outcome
}

/// Render events as canonical `PLAY` lines, ordered by start time.
///
/// Consecutive events sharing identical start, duration, and velocity are
/// folded into a single comma-cluster statement, so
/// `parse(render(e)) == e` for any sequence already in canonical order.
pub fn render(events: &[NoteEvent]) -> String {
    let mut ordered: Vec<&NoteEvent> = events.iter().collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut lines = Vec::new();
    let mut i = 0;
    while i < ordered.len() {
        let head = ordered[i];
        let mut j = i + 1;
        while j < ordered.len() && same_cluster(head, ordered[j]) {
            j += 1;
        }
        let pitches: Vec<&str> = ordered[i..j].iter().map(|e| e.pitch.as_str()).collect();
        lines.push(format!(
            "PLAY {} FOR {:.3}s AT {:.3}s VELOCITY {:.2}",
            pitches.join(","),
            head.duration,
            head.start,
            head.velocity,
        ));
        i = j;
    }
    lines.join("\n")
}

fn same_cluster(a: &NoteEvent, b: &NoteEvent) -> bool {
    a.start == b.start && a.duration == b.duration && a.velocity == b.velocity
}

/// Parse a single trimmed `PLAY` statement into its expanded events.
fn parse_statement(line: &str) -> std::result::Result<Vec<NoteEvent>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 6 && tokens.len() != 8 {
        return Err(format!(
            "expected `PLAY <pitch> FOR <sec>s AT <sec>s [VELOCITY <v>]`, got {} tokens",
            tokens.len()
        ));
    }
    if tokens[2] != "FOR" {
        return Err(format!("expected keyword FOR, got '{}'", tokens[2]));
    }
    if tokens[4] != "AT" {
        return Err(format!("expected keyword AT, got '{}'", tokens[4]));
    }

    let duration = parse_seconds(tokens[3])?;
    if duration <= 0.0 {
        return Err(format!("duration must be > 0, got {duration}"));
    }
    let start = parse_seconds(tokens[5])?;
    if start < 0.0 {
        return Err(format!("start time must be >= 0, got {start}"));
    }

    let velocity = if tokens.len() == 8 {
        if tokens[6] != "VELOCITY" {
            return Err(format!("expected keyword VELOCITY, got '{}'", tokens[6]));
        }
        let v: f64 = tokens[7]
            .parse()
            .map_err(|_| format!("invalid velocity '{}'", tokens[7]))?;
        if !v.is_finite() || !(0.0..=1.0).contains(&v) {
            return Err(format!("velocity must be within [0.0, 1.0], got {v}"));
        }
        v
    } else {
        DEFAULT_VELOCITY
    };

    let mut events = Vec::new();
    for pitch in tokens[1].split(',') {
        validate_pitch(pitch)?;
        events.push(NoteEvent {
            pitch: pitch.to_string(),
            start,
            duration,
            velocity,
        });
    }
    Ok(events)
}

/// Parse a `<float>s` token into seconds, rejecting NaN and infinities.
fn parse_seconds(token: &str) -> std::result::Result<f64, String> {
    let digits = token
        .strip_suffix('s')
        .ok_or_else(|| format!("expected seconds value like '1.5s', got '{token}'"))?;
    let value: f64 = digits
        .parse()
        .map_err(|_| format!("invalid seconds value '{token}'"))?;
    if !value.is_finite() {
        return Err(format!("seconds value '{token}' is not finite"));
    }
    Ok(value)
}

fn validate_pitch(pitch: &str) -> std::result::Result<(), String> {
    if pitch.is_empty() {
        return Err("empty pitch in chord cluster".to_string());
    }
    if !pitch.chars().all(|c| c.is_ascii_alphanumeric() || c == '#') {
        return Err(format!("invalid pitch token '{pitch}'"));
    }
    Ok(())
}
