//! ChordCraft CLI — Command-line interface for the ChordCraft Code format.
//!
//! Provides commands for encoding WAV files into `.ccc` documents, decoding
//! documents back to WAV, and inspecting document contents.
//!
//! # Usage
//!
//! ```bash
//! chordcraft encode song.wav -o song.ccc --bpm 128 --key "A minor"
//! chordcraft encode song.wav -o song.ccc --neural
//! chordcraft decode song.ccc -o restored.wav
//! chordcraft info song.ccc
//! chordcraft info song.ccc --json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use chordcraft_codec::{
    decode, encode, extract_lossless, extract_neural, AudioStream, EncodeRequest, NeuralRegistry,
    DEFAULT_NEURAL_MODEL,
};
use chordcraft_format::{notes, ChordCraftDocument, SongMetadata, TimeSignature, DEFAULT_CHUNK_SIZE};

// ───────────────────────────── CLI definition ─────────────────────────────

/// Top-level CLI entry point for the `chordcraft` binary.
#[derive(Parser)]
#[command(
    name = "chordcraft",
    about = "ChordCraft Code -- a readable document format that carries full audio",
    version,
    long_about = "A text-first music format: chord charts and note events stay human-readable\n\
                   while the full recording rides along as a lossless FLAC payload or a\n\
                   neural token payload inside the same document."
)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available sub-commands.
#[derive(Subcommand)]
enum Commands {
    /// Encode a WAV file into a ChordCraft document.
    Encode {
        /// Input WAV file path.
        input: PathBuf,

        /// Output document path.
        #[arg(short, long)]
        output: PathBuf,

        /// Tempo in beats per minute.
        #[arg(long)]
        bpm: Option<u32>,

        /// Musical key (e.g., "C major", "A minor").
        #[arg(long)]
        key: Option<String>,

        /// Time signature (e.g., "4/4", "6/8").
        #[arg(long)]
        time: Option<String>,

        /// Comma-separated chord skeleton (e.g., "Am,F,C,G").
        #[arg(long)]
        chords: Option<String>,

        /// Path to a text file of PLAY statements to embed as note events.
        #[arg(long)]
        notes: Option<PathBuf>,

        /// Base64 chunk size for the lossless payload.
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Also embed a neural token payload.
        #[arg(long)]
        neural: bool,

        /// Embed only the lossless payload (the default).
        #[arg(long, conflicts_with = "neural")]
        lossless_only: bool,

        /// Neural model to encode with.
        #[arg(long, default_value = DEFAULT_NEURAL_MODEL)]
        model: String,
    },

    /// Decode a ChordCraft document back to a WAV file.
    Decode {
        /// Input document path.
        input: PathBuf,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Extract the neural payload instead of the lossless one.
        #[arg(long)]
        neural: bool,
    },

    /// Display information about a ChordCraft document.
    Info {
        /// Input document path.
        input: PathBuf,

        /// Output document information as JSON.
        #[arg(long)]
        json: bool,
    },
}

// ────────────────────────────── main ──────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            bpm,
            key,
            time,
            chords,
            notes,
            chunk_size,
            neural,
            lossless_only: _,
            model,
        } => cmd_encode(
            &input,
            &output,
            bpm,
            key.as_deref(),
            time.as_deref(),
            chords.as_deref(),
            notes.as_deref(),
            chunk_size,
            neural,
            &model,
        ),

        Commands::Decode {
            input,
            output,
            neural,
        } => cmd_decode(&input, &output, neural),

        Commands::Info { input, json } => cmd_info(&input, json),
    }
}

// ──────────────────────────── encode ──────────────────────────────

/// Encode a WAV file into a ChordCraft document.
///
/// The lossless payload is always embedded; `--neural` adds a neural
/// token payload alongside it.
#[allow(clippy::too_many_arguments)]
fn cmd_encode(
    input: &Path,
    output: &Path,
    bpm: Option<u32>,
    key: Option<&str>,
    time: Option<&str>,
    chords: Option<&str>,
    notes_path: Option<&Path>,
    chunk_size: usize,
    neural: bool,
    model: &str,
) -> Result<()> {
    let payload = read_wav(input)
        .with_context(|| format!("Failed to read WAV file: {}", input.display()))?;

    println!("\n  ChordCraft Encoder");
    println!("  ============================================");
    println!(
        "  Input:   {} ({}ch {}Hz {:.2}s, {} samples)",
        input.display(),
        payload.channels,
        payload.sample_rate,
        payload.duration_secs(),
        payload.sample_count,
    );

    let stream = AudioStream::new(payload.samples, payload.sample_rate, payload.channels)
        .map_err(|e| anyhow::anyhow!("Unsupported WAV layout: {}", e))?;

    // Assemble song metadata from the flags, falling back to defaults.
    let mut metadata = SongMetadata::default();
    if let Some(bpm) = bpm {
        if bpm == 0 {
            bail!("BPM must be greater than zero");
        }
        metadata.bpm = bpm;
    }
    if let Some(key) = key {
        metadata.key = key.to_string();
    }
    if let Some(time) = time {
        metadata.time = time
            .parse::<TimeSignature>()
            .map_err(|e| anyhow::anyhow!("Invalid time signature: {}", e))?;
    }
    if let Some(chords) = chords {
        metadata.chords = chords
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
    }

    // Optionally parse a PLAY statement file into note events.
    let mut note_events = Vec::new();
    if let Some(notes_path) = notes_path {
        let text = std::fs::read_to_string(notes_path)
            .with_context(|| format!("Failed to read notes file: {}", notes_path.display()))?;
        let outcome = notes::parse(&text);
        for diag in &outcome.diagnostics {
            println!("  Warning: line {}: {}", diag.line, diag.message);
        }
        println!(
            "  Notes:   {} event(s) from {}",
            outcome.events.len(),
            notes_path.display()
        );
        note_events = outcome.events;
    }

    let request = EncodeRequest {
        metadata,
        notes: note_events,
        include_lossless: true,
        include_neural: neural,
        model_id: model.to_string(),
        chunk_size,
    };
    let registry = NeuralRegistry::with_default_backends();

    let text = encode(&stream, &request, &registry)
        .with_context(|| format!("Failed to encode document from {}", input.display()))?;

    std::fs::write(output, &text)
        .with_context(|| format!("Failed to write document: {}", output.display()))?;

    println!("  --------------------------------------------");
    println!("  Output:  {} ({} bytes)", output.display(), text.len());
    println!("  Payloads: lossless{}", if neural { " + neural" } else { "" });
    if neural {
        println!("  Model:   {}", model);
    }
    println!("  Done!\n");

    Ok(())
}

// ──────────────────────────── decode ──────────────────────────────

/// Decode a ChordCraft document, extracting the audio payload to WAV.
///
/// The lossless payload is extracted by default; `--neural` selects the
/// neural payload instead.
fn cmd_decode(input: &Path, output: &Path, neural: bool) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read document: {}", input.display()))?;

    let doc = decode(&text)
        .with_context(|| format!("Failed to parse document: {}", input.display()))?;

    println!("\n  ChordCraft Decoder");
    println!("  ============================================");
    println!("  Input:   {}", input.display());
    println!("  BPM:     {}", doc.metadata.bpm);
    println!("  Key:     {}", doc.metadata.key);
    if !doc.notes.is_empty() {
        println!("  Notes:   {} event(s)", doc.notes.len());
    }
    for diag in &doc.note_diagnostics {
        println!("  Warning: line {}: {}", diag.line, diag.message);
    }

    let registry = NeuralRegistry::with_default_backends();
    let stream = if neural {
        extract_neural(&doc, &registry)
            .with_context(|| format!("Failed to extract neural payload: {}", input.display()))?
    } else if doc.lossless.is_some() {
        extract_lossless(&doc)
            .with_context(|| format!("Failed to extract lossless payload: {}", input.display()))?
    } else if doc.neural.is_some() {
        println!("  No lossless payload; falling back to the neural payload");
        extract_neural(&doc, &registry)
            .with_context(|| format!("Failed to extract neural payload: {}", input.display()))?
    } else {
        bail!("Document carries no audio payload: {}", input.display());
    };

    write_wav(output, &stream)
        .with_context(|| format!("Failed to write WAV file: {}", output.display()))?;

    println!("  --------------------------------------------");
    println!(
        "  Output:  {} ({}ch {}Hz {:.2}s)",
        output.display(),
        stream.channels(),
        stream.sample_rate(),
        stream.duration_secs(),
    );
    println!("  Done!\n");

    Ok(())
}

// ───────────────────────────── info ──────────────────────────────

/// Summary of one document, printable as text or JSON.
#[derive(Serialize)]
struct DocumentInfo {
    bpm: u32,
    key: String,
    time: String,
    chords: Vec<String>,
    notes: usize,
    note_diagnostics: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    lossless: Option<LosslessInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    neural: Option<NeuralInfo>,
}

#[derive(Serialize)]
struct LosslessInfo {
    format: String,
    sample_rate: u32,
    channels: u8,
    chunks: usize,
    chunk_size: usize,
    size_bytes: u64,
    sha256: String,
}

#[derive(Serialize)]
struct NeuralInfo {
    model: String,
    tokens: usize,
    compression_ratio: f64,
}

impl DocumentInfo {
    fn from_document(doc: &ChordCraftDocument) -> Self {
        Self {
            bpm: doc.metadata.bpm,
            key: doc.metadata.key.clone(),
            time: doc.metadata.time.to_string(),
            chords: doc.metadata.chords.clone(),
            notes: doc.notes.len(),
            note_diagnostics: doc.note_diagnostics.len(),
            lossless: doc.lossless.as_ref().map(|p| LosslessInfo {
                format: p.metadata.format.clone(),
                sample_rate: p.metadata.sample_rate,
                channels: p.metadata.channels,
                chunks: p.metadata.chunk_count,
                chunk_size: p.metadata.chunk_size,
                size_bytes: p.metadata.size_bytes,
                sha256: p.metadata.sha256.clone(),
            }),
            neural: doc.neural.as_ref().map(|p| NeuralInfo {
                model: p.model.clone(),
                tokens: p.tokens.len(),
                compression_ratio: p.compression_ratio,
            }),
        }
    }

    fn print_human(&self, path: &Path, file_size: u64) {
        println!("\n  ChordCraft Document Information");
        println!("  ============================================");
        println!("  File:     {} ({} bytes)", path.display(), file_size);
        println!("  BPM:      {}", self.bpm);
        println!("  Key:      {}", self.key);
        println!("  Time:     {}", self.time);
        if self.chords.is_empty() {
            println!("  Chords:   (none)");
        } else {
            println!("  Chords:   | {} |", self.chords.join(" | "));
        }
        println!("  Notes:    {} event(s)", self.notes);
        if self.note_diagnostics > 0 {
            println!("  Warnings: {} malformed PLAY line(s)", self.note_diagnostics);
        }
        match &self.lossless {
            Some(p) => {
                println!(
                    "  Lossless: {} {}Hz {}ch, {} chunk(s) of {} ({} bytes)",
                    p.format, p.sample_rate, p.channels, p.chunks, p.chunk_size, p.size_bytes
                );
                println!("  Digest:   {}", p.sha256);
            }
            None => println!("  Lossless: (none)"),
        }
        match &self.neural {
            Some(p) => println!(
                "  Neural:   {} ({} tokens, {:.2}x)",
                p.model,
                p.tokens,
                p.compression_ratio
            ),
            None => println!("  Neural:   (none)"),
        }
        println!();
    }
}

/// Display information about a document.
fn cmd_info(input: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read document: {}", input.display()))?;

    let doc = decode(&text)
        .with_context(|| format!("Failed to parse document: {}", input.display()))?;

    let info = DocumentInfo::from_document(&doc);
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        info.print_human(input, text.len() as u64);
    }

    Ok(())
}

// ──────────────────────── helper functions ─────────────────────────

/// Audio data read from a WAV file.
struct WavPayload {
    /// Interleaved f32 PCM samples.
    samples: Vec<f32>,
    /// Number of audio channels.
    channels: u8,
    /// Sample rate in Hz.
    sample_rate: u32,
    /// Total number of audio frames (samples per channel).
    sample_count: u64,
}

impl WavPayload {
    /// Duration of the audio in seconds.
    fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }
}

/// Read a WAV file and return the PCM samples as interleaved f32.
fn read_wav(path: &Path) -> Result<WavPayload> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Cannot open WAV file: {}", path.display()))?;

    let spec = reader.spec();
    let channels = spec.channels as u8;
    let sample_rate = spec.sample_rate;
    let sample_count = (reader.len() as u64) / spec.channels as u64;

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| {
                    let s = s.context("Failed to read WAV sample")?;
                    Ok(s as f32 / max_val)
                })
                .collect::<Result<Vec<f32>>>()?
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.context("Failed to read WAV sample"))
            .collect::<Result<Vec<f32>>>()?,
    };

    Ok(WavPayload {
        samples,
        channels,
        sample_rate,
        sample_count,
    })
}

/// Write an audio stream to a 16-bit integer WAV file.
fn write_wav(path: &Path, stream: &AudioStream) -> Result<()> {
    let spec = hound::WavSpec {
        channels: stream.channels() as u16,
        sample_rate: stream.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Cannot create WAV file: {}", path.display()))?;

    for &sample in stream.samples() {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32_767.0).round() as i16)?;
    }

    writer.finalize()?;
    Ok(())
}
