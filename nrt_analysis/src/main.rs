// CLI entry point for Neo-Riemannian progression analysis.
//
// Every subcommand builds a triad progression (or a single searched or
// replayed pair), analyses it with `ProgressionReport`, and prints the report as text or
// JSON. Optionally the traced chords are written to a MIDI file.
//
// Usage:
//   nrt [--config FILE] [--json] [--midi-out FILE] [-v] <COMMAND>
//     pair "C major" "E minor"            shortest path between two chords
//     progression "C major | A minor"     every adjacent pair of a progression
//     trace "C major" R L P               replay an explicit operator sequence
//     voicings "60 64 67 | 57 60 64"      identify triads from pitch groups
//     events notes.txt                    identify triads from an on/off log
//                                         ("-" reads standard input)
//
// Logging goes to stderr; RUST_LOG overrides the -v level.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use nrt_analysis::config::AnalysisConfig;
use nrt_analysis::midi::write_progression_midi;
use nrt_analysis::progression::{PairAnalysis, ProgressionReport, parse_progression};
use nrt_analysis::voicing::{
    TriadIdentifier, parse_events, parse_voicings, progression_from_events,
    progression_from_voicings,
};
use nrt_core::{Operator, Triad};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nrt", version, about = "Explain chord changes as P, R and L transformations")]
struct Cli {
    /// JSON file with analysis settings.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Also write the traced chords to a MIDI file.
    #[arg(long, global = true, value_name = "FILE")]
    midi_out: Option<PathBuf>,

    /// More logging (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Shortest transformation between two chords.
    Pair { start: String, end: String },
    /// Transform each adjacent pair of a separator-delimited progression.
    Progression { progression: String },
    /// Replay operators (P, R, L) from a starting chord.
    Trace {
        start: String,
        operators: Vec<String>,
    },
    /// Identify triads from MIDI pitch groups, then analyse them.
    Voicings { voicings: String },
    /// Identify triads from a note-event log, then analyse them.
    Events { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let report = build_report(&cli.command, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.pairs.is_empty() {
        println!("No chord pairs to analyse.");
    } else {
        print!("{}", report.render_text());
    }

    if let Some(path) = &cli.midi_out {
        let triads = report.traced_triads();
        write_progression_midi(&triads, &config.midi, path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(chords = triads.len(), path = %path.display(), "wrote MIDI");
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_report(command: &Command, config: &AnalysisConfig) -> Result<ProgressionReport> {
    let report = match command {
        Command::Pair { start, end } => ProgressionReport::from_pair(PairAnalysis::search(
            parse_chord(start)?,
            parse_chord(end)?,
        )),
        Command::Progression { progression } => {
            let chords = parse_progression(progression, &config.separator)
                .context("parsing progression")?;
            info!(chords = chords.len(), "parsed progression");
            ProgressionReport::analyze(chords, config)
        }
        Command::Trace { start, operators } => {
            let start = parse_chord(start)?;
            let path = operators
                .iter()
                .map(|op| op.parse::<Operator>())
                .collect::<Result<Vec<_>, _>>()
                .context("parsing operators")?;
            ProgressionReport::from_pair(PairAnalysis::replay(start, path))
        }
        Command::Voicings { voicings } => {
            let groups =
                parse_voicings(voicings, &config.separator).context("parsing voicings")?;
            let chords =
                progression_from_voicings(&groups, &TriadIdentifier, config.collapse_repeats);
            info!(groups = groups.len(), chords = chords.len(), "identified voicings");
            ProgressionReport::analyze(chords, config)
        }
        Command::Events { input } => {
            let text = read_input(input)?;
            let events = parse_events(&text)
                .with_context(|| format!("parsing note events from {}", input.display()))?;
            let chords =
                progression_from_events(&events, &TriadIdentifier, config.collapse_repeats);
            info!(events = events.len(), chords = chords.len(), "identified note events");
            ProgressionReport::analyze(chords, config)
        }
    };
    Ok(report)
}

fn parse_chord(text: &str) -> Result<Triad> {
    text.parse::<Triad>()
        .with_context(|| format!("parsing chord {text:?}"))
}

/// Read a file, or standard input for "-".
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("reading standard input")
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}
