// End-to-end test of the analysis pipeline.
//
// Drives each input shape (progression text, pitch groups, note-event log)
// through identification, pairwise PRL analysis, text and JSON rendering,
// and MIDI export, using a config file loaded from disk the way the CLI does.

use nrt_analysis::config::AnalysisConfig;
use nrt_analysis::midi::write_progression_midi;
use nrt_analysis::progression::{PairAnalysis, ProgressionReport, parse_progression};
use nrt_analysis::voicing::{
    TriadIdentifier, parse_events, parse_voicings, progression_from_events,
    progression_from_voicings,
};
use nrt_core::Operator::{L, P, R};
use nrt_core::Triad;

fn summaries(report: &ProgressionReport) -> Vec<String> {
    report.pairs.iter().map(PairAnalysis::summary).collect()
}

#[test]
fn progression_text_to_report() {
    let config = AnalysisConfig::default();
    let chords = parse_progression("C major | A minor | A major | F# minor", &config.separator)
        .unwrap();
    let report = ProgressionReport::analyze(chords, &config);

    assert_eq!(
        summaries(&report),
        vec![
            "C major -> A minor: R",
            "A minor -> A major: P",
            "A major -> F# minor: R",
        ]
    );
    assert!(report.render_text().contains("  A major | F# minor\n"));
}

#[test]
fn report_json_roundtrip() {
    let config = AnalysisConfig::default();
    let chords = parse_progression("C major | G major", &config.separator).unwrap();
    let report = ProgressionReport::analyze(chords, &config);

    let json = serde_json::to_string(&report).unwrap();
    let restored: ProgressionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, report);
    assert_eq!(restored.pairs[0].path, Some(vec![L, R]));

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["pairs"][0]["path"], serde_json::json!(["L", "R"]));
    assert_eq!(value["chords"][1]["quality"], "major");
}

#[test]
fn voicings_and_events_agree() {
    let config = AnalysisConfig::default();

    let groups = parse_voicings("60 64 67 | 60 63 67 | 56 60 63", &config.separator).unwrap();
    let from_voicings = progression_from_voicings(&groups, &TriadIdentifier, true);

    let events = parse_events(
        "on 60\non 64\non 67\n\
         off 64\non 63\n\
         off 67\non 56\n\
         off 56\noff 60\noff 63\n",
    )
    .unwrap();
    let from_events = progression_from_events(&events, &TriadIdentifier, true);

    let expected = vec![Triad::major(0), Triad::minor(0), Triad::major(8)];
    assert_eq!(from_voicings, expected);
    assert_eq!(from_events, expected);

    let report = ProgressionReport::analyze(from_events, &config);
    assert_eq!(report.pairs[0].path, Some(vec![P]));
    assert_eq!(report.pairs[1].path, Some(vec![L]));
}

#[test]
fn config_file_drives_analysis_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("nrt.json");
    std::fs::write(
        &config_path,
        r#"{ "separator": ";", "skip_unchanged": true, "midi": { "tempo_bpm": 120 } }"#,
    )
    .unwrap();
    let config = AnalysisConfig::load(&config_path).unwrap();

    let chords = parse_progression("C major; C major; E minor", &config.separator).unwrap();
    let report = ProgressionReport::analyze(chords, &config);
    assert_eq!(summaries(&report), vec!["C major -> E minor: L"]);

    let midi_path = dir.path().join("out.mid");
    write_progression_midi(&report.traced_triads(), &config.midi, &midi_path).unwrap();
    let bytes = std::fs::read(&midi_path).unwrap();
    assert_eq!(&bytes[..4], b"MThd");
}

#[test]
fn replayed_trace_lands_on_composed_triad() {
    let report = ProgressionReport::from_pair(PairAnalysis::replay(
        Triad::major(0),
        vec![R, L, P],
    ));
    assert_eq!(report.pairs[0].chords, vec!["C major", "A minor", "F major", "F minor"]);
    assert_eq!(report.chords[1], Triad::minor(5));
}

#[test]
fn explicit_pair_reports_no_change_even_when_skipping() {
    let config = AnalysisConfig {
        skip_unchanged: true,
        ..AnalysisConfig::default()
    };
    let chords = parse_progression("C major | C major", &config.separator).unwrap();
    assert!(ProgressionReport::analyze(chords, &config).pairs.is_empty());

    let report = ProgressionReport::from_pair(PairAnalysis::search(
        Triad::major(0),
        Triad::major(0),
    ));
    assert_eq!(summaries(&report), vec!["C major -> C major: no change"]);
    assert_eq!(report.traced_triads(), vec![Triad::major(0)]);
}
