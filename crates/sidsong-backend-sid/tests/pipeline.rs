//! End-to-end pipeline tests: source generation, assembler invocation and
//! PSID packaging.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sidsong_backend_sid::psid::{package, PSID_HEADER_SIZE};
use sidsong_backend_sid::{generate, AssemblerConfig, CompiledSong, PsidHeader, SidError};
use sidsong_spec::{validate_song, Song, SongMetadata};
use std::path::{Path, PathBuf};

const HEADER_PREFIX: [u8; 0x16] = [
    0x50, 0x53, 0x49, 0x44, 0x00, 0x02, 0x00, 0x76, 0x00, 0x00, 0x10, 0x00, 0x10, 0x03, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
];

// =============================================================================
// Helper Functions
// =============================================================================

fn voice(role: &str, waveform: &str, step: Value) -> Value {
    json!({
        "role": role,
        "waveform": waveform,
        "adsr": {"attack": 0, "decay": 9, "sustain": 0, "release": 0},
        "filter": {"type": "NONE", "cutoff": 0, "resonance": 0},
        "pattern": vec![step; 64],
    })
}

/// Middle C quarters on the lead, rests elsewhere.
fn scenario_doc() -> Value {
    let rest = json!({"note": "REST", "octave": 0, "duration": 4});
    json!({
        "bpm": 120,
        "key": "C",
        "scale": "major",
        "voices": [
            voice("LEAD", "TRI", json!({"note": "C", "octave": 4, "duration": 4})),
            voice("BASS", "SAW", rest.clone()),
            voice("ARP_OR_DRUMS", "NOISE", rest),
        ],
    })
}

fn scenario_song() -> Song {
    validate_song(&scenario_doc()).unwrap()
}

fn missing_assembler(dir: &Path) -> AssemblerConfig {
    AssemblerConfig::default().assembler_path(dir.join("no-such-acme"))
}

/// Entry `index` of a labelled `!byte` table in rendered source.
fn table_entry(source: &str, label: &str, index: usize) -> String {
    let body = source.split(&format!("\n{}\n", label)).nth(1).unwrap();
    body.lines()
        .take_while(|line| line.trim_start().starts_with("!byte "))
        .flat_map(|line| line.trim_start().trim_start_matches("!byte ").split(", "))
        .nth(index)
        .unwrap()
        .to_string()
}

#[cfg(unix)]
fn stub_assembler(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("acme-stub.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// =============================================================================
// Header
// =============================================================================

#[test]
fn test_header_prefix_is_fixed() {
    let image = [0x00, 0x10, 0x4c, 0x09, 0x10];
    for metadata in [
        SongMetadata {
            title: "",
            author: "",
            released: "",
        },
        SongMetadata {
            title: "Dungeon Crawl",
            author: "Somebody With A Very Long Name Indeed",
            released: "1989",
        },
    ] {
        let sid = package(&image, metadata);
        assert_eq!(&sid[..0x16], &HEADER_PREFIX);
        assert_eq!(&sid[PSID_HEADER_SIZE as usize..], &image);
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_missing_assembler_writes_sources_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("theme.asm");

    let result = generate(&scenario_song(), &output, &missing_assembler(dir.path())).unwrap();

    assert!(result.packaged.is_none());
    assert!(!dir.path().join("theme.sid").exists());
    assert!(!dir.path().join("theme_sid.prg").exists());
    assert_eq!(result.written().len(), 2);
    let standalone = std::fs::read_to_string(&output).unwrap();
    let library = std::fs::read_to_string(dir.path().join("theme_sid.asm")).unwrap();
    assert!(standalone.contains("* = $0801"));
    assert!(library.contains("* = $1000"));
    assert!(library.contains("\nplay\n"));
}

#[test]
fn test_stale_artifacts_are_removed() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("theme.asm");
    std::fs::write(dir.path().join("theme.sid"), b"old").unwrap();
    std::fs::write(dir.path().join("theme_sid.prg"), b"old").unwrap();

    let result = generate(&scenario_song(), &output, &missing_assembler(dir.path())).unwrap();

    assert!(result.packaged.is_none());
    assert!(!dir.path().join("theme.sid").exists());
    assert!(!dir.path().join("theme_sid.prg").exists());
    assert!(output.exists());
}

#[test]
fn test_sid_output_path_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("theme.sid");

    let err = generate(&scenario_song(), &output, &missing_assembler(dir.path())).unwrap_err();

    assert!(matches!(err, SidError::OutputConflict { .. }));
    assert!(!output.exists());
    assert!(!dir.path().join("theme_sid.asm").exists());
}

#[test]
fn test_scenario_middle_c_at_step_zero() {
    let compiled = CompiledSong::compile(&scenario_song());
    assert_eq!(compiled.frequency_at(0, 0), Some(4455));

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("scenario.asm");
    generate(&scenario_song(), &output, &missing_assembler(dir.path())).unwrap();

    // octave_offset[4] + C = 24 in both halves of the frequency table
    let library = std::fs::read_to_string(dir.path().join("scenario_sid.asm")).unwrap();
    assert_eq!(table_entry(&library, "freq_lo", 24), "$67");
    assert_eq!(table_entry(&library, "freq_hi", 24), "$11");
}

#[cfg(unix)]
#[test]
fn test_end_to_end_with_stub_assembler() {
    let dir = tempfile::tempdir().unwrap();
    // args: --format cbm --outfile <prg> <asm>
    let stub = stub_assembler(dir.path(), r#"printf '\000\020\114\011\020' > "$4""#);
    let output = dir.path().join("theme.asm");
    let config = AssemblerConfig::default().assembler_path(&stub);

    let result = generate(&scenario_song(), &output, &config).unwrap();

    let packaged = result.packaged.as_ref().unwrap();
    assert_eq!(packaged.path, dir.path().join("theme.sid"));
    let sid = std::fs::read(&packaged.path).unwrap();
    assert_eq!(packaged.size, sid.len());
    assert_eq!(packaged.hash, blake3::hash(&sid).to_hex().to_string());

    let header = PsidHeader::from_bytes(&sid).unwrap();
    assert_eq!(header.play_address, 0x1003);
    assert_eq!(header.init_address, 0x1000);
    assert_eq!(&sid[..0x16], &HEADER_PREFIX);
    assert_eq!(&sid[0x76..], &[0x00, 0x10, 0x4c, 0x09, 0x10]);
    assert_eq!(result.written().len(), 4);
}

#[cfg(unix)]
#[test]
fn test_assembler_failure_keeps_sources() {
    let dir = tempfile::tempdir().unwrap();
    let stub = stub_assembler(dir.path(), "echo 'Error - Symbol not defined' >&2\nexit 3");
    let output = dir.path().join("broken.asm");
    let config = AssemblerConfig::default().assembler_path(&stub);

    let err = generate(&scenario_song(), &output, &config).unwrap_err();

    match err {
        SidError::AssemblerFailed { exit_code, stderr } => {
            assert_eq!(exit_code, 3);
            assert!(stderr.contains("Symbol not defined"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(output.exists());
    assert!(dir.path().join("broken_sid.asm").exists());
    assert!(!dir.path().join("broken.sid").exists());
}

#[cfg(unix)]
#[test]
fn test_assembler_failure_removes_previous_sid() {
    let dir = tempfile::tempdir().unwrap();
    let good = stub_assembler(dir.path(), r#"printf '\000\020\140' > "$4""#);
    let output = dir.path().join("theme.asm");
    let sid = dir.path().join("theme.sid");

    generate(&scenario_song(), &output, &AssemblerConfig::default().assembler_path(&good))
        .unwrap();
    assert!(sid.exists());

    let bad = stub_assembler(dir.path(), "exit 1");
    let err = generate(&scenario_song(), &output, &AssemblerConfig::default().assembler_path(&bad))
        .unwrap_err();

    assert!(matches!(err, SidError::AssemblerFailed { exit_code: 1, .. }));
    assert!(!sid.exists());
    assert!(!dir.path().join("theme_sid.prg").exists());
}
