//! End-to-end tests for scanning files on disk.

use std::fs;
use std::path::Path;

use av1::{ObuType, write_obu};
use dvstrip_engine::{ScanConfig, ScanError, scan_file};
use tempfile::tempdir;

/// A small stream and the same stream without its Dolby Vision OBUs.
struct Fixture {
    stream: Vec<u8>,
    stripped: Vec<u8>,
    dolby_vision_obus: u64,
    obus: u64,
}

impl Fixture {
    fn new() -> Self {
        Self {
            stream: Vec::new(),
            stripped: Vec::new(),
            dolby_vision_obus: 0,
            obus: 0,
        }
    }

    fn keep(mut self, obu_type: ObuType, payload: &[u8]) -> Self {
        write_obu(&mut self.stream, obu_type, None, payload).unwrap();
        write_obu(&mut self.stripped, obu_type, None, payload).unwrap();
        self.obus += 1;
        self
    }

    fn dolby_vision(mut self, rpu_len: usize) -> Self {
        let mut payload = vec![0x04, 0xB5, 0x00, 0x3B];
        payload.extend((0..rpu_len).map(|i| i as u8));
        write_obu(&mut self.stream, ObuType::Metadata, None, &payload).unwrap();
        self.dolby_vision_obus += 1;
        self.obus += 1;
        self
    }

    /// Temporal units of delimiter, optional RPU, HDR10+ metadata and a frame.
    fn temporal_units(count: usize, with_dolby_vision: bool) -> Self {
        let mut fixture =
            Self::new().keep(ObuType::SequenceHeader, &[0x00, 0x00, 0x00, 0x6A, 0xEF, 0xBF]);
        for i in 0..count {
            fixture = fixture.keep(ObuType::TemporalDelimiter, &[]);
            if with_dolby_vision {
                fixture = fixture.dolby_vision(40 + i % 7);
            }
            fixture = fixture
                .keep(ObuType::Metadata, &[0x04, 0xB5, 0x00, 0x3C, 0x00, 0x01, 0x04, 0x01])
                .keep(ObuType::Frame, &vec![i as u8; 100 + (i * 37) % 400]);
        }
        fixture
    }
}

fn no_progress(_: &dvstrip_engine::ScanProgress) {}

#[test]
fn test_strip_dolby_vision_from_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    let output = dir.path().join("output.obu");
    let fixture = Fixture::temporal_units(50, true);
    fs::write(&input, &fixture.stream).unwrap();

    let config = ScanConfig::default().with_chunk_size(1024);
    let stats = scan_file(&input, Some(&output), &config, no_progress).unwrap();

    assert_eq!(stats.obus, fixture.obus);
    assert_eq!(stats.dolby_vision_obus, fixture.dolby_vision_obus);
    assert_eq!(stats.bytes_consumed, fixture.stream.len() as u64);
    assert_eq!(stats.bytes_written + stats.bytes_dropped, stats.bytes_consumed);

    let written = fs::read(&output).unwrap();
    assert_eq!(written, fixture.stripped);
    assert_eq!(written.len() as u64, stats.bytes_written);
}

#[test]
fn test_stream_without_dolby_vision_is_copied_verbatim() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    let output = dir.path().join("output.obu");
    let fixture = Fixture::temporal_units(20, false);
    fs::write(&input, &fixture.stream).unwrap();

    let stats = scan_file(
        &input,
        Some(&output),
        &ScanConfig::default().with_chunk_size(600),
        no_progress,
    )
    .unwrap();

    assert_eq!(stats.dolby_vision_obus, 0);
    assert_eq!(stats.bytes_dropped, 0);
    assert_eq!(fs::read(&output).unwrap(), fixture.stream);
}

#[test]
fn test_stripping_is_idempotent() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    let once = dir.path().join("once.obu");
    let twice = dir.path().join("twice.obu");
    fs::write(&input, Fixture::temporal_units(30, true).stream).unwrap();

    let config = ScanConfig::default().with_chunk_size(2048);
    let first = scan_file(&input, Some(&once), &config, no_progress).unwrap();
    let second = scan_file(&once, Some(&twice), &config, no_progress).unwrap();

    assert_eq!(first.dolby_vision_obus, 30);
    assert_eq!(second.dolby_vision_obus, 0);
    assert_eq!(second.obus, first.obus - first.dolby_vision_obus);
    assert_eq!(fs::read(&once).unwrap(), fs::read(&twice).unwrap());
}

#[test]
fn test_count_only_leaves_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    fs::write(&input, Fixture::temporal_units(10, true).stream).unwrap();

    let stats = scan_file(&input, None, &ScanConfig::default(), no_progress).unwrap();
    assert_eq!(stats.dolby_vision_obus, 10);
    assert_eq!(stats.bytes_written, 0);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_only_dolby_vision_gives_empty_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    let output = dir.path().join("output.obu");
    let fixture = Fixture::new().dolby_vision(10).dolby_vision(200).dolby_vision(0);
    fs::write(&input, &fixture.stream).unwrap();

    let stats = scan_file(&input, Some(&output), &ScanConfig::default(), no_progress).unwrap();
    assert_eq!(stats.obus, 3);
    assert_eq!(stats.dolby_vision_obus, 3);
    assert!(fs::read(&output).unwrap().is_empty());
}

#[test]
fn test_empty_input_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.obu");
    let output = dir.path().join("output.obu");
    fs::write(&input, b"").unwrap();

    let stats = scan_file(&input, Some(&output), &ScanConfig::default(), no_progress).unwrap();
    assert_eq!(stats.obus, 0);
    assert!(fs::read(&output).unwrap().is_empty());
}

#[test]
fn test_chunk_too_small_for_largest_obu() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    fs::write(&input, Fixture::temporal_units(5, true).stream).unwrap();

    let err = scan_file(
        &input,
        None,
        &ScanConfig::default().with_chunk_size(128),
        no_progress,
    )
    .unwrap_err();
    assert!(err.is_chunk_size_related(), "{err}");
}

#[test]
fn test_truncated_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    let mut stream = Fixture::temporal_units(5, true).stream;
    stream.truncate(stream.len() - 3);
    fs::write(&input, &stream).unwrap();

    let err = scan_file(&input, None, &ScanConfig::default(), no_progress).unwrap_err();
    assert!(matches!(err, ScanError::Truncated { available, .. } if available < 500));
}

#[test]
fn test_missing_input() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.obu");

    let err = scan_file(&missing, None, &ScanConfig::default(), no_progress).unwrap_err();
    match err {
        ScanError::Open { path, .. } => assert_eq!(path, missing),
        other => panic!("expected open error, got {other:?}"),
    }
}

#[test]
fn test_output_must_differ_from_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.obu");
    let fixture = Fixture::temporal_units(3, true);
    fs::write(&input, &fixture.stream).unwrap();

    let err = scan_file(&input, Some(&input), &ScanConfig::default(), no_progress).unwrap_err();
    assert!(matches!(err, ScanError::InvalidConfig(_)));
    // the input must not have been truncated
    assert_eq!(fs::read(&input).unwrap(), fixture.stream);
}

#[test]
fn test_zero_chunk_size_rejected() {
    let err = scan_file(
        Path::new("unused.obu"),
        None,
        &ScanConfig::default().with_chunk_size(0),
        no_progress,
    )
    .unwrap_err();
    assert!(matches!(err, ScanError::InvalidConfig(_)));
}
