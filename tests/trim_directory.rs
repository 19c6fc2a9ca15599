//! End-to-end runs of the directory pipeline on generated WAV files

use std::fs;
use std::path::Path;
use std::process::Command;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use trim_audio_lib::{
    encode_audio, process_directory, AudioBuffer, AudioError, EncoderConfig, FileReport, Outcome,
    OutputMode, PcmEncoding, TrimConfig, TrimPolicy,
};

const SAMPLE_RATE: u32 = 1000;

/// Write a 16-bit WAV with a recognisable sample pattern
fn write_wav(path: &Path, duration_ms: u64, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let frames = duration_ms * SAMPLE_RATE as u64 / 1000;
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as u64 {
        writer.write_sample(pattern(i)).unwrap();
    }
    writer.finalize().unwrap();
}

fn pattern(i: u64) -> i16 {
    ((i * 37) % 65536) as u16 as i16
}

fn read_samples(path: &Path) -> (WavSpec, Vec<i16>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

fn wav_duration_ms(path: &Path) -> u64 {
    let reader = WavReader::open(path).unwrap();
    reader.duration() as u64 * 1000 / reader.spec().sample_rate as u64
}

fn run(dir: &Path, mode: OutputMode, config: &TrimConfig) -> Vec<String> {
    let mut lines = Vec::new();
    process_directory(dir, mode, config, |report: &FileReport| {
        lines.push(report.to_string())
    })
    .unwrap();
    lines.sort();
    lines
}

#[test]
fn test_overwrite_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.wav");
    let b = dir.path().join("b.wav");
    write_wav(&a, 180_000, 1);
    write_wav(&b, 90_000, 1);
    let b_before = fs::read(&b).unwrap();

    let lines = run(dir.path(), OutputMode::Overwrite, &TrimConfig::default());

    assert_eq!(
        lines,
        vec![
            "Skipped 'b.wav' (duration 1:30 is under the limit).",
            "Trimmed 'a.wav' from 3:00 to 2:32.",
        ]
    );
    assert_eq!(wav_duration_ms(&a), 152_000);
    assert_eq!(fs::read(&b).unwrap(), b_before);
}

#[test]
fn test_trimmed_output_keeps_prefix_and_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    write_wav(&path, 4_000, 2);
    let (spec_before, before) = read_samples(&path);

    let config = TrimConfig {
        policy: TrimPolicy::new(2_500),
        ..TrimConfig::default()
    };
    run(dir.path(), OutputMode::Overwrite, &config);

    let (spec_after, after) = read_samples(&path);
    assert_eq!(spec_after, spec_before);
    assert_eq!(after.len(), 2_500 * 2);
    assert_eq!(after[..], before[..after.len()]);
}

#[test]
fn test_32_bit_wav_keeps_exact_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.wav");
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Int,
    };
    let original: Vec<i32> = (0..3000).map(|i| 123_456_789 + i).collect();
    let mut writer = WavWriter::create(&path, spec).unwrap();
    for &sample in &original {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    let config = TrimConfig {
        policy: TrimPolicy::new(1_000),
        ..TrimConfig::default()
    };
    let lines = run(dir.path(), OutputMode::Overwrite, &config);

    assert_eq!(lines, vec!["Trimmed 'deep.wav' from 0:03 to 0:01."]);
    let mut reader = WavReader::open(&path).unwrap();
    assert_eq!(reader.spec(), spec);
    let kept: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
    assert_eq!(kept[..], original[..1000]);
}

#[test]
fn test_copy_mode_leaves_original() {
    let dir = tempfile::tempdir().unwrap();
    let song = dir.path().join("song.wav");
    write_wav(&song, 3_000, 1);
    let original = fs::read(&song).unwrap();

    let config = TrimConfig {
        policy: TrimPolicy::new(1_000),
        ..TrimConfig::default()
    };
    let lines = run(dir.path(), OutputMode::Copy, &config);

    assert_eq!(lines, vec!["Trimmed 'song.wav' from 0:03 to 0:01."]);
    assert_eq!(fs::read(&song).unwrap(), original);
    assert_eq!(wav_duration_ms(&dir.path().join("song_trimmed.wav")), 1_000);
}

#[test]
fn test_copy_mode_does_not_copy_short_files() {
    let dir = tempfile::tempdir().unwrap();
    write_wav(&dir.path().join("short.wav"), 500, 1);

    let config = TrimConfig {
        policy: TrimPolicy::new(1_000),
        ..TrimConfig::default()
    };
    run(dir.path(), OutputMode::Copy, &config);

    assert!(!dir.path().join("short_trimmed.wav").exists());
}

#[test]
fn test_second_run_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loop.wav");
    write_wav(&path, 5_000, 2);
    let config = TrimConfig {
        policy: TrimPolicy::new(2_000),
        ..TrimConfig::default()
    };

    run(dir.path(), OutputMode::Overwrite, &config);
    let after_first = fs::read(&path).unwrap();

    let mut outcomes = Vec::new();
    let summary = process_directory(dir.path(), OutputMode::Overwrite, &config, |report| {
        outcomes.push(report.result.as_ref().ok().copied())
    })
    .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(outcomes, vec![Some(Outcome::Skipped { duration_ms: 2_000 })]);
    assert_eq!(fs::read(&path).unwrap(), after_first);
}

#[test]
fn test_bad_file_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.mp3"), b"not audio at all").unwrap();
    write_wav(&dir.path().join("good.wav"), 3_000, 1);
    fs::write(dir.path().join("notes.txt"), b"keep me").unwrap();

    let config = TrimConfig {
        policy: TrimPolicy::new(1_000),
        ..TrimConfig::default()
    };
    let mut lines = Vec::new();
    let summary = process_directory(dir.path(), OutputMode::Overwrite, &config, |report| {
        lines.push(report.to_string())
    })
    .unwrap();

    assert_eq!(summary.trimmed, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 2);
    assert!(lines
        .iter()
        .any(|line| line.starts_with("Error processing 'broken.mp3': ")));
    assert!(!lines.iter().any(|line| line.contains("notes.txt")));
    assert_eq!(fs::read(dir.path().join("notes.txt")).unwrap(), b"keep me");
}

#[test]
fn test_invalid_directory_touches_nothing() {
    let mut calls = 0;
    let result = process_directory(
        "/does/not/exist",
        OutputMode::Overwrite,
        &TrimConfig::default(),
        |_| calls += 1,
    );

    assert!(matches!(result, Err(AudioError::InvalidDirectory(_))));
    assert_eq!(calls, 0);
    assert_eq!(
        result.unwrap_err().to_string(),
        "The directory '/does/not/exist' does not exist or is not a directory."
    );
}

fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

#[test]
fn test_trimmed_mp3_is_skipped_on_second_run() {
    if !ffmpeg_available() {
        eprintln!("ffmpeg not found on PATH, skipping mp3 test");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.mp3");
    // 5 seconds of a 440Hz tone, stereo
    let samples = (0..44_100 * 5)
        .flat_map(|i| {
            let v = (i as f32 * 440.0 * std::f32::consts::TAU / 44_100.0).sin() * 0.5;
            [v, v]
        })
        .collect();
    let audio = AudioBuffer {
        samples,
        sample_rate: 44_100,
        channels: 2,
        encoding: PcmEncoding::Float,
        format: "wav".to_string(),
    };
    if let Err(e) = encode_audio(&audio, &path, &EncoderConfig::default()) {
        eprintln!("ffmpeg cannot write mp3 ({}), skipping mp3 test", e);
        return;
    }

    let config = TrimConfig {
        policy: TrimPolicy::new(2_000),
        ..TrimConfig::default()
    };
    let outcomes = |dir: &Path| {
        let mut outcomes = Vec::new();
        process_directory(dir, OutputMode::Overwrite, &config, |report| {
            outcomes.push(report.result.as_ref().ok().copied())
        })
        .unwrap();
        outcomes
    };

    assert!(matches!(
        outcomes(dir.path()).as_slice(),
        [Some(Outcome::Trimmed { .. })]
    ));
    let after_first = fs::read(&path).unwrap();

    assert!(matches!(
        outcomes(dir.path()).as_slice(),
        [Some(Outcome::Skipped { duration_ms })] if *duration_ms <= 2_000
    ));
    assert_eq!(fs::read(&path).unwrap(), after_first);
}
