// src/audio/decoder.rs

use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer as PlanarBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{
    CodecType, DecoderOptions, CODEC_TYPE_NULL, CODEC_TYPE_PCM_F32BE, CODEC_TYPE_PCM_F32LE,
    CODEC_TYPE_PCM_F64BE, CODEC_TYPE_PCM_F64LE,
};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::{Sample, SampleFormat};

use crate::audio::types::{AudioBuffer, PcmEncoding};
use crate::error::{AudioError, Result};

/// Decodes an audio file to interleaved PCM samples in memory
///
/// Supports: MP3, FLAC, WAV, OGG Vorbis, AAC, and more via symphonia
///
/// # Example
/// ```no_run
/// use trim_audio_lib::audio::decode_audio_file;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = decode_audio_file("song.mp3")?;
/// println!("Loaded {} ms of audio", audio.duration_ms());
/// # Ok(())
/// # }
/// ```
pub fn decode_audio_file<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy().to_string();

    let file = File::open(path).map_err(|e| AudioError::FileOpen {
        path: path_str.clone(),
        source: e,
    })?;

    // Create a media source stream (buffered reader)
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let extension = extension_of(path);

    // Create a hint to help symphonia detect the format
    let mut hint = Hint::new();
    if !extension.is_empty() {
        hint.with_extension(&extension);
    }

    // Gapless mode drops encoder delay and padding, so a file written at the
    // limit reads back at the limit
    let format_opts = FormatOptions {
        enable_gapless: true,
        ..Default::default()
    };

    let detected = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &MetadataOptions::default())
        .map_err(|e| AudioError::DecodeFailed(format!("Failed to detect format: {}", e)))?;

    let mut format = detected.format;

    // Find the default audio track (skip video/subtitle tracks)
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::DecodeFailed("No audio track found in file".to_string()))?;

    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeFailed("Sample rate not found".to_string()))?;

    // Channel info may be missing from the container for some MP3s; the
    // first decoded packet fills it in
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);
    let mut encoding = declared_encoding(
        track.codec_params.codec,
        track.codec_params.sample_format,
        track.codec_params.bits_per_sample,
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeFailed(format!("Failed to create decoder: {}", e)))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            // Chained streams would need a new decoder; the first stream is the file's audio
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AudioError::DecodeFailed(format!("Failed to read packet: {}", e)))
            }
        };

        // Skip packets from other tracks (e.g., video, album art)
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) if is_recoverable(&e) => {
                // Skip decode errors (can happen with corrupted packets)
                tracing::warn!("Skipping bad packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(AudioError::DecodeFailed(format!("Decode error: {}", e))),
        };

        if channels.is_none() {
            channels = Some(decoded.spec().channels.count() as u16);
        }
        if encoding.is_none() {
            encoding = Some(encoding_of(&decoded));
        }

        append_interleaved(&decoded, &mut samples);
    }

    let channels = channels
        .ok_or_else(|| AudioError::DecodeFailed("Could not determine channel count".to_string()))?;

    let encoding = encoding.unwrap_or(PcmEncoding::Float);

    tracing::debug!(
        "Decoded {} ({} Hz, {} ch, {} samples)",
        path.display(),
        sample_rate,
        channels,
        samples.len()
    );

    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels,
        encoding,
        format: extension,
    })
}

/// A damaged packet costs that packet only; anything else ends the decode
fn is_recoverable(err: &SymphoniaError) -> bool {
    matches!(err, SymphoniaError::DecodeError(_))
}

/// Lowercase extension without the leading dot, empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default()
}

/// Encoding the container reports, which wins over the decoder's buffer type
/// (the PCM decoder may widen narrow integer depths into a 32-bit buffer)
fn declared_encoding(
    codec: CodecType,
    format: Option<SampleFormat>,
    bits: Option<u32>,
) -> Option<PcmEncoding> {
    const FLOAT_CODECS: [CodecType; 4] = [
        CODEC_TYPE_PCM_F32LE,
        CODEC_TYPE_PCM_F32BE,
        CODEC_TYPE_PCM_F64LE,
        CODEC_TYPE_PCM_F64BE,
    ];

    if FLOAT_CODECS.contains(&codec) {
        return Some(PcmEncoding::Float);
    }

    match (format, bits) {
        (Some(SampleFormat::F32 | SampleFormat::F64), _) => Some(PcmEncoding::Float),
        (_, Some(bits)) => Some(PcmEncoding::Int(bits as u16)),
        _ => None,
    }
}

fn encoding_of(buffer: &AudioBufferRef) -> PcmEncoding {
    match buffer {
        AudioBufferRef::F32(_) | AudioBufferRef::F64(_) => PcmEncoding::Float,
        AudioBufferRef::S8(_) | AudioBufferRef::U8(_) => PcmEncoding::Int(8),
        AudioBufferRef::S16(_) | AudioBufferRef::U16(_) => PcmEncoding::Int(16),
        AudioBufferRef::S24(_) | AudioBufferRef::U24(_) => PcmEncoding::Int(24),
        AudioBufferRef::S32(_) | AudioBufferRef::U32(_) => PcmEncoding::Int(32),
    }
}

/// Convert symphonia's planar AudioBufferRef to interleaved f32
///
/// Integer formats are scaled into [-1.0, 1.0] by their full-scale value so
/// that the WAV encoder can restore them exactly.
fn append_interleaved(buffer: &AudioBufferRef, output: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::F32(buf) => interleave(&**buf, output, |s| s),
        AudioBufferRef::F64(buf) => interleave(&**buf, output, |s| s as f32),
        AudioBufferRef::S8(buf) => interleave(&**buf, output, |s| s as f32 / 128.0),
        AudioBufferRef::S16(buf) => interleave(&**buf, output, |s| s as f32 / 32768.0),
        AudioBufferRef::S24(buf) => {
            interleave(&**buf, output, |s| s.inner() as f32 / 8388608.0)
        }
        AudioBufferRef::S32(buf) => {
            interleave(&**buf, output, |s| (s as f64 / 2147483648.0) as f32)
        }
        AudioBufferRef::U8(buf) => interleave(&**buf, output, |s| (s as f32 - 128.0) / 128.0),
        AudioBufferRef::U16(buf) => {
            interleave(&**buf, output, |s| (s as f32 - 32768.0) / 32768.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave(&**buf, output, |s| (s.inner() as f32 - 8388608.0) / 8388608.0)
        }
        AudioBufferRef::U32(buf) => interleave(&**buf, output, |s| {
            ((s as f64 - 2147483648.0) / 2147483648.0) as f32
        }),
    }
}

fn interleave<S, F>(buffer: &PlanarBuffer<S>, output: &mut Vec<f32>, convert: F)
where
    S: Sample,
    F: Fn(S) -> f32,
{
    let planes = buffer.planes();
    let planes = planes.planes();

    output.reserve(buffer.frames() * planes.len());
    for frame in 0..buffer.frames() {
        for plane in planes {
            output.push(convert(plane[frame]));
        }
    }
}
