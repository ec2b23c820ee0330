use super::audio_types::{
    AudioFormat, ContainerInfo, EncodedContainer, NormalizedAudioBuffer, BITS_PER_SAMPLE,
    WAV_HEADER_LEN,
};

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("Malformed base64 audio payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Invalid audio format: {sample_rate} Hz, {channels} channel(s)")]
    InvalidFormat { sample_rate: u32, channels: u16 },

    #[error("Audio too large for a WAV container: {0} data bytes")]
    ContainerTooLarge(usize),

    #[error("Malformed WAV container: {0}")]
    MalformedContainer(String),
}

/// Standard alphabet with complete `=` padding. Stray trailing bits are
/// ignored, as browsers do in `atob`.
const PADDED_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical)
        .with_decode_allow_trailing_bits(true),
);

/// Same alphabet with the padding left off entirely.
const UNPADDED_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a base64 audio payload, ignoring any whitespace and line breaks
/// the transport may have inserted.
///
/// Padding is either complete or absent; a partial run such as `"YQ="` is
/// an error.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, AudioError> {
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let engine = if cleaned.ends_with('=') {
        &PADDED_BASE64
    } else {
        &UNPADDED_BASE64
    };
    Ok(engine.decode(cleaned.as_bytes())?)
}

/// Interpret `bytes` as interleaved signed 16-bit little-endian PCM.
///
/// Trailing bytes that cannot fill a whole frame are dropped and a sample
/// slot with fewer than two bytes left reads as silence, so truncated
/// payloads never fail the decode.
pub fn decode_pcm(bytes: &[u8], format: AudioFormat) -> Result<NormalizedAudioBuffer, AudioError> {
    if !format.is_valid() {
        return Err(AudioError::InvalidFormat {
            sample_rate: format.sample_rate,
            channels: format.channels,
        });
    }

    let channel_count = usize::from(format.channels);
    let sample_count = bytes.len() / (2 * channel_count);

    let channels = (0..channel_count)
        .map(|channel| {
            (0..sample_count)
                .map(|i| {
                    let offset = (i * channel_count + channel) * 2;
                    match bytes.get(offset..offset + 2) {
                        Some(&[lo, hi]) => f32::from(i16::from_le_bytes([lo, hi])) / 32768.0,
                        _ => 0.0,
                    }
                })
                .collect()
        })
        .collect();

    Ok(NormalizedAudioBuffer::from_parts_unchecked(
        channels,
        format.sample_rate,
    ))
}

/// Scale a normalized sample back to i16: 32768 below zero, 32767 at or
/// above it, truncating toward zero. Not symmetric with `decode_pcm` for
/// positive values; output must stay byte-identical to existing files.
fn quantize(sample: f32) -> i16 {
    let v = f64::from(sample).clamp(-1.0, 1.0);
    let scaled = if v < 0.0 { v * 32768.0 } else { v * 32767.0 };
    // `as` truncates toward zero; NaN becomes 0
    scaled as i16
}

/// Serialize a buffer as a canonical 44-byte-header PCM WAV file.
pub fn encode_wav(buffer: &NormalizedAudioBuffer) -> Result<EncodedContainer, AudioError> {
    let format = buffer.format();
    if !format.is_valid() {
        return Err(AudioError::InvalidFormat {
            sample_rate: format.sample_rate,
            channels: format.channels,
        });
    }

    let sample_count = buffer.sample_count();
    let data_len = sample_count * usize::from(format.block_align());
    let data_len_u32 = u32::try_from(data_len)
        .ok()
        .filter(|len| *len <= u32::MAX - 36)
        .ok_or(AudioError::ContainerTooLarge(data_len))?;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_len);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len_u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len_u32.to_le_bytes());

    let channels = buffer.channels();
    for i in 0..sample_count {
        for channel in channels {
            wav.extend_from_slice(&quantize(channel[i]).to_le_bytes());
        }
    }

    Ok(EncodedContainer::new(wav, format, sample_count))
}

/// Base64 payload in, playable WAV out.
pub fn synthesize_container(
    encoded: &str,
    format: AudioFormat,
) -> Result<EncodedContainer, AudioError> {
    let raw = decode_base64(encoded)?;
    let buffer = decode_pcm(&raw, format)?;
    encode_wav(&buffer)
}

fn open_container(bytes: &[u8]) -> Result<hound::WavReader<Cursor<&[u8]>>, AudioError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| AudioError::MalformedContainer(e.to_string()))?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != BITS_PER_SAMPLE {
        return Err(AudioError::MalformedContainer(format!(
            "expected 16-bit integer PCM, found {}-bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }
    Ok(reader)
}

/// Parse a WAV header and report its format and duration.
pub fn inspect_container(bytes: &[u8]) -> Result<ContainerInfo, AudioError> {
    let reader = open_container(bytes)?;
    let spec = reader.spec();
    let sample_count = reader.duration();
    let duration_ms = (u64::from(sample_count) * 1000) / u64::from(spec.sample_rate.max(1));
    Ok(ContainerInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        sample_count,
        duration_ms,
    })
}

/// Read a 16-bit PCM WAV back into a normalized buffer.
pub fn decode_container(bytes: &[u8]) -> Result<NormalizedAudioBuffer, AudioError> {
    let reader = open_container(bytes)?;
    let spec = reader.spec();
    let format = AudioFormat::new(spec.sample_rate, spec.channels);
    if !format.is_valid() {
        return Err(AudioError::InvalidFormat {
            sample_rate: format.sample_rate,
            channels: format.channels,
        });
    }

    let interleaved = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AudioError::MalformedContainer(e.to_string()))?;

    let channel_count = usize::from(format.channels);
    let channels = (0..channel_count)
        .map(|channel| {
            interleaved
                .iter()
                .skip(channel)
                .step_by(channel_count)
                .map(|&s| f32::from(s) / 32768.0)
                .collect::<Vec<f32>>()
        })
        .collect::<Vec<_>>();

    NormalizedAudioBuffer::from_channels(channels, format.sample_rate).ok_or_else(|| {
        AudioError::MalformedContainer("data chunk does not hold whole frames".to_string())
    })
}
