use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Bit depth of every PCM payload handled by the pipeline.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Sample rate of the speech model's raw output.
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Length of the canonical RIFF/WAVE header written by the encoder.
pub const WAV_HEADER_LEN: usize = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// 24 kHz mono, the format the speech model returns.
    pub const fn speech() -> Self {
        Self::new(SPEECH_SAMPLE_RATE, 1)
    }

    /// Non-zero rate and channels, small enough for the WAV header fields.
    pub fn is_valid(&self) -> bool {
        self.sample_rate > 0
            && self.channels > 0
            && self.channels <= u16::MAX / 2
            && u64::from(self.sample_rate) * u64::from(self.channels) * 2 <= u64::from(u32::MAX)
    }

    pub fn block_align(&self) -> u16 {
        self.channels * (BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::speech()
    }
}

/// Per-channel floating point samples in `[-1.0, 1.0]`.
///
/// Every channel holds the same number of samples; construction goes through
/// [`NormalizedAudioBuffer::from_channels`] or the PCM decoder, both of which
/// keep that invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAudioBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl NormalizedAudioBuffer {
    pub(crate) fn from_parts_unchecked(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Build a buffer from per-channel sample vectors.
    ///
    /// Returns `None` when no channel is given, the sample rate is zero, or
    /// the channels disagree on length.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Option<Self> {
        let first_len = channels.first()?.len();
        if sample_rate == 0
            || channels.len() > usize::from(u16::MAX)
            || channels.iter().any(|c| c.len() != first_len)
        {
            return None;
        }
        Some(Self::from_parts_unchecked(channels, sample_rate))
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Option<Self> {
        Self::from_channels(vec![samples], sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        // from_channels caps the channel count at u16::MAX
        self.channels.len() as u16
    }

    /// Samples per channel.
    pub fn sample_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, self.channel_count())
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    pub fn duration_ms(&self) -> u64 {
        (self.sample_count() as u64 * 1000) / u64::from(self.sample_rate)
    }
}

/// A finished RIFF/WAVE byte stream. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContainer {
    bytes: Vec<u8>,
    format: AudioFormat,
    sample_count: usize,
}

impl EncodedContainer {
    pub(crate) fn new(bytes: Vec<u8>, format: AudioFormat, sample_count: usize) -> Self {
        Self {
            bytes,
            format,
            sample_count,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the data chunk holds no frames; the header is always there.
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Samples per channel in the data chunk.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn duration_ms(&self) -> u64 {
        (self.sample_count as u64 * 1000) / u64::from(self.format.sample_rate)
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Header facts read back from a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_count: u32,
    pub duration_ms: u64,
}
