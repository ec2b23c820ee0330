//! Narration core: turns script text chunks into playable WAV audio through a
//! remote speech model, tracking each chunk's synthesis independently.

pub mod narrator;

pub use narrator::audio::{
    decode_base64, decode_container, decode_pcm, encode_wav, inspect_container,
    synthesize_container, AudioError,
};
pub use narrator::audio_types::{
    AudioFormat, ContainerInfo, EncodedContainer, NormalizedAudioBuffer, SPEECH_SAMPLE_RATE,
};
pub use narrator::coordinator::{PreviewGate, PreviewPermit, SegmentCoordinator, SynthesisError};
pub use narrator::gemini::GeminiClient;
pub use narrator::provider::{ScriptGenerator, SpeechSynthesizer};
pub use narrator::script::{ScriptMetadata, ScriptResult};
pub use narrator::segments::{
    ScriptSegment, SegmentError, SegmentSnapshot, SegmentState, SegmentStatus,
};
pub use narrator::types::{ApiError, GeminiConfig, NarratorConfig, MAX_PART_CHARACTERS};
pub use narrator::voices::{Language, VoiceProfile, VOICES};
