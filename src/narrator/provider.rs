use super::script::ScriptResult;
use super::types::ApiError;
use super::voices::{Language, VoiceProfile};

use async_trait::async_trait;

/// Turns a news text into a chunked narration script plus metadata.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate_script(
        &self,
        news: &str,
        language: Language,
        max_part_characters: usize,
    ) -> Result<ScriptResult, ApiError>;
}

/// Remote text-to-speech.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` in `voice`. `Ok(None)` means the service answered
    /// without an audio payload; `Ok(Some(b64))` carries raw 16-bit LE PCM.
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Option<String>, ApiError>;
}
