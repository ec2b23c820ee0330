use super::audio::{synthesize_container, AudioError};
use super::audio_types::EncodedContainer;
use super::provider::{ScriptGenerator, SpeechSynthesizer};
use super::script::{ScriptMetadata, ScriptResult};
use super::segments::{
    segments_from_parts, ScriptSegment, SegmentError, SegmentSnapshot, SegmentState,
};
use super::types::{ApiError, NarratorConfig};
use super::voices::{self, Language, VoiceProfile};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("The API returned no audio data. The text may be too long or contain unsupported characters.")]
    MissingAudio,

    #[error("Speech request failed: {0}")]
    Transport(#[from] ApiError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),
}

struct SegmentSet {
    generation: u64,
    segments: Vec<ScriptSegment>,
    metadata: ScriptMetadata,
    voice: &'static VoiceProfile,
}

/// Owns the script segments and drives each one through synthesis.
///
/// All methods take `&self`, so several `request_synthesis` calls can be
/// awaited together. The segment lock is never held across a call to the
/// synthesizer.
pub struct SegmentCoordinator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: NarratorConfig,
    state: Arc<Mutex<SegmentSet>>,
}

impl SegmentCoordinator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, config: NarratorConfig) -> Self {
        Self {
            synthesizer,
            config,
            state: Arc::new(Mutex::new(SegmentSet {
                generation: 0,
                segments: Vec::new(),
                metadata: ScriptMetadata::default(),
                voice: voices::default_voice(),
            })),
        }
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }

    /// Replace every segment with the parts of `script`, all `Pending`.
    /// A script with an empty part is rejected and the current set is kept.
    pub async fn load_script(&self, script: ScriptResult) -> Result<ScriptMetadata, SegmentError> {
        let (parts, metadata) = script.into_parts();
        let segments = segments_from_parts(parts)?;

        let mut state = self.state.lock().await;
        state.generation += 1;
        state.segments = segments;
        state.metadata = metadata.clone();
        info!(
            generation = state.generation,
            segments = state.segments.len(),
            "script loaded"
        );
        Ok(metadata)
    }

    /// Ask `generator` for a fresh script and load it. On failure the
    /// current segments stay as they are.
    pub async fn regenerate(
        &self,
        generator: &dyn ScriptGenerator,
        news: &str,
        language: Language,
    ) -> Result<ScriptMetadata, SegmentError> {
        let script = generator
            .generate_script(news, language, self.config.max_part_characters)
            .await
            .map_err(|e| {
                warn!(error = %e, "script generation failed");
                e
            })?;
        self.load_script(script).await
    }

    pub async fn select_voice(&self, voice_id: &str) -> Result<&'static VoiceProfile, SegmentError> {
        let voice = voices::find_voice(voice_id)
            .ok_or_else(|| SegmentError::UnknownVoice(voice_id.to_string()))?;
        self.state.lock().await.voice = voice;
        Ok(voice)
    }

    pub async fn selected_voice(&self) -> &'static VoiceProfile {
        self.state.lock().await.voice
    }

    /// Synthesize segment `index` with the selected voice.
    ///
    /// The segment goes to `Synthesizing` before the request and to `Ready` or
    /// `Failed` after it; siblings are never touched. Errors are returned only
    /// for rejected preconditions or when the script was replaced meanwhile.
    /// Dropping the future mid-request leaves the segment `Failed`, so it can
    /// be retried.
    pub async fn request_synthesis(&self, index: usize) -> Result<SegmentSnapshot, SegmentError> {
        let (generation, text, voice) = {
            let mut state = self.state.lock().await;
            let voice = state.voice;
            let generation = state.generation;
            let segment = state
                .segments
                .get_mut(index)
                .ok_or(SegmentError::UnknownSegment(index))?;
            segment.begin_synthesis()?;
            (generation, segment.text().to_string(), voice)
        };
        let mut in_flight = InFlight {
            state: Arc::clone(&self.state),
            index,
            generation,
            armed: true,
        };
        debug!(index, generation, voice = voice.synthesis_voice, "synthesis started");

        let outcome = self.synthesize_text(&text, voice).await;

        let mut state = self.state.lock().await;
        in_flight.armed = false;
        if state.generation != generation {
            warn!(index, generation, "discarding audio for replaced script");
            return Err(SegmentError::StaleGeneration(index));
        }
        let segment = state
            .segments
            .get_mut(index)
            .ok_or(SegmentError::UnknownSegment(index))?;

        match outcome {
            Ok(container) => {
                info!(index, bytes = container.len(), "segment ready");
                segment.complete(container)?;
            }
            Err(e) => {
                warn!(index, error = %e, "segment synthesis failed");
                segment.fail(e.to_string())?;
            }
        }
        Ok(segment.snapshot())
    }

    /// One-off audition of a voice with a short sentence in `language`.
    /// Does not read or change any segment.
    pub async fn preview_voice(
        &self,
        voice_id: &str,
        language: Language,
    ) -> Result<EncodedContainer, SynthesisError> {
        let voice = voices::find_voice(voice_id)
            .ok_or_else(|| SynthesisError::UnknownVoice(voice_id.to_string()))?;
        debug!(voice = voice.synthesis_voice, %language, "voice preview");
        self.synthesize_text(language.preview_sentence(), voice).await
    }

    async fn synthesize_text(
        &self,
        text: &str,
        voice: &'static VoiceProfile,
    ) -> Result<EncodedContainer, SynthesisError> {
        let blob = self
            .synthesizer
            .synthesize(text, voice)
            .await?
            .ok_or(SynthesisError::MissingAudio)?;
        Ok(synthesize_container(&blob, self.config.format)?)
    }

    pub async fn snapshot(&self) -> Vec<SegmentSnapshot> {
        let state = self.state.lock().await;
        state.segments.iter().map(ScriptSegment::snapshot).collect()
    }

    pub async fn segment_state(&self, index: usize) -> Option<SegmentState> {
        let state = self.state.lock().await;
        state.segments.get(index).map(|s| s.state().clone())
    }

    /// Containers of every `Ready` segment, in script order.
    pub async fn ready_in_order(&self) -> Vec<(usize, Arc<EncodedContainer>)> {
        let state = self.state.lock().await;
        state
            .segments
            .iter()
            .filter_map(|s| match s.state() {
                SegmentState::Ready(c) => Some((s.index(), Arc::clone(c))),
                _ => None,
            })
            .collect()
    }

    pub async fn metadata(&self) -> ScriptMetadata {
        self.state.lock().await.metadata.clone()
    }

    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.segments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

const CANCELLED: &str = "Synthesis was cancelled before it finished";

/// Fails a `Synthesizing` segment whose request future is dropped before
/// recording an outcome.
struct InFlight {
    state: Arc<Mutex<SegmentSet>>,
    index: usize,
    generation: u64,
    armed: bool,
}

fn cancel_segment(set: &mut SegmentSet, index: usize, generation: u64) {
    if set.generation != generation {
        return;
    }
    if let Some(segment) = set.segments.get_mut(index) {
        if segment.fail(CANCELLED).is_ok() {
            warn!(index, generation, "segment synthesis cancelled");
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (index, generation) = (self.index, self.generation);
        if let Ok(mut set) = self.state.try_lock() {
            cancel_segment(&mut set, index, generation);
            return;
        }
        // lock is busy; the holder never awaits while holding it
        let state = Arc::clone(&self.state);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    cancel_segment(&mut *state.lock().await, index, generation);
                });
            }
            Err(_) => cancel_segment(&mut state.blocking_lock(), index, generation),
        }
    }
}

/// At most one voice preview in flight. Callers take a permit before
/// calling [`SegmentCoordinator::preview_voice`]; a second caller is refused
/// rather than queued.
#[derive(Debug, Clone, Default)]
pub struct PreviewGate {
    busy: Arc<AtomicBool>,
}

impl PreviewGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<PreviewPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PreviewPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate on drop.
#[derive(Debug)]
pub struct PreviewPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for PreviewPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
