use super::audio_types::EncodedContainer;
use super::types::ApiError;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("No segment with index {0}")]
    UnknownSegment(usize),

    #[error("Segment {0} is already being synthesized")]
    AlreadySynthesizing(usize),

    #[error("Segment {0} already has audio")]
    AlreadyReady(usize),

    #[error("Segment {0} is not being synthesized")]
    NotSynthesizing(usize),

    #[error("Script part {0} is empty")]
    EmptyText(usize),

    #[error("Script was replaced while segment {0} was being synthesized")]
    StaleGeneration(usize),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Script generation failed: {0}")]
    Script(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentState {
    Pending,
    Synthesizing,
    Ready(Arc<EncodedContainer>),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Pending,
    Synthesizing,
    Ready,
    Failed,
}

impl SegmentState {
    pub fn status(&self) -> SegmentStatus {
        match self {
            SegmentState::Pending => SegmentStatus::Pending,
            SegmentState::Synthesizing => SegmentStatus::Synthesizing,
            SegmentState::Ready(_) => SegmentStatus::Ready,
            SegmentState::Failed(_) => SegmentStatus::Failed,
        }
    }
}

/// One chunk of the script and where its audio stands.
#[derive(Debug, Clone)]
pub struct ScriptSegment {
    index: usize,
    text: String,
    state: SegmentState,
}

impl ScriptSegment {
    pub fn new(index: usize, text: String) -> Result<Self, SegmentError> {
        if text.trim().is_empty() {
            return Err(SegmentError::EmptyText(index));
        }
        Ok(Self {
            index,
            text,
            state: SegmentState::Pending,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> &SegmentState {
        &self.state
    }

    /// Pending or Failed -> Synthesizing.
    pub fn begin_synthesis(&mut self) -> Result<(), SegmentError> {
        match self.state {
            SegmentState::Pending | SegmentState::Failed(_) => {
                self.state = SegmentState::Synthesizing;
                Ok(())
            }
            SegmentState::Synthesizing => Err(SegmentError::AlreadySynthesizing(self.index)),
            SegmentState::Ready(_) => Err(SegmentError::AlreadyReady(self.index)),
        }
    }

    /// Synthesizing -> Ready.
    pub fn complete(&mut self, container: EncodedContainer) -> Result<(), SegmentError> {
        self.expect_synthesizing()?;
        self.state = SegmentState::Ready(Arc::new(container));
        Ok(())
    }

    /// Synthesizing -> Failed.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), SegmentError> {
        self.expect_synthesizing()?;
        self.state = SegmentState::Failed(reason.into());
        Ok(())
    }

    fn expect_synthesizing(&self) -> Result<(), SegmentError> {
        match self.state {
            SegmentState::Synthesizing => Ok(()),
            _ => Err(SegmentError::NotSynthesizing(self.index)),
        }
    }

    pub fn snapshot(&self) -> SegmentSnapshot {
        let (error, duration_ms) = match &self.state {
            SegmentState::Failed(reason) => (Some(reason.clone()), None),
            SegmentState::Ready(c) => (None, Some(c.duration_ms())),
            _ => (None, None),
        };
        SegmentSnapshot {
            index: self.index,
            text: self.text.clone(),
            status: self.state.status(),
            error,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSnapshot {
    pub index: usize,
    pub text: String,
    pub status: SegmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Build segments from script parts, indexed by position.
pub fn segments_from_parts(parts: Vec<String>) -> Result<Vec<ScriptSegment>, SegmentError> {
    parts
        .into_iter()
        .enumerate()
        .map(|(i, text)| ScriptSegment::new(i, text))
        .collect()
}
