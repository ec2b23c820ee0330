pub mod audio;
pub mod audio_types;
pub mod coordinator;
pub mod gemini;
pub mod prompts;
pub mod provider;
pub mod script;
pub mod segments;
pub mod types;
pub mod voices;
