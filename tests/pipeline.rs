use narrator_core::{
    decode_base64, decode_pcm, encode_wav, inspect_container, synthesize_container, ApiError,
    AudioError, AudioFormat, Language, NarratorConfig, PreviewGate, ScriptGenerator,
    ScriptResult, SegmentCoordinator, SegmentStatus, SpeechSynthesizer, VoiceProfile,
};

use async_trait::async_trait;
use base64::Engine as _;
use std::sync::Arc;

/// Echoes one PCM sample per text byte so every segment gets a distinct length.
struct EchoSynthesizer;

#[async_trait]
impl SpeechSynthesizer for EchoSynthesizer {
    async fn synthesize(&self, text: &str, _voice: &VoiceProfile) -> Result<Option<String>, ApiError> {
        if text.contains("unspeakable") {
            return Ok(None);
        }
        let pcm: Vec<u8> = text.bytes().flat_map(|b| [0x00, b]).collect();
        let b64 = base64::engine::general_purpose::STANDARD.encode(pcm);
        // mimic a transport that wraps long lines
        let wrapped = b64
            .as_bytes()
            .chunks(8)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join("\r\n");
        Ok(Some(wrapped))
    }
}

struct CannedScript;

#[async_trait]
impl ScriptGenerator for CannedScript {
    async fn generate_script(
        &self,
        news: &str,
        _language: Language,
        max_part_characters: usize,
    ) -> Result<ScriptResult, ApiError> {
        Ok(ScriptResult {
            parts: news
                .split('|')
                .map(|p| p.chars().take(max_part_characters).collect())
                .collect(),
            titles: vec!["Breaking".to_string()],
            description: "A story".to_string(),
            tags: vec!["football".to_string()],
        })
    }
}

#[test]
fn extremes_decode_and_requantize() {
    let buffer = decode_pcm(&[0x00, 0x80, 0xff, 0x7f], AudioFormat::new(24000, 1)).unwrap();
    assert_eq!(buffer.channel(0).unwrap(), &[-1.0, 0.999969482421875]);

    let wav = encode_wav(&buffer).unwrap();
    assert_eq!(wav.len(), 48);
    assert_eq!(&wav.as_bytes()[44..], &[0x00, 0x80, 0xfe, 0x7f]);
}

#[test]
fn empty_payload_gives_header_only_container() {
    let wav = synthesize_container("", AudioFormat::speech()).unwrap();
    assert_eq!(wav.len(), 44);
    let info = inspect_container(wav.as_bytes()).unwrap();
    assert_eq!(info.sample_count, 0);
    assert_eq!(info.sample_rate, 24000);
}

#[test]
fn malformed_base64_is_rejected_without_output() {
    assert!(matches!(decode_base64("abc!"), Err(AudioError::Decode(_))));
    assert!(matches!(
        synthesize_container("abc!", AudioFormat::speech()),
        Err(AudioError::Decode(_))
    ));
}

#[test]
fn header_sizes_are_consistent() {
    for len in [0usize, 1, 2, 3, 10, 101] {
        let raw: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let buffer = decode_pcm(&raw, AudioFormat::new(24000, 1)).unwrap();
        let wav = encode_wav(&buffer).unwrap();
        let bytes = wav.as_bytes();
        let chunk_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let data_size = u32::from_le_bytes(bytes[40..44].try_into().unwrap());
        assert_eq!(chunk_size, 36 + data_size);
        assert_eq!(data_size as usize, (len / 2) * 2);
        assert_eq!(bytes.len(), 44 + data_size as usize);
    }
}

#[tokio::test]
async fn script_to_audio_end_to_end() {
    let coord = SegmentCoordinator::new(Arc::new(EchoSynthesizer), NarratorConfig::default());

    let meta = coord
        .regenerate(&CannedScript, "Kickoff!|unspeakable|Full time.", Language::English)
        .await
        .unwrap();
    assert_eq!(meta.titles, vec!["Breaking"]);
    assert_eq!(coord.len().await, 3);

    let (a, b, c) = tokio::join!(
        coord.request_synthesis(2),
        coord.request_synthesis(1),
        coord.request_synthesis(0),
    );
    assert_eq!(a.unwrap().status, SegmentStatus::Ready);
    let failed = b.unwrap();
    assert_eq!(failed.status, SegmentStatus::Failed);
    assert!(failed.error.unwrap().contains("no audio data"));
    assert_eq!(c.unwrap().status, SegmentStatus::Ready);

    let ready = coord.ready_in_order().await;
    assert_eq!(ready.len(), 2);
    assert_eq!(ready[0].0, 0);
    assert_eq!(ready[0].1.sample_count(), "Kickoff!".len());
    assert_eq!(ready[1].0, 2);
    assert_eq!(ready[1].1.sample_count(), "Full time.".len());

    let info = inspect_container(ready[1].1.as_bytes()).unwrap();
    assert_eq!(info.channels, 1);
    assert_eq!(info.bits_per_sample, 16);
}

#[tokio::test]
async fn preview_gate_serializes_previews() {
    let coord = SegmentCoordinator::new(Arc::new(EchoSynthesizer), NarratorConfig::default());
    let gate = PreviewGate::new();

    let permit = gate.try_acquire().expect("gate starts free");
    assert!(gate.try_acquire().is_none());
    let wav = coord.preview_voice("v4", Language::Spanish).await.unwrap();
    assert_eq!(
        wav.sample_count(),
        Language::Spanish.preview_sentence().len()
    );
    drop(permit);
    assert!(!gate.is_busy());
}
