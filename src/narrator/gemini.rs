use super::prompts;
use super::provider::{ScriptGenerator, SpeechSynthesizer};
use super::script::{parse_script_result, ScriptResult};
use super::types::{
    non_blank, ApiError, Content, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, GeminiConfig, PrebuiltVoiceConfig, SpeechConfig, Usage, VoiceConfig,
    DEFAULT_BASE_URL, DEFAULT_SCRIPT_MODEL, DEFAULT_SPEECH_MODEL,
};
use super::voices::{Language, VoiceProfile};

use async_trait::async_trait;
use tracing::{debug, warn};

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    script_model: String,
    speech_model: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ApiError> {
        let api_key = non_blank(config.api_key.as_ref()).ok_or_else(|| ApiError::NoApiKey {
            provider: "gemini".to_string(),
        })?;

        let base_url = non_blank(config.base_url.as_ref())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let script_model = non_blank(config.script_model.as_ref())
            .unwrap_or_else(|| DEFAULT_SCRIPT_MODEL.to_string());
        let speech_model = non_blank(config.speech_model.as_ref())
            .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            script_model,
            speech_model,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn script_model(&self) -> &str {
        &self.script_model
    }

    pub fn speech_model(&self) -> &str {
        &self.speech_model
    }

    pub fn generate_content_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiError> {
        let url = self.generate_content_url(model);
        debug!(%url, "generateContent");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), model, "generateContent failed");
            return Err(ApiError::ApiResponse {
                status: status.as_u16(),
                message: body,
            });
        }

        let resp: GenerateContentResponse = response.json().await?;
        let usage = resp.usage_metadata.clone().map(Usage::from).unwrap_or_default();
        debug!(
            model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "generateContent ok"
        );
        Ok(resp)
    }
}

#[async_trait]
impl ScriptGenerator for GeminiClient {
    async fn generate_script(
        &self,
        news: &str,
        language: Language,
        max_part_characters: usize,
    ) -> Result<ScriptResult, ApiError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompts::script_prompt(
                news,
                language,
                max_part_characters,
            ))],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompts::script_response_schema()),
                ..Default::default()
            }),
        };

        let resp = self.generate_content(&self.script_model, &request).await?;
        parse_script_result(&resp.text())
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    async fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Option<String>, ApiError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompts::speech_prompt(text, voice))],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: voice.synthesis_voice.to_string(),
                        },
                    },
                }),
                ..Default::default()
            }),
        };

        let resp = self.generate_content(&self.speech_model, &request).await?;
        let audio = resp.inline_audio().map(str::to_string);
        if audio.is_none() {
            let reason = resp
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("unknown");
            warn!(voice = voice.synthesis_voice, finish_reason = reason, "no audio in response");
        }
        Ok(audio)
    }
}
