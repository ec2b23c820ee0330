use super::voices::{Language, VoiceProfile};

pub const TITLE_COUNT: usize = 10;
pub const TAG_COUNT: usize = 15;
pub const DESCRIPTION_WORDS: usize = 150;

pub fn script_prompt(news: &str, language: Language, max_part_characters: usize) -> String {
    format!(
        r#"Act as a scriptwriting and production specialist for faceless football channels on YouTube.
Turn the news below into a highly engaging narration script.

NEWS: {news}

REQUIREMENTS:
1. Language: {lang_name}.
2. Tone: viral, urgent, with strong hooks.
3. Split the script into blocks of at most {max_part_characters} characters each.
4. Metadata: {titles} clickbait titles, a {words}-word description and {tags} tags.

Return strictly JSON."#,
        news = news.trim(),
        lang_name = language.name(),
        max_part_characters = max_part_characters,
        titles = TITLE_COUNT,
        words = DESCRIPTION_WORDS,
        tags = TAG_COUNT,
    )
}

/// JSON schema handed to the model so it answers with a `ScriptResult`.
pub fn script_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "scriptParts": { "type": "ARRAY", "items": { "type": "STRING" } },
            "titles": { "type": "ARRAY", "items": { "type": "STRING" } },
            "description": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["scriptParts", "titles", "description", "tags"]
    })
}

pub fn speech_prompt(text: &str, voice: &VoiceProfile) -> String {
    format!(
        "Instruction: {}. Text to speak: {}",
        voice.style_directive, text
    )
}
