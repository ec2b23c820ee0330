use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Portuguese,
    English,
    Spanish,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Portuguese, Language::English, Language::Spanish];

    pub fn name(&self) -> &'static str {
        match self {
            Language::Portuguese => "Portuguese",
            Language::English => "English",
            Language::Spanish => "Spanish",
        }
    }

    /// Short sentence used to audition a voice.
    pub fn preview_sentence(&self) -> &'static str {
        match self {
            Language::Portuguese => "Fala torcedor! Se liga nessa bomba que acabou de sair!",
            Language::English => "Hey football fan! Check out this breaking news!",
            Language::Spanish => "¡Hola, hincha! ¡Mira esta noticia bomba que acaba de salir!",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Narration persona: a prebuilt synthesis voice plus the style directive
/// sent along with every text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub synthesis_voice: &'static str,
    pub style_directive: &'static str,
}

pub const VOICES: &[VoiceProfile] = &[
    VoiceProfile {
        id: "v1",
        display_name: "Narrador Esportivo Dinâmico",
        description: "Voz energética e vibrante, perfeita para gols e lances cruciais.",
        synthesis_voice: "Kore",
        style_directive: "Narrate this like a passionate sports broadcaster. Use high energy, vary your pitch for excitement, and sound naturally enthusiastic about the news.",
    },
    VoiceProfile {
        id: "v2",
        display_name: "Comentarista Sério",
        description: "Voz profunda e autoritária para análises táticas e furos de reportagem.",
        synthesis_voice: "Fenrir",
        style_directive: "Narrate this in a professional, steady, and authoritative journalistic tone. Sound like a serious news anchor providing an exclusive report.",
    },
    VoiceProfile {
        id: "v3",
        display_name: "Jovem Gen Z (Gamer/Streamer)",
        description: "Voz de adolescente super animada e dinâmica, com o pique de um jovem empolgado.",
        synthesis_voice: "Charon",
        style_directive: "Narrate this like a highly energetic Gen Z teenager, gamer or streamer. Use an upbeat, fast-paced, and very excited tone. Sound like you are reacting to something epic and cool in real-time.",
    },
    VoiceProfile {
        id: "v4",
        display_name: "Voz Jovem e Rápida",
        description: "Estilo vloger, rápido, direto e cheio de gírias do futebol moderno.",
        synthesis_voice: "Zephyr",
        style_directive: "Narrate this in a fast-paced, casual, and friendly YouTuber style. Sound like you are talking directly to your followers in a relatable and upbeat way.",
    },
];

pub fn default_voice() -> &'static VoiceProfile {
    &VOICES[0]
}

pub fn find_voice(id: &str) -> Option<&'static VoiceProfile> {
    VOICES.iter().find(|v| v.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = VOICES.iter().map(|v| v.id).collect();
        let voices: HashSet<_> = VOICES.iter().map(|v| v.synthesis_voice).collect();
        assert_eq!(ids.len(), VOICES.len());
        assert_eq!(voices.len(), VOICES.len());
    }

    #[test]
    fn test_lookups() {
        assert_eq!(find_voice("v2").map(|v| v.synthesis_voice), Some("Fenrir"));
        assert!(find_voice("v9").is_none());
        assert_eq!(default_voice().synthesis_voice, "Kore");
    }

    #[test]
    fn test_language_names_and_preview() {
        assert_eq!(Language::Spanish.to_string(), "Spanish");
        assert_eq!(Language::default(), Language::Portuguese);
        for lang in Language::ALL {
            assert!(!lang.preview_sentence().is_empty());
        }
        assert!(Language::Portuguese.preview_sentence().starts_with("Fala torcedor"));
    }
}
