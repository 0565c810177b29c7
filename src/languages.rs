use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

const fn lang(code: &'static str, name: &'static str) -> Language {
    Language { code, name }
}

pub const TRANSLATION_LANGUAGES: &[Language] = &[
    lang("en", "English"),
    lang("ru", "Russian"),
    lang("de", "German"),
    lang("fr", "French"),
    lang("es", "Spanish"),
    lang("it", "Italian"),
    lang("ja", "Japanese"),
    lang("zh", "Chinese"),
    lang("ar", "Arabic"),
    lang("pt", "Portuguese"),
];

pub const TTS_LANGUAGES: &[Language] = &[
    lang("en", "English"),
    lang("ru", "Russian"),
    lang("de", "German"),
    lang("fr", "French"),
    lang("es", "Spanish"),
    lang("ja", "Japanese"),
];

/// Hub language for the pairs installed at startup.
pub const PIVOT_LANGUAGE: &str = "en";

/// Languages paired with English in both directions at startup.
pub const DEFAULT_PAIR_LANGUAGES: &[&str] = &["ru", "de", "fr", "es", "ja", "it", "zh", "ar", "pt"];
