/// Voices the synthesis engine ships with.
pub const KNOWN_VOICES: &[&str] = &[
    "af_sarah",
    "af_nicole",
    "af_sky",
    "am_adam",
    "am_michael",
    "bf_emma",
    "bf_isabella",
    "bm_george",
    "bm_lewis",
];

pub const DEFAULT_VOICE: &str = "af_sarah";

pub const DEFAULT_LOCALE: &str = "en-us";

pub fn is_known_voice(voice: &str) -> bool {
    KNOWN_VOICES.contains(&voice)
}

/// (language, default voice, espeak-ng locale). Every language currently
/// maps to the American English voice and locale.
const LANGUAGE_MAP: &[(&str, &str, &str)] = &[
    ("en", "af_sarah", "en-us"),
    ("ru", "af_sarah", "en-us"),
    ("de", "af_sarah", "en-us"),
    ("fr", "af_sarah", "en-us"),
    ("es", "af_sarah", "en-us"),
    ("ja", "af_sarah", "en-us"),
    ("zh", "af_sarah", "en-us"),
    ("ar", "af_sarah", "en-us"),
    ("pt", "af_sarah", "en-us"),
    ("it", "af_sarah", "en-us"),
];

fn lookup(lang: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    LANGUAGE_MAP.iter().find(|(code, _, _)| *code == lang)
}

pub fn default_voice(lang: &str) -> &'static str {
    lookup(lang).map(|(_, voice, _)| *voice).unwrap_or(DEFAULT_VOICE)
}

/// Use the requested voice if it is known, otherwise the language default.
pub fn resolve_voice<'a>(requested: Option<&'a str>, lang: &str) -> &'a str {
    match requested {
        Some(voice) if is_known_voice(voice) => voice,
        _ => default_voice(lang),
    }
}

pub fn synthesis_locale(lang: &str) -> &'static str {
    lookup(lang).map(|(_, _, locale)| *locale).unwrap_or(DEFAULT_LOCALE)
}
