/// Standard voice known to exist for each supported language
const DEFAULT_VOICES: &[(&str, &str)] = &[
    ("ar-XA", "ar-XA-Standard-A"),
    ("cmn-CN", "cmn-CN-Standard-A"),
    ("de-DE", "de-DE-Standard-A"),
    ("en-AU", "en-AU-Standard-A"),
    ("en-GB", "en-GB-Standard-A"),
    ("en-IN", "en-IN-Standard-A"),
    ("en-US", "en-US-Standard-C"),
    ("es-ES", "es-ES-Standard-A"),
    ("es-US", "es-US-Standard-A"),
    ("fr-CA", "fr-CA-Standard-A"),
    ("fr-FR", "fr-FR-Standard-A"),
    ("hi-IN", "hi-IN-Standard-A"),
    ("it-IT", "it-IT-Standard-A"),
    ("ja-JP", "ja-JP-Standard-A"),
    ("ko-KR", "ko-KR-Standard-A"),
    ("nl-NL", "nl-NL-Standard-A"),
    ("pl-PL", "pl-PL-Standard-A"),
    ("pt-BR", "pt-BR-Standard-A"),
    ("pt-PT", "pt-PT-Standard-A"),
    ("ru-RU", "ru-RU-Standard-A"),
    ("th-TH", "th-TH-Standard-A"),
    ("tr-TR", "tr-TR-Standard-A"),
    ("vi-VN", "vi-VN-Standard-A"),
    ("zh-CN", "cmn-CN-Standard-A"),
];

/// Voice to retry with after the requested one was not found
///
/// Unknown languages get `configured_default`.
pub fn fallback_voice<'a>(language_code: &str, configured_default: &'a str) -> &'a str {
    DEFAULT_VOICES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(language_code))
        .map_or(configured_default, |&(_, voice)| voice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_uses_table() {
        assert_eq!(fallback_voice("fr-FR", "es-ES-Standard-A"), "fr-FR-Standard-A");
        assert_eq!(fallback_voice("en-us", "es-ES-Standard-A"), "en-US-Standard-C");
    }

    #[test]
    fn unknown_language_uses_configured_default() {
        assert_eq!(fallback_voice("xx-YY", "es-ES-Standard-A"), "es-ES-Standard-A");
    }
}
