/// English display names for the base languages the detector can produce.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh", "Chinese"),
    ("ru", "Russian"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("he", "Hebrew"),
    ("tr", "Turkish"),
];

/// Human-readable label such as `"Chinese (zh-TW)"`.
///
/// Unknown base languages are labelled with the tag itself.
pub fn language_label(tag: &str) -> String {
    let base = tag.split('-').next().unwrap_or(tag).to_lowercase();
    let name = LANGUAGE_NAMES
        .iter()
        .find(|(code, _)| *code == base)
        .map(|(_, name)| *name)
        .unwrap_or(tag);
    format!("{name} ({tag})")
}

#[cfg(test)]
mod tests {
    use super::language_label;

    #[test]
    fn labels_known_and_unknown_tags() {
        assert_eq!(language_label("zh-TW"), "Chinese (zh-TW)");
        assert_eq!(language_label("en"), "English (en)");
        assert_eq!(language_label("sw-KE"), "sw-KE (sw-KE)");
    }
}
