use lazy_static::lazy_static;
use regex::Regex;

use super::chinese::detect_chinese_variant;

/// Default number of characters inspected by the detector.
pub const DEFAULT_SAMPLE_CHARS: usize = 4000;

/// Parameters for language detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Only the first `sample_chars` characters of the input are inspected.
    pub sample_chars: usize,
    /// Tag returned when the text carries no usable signal, and consulted
    /// for Han text with no traditional/simplified signal.
    pub fallback_locale: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_chars: DEFAULT_SAMPLE_CHARS,
            fallback_locale: "en-US".to_string(),
        }
    }
}

/// Scripts that identify a single language outright, checked in order.
const EXCLUSIVE_SCRIPTS: &[(&str, char, char)] = &[
    ("ru", '\u{0400}', '\u{04FF}'),
    ("ar", '\u{0600}', '\u{06FF}'),
    ("he", '\u{0590}', '\u{05FF}'),
    ("hi", '\u{0900}', '\u{097F}'),
    ("th", '\u{0E00}', '\u{0E7F}'),
];

/// Diacritics weighted x2 per occurrence. Order decides ties.
const DIACRITICS: &[(&str, &str)] = &[
    ("de", "äöüß"),
    ("es", "áéíóúüñ¿¡"),
    ("fr", "àâçéèêëîïôûùüÿœ"),
    ("pt", "ãõçáéíóúâêôà"),
    ("it", "àèéìíòóù"),
    ("tr", "ğüşöçı"),
    (
        "vi",
        "ăâđêôơưáàảãạấầẩẫậắằẳẵặéèẻẽẹếềểễệíìỉĩịóòỏõọốồổỗộớờởỡợúùủũụứừửữựýỳỷỹỵ",
    ),
];

const DIACRITIC_WEIGHT: usize = 2;

lazy_static! {
    /// Common function words weighted x1 per occurrence.
    static ref STOP_WORDS: Vec<(&'static str, Regex)> = vec![
        ("en", Regex::new(r"\b(?:the|and|with|for|that|this|from|are)\b").unwrap()),
        ("es", Regex::new(r"\b(?:el|la|los|las|que|para|con|por|una|un)\b").unwrap()),
        ("fr", Regex::new(r"\b(?:le|la|les|des|pour|avec|une|un)\b").unwrap()),
        ("de", Regex::new(r"\b(?:und|der|die|das|mit|für|ein|eine)\b").unwrap()),
        ("it", Regex::new(r"\b(?:il|lo|la|gli|che|per|con|una|un)\b").unwrap()),
        ("pt", Regex::new(r"\b(?:o|a|os|as|que|para|com|uma|um)\b").unwrap()),
    ];
}

/// Script and keyword based language detector.
#[derive(Debug, Clone, Default)]
pub struct LanguageDetector {
    config: DetectorConfig,
}

impl LanguageDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Guess a BCP 47 language tag for `text`.
    ///
    /// Returns `None` only for blank input. Text with no usable signal gets
    /// the configured fallback locale (`en-US` when that is blank).
    pub fn detect(&self, text: &str) -> Option<String> {
        let sample: String = text.trim().chars().take(self.config.sample_chars).collect();
        if sample.is_empty() {
            return None;
        }

        if let Some(tag) = self.detect_by_script(&sample) {
            return Some(tag.to_string());
        }

        if let Some(tag) = score_latin(&sample) {
            return Some(tag.to_string());
        }

        let fallback = self.config.fallback_locale.trim();
        if fallback.is_empty() {
            Some("en-US".to_string())
        } else {
            Some(fallback.to_string())
        }
    }

    fn detect_by_script(&self, sample: &str) -> Option<&'static str> {
        if sample.chars().any(is_kana) {
            return Some("ja");
        }
        if sample.chars().any(|c| ('\u{AC00}'..='\u{D7AF}').contains(&c)) {
            return Some("ko");
        }
        if sample.chars().any(|c| ('\u{3100}'..='\u{312F}').contains(&c)) {
            return Some("zh-TW");
        }
        if sample.chars().any(|c| ('\u{4E00}'..='\u{9FFF}').contains(&c)) {
            return Some(detect_chinese_variant(
                sample,
                self.config.sample_chars,
                &self.config.fallback_locale,
            ));
        }

        EXCLUSIVE_SCRIPTS
            .iter()
            .find(|(_, lo, hi)| sample.chars().any(|c| (*lo..=*hi).contains(&c)))
            .map(|(tag, _, _)| *tag)
    }
}

/// Detect with the default configuration (4000-character sample, `en-US` fallback).
pub fn detect_language(text: &str) -> Option<String> {
    LanguageDetector::default().detect(text)
}

fn is_kana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c) || ('\u{30A0}'..='\u{30FF}').contains(&c)
}

/// Score Latin-script languages by diacritics and stop words.
///
/// Candidates are ranked in the order they first scored; a later candidate
/// must strictly beat the leader to replace it.
fn score_latin(sample: &str) -> Option<&'static str> {
    let lower = sample.to_lowercase();
    let mut scores: Vec<(&'static str, usize)> = Vec::new();

    let mut add = |lang: &'static str, points: usize| {
        if points == 0 {
            return;
        }
        match scores.iter_mut().find(|(l, _)| *l == lang) {
            Some((_, score)) => *score += points,
            None => scores.push((lang, points)),
        }
    };

    for &(lang, marks) in DIACRITICS {
        let hits = lower.chars().filter(|c| marks.contains(*c)).count();
        add(lang, hits * DIACRITIC_WEIGHT);
    }
    for (lang, re) in STOP_WORDS.iter() {
        add(*lang, re.find_iter(&lower).count());
    }

    let mut best: Option<(&'static str, usize)> = None;
    for &(lang, score) in &scores {
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((lang, score));
        }
    }

    log::debug!("Language scores: {scores:?}");
    best.map(|(lang, _)| lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(locale: &str) -> LanguageDetector {
        LanguageDetector::new(DetectorConfig {
            fallback_locale: locale.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn blank_text_has_no_language() {
        assert_eq!(detect_language(""), None);
        assert_eq!(detect_language("  \n "), None);
    }

    #[test]
    fn detects_scripts() {
        assert_eq!(detect_language("これはテストです").as_deref(), Some("ja"));
        assert_eq!(detect_language("안녕하세요").as_deref(), Some("ko"));
        assert_eq!(detect_language("ㄅㄆㄇ").as_deref(), Some("zh-TW"));
        assert_eq!(detect_language("Привет, мир").as_deref(), Some("ru"));
        assert_eq!(detect_language("مرحبا بالعالم").as_deref(), Some("ar"));
        assert_eq!(detect_language("שלום עולם").as_deref(), Some("he"));
        assert_eq!(detect_language("नमस्ते दुनिया").as_deref(), Some("hi"));
        assert_eq!(detect_language("สวัสดีครับ").as_deref(), Some("th"));
    }

    #[test]
    fn kana_beats_han() {
        assert_eq!(detect_language("日本語のテキスト").as_deref(), Some("ja"));
    }

    #[test]
    fn simplified_chinese_sample() {
        assert_eq!(detect_language("这是一个简单的测试，我们学习中文。").as_deref(), Some("zh-CN"));
    }

    #[test]
    fn traditional_chinese_sample() {
        assert_eq!(detect_language("這是臺灣的學校，歡迎來訪。").as_deref(), Some("zh-TW"));
    }

    #[test]
    fn english_by_stop_words() {
        assert_eq!(detect_language("Hello, the quick brown fox").as_deref(), Some("en"));
        assert_eq!(
            detect_language("This is the story of a boy and his dog.").as_deref(),
            Some("en")
        );
    }

    #[test]
    fn european_languages_by_diacritics_and_words() {
        assert_eq!(
            detect_language("Der Hund und die Katze schlafen über dem Haus.").as_deref(),
            Some("de")
        );
        assert_eq!(
            detect_language("¿Dónde está la estación? Para los niños.").as_deref(),
            Some("es")
        );
        assert_eq!(
            detect_language("Tiếng Việt rất đẹp và phong phú.").as_deref(),
            Some("vi")
        );
    }

    #[test]
    fn no_signal_uses_locale() {
        assert_eq!(detector("fr-CA").detect("xyz 123").as_deref(), Some("fr-CA"));
        assert_eq!(detector("").detect("xyz 123").as_deref(), Some("en-US"));
    }

    #[test]
    fn han_without_variant_signal_uses_locale() {
        assert_eq!(detector("zh-TW").detect("你好").as_deref(), Some("zh-TW"));
        assert_eq!(detector("en-US").detect("你好").as_deref(), Some("zh-CN"));
    }

    #[test]
    fn ties_keep_first_scored_language() {
        // "la" scores es, fr and it equally; es scored first.
        assert_eq!(score_latin("la"), Some("es"));
    }
}
