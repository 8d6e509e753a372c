use crate::VoiceDescriptor;

/// Options for an automatic voice (re)selection pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReselectOptions {
    /// Reselect even when the current voice already fits the language.
    /// Used after the voice list loads and after a slot switch. Default false.
    pub force: bool,
}

impl ReselectOptions {
    pub fn forced() -> Self {
        Self { force: true }
    }
}

/// A voice that satisfies one of the language prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceMatch {
    /// Position in the engine's voice list.
    pub index: usize,
    /// Index of the first prefix the voice satisfied; lower is better.
    pub rank: usize,
    /// [`VoiceDescriptor::quality_rank`]; 0 for high-quality voices.
    pub quality: u8,
    pub is_default: bool,
}

/// Lower-case a tag and use `-` as the subtag separator.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase().replace('_', "-")
}

/// Ordered language-tag prefixes a voice may match, best first.
///
/// The full tag always comes first. Chinese tags expand to a script-aware
/// chain (Traditional for `tw`/`hant`, otherwise Simplified); every other
/// language falls back to its base subtag.
pub fn language_match_prefixes(tag: &str) -> Vec<String> {
    let normalized = normalize_tag(tag);
    let base = normalized.split('-').next().unwrap_or_default().to_string();
    let mut prefixes: Vec<String> = Vec::new();
    let mut add = |value: &str| {
        if !value.is_empty() && !prefixes.iter().any(|p| p == value) {
            prefixes.push(value.to_string());
        }
    };

    add(&normalized);
    if base == "zh" {
        if normalized.contains("tw") || normalized.contains("hant") {
            for prefix in ["zh-hant", "cmn-hant", "cmn", "zh", "yue"] {
                add(prefix);
            }
        } else {
            for prefix in ["zh-hans", "cmn-hans", "cmn", "zh"] {
                add(prefix);
            }
        }
    } else {
        add(&base);
    }

    prefixes
}

fn match_rank(voice: &VoiceDescriptor, prefixes: &[String]) -> Option<usize> {
    if voice.lang.trim().is_empty() {
        return None;
    }
    let voice_lang = normalize_tag(&voice.lang);
    prefixes
        .iter()
        .position(|prefix| voice_lang.starts_with(prefix.as_str()))
}

/// Every voice that matches `tag`, in list order.
pub fn voice_matches(tag: &str, voices: &[VoiceDescriptor]) -> Vec<VoiceMatch> {
    let prefixes = language_match_prefixes(tag);
    voices
        .iter()
        .enumerate()
        .filter_map(|(index, voice)| {
            match_rank(voice, &prefixes).map(|rank| VoiceMatch {
                index,
                rank,
                quality: voice.quality_rank(),
                is_default: voice.is_default,
            })
        })
        .collect()
}

/// Pick the best voice for `tag`.
///
/// High-quality voices win over the rest; within a tier the lowest rank
/// wins, then the engine default. Remaining ties go to the earliest voice
/// in the list.
pub fn select_voice_for(tag: &str, voices: &[VoiceDescriptor]) -> Option<usize> {
    voice_matches(tag, voices)
        .into_iter()
        .min_by_key(|m| (m.quality, m.rank, !m.is_default))
        .map(|m| m.index)
}

/// Whether `voice` satisfies any prefix for `tag`.
pub fn voice_matches_language(voice: &VoiceDescriptor, tag: &str) -> bool {
    match_rank(voice, &language_match_prefixes(tag)).is_some()
}

pub fn has_high_quality_voice(tag: &str, voices: &[VoiceDescriptor]) -> bool {
    voice_matches(tag, voices).iter().any(|m| m.quality == 0)
}

/// Decide whether an automatic pass should replace the selected voice.
///
/// The current choice is kept when it already fits `tag` and either no
/// high-quality voice exists for `tag` or the current voice is one.
pub fn should_reselect(
    tag: &str,
    voices: &[VoiceDescriptor],
    selected: Option<usize>,
    options: ReselectOptions,
) -> bool {
    if voices.is_empty() {
        return false;
    }
    if options.force {
        return true;
    }

    let Some(current) = selected.and_then(|i| voices.get(i)) else {
        return true;
    };
    if !voice_matches_language(current, tag) {
        return true;
    }

    has_high_quality_voice(tag, voices) && !current.is_high_quality()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(name: &str, lang: &str) -> VoiceDescriptor {
        VoiceDescriptor::new(name, lang)
    }

    fn sample_voices() -> Vec<VoiceDescriptor> {
        vec![
            voice("Alex", "en-US").with_default(true),
            voice("Daniel", "en-GB"),
            voice("Google UK English Female", "en-GB"),
            voice("Google US English", "en-US"),
            voice("Mei-Jia", "zh-TW"),
            voice("Google 普通话（中国大陆）", "zh-CN"),
            voice("Sin-ji", "zh-HK"),
            voice("Thomas", "fr_FR"),
            voice("", ""),
        ]
    }

    #[test]
    fn prefixes_for_plain_and_chinese_tags() {
        assert_eq!(language_match_prefixes("en-US"), vec!["en-us", "en"]);
        assert_eq!(language_match_prefixes("fr"), vec!["fr"]);
        assert_eq!(
            language_match_prefixes("zh-TW"),
            vec!["zh-tw", "zh-hant", "cmn-hant", "cmn", "zh", "yue"]
        );
        assert_eq!(
            language_match_prefixes("zh-CN"),
            vec!["zh-cn", "zh-hans", "cmn-hans", "cmn", "zh"]
        );
    }

    #[test]
    fn prefers_high_quality_then_rank() {
        let voices = sample_voices();
        assert_eq!(select_voice_for("en-US", &voices), Some(3));
        assert_eq!(select_voice_for("en-GB", &voices), Some(2));
        assert_eq!(select_voice_for("en", &voices), Some(2));
    }

    #[test]
    fn default_voice_breaks_rank_ties() {
        let voices = vec![
            voice("Fiona", "en-GB"),
            voice("Karen", "en-AU").with_default(true),
        ];
        assert_eq!(select_voice_for("en", &voices), Some(1));
    }

    #[test]
    fn full_ties_keep_list_order() {
        let voices = vec![voice("A", "de-DE"), voice("B", "de-DE")];
        for _ in 0..5 {
            assert_eq!(select_voice_for("de", &voices), Some(0));
        }
    }

    #[test]
    fn chinese_variants_follow_chain() {
        let voices = sample_voices();
        assert_eq!(select_voice_for("zh-TW", &voices), Some(5));
        let without_google: Vec<_> = voices
            .into_iter()
            .filter(|v| !v.is_high_quality())
            .collect();
        assert_eq!(select_voice_for("zh-TW", &without_google), Some(2));
        assert_eq!(without_google[2].name, "Mei-Jia");
    }

    #[test]
    fn underscore_tags_match() {
        assert_eq!(select_voice_for("fr", &sample_voices()), Some(7));
    }

    #[test]
    fn no_match_yields_none() {
        assert_eq!(select_voice_for("ja", &sample_voices()), None);
        assert_eq!(select_voice_for("en", &[]), None);
    }

    #[test]
    fn reselect_policy() {
        let voices = sample_voices();
        let auto = ReselectOptions::default();
        assert!(!should_reselect("en", &voices, Some(3), auto));
        assert!(should_reselect("en", &voices, Some(0), auto));
        assert!(should_reselect("fr", &voices, Some(3), auto));
        assert!(should_reselect("en", &voices, None, auto));
        assert!(!should_reselect("fr", &voices, Some(7), auto));
        assert!(should_reselect("fr", &voices, Some(7), ReselectOptions::forced()));
        assert!(!should_reselect("en", &[], None, ReselectOptions::forced()));
    }
}
