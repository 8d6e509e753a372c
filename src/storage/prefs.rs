use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ReaderError;
use crate::lang::voice::normalize_tag;
use crate::VoiceDescriptor;

/// Manually chosen voices, remembered per language.
///
/// Maps a base language (`"en"`, `"fr"`) to a voice key (`"name|lang"`).
/// Chinese is kept per script, as `"zh-hans"` and `"zh-hant"`, so a
/// Traditional voice is never reused for Simplified text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VoicePreferences {
    by_language: BTreeMap<String, String>,
}

impl VoicePreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse persisted preferences. Non-string values are dropped; anything
    /// other than a JSON object yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        let object = value.as_object()?;
        let by_language = object
            .iter()
            .filter_map(|(lang, key)| Some((lang.clone(), key.as_str()?.to_string())))
            .collect();
        Some(Self { by_language })
    }

    pub fn to_json(&self) -> Result<String, ReaderError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The preference slot a language tag belongs to.
    pub fn language_key(tag: &str) -> Option<String> {
        let normalized = normalize_tag(tag);
        let base = normalized.split('-').next().unwrap_or_default();
        match base {
            "" => None,
            "zh" | "cmn" | "yue" => {
                if normalized.contains("tw") || normalized.contains("hant") || base == "yue" {
                    Some("zh-hant".to_string())
                } else {
                    Some("zh-hans".to_string())
                }
            }
            _ => Some(base.to_string()),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        let lang = Self::language_key(tag)?;
        self.by_language.get(&lang).map(String::as_str)
    }

    /// Remember `voice` for its own language. Returns false when the
    /// voice has no usable language tag.
    pub fn remember(&mut self, voice: &VoiceDescriptor) -> bool {
        match Self::language_key(&voice.lang) {
            Some(lang) => {
                self.by_language.insert(lang, voice.key());
                true
            }
            None => false,
        }
    }

    /// Index of the remembered voice for `tag`, if it is still listed.
    pub fn find_voice(&self, tag: &str, voices: &[VoiceDescriptor]) -> Option<usize> {
        let key = self.get(tag)?;
        voices.iter().position(|v| v.key() == key)
    }

    pub fn is_empty(&self) -> bool {
        self.by_language.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_by_base_language() {
        let mut prefs = VoicePreferences::new();
        let voice = VoiceDescriptor::new("Karen", "en_AU");
        assert!(prefs.remember(&voice));
        assert_eq!(prefs.get("en-US"), Some("Karen|en_AU"));
        assert_eq!(prefs.get("fr"), None);

        let voices = vec![VoiceDescriptor::new("Alex", "en-US"), voice];
        assert_eq!(prefs.find_voice("EN", &voices), Some(1));
        assert!(!prefs.remember(&VoiceDescriptor::new("Mystery", "")));
    }

    #[test]
    fn json_round_trip_drops_bad_values() {
        let prefs = VoicePreferences::from_json(r#"{"en":"Karen|en-AU","fr":3}"#).unwrap();
        assert_eq!(prefs.get("en"), Some("Karen|en-AU"));
        assert_eq!(prefs.get("fr"), None);
        assert_eq!(prefs.to_json().unwrap(), r#"{"en":"Karen|en-AU"}"#);
        assert_eq!(VoicePreferences::from_json("[]"), None);
    }

    #[test]
    fn chinese_scripts_are_remembered_apart() {
        assert_eq!(VoicePreferences::language_key("zh-TW").as_deref(), Some("zh-hant"));
        assert_eq!(VoicePreferences::language_key("zh_Hant_HK").as_deref(), Some("zh-hant"));
        assert_eq!(VoicePreferences::language_key("zh-CN").as_deref(), Some("zh-hans"));
        assert_eq!(VoicePreferences::language_key("cmn-Hans-CN").as_deref(), Some("zh-hans"));

        let mut prefs = VoicePreferences::new();
        let meijia = VoiceDescriptor::new("Mei-Jia", "zh-TW");
        assert!(prefs.remember(&meijia));
        let voices = vec![VoiceDescriptor::new("Tingting", "zh-CN"), meijia];
        assert_eq!(prefs.find_voice("zh-CN", &voices), None);
        assert_eq!(prefs.find_voice("zh-TW", &voices), Some(1));
        assert_eq!(prefs.to_json().unwrap(), r#"{"zh-hant":"Mei-Jia|zh-TW"}"#);
    }
}
