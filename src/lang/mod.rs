//! Language detection and voice selection.
//!
//! Detection is heuristic: script ranges first, then a traditional versus
//! simplified count for Han text, then diacritic and stop-word scoring for
//! Latin text, then the host locale.
//!
//! | Signal | Result |
//! |---|---|
//! | Hiragana / Katakana | `ja` |
//! | Hangul | `ko` |
//! | Bopomofo | `zh-TW` |
//! | Han ideographs | `zh-TW` or `zh-CN` |
//! | Cyrillic, Arabic, Hebrew, Devanagari, Thai | `ru`, `ar`, `he`, `hi`, `th` |
//! | Latin diacritics and stop words | `en`, `es`, `fr`, `de`, `it`, `pt`, `tr`, `vi` |
//! | nothing | fallback locale |
//!
//! ```rust
//! use speech_reader::lang::{detect_language, select_voice_for};
//! use speech_reader::VoiceDescriptor;
//!
//! let voices = vec![
//!     VoiceDescriptor::new("Kyoko", "ja-JP"),
//!     VoiceDescriptor::new("Google 日本語", "ja-JP"),
//! ];
//! let tag = detect_language("これはテストです").unwrap();
//! assert_eq!(tag, "ja");
//! assert_eq!(select_voice_for(&tag, &voices), Some(1));
//! ```

pub mod chinese;
pub mod detect;
pub mod label;
pub mod voice;

pub use detect::{detect_language, DetectorConfig, LanguageDetector};
pub use label::language_label;
pub use voice::{select_voice_for, should_reselect, ReselectOptions};
