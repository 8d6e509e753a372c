//! # speech-reader
//!
//! The core of a text-to-speech reader: it cleans up user text, cuts it into
//! bounded chunks, picks a voice for the detected language and drives an
//! external speech engine one chunk at a time, persisting position and
//! content across named slots.
//!
//! ## Features
//!
//! - **Text preparation**: markdown stripping and punctuation-aware chunking ([`text`])
//! - **Language detection**: script, Chinese-variant and keyword heuristics ([`lang`])
//! - **Voice selection**: locale-prefix ranking with a quality preference ([`lang::voice`])
//! - **Playback control**: play/pause/resume/stop/rewind/forward with stale-callback immunity ([`playback`])
//! - **Slots**: several independently persisted documents ([`storage`])
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Instant;
//! use speech_reader::{engines::MemoryEngine, storage::MemoryStore, Reader, ReaderConfig};
//!
//! let engine = MemoryEngine::with_voices(vec![
//!     speech_reader::VoiceDescriptor::new("Samantha", "en-US").with_default(true),
//! ]);
//! let mut reader = Reader::new(Some(engine), Some(MemoryStore::new()), ReaderConfig::default());
//!
//! let now = Instant::now();
//! reader.set_text("# Hello\n\nThis is a **test**. It has two sentences.", now);
//! reader.play(now);
//! reader.tick(now);
//!
//! let spoken = reader.engine().unwrap().spoken_texts();
//! assert_eq!(spoken, vec!["Hello"]);
//! ```

pub mod config;
pub mod engines;
pub mod error;
pub mod lang;
pub mod playback;
pub mod reader;
pub mod storage;
pub mod text;

use serde::{Deserialize, Serialize};

pub use config::{ReaderConfig, ReaderConfigBuilder};
pub use error::{ReaderError, StorageError};
pub use playback::{PlayState, PlaybackController};
pub use reader::Reader;

/// Name fragments that mark a voice as higher quality.
pub const HIGH_QUALITY_MARKERS: &[&str] = &["google"];

/// A voice offered by the speech engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceDescriptor {
    /// Engine-visible voice name
    pub name: String,
    /// BCP 47 language tag as reported by the engine (e.g. `en-US`, `zh_TW`)
    pub lang: String,
    /// Whether the engine flags this as its default voice
    #[serde(default)]
    pub is_default: bool,
}

impl VoiceDescriptor {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            is_default: false,
        }
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// True when the name carries one of the [`HIGH_QUALITY_MARKERS`].
    pub fn is_high_quality(&self) -> bool {
        let name = self.name.to_lowercase();
        HIGH_QUALITY_MARKERS.iter().any(|marker| name.contains(marker))
    }

    /// 0 for high-quality voices, 1 otherwise.
    pub fn quality_rank(&self) -> u8 {
        if self.is_high_quality() {
            0
        } else {
            1
        }
    }

    /// Stable identity used to remember a voice across list refreshes.
    pub fn key(&self) -> String {
        format!("{}|{}", self.name, self.lang)
    }
}

/// Identifier of one dispatched utterance. Ids increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtteranceId(pub u64);

/// A request to speak exactly one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceRequest {
    pub id: UtteranceId,
    pub text: String,
    /// Voice to use; `None` lets the engine choose.
    pub voice: Option<VoiceDescriptor>,
    pub rate: f32,
}

/// Lifecycle notification for a dispatched utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEventKind {
    Started,
    Ended,
    Errored(String),
}

/// An engine notification, tagged with the utterance it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceEvent {
    pub id: UtteranceId,
    pub kind: UtteranceEventKind,
}

impl UtteranceEvent {
    pub fn started(id: UtteranceId) -> Self {
        Self { id, kind: UtteranceEventKind::Started }
    }

    pub fn ended(id: UtteranceId) -> Self {
        Self { id, kind: UtteranceEventKind::Ended }
    }

    pub fn errored(id: UtteranceId, reason: impl Into<String>) -> Self {
        Self {
            id,
            kind: UtteranceEventKind::Errored(reason.into()),
        }
    }
}

/// Common interface for the external speech-synthesis engine.
///
/// The engine owns audio output; the reader only hands it text. Every
/// [`speak`](SpeechEngine::speak) must eventually be answered by the host
/// with [`UtteranceEvent`]s carrying the request id, though their timing
/// relative to [`cancel`](SpeechEngine::cancel) is unspecified.
pub trait SpeechEngine {
    /// Queue one utterance.
    fn speak(&mut self, request: UtteranceRequest);

    /// Pause the current utterance in place.
    fn pause(&mut self);

    /// Resume a paused utterance.
    fn resume(&mut self);

    /// Drop the current and queued utterances. May complete asynchronously.
    fn cancel(&mut self);

    /// True while audio is being produced.
    fn is_speaking(&self) -> bool;

    /// True while utterances are queued but not yet started.
    fn is_pending(&self) -> bool;

    /// Voices currently offered by the engine.
    fn list_voices(&self) -> Vec<VoiceDescriptor>;

    /// True when the engine is still busy with earlier work.
    ///
    /// Default implementation is `is_speaking() || is_pending()`.
    fn is_busy(&self) -> bool {
        self.is_speaking() || self.is_pending()
    }
}
