//! The reader session: one explicit state struct behind every user action.
//!
//! [`Reader`] owns the playback controller, the slot collection, the voice
//! list and the auto-detect state. Hosts call its methods for user actions,
//! forward engine notifications to [`Reader::on_utterance_event`] and call
//! [`Reader::tick`] whenever the instant it last returned has passed.
//!
//! After every action the active slot is mirrored to storage (text,
//! progress and play status), so a reload resumes where the user left off.

use std::time::Instant;

use log::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::lang::voice::{select_voice_for, should_reselect, voice_matches_language, ReselectOptions};
use crate::lang::{language_label, LanguageDetector};
use crate::playback::{EventOutcome, PlayState, PlaybackController};
use crate::storage::{KeyValueStore, Slot, SlotStore, VoicePreferences};
use crate::text::normalize;
use crate::{SpeechEngine, UtteranceEvent, VoiceDescriptor};

/// Label shown when no language is detected or auto-detect is off.
pub const AUTO_DETECT_PLACEHOLDER: &str = "Auto-detect language";

/// A text-to-speech reader session over an engine `E` and a store `S`.
///
/// Owns the text, the playback controller, voice selection and the slots.
/// Every action writes the active slot back to the store. Timed work
/// (debounced detection, restart polling) runs from [`Reader::tick`].
///
/// ```rust
/// use std::time::Instant;
/// use speech_reader::{engines::MemoryEngine, storage::MemoryStore, Reader, ReaderConfig};
///
/// let mut reader: Reader<MemoryEngine, MemoryStore> =
///     Reader::new(None, Some(MemoryStore::new()), ReaderConfig::default());
/// assert!(reader.startup_error().is_some());
///
/// reader.set_text("Kept without an engine.", Instant::now());
/// assert!(!reader.play(Instant::now()));
/// assert_eq!(reader.slot(1).unwrap().text, "Kept without an engine.");
/// ```
pub struct Reader<E, S> {
    engine: Option<E>,
    startup_error: Option<ReaderError>,
    config: ReaderConfig,
    controller: PlaybackController,
    slots: SlotStore<S>,
    detector: LanguageDetector,
    text: String,
    displayed_chunk: Option<String>,
    voices: Vec<VoiceDescriptor>,
    selected_voice: Option<usize>,
    selected_voice_key: Option<String>,
    voice_prefs: VoicePreferences,
    auto_detect: bool,
    detected_language: Option<String>,
    detect_due: Option<Instant>,
}

impl<E: SpeechEngine, S: KeyValueStore> Reader<E, S> {
    /// Build a reader and restore the active slot.
    ///
    /// Without an engine the reader still edits and persists text but every
    /// playback operation is a no-op, and [`startup_error`](Self::startup_error)
    /// reports why. An invalid config is replaced by the default one.
    pub fn new(engine: Option<E>, store: Option<S>, config: ReaderConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("{}; using the default reader config", e);
                ReaderConfig::default()
            }
        };

        let startup_error = if engine.is_none() {
            let error = ReaderError::EngineUnavailable;
            warn!("{}", error);
            Some(error)
        } else {
            None
        };

        let mut slots = SlotStore::open(store, &config.storage_prefix, config.slot_count);
        let voice_prefs = slots.load_voice_preferences();

        let mut reader = Self {
            auto_detect: config.auto_detect && engine.is_some(),
            engine,
            startup_error,
            controller: PlaybackController::new(config.playback()),
            detector: LanguageDetector::new(config.detector()),
            slots,
            text: String::new(),
            displayed_chunk: None,
            voices: Vec::new(),
            selected_voice: None,
            selected_voice_key: None,
            voice_prefs,
            detected_language: None,
            detect_due: None,
            config,
        };
        reader.apply_slot_state();
        reader.on_voices_changed();
        info!(
            "Reader ready: slot {} of {}, {} voices, storage {}",
            reader.slots.active_number(),
            reader.slots.slot_count(),
            reader.voices.len(),
            if reader.slots.storage_enabled() { "on" } else { "off" }
        );
        reader
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    /// Direct engine access, e.g. to drive an in-process engine.
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// Why playback is disabled, if it is.
    pub fn startup_error(&self) -> Option<&ReaderError> {
        self.startup_error.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn slots(&self) -> &SlotStore<S> {
        &self.slots
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn play_state(&self) -> PlayState {
        self.controller.state()
    }

    pub fn current_index(&self) -> usize {
        self.controller.current_index()
    }

    pub fn chunk_count(&self) -> usize {
        self.controller.chunk_count()
    }

    /// Current index and chunk count, for an "n / total" display.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index(), self.chunk_count())
    }

    /// The chunk being spoken, once the engine has reported it started.
    pub fn displayed_chunk(&self) -> Option<&str> {
        self.displayed_chunk.as_deref()
    }

    pub fn auto_detect(&self) -> bool {
        self.auto_detect
    }

    pub fn detected_language(&self) -> Option<&str> {
        self.detected_language.as_deref()
    }

    /// `"Auto-detected: French (fr)"`, or the placeholder.
    pub fn detected_label(&self) -> String {
        match (&self.detected_language, self.auto_detect) {
            (Some(lang), true) => format!("Auto-detected: {}", language_label(lang)),
            _ => AUTO_DETECT_PLACEHOLDER.to_string(),
        }
    }

    pub fn voices(&self) -> &[VoiceDescriptor] {
        &self.voices
    }

    pub fn selected_voice_index(&self) -> Option<usize> {
        self.selected_voice
    }

    pub fn selected_voice(&self) -> Option<&VoiceDescriptor> {
        self.selected_voice.and_then(|i| self.voices.get(i))
    }

    pub fn voice_preferences(&self) -> &VoicePreferences {
        &self.voice_prefs
    }

    /// 1-based number of the active slot.
    pub fn active_slot(&self) -> usize {
        self.slots.active_number()
    }

    pub fn slot(&self, number: usize) -> Option<&Slot> {
        self.slots.slot(number)
    }

    pub fn storage_enabled(&self) -> bool {
        self.slots.storage_enabled()
    }

    /// Start from the current index, or resume when paused.
    pub fn play(&mut self, now: Instant) -> bool {
        if self.engine.is_none() {
            return false;
        }
        if self.controller.state() == PlayState::Stopped {
            self.apply_auto_detect(ReselectOptions::default());
        }
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let playing = self.controller.play(engine, &self.text, now);
        self.sync_slot();
        playing
    }

    pub fn pause(&mut self) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let paused = self.controller.pause(engine);
        self.sync_slot();
        paused
    }

    pub fn resume(&mut self) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let resumed = self.controller.resume(engine);
        self.sync_slot();
        resumed
    }

    /// Pause when playing; otherwise play or resume.
    pub fn toggle_play_pause(&mut self, now: Instant) -> bool {
        if self.controller.state() == PlayState::Playing {
            self.pause()
        } else {
            self.play(now)
        }
    }

    pub fn stop(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        self.controller.stop(engine);
        self.sync_slot();
    }

    pub fn rewind(&mut self, now: Instant) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let moved = self.controller.rewind(engine, now);
        self.sync_slot();
        moved
    }

    pub fn forward(&mut self, now: Instant) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        let moved = self.controller.forward(engine, now);
        self.sync_slot();
        moved
    }

    /// Replace the active slot's text.
    ///
    /// A real change cancels playback, resets progress to the first chunk,
    /// drops the chunk cache and schedules language detection after the
    /// debounce period.
    pub fn set_text(&mut self, text: &str, now: Instant) {
        if text == self.text {
            return;
        }
        self.text = text.to_string();
        self.halt_playback();
        self.controller.restore_index(0);
        self.controller.invalidate_chunks();
        self.displayed_chunk = None;
        self.sync_slot();
        self.detect_due = Some(now + self.config.detect_debounce);
    }

    /// Make slot `number` active. Out-of-range numbers select slot 1.
    ///
    /// The outgoing slot is saved first, as paused if it was playing. Returns
    /// the slot number that is active afterwards.
    pub fn switch_slot(&mut self, number: usize) -> usize {
        let target = self.slots.normalize_slot_number(number);
        if target == self.slots.active_number() {
            return target;
        }

        let status = match self.controller.state() {
            PlayState::Playing => PlayState::Paused,
            other => other,
        };
        self.slots
            .persist_active(&self.text, self.controller.current_index(), status);
        self.halt_playback();
        self.slots.set_active(target);
        self.apply_slot_state();
        debug!("Switched to slot {}", target);
        target
    }

    /// Turn automatic language detection on or off.
    pub fn set_auto_detect(&mut self, enabled: bool) {
        self.auto_detect = enabled && self.engine.is_some();
        if self.auto_detect {
            self.apply_auto_detect(ReselectOptions::forced());
        } else {
            self.detected_language = None;
        }
    }

    /// Manually choose a voice. The choice is remembered for the voice's
    /// base language.
    pub fn select_voice(&mut self, index: usize) -> bool {
        let Some(voice) = self.voices.get(index).cloned() else {
            return false;
        };
        self.set_selected_voice(Some(index));
        if self.voice_prefs.remember(&voice) {
            self.slots.save_voice_preferences(&self.voice_prefs);
        }
        true
    }

    /// Re-read the engine's voice list.
    ///
    /// The previously selected voice stays selected when it is still listed;
    /// otherwise the engine default (or the first voice) is taken. Then
    /// voice selection for the detected language is forced.
    pub fn on_voices_changed(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        self.voices = engine.list_voices();
        debug!("Voice list has {} voices", self.voices.len());

        let kept = self
            .selected_voice_key
            .as_ref()
            .and_then(|key| self.voices.iter().position(|v| &v.key() == key));
        let selection = kept
            .or_else(|| self.voices.iter().position(|v| v.is_default))
            .or(if self.voices.is_empty() { None } else { Some(0) });
        self.set_selected_voice(selection);
        self.apply_auto_detect(ReselectOptions::forced());
    }

    /// Feed an engine notification to the controller.
    pub fn on_utterance_event(&mut self, event: &UtteranceEvent) -> EventOutcome {
        let Some(engine) = self.engine.as_mut() else {
            return EventOutcome::Stale;
        };
        let outcome = self.controller.handle_event(engine, event);
        match &outcome {
            EventOutcome::Started { chunk, .. } => self.displayed_chunk = Some(chunk.clone()),
            EventOutcome::Finished
            | EventOutcome::Stale
            | EventOutcome::Advanced { .. }
            | EventOutcome::Held => {}
        }
        self.sync_slot();
        outcome
    }

    /// Run due timers: the pending (re)start poll and debounced detection.
    ///
    /// Returns the instant at which `tick` should run next.
    pub fn tick(&mut self, now: Instant) -> Option<Instant> {
        if self.detect_due.is_some_and(|due| now >= due) {
            self.detect_due = None;
            self.apply_auto_detect(ReselectOptions::default());
        }

        let playback_wakeup = match self.engine.as_mut() {
            Some(engine) => self.controller.tick(engine, now),
            None => None,
        };
        self.sync_slot();

        [self.detect_due, playback_wakeup].into_iter().flatten().min()
    }

    /// Detect the text's language and, when the guard allows, pick a voice
    /// for it.
    fn apply_auto_detect(&mut self, options: ReselectOptions) {
        if !self.auto_detect {
            self.detected_language = None;
            return;
        }
        self.detected_language = self.detector.detect(&normalize(&self.text));
        let Some(lang) = self.detected_language.clone() else {
            return;
        };
        if !should_reselect(&lang, &self.voices, self.selected_voice, options) {
            return;
        }

        let remembered = self
            .voice_prefs
            .find_voice(&lang, &self.voices)
            .filter(|&i| voice_matches_language(&self.voices[i], &lang));
        if let Some(index) = remembered.or_else(|| select_voice_for(&lang, &self.voices)) {
            debug!("Selected voice {:?} for {}", self.voices[index].name, lang);
            self.set_selected_voice(Some(index));
        }
    }

    fn set_selected_voice(&mut self, index: Option<usize>) {
        let voice = index.and_then(|i| self.voices.get(i)).cloned();
        self.selected_voice = voice.as_ref().and(index);
        self.selected_voice_key = voice.as_ref().map(VoiceDescriptor::key);
        self.controller.set_voice(voice);
    }

    /// Load the active slot into the session.
    fn apply_slot_state(&mut self) {
        let slot = self.slots.active_slot().clone();
        self.text = slot.text;
        self.controller.restore_index(slot.progress);
        self.controller.invalidate_chunks();
        self.displayed_chunk = None;
        self.detect_due = None;
        self.apply_auto_detect(ReselectOptions::forced());
    }

    fn halt_playback(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            self.controller.halt(engine);
        }
    }

    /// Mirror the session to the active slot. A stopped session shows no chunk.
    fn sync_slot(&mut self) {
        if self.controller.state() == PlayState::Stopped {
            self.displayed_chunk = None;
        }
        self.slots.persist_active(
            &self.text,
            self.controller.current_index(),
            self.controller.state(),
        );
    }
}
