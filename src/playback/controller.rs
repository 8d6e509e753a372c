use std::time::Instant;

use super::{PlayState, PlaybackConfig, PlaybackSession};
use crate::text::segment_with_max_len;
use crate::{SpeechEngine, UtteranceEvent, UtteranceEventKind, UtteranceId, UtteranceRequest, VoiceDescriptor};

/// The utterance whose events may still change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveUtterance {
    id: UtteranceId,
    chunk_index: usize,
    /// The engine reported completion while the session was paused.
    completed: bool,
}

/// A (re)start waiting for the engine to go idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRestart {
    request_id: u64,
    started_at: Instant,
    poll_at: Instant,
}

/// Result of one idle check for a pending (re)start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPoll {
    /// A newer request replaced this one, or it was cancelled.
    Superseded,
    /// The engine is still busy; check again at `retry_at`.
    Waiting { retry_at: Instant },
    /// The chunk at the current index was handed to the engine.
    Dispatched(UtteranceId),
    /// The index was past the end of the sequence; playback stopped.
    Finished,
}

/// What an engine notification did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event belongs to a superseded utterance and was dropped.
    Stale,
    /// The active chunk started speaking.
    Started { index: usize, chunk: String },
    /// The active chunk completed and the next one was dispatched.
    Advanced { index: usize },
    /// The last chunk completed; playback stopped.
    Finished,
    /// The active chunk completed while paused; the next chunk follows on resume.
    Held,
}

/// State machine driving the engine one chunk at a time.
///
/// Every method that talks to the engine takes it as `&mut E`, so the
/// controller never holds a reference to it and the host stays free to
/// deliver events between calls.
#[derive(Debug)]
pub struct PlaybackController {
    config: PlaybackConfig,
    session: PlaybackSession,
    voice: Option<VoiceDescriptor>,
    last_utterance_id: u64,
    active: Option<ActiveUtterance>,
    restart_seq: u64,
    pending_restart: Option<PendingRestart>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            session: PlaybackSession::default(),
            voice: None,
            last_utterance_id: 0,
            active: None,
            restart_seq: 0,
            pending_restart: None,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> PlayState {
        self.session.state
    }

    pub fn current_index(&self) -> usize {
        self.session.current_index
    }

    pub fn chunk_count(&self) -> usize {
        self.session.chunks.len()
    }

    /// Id of the utterance whose events are currently accepted.
    pub fn active_utterance(&self) -> Option<UtteranceId> {
        self.active.map(|a| a.id)
    }

    pub fn voice(&self) -> Option<&VoiceDescriptor> {
        self.voice.as_ref()
    }

    /// Voice used for chunks dispatched from now on.
    pub fn set_voice(&mut self, voice: Option<VoiceDescriptor>) {
        self.voice = voice;
    }

    /// Restore a saved position. Ignored unless stopped; clamped on the next play.
    pub fn restore_index(&mut self, index: usize) {
        if self.session.state == PlayState::Stopped {
            self.session.current_index = index;
        }
    }

    /// Drop the cached chunk sequence so the next play re-segments.
    pub fn invalidate_chunks(&mut self) {
        self.session.clear_chunks();
    }

    /// Start playing `text` from the current index, or resume when paused.
    ///
    /// Returns true when the session is playing afterwards.
    pub fn play<E: SpeechEngine>(&mut self, engine: &mut E, text: &str, now: Instant) -> bool {
        match self.session.state {
            PlayState::Paused => return self.resume(engine),
            PlayState::Playing => return true,
            PlayState::Stopped => {}
        }

        if text.trim().is_empty() && self.session.chunks.is_empty() {
            return false;
        }

        self.cancel_activity(engine);
        if !self.session.is_cached_for(text) {
            self.session.chunks = segment_with_max_len(text, self.config.max_chunk_len);
            self.session.source_text = text.to_string();
            log::debug!("Segmented text into {} chunks", self.session.chunks.len());
        }
        if self.session.chunks.is_empty() {
            return false;
        }

        self.session.clamp_index();
        self.session.state = PlayState::Playing;
        self.schedule_speak(now);
        true
    }

    /// Pause the engine in place. Only meaningful while playing.
    pub fn pause<E: SpeechEngine>(&mut self, engine: &mut E) -> bool {
        if self.session.state != PlayState::Playing {
            return false;
        }
        engine.pause();
        self.session.state = PlayState::Paused;
        true
    }

    /// Resume a paused engine without re-dispatching.
    ///
    /// If the paused chunk already completed, the next chunk is dispatched
    /// instead; past the last chunk playback stops.
    pub fn resume<E: SpeechEngine>(&mut self, engine: &mut E) -> bool {
        if self.session.state != PlayState::Paused {
            return false;
        }
        engine.resume();
        self.session.state = PlayState::Playing;
        if self.active.is_some_and(|a| a.completed) {
            self.active = None;
            self.session.current_index += 1;
            return self.speak_current(engine).is_some();
        }
        true
    }

    /// Cancel everything, rewind to the first chunk and drop the chunk cache.
    pub fn stop<E: SpeechEngine>(&mut self, engine: &mut E) {
        self.cancel_activity(engine);
        self.session.state = PlayState::Stopped;
        self.session.current_index = 0;
        self.session.clear_chunks();
    }

    /// Cancel playback but keep the index, as when the text or slot changes.
    pub fn halt<E: SpeechEngine>(&mut self, engine: &mut E) {
        if self.session.state.is_active() {
            self.cancel_activity(engine);
        }
        self.session.state = PlayState::Stopped;
    }

    /// Step back one chunk (not below the first) and speak from there.
    pub fn rewind<E: SpeechEngine>(&mut self, engine: &mut E, now: Instant) -> bool {
        if !self.session.state.is_active() {
            return false;
        }
        self.cancel_activity(engine);
        self.session.current_index = self.session.current_index.saturating_sub(1);
        self.session.state = PlayState::Playing;
        self.schedule_speak(now);
        true
    }

    /// Skip to the next chunk; stops when there is none.
    pub fn forward<E: SpeechEngine>(&mut self, engine: &mut E, now: Instant) -> bool {
        if !self.session.state.is_active() {
            return false;
        }
        self.cancel_activity(engine);
        self.session.current_index += 1;
        if self.session.current_index >= self.session.chunks.len() {
            self.stop(engine);
            return true;
        }
        self.session.state = PlayState::Playing;
        self.schedule_speak(now);
        true
    }

    /// Apply an engine notification.
    ///
    /// Events for anything but the active utterance are dropped. Errors
    /// count as completion so one bad chunk does not stall playback.
    pub fn handle_event<E: SpeechEngine>(
        &mut self,
        engine: &mut E,
        event: &UtteranceEvent,
    ) -> EventOutcome {
        let Some(active) = self.active.filter(|a| a.id == event.id) else {
            log::debug!("Ignoring stale event for utterance {:?}", event.id);
            return EventOutcome::Stale;
        };

        match &event.kind {
            UtteranceEventKind::Started => EventOutcome::Started {
                index: active.chunk_index,
                chunk: self
                    .session
                    .chunks
                    .get(active.chunk_index)
                    .cloned()
                    .unwrap_or_default(),
            },
            UtteranceEventKind::Ended | UtteranceEventKind::Errored(_) => {
                if let UtteranceEventKind::Errored(reason) = &event.kind {
                    log::warn!(
                        "Speech synthesis error on chunk {}: {reason}",
                        active.chunk_index
                    );
                }
                if self.session.state != PlayState::Playing {
                    self.active = Some(ActiveUtterance {
                        completed: true,
                        ..active
                    });
                    return EventOutcome::Held;
                }

                self.active = None;
                self.session.current_index += 1;
                match self.speak_current(engine) {
                    Some(_) => EventOutcome::Advanced {
                        index: self.session.current_index,
                    },
                    None => EventOutcome::Finished,
                }
            }
        }
    }

    /// Queue a (re)start that supersedes any earlier one. Returns its request id.
    pub fn schedule_speak(&mut self, now: Instant) -> u64 {
        self.restart_seq += 1;
        self.pending_restart = Some(PendingRestart {
            request_id: self.restart_seq,
            started_at: now,
            poll_at: now,
        });
        self.restart_seq
    }

    /// Check whether restart `request_id` may dispatch yet.
    ///
    /// While the engine is busy the request waits, up to the restart
    /// timeout; after that the engine is cancelled again and the chunk is
    /// dispatched anyway.
    pub fn poll_restart<E: SpeechEngine>(
        &mut self,
        engine: &mut E,
        request_id: u64,
        now: Instant,
    ) -> RestartPoll {
        let Some(pending) = self
            .pending_restart
            .filter(|p| p.request_id == request_id)
        else {
            return RestartPoll::Superseded;
        };

        let waited = now.saturating_duration_since(pending.started_at);
        if engine.is_busy() {
            if waited < self.config.restart_timeout {
                let retry_at = now + self.config.restart_poll_interval;
                self.pending_restart = Some(PendingRestart {
                    poll_at: retry_at,
                    ..pending
                });
                return RestartPoll::Waiting { retry_at };
            }
            log::debug!("Engine still busy after {waited:?}; cancelling before restart");
            engine.cancel();
        }

        self.pending_restart = None;
        match self.speak_current(engine) {
            Some(id) => RestartPoll::Dispatched(id),
            None => RestartPoll::Finished,
        }
    }

    /// Run the pending restart if it is due. Returns when to tick next.
    pub fn tick<E: SpeechEngine>(&mut self, engine: &mut E, now: Instant) -> Option<Instant> {
        if let Some(pending) = self.pending_restart {
            if now >= pending.poll_at {
                self.poll_restart(engine, pending.request_id, now);
            }
        }
        self.next_wakeup()
    }

    pub fn next_wakeup(&self) -> Option<Instant> {
        self.pending_restart.map(|p| p.poll_at)
    }

    /// Dispatch the chunk at the current index, or stop past the end.
    fn speak_current<E: SpeechEngine>(&mut self, engine: &mut E) -> Option<UtteranceId> {
        let index = self.session.current_index;
        let Some(chunk) = self.session.chunks.get(index).cloned() else {
            log::debug!("Reached end of {} chunks", self.session.chunks.len());
            self.stop(engine);
            return None;
        };

        self.last_utterance_id += 1;
        let id = UtteranceId(self.last_utterance_id);
        self.active = Some(ActiveUtterance {
            id,
            chunk_index: index,
            completed: false,
        });

        engine.speak(UtteranceRequest {
            id,
            text: chunk,
            voice: self.voice.clone(),
            rate: self.config.rate,
        });
        Some(id)
    }

    /// Invalidate the active utterance and any pending restart, then cancel the engine.
    fn cancel_activity<E: SpeechEngine>(&mut self, engine: &mut E) {
        self.pending_restart = None;
        self.restart_seq += 1;
        self.active = None;
        engine.cancel();
    }
}
