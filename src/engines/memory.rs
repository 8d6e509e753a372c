use crate::{SpeechEngine, UtteranceEvent, UtteranceId, UtteranceRequest, VoiceDescriptor};

/// In-process speech engine that produces no audio.
///
/// It records every request and leaves completion to the caller: the host
/// (or a test) advances an utterance with [`start_current`](Self::start_current),
/// [`finish_current`](Self::finish_current) or [`fail_current`](Self::fail_current)
/// and feeds the returned event back to the reader. [`set_busy`](Self::set_busy)
/// simulates an engine that is slow to honour `cancel()`.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    voices: Vec<VoiceDescriptor>,
    history: Vec<UtteranceRequest>,
    in_flight: Option<UtteranceId>,
    speaking: bool,
    paused: bool,
    forced_busy: bool,
    cancels: usize,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: Vec<VoiceDescriptor>) -> Self {
        Self {
            voices,
            ..Self::default()
        }
    }

    /// Replace the voice list, as when the platform finishes loading voices.
    pub fn set_voices(&mut self, voices: Vec<VoiceDescriptor>) {
        self.voices = voices;
    }

    /// Report busy regardless of in-flight work until cleared.
    pub fn set_busy(&mut self, busy: bool) {
        self.forced_busy = busy;
    }

    /// Every request received, in order.
    pub fn history(&self) -> &[UtteranceRequest] {
        &self.history
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.history.iter().map(|r| r.text.clone()).collect()
    }

    pub fn last_request(&self) -> Option<&UtteranceRequest> {
        self.history.last()
    }

    pub fn in_flight(&self) -> Option<UtteranceId> {
        self.in_flight
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels
    }

    /// Mark the in-flight utterance as started.
    pub fn start_current(&mut self) -> Option<UtteranceEvent> {
        let id = self.in_flight?;
        self.speaking = true;
        Some(UtteranceEvent::started(id))
    }

    /// Complete the in-flight utterance.
    pub fn finish_current(&mut self) -> Option<UtteranceEvent> {
        let id = self.in_flight.take()?;
        self.speaking = false;
        Some(UtteranceEvent::ended(id))
    }

    /// Fail the in-flight utterance.
    pub fn fail_current(&mut self, reason: &str) -> Option<UtteranceEvent> {
        let id = self.in_flight.take()?;
        self.speaking = false;
        Some(UtteranceEvent::errored(id, reason))
    }
}

impl SpeechEngine for MemoryEngine {
    fn speak(&mut self, request: UtteranceRequest) {
        log::debug!("MemoryEngine speak #{}: {:?}", request.id.0, request.text);
        self.in_flight = Some(request.id);
        self.history.push(request);
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn cancel(&mut self) {
        self.cancels += 1;
        self.in_flight = None;
        self.speaking = false;
        self.paused = false;
    }

    fn is_speaking(&self) -> bool {
        self.forced_busy || self.speaking
    }

    fn is_pending(&self) -> bool {
        self.in_flight.is_some() && !self.speaking
    }

    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.voices.clone()
    }
}
