use super::PlayState;

/// The active chunk sequence, position and play state.
///
/// Read-only outside the playback module; all mutation goes through
/// [`PlaybackController`](super::PlaybackController).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackSession {
    pub(super) chunks: Vec<String>,
    /// Text the cached chunks were built from.
    pub(super) source_text: String,
    pub(super) current_index: usize,
    pub(super) state: PlayState,
}

impl PlaybackSession {
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    /// Whether the cached chunks can be reused for `text`.
    pub(super) fn is_cached_for(&self, text: &str) -> bool {
        !self.chunks.is_empty() && self.source_text == text
    }

    pub(super) fn clear_chunks(&mut self) {
        self.chunks.clear();
        self.source_text.clear();
    }

    /// Keep the index inside the chunk sequence.
    pub(super) fn clamp_index(&mut self) {
        let max_index = self.chunks.len().saturating_sub(1);
        self.current_index = self.current_index.min(max_index);
    }
}
