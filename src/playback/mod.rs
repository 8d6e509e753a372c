//! Chunk-by-chunk playback control.
//!
//! [`PlaybackController`] owns the [`PlaybackSession`] (chunk sequence,
//! current index, play state) and is its only writer. Hosts request
//! transitions through the controller's methods and feed it engine
//! notifications with [`PlaybackController::handle_event`].
//!
//! Two mechanisms keep late engine callbacks from corrupting state:
//!
//! - Every dispatched chunk gets a fresh [`UtteranceId`](crate::UtteranceId);
//!   only events for the single active id are acted on.
//! - Every (re)start gets a fresh restart request id and waits, by polling
//!   [`tick`](PlaybackController::tick), until the engine is idle or the
//!   restart timeout passes. A newer request supersedes any older one.
//!
//! ```text
//! Stopped --play--> Playing --pause--> Paused
//!    ^                |  ^               |
//!    |                |  +----resume-----+
//!    +--stop / end ---+--------stop------+
//! ```

mod controller;
mod session;

use std::time::Duration;

use serde::Serialize;

pub use controller::{EventOutcome, PlaybackController, RestartPoll};
pub use session::PlaybackSession;

use crate::text::MAX_CHUNK_LEN;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlayState {
    /// Playing or paused; the session has a position worth keeping.
    pub fn is_active(self) -> bool {
        !matches!(self, PlayState::Stopped)
    }
}

/// Parameters for the playback controller.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// Maximum chunk length in characters. Default 240.
    pub max_chunk_len: usize,
    /// Speech rate passed with every utterance. Default 1.0.
    pub rate: f32,
    /// Longest wait for the engine to go idle before a (re)start. Default 500ms.
    pub restart_timeout: Duration,
    /// Interval between idle checks. Default 30ms.
    pub restart_poll_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_chunk_len: MAX_CHUNK_LEN,
            rate: 1.0,
            restart_timeout: Duration::from_millis(500),
            restart_poll_interval: Duration::from_millis(30),
        }
    }
}
