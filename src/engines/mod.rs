//! Speech engine implementations.
//!
//! Real engines (a browser's speech synthesis, a platform TTS service)
//! live with the host and implement [`SpeechEngine`](crate::SpeechEngine)
//! there. This module ships the in-process engine used by tests and demos.
//!
//! # Available Engines
//!
//! - [`MemoryEngine`] - records requests, completes them on demand

pub mod memory;

pub use memory::MemoryEngine;
