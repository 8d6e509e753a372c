//! Text preparation for speech.
//!
//! [`normalize`] turns user text (possibly markdown) into plain speakable
//! text; [`segment`] turns it into an ordered sequence of bounded chunks,
//! each dispatched to the engine as one utterance.
//!
//! ```rust
//! use speech_reader::text::{normalize, segment};
//!
//! assert_eq!(normalize("## Intro\n\n**Hello** there."), "Intro\nHello there.");
//! assert_eq!(segment("Wait... really?! Yes."), vec!["Wait... really?!", "Yes."]);
//! ```

pub mod normalize;
pub mod segment;

pub use normalize::normalize;
pub use segment::{segment, segment_with_max_len, MAX_CHUNK_LEN};
