use std::time::{Duration, Instant};

use speech_reader::{
    engines::MemoryEngine, playback::EventOutcome, storage::MemoryStore, PlayState, Reader,
    ReaderConfigBuilder, VoiceDescriptor,
};

const DOCUMENT: &str = "# Release notes

Version **2** ships today. It brings [slots](https://example.com/slots) to the reader:
three documents, each remembering where you stopped.

- Faster chunking
- Better voices

Le lecteur choisit aussi une voix française pour les textes en français.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let engine = MemoryEngine::with_voices(vec![
        VoiceDescriptor::new("Samantha", "en-US").with_default(true),
        VoiceDescriptor::new("Google US English", "en-US"),
        VoiceDescriptor::new("Thomas", "fr-FR"),
    ]);
    let config = ReaderConfigBuilder::default()
        .max_chunk_len(120usize)
        .build()?;
    let mut reader = Reader::new(Some(engine), Some(MemoryStore::new()), config);

    let mut now = Instant::now();
    reader.set_text(DOCUMENT, now);
    now += reader.config().detect_debounce;
    reader.tick(now);
    println!("{}", reader.detected_label());
    if let Some(voice) = reader.selected_voice() {
        println!("Voice: {} ({})", voice.name, voice.lang);
    }

    reader.play(now);
    while reader.play_state() != PlayState::Stopped {
        if let Some(wake) = reader.tick(now) {
            now = wake.max(now);
            continue;
        }

        // Let the engine speak the dispatched chunk to completion.
        let Some(engine) = reader.engine_mut() else {
            break;
        };
        let events: Vec<_> = engine
            .start_current()
            .into_iter()
            .chain(engine.finish_current())
            .collect();
        if events.is_empty() {
            break;
        }
        for event in &events {
            if let EventOutcome::Started { index, chunk } = reader.on_utterance_event(event) {
                println!("[{}/{}] {}", index + 1, reader.chunk_count(), chunk);
            }
        }
        now += Duration::from_millis(10);
    }

    let spoken = reader.engine().map(|e| e.history().len()).unwrap_or(0);
    println!("Spoke {} chunks; slot 1 is {:?}", spoken, reader.slot(1));
    Ok(())
}
