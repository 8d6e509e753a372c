use serde::Serialize;
use serde_json::Value;

use crate::error::ReaderError;
use crate::playback::PlayState;

/// One independent document: its text, the chunk index to resume from and
/// the last known play status.
/// Read back through [`deserialize_slot`], which repairs malformed fields
/// instead of rejecting them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub text: String,
    pub progress: usize,
    pub play_status: PlayState,
}

impl Slot {
    pub fn new(text: impl Into<String>, progress: usize, play_status: PlayState) -> Self {
        Self {
            text: text.into(),
            progress,
            play_status,
        }
    }
}

/// Serialize a slot to its JSON object form,
/// `{"text": "...", "progress": 0, "playStatus": "stopped"}`.
pub fn serialize_slot(slot: &Slot) -> Result<String, ReaderError> {
    Ok(serde_json::to_string(slot)?)
}

/// Parse a slot, repairing malformed fields.
///
/// Returns `None` when the input is not JSON or not an object. Within an
/// object, a non-string `text` becomes empty, a `progress` that is not a
/// finite number becomes 0 (negatives clamp to 0, fractions floor) and an
/// unknown `playStatus` becomes stopped.
pub fn deserialize_slot(raw: &str) -> Option<Slot> {
    let value: Value = serde_json::from_str(raw).ok()?;
    sanitize_slot(&value)
}

pub(crate) fn sanitize_slot(value: &Value) -> Option<Slot> {
    let object = value.as_object()?;
    let text = object
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let progress = object.get("progress").map(sanitize_progress).unwrap_or(0);
    let play_status = match object.get("playStatus").and_then(Value::as_str) {
        Some("playing") => PlayState::Playing,
        Some("paused") => PlayState::Paused,
        _ => PlayState::Stopped,
    };
    Some(Slot {
        text,
        progress,
        play_status,
    })
}

fn sanitize_progress(value: &Value) -> usize {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).unwrap_or(usize::MAX);
    }
    match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => n.floor() as usize,
        _ => 0,
    }
}

/// Parse the persisted slot array. Elements that are not objects become
/// default slots; anything other than an array is an error.
pub(crate) fn parse_slot_array(raw: &str) -> Result<Vec<Slot>, ReaderError> {
    let value: Value = serde_json::from_str(raw)?;
    let items = value
        .as_array()
        .ok_or_else(|| ReaderError::MalformedState("slots is not an array".to_string()))?;
    Ok(items
        .iter()
        .map(|item| sanitize_slot(item).unwrap_or_default())
        .collect())
}

pub(crate) fn serialize_slot_array(slots: &[Slot]) -> Result<String, ReaderError> {
    Ok(serde_json::to_string(slots)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_fields() {
        let slot = deserialize_slot(r#"{"text":42,"progress":-3,"playStatus":"bogus"}"#).unwrap();
        assert_eq!(slot, Slot::default());

        let slot = deserialize_slot(r#"{"text":"hi","progress":2.7,"playStatus":"paused"}"#).unwrap();
        assert_eq!(slot, Slot::new("hi", 2, PlayState::Paused));

        let slot = deserialize_slot(r#"{"progress":"5"}"#).unwrap();
        assert_eq!(slot.progress, 0);
    }

    #[test]
    fn rejects_non_objects() {
        assert_eq!(deserialize_slot("not json"), None);
        assert_eq!(deserialize_slot("[1,2]"), None);
        assert_eq!(deserialize_slot("\"text\""), None);
    }

    #[test]
    fn serializes_camel_case() {
        let raw = serialize_slot(&Slot::new("a\"b", 3, PlayState::Playing)).unwrap();
        assert_eq!(raw, r#"{"text":"a\"b","progress":3,"playStatus":"playing"}"#);
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["text"], "a\"b");
        assert_eq!(value["progress"], 3);
        assert_eq!(value["playStatus"], "playing");
        assert_eq!(deserialize_slot(&raw), Some(Slot::new("a\"b", 3, PlayState::Playing)));
    }

    #[test]
    fn slot_array_repairs_elements() {
        let slots = parse_slot_array(r#"[{"text":"one"}, 7, null]"#).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].text, "one");
        assert_eq!(slots[1], Slot::default());

        assert!(matches!(
            parse_slot_array(r#"{"text":"one"}"#),
            Err(ReaderError::MalformedState(_))
        ));
        assert!(matches!(parse_slot_array("{"), Err(ReaderError::Json(_))));
    }

    #[test]
    fn slot_array_reads_back_what_it_writes() {
        let slots = vec![
            Slot::new("first", 2, PlayState::Paused),
            Slot::default(),
        ];
        let raw = serialize_slot_array(&slots).unwrap();
        assert_eq!(parse_slot_array(&raw).unwrap(), slots);
    }
}
