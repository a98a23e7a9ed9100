//! Conversion of the MPRIS `Metadata` dictionary into [`TrackMetadata`].

use lyricbar_core::TrackMetadata;
use std::collections::HashMap;
use std::time::Duration;
use zbus::zvariant::{OwnedValue, Value};

const KEY_TRACK_ID: &str = "mpris:trackid";
const KEY_LENGTH: &str = "mpris:length";
const KEY_ART_URL: &str = "mpris:artUrl";
const KEY_ARTIST: &str = "xesam:artist";
const KEY_TITLE: &str = "xesam:title";
const KEY_ALBUM: &str = "xesam:album";
const KEY_URL: &str = "xesam:url";

/// Build track metadata from the raw property map.
///
/// Missing or oddly typed entries are left empty; the snapshot decides which
/// fields are required.
#[must_use]
pub fn track_metadata(map: &HashMap<String, OwnedValue>) -> TrackMetadata {
    let get = |key: &str| map.get(key).map(|v| &**v);
    let text = |key: &str| get(key).and_then(as_text).filter(|s| !s.is_empty());

    TrackMetadata {
        track_id: text(KEY_TRACK_ID),
        artists: get(KEY_ARTIST).map(as_text_list).unwrap_or_default(),
        title: text(KEY_TITLE),
        album: text(KEY_ALBUM),
        art_url: text(KEY_ART_URL),
        url: text(KEY_URL),
        length: get(KEY_LENGTH).and_then(as_micros),
        raw: map
            .iter()
            .map(|(key, value)| (key.clone(), stringify(value)))
            .collect(),
    }
}

/// Microsecond MPRIS position or length.
///
/// Players disagree on the integer width; negative values are treated as
/// unknown.
#[must_use]
pub fn micros_to_duration(micros: i64) -> Option<Duration> {
    u64::try_from(micros).ok().map(Duration::from_micros)
}

fn as_micros(value: &Value<'_>) -> Option<Duration> {
    match value {
        Value::I64(n) => micros_to_duration(*n),
        Value::U64(n) => Some(Duration::from_micros(*n)),
        Value::I32(n) => micros_to_duration(i64::from(*n)),
        Value::U32(n) => Some(Duration::from_micros(u64::from(*n))),
        Value::F64(n) => Duration::try_from_secs_f64(n / 1_000_000.0).ok(),
        Value::Value(inner) => as_micros(inner),
        _ => None,
    }
}

fn as_text(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.as_str().to_string()),
        Value::ObjectPath(path) => Some(path.as_str().to_string()),
        Value::Value(inner) => as_text(inner),
        _ => None,
    }
}

fn as_text_list(value: &Value<'_>) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(as_text)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::Value(inner) => as_text_list(inner),
        other => as_text(other).into_iter().collect(),
    }
}

fn stringify(value: &Value<'_>) -> String {
    match value {
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(", "),
        Value::Value(inner) => stringify(inner),
        other => as_text(other).unwrap_or_else(|| other.to_string()),
    }
}
