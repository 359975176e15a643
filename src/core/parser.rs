//! JSON parser for program listings files.
//!
//! Converts a listings document into `Listings`, enforcing the ordering
//! rules the guide depends on: every event ends after it starts, and events
//! of a channel are sorted by start and never overlap.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use super::model::{Channel, ChannelListing, Event, Listings, Millis};

/// The only listings format version understood by this parser.
pub const SUPPORTED_VERSION: u32 = 1;

/// Errors that can occur while parsing listings.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON syntax error
    #[error("Invalid JSON syntax: {0}")]
    JsonSyntax(#[from] serde_json::Error),

    /// Unsupported format version
    #[error("Unsupported format version {version}: expected version 1")]
    UnsupportedVersion { version: u32 },

    /// Timestamp is not RFC 3339 or lies outside the representable date range
    #[error("Invalid timestamp '{value}': expected epoch milliseconds or RFC 3339")]
    InvalidTimestamp { value: String },

    /// Event does not end after it starts
    #[error("Event {event} of channel '{channel}' ends before it starts")]
    EmptyEvent { channel: String, event: usize },

    /// Event starts before the previous one ended
    #[error("Event {event} of channel '{channel}' overlaps or precedes the previous event")]
    UnorderedEvents { channel: String, event: usize },
}

// ============================================================================
// Intermediate JSON structures for deserialization
// ============================================================================

/// Top-level JSON structure of a listings file.
#[derive(Debug, Deserialize)]
struct JsonListings {
    version: u32,
    #[serde(default)]
    channels: Vec<JsonChannel>,
}

/// Channel entry in JSON format.
#[derive(Debug, Deserialize)]
struct JsonChannel {
    id: String,
    name: String,
    #[serde(default)]
    logo: String,
    #[serde(default)]
    events: Vec<JsonEvent>,
}

/// Event entry in JSON format.
#[derive(Debug, Deserialize)]
struct JsonEvent {
    start: JsonInstant,
    end: JsonInstant,
    title: String,
}

/// Either epoch milliseconds or an RFC 3339 string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInstant {
    Millis(Millis),
    Text(String),
}

// ============================================================================
// Parser implementation
// ============================================================================

/// Parse a JSON string into `Listings`.
///
/// # Example
/// ```ignore
/// let json = r#"{"version": 1, "channels": [{"id": "1", "name": "One", "events": []}]}"#;
/// let listings = parse_json(json)?;
/// ```
pub fn parse_json(content: &str) -> Result<Listings, ParseError> {
    let json: JsonListings = serde_json::from_str(content)?;

    if json.version != SUPPORTED_VERSION {
        return Err(ParseError::UnsupportedVersion {
            version: json.version,
        });
    }

    let channels = json
        .channels
        .into_iter()
        .map(convert_channel)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Listings::new(channels))
}

/// Convert a JSON channel, validating its event sequence.
fn convert_channel(json: JsonChannel) -> Result<ChannelListing, ParseError> {
    let mut events: Vec<Event> = Vec::with_capacity(json.events.len());

    for (index, event) in json.events.into_iter().enumerate() {
        let start = parse_instant(event.start)?;
        let end = parse_instant(event.end)?;

        if end <= start {
            return Err(ParseError::EmptyEvent {
                channel: json.id,
                event: index,
            });
        }
        if events.last().is_some_and(|prev| start < prev.end) {
            return Err(ParseError::UnorderedEvents {
                channel: json.id,
                event: index,
            });
        }

        events.push(Event::new(start, end, event.title));
    }

    Ok(ChannelListing {
        channel: Channel::new(json.id, json.name, json.logo),
        events,
    })
}

/// Resolve a JSON instant to epoch milliseconds.
fn parse_instant(instant: JsonInstant) -> Result<Millis, ParseError> {
    match instant {
        JsonInstant::Millis(millis) => DateTime::<Utc>::from_timestamp_millis(millis)
            .map(|_| millis)
            .ok_or_else(|| ParseError::InvalidTimestamp {
                value: millis.to_string(),
            }),
        JsonInstant::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.timestamp_millis())
            .map_err(|_| ParseError::InvalidTimestamp { value: text }),
    }
}
