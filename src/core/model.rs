//! Program guide data structures.
//!
//! This module defines channels, events, and the `EpgData` contract the
//! widget reads from, together with the in-memory `Listings` implementation.

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// A row in the guide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Logo identifier (URL or file path)
    pub logo: String,
}

impl Channel {
    /// Create a new channel.
    pub fn new(id: impl Into<String>, name: impl Into<String>, logo: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logo: logo.into(),
        }
    }
}

/// A time-bounded program entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Start instant
    pub start: Millis,
    /// End instant, always after `start`
    pub end: Millis,
    /// Program title
    pub title: String,
}

impl Event {
    /// Create a new event.
    pub fn new(start: Millis, end: Millis, title: impl Into<String>) -> Self {
        Self {
            start,
            end,
            title: title.into(),
        }
    }

    /// Whether `now` falls within `[start, end]`.
    #[inline]
    pub fn is_current(&self, now: Millis) -> bool {
        self.start <= now && now <= self.end
    }

    /// Whether `time` falls within `[start, end]`.
    #[inline]
    pub fn contains(&self, time: Millis) -> bool {
        self.is_current(time)
    }
}

/// Data source contract consumed by the guide.
///
/// Events of a channel are sorted ascending by start and never overlap. The
/// guide relies on this and does not re-sort. Indices must be in
/// `0..channel_count()`; out-of-range access is a caller error.
pub trait EpgData {
    /// Number of channels.
    fn channel_count(&self) -> usize;

    /// Channel at `index`.
    fn channel(&self, index: usize) -> &Channel;

    /// Ordered events of the channel at `index`.
    fn events(&self, index: usize) -> &[Event];

    /// Single event lookup.
    fn event(&self, channel: usize, event: usize) -> &Event {
        &self.events(channel)[event]
    }

    /// Whether there is anything to draw at all.
    fn has_data(&self) -> bool {
        self.channel_count() > 0
    }
}

/// A channel together with its events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelListing {
    /// The channel
    pub channel: Channel,
    /// Events sorted by start
    pub events: Vec<Event>,
}

/// In-memory program listings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listings {
    /// Channels in display order
    pub channels: Vec<ChannelListing>,
}

impl Listings {
    /// Create listings from channel entries.
    pub fn new(channels: Vec<ChannelListing>) -> Self {
        Self { channels }
    }

    /// Total number of events across all channels.
    pub fn event_count(&self) -> usize {
        self.channels.iter().map(|c| c.events.len()).sum()
    }
}

impl EpgData for Listings {
    fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn channel(&self, index: usize) -> &Channel {
        &self.channels[index].channel
    }

    fn events(&self, index: usize) -> &[Event] {
        &self.channels[index].events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Listings {
        Listings::new(vec![
            ChannelListing {
                channel: Channel::new("1", "One", "logo-1.png"),
                events: vec![Event::new(0, 100, "A"), Event::new(100, 200, "B")],
            },
            ChannelListing {
                channel: Channel::new("2", "Two", "logo-2.png"),
                events: vec![],
            },
        ])
    }

    #[test]
    fn test_event_is_current_inclusive_bounds() {
        let event = Event::new(100, 200, "News");
        assert!(event.is_current(100));
        assert!(event.is_current(150));
        assert!(event.is_current(200));
        assert!(!event.is_current(99));
        assert!(!event.is_current(201));
    }

    #[test]
    fn test_listings_contract() {
        let listings = sample();
        assert!(listings.has_data());
        assert_eq!(listings.channel_count(), 2);
        assert_eq!(listings.channel(1).name, "Two");
        assert_eq!(listings.events(0).len(), 2);
        assert!(listings.events(1).is_empty());
        assert_eq!(listings.event(0, 1).title, "B");
        assert_eq!(listings.event_count(), 2);
    }

    #[test]
    fn test_default_listings_have_no_data() {
        let listings = Listings::default();
        assert!(!listings.has_data());
        assert_eq!(listings.channel_count(), 0);
    }
}
