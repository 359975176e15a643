//! Demo listings covering the whole scrollable range.

use super::config::EpgConfig;
use super::model::{Channel, ChannelListing, Event, Listings, Millis};

const CHANNEL_COUNT: usize = 20;

const MINUTE: Millis = 60 * 1000;

const EVENT_LENGTHS: [Millis; 5] = [15 * MINUTE, 30 * MINUTE, 45 * MINUTE, 60 * MINUTE, 120 * MINUTE];

const EVENT_TITLES: [&str; 7] = [
    "Avengers",
    "How I Met Your Mother",
    "Silicon Valley",
    "Late Night with Jimmy Fallon",
    "The Big Bang Theory",
    "Leon",
    "Die Hard",
];

const CHANNEL_LOGOS: [&str; 5] = [
    "https://i.imgur.com/JdKxscs.png",
    "https://i.imgur.com/Pr4ixiA.png",
    "https://i.imgur.com/Skf6vdi.png",
    "https://upload.wikimedia.org/wikipedia/commons/thumb/2/2d/News_24_%28Albania%29.svg/1024px-News_24_%28Albania%29.svg.png",
    "https://i.imgur.com/4zVyj1M.png",
];

/// Deterministic sequence used to vary event lengths and titles.
struct Shuffle(u64);

impl Shuffle {
    fn next(&mut self, bound: usize) -> usize {
        // splitmix64
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z % bound as u64) as usize
    }
}

/// Twenty channels of back-to-back events from `days_back` before `now` to
/// `days_forward` after it.
pub fn demo_listings(config: &EpgConfig, now: Millis) -> Listings {
    let start = now - config.days_back_millis();
    let end = now + config.days_forward_millis();

    let channels = (0..CHANNEL_COUNT)
        .map(|i| ChannelListing {
            channel: Channel::new(
                i.to_string(),
                format!("Channel {}", i + 1),
                CHANNEL_LOGOS[i % CHANNEL_LOGOS.len()],
            ),
            events: demo_events(start, end, &mut Shuffle(i as u64)),
        })
        .collect();

    Listings::new(channels)
}

fn demo_events(start: Millis, end: Millis, shuffle: &mut Shuffle) -> Vec<Event> {
    let mut events = Vec::new();
    let mut current = start;
    while current <= end {
        let length = EVENT_LENGTHS[shuffle.next(EVENT_LENGTHS.len())];
        let title = EVENT_TITLES[shuffle.next(EVENT_TITLES.len())];
        events.push(Event::new(current, current + length, title));
        current += length;
    }
    events
}
