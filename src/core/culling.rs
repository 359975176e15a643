//! Visible row and event selection.

use std::ops::Range;

use tracing::trace;

use super::geometry::ViewportSize;
use super::model::{EpgData, Event};
use super::time_axis::{TimeAxis, TimeWindow};

/// A channel row with the events that intersect the time window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub channel: usize,
    /// Indices into the channel's event list
    pub events: Range<usize>,
}

/// Everything that needs drawing for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub rows: Vec<VisibleRow>,
}

#[cfg(test)]
impl VisibleSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Inclusive range of visible channel indices.
    pub fn channel_span(&self) -> Option<(usize, usize)> {
        Some((self.rows.first()?.channel, self.rows.last()?.channel))
    }
}

/// Computes the visible set from scroll offsets and viewport size.
pub struct ViewportCuller<'a> {
    axis: &'a TimeAxis,
}

impl<'a> ViewportCuller<'a> {
    pub fn new(axis: &'a TimeAxis) -> Self {
        Self { axis }
    }

    /// Inclusive first and last visible channel, or `None` without channels.
    ///
    /// The last row is the one under the viewport's bottom pixel, so a row
    /// that is only partly on screen is always included.
    pub fn visible_channels(
        &self,
        channel_count: usize,
        scroll_y: i64,
        viewport: ViewportSize,
    ) -> Option<(usize, usize)> {
        let last_index = channel_count.checked_sub(1)? as i64;
        let bottom_pixel = (scroll_y + viewport.height - 1).max(scroll_y);

        let first = self
            .axis
            .channel_index_from_y(scroll_y, channel_count)?
            .clamp(0, last_index);
        let last = self
            .axis
            .channel_index_from_y(bottom_pixel, channel_count)?
            .clamp(0, last_index);

        Some((first as usize, last as usize))
    }

    /// Rows and event runs intersecting the viewport at `(scroll_x, scroll_y)`.
    pub fn cull(
        &self,
        data: &dyn EpgData,
        scroll_x: i64,
        scroll_y: i64,
        viewport: ViewportSize,
    ) -> VisibleSet {
        let Some((first, last)) = self.visible_channels(data.channel_count(), scroll_y, viewport)
        else {
            return VisibleSet::default();
        };
        let window = self.axis.visible_window(scroll_x, viewport.width);

        let rows = (first..=last)
            .map(|channel| VisibleRow {
                channel,
                events: visible_events(data.events(channel), window),
            })
            .collect::<Vec<_>>();

        trace!(first, last, lower = window.lower, upper = window.upper, "culled rows");
        VisibleSet { rows }
    }
}

/// Maximal contiguous run of `events` overlapping `window`.
///
/// Events are sorted and disjoint, so their ends are sorted too. The run
/// starts at the first event that has not ended before the window and stops
/// at the first one that no longer overlaps.
pub fn visible_events(events: &[Event], window: TimeWindow) -> Range<usize> {
    let start = events.partition_point(|event| event.end < window.lower);
    let len = events[start..]
        .iter()
        .take_while(|event| window.overlaps(event.start, event.end))
        .count();
    start..start + len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EpgConfig;
    use crate::core::model::{Channel, ChannelListing, Listings, Millis};

    const NOW: Millis = 1_700_000_000_000;

    fn axis() -> TimeAxis {
        TimeAxis::new(&EpgConfig::default(), 1099, NOW)
    }

    fn listings(channels: usize, events: Vec<Event>) -> Listings {
        Listings::new(
            (0..channels)
                .map(|i| ChannelListing {
                    channel: Channel::new(i.to_string(), format!("Channel {i}"), ""),
                    events: events.clone(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_visible_events_includes_straddling_lower_bound() {
        let window = TimeWindow {
            lower: 1000,
            upper: 2000,
        };
        let events = vec![
            Event::new(0, 500, "gone"),
            Event::new(999, 1001, "straddles"),
            Event::new(1001, 1500, "inside"),
            Event::new(1500, 2500, "straddles upper"),
            Event::new(2501, 3000, "later"),
        ];
        assert_eq!(visible_events(&events, window), 1..4);
    }

    #[test]
    fn test_visible_events_excludes_outside() {
        let window = TimeWindow {
            lower: 1000,
            upper: 2000,
        };
        let before = vec![Event::new(0, 999, "before")];
        let after = vec![Event::new(2001, 3000, "after")];
        assert!(visible_events(&before, window).is_empty());
        assert!(visible_events(&after, window).is_empty());
        assert!(visible_events(&[], window).is_empty());
    }

    #[test]
    fn test_visible_events_spanning_window() {
        let window = TimeWindow {
            lower: 1000,
            upper: 2000,
        };
        let events = vec![Event::new(0, 5000, "marathon")];
        assert_eq!(visible_events(&events, window), 0..1);
    }

    #[test]
    fn test_visible_events_skips_gap_before_first_visible() {
        let window = TimeWindow {
            lower: 10_000,
            upper: 20_000,
        };
        let events: Vec<Event> = (0..50)
            .map(|i| Event::new(i * 1000, i * 1000 + 1000, format!("{i}")))
            .collect();
        // 9..=20 touch the window through their start or end
        assert_eq!(visible_events(&events, window), 9..21);
    }

    #[test]
    fn test_visible_channels_top() {
        let axis = axis();
        let culler = ViewportCuller::new(&axis);
        // 600 px from the top covers rows 0..=8 (row 8 starts at 575)
        assert_eq!(
            culler.visible_channels(20, 0, ViewportSize::new(1099, 600)),
            Some((0, 8))
        );
    }

    #[test]
    fn test_partial_bottom_row_included() {
        let axis = axis();
        let culler = ViewportCuller::new(&axis);
        let row_top = axis.top_from_channel_index(8);

        // One pixel of row 8 on screen
        let (_, last) = culler
            .visible_channels(20, 0, ViewportSize::new(1099, row_top + 1))
            .unwrap();
        assert_eq!(last, 8);

        // Bottom edge exactly on row 8's top: the row is not on screen
        let (_, last) = culler
            .visible_channels(20, 0, ViewportSize::new(1099, row_top))
            .unwrap();
        assert_eq!(last, 7);
    }

    #[test]
    fn test_visible_channels_scrolled() {
        let axis = axis();
        let culler = ViewportCuller::new(&axis);
        let scroll_y = axis.top_from_channel_index(5);
        let (first, last) = culler
            .visible_channels(20, scroll_y, ViewportSize::new(1099, 600))
            .unwrap();
        assert_eq!(first, 5);
        assert!(axis.top_from_channel_index(last) < scroll_y + 600);
        assert!(last + 1 == 20 || axis.top_from_channel_index(last + 1) >= scroll_y + 600);
    }

    #[test]
    fn test_visible_channels_clamped_to_count() {
        let axis = axis();
        let culler = ViewportCuller::new(&axis);
        assert_eq!(
            culler.visible_channels(3, 0, ViewportSize::new(1099, 2000)),
            Some((0, 2))
        );
        assert_eq!(
            culler.visible_channels(0, 0, ViewportSize::new(1099, 2000)),
            None
        );
    }

    #[test]
    fn test_cull_collects_rows_and_runs() {
        let axis = axis();
        let culler = ViewportCuller::new(&axis);
        let lower = axis.time_origin();
        let data = listings(
            3,
            vec![
                Event::new(lower - 100, lower + 100, "straddle"),
                Event::new(lower + 100, lower + 10 * 60 * 60 * 1000, "long"),
                Event::new(lower + 11 * 60 * 60 * 1000, lower + 12 * 60 * 60 * 1000, "late"),
            ],
        );

        let set = culler.cull(&data, 0, 0, ViewportSize::new(1099, 600));
        assert_eq!(set.rows.len(), 3);
        assert_eq!(set.channel_span(), Some((0, 2)));
        for row in &set.rows {
            assert_eq!(row.events, 0..2);
        }
    }

    #[test]
    fn test_cull_without_data_is_empty() {
        let axis = axis();
        let culler = ViewportCuller::new(&axis);
        let set = culler.cull(&Listings::default(), 0, 0, ViewportSize::new(1099, 600));
        assert!(set.is_empty());
    }
}
