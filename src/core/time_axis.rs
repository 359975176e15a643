//! Mapping between guide coordinates and pixels.
//!
//! Horizontal content pixels map to time, vertical content pixels map to
//! channel rows. Drawing, culling and hit-testing all go through these
//! functions so that what is drawn and what a tap resolves to never diverge.
//!
//! Content coordinates put the left edge of the grid at
//! `rail_width + 2 * rail_margin` when scrolled fully left; the channel rail
//! and the time bar stay pinned to the viewport and overlay the content.

use super::config::EpgConfig;
use super::model::Millis;

/// Visible time bounds for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Time at the grid's left edge
    pub lower: Millis,
    /// Time at the viewport's right edge
    pub upper: Millis,
}

impl TimeWindow {
    /// Whether an event spanning `[start, end]` intersects the window.
    ///
    /// True when the start or the end lies inside the bounds, or when the
    /// event covers the whole window.
    pub fn overlaps(&self, start: Millis, end: Millis) -> bool {
        let inside = |t: Millis| self.lower <= t && t <= self.upper;
        inside(start) || inside(end) || (start <= self.lower && end >= self.upper)
    }

    /// Whether `time` lies in `[lower, upper)`.
    pub fn contains(&self, time: Millis) -> bool {
        self.lower <= time && time < self.upper
    }
}

/// Pure time/channel to pixel conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeAxis {
    /// Milliseconds covered by one horizontal pixel, at least 1
    millis_per_pixel: Millis,
    /// Time at content x `grid_left`, i.e. `now - days_back`
    time_origin: Millis,
    /// Duration shown across the grid at once
    window_millis: Millis,
    /// Whole scrollable duration, `days_back + days_forward`
    range_millis: Millis,
    /// Width of the channel rail in pixels
    rail_width: i64,
    /// Gap around the rail in pixels
    rail_margin: i64,
    /// Height of one channel row in pixels
    row_height: i64,
    /// Gap between rows in pixels
    row_margin: i64,
    /// Height of the time bar pinned to the top
    time_bar_height: i64,
}

impl TimeAxis {
    /// Build the axis for a viewport of `viewport_width` pixels, anchored so
    /// that the content starts `days_back` before `now`.
    pub fn new(config: &EpgConfig, viewport_width: i64, now: Millis) -> Self {
        let rail_width = i64::from(config.rail_width);
        let rail_margin = i64::from(config.rail_margin);
        let grid_width = (viewport_width - rail_width - rail_margin).max(1);
        let window_millis = config.window_millis();

        Self {
            millis_per_pixel: (window_millis / grid_width).max(1),
            time_origin: now - config.days_back_millis(),
            window_millis,
            range_millis: config.days_back_millis() + config.days_forward_millis(),
            rail_width,
            rail_margin,
            row_height: i64::from(config.row_height),
            row_margin: i64::from(config.row_margin),
            time_bar_height: i64::from(config.time_bar_height),
        }
    }

    /// Milliseconds per horizontal pixel.
    pub fn millis_per_pixel(&self) -> Millis {
        self.millis_per_pixel
    }

    /// Duration visible across the grid.
    pub fn window_millis(&self) -> Millis {
        self.window_millis
    }

    /// Channel rail width in pixels.
    pub fn rail_width(&self) -> i64 {
        self.rail_width
    }

    /// Gap around the rail in pixels.
    pub fn rail_margin(&self) -> i64 {
        self.rail_margin
    }

    /// Channel row height in pixels.
    pub fn row_height(&self) -> i64 {
        self.row_height
    }

    /// Time bar height in pixels.
    pub fn time_bar_height(&self) -> i64 {
        self.time_bar_height
    }

    /// Content x of the grid's left edge.
    pub fn grid_left(&self) -> i64 {
        self.rail_width + 2 * self.rail_margin
    }

    /// Distance between the tops of two adjacent rows.
    pub fn row_pitch(&self) -> i64 {
        self.row_height + self.row_margin
    }

    /// Content x of `time`. Truncates toward negative infinity and saturates
    /// for instants far outside the guide range.
    pub fn x_from_time(&self, time: Millis) -> i64 {
        time.saturating_sub(self.time_origin)
            .div_euclid(self.millis_per_pixel)
            .saturating_add(self.grid_left())
    }

    /// Time at content x. Inverse of [`Self::x_from_time`] up to one pixel of
    /// truncation: `time_from_x(x_from_time(t))` lies in `(t - millis_per_pixel, t]`.
    pub fn time_from_x(&self, x: i64) -> Millis {
        (x - self.grid_left()) * self.millis_per_pixel + self.time_origin
    }

    /// Content y of the top of channel row `index`.
    pub fn top_from_channel_index(&self, index: usize) -> i64 {
        index as i64 * self.row_pitch() + self.row_margin + self.time_bar_height
    }

    /// Row under content y, unclamped. `None` when there are no channels.
    ///
    /// The result may be negative or past the last channel; callers clamp or
    /// reject it. The gap below a row belongs to that row.
    pub fn channel_index_from_y(&self, y: i64, channel_count: usize) -> Option<i64> {
        if channel_count == 0 {
            return None;
        }
        Some((y - self.row_margin - self.time_bar_height).div_euclid(self.row_pitch()))
    }

    /// Content height of `channel_count` rows including the trailing gap.
    pub fn content_height(&self, channel_count: usize) -> i64 {
        self.top_from_channel_index(channel_count)
    }

    /// Largest horizontal scroll offset.
    pub fn max_scroll_x(&self) -> i64 {
        ((self.range_millis - self.window_millis) / self.millis_per_pixel).max(0)
    }

    /// Time bounds of the grid area for a given scroll offset.
    pub fn visible_window(&self, scroll_x: i64, viewport_width: i64) -> TimeWindow {
        TimeWindow {
            lower: self.time_from_x(scroll_x + self.grid_left()),
            upper: self.time_from_x(scroll_x + viewport_width),
        }
    }

    /// Scroll offset that shows `now` in the middle of the grid, with half
    /// the visible window before it.
    pub fn centered_now_scroll_x(&self, now: Millis) -> i64 {
        self.x_from_time(now - self.window_millis / 2) - self.grid_left()
    }
}

#[cfg(test)]
impl TimeAxis {
    pub fn time_origin(&self) -> Millis {
        self.time_origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: Millis = 1_700_000_000_000;

    /// 1099 px wide leaves a 1000 px grid: exactly 7200 ms per pixel.
    fn axis() -> TimeAxis {
        TimeAxis::new(&EpgConfig::default(), 1099, NOW)
    }

    #[test]
    fn test_millis_per_pixel_from_viewport() {
        let axis = axis();
        assert_eq!(axis.millis_per_pixel(), 7200);
        assert_eq!(axis.time_origin(), NOW - 3 * 24 * 60 * 60 * 1000);
        assert_eq!(axis.grid_left(), 102);
    }

    #[test]
    fn test_millis_per_pixel_never_zero() {
        let axis = TimeAxis::new(&EpgConfig::default(), 0, NOW);
        assert!(axis.millis_per_pixel() >= 1);
    }

    #[test]
    fn test_x_from_time_at_origin_is_grid_left() {
        let axis = axis();
        assert_eq!(axis.x_from_time(axis.time_origin()), axis.grid_left());
        assert_eq!(axis.x_from_time(axis.time_origin() + 7200), axis.grid_left() + 1);
        assert_eq!(axis.x_from_time(axis.time_origin() + 7199), axis.grid_left());
        assert_eq!(axis.x_from_time(axis.time_origin() - 1), axis.grid_left() - 1);
    }

    #[test]
    fn test_x_from_time_saturates_at_extremes() {
        let axis = axis();
        assert!(axis.x_from_time(Millis::MIN) < axis.grid_left());
        assert!(axis.x_from_time(Millis::MAX) > axis.x_from_time(NOW));
        assert!(axis.x_from_time(Millis::MIN + 1) <= axis.x_from_time(Millis::MIN + 7200));
    }

    #[test]
    fn test_top_from_channel_index() {
        let axis = axis();
        assert_eq!(axis.top_from_channel_index(0), 3 + 36);
        assert_eq!(axis.top_from_channel_index(2), 2 * 67 + 3 + 36);
    }

    #[test]
    fn test_channel_index_from_y() {
        let axis = axis();
        let top = axis.top_from_channel_index(4);
        assert_eq!(axis.channel_index_from_y(top, 10), Some(4));
        assert_eq!(axis.channel_index_from_y(top + 66, 10), Some(4));
        assert_eq!(axis.channel_index_from_y(top + 67, 10), Some(5));
        assert_eq!(axis.channel_index_from_y(0, 10), Some(-1));
        assert_eq!(axis.channel_index_from_y(top, 0), None);
    }

    #[test]
    fn test_max_scroll_x() {
        let axis = axis();
        let range = 6 * 24 * 60 * 60 * 1000 - 2 * 60 * 60 * 1000;
        assert_eq!(axis.max_scroll_x(), range / 7200);
    }

    #[test]
    fn test_visible_window_spans_grid() {
        let axis = axis();
        let window = axis.visible_window(0, 1099);
        assert_eq!(window.lower, axis.time_origin());
        assert_eq!(window.upper - window.lower, (1099 - 102) * 7200);
    }

    #[test]
    fn test_centered_now_puts_now_mid_grid() {
        let axis = axis();
        let scroll_x = axis.centered_now_scroll_x(NOW);
        let window = axis.visible_window(scroll_x, 1099);
        assert!(window.contains(NOW));
        let now_screen_x = axis.x_from_time(NOW) - scroll_x;
        assert_eq!(now_screen_x, axis.grid_left() + 500);
    }

    #[test]
    fn test_window_overlap_rules() {
        let window = TimeWindow {
            lower: 1000,
            upper: 2000,
        };
        // Straddles the lower bound
        assert!(window.overlaps(999, 1001));
        // Straddles the upper bound
        assert!(window.overlaps(1999, 2500));
        // Inside
        assert!(window.overlaps(1200, 1300));
        // Spans the whole window
        assert!(window.overlaps(0, 3000));
        // Touching counts
        assert!(window.overlaps(500, 1000));
        // Outside
        assert!(!window.overlaps(0, 999));
        assert!(!window.overlaps(2001, 3000));
    }

    #[test]
    fn test_window_contains_is_half_open() {
        let window = TimeWindow {
            lower: 1000,
            upper: 2000,
        };
        assert!(window.contains(1000));
        assert!(!window.contains(2000));
    }

    proptest! {
        #[test]
        fn time_round_trip_within_one_pixel(
            offset in -1_000_000_000i64..1_000_000_000,
            width in 0i64..4000,
        ) {
            let axis = TimeAxis::new(&EpgConfig::default(), width, NOW);
            let t = NOW + offset;
            let back = axis.time_from_x(axis.x_from_time(t));
            prop_assert!(back <= t);
            prop_assert!(t - back < axis.millis_per_pixel());
        }

        #[test]
        fn rows_strictly_increase(i in 0usize..10_000, step in 1usize..100) {
            let axis = axis();
            prop_assert!(axis.top_from_channel_index(i) < axis.top_from_channel_index(i + step));
        }

        #[test]
        fn row_top_maps_back_to_its_index(i in 0usize..10_000) {
            let axis = axis();
            let top = axis.top_from_channel_index(i);
            prop_assert_eq!(axis.channel_index_from_y(top, i + 1), Some(i as i64));
        }
    }
}
