//! Pointer gesture classification and tap hit-testing.
//!
//! [`GestureRouter`] turns raw pointer samples into down, drag, fling and tap
//! gestures. [`HitTester`] resolves a tap to what was drawn under it using the
//! same axis functions as frame planning.

use std::collections::VecDeque;

use tracing::trace;

use super::config::EpgConfig;
use super::frame::{reset_button_rect, reset_button_visible};
use super::geometry::{PixelRect, ViewportSize};
use super::model::{Channel, EpgData, Event, Millis};
use super::time_axis::TimeAxis;

/// Samples older than this do not count toward release velocity.
const VELOCITY_WINDOW_MS: Millis = 100;

/// Pointer phase of a raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Pressed,
    Moved,
    Released,
    Cancelled,
}

/// Raw pointer sample, position relative to the widget's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub time: Millis,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, x: f32, y: f32, time: Millis) -> Self {
        Self { phase, x, y, time }
    }
}

/// Classified gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    None,
    /// Finger went down
    Down,
    /// Finger moved by whole pixels since the previous drag
    Drag { dx: i64, dy: i64 },
    /// Finger lifted while moving, velocity in px/s
    Fling { velocity_x: f64, velocity_y: f64 },
    /// Finger lifted without moving past the touch slop
    Tap { x: f32, y: f32 },
}

#[derive(Debug)]
struct Press {
    origin: (f32, f32),
    /// Position up to which drag deltas have been reported
    consumed: (f32, f32),
    dragging: bool,
    samples: VecDeque<(Millis, f32, f32)>,
}

impl Press {
    fn record(&mut self, time: Millis, x: f32, y: f32) {
        self.samples.push_back((time, x, y));
        while self
            .samples
            .front()
            .is_some_and(|&(t, _, _)| time - t > VELOCITY_WINDOW_MS)
        {
            self.samples.pop_front();
        }
    }

    fn velocity(&self) -> (f64, f64) {
        let (Some(&(t0, x0, y0)), Some(&(t1, x1, y1))) = (self.samples.front(), self.samples.back())
        else {
            return (0.0, 0.0);
        };
        if t1 <= t0 {
            return (0.0, 0.0);
        }
        let seconds = (t1 - t0) as f64 / 1000.0;
        (f64::from(x1 - x0) / seconds, f64::from(y1 - y0) / seconds)
    }
}

/// Pointer state machine.
#[derive(Debug)]
pub struct GestureRouter {
    /// Movement in pixels before a press becomes a drag
    touch_slop: f32,
    /// Slower releases end without a fling, in px/s
    min_fling_velocity: f64,
    /// Release speed cap per axis, in px/s
    max_fling_velocity: f64,
    /// Active press, `None` while the pointer is up
    press: Option<Press>,
}

impl GestureRouter {
    /// Idle router using the slop and fling limits from `config`.
    pub fn new(config: &EpgConfig) -> Self {
        Self {
            touch_slop: config.touch_slop,
            min_fling_velocity: f64::from(config.min_fling_velocity),
            max_fling_velocity: f64::from(config.max_fling_velocity),
            press: None,
        }
    }

    /// Classify one raw pointer sample.
    pub fn handle(&mut self, event: PointerEvent) -> Gesture {
        let PointerEvent { phase, x, y, time } = event;

        match phase {
            PointerPhase::Pressed => {
                let mut press = Press {
                    origin: (x, y),
                    consumed: (x, y),
                    dragging: false,
                    samples: VecDeque::new(),
                };
                press.record(time, x, y);
                self.press = Some(press);
                Gesture::Down
            }
            PointerPhase::Moved => {
                let Some(press) = self.press.as_mut() else {
                    return Gesture::None;
                };
                press.record(time, x, y);

                if !press.dragging {
                    let distance = (x - press.origin.0).hypot(y - press.origin.1);
                    if distance <= self.touch_slop {
                        return Gesture::None;
                    }
                    press.dragging = true;
                }

                let dx = (x - press.consumed.0).trunc();
                let dy = (y - press.consumed.1).trunc();
                press.consumed.0 += dx;
                press.consumed.1 += dy;
                if dx == 0.0 && dy == 0.0 {
                    return Gesture::None;
                }
                Gesture::Drag {
                    dx: dx as i64,
                    dy: dy as i64,
                }
            }
            PointerPhase::Released => {
                let Some(mut press) = self.press.take() else {
                    return Gesture::None;
                };
                if !press.dragging {
                    return Gesture::Tap { x, y };
                }

                press.record(time, x, y);
                let (vx, vy) = press.velocity();
                trace!(vx, vy, "pointer released");
                if vx.hypot(vy) < self.min_fling_velocity {
                    return Gesture::None;
                }
                let max = self.max_fling_velocity;
                Gesture::Fling {
                    velocity_x: vx.clamp(-max, max),
                    velocity_y: vy.clamp(-max, max),
                }
            }
            PointerPhase::Cancelled => {
                self.press = None;
                Gesture::None
            }
        }
    }
}

/// What a tap landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    None,
    Channel { index: usize },
    Event { channel: usize, event: usize },
    Reset,
}

/// Receives resolved taps.
pub trait InteractionListener {
    fn on_channel_clicked(&mut self, index: usize, channel: &Channel);
    fn on_event_clicked(&mut self, channel: usize, event: usize, data: &Event);
    fn on_reset_clicked(&mut self);
}

/// Forward `hit` to the matching listener callback.
pub fn deliver(hit: HitResult, data: &dyn EpgData, listener: &mut dyn InteractionListener) {
    match hit {
        HitResult::None => {}
        HitResult::Channel { index } => listener.on_channel_clicked(index, data.channel(index)),
        HitResult::Event { channel, event } => {
            listener.on_event_clicked(channel, event, data.event(channel, event))
        }
        HitResult::Reset => listener.on_reset_clicked(),
    }
}

/// First event whose `[start, end]` contains `time`.
pub fn event_at(events: &[Event], time: Millis) -> Option<usize> {
    let index = events.partition_point(|event| event.end < time);
    events
        .get(index)
        .filter(|event| event.contains(time))
        .map(|_| index)
}

/// Resolves viewport positions against the current layout.
pub struct HitTester<'a> {
    /// Reset button size and threshold
    config: &'a EpgConfig,
    /// Same mapping the frame was drawn with
    axis: &'a TimeAxis,
    data: &'a dyn EpgData,
    /// Scroll offset the frame was drawn at
    scroll_x: i64,
    scroll_y: i64,
    viewport: ViewportSize,
}

impl<'a> HitTester<'a> {
    /// Hit tester for a frame drawn at `(scroll_x, scroll_y)`.
    pub fn new(
        config: &'a EpgConfig,
        axis: &'a TimeAxis,
        data: &'a dyn EpgData,
        (scroll_x, scroll_y): (i64, i64),
        viewport: ViewportSize,
    ) -> Self {
        Self {
            config,
            axis,
            data,
            scroll_x,
            scroll_y,
            viewport,
        }
    }

    /// Resolve a tap at viewport position `(x, y)`.
    pub fn hit_test(&self, x: i64, y: i64, now: Millis) -> HitResult {
        if !self.data.has_data() {
            return HitResult::None;
        }

        if reset_button_visible(self.axis, self.config, self.scroll_x, self.viewport.width, now)
            && reset_button_rect(self.config, self.viewport).contains(x, y)
        {
            return HitResult::Reset;
        }

        let rail_width = self.axis.rail_width();
        let bar_height = self.axis.time_bar_height();
        let rail = PixelRect::new(0, bar_height, rail_width, self.viewport.height);
        let grid = PixelRect::new(
            rail_width + self.axis.rail_margin(),
            bar_height,
            self.viewport.width,
            self.viewport.height,
        );

        if rail.contains(x, y) {
            return match self.channel_at(y) {
                Some(index) => HitResult::Channel { index },
                None => HitResult::None,
            };
        }
        if grid.contains(x, y) {
            let Some(channel) = self.channel_at(y) else {
                return HitResult::None;
            };
            let time = self.axis.time_from_x(x + self.scroll_x);
            return match event_at(self.data.events(channel), time) {
                Some(event) => HitResult::Event { channel, event },
                None => HitResult::None,
            };
        }
        HitResult::None
    }

    /// Channel under viewport y, if it is a real row.
    fn channel_at(&self, y: i64) -> Option<usize> {
        let count = self.data.channel_count();
        let index = self.axis.channel_index_from_y(y + self.scroll_y, count)?;
        usize::try_from(index).ok().filter(|&i| i < count)
    }
}

#[cfg(test)]
impl GestureRouter {
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ChannelListing, Listings};

    const NOW: Millis = 1_700_000_000_000;

    fn router() -> GestureRouter {
        GestureRouter::new(&EpgConfig::default())
    }

    fn sample(phase: PointerPhase, x: f32, y: f32, time: Millis) -> PointerEvent {
        PointerEvent::new(phase, x, y, time)
    }

    #[test]
    fn test_press_and_release_is_tap() {
        let mut router = router();
        assert_eq!(
            router.handle(sample(PointerPhase::Pressed, 50.0, 60.0, 0)),
            Gesture::Down
        );
        assert_eq!(
            router.handle(sample(PointerPhase::Moved, 53.0, 62.0, 20)),
            Gesture::None
        );
        assert_eq!(
            router.handle(sample(PointerPhase::Released, 53.0, 62.0, 40)),
            Gesture::Tap { x: 53.0, y: 62.0 }
        );
        assert!(!router.is_pressed());
    }

    #[test]
    fn test_drag_reports_whole_pixel_deltas() {
        let mut router = router();
        router.handle(sample(PointerPhase::Pressed, 100.0, 100.0, 0));
        assert_eq!(
            router.handle(sample(PointerPhase::Moved, 120.5, 100.0, 16)),
            Gesture::Drag { dx: 20, dy: 0 }
        );
        assert_eq!(
            router.handle(sample(PointerPhase::Moved, 121.0, 99.0, 32)),
            Gesture::Drag { dx: 1, dy: -1 }
        );
        assert_eq!(
            router.handle(sample(PointerPhase::Moved, 121.4, 99.0, 48)),
            Gesture::None
        );
    }

    #[test]
    fn test_slow_release_after_drag_is_not_fling() {
        let mut router = router();
        router.handle(sample(PointerPhase::Pressed, 100.0, 100.0, 0));
        router.handle(sample(PointerPhase::Moved, 130.0, 100.0, 100));
        // Held still for longer than the velocity window
        router.handle(sample(PointerPhase::Moved, 130.0, 100.0, 400));
        assert_eq!(
            router.handle(sample(PointerPhase::Released, 130.0, 100.0, 450)),
            Gesture::None
        );
    }

    #[test]
    fn test_fast_release_flings() {
        let mut router = router();
        router.handle(sample(PointerPhase::Pressed, 500.0, 100.0, 0));
        router.handle(sample(PointerPhase::Moved, 450.0, 100.0, 20));
        router.handle(sample(PointerPhase::Moved, 400.0, 100.0, 40));
        match router.handle(sample(PointerPhase::Released, 350.0, 100.0, 60)) {
            Gesture::Fling {
                velocity_x,
                velocity_y,
            } => {
                // 150 px over 60 ms
                assert!((velocity_x + 2500.0).abs() < 1e-6);
                assert_eq!(velocity_y, 0.0);
            }
            other => panic!("Expected Fling, got {:?}", other),
        }
    }

    #[test]
    fn test_fling_velocity_is_capped() {
        let mut router = router();
        router.handle(sample(PointerPhase::Pressed, 0.0, 0.0, 0));
        router.handle(sample(PointerPhase::Moved, 500.0, 0.0, 5));
        match router.handle(sample(PointerPhase::Released, 1000.0, 0.0, 10)) {
            Gesture::Fling { velocity_x, .. } => assert_eq!(velocity_x, 8000.0),
            other => panic!("Expected Fling, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_forgets_press() {
        let mut router = router();
        router.handle(sample(PointerPhase::Pressed, 0.0, 0.0, 0));
        router.handle(sample(PointerPhase::Cancelled, 0.0, 0.0, 10));
        assert_eq!(
            router.handle(sample(PointerPhase::Released, 0.0, 0.0, 20)),
            Gesture::None
        );
    }

    #[test]
    fn test_event_at_prefers_first_containing_event() {
        let events = vec![Event::new(0, 100, "A"), Event::new(100, 200, "B")];
        assert_eq!(event_at(&events, 150), Some(1));
        assert_eq!(event_at(&events, 250), None);
        assert_eq!(event_at(&events, 100), Some(0));
        assert_eq!(event_at(&events, 0), Some(0));
        assert_eq!(event_at(&events, -1), None);

        let gapped = vec![Event::new(0, 100, "A"), Event::new(300, 400, "C")];
        assert_eq!(event_at(&gapped, 200), None);
    }

    struct Layout {
        config: EpgConfig,
        axis: TimeAxis,
        data: Listings,
        viewport: ViewportSize,
    }

    impl Layout {
        /// One channel whose events sit at the start of the time axis.
        fn new() -> Self {
            let config = EpgConfig::default();
            let viewport = ViewportSize::new(1099, 600);
            let axis = TimeAxis::new(&config, viewport.width, NOW);
            let origin = axis.time_origin();
            let data = Listings::new(vec![
                ChannelListing {
                    channel: Channel::new("1", "One", ""),
                    events: vec![
                        Event::new(origin, origin + 100 * 7200, "A"),
                        Event::new(origin + 100 * 7200, origin + 200 * 7200, "B"),
                    ],
                },
                ChannelListing {
                    channel: Channel::new("2", "Two", ""),
                    events: vec![],
                },
            ]);
            Self {
                config,
                axis,
                data,
                viewport,
            }
        }

        fn tester(&self, scroll: (i64, i64)) -> HitTester<'_> {
            HitTester::new(&self.config, &self.axis, &self.data, scroll, self.viewport)
        }
    }

    #[test]
    fn test_tap_on_event() {
        let layout = Layout::new();
        let tester = layout.tester((0, 0));
        let row_y = layout.axis.top_from_channel_index(0) + 10;
        let grid_left = layout.axis.grid_left();

        // 150 px into the grid is inside "B"
        assert_eq!(
            tester.hit_test(grid_left + 150, row_y, NOW),
            HitResult::Event {
                channel: 0,
                event: 1
            }
        );
        // 250 px is past the last event
        assert_eq!(tester.hit_test(grid_left + 250, row_y, NOW), HitResult::None);
    }

    #[test]
    fn test_tap_follows_horizontal_scroll() {
        let layout = Layout::new();
        let tester = layout.tester((100, 0));
        let row_y = layout.axis.top_from_channel_index(0) + 10;
        assert_eq!(
            tester.hit_test(layout.axis.grid_left() + 50, row_y, NOW),
            HitResult::Event {
                channel: 0,
                event: 1
            }
        );
    }

    #[test]
    fn test_tap_on_channel_rail() {
        let layout = Layout::new();
        let tester = layout.tester((0, 0));
        let second_row = layout.axis.top_from_channel_index(1) + 5;
        assert_eq!(
            tester.hit_test(10, second_row, NOW),
            HitResult::Channel { index: 1 }
        );
        // Below the last row
        let below = layout.axis.content_height(2) + 5;
        assert_eq!(tester.hit_test(10, below, NOW), HitResult::None);
        // Time bar corner
        assert_eq!(tester.hit_test(10, 5, NOW), HitResult::None);
    }

    #[test]
    fn test_tap_between_rail_and_grid_hits_nothing() {
        let layout = Layout::new();
        let tester = layout.tester((0, 0));
        let row_y = layout.axis.top_from_channel_index(0) + 10;
        assert_eq!(
            tester.hit_test(layout.axis.rail_width() + 1, row_y, NOW),
            HitResult::None
        );
    }

    #[test]
    fn test_tap_on_empty_channel() {
        let layout = Layout::new();
        let tester = layout.tester((0, 0));
        let row_y = layout.axis.top_from_channel_index(1) + 10;
        assert_eq!(
            tester.hit_test(layout.axis.grid_left() + 10, row_y, NOW),
            HitResult::None
        );
    }

    #[test]
    fn test_reset_hit_only_while_shown() {
        let layout = Layout::new();
        let rect = reset_button_rect(&layout.config, layout.viewport);
        let (x, y) = (rect.left + 5, rect.top + 5);

        // Scrolled to the start, far from "now"
        assert_eq!(layout.tester((0, 0)).hit_test(x, y, NOW), HitResult::Reset);

        let centered = layout.axis.centered_now_scroll_x(NOW);
        assert_ne!(
            layout.tester((centered, 0)).hit_test(x, y, NOW),
            HitResult::Reset
        );
    }

    #[test]
    fn test_no_data_hits_nothing() {
        let layout = Layout::new();
        let empty = Listings::default();
        let tester = HitTester::new(
            &layout.config,
            &layout.axis,
            &empty,
            (0, 0),
            layout.viewport,
        );
        let rect = reset_button_rect(&layout.config, layout.viewport);
        assert_eq!(tester.hit_test(rect.left + 5, rect.top + 5, NOW), HitResult::None);
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl InteractionListener for Recorder {
        fn on_channel_clicked(&mut self, index: usize, channel: &Channel) {
            self.calls.push(format!("channel {index} {}", channel.name));
        }

        fn on_event_clicked(&mut self, channel: usize, event: usize, data: &Event) {
            self.calls.push(format!("event {channel}/{event} {}", data.title));
        }

        fn on_reset_clicked(&mut self) {
            self.calls.push("reset".to_string());
        }
    }

    #[test]
    fn test_deliver_dispatches_to_listener() {
        let layout = Layout::new();
        let mut recorder = Recorder::default();

        deliver(HitResult::Channel { index: 1 }, &layout.data, &mut recorder);
        deliver(
            HitResult::Event {
                channel: 0,
                event: 1,
            },
            &layout.data,
            &mut recorder,
        );
        deliver(HitResult::Reset, &layout.data, &mut recorder);
        deliver(HitResult::None, &layout.data, &mut recorder);

        assert_eq!(
            recorder.calls,
            vec!["channel 1 Two", "event 0/1 B", "reset"]
        );
    }
}
