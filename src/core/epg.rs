//! The guide engine.
//!
//! `Epg` owns one widget's state: layout config, the data source, the time
//! axis, scroll position, logo cache and pointer state. The host feeds it
//! viewport sizes, pointer samples and frame times, and paints the plans it
//! returns. Without data, rendering and hit-testing do nothing.

use tracing::{debug, info};

use super::config::EpgConfig;
use super::culling::{ViewportCuller, VisibleSet};
use super::error::LogoFetchError;
use super::frame::{FramePlan, FrameRenderer};
use super::geometry::ViewportSize;
use super::gesture::{
    Gesture, GestureRouter, HitResult, HitTester, InteractionListener, PointerEvent, deliver,
};
use super::image_cache::{ImageCache, LogoFetcher, LogoImage};
use super::model::{EpgData, Millis};
use super::scroll::{ScrollController, ScrollFrame};
use super::time_axis::TimeAxis;

/// Result of feeding one pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerOutcome {
    /// Resolved tap, if the sample completed one
    pub hit: HitResult,
    /// Whether the scroll state changed and a new frame is needed
    pub repaint: bool,
}

impl Default for PointerOutcome {
    fn default() -> Self {
        Self {
            hit: HitResult::None,
            repaint: false,
        }
    }
}

/// One guide widget, generic over the host's logo image type.
pub struct Epg<I> {
    /// Layout, time range and physics values
    config: EpgConfig,
    /// Channels and events, `None` until the host sets them
    data: Option<Box<dyn EpgData>>,
    /// Last size reported by the host
    viewport: ViewportSize,
    /// Coordinate mapping for the current viewport and "now"
    axis: TimeAxis,
    /// Scroll offset, bounds and animation
    scroll: ScrollController,
    /// Channel logos by key
    logos: ImageCache<I>,
    /// Pointer state between samples
    gestures: GestureRouter,
}

impl<I: LogoImage + Clone> Epg<I> {
    /// Empty guide with no data and a zero-sized viewport.
    pub fn new(config: EpgConfig, now: Millis) -> Self {
        Self {
            axis: TimeAxis::new(&config, 0, now),
            scroll: ScrollController::new(&config),
            gestures: GestureRouter::new(&config),
            logos: ImageCache::new(),
            viewport: ViewportSize::default(),
            data: None,
            config,
        }
    }

    /// Layout config in use.
    pub fn config(&self) -> &EpgConfig {
        &self.config
    }

    /// Coordinate mapping for the current viewport.
    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    /// Current data source, if any.
    pub fn data(&self) -> Option<&dyn EpgData> {
        self.data.as_deref()
    }

    /// Whether there is a data source with at least one channel.
    pub fn has_data(&self) -> bool {
        self.data().is_some_and(|data| data.has_data())
    }

    fn channel_count(&self) -> usize {
        self.data().map_or(0, |data| data.channel_count())
    }

    /// Replace the data source and jump to "now".
    pub fn set_data(&mut self, data: Box<dyn EpgData>, now: Millis) {
        info!(channels = data.channel_count(), "guide data replaced");
        self.data = Some(data);
        self.recalculate(now, false);
    }

    /// Adopt a new viewport size. Re-anchors on "now" when it changed.
    pub fn on_resize(&mut self, viewport: ViewportSize, now: Millis) -> bool {
        if viewport == self.viewport {
            return false;
        }
        debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = viewport;
        self.recalculate(now, false);
        true
    }

    /// Rebuild the time axis around `now`, recompute scroll bounds and
    /// center on "now".
    pub fn recalculate(&mut self, now: Millis, animate: bool) {
        self.axis = TimeAxis::new(&self.config, self.viewport.width, now);
        self.scroll
            .recompute_bounds(&self.axis, self.channel_count(), self.viewport);
        self.scroll.reset_to_now(&self.axis, now, animate);
    }

    /// Scroll so that "now" is centered in the visible window.
    pub fn reset_to_now(&mut self, now: Millis, animate: bool) {
        self.scroll.reset_to_now(&self.axis, now, animate);
    }

    /// Move the content by `(dx, dy)` pixels, stopping at the edges.
    pub fn scroll_by(&mut self, dx: i64, dy: i64) -> (i64, i64) {
        self.scroll.cancel();
        self.scroll.scroll_by(dx, dy)
    }

    /// Advance scroll animation to `frame_time`.
    pub fn tick(&mut self, frame_time: Millis) -> ScrollFrame {
        self.scroll.tick(frame_time)
    }

    pub fn visible_set(&self) -> VisibleSet {
        match self.data() {
            Some(data) if data.has_data() => ViewportCuller::new(&self.axis).cull(
                data,
                self.scroll.scroll_x(),
                self.scroll.scroll_y(),
                self.viewport,
            ),
            _ => VisibleSet::default(),
        }
    }

    /// Plan the current frame, requesting logos that are not cached yet.
    pub fn render_frame(&mut self, now: Millis, fetcher: &dyn LogoFetcher) -> FramePlan<I> {
        let visible = self.visible_set();
        let Some(data) = self.data.as_deref() else {
            return FramePlan::default();
        };
        FrameRenderer::new(
            &self.config,
            &self.axis,
            data,
            (self.scroll.scroll_x(), self.scroll.scroll_y()),
            self.viewport,
            now,
        )
        .render(&visible, &mut self.logos, fetcher)
    }

    /// Feed one raw pointer sample.
    pub fn handle_pointer(&mut self, event: PointerEvent, now: Millis) -> PointerOutcome {
        if !self.has_data() {
            return PointerOutcome::default();
        }

        match self.gestures.handle(event) {
            Gesture::None => PointerOutcome::default(),
            Gesture::Down => PointerOutcome {
                hit: HitResult::None,
                repaint: self.scroll.cancel(),
            },
            Gesture::Drag { dx, dy } => {
                let (applied_x, applied_y) = self.scroll.scroll_by(-dx, -dy);
                PointerOutcome {
                    hit: HitResult::None,
                    repaint: applied_x != 0 || applied_y != 0,
                }
            }
            Gesture::Fling {
                velocity_x,
                velocity_y,
            } => {
                self.scroll.start_fling(-velocity_x, -velocity_y);
                PointerOutcome {
                    hit: HitResult::None,
                    repaint: true,
                }
            }
            Gesture::Tap { x, y } => {
                let hit = self.hit_test(x.round() as i64, y.round() as i64, now);
                PointerOutcome {
                    hit,
                    // The host starts the reset glide after this frame ticked
                    repaint: hit == HitResult::Reset,
                }
            }
        }
    }

    /// Resolve a viewport position against the current layout.
    pub fn hit_test(&self, x: i64, y: i64, now: Millis) -> HitResult {
        let Some(data) = self.data() else {
            return HitResult::None;
        };
        HitTester::new(
            &self.config,
            &self.axis,
            data,
            (self.scroll.scroll_x(), self.scroll.scroll_y()),
            self.viewport,
        )
        .hit_test(x, y, now)
    }

    /// Hand a resolved tap to `listener`.
    pub fn deliver(&self, hit: HitResult, listener: &mut dyn InteractionListener) {
        if let Some(data) = self.data() {
            deliver(hit, data, listener);
        }
    }

    /// Store the outcome of a logo fetch. Returns whether a repaint is needed.
    pub fn complete_logo(&mut self, key: &str, result: Result<I, LogoFetchError>) -> bool {
        self.logos.complete(key, result)
    }

    /// Logo states, for diagnostics.
    pub fn logo_cache(&self) -> &ImageCache<I> {
        &self.logos
    }

    /// Drop every cached logo, including pending requests.
    pub fn clear_image_cache(&mut self) {
        self.logos.clear();
    }
}

#[cfg(test)]
impl<I: LogoImage + Clone> Epg<I> {
    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn is_animating(&self) -> bool {
        self.scroll.is_animating()
    }

    pub fn visible_window(&self) -> super::time_axis::TimeWindow {
        self.axis
            .visible_window(self.scroll.scroll_x(), self.viewport.width)
    }

    pub fn reset_button_visible(&self, now: Millis) -> bool {
        self.has_data()
            && super::frame::reset_button_visible(
                &self.axis,
                &self.config,
                self.scroll.scroll_x(),
                self.viewport.width,
                now,
            )
    }
}
