//! Scroll offset, bounds and momentum.
//!
//! Animations are closed-form functions of the time elapsed since their first
//! tick, so `tick` can be re-queried with the same frame time without drifting.

use tracing::debug;

use super::config::EpgConfig;
use super::geometry::ViewportSize;
use super::model::Millis;
use super::time_axis::TimeAxis;

/// Deceleration in px/s² for a friction coefficient of 1.0.
const DECELERATION_PER_FRICTION: f64 = 25_000.0;

/// Scroll position after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollFrame {
    pub scroll_x: i64,
    pub scroll_y: i64,
    /// Whether another tick is needed
    pub animating: bool,
}

/// Decelerating motion along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AxisFling {
    start: i64,
    /// Signed speed in px/s
    velocity: f64,
    /// Time until the speed reaches zero, in seconds
    duration: f64,
    deceleration: f64,
}

impl AxisFling {
    fn new(start: i64, velocity: f64, deceleration: f64) -> Self {
        Self {
            start,
            velocity,
            duration: velocity.abs() / deceleration,
            deceleration,
        }
    }

    fn offset_at(&self, seconds: f64) -> i64 {
        let t = seconds.clamp(0.0, self.duration);
        let travelled = self.velocity.abs() * t - 0.5 * self.deceleration * t * t;
        self.start + (self.velocity.signum() * travelled).round() as i64
    }

    fn is_finished(&self, seconds: f64) -> bool {
        seconds >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Idle,
    Fling {
        x: AxisFling,
        y: AxisFling,
        started_at: Option<Millis>,
    },
    Glide {
        from: (i64, i64),
        to: (i64, i64),
        duration: Millis,
        started_at: Option<Millis>,
    },
}

/// Owns the scroll offset and keeps it within `[0, max]` on both axes.
#[derive(Debug, Clone)]
pub struct ScrollController {
    /// Horizontal offset in content pixels
    scroll_x: i64,
    /// Vertical offset in content pixels
    scroll_y: i64,
    /// Largest horizontal offset
    max_scroll_x: i64,
    /// Largest vertical offset, 0 when all rows fit
    max_scroll_y: i64,
    /// Fling deceleration in px/s²
    deceleration: f64,
    /// Length of the animated jump to "now"
    reset_duration: Millis,
    /// Running animation, if any
    motion: Motion,
}

impl ScrollController {
    /// Idle controller at offset zero with empty bounds.
    pub fn new(config: &EpgConfig) -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
            max_scroll_x: 0,
            max_scroll_y: 0,
            deceleration: f64::from(config.fling_friction) * DECELERATION_PER_FRICTION,
            reset_duration: Millis::from(config.reset_animation_ms),
            motion: Motion::Idle,
        }
    }

    /// Current horizontal offset.
    pub fn scroll_x(&self) -> i64 {
        self.scroll_x
    }

    /// Current vertical offset.
    pub fn scroll_y(&self) -> i64 {
        self.scroll_y
    }

    /// Whether a fling or glide is in progress.
    pub fn is_animating(&self) -> bool {
        self.motion != Motion::Idle
    }

    /// Recompute the scroll limits for the current viewport and channel count
    /// and pull the offset back inside them.
    pub fn recompute_bounds(
        &mut self,
        axis: &TimeAxis,
        channel_count: usize,
        viewport: ViewportSize,
    ) {
        self.max_scroll_x = axis.max_scroll_x();
        self.max_scroll_y = if channel_count == 0 {
            0
        } else {
            (axis.content_height(channel_count) - viewport.height).max(0)
        };
        self.scroll_x = self.scroll_x.clamp(0, self.max_scroll_x);
        self.scroll_y = self.scroll_y.clamp(0, self.max_scroll_y);

        debug!(
            max_scroll_x = self.max_scroll_x,
            max_scroll_y = self.max_scroll_y,
            channel_count,
            "recomputed scroll bounds"
        );
    }

    /// Move by `(dx, dy)`, stopping exactly at the edges. Returns the delta
    /// actually applied.
    pub fn scroll_by(&mut self, dx: i64, dy: i64) -> (i64, i64) {
        let x = self.scroll_x.saturating_add(dx).clamp(0, self.max_scroll_x);
        let y = self.scroll_y.saturating_add(dy).clamp(0, self.max_scroll_y);
        let applied = (x - self.scroll_x, y - self.scroll_y);
        self.scroll_x = x;
        self.scroll_y = y;
        applied
    }

    /// Start momentum scrolling with a content velocity in px/s.
    pub fn start_fling(&mut self, velocity_x: f64, velocity_y: f64) {
        if velocity_x == 0.0 && velocity_y == 0.0 {
            self.motion = Motion::Idle;
            return;
        }
        self.motion = Motion::Fling {
            x: AxisFling::new(self.scroll_x, velocity_x, self.deceleration),
            y: AxisFling::new(self.scroll_y, velocity_y, self.deceleration),
            started_at: None,
        };
    }

    /// Scroll horizontally so that "now" is centered in the time window.
    pub fn reset_to_now(&mut self, axis: &TimeAxis, now: Millis, animate: bool) {
        let target_x = axis.centered_now_scroll_x(now).clamp(0, self.max_scroll_x);
        let duration = if animate { self.reset_duration } else { 0 };
        self.glide_to(target_x, self.scroll_y, duration);
    }

    /// Move to `(x, y)` over `duration` milliseconds; immediate when zero.
    pub fn glide_to(&mut self, x: i64, y: i64, duration: Millis) {
        let to = (x.clamp(0, self.max_scroll_x), y.clamp(0, self.max_scroll_y));
        if duration <= 0 {
            self.scroll_x = to.0;
            self.scroll_y = to.1;
            self.motion = Motion::Idle;
            return;
        }
        self.motion = Motion::Glide {
            from: (self.scroll_x, self.scroll_y),
            to,
            duration,
            started_at: None,
        };
    }

    /// Stop any animation in place. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        let was_animating = self.is_animating();
        self.motion = Motion::Idle;
        was_animating
    }

    /// Advance the running animation to `frame_time`.
    ///
    /// The first tick after an animation starts anchors its clock.
    pub fn tick(&mut self, frame_time: Millis) -> ScrollFrame {
        let (max_x, max_y) = (self.max_scroll_x, self.max_scroll_y);

        match &mut self.motion {
            Motion::Idle => {}
            Motion::Fling { x, y, started_at } => {
                let start = *started_at.get_or_insert(frame_time);
                let seconds = (frame_time - start).max(0) as f64 / 1000.0;

                let raw_x = x.offset_at(seconds);
                let raw_y = y.offset_at(seconds);
                self.scroll_x = raw_x.clamp(0, max_x);
                self.scroll_y = raw_y.clamp(0, max_y);

                let x_done = x.is_finished(seconds) || raw_x != self.scroll_x;
                let y_done = y.is_finished(seconds) || raw_y != self.scroll_y;
                if x_done && y_done {
                    self.motion = Motion::Idle;
                }
            }
            Motion::Glide {
                from,
                to,
                duration,
                started_at,
            } => {
                let start = *started_at.get_or_insert(frame_time);
                let progress = ((frame_time - start) as f64 / *duration as f64).clamp(0.0, 1.0);
                let eased = 1.0 - (1.0 - progress).powi(3);
                let lerp = |a: i64, b: i64| a + ((b - a) as f64 * eased).round() as i64;

                self.scroll_x = lerp(from.0, to.0).clamp(0, max_x);
                self.scroll_y = lerp(from.1, to.1).clamp(0, max_y);
                if progress >= 1.0 {
                    self.motion = Motion::Idle;
                }
            }
        }

        ScrollFrame {
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            animating: self.is_animating(),
        }
    }
}

#[cfg(test)]
impl ScrollController {
    pub fn max_scroll_x(&self) -> i64 {
        self.max_scroll_x
    }

    pub fn max_scroll_y(&self) -> i64 {
        self.max_scroll_y
    }
}
