//! Frame planning.
//!
//! Turns the visible set into an ordered list of draw commands in viewport
//! coordinates. The list is painted front to back by the GUI layer, so later
//! commands cover earlier ones: rail, events, time bar, "now" line, reset
//! button.

use super::config::EpgConfig;
use super::culling::VisibleSet;
use super::geometry::{PixelRect, ViewportSize};
use super::image_cache::{ImageCache, LogoFetcher, LogoImage};
use super::model::{EpgData, Millis};
use super::time_axis::{TimeAxis, TimeWindow};
use super::time_format;

/// Theme color a fill is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swatch {
    Background,
    ChannelBackground,
    Event,
    EventCurrent,
    NowLine,
}

/// Theme font a text run is painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    EventTitle,
    TimeLabel,
}

/// Horizontal placement of text inside its box. Text is always vertically
/// centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// Starts at the left edge and is truncated at the right edge
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand<I> {
    Fill {
        rect: PixelRect,
        swatch: Swatch,
        clip: PixelRect,
    },
    Logo {
        image: I,
        rect: PixelRect,
        clip: PixelRect,
    },
    Text {
        text: String,
        rect: PixelRect,
        align: TextAlign,
        style: TextStyle,
        clip: PixelRect,
    },
    ResetButton {
        rect: PixelRect,
    },
}

/// Draw commands for one frame, in painting order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan<I> {
    pub commands: Vec<DrawCommand<I>>,
}

impl<I> Default for FramePlan<I> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<I> FramePlan<I> {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn fill(&mut self, rect: PixelRect, swatch: Swatch, clip: PixelRect) {
        self.commands.push(DrawCommand::Fill { rect, swatch, clip });
    }

    fn text(
        &mut self,
        text: String,
        rect: PixelRect,
        align: TextAlign,
        style: TextStyle,
        clip: PixelRect,
    ) {
        self.commands.push(DrawCommand::Text {
            text,
            rect,
            align,
            style,
            clip,
        });
    }
}

/// Whether the user has panned far enough from "now" to offer a reset.
pub fn reset_button_visible(
    axis: &TimeAxis,
    config: &EpgConfig,
    scroll_x: i64,
    viewport_width: i64,
    now: Millis,
) -> bool {
    let threshold = (viewport_width as f32 * config.reset_threshold_fraction) as i64;
    (axis.centered_now_scroll_x(now) - scroll_x).abs() > threshold
}

/// Reset button bounds in viewport coordinates, anchored bottom-right.
pub fn reset_button_rect(config: &EpgConfig, viewport: ViewportSize) -> PixelRect {
    let size = i64::from(config.reset_button_size);
    let margin = i64::from(config.reset_button_margin);
    PixelRect::from_size(
        viewport.width - size - margin,
        viewport.height - size - margin,
        size,
        size,
    )
}

/// Plans one frame of the guide.
pub struct FrameRenderer<'a> {
    config: &'a EpgConfig,
    axis: &'a TimeAxis,
    data: &'a dyn EpgData,
    scroll_x: i64,
    scroll_y: i64,
    viewport: ViewportSize,
    now: Millis,
    window: TimeWindow,
}

impl<'a> FrameRenderer<'a> {
    pub fn new(
        config: &'a EpgConfig,
        axis: &'a TimeAxis,
        data: &'a dyn EpgData,
        (scroll_x, scroll_y): (i64, i64),
        viewport: ViewportSize,
        now: Millis,
    ) -> Self {
        Self {
            config,
            axis,
            data,
            scroll_x,
            scroll_y,
            viewport,
            now,
            window: axis.visible_window(scroll_x, viewport.width),
        }
    }

    /// Build the draw commands for `visible`, requesting missing logos.
    pub fn render<I: LogoImage + Clone>(
        &self,
        visible: &VisibleSet,
        logos: &mut ImageCache<I>,
        fetcher: &dyn LogoFetcher,
    ) -> FramePlan<I> {
        let mut plan = FramePlan::default();
        if !self.data.has_data() || self.viewport.is_empty() {
            return plan;
        }

        let screen = PixelRect::from_size(0, 0, self.viewport.width, self.viewport.height);
        plan.fill(screen, Swatch::Background, screen);

        self.draw_channel_rail(&mut plan, visible, logos, fetcher);
        self.draw_events(&mut plan, visible);
        self.draw_time_bar(&mut plan);
        self.draw_now_line(&mut plan);
        self.draw_reset_button(&mut plan);
        plan
    }

    fn screen_top(&self, channel: usize) -> i64 {
        self.axis.top_from_channel_index(channel) - self.scroll_y
    }

    /// Viewport x of `time`, held within one viewport width of the screen so
    /// events far in the past or future still yield finite rectangles.
    fn screen_x(&self, time: Millis) -> i64 {
        let width = self.viewport.width;
        self.axis
            .x_from_time(time)
            .saturating_sub(self.scroll_x)
            .clamp(-width, 2 * width)
    }

    /// Rail background plus one logo per visible channel.
    fn draw_channel_rail<I: LogoImage + Clone>(
        &self,
        plan: &mut FramePlan<I>,
        visible: &VisibleSet,
        logos: &mut ImageCache<I>,
        fetcher: &dyn LogoFetcher,
    ) {
        let rail_width = self.axis.rail_width();
        let row_height = self.axis.row_height();
        let rail = PixelRect::from_size(0, 0, rail_width, self.viewport.height);
        plan.fill(rail, Swatch::ChannelBackground, rail);

        let target = rail_width.min(row_height).max(1) as u32;
        let padding = i64::from(self.config.rail_padding);

        for row in &visible.rows {
            let key = &self.data.channel(row.channel).logo;
            let Some(image) = logos.get_or_request(key, target, target, fetcher) else {
                continue;
            };

            let cell = PixelRect::from_size(0, self.screen_top(row.channel), rail_width, row_height);
            let (width, height) = image.size();
            let rect = cell.shrink(padding).fit_aspect(width, height);
            plan.commands.push(DrawCommand::Logo {
                image: image.clone(),
                rect,
                clip: rail,
            });
        }
    }

    /// Event cells, each row clipped to the grid.
    fn draw_events<I>(&self, plan: &mut FramePlan<I>, visible: &VisibleSet) {
        let grid_left = self.axis.rail_width() + self.axis.rail_margin();
        let row_height = self.axis.row_height();
        let margin = self.axis.rail_margin();
        let padding = i64::from(self.config.rail_padding);

        for row in &visible.rows {
            let top = self.screen_top(row.channel);
            let row_clip = PixelRect::new(grid_left, top, self.viewport.width, top + row_height);

            for event in &self.data.events(row.channel)[row.events.clone()] {
                let rect = PixelRect::new(
                    self.screen_x(event.start),
                    top,
                    self.screen_x(event.end) - margin,
                    top + row_height,
                );
                let swatch = if event.is_current(self.now) {
                    Swatch::EventCurrent
                } else {
                    Swatch::Event
                };
                plan.fill(rect, swatch, row_clip);

                let text_box = PixelRect::new(
                    rect.left + padding,
                    rect.top,
                    rect.right - padding,
                    rect.bottom,
                );
                if !text_box.is_empty() {
                    plan.text(
                        event.title.clone(),
                        text_box,
                        TextAlign::Left,
                        TextStyle::EventTitle,
                        text_box.intersect(&row_clip),
                    );
                }
            }
        }
    }

    /// Labels every spacing interval, the weekday corner and the stroke
    /// under the bar.
    fn draw_time_bar<I>(&self, plan: &mut FramePlan<I>) {
        let rail_width = self.axis.rail_width();
        let bar_height = self.axis.time_bar_height();
        let bar = PixelRect::new(
            rail_width + self.axis.rail_margin(),
            0,
            self.viewport.width,
            bar_height,
        );
        plan.fill(bar, Swatch::ChannelBackground, bar);

        let spacing = self.config.label_spacing_millis();
        let label_count = self.axis.window_millis() / spacing;
        for i in 0..label_count {
            // Nearest spacing boundary
            let time = spacing * (self.window.lower + spacing * i + spacing / 2).div_euclid(spacing);
            let x = self.screen_x(time);
            let label_box = PixelRect::new(x, 0, bar.right.max(x), bar_height);
            plan.text(
                time_format::short_time(time),
                label_box,
                TextAlign::Left,
                TextStyle::TimeLabel,
                bar,
            );
        }

        let corner = PixelRect::new(0, 0, rail_width, bar_height);
        plan.fill(corner, Swatch::ChannelBackground, corner);
        plan.text(
            time_format::weekday_name(self.window.lower),
            corner,
            TextAlign::Center,
            TextStyle::TimeLabel,
            corner,
        );

        let stroke = PixelRect::from_size(
            0,
            bar_height,
            self.viewport.width,
            i64::from(self.config.row_margin),
        );
        plan.fill(stroke, Swatch::Background, stroke);
    }

    fn draw_now_line<I>(&self, plan: &mut FramePlan<I>) {
        if !self.window.contains(self.now) {
            return;
        }
        let x = self.screen_x(self.now);
        let line = PixelRect::new(
            x,
            0,
            x + i64::from(self.config.time_bar_line_width),
            self.viewport.height,
        );
        let screen = PixelRect::from_size(0, 0, self.viewport.width, self.viewport.height);
        plan.fill(line, Swatch::NowLine, screen);
    }

    fn draw_reset_button<I>(&self, plan: &mut FramePlan<I>) {
        if reset_button_visible(
            self.axis,
            self.config,
            self.scroll_x,
            self.viewport.width,
            self.now,
        ) {
            plan.commands.push(DrawCommand::ResetButton {
                rect: reset_button_rect(self.config, self.viewport),
            });
        }
    }
}
