//! Guide widget: feeds egui input to the engine and paints its frame plan.

use std::time::Duration;

use eframe::egui::{
    self, Align2, Color32, FontId, Painter, PointerButton, Pos2, Rect, Sense, TextureHandle,
    text::{LayoutJob, TextWrapping},
};

use crate::core::config::{ColorSettings, EpgConfig};
use crate::core::epg::Epg;
use crate::core::frame::{DrawCommand, Swatch, TextAlign, TextStyle};
use crate::core::geometry::{PixelRect, ViewportSize};
use crate::core::gesture::{HitResult, PointerEvent, PointerPhase};
use crate::core::model::Millis;

use super::logo_loader::LogoLoader;

/// Repaint at least this often so the "now" line keeps moving.
const NOW_LINE_REFRESH: Duration = Duration::from_secs(30);

/// Icon drawn inside the reset button.
const RESET_ICON: &str = "🔄";

/// Theme lookups for painting a frame plan.
struct Theme<'a> {
    colors: &'a ColorSettings,
    config: &'a EpgConfig,
}

impl Theme<'_> {
    fn swatch(&self, swatch: Swatch) -> Color32 {
        let rgb = match swatch {
            Swatch::Background => self.colors.background,
            Swatch::ChannelBackground => self.colors.channel_background,
            Swatch::Event => self.colors.event_background,
            Swatch::EventCurrent => self.colors.event_background_current,
            Swatch::NowLine => self.colors.time_bar_line,
        };
        ColorSettings::to_color32(rgb)
    }

    fn font(&self, style: TextStyle) -> FontId {
        match style {
            TextStyle::EventTitle => FontId::proportional(self.config.event_text_size),
            TextStyle::TimeLabel => FontId::proportional(self.config.time_bar_text_size),
        }
    }

    fn text_color(&self) -> Color32 {
        ColorSettings::to_color32(self.colors.event_text)
    }
}

/// One frame of the guide inside the remaining space of a `Ui`.
pub struct EpgWidget<'a> {
    epg: &'a mut Epg<TextureHandle>,
    loader: &'a LogoLoader,
    colors: &'a ColorSettings,
    now: Millis,
    interactive: bool,
}

impl<'a> EpgWidget<'a> {
    pub fn new(
        epg: &'a mut Epg<TextureHandle>,
        loader: &'a LogoLoader,
        colors: &'a ColorSettings,
        now: Millis,
    ) -> Self {
        Self {
            epg,
            loader,
            colors,
            now,
            interactive: true,
        }
    }

    /// Ignore pointer input, e.g. while a modal dialog is open.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Lay out, handle input and paint. Returns the tap resolved this frame.
    pub fn show(mut self, ui: &mut egui::Ui) -> HitResult {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let rect = response.rect;
        let ctx = ui.ctx().clone();

        let viewport = ViewportSize::new(rect.width().round() as i64, rect.height().round() as i64);
        self.epg.on_resize(viewport, self.now);

        let frame_time = ui.input(|i| (i.time * 1000.0) as Millis);
        let mut hit = HitResult::None;

        if self.interactive {
            hit = self.handle_pointer(ui, rect, frame_time);
            if response.hovered() {
                let delta = ui.input(|i| i.smooth_scroll_delta);
                if delta != egui::Vec2::ZERO {
                    self.epg
                        .scroll_by(-delta.x.round() as i64, -delta.y.round() as i64);
                }
            }
        }

        self.loader.drain(&ctx, self.epg);
        if self.epg.tick(frame_time).animating {
            ctx.request_repaint();
        }
        ctx.request_repaint_after(NOW_LINE_REFRESH);

        let plan = self.epg.render_frame(self.now, self.loader);
        let theme = Theme {
            colors: self.colors,
            config: self.epg.config(),
        };
        if plan.is_empty() {
            painter.rect_filled(rect, 0.0, theme.swatch(Swatch::Background));
        }
        for command in &plan.commands {
            paint_command(&painter, rect.min, &theme, command);
        }

        hit
    }

    /// Feed this frame's raw pointer events to the engine.
    fn handle_pointer(&mut self, ui: &egui::Ui, rect: Rect, frame_time: Millis) -> HitResult {
        let events = ui.input(|i| i.events.clone());
        let mut hit = HitResult::None;

        for event in events {
            let (phase, pos) = match event {
                egui::Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    ..
                } if rect.contains(pos) => (PointerPhase::Pressed, pos),
                egui::Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: false,
                    ..
                } => (PointerPhase::Released, pos),
                egui::Event::PointerMoved(pos) => (PointerPhase::Moved, pos),
                egui::Event::PointerGone => (PointerPhase::Cancelled, rect.min),
                _ => continue,
            };

            let local = pos - rect.min;
            let outcome = self
                .epg
                .handle_pointer(PointerEvent::new(phase, local.x, local.y, frame_time), self.now);
            if outcome.hit != HitResult::None {
                hit = outcome.hit;
            }
            if outcome.repaint {
                ui.ctx().request_repaint();
            }
        }
        hit
    }
}

fn to_rect(origin: Pos2, rect: PixelRect) -> Rect {
    Rect::from_min_max(
        Pos2::new(origin.x + rect.left as f32, origin.y + rect.top as f32),
        Pos2::new(origin.x + rect.right as f32, origin.y + rect.bottom as f32),
    )
}

fn paint_command(
    painter: &Painter,
    origin: Pos2,
    theme: &Theme<'_>,
    command: &DrawCommand<TextureHandle>,
) {
    let clipped = |clip: PixelRect| {
        painter.with_clip_rect(to_rect(origin, clip).intersect(painter.clip_rect()))
    };

    match command {
        DrawCommand::Fill { rect, swatch, clip } => {
            clipped(*clip).rect_filled(to_rect(origin, *rect), 0.0, theme.swatch(*swatch));
        }
        DrawCommand::Logo { image, rect, clip } => {
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            clipped(*clip).image(image.id(), to_rect(origin, *rect), uv, Color32::WHITE);
        }
        DrawCommand::Text {
            text,
            rect,
            align,
            style,
            clip,
        } => {
            let painter = clipped(*clip);
            let bounds = to_rect(origin, *rect);
            let font = theme.font(*style);
            let color = theme.text_color();
            match align {
                TextAlign::Left => {
                    let mut job = LayoutJob::simple_singleline(text.clone(), font, color);
                    job.wrap = TextWrapping::truncate_at_width(bounds.width());
                    let galley = painter.layout_job(job);
                    let pos = Pos2::new(bounds.left(), bounds.center().y - galley.size().y / 2.0);
                    painter.galley(pos, galley, color);
                }
                TextAlign::Center => {
                    painter.text(bounds.center(), Align2::CENTER_CENTER, text, font, color);
                }
            }
        }
        DrawCommand::ResetButton { rect } => {
            let bounds = to_rect(origin, *rect);
            let radius = bounds.width().min(bounds.height()) / 2.0;
            painter.circle_filled(bounds.center(), radius, theme.swatch(Swatch::NowLine));
            painter.text(
                bounds.center(),
                Align2::CENTER_CENTER,
                RESET_ICON,
                FontId::proportional(radius),
                ColorSettings::to_color32(theme.colors.reset_icon),
            );
        }
    }
}
