// File: ./src/render/mod.rs
// Fixed-layout renderer for the 400x300 e-ink status image.
pub mod fonts;

use crate::model::event::EventOccurrence;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local};
use fonts::{Face, TextPainter, TextStyle};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::io::Cursor;

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 300;

const MARGIN: f32 = 8.0;
const MARGIN_HALF: f32 = 4.0;
const MARGIN_DOUBLE: f32 = 16.0;

const DATE_WIDTH: f32 = 120.0;
const EVENTS_WIDTH: f32 = WIDTH as f32 - DATE_WIDTH - MARGIN;

// The display palette is three fixed inks: white paper, black text, red panel.
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

const TITLE_STYLE: TextStyle = TextStyle::new(Face::Bold, 24.0);
const TITLE_OTHER_DAY_STYLE: TextStyle = TextStyle::new(Face::BoldItalic, 24.0);
const TIME_LOCATION_STYLE: TextStyle = TextStyle::new(Face::Regular, 20.0);
const DAY_STYLE: TextStyle = TextStyle::new(Face::Bold, 92.0);
const MONTH_STYLE: TextStyle = TextStyle::new(Face::Bold, 36.0);
const WEEKDAY_STYLE: TextStyle = TextStyle::new(Face::Bold, 36.0);
const WEATHER_STYLE: TextStyle = TextStyle::new(Face::Bold, 16.0);
const PLACEHOLDER_STYLE: TextStyle = TextStyle::new(Face::Italic, 24.0);

pub struct Renderer<'a> {
    painter: &'a dyn TextPainter,
}

impl<'a> Renderer<'a> {
    pub fn new(painter: &'a dyn TextPainter) -> Self {
        Self { painter }
    }

    /// Render the full status image and encode it as PNG. Pure given its
    /// inputs; `now` feeds the date panel and the other-day italic check.
    pub fn render(
        &self,
        events: &[EventOccurrence],
        weather: &(String, String),
        now: DateTime<Local>,
    ) -> Result<Vec<u8>> {
        let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);

        self.draw_date(&mut canvas, now);
        self.draw_weather(&mut canvas, weather);

        if events.is_empty() {
            self.draw_no_events(&mut canvas);
        } else {
            self.draw_events(&mut canvas, events, now);
        }

        let mut bytes = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("PNG encoding failed")?;
        Ok(bytes)
    }

    /// Left panel: month, large day number, weekday, each centered and
    /// stacked around the panel's vertical center.
    fn draw_date(&self, canvas: &mut RgbImage, now: DateTime<Local>) {
        draw_filled_rect_mut(canvas, Rect::at(0, 0).of_size(DATE_WIDTH as u32, HEIGHT), RED);

        let day = now.day().to_string();
        let (day_w, day_h) = self.painter.measure(DAY_STYLE, &day);
        let day_y = HEIGHT as f32 / 2.0 - day_h / 2.0 - MARGIN_DOUBLE;
        self.painter.paint(
            canvas,
            DAY_STYLE,
            &day,
            DATE_WIDTH / 2.0 - day_w / 2.0,
            day_y,
            WHITE,
        );

        let month = now.format("%b").to_string();
        let (month_w, month_h) = self.painter.measure(MONTH_STYLE, &month);
        self.painter.paint(
            canvas,
            MONTH_STYLE,
            &month,
            DATE_WIDTH / 2.0 - month_w / 2.0,
            day_y - month_h - MARGIN_HALF,
            WHITE,
        );

        let weekday = now.format("%a").to_string();
        let (weekday_w, _) = self.painter.measure(WEEKDAY_STYLE, &weekday);
        self.painter.paint(
            canvas,
            WEEKDAY_STYLE,
            &weekday,
            DATE_WIDTH / 2.0 - weekday_w / 2.0,
            HEIGHT as f32 / 2.0 + day_h / 2.0 - MARGIN_DOUBLE,
            WHITE,
        );
    }

    /// Right panel: vertical flow of titles, time/location lines, and
    /// separator rules.
    fn draw_events(&self, canvas: &mut RgbImage, events: &[EventOccurrence], now: DateTime<Local>) {
        let mut y = MARGIN_DOUBLE;

        for (i, event) in events.iter().enumerate() {
            // All-day entries dated off today (a day-offset calendar looking
            // ahead) render italic to stand apart.
            let title_style = if event.is_all_day && event.start.date_naive() != now.date_naive() {
                TITLE_OTHER_DAY_STYLE
            } else {
                TITLE_STYLE
            };

            let title = self.truncate(&event.title, EVENTS_WIDTH - MARGIN_DOUBLE, title_style);
            self.painter
                .paint(canvas, title_style, &title, DATE_WIDTH + MARGIN, y, BLACK);
            let (_, title_h) = self.painter.measure(title_style, &title);
            y += (title_h + MARGIN).ceil();

            if !event.is_all_day {
                let time = event.start.format("%-I:%M %p").to_string().to_lowercase();
                let line = if event.location.trim().is_empty() {
                    time
                } else {
                    format!("{} – {}", time, event.location)
                };
                let line = self.truncate(&line, EVENTS_WIDTH - MARGIN_DOUBLE, TIME_LOCATION_STYLE);
                self.painter.paint(
                    canvas,
                    TIME_LOCATION_STYLE,
                    &line,
                    DATE_WIDTH + MARGIN,
                    y,
                    BLACK,
                );
                let (_, line_h) = self.painter.measure(TIME_LOCATION_STYLE, &line);
                y += (line_h + MARGIN + MARGIN_HALF).ceil();
            }

            if i < events.len() - 1 {
                draw_line_segment_mut(
                    canvas,
                    (DATE_WIDTH + MARGIN_DOUBLE, y),
                    (WIDTH as f32, y),
                    BLACK,
                );
                y += MARGIN + MARGIN_HALF;
            }
        }
    }

    fn draw_no_events(&self, canvas: &mut RgbImage) {
        let text = "Nothing!";
        let (w, h) = self.painter.measure(PLACEHOLDER_STYLE, text);
        self.painter.paint(
            canvas,
            PLACEHOLDER_STYLE,
            text,
            DATE_WIDTH + EVENTS_WIDTH / 2.0 - w / 2.0,
            HEIGHT as f32 / 2.0 - h / 2.0,
            BLACK,
        );
    }

    /// Two short lines bottom-aligned inside the date panel, each truncated
    /// to the panel width on its own.
    fn draw_weather(&self, canvas: &mut RgbImage, weather: &(String, String)) {
        let line1 = self.truncate(&weather.0, DATE_WIDTH - MARGIN, WEATHER_STYLE);
        let line2 = self.truncate(&weather.1, DATE_WIDTH - MARGIN, WEATHER_STYLE);

        let (w1, h1) = self.painter.measure(WEATHER_STYLE, &line1);
        let (w2, h2) = self.painter.measure(WEATHER_STYLE, &line2);

        let y2 = HEIGHT as f32 - MARGIN - h2;
        let y1 = y2 - MARGIN_HALF - h1;

        self.painter.paint(
            canvas,
            WEATHER_STYLE,
            &line1,
            DATE_WIDTH / 2.0 - w1 / 2.0,
            y1,
            WHITE,
        );
        self.painter.paint(
            canvas,
            WEATHER_STYLE,
            &line2,
            DATE_WIDTH / 2.0 - w2 / 2.0,
            y2,
            WHITE,
        );
    }

    fn truncate(&self, text: &str, max_width: f32, style: TextStyle) -> String {
        truncate_with(text, max_width, |t| self.painter.measure(style, t).0)
    }
}

/// Greedy fixed-point shortening: while the text meets or exceeds the
/// limit, strip the trailing character (after any existing ellipsis) and
/// re-append a single ellipsis. Each pass strictly shortens the text, so
/// the loop terminates — at worst with the empty string.
pub fn truncate_with(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> String {
    let mut out = text.to_string();
    while !out.is_empty() && measure(&out) >= max_width {
        let stripped = out.trim_end_matches('…');
        let mut chars = stripped.chars();
        if chars.next_back().is_none() {
            return String::new();
        }
        out = format!("{}…", chars.as_str());
    }
    out
}
