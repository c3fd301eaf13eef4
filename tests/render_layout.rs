// Renderer layout tests against a fixed-metric text backend.
use chrono::{DateTime, Local, TimeZone};
use image::{GenericImageView, Rgb, RgbImage};
use inkdesk::model::EventOccurrence;
use inkdesk::render::fonts::{TextPainter, TextStyle};
use inkdesk::render::{HEIGHT, Renderer, WIDTH};

/// Fixed-metric painter: width scales with character count and glyphs land
/// as solid blocks, so tests can assert exactly where ink went.
struct BlockPainter;

impl TextPainter for BlockPainter {
    fn measure(&self, style: TextStyle, text: &str) -> (f32, f32) {
        (text.chars().count() as f32 * style.size * 0.5, style.size)
    }

    fn paint(
        &self,
        canvas: &mut RgbImage,
        style: TextStyle,
        text: &str,
        x: f32,
        y: f32,
        color: Rgb<u8>,
    ) {
        let (w, h) = self.measure(style, text);
        for px in x.max(0.0) as u32..((x + w) as u32).min(canvas.width()) {
            for py in y.max(0.0) as u32..((y + h) as u32).min(canvas.height()) {
                canvas.put_pixel(px, py, color);
            }
        }
    }
}

const RED: image::Rgba<u8> = image::Rgba([255, 0, 0, 255]);
const WHITE: image::Rgba<u8> = image::Rgba([255, 255, 255, 255]);
const BLACK: image::Rgba<u8> = image::Rgba([0, 0, 0, 255]);

fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 3, 15, 10, 0, 0).unwrap()
}

fn timed_event(title: &str, hour: u32) -> EventOccurrence {
    EventOccurrence {
        calendar_name: "work".to_string(),
        title: title.to_string(),
        location: "Room 1".to_string(),
        notes: String::new(),
        is_all_day: false,
        start: Local.with_ymd_and_hms(2025, 3, 15, hour, 0, 0).unwrap(),
        end: None,
    }
}

fn weather() -> (String, String) {
    ("72°F".to_string(), "Partly Cloudy".to_string())
}

fn render_to_image(events: &[EventOccurrence]) -> image::DynamicImage {
    let renderer = Renderer::new(&BlockPainter);
    let png = renderer.render(events, &weather(), fixed_now()).unwrap();
    image::load_from_memory(&png).unwrap()
}

#[test]
fn test_canvas_dimensions_and_panel_colors() {
    let img = render_to_image(&[]);

    assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
    // Date panel background is red, events panel background is white.
    assert_eq!(img.get_pixel(5, 5), RED);
    assert_eq!(img.get_pixel(300, 5), WHITE);
}

#[test]
fn test_empty_list_renders_placeholder() {
    let img = render_to_image(&[]);

    // "Nothing!" lands centered in the events panel: 8 chars * 12px wide,
    // 24px tall, around (260, 150).
    assert_eq!(img.get_pixel(260, 150), BLACK);
    // Top of the events panel stays empty.
    assert_eq!(img.get_pixel(260, 20), WHITE);
}

#[test]
fn test_events_flow_down_the_panel() {
    let events = vec![
        timed_event("One", 11),
        timed_event("Two", 12),
        timed_event("Three", 13),
        timed_event("Four", 14),
    ];
    let img = render_to_image(&events);

    // With 24px titles and 20px time lines the flow lands at fixed bands:
    // titles at y=16, 92, 168, 244 and time lines 32px below each.
    for title_y in [20, 100, 176, 250] {
        assert_eq!(img.get_pixel(130, title_y), BLACK, "title band at y={}", title_y);
    }
    // Time line of the last event renders fully on canvas.
    assert_eq!(img.get_pixel(130, 280), BLACK);
    // No placeholder in the middle of the flow.
    assert_eq!(img.get_pixel(390, 290), WHITE);
}

#[test]
fn test_separator_rules_between_events() {
    let events = vec![timed_event("One", 11), timed_event("Two", 12)];
    let img = render_to_image(&events);

    // A single separator after the first event, at y=80, spanning from the
    // events-panel inset to the right edge.
    assert_eq!(img.get_pixel(200, 80), BLACK);
    assert_eq!(img.get_pixel(399, 80), BLACK);
    // Left of the inset stays clear.
    assert_eq!(img.get_pixel(130, 80), WHITE);
}

#[test]
fn test_weather_lines_bottom_aligned_in_panel() {
    let img = render_to_image(&[]);

    // Both lines paint white blocks near the bottom of the red panel.
    assert_eq!(img.get_pixel(60, 283), WHITE);
    assert_eq!(img.get_pixel(60, 262), WHITE);
    // Above the weather block the panel is still red.
    assert_eq!(img.get_pixel(60, 240), RED);
}

#[test]
fn test_date_panel_shows_day_number() {
    let img = render_to_image(&[]);

    // The 92px day number block sits around the panel's vertical center.
    assert_eq!(img.get_pixel(60, 130), WHITE);
}

#[test]
fn test_long_title_is_truncated_to_panel() {
    let long = "An extremely long event title that cannot possibly fit the panel";
    let events = vec![timed_event(long, 11)];
    let img = render_to_image(&events);

    // 256px of room at 12px per character caps the title near x=128+252;
    // the title block must stop before the right edge.
    assert_eq!(img.get_pixel(130, 20), BLACK);
    assert_eq!(img.get_pixel(395, 20), WHITE);
}
