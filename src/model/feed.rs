// File: src/model/feed.rs
// Raw VEVENT extraction from feed text, using the icalendar crate's parser.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use icalendar::DatePerhapsTime;
use icalendar::parser::{Property, read_calendar, unfold};

/// A DTSTART/DTEND/EXDATE value as it appears on the wire, time-zone
/// identity preserved for later expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum EventStart {
    Date(NaiveDate),
    Utc(DateTime<Utc>),
    Floating(NaiveDateTime),
    Zoned { date_time: NaiveDateTime, tzid: String },
}

/// One VEVENT lifted out of a feed, not yet resolved against "today".
#[derive(Debug, Clone)]
pub struct RawCalendarEvent {
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub start: EventStart,
    pub end: Option<EventStart>,
    pub rrules: Vec<String>,
    pub exdates: Vec<EventStart>,
}

impl RawCalendarEvent {
    /// A date-valued DTSTART marks the event all-day.
    pub fn is_all_day(&self) -> bool {
        matches!(self.start, EventStart::Date(_))
    }

    pub fn is_recurring(&self) -> bool {
        !self.rrules.is_empty()
    }
}

/// Parse feed text into raw events. Components other than VEVENT are
/// ignored; a VEVENT without a parsable DTSTART is dropped.
pub fn parse_feed(content: &str) -> anyhow::Result<Vec<RawCalendarEvent>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| anyhow::anyhow!("Invalid calendar data: {}", e))?;

    let mut events = Vec::new();

    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        let Some(start) = vevent
            .find_prop("DTSTART")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(to_event_start)
        else {
            continue;
        };

        let end = vevent
            .find_prop("DTEND")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(to_event_start);

        let summary = vevent
            .find_prop("SUMMARY")
            .map(|p| unescape_text(p.val.as_ref()))
            .unwrap_or_default();
        let location = vevent
            .find_prop("LOCATION")
            .map(|p| unescape_text(p.val.as_ref()));
        let description = vevent
            .find_prop("DESCRIPTION")
            .map(|p| unescape_text(p.val.as_ref()));

        let rrules: Vec<String> = vevent
            .properties
            .iter()
            .filter(|p| p.name == "RRULE")
            .map(|p| p.val.to_string())
            .collect();

        let exdates: Vec<EventStart> = vevent
            .properties
            .iter()
            .filter(|p| p.name == "EXDATE")
            .flat_map(parse_exdate_property)
            .collect();

        events.push(RawCalendarEvent {
            summary,
            location,
            description,
            start,
            end,
            rrules,
            exdates,
        });
    }

    Ok(events)
}

/// Convert icalendar's DatePerhapsTime to our EventStart, preserving
/// timezone info.
fn to_event_start(dpt: DatePerhapsTime) -> EventStart {
    match dpt {
        DatePerhapsTime::Date(d) => EventStart::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventStart::Utc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventStart::Floating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventStart::Zoned { date_time, tzid }
            }
        },
    }
}

/// Parse an EXDATE property into a list of EventStart values.
///
/// Handles TZID parameters, VALUE=DATE, UTC, floating, and comma-separated
/// value lists.
fn parse_exdate_property(prop: &Property) -> Vec<EventStart> {
    let tzid = prop
        .params
        .iter()
        .find(|p| p.key == "TZID")
        .and_then(|p| p.val.as_ref().map(|v| v.to_string()));

    let is_date = prop
        .params
        .iter()
        .any(|p| p.key == "VALUE" && p.val.as_ref().map(|v| v.as_ref()) == Some("DATE"));

    prop.val
        .as_ref()
        .split(',')
        .filter_map(|v| parse_exdate_value(v.trim(), tzid.as_deref(), is_date))
        .collect()
}

fn parse_exdate_value(val: &str, tzid: Option<&str>, is_date: bool) -> Option<EventStart> {
    if is_date || (val.len() == 8 && !val.contains('T')) {
        return NaiveDate::parse_from_str(val, "%Y%m%d")
            .ok()
            .map(EventStart::Date);
    }
    if let Some(stripped) = val.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S").ok()?;
        return Some(EventStart::Utc(naive.and_utc()));
    }
    let naive = NaiveDateTime::parse_from_str(val, "%Y%m%dT%H%M%S").ok()?;
    Some(match tzid {
        Some(tz) => EventStart::Zoned {
            date_time: naive,
            tzid: tz.to_string(),
        },
        None => EventStart::Floating(naive),
    })
}

/// Undo RFC 5545 TEXT escaping so titles and locations carry real commas
/// and line breaks.
fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}
