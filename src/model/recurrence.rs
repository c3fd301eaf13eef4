// File: ./src/model/recurrence.rs
use crate::model::event::EventOccurrence;
use crate::model::feed::{EventStart, RawCalendarEvent};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use rrule::RRuleSet;
use std::collections::HashSet;
use std::str::FromStr;

/// Resolve every event in a parsed calendar against "today".
///
/// `reference_now` is the viewer's wall clock, already shifted by the
/// calendar's day offset. A single event failing to expand (malformed rule,
/// unknown time zone) is skipped with a warning; its siblings still resolve.
pub fn resolve_today(
    events: &[RawCalendarEvent],
    calendar_name: &str,
    reference_now: DateTime<Local>,
) -> Vec<EventOccurrence> {
    let mut occurrences = Vec::new();

    for event in events {
        let resolved = if event.is_recurring() {
            resolve_recurring(event, reference_now)
        } else {
            resolve_single(event, reference_now)
        };

        match resolved {
            Ok(Some((start, end))) => occurrences.push(EventOccurrence {
                calendar_name: calendar_name.to_string(),
                title: event.summary.clone(),
                location: event.location.clone().unwrap_or_default(),
                notes: event.description.clone().unwrap_or_default(),
                is_all_day: event.is_all_day(),
                start,
                end,
            }),
            Ok(None) => {}
            Err(e) => log::warn!(
                "Skipping event '{}' in '{}': {}",
                event.summary,
                calendar_name,
                e
            ),
        }
    }

    occurrences
}

type ResolvedTimes = (DateTime<Local>, Option<DateTime<Local>>);

/// Shared acceptance gate: the occurrence must fall on the reference date,
/// and timed events that already started are not shown. All-day events are
/// never time-rejected.
fn accept(
    event: &RawCalendarEvent,
    start: DateTime<Local>,
    reference_now: DateTime<Local>,
) -> bool {
    if start.date_naive() != reference_now.date_naive() {
        return false;
    }
    if !event.is_all_day() && start < reference_now {
        return false;
    }
    true
}

fn resolve_single(
    event: &RawCalendarEvent,
    reference_now: DateTime<Local>,
) -> Result<Option<ResolvedTimes>> {
    let start = to_local(&event.start)?;
    if !accept(event, start, reference_now) {
        return Ok(None);
    }
    let end = match &event.end {
        Some(value) => Some(to_local(value)?),
        None => None,
    };
    Ok(Some((start, end)))
}

fn resolve_recurring(
    event: &RawCalendarEvent,
    reference_now: DateTime<Local>,
) -> Result<Option<ResolvedTimes>> {
    let rrule_set = build_rrule_set(event)?;
    let (window_start, window_end) = expansion_window(&event.start, reference_now.date_naive())?;

    // Occurrences arrive in order, so the first one inside the closed window
    // is the one that counts. The take_while bound keeps unbounded rules
    // from iterating past today.
    let first = rrule_set
        .into_iter()
        .map(|d| d.to_utc())
        .take_while(|d| *d <= window_end)
        .find(|d| *d >= window_start);

    let Some(first) = first else {
        return Ok(None);
    };

    // All-day expansions run on UTC-midnight seeds; taking the occurrence's
    // UTC date directly avoids shifting the day through the viewer's zone.
    let start = if event.is_all_day() {
        local_midnight(first.date_naive())?
    } else {
        first.with_timezone(&Local)
    };

    if !accept(event, start, reference_now) {
        return Ok(None);
    }

    let end = if event.is_all_day() {
        None
    } else {
        match &event.end {
            Some(value) => {
                let duration = start_to_utc(value)? - start_to_utc(&event.start)?;
                Some(start + duration)
            }
            None => None,
        }
    };

    Ok(Some((start, end)))
}

/// Assemble the expansion input the way the rule engine expects it:
/// a DTSTART line carrying the event's own time-zone identity, the RRULE
/// lines, and deduplicated EXDATE lines as UTC instants.
fn build_rrule_set(event: &RawCalendarEvent) -> Result<RRuleSet> {
    let dtstart_line = match &event.start {
        EventStart::Zoned { date_time, tzid } => {
            format!("DTSTART;TZID={}:{}", tzid, date_time.format("%Y%m%dT%H%M%S"))
        }
        other => format!("DTSTART:{}", start_to_utc(other)?.format("%Y%m%dT%H%M%SZ")),
    };

    let mut text = format!("{}\n", dtstart_line);
    for rule in &event.rrules {
        text.push_str(&format!("RRULE:{}\n", normalize_rule(rule)));
    }

    // Some feeds repeat identical EXDATEs; feed each instant only once.
    let mut seen_exdates = HashSet::new();
    for exdate in &event.exdates {
        let Ok(instant) = start_to_utc(exdate) else {
            continue;
        };
        let line = instant.format("%Y%m%dT%H%M%SZ").to_string();
        if seen_exdates.insert(line.clone()) {
            text.push_str(&format!("EXDATE:{}\n", line));
        }
    }

    RRuleSet::from_str(&text).map_err(|e| anyhow!("Invalid recurrence rule: {}", e))
}

/// Sanitize a raw RRULE value: strip an accidental "RRULE:" prefix, and
/// upgrade a date-only UNTIL to end-of-day UTC — the rule engine requires
/// UNTIL to match the DTSTART flavor.
fn normalize_rule(rule: &str) -> String {
    let clean = rule.trim();
    let mut part = if clean.to_uppercase().starts_with("RRULE:") {
        clean[6..].to_string()
    } else {
        clean.to_string()
    };

    if let Some(idx) = part.find("UNTIL=") {
        let val_start = idx + 6;
        let val_end = part[val_start..]
            .find(';')
            .map(|i| val_start + i)
            .unwrap_or(part.len());
        let val = &part[val_start..val_end];

        if val.len() == 8 && !val.contains('T') {
            let new_until = format!("{}T235959Z", val);
            part.replace_range(val_start..val_end, &new_until);
        }
    }

    part
}

/// The closed single-day window `[00:00, 23:59]` of the reference date,
/// anchored in the event's own time zone and expressed as UTC instants.
fn expansion_window(
    start: &EventStart,
    reference_date: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let day_start = reference_date.and_hms_opt(0, 0, 0).unwrap();
    let day_end = reference_date.and_hms_opt(23, 59, 0).unwrap();

    Ok(match start {
        EventStart::Date(_) | EventStart::Utc(_) => (day_start.and_utc(), day_end.and_utc()),
        EventStart::Floating(_) => (
            resolve_local(&Local, day_start)?.to_utc(),
            resolve_local(&Local, day_end)?.to_utc(),
        ),
        EventStart::Zoned { tzid, .. } => {
            let tz = parse_tz(tzid)?;
            (
                resolve_local(&tz, day_start)?.to_utc(),
                resolve_local(&tz, day_end)?.to_utc(),
            )
        }
    })
}

/// Convert a wire value to the viewer's zone. Date values resolve to local
/// midnight so their date survives untouched.
fn to_local(value: &EventStart) -> Result<DateTime<Local>> {
    Ok(match value {
        EventStart::Date(d) => local_midnight(*d)?,
        EventStart::Utc(dt) => dt.with_timezone(&Local),
        EventStart::Floating(naive) => resolve_local(&Local, *naive)?,
        EventStart::Zoned { date_time, tzid } => {
            let tz = parse_tz(tzid)?;
            resolve_local(&tz, *date_time)?.with_timezone(&Local)
        }
    })
}

fn start_to_utc(value: &EventStart) -> Result<DateTime<Utc>> {
    Ok(match value {
        EventStart::Date(d) => d.and_hms_opt(0, 0, 0).unwrap().and_utc(),
        EventStart::Utc(dt) => *dt,
        EventStart::Floating(naive) => resolve_local(&Local, *naive)?.to_utc(),
        EventStart::Zoned { date_time, tzid } => {
            let tz = parse_tz(tzid)?;
            resolve_local(&tz, *date_time)?.to_utc()
        }
    })
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    resolve_local(&Local, date.and_hms_opt(0, 0, 0).unwrap())
}

/// Pin a naive wall time into a zone, taking the earlier instant when a
/// DST transition makes it ambiguous and failing when it does not exist.
fn resolve_local<T: TimeZone>(tz: &T, naive: chrono::NaiveDateTime) -> Result<DateTime<T>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| anyhow!("Wall time {} does not exist in this time zone", naive))
}

fn parse_tz(tzid: &str) -> Result<Tz> {
    tzid.parse::<Tz>()
        .map_err(|_| anyhow!("Unknown time zone '{}'", tzid))
}
