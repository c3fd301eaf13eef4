// File: src/client/calendar.rs
use crate::client::HttpFetcher;
use crate::config::{CalendarSource, ReplacementRule};
use crate::model::event::EventOccurrence;
use crate::model::{feed, normalize, recurrence};
use chrono::{DateTime, Duration, Local};
use futures::stream::{self, StreamExt};

/// Fetch every enabled source and resolve today's occurrences.
///
/// Sources are fetched concurrently. One failing or unparsable feed logs a
/// warning and contributes nothing; partial results are still rendered.
pub async fn gather_occurrences(
    fetcher: &HttpFetcher,
    sources: &[CalendarSource],
    rules: &[ReplacementRule],
    now: DateTime<Local>,
) -> Vec<EventOccurrence> {
    let mut futures = Vec::with_capacity(sources.len());
    for source in sources {
        futures.push(resolve_one(fetcher, source, rules, now));
    }

    let results: Vec<Vec<EventOccurrence>> = stream::iter(futures)
        .buffer_unordered(4)
        .collect()
        .await;

    let mut all = Vec::new();
    for mut v in results {
        all.append(&mut v);
    }
    all
}

/// Resolve one source, downgrading any failure to an empty result with a
/// warning so one bad feed never sinks the whole cycle.
async fn resolve_one(
    fetcher: &HttpFetcher,
    source: &CalendarSource,
    rules: &[ReplacementRule],
    now: DateTime<Local>,
) -> Vec<EventOccurrence> {
    match fetch_source(fetcher, source, rules, now).await {
        Ok(occurrences) => occurrences,
        Err(e) => {
            log::warn!("Calendar '{}' skipped: {}", source.name, e);
            Vec::new()
        }
    }
}

async fn fetch_source(
    fetcher: &HttpFetcher,
    source: &CalendarSource,
    rules: &[ReplacementRule],
    now: DateTime<Local>,
) -> anyhow::Result<Vec<EventOccurrence>> {
    let text = fetcher.fetch_text(&source.url).await?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let events = feed::parse_feed(&text)?;

    // The per-source day offset shifts which date counts as "today" for
    // this calendar only.
    let reference_now = now + Duration::days(source.offset.unwrap_or(0));
    let mut occurrences = recurrence::resolve_today(&events, &source.name, reference_now);

    for occ in &mut occurrences {
        occ.title = normalize::apply_rules(&occ.title, rules);
        occ.location = normalize::location_display(&occ.location, &occ.notes);
    }

    Ok(occurrences)
}
