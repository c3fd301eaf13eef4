// End-to-end fetch tests against a mock HTTP server: source isolation,
// normalization on the fetch path, offsets, and the weather contract.
use chrono::{Duration, Local};
use inkdesk::client::HttpFetcher;
use inkdesk::client::calendar::gather_occurrences;
use inkdesk::client::weather::fetch_weather;
use inkdesk::config::{CalendarSource, ReplacementRule, WeatherConfig};
use std::time::Duration as StdDuration;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(StdDuration::from_secs(5)).unwrap()
}

fn source(name: &str, url: String) -> CalendarSource {
    CalendarSource {
        name: name.to_string(),
        url,
        offset: None,
        enabled: true,
    }
}

fn feed_with_event(props: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//inkdesk//test//EN\r\nBEGIN:VEVENT\r\nUID:t\r\n{}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
        props
    )
}

fn todays_all_day(summary: &str) -> String {
    feed_with_event(&format!(
        "SUMMARY:{}\r\nDTSTART;VALUE=DATE:{}",
        summary,
        Local::now().date_naive().format("%Y%m%d")
    ))
}

#[tokio::test]
async fn test_failed_source_does_not_block_others() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/good.ics")
        .with_status(200)
        .with_body(todays_all_day("Holiday"))
        .create_async()
        .await;
    server
        .mock("GET", "/bad.ics")
        .with_status(500)
        .create_async()
        .await;
    server
        .mock("GET", "/garbage.ics")
        .with_status(200)
        .with_body("this is not a calendar")
        .create_async()
        .await;

    let sources = [
        source("bad", format!("{}/bad.ics", server.url())),
        source("garbage", format!("{}/garbage.ics", server.url())),
        source("good", format!("{}/good.ics", server.url())),
    ];
    let occurrences = gather_occurrences(&fetcher(), &sources, &[], Local::now()).await;

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].calendar_name, "good");
    assert_eq!(occurrences[0].title, "Holiday");
}

#[tokio::test]
async fn test_titles_and_locations_normalized_on_fetch_path() {
    let mut server = mockito::Server::new_async().await;
    let feed = feed_with_event(&format!(
        "SUMMARY:FW: Budget Review\r\nLOCATION:https://corp.zoom.us/j/42\r\nDTSTART;VALUE=DATE:{}",
        Local::now().date_naive().format("%Y%m%d")
    ));
    server
        .mock("GET", "/cal.ics")
        .with_status(200)
        .with_body(feed)
        .create_async()
        .await;

    let rules = [ReplacementRule {
        name: "strip forwards".to_string(),
        find: "FW:".to_string(),
        replace: String::new(),
        enabled: true,
    }];
    let sources = [source("work", format!("{}/cal.ics", server.url()))];
    let occurrences = gather_occurrences(&fetcher(), &sources, &rules, Local::now()).await;

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].title, "Budget Review");
    assert_eq!(occurrences[0].location, "Zoom");
}

#[tokio::test]
async fn test_source_offset_shifts_today_for_that_source_only() {
    let tomorrow = Local::now().date_naive() + Duration::days(1);
    let feed = feed_with_event(&format!(
        "SUMMARY:Abroad\r\nDTSTART;VALUE=DATE:{}",
        tomorrow.format("%Y%m%d")
    ));

    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/cal.ics")
        .with_status(200)
        .with_body(feed)
        .expect(2)
        .create_async()
        .await;

    let mut shifted = source("shifted", format!("{}/cal.ics", server.url()));
    shifted.offset = Some(1);
    let plain = source("plain", format!("{}/cal.ics", server.url()));

    let occurrences = gather_occurrences(&fetcher(), &[shifted, plain], &[], Local::now()).await;

    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].calendar_name, "shifted");
    assert_eq!(occurrences[0].start.date_naive(), tomorrow);
}

#[tokio::test]
async fn test_weather_observation_maps_to_two_lines() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stations/KTST/observations/latest")
        .with_status(200)
        .with_body(
            r#"{"properties":{"textDescription":"Partly Cloudy","temperature":{"unitCode":"wmoUnit:degC","value":22.2}}}"#,
        )
        .create_async()
        .await;

    let config = WeatherConfig {
        station_id: "KTST".to_string(),
        api_url: server.url(),
    };
    let (line1, line2) = fetch_weather(&fetcher(), &config).await.unwrap();

    assert_eq!(line1, "72°F");
    assert_eq!(line2, "Partly Cloudy");
}

#[tokio::test]
async fn test_weather_failure_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stations/KTST/observations/latest")
        .with_status(503)
        .create_async()
        .await;

    let config = WeatherConfig {
        station_id: "KTST".to_string(),
        api_url: server.url(),
    };

    assert!(fetch_weather(&fetcher(), &config).await.is_err());
}

#[tokio::test]
async fn test_missing_temperature_still_parses() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/stations/KTST/observations/latest")
        .with_status(200)
        .with_body(r#"{"properties":{"textDescription":"Fog","temperature":{"value":null}}}"#)
        .create_async()
        .await;

    let config = WeatherConfig {
        station_id: "KTST".to_string(),
        api_url: server.url(),
    };
    let (line1, line2) = fetch_weather(&fetcher(), &config).await.unwrap();

    // A null reading falls back to 0°C.
    assert_eq!(line1, "32°F");
    assert_eq!(line2, "Fog");
}
