use anyhow::Result;
use colored::*;
use std::time::{Duration, Instant};

use crate::output::{print_event, TestResult};
use crate::sse_client::{Connection, Event};

/// Receipt-time slack allowed between two events, on top of the tick interval
const JITTER: Duration = Duration::from_millis(250);

fn check_framing(event: &Event) -> Result<(), String> {
    if event.data.trim().is_empty() {
        return Err("received an event with an empty payload".to_string());
    }
    if event.data.contains('\n') {
        return Err(format!("payload spans several lines: {:?}", event.data));
    }
    Ok(())
}

fn check_gap(previous: &Event, next: &Event, interval: Duration) -> Result<(), String> {
    let gap = next.received_at.duration_since(previous.received_at);
    if gap + JITTER < interval {
        return Err(format!("events only {gap:?} apart, expected {interval:?}"));
    }
    if gap > interval * 2 + JITTER {
        return Err(format!("events {gap:?} apart, expected {interval:?}"));
    }
    Ok(())
}

pub async fn test_connection(base_url: &str, interval: Duration) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Connection ===".bright_cyan().bold());

    let mut sse =
        Connection::establish(base_url, "Client 1".to_string(), Color::BrightBlue).await?;
    println!("{} Waiting for the first event...", "→".blue());

    let result = match sse.next_event(interval + Duration::from_secs(3)).await {
        Ok(event) => {
            print_event(&sse.label, sse.color, &event);
            match check_framing(&event) {
                Ok(()) => {
                    println!("{} Event received", "✓".green());
                    TestResult::pass("connection", start.elapsed())
                }
                Err(message) => TestResult::fail("connection", message, start.elapsed()),
            }
        }
        Err(e) => TestResult::fail("connection", e.to_string(), start.elapsed()),
    };

    sse.close();
    Ok(result)
}

pub async fn test_cadence(base_url: &str, interval: Duration, samples: usize) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Cadence ===".bright_cyan().bold());

    let mut sse =
        Connection::establish(base_url, "Client 1".to_string(), Color::BrightBlue).await?;
    println!(
        "{} Collecting {} events, expecting one every {:?}...",
        "→".blue(),
        samples,
        interval
    );

    let mut events: Vec<Event> = Vec::with_capacity(samples);
    for _ in 0..samples {
        match sse.next_event(interval * 2 + Duration::from_secs(3)).await {
            Ok(event) => {
                print_event(&sse.label, sse.color, &event);
                if let Err(message) = check_framing(&event) {
                    sse.close();
                    return Ok(TestResult::fail("cadence", message, start.elapsed()));
                }
                events.push(event);
            }
            Err(e) => {
                sse.close();
                return Ok(TestResult::fail("cadence", e.to_string(), start.elapsed()));
            }
        }
    }
    sse.close();

    for pair in events.windows(2) {
        if let Err(message) = check_gap(&pair[0], &pair[1], interval) {
            return Ok(TestResult::fail("cadence", message, start.elapsed()));
        }
    }

    println!("{} Cadence verified", "✓".green());
    Ok(TestResult::pass("cadence", start.elapsed()))
}

pub async fn test_concurrent(base_url: &str, interval: Duration) -> Result<TestResult> {
    let start = Instant::now();
    println!("\n{}", "=== TEST: Concurrent clients ===".bright_cyan().bold());

    let timeout = interval * 2 + Duration::from_secs(3);
    let mut sse1 =
        Connection::establish(base_url, "Client 1".to_string(), Color::BrightBlue).await?;
    let mut sse2 =
        Connection::establish(base_url, "Client 2".to_string(), Color::BrightMagenta).await?;

    for sse in [&mut sse1, &mut sse2] {
        match sse.next_event(timeout).await {
            Ok(event) => print_event(&sse.label, sse.color, &event),
            Err(e) => {
                return Ok(TestResult::fail(
                    "concurrent",
                    e.to_string(),
                    start.elapsed(),
                ))
            }
        }
    }

    println!("{} Closing Client 1...", "→".blue());
    sse1.close();

    println!(
        "{} Client 2 should keep receiving events...",
        "→".blue()
    );
    let mut previous: Option<Event> = None;
    for _ in 0..2 {
        match sse2.next_event(timeout).await {
            Ok(event) => {
                print_event(&sse2.label, sse2.color, &event);
                if let Some(previous) = &previous {
                    if let Err(message) = check_gap(previous, &event, interval) {
                        sse2.close();
                        return Ok(TestResult::fail("concurrent", message, start.elapsed()));
                    }
                }
                previous = Some(event);
            }
            Err(e) => {
                sse2.close();
                return Ok(TestResult::fail(
                    "concurrent",
                    e.to_string(),
                    start.elapsed(),
                ));
            }
        }
    }
    sse2.close();

    println!("{} Client 2 unaffected by Client 1 leaving", "✓".green());
    Ok(TestResult::pass("concurrent", start.elapsed()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_at(data: &str, received_at: Instant) -> Event {
        Event {
            data: data.to_string(),
            received_at,
        }
    }

    #[test]
    fn framing_rejects_empty_and_multiline_payloads() {
        let now = Instant::now();
        assert!(check_framing(&event_at("2024-05-01 12:00:00 +00:00", now)).is_ok());
        assert!(check_framing(&event_at("", now)).is_err());
        assert!(check_framing(&event_at("a\nb", now)).is_err());
    }

    #[test]
    fn gap_must_match_the_interval() {
        let interval = Duration::from_secs(2);
        let first = event_at("t0", Instant::now());

        let on_time = event_at("t1", first.received_at + interval);
        assert!(check_gap(&first, &on_time, interval).is_ok());

        let early = event_at("t1", first.received_at + Duration::from_millis(500));
        assert!(check_gap(&first, &early, interval).is_err());

        let late = event_at("t1", first.received_at + Duration::from_secs(6));
        assert!(check_gap(&first, &late, interval).is_err());
    }
}
