use axum::response::sse::Event;
use chrono::{DateTime, Local};
use std::fmt;

/// Rendering used for every tick, e.g. `2024-05-01 12:00:00.123456789 +02:00`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f %:z";

/// The payload of one event: the wall-clock instant it was produced at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    at: DateTime<Local>,
}

impl Tick {
    pub fn now() -> Self {
        Self { at: Local::now() }
    }

    /// Frames the tick as a data-only SSE event (`data: <timestamp>\n\n`).
    pub fn into_event(self) -> Event {
        Event::default().data(self.to_string())
    }
}

impl From<DateTime<Local>> for Tick {
    fn from(at: DateTime<Local>) -> Self {
        Self { at }
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.at.format(TIMESTAMP_FORMAT))
    }
}
