use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Events that can be placed on the timeline by their start timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> &str;
}

/// Raw window parameters as they arrive on a query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowQuery {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Time window an event must fall into. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateWindow {
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// One local calendar day, `00:00:00.000` through `23:59:59.999`.
    Day {
        date: NaiveDate,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Unbounded,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("'{0}' is not an RFC 3339 timestamp")]
    InvalidInstant(String),
    #[error("'{0}' is not a YYYY-MM-DD date")]
    InvalidDate(String),
    #[error("{0} has no local midnight in the facility timezone")]
    NonexistentLocalTime(NaiveDate),
}

impl DateWindow {
    pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::Range { start, end }
    }

    pub fn day(date: NaiveDate, tz: &Tz) -> Result<Self, WindowError> {
        let first = date
            .and_hms_milli_opt(0, 0, 0, 0)
            .and_then(|naive| tz.from_local_datetime(&naive).earliest())
            .ok_or(WindowError::NonexistentLocalTime(date))?;
        let last = date
            .and_hms_milli_opt(23, 59, 59, 999)
            .and_then(|naive| tz.from_local_datetime(&naive).latest())
            .ok_or(WindowError::NonexistentLocalTime(date))?;

        Ok(Self::Day {
            date,
            start: first.with_timezone(&Utc),
            end: last.with_timezone(&Utc),
        })
    }

    /// Picks the mode by precedence: a full `start`+`end` pair, then `date`, then no
    /// filtering. A lone `start` or `end` is ignored. Blank values count as absent.
    ///
    /// Range bounds are read like event timestamps, so offset-less values and bare dates
    /// are facility-local. A bare-date `end` covers that whole local day.
    pub fn from_query(query: &WindowQuery, tz: &Tz) -> Result<Self, WindowError> {
        let start = non_blank(query.start.as_deref());
        let end = non_blank(query.end.as_deref());

        if let (Some(start), Some(end)) = (start, end) {
            return Ok(Self::range(
                parse_range_start(start, tz)?,
                parse_range_end(end, tz)?,
            ));
        }

        if let Some(date) = non_blank(query.date.as_deref()) {
            let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| WindowError::InvalidDate(date.to_string()))?;
            return Self::day(day, tz);
        }

        Ok(Self::Unbounded)
    }

    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match *self {
            Self::Range { start, end } | Self::Day { start, end, .. } => Some((start, end)),
            Self::Unbounded => None,
        }
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        match self.bounds() {
            Some((start, end)) => instant >= start && instant <= end,
            None => true,
        }
    }

    /// Tests a raw event timestamp. Unreadable timestamps only match an unbounded window.
    pub fn contains(&self, raw: &str, tz: &Tz) -> bool {
        if matches!(self, Self::Unbounded) {
            return true;
        }

        parse_event_instant(raw, tz).is_some_and(|instant| self.contains_instant(instant))
    }
}

/// Keeps the events that fall inside `window`, in their original order.
pub fn filter_events<E, I>(events: I, window: &DateWindow, tz: &Tz) -> Vec<E>
where
    E: Timestamped,
    I: IntoIterator<Item = E>,
{
    events
        .into_iter()
        .filter(|event| window.contains(event.timestamp(), tz))
        .collect()
}

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Reads an event timestamp. Values with an offset are taken as-is; values without one are
/// facility-local wall-clock times, and a bare date means local midnight.
pub fn parse_event_instant(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

fn parse_range_start(raw: &str, tz: &Tz) -> Result<DateTime<Utc>, WindowError> {
    parse_event_instant(raw, tz).ok_or_else(|| WindowError::InvalidInstant(raw.to_string()))
}

fn parse_range_end(raw: &str, tz: &Tz) -> Result<DateTime<Utc>, WindowError> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let DateWindow::Day { end, .. } = DateWindow::day(date, tz)? {
            return Ok(end);
        }
    }
    parse_range_start(raw, tz)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
