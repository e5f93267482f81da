use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("Invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("Unknown weekday name {0:?}")]
    UnknownWeekday(String),

    #[error("Event {0} has no times")]
    NoTimes(EventId),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Wall-clock time of day an event starts at, with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTime(NaiveTime);

impl EventTime {
    pub fn new(inner: NaiveTime) -> Self {
        let normalized_time = NaiveTime::from_hms_opt(inner.hour(), inner.minute(), 0).unwrap_or(inner);
        Self(normalized_time)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn parse(text: &str) -> Result<Self, EventParseError> {
        NaiveTime::parse_from_str(text.trim(), "%H:%M")
            .map(Self::new)
            .map_err(|_| EventParseError::InvalidTime(text.to_owned()))
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for EventTime {
    type Err = EventParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses a day name into a weekday.
///
/// Accepts the Turkish names used by the in-game event calendar (with or
/// without Turkish letters) as well as English names and abbreviations.
pub fn parse_weekday(name: &str) -> Result<Weekday, EventParseError> {
    let normalized = name.trim().to_lowercase();
    let weekday = match normalized.as_str() {
        "pazartesi" => Weekday::Mon,
        "salı" | "sali" => Weekday::Tue,
        "çarşamba" | "carsamba" => Weekday::Wed,
        "perşembe" | "persembe" => Weekday::Thu,
        "cuma" => Weekday::Fri,
        "cumartesi" => Weekday::Sat,
        "pazar" => Weekday::Sun,
        other => other
            .parse::<Weekday>()
            .map_err(|_| EventParseError::UnknownWeekday(name.to_owned()))?,
    };

    Ok(weekday)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub times: Vec<EventTime>,
    pub allowed_weekdays: Option<Vec<Weekday>>,
}

impl Event {
    pub fn new(
        id: impl Into<EventId>,
        name: impl Into<String>,
        times: impl IntoIterator<Item = EventTime>,
    ) -> Result<Self, EventParseError> {
        let id = id.into();
        let mut times: Vec<EventTime> = times.into_iter().collect();
        times.sort();
        times.dedup();

        if times.is_empty() {
            return Err(EventParseError::NoTimes(id));
        }

        Ok(Self {
            id,
            name: name.into(),
            description: String::new(),
            times,
            allowed_weekdays: None,
        })
    }

    /// Builds an event from `HH:MM` times and optional day names.
    pub fn parse(
        id: &str,
        name: &str,
        times: &[&str],
        days: Option<&[&str]>,
    ) -> Result<Self, EventParseError> {
        let times = times
            .iter()
            .map(|time| EventTime::parse(time))
            .collect::<Result<Vec<_>, _>>()?;

        let event = Self::new(id, name, times)?;

        match days {
            Some(days) => {
                let weekdays = days
                    .iter()
                    .map(|day| parse_weekday(day))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(event.on_weekdays(weekdays))
            }
            None => Ok(event),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn on_weekdays(mut self, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        let mut allowed = Vec::new();
        for weekday in weekdays {
            if !allowed.contains(&weekday) {
                allowed.push(weekday);
            }
        }
        allowed.sort_by_key(Weekday::num_days_from_monday);

        self.allowed_weekdays = Some(allowed);
        self
    }

    pub fn occurs_on(&self, weekday: Weekday) -> bool {
        self.allowed_weekdays
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&weekday))
    }
}
