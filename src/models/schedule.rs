use chrono::{NaiveTime, Timelike};
use regex::Regex;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Strict 24-hour `HH:MM:SS`, two digits per component.
pub const TIME_OF_DAY_REGEX: &str = r"^([0-1][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]$";

pub static TIME_OF_DAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(TIME_OF_DAY_REGEX).expect("valid time-of-day pattern"));

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
            DayOfWeek::Sunday => "SUNDAY",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// Case-insensitive; `"monday"`, `"Monday"` and `"MONDAY"` all parse.
impl FromStr for DayOfWeek {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        DayOfWeek::ALL.into_iter().find(|day| day.as_str() == upper).ok_or_else(|| ParseEnumError {
            kind: "day",
            value: s.to_string(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    #[default]
    Lecture,
    Lab,
    Tutorial,
    Seminar,
    Exam,
}

impl SessionType {
    pub const ALL: [SessionType; 5] = [
        SessionType::Lecture,
        SessionType::Lab,
        SessionType::Tutorial,
        SessionType::Seminar,
        SessionType::Exam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Lecture => "LECTURE",
            SessionType::Lab => "LAB",
            SessionType::Tutorial => "TUTORIAL",
            SessionType::Seminar => "SEMINAR",
            SessionType::Exam => "EXAM",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        SessionType::ALL.into_iter().find(|t| t.as_str() == upper).ok_or_else(|| ParseEnumError {
            kind: "session type",
            value: s.to_string(),
        })
    }
}

/// The two axes on which double-booking is forbidden.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResourceKind {
    Room,
    Instructor,
}

impl ResourceKind {
    /// Column of `timetable_sessions` holding the resource id.
    pub fn column(&self) -> &'static str {
        match self {
            ResourceKind::Room => "room_id",
            ResourceKind::Instructor => "instructor_id",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Room => f.write_str("room"),
            ResourceKind::Instructor => f.write_str("instructor"),
        }
    }
}

/// Time of day at second resolution, stored as seconds since midnight so
/// ordering is exact integer comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Some(TimeOfDay(hour * 3600 + minute * 60 + second))
        } else {
            None
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        (seconds < SECONDS_PER_DAY).then_some(TimeOfDay(seconds))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.0 / 3600, (self.0 / 60) % 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEnumError {
            kind: "time of day",
            value: s.to_string(),
        };
        if !TIME_OF_DAY_PATTERN.is_match(s) {
            return Err(invalid());
        }
        let mut parts = s.split(':').map(str::parse::<u32>);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(h)), Some(Ok(m)), Some(Ok(sec))) => TimeOfDay::from_hms(h, m, sec).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

// Fractional seconds are truncated; the schema only stores whole seconds.
impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        TimeOfDay(time.num_seconds_from_midnight())
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(time: TimeOfDay) -> Self {
        NaiveTime::from_num_seconds_from_midnight_opt(time.0, 0).unwrap_or(NaiveTime::MIN)
    }
}
