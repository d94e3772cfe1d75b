use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A calendar date as (year, month, day), displayed as `YYYY-MM-DD`.
///
/// Years outside 0..=9999 carry an explicit sign (`-0001-03-01`,
/// `+10000-01-01`), the same form chrono prints and parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..=9999).contains(&self.year) {
            write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
        } else {
            write!(f, "{:+05}-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

/// Error returned when a string is not a canonical `YYYY-MM-DD` date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCalendarDateError(pub String);

impl fmt::Display for ParseCalendarDateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid YYYY-MM-DD date", self.0)
    }
}

impl std::error::Error for ParseCalendarDateError {}

impl FromStr for CalendarDate {
    type Err = ParseCalendarDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ParseCalendarDateError(s.to_string()))?;
        let parsed = CalendarDate::from(date);

        // Only the zero-padded form is accepted, so that "2024-1-5" never
        // masquerades as "2024-01-05" when events are matched by string.
        if parsed.to_string() != s {
            return Err(ParseCalendarDateError(s.to_string()));
        }
        Ok(parsed)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A scheduled event, owned by the event store and only read by the calendar grid
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned identifier
    pub id: String,
    /// Calendar date in `YYYY-MM-DD` format
    pub date: String,
    pub title: String,
    /// Start time as entered (`HH:MM`)
    pub time: String,
    pub description: String,
}

/// Which month a grid cell belongs to, relative to the month being displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayMembership {
    /// Padding day from the preceding month
    Previous,
    /// Day of the displayed month
    Current,
    /// Padding day from the following month
    Next,
}

/// One position in a month grid with the events falling on that date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: CalendarDate,
    pub membership: DayMembership,
    pub events: Vec<Event>,
}

/// A month grid spanning whole weeks, Sunday first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarGrid {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub first_day_of_week: u32, // 0 = Sunday, 1 = Monday, etc.
    /// Shared with the backend grid cache
    pub days: Arc<Vec<DayCell>>,
    /// Index into `days` of the cell matching the supplied reference date
    pub today_index: Option<usize>,
}

/// Request for creating a new event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub date: String,
    pub title: String,
    pub time: String,
    pub description: String,
}

/// Request for updating an existing event; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub date: Option<String>,
    pub title: Option<String>,
    pub time: Option<String>,
    pub description: Option<String>,
}

/// Response after creating, updating or fetching an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event: Event,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<Event>,
}

/// Response after deleting an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteEventResponse {
    pub deleted_id: String,
    pub success_message: String,
}

/// Raw event form input, validated before submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFormInput {
    pub date: String,
    pub title: String,
    pub time: String,
    pub description: String,
}

/// Validation result for the event form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFormValidation {
    pub is_valid: bool,
    pub errors: Vec<EventValidationError>,
}

/// Specific validation errors for the event form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventValidationError {
    EmptyTitle,
    TitleTooLong(usize),
    EmptyTime,
    InvalidTime(String),
    EmptyDescription,
    InvalidDate(String),
}

impl fmt::Display for EventValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::TitleTooLong(max) => write!(f, "Title must be at most {} characters", max),
            Self::EmptyTime => write!(f, "Time is required"),
            Self::InvalidTime(time) => write!(f, "'{}' is not a valid HH:MM time", time),
            Self::EmptyDescription => write!(f, "Description is required"),
            Self::InvalidDate(date) => write!(f, "'{}' is not a valid YYYY-MM-DD date", date),
        }
    }
}

/// A month a client is looking at. Clients keep their own; the backend only
/// computes neighbours and the current month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFocusDate {
    pub year: i32,
    pub month: u32,
}

impl Default for CalendarFocusDate {
    fn default() -> Self {
        let now = chrono::Local::now();
        Self {
            year: now.year(),
            month: now.month(),
        }
    }
}

/// Today's date as seen by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentDateResponse {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub formatted_date: String,
    pub iso_date: String,
}
