//! Calendar domain logic for the event calendar.
//!
//! This module owns month-grid generation: which dates a month view shows,
//! which month each of those dates belongs to, and which events fall on each
//! date. Month navigation is stateless: clients hold the month they are
//! looking at and ask for its neighbours. Grid generation is a pure function
//! of its inputs; the clock is read only by `get_current_date` and
//! `current_focus_date`.

use chrono::Local;
use shared::{
    CalendarDate, CalendarFocusDate, CalendarGrid, CurrentDateResponse, DayCell, DayMembership,
    Event,
};
use quick_cache::sync::Cache;
use std::sync::Arc;
use tracing::debug;

const DAYS_PER_WEEK: u32 = 7;

/// Errors raised by calendar operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid month: {0}. Must be between 1 and 12")]
    InvalidMonth(u32),
    #[error("Year {0} has no representable neighbouring month")]
    YearOutOfRange(i32),
}

/// Grid cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCacheConfig {
    pub enabled: bool,
    /// Most grids held at once; least recently used ones are evicted first
    pub capacity: usize,
}

impl Default for GridCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 64,
        }
    }
}

/// Calendar service that handles month grids and calendar navigation
#[derive(Clone)]
pub struct CalendarService {
    grid_cache: Arc<GridCache>,
}

impl CalendarService {
    pub fn new(cache: GridCacheConfig) -> Self {
        Self {
            grid_cache: Arc::new(GridCache::new(cache)),
        }
    }

    /// Build the day cells for a month view.
    ///
    /// The result always spans whole weeks starting on Sunday. Leading cells
    /// come from the end of the previous month, trailing cells from the start
    /// of the next one. Each cell carries the events whose `date` string equals
    /// the cell's `YYYY-MM-DD` date, in input order; events with malformed
    /// dates never match.
    pub fn build_grid(
        &self,
        year: i32,
        month: u32,
        events: &[Event],
    ) -> Result<Vec<DayCell>, CalendarError> {
        validate_month(month)?;

        let first_day = self.first_day_of_month(year, month);
        let days_in_month = self.days_in_month(year, month);
        let (prev_year, prev_month) = self.previous_month(year, month)?;
        let (next_year, next_month) = self.next_month(year, month)?;
        let days_in_previous_month = self.days_in_month(prev_year, prev_month);

        let remainder = (first_day + days_in_month) % DAYS_PER_WEEK;
        let trailing = if remainder == 0 { 0 } else { DAYS_PER_WEEK - remainder };

        let leading_dates = (days_in_previous_month - first_day + 1..=days_in_previous_month)
            .map(|day| (CalendarDate::new(prev_year, prev_month, day), DayMembership::Previous));
        let month_dates = (1..=days_in_month)
            .map(|day| (CalendarDate::new(year, month, day), DayMembership::Current));
        let trailing_dates = (1..=trailing)
            .map(|day| (CalendarDate::new(next_year, next_month, day), DayMembership::Next));

        let days: Vec<DayCell> = leading_dates
            .chain(month_dates)
            .chain(trailing_dates)
            .map(|(date, membership)| DayCell {
                date,
                membership,
                events: events_on(date, events),
            })
            .collect();

        debug!(
            "Built grid for {:04}-{:02}: {} leading, {} month, {} trailing cells",
            year,
            month,
            first_day,
            days_in_month,
            trailing
        );

        Ok(days)
    }

    /// Build a month grid wrapped with display metadata.
    ///
    /// `today` is supplied by the caller; when it falls inside the grid the
    /// matching cell index is reported in `today_index`.
    pub fn generate_calendar_grid(
        &self,
        year: i32,
        month: u32,
        events: &[Event],
        today: Option<CalendarDate>,
    ) -> Result<CalendarGrid, CalendarError> {
        let days = self.build_grid(year, month, events)?;
        Ok(self.wrap_grid(year, month, Arc::new(days), today))
    }

    /// Same as `generate_calendar_grid`, reusing a previously built grid when
    /// the event store has not changed since (`revision` is unchanged).
    /// A cache hit shares the stored cells instead of copying them.
    pub fn cached_calendar_grid(
        &self,
        year: i32,
        month: u32,
        revision: u64,
        events: &[Event],
        today: Option<CalendarDate>,
    ) -> Result<CalendarGrid, CalendarError> {
        let days = match self.grid_cache.get(year, month, revision) {
            Some(days) => {
                debug!("Grid cache hit for {:04}-{:02} at revision {}", year, month, revision);
                days
            }
            None => {
                let days = Arc::new(self.build_grid(year, month, events)?);
                self.grid_cache.insert(year, month, revision, Arc::clone(&days));
                days
            }
        };

        Ok(self.wrap_grid(year, month, days, today))
    }

    fn wrap_grid(
        &self,
        year: i32,
        month: u32,
        days: Arc<Vec<DayCell>>,
        today: Option<CalendarDate>,
    ) -> CalendarGrid {
        let today_index = today.and_then(|today| self.locate_today(&days, today));
        CalendarGrid {
            year,
            month,
            month_name: self.month_name(month).to_string(),
            first_day_of_week: self.first_day_of_month(year, month),
            days,
            today_index,
        }
    }

    /// First and last date shown on the grid for `year`/`month`, padding included
    pub fn grid_span(
        &self,
        year: i32,
        month: u32,
    ) -> Result<(CalendarDate, CalendarDate), CalendarError> {
        let days = self.build_grid(year, month, &[])?;
        match (days.first(), days.last()) {
            (Some(first), Some(last)) => Ok((first.date, last.date)),
            _ => Err(CalendarError::InvalidMonth(month)),
        }
    }

    /// Index of the cell showing `today`, if the grid contains it
    pub fn locate_today(&self, days: &[DayCell], today: CalendarDate) -> Option<usize> {
        days.iter().position(|cell| cell.date == today)
    }

    /// Get the number of days in a given month and year
    pub fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match month {
            2 => {
                if self.is_leap_year(year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Gregorian leap-year rule
    pub fn is_leap_year(&self, year: i32) -> bool {
        year.rem_euclid(4) == 0 && (year.rem_euclid(100) != 0 || year.rem_euclid(400) == 0)
    }

    /// Get the first day of month (0 = Sunday, 1 = Monday, etc.)
    ///
    /// Uses Sakamoto's method with Euclidean division so every `i32` year,
    /// including those before year 1, maps onto the proleptic Gregorian calendar.
    pub fn first_day_of_month(&self, year: i32, month: u32) -> u32 {
        const MONTH_OFFSETS: [i64; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

        let index = (month.clamp(1, 12) - 1) as usize;
        let y = if month < 3 { i64::from(year) - 1 } else { i64::from(year) };
        let weekday = y + y.div_euclid(4) - y.div_euclid(100) + y.div_euclid(400)
            + MONTH_OFFSETS[index]
            + 1;

        weekday.rem_euclid(i64::from(DAYS_PER_WEEK)) as u32
    }

    /// Get the human-readable name for a month number
    pub fn month_name(&self, month: u32) -> &'static str {
        match month {
            1 => "January", 2 => "February", 3 => "March", 4 => "April",
            5 => "May", 6 => "June", 7 => "July", 8 => "August",
            9 => "September", 10 => "October", 11 => "November", 12 => "December",
            _ => "Invalid Month",
        }
    }

    /// The month before `(year, month)`
    pub fn previous_month(&self, year: i32, month: u32) -> Result<(i32, u32), CalendarError> {
        validate_month(month)?;
        if month == 1 {
            let year = year.checked_sub(1).ok_or(CalendarError::YearOutOfRange(year))?;
            Ok((year, 12))
        } else {
            Ok((year, month - 1))
        }
    }

    /// The month after `(year, month)`
    pub fn next_month(&self, year: i32, month: u32) -> Result<(i32, u32), CalendarError> {
        validate_month(month)?;
        if month == 12 {
            let year = year.checked_add(1).ok_or(CalendarError::YearOutOfRange(year))?;
            Ok((year, 1))
        } else {
            Ok((year, month + 1))
        }
    }

    /// Format a `YYYY-MM-DD` date for display ("June 13, 2025")
    pub fn format_date_for_display(&self, date: &str) -> String {
        match date.parse::<CalendarDate>() {
            Ok(date) => format!("{} {}, {}", self.month_name(date.month), date.day, date.year),
            Err(_) => date.to_string(),
        }
    }

    /// Get current date information from the local clock
    pub fn get_current_date(&self) -> CurrentDateResponse {
        let today = CalendarDate::from(Local::now().date_naive());
        self.describe_date(today)
    }

    pub fn describe_date(&self, date: CalendarDate) -> CurrentDateResponse {
        CurrentDateResponse {
            year: date.year,
            month: date.month,
            day: date.day,
            formatted_date: format!("{} {}, {}", self.month_name(date.month), date.day, date.year),
            iso_date: date.to_string(),
        }
    }

    /// The month containing today's local date, where a client starts
    pub fn current_focus_date(&self) -> CalendarFocusDate {
        CalendarFocusDate::default()
    }

    /// The month before `focus`
    pub fn navigate_previous_month(
        &self,
        focus: CalendarFocusDate,
    ) -> Result<CalendarFocusDate, CalendarError> {
        let (year, month) = self.previous_month(focus.year, focus.month)?;
        Ok(CalendarFocusDate { year, month })
    }

    /// The month after `focus`
    pub fn navigate_next_month(
        &self,
        focus: CalendarFocusDate,
    ) -> Result<CalendarFocusDate, CalendarError> {
        let (year, month) = self.next_month(focus.year, focus.month)?;
        Ok(CalendarFocusDate { year, month })
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new(GridCacheConfig::default())
    }
}

fn validate_month(month: u32) -> Result<(), CalendarError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(CalendarError::InvalidMonth(month))
    }
}

/// Stable filter of `events` on exact date-string equality
fn events_on(date: CalendarDate, events: &[Event]) -> Vec<Event> {
    let key = date.to_string();
    events.iter().filter(|event| event.date == key).cloned().collect()
}

/// Built grids keyed by month and the event-store revision they were built at.
/// Grids from older revisions are never looked up again and age out.
struct GridCache {
    grids: Option<Cache<(i32, u32, u64), Arc<Vec<DayCell>>>>,
}

impl GridCache {
    fn new(config: GridCacheConfig) -> Self {
        let grids = (config.enabled && config.capacity > 0).then(|| Cache::new(config.capacity));
        Self { grids }
    }

    fn get(&self, year: i32, month: u32, revision: u64) -> Option<Arc<Vec<DayCell>>> {
        self.grids.as_ref()?.get(&(year, month, revision))
    }

    fn insert(&self, year: i32, month: u32, revision: u64, days: Arc<Vec<DayCell>>) {
        if let Some(grids) = &self.grids {
            grids.insert((year, month, revision), days);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.grids.as_ref().map_or(0, |grids| grids.len())
    }
}
