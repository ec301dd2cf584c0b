use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;

use crate::services::scheduler::errors::ScheduleError;

/// Wall-clock time of day, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTimeOfDay(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parses `H:MM` or `HH:MM` (24-hour clock).
    pub fn parse(value: &str) -> Result<Self, ScheduleError> {
        let trimmed = value.trim();
        let invalid = || ScheduleError::InvalidTimeOfDay(trimmed.to_string());

        let (hour, minute) = trimmed.split_once(':').ok_or_else(invalid)?;
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(hour) || hour.len() > 2 || !all_digits(minute) || minute.len() != 2 {
            return Err(invalid());
        }

        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }

    fn to_naive_time(self) -> NaiveTime {
        // Range checked in `new`.
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

pub fn parse_timezone(tz: &str) -> Result<Tz, ScheduleError> {
    tz.trim()
        .parse::<Tz>()
        .map_err(|_| ScheduleError::InvalidTimezone(tz.trim().to_string()))
}

/// Resolves a local wall-clock datetime to an instant.
///
/// Ambiguous times (clocks going back) resolve to the earliest instant. Times
/// skipped by a forward transition are read with the offset in force just
/// before the gap, so 02:30 on a spring-forward night lands at 03:30.
fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    if let Some(local) = tz.from_local_datetime(&naive).earliest() {
        return Some(local.with_timezone(&Utc));
    }

    let lookback = Duration::hours(3);
    let before_gap = tz.from_local_datetime(&(naive - lookback)).earliest()?;
    Some(before_gap.with_timezone(&Utc) + lookback)
}

fn occurrence_on(date: NaiveDate, time: TimeOfDay, tz: Tz) -> Result<DateTime<Utc>, ScheduleError> {
    localize(tz, NaiveDateTime::new(date, time.to_naive_time()))
        .ok_or_else(|| ScheduleError::InvalidTimeOfDay(format!("{time} on {date} in {}", tz.name())))
}

/// Earliest instant strictly after `now` at which the wall clock in `tz`
/// reads `time`.
pub fn next_occurrence(
    time: TimeOfDay,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ScheduleError> {
    let today = now.with_timezone(&tz).date_naive();
    let candidate = occurrence_on(today, time, tz)?;
    if candidate > now {
        return Ok(candidate);
    }

    // Step the calendar date, not a fixed 24h, so DST changes keep the wall time.
    let tomorrow = today
        .succ_opt()
        .ok_or_else(|| ScheduleError::InvalidTimeOfDay(format!("{time} after {today}")))?;
    occurrence_on(tomorrow, time, tz)
}
