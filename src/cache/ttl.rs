//! TTL Resolution Module
//!
//! Resolves flexible time-to-live expressions into the concrete seconds
//! count handed to the storage engine.

use std::str::FromStr;

use chrono::{DateTime, Days, Duration, Months, Utc};

use crate::error::{CacheError, Result};

// == Calendar Interval ==
/// A TTL expressed in calendar units rather than raw seconds.
///
/// Calendar-relative components (months, years) resolve differently
/// depending on the current date: one month starting on February 1st spans
/// fewer seconds than one month starting on January 1st. This is the point
/// of using an interval instead of a fixed seconds count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarInterval {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CalendarInterval {
    // == Constructors ==
    /// Creates an interval of whole days.
    pub fn of_days(days: u32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    /// Creates an interval of whole calendar months.
    pub fn of_months(months: u32) -> Self {
        Self {
            months,
            ..Self::default()
        }
    }

    /// Creates an interval of whole hours.
    pub fn of_hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    // == End From ==
    /// Returns the instant this interval ends when started at `start`.
    ///
    /// Months and years are added with calendar arithmetic; day and time
    /// components are plain offsets. Additions that would overflow the
    /// representable date range leave that component unapplied.
    pub fn end_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let months = self.years.saturating_mul(12).saturating_add(self.months);
        let days = u64::from(self.weeks) * 7 + u64::from(self.days);

        let mut end = start;
        if months > 0 {
            end = end.checked_add_months(Months::new(months)).unwrap_or(end);
        }
        if days > 0 {
            end = end.checked_add_days(Days::new(days)).unwrap_or(end);
        }

        let secs = i64::from(self.hours) * 3600 + i64::from(self.minutes) * 60 + i64::from(self.seconds);
        end + Duration::seconds(secs)
    }
}

impl FromStr for CalendarInterval {
    type Err = CacheError;

    /// Parses ISO-8601 duration text: `P[nY][nM][nW][nD][T[nH][nM][nS]]`.
    ///
    /// At least one component is required; `M` means months before the `T`
    /// separator and minutes after it.
    fn from_str(text: &str) -> Result<Self> {
        let invalid = || CacheError::InvalidInterval(text.to_string());

        let body = text.strip_prefix('P').ok_or_else(invalid)?;

        let mut interval = CalendarInterval::default();
        let mut digits = String::new();
        let mut in_time = false;
        let mut date_fields = 0;
        let mut time_fields = 0;

        for ch in body.chars() {
            if ch.is_ascii_digit() {
                digits.push(ch);
                continue;
            }
            if ch == 'T' {
                if in_time || !digits.is_empty() {
                    return Err(invalid());
                }
                in_time = true;
                continue;
            }

            let n: u32 = digits.parse().map_err(|_| invalid())?;
            digits.clear();

            match (in_time, ch) {
                (false, 'Y') => interval.years = n,
                (false, 'M') => interval.months = n,
                (false, 'W') => interval.weeks = n,
                (false, 'D') => interval.days = n,
                (true, 'H') => interval.hours = n,
                (true, 'M') => interval.minutes = n,
                (true, 'S') => interval.seconds = n,
                _ => return Err(invalid()),
            }

            if in_time {
                time_fields += 1;
            } else {
                date_fields += 1;
            }
        }

        // Trailing digits, a bare "P" or a dangling "T" are all malformed
        if !digits.is_empty() || date_fields + time_fields == 0 || (in_time && time_fields == 0) {
            return Err(invalid());
        }

        Ok(interval)
    }
}

// == TTL ==
/// A caller-supplied time-to-live expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ttl {
    /// Absolute duration in seconds, passed to the engine unvalidated
    /// (zero and negative included, mirroring the engine's own tolerance)
    Seconds(i64),
    /// Calendar interval resolved against the current instant at set-time
    Interval(CalendarInterval),
}

impl Ttl {
    /// Resolves this TTL against a fixed reference instant.
    ///
    /// A calendar interval resolves to the number of whole seconds between
    /// `now` and `now + interval`.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> i64 {
        match self {
            Ttl::Seconds(seconds) => *seconds,
            Ttl::Interval(interval) => interval.end_from(now).timestamp() - now.timestamp(),
        }
    }
}

impl From<i64> for Ttl {
    fn from(seconds: i64) -> Self {
        Ttl::Seconds(seconds)
    }
}

impl From<CalendarInterval> for Ttl {
    fn from(interval: CalendarInterval) -> Self {
        Ttl::Interval(interval)
    }
}

// == Resolve TTL ==
/// Resolves an optional TTL expression into concrete seconds.
///
/// `None` falls back to the configured default; everything else resolves
/// against the current instant.
pub fn resolve_ttl(ttl: Option<&Ttl>, default_ttl: i64) -> i64 {
    match ttl {
        None => default_ttl,
        Some(ttl) => ttl.resolve_at(Utc::now()),
    }
}
