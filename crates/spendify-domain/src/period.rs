//! Calendar periods used to bucket expenses for charts, plus date windows.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Client-side bucketing key used to group expenses for chart display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl AggregationPeriod {
    pub const ALL: [AggregationPeriod; 4] = [
        AggregationPeriod::Day,
        AggregationPeriod::Week,
        AggregationPeriod::Month,
        AggregationPeriod::Year,
    ];

    /// First day of the bucket containing `date`. Weeks start on Sunday.
    ///
    /// A week that would begin before the first representable date starts there instead.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            AggregationPeriod::Day => date,
            AggregationPeriod::Week => {
                let delta = u64::from(date.weekday().num_days_from_sunday());
                date.checked_sub_days(Days::new(delta))
                    .unwrap_or(NaiveDate::MIN)
            }
            AggregationPeriod::Month => first_of_month(date.year(), date.month()),
            AggregationPeriod::Year => first_of_month(date.year(), 1),
        }
    }

    pub fn bucket_key(&self, date: NaiveDate) -> PeriodKey {
        PeriodKey {
            period: *self,
            start: self.bucket_start(date),
        }
    }

    /// First day of the bucket following the one that starts at `start`.
    pub fn next_start(&self, start: NaiveDate) -> Result<NaiveDate, DateWindowError> {
        self.shift(start, 1)
    }

    /// Half-open window `[bucket_start, next bucket start)` around `date`.
    pub fn window(&self, date: NaiveDate) -> Result<DateWindow, DateWindowError> {
        let start = self.bucket_start(date);
        Ok(DateWindow {
            start,
            end: self.next_start(start)?,
        })
    }

    /// Moves a selected date `steps` periods backwards or forwards.
    ///
    /// Month and year moves clamp the day to the last day of the target month,
    /// so stepping forward from January 31st lands on the end of February.
    /// Fails when the result falls outside the calendar range.
    pub fn shift(&self, date: NaiveDate, steps: i32) -> Result<NaiveDate, DateWindowError> {
        let moved = match self {
            AggregationPeriod::Day => shift_days(date, i64::from(steps)),
            AggregationPeriod::Week => shift_days(date, i64::from(steps) * 7),
            AggregationPeriod::Month => shift_month(date, steps),
            AggregationPeriod::Year => shift_year(date, steps),
        };
        moved.ok_or(DateWindowError::OutOfRange(date))
    }

    pub fn label(&self) -> &'static str {
        match self {
            AggregationPeriod::Day => "Daily",
            AggregationPeriod::Week => "Weekly",
            AggregationPeriod::Month => "Monthly",
            AggregationPeriod::Year => "Yearly",
        }
    }
}

impl fmt::Display for AggregationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AggregationPeriod::Day => "day",
            AggregationPeriod::Week => "week",
            AggregationPeriod::Month => "month",
            AggregationPeriod::Year => "year",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown period `{0}` (expected day, week, month or year)")]
pub struct ParsePeriodError(pub String);

impl FromStr for AggregationPeriod {
    type Err = ParsePeriodError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" | "d" => Ok(AggregationPeriod::Day),
            "week" | "weekly" | "w" => Ok(AggregationPeriod::Week),
            "month" | "monthly" | "m" => Ok(AggregationPeriod::Month),
            "year" | "yearly" | "y" => Ok(AggregationPeriod::Year),
            other => Err(ParsePeriodError(other.to_string())),
        }
    }
}

/// Identifies one bucket of a period: the period plus the bucket's first day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub period: AggregationPeriod,
    pub start: NaiveDate,
}

impl PeriodKey {
    /// Compact axis label: `3/6` for days and weeks, `Jun 24` for months, `2024` for years.
    pub fn chart_label(&self) -> String {
        match self.period {
            AggregationPeriod::Day | AggregationPeriod::Week => {
                format!("{}/{}", self.start.day(), self.start.month())
            }
            AggregationPeriod::Month => self.start.format("%b %y").to_string(),
            AggregationPeriod::Year => self.start.year().to_string(),
        }
    }

    pub fn window(&self) -> Result<DateWindow, DateWindowError> {
        Ok(DateWindow {
            start: self.start,
            end: self.period.next_start(self.start)?,
        })
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period {
            AggregationPeriod::Day | AggregationPeriod::Week => {
                write!(f, "{}", self.start.format("%Y-%m-%d"))
            }
            AggregationPeriod::Month => write!(f, "{}", self.start.format("%Y-%m")),
            AggregationPeriod::Year => write!(f, "{}", self.start.year()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateWindowError {
    #[error("window end must be after start")]
    EndNotAfterStart,
    #[error("end date must be after start date")]
    RangeNotAfterStart,
    #[error("{0} is too close to the edge of the calendar")]
    OutOfRange(NaiveDate),
}

/// Half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        if end <= start {
            return Err(DateWindowError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    /// Builds a window covering `first..=last`. The last day must come after the first.
    pub fn inclusive(first: NaiveDate, last: NaiveDate) -> Result<Self, DateWindowError> {
        if last <= first {
            return Err(DateWindowError::RangeNotAfterStart);
        }
        let end = last.succ_opt().ok_or(DateWindowError::OutOfRange(last))?;
        Ok(Self { start: first, end })
    }

    /// Whole calendar month containing `date`, last day included.
    pub fn month_of(date: NaiveDate) -> Result<Self, DateWindowError> {
        AggregationPeriod::Month.window(date)
    }

    /// Single day window.
    pub fn day(date: NaiveDate) -> Result<Self, DateWindowError> {
        AggregationPeriod::Day.window(date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Last day inside the window.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.last_day())
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = (date.year() * 12 + date.month0() as i32).checked_add(months)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    clamped_date(year, month, date.day())
}

fn shift_year(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    clamped_date(date.year().checked_add(years)?, date.month(), date.day())
}

/// `year-month-day`, with the day pulled back to the month's last day.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (28..=day.max(28))
        .rev()
        .find_map(|candidate| NaiveDate::from_ymd_opt(year, month, candidate.min(day)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weeks_start_on_sunday() {
        // 2024-06-05 is a Wednesday.
        let key = AggregationPeriod::Week.bucket_key(date(2024, 6, 5));
        assert_eq!(key.start, date(2024, 6, 2));
        assert_eq!(key.to_string(), "2024-06-02");
        // A Sunday is its own week start.
        assert_eq!(
            AggregationPeriod::Week.bucket_start(date(2024, 6, 2)),
            date(2024, 6, 2)
        );
        // Saturday belongs to the preceding Sunday.
        assert_eq!(
            AggregationPeriod::Week.bucket_start(date(2024, 6, 8)),
            date(2024, 6, 2)
        );
    }

    #[test]
    fn keys_render_per_period() {
        let d = date(2024, 6, 3);
        assert_eq!(AggregationPeriod::Day.bucket_key(d).to_string(), "2024-06-03");
        assert_eq!(AggregationPeriod::Month.bucket_key(d).to_string(), "2024-06");
        assert_eq!(AggregationPeriod::Year.bucket_key(d).to_string(), "2024");
    }

    #[test]
    fn chart_labels_are_compact() {
        let d = date(2024, 6, 3);
        assert_eq!(AggregationPeriod::Day.bucket_key(d).chart_label(), "3/6");
        assert_eq!(AggregationPeriod::Month.bucket_key(d).chart_label(), "Jun 24");
        assert_eq!(AggregationPeriod::Year.bucket_key(d).chart_label(), "2024");
    }

    #[test]
    fn month_window_includes_last_day() {
        let window = DateWindow::month_of(date(2024, 2, 10)).unwrap();
        assert_eq!(window.start, date(2024, 2, 1));
        assert_eq!(window.end, date(2024, 3, 1));
        assert!(window.contains(date(2024, 2, 29)));
        assert!(!window.contains(date(2024, 3, 1)));
        assert_eq!(window.days(), 29);
    }

    #[test]
    fn shifting_months_clamps_day() {
        assert_eq!(
            AggregationPeriod::Month.shift(date(2024, 1, 31), 1).unwrap(),
            date(2024, 2, 29)
        );
        assert_eq!(
            AggregationPeriod::Month.shift(date(2024, 1, 15), -1).unwrap(),
            date(2023, 12, 15)
        );
        assert_eq!(
            AggregationPeriod::Year.shift(date(2024, 2, 29), 1).unwrap(),
            date(2025, 2, 28)
        );
        assert_eq!(
            AggregationPeriod::Week.shift(date(2024, 6, 5), -1).unwrap(),
            date(2024, 5, 29)
        );
    }

    #[test]
    fn december_rolls_into_next_year() {
        let window = AggregationPeriod::Month.window(date(2023, 12, 24)).unwrap();
        assert_eq!(window.end, date(2024, 1, 1));
        let year = AggregationPeriod::Year.window(date(2023, 12, 24)).unwrap();
        assert_eq!(year.start, date(2023, 1, 1));
        assert_eq!(year.end, date(2024, 1, 1));
    }

    #[test]
    fn inclusive_range_requires_end_after_start() {
        assert_eq!(
            DateWindow::inclusive(date(2024, 6, 3), date(2024, 6, 3)),
            Err(DateWindowError::RangeNotAfterStart)
        );
        let window = DateWindow::inclusive(date(2024, 6, 1), date(2024, 6, 3)).unwrap();
        assert!(window.contains(date(2024, 6, 3)));
        assert_eq!(window.last_day(), date(2024, 6, 3));
    }

    #[test]
    fn window_bounds_must_be_ordered() {
        let day = date(2024, 6, 3);
        assert_eq!(
            DateWindow::new(day, day),
            Err(DateWindowError::EndNotAfterStart)
        );
        assert_eq!(
            DateWindow::new(day, date(2024, 6, 1)),
            Err(DateWindowError::EndNotAfterStart)
        );
        let window = DateWindow::new(day, date(2024, 6, 4)).unwrap();
        assert_eq!(window.days(), 1);
        assert_eq!(window.last_day(), day);
    }

    #[test]
    fn last_calendar_day_has_no_following_bucket() {
        let last = NaiveDate::MAX;
        assert_eq!(
            AggregationPeriod::Day.window(last),
            Err(DateWindowError::OutOfRange(last))
        );
        assert!(AggregationPeriod::Week.window(last).is_err());
        assert!(AggregationPeriod::Month.window(last).is_err());
        assert!(AggregationPeriod::Year.window(last).is_err());
        assert!(AggregationPeriod::Day.shift(last, 1).is_err());
        assert!(AggregationPeriod::Week.shift(last, 1).is_err());
        assert!(DateWindow::month_of(last).is_err());
        assert!(DateWindow::inclusive(date(2024, 1, 1), last).is_err());
        assert_eq!(
            AggregationPeriod::Day.shift(last, -1).unwrap(),
            last.pred_opt().unwrap()
        );
        assert!(AggregationPeriod::Month.shift(date(2024, 6, 3), i32::MAX).is_err());
    }

    #[test]
    fn final_whole_year_still_has_a_window() {
        let year = NaiveDate::MAX.year() - 1;
        let window = AggregationPeriod::Year.window(date(year, 6, 1)).unwrap();
        assert_eq!(window.start, date(year, 1, 1));
        assert_eq!(window.end, date(year + 1, 1, 1));
        assert!(window.start < window.end);
        assert!(AggregationPeriod::Year.window(date(year + 1, 6, 1)).is_err());
    }

    #[test]
    fn first_calendar_week_starts_at_the_first_day() {
        let first = NaiveDate::MIN;
        assert!(AggregationPeriod::Week.bucket_start(first) <= first);
        assert!(AggregationPeriod::Day.shift(first, -1).is_err());
    }

    #[test]
    fn periods_parse_from_short_names() {
        assert_eq!("w".parse::<AggregationPeriod>().unwrap(), AggregationPeriod::Week);
        assert_eq!(
            "Monthly".parse::<AggregationPeriod>().unwrap(),
            AggregationPeriod::Month
        );
        assert!("fortnight".parse::<AggregationPeriod>().is_err());
    }
}
