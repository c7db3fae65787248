//! Weekly schedules gating block rules.
//!
//! A schedule is seven per-weekday lists of `HH:MM` windows, Sunday first:
//!
//! ```yaml
//! time-to-sleep:
//!   mon: [{after: "21:00", before: "07:00"}]
//!   sat: [{after: "00:00", before: "00:00"}]   # whole day
//! ```

use ahash::AHashMap;
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::Deserialize;
use std::collections::HashMap;

use crate::{Error, Result};

/// Weekday keys in slot order.
pub const WEEKDAYS: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Seconds in a day.
const DAY_SECS: i32 = 86_400;

/// Position of a schedule inside [`Schedules`].
pub type WindowId = usize;

/// Per-weekday `after`/`before` pairs, keyed `sun`..`sat`.
pub type WeeklyRangesStr = HashMap<String, Vec<TimeRangeStr>>;

/// A window of seconds since local midnight.
///
/// `start > end` wraps around midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: i32,
    pub end: i32,
}

impl TimeRange {
    /// The whole-day window used when `after == before`.
    pub const FULL_DAY: TimeRange = TimeRange {
        start: -1,
        end: DAY_SECS + 2,
    };

    /// Check whether `secs` (since midnight) falls inside this window.
    pub fn contains(&self, secs: i32) -> bool {
        if self.start > self.end {
            secs >= self.start || secs <= self.end
        } else {
            secs >= self.start && secs <= self.end
        }
    }
}

/// A raw `after`/`before` pair as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeRangeStr {
    pub after: String,
    pub before: String,
}

impl TimeRangeStr {
    pub fn new(after: impl Into<String>, before: impl Into<String>) -> Self {
        Self {
            after: after.into(),
            before: before.into(),
        }
    }
}

/// Active windows for each day of the week, indexed from Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyRanges {
    ranges: [Vec<TimeRange>; 7],
}

impl WeeklyRanges {
    /// Windows configured for a weekday.
    fn day(&self, weekday: Weekday) -> &[TimeRange] {
        &self.ranges[weekday.num_days_from_sunday() as usize]
    }

    /// Check whether the schedule is active at `secs` past midnight on `weekday`.
    ///
    /// A day without windows is inactive.
    pub fn is_active(&self, weekday: Weekday, secs: i32) -> bool {
        self.day(weekday).iter().any(|range| range.contains(secs))
    }

    /// Check whether the schedule is active at a local date and time.
    pub fn is_active_at(&self, at: &NaiveDateTime) -> bool {
        let secs = (at.hour() * 60 + at.minute()) * 60;
        self.is_active(at.weekday(), secs as i32)
    }
}

/// Parse an `HH:MM` clock string into seconds since midnight.
pub fn parse_clock_to_seconds(s: &str) -> Result<i32> {
    let invalid = || Error::InvalidTimeFormat(s.to_string());

    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(invalid());
    }

    let hours: i32 = parts[0].parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) {
        return Err(invalid());
    }
    let minutes: i32 = parts[1].parse().map_err(|_| invalid())?;
    if !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    Ok((hours * 60 + minutes) * 60)
}

/// Parse a list of `after`/`before` pairs.
///
/// A pair with identical bounds covers the whole day.
pub fn parse_time_ranges(pairs: &[TimeRangeStr]) -> Result<Vec<TimeRange>> {
    let mut ranges = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let after = parse_clock_to_seconds(&pair.after)?;
        let before = parse_clock_to_seconds(&pair.before)?;
        if after == before {
            ranges.push(TimeRange::FULL_DAY);
        } else {
            ranges.push(TimeRange {
                start: after,
                end: before,
            });
        }
    }

    Ok(ranges)
}

/// Parse a `sun`..`sat` keyed map into weekly ranges.
///
/// Unknown keys are ignored; missing days get no windows.
pub fn parse_weekly_ranges(days: &WeeklyRangesStr) -> Result<WeeklyRanges> {
    let mut weekly = WeeklyRanges::default();

    for (slot, name) in WEEKDAYS.iter().enumerate() {
        if let Some(pairs) = days.get(*name) {
            weekly.ranges[slot] = parse_time_ranges(pairs)?;
        }
    }

    Ok(weekly)
}

/// Named schedules referenced from rules with `@name`.
#[derive(Debug, Clone, Default)]
pub struct Schedules {
    ids: AHashMap<String, WindowId>,
    windows: Vec<WeeklyRanges>,
}

impl Schedules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every named schedule, failing on the first bad clock string.
    pub fn parse(named: &HashMap<String, WeeklyRangesStr>) -> Result<Self> {
        let mut schedules = Self::new();
        // Sorted so ids do not depend on hash order
        let mut names: Vec<&String> = named.keys().collect();
        names.sort();
        for name in names {
            schedules.insert(name, parse_weekly_ranges(&named[name])?);
        }
        Ok(schedules)
    }

    /// Add or replace a schedule, returning its id.
    pub fn insert(&mut self, name: &str, ranges: WeeklyRanges) -> WindowId {
        if let Some(&id) = self.ids.get(name) {
            self.windows[id] = ranges;
            return id;
        }
        let id = self.windows.len();
        self.windows.push(ranges);
        self.ids.insert(name.to_string(), id);
        id
    }

    /// Resolve a schedule name.
    pub fn lookup(&self, name: &str) -> Option<WindowId> {
        self.ids.get(name).copied()
    }

    pub fn get(&self, id: WindowId) -> Option<&WeeklyRanges> {
        self.windows.get(id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_clock_valid() {
        assert_eq!(parse_clock_to_seconds("00:00").unwrap(), 0);
        assert_eq!(parse_clock_to_seconds("00:01").unwrap(), 60);
        assert_eq!(parse_clock_to_seconds("07:30").unwrap(), (7 * 60 + 30) * 60);
        assert_eq!(parse_clock_to_seconds("23:59").unwrap(), (23 * 60 + 59) * 60);
    }

    #[test]
    fn test_parse_clock_exhaustive() {
        for hour in 0..24 {
            for minute in 0..60 {
                let s = format!("{:02}:{:02}", hour, minute);
                assert_eq!(parse_clock_to_seconds(&s).unwrap(), (hour * 60 + minute) * 60);
            }
        }
    }

    #[test]
    fn test_parse_clock_invalid() {
        for s in ["", "12", "24:00", "12:60", "-1:00", "12:00:00", "ab:cd", "12:", ":30"] {
            assert!(
                matches!(parse_clock_to_seconds(s), Err(Error::InvalidTimeFormat(_))),
                "{s} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_time_ranges_keeps_every_pair() {
        let ranges = parse_time_ranges(&[
            TimeRangeStr::new("09:00", "17:00"),
            TimeRangeStr::new("21:00", "07:00"),
            TimeRangeStr::new("12:00", "12:00"),
        ])
        .unwrap();

        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0], TimeRange { start: 9 * 3600, end: 17 * 3600 });
        assert_eq!(ranges[1], TimeRange { start: 21 * 3600, end: 7 * 3600 });
        assert_eq!(ranges[2], TimeRange::FULL_DAY);
    }

    #[test]
    fn test_parse_time_ranges_propagates_error() {
        let result = parse_time_ranges(&[
            TimeRangeStr::new("09:00", "17:00"),
            TimeRangeStr::new("25:00", "17:00"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_weekly_ranges() {
        let mut days = HashMap::new();
        days.insert("mon".to_string(), vec![TimeRangeStr::new("09:00", "17:00")]);
        days.insert("sat".to_string(), vec![TimeRangeStr::new("00:00", "00:00")]);

        let weekly = parse_weekly_ranges(&days).unwrap();

        assert_eq!(weekly.day(Weekday::Mon).len(), 1);
        assert_eq!(weekly.day(Weekday::Sat), &[TimeRange::FULL_DAY]);
        assert!(weekly.day(Weekday::Sun).is_empty());
        assert!(weekly.day(Weekday::Tue).is_empty());
    }

    #[test]
    fn test_parse_weekly_ranges_error() {
        let mut days = HashMap::new();
        days.insert("wed".to_string(), vec![TimeRangeStr::new("9am", "17:00")]);
        assert!(parse_weekly_ranges(&days).is_err());
    }

    #[test]
    fn test_is_active() {
        let mut days = HashMap::new();
        days.insert("mon".to_string(), vec![TimeRangeStr::new("09:00", "17:00")]);
        days.insert("fri".to_string(), vec![TimeRangeStr::new("21:00", "07:00")]);
        days.insert("sun".to_string(), vec![TimeRangeStr::new("10:00", "10:00")]);
        let weekly = parse_weekly_ranges(&days).unwrap();

        assert!(weekly.is_active(Weekday::Mon, 9 * 3600));
        assert!(weekly.is_active(Weekday::Mon, 12 * 3600));
        assert!(!weekly.is_active(Weekday::Mon, 8 * 3600));
        assert!(!weekly.is_active(Weekday::Mon, 18 * 3600));

        // Overnight window
        assert!(weekly.is_active(Weekday::Fri, 23 * 3600));
        assert!(weekly.is_active(Weekday::Fri, 3600));
        assert!(!weekly.is_active(Weekday::Fri, 12 * 3600));

        // Whole day
        assert!(weekly.is_active(Weekday::Sun, 0));
        assert!(weekly.is_active(Weekday::Sun, DAY_SECS - 60));

        // No windows
        assert!(!weekly.is_active(Weekday::Tue, 12 * 3600));
    }

    #[test]
    fn test_is_active_at() {
        let mut days = HashMap::new();
        days.insert("mon".to_string(), vec![TimeRangeStr::new("09:00", "17:00")]);
        let weekly = parse_weekly_ranges(&days).unwrap();

        // 2024-01-01 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(weekly.is_active_at(&monday.and_hms_opt(10, 15, 30).unwrap()));
        assert!(!weekly.is_active_at(&monday.and_hms_opt(18, 0, 0).unwrap()));

        let tuesday = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(!weekly.is_active_at(&tuesday.and_hms_opt(10, 0, 0).unwrap()));
    }

    #[test]
    fn test_schedules_parse_and_lookup() {
        let mut sleep = HashMap::new();
        sleep.insert("mon".to_string(), vec![TimeRangeStr::new("21:00", "07:00")]);
        let mut work = HashMap::new();
        work.insert("tue".to_string(), vec![TimeRangeStr::new("09:00", "17:00")]);

        let mut named = HashMap::new();
        named.insert("time-to-sleep".to_string(), sleep);
        named.insert("work".to_string(), work);

        let schedules = Schedules::parse(&named).unwrap();
        assert_eq!(schedules.len(), 2);

        let sleep_id = schedules.lookup("time-to-sleep").unwrap();
        let work_id = schedules.lookup("work").unwrap();
        assert_ne!(sleep_id, work_id);
        assert!(schedules.get(sleep_id).unwrap().is_active(Weekday::Mon, 23 * 3600));
        assert!(schedules.get(work_id).unwrap().is_active(Weekday::Tue, 10 * 3600));
        assert_eq!(schedules.lookup("missing"), None);
    }

    #[test]
    fn test_schedules_insert_replaces() {
        let mut schedules = Schedules::new();
        let first = schedules.insert("a", WeeklyRanges::default());

        let mut days = HashMap::new();
        days.insert("sun".to_string(), vec![TimeRangeStr::new("00:00", "00:00")]);
        let second = schedules.insert("a", parse_weekly_ranges(&days).unwrap());

        assert_eq!(first, second);
        assert_eq!(schedules.len(), 1);
        assert!(schedules.get(first).unwrap().is_active(Weekday::Sun, 0));
    }

    #[test]
    fn test_schedules_parse_error() {
        let mut days = HashMap::new();
        days.insert("fri".to_string(), vec![TimeRangeStr::new("10:00", "10:61")]);
        let mut named = HashMap::new();
        named.insert("bad".to_string(), days);

        assert!(Schedules::parse(&named).is_err());
    }
}
