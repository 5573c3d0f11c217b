use crate::event::CalendarEvent;
use anyhow::{anyhow, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

pub const DAYS_IN_WEEK: usize = 7;
pub const WEEKDAYS: [&str; DAYS_IN_WEEK] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in `month` (1-12) of `year`, proleptic Gregorian. Zero for a month
/// outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Weekday of the 1st, 0 = Sunday.
pub fn first_weekday_of_month(year: i32, month: u32) -> u32 {
    chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// `YYYY-MM-DD`, with a 1-indexed month.
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// The month a calendar view is showing. `month` is 1-indexed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    year: i32,
    month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(anyhow!("Invalid month {}; must be 1-12", month));
        }

        // every day of the month must be a representable date
        if chrono::NaiveDate::from_ymd_opt(year, month, 1).is_none()
            || chrono::NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)).is_none()
        {
            return Err(anyhow!("Year {} is out of range", year));
        }

        Ok(Self { year, month })
    }

    pub fn containing(date: chrono::NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn first_weekday(&self) -> u32 {
        first_weekday_of_month(self.year, self.month)
    }

    pub fn date(&self, day: u32) -> Option<chrono::NaiveDate> {
        chrono::NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn format_day(&self, day: u32) -> String {
        format_date(self.year, self.month, day)
    }

    pub fn name(&self) -> String {
        chrono::Month::try_from(self.month as u8)
            .map(|m| format!("{} {}", m.name(), self.year))
            .unwrap_or_else(|_| format!("{}-{:02}", self.year, self.month))
    }
}

impl std::fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn next_month(cursor: MonthCursor) -> MonthCursor {
    cursor.next()
}

pub fn prev_month(cursor: MonthCursor) -> MonthCursor {
    cursor.prev()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub day: u32,
    pub date: chrono::NaiveDate,
    pub events: Vec<CalendarEvent>,
}

/// One month laid out for display, Sunday first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub cursor: MonthCursor,
    pub days_in_month: u32,
    pub first_weekday_offset: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn build(cursor: MonthCursor, events: &[CalendarEvent]) -> Self {
        let days = (1..=cursor.days_in_month())
            .filter_map(|day| {
                let date = cursor.date(day)?;
                Some(DayCell {
                    day,
                    date,
                    events: events
                        .iter()
                        .filter(|e| e.date() == date)
                        .cloned()
                        .collect(),
                })
            })
            .collect();

        Self {
            cursor,
            days_in_month: cursor.days_in_month(),
            first_weekday_offset: cursor.first_weekday(),
            days,
        }
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days.get((day as usize).checked_sub(1)?)
    }

    /// Rows of seven cells; `None` pads before the 1st and after the last day.
    pub fn weeks(&self) -> Vec<Vec<Option<&DayCell>>> {
        let mut cells: Vec<Option<&DayCell>> = vec![None; self.first_weekday_offset as usize];
        cells.extend(self.days.iter().map(Some));
        while cells.len() % DAYS_IN_WEEK != 0 {
            cells.push(None);
        }

        cells.chunks(DAYS_IN_WEEK).map(|w| w.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, EventType};

    #[test]
    fn test_days_in_month() {
        let table = vec![
            ((2024, 2), 29),
            ((2023, 2), 28),
            ((2000, 2), 29),
            ((1900, 2), 28),
            ((2024, 1), 31),
            ((2024, 4), 30),
            ((2024, 12), 31),
            ((2024, 0), 0),
            ((2024, 13), 0),
        ];

        for ((year, month), days) in table {
            assert_eq!(days_in_month(year, month), days, "{}-{}", year, month);
        }
    }

    #[test]
    fn test_days_in_month_matches_chrono() {
        for _ in 0..200 {
            let year = rand::random::<i32>() % 3000 + 1;
            let year = if year < 1 { -year + 1 } else { year };
            let month = rand::random::<u32>() % 12 + 1;

            let first = chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let next = MonthCursor::containing(first).next();
            let next_first = chrono::NaiveDate::from_ymd_opt(next.year(), next.month(), 1).unwrap();

            assert_eq!(
                days_in_month(year, month) as i64,
                (next_first - first).num_days(),
                "{}-{}",
                year,
                month
            );
        }
    }

    #[test]
    fn test_first_weekday() {
        assert_eq!(first_weekday_of_month(2024, 1), 1);
        assert_eq!(first_weekday_of_month(2024, 9), 0);
        assert_eq!(first_weekday_of_month(2023, 7), 6);
        assert_eq!(first_weekday_of_month(2024, 13), 0);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(2024, 1, 5), "2024-01-05");
        assert_eq!(format_date(2024, 12, 31), "2024-12-31");
    }

    #[test]
    fn test_navigation() {
        let dec = MonthCursor::new(2024, 12).unwrap();
        assert_eq!(next_month(dec), MonthCursor::new(2025, 1).unwrap());

        let jan = MonthCursor::new(2024, 1).unwrap();
        assert_eq!(prev_month(jan), MonthCursor::new(2023, 12).unwrap());
        // month arithmetic never goes through a day, so the 31st can't skip February
        assert_eq!(jan.next(), MonthCursor::new(2024, 2).unwrap());
        assert_eq!(jan.next().prev(), jan);

        assert!(MonthCursor::new(2024, 0).is_err());
        assert!(MonthCursor::new(2024, 13).is_err());
        assert!(MonthCursor::new(i32::MAX, 1).is_err());
        assert!(MonthCursor::new(300000, 1).is_err());
        assert!(MonthCursor::new(-300000, 12).is_err());
        assert_eq!(jan.to_string(), "2024-01");
        assert_eq!(jan.name(), "January 2024");
    }

    #[test]
    fn test_month_grid() {
        let on = |title: &str, y, m, d| {
            CalendarEvent::from_draft(
                EventDraft::build(title, chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap())
                    .set_event_type(EventType::Reminder)
                    .clone(),
            )
        };
        let events = vec![
            on("first", 2024, 2, 5),
            on("other month", 2024, 1, 5),
            on("second", 2024, 2, 5),
            on("leap day", 2024, 2, 29),
        ];

        let grid = MonthGrid::build(MonthCursor::new(2024, 2).unwrap(), &events);
        assert_eq!(grid.days_in_month, 29);
        // February 1st 2024 was a Thursday
        assert_eq!(grid.first_weekday_offset, 4);
        assert_eq!(grid.days.len(), 29);

        let fifth = grid.day(5).unwrap();
        assert_eq!(
            fifth.events.iter().map(|e| e.title()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert_eq!(grid.day(29).unwrap().events.len(), 1);
        assert!(grid.day(0).is_none());
        assert!(grid.day(30).is_none());

        let weeks = grid.weeks();
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.len() == DAYS_IN_WEEK));
        assert!(weeks[0][3].is_none());
        assert_eq!(weeks[0][4].unwrap().day, 1);
        assert_eq!(weeks[4][4].unwrap().day, 29);
        assert!(weeks[4][5].is_none());
    }

    #[test]
    fn test_grid_covers_every_day() {
        for (year, month) in [(1, 1), (9999, 12), (10000, 2), (-44, 3), (262142, 12)] {
            let grid = MonthGrid::build(MonthCursor::new(year, month).unwrap(), &[]);
            assert_eq!(
                grid.days.len() as u32,
                grid.days_in_month,
                "{}-{}",
                year,
                month
            );
        }
    }
}
