//! Countdown calendar: which days a day/week/month view shows, how the view
//! steps, and whether a day falls inside the test window.
//!
//! Weeks start on Monday.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Countdown is only shown within this many days of the test
pub const COUNTDOWN_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Day,
    Week,
    Month,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// The test period as read from the saved goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestWindow {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TestWindow {
    /// Inclusive on both ends
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Days left until the test starts, only within the countdown window
    pub fn days_until(&self, today: NaiveDate) -> Option<i64> {
        let days = (self.start - today).num_days();
        (0..=COUNTDOWN_DAYS).contains(&days).then_some(days)
    }
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.weekday().num_days_from_monday() as u64)
}

pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Days::new(6)
}

fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Every day shown by a view centred on `date`, oldest first
pub fn visible_days(mode: ViewMode, date: NaiveDate) -> Vec<NaiveDate> {
    let (from, to) = match mode {
        ViewMode::Day => (date, date),
        ViewMode::Week => (week_start(date), week_end(date)),
        ViewMode::Month => {
            let (first, last) = month_bounds(date);
            (week_start(first), week_end(last))
        }
    };
    from.iter_days().take_while(|d| *d <= to).collect()
}

/// Month view split into Monday-to-Sunday rows
pub fn month_weeks(date: NaiveDate) -> Vec<Vec<NaiveDate>> {
    visible_days(ViewMode::Month, date)
        .chunks(7)
        .map(|week| week.to_vec())
        .collect()
}

/// Move the view one unit back or forward. Month steps clamp to the last
/// valid day (Jan 31 -> Feb 28).
pub fn step(mode: ViewMode, date: NaiveDate, direction: Direction) -> NaiveDate {
    let moved = match (mode, direction) {
        (ViewMode::Day, Direction::Previous) => date.checked_sub_days(Days::new(1)),
        (ViewMode::Day, Direction::Next) => date.checked_add_days(Days::new(1)),
        (ViewMode::Week, Direction::Previous) => date.checked_sub_days(Days::new(7)),
        (ViewMode::Week, Direction::Next) => date.checked_add_days(Days::new(7)),
        (ViewMode::Month, Direction::Previous) => date.checked_sub_months(Months::new(1)),
        (ViewMode::Month, Direction::Next) => date.checked_add_months(Months::new(1)),
    };
    moved.unwrap_or(date)
}

/// One cell of a rendered view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    /// False for leading/trailing days of a month view
    pub in_focus: bool,
    pub is_test: bool,
}

/// Cells for a view, flagging today and test days
pub fn view_cells(
    mode: ViewMode,
    date: NaiveDate,
    today: NaiveDate,
    window: Option<&TestWindow>,
) -> Vec<DayCell> {
    visible_days(mode, date)
        .into_iter()
        .map(|d| DayCell {
            date: d,
            is_today: d == today,
            in_focus: mode != ViewMode::Month || d.month() == date.month(),
            is_test: window.is_some_and(|w| w.contains(d)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window() -> TestWindow {
        TestWindow {
            name: "第１回定期考査".to_string(),
            start: date(2025, 5, 20),
            end: date(2025, 5, 21),
        }
    }

    // ========== Visible ranges ==========

    #[test]
    fn test_day_view() {
        assert_eq!(visible_days(ViewMode::Day, date(2025, 5, 14)), vec![date(2025, 5, 14)]);
    }

    #[test]
    fn test_week_view_starts_monday() {
        // 2025-05-14 is a Wednesday
        let days = visible_days(ViewMode::Week, date(2025, 5, 14));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date(2025, 5, 12));
        assert_eq!(days[0].weekday(), Weekday::Mon);
        assert_eq!(days[6], date(2025, 5, 18));
    }

    #[test]
    fn test_week_view_on_sunday() {
        let days = visible_days(ViewMode::Week, date(2025, 5, 18));
        assert_eq!(days[0], date(2025, 5, 12));
    }

    #[test]
    fn test_month_view_padding() {
        // May 2025: Thu 1st .. Sat 31st
        let days = visible_days(ViewMode::Month, date(2025, 5, 14));
        assert_eq!(days.first(), Some(&date(2025, 4, 28)));
        assert_eq!(days.last(), Some(&date(2025, 6, 1)));
        assert_eq!(days.len() % 7, 0);
        assert_eq!(days.len(), 35);
    }

    #[test]
    fn test_month_weeks() {
        let weeks = month_weeks(date(2025, 2, 10));
        // Feb 2025 starts Sat 1st, ends Fri 28th
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|w| w.len() == 7));
        assert_eq!(weeks[0][0], date(2025, 1, 27));
        assert_eq!(weeks[4][6], date(2025, 3, 2));
    }

    #[test]
    fn test_month_view_december() {
        let days = visible_days(ViewMode::Month, date(2025, 12, 25));
        assert!(days.contains(&date(2025, 12, 31)));
        assert_eq!(days.last().unwrap().weekday(), Weekday::Sun);
    }

    // ========== Navigation ==========

    #[test]
    fn test_step() {
        let d = date(2025, 5, 14);
        assert_eq!(step(ViewMode::Day, d, Direction::Next), date(2025, 5, 15));
        assert_eq!(step(ViewMode::Day, d, Direction::Previous), date(2025, 5, 13));
        assert_eq!(step(ViewMode::Week, d, Direction::Next), date(2025, 5, 21));
        assert_eq!(step(ViewMode::Week, d, Direction::Previous), date(2025, 5, 7));
        assert_eq!(step(ViewMode::Month, d, Direction::Next), date(2025, 6, 14));
        assert_eq!(step(ViewMode::Month, d, Direction::Previous), date(2025, 4, 14));
    }

    #[test]
    fn test_step_month_clamps() {
        assert_eq!(
            step(ViewMode::Month, date(2025, 1, 31), Direction::Next),
            date(2025, 2, 28)
        );
    }

    // ========== Test window ==========

    #[test]
    fn test_window_contains_inclusive() {
        let w = window();
        assert!(!w.contains(date(2025, 5, 19)));
        assert!(w.contains(date(2025, 5, 20)));
        assert!(w.contains(date(2025, 5, 21)));
        assert!(!w.contains(date(2025, 5, 22)));
    }

    #[test]
    fn test_days_until() {
        let w = window();
        assert_eq!(w.days_until(date(2025, 5, 13)), Some(7));
        assert_eq!(w.days_until(date(2025, 5, 20)), Some(0));
        assert_eq!(w.days_until(date(2025, 5, 12)), None);
        // Test already started
        assert_eq!(w.days_until(date(2025, 5, 21)), None);
    }

    #[test]
    fn test_view_cells() {
        let w = window();
        let cells = view_cells(ViewMode::Week, date(2025, 5, 21), date(2025, 5, 19), Some(&w));

        let tests: Vec<_> = cells.iter().filter(|c| c.is_test).map(|c| c.date).collect();
        assert_eq!(tests, vec![date(2025, 5, 20), date(2025, 5, 21)]);
        assert_eq!(cells.iter().filter(|c| c.is_today).count(), 1);
        assert!(cells.iter().all(|c| c.in_focus));
    }

    #[test]
    fn test_view_cells_month_focus() {
        let cells = view_cells(ViewMode::Month, date(2025, 5, 1), date(2025, 5, 1), None);
        assert!(!cells[0].in_focus); // April 28
        assert!(cells.iter().all(|c| !c.is_test));
        assert_eq!(cells.iter().filter(|c| c.in_focus).count(), 31);
    }

    #[test]
    fn test_view_mode_from_str() {
        assert_eq!("Week".parse::<ViewMode>(), Ok(ViewMode::Week));
        assert!("year".parse::<ViewMode>().is_err());
    }
}
