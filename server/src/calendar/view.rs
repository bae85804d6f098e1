use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::DateRange;

/// Calendar page the caller is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    Week,
    #[default]
    Month,
}

impl CalendarView {
    /// Resolves the inclusive bounds shown for `reference`.
    ///
    /// Weeks run Sunday through Saturday. A month view is padded out to whole
    /// weeks so the grid's leading and trailing days are populated too.
    pub fn range_for(self, reference: NaiveDate) -> DateRange {
        let (start, end) = match self {
            CalendarView::Day => (reference, reference),
            CalendarView::Week => (start_of_week(reference), end_of_week(reference)),
            CalendarView::Month => {
                let first = start_of_month(reference);
                let last = end_of_month(reference);
                (start_of_week(first), end_of_week(last))
            }
        };
        DateRange::ordered(start, end)
    }
}

pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN)
}

pub fn end_of_week(date: NaiveDate) -> NaiveDate {
    let offset = 6 - u64::from(date.weekday().num_days_from_sunday());
    date.checked_add_days(Days::new(offset)).unwrap_or(NaiveDate::MAX)
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.day0()))).unwrap_or(NaiveDate::MIN)
}

fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_view_is_single_day() {
        let range = CalendarView::Day.range_for(date(2024, 3, 13));
        assert_eq!(range.start(), date(2024, 3, 13));
        assert_eq!(range.end(), date(2024, 3, 13));
    }

    #[test]
    fn test_week_view_runs_sunday_to_saturday() {
        let range = CalendarView::Week.range_for(date(2024, 3, 13));
        assert_eq!(range.start(), date(2024, 3, 10));
        assert_eq!(range.end(), date(2024, 3, 16));

        let on_sunday = CalendarView::Week.range_for(date(2024, 3, 10));
        assert_eq!(on_sunday, range);
    }

    #[test]
    fn test_month_view_pads_to_whole_weeks() {
        // March 2024 starts on a Friday and ends on a Sunday
        let range = CalendarView::Month.range_for(date(2024, 3, 15));
        assert_eq!(range.start(), date(2024, 2, 25));
        assert_eq!(range.end(), date(2024, 4, 6));
    }

    #[test]
    fn test_month_view_handles_december_and_leap_february() {
        let december = CalendarView::Month.range_for(date(2024, 12, 24));
        assert_eq!(december.start(), date(2024, 12, 1));
        assert_eq!(december.end(), date(2025, 1, 4));

        let february = CalendarView::Month.range_for(date(2024, 2, 10));
        assert_eq!(february.start(), date(2024, 1, 28));
        assert_eq!(february.end(), date(2024, 3, 2));
    }

    #[test]
    fn test_view_deserializes_lowercase() {
        let view: CalendarView = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(view, CalendarView::Week);
        assert_eq!(CalendarView::default(), CalendarView::Month);
    }
}
