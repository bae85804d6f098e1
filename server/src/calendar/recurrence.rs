use chrono::{Datelike, NaiveDate};

use super::view::start_of_week;
use crate::models::{Frequency, RecurrenceRule};

/// 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    // num_days_from_sunday is always 0..=6
    date.weekday().num_days_from_sunday() as u8
}

/// Weeks numbered `ceil(day_of_month / 7)`, so days 1-7 are week 1.
pub fn week_of_month(date: NaiveDate) -> u32 {
    date.day().div_ceil(7)
}

/// Whether `rule` produces an occurrence on `date`.
pub fn occurs_on(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    if !rule.days_of_week.contains(&i64::from(day_of_week(date))) {
        return false;
    }
    if rule.start_date.is_some_and(|start| date < start) {
        return false;
    }
    if rule.end_date.is_some_and(|end| date > end) {
        return false;
    }

    match rule.frequency {
        Frequency::Weekly => true,
        Frequency::Monthly => week_of_month(date) == 1,
        Frequency::Biweekly => match rule.start_date {
            Some(anchor) => {
                let weeks = (start_of_week(date) - start_of_week(anchor)).num_days() / 7;
                weeks.rem_euclid(2) == 0
            }
            // rejected by EventTemplate::validate; degrade to weekly
            None => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule(frequency: Frequency, days: &[i64]) -> RecurrenceRule {
        RecurrenceRule {
            frequency,
            days_of_week: days.iter().copied().collect::<BTreeSet<_>>(),
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_day_of_week_starts_on_sunday() {
        assert_eq!(day_of_week(date(2024, 3, 10)), 0);
        assert_eq!(day_of_week(date(2024, 3, 16)), 6);
    }

    #[test]
    fn test_week_of_month_boundaries() {
        assert_eq!(week_of_month(date(2024, 6, 1)), 1);
        assert_eq!(week_of_month(date(2024, 6, 7)), 1);
        assert_eq!(week_of_month(date(2024, 6, 8)), 2);
        assert_eq!(week_of_month(date(2024, 6, 29)), 5);
    }

    #[test]
    fn test_weekly_matches_listed_days_only() {
        let wednesdays = rule(Frequency::Weekly, &[3]);
        assert!(occurs_on(&wednesdays, date(2024, 3, 13)));
        assert!(!occurs_on(&wednesdays, date(2024, 3, 14)));
    }

    #[test]
    fn test_monthly_only_first_week() {
        let first_saturday = rule(Frequency::Monthly, &[6]);
        assert!(occurs_on(&first_saturday, date(2024, 6, 1)));
        assert!(!occurs_on(&first_saturday, date(2024, 6, 8)));
        assert!(!occurs_on(&first_saturday, date(2024, 6, 29)));
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let mut sundays = rule(Frequency::Weekly, &[0]);
        sundays.start_date = Some(date(2024, 3, 10));
        sundays.end_date = Some(date(2024, 3, 24));

        assert!(!occurs_on(&sundays, date(2024, 3, 3)));
        assert!(occurs_on(&sundays, date(2024, 3, 10)));
        assert!(occurs_on(&sundays, date(2024, 3, 24)));
        assert!(!occurs_on(&sundays, date(2024, 3, 31)));
    }

    #[test]
    fn test_biweekly_skips_alternate_weeks() {
        let mut tuesdays = rule(Frequency::Biweekly, &[2]);
        // Thursday anchor: cadence follows the anchor's Sunday-starting week
        tuesdays.start_date = Some(date(2024, 1, 4));

        assert!(!occurs_on(&tuesdays, date(2024, 1, 2)));
        assert!(!occurs_on(&tuesdays, date(2024, 1, 9)));
        assert!(occurs_on(&tuesdays, date(2024, 1, 16)));
        assert!(!occurs_on(&tuesdays, date(2024, 1, 23)));
        assert!(occurs_on(&tuesdays, date(2024, 1, 30)));
    }
}
