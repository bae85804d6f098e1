use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{materialize, CalendarView, EventFilter, TemplateSet};
use crate::models::{parse_iso_date, EventInstance, EventType};
use crate::repository::EventTemplateRepository;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Longest explicit `startDate`..`endDate` span served, both ends inclusive.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Query string for `GET /api/calendar/events`.
///
/// An explicit `startDate`/`endDate` pair takes precedence over `view` and `date`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    #[serde(default)]
    pub view: CalendarView,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
}

impl CalendarQuery {
    pub fn resolve_range(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        match (non_empty(&self.start_date), non_empty(&self.end_date)) {
            (Some(start), Some(end)) => {
                let start = parse_param("startDate", start)?;
                let end = parse_param("endDate", end)?;
                // reversed bounds are reported by the materializer as INVALID_RANGE
                if start <= end && (end - start).num_days() >= MAX_RANGE_DAYS {
                    return Err(AppError::ValidationError(format!(
                        "date range may span at most {} days",
                        MAX_RANGE_DAYS
                    )));
                }
                Ok((start, end))
            }
            (None, None) => {
                let reference = match non_empty(&self.date) {
                    Some(date) => parse_param("date", date)?,
                    None => today,
                };
                let range = self.view.range_for(reference);
                Ok((range.start(), range.end()))
            }
            _ => Err(AppError::ValidationError(
                "startDate and endDate must be provided together".to_string(),
            )),
        }
    }

    pub fn filter(&self) -> EventFilter {
        EventFilter {
            category: non_empty(&self.category).map(str::to_string),
            event_type: self.event_type,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_param(name: &str, value: &str) -> Result<NaiveDate, AppError> {
    parse_iso_date(value).ok_or_else(|| {
        AppError::ValidationError(format!("'{}' is not a valid ISO 8601 {}", value, name))
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventsPayload {
    pub events: Vec<EventInstance>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total: usize,
}

pub async fn list_calendar_events<R: EventTemplateRepository>(
    State(state): State<AppState<R>>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let (start_date, end_date) = query.resolve_range(Local::now().date_naive())?;

    let templates = TemplateSet::load(state.templates.list().await?)?;
    let events = materialize(&templates, start_date, end_date, &query.filter())?;

    tracing::info!(
        view = ?query.view,
        %start_date,
        %end_date,
        total = events.len(),
        "Calendar events served"
    );

    let payload = CalendarEventsPayload {
        total: events.len(),
        events,
        start_date,
        end_date,
    };
    Ok(success(payload, "Calendar events retrieved"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_uses_view_and_reference() {
        let query = CalendarQuery {
            view: CalendarView::Week,
            date: Some("2024-03-13T10:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.resolve_range(date(2000, 1, 1)).unwrap(),
            (date(2024, 3, 10), date(2024, 3, 16))
        );
    }

    #[test]
    fn test_resolve_range_defaults_to_today_month() {
        let query = CalendarQuery::default();
        assert_eq!(
            query.resolve_range(date(2024, 3, 15)).unwrap(),
            (date(2024, 2, 25), date(2024, 4, 6))
        );
    }

    #[test]
    fn test_explicit_bounds_override_view() {
        let query = CalendarQuery {
            view: CalendarView::Day,
            start_date: Some("2024-03-10".to_string()),
            end_date: Some("2024-03-01".to_string()),
            ..Default::default()
        };
        // ordering is checked by the materializer
        assert_eq!(
            query.resolve_range(date(2024, 1, 1)).unwrap(),
            (date(2024, 3, 10), date(2024, 3, 1))
        );
    }

    #[test]
    fn test_explicit_span_is_capped() {
        let full_leap_year = CalendarQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2024-12-31".to_string()),
            ..Default::default()
        };
        assert!(full_leap_year.resolve_range(date(2024, 1, 1)).is_ok());

        let one_day_more = CalendarQuery {
            start_date: Some("2024-01-01".to_string()),
            end_date: Some("2025-01-01".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            one_day_more.resolve_range(date(2024, 1, 1)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_half_open_bounds_are_rejected() {
        let query = CalendarQuery {
            start_date: Some("2024-03-10".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.resolve_range(date(2024, 1, 1)),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = CalendarQuery {
            category: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.filter(), EventFilter::default());
    }
}
