//! Expansion of event templates into dated calendar instances.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{EventInstance, EventTemplate, EventType};

pub mod error;
pub mod recurrence;
pub mod view;

pub use error::CalendarError;
pub use recurrence::occurs_on;
pub use view::CalendarView;

/// Inclusive `[start, end]` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CalendarError> {
        if start > end {
            return Err(CalendarError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Caller guarantees `start <= end`.
    pub(crate) fn ordered(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Exact-match filters; `None` excludes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub category: Option<String>,
    pub event_type: Option<EventType>,
}

impl EventFilter {
    pub fn matches(&self, template: &EventTemplate) -> bool {
        self.category
            .as_deref()
            .map_or(true, |category| template.category == category)
            && self
                .event_type
                .map_or(true, |event_type| template.event_type == event_type)
    }
}

/// A validated, immutable snapshot of templates for one query.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<EventTemplate>,
}

impl TemplateSet {
    /// Validates every template and rejects duplicate ids.
    ///
    /// ## Errors
    /// Returns [`CalendarError::InvalidTemplate`] for the first malformed template.
    pub fn load(templates: Vec<EventTemplate>) -> Result<Self, CalendarError> {
        let mut seen = HashSet::with_capacity(templates.len());
        for template in &templates {
            template.validate()?;
            if !seen.insert(template.id.clone()) {
                return Err(CalendarError::InvalidTemplate {
                    id: template.id.clone(),
                    reason: "duplicate template id".to_string(),
                });
            }
        }
        Ok(Self { templates })
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Expands `templates` into the instances falling within `[start, end]`.
///
/// One-off templates contribute at most one instance, on their anchor date.
/// Recurring templates are checked against every day in the range. Output is
/// sorted by date, then start time, then instance id, so identical inputs
/// always produce identical output.
///
/// ## Errors
/// Returns [`CalendarError::InvalidRange`] when `start` is after `end`.
pub fn materialize(
    templates: &TemplateSet,
    start: NaiveDate,
    end: NaiveDate,
    filter: &EventFilter,
) -> Result<Vec<EventInstance>, CalendarError> {
    let range = DateRange::new(start, end)?;
    let mut instances = Vec::new();

    for template in templates.iter().filter(|template| filter.matches(template)) {
        match &template.recurrence {
            None => {
                if let Some(date) = template.date.filter(|date| range.contains(*date)) {
                    instances.push(EventInstance::from_template(template, date));
                }
            }
            Some(rule) => instances.extend(
                range
                    .days()
                    .filter(|day| occurs_on(rule, *day))
                    .map(|day| EventInstance::from_template(template, day)),
            ),
        }
    }

    instances.sort_by(|a, b| {
        (a.date, a.start_time, &a.instance_id).cmp(&(b.date, b.start_time, &b.instance_id))
    });

    tracing::debug!(
        start = %start,
        end = %end,
        templates = templates.len(),
        instances = instances.len(),
        "Materialized calendar events"
    );

    Ok(instances)
}
