use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::CalendarError;

/// Kind of gathering, used for calendar colouring and the `type` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    Service,
    BibleStudy,
    Event,
    Meeting,
    Youth,
    Special,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Service => "service",
            EventType::BibleStudy => "bible-study",
            EventType::Event => "event",
            EventType::Meeting => "meeting",
            EventType::Youth => "youth",
            EventType::Special => "special",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "service" => Ok(EventType::Service),
            "bible-study" => Ok(EventType::BibleStudy),
            "event" => Ok(EventType::Event),
            "meeting" => Ok(EventType::Meeting),
            "youth" => Ok(EventType::Youth),
            "special" => Ok(EventType::Special),
            other => Err(ParseEnumError::new("event type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(ParseEnumError::new("frequency", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// How a template repeats.
///
/// `days_of_week` uses 0 = Sunday through 6 = Saturday; values are kept as
/// written and range-checked by [`EventTemplate::validate`]. `start_date` and
/// `end_date` bound the validity window; biweekly rules count their two-week
/// cadence from the week containing `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default)]
    pub days_of_week: BTreeSet<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub end_date: Option<NaiveDate>,
}

/// An authored calendar entry. Recurring when `recurrence` is set, otherwise
/// a one-off anchored to `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTemplate {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_date"
    )]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_link: Option<String>,
}

impl EventTemplate {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Checks the template can be materialized.
    ///
    /// ## Errors
    /// Returns [`CalendarError::InvalidTemplate`] naming the first problem found.
    pub fn validate(&self) -> Result<(), CalendarError> {
        let invalid = |reason: &str| CalendarError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if self.title.trim().is_empty() {
            return Err(invalid("title must not be empty"));
        }
        if self.end_time < self.start_time {
            return Err(invalid("endTime must not be before startTime"));
        }

        match &self.recurrence {
            None if self.date.is_none() => Err(invalid("one-off events require a date")),
            None => Ok(()),
            Some(rule) => {
                if rule.days_of_week.is_empty() {
                    return Err(invalid("recurrence requires at least one daysOfWeek value"));
                }
                if let Some(day) = rule.days_of_week.iter().find(|day| !(0..=6).contains(*day)) {
                    return Err(invalid(&format!("daysOfWeek value {day} is outside 0-6")));
                }
                if rule.frequency == Frequency::Biweekly && rule.start_date.is_none() {
                    return Err(invalid("biweekly recurrence requires a startDate"));
                }
                if let (Some(start), Some(end)) = (rule.start_date, rule.end_date) {
                    if end < start {
                        return Err(invalid("recurrence endDate is before its startDate"));
                    }
                }
                Ok(())
            }
        }
    }
}

/// A template bound to one concrete date. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInstance {
    pub instance_id: String,
    pub template_id: String,
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(serialize_with = "hhmm::serialize")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "hhmm::serialize")]
    pub end_time: NaiveTime,
    pub category: String,
    pub is_recurring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub is_online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub online_link: Option<String>,
}

impl EventInstance {
    pub fn from_template(template: &EventTemplate, date: NaiveDate) -> Self {
        Self {
            instance_id: instance_id(&template.id, date),
            template_id: template.id.clone(),
            date,
            title: template.title.clone(),
            description: template.description.clone(),
            location: template.location.clone(),
            event_type: template.event_type,
            start_time: template.start_time,
            end_time: template.end_time,
            category: template.category.clone(),
            is_recurring: template.is_recurring(),
            leader: template.leader.clone(),
            capacity: template.capacity,
            is_online: template.is_online,
            online_link: template.online_link.clone(),
        }
    }
}

pub fn instance_id(template_id: &str, date: NaiveDate) -> String {
    format!("{}-{}", template_id, date.format("%Y-%m-%d"))
}

/// Parses an ISO 8601 date or date-time, keeping only the calendar date as written.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|dt| dt.date())
        })
}

fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| {
        parse_iso_date(&value).ok_or_else(|| de::Error::custom(format!("invalid date '{value}'")))
    })
    .transpose()
}

/// `HH:MM` wire format for times of day.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .map_err(|_| de::Error::custom(format!("invalid time '{raw}', expected HH:MM")))
    }
}
