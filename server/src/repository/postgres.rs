use chrono::{NaiveDate, NaiveTime};
use sqlx::postgres::PgPool;
use sqlx::FromRow;

use super::{EventTemplateRepository, RepositoryError};
use crate::models::{EventTemplate, EventType, Frequency, RecurrenceRule};

const TEMPLATE_COLUMNS: &str = "id, title, description, location, event_type, start_time, \
     end_time, category, frequency, days_of_week, recurrence_start, recurrence_end, \
     anchor_date, leader, capacity, is_online, online_link";

#[derive(Debug, Clone)]
pub struct PgTemplateRepository {
    pool: PgPool,
}

impl PgTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flattened `event_templates` row.
#[derive(Debug, FromRow)]
struct EventTemplateRow {
    id: String,
    title: String,
    description: String,
    location: String,
    event_type: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    category: String,
    frequency: Option<String>,
    days_of_week: Vec<i16>,
    recurrence_start: Option<NaiveDate>,
    recurrence_end: Option<NaiveDate>,
    anchor_date: Option<NaiveDate>,
    leader: Option<String>,
    capacity: Option<i64>,
    is_online: bool,
    online_link: Option<String>,
}

impl TryFrom<EventTemplateRow> for EventTemplate {
    type Error = RepositoryError;

    fn try_from(row: EventTemplateRow) -> Result<Self, Self::Error> {
        let corrupt = |detail: String| RepositoryError::Corrupt(format!("{}: {}", row.id, detail));

        let event_type = row
            .event_type
            .parse::<EventType>()
            .map_err(|e| corrupt(format!("{e}")))?;

        let recurrence = match row.frequency.as_deref() {
            None => None,
            Some(frequency) => Some(RecurrenceRule {
                frequency: frequency
                    .parse::<Frequency>()
                    .map_err(|e| corrupt(format!("{e}")))?,
                days_of_week: row.days_of_week.iter().map(|day| i64::from(*day)).collect(),
                start_date: row.recurrence_start,
                end_date: row.recurrence_end,
            }),
        };

        let capacity = row
            .capacity
            .map(u32::try_from)
            .transpose()
            .map_err(|_| corrupt(format!("bad capacity {:?}", row.capacity)))?;

        Ok(EventTemplate {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            event_type,
            start_time: row.start_time,
            end_time: row.end_time,
            category: row.category,
            recurrence,
            date: row.anchor_date,
            leader: row.leader,
            capacity,
            is_online: row.is_online,
            online_link: row.online_link,
        })
    }
}

fn days_of_week(template: &EventTemplate) -> Result<Vec<i16>, RepositoryError> {
    let Some(rule) = &template.recurrence else {
        return Ok(Vec::new());
    };
    rule.days_of_week
        .iter()
        .map(|day| {
            i16::try_from(*day).map_err(|_| {
                RepositoryError::Corrupt(format!("{}: daysOfWeek value {day}", template.id))
            })
        })
        .collect()
}

fn map_write_error(err: sqlx::Error, id: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(id.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

impl EventTemplateRepository for PgTemplateRepository {
    async fn list(&self) -> Result<Vec<EventTemplate>, RepositoryError> {
        let rows: Vec<EventTemplateRow> = sqlx::query_as(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM event_templates ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(EventTemplate::try_from).collect()
    }

    async fn get(&self, id: &str) -> Result<EventTemplate, RepositoryError> {
        let row: Option<EventTemplateRow> = sqlx::query_as(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM event_templates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::NotFound(id.to_string()))?
            .try_into()
    }

    async fn create(&self, template: EventTemplate) -> Result<EventTemplate, RepositoryError> {
        let rule = template.recurrence.as_ref();
        let days = days_of_week(&template)?;
        let row: EventTemplateRow = sqlx::query_as(&format!(
            "INSERT INTO event_templates ({TEMPLATE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(&template.id)
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.location)
        .bind(template.event_type.as_str())
        .bind(template.start_time)
        .bind(template.end_time)
        .bind(&template.category)
        .bind(rule.map(|r| r.frequency.as_str()))
        .bind(&days)
        .bind(rule.and_then(|r| r.start_date))
        .bind(rule.and_then(|r| r.end_date))
        .bind(template.date)
        .bind(&template.leader)
        .bind(template.capacity.map(i64::from))
        .bind(template.is_online)
        .bind(&template.online_link)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &template.id))?;

        row.try_into()
    }

    async fn update(&self, template: EventTemplate) -> Result<EventTemplate, RepositoryError> {
        let rule = template.recurrence.as_ref();
        let days = days_of_week(&template)?;
        let row: Option<EventTemplateRow> = sqlx::query_as(&format!(
            "UPDATE event_templates SET title = $2, description = $3, location = $4, \
             event_type = $5, start_time = $6, end_time = $7, category = $8, frequency = $9, \
             days_of_week = $10, recurrence_start = $11, recurrence_end = $12, \
             anchor_date = $13, leader = $14, capacity = $15, is_online = $16, \
             online_link = $17, updated_at = NOW() \
             WHERE id = $1 RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(&template.id)
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.location)
        .bind(template.event_type.as_str())
        .bind(template.start_time)
        .bind(template.end_time)
        .bind(&template.category)
        .bind(rule.map(|r| r.frequency.as_str()))
        .bind(&days)
        .bind(rule.and_then(|r| r.start_date))
        .bind(rule.and_then(|r| r.end_date))
        .bind(template.date)
        .bind(&template.leader)
        .bind(template.capacity.map(i64::from))
        .bind(template.is_online)
        .bind(&template.online_link)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::NotFound(template.id.clone()))?
            .try_into()
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM event_templates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> EventTemplateRow {
        EventTemplateRow {
            id: "wednesday-bible-study".to_string(),
            title: "Wednesday Bible Study".to_string(),
            description: "Verse-by-verse through Romans".to_string(),
            location: "Room 204".to_string(),
            event_type: "bible-study".to_string(),
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
            category: "education".to_string(),
            frequency: Some("weekly".to_string()),
            days_of_week: vec![3],
            recurrence_start: None,
            recurrence_end: NaiveDate::from_ymd_opt(2024, 12, 18),
            anchor_date: None,
            leader: Some("Pastor Dana".to_string()),
            capacity: Some(40),
            is_online: false,
            online_link: None,
        }
    }

    #[test]
    fn test_row_converts_to_recurring_template() {
        let template = EventTemplate::try_from(row()).unwrap();
        assert_eq!(template.event_type, EventType::BibleStudy);
        assert_eq!(template.capacity, Some(40));

        let rule = template.recurrence.unwrap();
        assert_eq!(rule.frequency, Frequency::Weekly);
        assert_eq!(rule.days_of_week.into_iter().collect::<Vec<_>>(), [3]);
        assert_eq!(rule.end_date, NaiveDate::from_ymd_opt(2024, 12, 18));
    }

    #[test]
    fn test_row_without_frequency_is_one_off() {
        let mut one_off = row();
        one_off.frequency = None;
        one_off.days_of_week = Vec::new();
        one_off.anchor_date = NaiveDate::from_ymd_opt(2024, 4, 7);

        let template = EventTemplate::try_from(one_off).unwrap();
        assert!(template.recurrence.is_none());
        assert_eq!(template.date, NaiveDate::from_ymd_opt(2024, 4, 7));
    }

    #[test]
    fn test_unknown_enum_text_is_corrupt() {
        let mut bad = row();
        bad.event_type = "retreat".to_string();
        assert!(matches!(
            EventTemplate::try_from(bad),
            Err(RepositoryError::Corrupt(_))
        ));
    }

    #[test]
    fn test_out_of_range_stored_weekday_fails_validation() {
        let mut negative_day = row();
        negative_day.days_of_week = vec![-1];
        let template = EventTemplate::try_from(negative_day).unwrap();
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_days_of_week_flattens_recurrence() {
        let template = EventTemplate::try_from(row()).unwrap();
        assert_eq!(days_of_week(&template).unwrap(), vec![3]);

        let mut one_off = template.clone();
        one_off.recurrence = None;
        assert!(days_of_week(&one_off).unwrap().is_empty());

        let mut oversized = template;
        oversized.recurrence.as_mut().unwrap().days_of_week.insert(70_000);
        assert!(matches!(
            days_of_week(&oversized),
            Err(RepositoryError::Corrupt(_))
        ));
    }
}
