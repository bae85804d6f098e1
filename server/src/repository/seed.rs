use crate::models::EventTemplate;

const DEMO_TEMPLATES: &str = include_str!("demo_templates.json");

/// The congregation's standing weekly schedule plus a seasonal service, used to
/// seed the in-memory store when no database is configured.
pub fn demo_templates() -> Result<Vec<EventTemplate>, serde_json::Error> {
    serde_json::from_str(DEMO_TEMPLATES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{materialize, EventFilter, TemplateSet};
    use chrono::NaiveDate;

    #[test]
    fn test_demo_templates_load_and_validate() {
        let templates = demo_templates().unwrap();
        assert_eq!(templates.len(), 7);
        assert!(TemplateSet::load(templates).is_ok());
    }

    #[test]
    fn test_demo_december_week_includes_christmas_eve() {
        let set = TemplateSet::load(demo_templates().unwrap()).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 12, 22).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();

        let events = materialize(&set, start, end, &EventFilter::default()).unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.instance_id.as_str()).collect();

        assert_eq!(
            ids,
            [
                "sunday-worship-early-2024-12-22",
                "sunday-worship-late-2024-12-22",
                "christmas-eve-2024-2024-12-24",
                "wednesday-bible-study-2024-12-25",
                "youth-night-2024-12-27",
            ]
        );
    }
}
