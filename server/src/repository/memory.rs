use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{EventTemplateRepository, RepositoryError};
use crate::models::EventTemplate;

/// Process-local template store, keyed and listed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateRepository {
    templates: Arc<RwLock<BTreeMap<String, EventTemplate>>>,
}

impl InMemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later templates replace earlier ones with the same id.
    pub fn with_templates(templates: impl IntoIterator<Item = EventTemplate>) -> Self {
        let map = templates
            .into_iter()
            .map(|template| (template.id.clone(), template))
            .collect();
        Self {
            templates: Arc::new(RwLock::new(map)),
        }
    }
}

impl EventTemplateRepository for InMemoryTemplateRepository {
    async fn list(&self) -> Result<Vec<EventTemplate>, RepositoryError> {
        Ok(self.templates.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<EventTemplate, RepositoryError> {
        self.templates
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn create(&self, template: EventTemplate) -> Result<EventTemplate, RepositoryError> {
        let mut templates = self.templates.write().await;
        if templates.contains_key(&template.id) {
            return Err(RepositoryError::Conflict(template.id));
        }
        templates.insert(template.id.clone(), template.clone());
        Ok(template)
    }

    async fn update(&self, template: EventTemplate) -> Result<EventTemplate, RepositoryError> {
        let mut templates = self.templates.write().await;
        match templates.get_mut(&template.id) {
            Some(existing) => {
                *existing = template.clone();
                Ok(template)
            }
            None => Err(RepositoryError::NotFound(template.id)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.templates
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventType;
    use chrono::{NaiveDate, NaiveTime};

    fn template(id: &str, title: &str) -> EventTemplate {
        EventTemplate {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            location: "Fellowship Hall".to_string(),
            event_type: EventType::Event,
            start_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            category: "fellowship".to_string(),
            recurrence: None,
            date: NaiveDate::from_ymd_opt(2024, 5, 19),
            leader: None,
            capacity: Some(80),
            is_online: false,
            online_link: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_and_list() {
        let repo = InMemoryTemplateRepository::new();
        repo.create(template("potluck", "Potluck")).await.unwrap();
        repo.create(template("bake-sale", "Bake Sale")).await.unwrap();

        assert_eq!(repo.get("potluck").await.unwrap().title, "Potluck");

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, ["bake-sale", "potluck"]);
    }

    #[tokio::test]
    async fn test_create_duplicate_conflicts() {
        let repo = InMemoryTemplateRepository::with_templates([template("potluck", "Potluck")]);
        let err = repo.create(template("potluck", "Again")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(id) if id == "potluck"));
    }

    #[tokio::test]
    async fn test_update_replaces_existing_only() {
        let repo = InMemoryTemplateRepository::with_templates([template("potluck", "Potluck")]);

        let updated = repo
            .update(template("potluck", "Harvest Potluck"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Harvest Potluck");
        assert_eq!(repo.get("potluck").await.unwrap().title, "Harvest Potluck");

        let err = repo.update(template("missing", "Missing")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_and_reports_missing() {
        let repo = InMemoryTemplateRepository::with_templates([template("potluck", "Potluck")]);
        repo.delete("potluck").await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
        assert!(matches!(
            repo.delete("potluck").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let repo = InMemoryTemplateRepository::new();
        let handle = repo.clone();
        handle.create(template("potluck", "Potluck")).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
