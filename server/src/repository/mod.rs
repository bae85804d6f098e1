//! Storage for authored event templates.

use std::future::Future;

use thiserror::Error;

use crate::models::EventTemplate;

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::InMemoryTemplateRepository;
pub use postgres::PgTemplateRepository;
pub use seed::demo_templates;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("template '{0}' not found")]
    NotFound(String),

    #[error("template '{0}' already exists")]
    Conflict(String),

    #[error("stored template is corrupt: {0}")]
    Corrupt(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// CRUD over event templates. Handlers receive an implementation through
/// application state; the materializer only ever sees the snapshot returned
/// by [`EventTemplateRepository::list`].
pub trait EventTemplateRepository: Clone + Send + Sync + 'static {
    fn list(&self) -> impl Future<Output = Result<Vec<EventTemplate>, RepositoryError>> + Send;

    fn get(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<EventTemplate, RepositoryError>> + Send;

    fn create(
        &self,
        template: EventTemplate,
    ) -> impl Future<Output = Result<EventTemplate, RepositoryError>> + Send;

    /// Replaces the template with the same id.
    fn update(
        &self,
        template: EventTemplate,
    ) -> impl Future<Output = Result<EventTemplate, RepositoryError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}
