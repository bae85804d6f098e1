use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::EventTemplate;
use crate::repository::EventTemplateRepository;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

fn parse_body(
    payload: Result<Json<EventTemplate>, JsonRejection>,
) -> Result<EventTemplate, AppError> {
    payload
        .map(|Json(template)| template)
        .map_err(|e| AppError::ValidationError(e.body_text()))
}

pub async fn list_templates<R: EventTemplateRepository>(
    State(state): State<AppState<R>>,
) -> Result<Response, AppError> {
    let templates = state.templates.list().await?;
    Ok(success(templates, "Event templates retrieved"))
}

pub async fn get_template<R: EventTemplateRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let template = state.templates.get(&id).await?;
    Ok(success(template, "Event template retrieved"))
}

pub async fn create_template<R: EventTemplateRepository>(
    State(state): State<AppState<R>>,
    payload: Result<Json<EventTemplate>, JsonRejection>,
) -> Result<Response, AppError> {
    let mut template = parse_body(payload)?;
    if template.id.trim().is_empty() {
        template.id = Uuid::new_v4().to_string();
    }
    template.validate()?;

    let template = state.templates.create(template).await?;
    tracing::info!(template_id = %template.id, "Event template created");
    Ok(created(template, "Event template created"))
}

pub async fn update_template<R: EventTemplateRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    payload: Result<Json<EventTemplate>, JsonRejection>,
) -> Result<Response, AppError> {
    let mut template = parse_body(payload)?;
    if !template.id.is_empty() && template.id != id {
        return Err(AppError::ValidationError(format!(
            "Body id '{}' does not match path id '{}'",
            template.id, id
        )));
    }
    template.id = id;
    template.validate()?;

    let template = state.templates.update(template).await?;
    tracing::info!(template_id = %template.id, "Event template updated");
    Ok(success(template, "Event template updated"))
}

pub async fn delete_template<R: EventTemplateRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.templates.delete(&id).await?;
    tracing::info!(template_id = %id, "Event template deleted");
    Ok(empty_success("Event template deleted"))
}
