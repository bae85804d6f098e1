use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    create_template, delete_template, get_template, health_check, list_calendar_events,
    list_templates, update_template,
};
use crate::repository::EventTemplateRepository;
use crate::state::AppState;

pub fn create_routes<R: EventTemplateRepository>(state: AppState<R>, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/calendar/events", get(list_calendar_events::<R>))
        .route(
            "/api/admin/templates",
            get(list_templates::<R>).post(create_template::<R>),
        )
        .route(
            "/api/admin/templates/:id",
            get(get_template::<R>)
                .put(update_template::<R>)
                .delete(delete_template::<R>),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
