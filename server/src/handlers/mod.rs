use axum::response::Response;
use serde::Serialize;

use crate::utils::response::success;

pub mod calendar;
pub mod templates;

pub use calendar::list_calendar_events;
pub use templates::{
    create_template, delete_template, get_template, list_templates, update_template,
};

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "church-calendar-api",
    };

    success(payload, "Health check successful")
}
