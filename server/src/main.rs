use std::error::Error;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use church_calendar_server::calendar::TemplateSet;
use church_calendar_server::config::Config;
use church_calendar_server::repository::{
    demo_templates, EventTemplateRepository, InMemoryTemplateRepository, PgTemplateRepository,
};
use church_calendar_server::routes::create_routes;
use church_calendar_server::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;

            tracing::info!("Successfully connected to database");

            sqlx::migrate!().run(&pool).await?;

            tracing::info!("Migrations run successfully");

            serve(PgTemplateRepository::new(pool), &config).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, event templates are kept in memory");
            let repository = if config.seed_demo_templates {
                InMemoryTemplateRepository::with_templates(demo_templates()?)
            } else {
                InMemoryTemplateRepository::new()
            };
            serve(repository, &config).await
        }
    }
}

async fn serve<R: EventTemplateRepository>(
    repository: R,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    // Refuse to start on a template set the calendar could never render
    let templates = TemplateSet::load(repository.list().await?)?;
    tracing::info!(templates = templates.len(), "Event templates loaded");

    let app: Router = create_routes(AppState::new(repository), config);

    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
