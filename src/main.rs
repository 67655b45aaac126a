use sehat_pulse::{app, config::AppConfig, logging, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init("sehat_pulse=debug,axum=info,tower_http=info");

    let config = AppConfig::from_env()?;
    let (host, port) = (config.host.clone(), config.port);
    let (app_state, db) = AppState::init(config).await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    app::serve(app::build_app(app_state), &host, port).await
}
