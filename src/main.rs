mod app;
mod auth;
mod config;
mod db;
mod errors;
mod insights;
mod jobs;
mod pages;
mod state;


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "careerpath=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init()?;

    // Dials the store once at startup so a bad DATABASE_URL fails here.
    app_state.db.migrate().await?;

    let config = app_state.config.clone();
    app::serve(app::build_app(app_state), &config).await
}
