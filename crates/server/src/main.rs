use actix_web::{middleware, web, App, HttpServer};
use anyhow::{Context, Result};
use slidegen_llm::LlmClient;
use slidegen_server::{AppConfig, AppState};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    config.prepare()?;

    let client = LlmClient::new(config.llm.clone())?;
    let bind = config.bind.clone();
    let state = web::Data::new(AppState::new(config, Arc::new(client)));

    log::info!("Starting server at http://{}", bind);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(slidegen_server::configure)
    })
    .bind(&bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await?;

    Ok(())
}
