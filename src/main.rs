use actix_web::HttpServer;
use log::{error, info};

use condo_hub::{
    build_app,
    config::Config,
    db::{self, Store},
    service::{log::init_logger, seed, AppState},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logger();
    let config = Config::from_env().map_err(|e| {
        error!("failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let storage = db::init_storage(&config).await.map_err(|e| {
        error!("snapshot storage unavailable: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let store = Store::open(storage, &config.namespace).await.map_err(|e| {
        error!("failed to load snapshots: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    if config.seed_demo_data {
        if let Err(e) = seed::seed_demo_data(&store).await {
            error!("demo data not seeded: {}", e);
        }
    }

    let state = AppState::new(store, &config);
    info!("listening on {}:{}", config.host, config.port);
    HttpServer::new(move || build_app(state.clone()))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
