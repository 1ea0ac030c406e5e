use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use log::{info, warn};
use env_logger::Env;
use actix_web::middleware::Logger;
use std::collections::HashMap;

use gymlog_backend::config::{Config, StorageBackend};
use gymlog_backend::db::{MemoryStore, PgStore, WorkoutStore};
use gymlog_backend::utils::jwt::JwtKeys;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(io::Error::other)?;

    // Initialize the storage backend
    let store: Arc<dyn WorkoutStore> = match &config.storage {
        StorageBackend::Postgres { database_url } => {
            let store = PgStore::connect(database_url).await.map_err(io::Error::other)?;
            if config.run_migrations {
                store.migrate().await.map_err(io::Error::other)?;
            }
            Arc::new(store)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };
    let store = web::Data::from(store);
    let keys = web::Data::new(JwtKeys::new(&config.jwt_secret));

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "gymlog".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .map_err(io::Error::other)?;

    info!("Starting server at {}", config.bind_address);

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // Logging middleware
            .wrap(prometheus.clone()) // Prometheus metrics middleware
            .app_data(store.clone())
            .app_data(keys.clone())
            .configure(gymlog_backend::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
