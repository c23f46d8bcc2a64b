use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use backend::classifier::Classifier;
use backend::classifier::taxonomy::CLASS_COUNT;
use backend::config::AppConfig;
use backend::routes::configure_routes;
use backend::storage::upload_store::UploadStore;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let classifier = Classifier::new(config.classifier.signature_strategy);
    log::info!(
        "Classifier ready: {} classes, {} signatures",
        CLASS_COUNT,
        classifier.strategy()
    );

    let static_dir = config.storage.static_dir.clone();
    let upload_dir = config.storage.upload_dir.clone();
    std::fs::create_dir_all(&upload_dir)?;
    if !static_dir.is_dir() {
        log::warn!(
            "Static directory {} does not exist; only the API will be served",
            static_dir.display()
        );
    }
    let store = UploadStore::new(upload_dir.clone());

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(classifier))
            .app_data(web::Data::new(store.clone()))
            .configure(|cfg| configure_routes(cfg, static_dir.clone(), upload_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
