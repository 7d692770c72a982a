pub mod config;
pub mod handlers;
pub mod models;
pub mod processor;

use actix_web::{web, App, HttpServer};
use anyhow::Result;
use tracing::{error, info, instrument};

pub use config::Settings;
pub use processor::{ClassificationResult, UrlAnalyzer};

/// Registers the service endpoints
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(handlers::home)))
        .service(
            web::resource("/analyze_url")
                .route(web::post().to(handlers::analyze_url))
                .route(web::get().to(handlers::analyze_url)),
        )
        .service(web::resource("/health").route(web::get().to(handlers::health_check)));
}

/// Starts the API server
///
/// # Arguments
/// * `host` - Host address to bind to (e.g., "0.0.0.0")
/// * `port` - Port to listen on
/// * `analyzer` - Classification pipeline shared by all workers
///
/// # Returns
/// * `Result<()>` - Success or an error
#[instrument(skip(analyzer))]
pub async fn start_server(host: &str, port: u16, analyzer: UrlAnalyzer) -> Result<()> {
    info!("Starting URL classification server on {}:{}", host, port);
    let analyzer = web::Data::new(analyzer);

    let server_result = HttpServer::new(move || {
        App::new()
            .app_data(analyzer.clone())
            .configure(configure_routes)
    })
    .bind((host, port))
    .map_err(|e| {
        error!("Failed to bind to {}:{}: {}", host, port, e);
        e
    })?
    .run()
    .await;

    if let Err(e) = server_result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
