use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

mod api;
mod backend;
mod config;
mod docs;
mod error;
mod model;
mod routes;
mod scanner;
mod utils;

#[cfg(test)]
mod test_support;

use backend::{HrBackend, HttpBackend};
use config::Config;
use scanner::Scanner;
use scanner::camera::{Camera, NoCamera, SpoolCamera};
use scanner::decoder::BackendDecoder;
use scanner::recorder::PresenceRecorder;
use scanner::session::ScanSettings;
use utils::{employee_directory::EmployeeDirectory, qr_cache::QrCache};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "kiosk.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.backend_url, "Kiosk starting...");

    let backend: Arc<dyn HrBackend> =
        Arc::new(HttpBackend::new(&config).context("failed to build the backend client")?);

    let camera: Arc<dyn Camera> = match &config.camera_spool_dir {
        Some(dir) => Arc::new(SpoolCamera::new(dir.clone())),
        None => {
            warn!("CAMERA_SPOOL_DIR not set, scanning is disabled");
            Arc::new(NoCamera)
        }
    };

    let scanner = Scanner::new(
        camera,
        Arc::new(BackendDecoder::new(backend.clone())),
        PresenceRecorder::new(backend.clone()),
        ScanSettings {
            interval: config.scan_interval,
            auto_stop_delay: config.auto_stop_delay,
            ..ScanSettings::default()
        },
    );
    if !scanner.initialize() {
        warn!("No camera available at startup");
    }

    // shared across workers
    let backend_data: Data<dyn HrBackend> = Data::from(backend);
    let scanner_data = Data::new(scanner.clone());
    let directory = Data::new(EmployeeDirectory::default());
    let qr_cache = Data::new(QrCache::new(config.qr_cache_ttl));

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();
    let api_doc = ApiDoc::for_prefix(&config.kiosk_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", api_doc.clone()),
            )
            .app_data(backend_data.clone())
            .app_data(scanner_data.clone())
            .app_data(directory.clone())
            .app_data(qr_cache.clone())
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    scanner.shutdown().await;
    info!("Kiosk stopped");
    Ok(())
}
