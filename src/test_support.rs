//! Shared wiring for the handler tests.

use std::sync::Arc;

use actix_web::web::Data;

use crate::backend::HrBackend;
use crate::backend::fake::FakeBackend;
use crate::config::Config;
use crate::scanner::Scanner;
use crate::scanner::recorder::PresenceRecorder;
use crate::scanner::session::ScanSettings;
use crate::scanner::testing::{FakeCamera, ScriptedDecoder};
use crate::utils::{employee_directory::EmployeeDirectory, qr_cache::QrCache};

pub struct TestKiosk {
    pub backend: Arc<FakeBackend>,
    pub camera: Arc<FakeCamera>,
    pub scanner: Scanner,
    pub directory: Data<EmployeeDirectory>,
    pub qr_cache: Data<QrCache>,
    pub config: Config,
}

impl TestKiosk {
    pub fn new(backend: FakeBackend) -> Self {
        Self::with_parts(backend, FakeCamera::default(), ScriptedDecoder::never())
    }

    pub fn with_parts(backend: FakeBackend, camera: FakeCamera, decoder: ScriptedDecoder) -> Self {
        let backend = Arc::new(backend);
        let camera = Arc::new(camera);
        let config = Config::default();
        let scanner = Scanner::new(
            camera.clone(),
            Arc::new(decoder),
            PresenceRecorder::new(backend.clone()),
            ScanSettings::default(),
        );

        Self {
            backend,
            camera,
            scanner,
            directory: Data::new(EmployeeDirectory::default()),
            qr_cache: Data::new(QrCache::new(config.qr_cache_ttl)),
            config,
        }
    }

    pub fn backend_data(&self) -> Data<dyn HrBackend> {
        let backend: Arc<dyn HrBackend> = self.backend.clone();
        Data::from(backend)
    }
}

/// Builds the full kiosk app around a [`TestKiosk`].
#[macro_export]
macro_rules! kiosk_app {
    ($kiosk:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($kiosk.backend_data())
                .app_data(actix_web::web::Data::new($kiosk.scanner.clone()))
                .app_data($kiosk.directory.clone())
                .app_data($kiosk.qr_cache.clone())
                .configure(|cfg| $crate::routes::configure(cfg, $kiosk.config.clone())),
        )
        .await
    };
}

/// Test requests carry a peer address for the rate limiter's key extractor.
pub mod request {
    use actix_web::test::TestRequest;
    use std::net::SocketAddr;

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40_000))
    }

    pub fn get(uri: &str) -> TestRequest {
        TestRequest::get().uri(uri).peer_addr(peer())
    }

    pub fn post(uri: &str) -> TestRequest {
        TestRequest::post().uri(uri).peer_addr(peer())
    }

    pub fn put(uri: &str) -> TestRequest {
        TestRequest::put().uri(uri).peer_addr(peer())
    }

    pub fn delete(uri: &str) -> TestRequest {
        TestRequest::delete().uri(uri).peer_addr(peer())
    }
}
