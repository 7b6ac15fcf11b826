use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,

    // External HR backend
    pub backend_url: String,
    /// `None` keeps requests unbounded, like the browser client did.
    pub backend_timeout: Option<Duration>,

    pub kiosk_prefix: String,

    // Scan session timing
    pub scan_interval: Duration,
    pub auto_stop_delay: Duration,
    /// Directory a capture daemon drops frames into; unset means no camera.
    pub camera_spool_dir: Option<PathBuf>,

    // Rate limiting
    pub rate_scan_per_min: u32,
    pub rate_screen_per_min: u32,

    pub qr_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            backend_timeout: match env::var("BACKEND_TIMEOUT_SECS") {
                Ok(raw) => Some(Duration::from_secs(parse_var("BACKEND_TIMEOUT_SECS", &raw)?)),
                Err(_) => None,
            },
            kiosk_prefix: env::var("KIOSK_PREFIX").unwrap_or_else(|_| "/kiosk".to_string()),

            scan_interval: Duration::from_millis(var_or("SCAN_INTERVAL_MS", 500)?),
            auto_stop_delay: Duration::from_millis(var_or("AUTO_STOP_DELAY_MS", 3000)?),
            camera_spool_dir: env::var("CAMERA_SPOOL_DIR").ok().map(PathBuf::from),

            rate_scan_per_min: var_or("RATE_SCAN_PER_MIN", 120)?,
            rate_screen_per_min: var_or("RATE_SCREEN_PER_MIN", 1000)?,

            qr_cache_ttl: Duration::from_secs(var_or("QR_CACHE_TTL_SECS", 600)?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:4200".to_string(),
            backend_url: "http://localhost:8080/api".to_string(),
            backend_timeout: None,
            kiosk_prefix: "/kiosk".to_string(),
            scan_interval: Duration::from_millis(500),
            auto_stop_delay: Duration::from_millis(3000),
            camera_spool_dir: None,
            rate_scan_per_min: 120,
            rate_screen_per_min: 1000,
            qr_cache_ttl: Duration::from_secs(600),
        }
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => parse_var(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw:?}"))
}
