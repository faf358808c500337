use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub places_api_key: Option<String>,
    pub regions_path: Option<PathBuf>,
    pub default_min_results: u32,
    pub places_timeout_secs: u64,
    pub places_radius_meters: u32,
    pub places_details_delay_ms: u64,
    pub places_page_delay_ms: u64,
    pub places_quota_cooldown_secs: u64,
    pub scraper_timeout_secs: u64,
    pub scraper_user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("regions_path", &self.regions_path)
            .field("default_min_results", &self.default_min_results)
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("places_radius_meters", &self.places_radius_meters)
            .field("places_details_delay_ms", &self.places_details_delay_ms)
            .field("places_page_delay_ms", &self.places_page_delay_ms)
            .field(
                "places_quota_cooldown_secs",
                &self.places_quota_cooldown_secs,
            )
            .field("scraper_timeout_secs", &self.scraper_timeout_secs)
            .field("scraper_user_agent", &self.scraper_user_agent)
            .finish()
    }
}
