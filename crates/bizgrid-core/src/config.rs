use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse. A missing Places API key
/// is not a startup error; jobs submitted without one fail individually with
/// a specific stop reason.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("BIZGRID_ENV", "development"));

    let bind_addr = parse_addr("BIZGRID_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("BIZGRID_LOG_LEVEL", "info");
    let places_api_key = lookup("GOOGLE_PLACES_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let regions_path = lookup("BIZGRID_REGIONS_PATH").ok().map(PathBuf::from);

    let default_min_results = parse_u32("BIZGRID_DEFAULT_MIN_RESULTS", "500")?;
    if !(1..=5000).contains(&default_min_results) {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZGRID_DEFAULT_MIN_RESULTS".to_string(),
            reason: "must be between 1 and 5000".to_string(),
        });
    }

    let places_timeout_secs = parse_u64("BIZGRID_PLACES_TIMEOUT_SECS", "30")?;
    let places_radius_meters = parse_u32("BIZGRID_PLACES_RADIUS_METERS", "40000")?;
    let places_details_delay_ms = parse_u64("BIZGRID_PLACES_DETAILS_DELAY_MS", "100")?;
    let places_page_delay_ms = parse_u64("BIZGRID_PLACES_PAGE_DELAY_MS", "2000")?;
    let places_quota_cooldown_secs = parse_u64("BIZGRID_PLACES_QUOTA_COOLDOWN_SECS", "60")?;

    let scraper_timeout_secs = parse_u64("BIZGRID_SCRAPER_TIMEOUT_SECS", "8")?;
    let scraper_user_agent = or_default(
        "BIZGRID_SCRAPER_USER_AGENT",
        "bizgrid/0.1 (business-discovery)",
    );

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        places_api_key,
        regions_path,
        default_min_results,
        places_timeout_secs,
        places_radius_meters,
        places_details_delay_ms,
        places_page_delay_ms,
        places_quota_cooldown_secs,
        scraper_timeout_secs,
        scraper_user_agent,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Result<String, std::env::VarError> + 'a {
        move |key: &str| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn defaults_apply_with_empty_env() {
        let env = HashMap::new();
        let config = build_app_config(lookup_from(&env)).expect("config should build");

        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_addr.port(), 8000);
        assert_eq!(config.log_level, "info");
        assert!(config.places_api_key.is_none());
        assert!(config.regions_path.is_none());
        assert_eq!(config.default_min_results, 500);
        assert_eq!(config.places_radius_meters, 40_000);
        assert_eq!(config.places_page_delay_ms, 2_000);
        assert_eq!(config.places_quota_cooldown_secs, 60);
        assert_eq!(config.scraper_timeout_secs, 8);
    }

    #[test]
    fn missing_api_key_is_not_an_error() {
        let env = HashMap::new();
        let config = build_app_config(lookup_from(&env)).expect("config should build");
        assert!(config.places_api_key.is_none());
    }

    #[test]
    fn blank_api_key_is_treated_as_absent() {
        let mut env = HashMap::new();
        env.insert("GOOGLE_PLACES_API_KEY", "   ");
        let config = build_app_config(lookup_from(&env)).expect("config should build");
        assert!(config.places_api_key.is_none());
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut env = HashMap::new();
        env.insert("BIZGRID_BIND_ADDR", "not-an-addr");
        let result = build_app_config(lookup_from(&env));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZGRID_BIND_ADDR"),
            "expected InvalidEnvVar for BIZGRID_BIND_ADDR, got {result:?}"
        );
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let mut env = HashMap::new();
        env.insert("BIZGRID_PLACES_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from(&env));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZGRID_PLACES_TIMEOUT_SECS"),
            "expected InvalidEnvVar for BIZGRID_PLACES_TIMEOUT_SECS, got {result:?}"
        );
    }

    #[test]
    fn min_results_outside_bounds_is_rejected() {
        let mut env = HashMap::new();
        env.insert("BIZGRID_DEFAULT_MIN_RESULTS", "9000");
        let result = build_app_config(lookup_from(&env));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZGRID_DEFAULT_MIN_RESULTS"),
            "expected InvalidEnvVar for BIZGRID_DEFAULT_MIN_RESULTS, got {result:?}"
        );
    }

    #[test]
    fn production_environment_parses() {
        let mut env = HashMap::new();
        env.insert("BIZGRID_ENV", "production");
        let config = build_app_config(lookup_from(&env)).expect("config should build");
        assert_eq!(config.env, Environment::Production);
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut env = HashMap::new();
        env.insert("GOOGLE_PLACES_API_KEY", "super-secret");
        let config = build_app_config(lookup_from(&env)).expect("config should build");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[redacted]"));
    }
}
