use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. The parsing is decoupled from the real
/// environment so it can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;
    use std::str::FromStr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        u64::from_str(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "expected one of true/false/1/0/yes/no".to_string(),
        })
    };

    let log_level = or_default("MAPHARVEST_LOG_LEVEL", "info");
    let origin_url = or_default("MAPHARVEST_ORIGIN_URL", "https://www.google.com/maps/");
    let chromium_path = lookup("MAPHARVEST_CHROMIUM_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let headless = parse_bool("MAPHARVEST_HEADLESS", "true")?;

    let shard_count = parse_usize("MAPHARVEST_SHARD_COUNT", "4")?;
    if shard_count == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPHARVEST_SHARD_COUNT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let max_reviews = parse_usize("MAPHARVEST_MAX_REVIEWS", "200")?;
    let failure_streak_threshold = parse_u32("MAPHARVEST_FAILURE_STREAK_THRESHOLD", "5")?;
    if failure_streak_threshold == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPHARVEST_FAILURE_STREAK_THRESHOLD".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let scroll_passes = parse_u32("MAPHARVEST_SCROLL_PASSES", "40")?;
    let page_down_passes = parse_u32("MAPHARVEST_PAGE_DOWN_PASSES", "20")?;
    let fallback_scroll_passes = parse_u32("MAPHARVEST_FALLBACK_SCROLL_PASSES", "10")?;

    let search_timeout_secs = parse_num("MAPHARVEST_SEARCH_TIMEOUT_SECS", "10")?;
    let reviews_tab_timeout_secs = parse_num("MAPHARVEST_REVIEWS_TAB_TIMEOUT_SECS", "5")?;
    let reviews_wait_timeout_secs = parse_num("MAPHARVEST_REVIEWS_WAIT_TIMEOUT_SECS", "10")?;
    let scroll_settle_ms = parse_num("MAPHARVEST_SCROLL_SETTLE_MS", "500")?;

    let keyword_pause_min_ms = parse_num("MAPHARVEST_KEYWORD_PAUSE_MIN_MS", "1000")?;
    let keyword_pause_max_ms = parse_num("MAPHARVEST_KEYWORD_PAUSE_MAX_MS", "3000")?;
    if keyword_pause_max_ms < keyword_pause_min_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "MAPHARVEST_KEYWORD_PAUSE_MAX_MS".to_string(),
            reason: format!("must be >= MAPHARVEST_KEYWORD_PAUSE_MIN_MS ({keyword_pause_min_ms})"),
        });
    }

    let download_timeout_secs = parse_num("MAPHARVEST_DOWNLOAD_TIMEOUT_SECS", "30")?;
    let download_max_retries = parse_u32("MAPHARVEST_DOWNLOAD_MAX_RETRIES", "2")?;
    let diagnostics = parse_bool("MAPHARVEST_DIAGNOSTICS", "true")?;

    Ok(AppConfig {
        log_level,
        origin_url,
        chromium_path,
        headless,
        shard_count,
        max_reviews,
        failure_streak_threshold,
        scroll_passes,
        page_down_passes,
        fallback_scroll_passes,
        search_timeout_secs,
        reviews_tab_timeout_secs,
        reviews_wait_timeout_secs,
        scroll_settle_ms,
        keyword_pause_min_ms,
        keyword_pause_max_ms,
        download_timeout_secs,
        download_max_retries,
        diagnostics,
    })
}

/// Parse a boolean-ish env value. Returns `None` for anything unrecognized.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
