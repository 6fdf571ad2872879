use crate::config::types::{
    BatchingConfig, Config, DelayRange, DriverConfig, OutputConfig, PacingConfig, SearchConfig,
    SelectorConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_search_config(&config.search)?;
    validate_driver_config(&config.driver)?;
    validate_pacing_config(&config.pacing)?;
    validate_output_config(&config.output)?;
    validate_batching_config(&config.batching)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    validate_http_url("base-url", &config.base_url)
}

/// Validates browser driver configuration
fn validate_driver_config(config: &DriverConfig) -> Result<(), ConfigError> {
    validate_http_url("webdriver-url", &config.webdriver_url)?;

    if config.browser.trim().is_empty() {
        return Err(ConfigError::Validation(
            "browser cannot be empty".to_string(),
        ));
    }

    if config.wait_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "wait-timeout-secs must be >= 1, got {}",
            config.wait_timeout_secs
        )));
    }

    Ok(())
}

/// Validates every delay range
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    validate_delay_range("settle", &config.settle)?;
    validate_delay_range("click", &config.click)?;
    validate_delay_range("dismiss", &config.dismiss)?;
    validate_delay_range("page", &config.page)?;
    validate_delay_range("location", &config.location)?;
    Ok(())
}

fn validate_delay_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min_ms > range.max_ms {
        return Err(ConfigError::Validation(format!(
            "pacing.{} min-ms ({}) must not exceed max-ms ({})",
            name, range.min_ms, range.max_ms
        )));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (key, value) in [
        ("results-dir", &config.results_dir),
        ("checkpoint-path", &config.checkpoint_path),
        ("consolidated-path", &config.consolidated_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    validate_file_prefix(&config.file_prefix)
}

/// Validates batching defaults
fn validate_batching_config(config: &BatchingConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that no selector was configured as an empty string
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (key, selector) in config.entries() {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selectors.{} cannot be empty",
                key
            )));
        }
    }
    Ok(())
}

/// Artifact names are built from the prefix, so keep it filesystem-safe
fn validate_file_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation(
            "file-prefix cannot be empty".to_string(),
        ));
    }

    if !prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "file-prefix must contain only ASCII alphanumerics, '-' or '_', got '{}'",
            prefix
        )));
    }

    Ok(())
}

fn validate_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", key, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            key, value
        )));
    }

    Ok(())
}
