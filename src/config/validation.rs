use crate::config::types::{
    Config, DownloadConfig, NotificationConfig, ScannerConfig, UserAgentConfig, WILDCARD_DOMAIN,
};
use crate::ConfigError;

/// Longest accepted stagger between batch items
const MAX_STAGGER_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scanner_config(&config.scanner)?;
    validate_download_config(&config.download)?;
    validate_notification_config(&config.notifications)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates scanner configuration
fn validate_scanner_config(config: &ScannerConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_domains cannot be empty (use [\"*\"] to allow every domain)".to_string(),
        ));
    }

    for entry in &config.allowed_domains {
        validate_allow_entry(entry)?;
    }

    if config.thumbnail_class.is_empty()
        || config.thumbnail_class.chars().any(char::is_whitespace)
    {
        return Err(ConfigError::Validation(format!(
            "thumbnail_class must be a single non-empty class name, got '{}'",
            config.thumbnail_class
        )));
    }

    if config.scan_interval < 100 {
        return Err(ConfigError::Validation(format!(
            "scan_interval must be >= 100ms, got {}ms",
            config.scan_interval
        )));
    }

    Ok(())
}

/// Validates download configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.stagger > MAX_STAGGER_MS {
        return Err(ConfigError::Validation(format!(
            "stagger must be <= {}ms, got {}ms",
            MAX_STAGGER_MS, config.stagger
        )));
    }

    Ok(())
}

/// Validates notification configuration
fn validate_notification_config(config: &NotificationConfig) -> Result<(), ConfigError> {
    if config.display_time == 0 {
        return Err(ConfigError::Validation(
            "display_time must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    Ok(())
}

/// Validates one allow-list entry: the wildcard or a host name
fn validate_allow_entry(entry: &str) -> Result<(), ConfigError> {
    if entry == WILDCARD_DOMAIN {
        return Ok(());
    }

    if entry.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !entry
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            entry
        )));
    }

    if entry.starts_with('.')
        || entry.ends_with('.')
        || entry.starts_with('-')
        || entry.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            entry
        )));
    }

    if entry.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            entry
        )));
    }

    Ok(())
}
