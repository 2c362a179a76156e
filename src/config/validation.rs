use crate::config::types::{Config, CrawlerConfig, OutputConfig, Section, SiteConfig, UserAgentConfig};
use crate::url::parse_site_url;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    let origin = validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_sections(&config.sections, &origin)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint-interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set (omit it for an unlimited crawl)".to_string(),
        ));
    }

    if config.max_nodes == Some(0) {
        return Err(ConfigError::Validation(
            "max-nodes must be >= 1 when set".to_string(),
        ));
    }

    if config.render_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "render-timeout-secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site origin and returns it parsed
fn validate_site_config(config: &SiteConfig) -> Result<Url, ConfigError> {
    let origin = parse_http_url(&config.origin, "site origin")?;

    if config.root_label.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root-label cannot be empty".to_string(),
        ));
    }

    Ok(origin)
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_file.is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint-file cannot be empty".to_string(),
        ));
    }

    if config.checkpoint_file.contains('/') || config.checkpoint_file.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "checkpoint-file must be a bare file name, got '{}'",
            config.checkpoint_file
        )));
    }

    Ok(())
}

/// Validates the ordered section list
fn validate_sections(sections: &[Section], origin: &Url) -> Result<(), ConfigError> {
    if sections.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[section]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for section in sections {
        if section.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "section name cannot be empty".to_string(),
            ));
        }

        if !names.insert(section.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate section name '{}'",
                section.name
            )));
        }

        let url = parse_http_url(&section.url, &format!("section '{}'", section.name))?;
        if url.origin() != origin.origin() {
            return Err(ConfigError::Validation(format!(
                "section '{}' URL '{}' is not on the site origin '{}'",
                section.name,
                section.url,
                origin.origin().ascii_serialization()
            )));
        }
    }

    Ok(())
}

fn parse_http_url(raw: &str, what: &str) -> Result<Url, ConfigError> {
    parse_site_url(raw).map_err(|e| ConfigError::InvalidUrl(format!("{} URL: {}", what, e)))
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact-email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
