use crate::config::types::{
    AssetConfig, CandidateSource, Config, CrawlConfig, FieldConfig, SourceConfig,
};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
///
/// Selectors and regular expressions are checked later, when the profile is
/// compiled into an [`crate::extract::ExtractionProfile`].
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_source_config(&config.source)?;
    validate_fields(&config.fields)?;
    if let Some(assets) = &config.assets {
        validate_asset_config(assets, &config.fields)?;
    }
    Ok(())
}

/// Validates crawl loop configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start-page must be >= 1".to_string(),
        ));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    if config.target_records == Some(0) {
        return Err(ConfigError::Validation(
            "target-records must be >= 1 when set".to_string(),
        ));
    }

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-consecutive-failures must be >= 1, got {}",
            config.max_consecutive_failures
        )));
    }

    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    Ok(())
}

/// Validates the page URL template and first-page override
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let template = &config.url_template;
    if !template.contains("{page}") && !template.contains("{offset}") {
        return Err(ConfigError::InvalidTemplate(format!(
            "'{}' must contain a {{page}} or {{offset}} placeholder",
            template
        )));
    }

    let sample = template.replace("{page}", "1").replace("{offset}", "0");
    Url::parse(&sample)
        .map_err(|e| ConfigError::InvalidTemplate(format!("'{}': {}", template, e)))?;

    if let Some(first) = &config.first_page_url {
        Url::parse(first).map_err(|e| {
            ConfigError::InvalidTemplate(format!("first-page-url '{}': {}", first, e))
        })?;
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(
            "page-size must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates field declarations
fn validate_fields(fields: &[FieldConfig]) -> Result<(), ConfigError> {
    if fields.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[fields]] entry is required".to_string(),
        ));
    }

    if !fields.iter().any(|f| f.mandatory) {
        return Err(ConfigError::Validation(
            "at least one field must set mandatory = true".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "field name cannot be empty".to_string(),
            ));
        }

        if field.name == "source_page" {
            return Err(ConfigError::Validation(
                "'source_page' is reserved for provenance".to_string(),
            ));
        }

        if let Some(other) = &field.distinct_from {
            if !seen.contains(other.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "field '{}' is distinct-from '{}', which is not declared before it",
                    field.name, other
                )));
            }
        }

        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate field name '{}'",
                field.name
            )));
        }

        if field.candidates.is_empty() {
            return Err(ConfigError::Validation(format!(
                "field '{}' has no candidates",
                field.name
            )));
        }

        for candidate in &field.candidates {
            if candidate.from == CandidateSource::Element && candidate.selector.is_none() {
                return Err(ConfigError::Validation(format!(
                    "field '{}' has an element candidate without a selector",
                    field.name
                )));
            }
        }
    }

    Ok(())
}

/// Validates asset download configuration against the declared fields
fn validate_asset_config(
    assets: &AssetConfig,
    fields: &[FieldConfig],
) -> Result<(), ConfigError> {
    for name in [&assets.url_field, &assets.name_field] {
        if !fields.iter().any(|f| &f.name == name) {
            return Err(ConfigError::Validation(format!(
                "assets refer to undeclared field '{}'",
                name
            )));
        }
    }

    if assets.directory.is_empty() {
        return Err(ConfigError::Validation(
            "assets directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
