//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required fields are present and non-empty
//! - Upstream host parses as an HTTP target
//! - Every rewrite pattern compiles
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::proxy::director::UpstreamTarget;
use crate::rewrite::rules::Rule;

/// A single semantic problem with a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("`{0}` is required and must not be empty")]
    MissingField(&'static str),

    #[error("`proxy-host` value `{value}` is invalid: {reason}")]
    InvalidProxyHost { value: String, reason: String },

    #[error("rewrite pattern `{pattern}` does not compile: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("proxy-host", &config.proxy_host),
        ("port", &config.port),
        ("static-dir-url-root", &config.static_dir_url_root),
        ("static-dir-root", &config.static_dir_root),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::MissingField(name));
        }
    }

    if !config.proxy_host.trim().is_empty() {
        if let Err(e) = UpstreamTarget::parse(&config.proxy_host) {
            errors.push(ValidationError::InvalidProxyHost {
                value: config.proxy_host.clone(),
                reason: e.to_string(),
            });
        }
    }

    for rule in config.regex_find_replace.to_ordered() {
        if let Err(e) = Rule::new(&rule.find, rule.replace) {
            errors.push(ValidationError::InvalidPattern {
                pattern: e.pattern,
                reason: e.source.to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RewriteRule;

    fn valid_config() -> ProxyConfig {
        ProxyConfig {
            proxy_host: "localhost:9595".into(),
            port: ":8080".into(),
            static_dir_url_root: "/public".into(),
            static_dir_root: "./public".into(),
            regex_find_replace: vec![RewriteRule::new("A", "a")].into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_rewrite_rules_are_optional() {
        let mut config = valid_config();
        config.regex_find_replace = Default::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_missing_field() {
        let errors = validate_config(&ProxyConfig::default()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingField("proxy-host"),
                ValidationError::MissingField("port"),
                ValidationError::MissingField("static-dir-url-root"),
                ValidationError::MissingField("static-dir-root"),
            ]
        );
    }

    #[test]
    fn test_bad_pattern_reported_with_other_errors() {
        let mut config = valid_config();
        config.static_dir_root = String::new();
        config.regex_find_replace = vec![
            RewriteRule::new("fine", "x"),
            RewriteRule::new("(unclosed", "y"),
        ]
        .into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], ValidationError::MissingField("static-dir-root"));
        assert!(matches!(
            &errors[1],
            ValidationError::InvalidPattern { pattern, .. } if pattern == "(unclosed"
        ));
    }

    #[test]
    fn test_https_upstream_rejected() {
        let mut config = valid_config();
        config.proxy_host = "https://backend:443".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(&errors[0], ValidationError::InvalidProxyHost { .. }));
    }
}
