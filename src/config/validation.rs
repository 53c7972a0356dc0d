use super::schema::Config;
use crate::grading::CategoryFilter;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref scope) = config.default_scope {
        if let Err(e) = scope.parse::<CategoryFilter>() {
            errors.push(format!("default_scope: invalid '{}' - {}", scope, e));
        }
    }

    if let Some(ref path) = config.records_path {
        if path.trim().is_empty() {
            errors.push("records_path: must not be empty".to_string());
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

    #[test]
    fn test_valid_config() {
        let config = Config {
            default_scope: Some("major".to_string()),
            records_path: Some("/tmp/records.json".to_string()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_scope() {
        let config = Config {
            default_scope: Some("sports".to_string()),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].contains("default_scope"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config {
            default_scope: Some("bad".to_string()),
            records_path: Some("  ".to_string()),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
