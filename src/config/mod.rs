mod schema;
mod validation;

pub use schema::{ColorMode, Config};
pub use validation::validate_config;

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calculator::AngleMode;
use crate::grading::{CategoryFilter, UnresolvedLetterPolicy};

/// Get the config directory path (~/.config/gpa-calc/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("gpa-calc"))
}

/// Get the default config file path (~/.config/gpa-calc/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/gpa-calc/config.yaml)
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
///
/// A missing file at the default location yields the default configuration.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (get_config_path()?, false),
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        debug!("No config at {}, using defaults", config_path.display());
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config = parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_saphyr::from_str(content)?)
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir()
            .context("Could not determine home directory")?
            .join(rest)),
        None => Ok(Path::new(path).to_path_buf()),
    }
}

impl Config {
    /// Record file location, falling back to ~/.config/gpa-calc/records.json
    pub fn records_path(&self) -> Result<PathBuf> {
        match self.records_path {
            Some(ref path) => expand_home(path.trim()),
            None => crate::records::get_records_path(),
        }
    }

    /// Configured default scope; `all` when unset. Assumes the config was
    /// validated.
    pub fn scope(&self) -> CategoryFilter {
        self.default_scope
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn letter_policy(&self) -> UnresolvedLetterPolicy {
        self.unresolved_letter.unwrap_or_default()
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode.unwrap_or_default()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Category;
    use std::env;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
records_path: /tmp/gpa-records.json
default_scope: compulsory
unresolved_letter: treat_as_fail
angle_mode: radians
color: never
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.records_path().unwrap(), PathBuf::from("/tmp/gpa-records.json"));
        assert_eq!(config.scope(), CategoryFilter::Only(Category::Compulsory));
        assert_eq!(config.letter_policy(), UnresolvedLetterPolicy::TreatAsFail);
        assert_eq!(config.angle_mode(), AngleMode::Radians);
        assert_eq!(config.color_mode(), ColorMode::Never);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scope(), CategoryFilter::All);
        assert_eq!(config.letter_policy(), UnresolvedLetterPolicy::Exclude);
        assert_eq!(config.angle_mode(), AngleMode::Degrees);
        assert_eq!(config.color_mode(), ColorMode::Auto);
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config("angle_mode: degrees\n").unwrap();
        assert!(config.records_path.is_none());
        assert_eq!(config.angle_mode, Some(AngleMode::Degrees));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_config("grading_scale: us\n").is_err());
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(parse_config("unresolved_letter: guess\n").is_err());
    }

    #[test]
    fn test_home_expansion() {
        let config = Config {
            records_path: Some("~/grades/records.json".to_string()),
            ..Config::default()
        };
        let path = config.records_path().unwrap();
        assert!(path.ends_with("grades/records.json"));
        assert!(!path.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_load_explicit_missing_path_errors() {
        let path = env::temp_dir().join("gpa_calc_test_no_config.yaml");
        let _ = fs::remove_file(&path);
        assert!(load_config(Some(path)).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let path = env::temp_dir().join("gpa_calc_test_config.yaml");
        fs::write(&path, "default_scope: elective\n").unwrap();

        let config = load_config(Some(path.clone())).unwrap();
        assert_eq!(config.scope(), CategoryFilter::Only(Category::Elective));

        let _ = fs::remove_file(&path);
    }
}
