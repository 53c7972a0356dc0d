use serde::{Deserialize, Serialize};

use crate::calculator::AngleMode;
use crate::grading::UnresolvedLetterPolicy;

/// Contents of `~/.config/gpa-calc/config.yaml`. Every key is optional.
///
/// Example YAML:
/// ```yaml
/// records_path: ~/grades/records.json
/// default_scope: compulsory
/// unresolved_letter: exclude
/// angle_mode: radians
/// color: never
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where saved records live (default: ~/.config/gpa-calc/records.json)
    #[serde(default)]
    pub records_path: Option<String>,

    /// Category filter used by `calc` when `--scope` is not given
    /// One of: all, compulsory, major, elective
    #[serde(default)]
    pub default_scope: Option<String>,

    /// How letter grades missing from the table are treated
    #[serde(default)]
    pub unresolved_letter: Option<UnresolvedLetterPolicy>,

    /// Angle unit for trigonometric functions
    #[serde(default)]
    pub angle_mode: Option<AngleMode>,

    #[serde(default)]
    pub color: Option<ColorMode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}
