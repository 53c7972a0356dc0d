//! Course sheets: the rows a user would otherwise type into the course table.
//!
//! YAML sheets (`.yaml` / `.yml`):
//! ```yaml
//! courses:
//!   - name: Calculus
//!     credit: 3
//!     grade: 92
//!     category: compulsory
//!   - name: Drawing
//!     credit: 2
//!     grade: B-
//!     category: elective
//! ```
//!
//! Any other file is read as tab-separated lines
//! `name<TAB>credit<TAB>grade[<TAB>category]`. Blank lines and lines starting
//! with `#` are skipped.

use anyhow::{Context, Result};
use log::warn;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::grading::{Category, RawCourse};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetFile {
    #[serde(default)]
    courses: Vec<SheetRow>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SheetRow {
    #[serde(default, deserialize_with = "scalar_text")]
    name: String,
    #[serde(default, deserialize_with = "scalar_text")]
    credit: String,
    #[serde(default, deserialize_with = "scalar_text")]
    grade: String,
    #[serde(default)]
    category: Option<String>,
}

/// Read a course sheet from disk, picking the format from the extension.
pub fn load_sheet(path: &Path) -> Result<Vec<RawCourse>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read course sheet at {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        parse_yaml_sheet(&content)
            .with_context(|| format!("Failed to parse course sheet: invalid YAML in {}", path.display()))
    } else {
        Ok(parse_tsv_sheet(&content))
    }
}

pub fn parse_yaml_sheet(content: &str) -> Result<Vec<RawCourse>> {
    let sheet: SheetFile = serde_saphyr::from_str(content)?;
    Ok(sheet
        .courses
        .into_iter()
        .enumerate()
        .map(|(i, row)| RawCourse {
            category: parse_category(row.category.as_deref(), i + 1),
            name: row.name,
            credit: row.credit,
            grade: row.grade,
        })
        .collect())
}

pub fn parse_tsv_sheet(content: &str) -> Vec<RawCourse> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(i, line)| {
            let mut fields = line.split('\t');
            let name = fields.next().unwrap_or_default();
            let credit = fields.next().unwrap_or_default();
            let grade = fields.next().unwrap_or_default();
            let category = parse_category(fields.next(), i + 1);
            RawCourse::new(name.trim(), credit, grade, category)
        })
        .collect()
}

fn parse_category(raw: Option<&str>, line: usize) -> Category {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Category::default(),
        Some(s) => s.parse().unwrap_or_else(|e| {
            warn!("Course sheet row {}: {}; using {}", line, e, Category::default());
            Category::default()
        }),
    }
}

/// Accept a YAML scalar of any type as its text, so `credit: 3` and
/// `credit: "3"` read the same.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarText;

    impl Visitor<'_> for ScalarText {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(ScalarText)
}
