use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::scale::{self, UnresolvedLetterPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Compulsory,
    Major,
    Elective,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Compulsory => "compulsory",
            Category::Major => "major",
            Category::Elective => "elective",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compulsory" => Ok(Category::Compulsory),
            "major" => Ok(Category::Major),
            "elective" => Ok(Category::Elective),
            other => bail!(
                "Unknown course category '{}' (expected compulsory, major or elective)",
                other
            ),
        }
    }
}

/// Which courses take part in a GPA calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(s.parse()?))
        }
    }
}

/// One row of the course table before any parsing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCourse {
    pub name: String,
    pub credit: String,
    pub grade: String,
    pub category: Category,
}

impl RawCourse {
    pub fn new(name: &str, credit: &str, grade: &str, category: Category) -> Self {
        Self {
            name: name.to_string(),
            credit: credit.to_string(),
            grade: grade.to_string(),
            category,
        }
    }
}

/// A course whose grade resolved to grade points.
///
/// `gpa` is derived from `grade` when the course is built and has no setter.
/// Deserialized courses are rebuilt from their credit and grade; the stored
/// `gpa` is only used to recognize courses saved under
/// [`UnresolvedLetterPolicy::TreatAsFail`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredCourse")]
pub struct Course {
    name: String,
    credit: f64,
    grade: String,
    gpa: f64,
    category: Category,
}

/// A course as written to disk, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredCourse {
    #[serde(default)]
    pub name: String,
    pub credit: f64,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default, alias = "type")]
    pub category: Category,
}

impl TryFrom<StoredCourse> for Course {
    type Error = anyhow::Error;

    fn try_from(stored: StoredCourse) -> anyhow::Result<Self> {
        let build = |policy: UnresolvedLetterPolicy| {
            Course::new(
                &stored.name,
                stored.credit,
                &stored.grade,
                stored.category,
                policy,
            )
        };

        // an unknown letter only counts as F if it was saved that way
        let course = build(UnresolvedLetterPolicy::Exclude).or_else(|| {
            if stored.gpa == Some(0.0) {
                build(UnresolvedLetterPolicy::TreatAsFail)
            } else {
                None
            }
        });

        course.ok_or_else(|| {
            anyhow!(
                "course '{}' with credit {} and grade '{}' is not valid",
                stored.name,
                stored.credit,
                stored.grade
            )
        })
    }
}

impl Course {
    /// Build a course, deriving its grade points. Returns `None` when the
    /// credit is negative or not finite, or the grade does not resolve.
    pub fn new(
        name: impl Into<String>,
        credit: f64,
        grade: &str,
        category: Category,
        policy: UnresolvedLetterPolicy,
    ) -> Option<Self> {
        if !credit.is_finite() || credit < 0.0 {
            return None;
        }
        let gpa = scale::resolve_with(grade, policy)?;
        Some(Self {
            name: name.into(),
            // normalizes -0.0
            credit: credit + 0.0,
            grade: grade.trim().to_string(),
            gpa,
            category,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credit(&self) -> f64 {
        self.credit
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn gpa(&self) -> f64 {
        self.gpa
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Weighted contribution of this course: credit times grade points.
    pub fn grade_points(&self) -> f64 {
        self.credit * self.gpa
    }
}
