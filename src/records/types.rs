use chrono::{DateTime, Local};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::grading::{aggregate, Course, GpaSummary, StoredCourse};

/// Display format for record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// A named snapshot of a course list. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecord {
    pub id: i64,
    pub timestamp: String,
    #[serde(deserialize_with = "valid_courses")]
    pub courses: Vec<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<GpaSummary>,
}

impl SavedRecord {
    pub fn new(id: i64, created_at: DateTime<Local>, courses: &[Course]) -> Self {
        Self {
            id,
            timestamp: created_at.format(TIMESTAMP_FORMAT).to_string(),
            courses: courses.to_vec(),
            summary: Some(aggregate(courses)),
        }
    }

    /// Stored summary, or one computed from the courses for records saved
    /// without it.
    pub fn summary_or_compute(&self) -> GpaSummary {
        self.summary
            .clone()
            .unwrap_or_else(|| aggregate(&self.courses))
    }
}

/// Read a stored course list, dropping courses that no longer validate.
fn valid_courses<'de, D>(deserializer: D) -> Result<Vec<Course>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = Vec::<StoredCourse>::deserialize(deserializer)?;
    Ok(stored
        .into_iter()
        .filter_map(|course| match Course::try_from(course) {
            Ok(course) => Some(course),
            Err(e) => {
                warn!("Dropping saved course: {}", e);
                None
            }
        })
        .collect())
}
