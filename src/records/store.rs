use anyhow::{bail, Result};
use chrono::Local;
use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::storage::{load_records, save_records};
use super::types::SavedRecord;
use crate::grading::Course;

/// Owner of all saved records and of their ids.
///
/// Every mutation rewrites the whole list to the backing file, if there is
/// one. A single writer is assumed.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<SavedRecord>,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// Open the store backed by `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let records = load_records(path)?;
        debug!("Loaded {} saved records from {}", records.len(), path.display());
        Ok(Self {
            records,
            path: Some(path.to_path_buf()),
        })
    }

    /// A store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            records: Vec::new(),
            path: None,
        }
    }

    /// Snapshot `courses` as a new record and persist the list. An empty
    /// course list is refused.
    pub fn save(&mut self, courses: &[Course]) -> Result<SavedRecord> {
        if courses.is_empty() {
            bail!("No course data to save");
        }

        let now = Local::now();
        let id = self.next_id(now.timestamp_millis());
        let record = SavedRecord::new(id, now, courses);

        self.records.push(record.clone());
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        info!("Saved record {} with {} courses", id, courses.len());
        Ok(record)
    }

    /// All records in save order.
    pub fn list(&self) -> &[SavedRecord] {
        &self.records
    }

    pub fn load_by_id(&self, id: i64) -> Option<&SavedRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Remove the record with `id`. Returns false, without touching the
    /// backing file, when there is no such record.
    pub fn delete_by_id(&mut self, id: i64) -> Result<bool> {
        let Some(index) = self.records.iter().position(|record| record.id == id) else {
            debug!("No record with id {}; nothing to delete", id);
            return Ok(false);
        };

        let removed = self.records.remove(index);
        if let Err(e) = self.persist() {
            self.records.insert(index, removed);
            return Err(e);
        }

        info!("Deleted record {}", id);
        Ok(true)
    }

    /// `base` followed by the courses of every selected record, in store
    /// order, with duplicates removed.
    pub fn merge_selected(&self, base: &[Course], selected_ids: &[i64]) -> Vec<Course> {
        let selected: HashSet<i64> = selected_ids.iter().copied().collect();
        let picked = self
            .records
            .iter()
            .filter(|record| selected.contains(&record.id))
            .flat_map(|record| record.courses.iter());

        let merged = dedup_courses(base.iter().chain(picked));
        debug!(
            "Merged {} base courses with {} records into {} courses",
            base.len(),
            selected.len(),
            merged.len()
        );
        merged
    }

    // Ids come from the clock but must keep increasing even within one tick.
    fn next_id(&self, now_ms: i64) -> i64 {
        match self.records.iter().map(|record| record.id).max() {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        }
    }

    fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => save_records(path, &self.records),
            None => Ok(()),
        }
    }
}

/// Keep the first course for each (name, grade, credit); later duplicates are
/// dropped along with their category.
pub fn dedup_courses<'a>(courses: impl IntoIterator<Item = &'a Course>) -> Vec<Course> {
    let mut seen = HashSet::new();
    courses
        .into_iter()
        .filter(|course| {
            seen.insert((
                course.name().to_string(),
                course.grade().to_string(),
                course.credit().to_bits(),
            ))
        })
        .cloned()
        .collect()
}
