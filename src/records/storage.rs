use super::types::SavedRecord;
use crate::grading::aggregate;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Get the default record file path (~/.config/gpa-calc/records.json)
pub fn get_records_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("records.json"))
}

/// Load saved records from a JSON file
///
/// If the file doesn't exist, returns an empty list. Summaries are recomputed
/// from the validated courses.
pub fn load_records(path: &Path) -> Result<Vec<SavedRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open record file at {}", path.display()))?;

    let mut records: Vec<SavedRecord> = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load saved records from {}", path.display()))?;

    // courses are rebuilt on read, so the stored summary may be stale
    for record in &mut records {
        record.summary = Some(aggregate(&record.courses));
    }

    Ok(records)
}

/// Save the whole record list to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_records(path: &Path, records: &[SavedRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create record directory at {}", parent.display())
            })?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, records).context("Failed to serialize saved records")?;

    file.commit().context("Failed to save records")?;

    Ok(())
}
