pub mod storage;
pub mod store;
pub mod types;

pub use storage::{get_records_path, load_records, save_records};
pub use store::{dedup_courses, RecordStore};
pub use types::{SavedRecord, TIMESTAMP_FORMAT};
