pub mod engine;
pub mod scale;
pub mod types;

pub use engine::{aggregate, filter_by_category, resolve_course, resolve_rows, Distribution, GpaSummary};
pub use scale::{conversion_chart, resolve, resolve_with, ChartRow, GradeToken, UnresolvedLetterPolicy};
pub use types::{Category, CategoryFilter, Course, RawCourse, StoredCourse};
