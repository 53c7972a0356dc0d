pub mod formatter;

pub use formatter::{
    format_conversion_chart, format_course_table, format_credit, format_export_report,
    format_gpa, format_points, format_record_detail, format_record_list, format_resolved_rows,
    format_summary, should_use_colors,
};
