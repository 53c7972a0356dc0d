use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::ColorMode;
use crate::grading::{conversion_chart, scale, CategoryFilter, Course, GpaSummary, RawCourse};
use crate::records::{SavedRecord, TIMESTAMP_FORMAT};

const REPORT_TITLE: &str = "GPA Report";
const NAME_MIN_WIDTH: usize = 12;

/// Decide on colors from the configured mode and whether stdout is a TTY
pub fn should_use_colors(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    }
}

/// Grade points of a single course, one decimal ("3.7")
pub fn format_points(points: f64) -> String {
    format!("{:.1}", points)
}

/// Aggregate GPA, two decimals ("3.48")
pub fn format_gpa(gpa: f64) -> String {
    format!("{:.2}", gpa)
}

/// Credits without a trailing ".0" ("3", "2.5")
pub fn format_credit(credit: f64) -> String {
    credit.to_string()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a course name to fit `max_width` terminal columns. Wide (CJK)
/// characters take two columns.
fn truncate_name(name: &str, max_width: usize) -> String {
    if name.width() <= max_width {
        return name.to_string();
    }

    let (budget, ellipsis) = if max_width > 3 {
        (max_width - 3, "...")
    } else {
        (max_width, "")
    };
    let mut truncated = String::new();
    let mut used = 0;
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        truncated.push(c);
    }
    truncated.push_str(ellipsis);
    truncated
}

fn scope_label(scope: CategoryFilter) -> String {
    match scope {
        CategoryFilter::All => "all courses".to_string(),
        CategoryFilter::Only(category) => format!("{} courses", category),
    }
}

/// Format a GPA result with its distribution
pub fn format_summary(summary: &GpaSummary, scope: CategoryFilter, use_colors: bool) -> String {
    let gpa = format_gpa(summary.gpa);
    let distribution = summary
        .distribution
        .bands()
        .iter()
        .map(|(band, count)| format!("{} {}", band, count))
        .collect::<Vec<_>>()
        .join("  ");

    let header = format!("GPA for {}", scope_label(scope));
    let gpa = if use_colors {
        gpa.red().bold().to_string()
    } else {
        gpa
    };

    format!(
        "{}\n  Courses: {}\n  Credits: {}\n  GPA: {}\n  Grade points: {:.2}\n  Distribution: {}",
        if use_colors { header.bold().to_string() } else { header },
        summary.course_count,
        format_credit(summary.total_credits),
        gpa,
        summary.total_grade_points(),
        distribution
    )
}

/// Format courses as a table with columns: Index, Name, Credit, Grade, Points, Category
pub fn format_course_table(courses: &[Course], use_colors: bool) -> String {
    if courses.is_empty() {
        return "No courses.".to_string();
    }

    // index (4) + credit (6) + grade (7) + points (6) + category (11) + separators
    let fixed_width = 4 + 6 + 7 + 6 + 11 + 2 * 5;
    let name_width = match get_terminal_width() {
        Some(width) if width > fixed_width + NAME_MIN_WIDTH => Some(width - fixed_width),
        Some(_) => Some(NAME_MIN_WIDTH),
        None => None,
    };

    courses
        .iter()
        .enumerate()
        .map(|(idx, course)| {
            let index_str = format!("{:>3}.", idx + 1);
            let name = match name_width {
                Some(width) => truncate_name(course.name(), width),
                None => course.name().to_string(),
            };
            let points = format!("{:>6}", format_points(course.gpa()));
            let line_rest = format!(
                "{:>6}  {:>7}  {}  {}",
                format_credit(course.credit()),
                course.grade(),
                points,
                course.category()
            );

            if use_colors {
                let points_colored = if course.gpa() >= 3.0 {
                    points.green().to_string()
                } else {
                    points.red().to_string()
                };
                format!(
                    "{} {}  {:>6}  {:>7}  {}  {}",
                    index_str.dimmed(),
                    name.bold(),
                    format_credit(course.credit()),
                    course.grade(),
                    points_colored,
                    course.category()
                )
            } else {
                format!("{} {}  {}", index_str, name, line_rest)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per sheet row: the grade points, or "-" when the row cannot be computed
pub fn format_resolved_rows(rows: &[(RawCourse, Option<f64>)], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No rows.".to_string();
    }

    rows.iter()
        .enumerate()
        .map(|(idx, (raw, points))| {
            let shown = points.map(format_points).unwrap_or_else(|| "-".to_string());
            let name = if raw.name.trim().is_empty() {
                "(unnamed)"
            } else {
                raw.name.trim()
            };
            let shown = if use_colors {
                match points {
                    Some(p) if *p >= 3.0 => shown.green().to_string(),
                    Some(_) => shown.red().to_string(),
                    None => shown.dimmed().to_string(),
                }
            } else {
                shown
            };
            format!("{:>3}. {:>4}  {}  ({})", idx + 1, shown, name, raw.grade.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format saved records as one line each: id, timestamp, course count, GPA
pub fn format_record_list(records: &[SavedRecord], use_colors: bool) -> String {
    if records.is_empty() {
        return "No saved records.".to_string();
    }

    records
        .iter()
        .map(|record| {
            let summary = record.summary_or_compute();
            let gpa = format_gpa(summary.gpa);
            if use_colors {
                format!(
                    "{}  {}  {} courses  GPA {}",
                    record.id.dimmed(),
                    record.timestamp.cyan(),
                    record.courses.len(),
                    gpa.bold()
                )
            } else {
                format!(
                    "{}  {}  {} courses  GPA {}",
                    record.id,
                    record.timestamp,
                    record.courses.len(),
                    gpa
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format one saved record with its courses and summary
pub fn format_record_detail(record: &SavedRecord, use_colors: bool) -> String {
    let summary = record.summary_or_compute();
    let header = format!("Record {} ({})", record.id, record.timestamp);
    format!(
        "{}\n{}\n\n{}",
        if use_colors { header.bold().to_string() } else { header },
        format_course_table(&record.courses, use_colors),
        format_summary(&summary, CategoryFilter::All, use_colors)
    )
}

/// Percentage bands and the letter table
pub fn format_conversion_chart(use_colors: bool) -> String {
    let mut lines = vec!["Score    Letter  Points".to_string()];
    for row in conversion_chart() {
        let line = format!("{:<8} {:<7} {}", row.label, row.letter, format_points(row.points));
        lines.push(if use_colors && row.points >= 3.0 {
            line.green().to_string()
        } else {
            line
        });
    }

    lines.push(String::new());
    lines.push("Letter  Points".to_string());
    for (letter, points) in scale::letter_table() {
        lines.push(format!("{:<7} {}", letter, format_points(*points)));
    }
    lines.join("\n")
}

/// Plain-text export: header, one tab-separated line per course, totals
pub fn format_export_report(courses: &[Course], summary: &GpaSummary, generated_at: DateTime<Local>) -> String {
    let mut content = String::new();
    content.push_str(REPORT_TITLE);
    content.push('\n');
    content.push_str(&format!("Generated: {}\n\n", generated_at.format(TIMESTAMP_FORMAT)));
    content.push_str("name\tcredit\tgrade\tgpa\tcategory\n");

    for course in courses {
        content.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\n",
            course.name(),
            format_credit(course.credit()),
            course.grade(),
            format_points(course.gpa()),
            course.category()
        ));
    }

    content.push_str(&format!("\nTotal GPA: {}\n", format_gpa(summary.gpa)));
    content.push_str(&format!("Total credits: {}\n", format_credit(summary.total_credits)));
    content.push_str(&format!("Course count: {}\n", summary.course_count));
    content
}
