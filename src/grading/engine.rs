use log::debug;
use serde::{Deserialize, Serialize};

use super::scale::UnresolvedLetterPolicy;
use super::types::{CategoryFilter, Course, RawCourse};

const DEFAULT_NAME_PREFIX: &str = "课程";

/// Course counts per letter band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Distribution {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
    pub f: u32,
}

impl Distribution {
    fn record(&mut self, gpa: f64) {
        if gpa >= 3.7 {
            self.a += 1;
        } else if gpa >= 3.0 {
            self.b += 1;
        } else if gpa >= 2.0 {
            self.c += 1;
        } else if gpa >= 1.0 {
            self.d += 1;
        } else {
            self.f += 1;
        }
    }

    /// Bands as (label, count), best first.
    pub fn bands(&self) -> [(&'static str, u32); 5] {
        [
            ("A", self.a),
            ("B", self.b),
            ("C", self.c),
            ("D", self.d),
            ("F", self.f),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpaSummary {
    pub gpa: f64,
    pub total_credits: f64,
    pub course_count: usize,
    #[serde(default, alias = "gradeDistribution")]
    pub distribution: Distribution,
}

impl GpaSummary {
    pub fn total_grade_points(&self) -> f64 {
        self.gpa * self.total_credits
    }
}

/// Turn one raw row into a course, or `None` if it cannot be computed.
///
/// `ordinal` names the course when the name is blank.
pub fn resolve_course(
    raw: &RawCourse,
    ordinal: usize,
    policy: UnresolvedLetterPolicy,
) -> Option<Course> {
    let credit = match raw.credit.trim().parse::<f64>() {
        Ok(c) if c.is_finite() && c >= 0.0 => c,
        _ => return None,
    };
    if raw.grade.trim().is_empty() {
        return None;
    }

    let name = match raw.name.trim() {
        "" => format!("{}{}", DEFAULT_NAME_PREFIX, ordinal),
        name => name.to_string(),
    };

    Course::new(name, credit, &raw.grade, raw.category, policy)
}

/// Resolve every row in order, leaving out the ones that cannot be computed.
pub fn resolve_rows(rows: &[RawCourse], policy: UnresolvedLetterPolicy) -> Vec<Course> {
    let mut courses = Vec::with_capacity(rows.len());
    for (row_index, raw) in rows.iter().enumerate() {
        match resolve_course(raw, courses.len() + 1, policy) {
            Some(course) => courses.push(course),
            None => debug!(
                "Skipping row {} (credit '{}', grade '{}'): not computable",
                row_index + 1,
                raw.credit,
                raw.grade
            ),
        }
    }
    courses
}

pub fn filter_by_category(courses: &[Course], filter: CategoryFilter) -> Vec<Course> {
    match filter {
        CategoryFilter::All => courses.to_vec(),
        CategoryFilter::Only(category) => courses
            .iter()
            .filter(|course| course.category() == category)
            .cloned()
            .collect(),
    }
}

/// Credit-weighted GPA over `courses`. An empty or zero-credit set yields 0.
pub fn aggregate(courses: &[Course]) -> GpaSummary {
    let mut total_credits = 0.0;
    let mut total_points = 0.0;
    let mut distribution = Distribution::default();

    for course in courses {
        total_credits += course.credit();
        total_points += course.grade_points();
        distribution.record(course.gpa());
    }

    GpaSummary {
        gpa: if total_credits > 0.0 {
            total_points / total_credits
        } else {
            0.0
        },
        total_credits,
        course_count: courses.len(),
        distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Category;

    fn course(name: &str, credit: f64, grade: &str, category: Category) -> Course {
        Course::new(name, credit, grade, category, UnresolvedLetterPolicy::Exclude).unwrap()
    }

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]);
        assert_eq!(summary.gpa, 0.0);
        assert_eq!(summary.total_credits, 0.0);
        assert_eq!(summary.course_count, 0);
        assert_eq!(summary.distribution, Distribution::default());
    }

    #[test]
    fn test_aggregate_weighted_mean() {
        let courses = vec![
            course("Math", 3.0, "A", Category::Compulsory),
            course("Art", 2.0, "C", Category::Elective),
        ];
        let summary = aggregate(&courses);
        // (3 * 4.0 + 2 * 2.0) / 5
        assert!((summary.gpa - 3.2).abs() < 1e-9);
        assert_eq!(summary.total_credits, 5.0);
        assert_eq!(summary.course_count, 2);
        assert!((summary.total_grade_points() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_zero_credits() {
        let courses = vec![course("Seminar", 0.0, "A", Category::Elective)];
        let summary = aggregate(&courses);
        assert_eq!(summary.gpa, 0.0);
        assert_eq!(summary.course_count, 1);
        assert_eq!(summary.distribution.a, 1);
    }

    #[test]
    fn test_aggregate_order_independent() {
        let mut courses = vec![
            course("A1", 3.0, "91", Category::Compulsory),
            course("B1", 1.5, "B+", Category::Major),
            course("C1", 2.0, "70", Category::Elective),
        ];
        let forward = aggregate(&courses);
        courses.reverse();
        let backward = aggregate(&courses);
        assert!((forward.gpa - backward.gpa).abs() < 1e-9);
        assert_eq!(forward.distribution, backward.distribution);
    }

    #[test]
    fn test_distribution_counts_courses_not_credits() {
        let courses = vec![
            course("a", 5.0, "A-", Category::Major),  // 3.7 -> A
            course("b", 1.0, "B", Category::Major),   // 3.0 -> B
            course("c", 1.0, "C", Category::Major),   // 2.0 -> C
            course("d", 1.0, "D", Category::Major),   // 1.0 -> D
            course("f", 1.0, "D-", Category::Major),  // 0.7 -> F
            course("f2", 1.0, "F", Category::Major),  // 0.0 -> F
        ];
        let summary = aggregate(&courses);
        assert_eq!(
            summary.distribution,
            Distribution { a: 1, b: 1, c: 1, d: 1, f: 2 }
        );
    }

    #[test]
    fn test_filter_all_is_identity() {
        let courses = vec![
            course("Math", 3.0, "92", Category::Compulsory),
            course("Art", 2.0, "B-", Category::Elective),
        ];
        assert_eq!(filter_by_category(&courses, CategoryFilter::All), courses);
    }

    #[test]
    fn test_filter_by_category() {
        let courses = vec![
            course("Math", 3.0, "92", Category::Compulsory),
            course("Art", 2.0, "B-", Category::Elective),
            course("Physics", 4.0, "80", Category::Compulsory),
        ];
        let filtered = filter_by_category(&courses, CategoryFilter::Only(Category::Compulsory));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].name(), "Math");
        assert_eq!(filtered[1].name(), "Physics");
        assert!(filter_by_category(&courses, CategoryFilter::Only(Category::Major)).is_empty());
    }

    #[test]
    fn test_compulsory_scenario() {
        let rows = vec![
            RawCourse::new("Math", "3", "92", Category::Compulsory),
            RawCourse::new("Art", "2", "B-", Category::Elective),
        ];
        let courses = resolve_rows(&rows, UnresolvedLetterPolicy::Exclude);
        let filtered = filter_by_category(&courses, CategoryFilter::Only(Category::Compulsory));
        let summary = aggregate(&filtered);
        assert_eq!(summary.gpa, 4.0);
        assert_eq!(summary.total_credits, 3.0);
        assert_eq!(summary.course_count, 1);
    }

    #[test]
    fn test_resolve_rejects_bad_credit() {
        let policy = UnresolvedLetterPolicy::Exclude;
        assert!(resolve_course(&RawCourse::new("X", "", "A", Category::Major), 1, policy).is_none());
        assert!(resolve_course(&RawCourse::new("X", "abc", "A", Category::Major), 1, policy).is_none());
        assert!(resolve_course(&RawCourse::new("X", "-1", "A", Category::Major), 1, policy).is_none());
        assert!(resolve_course(&RawCourse::new("X", "inf", "A", Category::Major), 1, policy).is_none());
    }

    #[test]
    fn test_resolve_rejects_blank_and_unknown_grade() {
        let policy = UnresolvedLetterPolicy::Exclude;
        assert!(resolve_course(&RawCourse::new("X", "3", " ", Category::Major), 1, policy).is_none());
        assert!(resolve_course(&RawCourse::new("X", "3", "Z", Category::Major), 1, policy).is_none());
    }

    #[test]
    fn test_resolve_unknown_letter_as_fail() {
        let raw = RawCourse::new("X", "3", "Z", Category::Major);
        let course = resolve_course(&raw, 1, UnresolvedLetterPolicy::TreatAsFail).unwrap();
        assert_eq!(course.gpa(), 0.0);
    }

    #[test]
    fn test_resolve_rows_default_names() {
        let rows = vec![
            RawCourse::new("", "3", "A", Category::Compulsory),
            RawCourse::new("Broken", "x", "A", Category::Compulsory),
            RawCourse::new("  ", "2", "85", Category::Major),
            RawCourse::new("Named", "1", "B", Category::Elective),
        ];
        let courses = resolve_rows(&rows, UnresolvedLetterPolicy::Exclude);
        let names: Vec<_> = courses.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["课程1", "课程2", "Named"]);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = aggregate(&[course("Math", 3.0, "92", Category::Compulsory)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["gpa"], 4.0);
        assert_eq!(json["totalCredits"], 3.0);
        assert_eq!(json["courseCount"], 1);
        assert_eq!(json["distribution"]["A"], 1);
        assert_eq!(json["distribution"]["F"], 0);
    }

    #[test]
    fn test_summary_reads_legacy_distribution_key() {
        let json = r#"{"gpa":3.5,"totalCredits":4,"courseCount":2,
            "gradeDistribution":{"A":1,"B":1,"C":0,"D":0,"F":0}}"#;
        let summary: GpaSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.distribution.a, 1);
        assert_eq!(summary.distribution.b, 1);
    }
}
