use serde::{Deserialize, Serialize};

/// Letter grades and their grade points, highest first.
const LETTER_POINTS: [(&str, f64); 13] = [
    ("A+", 4.0),
    ("A", 4.0),
    ("A-", 3.7),
    ("B+", 3.3),
    ("B", 3.0),
    ("B-", 2.7),
    ("C+", 2.3),
    ("C", 2.0),
    ("C-", 1.7),
    ("D+", 1.3),
    ("D", 1.0),
    ("D-", 0.7),
    ("F", 0.0),
];

/// Percentage bands as (inclusive lower bound, grade points), highest first.
/// Anything below the last bound is worth 0.0.
const PERCENT_BANDS: [(f64, f64); 9] = [
    (90.0, 4.0),
    (85.0, 3.7),
    (82.0, 3.3),
    (78.0, 3.0),
    (75.0, 2.7),
    (72.0, 2.3),
    (68.0, 2.0),
    (64.0, 1.7),
    (60.0, 1.0),
];

/// What to do with a letter grade that is not in the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedLetterPolicy {
    /// The course cannot be computed and is left out.
    #[default]
    Exclude,
    /// The course counts as a failing grade (0.0).
    TreatAsFail,
}

/// A grade as typed by the user, classified once.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeToken {
    Numeric(f64),
    Letter(String),
}

impl GradeToken {
    /// Classify a raw grade. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        match s.parse::<f64>() {
            // "nan" and "inf" parse as f64 but are not scores
            Ok(value) if value.is_finite() => Some(GradeToken::Numeric(value)),
            _ => Some(GradeToken::Letter(s.to_uppercase())),
        }
    }

    /// Grade points under the canonical policy.
    pub fn points(&self) -> Option<f64> {
        self.points_with(UnresolvedLetterPolicy::Exclude)
    }

    pub fn points_with(&self, policy: UnresolvedLetterPolicy) -> Option<f64> {
        match self {
            GradeToken::Numeric(score) => Some(percent_to_points(*score)),
            GradeToken::Letter(code) => match (letter_to_points(code), policy) {
                (Some(points), _) => Some(points),
                (None, UnresolvedLetterPolicy::Exclude) => None,
                (None, UnresolvedLetterPolicy::TreatAsFail) => Some(0.0),
            },
        }
    }
}

/// Resolve a raw grade to grade points, or `None` if it cannot be computed.
pub fn resolve(raw: &str) -> Option<f64> {
    GradeToken::parse(raw).and_then(|token| token.points())
}

pub fn resolve_with(raw: &str, policy: UnresolvedLetterPolicy) -> Option<f64> {
    GradeToken::parse(raw).and_then(|token| token.points_with(policy))
}

/// Band lookup for percentage scores. Out-of-range scores are not rejected.
pub fn percent_to_points(score: f64) -> f64 {
    PERCENT_BANDS
        .iter()
        .find(|(lower, _)| score >= *lower)
        .map(|(_, points)| *points)
        .unwrap_or(0.0)
}

/// Exact lookup in the letter table; `code` is matched case-insensitively.
pub fn letter_to_points(code: &str) -> Option<f64> {
    LETTER_POINTS
        .iter()
        .find(|(letter, _)| letter.eq_ignore_ascii_case(code))
        .map(|(_, points)| *points)
}

/// All letters in table order with their points.
pub fn letter_table() -> &'static [(&'static str, f64)] {
    &LETTER_POINTS
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub points: f64,
    pub letter: &'static str,
}

/// One row per percentage band, highest band first.
pub fn conversion_chart() -> Vec<ChartRow> {
    const LETTERS: [&str; 10] = ["A", "A-", "B+", "B", "B-", "C+", "C", "C-", "D", "F"];

    let mut rows = Vec::with_capacity(PERCENT_BANDS.len() + 1);
    let mut upper = 100.0;
    for (i, (lower, points)) in PERCENT_BANDS.iter().enumerate() {
        rows.push(ChartRow {
            label: format!("{}-{}", lower, upper),
            points: *points,
            letter: LETTERS[i],
        });
        upper = lower - 1.0;
    }
    rows.push(ChartRow {
        label: format!("0-{}", upper),
        points: 0.0,
        letter: LETTERS[PERCENT_BANDS.len()],
    });
    rows
}
