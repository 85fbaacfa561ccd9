//! Advisory suitability scoring.
//!
//! Scores are shown to students while they rank courses. The allocation
//! engine never consults them. Any model can be plugged in through
//! [`AdvisoryScorer`]; a scorer that cannot judge a pair returns `None` and
//! the pair is left out of the recommendations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Course, Student};

pub const HIGHLY_RECOMMENDED: &str = "Highly Recommended";
pub const GOOD_FIT: &str = "Good Fit";
pub const CHALLENGING: &str = "Challenging";

/// Source of raw suitability scores on a 0 to 100 scale.
pub trait AdvisoryScorer {
    fn score_student_course(&self, student: &Student, course: &Course) -> Option<f64>;
}

impl<F> AdvisoryScorer for F
where
    F: Fn(&Student, &Course) -> Option<f64>,
{
    fn score_student_course(&self, student: &Student, course: &Course) -> Option<f64> {
        self(student, course)
    }
}

/// Scorer used when no model is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoModel;

impl AdvisoryScorer for NoModel {
    fn score_student_course(&self, _student: &Student, _course: &Course) -> Option<f64> {
        None
    }
}

/// A labelled suitability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suitability {
    /// Clamped to 0..=100 and rounded to one decimal
    pub score: f64,
    pub label: String,
}

impl Suitability {
    /// Wrap a raw score. Returns `None` for NaN.
    pub fn from_raw(raw: f64) -> Option<Self> {
        if raw.is_nan() {
            return None;
        }
        let clamped = raw.clamp(0.0, 100.0);
        Some(Self {
            score: (clamped * 10.0).round() / 10.0,
            label: label_for(clamped).to_string(),
        })
    }
}

/// Label for a clamped score
pub fn label_for(score: f64) -> &'static str {
    if score >= 75.0 {
        HIGHLY_RECOMMENDED
    } else if score >= 50.0 {
        GOOD_FIT
    } else {
        CHALLENGING
    }
}

/// Score one pair
pub fn suitability<S: AdvisoryScorer + ?Sized>(
    scorer: &S,
    student: &Student,
    course: &Course,
) -> Option<Suitability> {
    scorer
        .score_student_course(student, course)
        .and_then(Suitability::from_raw)
}

/// Score every course for a student, keyed by course id.
/// Courses the scorer cannot judge are omitted.
pub fn recommendations_for<'c, S, I>(scorer: &S, student: &Student, courses: I) -> BTreeMap<u64, Suitability>
where
    S: AdvisoryScorer + ?Sized,
    I: IntoIterator<Item = &'c Course>,
{
    courses
        .into_iter()
        .filter_map(|course| suitability(scorer, student, course).map(|s| (course.id, s)))
        .collect()
}
