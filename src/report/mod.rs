//! Allocation reporting.
//!
//! [`generate_report`] is a pure read over a committed [`Registry`] view. It
//! walks every student of the cohort, looks up the student's row for the
//! round and tabulates:
//!
//! - overall counts (allocated, waitlisted, no preference)
//! - the same counts per student category
//! - fill counts per course, with the course's name and code
//! - which preference rank was satisfied (1st, 2nd, 3rd, 4th or later)
//!
//! The JSON form is a stable contract:
//!
//! ```text
//! { "cohort_id", "round", "total_students",
//!   "summary": { "allocated", "waitlisted", "no_preference" },
//!   "by_category": { "<label>": { "allocated", "waitlisted", "none" } },
//!   "by_course": { "<id>": { "name", "code", "count" } },
//!   "by_preference_rank": { "1", "2", "3", "4+" } }
//! ```

pub mod queries;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::Registry;
use crate::types::{Allocation, AllocationStatus, Category};

/// Name and code reported for a course id that is no longer registered
pub const UNKNOWN_COURSE_NAME: &str = "Unknown";
pub const UNKNOWN_COURSE_CODE: &str = "N/A";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub allocated: u64,
    pub waitlisted: u64,
    pub no_preference: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub allocated: u64,
    pub waitlisted: u64,
    pub none: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFill {
    pub name: String,
    pub code: String,
    pub count: u64,
}

/// Histogram of the preference rank that was satisfied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankHistogram {
    #[serde(rename = "1")]
    pub first: u64,
    #[serde(rename = "2")]
    pub second: u64,
    #[serde(rename = "3")]
    pub third: u64,
    #[serde(rename = "4+")]
    pub fourth_or_later: u64,
}

impl RankHistogram {
    /// Count one satisfied preference. Rank 0 (unknown) lands in `4+`.
    pub fn record(&mut self, preference_number: u32) {
        match preference_number {
            1 => self.first += 1,
            2 => self.second += 1,
            3 => self.third += 1,
            _ => self.fourth_or_later += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.first + self.second + self.third + self.fourth_or_later
    }
}

/// Tabulated outcome of one cohort round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub cohort_id: u64,
    pub round: u32,
    pub total_students: u64,
    pub summary: ReportSummary,

    /// Only categories present in the cohort appear
    pub by_category: BTreeMap<Category, CategoryBreakdown>,

    /// Only courses with at least one allocated student appear
    pub by_course: BTreeMap<u64, CourseFill>,

    pub by_preference_rank: RankHistogram,
}

impl Report {
    fn empty(cohort_id: u64, round: u32, total_students: u64) -> Self {
        Self {
            cohort_id,
            round,
            total_students,
            summary: ReportSummary::default(),
            by_category: BTreeMap::new(),
            by_course: BTreeMap::new(),
            by_preference_rank: RankHistogram::default(),
        }
    }
}

/// Build the report for a cohort's round from committed state.
///
/// A student without a row counts as `no_preference`. A row with any status
/// other than ALLOCATED counts as waitlisted.
///
/// # Errors
///
/// `NotFound` if the cohort does not exist
pub fn generate_report(registry: &Registry, cohort_id: u64, round: u32) -> Result<Report> {
    registry.require_cohort(cohort_id)?;
    let students = registry.cohort_students(cohort_id);

    let rows: HashMap<u64, &Allocation> = registry
        .cohort_allocations(cohort_id, Some(round))
        .into_iter()
        .map(|row| (row.student_id, row))
        .collect();

    let mut report = Report::empty(cohort_id, round, students.len() as u64);
    for student in students {
        let breakdown = report.by_category.entry(student.category).or_default();

        let Some(row) = rows.get(&student.id) else {
            report.summary.no_preference += 1;
            breakdown.none += 1;
            continue;
        };

        match row.status() {
            AllocationStatus::Allocated => {
                report.summary.allocated += 1;
                breakdown.allocated += 1;

                report
                    .by_course
                    .entry(row.course_id)
                    .or_insert_with(|| match registry.course(row.course_id) {
                        Some(course) => CourseFill {
                            name: course.name.clone(),
                            code: course.code.clone(),
                            count: 0,
                        },
                        None => CourseFill {
                            name: UNKNOWN_COURSE_NAME.to_string(),
                            code: UNKNOWN_COURSE_CODE.to_string(),
                            count: 0,
                        },
                    })
                    .count += 1;

                report.by_preference_rank.record(row.preference_number);
            }
            AllocationStatus::Waitlisted | AllocationStatus::NotAllocated => {
                report.summary.waitlisted += 1;
                breakdown.waitlisted += 1;
            }
        }
    }
    Ok(report)
}
