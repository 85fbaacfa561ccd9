//! JSON cohort fixtures.
//!
//! A fixture holds everything one allocation run needs: cohorts, courses
//! (optionally with explicit seat counts), pool membership, students and
//! their ranked course lists.
//!
//! ```json
//! {
//!   "cohorts":  [{ "id": 1, "name": "BSc 2024" }],
//!   "courses":  [{ "id": 10, "code": "PH-E1", "name": "Optics", "department_id": 2,
//!                  "max_capacity": 10, "reserved_percent": "50",
//!                  "seats": { "General": 5, "SC": 2, "ST": 1, "OBC": 1, "EWS": 1 } }],
//!   "pool":     [{ "course_id": 10, "cohort_id": 1 }],
//!   "students": [{ "id": 1, "cohort_id": 1, "department_id": 1,
//!                  "qualifying_marks": "88.5", "category": "SC" }],
//!   "preferences": [{ "student_id": 1, "courses": [10] }]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::store::Database;
use crate::types::{Category, Cohort, Course, PoolEntry, Student};

fn default_active() -> bool {
    true
}

/// Course entry of a fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFixture {
    pub id: u64,
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub department_id: u64,
    pub max_capacity: u32,
    #[serde(default)]
    pub reserved_percent: Decimal,
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Explicit seat counts replacing the derived matrix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<BTreeMap<Category, u32>>,
}

impl CourseFixture {
    fn to_course(&self) -> Course {
        let mut course = Course::new(
            self.id,
            &self.code,
            self.name.clone(),
            self.department_id,
            self.max_capacity,
            self.reserved_percent,
        );
        course.is_active = self.is_active;
        course
    }
}

/// A student's ranked list, most preferred first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceFixture {
    pub student_id: u64,
    #[serde(default)]
    pub courses: Vec<u64>,
    #[serde(default)]
    pub submitted_at: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub cohorts: Vec<Cohort>,
    pub courses: Vec<CourseFixture>,
    pub pool: Vec<PoolEntry>,
    pub students: Vec<Student>,
    pub preferences: Vec<PreferenceFixture>,
}

impl Fixture {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// First cohort id, used when the caller does not pick one
    pub fn first_cohort(&self) -> Option<u64> {
        self.cohorts.first().map(|c| c.id)
    }

    /// Load every record into `db`, validating as the entry points do.
    ///
    /// Stops at the first invalid record; records loaded before it stay.
    pub fn load_into(&self, db: &Database) -> Result<()> {
        for cohort in &self.cohorts {
            db.insert_cohort(cohort.clone())?;
        }
        for entry in &self.courses {
            db.insert_course(entry.to_course())?;
            if let Some(seats) = &entry.seats {
                db.override_seats(entry.id, seats.iter().map(|(c, n)| (*c, *n)))?;
            }
        }
        for entry in &self.pool {
            db.add_to_pool(entry.course_id, entry.cohort_id)?;
            if !entry.is_active {
                db.remove_from_pool(entry.course_id, entry.cohort_id)?;
            }
        }
        for student in &self.students {
            db.insert_student(student.clone())?;
        }
        for prefs in &self.preferences {
            db.submit_preferences(prefs.student_id, &prefs.courses, prefs.submitted_at)?;
        }
        debug!(
            cohorts = self.cohorts.len(),
            courses = self.courses.len(),
            students = self.students.len(),
            "fixture loaded"
        );
        Ok(())
    }

    /// Small cohort exercising every branch of the matcher.
    ///
    /// - `PH-E1` has 10 seats: General 5, SC 2, ST 1, OBC 1, EWS 1
    /// - `CH-E2` has 2 seats, both General
    /// - five General students (90..70) and one SC student (60) rank PH-E1 first
    /// - a General student at 50 ranks only PH-E1 and is waitlisted
    /// - an ST student at 45 ranks only CH-E2; with no ST bucket there, the
    ///   seat comes through General overflow
    /// - one student submits nothing
    pub fn demo() -> Self {
        let mut fixture = Fixture {
            cohorts: vec![Cohort::new(1, "BSc Computer Science 2024")],
            courses: vec![
                CourseFixture {
                    id: 10,
                    code: "PH-E1".to_string(),
                    name: "Introduction to Optics".to_string(),
                    department_id: 2,
                    max_capacity: 10,
                    reserved_percent: Decimal::from(50),
                    is_active: true,
                    seats: Some(BTreeMap::from([
                        (Category::General, 5),
                        (Category::Sc, 2),
                        (Category::St, 1),
                        (Category::Obc, 1),
                        (Category::Ews, 1),
                    ])),
                },
                CourseFixture {
                    id: 11,
                    code: "CH-E2".to_string(),
                    name: "Chemistry of Materials".to_string(),
                    department_id: 3,
                    max_capacity: 2,
                    reserved_percent: Decimal::ZERO,
                    is_active: true,
                    seats: None,
                },
            ],
            pool: vec![PoolEntry::new(10, 1), PoolEntry::new(11, 1)],
            ..Fixture::default()
        };

        let roster = [
            (1, 90, Category::General, vec![10, 11]),
            (2, 85, Category::General, vec![10, 11]),
            (3, 80, Category::General, vec![10]),
            (4, 75, Category::General, vec![10]),
            (5, 70, Category::General, vec![10]),
            (6, 60, Category::Sc, vec![10]),
            (7, 50, Category::General, vec![10]),
            (8, 45, Category::St, vec![11]),
            (9, 40, Category::Obc, vec![]),
        ];
        for (id, marks, category, courses) in roster {
            fixture.students.push(
                Student::new(id, 1, 1, Decimal::from(marks), category)
                    .with_name(format!("Student {id}")),
            );
            fixture.preferences.push(PreferenceFixture {
                student_id: id,
                courses,
                submitted_at: 0,
            });
        }
        fixture
    }
}
