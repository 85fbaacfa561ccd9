//! A student's ranked course choice.

use serde::{Deserialize, Serialize};

/// One entry of a student's preference list.
///
/// `priority` starts at 1 (most preferred). Within one student's list,
/// priorities are exactly `1..=N` and no course appears twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preference {
    pub student_id: u64,
    pub course_id: u64,
    pub priority: u32,

    /// Submission timestamp in milliseconds
    #[serde(default)]
    pub submitted_at: u64,
}

impl Preference {
    pub fn new(student_id: u64, course_id: u64, priority: u32, submitted_at: u64) -> Self {
        Self {
            student_id,
            course_id,
            priority,
            submitted_at,
        }
    }
}
