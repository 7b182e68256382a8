//! Scheduler input snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    Batch, Classroom, ConstraintSet, Faculty, FacultyId, FacultySubject, Subject, TimePreference,
};

/// Everything one scheduling run reads, captured once up front.
///
/// Supplied by the surrounding data layer; the scheduler never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleInput {
    /// Subjects to place.
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Teaching staff.
    #[serde(default)]
    pub faculty: Vec<Faculty>,
    /// Authoritative "can teach" relation.
    #[serde(default)]
    pub faculty_subjects: Vec<FacultySubject>,
    /// Rooms.
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    /// Student groups.
    #[serde(default)]
    pub batches: Vec<Batch>,
    /// Average leaves per month (overrides `Faculty::avg_leaves_per_month`).
    #[serde(default)]
    pub faculty_leaves: BTreeMap<FacultyId, f64>,
    /// Slots faculty would like kept free.
    #[serde(default)]
    pub time_preferences: Vec<TimePreference>,
    /// Week shape and limits.
    #[serde(default)]
    pub constraints: ConstraintSet,
}

impl ScheduleInput {
    /// Creates an empty input with default constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a faculty member.
    pub fn with_faculty(mut self, faculty: Faculty) -> Self {
        self.faculty.push(faculty);
        self
    }

    /// Adds a "can teach" link.
    pub fn with_eligibility(mut self, faculty_id: FacultyId, subject_id: super::SubjectId) -> Self {
        self.faculty_subjects
            .push(FacultySubject::new(faculty_id, subject_id));
        self
    }

    /// Adds a room.
    pub fn with_classroom(mut self, classroom: Classroom) -> Self {
        self.classrooms.push(classroom);
        self
    }

    /// Adds a batch.
    pub fn with_batch(mut self, batch: Batch) -> Self {
        self.batches.push(batch);
        self
    }

    /// Records a faculty member's average leaves per month.
    pub fn with_leave_rate(mut self, faculty_id: FacultyId, leaves_per_month: f64) -> Self {
        self.faculty_leaves.insert(faculty_id, leaves_per_month);
        self
    }

    /// Adds a keep-free preference.
    pub fn with_time_preference(mut self, preference: TimePreference) -> Self {
        self.time_preferences.push(preference);
        self
    }

    /// Replaces the constraint set.
    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }
}
