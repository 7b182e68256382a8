//! Subject model.
//!
//! A subject is a course taught to a batch some number of times per week.
//! Its type decides which kind of room it needs.

use serde::{Deserialize, Serialize};

use super::{DepartmentId, RoomType, SubjectId};

/// A subject to be placed into the weekly grid.
///
/// `classes_per_week` is the number of grid cells the subject must occupy
/// for every batch of its department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: SubjectId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Short course code (e.g., "CS101").
    #[serde(default)]
    pub code: String,
    /// Owning department.
    pub department_id: DepartmentId,
    /// Lecture or lab.
    pub subject_type: SubjectType,
    /// Weekly class target per batch.
    pub classes_per_week: u32,
}

/// Subject classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    /// Lecture-style subject, held in a regular classroom.
    Theory,
    /// Practical subject, held in a lab.
    Lab,
}

impl SubjectType {
    /// Room type a subject of this kind must be placed in.
    pub fn required_room(self) -> RoomType {
        match self {
            SubjectType::Theory => RoomType::Classroom,
            SubjectType::Lab => RoomType::Lab,
        }
    }
}

impl Subject {
    /// Creates a new subject.
    pub fn new(
        id: SubjectId,
        department_id: DepartmentId,
        subject_type: SubjectType,
        classes_per_week: u32,
    ) -> Self {
        Self {
            id,
            name: String::new(),
            code: String::new(),
            department_id,
            subject_type,
            classes_per_week,
        }
    }

    /// Creates a theory subject.
    pub fn theory(id: SubjectId, department_id: DepartmentId, classes_per_week: u32) -> Self {
        Self::new(id, department_id, SubjectType::Theory, classes_per_week)
    }

    /// Creates a lab subject.
    pub fn lab(id: SubjectId, department_id: DepartmentId, classes_per_week: u32) -> Self {
        Self::new(id, department_id, SubjectType::Lab, classes_per_week)
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the course code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Whether this is a theory subject.
    #[inline]
    pub fn is_theory(&self) -> bool {
        self.subject_type == SubjectType::Theory
    }
}
