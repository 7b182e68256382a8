//! Faculty model.
//!
//! Faculty members teach subjects. Which subjects a member may teach is
//! given by explicit [`FacultySubject`] links, not by department membership.

use serde::{Deserialize, Serialize};

use super::{DepartmentId, FacultyId, SubjectId};

/// A teaching faculty member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    /// Unique faculty identifier.
    pub id: FacultyId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Institutional employee number.
    #[serde(default)]
    pub employee_id: String,
    /// Home department.
    pub department_id: DepartmentId,
    /// Teaching hours per day. `None` falls back to the constraint set's
    /// `max_hours_per_faculty`.
    #[serde(default)]
    pub max_hours_per_day: Option<u32>,
    /// Average leave days per month. Reduces effective availability.
    #[serde(default)]
    pub avg_leaves_per_month: Option<f64>,
}

/// A "can teach" link between a faculty member and a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacultySubject {
    /// Faculty member.
    pub faculty_id: FacultyId,
    /// Subject they are eligible to teach.
    pub subject_id: SubjectId,
}

impl Faculty {
    /// Creates a new faculty member.
    pub fn new(id: FacultyId, department_id: DepartmentId) -> Self {
        Self {
            id,
            name: String::new(),
            employee_id: String::new(),
            department_id,
            max_hours_per_day: None,
            avg_leaves_per_month: None,
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the employee number.
    pub fn with_employee_id(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = employee_id.into();
        self
    }

    /// Sets the daily teaching-hour limit.
    pub fn with_max_hours_per_day(mut self, hours: u32) -> Self {
        self.max_hours_per_day = Some(hours);
        self
    }

    /// Sets the average leave days per month.
    pub fn with_avg_leaves(mut self, leaves_per_month: f64) -> Self {
        self.avg_leaves_per_month = Some(leaves_per_month);
        self
    }
}

impl FacultySubject {
    /// Creates an eligibility link.
    pub fn new(faculty_id: FacultyId, subject_id: SubjectId) -> Self {
        Self {
            faculty_id,
            subject_id,
        }
    }
}
