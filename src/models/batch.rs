//! Batch (student group) model.

use serde::{Deserialize, Serialize};

use super::{BatchId, DepartmentId};

/// A group of students that shares one weekly timetable.
///
/// Belongs to exactly one department and semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch identifier.
    pub id: BatchId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Owning department.
    pub department_id: DepartmentId,
    /// Semester number.
    #[serde(default)]
    pub semester: u32,
    /// Headcount.
    #[serde(default)]
    pub strength: u32,
}

impl Batch {
    /// Creates a new batch.
    pub fn new(id: BatchId, department_id: DepartmentId, semester: u32) -> Self {
        Self {
            id,
            name: String::new(),
            department_id,
            semester,
            strength: 0,
        }
    }

    /// Sets the batch name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the headcount.
    pub fn with_strength(mut self, strength: u32) -> Self {
        self.strength = strength;
        self
    }
}
