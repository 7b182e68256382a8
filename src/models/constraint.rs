//! Timetabling constraints and pinned assignments.
//!
//! The constraint set fixes the shape of the weekly grid (days, time slots,
//! lunch break) and the limits the fitness function checks against. It is
//! supplied once per run and treated as read-only.

use serde::{Deserialize, Serialize};

use super::{BatchId, ClassroomId, FacultyId, SubjectId};

const DEFAULT_DAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const DEFAULT_TIME_SLOTS: [&str; 8] = [
    "9:00-10:00",
    "10:00-11:00",
    "11:00-12:00",
    "12:00-1:00",
    "1:00-2:00",
    "2:00-3:00",
    "3:00-4:00",
    "4:00-5:00",
];

const DEFAULT_LUNCH_BREAK: &str = "12:00-1:00";

/// Run-wide scheduling constraints.
///
/// # Capability flags
///
/// - `enforce_fixed_slots`: fixed slots are written at initialization,
///   protected from mutation, and scored by the fixed-slot rule. When off,
///   fixed slots are validated but otherwise ignored.
/// - `theory_sync`: theory subjects are scheduled once per department slot
///   and mirrored across every batch of the department.
/// - `department_fallback`: a subject without explicit eligibility links may
///   be taught by any faculty member of its department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSet {
    /// Ordered day names.
    pub days: Vec<String>,
    /// Ordered time-slot labels.
    pub time_slots: Vec<String>,
    /// Lunch slot label. Must be one of `time_slots` when set.
    pub lunch_break: Option<String>,
    /// Cap on occupied non-lunch cells per batch per day.
    #[serde(alias = "max_classes_per_day")]
    pub max_classes_per_day_per_batch: u32,
    /// Fallback daily hour limit for faculty without their own.
    pub max_hours_per_faculty: u32,
    /// Externally pinned assignments.
    pub fixed_slots: Vec<FixedSlot>,
    /// Mirror theory classes across a department's batches.
    pub theory_sync: bool,
    /// Honor and score fixed slots.
    pub enforce_fixed_slots: bool,
    /// Allow department-membership eligibility when no explicit links exist.
    pub department_fallback: bool,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS.iter().map(|d| d.to_string()).collect(),
            time_slots: DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
            lunch_break: Some(DEFAULT_LUNCH_BREAK.to_string()),
            max_classes_per_day_per_batch: 6,
            max_hours_per_faculty: 8,
            fixed_slots: Vec::new(),
            theory_sync: false,
            enforce_fixed_slots: true,
            department_fallback: false,
        }
    }
}

impl ConstraintSet {
    /// Creates a constraint set with the default week shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ordered day list.
    pub fn with_days<S: Into<String>>(mut self, days: impl IntoIterator<Item = S>) -> Self {
        self.days = days.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the ordered time-slot list.
    pub fn with_time_slots<S: Into<String>>(mut self, slots: impl IntoIterator<Item = S>) -> Self {
        self.time_slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the lunch slot.
    pub fn with_lunch_break(mut self, slot: impl Into<String>) -> Self {
        self.lunch_break = Some(slot.into());
        self
    }

    /// Removes the lunch slot.
    pub fn without_lunch_break(mut self) -> Self {
        self.lunch_break = None;
        self
    }

    /// Sets the per-batch daily class cap.
    pub fn with_max_classes_per_day(mut self, max: u32) -> Self {
        self.max_classes_per_day_per_batch = max;
        self
    }

    /// Sets the fallback daily hour limit for faculty.
    pub fn with_max_hours_per_faculty(mut self, max: u32) -> Self {
        self.max_hours_per_faculty = max;
        self
    }

    /// Adds a pinned assignment.
    pub fn with_fixed_slot(mut self, slot: FixedSlot) -> Self {
        self.fixed_slots.push(slot);
        self
    }

    /// Enables or disables theory synchronization.
    pub fn with_theory_sync(mut self, enabled: bool) -> Self {
        self.theory_sync = enabled;
        self
    }

    /// Enables or disables fixed-slot enforcement.
    pub fn with_fixed_slot_enforcement(mut self, enabled: bool) -> Self {
        self.enforce_fixed_slots = enabled;
        self
    }

    /// Enables or disables department-membership eligibility fallback.
    pub fn with_department_fallback(mut self, enabled: bool) -> Self {
        self.department_fallback = enabled;
        self
    }

    /// Whether `slot` is the lunch slot.
    pub fn is_lunch(&self, slot: &str) -> bool {
        self.lunch_break.as_deref() == Some(slot)
    }
}

/// An externally pinned assignment.
///
/// The scheduler must reproduce it exactly. `faculty_id` and `classroom_id`
/// are only checked when given; when absent the scheduler picks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedSlot {
    /// Target batch.
    pub batch_id: BatchId,
    /// Day name.
    pub day: String,
    /// Time-slot label.
    pub time_slot: String,
    /// Pinned subject.
    pub subject_id: SubjectId,
    /// Pinned faculty member, if any.
    #[serde(default)]
    pub faculty_id: Option<FacultyId>,
    /// Pinned room, if any.
    #[serde(default)]
    pub classroom_id: Option<ClassroomId>,
}

impl FixedSlot {
    /// Creates a fixed slot pinning only the subject.
    pub fn new(
        batch_id: BatchId,
        day: impl Into<String>,
        time_slot: impl Into<String>,
        subject_id: SubjectId,
    ) -> Self {
        Self {
            batch_id,
            day: day.into(),
            time_slot: time_slot.into(),
            subject_id,
            faculty_id: None,
            classroom_id: None,
        }
    }

    /// Pins the faculty member.
    pub fn with_faculty(mut self, faculty_id: FacultyId) -> Self {
        self.faculty_id = Some(faculty_id);
        self
    }

    /// Pins the room.
    pub fn with_classroom(mut self, classroom_id: ClassroomId) -> Self {
        self.classroom_id = Some(classroom_id);
        self
    }
}

/// A slot a faculty member would like kept free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePreference {
    /// Faculty member.
    pub faculty_id: FacultyId,
    /// Day name.
    pub day: String,
    /// Time-slot label.
    pub time_slot: String,
}

impl TimePreference {
    /// Creates a keep-free preference.
    pub fn new(faculty_id: FacultyId, day: impl Into<String>, time_slot: impl Into<String>) -> Self {
        Self {
            faculty_id,
            day: day.into(),
            time_slot: time_slot.into(),
        }
    }
}
