//! Timetable (solution) model.
//!
//! A timetable is the flat list of occupied cells of the best grid, plus
//! its fitness. This is what the persistence layer stores.

use serde::{Deserialize, Serialize};

use super::{BatchId, ClassroomId, ConstraintSet, FacultyId, SubjectId};

/// A finished timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// Fitness of the grid this timetable was taken from.
    pub fitness: f64,
    /// Occupied cells, ordered by batch, day, then time slot.
    pub entries: Vec<TimetableEntry>,
}

/// One occupied cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    /// Batch attending.
    pub batch_id: BatchId,
    /// Day name.
    pub day: String,
    /// Time-slot label.
    pub time_slot: String,
    /// Subject taught.
    pub subject_id: SubjectId,
    /// Teaching faculty member.
    pub faculty_id: Option<FacultyId>,
    /// Room.
    pub classroom_id: Option<ClassroomId>,
}

/// A weighted constraint-violation term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Which constraint.
    pub violation_type: ViolationType,
    /// Violation count (may be fractional for availability excess).
    pub count: f64,
    /// Weight per violation.
    pub weight: f64,
    /// `count * weight`.
    pub penalty: f64,
}

/// Classification of timetable constraint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// A faculty member is in two places at once.
    FacultyDoubleBooking,
    /// A room hosts two classes at once.
    ClassroomDoubleBooking,
    /// Weekly load exceeds daily limit × days.
    WorkloadOverrun,
    /// Class placed in a slot the faculty member wants free.
    TimePreference,
    /// More than three classes in a row.
    ConsecutiveOverrun,
    /// Class placed in the lunch slot.
    LunchBreakOccupied,
    /// Weekly count differs from the subject's target.
    SubjectCountMismatch,
    /// Daily class cap exceeded.
    DailyOverload,
    /// Pinned assignment not reproduced.
    FixedSlotMismatch,
    /// Load exceeds leave-adjusted availability.
    FacultyAvailability,
    /// Distinct theory subjects collide in one department slot.
    TheorySyncConflict,
}

impl ViolationType {
    /// Short stable name.
    pub fn name(self) -> &'static str {
        match self {
            ViolationType::FacultyDoubleBooking => "faculty_double_booking",
            ViolationType::ClassroomDoubleBooking => "classroom_double_booking",
            ViolationType::WorkloadOverrun => "workload_overrun",
            ViolationType::TimePreference => "time_preference",
            ViolationType::ConsecutiveOverrun => "consecutive_overrun",
            ViolationType::LunchBreakOccupied => "lunch_break_occupied",
            ViolationType::SubjectCountMismatch => "subject_count_mismatch",
            ViolationType::DailyOverload => "daily_overload",
            ViolationType::FixedSlotMismatch => "fixed_slot_mismatch",
            ViolationType::FacultyAvailability => "faculty_availability",
            ViolationType::TheorySyncConflict => "theory_sync_conflict",
        }
    }
}

impl Violation {
    /// Creates a weighted term.
    pub fn new(violation_type: ViolationType, count: f64, weight: f64) -> Self {
        Self {
            violation_type,
            count,
            weight,
            penalty: count * weight,
        }
    }

    /// Whether this term costs anything.
    #[inline]
    pub fn is_violated(&self) -> bool {
        self.count > 0.0
    }
}

impl Timetable {
    /// Creates a timetable.
    pub fn new(fitness: f64, entries: Vec<TimetableEntry>) -> Self {
        Self { fitness, entries }
    }

    /// Entries for one batch.
    pub fn entries_for_batch(&self, batch_id: BatchId) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.batch_id == batch_id)
            .collect()
    }

    /// Entries taught by one faculty member.
    pub fn entries_for_faculty(&self, faculty_id: FacultyId) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.faculty_id == Some(faculty_id))
            .collect()
    }

    /// The entry at a cell, if occupied.
    pub fn entry_at(&self, batch_id: BatchId, day: &str, time_slot: &str) -> Option<&TimetableEntry> {
        self.entries
            .iter()
            .find(|e| e.batch_id == batch_id && e.day == day && e.time_slot == time_slot)
    }

    /// Number of classes of `subject_id` for `batch_id`.
    pub fn subject_count(&self, batch_id: BatchId, subject_id: SubjectId) -> usize {
        self.entries
            .iter()
            .filter(|e| e.batch_id == batch_id && e.subject_id == subject_id)
            .count()
    }

    /// Number of occupied cells.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Reorganizes entries into a per-batch, per-day grid for display.
    ///
    /// Batches appear in order of first entry; every configured day and
    /// time slot is present, with `None` for free cells.
    pub fn view(&self, constraints: &ConstraintSet) -> TimetableView {
        let mut batch_ids: Vec<BatchId> = Vec::new();
        for e in &self.entries {
            if !batch_ids.contains(&e.batch_id) {
                batch_ids.push(e.batch_id);
            }
        }

        let batches = batch_ids
            .into_iter()
            .map(|batch_id| BatchSchedule {
                batch_id,
                days: constraints
                    .days
                    .iter()
                    .map(|day| DaySchedule {
                        day: day.clone(),
                        slots: constraints
                            .time_slots
                            .iter()
                            .map(|slot| SlotView {
                                time_slot: slot.clone(),
                                is_lunch: constraints.is_lunch(slot),
                                entry: self.entry_at(batch_id, day, slot).cloned(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        TimetableView { batches }
    }
}

/// Display-oriented reorganization of a [`Timetable`].
#[derive(Debug, Clone, Serialize)]
pub struct TimetableView {
    /// One schedule per batch.
    pub batches: Vec<BatchSchedule>,
}

/// One batch's week.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSchedule {
    /// Batch.
    pub batch_id: BatchId,
    /// Days in configured order.
    pub days: Vec<DaySchedule>,
}

/// One batch-day.
#[derive(Debug, Clone, Serialize)]
pub struct DaySchedule {
    /// Day name.
    pub day: String,
    /// Slots in configured order.
    pub slots: Vec<SlotView>,
}

/// One cell of the view.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    /// Time-slot label.
    pub time_slot: String,
    /// Whether this is the lunch slot.
    pub is_lunch: bool,
    /// Class held, if any.
    pub entry: Option<TimetableEntry>,
}

impl BatchSchedule {
    /// Number of classes in the week.
    pub fn class_count(&self) -> usize {
        self.days
            .iter()
            .flat_map(|d| d.slots.iter())
            .filter(|s| s.entry.is_some())
            .count()
    }
}
