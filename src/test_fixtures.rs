//! Shared test inputs.

use crate::catalog::Catalog;
use crate::ga::{CellCoord, SlotAssignment, TimetableGrid};
use crate::models::{
    Batch, Classroom, ConstraintSet, Faculty, FixedSlot, ScheduleInput, Subject,
};

pub(crate) const DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

pub(crate) const SLOTS: [&str; 6] = [
    "9:00-10:00",
    "10:00-11:00",
    "11:00-12:00",
    "12:00-1:00",
    "1:00-2:00",
    "2:00-3:00",
];

pub(crate) const LUNCH: &str = "12:00-1:00";

/// One department, two semester-1 batches, two theory subjects and one lab
/// (two classes a week each), two faculty eligible for everything, one
/// classroom and one lab, 5 days × 6 slots with a lunch slot.
pub(crate) fn scenario_input() -> ScheduleInput {
    ScheduleInput::new()
        .with_subject(Subject::theory(1, 1, 2).with_code("T1"))
        .with_subject(Subject::theory(2, 1, 2).with_code("T2"))
        .with_subject(Subject::lab(3, 1, 2).with_code("L1"))
        .with_faculty(Faculty::new(1, 1))
        .with_faculty(Faculty::new(2, 1))
        .with_eligibility(1, 1)
        .with_eligibility(1, 2)
        .with_eligibility(1, 3)
        .with_eligibility(2, 1)
        .with_eligibility(2, 2)
        .with_eligibility(2, 3)
        .with_classroom(Classroom::classroom(1, 1))
        .with_classroom(Classroom::lab(2, 1))
        .with_batch(Batch::new(1, 1, 1).with_strength(60))
        .with_batch(Batch::new(2, 1, 1).with_strength(60))
        .with_constraints(
            ConstraintSet::new()
                .with_days(DAYS)
                .with_time_slots(SLOTS)
                .with_lunch_break(LUNCH)
                .with_max_classes_per_day(6),
        )
}

/// [`scenario_input`] with batch 1, Monday 9:00-10:00 pinned to
/// subject 1, faculty 1, classroom 1.
pub(crate) fn pinned_scenario_input() -> ScheduleInput {
    let mut input = scenario_input();
    input.constraints.fixed_slots.push(
        FixedSlot::new(1, "Monday", "9:00-10:00", 1)
            .with_faculty(1)
            .with_classroom(1),
    );
    input
}

/// A clean grid for the scenario catalog: batch 1 is taught mornings by
/// faculty 1, batch 2 afternoons by faculty 2, every subject twice a week.
/// Also satisfies the pin of [`pinned_scenario_input`].
pub(crate) fn perfect_grid(catalog: &Catalog) -> TimetableGrid {
    let mut grid = TimetableGrid::empty_for(catalog);
    // (day, slot offset, subject, room)
    let plan = [
        (0, 0, 1, 1),
        (0, 1, 2, 1),
        (1, 0, 1, 1),
        (1, 1, 2, 1),
        (2, 0, 3, 2),
        (2, 1, 3, 2),
    ];
    for &(day, offset, subject, room) in &plan {
        grid.set(
            CellCoord::new(0, day, offset),
            Some(SlotAssignment::new(subject, 1, room)),
        );
        grid.set(
            CellCoord::new(1, day, 4 + offset),
            Some(SlotAssignment::new(subject, 2, room)),
        );
    }
    grid
}

/// A clean grid for the scenario catalog with theory synchronization on:
/// both batches share every theory lecture (faculty 1, classroom 1) at the
/// same morning slots, and take their labs on Wednesday at different times.
/// Also satisfies the pin of [`pinned_scenario_input`].
pub(crate) fn perfect_synced_grid(catalog: &Catalog) -> TimetableGrid {
    let mut grid = TimetableGrid::empty_for(catalog);
    for &(day, slot, subject) in &[(0, 0, 1), (0, 1, 2), (1, 0, 1), (1, 1, 2)] {
        for batch in 0..2 {
            grid.set(
                CellCoord::new(batch, day, slot),
                Some(SlotAssignment::new(subject, 1, 1)),
            );
        }
    }
    // (batch, slot, faculty)
    for &(batch, slot, faculty) in &[(0, 0, 1), (0, 1, 1), (1, 4, 2), (1, 5, 2)] {
        grid.set(
            CellCoord::new(batch, 2, slot),
            Some(SlotAssignment::new(3, faculty, 2)),
        );
    }
    grid
}
