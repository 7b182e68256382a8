//! Built-in constraint rules.
//!
//! # Categories
//!
//! - **Resource conflicts**: faculty and room double-booking
//! - **Faculty load**: weekly workload, leave-adjusted availability, time preferences
//! - **Batch shape**: consecutive runs, lunch break, daily cap, weekly subject counts
//! - **Pinned / synchronized**: fixed slots, departmental theory alignment
//!
//! # Shared lectures
//! With theory synchronization on, identical theory assignments across
//! one department's batches at one slot are a single lecture. Conflict and
//! load rules count such a lecture once.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use super::ConstraintRule;
use crate::catalog::Catalog;
use crate::ga::{CellCoord, SlotAssignment, TimetableGrid};
use crate::models::{DepartmentId, FacultyId, Subject, SubjectId, ViolationType};

/// One taught class after shared lectures are collapsed.
#[derive(Debug, Clone, Copy)]
struct TeachingEvent {
    cell: CellCoord,
    assignment: SlotAssignment,
}

fn teaching_events(grid: &TimetableGrid, catalog: &Catalog) -> Vec<TeachingEvent> {
    let sync = catalog.theory_sync();
    let mut shared: HashSet<(DepartmentId, usize, usize, SlotAssignment)> = HashSet::new();
    let mut events = Vec::with_capacity(grid.filled_count());

    for (cell, a) in grid.occupied() {
        if sync && catalog.subject(a.subject_id).is_some_and(Subject::is_theory) {
            let department = catalog.batch_at(cell.batch).department_id;
            if !shared.insert((department, cell.day, cell.slot, *a)) {
                continue;
            }
        }
        events.push(TeachingEvent {
            cell,
            assignment: *a,
        });
    }
    events
}

/// Extra occupants beyond the first per key.
fn double_bookings<K, F>(events: &[TeachingEvent], key: F) -> f64
where
    K: Eq + Hash,
    F: Fn(&TeachingEvent) -> Option<K>,
{
    let mut occupants: HashMap<K, u32> = HashMap::new();
    for event in events {
        if let Some(k) = key(event) {
            *occupants.entry(k).or_insert(0) += 1;
        }
    }
    occupants.values().map(|&n| n.saturating_sub(1) as f64).sum()
}

/// Weekly teaching hours per faculty member.
fn weekly_hours(events: &[TeachingEvent]) -> BTreeMap<FacultyId, u32> {
    let mut hours = BTreeMap::new();
    for event in events {
        if let Some(f) = event.assignment.faculty_id {
            *hours.entry(f).or_insert(0) += 1;
        }
    }
    hours
}

// ======================== Resource conflicts ========================

/// A faculty member placed in more than one cell at the same time.
#[derive(Debug, Clone, Copy)]
pub struct FacultyConflict;

impl ConstraintRule for FacultyConflict {
    fn kind(&self) -> ViolationType {
        ViolationType::FacultyDoubleBooking
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let events = teaching_events(grid, catalog);
        double_bookings(&events, |e| {
            e.assignment
                .faculty_id
                .map(|f| (f, e.cell.day, e.cell.slot))
        })
    }
}

/// A room hosting more than one class at the same time.
#[derive(Debug, Clone, Copy)]
pub struct ClassroomConflict;

impl ConstraintRule for ClassroomConflict {
    fn kind(&self) -> ViolationType {
        ViolationType::ClassroomDoubleBooking
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let events = teaching_events(grid, catalog);
        double_bookings(&events, |e| {
            e.assignment
                .classroom_id
                .map(|c| (c, e.cell.day, e.cell.slot))
        })
    }
}

// ======================== Faculty load ========================

/// Weekly hours above `max_hours_per_day × days`; one violation per faculty.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyWorkload;

impl ConstraintRule for WeeklyWorkload {
    fn kind(&self) -> ViolationType {
        ViolationType::WorkloadOverrun
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let days = grid.dims().days as u32;
        weekly_hours(&teaching_events(grid, catalog))
            .into_iter()
            .filter(|&(f, hours)| hours > catalog.max_hours_per_day(f) * days)
            .count() as f64
    }
}

/// Weekly hours above what a faculty member can cover after leave.
///
/// Available days are `days × (working_days − leaves) / month_days`,
/// floored at zero; each hour above `max_hours_per_day × available_days`
/// counts.
#[derive(Debug, Clone, Copy)]
pub struct FacultyAvailability {
    /// Working days in a month.
    pub working_days_per_month: f64,
    /// Calendar days in a month.
    pub days_per_month: f64,
}

impl Default for FacultyAvailability {
    fn default() -> Self {
        Self {
            working_days_per_month: 20.0,
            days_per_month: 30.0,
        }
    }
}

impl FacultyAvailability {
    /// Teaching days available in the configured week.
    pub fn available_days(&self, days: usize, leaves_per_month: f64) -> f64 {
        (days as f64 * (self.working_days_per_month - leaves_per_month) / self.days_per_month)
            .max(0.0)
    }
}

impl ConstraintRule for FacultyAvailability {
    fn kind(&self) -> ViolationType {
        ViolationType::FacultyAvailability
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let days = grid.dims().days;
        weekly_hours(&teaching_events(grid, catalog))
            .into_iter()
            .map(|(f, hours)| {
                let available = self.available_days(days, catalog.leaves_per_month(f));
                let capacity = catalog.max_hours_per_day(f) as f64 * available;
                (hours as f64 - capacity).max(0.0)
            })
            .sum()
    }
}

/// Classes placed in slots a faculty member asked to keep free.
#[derive(Debug, Clone, Copy)]
pub struct TimePreferences;

impl ConstraintRule for TimePreferences {
    fn kind(&self) -> ViolationType {
        ViolationType::TimePreference
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        if !catalog.has_time_preferences() {
            return 0.0;
        }
        teaching_events(grid, catalog)
            .iter()
            .filter(|e| {
                e.assignment
                    .faculty_id
                    .is_some_and(|f| catalog.wants_free(f, e.cell.day, e.cell.slot))
            })
            .count() as f64
    }
}

// ======================== Batch shape ========================

/// Runs of back-to-back classes longer than `max_run`.
///
/// Lunch and empty cells end a run. Every slot past `max_run` counts.
#[derive(Debug, Clone, Copy)]
pub struct ConsecutiveClasses {
    /// Longest allowed run.
    pub max_run: u32,
}

impl Default for ConsecutiveClasses {
    fn default() -> Self {
        Self { max_run: 3 }
    }
}

impl ConstraintRule for ConsecutiveClasses {
    fn kind(&self) -> ViolationType {
        ViolationType::ConsecutiveOverrun
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let dims = grid.dims();
        let mut violations = 0u32;
        for batch in 0..dims.batches {
            for day in 0..dims.days {
                let mut streak = 0u32;
                for (slot, cell) in grid.day_block(batch, day).iter().enumerate() {
                    if catalog.is_lunch(slot) || cell.is_none() {
                        streak = 0;
                        continue;
                    }
                    streak += 1;
                    if streak > self.max_run {
                        violations += 1;
                    }
                }
            }
        }
        violations as f64
    }
}

/// Occupied lunch cells; one per batch per day.
#[derive(Debug, Clone, Copy)]
pub struct LunchBreak;

impl ConstraintRule for LunchBreak {
    fn kind(&self) -> ViolationType {
        ViolationType::LunchBreakOccupied
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let Some(lunch) = catalog.lunch_slot() else {
            return 0.0;
        };
        let dims = grid.dims();
        (0..dims.batches)
            .flat_map(|b| (0..dims.days).map(move |d| CellCoord::new(b, d, lunch)))
            .filter(|&c| !grid.is_empty_at(c))
            .count() as f64
    }
}

/// Distance between each batch's weekly subject counts and the targets
/// of its department's subjects.
#[derive(Debug, Clone, Copy)]
pub struct SubjectDistribution;

impl ConstraintRule for SubjectDistribution {
    fn kind(&self) -> ViolationType {
        ViolationType::SubjectCountMismatch
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let mut total = 0u32;
        for (batch, b) in catalog.batches().iter().enumerate() {
            let counts = grid.subject_counts(batch);
            for &sid in catalog.subjects_for_department(b.department_id) {
                let target = catalog.subject(sid).map_or(0, |s| s.classes_per_week);
                let actual = counts.get(&sid).copied().unwrap_or(0);
                total += actual.abs_diff(target);
            }
        }
        total as f64
    }
}

/// Non-lunch classes above the per-day cap, per batch per day.
#[derive(Debug, Clone, Copy)]
pub struct DailyLimit;

impl ConstraintRule for DailyLimit {
    fn kind(&self) -> ViolationType {
        ViolationType::DailyOverload
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let cap = catalog.constraints().max_classes_per_day_per_batch;
        let dims = grid.dims();
        let mut excess = 0u32;
        for batch in 0..dims.batches {
            for day in 0..dims.days {
                let classes = grid
                    .day_block(batch, day)
                    .iter()
                    .enumerate()
                    .filter(|&(slot, cell)| cell.is_some() && !catalog.is_lunch(slot))
                    .count() as u32;
                excess += classes.saturating_sub(cap);
            }
        }
        excess as f64
    }
}

// ======================== Pinned / synchronized ========================

/// Pinned fields not reproduced by the grid.
///
/// An empty pinned cell misses the subject and every specified field.
#[derive(Debug, Clone, Copy)]
pub struct FixedSlots;

impl ConstraintRule for FixedSlots {
    fn kind(&self) -> ViolationType {
        ViolationType::FixedSlotMismatch
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let mut violations = 0u32;
        for pin in catalog.pinned_cells() {
            let actual = grid.get(pin.cell);
            let subject_ok = actual.is_some_and(|a| a.subject_id == pin.subject_id);
            let faculty_ok = pinned_matches(pin.faculty_id, actual.and_then(|a| a.faculty_id));
            let classroom_ok =
                pinned_matches(pin.classroom_id, actual.and_then(|a| a.classroom_id));
            violations += [subject_ok, faculty_ok, classroom_ok]
                .iter()
                .filter(|ok| !**ok)
                .count() as u32;
        }
        violations as f64
    }
}

/// A pinned optional field is satisfied when unspecified or equal.
fn pinned_matches<T: PartialEq>(expected: Option<T>, actual: Option<T>) -> bool {
    expected.map_or(true, |e| actual == Some(e))
}

/// Distinct theory subjects sharing a department slot, beyond the first.
#[derive(Debug, Clone, Copy)]
pub struct TheorySync;

impl ConstraintRule for TheorySync {
    fn kind(&self) -> ViolationType {
        ViolationType::TheorySyncConflict
    }

    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        let dims = grid.dims();
        let mut violations = 0usize;
        let mut seen: Vec<SubjectId> = Vec::new();
        for (_, batches) in catalog.department_batches() {
            for day in 0..dims.days {
                for slot in 0..dims.slots {
                    seen.clear();
                    for &b in batches {
                        let Some(a) = grid.get(CellCoord::new(b, day, slot)) else {
                            continue;
                        };
                        let is_theory =
                            catalog.subject(a.subject_id).is_some_and(Subject::is_theory);
                        if is_theory && !seen.contains(&a.subject_id) {
                            seen.push(a.subject_id);
                        }
                    }
                    violations += seen.len().saturating_sub(1);
                }
            }
        }
        violations as f64
    }
}
