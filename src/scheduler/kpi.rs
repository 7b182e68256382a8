//! Timetable quality metrics (KPIs).
//!
//! Computes coverage and resource-usage indicators for a finished grid.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fill rate | Occupied non-lunch cells / all non-lunch cells |
//! | Faculty load | Distinct (day, slot) pairs each faculty member teaches |
//! | Room utilization | Distinct (day, slot) pairs a room is used / teaching slots in the week |
//! | Unmet classes | Σ max(0, target − scheduled) over batches and their subjects |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::ga::TimetableGrid;
use crate::models::{ClassroomId, FacultyId};

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// Occupied non-lunch cells.
    pub filled_cells: usize,
    /// Non-lunch cells across all batches.
    pub usable_cells: usize,
    /// `filled_cells / usable_cells` (0.0..1.0).
    pub fill_rate: f64,
    /// Teaching slots per faculty member.
    pub faculty_load: BTreeMap<FacultyId, usize>,
    /// Per-room utilization (0.0..1.0).
    pub room_utilization: BTreeMap<ClassroomId, f64>,
    /// Mean utilization over all rooms in the catalog.
    pub avg_room_utilization: f64,
    /// Weekly classes still missing against subject targets.
    pub unmet_classes: u32,
}

impl TimetableKpi {
    /// Computes KPIs for a grid.
    pub fn calculate(grid: &TimetableGrid, catalog: &Catalog) -> Self {
        let dims = grid.dims();
        let teaching_slots = (0..dims.slots).filter(|&s| !catalog.is_lunch(s)).count();
        let week_slots = dims.days * teaching_slots;
        let usable_cells = dims.batches * week_slots;

        let mut filled_cells = 0;
        let mut faculty_slots: BTreeMap<FacultyId, BTreeSet<(usize, usize)>> = BTreeMap::new();
        let mut room_slots: BTreeMap<ClassroomId, BTreeSet<(usize, usize)>> = BTreeMap::new();

        for (cell, a) in grid.occupied() {
            if catalog.is_lunch(cell.slot) {
                continue;
            }
            filled_cells += 1;
            if let Some(f) = a.faculty_id {
                faculty_slots.entry(f).or_default().insert((cell.day, cell.slot));
            }
            if let Some(c) = a.classroom_id {
                room_slots.entry(c).or_default().insert((cell.day, cell.slot));
            }
        }

        let faculty_load = faculty_slots
            .into_iter()
            .map(|(f, slots)| (f, slots.len()))
            .collect();

        let room_utilization: BTreeMap<ClassroomId, f64> = catalog
            .classrooms()
            .iter()
            .map(|room| {
                let used = room_slots.get(&room.id).map_or(0, BTreeSet::len);
                (room.id, ratio(used, week_slots))
            })
            .collect();
        let avg_room_utilization = if room_utilization.is_empty() {
            0.0
        } else {
            room_utilization.values().sum::<f64>() / room_utilization.len() as f64
        };

        let mut unmet_classes = 0;
        for (batch, b) in catalog.batches().iter().enumerate() {
            let counts = grid.subject_counts(batch);
            for &sid in catalog.subjects_for_department(b.department_id) {
                let target = catalog.subject(sid).map_or(0, |s| s.classes_per_week);
                let scheduled = counts.get(&sid).copied().unwrap_or(0);
                unmet_classes += target.saturating_sub(scheduled);
            }
        }

        Self {
            filled_cells,
            usable_cells,
            fill_rate: ratio(filled_cells, usable_cells),
            faculty_load,
            room_utilization,
            avg_room_utilization,
            unmet_classes,
        }
    }

    /// Whether every weekly target is met.
    pub fn is_complete(&self) -> bool {
        self.unmet_classes == 0
    }

    /// Whether the timetable meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_unmet: u32, min_fill_rate: f64) -> bool {
        self.unmet_classes <= max_unmet && self.fill_rate >= min_fill_rate
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
