//! Slot grid (chromosome).
//!
//! A dense `batch × day × slot` array of optional assignments. Cells are
//! addressed positionally through [`CellCoord`]; the catalog maps ids and
//! labels to positions. A batch's day is a contiguous block, which is the
//! unit crossover exchanges.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::models::{ClassroomId, FacultyId, SubjectId, TimetableEntry};

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    /// Number of batches.
    pub batches: usize,
    /// Number of days.
    pub days: usize,
    /// Number of time slots per day.
    pub slots: usize,
}

impl GridDims {
    /// Creates dimensions.
    pub fn new(batches: usize, days: usize, slots: usize) -> Self {
        Self {
            batches,
            days,
            slots,
        }
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.batches * self.days * self.slots
    }

    #[inline]
    fn index(&self, cell: CellCoord) -> usize {
        debug_assert!(cell.batch < self.batches && cell.day < self.days && cell.slot < self.slots);
        (cell.batch * self.days + cell.day) * self.slots + cell.slot
    }

    #[inline]
    fn coord(&self, index: usize) -> CellCoord {
        let slot = index % self.slots;
        let rest = index / self.slots;
        CellCoord::new(rest / self.days, rest % self.days, slot)
    }
}

/// Positional cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Batch position.
    pub batch: usize,
    /// Day position.
    pub day: usize,
    /// Slot position.
    pub slot: usize,
}

impl CellCoord {
    /// Creates a coordinate.
    #[inline]
    pub fn new(batch: usize, day: usize, slot: usize) -> Self {
        Self { batch, day, slot }
    }
}

/// Contents of an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// Subject taught.
    pub subject_id: SubjectId,
    /// Faculty member, if one could be assigned.
    pub faculty_id: Option<FacultyId>,
    /// Room, if one could be assigned.
    pub classroom_id: Option<ClassroomId>,
}

impl SlotAssignment {
    /// Creates a fully specified assignment.
    pub fn new(subject_id: SubjectId, faculty_id: FacultyId, classroom_id: ClassroomId) -> Self {
        Self {
            subject_id,
            faculty_id: Some(faculty_id),
            classroom_id: Some(classroom_id),
        }
    }

    /// Creates an assignment with only the subject set.
    pub fn subject_only(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            faculty_id: None,
            classroom_id: None,
        }
    }
}

/// One candidate timetable across all batches.
///
/// `Clone` is a deep copy; individuals never share cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableGrid {
    dims: GridDims,
    cells: Vec<Option<SlotAssignment>>,
}

impl TimetableGrid {
    /// Creates an empty grid.
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            cells: vec![None; dims.cell_count()],
        }
    }

    /// Creates an empty grid shaped by the catalog.
    pub fn empty_for(catalog: &Catalog) -> Self {
        Self::new(catalog.dims())
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Reads a cell.
    ///
    /// # Panics
    /// If the coordinate is outside the grid.
    #[inline]
    pub fn get(&self, cell: CellCoord) -> Option<&SlotAssignment> {
        self.cells[self.dims.index(cell)].as_ref()
    }

    /// Writes a cell.
    ///
    /// # Panics
    /// If the coordinate is outside the grid.
    #[inline]
    pub fn set(&mut self, cell: CellCoord, assignment: Option<SlotAssignment>) {
        let i = self.dims.index(cell);
        self.cells[i] = assignment;
    }

    /// Whether a cell is empty.
    #[inline]
    pub fn is_empty_at(&self, cell: CellCoord) -> bool {
        self.get(cell).is_none()
    }

    /// One batch's schedule for one day, in slot order.
    pub fn day_block(&self, batch: usize, day: usize) -> &[Option<SlotAssignment>] {
        let start = self.dims.index(CellCoord::new(batch, day, 0));
        &self.cells[start..start + self.dims.slots]
    }

    /// Replaces `day` of every batch with the same day from `other`.
    ///
    /// # Panics
    /// If the grids differ in shape.
    pub fn copy_day_from(&mut self, other: &TimetableGrid, day: usize) {
        assert_eq!(self.dims, other.dims, "grid shape mismatch");
        for batch in 0..self.dims.batches {
            let start = self.dims.index(CellCoord::new(batch, day, 0));
            let end = start + self.dims.slots;
            self.cells[start..end].copy_from_slice(&other.cells[start..end]);
        }
    }

    /// Every cell with its contents, in batch/day/slot order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, Option<&SlotAssignment>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, c)| (self.dims.coord(i), c.as_ref()))
    }

    /// Occupied cells only, in batch/day/slot order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellCoord, &SlotAssignment)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|a| (self.dims.coord(i), a)))
    }

    /// Number of occupied cells.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Weekly occurrences of a subject for one batch.
    pub fn subject_count(&self, batch: usize, subject_id: SubjectId) -> usize {
        let start = self.dims.index(CellCoord::new(batch, 0, 0));
        let len = self.dims.days * self.dims.slots;
        self.cells[start..start + len]
            .iter()
            .filter(|c| c.is_some_and(|a| a.subject_id == subject_id))
            .count()
    }

    /// Weekly occurrences of every scheduled subject for one batch.
    pub fn subject_counts(&self, batch: usize) -> BTreeMap<SubjectId, u32> {
        let start = self.dims.index(CellCoord::new(batch, 0, 0));
        let len = self.dims.days * self.dims.slots;
        let mut counts = BTreeMap::new();
        for a in self.cells[start..start + len].iter().flatten() {
            *counts.entry(a.subject_id).or_insert(0) += 1;
        }
        counts
    }

    /// Flattens occupied cells into output entries, ordered by batch,
    /// day, then slot.
    pub fn to_entries(&self, catalog: &Catalog) -> Vec<TimetableEntry> {
        self.occupied()
            .map(|(cell, a)| TimetableEntry {
                batch_id: catalog.batch_at(cell.batch).id,
                day: catalog.days()[cell.day].clone(),
                time_slot: catalog.time_slots()[cell.slot].clone(),
                subject_id: a.subject_id,
                faculty_id: a.faculty_id,
                classroom_id: a.classroom_id,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::scenario_input;

    fn dims() -> GridDims {
        GridDims::new(2, 5, 6)
    }

    #[test]
    fn test_index_roundtrip() {
        let d = dims();
        for i in 0..d.cell_count() {
            assert_eq!(d.index(d.coord(i)), i);
        }
        assert_eq!(d.coord(d.cell_count() - 1), CellCoord::new(1, 4, 5));
    }

    #[test]
    fn test_get_set() {
        let mut grid = TimetableGrid::new(dims());
        let cell = CellCoord::new(1, 2, 3);
        assert!(grid.is_empty_at(cell));

        grid.set(cell, Some(SlotAssignment::new(7, 1, 2)));
        assert_eq!(grid.get(cell).unwrap().subject_id, 7);
        assert_eq!(grid.filled_count(), 1);

        grid.set(cell, None);
        assert!(grid.is_empty_at(cell));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let grid = TimetableGrid::new(dims());
        grid.get(CellCoord::new(2, 0, 0));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = TimetableGrid::new(dims());
        a.set(CellCoord::new(0, 0, 0), Some(SlotAssignment::subject_only(1)));
        let mut b = a.clone();
        b.set(CellCoord::new(0, 0, 0), None);
        assert!(a.get(CellCoord::new(0, 0, 0)).is_some());
        assert!(b.get(CellCoord::new(0, 0, 0)).is_none());
    }

    #[test]
    fn test_day_block_and_copy() {
        let mut a = TimetableGrid::new(dims());
        let b = {
            let mut g = TimetableGrid::new(dims());
            g.set(CellCoord::new(0, 1, 0), Some(SlotAssignment::subject_only(5)));
            g.set(CellCoord::new(1, 1, 4), Some(SlotAssignment::subject_only(6)));
            g.set(CellCoord::new(1, 2, 4), Some(SlotAssignment::subject_only(9)));
            g
        };
        a.copy_day_from(&b, 1);
        assert_eq!(a.day_block(0, 1), b.day_block(0, 1));
        assert_eq!(a.day_block(1, 1), b.day_block(1, 1));
        assert!(a.day_block(1, 2).iter().all(Option::is_none));
        assert_eq!(a.day_block(0, 1).len(), 6);
    }

    #[test]
    fn test_counts() {
        let mut grid = TimetableGrid::new(dims());
        grid.set(CellCoord::new(0, 0, 0), Some(SlotAssignment::subject_only(1)));
        grid.set(CellCoord::new(0, 3, 2), Some(SlotAssignment::subject_only(1)));
        grid.set(CellCoord::new(0, 4, 5), Some(SlotAssignment::subject_only(2)));
        grid.set(CellCoord::new(1, 0, 0), Some(SlotAssignment::subject_only(1)));

        assert_eq!(grid.subject_count(0, 1), 2);
        assert_eq!(grid.subject_count(1, 1), 1);
        assert_eq!(grid.subject_count(1, 2), 0);
        let counts = grid.subject_counts(0);
        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(grid.cells().count(), 60);
        assert_eq!(grid.occupied().count(), 4);
    }

    #[test]
    fn test_to_entries_ordering() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let mut grid = TimetableGrid::empty_for(&catalog);
        grid.set(CellCoord::new(1, 0, 0), Some(SlotAssignment::new(2, 2, 1)));
        grid.set(CellCoord::new(0, 4, 1), Some(SlotAssignment::new(1, 1, 1)));
        grid.set(CellCoord::new(0, 0, 5), Some(SlotAssignment::subject_only(3)));

        let entries = grid.to_entries(&catalog);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].batch_id, 1);
        assert_eq!(entries[0].day, "Monday");
        assert_eq!(entries[0].time_slot, "2:00-3:00");
        assert_eq!(entries[0].faculty_id, None);
        assert_eq!(entries[1].day, "Friday");
        assert_eq!(entries[2].batch_id, 2);
        assert_eq!(entries[2].classroom_id, Some(1));
    }
}
