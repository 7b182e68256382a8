//! Population initializer.
//!
//! Builds generation 0. Every individual starts from the pinned cells,
//! then fills the remaining non-lunch cells toward each subject's weekly
//! target with random eligible faculty and rooms.
//!
//! With theory synchronization on, pinned theory classes are copied into
//! the sibling batches first, then theory subjects are drawn once per
//! department slot and written into every batch of the department that
//! still needs them; labs are always filled per batch.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::grid::{CellCoord, SlotAssignment, TimetableGrid};
use crate::catalog::Catalog;
use crate::models::{ClassroomId, FacultyId, Subject, SubjectId, SubjectType};

/// Picks a random eligible faculty member for a subject.
pub(crate) fn pick_faculty<R: Rng>(
    catalog: &Catalog,
    subject_id: SubjectId,
    rng: &mut R,
) -> Option<FacultyId> {
    catalog.eligible_faculty_for(subject_id).choose(rng).copied()
}

/// Picks a random room of the subject's required type in its department.
pub(crate) fn pick_room<R: Rng>(
    catalog: &Catalog,
    subject: &Subject,
    rng: &mut R,
) -> Option<ClassroomId> {
    catalog.rooms_for(subject).choose(rng).copied()
}

/// Draws a faculty member and room for `subject`.
///
/// Returns `None` when nobody can teach it; a missing room still yields
/// an assignment with no classroom.
pub(crate) fn random_assignment<R: Rng>(
    catalog: &Catalog,
    subject: &Subject,
    rng: &mut R,
) -> Option<SlotAssignment> {
    let faculty_id = pick_faculty(catalog, subject.id, rng)?;
    Some(SlotAssignment {
        subject_id: subject.id,
        faculty_id: Some(faculty_id),
        classroom_id: pick_room(catalog, subject, rng),
    })
}

/// Creates randomized initial grids.
#[derive(Debug, Clone, Copy)]
pub struct PopulationInitializer<'a> {
    catalog: &'a Catalog,
}

impl<'a> PopulationInitializer<'a> {
    /// Creates an initializer over a catalog.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Creates `size` independent grids.
    pub fn initialize<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<TimetableGrid> {
        (0..size).map(|_| self.create_grid(rng)).collect()
    }

    /// Creates one grid.
    pub fn create_grid<R: Rng>(&self, rng: &mut R) -> TimetableGrid {
        let mut grid = TimetableGrid::empty_for(self.catalog);
        self.write_pinned(&mut grid, rng);

        if self.catalog.theory_sync() {
            self.fill_synchronized_theory(&mut grid, rng);
            for batch in 0..grid.dims().batches {
                self.fill_batch(&mut grid, batch, Some(SubjectType::Lab), rng);
            }
        } else {
            for batch in 0..grid.dims().batches {
                self.fill_batch(&mut grid, batch, None, rng);
            }
        }

        grid
    }

    /// Writes every pinned cell. Unspecified faculty or room is drawn at random.
    fn write_pinned<R: Rng>(&self, grid: &mut TimetableGrid, rng: &mut R) {
        for pin in self.catalog.pinned_cells() {
            let subject = self.catalog.subject(pin.subject_id);
            let faculty_id = pin
                .faculty_id
                .or_else(|| pick_faculty(self.catalog, pin.subject_id, rng));
            let classroom_id = pin
                .classroom_id
                .or_else(|| subject.and_then(|s| pick_room(self.catalog, s, rng)));
            grid.set(
                pin.cell,
                Some(SlotAssignment {
                    subject_id: pin.subject_id,
                    faculty_id,
                    classroom_id,
                }),
            );
        }
    }

    /// Empty non-lunch `(day, slot)` pairs of one batch, shuffled.
    fn open_cells<R: Rng>(
        &self,
        grid: &TimetableGrid,
        batch: usize,
        rng: &mut R,
    ) -> Vec<CellCoord> {
        let dims = grid.dims();
        let mut cells: Vec<CellCoord> = (0..dims.days)
            .flat_map(|day| (0..dims.slots).map(move |slot| CellCoord::new(batch, day, slot)))
            .filter(|&c| !self.catalog.is_lunch(c.slot) && grid.is_empty_at(c))
            .collect();
        cells.shuffle(rng);
        cells
    }

    /// Fills one batch toward its department's weekly targets.
    fn fill_batch<R: Rng>(
        &self,
        grid: &mut TimetableGrid,
        batch: usize,
        only: Option<SubjectType>,
        rng: &mut R,
    ) {
        let department = self.catalog.batch_at(batch).department_id;
        let subjects: Vec<&Subject> = self
            .catalog
            .subjects_for_department(department)
            .iter()
            .filter_map(|&id| self.catalog.subject(id))
            .filter(|s| only.map_or(true, |t| s.subject_type == t))
            .collect();
        if subjects.is_empty() {
            return;
        }

        let mut counts = grid.subject_counts(batch);
        for cell in self.open_cells(grid, batch, rng) {
            let candidates: Vec<&Subject> = subjects
                .iter()
                .copied()
                .filter(|s| counts.get(&s.id).copied().unwrap_or(0) < s.classes_per_week)
                .collect();
            let Some(&subject) = candidates.choose(rng) else {
                break;
            };
            if let Some(assignment) = random_assignment(self.catalog, subject, rng) {
                grid.set(cell, Some(assignment));
                *counts.entry(subject.id).or_insert(0) += 1;
            }
        }
    }

    /// Draws theory subjects per department slot and applies them to every
    /// batch of the department whose cell is still open and whose weekly
    /// target for that subject is not yet met.
    fn fill_synchronized_theory<R: Rng>(&self, grid: &mut TimetableGrid, rng: &mut R) {
        let dims = grid.dims();
        for (department, batches) in self.catalog.department_batches() {
            let theory: Vec<&Subject> = self
                .catalog
                .subjects_for_department(department)
                .iter()
                .filter_map(|&id| self.catalog.subject(id))
                .filter(|s| s.is_theory())
                .collect();
            if theory.is_empty() {
                continue;
            }

            self.mirror_pinned_theory(grid, batches);

            let mut counts: BTreeMap<usize, BTreeMap<SubjectId, u32>> = batches
                .iter()
                .map(|&b| (b, grid.subject_counts(b)))
                .collect();
            let below = |counts: &BTreeMap<usize, BTreeMap<SubjectId, u32>>,
                         b: usize,
                         s: &Subject| {
                counts
                    .get(&b)
                    .and_then(|m| m.get(&s.id))
                    .copied()
                    .unwrap_or(0)
                    < s.classes_per_week
            };

            let mut slots: Vec<(usize, usize)> = (0..dims.days)
                .flat_map(|day| (0..dims.slots).map(move |slot| (day, slot)))
                .filter(|&(_, slot)| !self.catalog.is_lunch(slot))
                .collect();
            slots.shuffle(rng);

            for (day, slot) in slots {
                let open: Vec<usize> = batches
                    .iter()
                    .copied()
                    .filter(|&b| grid.is_empty_at(CellCoord::new(b, day, slot)))
                    .collect();
                if open.is_empty() {
                    continue;
                }
                let candidates: Vec<&Subject> = theory
                    .iter()
                    .copied()
                    .filter(|s| open.iter().any(|&b| below(&counts, b, *s)))
                    .collect();
                let Some(&subject) = candidates.choose(rng) else {
                    continue;
                };
                let Some(assignment) = random_assignment(self.catalog, subject, rng) else {
                    continue;
                };
                for &b in &open {
                    if below(&counts, b, subject) {
                        grid.set(CellCoord::new(b, day, slot), Some(assignment));
                        *counts
                            .entry(b)
                            .or_default()
                            .entry(subject.id)
                            .or_insert(0) += 1;
                    }
                }
            }
        }
    }

    /// Copies each pinned theory class into the same open cell of the
    /// department's other batches, up to their weekly target.
    fn mirror_pinned_theory(&self, grid: &mut TimetableGrid, batches: &[usize]) {
        for pin in self.catalog.pinned_cells() {
            if !batches.contains(&pin.cell.batch) {
                continue;
            }
            let Some(subject) = self.catalog.subject(pin.subject_id) else {
                continue;
            };
            if !subject.is_theory() {
                continue;
            }
            let Some(&assignment) = grid.get(pin.cell) else {
                continue;
            };
            for &b in batches {
                let cell = CellCoord::new(b, pin.cell.day, pin.cell.slot);
                if b == pin.cell.batch
                    || !grid.is_empty_at(cell)
                    || grid.subject_count(b, subject.id) as u32 >= subject.classes_per_week
                {
                    continue;
                }
                grid.set(cell, Some(assignment));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classroom, RoomType};
    use crate::test_fixtures::{pinned_scenario_input, scenario_input};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_population_size() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = PopulationInitializer::new(&catalog).initialize(15, &mut rng);
        assert_eq!(pop.len(), 15);
    }

    #[test]
    fn test_weekly_targets_met() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let init = PopulationInitializer::new(&catalog);
        for grid in init.initialize(10, &mut rng) {
            for batch in 0..2 {
                for subject in 1..=3 {
                    assert_eq!(grid.subject_count(batch, subject), 2);
                }
            }
            assert_eq!(grid.filled_count(), 12);
        }
    }

    #[test]
    fn test_lunch_left_empty() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let init = PopulationInitializer::new(&catalog);
        for grid in init.initialize(10, &mut rng) {
            assert!(grid.occupied().all(|(c, _)| !catalog.is_lunch(c.slot)));
        }
    }

    #[test]
    fn test_room_types_match() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let grid = PopulationInitializer::new(&catalog).create_grid(&mut rng);
        for (_, a) in grid.occupied() {
            let expected = if a.subject_id == 3 { 2 } else { 1 };
            assert_eq!(a.classroom_id, Some(expected));
            assert!(catalog.can_teach(a.faculty_id.unwrap(), a.subject_id));
        }
    }

    #[test]
    fn test_pinned_cells_reproduced() {
        let catalog = Catalog::new(&pinned_scenario_input()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let cell = CellCoord::new(0, 0, 0);
        for grid in PopulationInitializer::new(&catalog).initialize(25, &mut rng) {
            assert_eq!(grid.get(cell), Some(&SlotAssignment::new(1, 1, 1)));
            // The pin counts toward the weekly target.
            assert_eq!(grid.subject_count(0, 1), 2);
        }
    }

    #[test]
    fn test_pinned_unspecified_fields_drawn() {
        let mut input = scenario_input();
        input
            .constraints
            .fixed_slots
            .push(crate::models::FixedSlot::new(2, "Tuesday", "1:00-2:00", 3));
        let catalog = Catalog::new(&input).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let grid = PopulationInitializer::new(&catalog).create_grid(&mut rng);
        let a = grid.get(CellCoord::new(1, 1, 4)).unwrap();
        assert_eq!(a.subject_id, 3);
        assert!(a.faculty_id.is_some());
        assert_eq!(a.classroom_id, Some(2));
    }

    #[test]
    fn test_no_faculty_leaves_cells_empty() {
        let mut input = scenario_input();
        input.faculty_subjects.retain(|l| l.subject_id != 3);
        let catalog = Catalog::new(&input).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let grid = PopulationInitializer::new(&catalog).create_grid(&mut rng);
        assert_eq!(grid.subject_count(0, 3), 0);
        assert_eq!(grid.subject_count(0, 1), 2);
    }

    #[test]
    fn test_no_room_keeps_null_classroom() {
        let mut input = scenario_input();
        input.classrooms.retain(|c| c.id != 2);
        let catalog = Catalog::new(&input).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let grid = PopulationInitializer::new(&catalog).create_grid(&mut rng);
        assert_eq!(grid.subject_count(0, 3), 2);
        assert!(grid
            .occupied()
            .filter(|(_, a)| a.subject_id == 3)
            .all(|(_, a)| a.classroom_id.is_none()));
    }

    #[test]
    fn test_theory_synchronized_across_batches() {
        let mut input = scenario_input();
        input.constraints.theory_sync = true;
        let catalog = Catalog::new(&input).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let grid = PopulationInitializer::new(&catalog).create_grid(&mut rng);

        for (cell, a) in grid.occupied().filter(|(c, _)| c.batch == 0) {
            let subject: &Subject = catalog.subject(a.subject_id).unwrap();
            if subject.is_theory() {
                let twin = grid.get(CellCoord::new(1, cell.day, cell.slot));
                assert_eq!(twin, Some(a));
            }
        }
        for batch in 0..2 {
            for subject in 1..=3 {
                assert_eq!(grid.subject_count(batch, subject), 2);
            }
        }
    }

    #[test]
    fn test_pinned_theory_mirrored_under_sync() {
        let mut input = pinned_scenario_input();
        input.constraints.theory_sync = true;
        let catalog = Catalog::new(&input).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        for grid in PopulationInitializer::new(&catalog).initialize(50, &mut rng) {
            let pinned = Some(&SlotAssignment::new(1, 1, 1));
            assert_eq!(grid.get(CellCoord::new(0, 0, 0)), pinned);
            assert_eq!(grid.get(CellCoord::new(1, 0, 0)), pinned);
            for batch in 0..2 {
                for subject in 1..=3 {
                    assert_eq!(grid.subject_count(batch, subject), 2);
                }
            }
        }
    }

    #[test]
    fn test_custom_room_never_assigned() {
        let seminar = Classroom::new(3, 1, RoomType::Custom("SEMINAR".into()));
        let catalog = Catalog::new(&scenario_input().with_classroom(seminar)).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        for grid in PopulationInitializer::new(&catalog).initialize(20, &mut rng) {
            assert!(grid.occupied().all(|(_, a)| a.classroom_id != Some(3)));
        }
    }

    #[test]
    fn test_seeded_initialization_is_deterministic() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let init = PopulationInitializer::new(&catalog);
        let a = init.initialize(5, &mut SmallRng::seed_from_u64(9));
        let b = init.initialize(5, &mut SmallRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
