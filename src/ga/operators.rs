//! Evolutionary operators for timetable grids.
//!
//! - **Selection**: [`tournament_select`] and [`elite_indices`] work on a
//!   generation's fitness values and are independent of the encoding.
//! - **Crossover**: [`day_crossover`] exchanges whole days at one cut
//!   point, so a batch's day is always inherited from a single parent.
//! - **Mutation**: [`slot_mutation`] resamples or clears one free cell.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::default();
//! assert!((ops.fill_probability - 0.6).abs() < 1e-10);
//! ```

use std::cmp::Ordering;

use rand::Rng;
use rand::seq::IndexedRandom;
use rand::seq::index::sample;

use super::grid::{CellCoord, SlotAssignment, TimetableGrid};
use super::init::random_assignment;
use crate::catalog::Catalog;
use crate::models::{Subject, SubjectType};

// ======================== Selection ========================

/// Tournament selection (higher fitness wins).
///
/// Draws `size` distinct contestants; ties go to the first drawn.
///
/// # Panics
/// If `fitness` is empty.
pub fn tournament_select<R: Rng>(fitness: &[f64], size: usize, rng: &mut R) -> usize {
    assert!(!fitness.is_empty(), "tournament over an empty population");
    let k = size.clamp(1, fitness.len());
    let mut contestants = sample(rng, fitness.len(), k).into_iter();
    let mut best = contestants.next().unwrap_or(0);
    for i in contestants {
        if fitness[i] > fitness[best] {
            best = i;
        }
    }
    best
}

/// Indices of the `count` fittest individuals, best first.
///
/// Equal fitness keeps population order.
pub fn elite_indices(fitness: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| {
        fitness[b]
            .partial_cmp(&fitness[a])
            .unwrap_or(Ordering::Equal)
    });
    order.truncate(count);
    order
}

// ======================== Crossover ========================

/// Single-point crossover on the day axis with a random cut in `1..days`.
///
/// With fewer than two days the parents are returned unchanged.
pub fn day_crossover<R: Rng>(
    p1: &TimetableGrid,
    p2: &TimetableGrid,
    rng: &mut R,
) -> (TimetableGrid, TimetableGrid) {
    let days = p1.dims().days;
    if days < 2 {
        return (p1.clone(), p2.clone());
    }
    day_crossover_at(p1, p2, rng.random_range(1..days))
}

/// Day-axis crossover at a given cut.
///
/// Child 1 takes days `..cut` from `p1` and `cut..` from `p2` for every
/// batch; child 2 is the complement.
pub fn day_crossover_at(
    p1: &TimetableGrid,
    p2: &TimetableGrid,
    cut: usize,
) -> (TimetableGrid, TimetableGrid) {
    let mut c1 = p1.clone();
    let mut c2 = p2.clone();
    for day in cut..p1.dims().days {
        c1.copy_day_from(p2, day);
        c2.copy_day_from(p1, day);
    }
    (c1, c2)
}

// ======================== Mutation ========================

/// Cells mutation may touch: not lunch, not pinned, and under theory
/// synchronization only empty or lab cells.
pub fn mutable_cells(grid: &TimetableGrid, catalog: &Catalog) -> Vec<CellCoord> {
    let sync = catalog.theory_sync();
    grid.cells()
        .filter(|&(c, _)| !catalog.is_lunch(c.slot) && !catalog.is_pinned(c))
        .filter(|&(_, a)| !sync || is_empty_or_lab(a, catalog))
        .map(|(c, _)| c)
        .collect()
}

fn is_empty_or_lab(cell: Option<&SlotAssignment>, catalog: &Catalog) -> bool {
    match cell {
        None => true,
        Some(a) => catalog
            .subject(a.subject_id)
            .is_some_and(|s| s.subject_type == SubjectType::Lab),
    }
}

/// Mutates one random free cell.
///
/// With probability `fill_probability` the cell gets a fresh subject
/// still below its weekly target (the cell's own class is not counted),
/// with random eligible faculty and room; otherwise it is cleared.
/// Returns the touched cell.
pub fn slot_mutation<R: Rng>(
    grid: &mut TimetableGrid,
    catalog: &Catalog,
    fill_probability: f64,
    rng: &mut R,
) -> Option<CellCoord> {
    let cells = mutable_cells(grid, catalog);
    let &cell = cells.choose(rng)?;

    if rng.random_bool(fill_probability.clamp(0.0, 1.0)) {
        let assignment = resample_subject(grid, catalog, cell, rng)
            .and_then(|subject| random_assignment(catalog, subject, rng));
        grid.set(cell, assignment);
    } else {
        grid.set(cell, None);
    }
    Some(cell)
}

fn resample_subject<'c, R: Rng>(
    grid: &TimetableGrid,
    catalog: &'c Catalog,
    cell: CellCoord,
    rng: &mut R,
) -> Option<&'c Subject> {
    let department = catalog.batch_at(cell.batch).department_id;
    let own = grid.get(cell).map(|a| a.subject_id);
    let counts = grid.subject_counts(cell.batch);
    let labs_only = catalog.theory_sync();

    let candidates: Vec<&Subject> = catalog
        .subjects_for_department(department)
        .iter()
        .filter_map(|&id| catalog.subject(id))
        .filter(|s| !labs_only || s.subject_type == SubjectType::Lab)
        .filter(|s| {
            let scheduled = counts.get(&s.id).copied().unwrap_or(0);
            let others = if own == Some(s.id) {
                scheduled.saturating_sub(1)
            } else {
                scheduled
            };
            others < s.classes_per_week
        })
        .collect();
    candidates.choose(rng).copied()
}

// ======================== Operator set ========================

/// Grid operators with their tunable parameters.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Chance a mutated cell is refilled rather than cleared.
    pub fill_probability: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            fill_probability: 0.6,
        }
    }
}

impl GeneticOperators {
    /// Creates operators with a fill probability.
    pub fn new(fill_probability: f64) -> Self {
        Self { fill_probability }
    }

    /// Day-axis crossover.
    pub fn crossover<R: Rng>(
        &self,
        p1: &TimetableGrid,
        p2: &TimetableGrid,
        rng: &mut R,
    ) -> (TimetableGrid, TimetableGrid) {
        day_crossover(p1, p2, rng)
    }

    /// Slot mutation.
    pub fn mutate<R: Rng>(&self, grid: &mut TimetableGrid, catalog: &Catalog, rng: &mut R) {
        slot_mutation(grid, catalog, self.fill_probability, rng);
    }
}
