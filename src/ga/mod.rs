//! GA-based timetable optimization.
//!
//! A chromosome is a full-week [`TimetableGrid`] across all batches.
//! Generation 0 honors pinned cells and weekly targets; evolution then
//! trades whole days between parents and resamples single free cells.
//!
//! # Submodules
//!
//! - [`grid`]: the slot grid (chromosome)
//! - [`init`]: population initializer
//! - [`operators`]: selection, day-axis crossover, slot mutation, elitism
//! - [`runner`]: generic generational driver ([`GaRunner`])
//! - [`problem`]: binds grids, fitness and operators to [`GaProblem`]

pub mod grid;
pub mod init;
pub mod operators;
mod problem;
pub mod runner;

pub use grid::{CellCoord, GridDims, SlotAssignment, TimetableGrid};
pub use init::PopulationInitializer;
pub use problem::TimetableProblem;
pub use runner::{CancelToken, GaConfig, GaProblem, GaResult, GaRunner};
