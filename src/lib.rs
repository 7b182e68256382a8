//! Weekly timetable scheduling for academic departments.
//!
//! Places subjects into a (batch × day × time-slot) grid with a genetic
//! algorithm, assigning an eligible faculty member and a room of the right
//! type to every class while minimizing weighted constraint violations.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Subject`, `Faculty`, `Classroom`, `Batch`,
//!   `ConstraintSet`, `FixedSlot`, `Timetable`
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   references, degenerate week shapes)
//! - **`catalog`**: Indexed, read-only view of one run's input
//! - **`fitness`**: Constraint rules and the weighted-penalty evaluator
//! - **`ga`**: Slot grid, population initializer, operators, GA runner
//! - **`scheduler`**: `TimetableScheduler` facade and timetable KPIs
//!
//! # Fitness
//!
//! `fitness = max(0, baseline − Σ count × weight)` with a baseline of 1000.
//! Higher is better; 1000 means no rule is violated.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization, and Machine Learning"

pub mod catalog;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

#[cfg(test)]
mod test_fixtures;

pub use error::{Result, SchedulerError};
