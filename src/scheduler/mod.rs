//! Timetable scheduler facade and KPI evaluation.
//!
//! [`TimetableScheduler`] takes a [`ScheduleInput`](crate::models::ScheduleInput)
//! snapshot, evolves a weekly timetable with the GA, and returns the best
//! timetable with its fitness report.
//!
//! # KPI
//!
//! [`TimetableKpi`] summarizes a finished grid: fill rate, faculty load,
//! room utilization and unmet weekly classes.

mod kpi;
mod timetable;

pub use kpi::TimetableKpi;
pub use timetable::{ScheduleOutput, ScheduleRequest, TimetableScheduler};
