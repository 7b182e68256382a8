//! Timetabling domain models.
//!
//! Provides the entities the scheduler reads (subjects, faculty, rooms,
//! batches, constraints) and the timetable it produces.
//!
//! # Domain Mappings
//!
//! | u-timetable | University | School |
//! |-------------|------------|--------|
//! | Batch | Section / Cohort | Class / Grade |
//! | Subject | Course | Subject |
//! | Faculty | Lecturer | Teacher |
//! | Classroom | Lecture Hall / Lab | Room |

mod batch;
mod classroom;
mod constraint;
mod faculty;
mod input;
mod subject;
mod timetable;

pub use batch::Batch;
pub use classroom::{Classroom, RoomType};
pub use constraint::{ConstraintSet, FixedSlot, TimePreference};
pub use faculty::{Faculty, FacultySubject};
pub use input::ScheduleInput;
pub use subject::{Subject, SubjectType};
pub use timetable::{
    BatchSchedule, DaySchedule, SlotView, Timetable, TimetableEntry, TimetableView, Violation,
    ViolationType,
};

/// Department identifier.
pub type DepartmentId = u32;
/// Subject identifier.
pub type SubjectId = u32;
/// Faculty identifier.
pub type FacultyId = u32;
/// Classroom identifier.
pub type ClassroomId = u32;
/// Batch identifier.
pub type BatchId = u32;
