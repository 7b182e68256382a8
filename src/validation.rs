//! Input validation for timetabling runs.
//!
//! Checks structural integrity of the input snapshot before the catalog
//! is built. Detects:
//! - Degenerate configurations (no batches, subjects, days, or usable slots)
//! - Duplicate IDs, day names, and slot labels
//! - References to missing subjects, faculty, rooms, batches, days, or slots
//! - Out-of-range values (zero weekly target, negative leave rates)
//! - Two fixed slots pinning the same cell
//!
//! All problems are collected; nothing is repaired.

use crate::models::ScheduleInput;
use std::collections::HashSet;
use std::fmt;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID (or a day/slot label repeats).
    DuplicateId,
    /// A link, fixed slot, leave rate, or preference names a missing entity.
    UnknownReference,
    /// A day name is not in the configured day list.
    UnknownDay,
    /// A slot label is not in the configured slot list.
    UnknownTimeSlot,
    /// Nothing to schedule, or nowhere to schedule it.
    DegenerateConfiguration,
    /// A value is out of range.
    InvalidValue,
    /// Two fixed slots pin the same cell.
    ConflictingFixedSlot,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

/// Validates the input snapshot for a scheduling run.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(input: &ScheduleInput) -> ValidationResult {
    use ValidationErrorKind::*;

    let mut errors = Vec::new();
    let constraints = &input.constraints;

    // Degenerate shapes
    if input.batches.is_empty() {
        errors.push(ValidationError::new(
            DegenerateConfiguration,
            "No batches to schedule",
        ));
    }
    if input.subjects.is_empty() {
        errors.push(ValidationError::new(
            DegenerateConfiguration,
            "No subjects to schedule",
        ));
    }
    if constraints.days.is_empty() {
        errors.push(ValidationError::new(
            DegenerateConfiguration,
            "No days configured",
        ));
    }
    let usable_slots = constraints
        .time_slots
        .iter()
        .filter(|s| !constraints.is_lunch(s))
        .count();
    if usable_slots == 0 {
        errors.push(ValidationError::new(
            DegenerateConfiguration,
            "No usable (non-lunch) time slots configured",
        ));
    }

    // Day and slot labels
    let mut days = HashSet::new();
    for day in &constraints.days {
        if !days.insert(day.as_str()) {
            errors.push(ValidationError::new(
                DuplicateId,
                format!("Duplicate day: {day}"),
            ));
        }
    }
    let mut slots = HashSet::new();
    for slot in &constraints.time_slots {
        if !slots.insert(slot.as_str()) {
            errors.push(ValidationError::new(
                DuplicateId,
                format!("Duplicate time slot: {slot}"),
            ));
        }
    }
    if let Some(lunch) = &constraints.lunch_break {
        if !slots.contains(lunch.as_str()) {
            errors.push(ValidationError::new(
                InvalidValue,
                format!("Lunch break '{lunch}' is not one of the configured time slots"),
            ));
        }
    }

    // Entity IDs
    let mut subject_ids = HashSet::new();
    for s in &input.subjects {
        if !subject_ids.insert(s.id) {
            errors.push(ValidationError::new(
                DuplicateId,
                format!("Duplicate subject ID: {}", s.id),
            ));
        }
        if s.classes_per_week == 0 {
            errors.push(ValidationError::new(
                InvalidValue,
                format!("Subject {} has a weekly target of zero", s.id),
            ));
        }
    }

    let mut faculty_ids = HashSet::new();
    for f in &input.faculty {
        if !faculty_ids.insert(f.id) {
            errors.push(ValidationError::new(
                DuplicateId,
                format!("Duplicate faculty ID: {}", f.id),
            ));
        }
        if let Some(leaves) = f.avg_leaves_per_month {
            if !leaves.is_finite() || leaves < 0.0 {
                errors.push(ValidationError::new(
                    InvalidValue,
                    format!("Faculty {} has invalid leave rate {leaves}", f.id),
                ));
            }
        }
    }

    let mut classroom_ids = HashSet::new();
    for c in &input.classrooms {
        if !classroom_ids.insert(c.id) {
            errors.push(ValidationError::new(
                DuplicateId,
                format!("Duplicate classroom ID: {}", c.id),
            ));
        }
    }

    let mut batch_ids = HashSet::new();
    for b in &input.batches {
        if !batch_ids.insert(b.id) {
            errors.push(ValidationError::new(
                DuplicateId,
                format!("Duplicate batch ID: {}", b.id),
            ));
        }
    }

    // Eligibility links
    for link in &input.faculty_subjects {
        if !faculty_ids.contains(&link.faculty_id) {
            errors.push(ValidationError::new(
                UnknownReference,
                format!(
                    "Eligibility link references unknown faculty {}",
                    link.faculty_id
                ),
            ));
        }
        if !subject_ids.contains(&link.subject_id) {
            errors.push(ValidationError::new(
                UnknownReference,
                format!(
                    "Eligibility link references unknown subject {}",
                    link.subject_id
                ),
            ));
        }
    }

    // Leave rates
    for (&faculty_id, &leaves) in &input.faculty_leaves {
        if !faculty_ids.contains(&faculty_id) {
            errors.push(ValidationError::new(
                UnknownReference,
                format!("Leave rate given for unknown faculty {faculty_id}"),
            ));
        }
        if !leaves.is_finite() || leaves < 0.0 {
            errors.push(ValidationError::new(
                InvalidValue,
                format!("Faculty {faculty_id} has invalid leave rate {leaves}"),
            ));
        }
    }

    // Fixed slots
    let mut pinned = HashSet::new();
    for fs in &constraints.fixed_slots {
        let at = format!("({}, {}, {})", fs.batch_id, fs.day, fs.time_slot);
        if !batch_ids.contains(&fs.batch_id) {
            errors.push(ValidationError::new(
                UnknownReference,
                format!("Fixed slot {at} references unknown batch {}", fs.batch_id),
            ));
        }
        if !days.contains(fs.day.as_str()) {
            errors.push(ValidationError::new(
                UnknownDay,
                format!("Fixed slot {at} references unknown day '{}'", fs.day),
            ));
        }
        if !slots.contains(fs.time_slot.as_str()) {
            errors.push(ValidationError::new(
                UnknownTimeSlot,
                format!(
                    "Fixed slot {at} references unknown time slot '{}'",
                    fs.time_slot
                ),
            ));
        }
        if !subject_ids.contains(&fs.subject_id) {
            errors.push(ValidationError::new(
                UnknownReference,
                format!("Fixed slot {at} references unknown subject {}", fs.subject_id),
            ));
        }
        if let Some(fid) = fs.faculty_id {
            if !faculty_ids.contains(&fid) {
                errors.push(ValidationError::new(
                    UnknownReference,
                    format!("Fixed slot {at} references unknown faculty {fid}"),
                ));
            }
        }
        if let Some(cid) = fs.classroom_id {
            if !classroom_ids.contains(&cid) {
                errors.push(ValidationError::new(
                    UnknownReference,
                    format!("Fixed slot {at} references unknown classroom {cid}"),
                ));
            }
        }
        if !pinned.insert((fs.batch_id, fs.day.as_str(), fs.time_slot.as_str())) {
            errors.push(ValidationError::new(
                ConflictingFixedSlot,
                format!("Cell {at} is pinned more than once"),
            ));
        }
    }

    // Time preferences
    for pref in &input.time_preferences {
        if !faculty_ids.contains(&pref.faculty_id) {
            errors.push(ValidationError::new(
                UnknownReference,
                format!(
                    "Time preference references unknown faculty {}",
                    pref.faculty_id
                ),
            ));
        }
        if !days.contains(pref.day.as_str()) {
            errors.push(ValidationError::new(
                UnknownDay,
                format!("Time preference references unknown day '{}'", pref.day),
            ));
        }
        if !slots.contains(pref.time_slot.as_str()) {
            errors.push(ValidationError::new(
                UnknownTimeSlot,
                format!(
                    "Time preference references unknown time slot '{}'",
                    pref.time_slot
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
