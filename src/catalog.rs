//! Domain catalog.
//!
//! Indexed, read-only view of one run's input: id-keyed lookups, the
//! positional day/slot/batch enumerations the grid is laid out by, and
//! derived groupings (subjects per department, eligible faculty per
//! subject, rooms per department and type, pinned cells).
//!
//! Built once per run. Construction validates the whole input and fails
//! fast on any broken reference.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, warn};

use crate::error::Result;
use crate::ga::{CellCoord, GridDims};
use crate::models::{
    Batch, BatchId, Classroom, ClassroomId, ConstraintSet, DepartmentId, Faculty, FacultyId,
    RoomType, ScheduleInput, Subject, SubjectId,
};
use crate::validation::validate_input;

/// A fixed slot resolved to grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedCell {
    /// Grid coordinate.
    pub cell: CellCoord,
    /// Pinned subject.
    pub subject_id: SubjectId,
    /// Pinned faculty member, if any.
    pub faculty_id: Option<FacultyId>,
    /// Pinned room, if any.
    pub classroom_id: Option<ClassroomId>,
}

/// Lookup tables for one scheduling run.
#[derive(Debug, Clone)]
pub struct Catalog {
    subjects: Vec<Subject>,
    subject_index: HashMap<SubjectId, usize>,
    faculty: Vec<Faculty>,
    faculty_index: HashMap<FacultyId, usize>,
    classrooms: Vec<Classroom>,
    classroom_index: HashMap<ClassroomId, usize>,
    batches: Vec<Batch>,
    batch_index: HashMap<BatchId, usize>,
    constraints: ConstraintSet,
    day_index: HashMap<String, usize>,
    slot_index: HashMap<String, usize>,
    lunch_slot: Option<usize>,
    subjects_by_department: BTreeMap<DepartmentId, Vec<SubjectId>>,
    batches_by_department: BTreeMap<DepartmentId, Vec<usize>>,
    eligible_faculty: HashMap<SubjectId, Vec<FacultyId>>,
    rooms: HashMap<(DepartmentId, RoomType), Vec<ClassroomId>>,
    leaves: HashMap<FacultyId, f64>,
    pinned: Vec<PinnedCell>,
    pinned_cells: HashSet<CellCoord>,
    keep_free: HashSet<(FacultyId, usize, usize)>,
}

impl Catalog {
    /// Validates `input` and builds the lookup tables.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidInput`](crate::SchedulerError::InvalidInput)
    /// listing every problem found by [`validate_input`].
    pub fn new(input: &ScheduleInput) -> Result<Self> {
        validate_input(input)?;

        let constraints = input.constraints.clone();

        let subject_index = input
            .subjects
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, i))
            .collect();
        let faculty_index = input
            .faculty
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();
        let classroom_index = input
            .classrooms
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();
        let batch_index: HashMap<BatchId, usize> = input
            .batches
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id, i))
            .collect();

        let day_index = constraints
            .days
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();
        let slot_index: HashMap<String, usize> = constraints
            .time_slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let lunch_slot = constraints
            .lunch_break
            .as_ref()
            .and_then(|l| slot_index.get(l).copied());

        let mut subjects_by_department: BTreeMap<DepartmentId, Vec<SubjectId>> = BTreeMap::new();
        for s in &input.subjects {
            subjects_by_department
                .entry(s.department_id)
                .or_default()
                .push(s.id);
        }

        let mut batches_by_department: BTreeMap<DepartmentId, Vec<usize>> = BTreeMap::new();
        for (i, b) in input.batches.iter().enumerate() {
            batches_by_department
                .entry(b.department_id)
                .or_default()
                .push(i);
        }

        let mut rooms: HashMap<(DepartmentId, RoomType), Vec<ClassroomId>> = HashMap::new();
        for c in &input.classrooms {
            rooms
                .entry((c.department_id, c.room_type.clone()))
                .or_default()
                .push(c.id);
        }

        let mut leaves: HashMap<FacultyId, f64> = input
            .faculty
            .iter()
            .filter_map(|f| f.avg_leaves_per_month.map(|l| (f.id, l)))
            .collect();
        leaves.extend(input.faculty_leaves.iter().map(|(&id, &l)| (id, l)));

        let mut catalog = Self {
            subjects: input.subjects.clone(),
            subject_index,
            faculty: input.faculty.clone(),
            faculty_index,
            classrooms: input.classrooms.clone(),
            classroom_index,
            batches: input.batches.clone(),
            batch_index,
            constraints,
            day_index,
            slot_index,
            lunch_slot,
            subjects_by_department,
            batches_by_department,
            eligible_faculty: HashMap::new(),
            rooms,
            leaves,
            pinned: Vec::new(),
            pinned_cells: HashSet::new(),
            keep_free: HashSet::new(),
        };

        catalog.build_eligibility(input);
        catalog.resolve_pinned_cells();
        catalog.resolve_preferences(input);

        debug!(
            "Catalog built: {} subjects, {} faculty, {} classrooms, {} batches, {} pinned cells",
            catalog.subjects.len(),
            catalog.faculty.len(),
            catalog.classrooms.len(),
            catalog.batches.len(),
            catalog.pinned.len()
        );

        Ok(catalog)
    }

    fn build_eligibility(&mut self, input: &ScheduleInput) {
        for link in &input.faculty_subjects {
            let list = self.eligible_faculty.entry(link.subject_id).or_default();
            if !list.contains(&link.faculty_id) {
                list.push(link.faculty_id);
            }
        }

        for subject in &self.subjects {
            let has_links = self
                .eligible_faculty
                .get(&subject.id)
                .is_some_and(|l| !l.is_empty());

            if !has_links && self.constraints.department_fallback {
                let inferred: Vec<FacultyId> = self
                    .faculty
                    .iter()
                    .filter(|f| f.department_id == subject.department_id)
                    .map(|f| f.id)
                    .collect();
                warn!(
                    "Subject {} has no eligibility links; inferring {} faculty from department {}",
                    subject.id,
                    inferred.len(),
                    subject.department_id
                );
                self.eligible_faculty.insert(subject.id, inferred);
            }

            if self.eligible_faculty_for(subject.id).is_empty() {
                warn!(
                    "Subject {} has no eligible faculty; its cells will stay empty",
                    subject.id
                );
            }
            if self.rooms_for(subject).is_empty() {
                warn!(
                    "Subject {} has no {:?} room in department {}; it will be placed without a room",
                    subject.id,
                    subject.subject_type.required_room(),
                    subject.department_id
                );
            }
        }
    }

    fn resolve_pinned_cells(&mut self) {
        if !self.constraints.enforce_fixed_slots {
            return;
        }
        let mut pinned = Vec::with_capacity(self.constraints.fixed_slots.len());
        for fs in &self.constraints.fixed_slots {
            // Validation guarantees every reference resolves.
            let (Some(batch), Some(day), Some(slot)) = (
                self.batch_position(fs.batch_id),
                self.day_position(&fs.day),
                self.slot_position(&fs.time_slot),
            ) else {
                continue;
            };
            pinned.push(PinnedCell {
                cell: CellCoord::new(batch, day, slot),
                subject_id: fs.subject_id,
                faculty_id: fs.faculty_id,
                classroom_id: fs.classroom_id,
            });
        }
        self.pinned_cells = pinned.iter().map(|p| p.cell).collect();
        self.pinned = pinned;
    }

    fn resolve_preferences(&mut self, input: &ScheduleInput) {
        let mut keep_free = HashSet::new();
        for pref in &input.time_preferences {
            if let (Some(day), Some(slot)) = (
                self.day_position(&pref.day),
                self.slot_position(&pref.time_slot),
            ) {
                keep_free.insert((pref.faculty_id, day, slot));
            }
        }
        self.keep_free = keep_free;
    }

    // ======================== Entities ========================

    /// Looks up a subject.
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subject_index.get(&id).map(|&i| &self.subjects[i])
    }

    /// Looks up a faculty member.
    pub fn faculty(&self, id: FacultyId) -> Option<&Faculty> {
        self.faculty_index.get(&id).map(|&i| &self.faculty[i])
    }

    /// Looks up a room.
    pub fn classroom(&self, id: ClassroomId) -> Option<&Classroom> {
        self.classroom_index.get(&id).map(|&i| &self.classrooms[i])
    }

    /// All subjects in input order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// All faculty in input order.
    pub fn faculty_members(&self) -> &[Faculty] {
        &self.faculty
    }

    /// All rooms in input order.
    pub fn classrooms(&self) -> &[Classroom] {
        &self.classrooms
    }

    /// All batches in grid order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Batch at a grid position.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn batch_at(&self, index: usize) -> &Batch {
        &self.batches[index]
    }

    /// Grid position of a batch.
    pub fn batch_position(&self, id: BatchId) -> Option<usize> {
        self.batch_index.get(&id).copied()
    }

    // ======================== Week shape ========================

    /// The run's constraint set.
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// Grid dimensions.
    pub fn dims(&self) -> GridDims {
        GridDims::new(
            self.batches.len(),
            self.constraints.days.len(),
            self.constraints.time_slots.len(),
        )
    }

    /// Ordered day names.
    pub fn days(&self) -> &[String] {
        &self.constraints.days
    }

    /// Ordered time-slot labels.
    pub fn time_slots(&self) -> &[String] {
        &self.constraints.time_slots
    }

    /// Position of a day name.
    pub fn day_position(&self, day: &str) -> Option<usize> {
        self.day_index.get(day).copied()
    }

    /// Position of a slot label.
    pub fn slot_position(&self, slot: &str) -> Option<usize> {
        self.slot_index.get(slot).copied()
    }

    /// Resolves a keyed cell to grid coordinates.
    pub fn locate(&self, batch_id: BatchId, day: &str, time_slot: &str) -> Option<CellCoord> {
        Some(CellCoord::new(
            self.batch_position(batch_id)?,
            self.day_position(day)?,
            self.slot_position(time_slot)?,
        ))
    }

    /// Position of the lunch slot.
    pub fn lunch_slot(&self) -> Option<usize> {
        self.lunch_slot
    }

    /// Whether slot position `slot` is the lunch slot.
    #[inline]
    pub fn is_lunch(&self, slot: usize) -> bool {
        self.lunch_slot == Some(slot)
    }

    /// Whether theory synchronization is on.
    pub fn theory_sync(&self) -> bool {
        self.constraints.theory_sync
    }

    // ======================== Groupings ========================

    /// Subjects owned by a department, in input order.
    pub fn subjects_for_department(&self, department_id: DepartmentId) -> &[SubjectId] {
        self.subjects_by_department
            .get(&department_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Batch positions grouped by department, departments ascending.
    pub fn department_batches(&self) -> impl Iterator<Item = (DepartmentId, &[usize])> {
        self.batches_by_department
            .iter()
            .map(|(&d, b)| (d, b.as_slice()))
    }

    /// Faculty eligible to teach a subject.
    pub fn eligible_faculty_for(&self, subject_id: SubjectId) -> &[FacultyId] {
        self.eligible_faculty
            .get(&subject_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `faculty_id` may teach `subject_id`.
    pub fn can_teach(&self, faculty_id: FacultyId, subject_id: SubjectId) -> bool {
        self.eligible_faculty_for(subject_id).contains(&faculty_id)
    }

    /// Rooms of the subject's department matching its required room type.
    pub fn rooms_for(&self, subject: &Subject) -> &[ClassroomId] {
        self.rooms
            .get(&(subject.department_id, subject.subject_type.required_room()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ======================== Faculty limits ========================

    /// Daily hour limit (own value, else the global fallback).
    pub fn max_hours_per_day(&self, faculty_id: FacultyId) -> u32 {
        self.faculty(faculty_id)
            .and_then(|f| f.max_hours_per_day)
            .unwrap_or(self.constraints.max_hours_per_faculty)
    }

    /// Average leaves per month (0 when unknown).
    pub fn leaves_per_month(&self, faculty_id: FacultyId) -> f64 {
        self.leaves.get(&faculty_id).copied().unwrap_or(0.0)
    }

    /// Whether the faculty member asked for this slot to be kept free.
    pub fn wants_free(&self, faculty_id: FacultyId, day: usize, slot: usize) -> bool {
        self.keep_free.contains(&(faculty_id, day, slot))
    }

    /// Whether any keep-free preferences were supplied.
    pub fn has_time_preferences(&self) -> bool {
        !self.keep_free.is_empty()
    }

    // ======================== Pinned cells ========================

    /// Enforced fixed slots, resolved to coordinates.
    ///
    /// Empty when fixed-slot enforcement is off.
    pub fn pinned_cells(&self) -> &[PinnedCell] {
        &self.pinned
    }

    /// Whether a coordinate is pinned.
    #[inline]
    pub fn is_pinned(&self, cell: CellCoord) -> bool {
        self.pinned_cells.contains(&cell)
    }
}
