//! Constraint evaluation and fitness.
//!
//! Fitness starts from a fixed baseline and subtracts one weighted term per
//! constraint rule, clamped at zero. Higher is better; a grid that breaks
//! nothing scores exactly the baseline.
//!
//! Rules are pluggable: [`FitnessEvaluator::standard`] installs the built-in
//! set matching the run's capability flags, and callers can append their
//! own with [`FitnessEvaluator::with_rule`].
//!
//! # Usage
//!
//! ```no_run
//! use u_timetable::catalog::Catalog;
//! use u_timetable::fitness::{ConstraintWeights, FitnessEvaluator};
//! use u_timetable::ga::TimetableGrid;
//! # fn demo(catalog: &Catalog, grid: &TimetableGrid) {
//! let evaluator = FitnessEvaluator::standard(catalog, ConstraintWeights::default());
//! let report = evaluator.report(grid, catalog);
//! for term in report.violations() {
//!     println!("{}: {} × {}", term.violation_type.name(), term.count, term.weight);
//! }
//! # }
//! ```

pub mod rules;

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::ga::TimetableGrid;
use crate::models::{Violation, ViolationType};

/// Score of a grid that violates nothing.
pub const DEFAULT_BASELINE: f64 = 1000.0;

/// A constraint that counts its violations on a grid.
///
/// Counts are unweighted; the evaluator applies [`ConstraintWeights`].
pub trait ConstraintRule: Send + Sync + Debug {
    /// Violation category this rule reports.
    fn kind(&self) -> ViolationType;

    /// Rule name.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Number of violations (fractional for excess-hour terms).
    fn count(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64;
}

/// Penalty weight per violation category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintWeights {
    /// Faculty in two cells at once.
    pub faculty_conflict: f64,
    /// Room in two cells at once.
    pub classroom_conflict: f64,
    /// Weekly load above daily limit × days.
    pub workload: f64,
    /// Class in a slot the faculty member wants free.
    pub time_preference: f64,
    /// Each slot beyond the third in a run.
    pub consecutive_classes: f64,
    /// Occupied lunch cell.
    pub lunch_break: f64,
    /// Weekly count off target, per class.
    pub subject_distribution: f64,
    /// Classes above the daily cap.
    pub daily_limit: f64,
    /// Mismatching pinned field.
    pub fixed_slot: f64,
    /// Hours above leave-adjusted availability.
    pub faculty_availability: f64,
    /// Extra theory subject in one department slot.
    pub theory_sync: f64,
}

impl Default for ConstraintWeights {
    fn default() -> Self {
        Self {
            faculty_conflict: 50.0,
            classroom_conflict: 50.0,
            workload: 30.0,
            time_preference: 20.0,
            consecutive_classes: 25.0,
            lunch_break: 15.0,
            subject_distribution: 40.0,
            daily_limit: 35.0,
            fixed_slot: 60.0,
            faculty_availability: 25.0,
            theory_sync: 100.0,
        }
    }
}

impl ConstraintWeights {
    /// Weight applied to a violation category.
    pub fn weight(&self, kind: ViolationType) -> f64 {
        match kind {
            ViolationType::FacultyDoubleBooking => self.faculty_conflict,
            ViolationType::ClassroomDoubleBooking => self.classroom_conflict,
            ViolationType::WorkloadOverrun => self.workload,
            ViolationType::TimePreference => self.time_preference,
            ViolationType::ConsecutiveOverrun => self.consecutive_classes,
            ViolationType::LunchBreakOccupied => self.lunch_break,
            ViolationType::SubjectCountMismatch => self.subject_distribution,
            ViolationType::DailyOverload => self.daily_limit,
            ViolationType::FixedSlotMismatch => self.fixed_slot,
            ViolationType::FacultyAvailability => self.faculty_availability,
            ViolationType::TheorySyncConflict => self.theory_sync,
        }
    }

    /// Sets the weight of one category.
    pub fn with_weight(mut self, kind: ViolationType, weight: f64) -> Self {
        let slot = match kind {
            ViolationType::FacultyDoubleBooking => &mut self.faculty_conflict,
            ViolationType::ClassroomDoubleBooking => &mut self.classroom_conflict,
            ViolationType::WorkloadOverrun => &mut self.workload,
            ViolationType::TimePreference => &mut self.time_preference,
            ViolationType::ConsecutiveOverrun => &mut self.consecutive_classes,
            ViolationType::LunchBreakOccupied => &mut self.lunch_break,
            ViolationType::SubjectCountMismatch => &mut self.subject_distribution,
            ViolationType::DailyOverload => &mut self.daily_limit,
            ViolationType::FixedSlotMismatch => &mut self.fixed_slot,
            ViolationType::FacultyAvailability => &mut self.faculty_availability,
            ViolationType::TheorySyncConflict => &mut self.theory_sync,
        };
        *slot = weight;
        self
    }
}

/// Itemized fitness of one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Starting score.
    pub baseline: f64,
    /// `max(0, baseline - Σ penalty)`.
    pub score: f64,
    /// One term per installed rule, in evaluation order.
    pub terms: Vec<Violation>,
}

impl FitnessReport {
    /// Sum of all penalties (before clamping).
    pub fn total_penalty(&self) -> f64 {
        self.terms.iter().map(|t| t.penalty).sum()
    }

    /// Terms with a non-zero count.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.terms.iter().filter(|t| t.is_violated())
    }

    /// Term for one category, if that rule was installed.
    pub fn term(&self, kind: ViolationType) -> Option<&Violation> {
        self.terms.iter().find(|t| t.violation_type == kind)
    }

    /// Whether the grid breaks no constraint.
    pub fn is_clean(&self) -> bool {
        self.violations().next().is_none()
    }
}

/// Weighted sum of constraint rules.
#[derive(Clone)]
pub struct FitnessEvaluator {
    baseline: f64,
    weights: ConstraintWeights,
    rules: Vec<Arc<dyn ConstraintRule>>,
}

impl FitnessEvaluator {
    /// Creates an evaluator with no rules.
    pub fn new(weights: ConstraintWeights) -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            weights,
            rules: Vec::new(),
        }
    }

    /// Creates an evaluator with the built-in rules.
    ///
    /// The fixed-slot rule is installed only when fixed slots are enforced,
    /// and the theory-sync rule only when synchronization is on.
    pub fn standard(catalog: &Catalog, weights: ConstraintWeights) -> Self {
        let mut evaluator = Self::new(weights)
            .with_rule(rules::FacultyConflict)
            .with_rule(rules::ClassroomConflict)
            .with_rule(rules::WeeklyWorkload)
            .with_rule(rules::TimePreferences)
            .with_rule(rules::ConsecutiveClasses::default())
            .with_rule(rules::LunchBreak)
            .with_rule(rules::SubjectDistribution)
            .with_rule(rules::DailyLimit);
        if catalog.constraints().enforce_fixed_slots {
            evaluator = evaluator.with_rule(rules::FixedSlots);
        }
        evaluator = evaluator.with_rule(rules::FacultyAvailability::default());
        if catalog.theory_sync() {
            evaluator = evaluator.with_rule(rules::TheorySync);
        }
        evaluator
    }

    /// Sets the baseline score.
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// Appends a rule.
    pub fn with_rule<R: ConstraintRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Baseline score.
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Penalty weights.
    pub fn weights(&self) -> &ConstraintWeights {
        &self.weights
    }

    /// Installed rules, in evaluation order.
    pub fn rules(&self) -> &[Arc<dyn ConstraintRule>] {
        &self.rules
    }

    /// Sum of weighted violation counts.
    pub fn total_penalty(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        self.rules
            .iter()
            .map(|r| r.count(grid, catalog) * self.weights.weight(r.kind()))
            .sum()
    }

    /// Fitness of a grid. Never negative.
    pub fn evaluate(&self, grid: &TimetableGrid, catalog: &Catalog) -> f64 {
        (self.baseline - self.total_penalty(grid, catalog)).max(0.0)
    }

    /// Itemized fitness of a grid.
    pub fn report(&self, grid: &TimetableGrid, catalog: &Catalog) -> FitnessReport {
        let terms: Vec<Violation> = self
            .rules
            .iter()
            .map(|r| {
                let kind = r.kind();
                Violation::new(kind, r.count(grid, catalog), self.weights.weight(kind))
            })
            .collect();
        let total: f64 = terms.iter().map(|t| t.penalty).sum();
        FitnessReport {
            baseline: self.baseline,
            score: (self.baseline - total).max(0.0),
            terms,
        }
    }
}

impl Debug for FitnessEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitnessEvaluator")
            .field("baseline", &self.baseline)
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.name(), self.weights.weight(r.kind())))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
