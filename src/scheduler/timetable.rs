//! GA timetable scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the input and build the catalog (fails fast).
//! 2. Install the constraint rules matching the run's capability flags.
//! 3. Evolve a population of grids for the configured generations.
//! 4. Flatten the best grid into timetable entries, with its fitness
//!    report and KPIs.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::kpi::TimetableKpi;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::fitness::{ConstraintWeights, FitnessEvaluator, FitnessReport};
use crate::ga::operators::GeneticOperators;
use crate::ga::{CancelToken, GaConfig, GaRunner, TimetableProblem};
use crate::models::{ScheduleInput, Timetable};

/// Everything one scheduling run needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleRequest {
    /// Entities and constraints.
    pub input: ScheduleInput,
    /// GA parameters.
    pub ga: GaConfig,
    /// Penalty weights.
    pub weights: ConstraintWeights,
}

impl ScheduleRequest {
    /// Creates a request with default GA parameters and weights.
    pub fn new(input: ScheduleInput) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    /// Sets the GA parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the penalty weights.
    pub fn with_weights(mut self, weights: ConstraintWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// Result of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    /// Best timetable found.
    pub timetable: Timetable,
    /// Itemized fitness of that timetable.
    pub report: FitnessReport,
    /// Quality indicators of that timetable.
    pub kpi: TimetableKpi,
    /// Generations bred.
    pub generations: usize,
    /// Best-so-far fitness per evaluated generation.
    pub history: Vec<f64>,
    /// Whether the run was cancelled.
    pub cancelled: bool,
}

/// Weekly timetable scheduler.
///
/// # Example
/// ```no_run
/// use u_timetable::ga::GaConfig;
/// use u_timetable::models::ScheduleInput;
/// use u_timetable::scheduler::TimetableScheduler;
///
/// # fn demo(input: &ScheduleInput) -> u_timetable::Result<()> {
/// let scheduler = TimetableScheduler::new(input)?;
/// let output = scheduler.run(&GaConfig::default().with_seed(7))?;
/// println!("fitness {}", output.timetable.fitness);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TimetableScheduler {
    catalog: Catalog,
    weights: ConstraintWeights,
}

impl TimetableScheduler {
    /// Validates `input` and prepares a scheduler.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidInput`](crate::SchedulerError::InvalidInput)
    /// if the input has broken references or a degenerate shape.
    pub fn new(input: &ScheduleInput) -> Result<Self> {
        Ok(Self {
            catalog: Catalog::new(input)?,
            weights: ConstraintWeights::default(),
        })
    }

    /// Sets the penalty weights.
    pub fn with_weights(mut self, weights: ConstraintWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Runs a full request.
    ///
    /// # Errors
    /// Input or configuration errors; see [`TimetableScheduler::new`] and
    /// [`GaConfig::validate`].
    pub fn schedule(request: &ScheduleRequest) -> Result<ScheduleOutput> {
        Self::new(&request.input)?
            .with_weights(request.weights.clone())
            .run(&request.ga)
    }

    /// The run's catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The evaluator this scheduler scores grids with.
    pub fn evaluator(&self) -> FitnessEvaluator {
        FitnessEvaluator::standard(&self.catalog, self.weights.clone())
    }

    /// Evolves a timetable.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`](crate::SchedulerError::InvalidConfig)
    /// if `config` fails validation.
    pub fn run(&self, config: &GaConfig) -> Result<ScheduleOutput> {
        self.run_with_cancel(config, &CancelToken::new())
    }

    /// One-line description of the problem size, logged at the start of a run.
    fn run_summary(&self) -> String {
        let constraints = self.catalog.constraints();
        format!(
            "Scheduling {} batch(es), {} subject(s), {} faculty, {} room(s) over {} day(s) × {} slot(s) (theory_sync={}, pinned={})",
            self.catalog.batches().len(),
            self.catalog.subjects().len(),
            self.catalog.faculty_members().len(),
            self.catalog.classrooms().len(),
            constraints.days.len(),
            constraints.time_slots.len(),
            constraints.theory_sync,
            self.catalog.pinned_cells().len()
        )
    }

    /// Evolves a timetable, stopping early when `cancel` is set.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`](crate::SchedulerError::InvalidConfig)
    /// if `config` fails validation.
    pub fn run_with_cancel(&self, config: &GaConfig, cancel: &CancelToken) -> Result<ScheduleOutput> {
        config.validate()?;

        info!("{}", self.run_summary());

        let evaluator = self.evaluator();
        let problem = TimetableProblem::new(&self.catalog, evaluator.clone())
            .with_operators(GeneticOperators::new(config.fill_probability));
        let result = GaRunner::run_with_cancel(&problem, config, cancel)?;

        let report = evaluator.report(&result.best, &self.catalog);
        let kpi = TimetableKpi::calculate(&result.best, &self.catalog);
        if !kpi.is_complete() {
            warn!(
                "{} weekly class(es) could not be placed; check eligibility and rooms",
                kpi.unmet_classes
            );
        }
        for term in report.violations() {
            info!(
                "  {}: {} violation(s), penalty {:.1}",
                term.violation_type.name(),
                term.count,
                term.penalty
            );
        }

        Ok(ScheduleOutput {
            timetable: Timetable::new(result.best_fitness, result.best.to_entries(&self.catalog)),
            report,
            kpi,
            generations: result.generations,
            history: result.history,
            cancelled: result.cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;
    use crate::models::{FixedSlot, ViolationType};
    use crate::test_fixtures::{pinned_scenario_input, scenario_input};

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(30)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_scenario_weekly_counts() {
        let scheduler = TimetableScheduler::new(&scenario_input()).unwrap();
        let output = scheduler.run(&config()).unwrap();

        for batch_id in [1, 2] {
            for subject_id in [1, 2, 3] {
                assert_eq!(output.timetable.subject_count(batch_id, subject_id), 2);
            }
        }
        assert_eq!(output.timetable.entry_count(), 12);
        assert!((output.report.score - output.timetable.fitness).abs() < 1e-10);
        assert_eq!(output.generations, 30);
        assert_eq!(output.history.len(), 31);
        assert!(output.kpi.is_complete());
    }

    #[test]
    fn test_entries_ordered() {
        let scheduler = TimetableScheduler::new(&scenario_input()).unwrap();
        let output = scheduler.run(&config()).unwrap();
        let catalog = scheduler.catalog();
        let keys: Vec<_> = output
            .timetable
            .entries
            .iter()
            .map(|e| catalog.locate(e.batch_id, &e.day, &e.time_slot).unwrap())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_pinned_scenario_preserved() {
        let scheduler = TimetableScheduler::new(&pinned_scenario_input()).unwrap();
        let output = scheduler.run(&config().with_max_generations(60)).unwrap();
        let entry = output
            .timetable
            .entry_at(1, "Monday", "9:00-10:00")
            .unwrap();
        assert_eq!(entry.subject_id, 1);
        assert_eq!(entry.faculty_id, Some(1));
        assert_eq!(entry.classroom_id, Some(1));
        let term = output.report.term(ViolationType::FixedSlotMismatch).unwrap();
        assert!((term.count - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_seeded_runs_identical() {
        let scheduler = TimetableScheduler::new(&scenario_input()).unwrap();
        let a = scheduler.run(&config()).unwrap();
        let b = scheduler.run(&config()).unwrap();
        assert_eq!(a.timetable.entries, b.timetable.entries);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_history_monotonic() {
        let scheduler = TimetableScheduler::new(&scenario_input()).unwrap();
        let output = scheduler.run(&config()).unwrap();
        for w in output.history.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn test_theory_sync_run() {
        let mut input = scenario_input();
        input.constraints.theory_sync = true;
        let scheduler = TimetableScheduler::new(&input).unwrap();
        let output = scheduler.run(&config()).unwrap();
        assert!(output.report.term(ViolationType::TheorySyncConflict).is_some());

        // Theory classes are mirrored across both batches.
        for e in output.timetable.entries_for_batch(1) {
            if e.subject_id != 3 {
                let twin = output.timetable.entry_at(2, &e.day, &e.time_slot).unwrap();
                assert_eq!(twin.subject_id, e.subject_id);
            }
        }
    }

    #[test]
    fn test_theory_sync_shares_pinned_lecture() {
        let mut input = pinned_scenario_input();
        input.constraints.theory_sync = true;
        let scheduler = TimetableScheduler::new(&input).unwrap();
        let output = scheduler.run(&config()).unwrap();

        let own = output.timetable.entry_at(1, "Monday", "9:00-10:00").unwrap();
        let twin = output.timetable.entry_at(2, "Monday", "9:00-10:00").unwrap();
        assert_eq!(twin.subject_id, 1);
        assert_eq!(twin.faculty_id, own.faculty_id);
        assert_eq!(twin.classroom_id, own.classroom_id);
    }

    #[test]
    fn test_run_summary_counts_pins() {
        let scheduler = TimetableScheduler::new(&pinned_scenario_input()).unwrap();
        let summary = scheduler.run_summary();
        assert!(summary.contains("pinned=1"), "{summary}");
        assert!(summary.contains("theory_sync=false"));
        assert!(!summary.contains("fixed_slots"));
    }

    #[test]
    fn test_invalid_input_fails_fast() {
        let mut input = scenario_input();
        input
            .constraints
            .fixed_slots
            .push(FixedSlot::new(1, "Monday", "9:00-10:00", 99));
        assert!(matches!(
            TimetableScheduler::new(&input),
            Err(SchedulerError::InvalidInput(_))
        ));

        let mut input = scenario_input();
        input.batches.clear();
        assert!(matches!(
            TimetableScheduler::new(&input),
            Err(SchedulerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let scheduler = TimetableScheduler::new(&scenario_input()).unwrap();
        let result = scheduler.run(&config().with_population_size(0));
        assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
    }

    #[test]
    fn test_cancelled_run_returns_best_so_far() {
        let scheduler = TimetableScheduler::new(&scenario_input()).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let output = scheduler.run_with_cancel(&config(), &cancel).unwrap();
        assert!(output.cancelled);
        assert_eq!(output.generations, 0);
        assert!(!output.timetable.entries.is_empty());
    }

    #[test]
    fn test_custom_weights_flow_into_report() {
        let weights = ConstraintWeights::default().with_weight(ViolationType::LunchBreakOccupied, 5.0);
        let scheduler = TimetableScheduler::new(&scenario_input())
            .unwrap()
            .with_weights(weights);
        let output = scheduler.run(&config().with_max_generations(2)).unwrap();
        let term = output.report.term(ViolationType::LunchBreakOccupied).unwrap();
        assert!((term.weight - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_request_json_roundtrip() {
        let request = ScheduleRequest::new(pinned_scenario_input()).with_ga(config());
        let json = serde_json::to_string(&request).unwrap();
        let parsed: ScheduleRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.ga, request.ga);
        assert_eq!(parsed.input.constraints, request.input.constraints);

        let output = TimetableScheduler::schedule(&parsed).unwrap();
        assert!(output.timetable.fitness >= 0.0);
    }

    #[test]
    fn test_request_json_minimal() {
        let json = r#"{
            "input": {
                "subjects": [{"id": 1, "department_id": 1, "subject_type": "THEORY", "classes_per_week": 3}],
                "faculty": [{"id": 1, "department_id": 1}],
                "faculty_subjects": [{"faculty_id": 1, "subject_id": 1}],
                "classrooms": [{"id": 1, "department_id": 1, "type": "CLASSROOM"}],
                "batches": [{"id": 1, "department_id": 1, "semester": 1}]
            },
            "ga": {"population_size": 10, "max_generations": 5, "seed": 1, "parallel": false}
        }"#;
        let request: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.input.constraints.days.len(), 6);
        let output = TimetableScheduler::schedule(&request).unwrap();
        assert_eq!(output.timetable.subject_count(1, 1), 3);
    }
}
