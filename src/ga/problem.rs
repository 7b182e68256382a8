//! Timetable GA problem definition.
//!
//! Implements [`GaProblem`] for timetable grids: generation 0 comes from
//! the [`PopulationInitializer`], fitness from a [`FitnessEvaluator`], and
//! recombination and mutation from [`GeneticOperators`].

use rand::Rng;

use super::grid::TimetableGrid;
use super::init::PopulationInitializer;
use super::operators::GeneticOperators;
use super::runner::GaProblem;
use crate::catalog::Catalog;
use crate::fitness::FitnessEvaluator;

/// GA problem for one scheduling run.
///
/// # Example
/// ```no_run
/// use u_timetable::catalog::Catalog;
/// use u_timetable::fitness::{ConstraintWeights, FitnessEvaluator};
/// use u_timetable::ga::{GaConfig, GaRunner, TimetableProblem};
/// use u_timetable::models::ScheduleInput;
///
/// # fn demo(input: &ScheduleInput) -> u_timetable::Result<()> {
/// let catalog = Catalog::new(input)?;
/// let evaluator = FitnessEvaluator::standard(&catalog, ConstraintWeights::default());
/// let problem = TimetableProblem::new(&catalog, evaluator);
/// let result = GaRunner::run(&problem, &GaConfig::default().with_seed(1))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TimetableProblem<'a> {
    catalog: &'a Catalog,
    evaluator: FitnessEvaluator,
    operators: GeneticOperators,
}

impl<'a> TimetableProblem<'a> {
    /// Creates a problem with default operators.
    pub fn new(catalog: &'a Catalog, evaluator: FitnessEvaluator) -> Self {
        Self {
            catalog,
            evaluator,
            operators: GeneticOperators::default(),
        }
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// The catalog grids are built against.
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// The fitness evaluator.
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }
}

impl GaProblem for TimetableProblem<'_> {
    type Individual = TimetableGrid;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> TimetableGrid {
        PopulationInitializer::new(self.catalog).create_grid(rng)
    }

    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<TimetableGrid> {
        PopulationInitializer::new(self.catalog).initialize(size, rng)
    }

    fn evaluate(&self, individual: &TimetableGrid) -> f64 {
        self.evaluator.evaluate(individual, self.catalog)
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &TimetableGrid,
        parent2: &TimetableGrid,
        rng: &mut R,
    ) -> Vec<TimetableGrid> {
        let (c1, c2) = self.operators.crossover(parent1, parent2, rng);
        vec![c1, c2]
    }

    fn mutate<R: Rng>(&self, individual: &mut TimetableGrid, rng: &mut R) {
        self.operators.mutate(individual, self.catalog, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::ConstraintWeights;
    use crate::ga::{CellCoord, GaConfig, GaRunner, SlotAssignment};
    use crate::test_fixtures::{pinned_scenario_input, scenario_input};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn problem(catalog: &Catalog) -> TimetableProblem<'_> {
        let evaluator = FitnessEvaluator::standard(catalog, ConstraintWeights::default());
        TimetableProblem::new(catalog, evaluator)
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(30)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_crossover_and_mutation() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let problem = problem(&catalog);
        let mut rng = SmallRng::seed_from_u64(42);

        let p1 = problem.create_individual(&mut rng);
        let p2 = problem.create_individual(&mut rng);
        let children = problem.crossover(&p1, &p2, &mut rng);
        assert_eq!(children.len(), 2);

        let mut child = children[0].clone();
        problem.mutate(&mut child, &mut rng);
        assert_eq!(child.dims(), p1.dims());
        assert!(problem.evaluate(&child) >= 0.0);
    }

    #[test]
    fn test_ga_runner_integration() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let problem = problem(&catalog);
        let result = GaRunner::run(&problem, &config()).unwrap();

        assert!(result.best_fitness.is_finite());
        assert!(result.best_fitness <= 1000.0);
        assert_eq!(result.generations, 30);
        assert!((problem.evaluate(&result.best) - result.best_fitness).abs() < 1e-10);
    }

    #[test]
    fn test_beats_random_population_average() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let problem = problem(&catalog);
        let result = GaRunner::run(&problem, &config()).unwrap();

        let mut rng = SmallRng::seed_from_u64(7);
        let random = problem.initialize_population(20, &mut rng);
        let avg = random.iter().map(|g| problem.evaluate(g)).sum::<f64>() / 20.0;
        assert!(result.best_fitness > avg);

        for batch in 0..2 {
            for subject in 1..=3 {
                assert_eq!(result.best.subject_count(batch, subject), 2);
            }
        }
    }

    #[test]
    fn test_deterministic_under_seed() {
        let catalog = Catalog::new(&scenario_input()).unwrap();
        let problem = problem(&catalog);
        let a = GaRunner::run(&problem, &config()).unwrap();
        let b = GaRunner::run(&problem, &config().with_parallel(true)).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_pinned_cell_survives_evolution() {
        let catalog = Catalog::new(&pinned_scenario_input()).unwrap();
        let problem = problem(&catalog);
        let result = GaRunner::run(&problem, &config().with_mutation_rate(1.0)).unwrap();
        assert_eq!(
            result.best.get(CellCoord::new(0, 0, 0)),
            Some(&SlotAssignment::new(1, 1, 1))
        );
    }
}
