//! Generational GA driver.
//!
//! Runs INITIALIZE → (EVALUATE → SELECT → RECOMBINE → MUTATE → REPLACE)*
//! for the configured number of generations, keeping the best individual
//! ever evaluated apart from the current population.
//!
//! Fitness is maximized. All randomness flows from one RNG owned by the
//! run, so a seeded run is reproducible; parallel evaluation does not
//! touch the RNG.
//!
//! # Usage
//!
//! ```no_run
//! use u_timetable::ga::{GaConfig, GaRunner};
//! # fn demo<P: u_timetable::ga::GaProblem>(problem: &P) -> u_timetable::Result<()> {
//! let config = GaConfig::default()
//!     .with_population_size(50)
//!     .with_max_generations(200)
//!     .with_seed(42);
//! let result = GaRunner::run(problem, &config)?;
//! println!("best fitness {}", result.best_fitness);
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::operators::{elite_indices, tournament_select};
use crate::error::{Result, SchedulerError};

/// An optimization problem the GA can drive.
pub trait GaProblem: Send + Sync {
    /// Candidate solution.
    type Individual: Clone + Send + Sync;

    /// Creates one random individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Creates generation 0.
    fn initialize_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Self::Individual> {
        (0..size).map(|_| self.create_individual(rng)).collect()
    }

    /// Fitness of an individual (higher is better). Must be pure.
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Recombines two parents into children.
    ///
    /// Should return at least one child. An empty result is replaced by
    /// copies of both parents.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> Vec<Self::Individual>;

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);
}

/// GA parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generations bred after generation 0.
    pub max_generations: usize,
    /// Chance a selected pair is recombined rather than copied.
    pub crossover_rate: f64,
    /// Chance a child is mutated.
    pub mutation_rate: f64,
    /// Share of the population copied unchanged into the next generation.
    pub elitism_rate: f64,
    /// Contestants per tournament.
    pub tournament_size: usize,
    /// Chance a mutated cell is refilled rather than cleared.
    pub fill_probability: f64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Evaluate each generation on the rayon pool.
    pub parallel: bool,
    /// Generations between progress logs (0 disables them).
    pub log_interval: usize,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            crossover_rate: 0.85,
            mutation_rate: 0.15,
            elitism_rate: 0.1,
            tournament_size: 3,
            fill_probability: 0.6,
            seed: None,
            parallel: true,
            log_interval: 50,
        }
    }
}

impl GaConfig {
    /// Larger preset for the synchronized scheduler: 200 individuals,
    /// 1000 generations.
    pub fn enhanced() -> Self {
        Self {
            population_size: 200,
            max_generations: 1000,
            ..Self::default()
        }
    }

    /// Defaults overlaid with `GA_*` environment variables.
    ///
    /// Reads `GA_POPULATION_SIZE`, `GA_GENERATIONS`, `GA_MUTATION_RATE`,
    /// `GA_CROSSOVER_RATE`, `GA_ELITISM_RATE` and `GA_SEED`.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`] if a variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlays values from a key lookup onto `self`.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`] if a value does not parse.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "GA_POPULATION_SIZE", &mut self.population_size)?;
        override_from(&lookup, "GA_GENERATIONS", &mut self.max_generations)?;
        override_from(&lookup, "GA_MUTATION_RATE", &mut self.mutation_rate)?;
        override_from(&lookup, "GA_CROSSOVER_RATE", &mut self.crossover_rate)?;
        override_from(&lookup, "GA_ELITISM_RATE", &mut self.elitism_rate)?;
        if let Some(raw) = lookup("GA_SEED") {
            let seed = parse_value::<u64>("GA_SEED", &raw)?;
            self.seed = Some(seed);
        }
        Ok(self)
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation count.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the elitism rate.
    pub fn with_elitism_rate(mut self, rate: f64) -> Self {
        self.elitism_rate = rate;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the mutation fill probability.
    pub fn with_fill_probability(mut self, probability: f64) -> Self {
        self.fill_probability = probability;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the progress log interval.
    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    /// Number of elites carried per generation.
    pub fn elite_count(&self) -> usize {
        ((self.elitism_rate * self.population_size as f64) as usize).min(self.population_size)
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(SchedulerError::InvalidConfig(
                "population_size must be positive".into(),
            ));
        }
        if self.tournament_size == 0 {
            return Err(SchedulerError::InvalidConfig(
                "tournament_size must be positive".into(),
            ));
        }
        for (name, value) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("elitism_rate", self.elitism_rate),
            ("fill_probability", self.fill_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SchedulerError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| SchedulerError::InvalidConfig(format!("{key}={raw:?}: {e}")))
}

fn override_from<T, F>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = parse_value(key, &raw)?;
    }
    Ok(())
}

/// Cooperative cancellation flag, checked once per generation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual ever evaluated.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Generations bred after generation 0.
    pub generations: usize,
    /// Best-so-far fitness after each evaluated generation (non-decreasing).
    pub history: Vec<f64>,
    /// Whether the run stopped on a cancel request.
    pub cancelled: bool,
}

/// Generational GA executor.
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA to completion.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`] if `config` fails validation.
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
    ) -> Result<GaResult<P::Individual>> {
        Self::run_with_cancel(problem, config, &CancelToken::new())
    }

    /// Runs the GA, stopping early when `cancel` is set.
    ///
    /// A cancelled run still returns the best individual found so far.
    ///
    /// # Errors
    /// [`SchedulerError::InvalidConfig`] if `config` fails validation.
    pub fn run_with_cancel<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
        cancel: &CancelToken,
    ) -> Result<GaResult<P::Individual>> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        info!(
            "GA start: population={}, generations={}, elites={}, seed={:?}",
            config.population_size,
            config.max_generations,
            config.elite_count(),
            config.seed
        );

        let mut population = problem.initialize_population(config.population_size, &mut rng);
        let mut fitness = evaluate_all(problem, &population, config.parallel);
        let (leader, initial) = fittest(&fitness);
        let mut best = population[leader].clone();
        let mut best_fitness = initial;
        let mut history = Vec::with_capacity(config.max_generations + 1);
        history.push(best_fitness);
        log_progress(config, 0, &fitness, best_fitness);

        let mut generation = 0;
        let mut cancelled = false;
        while generation < config.max_generations {
            if cancel.is_cancelled() {
                cancelled = true;
                info!("GA cancelled after {generation} generation(s)");
                break;
            }

            population = breed(problem, &population, &fitness, config, &mut rng);
            generation += 1;
            fitness = evaluate_all(problem, &population, config.parallel);

            let (leader, current) = fittest(&fitness);
            if current > best_fitness {
                best = population[leader].clone();
                best_fitness = current;
            }
            history.push(best_fitness);
            log_progress(config, generation, &fitness, best_fitness);
        }

        info!("GA finished: generations={generation}, best fitness={best_fitness:.2}");

        Ok(GaResult {
            best,
            best_fitness,
            generations: generation,
            history,
            cancelled,
        })
    }
}

fn evaluate_all<P: GaProblem>(
    problem: &P,
    population: &[P::Individual],
    parallel: bool,
) -> Vec<f64> {
    if parallel {
        population.par_iter().map(|i| problem.evaluate(i)).collect()
    } else {
        population.iter().map(|i| problem.evaluate(i)).collect()
    }
}

fn log_progress(config: &GaConfig, generation: usize, fitness: &[f64], best: f64) {
    let (_, current) = fittest(fitness);
    trace!("generation {generation}: current={current:.2}, best={best:.2}");
    if config.log_interval > 0 && generation % config.log_interval == 0 {
        let avg = fitness.iter().sum::<f64>() / fitness.len() as f64;
        debug!("Generation {generation}: best={best:.2}, current={current:.2}, avg={avg:.2}");
    }
}

/// Index and value of the first maximum.
fn fittest(fitness: &[f64]) -> (usize, f64) {
    let mut leader = 0;
    for (i, &f) in fitness.iter().enumerate() {
        if f > fitness[leader] {
            leader = i;
        }
    }
    (leader, fitness[leader])
}

fn breed<P: GaProblem, R: Rng>(
    problem: &P,
    population: &[P::Individual],
    fitness: &[f64],
    config: &GaConfig,
    rng: &mut R,
) -> Vec<P::Individual> {
    let n = config.population_size;
    let mut next: Vec<P::Individual> = elite_indices(fitness, config.elite_count())
        .into_iter()
        .map(|i| population[i].clone())
        .collect();

    while next.len() < n {
        let a = tournament_select(fitness, config.tournament_size, rng);
        let b = tournament_select(fitness, config.tournament_size, rng);

        let mut children = if rng.random_bool(config.crossover_rate) {
            problem.crossover(&population[a], &population[b], rng)
        } else {
            Vec::new()
        };
        if children.is_empty() {
            children = vec![population[a].clone(), population[b].clone()];
        }

        for mut child in children {
            if next.len() >= n {
                break;
            }
            if rng.random_bool(config.mutation_rate) {
                problem.mutate(&mut child, rng);
            }
            next.push(child);
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Maximize the number of set bits in a 16-bit word.
    struct OneMax;

    impl GaProblem for OneMax {
        type Individual = u16;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> u16 {
            rng.random::<u16>() & 0x00ff
        }

        fn evaluate(&self, individual: &u16) -> f64 {
            individual.count_ones() as f64
        }

        fn crossover<R: Rng>(&self, p1: &u16, p2: &u16, rng: &mut R) -> Vec<u16> {
            let mask: u16 = rng.random();
            vec![(p1 & mask) | (p2 & !mask), (p2 & mask) | (p1 & !mask)]
        }

        fn mutate<R: Rng>(&self, individual: &mut u16, rng: &mut R) {
            *individual ^= 1u16 << rng.random_range(0..16u32);
        }
    }

    /// OneMax whose crossover never produces offspring.
    struct Barren;

    impl GaProblem for Barren {
        type Individual = u16;

        fn create_individual<R: Rng>(&self, rng: &mut R) -> u16 {
            OneMax.create_individual(rng)
        }

        fn evaluate(&self, individual: &u16) -> f64 {
            OneMax.evaluate(individual)
        }

        fn crossover<R: Rng>(&self, _: &u16, _: &u16, _: &mut R) -> Vec<u16> {
            Vec::new()
        }

        fn mutate<R: Rng>(&self, individual: &mut u16, rng: &mut R) {
            OneMax.mutate(individual, rng);
        }
    }

    fn config() -> GaConfig {
        GaConfig::default()
            .with_population_size(20)
            .with_max_generations(40)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_defaults() {
        let c = GaConfig::default();
        assert_eq!(c.population_size, 100);
        assert_eq!(c.max_generations, 500);
        assert_eq!(c.tournament_size, 3);
        assert_eq!(c.elite_count(), 10);
        assert!(c.seed.is_none());
        assert!(c.validate().is_ok());

        let e = GaConfig::enhanced();
        assert_eq!(e.population_size, 200);
        assert_eq!(e.max_generations, 1000);
        assert!((e.mutation_rate - 0.15).abs() < 1e-10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(config().with_population_size(0).validate().is_err());
        assert!(config().with_tournament_size(0).validate().is_err());
        assert!(config().with_mutation_rate(1.5).validate().is_err());
        assert!(config().with_crossover_rate(-0.1).validate().is_err());
        assert!(config().with_fill_probability(2.0).validate().is_err());
        match config().with_elitism_rate(3.0).validate() {
            Err(SchedulerError::InvalidConfig(msg)) => assert!(msg.contains("elitism_rate")),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_overlay() {
        let vars: HashMap<&str, &str> = [
            ("GA_POPULATION_SIZE", "30"),
            ("GA_GENERATIONS", "12"),
            ("GA_MUTATION_RATE", "0.2"),
            ("GA_SEED", " 7 "),
        ]
        .into_iter()
        .collect();
        let c = GaConfig::default()
            .overlay(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(c.population_size, 30);
        assert_eq!(c.max_generations, 12);
        assert!((c.mutation_rate - 0.2).abs() < 1e-10);
        assert!((c.crossover_rate - 0.85).abs() < 1e-10);
        assert_eq!(c.seed, Some(7));
    }

    #[test]
    fn test_overlay_rejects_garbage() {
        let err = GaConfig::default()
            .overlay(|k| (k == "GA_GENERATIONS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("GA_GENERATIONS"));
    }

    #[test]
    fn test_config_serde_defaults() {
        let c: GaConfig = serde_json::from_str(r#"{"population_size": 8, "seed": 3}"#).unwrap();
        assert_eq!(c.population_size, 8);
        assert_eq!(c.seed, Some(3));
        assert_eq!(c.max_generations, 500);
    }

    #[test]
    fn test_run_improves() {
        let result = GaRunner::run(&OneMax, &config()).unwrap();
        assert_eq!(result.generations, 40);
        assert_eq!(result.history.len(), 41);
        assert!(result.best_fitness >= result.history[0]);
        assert!((OneMax.evaluate(&result.best) - result.best_fitness).abs() < 1e-10);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_empty_crossover_falls_back_to_parents() {
        let cfg = config().with_crossover_rate(1.0).with_max_generations(5);
        let result = GaRunner::run(&Barren, &cfg).unwrap();
        assert_eq!(result.generations, 5);
        assert_eq!(result.history.len(), 6);
    }

    #[test]
    fn test_history_monotonic() {
        let result = GaRunner::run(&OneMax, &config().with_mutation_rate(1.0)).unwrap();
        for w in result.history.windows(2) {
            assert!(w[1] >= w[0]);
        }
        let last = *result.history.last().unwrap();
        assert!((last - result.best_fitness).abs() < 1e-10);
    }

    #[test]
    fn test_seeded_runs_identical() {
        let a = GaRunner::run(&OneMax, &config()).unwrap();
        let b = GaRunner::run(&OneMax, &config()).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.history, b.history);

        // Parallel evaluation does not change the outcome.
        let c = GaRunner::run(&OneMax, &config().with_parallel(true)).unwrap();
        assert_eq!(a.best, c.best);
        assert_eq!(a.history, c.history);
    }

    #[test]
    fn test_zero_generations() {
        let result = GaRunner::run(&OneMax, &config().with_max_generations(0)).unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_cancelled_run() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = GaRunner::run_with_cancel(&OneMax, &config(), &cancel).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(GaRunner::run(&OneMax, &config().with_population_size(0)).is_err());
    }

    #[test]
    fn test_fittest_first_maximum() {
        assert_eq!(fittest(&[1.0, 3.0, 2.0, 3.0]), (1, 3.0));
    }
}
