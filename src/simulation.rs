//! Simulation builder and runner

use std::collections::HashSet;
use std::time::Duration;

use glam::DVec3;
use tracing::info;

use crate::agent::{total_drift, Agent};
use crate::config::CirclesConfig;
use crate::convergence::{ConvergenceMonitor, DriftReport};
use crate::error::{ConfigurationError, SimulationError};
use crate::spatial::Bounds;
use crate::spawn::{spawn_population, SpawnContext};
use crate::step::SimulationStep;
use crate::time::StepTimer;

type Spawner = Box<dyn FnMut(&mut SpawnContext) -> DVec3 + Send>;
type StepFunction = Box<dyn FnMut(&StepContext<'_>) + Send>;

/// Read-only view handed to step functions after each step.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    /// 1-based number of the step just completed.
    pub step: u64,
    /// The generation just committed.
    pub agents: &'a [Agent],
    /// Sum of drift over `agents`.
    pub total_drift: f64,
    pub report: DriftReport,
}

/// Outcome of a multi-step run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps completed during this call.
    pub steps: u64,
    pub report: DriftReport,
    pub elapsed: Duration,
}

/// A Circles simulation builder.
///
/// Use method chaining to configure, then call `.build()` for a steppable
/// [`Runner`] or `.run(steps)` to execute directly.
///
/// ```ignore
/// let summary = Simulation::new()
///     .with_agent_count(4096)
///     .with_radius(2.0)
///     .with_repulse_factor(0.05)
///     .with_step_function(|ctx| println!("{:.2} drift correct", ctx.report))
///     .run(100)?;
/// ```
pub struct Simulation {
    config: CirclesConfig,
    bounds: Option<Bounds>,
    spawner: Option<Spawner>,
    population: Option<Vec<Agent>>,
    step_functions: Vec<StepFunction>,
}

impl Simulation {
    /// Create a simulation with the standard Circles parameters.
    pub fn new() -> Self {
        Self::from_config(CirclesConfig::default())
    }

    pub fn from_config(config: CirclesConfig) -> Self {
        Self {
            config,
            bounds: None,
            spawner: None,
            population: None,
            step_functions: Vec::new(),
        }
    }

    /// Set the number of agents to spawn.
    pub fn with_agent_count(mut self, count: u32) -> Self {
        self.config.agent_count = count;
        self
    }

    /// Set the interaction radius.
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.config.interaction_radius = radius;
        self
    }

    pub fn with_repulse_factor(mut self, factor: f64) -> Self {
        self.config.repulse_factor = factor;
        self
    }

    /// Use a grid cell size other than the interaction radius.
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.config.cell_size = Some(cell_size);
        self
    }

    /// Seed for the default and custom spawners.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Override the environment box. Defaults to `[0, floor(cbrt(agent_count)))^3`.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Set the spawner. Called once per agent, in id order, returning the
    /// agent's initial position. Defaults to uniform placement in the bounds.
    pub fn with_spawner<F>(mut self, spawner: F) -> Self
    where
        F: FnMut(&mut SpawnContext) -> DVec3 + Send + 'static,
    {
        self.spawner = Some(Box::new(spawner));
        self
    }

    /// Start from an existing generation instead of spawning one.
    ///
    /// The agent count follows the population's length.
    pub fn with_population(mut self, agents: Vec<Agent>) -> Self {
        self.config.agent_count = u32::try_from(agents.len()).unwrap_or(u32::MAX);
        self.population = Some(agents);
        self
    }

    /// Add a function invoked after every step, once the new generation is
    /// committed and the drift has been observed.
    pub fn with_step_function<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StepContext<'_>) + Send + 'static,
    {
        self.step_functions.push(Box::new(f));
        self
    }

    pub fn config(&self) -> &CirclesConfig {
        &self.config
    }

    /// Validate parameters and create the initial generation.
    pub fn build(self) -> Result<Runner, ConfigurationError> {
        let Simulation {
            config,
            bounds,
            spawner,
            population,
            step_functions,
        } = self;

        config.validate()?;
        let bounds = bounds.unwrap_or_else(|| config.bounds());
        let step = SimulationStep::new(config.repulsion_model()?, config.spatial_config(), bounds)?;

        let agents = match (population, spawner) {
            (Some(agents), _) => {
                let mut seen = HashSet::with_capacity(agents.len());
                if let Some(dup) = agents.iter().find(|a| !seen.insert(a.id)) {
                    return Err(ConfigurationError::DuplicateId(dup.id));
                }
                agents
            }
            (None, Some(spawner)) => spawn_population(config.agent_count, bounds, config.seed, spawner),
            (None, None) => spawn_population(
                config.agent_count,
                bounds,
                config.seed,
                SpawnContext::random_in_bounds,
            ),
        };

        info!(
            agents = agents.len(),
            radius = config.interaction_radius,
            repulse = config.repulse_factor,
            bounds_min = ?bounds.min,
            bounds_max = ?bounds.max,
            "simulation initialised"
        );

        Ok(Runner {
            step,
            agents,
            monitor: ConvergenceMonitor::new(),
            timer: StepTimer::new(),
            step_functions,
        })
    }

    /// Build and run `steps` steps.
    pub fn run(self, steps: u64) -> Result<RunSummary, SimulationError> {
        let mut runner = self.build()?;
        Ok(runner.run(steps)?)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// A built simulation: the current generation plus everything needed to
/// advance it.
pub struct Runner {
    step: SimulationStep,
    agents: Vec<Agent>,
    monitor: ConvergenceMonitor,
    timer: StepTimer,
    step_functions: Vec<StepFunction>,
}

impl Runner {
    /// Advance one generation, observe its drift and call step functions.
    ///
    /// On error the current generation is left untouched.
    pub fn step(&mut self) -> Result<DriftReport, ConfigurationError> {
        let next = self.step.advance(&self.agents)?;
        self.agents = next;
        self.timer.tick();

        let total = total_drift(&self.agents);
        let report = self.monitor.observe(total);
        let step = self.timer.steps();
        info!(step, total_drift = total, "{} drift correct", report);

        let ctx = StepContext {
            step,
            agents: &self.agents,
            total_drift: total,
            report,
        };
        for f in &mut self.step_functions {
            f(&ctx);
        }

        Ok(report)
    }

    /// Run `steps` consecutive steps, stopping at the first failure.
    pub fn run(&mut self, steps: u64) -> Result<RunSummary, ConfigurationError> {
        let start = self.timer.elapsed();
        let mut report = self.monitor.report();
        for _ in 0..steps {
            report = self.step()?;
        }
        let summary = RunSummary {
            steps,
            report,
            elapsed: self.timer.elapsed().saturating_sub(start),
        };
        info!(
            steps,
            steps_per_second = self.timer.steps_per_second(),
            drift_correct = %report,
            "run complete"
        );
        Ok(summary)
    }

    /// The current generation.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn monitor(&self) -> &ConvergenceMonitor {
        &self.monitor
    }

    /// Steps completed so far.
    pub fn steps(&self) -> u64 {
        self.timer.steps()
    }

    pub fn stepper(&self) -> &SimulationStep {
        &self.step
    }

    /// Take the current generation, consuming the runner.
    pub fn into_agents(self) -> Vec<Agent> {
        self.agents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_build_spawns_configured_population() {
        let runner = Simulation::new().with_agent_count(125).with_seed(4).build().unwrap();
        assert_eq!(runner.agents().len(), 125);
        let bounds = Bounds::cube(0.0, 5.0);
        assert!(runner.agents().iter().all(|a| bounds.contains(a.position)));
        assert_eq!(runner.steps(), 0);
    }

    #[test]
    fn test_build_rejects_invalid_radius() {
        let err = Simulation::new().with_radius(-2.0).build().err().unwrap();
        assert_eq!(err, ConfigurationError::InvalidRadius(-2.0));
    }

    #[test]
    fn test_build_rejects_duplicate_ids() {
        let agents = vec![Agent::new(1, DVec3::ZERO), Agent::new(1, DVec3::ONE)];
        let err = Simulation::new().with_population(agents).build().err().unwrap();
        assert_eq!(err, ConfigurationError::DuplicateId(1));
    }

    #[test]
    fn test_build_rejects_oversized_grid() {
        let err = Simulation::new()
            .with_agent_count(1000)
            .with_cell_size(1e-3)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::GridTooLarge { .. }));
    }

    #[test]
    fn test_build_checks_grid_over_custom_bounds() {
        let err = Simulation::new()
            .with_agent_count(8)
            .with_cell_size(0.01)
            .with_bounds(Bounds::cube(0.0, 500.0))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigurationError::GridTooLarge { .. }));
    }

    #[test]
    fn test_failed_step_keeps_generation() {
        let mut runner = Simulation::new().with_agent_count(27).with_seed(2).build().unwrap();
        runner.step().unwrap();
        let before = runner.agents().to_vec();
        let observed = runner.monitor().report().observations();

        runner.step = runner.step.clone().with_unchecked_bounds(Bounds::cube(2.0, 2.0));
        let err = runner.step().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));
        assert_eq!(runner.agents(), &before[..]);
        assert_eq!(runner.steps(), 1);
        assert_eq!(runner.monitor().report().observations(), observed);

        let err = runner.run(3).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidBounds { .. }));
        assert_eq!(runner.agents(), &before[..]);
    }

    #[test]
    fn test_custom_spawner() {
        let runner = Simulation::new()
            .with_agent_count(8)
            .with_spawner(|ctx| ctx.grid_position(2, 2, 2))
            .build()
            .unwrap();
        assert_eq!(runner.agents()[0].position, DVec3::splat(0.5));
    }

    #[test]
    fn test_step_functions_see_each_step() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let summary = Simulation::new()
            .with_agent_count(64)
            .with_step_function(move |ctx| {
                let sum: f64 = ctx.agents.iter().map(|a| a.drift).sum();
                assert_eq!(sum, ctx.total_drift);
                sink.lock().unwrap().push(ctx.step);
            })
            .run(3)
            .unwrap();
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.report.observations(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
