use crate::numerics::{EPS, EPS_ITER};
use crate::output::{OutputSchedule, ResultSnapshot};
use crate::{ComputeDescriptor, Error, LogDuration, Solver};

/// Upper bound on periodic snapshots in one simulation.
pub const MAX_OUTPUT_STEPS: f64 = 1.0e6;

/// Simulation specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    /// The length of each temporal step in the simulation.
    pub delta_t: f64,
    /// The time at which the simulation ends.
    pub solve_time: f64,
    /// Interval between periodic snapshots, 0 for none.
    pub output_timestep: f64,
    /// Additional snapshot instants.
    pub output_times: Vec<f64>,
    /// Tolerance of the per-timestep nonlinear iteration.
    pub tolerance: f64,
    /// Cap on the per-timestep nonlinear iteration.
    pub max_iterations: usize,
}

impl SimulationParameters {
    pub fn new(delta_t: f64, solve_time: f64, output_timestep: f64) -> Self {
        Self {
            delta_t,
            solve_time,
            output_timestep,
            output_times: Vec::new(),
            tolerance: EPS_ITER,
            max_iterations: 1000,
        }
    }

    pub fn with_output_times(mut self, output_times: Vec<f64>) -> Self {
        self.output_times = output_times;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        let positive = |field: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(Error::malformed(field, format!("must be positive, got {}", value)))
            }
        };
        positive("solve_timestep", self.delta_t)?;
        positive("solve_time", self.solve_time)?;
        positive("tolerance", self.tolerance)?;
        if !(self.output_timestep >= 0.0) || !self.output_timestep.is_finite() {
            return Err(Error::malformed(
                "output_timestep",
                format!("must be non-negative, got {}", self.output_timestep),
            ));
        }
        if self.output_timestep > 0.0 && self.solve_time / self.output_timestep > MAX_OUTPUT_STEPS {
            return Err(Error::malformed(
                "output_timestep",
                format!(
                    "{} is too small for a solve time of {}, at most {} snapshots are written",
                    self.output_timestep, self.solve_time, MAX_OUTPUT_STEPS
                ),
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::malformed("max_iterations", "must be at least 1"));
        }
        Ok(())
    }
}

/// Describes the wall state at the current time step.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    /// The time of the last time step of the simulation.
    pub time: f64,
    /// The temperature of each node at `time`.
    pub temperatures: ndarray::Array1<f64>,
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Solver> {
    /// The `Solver` for the simulation.
    pub solver: S,
    /// The parameters for the simulation.
    pub sim_params: SimulationParameters,
    /// The state that the simulation starts in.
    pub init_state: Option<SimulationState>,
}

/// Describes a simulation run.
#[derive(Debug, Clone, Copy)]
pub struct RunDescriptor {
    /// How long, in temporal units, the simulation should run. Runs stop at
    /// the solve time regardless.
    pub time_duration: f64,
    /// Whether or not to show a progress bar.
    pub verbose: bool,
}

/// The main `struct` of the framework.
pub struct Simulation<S: Solver> {
    solver: S,
    sim_params: SimulationParameters,
    state: SimulationState,
    schedule: OutputSchedule,
    positions: ndarray::Array1<f64>,
    interfaces: Vec<usize>,
}

impl<S: Solver> Simulation<S> {
    /// Creates a new `Simulation` instance.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        desc.sim_params.validate()?;
        let total_points = desc.solver.npoints();

        let state = desc.init_state.unwrap_or_else(|| SimulationState {
            time: 0.0,
            temperatures: desc.solver.initial_temperatures(),
        });
        if state.temperatures.len() != total_points {
            return Err(Error::BadInit {
                array_name: "Temperature".to_string(),
                input_length: state.temperatures.len(),
                expected_length: total_points,
            });
        }

        let mut schedule = OutputSchedule::new(
            desc.sim_params.solve_time,
            desc.sim_params.output_timestep,
            &desc.sim_params.output_times,
        );
        // instants already behind the starting time are not written
        let skipped = schedule.take_due(state.time);
        if !skipped.is_empty() {
            log::debug!("skipping {} output times before t = {}", skipped.len(), state.time);
        }

        Ok(Self {
            positions: desc.solver.positions(),
            interfaces: desc.solver.interfaces(),
            solver: desc.solver,
            sim_params: desc.sim_params,
            state,
            schedule,
        })
    }

    /// Does a computational run, returning the snapshots that fell due.
    pub fn run(&mut self, desc: RunDescriptor) -> Result<Vec<ResultSnapshot>, Error> {
        let _timer = LogDuration::new("simulation run");
        let delta_t = self.sim_params.delta_t;
        let end = (self.state.time + desc.time_duration).min(self.sim_params.solve_time);
        let nsteps = ((end - self.state.time - EPS) / delta_t).ceil().max(0.0) as u64;

        log::info!(
            "run from t = {} to t = {}: {} time steps of {} over {} nodes",
            self.state.time,
            end,
            nsteps,
            delta_t,
            self.solver.npoints()
        );

        // setup output if verbose
        let bar = if desc.verbose {
            Some(indicatif::ProgressBar::new(nsteps))
        } else {
            None
        };

        let mut snapshots = Vec::new();
        let mut total_iterations = 0;
        while end - self.state.time > EPS {
            let dt = delta_t.min(end - self.state.time);
            let report = self.solver.compute(ComputeDescriptor {
                state: &self.state,
                delta_t: dt,
                tolerance: self.sim_params.tolerance,
                max_iterations: self.sim_params.max_iterations,
            })?;
            total_iterations += report.iterations;

            let time = self.state.time + dt;
            for t in self.schedule.take_due(time) {
                snapshots.push(ResultSnapshot::between(
                    t,
                    (self.state.time, &self.state.temperatures),
                    (time, &report.temperatures),
                    &self.positions,
                    &self.interfaces,
                ));
            }

            // update state
            self.state.temperatures = report.temperatures;
            self.state.time = time;

            if let Some(ref bar) = bar {
                bar.inc(1)
            }
        }

        if let Some(ref bar) = bar {
            bar.finish();
        }
        log::info!(
            "run finished at t = {}: {} snapshots, {} iterations",
            self.state.time,
            snapshots.len(),
            total_iterations
        );

        Ok(snapshots)
    }

    /// Runs until the solve time.
    pub fn run_to_end(&mut self, verbose: bool) -> Result<Vec<ResultSnapshot>, Error> {
        self.run(RunDescriptor {
            time_duration: self.sim_params.solve_time - self.state.time,
            verbose,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.sim_params.solve_time - self.state.time <= EPS
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.sim_params
    }

    pub fn schedule(&self) -> &OutputSchedule {
        &self.schedule
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn positions(&self) -> &ndarray::Array1<f64> {
        &self.positions
    }

    pub fn interfaces(&self) -> &[usize] {
        &self.interfaces
    }
}
