//! A framework for simulating transient 1-dimensional heat conduction through
//! multi-layer ablative and insulating walls exposed to a hot gas flow.
//!
//! To get started, refer to the `demos` directory in the main repository.

mod duration;
mod numerics;
mod output;
mod simulation;

pub mod config;
pub mod database;
pub mod gas;
#[cfg(feature = "hdf5")]
pub mod h5;
pub mod implicit;
pub mod material;
pub mod mesh;
pub mod prelude;
pub mod table;

pub use duration::LogDuration;
pub use numerics::{integral, linterp, EPS, EPS_ITER, N_INTEGRATION, SIGMA};
pub use output::{OutputSchedule, ResultSnapshot};
pub use simulation::{
    RunDescriptor, Simulation, SimulationDescriptor, SimulationParameters, SimulationState,
    MAX_OUTPUT_STEPS,
};

/// The iterative stage that failed to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStage {
    /// Fixed point for the dimensionless velocity of the gas flow.
    GasDynamics,
    /// Per-timestep nonlinear iteration over the boundary conditions.
    Boundary,
}

impl std::fmt::Display for ConvergenceStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvergenceStage::GasDynamics => write!(f, "gas dynamics"),
            ConvergenceStage::Boundary => write!(f, "boundary iteration"),
        }
    }
}

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unable to find {kind} `{name}`")]
    MissingData {
        kind: &'static str,
        name: String,
    },
    #[error("Invalid `{field}`: {reason}")]
    MalformedInput {
        field: String,
        reason: String,
    },
    #[error("Init {array_name} array does not have expected length \
        ( {array_name} array length: {input_length}, \
        expected length: {expected_length} )")]
    BadInit {
        array_name: String,
        input_length: usize,
        expected_length: usize,
    },
    #[error("The {stage} did not converge after {iterations} iterations (residual: {residual:e})")]
    NonConvergence {
        stage: ConvergenceStage,
        iterations: usize,
        residual: f64,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "hdf5")]
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}

impl Error {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Manages actual computations.
pub trait Solver {
    /// Advances the temperature field by a single timestep.
    fn compute(&mut self, desc: ComputeDescriptor) -> Result<StepReport, Error>;

    fn npoints(&self) -> usize;

    /// Node positions, in increasing order.
    fn positions(&self) -> ndarray::Array1<f64>;

    /// Indices of the nodes that sit on a layer-to-layer interface.
    fn interfaces(&self) -> Vec<usize>;

    /// The temperature field the solver was built with.
    fn initial_temperatures(&self) -> ndarray::Array1<f64>;
}

/// Describes how a `Solver` should do a timestep.
pub struct ComputeDescriptor<'a> {
    pub state: &'a SimulationState,
    pub delta_t: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Change between two successive nonlinear iterations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvergenceNorms {
    /// `max|T - T_iter| / max|T|` over all nodes.
    pub relative: f64,
    /// Absolute change at the first node.
    pub first: f64,
    /// Absolute change at the last node.
    pub last: f64,
}

impl ConvergenceNorms {
    #[inline]
    pub fn converged(&self, tolerance: f64) -> bool {
        self.relative < tolerance && self.first < tolerance && self.last < tolerance
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.relative.is_finite() && self.first.is_finite() && self.last.is_finite()
    }

    pub fn max(&self) -> f64 {
        self.relative.max(self.first).max(self.last)
    }
}

/// Result of a single timestep.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub iterations: usize,
    pub norms: ConvergenceNorms,
    pub temperatures: ndarray::Array1<f64>,
}
