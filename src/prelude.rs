//! Includes commonly used library components.

pub use crate::{
    ComputeDescriptor,
    ConvergenceNorms,
    Error,
    OutputSchedule,
    ResultSnapshot,
    RunDescriptor,
    Simulation,
    SimulationDescriptor,
    SimulationParameters,
    SimulationState,
    Solver,
    StepReport,
};
pub use crate::config::CaseConfig;
pub use crate::database::Database;
pub use crate::implicit::{Boundary, BoundaryCoefficients, ImplicitSolver, ImplicitSolverDescriptor};
#[cfg(feature = "hdf5")]
pub use crate::h5::{save_snapshots, SaveSettings, SaveType};
