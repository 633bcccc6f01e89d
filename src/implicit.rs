pub mod components;

mod implicit_solver;

pub use implicit_solver::{ImplicitSolver, ImplicitSolverDescriptor};

use crate::Error;

/// Heat exchange coefficients at a wall face.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundaryCoefficients {
    /// Convective coefficient [W/(m²·K)].
    pub alpha: f64,
    /// Recovery temperature [K].
    pub te: f64,
    /// Radiative temperature [K].
    pub trad: f64,
    /// Gas emissivity.
    pub eps: f64,
    /// Prescribed heat flux into the wall [W/m²].
    pub q: f64,
}

/// Supplies the heat exchange conditions at one face of the wall.
pub trait Boundary {
    /// Called once per timestep, before the nonlinear iteration, with the
    /// time at the end of the step and the face temperature of the
    /// previous step.
    fn prepare(&mut self, _time: f64, _wall_temperature: f64) -> Result<(), Error> {
        Ok(())
    }

    /// Coefficients at the given face temperature.
    fn coefficients(&self, wall_temperature: f64) -> BoundaryCoefficients;
}
