//! Isentropic 1-D flow state from total conditions and a radius ratio.

use serde::Deserialize;

use crate::gas::{Gas, GasProperty};
use crate::numerics::EPS;
use crate::{ConvergenceStage, Error};

/// Which branch of the isentropic solution to follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowRegime {
    #[default]
    Subsonic,
    Sonic,
    Supersonic,
}

/// Self-consistent gas state at one cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowState {
    pub t_total: f64,
    pub t_static: f64,
    pub p_total: f64,
    pub p_static: f64,
    /// Velocity [m/s].
    pub u: f64,
    pub mach: f64,
    /// Specific-heat ratio, equilibrium branch at total conditions.
    pub k: f64,
    /// Dimensionless velocity.
    pub lambda: f64,
    /// Ratio of the local radius to the throat radius.
    pub ksi: f64,
    pub regime: FlowRegime,
}

/// One step of the fixed-point map for λ.
///
/// The sonic branch has no iteration and always yields 1.
pub fn lambda_map(k: f64, ksi: f64, regime: FlowRegime, lambda: f64) -> f64 {
    let k1 = k + 1.0;
    let k2 = k - 1.0;
    match regime {
        FlowRegime::Subsonic => {
            let n = k2.recip();
            1.0 / ((k1 / 2.0).powf(n) * (1.0 - lambda * lambda * k2 / k1).powf(n) * ksi * ksi)
        }
        FlowRegime::Supersonic => {
            k1 / k2 / lambda - 2.0 / lambda.powf(k) / k2 / ksi.powf(2.0 * k - 2.0)
        }
        FlowRegime::Sonic => 1.0,
    }
}

/// Solves the isentropic relations for a [`Gas`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSolver {
    /// Absolute tolerance between successive λ iterates.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for FlowSolver {
    fn default() -> Self {
        Self {
            tolerance: EPS,
            max_iterations: 10_000,
        }
    }
}

impl FlowSolver {
    /// Finds the fixed point of [`lambda_map`], starting from λ = 1.
    pub fn lambda(&self, k: f64, ksi: f64, regime: FlowRegime) -> Result<f64, Error> {
        if regime == FlowRegime::Sonic {
            return Ok(1.0);
        }
        let mut lambda = 1.0;
        for iteration in 1..=self.max_iterations {
            let next = lambda_map(k, ksi, regime, lambda);
            let residual = (next - lambda).abs();
            if !next.is_finite() {
                return Err(Error::NonConvergence {
                    stage: ConvergenceStage::GasDynamics,
                    iterations: iteration,
                    residual,
                });
            }
            lambda = next;
            if residual <= self.tolerance {
                return Ok(lambda);
            }
        }
        Err(Error::NonConvergence {
            stage: ConvergenceStage::GasDynamics,
            iterations: self.max_iterations,
            residual: (lambda_map(k, ksi, regime, lambda) - lambda).abs(),
        })
    }

    pub fn solve(
        &self,
        gas: &Gas,
        p_total: f64,
        ksi: f64,
        regime: FlowRegime,
    ) -> Result<FlowState, Error> {
        if !(ksi > 0.0) {
            return Err(Error::malformed("ksi", format!("radius ratio must be positive, got {}", ksi)));
        }
        let t_total = gas.total_temperature(p_total);
        let k = gas.properties(p_total, t_total)[GasProperty::KEquilibrium];
        if !(k > 1.0) {
            return Err(Error::malformed(
                "k_eq",
                format!("specific-heat ratio must exceed 1, got {} at p = {}", k, p_total),
            ));
        }

        let lambda = self.lambda(k, ksi, regime)?;
        let tau = 1.0 - lambda * lambda * (k - 1.0) / (k + 1.0);
        let p_static = p_total * tau.powf(k / (k - 1.0));
        let t_static = t_total * tau;

        let static_props = gas.properties(p_static, t_static);
        let a = (k * p_static * static_props[GasProperty::SpecificVolume]).sqrt();
        let mach = lambda * (2.0 / (k + 1.0)).sqrt() / tau.sqrt();

        log::trace!(
            "flow p0 = {:.4e}, ksi = {:.4}, {:?}: lambda = {:.6}, M = {:.4}",
            p_total,
            ksi,
            regime,
            lambda,
            mach
        );

        Ok(FlowState {
            t_total,
            t_static,
            p_total,
            p_static,
            u: a * mach,
            mach,
            k,
            lambda,
            ksi,
            regime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas::tests::test_gas;
    use approx::assert_relative_eq;

    #[test]
    fn sonic_lambda_is_one() {
        let solver = FlowSolver::default();
        for (k, ksi) in [(1.1, 0.5), (1.2, 1.0), (1.4, 7.0)] {
            assert_eq!(solver.lambda(k, ksi, FlowRegime::Sonic).unwrap(), 1.0);
        }
        let state = solver.solve(&test_gas(1.2), 5e6, 3.0, FlowRegime::Sonic).unwrap();
        assert_eq!(state.lambda, 1.0);
        assert_relative_eq!(state.mach, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn subsonic_lambda_is_a_fixed_point() {
        let solver = FlowSolver::default();
        let (k, ksi) = (1.2, 2.0);
        let lambda = solver.lambda(k, ksi, FlowRegime::Subsonic).unwrap();
        assert!(lambda > 0.0 && lambda < 1.0);
        let residual = (lambda_map(k, ksi, FlowRegime::Subsonic, lambda) - lambda).abs();
        assert!(residual < 1e-5, "residual {}", residual);
    }

    #[test]
    fn supersonic_lambda_is_a_fixed_point() {
        let solver = FlowSolver::default();
        let (k, ksi) = (1.2, 2.0);
        let lambda = solver.lambda(k, ksi, FlowRegime::Supersonic).unwrap();
        assert!(lambda > 1.0);
        let residual = (lambda_map(k, ksi, FlowRegime::Supersonic, lambda) - lambda).abs();
        assert!(residual < 1e-5, "residual {}", residual);
    }

    #[test]
    fn static_state_follows_isentropic_relations() {
        let gas = test_gas(1.2);
        let state = FlowSolver::default()
            .solve(&gas, 5e6, 2.0, FlowRegime::Subsonic)
            .unwrap();
        assert_relative_eq!(state.t_total, 3400.0);
        let tau = state.t_static / state.t_total;
        assert_relative_eq!(state.p_static / state.p_total, tau.powf(1.2 / 0.2), max_relative = 1e-12);
        assert!(state.mach < 1.0);
        assert!(state.u > 0.0);
    }

    #[test]
    fn iteration_cap_raises_non_convergence() {
        let solver = FlowSolver {
            tolerance: 1e-300,
            max_iterations: 3,
        };
        match solver.lambda(1.2, 2.0, FlowRegime::Subsonic) {
            Err(Error::NonConvergence { stage, iterations, .. }) => {
                assert_eq!(stage, ConvergenceStage::GasDynamics);
                assert_eq!(iterations, 3);
            }
            other => panic!("expected non-convergence, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_expanding_gas() {
        let err = FlowSolver::default()
            .solve(&test_gas(1.0), 5e6, 2.0, FlowRegime::Subsonic)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }
}
