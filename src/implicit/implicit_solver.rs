use crate::implicit::{Boundary, BoundaryCoefficients};
use crate::mesh::{Mesh, Volume};
use crate::numerics::SIGMA;
use crate::{ComputeDescriptor, ConvergenceNorms, ConvergenceStage, Error, Solver, StepReport};

/// Describes the composition of an `ImplicitSolver`.
pub struct ImplicitSolverDescriptor {
    pub mesh: Mesh,
    /// Inner face.
    pub left: Box<dyn Boundary>,
    /// Outer face.
    pub right: Box<dyn Boundary>,
}

/// Fully implicit finite-volume solver. Each timestep solves the tridiagonal
/// system with a forward and a backward sweep, repeated until the
/// temperature-dependent boundary conditions settle.
pub struct ImplicitSolver {
    mesh: Mesh,
    left: Box<dyn Boundary>,
    right: Box<dyn Boundary>,
    alfa: Vec<f64>,
    beta: Vec<f64>,
    initial: ndarray::Array1<f64>,
}

#[inline]
fn radiation(bc: &BoundaryCoefficients, t_prev_iter: f64) -> f64 {
    bc.eps * SIGMA * (bc.te.powi(4) - t_prev_iter.powi(4))
}

/// Energy balance of the inner half volume, as `T_0 = α_0·T_1 + β_0`.
fn left_face(v: &Volume, bc: &BoundaryCoefficients, tau: f64) -> (f64, f64) {
    let h = 2.0 * v.half_right;
    let lr = v.lambda_right * v.r_right;
    let rho_cp = v.rho_cp();
    let d = 2.0 * lr * tau + rho_cp * h * h + 2.0 * bc.alpha * h * tau;
    let alfa = 2.0 * lr * tau / d;
    let beta = 2.0 * h * tau / d
        * (bc.q
            + bc.alpha * bc.te
            + rho_cp * h * v.t_prev_step / (2.0 * tau)
            + radiation(bc, v.t_prev_iter));
    (alfa, beta)
}

/// Energy balance of the outer half volume, closed with the last sweep
/// coefficients of its left neighbour.
fn right_face(v: &Volume, bc: &BoundaryCoefficients, tau: f64, alfa: f64, beta: f64) -> f64 {
    let h = 2.0 * v.half_left;
    let lr = v.lambda_left * v.r_left;
    let rho_cp = v.rho_cp();
    let d = 2.0 * lr * tau * (1.0 - alfa) + rho_cp * h * h + 2.0 * bc.alpha * h * tau;
    2.0 * h * tau / d
        * (lr * beta / h
            + bc.q
            + bc.alpha * bc.te
            + rho_cp * h * v.t_prev_step / (2.0 * tau)
            + radiation(bc, v.t_prev_iter))
}

impl ImplicitSolver {
    #[inline]
    pub fn new(desc: ImplicitSolverDescriptor) -> Self {
        let n = desc.mesh.len();
        Self {
            initial: desc.mesh.temperatures(),
            mesh: desc.mesh,
            left: desc.left,
            right: desc.right,
            alfa: vec![0.0; n],
            beta: vec![0.0; n],
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// One linear solve with the boundary coefficients frozen at the
    /// previous iterate.
    fn sweep(&mut self, tau: f64) {
        let n = self.mesh.len();
        let volumes = self.mesh.volumes();

        let first = &volumes[0];
        let bc = self.left.coefficients(first.t_prev_iter);
        let (a0, b0) = left_face(first, &bc, tau);
        self.alfa[0] = a0;
        self.beta[0] = b0;

        for i in 1..n - 1 {
            let v = &volumes[i];
            let h_l = 2.0 * v.half_left;
            let h_r = 2.0 * v.half_right;
            let w = v.width();
            let rho_cp = v.rho_cp();
            let a = v.lambda_right * v.r_right / (h_r * w);
            let c = v.lambda_left * v.r_left / (h_l * w);
            let b = a + c + rho_cp / tau;
            let f = -rho_cp * v.t_prev_step / tau;
            let denom = b - c * self.alfa[i - 1];
            self.alfa[i] = a / denom;
            self.beta[i] = (c * self.beta[i - 1] - f) / denom;
        }

        let last = &volumes[n - 1];
        let bc = self.right.coefficients(last.t_prev_iter);
        let t_last = right_face(last, &bc, tau, self.alfa[n - 2], self.beta[n - 2]);
        self.mesh.set_temperature(n - 1, t_last);

        let mut t_next = t_last;
        for i in (0..n - 1).rev() {
            let t = self.alfa[i] * t_next + self.beta[i];
            self.mesh.set_temperature(i, t);
            t_next = t;
        }
    }

    fn norms(&self) -> ConvergenceNorms {
        let volumes = self.mesh.volumes();
        let (max_change, max_abs) = volumes.iter().fold((0.0f64, 0.0f64), |(dt, t), v| {
            (dt.max((v.t_curr - v.t_prev_iter).abs()), t.max(v.t_curr.abs()))
        });
        let change = |v: &Volume| (v.t_curr - v.t_prev_iter).abs();
        ConvergenceNorms {
            relative: if max_abs > 0.0 { max_change / max_abs } else { max_change },
            first: change(&volumes[0]),
            last: change(&volumes[volumes.len() - 1]),
        }
    }
}

impl Solver for ImplicitSolver {
    fn compute(&mut self, desc: ComputeDescriptor) -> Result<StepReport, Error> {
        let tau = desc.delta_t;
        let time = desc.state.time + tau;

        self.mesh.load_temperatures(&desc.state.temperatures)?;
        self.mesh.store_previous_step();
        self.mesh.refresh_effective_properties();

        let volumes = self.mesh.volumes();
        let (t_first, t_last) = (volumes[0].t_prev_step, volumes[volumes.len() - 1].t_prev_step);
        self.left.prepare(time, t_first)?;
        self.right.prepare(time, t_last)?;

        let mut norms = ConvergenceNorms::default();
        for iteration in 1..=desc.max_iterations {
            self.mesh.store_previous_iteration();
            self.sweep(tau);
            norms = self.norms();
            log::trace!(
                "t = {:.6}: iteration {}, norms {:.3e} {:.3e} {:.3e}",
                time,
                iteration,
                norms.relative,
                norms.first,
                norms.last
            );
            if !norms.is_finite() {
                return Err(Error::NonConvergence {
                    stage: ConvergenceStage::Boundary,
                    iterations: iteration,
                    residual: norms.max(),
                });
            }
            if norms.converged(desc.tolerance) {
                let temperatures = self.mesh.temperatures();
                log::debug!(
                    "t = {:.6}: {} iterations, norms {:.3e} {:.3e} {:.3e}, T_wall = ({:.2}, {:.2})",
                    time,
                    iteration,
                    norms.relative,
                    norms.first,
                    norms.last,
                    temperatures[0],
                    temperatures[temperatures.len() - 1],
                );
                return Ok(StepReport {
                    iterations: iteration,
                    norms,
                    temperatures,
                });
            }
        }

        Err(Error::NonConvergence {
            stage: ConvergenceStage::Boundary,
            iterations: desc.max_iterations,
            residual: norms.max(),
        })
    }

    fn npoints(&self) -> usize {
        self.mesh.len()
    }

    fn positions(&self) -> ndarray::Array1<f64> {
        self.mesh.positions()
    }

    fn interfaces(&self) -> Vec<usize> {
        self.mesh.interfaces()
    }

    fn initial_temperatures(&self) -> ndarray::Array1<f64> {
        self.initial.clone()
    }
}
