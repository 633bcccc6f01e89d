//! Gas-side convective and radiative exchange with a wall.

use serde::Deserialize;

use crate::gas::{FlowRegime, FlowState, Gas, GasProperties, GasProperty};
use crate::numerics::MEGA;

/// Correlation used for the convective coefficient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correlation {
    /// Turbulent boundary layer over a reference length.
    #[default]
    BoundaryLayer,
    /// Fully developed turbulent pipe flow over the local diameter.
    PipeFlow,
}

/// Boundary coefficients derived from the gas flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHeatState {
    /// Convective coefficient [W/(m²·K)].
    pub alpha: f64,
    /// Recovery temperature [K].
    pub te: f64,
    /// Radiative temperature [K].
    pub trad: f64,
    /// Gas emissivity.
    pub eps: f64,
}

/// Heat exchange between a gas flow and the wall at one cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatExchange {
    pub correlation: Correlation,
    /// Reference length of the boundary layer [m].
    pub blayer_length: f64,
    /// Local radius of the flow channel [m].
    pub radius: f64,
}

/// Heat capacity and conductivity of the branch that matches the regime.
fn branch(props: &GasProperties, regime: FlowRegime) -> (f64, f64) {
    match regime {
        FlowRegime::Subsonic => (
            props[GasProperty::CpEquilibrium],
            props[GasProperty::ConductivityTotal],
        ),
        FlowRegime::Sonic | FlowRegime::Supersonic => (
            props[GasProperty::CpFrozen],
            props[GasProperty::ConductivityGas],
        ),
    }
}

impl HeatExchange {
    pub fn evaluate(&self, gas: &Gas, flow: &FlowState, t_wall: f64) -> BoundaryHeatState {
        let static_props = gas.properties(flow.p_static, flow.t_static);
        let te = self.recovery_temperature(&static_props, flow);
        let alpha = match self.correlation {
            Correlation::BoundaryLayer => {
                let wall_props = gas.properties(flow.p_static, t_wall);
                self.boundary_layer_alpha(&wall_props, flow, te)
            }
            Correlation::PipeFlow => self.pipe_flow_alpha(gas, flow, t_wall),
        };
        let eps = self.emissivity(&static_props, flow);

        BoundaryHeatState {
            alpha,
            te,
            trad: flow.t_static,
            eps,
        }
    }

    /// Static temperature raised by the recovery factor of the boundary layer.
    pub fn recovery_temperature(&self, static_props: &GasProperties, flow: &FlowState) -> f64 {
        let (cp, lt) = branch(static_props, flow.regime);
        let pr = static_props[GasProperty::Viscosity] * cp / lt;
        let m = 1.0 + (flow.k - 1.0) / 2.0 * pr.cbrt() * flow.mach * flow.mach;
        flow.t_static * m
    }

    fn boundary_layer_alpha(&self, wall_props: &GasProperties, flow: &FlowState, te: f64) -> f64 {
        let ro = wall_props.density();
        let mu = wall_props[GasProperty::Viscosity];
        let (cp, lt) = branch(wall_props, flow.regime);
        let re = ro * flow.u * self.blayer_length / mu;
        if !(re > 0.0) {
            return 0.0;
        }
        let pr = mu * cp / lt;
        0.0296
            * re.powf(-0.2)
            * pr.powf(-0.6)
            * ro
            * cp
            * flow.u
            * (0.9 * flow.t_total / te).powf(0.39)
            * (te / flow.t_static).powf(0.11)
    }

    fn pipe_flow_alpha(&self, gas: &Gas, flow: &FlowState, t_wall: f64) -> f64 {
        let props = gas.properties(flow.p_static, t_wall);
        let ro = props.density();
        let mu = props[GasProperty::Viscosity];
        let lt = props[GasProperty::ConductivityTotal];
        let (cp, _) = branch(&props, flow.regime);
        let diameter = 2.0 * self.radius;
        let re = ro * flow.u * diameter / mu;
        if !(re > 0.0) {
            return 0.0;
        }
        let pr = mu * cp / lt;
        0.023 * lt / diameter * re.powf(0.8) * pr.powf(0.3)
    }

    /// Empirical emissivity of the combustion products.
    pub fn emissivity(&self, static_props: &GasProperties, flow: &FlowState) -> f64 {
        0.229 + 0.0616 * 5.0 + 0.00011 * flow.t_static - 0.3684 * static_props[GasProperty::Z]
            + 0.00502 * flow.p_static / MEGA
            - 0.00338 * self.radius * 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas::tests::test_gas;
    use crate::gas::FlowSolver;
    use approx::assert_relative_eq;

    fn exchange(correlation: Correlation) -> HeatExchange {
        HeatExchange {
            correlation,
            blayer_length: 0.1,
            radius: 0.05,
        }
    }

    #[test]
    fn boundary_layer_closed_form() {
        let gas = test_gas(1.2);
        let flow = FlowSolver::default()
            .solve(&gas, 5e6, 2.0, FlowRegime::Subsonic)
            .unwrap();
        let t_wall = 800.0;
        let state = exchange(Correlation::BoundaryLayer).evaluate(&gas, &flow, t_wall);

        let s = gas.properties(flow.p_static, flow.t_static);
        let pr_s = s[GasProperty::Viscosity] * 2400.0 / s[GasProperty::ConductivityTotal];
        let te = flow.t_static * (1.0 + 0.1 * pr_s.cbrt() * flow.mach.powi(2));
        assert_relative_eq!(state.te, te, max_relative = 1e-12);
        assert_eq!(state.trad, flow.t_static);

        let w = gas.properties(flow.p_static, t_wall);
        let ro = w.density();
        let mu = w[GasProperty::Viscosity];
        let re = ro * flow.u * 0.1 / mu;
        let pr = mu * 2400.0 / w[GasProperty::ConductivityTotal];
        let alpha = 0.0296 * re.powf(-0.2) * pr.powf(-0.6) * ro * 2400.0 * flow.u
            * (0.9 * flow.t_total / te).powf(0.39)
            * (te / flow.t_static).powf(0.11);
        assert_relative_eq!(state.alpha, alpha, max_relative = 1e-12);

        let eps = 0.229 + 0.308 + 0.00011 * flow.t_static - 0.3684 * 0.3
            + 0.00502 * flow.p_static / 1e6
            - 0.00338 * 0.1;
        assert_relative_eq!(state.eps, eps, max_relative = 1e-12);
    }

    #[test]
    fn supersonic_uses_frozen_branch() {
        let gas = test_gas(1.2);
        let flow = FlowSolver::default()
            .solve(&gas, 5e6, 2.0, FlowRegime::Supersonic)
            .unwrap();
        let ex = exchange(Correlation::BoundaryLayer);
        let s = gas.properties(flow.p_static, flow.t_static);
        let pr_s = s[GasProperty::Viscosity] * 2000.0 / s[GasProperty::ConductivityGas];
        let te = flow.t_static * (1.0 + 0.1 * pr_s.cbrt() * flow.mach.powi(2));
        assert_relative_eq!(ex.recovery_temperature(&s, &flow), te, max_relative = 1e-12);
        // the recovery temperature stays below the total temperature
        assert!(te > flow.t_static && te < flow.t_total);
    }

    #[test]
    fn pipe_flow_closed_form() {
        let gas = test_gas(1.2);
        let flow = FlowSolver::default()
            .solve(&gas, 5e6, 1.0, FlowRegime::Sonic)
            .unwrap();
        let state = exchange(Correlation::PipeFlow).evaluate(&gas, &flow, 600.0);
        let w = gas.properties(flow.p_static, 600.0);
        let mu = w[GasProperty::Viscosity];
        let lt = w[GasProperty::ConductivityTotal];
        let re = w.density() * flow.u * 0.1 / mu;
        let pr = mu * 2000.0 / lt;
        assert_relative_eq!(
            state.alpha,
            0.023 * lt / 0.1 * re.powf(0.8) * pr.powf(0.3),
            max_relative = 1e-12
        );
    }

    #[test]
    fn still_gas_has_no_convection() {
        let gas = test_gas(1.2);
        let mut flow = FlowSolver::default()
            .solve(&gas, 5e6, 2.0, FlowRegime::Subsonic)
            .unwrap();
        flow.u = 0.0;
        flow.mach = 0.0;
        let state = exchange(Correlation::BoundaryLayer).evaluate(&gas, &flow, 500.0);
        assert_eq!(state.alpha, 0.0);
        assert_eq!(state.te, flow.t_static);
    }
}
