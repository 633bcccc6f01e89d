use std::rc::Rc;

use crate::gas::{FlowRegime, FlowSolver, FlowState, Gas, HeatExchange};
use crate::implicit::{Boundary, BoundaryCoefficients};
use crate::numerics::EPS;
use crate::table::Table1D;
use crate::Error;

/// Describes the composition of a `FlowBoundary`.
pub struct FlowBoundaryDescriptor {
    pub gas: Rc<Gas>,
    /// Chamber pressure over time.
    pub pressure: Table1D,
    pub regime: FlowRegime,
    /// Ratio of the local radius to the throat radius.
    pub ksi: f64,
    pub exchange: HeatExchange,
    pub flow_solver: FlowSolver,
}

/// Face exposed to the gas flow. Coefficients are derived once per timestep
/// from the chamber pressure and the face temperature of the previous step.
pub struct FlowBoundary {
    gas: Rc<Gas>,
    pressure: Table1D,
    regime: FlowRegime,
    ksi: f64,
    exchange: HeatExchange,
    flow_solver: FlowSolver,
    flow: Option<FlowState>,
    current: BoundaryCoefficients,
}

impl FlowBoundary {
    pub fn new(desc: FlowBoundaryDescriptor) -> Self {
        Self {
            gas: desc.gas,
            pressure: desc.pressure,
            regime: desc.regime,
            ksi: desc.ksi,
            exchange: desc.exchange,
            flow_solver: desc.flow_solver,
            flow: None,
            current: BoundaryCoefficients::default(),
        }
    }

    /// The flow state of the last prepared timestep.
    pub fn flow(&self) -> Option<&FlowState> {
        self.flow.as_ref()
    }

    fn flow_at(&mut self, p_total: f64) -> Result<FlowState, Error> {
        match self.flow {
            Some(flow) if (flow.p_total - p_total).abs() <= EPS => Ok(flow),
            _ => {
                let flow = self.flow_solver.solve(&self.gas, p_total, self.ksi, self.regime)?;
                self.flow = Some(flow);
                Ok(flow)
            }
        }
    }
}

impl Boundary for FlowBoundary {
    fn prepare(&mut self, time: f64, wall_temperature: f64) -> Result<(), Error> {
        let p_total = self.pressure.interpolate(time);
        let flow = self.flow_at(p_total)?;
        let heat = self.exchange.evaluate(&self.gas, &flow, wall_temperature);
        log::trace!(
            "flow boundary t = {:.6}: p0 = {:.4e}, alpha = {:.2}, te = {:.2}, eps = {:.4}",
            time,
            p_total,
            heat.alpha,
            heat.te,
            heat.eps
        );
        self.current = BoundaryCoefficients {
            alpha: heat.alpha,
            te: heat.te,
            trad: heat.trad,
            eps: heat.eps,
            q: 0.0,
        };
        Ok(())
    }

    fn coefficients(&self, _wall_temperature: f64) -> BoundaryCoefficients {
        self.current
    }
}
