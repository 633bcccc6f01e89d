//! JSON description of a simulation case.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::database::Database;
use crate::gas::{Correlation, FlowRegime, FlowSolver, HeatExchange};
use crate::implicit::components::{FlowBoundary, FlowBoundaryDescriptor, TableBoundary};
use crate::implicit::{Boundary, ImplicitSolver, ImplicitSolverDescriptor};
use crate::mesh::{InitialTemperature, LayerSpec, Mesh, MeshDescriptor, Symmetry};
use crate::table::Curve;
use crate::{Error, Simulation, SimulationDescriptor, SimulationParameters};

#[derive(Deserialize, Debug, Clone)]
pub struct JsonLayer {
    pub material: String,
    pub thickness: f64, // [m]
    pub subdivisions: usize,
    /// Fiber angle [deg].
    #[serde(default)]
    pub angle: f64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum JsonInitialTemperature {
    Uniform(f64),
    /// Temperature over position.
    Profile(Curve),
}

#[derive(Deserialize, Debug, Clone)]
pub struct JsonSolver {
    #[serde(rename = "solve time")]
    pub solve_time: f64,
    #[serde(rename = "solve time step")]
    pub solve_timestep: f64,
    #[serde(rename = "output time step", default)]
    pub output_timestep: f64,
    #[serde(rename = "output times", default)]
    pub output_times: Vec<f64>,
    #[serde(rename = "max iterations")]
    pub max_iterations: Option<usize>,
    pub tolerance: Option<f64>,
    #[serde(rename = "gas max iterations")]
    pub gas_max_iterations: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum JsonBoundary {
    /// Coefficients tabulated over the face temperature.
    Table {
        alpha: Curve,
        te: Curve,
        trad: Curve,
        eps: Curve,
        q: Curve,
    },
    /// Coefficients derived from the gas flow.
    Flow {
        #[serde(default)]
        correlation: Correlation,
    },
}

#[derive(Deserialize, Debug, Clone)]
pub struct CaseConfig {
    pub name: String,
    pub symmetry: Option<Symmetry>,
    /// Older cases only flag cylindrical walls.
    #[serde(rename = "axis symmetry")]
    pub axis_symmetry: Option<bool>,
    pub fuel: Option<String>,
    pub layers: Vec<JsonLayer>,
    #[serde(rename = "initial radius", default)]
    pub initial_radius: f64, // [m]
    #[serde(rename = "throat radius")]
    pub throat_radius: Option<f64>, // [m]
    #[serde(rename = "blayer length")]
    pub blayer_length: Option<f64>, // [m]
    #[serde(rename = "flow type", default)]
    pub flow_type: FlowRegime,
    #[serde(rename = "initial temp")]
    pub initial_temperature: JsonInitialTemperature,
    /// Chamber pressure over time.
    pub pressure: Option<Curve>,
    pub solver: JsonSolver,
    #[serde(rename = "boundary left")]
    pub boundary_left: JsonBoundary,
    #[serde(rename = "boundary right")]
    pub boundary_right: JsonBoundary,
}

fn required(value: Option<f64>, field: &str) -> Result<f64, Error> {
    match value {
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        Some(v) => Err(Error::malformed(field, format!("must be positive, got {}", v))),
        None => Err(Error::malformed(field, "required by a flow boundary")),
    }
}

impl CaseConfig {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn symmetry(&self) -> Symmetry {
        match (self.symmetry, self.axis_symmetry) {
            (Some(symmetry), _) => symmetry,
            (None, Some(true)) => Symmetry::Cylindrical,
            _ => Symmetry::Planar,
        }
    }

    pub fn sim_params(&self) -> SimulationParameters {
        let s = &self.solver;
        let mut params = SimulationParameters::new(s.solve_timestep, s.solve_time, s.output_timestep)
            .with_output_times(s.output_times.clone());
        if let Some(max_iterations) = s.max_iterations {
            params.max_iterations = max_iterations;
        }
        if let Some(tolerance) = s.tolerance {
            params.tolerance = tolerance;
        }
        params
    }

    pub fn mesh(&self, db: &Database) -> Result<Mesh, Error> {
        let layers = self
            .layers
            .iter()
            .map(|layer| {
                Ok(LayerSpec {
                    material: db.material(&layer.material, layer.angle)?,
                    thickness: layer.thickness,
                    subdivisions: layer.subdivisions,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let initial_temperature = match &self.initial_temperature {
            JsonInitialTemperature::Uniform(t) => InitialTemperature::Uniform(*t),
            JsonInitialTemperature::Profile(curve) => {
                InitialTemperature::Profile(curve.to_table("initial temp")?)
            }
        };
        Mesh::new(MeshDescriptor {
            layers,
            symmetry: self.symmetry(),
            inner_radius: self.initial_radius,
            initial_temperature,
        })
    }

    fn boundary(&self, db: &Database, spec: &JsonBoundary, radius: f64) -> Result<Box<dyn Boundary>, Error> {
        match spec {
            JsonBoundary::Table { alpha, te, trad, eps, q } => Ok(Box::new(TableBoundary {
                alpha: alpha.to_table("alpha")?,
                te: te.to_table("te")?,
                trad: trad.to_table("trad")?,
                eps: eps.to_table("eps")?,
                q: q.to_table("q")?,
            })),
            JsonBoundary::Flow { correlation } => {
                let fuel = self
                    .fuel
                    .as_deref()
                    .ok_or_else(|| Error::malformed("fuel", "required by a flow boundary"))?;
                let pressure = self
                    .pressure
                    .as_ref()
                    .ok_or_else(|| Error::malformed("pressure", "required by a flow boundary"))?
                    .to_table("pressure")?;
                let throat_radius = required(self.throat_radius, "throat radius")?;
                let blayer_length = match correlation {
                    Correlation::BoundaryLayer => required(self.blayer_length, "blayer length")?,
                    Correlation::PipeFlow => self.blayer_length.unwrap_or(0.0),
                };
                let radius = required(Some(radius), "face radius")?;

                let mut flow_solver = FlowSolver::default();
                if let Some(max_iterations) = self.solver.gas_max_iterations {
                    flow_solver.max_iterations = max_iterations;
                }
                Ok(Box::new(FlowBoundary::new(FlowBoundaryDescriptor {
                    gas: db.fuel(fuel)?,
                    pressure,
                    regime: self.flow_type,
                    ksi: radius / throat_radius,
                    exchange: HeatExchange {
                        correlation: *correlation,
                        blayer_length,
                        radius,
                    },
                    flow_solver,
                })))
            }
        }
    }

    /// Assembles the mesh, boundaries and solver of the case.
    pub fn build(&self, db: &Database) -> Result<Simulation<ImplicitSolver>, Error> {
        let mesh = self.mesh(db)?;
        let outer_radius = mesh.positions()[mesh.len() - 1];
        let left = self.boundary(db, &self.boundary_left, self.initial_radius)?;
        let right = self.boundary(db, &self.boundary_right, outer_radius)?;

        log::info!(
            "case `{}`: {} layers, {} nodes, {:?}",
            self.name,
            self.layers.len(),
            mesh.len(),
            mesh.symmetry()
        );

        Simulation::new(SimulationDescriptor {
            solver: ImplicitSolver::new(ImplicitSolverDescriptor { mesh, left, right }),
            sim_params: self.sim_params(),
            init_state: None,
        })
    }
}
