//! Finite-volume discretisation of a layered wall.
//!
//! Nodes are laid out from the inner radius outwards: one seed node on the
//! inner face, followed by every subdivision of every layer in order. A node
//! keeps the indices of its neighbours and of the layer on either side, so
//! the node sequence is never re-borrowed while it is updated.

use serde::Deserialize;

use crate::material::Material;
use crate::numerics::{integral, linterp, EPS};
use crate::table::Table1D;
use crate::Error;

/// Coordinate system of the wall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    #[default]
    Planar,
    Cylindrical,
    Spherical,
}

impl Symmetry {
    /// Area correction of a face at `face` for a node at `center`.
    #[inline]
    pub fn factor(self, face: f64, center: f64) -> f64 {
        match self {
            Symmetry::Planar => 1.0,
            Symmetry::Cylindrical => face / center,
            Symmetry::Spherical => (face / center).powi(2),
        }
    }
}

/// A layer of uniform material.
#[derive(Debug, Clone)]
pub struct LayerSpec {
    pub material: Material,
    /// Thickness [m].
    pub thickness: f64,
    /// Number of equal subdivisions.
    pub subdivisions: usize,
}

/// Temperature field the mesh starts from.
#[derive(Debug, Clone)]
pub enum InitialTemperature {
    Uniform(f64),
    /// Temperature over node position, extrapolated along the end slopes.
    Profile(Table1D),
}

impl InitialTemperature {
    #[inline]
    pub fn at(&self, x: f64) -> f64 {
        match self {
            InitialTemperature::Uniform(t) => *t,
            InitialTemperature::Profile(table) => table.interpolate(x),
        }
    }
}

/// Describes the composition of a `Mesh`.
#[derive(Debug, Clone)]
pub struct MeshDescriptor {
    pub layers: Vec<LayerSpec>,
    pub symmetry: Symmetry,
    /// Position of the inner face [m].
    pub inner_radius: f64,
    pub initial_temperature: InitialTemperature,
}

/// Link to the adjacent node and the layer between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub volume: usize,
    pub layer: usize,
}

/// Control volume around a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Node position [m].
    pub x: f64,
    /// Half the distance to the left node, 0 on the inner face.
    pub half_left: f64,
    /// Half the distance to the right node, 0 on the outer face.
    pub half_right: f64,
    pub t_curr: f64,
    pub t_prev_step: f64,
    pub t_prev_iter: f64,
    /// Effective conductivity towards the left node.
    pub lambda_left: f64,
    /// Effective conductivity towards the right node.
    pub lambda_right: f64,
    pub rho_mean: f64,
    pub cp_mean: f64,
    pub r_left: f64,
    pub r_right: f64,
    pub left: Option<Neighbor>,
    pub right: Option<Neighbor>,
}

impl Volume {
    fn new(x: f64, t: f64) -> Self {
        Self {
            x,
            half_left: 0.0,
            half_right: 0.0,
            t_curr: t,
            t_prev_step: t,
            t_prev_iter: t,
            lambda_left: 0.0,
            lambda_right: 0.0,
            rho_mean: 0.0,
            cp_mean: 0.0,
            r_left: 1.0,
            r_right: 1.0,
            left: None,
            right: None,
        }
    }

    /// Width of the control volume.
    #[inline]
    pub fn width(&self) -> f64 {
        self.half_left + self.half_right
    }

    /// Volumetric heat capacity [J/(m³·K)].
    #[inline]
    pub fn rho_cp(&self) -> f64 {
        self.rho_mean * self.cp_mean
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Effective {
    lambda_left: f64,
    lambda_right: f64,
    rho_mean: f64,
    cp_mean: f64,
}

/// Ordered control volumes of a layered wall.
#[derive(Debug, Clone)]
pub struct Mesh {
    volumes: Vec<Volume>,
    layers: Vec<LayerSpec>,
    symmetry: Symmetry,
}

impl Mesh {
    pub fn new(desc: MeshDescriptor) -> Result<Self, Error> {
        if desc.layers.is_empty() {
            return Err(Error::malformed("layers", "at least one layer is required"));
        }
        for (i, layer) in desc.layers.iter().enumerate() {
            if !(layer.thickness > 0.0) || !layer.thickness.is_finite() {
                return Err(Error::malformed(
                    format!("layers[{}].thickness", i),
                    format!("must be positive, got {}", layer.thickness),
                ));
            }
            if layer.subdivisions == 0 {
                return Err(Error::malformed(
                    format!("layers[{}].subdivisions", i),
                    "must be at least 1",
                ));
            }
        }
        if !desc.inner_radius.is_finite() || desc.inner_radius < 0.0 {
            return Err(Error::malformed(
                "inner_radius",
                format!("must be non-negative, got {}", desc.inner_radius),
            ));
        }
        if desc.symmetry != Symmetry::Planar && desc.inner_radius <= EPS {
            return Err(Error::malformed(
                "inner_radius",
                format!("{:?} walls need a positive inner radius", desc.symmetry),
            ));
        }

        let total = 1 + desc.layers.iter().map(|l| l.subdivisions).sum::<usize>();
        let mut volumes = Vec::with_capacity(total);
        let x0 = desc.inner_radius;
        volumes.push(Volume::new(x0, desc.initial_temperature.at(x0)));
        for (layer_index, layer) in desc.layers.iter().enumerate() {
            let dx = layer.thickness / layer.subdivisions as f64;
            for _ in 0..layer.subdivisions {
                let prev = volumes.len() - 1;
                let x = volumes[prev].x + dx;
                let mut volume = Volume::new(x, desc.initial_temperature.at(x));
                volume.left = Some(Neighbor {
                    volume: prev,
                    layer: layer_index,
                });
                volumes[prev].right = Some(Neighbor {
                    volume: prev + 1,
                    layer: layer_index,
                });
                volumes.push(volume);
            }
        }

        let mut mesh = Self {
            volumes,
            layers: desc.layers,
            symmetry: desc.symmetry,
        };
        mesh.compute_geometry();
        mesh.refresh_effective_properties();

        log::debug!(
            "mesh: {} nodes over {} layers, {:?}, x = [{:.6}, {:.6}]",
            mesh.len(),
            mesh.layers.len(),
            mesh.symmetry,
            mesh.volumes[0].x,
            mesh.volumes[mesh.len() - 1].x,
        );

        Ok(mesh)
    }

    fn compute_geometry(&mut self) {
        let positions: Vec<f64> = self.volumes.iter().map(|v| v.x).collect();
        let symmetry = self.symmetry;
        for volume in self.volumes.iter_mut() {
            if let Some(left) = volume.left {
                let xl = positions[left.volume];
                volume.half_left = (volume.x - xl) / 2.0;
                volume.r_left = symmetry.factor((xl + volume.x) / 2.0, volume.x);
            }
            if let Some(right) = volume.right {
                let xr = positions[right.volume];
                volume.half_right = (xr - volume.x) / 2.0;
                volume.r_right = symmetry.factor((volume.x + xr) / 2.0, volume.x);
            }
        }
    }

    /// Conductivity of the segment to `other` over a linear temperature
    /// profile between both nodes: `length / ∫ 1/λ(T(x)) dx`.
    fn effective_conductivity(&self, volume: &Volume, other: Neighbor) -> f64 {
        let material = &self.layers[other.layer].material;
        let neighbor = &self.volumes[other.volume];
        let (a, b) = (volume.x.min(neighbor.x), volume.x.max(neighbor.x));
        let resistance = integral(a, b, |x| {
            let t = linterp(volume.x, neighbor.x, volume.t_prev_step, neighbor.t_prev_step, x);
            material.conductivity(t).recip()
        });
        (b - a) / resistance
    }

    /// Integrals of density and specific heat over the half segment from the
    /// node towards `other`.
    fn half_segment_integrals(&self, volume: &Volume, other: Neighbor) -> (f64, f64) {
        let material = &self.layers[other.layer].material;
        let neighbor = &self.volumes[other.volume];
        let mid = (volume.x + neighbor.x) / 2.0;
        // linear between node centres, so the midpoint sees the mean temperature
        let temperature =
            |x: f64| linterp(volume.x, neighbor.x, volume.t_prev_step, neighbor.t_prev_step, x);
        let (a, b) = (volume.x.min(mid), volume.x.max(mid));
        let rho = integral(a, b, |x| material.density(temperature(x)));
        let cp = integral(a, b, |x| material.specific_heat(temperature(x)));
        (rho, cp)
    }

    fn effective(&self, volume: &Volume) -> Effective {
        let mut eff = Effective::default();
        let (mut rho, mut cp) = (0.0, 0.0);
        if let Some(left) = volume.left {
            eff.lambda_left = self.effective_conductivity(volume, left);
            let (r, c) = self.half_segment_integrals(volume, left);
            rho += r;
            cp += c;
        }
        if let Some(right) = volume.right {
            eff.lambda_right = self.effective_conductivity(volume, right);
            let (r, c) = self.half_segment_integrals(volume, right);
            rho += r;
            cp += c;
        }
        let width = volume.width();
        eff.rho_mean = rho / width;
        eff.cp_mean = cp / width;
        eff
    }

    /// Recomputes effective conductivities and heat capacities from the
    /// previous-step temperatures.
    pub fn refresh_effective_properties(&mut self) {
        let effective: Vec<Effective> = self.volumes.iter().map(|v| self.effective(v)).collect();
        for (volume, eff) in self.volumes.iter_mut().zip(effective) {
            volume.lambda_left = eff.lambda_left;
            volume.lambda_right = eff.lambda_right;
            volume.rho_mean = eff.rho_mean;
            volume.cp_mean = eff.cp_mean;
        }
    }

    pub fn store_previous_step(&mut self) {
        for volume in self.volumes.iter_mut() {
            volume.t_prev_step = volume.t_curr;
        }
    }

    pub fn store_previous_iteration(&mut self) {
        for volume in self.volumes.iter_mut() {
            volume.t_prev_iter = volume.t_curr;
        }
    }

    /// Replaces every temperature of the field, including the stored ones.
    pub fn load_temperatures(&mut self, temperatures: &ndarray::Array1<f64>) -> Result<(), Error> {
        if temperatures.len() != self.len() {
            return Err(Error::BadInit {
                array_name: "Temperature".to_string(),
                input_length: temperatures.len(),
                expected_length: self.len(),
            });
        }
        for (volume, &t) in self.volumes.iter_mut().zip(temperatures.iter()) {
            volume.t_curr = t;
            volume.t_prev_step = t;
            volume.t_prev_iter = t;
        }
        Ok(())
    }

    #[inline]
    pub fn set_temperature(&mut self, index: usize, t: f64) {
        self.volumes[index].t_curr = t;
    }

    pub fn temperatures(&self) -> ndarray::Array1<f64> {
        self.volumes.iter().map(|v| v.t_curr).collect()
    }

    pub fn previous_step_temperatures(&self) -> ndarray::Array1<f64> {
        self.volumes.iter().map(|v| v.t_prev_step).collect()
    }

    pub fn positions(&self) -> ndarray::Array1<f64> {
        self.volumes.iter().map(|v| v.x).collect()
    }

    /// Interior nodes that separate two different layers.
    pub fn interfaces(&self) -> Vec<usize> {
        self.volumes
            .iter()
            .enumerate()
            .filter_map(|(i, v)| match (v.left, v.right) {
                (Some(l), Some(r)) if l.layer != r.layer => Some(i),
                _ => None,
            })
            .collect()
    }

    #[inline]
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Always false; a mesh holds at least two nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::material::MaterialData;
    use approx::assert_relative_eq;

    pub(crate) fn graphite() -> Material {
        let data = MaterialData {
            conductivity_0: Table1D::from_columns(vec![300.0, 2000.0], vec![100.0, 40.0]).unwrap(),
            conductivity_90: Table1D::from_columns(vec![300.0, 2000.0], vec![100.0, 40.0]).unwrap(),
            specific_heat: Table1D::from_columns(vec![300.0, 2000.0], vec![700.0, 2000.0]).unwrap(),
            ..MaterialData::constant("graphite", 1800.0, 0.0, 0.0)
        };
        Material::new(&data, 0.0).unwrap()
    }

    pub(crate) fn insulator() -> Material {
        Material::new(&MaterialData::constant("insulator", 300.0, 0.2, 1000.0), 0.0).unwrap()
    }

    fn two_layers(symmetry: Symmetry, inner_radius: f64, t0: InitialTemperature) -> Mesh {
        Mesh::new(MeshDescriptor {
            layers: vec![
                LayerSpec {
                    material: graphite(),
                    thickness: 0.01,
                    subdivisions: 4,
                },
                LayerSpec {
                    material: insulator(),
                    thickness: 0.005,
                    subdivisions: 5,
                },
            ],
            symmetry,
            inner_radius,
            initial_temperature: t0,
        })
        .unwrap()
    }

    #[test]
    fn planar_by_default() {
        assert_eq!(Symmetry::default(), Symmetry::Planar);
        assert_eq!(Symmetry::default().factor(0.2, 0.1), 1.0);
    }

    #[test]
    fn layout() {
        let mesh = two_layers(Symmetry::Planar, 0.0, InitialTemperature::Uniform(300.0));
        assert_eq!(mesh.len(), 10);
        let x = mesh.positions();
        assert_relative_eq!(x[4], 0.01, max_relative = 1e-12);
        assert_relative_eq!(x[9], 0.015, max_relative = 1e-12);
        assert_eq!(mesh.interfaces(), vec![4]);

        let v = mesh.volumes();
        assert!(v[0].left.is_none() && v[0].right.is_some());
        assert!(v[9].left.is_some() && v[9].right.is_none());
        assert!(v[1..9].iter().all(|v| v.left.is_some() && v.right.is_some()));
        assert_relative_eq!(v[4].half_left, 0.00125, max_relative = 1e-9);
        assert_relative_eq!(v[4].half_right, 0.0005, max_relative = 1e-9);
        assert_eq!(v[0].half_left, 0.0);
    }

    #[test]
    fn uniform_field_gives_material_conductivity() {
        let mesh = Mesh::new(MeshDescriptor {
            layers: vec![LayerSpec {
                material: graphite(),
                thickness: 0.02,
                subdivisions: 8,
            }],
            symmetry: Symmetry::Planar,
            inner_radius: 0.0,
            initial_temperature: InitialTemperature::Uniform(1150.0),
        })
        .unwrap();
        let material = graphite();
        for v in mesh.volumes() {
            if v.left.is_some() {
                assert_relative_eq!(v.lambda_left, material.conductivity(1150.0), max_relative = 1e-12);
            }
            if v.right.is_some() {
                assert_relative_eq!(v.lambda_right, material.conductivity(1150.0), max_relative = 1e-12);
            }
            assert_relative_eq!(v.rho_cp(), 1800.0 * material.specific_heat(1150.0), max_relative = 1e-12);
        }
    }

    #[test]
    fn conductivity_is_a_harmonic_mean() {
        let mesh = two_layers(
            Symmetry::Planar,
            0.0,
            InitialTemperature::Profile(
                Table1D::from_columns(vec![0.0, 0.015], vec![2000.0, 300.0]).unwrap(),
            ),
        );
        let v = &mesh.volumes()[1];
        let plain = graphite().conductivity((v.t_prev_step + mesh.volumes()[2].t_prev_step) / 2.0);
        // 1/λ is convex for a linear λ(T), so the harmonic mean sits below λ(T_mean)
        assert!(v.lambda_right < plain);
        assert!(v.lambda_right > 40.0 && v.lambda_right < 100.0);
        assert_relative_eq!(mesh.volumes()[2].lambda_left, v.lambda_right, max_relative = 1e-12);
    }

    #[test]
    fn cylindrical_factors() {
        let mesh = two_layers(Symmetry::Cylindrical, 0.05, InitialTemperature::Uniform(300.0));
        let v = mesh.volumes();
        assert_relative_eq!(v[0].r_right, (0.05 + 0.0025 / 2.0) / 0.05, max_relative = 1e-12);
        assert_relative_eq!(v[3].r_left, (v[2].x + v[3].x) / 2.0 / v[3].x, max_relative = 1e-12);
        assert!(v[5].r_left < 1.0 && v[5].r_right > 1.0);

        let sphere = two_layers(Symmetry::Spherical, 0.05, InitialTemperature::Uniform(300.0));
        assert_relative_eq!(sphere.volumes()[3].r_left, v[3].r_left.powi(2), max_relative = 1e-12);
    }

    #[test]
    fn axisymmetric_walls_need_a_radius() {
        let err = Mesh::new(MeshDescriptor {
            layers: vec![LayerSpec {
                material: insulator(),
                thickness: 0.01,
                subdivisions: 2,
            }],
            symmetry: Symmetry::Cylindrical,
            inner_radius: 0.0,
            initial_temperature: InitialTemperature::Uniform(300.0),
        })
        .unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
    }

    #[test]
    fn bad_initial_field_length() {
        let mut mesh = two_layers(Symmetry::Planar, 0.0, InitialTemperature::Uniform(300.0));
        let err = mesh.load_temperatures(&ndarray::Array1::from_elem(3, 500.0)).unwrap_err();
        assert!(matches!(err, Error::BadInit { expected_length: 10, .. }));
    }
}
