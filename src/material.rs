//! Temperature-dependent properties of wall materials.

use crate::table::Table1D;
use crate::Error;

/// Material property curves over temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialProperty {
    /// Density [kg/m³].
    Density,
    /// Conductivity along the fibers [W/(m·K)].
    Conductivity0,
    /// Conductivity across the fibers [W/(m·K)].
    Conductivity90,
    /// Conductivity blended for the layer's fiber angle [W/(m·K)].
    Conductivity,
    /// Specific heat [J/(kg·K)].
    SpecificHeat,
    /// Arrhenius pre-exponential factor of the ablation rate.
    PreExponential,
    /// Activation energy of the ablation rate.
    ActivationEnergy,
}

/// Raw property curves of a material, independent of fiber orientation.
#[derive(Debug, Clone)]
pub struct MaterialData {
    pub name: String,
    pub density: Table1D,
    pub conductivity_0: Table1D,
    pub conductivity_90: Table1D,
    pub specific_heat: Table1D,
    pub pre_exponential: Table1D,
    pub activation_energy: Table1D,
}

impl MaterialData {
    /// A material with constant properties and no ablation.
    pub fn constant(name: impl Into<String>, density: f64, conductivity: f64, specific_heat: f64) -> Self {
        Self {
            name: name.into(),
            density: Table1D::constant(density),
            conductivity_0: Table1D::constant(conductivity),
            conductivity_90: Table1D::constant(conductivity),
            specific_heat: Table1D::constant(specific_heat),
            pre_exponential: Table1D::constant(0.0),
            activation_energy: Table1D::constant(0.0),
        }
    }
}

/// A material laid at a given fiber angle.
#[derive(Debug, Clone)]
pub struct Material {
    data: MaterialData,
    angle: f64,
    conductivity: Table1D,
}

impl Material {
    /// Blends the directional conductivities for `angle` in degrees:
    /// `λ = λ0·cos²θ + λ90·cos²(90° − θ)`, tabulated over the union of both
    /// curves' temperatures.
    pub fn new(data: &MaterialData, angle: f64) -> Result<Self, Error> {
        if !angle.is_finite() {
            return Err(Error::malformed("angle", format!("{} is not a valid angle", angle)));
        }
        let w0 = angle.to_radians().cos().powi(2);
        let w90 = (90.0 - angle).to_radians().cos().powi(2);

        let mut keys: Vec<f64> = data
            .conductivity_0
            .keys()
            .iter()
            .chain(data.conductivity_90.keys())
            .copied()
            .collect();
        keys.sort_by(f64::total_cmp);
        keys.dedup();

        let points = keys
            .into_iter()
            .map(|t| {
                let l = w0 * data.conductivity_0.interpolate(t)
                    + w90 * data.conductivity_90.interpolate(t);
                (t, l)
            })
            .collect();

        Ok(Self {
            data: data.clone(),
            angle,
            conductivity: Table1D::new(points)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn property(&self, prop: MaterialProperty, t: f64) -> f64 {
        match prop {
            MaterialProperty::Density => self.data.density.interpolate(t),
            MaterialProperty::Conductivity0 => self.data.conductivity_0.interpolate(t),
            MaterialProperty::Conductivity90 => self.data.conductivity_90.interpolate(t),
            MaterialProperty::Conductivity => self.conductivity.interpolate(t),
            MaterialProperty::SpecificHeat => self.data.specific_heat.interpolate(t),
            MaterialProperty::PreExponential => self.data.pre_exponential.interpolate(t),
            MaterialProperty::ActivationEnergy => self.data.activation_energy.interpolate(t),
        }
    }

    #[inline]
    pub fn conductivity(&self, t: f64) -> f64 {
        self.conductivity.interpolate(t)
    }

    #[inline]
    pub fn density(&self, t: f64) -> f64 {
        self.data.density.interpolate(t)
    }

    #[inline]
    pub fn specific_heat(&self, t: f64) -> f64 {
        self.data.specific_heat.interpolate(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn anisotropic() -> MaterialData {
        MaterialData {
            name: "carbon-phenolic".into(),
            density: Table1D::from_columns(vec![300.0, 1500.0], vec![1450.0, 1300.0]).unwrap(),
            conductivity_0: Table1D::from_columns(vec![300.0, 1000.0], vec![1.0, 2.0]).unwrap(),
            conductivity_90: Table1D::from_columns(vec![300.0, 700.0], vec![0.5, 0.7]).unwrap(),
            specific_heat: Table1D::constant(1200.0),
            pre_exponential: Table1D::constant(1e4),
            activation_energy: Table1D::constant(8e4),
        }
    }

    #[test]
    fn along_the_fibers() {
        let m = Material::new(&anisotropic(), 0.0).unwrap();
        assert_relative_eq!(m.conductivity(650.0), 1.5, max_relative = 1e-12);
    }

    #[test]
    fn across_the_fibers() {
        let m = Material::new(&anisotropic(), 90.0).unwrap();
        assert_relative_eq!(m.conductivity(500.0), 0.6, max_relative = 1e-9);
    }

    #[test]
    fn blend_uses_union_of_temperatures() {
        let m = Material::new(&anisotropic(), 45.0).unwrap();
        // 700 K is a key of the 90° curve only
        let expected = 0.5 * m.property(MaterialProperty::Conductivity0, 700.0) + 0.5 * 0.7;
        assert_relative_eq!(m.conductivity(700.0), expected, max_relative = 1e-12);
        assert_eq!(m.angle(), 45.0);
    }

    #[test]
    fn ablation_parameters_are_queryable() {
        let m = Material::new(&anisotropic(), 0.0).unwrap();
        assert_eq!(m.property(MaterialProperty::PreExponential, 900.0), 1e4);
        assert_eq!(m.property(MaterialProperty::ActivationEnergy, 900.0), 8e4);
        assert_relative_eq!(m.density(900.0), 1375.0);
    }
}
