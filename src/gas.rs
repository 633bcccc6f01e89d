//! Combustion gas properties and the gas-side models built on them.

pub mod flow;
pub mod heat_exchange;

pub use flow::{FlowRegime, FlowSolver, FlowState};
pub use heat_exchange::{BoundaryHeatState, Correlation, HeatExchange};

use crate::table::{Lerp, Table1D, Table2D};

/// Tabulated gas property. The discriminant is the column index in a property
/// record; fuel files key each column by `index + 2` (0 and 1 hold p and T).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GasProperty {
    /// Specific volume [m³/kg].
    SpecificVolume,
    /// Molar mass [mol/kg].
    MolarMass,
    CpFrozen,
    KFrozen,
    CpEquilibrium,
    KEquilibrium,
    CpGasFrozen,
    KGasFrozen,
    CpGasEquilibrium,
    KGasEquilibrium,
    /// Dynamic viscosity [Pa·s].
    Viscosity,
    /// Frozen thermal conductivity [W/(m·K)].
    ConductivityGas,
    /// Equilibrium thermal conductivity [W/(m·K)].
    ConductivityTotal,
    PrandtlFrozen,
    PrandtlEquilibrium,
    /// Speed of sound [m/s].
    SoundSpeed,
    /// Radiation factor of the combustion products.
    Z,
    Bm,
    MassFractionO,
    MassFractionO2,
    MassFractionH2O,
    MassFractionCO2,
    MassFractionN,
}

impl GasProperty {
    pub const COUNT: usize = 23;

    pub const ALL: [GasProperty; GasProperty::COUNT] = [
        GasProperty::SpecificVolume,
        GasProperty::MolarMass,
        GasProperty::CpFrozen,
        GasProperty::KFrozen,
        GasProperty::CpEquilibrium,
        GasProperty::KEquilibrium,
        GasProperty::CpGasFrozen,
        GasProperty::KGasFrozen,
        GasProperty::CpGasEquilibrium,
        GasProperty::KGasEquilibrium,
        GasProperty::Viscosity,
        GasProperty::ConductivityGas,
        GasProperty::ConductivityTotal,
        GasProperty::PrandtlFrozen,
        GasProperty::PrandtlEquilibrium,
        GasProperty::SoundSpeed,
        GasProperty::Z,
        GasProperty::Bm,
        GasProperty::MassFractionO,
        GasProperty::MassFractionO2,
        GasProperty::MassFractionH2O,
        GasProperty::MassFractionCO2,
        GasProperty::MassFractionN,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key of the column in a fuel file.
    #[inline]
    pub fn file_key(self) -> usize {
        self.index() + 2
    }

    pub fn name(self) -> &'static str {
        match self {
            GasProperty::SpecificVolume => "v",
            GasProperty::MolarMass => "M",
            GasProperty::CpFrozen => "cp_fr",
            GasProperty::KFrozen => "k_fr",
            GasProperty::CpEquilibrium => "cp_eq",
            GasProperty::KEquilibrium => "k_eq",
            GasProperty::CpGasFrozen => "cp_gas_fr",
            GasProperty::KGasFrozen => "k_gas_fr",
            GasProperty::CpGasEquilibrium => "cp_gas_eq",
            GasProperty::KGasEquilibrium => "k_gas_eq",
            GasProperty::Viscosity => "mu",
            GasProperty::ConductivityGas => "lt_gas",
            GasProperty::ConductivityTotal => "lt_total",
            GasProperty::PrandtlFrozen => "pr_fr",
            GasProperty::PrandtlEquilibrium => "pr_eq",
            GasProperty::SoundSpeed => "A",
            GasProperty::Z => "z",
            GasProperty::Bm => "bm",
            GasProperty::MassFractionO => "m_frac_o",
            GasProperty::MassFractionO2 => "m_frac_o2",
            GasProperty::MassFractionH2O => "m_frac_h2o",
            GasProperty::MassFractionCO2 => "m_frac_co2",
            GasProperty::MassFractionN => "m_frac_n",
        }
    }
}

/// One record of gas properties at a given pressure and temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasProperties([f64; GasProperty::COUNT]);

impl GasProperties {
    pub fn from_fn<F: FnMut(GasProperty) -> f64>(mut f: F) -> Self {
        let mut values = [0.0; GasProperty::COUNT];
        for prop in GasProperty::ALL {
            values[prop.index()] = f(prop);
        }
        Self(values)
    }

    #[inline]
    pub fn get(&self, prop: GasProperty) -> f64 {
        self.0[prop.index()]
    }

    #[inline]
    pub fn set(&mut self, prop: GasProperty, value: f64) {
        self.0[prop.index()] = value;
    }

    /// Density [kg/m³].
    #[inline]
    pub fn density(&self) -> f64 {
        self.get(GasProperty::SpecificVolume).recip()
    }
}

impl std::ops::Index<GasProperty> for GasProperties {
    type Output = f64;

    fn index(&self, prop: GasProperty) -> &f64 {
        &self.0[prop.index()]
    }
}

impl Lerp for GasProperties {
    fn lerp(x1: f64, x2: f64, y1: &Self, y2: &Self, x: f64) -> Self {
        GasProperties::from_fn(|prop| f64::lerp(x1, x2, &y1[prop], &y2[prop], x))
    }
}

/// Combustion products of a fuel: total temperature over chamber pressure
/// and property records over (pressure, temperature).
#[derive(Debug, Clone)]
pub struct Gas {
    name: String,
    total_temperature: Table1D,
    properties: Table2D<GasProperties>,
}

impl Gas {
    pub fn new(
        name: impl Into<String>,
        total_temperature: Table1D,
        properties: Table2D<GasProperties>,
    ) -> Self {
        Self {
            name: name.into(),
            total_temperature,
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stagnation temperature [K] at total pressure `p_total` [Pa].
    #[inline]
    pub fn total_temperature(&self, p_total: f64) -> f64 {
        self.total_temperature.interpolate(p_total)
    }

    #[inline]
    pub fn properties(&self, pressure: f64, temperature: f64) -> GasProperties {
        self.properties.interpolate(pressure, temperature)
    }

    pub fn property_table(&self) -> &Table2D<GasProperties> {
        &self.properties
    }
}
