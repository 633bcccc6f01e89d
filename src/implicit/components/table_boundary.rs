use crate::implicit::{Boundary, BoundaryCoefficients};
use crate::table::Table1D;

/// Coefficients tabulated over the face temperature.
#[derive(Debug, Clone)]
pub struct TableBoundary {
    pub alpha: Table1D,
    pub te: Table1D,
    pub trad: Table1D,
    pub eps: Table1D,
    pub q: Table1D,
}

impl TableBoundary {
    /// The same coefficients at every face temperature.
    pub fn constant(bc: BoundaryCoefficients) -> Self {
        Self {
            alpha: Table1D::constant(bc.alpha),
            te: Table1D::constant(bc.te),
            trad: Table1D::constant(bc.trad),
            eps: Table1D::constant(bc.eps),
            q: Table1D::constant(bc.q),
        }
    }

    /// No heat crosses the face.
    pub fn adiabatic() -> Self {
        Self::constant(BoundaryCoefficients::default())
    }
}

impl Boundary for TableBoundary {
    fn coefficients(&self, wall_temperature: f64) -> BoundaryCoefficients {
        BoundaryCoefficients {
            alpha: self.alpha.interpolate(wall_temperature),
            te: self.te.interpolate(wall_temperature),
            trad: self.trad.interpolate(wall_temperature),
            eps: self.eps.interpolate(wall_temperature),
            q: self.q.interpolate(wall_temperature),
        }
    }
}
