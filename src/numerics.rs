/// Tolerance for comparing times, pressures and fixed-point iterates.
pub const EPS: f64 = 1e-5;
/// Tolerance of the per-timestep nonlinear iteration.
pub const EPS_ITER: f64 = 1e-4;
/// Stefan–Boltzmann constant [W/(m²·K⁴)].
pub const SIGMA: f64 = 5.67e-8;
/// Number of midpoint samples used by [`integral`].
pub const N_INTEGRATION: usize = 5;

pub(crate) const MEGA: f64 = 1e6;

/// Straight line through `(x1, y1)` and `(x2, y2)` evaluated at `x`.
///
/// Extrapolates along the same slope outside `[x1, x2]`. Returns `y1` when
/// both abscissas coincide.
#[inline]
pub fn linterp(x1: f64, x2: f64, y1: f64, y2: f64, x: f64) -> f64 {
    if x1 != x2 {
        y1 + (y2 - y1) / (x2 - x1) * (x - x1)
    } else {
        y1
    }
}

/// Midpoint rule with [`N_INTEGRATION`] equal sub-intervals over `[a, b]`.
pub fn integral<F>(a: f64, b: f64, f: F) -> f64
where
    F: Fn(f64) -> f64,
{
    let dx = (b - a) / N_INTEGRATION as f64;
    (0..N_INTEGRATION)
        .map(|i| f(a + dx * i as f64 + 0.5 * dx) * dx)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linterp_continues_slope() {
        assert_relative_eq!(linterp(0.0, 1.0, 0.0, 2.0, 0.5), 1.0);
        assert_relative_eq!(linterp(0.0, 1.0, 0.0, 2.0, 3.0), 6.0);
        assert_relative_eq!(linterp(0.0, 1.0, 0.0, 2.0, -1.0), -2.0);
    }

    #[test]
    fn linterp_degenerate_segment() {
        assert_eq!(linterp(2.0, 2.0, 7.0, 9.0, 5.0), 7.0);
    }

    #[test]
    fn midpoint_rule_is_exact_for_linear_functions() {
        let area = integral(1.0, 3.0, |x| 2.0 * x + 1.0);
        assert_relative_eq!(area, 10.0, max_relative = 1e-12);
    }

    #[test]
    fn midpoint_rule_of_constant() {
        assert_relative_eq!(integral(0.0, 0.4, |_| 5.0), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn stefan_boltzmann_matches_codata() {
        assert_relative_eq!(
            SIGMA,
            physical_constants::STEFAN_BOLTZMANN_CONSTANT,
            max_relative = 1e-3
        );
    }
}
