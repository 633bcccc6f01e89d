//! Piecewise-linear property tables.
//!
//! Lookups never clamp: outside the tabulated range the two outermost
//! entries are extended along their slope.

use serde::Deserialize;

use crate::numerics::linterp;
use crate::Error;

/// Values that can be linearly interpolated between two table entries.
pub trait Lerp: Clone {
    fn lerp(x1: f64, x2: f64, y1: &Self, y2: &Self, x: f64) -> Self;
}

impl Lerp for f64 {
    #[inline]
    fn lerp(x1: f64, x2: f64, y1: &Self, y2: &Self, x: f64) -> Self {
        linterp(x1, x2, *y1, *y2, x)
    }
}

/// Indices of the two entries used to evaluate `x`.
///
/// The upper entry is the smallest key `>= x` and the lower one the key just
/// before it. Queries past either end use the two outermost keys, and a
/// single-entry table returns that entry twice.
pub fn bracket(keys: &[f64], x: f64) -> (usize, usize) {
    let len = keys.len();
    if len < 2 {
        return (0, 0);
    }
    let upper = keys.partition_point(|&k| k < x);
    if upper == len {
        (len - 2, len - 1)
    } else if upper == 0 {
        (0, 1)
    } else {
        (upper - 1, upper)
    }
}

fn check_keys(keys: &[f64]) -> Result<(), Error> {
    if keys.is_empty() {
        return Err(Error::malformed("table", "a table needs at least one entry"));
    }
    if let Some(k) = keys.iter().find(|k| !k.is_finite()) {
        return Err(Error::malformed("table", format!("non-finite key {}", k)));
    }
    if let Some(w) = keys.windows(2).find(|w| w[0] >= w[1]) {
        return Err(Error::malformed(
            "table",
            format!("keys must be unique, found {} twice", w[1]),
        ));
    }
    Ok(())
}

/// Ordered mapping from a real key to an interpolable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Table1D<V = f64> {
    keys: Vec<f64>,
    values: Vec<V>,
}

impl<V: Lerp> Table1D<V> {
    /// Builds a table from `(key, value)` pairs given in any order.
    pub fn new(mut points: Vec<(f64, V)>) -> Result<Self, Error> {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (keys, values): (Vec<f64>, Vec<V>) = points.into_iter().unzip();
        check_keys(&keys)?;
        Ok(Self { keys, values })
    }

    /// Builds a table from a row of keys and a row of values.
    pub fn from_columns(keys: Vec<f64>, values: Vec<V>) -> Result<Self, Error> {
        if keys.len() != values.len() {
            return Err(Error::malformed(
                "table",
                format!("{} keys but {} values", keys.len(), values.len()),
            ));
        }
        Self::new(keys.into_iter().zip(values).collect())
    }

    /// A single-entry table, returning `value` everywhere.
    pub fn constant(value: V) -> Self {
        Self {
            keys: vec![0.0],
            values: vec![value],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; tables hold at least one entry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn interpolate(&self, x: f64) -> V {
        let (lo, hi) = bracket(&self.keys, x);
        if self.keys[hi] == x {
            return self.values[hi].clone();
        }
        V::lerp(
            self.keys[lo],
            self.keys[hi],
            &self.values[lo],
            &self.values[hi],
            x,
        )
    }
}

/// Two-level table: a [`Table1D`] over the second key for every first key.
///
/// Lookups interpolate along the second key in both bracketing rows and then
/// along the first key between those results.
#[derive(Debug, Clone, PartialEq)]
pub struct Table2D<V> {
    keys: Vec<f64>,
    rows: Vec<Table1D<V>>,
}

impl<V: Lerp> Table2D<V> {
    pub fn new(mut rows: Vec<(f64, Table1D<V>)>) -> Result<Self, Error> {
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (keys, rows): (Vec<f64>, Vec<Table1D<V>>) = rows.into_iter().unzip();
        check_keys(&keys)?;
        Ok(Self { keys, rows })
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    pub fn rows(&self) -> &[Table1D<V>] {
        &self.rows
    }

    pub fn interpolate(&self, x1: f64, x2: f64) -> V {
        let (lo, hi) = bracket(&self.keys, x1);
        let y_lo = self.rows[lo].interpolate(x2);
        let y_hi = self.rows[hi].interpolate(x2);
        V::lerp(self.keys[lo], self.keys[hi], &y_lo, &y_hi, x1)
    }
}

/// Curve given as a row of keys and a row of values, e.g. `[[0, 1], [300, 350]]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Curve(pub Vec<f64>, pub Vec<f64>);

impl Curve {
    /// Validates the curve into a table, naming `field` in any error.
    pub fn to_table(&self, field: &str) -> Result<Table1D, Error> {
        Table1D::from_columns(self.0.clone(), self.1.clone()).map_err(|err| match err {
            Error::MalformedInput { reason, .. } => Error::malformed(field, reason),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn table() -> Table1D {
        Table1D::from_columns(vec![300.0, 400.0, 600.0], vec![1.0, 2.0, 6.0]).unwrap()
    }

    #[test]
    fn exact_keys_return_their_values() {
        let t = table();
        assert_eq!(t.interpolate(300.0), 1.0);
        assert_eq!(t.interpolate(400.0), 2.0);
        assert_eq!(t.interpolate(600.0), 6.0);
    }

    #[test]
    fn midpoint_is_arithmetic_mean() {
        let t = table();
        assert_relative_eq!(t.interpolate(350.0), 1.5);
        assert_relative_eq!(t.interpolate(500.0), 4.0);
    }

    #[test]
    fn extrapolates_along_outer_slopes() {
        let t = table();
        // slope of the last segment is 0.02 per K
        assert_relative_eq!(t.interpolate(700.0), 8.0);
        // slope of the first segment is 0.01 per K
        assert_abs_diff_eq!(t.interpolate(200.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn single_entry_is_constant() {
        let t = Table1D::from_columns(vec![500.0], vec![42.0]).unwrap();
        for x in [-1e3, 0.0, 500.0, 1e6] {
            assert_eq!(t.interpolate(x), 42.0);
        }
        assert_eq!(Table1D::constant(3.0).interpolate(17.0), 3.0);
    }

    #[test]
    fn unsorted_input_is_ordered() {
        let t = Table1D::new(vec![(2.0, 20.0), (1.0, 10.0)]).unwrap();
        assert_eq!(t.keys(), &[1.0, 2.0]);
        assert_relative_eq!(t.interpolate(1.5), 15.0);
    }

    #[test]
    fn rejects_empty_and_duplicate_keys() {
        assert!(matches!(
            Table1D::<f64>::new(vec![]),
            Err(Error::MalformedInput { .. })
        ));
        assert!(matches!(
            Table1D::from_columns(vec![1.0, 1.0], vec![0.0, 1.0]),
            Err(Error::MalformedInput { .. })
        ));
        assert!(matches!(
            Table1D::from_columns(vec![1.0, 2.0], vec![0.0]),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn bracket_rules() {
        let keys = [1.0, 2.0, 3.0];
        assert_eq!(bracket(&keys, 0.0), (0, 1));
        assert_eq!(bracket(&keys, 1.0), (0, 1));
        assert_eq!(bracket(&keys, 2.0), (0, 1));
        assert_eq!(bracket(&keys, 2.5), (1, 2));
        assert_eq!(bracket(&keys, 9.0), (1, 2));
        assert_eq!(bracket(&[4.0], 9.0), (0, 0));
    }

    #[test]
    fn two_dimensional_lookup() {
        let low = Table1D::from_columns(vec![1000.0, 2000.0], vec![1.0, 3.0]).unwrap();
        let high = Table1D::from_columns(vec![1000.0, 2000.0], vec![5.0, 7.0]).unwrap();
        let t = Table2D::new(vec![(2e6, high), (1e6, low)]).unwrap();
        assert_relative_eq!(t.interpolate(1e6, 1500.0), 2.0);
        assert_relative_eq!(t.interpolate(1.5e6, 1500.0), 4.0);
        // beyond the last pressure row
        assert_relative_eq!(t.interpolate(3e6, 1000.0), 9.0);
    }

    #[test]
    fn curve_errors_name_the_field() {
        let err = Curve(vec![1.0, 2.0], vec![1.0]).to_table("alpha").unwrap_err();
        match err {
            Error::MalformedInput { field, .. } => assert_eq!(field, "alpha"),
            other => panic!("unexpected error {other}"),
        }
    }
}
