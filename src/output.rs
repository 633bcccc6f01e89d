use std::collections::VecDeque;

use crate::numerics::{linterp, EPS};

/// Future instants at which a snapshot is due, in increasing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputSchedule {
    times: VecDeque<f64>,
}

impl OutputSchedule {
    /// Every multiple of `output_timestep` up to `solve_time`, merged with
    /// `extra` instants. Instants closer than `EPS` count once.
    pub fn new(solve_time: f64, output_timestep: f64, extra: &[f64]) -> Self {
        let mut times = Vec::new();
        if output_timestep > 0.0 {
            let count = ((solve_time + EPS) / output_timestep).floor() as usize;
            times.extend((1..=count).map(|k| k as f64 * output_timestep));
        }
        for &t in extra {
            if t > 0.0 && t <= solve_time + EPS {
                times.push(t);
            } else {
                log::warn!(
                    "output time {} lies outside (0, {}], it will not be written",
                    t,
                    solve_time
                );
            }
        }
        times.sort_by(f64::total_cmp);
        times.dedup_by(|b, a| (*b - *a).abs() < EPS);
        Self {
            times: times.into(),
        }
    }

    #[inline]
    pub fn next(&self) -> Option<f64> {
        self.times.front().copied()
    }

    /// Removes and returns every instant up to `time`.
    pub fn take_due(&mut self, time: f64) -> Vec<f64> {
        let mut due = Vec::new();
        while let Some(t) = self.next() {
            if t > time + EPS {
                break;
            }
            due.push(t);
            self.times.pop_front();
        }
        due
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.times.iter()
    }
}

/// Temperature field captured at a scheduled instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSnapshot {
    pub time: f64,
    pub positions: ndarray::Array1<f64>,
    pub temperatures: ndarray::Array1<f64>,
    /// Temperatures of the nodes between two layers, from the inner face out.
    pub interface_temperatures: Vec<f64>,
}

impl ResultSnapshot {
    /// Interpolates node by node between the fields at `t0` and `t1`.
    pub(crate) fn between(
        time: f64,
        (t0, before): (f64, &ndarray::Array1<f64>),
        (t1, after): (f64, &ndarray::Array1<f64>),
        positions: &ndarray::Array1<f64>,
        interfaces: &[usize],
    ) -> Self {
        let s = if t1 > t0 {
            ((time - t0) / (t1 - t0)).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let temperatures: ndarray::Array1<f64> = before
            .iter()
            .zip(after.iter())
            .map(|(&a, &b)| linterp(0.0, 1.0, a, b, s))
            .collect();
        let interface_temperatures = interfaces.iter().map(|&i| temperatures[i]).collect();
        Self {
            time,
            positions: positions.clone(),
            temperatures,
            interface_temperatures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn periodic_and_extra_times() {
        let schedule = OutputSchedule::new(10.0, 2.0, &[5.5]);
        let times: Vec<f64> = schedule.iter().copied().collect();
        assert_eq!(times, vec![2.0, 4.0, 5.5, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn near_duplicates_collapse() {
        let schedule = OutputSchedule::new(10.0, 2.0, &[4.000001, 6.0, 12.0, -1.0]);
        let times: Vec<f64> = schedule.iter().copied().collect();
        assert_eq!(times.len(), 5);
        assert!(times.windows(2).all(|w| w[1] - w[0] >= EPS));
    }

    #[test]
    fn take_due_is_monotone() {
        let mut schedule = OutputSchedule::new(1.0, 0.25, &[]);
        assert!(schedule.take_due(0.2).is_empty());
        assert_eq!(schedule.take_due(0.6), vec![0.25, 0.5]);
        assert_eq!(schedule.next(), Some(0.75));
        assert_eq!(schedule.take_due(1.0), vec![0.75, 1.0]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn snapshot_interpolates_in_time() {
        let before = ndarray::arr1(&[300.0, 300.0, 300.0]);
        let after = ndarray::arr1(&[500.0, 400.0, 300.0]);
        let x = ndarray::arr1(&[0.0, 0.1, 0.2]);
        let snap = ResultSnapshot::between(1.25, (1.0, &before), (2.0, &after), &x, &[1]);
        assert_relative_eq!(snap.temperatures[0], 350.0);
        assert_relative_eq!(snap.temperatures[1], 325.0);
        assert_eq!(snap.interface_temperatures, vec![snap.temperatures[1]]);
        assert_eq!(snap.time, 1.25);
    }
}
