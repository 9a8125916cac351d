//! Trade-off analysis over a Pareto frontier.
//!
//! Ranks frontier points by their normalized deviations from the ideal
//! point (the per-objective best across the frontier): `balanced` takes
//! the Euclidean distance, `preference_weighted` the weighted linear
//! sum. Normalizing by each objective's observed range makes the ranking
//! invariant to objective scale, so a cost in the hundreds does not
//! drown out a makespan in the tens. Objectives with a degenerate range
//! carry no information and are skipped.
//!
//! # Reference
//! Ehrgott (2005), "Multicriteria Optimization", Ch. 2 (compromise
//! solutions)

use tracing::debug;

use crate::cp::ObjectiveDirection;
use crate::models::{ObjectiveKind, ParetoFrontier, ParetoSolution};

const RANGE_EPS: f64 = 1e-9;

/// Selects representative solutions from a Pareto frontier.
pub struct TradeOffAnalyzer<'a> {
    frontier: &'a ParetoFrontier,
}

impl<'a> TradeOffAnalyzer<'a> {
    /// Creates an analyzer over a frontier.
    pub fn new(frontier: &'a ParetoFrontier) -> Self {
        Self { frontier }
    }

    /// Per-objective best value across the frontier, in frontier kind
    /// order. Empty when the frontier is empty.
    pub fn ideal_point(&self) -> Vec<f64> {
        self.fold_point(|kind, acc, v| match kind.direction() {
            ObjectiveDirection::Minimize => acc.min(v),
            ObjectiveDirection::Maximize => acc.max(v),
        })
    }

    /// Per-objective worst value across the frontier.
    pub fn nadir_point(&self) -> Vec<f64> {
        self.fold_point(|kind, acc, v| match kind.direction() {
            ObjectiveDirection::Minimize => acc.max(v),
            ObjectiveDirection::Maximize => acc.min(v),
        })
    }

    /// The frontier point closest to the ideal point under normalized
    /// Euclidean distance.
    pub fn balanced(&self) -> Option<&'a ParetoSolution> {
        self.select(|deviations| {
            deviations.iter().map(|&(_, d)| d * d).sum::<f64>().sqrt()
        })
    }

    /// The frontier point maximizing the weighted sum of per-objective
    /// closeness to the ideal, equivalently minimizing the weighted sum
    /// of normalized deviations. Unlisted objectives weigh 1.
    pub fn preference_weighted(
        &self,
        weights: &[(ObjectiveKind, f64)],
    ) -> Option<&'a ParetoSolution> {
        let weight_of = |kind: ObjectiveKind| {
            weights
                .iter()
                .find(|(k, _)| *k == kind)
                .map(|&(_, w)| w.max(0.0))
                .unwrap_or(1.0)
        };
        self.select(|deviations| {
            deviations.iter().map(|&(kind, d)| weight_of(kind) * d).sum()
        })
    }

    fn select(
        &self,
        score: impl Fn(&[(ObjectiveKind, f64)]) -> f64,
    ) -> Option<&'a ParetoSolution> {
        let ideal = self.ideal_point();
        let nadir = self.nadir_point();
        if ideal.is_empty() {
            return None;
        }

        let mut best: Option<(&ParetoSolution, f64)> = None;
        for candidate in &self.frontier.solutions {
            let values = candidate.value_vector(&self.frontier.kinds);
            let mut deviations = Vec::with_capacity(self.frontier.kinds.len());
            for (i, &kind) in self.frontier.kinds.iter().enumerate() {
                let range = (nadir[i] - ideal[i]).abs();
                if range <= RANGE_EPS {
                    continue;
                }
                deviations.push((kind, (values[i] - ideal[i]).abs() / range));
            }
            let distance = score(&deviations);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((candidate, distance));
            }
        }

        if let Some((_, d)) = best {
            debug!(distance = d, frontier = self.frontier.len(), "representative point selected");
        }
        best.map(|(s, _)| s)
    }

    fn fold_point(&self, fold: impl Fn(ObjectiveKind, f64, f64) -> f64) -> Vec<f64> {
        if self.frontier.is_empty() {
            return Vec::new();
        }
        let mut point: Option<Vec<f64>> = None;
        for solution in &self.frontier.solutions {
            let values = solution.value_vector(&self.frontier.kinds);
            point = Some(match point {
                None => values,
                Some(acc) => acc
                    .into_iter()
                    .zip(values)
                    .zip(&self.frontier.kinds)
                    .map(|((a, v), &kind)| fold(kind, a, v))
                    .collect(),
            });
        }
        point.unwrap_or_default()
    }
}
