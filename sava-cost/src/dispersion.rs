/// Aggregates a sequence of per-broker load scores into one imbalance number.
///
/// Implementations must be deterministic and side-effect-free. The metric is
/// a strategy: balancing logic picks the aggregation it wants behind this one
/// method, [`from_fn`] lifts a plain closure into it.
pub trait Dispersion {
    /// Aggregate the scores into a single non-negative number.
    fn calculate(&self, scores: &[f64]) -> f64;
}

/// Lift a closure into a [`Dispersion`] strategy.
pub fn from_fn<F>(f: F) -> impl Dispersion
where
    F: Fn(&[f64]) -> f64,
{
    FnDispersion(f)
}

struct FnDispersion<F>(F);

impl<F> Dispersion for FnDispersion<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn calculate(&self, scores: &[f64]) -> f64 {
        (self.0)(scores)
    }
}

/// Coefficient of variation: population standard deviation divided by the
/// arithmetic mean.
///
/// A mean of exactly zero yields 0 — a cluster with no load has no
/// dispersion. An empty collection is treated the same way and yields 0,
/// never NaN and never an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationCoefficient;

impl Dispersion for CorrelationCoefficient {
    fn calculate(&self, scores: &[f64]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        if mean == 0.0 {
            return 0.0;
        }
        let variance = scores
            .iter()
            .map(|score| (score - mean).powi(2))
            .sum::<f64>()
            / scores.len() as f64;
        variance.sqrt() / mean
    }
}
