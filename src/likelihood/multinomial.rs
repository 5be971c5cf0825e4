//! Multinomial negative log-likelihood.

use crate::numeric::{is_zero, VERY_SMALL};
use statrs::function::gamma::ln_gamma;

/// Default minimum probability parameter
pub const DEFAULT_EPSILON: f64 = 10.0;

/// Accumulates multinomial negative log-likelihood over several distributions.
///
/// Model proportions that are numerically zero are replaced by
/// `1 / (epsilon * N)`, where `N` is the number of observations in the
/// distribution, so an unmatched observation costs a finite amount.
#[derive(Clone, Debug)]
pub struct Multinomial {
    epsilon: f64,
    loglikelihood: f64,
}

impl Multinomial {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            loglikelihood: 0.0,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn reset(&mut self) {
        self.loglikelihood = 0.0;
    }

    /// Sum of every distribution scored since the last reset
    pub fn log_likelihood(&self) -> f64 {
        self.loglikelihood
    }

    /// Score one observed distribution against a model distribution.
    ///
    /// `data` are observed counts, `dist` are model values in any scale.
    /// Returns 0 when nothing was observed.
    pub fn calc_log_likelihood<'d>(
        &mut self,
        data: impl IntoIterator<Item = &'d f64>,
        dist: impl IntoIterator<Item = &'d f64>,
    ) -> f64 {
        let data: Vec<f64> = data.into_iter().copied().collect();
        let dist: Vec<f64> = dist.into_iter().copied().collect();

        let total_data: f64 = data.iter().sum();
        if is_zero(total_data) {
            return 0.0;
        }
        let total_dist: f64 = dist.iter().sum();
        let min_prob = 1.0 / (self.epsilon * total_data);

        let mut lik = -ln_gamma(total_data + 1.0);
        for (i, &n) in data.iter().enumerate() {
            let model = dist.get(i).copied().unwrap_or(0.0);
            let mut p = if total_dist > VERY_SMALL {
                model / total_dist
            } else {
                0.0
            };
            if p < VERY_SMALL {
                p = min_prob;
            }
            lik += ln_gamma(n + 1.0) - n * p.ln();
        }

        self.loglikelihood += lik;
        lik
    }
}

impl Default for Multinomial {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}
