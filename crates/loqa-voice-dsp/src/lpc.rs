//! Linear prediction: pre-emphasis, Levinson-Durbin recursion and pole finding.
//!
//! The predictor convention is `x̂[n] = Σ_{k=1..p} a_k · x[n−k]`, so the
//! inverse filter is `A(z) = 1 − Σ a_k z^{−k}` and the all-pole model's poles
//! are the roots of `z^p − a_1 z^{p−1} − … − a_p`.
//!
//! Both numerically sensitive steps terminate explicitly instead of producing
//! NaN: the recursion stops at the last stable order, and the root finder has
//! an iteration cap and drops non-finite roots.

use rustfft::num_complex::Complex;

use crate::error::{AnalysisError, AnalysisResult};

/// Iteration cap for the Durand-Kerner root finder.
const MAX_ROOT_ITERATIONS: usize = 500;
/// Largest root correction accepted as converged.
const ROOT_TOLERANCE: f64 = 1e-12;
/// Prediction error (relative to `r[0]`) at which the recursion stops.
const MIN_RELATIVE_ERROR: f64 = 1e-10;

/// All-pole model of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LpcModel {
    /// Predictor coefficients `a_1..a_p` for the effective order.
    pub coefficients: Vec<f64>,
    /// Order the recursion was asked to reach.
    pub requested_order: usize,
    /// Order actually reached before the recursion became ill-conditioned.
    pub effective_order: usize,
    /// Residual prediction error energy at the effective order.
    pub prediction_error: f64,
}

impl LpcModel {
    /// True when the recursion stopped before the requested order.
    pub fn is_truncated(&self) -> bool {
        self.effective_order < self.requested_order
    }

    /// Monic polynomial `[1, −a_1, …, −a_p]` in descending powers of `z`.
    pub fn polynomial(&self) -> Vec<f64> {
        std::iter::once(1.0)
            .chain(self.coefficients.iter().map(|&a| -a))
            .collect()
    }

    /// Poles of the all-pole filter (roots of [`LpcModel::polynomial`]).
    pub fn poles(&self) -> Vec<Complex<f64>> {
        polynomial_roots(&self.polynomial())
    }
}

/// First-order pre-emphasis `y[n] = x[n] − α·x[n−1]`.
pub fn pre_emphasis(samples: &[f32], coefficient: f32) -> Vec<f32> {
    if samples.is_empty() || coefficient == 0.0 {
        return samples.to_vec();
    }
    let mut out = Vec::with_capacity(samples.len());
    out.push(samples[0]);
    out.extend(samples.windows(2).map(|w| w[1] - coefficient * w[0]));
    out
}

/// Pre-emphasis coefficient for a corner frequency: `α = exp(−2π·f/sr)`.
pub fn pre_emphasis_coefficient(from_hz: f32, sample_rate: f32) -> f32 {
    if from_hz <= 0.0 {
        return 0.0;
    }
    (-2.0 * std::f32::consts::PI * from_hz / sample_rate).exp()
}

/// Levinson-Durbin recursion over autocorrelation coefficients `r[0..=order]`.
///
/// Stops early, keeping the last stable order, when a reflection coefficient
/// reaches magnitude 1 or becomes non-finite, or when the prediction error
/// drops below `1e-10 · r[0]`.
///
/// # Errors
///
/// - [`AnalysisError::NumericDegenerate`] when `r[0]` is not positive (silence)
/// - [`AnalysisError::UnstableModel`] when not even a first-order model exists
pub fn levinson_durbin(r: &[f64], order: usize) -> AnalysisResult<LpcModel> {
    let order = order.min(r.len().saturating_sub(1));
    let r0 = r.first().copied().unwrap_or(0.0);
    if !(r0.is_finite() && r0 > 0.0) {
        return Err(AnalysisError::NumericDegenerate);
    }
    let min_error = MIN_RELATIVE_ERROR * r0;

    let mut a = vec![0.0f64; order + 1];
    let mut previous = vec![0.0f64; order + 1];
    let mut error = r0;
    let mut effective_order = 0;

    for i in 1..=order {
        let acc = r[i] - (1..i).map(|j| a[j] * r[i - j]).sum::<f64>();
        let k = acc / error;
        if !k.is_finite() || k.abs() >= 1.0 {
            break;
        }

        previous.copy_from_slice(&a);
        a[i] = k;
        for j in 1..i {
            a[j] = previous[j] - k * previous[i - j];
        }
        error *= 1.0 - k * k;
        effective_order = i;

        if error <= min_error {
            break;
        }
    }

    if effective_order == 0 {
        return Err(AnalysisError::UnstableModel(
            "no stable reflection coefficient".to_string(),
        ));
    }

    Ok(LpcModel {
        coefficients: a[1..=effective_order].to_vec(),
        requested_order: order,
        effective_order,
        prediction_error: error,
    })
}

/// Roots of a polynomial given in descending powers, via Durand-Kerner.
///
/// The polynomial is normalized by its leading coefficient. Roots that fail to
/// converge to finite values are dropped, so fewer than `degree` roots may be
/// returned.
pub fn polynomial_roots(coefficients: &[f64]) -> Vec<Complex<f64>> {
    let Some(first) = coefficients.iter().position(|&c| c != 0.0) else {
        return Vec::new();
    };
    let lead = coefficients[first];
    let monic: Vec<f64> = coefficients[first..].iter().map(|&c| c / lead).collect();
    let degree = monic.len() - 1;
    if degree == 0 {
        return Vec::new();
    }

    let eval = |z: Complex<f64>| {
        monic
            .iter()
            .fold(Complex::new(0.0, 0.0), |acc, &c| acc * z + c)
    };

    // Classic starting points: powers of a complex number that is neither
    // real nor a root of unity.
    let seed = Complex::new(0.4, 0.9);
    let mut roots: Vec<Complex<f64>> = (0..degree).map(|k| seed.powu(k as u32)).collect();

    for _ in 0..MAX_ROOT_ITERATIONS {
        let mut max_correction = 0.0f64;
        for i in 0..degree {
            let zi = roots[i];
            let denom = roots
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(Complex::new(1.0, 0.0), |acc, (_, &zj)| acc * (zi - zj));
            if denom.norm() < f64::MIN_POSITIVE {
                // Coincident estimates: nudge apart and retry next sweep.
                roots[i] = zi + Complex::new(1e-6, 1e-6);
                max_correction = f64::INFINITY;
                continue;
            }
            let correction = eval(zi) / denom;
            roots[i] = zi - correction;
            max_correction = max_correction.max(correction.norm());
        }
        if max_correction < ROOT_TOLERANCE {
            break;
        }
    }

    roots
        .into_iter()
        .filter(|z| z.re.is_finite() && z.im.is_finite())
        .collect()
}
