//! Autocorrelation shared by the pitch, harmonicity and LPC analyzers.
//!
//! Every lag is evaluated through one kernel, [`lag_terms`], which accumulates
//! the cross term and the energies of the leading and lagged segments in `f64`.
//! The normalized autocorrelation, the YIN difference function and the LPC
//! autocorrelation coefficients are all derived from it, so the analyzers see
//! identical numerics for the same lag.
//!
//! # Mathematical Definition
//!
//! For a frame x of length N, lag τ and integration window W (W + τ ≤ N):
//!
//! ```text
//! cross(τ)      = Σ_{i<W} x[i] · x[i+τ]
//! E_lead(τ)     = Σ_{i<W} x[i]²
//! E_lag(τ)      = Σ_{i<W} x[i+τ]²
//! r(τ)          = cross / sqrt(E_lead · E_lag)
//! d(τ)          = Σ_{i<W} (x[i] - x[i+τ])² = E_lead + E_lag - 2 · cross
//! ```
//!
//! The normalized autocorrelation uses the full overlap W = N − τ.

/// Per-lag sums over an integration window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LagTerms {
    /// Σ x[i] · x[i+τ]
    pub cross: f64,
    /// Σ x[i]²
    pub energy_lead: f64,
    /// Σ x[i+τ]²
    pub energy_lag: f64,
}

impl LagTerms {
    /// Normalized correlation in [-1, 1]; 0 when either segment is silent.
    pub fn normalized(&self) -> f32 {
        let denom = (self.energy_lead * self.energy_lag).sqrt();
        if denom < 1e-20 {
            return 0.0;
        }
        (self.cross / denom).clamp(-1.0, 1.0) as f32
    }

    /// Squared difference Σ (x[i] - x[i+τ])², never negative.
    pub fn difference(&self) -> f64 {
        (self.energy_lead + self.energy_lag - 2.0 * self.cross).max(0.0)
    }
}

/// Accumulate the sums for lag `lag` over `window` samples.
///
/// The window is shortened so that `window + lag` never exceeds the frame;
/// a lag at or beyond the frame length yields all-zero terms.
pub fn lag_terms(samples: &[f32], lag: usize, window: usize) -> LagTerms {
    if lag >= samples.len() {
        return LagTerms::default();
    }
    let window = window.min(samples.len() - lag);
    let lead = &samples[..window];
    let lagged = &samples[lag..lag + window];

    lead.iter()
        .zip(lagged)
        .fold(LagTerms::default(), |acc, (&a, &b)| {
            let (a, b) = (f64::from(a), f64::from(b));
            LagTerms {
                cross: acc.cross + a * b,
                energy_lead: acc.energy_lead + a * a,
                energy_lag: acc.energy_lag + b * b,
            }
        })
}

/// Normalized autocorrelation for lags `0..=max_lag` over the full overlap.
///
/// `max_lag` is clamped to `len - 1`; an empty frame yields an empty vector.
///
/// ```text
/// r(τ) = Σ x[i]x[i+τ] / sqrt(Σ x[i]² · Σ x[i+τ]²),   i ∈ [0, N−τ)
/// ```
pub fn normalized_autocorrelation(samples: &[f32], max_lag: usize) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let max_lag = max_lag.min(samples.len() - 1);
    (0..=max_lag)
        .map(|lag| lag_terms(samples, lag, samples.len() - lag).normalized())
        .collect()
}

/// Raw (biased) autocorrelation coefficients `r[0..=order]` for LPC analysis.
pub fn autocorrelation_coefficients(samples: &[f32], order: usize) -> Vec<f64> {
    (0..=order)
        .map(|lag| lag_terms(samples, lag, samples.len()).cross)
        .collect()
}

/// Highest interior local maximum of `correlation` with lag in
/// `[min_lag, max_lag]`.
///
/// A lag qualifies when its value is strictly above the previous lag and not
/// below the next one, so both neighbours must exist. Lag 0 is never
/// returned. Peaks within `1e-6` of each other resolve to the shorter lag,
/// so a clean tone never reports a multiple of its period.
/// Returns `(lag, value)`.
pub fn highest_local_peak(correlation: &[f32], min_lag: usize, max_lag: usize) -> Option<(usize, f32)> {
    const TIE: f32 = 1e-6;

    if correlation.len() < 3 {
        return None;
    }
    let lo = min_lag.max(1);
    let hi = max_lag.min(correlation.len() - 2);
    if lo > hi {
        return None;
    }

    (lo..=hi)
        .filter(|&lag| {
            let value = correlation[lag];
            value > correlation[lag - 1] && value >= correlation[lag + 1]
        })
        .map(|lag| (lag, correlation[lag]))
        .fold(None, |best: Option<(usize, f32)>, candidate| match best {
            Some(b) if b.1 >= candidate.1 - TIE => Some(b),
            _ => Some(candidate),
        })
}
