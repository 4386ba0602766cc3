//! C ABI for loqa-voice-dsp.
//!
//! Every entry point takes a caller-owned `const float*` buffer and an `int32_t`
//! length and returns a `#[repr(C)]` result by value. A NULL buffer, a
//! non-positive length or an unusable sample rate never reaches the analyzers:
//! it is logged at `warn` and answered with the analyzer's sentinel result.
//!
//! The only heap object handed to C is the magnitude buffer inside
//! [`LoqaSpectrum`]. It must be returned through [`loqa_release_spectrum`],
//! which frees it and clears the handle so a second release is a no-op.
//!
//! The declarations live in `include/loqa_voice_dsp.h`.

#![allow(unsafe_code)]

use std::ptr;
use std::slice;

use loqa_voice_dsp::{
    AudioFrame, FormantsResult, H1H2Result, HnrResult, PitchResult, SpectrumResult, WindowType,
};

/// Owned magnitude spectrum handed across the C boundary.
///
/// `data` points at `len` magnitudes (DC to Nyquist) computed with a transform
/// of `fft_size` points. An empty handle has `data == NULL` and `len == 0`.
#[repr(C)]
#[derive(Debug)]
pub struct LoqaSpectrum {
    /// Magnitudes, owned by the library until released.
    pub data: *mut f32,
    /// Number of magnitudes (`fft_size / 2 + 1`, or 0).
    pub len: i32,
    /// Transform length actually used after clamping.
    pub fft_size: i32,
}

impl LoqaSpectrum {
    /// Handle that owns nothing.
    pub const EMPTY: Self = Self {
        data: ptr::null_mut(),
        len: 0,
        fft_size: 0,
    };

    fn from_magnitudes(magnitudes: Box<[f32]>, fft_size: usize) -> Self {
        if magnitudes.is_empty() {
            return Self::EMPTY;
        }
        let len = magnitudes.len() as i32;
        let data = Box::into_raw(magnitudes).cast::<f32>();
        Self {
            data,
            len,
            fft_size: fft_size as i32,
        }
    }
}

/// Borrow `length` samples from a caller buffer, rejecting NULL and
/// non-positive lengths.
///
/// # Safety
///
/// A non-NULL `buffer` must point to at least `length` readable floats that
/// stay valid and unmodified for `'a`.
unsafe fn borrow_samples<'a>(buffer: *const f32, length: i32, caller: &str) -> Option<&'a [f32]> {
    if buffer.is_null() {
        tracing::warn!(caller, "null sample buffer");
        return None;
    }
    if length <= 0 {
        tracing::warn!(caller, length, "sample count must be positive");
        return None;
    }
    // SAFETY: non-null and positive length checked above; extent guaranteed by caller.
    Some(unsafe { slice::from_raw_parts(buffer, length as usize) })
}

/// Borrow a buffer and pair it with a sample rate.
///
/// # Safety
///
/// Same contract as [`borrow_samples`].
unsafe fn borrow_frame<'a>(
    buffer: *const f32,
    length: i32,
    sample_rate: i32,
    caller: &str,
) -> Option<AudioFrame<'a>> {
    // SAFETY: forwarded caller contract.
    let samples = unsafe { borrow_samples(buffer, length, caller) }?;
    match AudioFrame::new(samples, sample_rate as f32) {
        Ok(frame) => Some(frame),
        Err(err) => {
            tracing::warn!(caller, sample_rate, error = %err, "rejected frame");
            None
        }
    }
}

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `warn`). Calling it again, or after the host installed its own
/// subscriber, has no effect.
#[unsafe(no_mangle)]
pub extern "C" fn loqa_init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Magnitude spectrum of a buffer.
///
/// `fft_size` is clamped to a power of two in [256, 8192]; the size used is
/// reported in the handle. `window_type` is 0 rectangular, 1 Hann, 2 Hamming,
/// 3 Blackman, 4 Blackman-Harris; other codes use Hann.
///
/// # Safety
///
/// `buffer` must be NULL or point to `length` readable floats. The returned
/// handle must be released with [`loqa_release_spectrum`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_compute_spectrum(
    buffer: *const f32,
    length: i32,
    fft_size: i32,
    window_type: i32,
) -> LoqaSpectrum {
    // SAFETY: caller contract.
    let Some(samples) = (unsafe { borrow_samples(buffer, length, "loqa_compute_spectrum") }) else {
        return LoqaSpectrum::EMPTY;
    };
    let window = WindowType::from_code(window_type).unwrap_or_else(|| {
        tracing::warn!(window_type, "unknown window code, using hann");
        WindowType::Hann
    });
    let requested = usize::try_from(fft_size).unwrap_or(0);

    let spectrum = loqa_voice_dsp::compute_spectrum(samples, requested, window);
    let size = spectrum.fft_size();
    LoqaSpectrum::from_magnitudes(spectrum.into_boxed_slice(), size)
}

/// Free a spectrum returned by [`loqa_compute_spectrum`] and clear the handle.
///
/// A NULL pointer or an already released handle is ignored.
///
/// # Safety
///
/// `spectrum` must be NULL or point to a handle produced by
/// [`loqa_compute_spectrum`] whose fields the caller has not altered.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_release_spectrum(spectrum: *mut LoqaSpectrum) {
    // SAFETY: caller guarantees the pointer is NULL or a valid handle.
    let Some(handle) = (unsafe { spectrum.as_mut() }) else {
        return;
    };
    if handle.data.is_null() || handle.len <= 0 {
        *handle = LoqaSpectrum::EMPTY;
        return;
    }
    let len = handle.len as usize;
    // SAFETY: data/len came from Box::into_raw of a boxed slice of this length.
    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(handle.data, len)) });
    *handle = LoqaSpectrum::EMPTY;
}

/// YIN pitch estimate. Sample rates outside [8000, 48000] Hz are unvoiced.
///
/// # Safety
///
/// `buffer` must be NULL or point to `length` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_detect_pitch(
    buffer: *const f32,
    length: i32,
    sample_rate: i32,
) -> PitchResult {
    // SAFETY: caller contract.
    match unsafe { borrow_frame(buffer, length, sample_rate, "loqa_detect_pitch") } {
        Some(frame) => loqa_voice_dsp::detect_pitch(&frame),
        None => PitchResult::UNVOICED,
    }
}

/// First three formants from LPC analysis. `lpc_order <= 0` picks the order
/// from the sample rate.
///
/// # Safety
///
/// `buffer` must be NULL or point to `length` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_extract_formants(
    buffer: *const f32,
    length: i32,
    sample_rate: i32,
    lpc_order: i32,
) -> FormantsResult {
    // SAFETY: caller contract.
    match unsafe { borrow_frame(buffer, length, sample_rate, "loqa_extract_formants") } {
        Some(frame) => {
            let order = usize::try_from(lpc_order).unwrap_or(0);
            loqa_voice_dsp::extract_formants(&frame, order)
        }
        None => FormantsResult::NONE,
    }
}

/// Spectral centroid, rolloff and tilt.
///
/// # Safety
///
/// `buffer` must be NULL or point to `length` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_analyze_spectrum(
    buffer: *const f32,
    length: i32,
    sample_rate: i32,
) -> SpectrumResult {
    // SAFETY: caller contract.
    match unsafe { borrow_frame(buffer, length, sample_rate, "loqa_analyze_spectrum") } {
        Some(frame) => loqa_voice_dsp::analyze_spectrum(&frame),
        None => SpectrumResult::default(),
    }
}

/// Harmonics-to-noise ratio with pitch searched in `[min_freq, max_freq]` Hz.
///
/// # Safety
///
/// `buffer` must be NULL or point to `length` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_calculate_hnr(
    buffer: *const f32,
    length: i32,
    sample_rate: i32,
    min_freq: f32,
    max_freq: f32,
) -> HnrResult {
    // SAFETY: caller contract.
    match unsafe { borrow_frame(buffer, length, sample_rate, "loqa_calculate_hnr") } {
        Some(frame) => loqa_voice_dsp::calculate_hnr(&frame, min_freq, max_freq),
        None => HnrResult::UNVOICED,
    }
}

/// Level difference between the first two harmonics of `f0`.
///
/// # Safety
///
/// `buffer` must be NULL or point to `length` readable floats.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn loqa_calculate_h1h2(
    buffer: *const f32,
    length: i32,
    sample_rate: i32,
    f0: f32,
) -> H1H2Result {
    // SAFETY: caller contract.
    match unsafe { borrow_frame(buffer, length, sample_rate, "loqa_calculate_h1h2") } {
        Some(frame) => loqa_voice_dsp::calculate_h1h2(&frame, f0),
        None => H1H2Result::NONE,
    }
}
