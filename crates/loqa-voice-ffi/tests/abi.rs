//! Tests for the C entry points, called the way a C host would call them.

#![allow(unsafe_code)]

use std::f32::consts::PI;
use std::ptr;

use loqa_voice_dsp::{FormantsResult, H1H2Result, HnrResult, PitchResult, SpectrumResult};
use loqa_voice_ffi::{
    LoqaSpectrum, loqa_analyze_spectrum, loqa_calculate_h1h2, loqa_calculate_hnr,
    loqa_compute_spectrum, loqa_detect_pitch, loqa_extract_formants, loqa_release_spectrum,
};

fn sine(freq_hz: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| 0.5 * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
        .collect()
}

fn len(samples: &[f32]) -> i32 {
    samples.len() as i32
}

// ---------------------------------------------------------------------------
// Spectrum handle
// ---------------------------------------------------------------------------

#[test]
fn spectrum_peak_at_tone() {
    let sample_rate = 44100.0;
    let signal = sine(1000.0, sample_rate, 2048);
    unsafe {
        let mut spectrum = loqa_compute_spectrum(signal.as_ptr(), len(&signal), 2048, 1);
        assert!(!spectrum.data.is_null());
        assert_eq!(spectrum.len, 1025);
        assert_eq!(spectrum.fft_size, 2048);

        let magnitudes = std::slice::from_raw_parts(spectrum.data, spectrum.len as usize);
        let peak = magnitudes
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(k, _)| k)
            .unwrap();
        let peak_hz = peak as f32 * sample_rate / 2048.0;
        let resolution = sample_rate / 2048.0;
        assert!((peak_hz - 1000.0).abs() <= resolution, "peak at {peak_hz} Hz");

        loqa_release_spectrum(&mut spectrum);
        assert!(spectrum.data.is_null());
        assert_eq!(spectrum.len, 0);
    }
}

#[test]
fn spectrum_rejects_bad_buffers() {
    let signal = sine(440.0, 16000.0, 512);
    unsafe {
        let spectrum = loqa_compute_spectrum(ptr::null(), 512, 512, 1);
        assert!(spectrum.data.is_null());
        assert_eq!(spectrum.len, 0);

        for length in [0, -1, i32::MIN] {
            let spectrum = loqa_compute_spectrum(signal.as_ptr(), length, 512, 1);
            assert!(spectrum.data.is_null(), "length {length}");
            assert_eq!(spectrum.len, 0);
        }
    }
}

#[test]
fn spectrum_clamps_size_and_window() {
    let signal = sine(440.0, 16000.0, 4096);
    unsafe {
        for (requested, expected) in [(100, 256), (1000, 1024), (-5, 256), (65536, 8192)] {
            let mut spectrum = loqa_compute_spectrum(signal.as_ptr(), len(&signal), requested, 1);
            assert_eq!(spectrum.fft_size, expected, "requested {requested}");
            assert_eq!(spectrum.len, expected / 2 + 1);
            loqa_release_spectrum(&mut spectrum);
        }

        let mut unknown_window = loqa_compute_spectrum(signal.as_ptr(), 1024, 1024, 42);
        let mut hann = loqa_compute_spectrum(signal.as_ptr(), 1024, 1024, 1);
        let a = std::slice::from_raw_parts(unknown_window.data, unknown_window.len as usize);
        let b = std::slice::from_raw_parts(hann.data, hann.len as usize);
        assert_eq!(a, b);
        loqa_release_spectrum(&mut unknown_window);
        loqa_release_spectrum(&mut hann);
    }
}

#[test]
fn release_is_idempotent() {
    let signal = sine(440.0, 16000.0, 1024);
    unsafe {
        let mut spectrum = loqa_compute_spectrum(signal.as_ptr(), len(&signal), 1024, 2);
        loqa_release_spectrum(&mut spectrum);
        loqa_release_spectrum(&mut spectrum);
        loqa_release_spectrum(ptr::null_mut());

        let mut empty = LoqaSpectrum::EMPTY;
        loqa_release_spectrum(&mut empty);
        assert!(empty.data.is_null());
    }
}

#[test]
fn many_allocation_cycles() {
    let signal = sine(300.0, 16000.0, 2048);
    unsafe {
        let mut first = loqa_compute_spectrum(signal.as_ptr(), len(&signal), 2048, 1);
        let reference = std::slice::from_raw_parts(first.data, first.len as usize).to_vec();
        loqa_release_spectrum(&mut first);

        for i in 0..500 {
            let fft_size = 256 << (i % 6);
            let mut spectrum = loqa_compute_spectrum(signal.as_ptr(), len(&signal), fft_size, i % 5);
            assert_eq!(spectrum.len, fft_size / 2 + 1);
            loqa_release_spectrum(&mut spectrum);
        }

        let mut last = loqa_compute_spectrum(signal.as_ptr(), len(&signal), 2048, 1);
        let again = std::slice::from_raw_parts(last.data, last.len as usize);
        assert_eq!(again, reference.as_slice());
        loqa_release_spectrum(&mut last);
    }
}

// ---------------------------------------------------------------------------
// Analyzers
// ---------------------------------------------------------------------------

#[test]
fn pitch_through_abi() {
    let signal = sine(220.0, 44100.0, 4096);
    let result = unsafe { loqa_detect_pitch(signal.as_ptr(), len(&signal), 44100) };
    assert!(result.is_voiced);
    assert!((result.frequency - 220.0).abs() / 220.0 < 0.01, "{}", result.frequency);
    assert!((0.0..=1.0).contains(&result.confidence));
}

#[test]
fn pitch_sentinels() {
    let signal = sine(220.0, 16000.0, 2048);
    unsafe {
        assert_eq!(loqa_detect_pitch(ptr::null(), 2048, 16000), PitchResult::UNVOICED);
        assert_eq!(loqa_detect_pitch(signal.as_ptr(), 0, 16000), PitchResult::UNVOICED);
        assert_eq!(loqa_detect_pitch(signal.as_ptr(), -10, 16000), PitchResult::UNVOICED);
        for rate in [0, -44100, 4000, 7999, 48001, 96000] {
            assert_eq!(
                loqa_detect_pitch(signal.as_ptr(), len(&signal), rate),
                PitchResult::UNVOICED,
                "rate {rate}"
            );
        }
        for rate in [8000, 16000, 22050, 44100, 48000] {
            let result = loqa_detect_pitch(signal.as_ptr(), len(&signal), rate);
            assert!((0.0..=1.0).contains(&result.confidence), "rate {rate}");
        }
    }
}

#[test]
fn analyzer_sentinels_on_null_buffer() {
    unsafe {
        assert_eq!(loqa_extract_formants(ptr::null(), 1024, 16000, 0), FormantsResult::NONE);
        assert_eq!(loqa_analyze_spectrum(ptr::null(), 1024, 16000), SpectrumResult::default());
        assert_eq!(loqa_calculate_hnr(ptr::null(), 1024, 16000, 75.0, 500.0), HnrResult::UNVOICED);
        assert_eq!(loqa_calculate_h1h2(ptr::null(), 1024, 16000, 200.0), H1H2Result::NONE);
    }
}

#[test]
fn analyzers_through_abi() {
    let sample_rate = 16000;
    let signal: Vec<f32> = (0..2048)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * PI * 200.0 * t).sin() + 0.5 * (2.0 * PI * 400.0 * t).sin()
        })
        .collect();
    unsafe {
        let hnr = loqa_calculate_hnr(signal.as_ptr(), len(&signal), sample_rate, 75.0, 500.0);
        assert!(hnr.is_voiced);
        assert!(hnr.hnr > 10.0);

        let h1h2 = loqa_calculate_h1h2(signal.as_ptr(), len(&signal), sample_rate, 200.0);
        assert!((h1h2.h1h2 - 6.02).abs() < 1.0, "H1-H2 {}", h1h2.h1h2);
        assert_eq!(h1h2.f0, 200.0);

        let spectrum = loqa_analyze_spectrum(signal.as_ptr(), len(&signal), sample_rate);
        assert!(spectrum.centroid > 150.0 && spectrum.centroid < 600.0, "{spectrum:?}");

        let formants = loqa_extract_formants(signal.as_ptr(), len(&signal), sample_rate, -1);
        for f in [formants.f1, formants.f2, formants.f3] {
            assert!(f.is_finite() && f >= 0.0);
        }
    }
}
