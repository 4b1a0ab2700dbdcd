use image::DynamicImage;
use shelfscan_core::BarcodeCandidate;
use std::sync::Mutex;

/// Abstraction over a barcode decoder.
/// Implementations accept a decoded image and return the first barcode found,
/// or `None` when the frame holds nothing decodable.
pub trait BarcodeEngine: Send + Sync {
    fn decode(&self, img: &DynamicImage) -> Option<BarcodeCandidate>;
}

// ── rxing engine (production) ─────────────────────────────────────────────────

/// Decodes via the `rxing` ZXing port. Works on the luma plane; symbology is
/// whatever rxing reports (EAN_13, CODE_128, QR_CODE, …).
#[derive(Debug, Default)]
pub struct RxingEngine;

impl RxingEngine {
    pub fn new() -> Self {
        Self
    }
}

impl BarcodeEngine for RxingEngine {
    fn decode(&self, img: &DynamicImage) -> Option<BarcodeCandidate> {
        let gray = img.to_luma8();
        let (width, height) = gray.dimensions();
        // rxing's helper takes height before width.
        match rxing::helpers::detect_in_luma(gray.into_raw(), height, width, None) {
            Ok(result) => Some(BarcodeCandidate::new(
                result.getText(),
                result.getBarcodeFormat().to_string(),
            )),
            Err(_) => None,
        }
    }
}

// ── Mock engine (used for tests) ──────────────────────────────────────────────

/// Scripted engine: fails the first `fail_before` calls, then returns a preset
/// candidate on every call after that. Lets tests pin down exactly which
/// fallback strategy produced the hit.
pub struct MockEngine {
    candidate: Option<BarcodeCandidate>,
    fail_before: usize,
    calls: Mutex<usize>,
}

impl MockEngine {
    /// Succeeds on the very first attempt.
    pub fn always(candidate: BarcodeCandidate) -> Self {
        Self { candidate: Some(candidate), fail_before: 0, calls: Mutex::new(0) }
    }

    /// Never decodes anything.
    pub fn never() -> Self {
        Self { candidate: None, fail_before: 0, calls: Mutex::new(0) }
    }

    /// Fails the first `n` attempts, then succeeds.
    pub fn succeed_after(n: usize, candidate: BarcodeCandidate) -> Self {
        Self { candidate: Some(candidate), fail_before: n, calls: Mutex::new(0) }
    }

    /// How many decode attempts this engine has seen.
    pub fn attempts(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl BarcodeEngine for MockEngine {
    fn decode(&self, _img: &DynamicImage) -> Option<BarcodeCandidate> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls > self.fail_before {
            self.candidate.clone()
        } else {
            None
        }
    }
}
