use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR service error: {0}")]
    Http(String),
    #[error("Tesseract not available, build with `tesseract` feature")]
    NotAvailable,
}

/// One recognition pass over an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    /// Mean confidence over recognized tokens, 0.0–1.0.
    pub confidence: f32,
    pub words: usize,
}

impl Recognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        let text = text.into();
        let words = text.split_whitespace().count();
        Self { text, confidence: confidence.clamp(0.0, 1.0), words }
    }
}

/// Abstraction over an OCR backend.
/// Implementations accept raw PNG/JPEG image bytes and return the recognized
/// text with a confidence estimate.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError>;
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns a pre-set recognition, useful for exercising the service and the
/// spreadsheet fill path without a recognition engine installed.
pub struct MockRecognizer {
    pub text: String,
    pub confidence: f32,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), confidence: 0.99 }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<Recognition, OcrError> {
        Ok(Recognition::new(self.text.clone(), self.confidence))
    }
}

// ── Tesseract backend (optional, gated behind `tesseract` feature) ─────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError, Recognition};
    use leptess::LepTess;

    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError> {
            let mut lt = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            lt.set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = lt
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            // mean_text_conf is a 0–100 percentage.
            let confidence = lt.mean_text_conf() as f32 / 100.0;
            Ok(Recognition::new(text, confidence))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_preset_text() {
        let r = MockRecognizer::new("ACME COLA 500ML");
        let rec = r.recognize(b"fake image data").unwrap();
        assert_eq!(rec.text, "ACME COLA 500ML");
        assert_eq!(rec.words, 3);
    }

    #[test]
    fn mock_ignores_image_content() {
        let r = MockRecognizer::new("hello");
        assert_eq!(r.recognize(b"anything").unwrap().text, "hello");
        assert_eq!(r.recognize(b"").unwrap().text, "hello");
    }

    #[test]
    fn recognition_clamps_confidence_and_counts_words() {
        let rec = Recognition::new("two words", 1.7);
        assert_eq!(rec.confidence, 1.0);
        assert_eq!(rec.words, 2);

        let rec = Recognition::new("", -0.5);
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.words, 0);
    }
}
