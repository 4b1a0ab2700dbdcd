use base64::Engine as _;
use std::io::Cursor;
use std::time::Duration;

use crate::recognizer::{OcrError, Recognition};
use crate::types::{Envelope, RecognizeRequest};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/v1/ocr/recognize";

/// Client for the local OCR microservice. Images are re-encoded to PNG
/// before upload so the service never sees exotic embedded formats.
pub struct RemoteOcr {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOcr {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), endpoint: endpoint.into() }
    }

    pub async fn recognize(&self, image_bytes: &[u8]) -> Result<Recognition, OcrError> {
        let png = reencode_png(image_bytes)?;
        let request = RecognizeRequest {
            image_base64: base64::engine::general_purpose::STANDARD.encode(&png),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(Duration::from_secs(60))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OcrError::Http(e.to_string()))?;

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| OcrError::Http(format!("invalid response: {e}")))?;

        match envelope {
            Envelope { code: 0, data: Some(data), .. } => {
                Ok(Recognition::new(data.text, data.confidence))
            }
            Envelope { msg, .. } => {
                Err(OcrError::Engine(msg.unwrap_or_else(|| "unknown service error".to_string())))
            }
        }
    }
}

fn reencode_png(image_bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
    let img = image::load_from_memory(image_bytes)
        .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

    fn tiny_jpeg() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(8, 8, |_, _| Luma([180u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn reencode_normalizes_to_png() {
        let png = reencode_png(&tiny_jpeg()).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }

    #[test]
    fn reencode_rejects_garbage() {
        assert!(matches!(reencode_png(b"not an image"), Err(OcrError::ImageDecode(_))));
    }
}
