use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v1/ocr/recognize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizeRequest {
    pub image_base64: String,
}

/// Recognition payload inside a success envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizeData {
    pub text: String,
    pub confidence: f32,
    pub words: usize,
    pub lines: usize,
    pub paragraphs: usize,
    /// Wall-clock seconds spent recognizing.
    pub processing_time: f64,
}

/// Standard service envelope: `code == 0` is success, anything else is an
/// error with `msg` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RecognizeData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Envelope {
    pub fn ok(data: RecognizeData) -> Self {
        Self { code: 0, data: Some(data), msg: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: 500, data: None, msg: Some(msg.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_msg() {
        let env = Envelope::ok(RecognizeData {
            text: "x".into(),
            confidence: 0.9,
            words: 1,
            lines: 1,
            paragraphs: 1,
            processing_time: 0.01,
        });
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"]["text"], "x");
        assert!(json.get("msg").is_none());
    }

    #[test]
    fn error_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::error("boom")).unwrap();
        assert_eq!(json["code"], 500);
        assert_eq!(json["msg"], "boom");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn envelope_round_trips() {
        let raw = r#"{"code":0,"data":{"text":"hi there","confidence":0.8,"words":2,"lines":1,"paragraphs":1,"processing_time":0.25}}"#;
        let env: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.code, 0);
        assert_eq!(env.data.unwrap().words, 2);
    }
}
