pub mod recognizer;
pub mod remote;
pub mod types;

pub use recognizer::{MockRecognizer, OcrBackend, OcrError, Recognition};
pub use remote::RemoteOcr;
pub use types::{Envelope, RecognizeData, RecognizeRequest};
