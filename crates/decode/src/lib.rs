pub mod attempts;
pub mod engine;

pub use attempts::{decode_barcode, Decoded};
pub use engine::{BarcodeEngine, MockEngine, RxingEngine};
