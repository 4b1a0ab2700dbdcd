pub mod gtin;
pub mod outcome;

pub use gtin::{clean_cell_barcode, is_plausible_barcode, pad_gtin14, BarcodeCandidate};
pub use outcome::LookupOutcome;
