use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded barcode value together with its symbology tag
/// (e.g. "EAN_13", "CODE_128").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarcodeCandidate {
    pub value: String,
    pub symbology: String,
}

impl BarcodeCandidate {
    pub fn new(value: impl Into<String>, symbology: impl Into<String>) -> Self {
        Self { value: value.into(), symbology: symbology.into() }
    }
}

impl fmt::Display for BarcodeCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.symbology)
    }
}

/// Whether a digit string is a plausible retail barcode (8–14 digits).
pub fn is_plausible_barcode(digits: &str) -> bool {
    !digits.is_empty()
        && digits.len() >= 8
        && digits.len() <= 14
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Left-pad a 13-digit value with one zero to GTIN-14. Other lengths pass
/// through untouched; the caller decides whether the provider wants this.
pub fn pad_gtin14(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.len() == 13 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        format!("0{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Extract a usable barcode from free-form cell text: drop any non-digit
/// prefix or separators ("条码: 690..." and friends), then validate length.
pub fn clean_cell_barcode(cell: &str) -> Option<String> {
    let digits: String = cell.chars().filter(|c| c.is_ascii_digit()).collect();
    if is_plausible_barcode(&digits) {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_barcode_length_bounds() {
        assert!(is_plausible_barcode("12345678"));
        assert!(is_plausible_barcode("6901234567892"));
        assert!(is_plausible_barcode("06901234567892"));
        assert!(!is_plausible_barcode("1234567"));
        assert!(!is_plausible_barcode("123456789012345"));
        assert!(!is_plausible_barcode(""));
        assert!(!is_plausible_barcode("69012345abc92"));
    }

    #[test]
    fn pad_gtin14_only_touches_13_digit_values() {
        assert_eq!(pad_gtin14("6901234567892"), "06901234567892");
        assert_eq!(pad_gtin14(" 6901234567892 "), "06901234567892");
        assert_eq!(pad_gtin14("12345678"), "12345678");
        assert_eq!(pad_gtin14("06901234567892"), "06901234567892");
        assert_eq!(pad_gtin14("not-a-barcode"), "not-a-barcode");
    }

    #[test]
    fn clean_cell_strips_prefixes_and_noise() {
        assert_eq!(clean_cell_barcode("6901234567892").as_deref(), Some("6901234567892"));
        assert_eq!(clean_cell_barcode("条码: 6901234567892").as_deref(), Some("6901234567892"));
        assert_eq!(clean_cell_barcode(" 690-1234-567892 ").as_deref(), Some("6901234567892"));
        assert_eq!(clean_cell_barcode("识别失败"), None);
        assert_eq!(clean_cell_barcode(""), None);
        assert_eq!(clean_cell_barcode("42"), None);
    }

    #[test]
    fn candidate_display_includes_symbology() {
        let c = BarcodeCandidate::new("6901234567892", "EAN_13");
        assert_eq!(c.to_string(), "6901234567892 (EAN_13)");
    }
}
