//! A1-style coordinate conversion. Drawing anchors come back from the
//! workbook as strings like `"B3"`; everything else in this workspace speaks
//! 1-based (column, row) pairs.

/// Parse an A1 reference into a 1-based (column, row) pair.
/// Returns `None` for anything that is not letters followed by digits.
pub fn parse_a1(reference: &str) -> Option<(u32, u32)> {
    let reference = reference.trim().trim_start_matches('$');
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let letters = letters.trim_end_matches('$');
    let digits = digits.trim_start_matches('$');
    if letters.is_empty() || digits.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col.checked_mul(26)?.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((col, row))
}

/// 1-based column index to letters: 1 → "A", 27 → "AA".
pub fn column_letters(mut col: u32) -> String {
    debug_assert!(col >= 1);
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_references() {
        assert_eq!(parse_a1("A1"), Some((1, 1)));
        assert_eq!(parse_a1("B3"), Some((2, 3)));
        assert_eq!(parse_a1("Z10"), Some((26, 10)));
        assert_eq!(parse_a1("AA2"), Some((27, 2)));
        assert_eq!(parse_a1("aa2"), Some((27, 2)));
    }

    #[test]
    fn parses_absolute_references() {
        assert_eq!(parse_a1("$C$5"), Some((3, 5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_a1(""), None);
        assert_eq!(parse_a1("12"), None);
        assert_eq!(parse_a1("A0"), None);
        assert_eq!(parse_a1("A"), None);
        assert_eq!(parse_a1("A-3"), None);
    }

    #[test]
    fn column_letters_round_trip() {
        for col in [1u32, 2, 26, 27, 52, 53, 702, 703] {
            let a1 = format!("{}1", column_letters(col));
            assert_eq!(parse_a1(&a1), Some((col, 1)), "col {col} -> {a1}");
        }
    }
}
