//! A1-style cell reference helpers

/// Rows of a worksheet (`1..=1048576`)
pub(crate) const MAX_ROWS: usize = 1_048_576;
/// Columns of a worksheet (`A..=XFD`)
pub(crate) const MAX_COLUMNS: usize = 16_384;

/// Converts column letters to a 0-based column index (`A` = 0, `AA` = 26).
/// Columns past `XFD` are rejected.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .chars()
        .map(|c| c as usize - 'A' as usize + 1)
        .try_fold(0usize, |index, digit| index.checked_mul(26)?.checked_add(digit))
        .filter(|&col| col <= MAX_COLUMNS)
        .map(|col| col - 1)
}

/// Converts a 1-based row number to a 0-based row index.
/// Rows past the last worksheet row are rejected.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|&row| row <= MAX_ROWS)
        .and_then(|row| row.checked_sub(1))
}

/// Splits a reference such as `B12` into 0-based `(row, col)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Builds the A1-style reference for 0-based `(row, col)`.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut letters = Vec::new();
    let mut col = col + 1;
    while col > 0 {
        let remainder = (col - 1) % 26;
        letters.push((b'A' + remainder as u8) as char);
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect::<String>() + &(row + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("b12"), Some((11, 1)));
        assert_eq!(reference_to_index("AA3"), Some((2, 26)));
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("12"), None);
    }

    #[test]
    fn reject_references_past_sheet_limits() {
        assert_eq!(reference_to_index("XFD1048576"), Some((MAX_ROWS - 1, MAX_COLUMNS - 1)));
        assert_eq!(reference_to_index("XFE1"), None);
        assert_eq!(reference_to_index("A1048577"), None);
        assert_eq!(reference_to_index("A99999999999"), None);
        assert_eq!(reference_to_index("A99999999999999999999999"), None);
        assert_eq!(col_to_index("AAAAAAAAAAAAAAAA"), None);
    }

    #[test]
    fn format_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 27), "AB10");
    }
}
