//! Utilities for parsing and formatting A1-style cell references.

/// Parse a cell reference like "A1" or "$B$7" into (row, col), 0-indexed.
///
/// Letters must precede digits. Returns `None` for empty parts, row 0, or
/// indices that overflow `u32`.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            if saw_row {
                return None;
            }
            let digit = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
            col = col.checked_mul(26)?.checked_add(digit)?;
            saw_col = true;
        } else if let Some(digit) = ch.to_digit(10) {
            row = row.checked_mul(10)?.checked_add(digit)?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

/// Parse a range like "A1:B10" or "A1" into (sri, sci, eri, eci).
///
/// The corners are normalized so that start <= end on both axes.
pub fn parse_cell_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    let (start, end) = match range.split_once(':') {
        Some((start, end)) => (parse_cell_ref(start)?, parse_cell_ref(end)?),
        None => {
            let cell = parse_cell_ref(range)?;
            (cell, cell)
        }
    };
    Some((
        start.0.min(end.0),
        start.1.min(end.1),
        start.0.max(end.0),
        start.1.max(end.1),
    ))
}

/// Convert a 0-based column index to column letters (A, B, ..., Z, AA, AB, ...)
pub fn col_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or(0);
        letters.push(char::from(b'A' + offset));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Format a 0-based (row, col) pair as an A1 reference.
pub fn format_cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_to_letter(col), u64::from(row) + 1)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parse_simple_refs() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("b3"), Some((2, 1)));
        assert_eq!(parse_cell_ref("$AA$10"), Some((9, 26)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("A"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("1A"), None);
        assert_eq!(parse_cell_ref("A-1"), None);
        assert_eq!(parse_cell_ref("ZZZZZZZZZZ1"), None);
    }

    #[test]
    fn test_parse_range_normalizes() {
        assert_eq!(parse_cell_range("A1:C3"), Some((0, 0, 2, 2)));
        assert_eq!(parse_cell_range("C3:A1"), Some((0, 0, 2, 2)));
        assert_eq!(parse_cell_range("D4"), Some((3, 3, 3, 3)));
        assert_eq!(parse_cell_range("A1:"), None);
    }

    #[test]
    fn test_col_letters() {
        assert_eq!(col_to_letter(0), "A");
        assert_eq!(col_to_letter(25), "Z");
        assert_eq!(col_to_letter(26), "AA");
        assert_eq!(col_to_letter(701), "ZZ");
        assert_eq!(col_to_letter(702), "AAA");
    }

    #[test]
    fn test_format_round_trips_through_parse() {
        let text = format_cell_ref(41, 27);
        assert_eq!(text, "AB42");
        assert_eq!(parse_cell_ref(&text).unwrap(), (41, 27));
    }
}
