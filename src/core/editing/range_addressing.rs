// A1 notation for spreadsheet ranges.
//
// Grammar: `(SheetName!)?ColRow(:ColRow)?`. Column letters are bijective
// base 26 (A=0, Z=25, AA=26, ZZ=701); rows are 1-based in the text and
// 0-based in the parsed value.

/// A parsed range, 0-based and inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet_name: Option<String>,
    pub start_col: usize,
    pub start_row: usize,
    pub end_col: usize,
    pub end_row: usize,
}

/// Column letters to a 0-based index. `None` for empty or non-letter input.
pub fn column_to_index(column: &str) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let mut value: usize = 0;
    for c in column.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        value = value.checked_mul(26)?.checked_add(digit)?;
    }
    Some(value - 1)
}

/// Split `B12` into (`B`, `12`).
fn split_cell(cell: &str) -> Option<(usize, usize)> {
    let letters = cell.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let (column, row) = cell.split_at(letters);
    if row.is_empty() || !row.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let row: usize = row.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((column_to_index(column)?, row - 1))
}

/// Parse an A1 range. Malformed input yields `None`; callers raise their own error.
pub fn parse_a1(range: &str) -> Option<A1Range> {
    let (sheet_name, cells) = match range.split_once('!') {
        Some((sheet, cells)) => {
            if sheet.is_empty() {
                return None;
            }
            (Some(sheet.to_string()), cells)
        }
        None => (None, range),
    };

    let (start, end) = match cells.split_once(':') {
        Some((start, end)) => (split_cell(start)?, split_cell(end)?),
        None => {
            let cell = split_cell(cells)?;
            (cell, cell)
        }
    };

    Some(A1Range {
        sheet_name,
        start_col: start.0,
        start_row: start.1,
        end_col: end.0,
        end_row: end.1,
    })
}

impl A1Range {
    pub fn is_single_cell(&self) -> bool {
        self.start_col == self.end_col && self.start_row == self.end_row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters_are_bijective_base_26() {
        assert_eq!(column_to_index("A"), Some(0));
        assert_eq!(column_to_index("Z"), Some(25));
        assert_eq!(column_to_index("AA"), Some(26));
        assert_eq!(column_to_index("AB"), Some(27));
        assert_eq!(column_to_index("AZ"), Some(51));
        assert_eq!(column_to_index("BA"), Some(52));
        assert_eq!(column_to_index("ZZ"), Some(701));
        assert_eq!(column_to_index("zz"), Some(701));
        assert_eq!(column_to_index(""), None);
        assert_eq!(column_to_index("A1"), None);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(
            parse_a1("B2:D4"),
            Some(A1Range {
                sheet_name: None,
                start_col: 1,
                start_row: 1,
                end_col: 3,
                end_row: 3,
            })
        );
    }

    #[test]
    fn test_parse_single_cell_with_sheet() {
        let range = parse_a1("Sheet1!A1").unwrap();
        assert_eq!(range.sheet_name.as_deref(), Some("Sheet1"));
        assert_eq!((range.start_col, range.start_row), (0, 0));
        assert_eq!((range.end_col, range.end_row), (0, 0));
        assert!(range.is_single_cell());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_a1("bad"), None);
        assert_eq!(parse_a1("A0"), None);
        assert_eq!(parse_a1("!A1"), None);
        assert_eq!(parse_a1("A1:"), None);
        assert_eq!(parse_a1("1A"), None);
    }

    #[test]
    fn test_lowercase_columns_are_accepted() {
        let range = parse_a1("data!c3:e10").unwrap();
        assert_eq!(range.start_col, 2);
        assert_eq!(range.end_row, 9);
    }
}
