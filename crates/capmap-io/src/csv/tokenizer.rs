//! Quote-aware CSV tokenizer
//!
//! Accepts what spreadsheet exports produce: an optional UTF-8 BOM, CRLF or
//! LF line ends, double-quoted fields with `""` escapes, and newlines inside
//! quotes. Rows whose fields are all blank are dropped.

use crate::error::CsvError;

/// UTF-8 byte order mark
pub const BOM: char = '\u{feff}';

/// Split CSV text into rows of raw (untrimmed) fields
///
/// A `"` opens a quoted field only at the start of a field; elsewhere it is
/// literal. Text after a closing quote is appended to the same field.
/// Carriage returns are discarded everywhere. Error row numbers count
/// non-blank records from 1, header included.
pub fn tokenize(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_start = true;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            continue;
        }

        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                field_start = true;
            }
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
                field_start = true;
            }
            _ => {
                field.push(c);
                field_start = false;
            }
        }
    }

    if in_quotes {
        return Err(CsvError::UnterminatedQuote { row: rows.len() + 1 });
    }
    if !row.is_empty() || !field.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    Ok(rows)
}

fn push_row(rows: &mut Vec<Vec<String>>, row: Vec<String>) {
    if row.iter().any(|f| !f.trim().is_empty()) {
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(text: &str) -> Vec<Vec<String>> {
        tokenize(text).unwrap()
    }

    #[test]
    fn plain_rows() {
        assert_eq!(rows("a,b,c\n1,2,3\n"), vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn last_row_without_newline() {
        assert_eq!(rows("a,b\n1,2"), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn bom_and_crlf_are_stripped() {
        assert_eq!(rows("\u{feff}a,b\r\n1,2\r\n"), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn quoted_fields() {
        assert_eq!(
            rows("\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\"\n"),
            vec![vec!["a,b", "say \"hi\"", "two\nlines"]]
        );
    }

    #[test]
    fn empty_quoted_field_and_trailing_comma() {
        assert_eq!(rows("\"\",x,\n"), vec![vec!["", "x", ""]]);
    }

    #[test]
    fn mid_field_quote_is_literal() {
        assert_eq!(rows("5\" disk,b\n"), vec![vec!["5\" disk", "b"]]);
    }

    #[test]
    fn blank_rows_are_dropped() {
        assert_eq!(rows("a,b\n\n , \n1,2\n\n"), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn empty_input() {
        assert!(rows("").is_empty());
        assert!(rows("\u{feff}").is_empty());
    }

    #[test]
    fn unterminated_quote_reports_row() {
        let err = tokenize("a,b\n1,\"open\nstill open\n").unwrap_err();
        assert!(matches!(err, CsvError::UnterminatedQuote { row: 2 }));
    }
}
