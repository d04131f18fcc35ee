//! CSV decoder.
//!
//! Line-oriented: the text is split on `\n` and blank lines dropped before
//! any field parsing happens. The first usable line is the header; column
//! definitions are matched against it by label, case-insensitively, first
//! match wins. Data rows are split by a two-state field splitter
//! (see [`split_fields`]).

use crate::error::{CsvError, CsvResult};
use crate::models::{Column, FieldValue, Record};

/// Decode CSV text into records.
///
/// Columns whose label matches no header are silently skipped: their key is
/// absent from every decoded record. Within a row, a column whose resolved
/// header index is out of range for that row is likewise left unset rather
/// than set to an empty string. Decoded values are always text, trimmed of
/// surrounding whitespace.
///
/// Fails with [`CsvError::EmptyInput`] when fewer than two non-blank lines
/// remain, and with [`CsvError::NoDataRows`] if no records result (the
/// latter cannot occur once a header and a data line exist, but the guard
/// stays rather than silently returning an empty list).
pub fn decode(text: &str, columns: &[Column]) -> CsvResult<Vec<Record>> {
    let lines: Vec<&str> = text
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(CsvError::EmptyInput);
    }

    let headers = split_fields(lines[0]);

    // Column -> header index, first case-insensitive label match wins.
    let resolved: Vec<(&Column, usize)> = columns
        .iter()
        .filter_map(|column| {
            headers
                .iter()
                .position(|header| header.trim().to_lowercase() == column.label.to_lowercase())
                .map(|index| (column, index))
        })
        .collect();

    let mut records = Vec::with_capacity(lines.len() - 1);
    for line in &lines[1..] {
        let fields = split_fields(line);
        let mut record = Record::new();
        for (column, index) in &resolved {
            if let Some(field) = fields.get(*index) {
                record.set(
                    column.key.clone(),
                    FieldValue::Text(field.trim().to_string()),
                );
            }
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(CsvError::NoDataRows);
    }

    Ok(records)
}

/// Split one line into fields.
///
/// Single left-to-right pass with two states, `Unquoted` and `Quoted`
/// (tracked as a boolean), starting `Unquoted` on every line:
///
/// - `"` inside quotes followed by another `"` emits one literal quote and
///   advances past both; any other `"` toggles the state.
/// - `,` outside quotes closes the current field.
/// - End of line always flushes the pending field, so a non-empty line
///   yields at least one field.
///
/// Quote balance is not validated: an unterminated quote consumes the rest
/// of the line (and only the line; state never carries across lines).
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if inside_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    inside_quotes = !inside_quotes;
                }
            }
            ',' if !inside_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);

    fields
}
