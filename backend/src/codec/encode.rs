//! CSV encoder.
//!
//! Given an ordered sequence of records and a column catalog, produces CSV
//! text: header row of column labels, then one line per record. Output is
//! deterministic and carries no trailing newline.

use crate::models::{Column, Record};

/// Encode records as CSV text.
///
/// For each record and column the value is resolved by column key; a missing
/// key renders as an empty field. Value stringification follows
/// [`crate::models::FieldValue::to_field_string`]: dates as `YYYY-MM-DD`,
/// lists joined with `"; "`, numbers in plain string form. The header row is
/// the column labels joined with `,`, never quote-escaped.
pub fn encode(records: &[Record], columns: &[Column]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);

    let header: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    lines.push(header.join(","));

    for record in records {
        let fields: Vec<String> = columns
            .iter()
            .map(|column| {
                let raw = record
                    .get(&column.key)
                    .map(|value| value.to_field_string())
                    .unwrap_or_default();
                escape_field(&raw)
            })
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Escape one field: double every embedded `"`, then wrap the field in
/// double quotes if it contains a comma, a double quote, or a newline.
fn escape_field(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    if escaped.contains(',') || escaped.contains('"') || escaped.contains('\n') {
        format!("\"{}\"", escaped)
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use chrono::NaiveDate;

    fn columns() -> Vec<Column> {
        vec![Column::new("name", "Name"), Column::new("age", "Age")]
    }

    fn record(name: &str, age: &str) -> Record {
        let mut r = Record::new();
        r.set("name", name.into());
        r.set("age", age.into());
        r
    }

    #[test]
    fn test_plain_rows() {
        let text = encode(&[record("Ann", "30"), record("Bob", "25")], &columns());
        assert_eq!(text, "Name,Age\nAnn,30\nBob,25");
    }

    #[test]
    fn test_comma_field_is_quoted() {
        let text = encode(&[record("O'Brien, Sam", "41")], &columns());
        assert_eq!(text, "Name,Age\n\"O'Brien, Sam\",41");
    }

    #[test]
    fn test_embedded_quote_is_doubled_and_wrapped() {
        let text = encode(&[record("He said \"hi\"", "1")], &columns());
        assert_eq!(text, "Name,Age\n\"He said \"\"hi\"\"\",1");
    }

    #[test]
    fn test_newline_field_is_quoted() {
        let text = encode(&[record("two\nlines", "1")], &columns());
        assert_eq!(text, "Name,Age\n\"two\nlines\",1");
    }

    #[test]
    fn test_missing_key_renders_empty() {
        let mut r = Record::new();
        r.set("age", "30".into());
        let text = encode(&[r], &columns());
        assert_eq!(text, "Name,Age\n,30");
    }

    #[test]
    fn test_empty_records_yield_header_only() {
        let text = encode(&[], &columns());
        assert_eq!(text, "Name,Age");
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_no_trailing_newline() {
        let text = encode(&[record("Ann", "30")], &columns());
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_value_kinds() {
        let mut r = Record::new();
        r.set(
            "name",
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()),
        );
        r.set("age", FieldValue::List(vec!["a".into(), "b".into()]));
        let text = encode(&[r], &columns());
        assert_eq!(text, "Name,Age\n2025-01-02,a; b");
    }

    #[test]
    fn test_deterministic() {
        let rows = vec![record("Ann", "30"), record("O'Brien, Sam", "41")];
        assert_eq!(encode(&rows, &columns()), encode(&rows, &columns()));
    }
}
