//! CSV import entry point.
//!
//! Import is all-or-nothing through parsing: the whole text is decoded
//! before the first callback runs, so a malformed file never results in a
//! partial insert from the decode stage. Callback failures stop the run at
//! the failing row.

use std::path::Path;

use crate::codec;
use crate::error::{ImportError, ImportResult};
use crate::models::{Column, Record};

/// Gate and decode an import file without running any callbacks.
///
/// The file name is checked for a `.csv` extension before any parsing; a
/// mismatch fails with [`ImportError::InvalidFileType`].
pub fn parse_import(
    file_name: &str,
    content: &str,
    columns: &[Column],
) -> ImportResult<Vec<Record>> {
    if !has_csv_extension(file_name) {
        return Err(ImportError::InvalidFileType(file_name.to_string()));
    }

    Ok(codec::decode(content, columns)?)
}

/// Import CSV text, handing each decoded record to `insert` in order.
///
/// Parsing happens up front via [`parse_import`], so a malformed file fails
/// before the first callback runs. A callback error surfaces as
/// [`ImportError::CallbackFailure`] carrying the 1-based data row and the
/// callback's message. Returns the number of rows handed to the callback,
/// which on success equals the number of decoded records.
pub fn import_csv<F>(
    file_name: &str,
    content: &str,
    columns: &[Column],
    mut insert: F,
) -> ImportResult<usize>
where
    F: FnMut(&Record) -> Result<(), String>,
{
    let records = parse_import(file_name, content, columns)?;

    for (index, record) in records.iter().enumerate() {
        insert(record).map_err(|message| ImportError::CallbackFailure {
            row: index + 1,
            message,
        })?;
    }

    Ok(records.len())
}

fn has_csv_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Decode uploaded bytes to text ahead of the codec.
///
/// Valid UTF-8 passes through unchanged; anything else goes through charset
/// detection and [`decode_with_charset`]. An unrecognized low-confidence
/// detection fails with [`ImportError::Encoding`].
pub fn decode_upload_bytes(bytes: &[u8]) -> ImportResult<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let (charset, confidence, _) = chardet::detect(bytes);
    match decode_with_charset(bytes, &charset) {
        Some(text) => Ok(text),
        None if confidence >= 0.5 => Ok(String::from_utf8_lossy(bytes).into_owned()),
        None => Err(ImportError::Encoding(format!(
            "unrecognized charset '{}'",
            charset
        ))),
    }
}

/// Decode bytes with a known charset name, if this backend supports it.
fn decode_with_charset(bytes: &[u8], charset: &str) -> Option<String> {
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => Some(String::from_utf8_lossy(bytes).into_owned()),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => {
            Some(encoding_rs::ISO_8859_15.decode(bytes).0.into_owned())
        }
        "windows-1252" | "cp1252" => Some(encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CsvError;

    fn columns() -> Vec<Column> {
        vec![Column::new("name", "Name"), Column::new("age", "Age")]
    }

    #[test]
    fn test_import_counts_rows() {
        let mut seen = Vec::new();
        let count = import_csv(
            "customers.csv",
            "Name,Age\nAnn,30\nBob,25",
            &columns(),
            |record| {
                seen.push(record.get("name").unwrap().to_field_string());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen, vec!["Ann", "Bob"]);
    }

    #[test]
    fn test_extension_gate_runs_before_parsing() {
        let mut called = false;
        let result = import_csv("customers.txt", "Name,Age\nAnn,30", &columns(), |_| {
            called = true;
            Ok(())
        });

        assert!(matches!(result, Err(ImportError::InvalidFileType(_))));
        assert!(!called);
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let count = import_csv("Customers.CSV", "Name,Age\nAnn,30", &columns(), |_| Ok(()));
        assert_eq!(count.unwrap(), 1);
    }

    #[test]
    fn test_decode_failure_precedes_callbacks() {
        let mut called = false;
        let result = import_csv("customers.csv", "Name,Age", &columns(), |_| {
            called = true;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(ImportError::Csv(CsvError::EmptyInput))
        ));
        assert!(!called);
    }

    #[test]
    fn test_callback_failure_reports_row() {
        let result = import_csv(
            "customers.csv",
            "Name,Age\nAnn,30\nBob,25",
            &columns(),
            |record| {
                if record.get("name").unwrap().to_field_string() == "Bob" {
                    Err("duplicate phone number".into())
                } else {
                    Ok(())
                }
            },
        );

        match result {
            Err(ImportError::CallbackFailure { row, message }) => {
                assert_eq!(row, 2);
                assert_eq!(message, "duplicate phone number");
            }
            other => panic!("expected CallbackFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_upload_bytes_utf8_passthrough() {
        let text = decode_upload_bytes("Name,Age\nAnn,30".as_bytes()).unwrap();
        assert_eq!(text, "Name,Age\nAnn,30");
    }

    #[test]
    fn test_decode_with_charset_latin1() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let text = decode_with_charset(bytes, "iso-8859-1").unwrap();
        assert!(text.starts_with("Soci"));
        assert!(decode_with_charset(bytes, "shift-jis").is_none());
    }
}
