//! Error types for the Salonbase data backend.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - CSV decoding errors
//! - [`ImportError`] - CSV import (file gate, decode, validation, callback)
//! - [`ExportError`] - CSV export and sink delivery
//! - [`ServiceError`] - hosted data-service client errors
//! - [`MembershipError`] - membership plan-change errors
//! - [`ServerError`] - top-level HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Decoding Errors
// =============================================================================

/// Errors during CSV decoding.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Fewer than two usable lines (header plus at least one data row).
    #[error("CSV must contain a header row and at least one data row")]
    EmptyInput,

    /// Header parsed but zero data records resulted.
    #[error("CSV contains no data rows")]
    NoDataRows,
}

// =============================================================================
// Import Errors
// =============================================================================

/// Errors during CSV import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file does not carry a `.csv` extension; rejected before parsing.
    #[error("Not a CSV file: {0}")]
    InvalidFileType(String),

    /// Uploaded bytes could not be decoded to text.
    #[error("Failed to decode file contents: {0}")]
    Encoding(String),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// One or more rows failed schema validation.
    #[error("{invalid} of {total} rows failed validation")]
    Validation { invalid: usize, total: usize },

    /// The per-row insertion callback failed. Rows are 1-based over data
    /// rows; the header does not count.
    #[error("Row {row}: {message}")]
    CallbackFailure { row: usize, message: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors during CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The export sink refused the file.
    #[error("Export sink failed: {0}")]
    Sink(String),

    /// Failed to write the export file.
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Data-Service Errors
// =============================================================================

/// Errors from the hosted data-service client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing connection settings.
    #[error("Missing {0} environment variable")]
    MissingCredentials(&'static str),

    /// HTTP transport failure.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status.
    #[error("Service returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The service answered with a body this client cannot read.
    #[error("Invalid service response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Membership Errors
// =============================================================================

/// Errors during a membership plan change.
#[derive(Debug, Error)]
pub enum MembershipError {
    /// Data-service error from one of the plan-change steps.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),
}

// =============================================================================
// Server Errors (top-level)
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Import error.
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Data-service error.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Membership error.
    #[error("Membership error: {0}")]
    Membership(#[from] MembershipError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV decoding.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for data-service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type for membership operations.
pub type MembershipResult<T> = Result<T, MembershipError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> ImportError
        let csv_err = CsvError::EmptyInput;
        let import_err: ImportError = csv_err.into();
        assert!(import_err.to_string().contains("header row"));

        // ImportError -> ServerError
        let import_err = ImportError::InvalidFileType("notes.txt".into());
        let server_err: ServerError = import_err.into();
        assert!(server_err.to_string().contains("notes.txt"));

        // ServiceError -> MembershipError -> ServerError
        let service_err = ServiceError::MissingCredentials("SALON_SERVICE_URL");
        let membership_err: MembershipError = service_err.into();
        let server_err: ServerError = membership_err.into();
        assert!(server_err.to_string().contains("SALON_SERVICE_URL"));
    }

    #[test]
    fn test_callback_failure_format() {
        let err = ImportError::CallbackFailure {
            row: 3,
            message: "duplicate phone number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("duplicate phone number"));
    }

    #[test]
    fn test_bad_status_format() {
        let err = ServiceError::BadStatus {
            status: 409,
            body: "conflict".into(),
        };
        assert_eq!(err.to_string(), "Service returned 409: conflict");
    }
}
