//! # Salonbase - salon management data backend
//!
//! Salonbase moves salon data (customers, staff, products, sales) between
//! CSV files and the hosted data service, and runs the membership
//! plan-change flow with point carryover.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│    Codec    │────▶│  Validation │────▶│ Data Service│
//! │ (UTF8/auto) │     │ (enc/dec)   │     │ (draft-07)  │     │ (REST API)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salonbase::{import_csv, Entity};
//!
//! let columns = Entity::Customers.columns();
//! let count = import_csv("customers.csv", &contents, &columns, |record| {
//!     println!("{:?}", record);
//!     Ok(())
//! })?;
//! println!("Parsed {} rows", count);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Records, columns, entities, membership types
//! - [`codec`] - CSV encoder and decoder
//! - [`transfer`] - Import/export entry points
//! - [`membership`] - Plan changes with point carryover
//! - [`service`] - Hosted data-service client
//! - [`validation`] - JSON Schema row validation
//! - [`reports`] - Revenue aggregation
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// CSV codec
pub mod codec;

// Import/export
pub mod transfer;

// Memberships
pub mod membership;

// Data service
pub mod service;

// Validation
pub mod validation;

// Reporting
pub mod reports;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CsvError, ExportError, ImportError, MembershipError, ServerError, ServiceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Column, Entity, FieldValue, MembershipRecord, Plan, Record, UpgradeOutcome,
};

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use codec::{decode, encode, split_fields};

// =============================================================================
// Re-exports - Transfer
// =============================================================================

pub use transfer::{
    decode_upload_bytes, export_csv, export_filename, export_sample, import_csv, parse_import,
    sample_filename, DirSink, ExportSink, MemorySink, CSV_MIME,
};

// =============================================================================
// Re-exports - Membership
// =============================================================================

pub use membership::{upgrade_plan, MembershipStore};

// =============================================================================
// Re-exports - Service
// =============================================================================

pub use service::DataServiceClient;

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid, validate, validate_record, validate_rows};

// =============================================================================
// Re-exports - Reports
// =============================================================================

pub use reports::{revenue_by_day, revenue_by_month, RevenueBucket};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
