//! JSON Schema validation for imported rows.
//!
//! Decoded CSV records are validated before anything is inserted into the
//! data service. One draft-07 schema per importable entity, embedded at
//! compile time from `schemas/`:
//!
//! - `customer-row.json`
//! - `staff-row.json`
//! - `product-row.json`
//!
//! Decoded values are always strings, so the schemas constrain string
//! shapes (date and number patterns) rather than JSON types. Sales rows are
//! never imported and have no schema.

use serde_json::Value;

use crate::models::{Entity, Record};

/// Validate a JSON object against a schema.
///
/// Returns `Ok(())` when valid, otherwise every validation error message.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True/false version of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// The import schema for an entity, if it has one.
fn schema_for(entity: Entity) -> Option<Value> {
    let raw = match entity {
        Entity::Customers => include_str!("../../schemas/customer-row.json"),
        Entity::Staff => include_str!("../../schemas/staff-row.json"),
        Entity::Products => include_str!("../../schemas/product-row.json"),
        Entity::Sales => return None,
    };
    Some(serde_json::from_str(raw).expect("Invalid embedded schema"))
}

/// Validate one decoded record against its entity's schema.
///
/// Entities without a schema validate vacuously.
pub fn validate_record(entity: Entity, record: &Record) -> Result<(), Vec<String>> {
    match schema_for(entity) {
        Some(schema) => validate(&schema, &record.to_json()),
        None => Ok(()),
    }
}

/// Validate a batch of decoded records.
///
/// Returns the number of valid records and, per failing record, its 0-based
/// index with the error messages.
pub fn validate_rows(entity: Entity, records: &[Record]) -> (usize, Vec<(usize, Vec<String>)>) {
    let mut valid = 0;
    let mut failures = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match validate_record(entity, record) {
            Ok(()) => valid += 1,
            Err(errors) => failures.push((index, errors)),
        }
    }

    (valid, failures)
}
