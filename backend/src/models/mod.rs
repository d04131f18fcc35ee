//! Domain models for the Salonbase data backend.
//!
//! This module contains the core data structures used throughout the crate:
//!
//! - [`FieldValue`] - the closed set of value kinds a record field may hold
//! - [`Record`] - an ordered mapping from column key to field value
//! - [`Column`] - a (key, display label) pair driving CSV layout
//! - [`Entity`] - the salon tables that can be exported or imported
//! - [`Plan`], [`MembershipRecord`], [`UpgradeOutcome`] - membership types

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Field Values
// =============================================================================

/// A single field value inside a [`Record`].
///
/// Records never nest: a field is a scalar (text, number, calendar date) or a
/// flat list of strings. "Nothing" is expressed by the key being absent from
/// the record, not by a dedicated variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Plain text.
    Text(String),
    /// Numeric value (prices, stock counts, point balances).
    Number(f64),
    /// Calendar date, no time component.
    Date(NaiveDate),
    /// Flat list of strings (joined with `"; "` in CSV output).
    List(Vec<String>),
}

/// Matches `YYYY-MM-DD`; a cheap gate before the real chrono parse.
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

impl FieldValue {
    /// The CSV string form of this value, before escaping.
    ///
    /// Dates print as `YYYY-MM-DD`, lists join with `"; "`, integral numbers
    /// print without a fractional part (`30.0` becomes `"30"`).
    pub fn to_field_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::List(items) => items.join("; "),
        }
    }

    /// Classify a raw CSV string for insertion into the data service.
    ///
    /// `YYYY-MM-DD` strings become dates, parseable floats become numbers,
    /// everything else stays text. CSV decoding itself never calls this;
    /// decoded values are always text until an insert needs typing.
    pub fn infer(raw: &str) -> FieldValue {
        let trimmed = raw.trim();
        if ISO_DATE.is_match(trimmed) {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                return FieldValue::Date(date);
            }
        }
        if !trimmed.is_empty() {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    let value = FieldValue::Number(n);
                    // Only type strings that survive the round trip; keeps
                    // leading zeros (phone numbers) intact.
                    if value.to_field_string() == trimmed {
                        return value;
                    }
                }
            }
        }
        FieldValue::Text(raw.to_string())
    }

    /// JSON form for validation and service inserts.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => serde_json::json!(n),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::List(items) => {
                Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

// =============================================================================
// Records
// =============================================================================

/// An ordered mapping from column key to [`FieldValue`].
///
/// Insertion order is preserved; setting an existing key replaces the value
/// in place. A key that was never set reads back as `None`, which the CSV
/// encoder renders as an empty field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field by key.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the record carries the key.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON object form for validation and service inserts.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (key, value) in &self.fields {
            obj.insert(key.clone(), value.to_json());
        }
        Value::Object(obj)
    }

    /// Build a record from a JSON object row, as returned by the data
    /// service. Null fields are left unset; unsupported shapes (nested
    /// objects) are skipped.
    pub fn from_json(row: &Value) -> Record {
        let mut record = Record::new();
        let Some(obj) = row.as_object() else {
            return record;
        };
        for (key, value) in obj {
            match value {
                Value::String(s) => record.set(key.as_str(), FieldValue::infer(s)),
                Value::Number(n) => {
                    if let Some(f) = n.as_f64() {
                        record.set(key.as_str(), FieldValue::Number(f));
                    }
                }
                Value::Bool(b) => record.set(key.as_str(), FieldValue::Text(b.to_string())),
                Value::Array(items) => {
                    let strings: Vec<String> = items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect();
                    record.set(key.as_str(), FieldValue::List(strings));
                }
                Value::Null | Value::Object(_) => {}
            }
        }
        record
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.set(key, value);
        }
        record
    }
}

// =============================================================================
// Columns
// =============================================================================

/// A column definition: internal field key plus CSV header label.
///
/// The order of a column list defines column order in CSV output. On decode,
/// labels are matched against the header case-insensitively, not by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Column {
    /// Internal field key (record key, service column name).
    pub key: String,
    /// CSV header text.
    pub label: String,
}

impl Column {
    /// Create a column definition.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// The salon tables exposed through CSV transfer and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    /// Customer records.
    Customers,
    /// Staff members.
    Staff,
    /// Product inventory.
    Products,
    /// Completed sales (export and reporting only).
    Sales,
}

impl Entity {
    /// Every known entity.
    pub fn all() -> [Entity; 4] {
        [
            Entity::Customers,
            Entity::Staff,
            Entity::Products,
            Entity::Sales,
        ]
    }

    /// Column catalog for this entity, in CSV output order.
    pub fn columns(&self) -> Vec<Column> {
        match self {
            Entity::Customers => vec![
                Column::new("name", "Name"),
                Column::new("phone", "Phone"),
                Column::new("email", "Email"),
                Column::new("birthday", "Birthday"),
                Column::new("membership_type", "Membership Type"),
                Column::new("notes", "Notes"),
            ],
            Entity::Staff => vec![
                Column::new("name", "Name"),
                Column::new("role", "Role"),
                Column::new("phone", "Phone"),
                Column::new("hire_date", "Hire Date"),
                Column::new("specialties", "Specialties"),
            ],
            Entity::Products => vec![
                Column::new("name", "Product Name"),
                Column::new("category", "Category"),
                Column::new("price", "Price"),
                Column::new("stock", "Stock"),
                Column::new("supplier", "Supplier"),
            ],
            Entity::Sales => vec![
                Column::new("date", "Date"),
                Column::new("customer", "Customer"),
                Column::new("staff", "Staff"),
                Column::new("items", "Items"),
                Column::new("total", "Total"),
            ],
        }
    }

    /// Base name for export files (`{base}_{date}.csv`).
    pub fn base_name(&self) -> &'static str {
        match self {
            Entity::Customers => "customers",
            Entity::Staff => "staff",
            Entity::Products => "products",
            Entity::Sales => "sales",
        }
    }

    /// Table name on the data service.
    pub fn table(&self) -> &'static str {
        self.base_name()
    }

    /// Whether CSV import is offered for this entity. Sales rows are created
    /// by the application at checkout, never bulk-imported.
    pub fn importable(&self) -> bool {
        !matches!(self, Entity::Sales)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

impl FromStr for Entity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customers" | "customer" => Ok(Entity::Customers),
            "staff" => Ok(Entity::Staff),
            "products" | "product" => Ok(Entity::Products),
            "sales" | "sale" => Ok(Entity::Sales),
            other => Err(format!(
                "Unknown entity '{}' (expected customers, staff, products or sales)",
                other
            )),
        }
    }
}

// =============================================================================
// Membership Types
// =============================================================================

/// A membership plan offered by the salon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Plan identifier on the data service.
    pub id: String,
    /// Display label, denormalized onto the customer row.
    pub label: String,
    /// Points granted when a membership on this plan is created.
    pub grant_points: i64,
}

/// A membership row on the data service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    /// Row identifier.
    pub id: String,
    /// Owning customer.
    pub customer_id: String,
    /// Plan the membership is on.
    pub plan_id: String,
    /// Current point balance.
    pub points: i64,
    /// Whether this is the customer's active membership for the plan.
    pub active: bool,
}

/// Summary of a completed plan change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOutcome {
    /// Identifier of the newly created membership.
    pub membership_id: String,
    /// Points carried over from the old plan's membership.
    pub carried_points: i64,
    /// Points granted by the new plan.
    pub granted_points: i64,
    /// Initial balance of the new membership.
    pub starting_balance: i64,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_string_forms() {
        assert_eq!(FieldValue::Text("Ann".into()).to_field_string(), "Ann");
        assert_eq!(FieldValue::Number(30.0).to_field_string(), "30");
        assert_eq!(FieldValue::Number(40.5).to_field_string(), "40.5");
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(FieldValue::Date(date).to_field_string(), "2026-08-07");
        assert_eq!(
            FieldValue::List(vec!["cut".into(), "color".into()]).to_field_string(),
            "cut; color"
        );
    }

    #[test]
    fn test_infer() {
        assert_eq!(
            FieldValue::infer("2026-08-07"),
            FieldValue::Date(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
        );
        assert_eq!(FieldValue::infer("41"), FieldValue::Number(41.0));
        assert_eq!(FieldValue::infer("40.5"), FieldValue::Number(40.5));
        assert_eq!(
            FieldValue::infer("O'Brien, Sam"),
            FieldValue::Text("O'Brien, Sam".into())
        );
        // Not a real calendar date: falls through the chrono parse to text.
        assert_eq!(
            FieldValue::infer("2026-13-99"),
            FieldValue::Text("2026-13-99".into())
        );
        // Leading zero would be lost by numeric typing; stays text.
        assert_eq!(FieldValue::infer("0171"), FieldValue::Text("0171".into()));
    }

    #[test]
    fn test_record_preserves_order_and_replaces() {
        let mut record = Record::new();
        record.set("name", "Ann".into());
        record.set("age", "30".into());
        record.set("name", "Beth".into());

        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "age"]);
        assert_eq!(record.get("name"), Some(&FieldValue::Text("Beth".into())));
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_record_json_round() {
        let mut record = Record::new();
        record.set("name", "Ann".into());
        record.set("price", FieldValue::Number(12.5));
        let json = record.to_json();
        assert_eq!(json["name"], "Ann");
        assert_eq!(json["price"], 12.5);

        let back = Record::from_json(&json);
        assert_eq!(back.get("price"), Some(&FieldValue::Number(12.5)));
    }

    #[test]
    fn test_entity_parse() {
        assert_eq!("customers".parse::<Entity>(), Ok(Entity::Customers));
        assert_eq!(" Staff ".parse::<Entity>(), Ok(Entity::Staff));
        assert!("invoices".parse::<Entity>().is_err());
    }

    #[test]
    fn test_entity_catalogs() {
        for entity in Entity::all() {
            let columns = entity.columns();
            assert!(!columns.is_empty());
            // Keys and labels are unique within a catalog.
            for (i, a) in columns.iter().enumerate() {
                for b in columns.iter().skip(i + 1) {
                    assert_ne!(a.key, b.key);
                    assert_ne!(a.label.to_lowercase(), b.label.to_lowercase());
                }
            }
        }
        assert!(!Entity::Sales.importable());
        assert!(Entity::Customers.importable());
    }
}
