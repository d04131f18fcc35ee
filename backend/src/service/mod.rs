//! Client for the hosted data service.
//!
//! All persistent salon data lives in a managed Postgres-compatible service
//! exposing PostgREST-style query endpoints. This client covers the three
//! operations the backend needs (fetch, insert, update) plus the
//! [`MembershipStore`] operations for plan changes. Every call is a single
//! attempt: a failure surfaces as a [`ServiceError`] and is never retried.
//!
//! Configuration comes from `SALON_SERVICE_URL` and `SALON_SERVICE_KEY`
//! (loaded through `.env` when present).

use serde_json::{json, Map, Value};
use std::env;

use crate::error::{ServiceError, ServiceResult};
use crate::membership::MembershipStore;
use crate::models::{Entity, FieldValue, MembershipRecord, Record};

/// HTTP client for the hosted data service.
#[derive(Clone)]
pub struct DataServiceClient {
    base_url: String,
    service_key: String,
    http: reqwest::Client,
}

impl DataServiceClient {
    /// Create a client with explicit connection settings.
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from `SALON_SERVICE_URL` / `SALON_SERVICE_KEY`.
    pub fn from_env() -> ServiceResult<Self> {
        let _ = dotenvy::dotenv();

        let base_url = env::var("SALON_SERVICE_URL")
            .map_err(|_| ServiceError::MissingCredentials("SALON_SERVICE_URL"))?;
        let service_key = env::var("SALON_SERVICE_KEY")
            .map_err(|_| ServiceError::MissingCredentials("SALON_SERVICE_KEY"))?;

        Ok(Self::new(base_url, service_key))
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ServiceResult<String> {
        let response = request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ServiceError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// Fetch rows from a table with PostgREST query parameters.
    pub async fn fetch_rows(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> ServiceResult<Vec<Value>> {
        let request = self.http.get(self.endpoint(table)).query(query);
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }

    /// Insert one row, returning the stored representation.
    pub async fn insert_row(&self, table: &str, row: &Value) -> ServiceResult<Value> {
        let request = self
            .http
            .post(self.endpoint(table))
            .header("Prefer", "return=representation")
            .json(row);
        let body = self.send(request).await?;

        let rows: Vec<Value> = serde_json::from_str(&body)
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ServiceError::InvalidResponse("empty insert representation".into()))
    }

    /// Patch every row matching the filter.
    pub async fn update_rows(
        &self,
        table: &str,
        filter: &[(&str, &str)],
        patch: &Value,
    ) -> ServiceResult<()> {
        let request = self
            .http
            .patch(self.endpoint(table))
            .query(filter)
            .json(patch);
        self.send(request).await?;
        Ok(())
    }

    /// Fetch every row of an entity's table as records.
    pub async fn fetch_entity(&self, entity: Entity) -> ServiceResult<Vec<Record>> {
        let rows = self
            .fetch_rows(entity.table(), &[("select", "*")])
            .await?;
        Ok(rows.iter().map(Record::from_json).collect())
    }

    /// Insert one imported record into an entity's table.
    ///
    /// Decoded CSV values are all text; each field is typed through
    /// [`FieldValue::infer`] so dates and numbers land in the service as
    /// dates and numbers.
    pub async fn insert_record(&self, entity: Entity, record: &Record) -> ServiceResult<()> {
        self.insert_row(entity.table(), &typed_insert_json(record))
            .await?;
        Ok(())
    }
}

/// PostgREST equality filter value.
fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

/// JSON body for inserting a decoded record, with text fields re-typed.
fn typed_insert_json(record: &Record) -> Value {
    let mut obj = Map::new();
    for (key, value) in record.iter() {
        let typed = match value {
            FieldValue::Text(s) => FieldValue::infer(s).to_json(),
            other => other.to_json(),
        };
        obj.insert(key.to_string(), typed);
    }
    Value::Object(obj)
}

/// Read a row field as a string, accepting string or numeric ids.
fn field_string(row: &Value, key: &str) -> ServiceResult<String> {
    match &row[key] {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(ServiceError::InvalidResponse(format!(
            "missing field '{}' in service row",
            key
        ))),
    }
}

fn membership_from_row(row: &Value) -> ServiceResult<MembershipRecord> {
    Ok(MembershipRecord {
        id: field_string(row, "id")?,
        customer_id: field_string(row, "customer_id")?,
        plan_id: field_string(row, "plan_id")?,
        points: row["points"].as_i64().unwrap_or(0),
        active: row["active"].as_bool().unwrap_or(false),
    })
}

impl MembershipStore for DataServiceClient {
    async fn active_membership(
        &self,
        customer_id: &str,
        plan_id: &str,
    ) -> ServiceResult<Option<MembershipRecord>> {
        let rows = self
            .fetch_rows(
                "memberships",
                &[
                    ("customer_id", eq_filter(customer_id).as_str()),
                    ("plan_id", eq_filter(plan_id).as_str()),
                    ("active", "is.true"),
                    ("limit", "1"),
                ],
            )
            .await?;

        rows.first().map(membership_from_row).transpose()
    }

    async fn deactivate_membership(&self, membership_id: &str) -> ServiceResult<()> {
        self.update_rows(
            "memberships",
            &[("id", eq_filter(membership_id).as_str())],
            &json!({ "active": false }),
        )
        .await
    }

    async fn create_membership(
        &self,
        customer_id: &str,
        plan_id: &str,
        points: i64,
    ) -> ServiceResult<MembershipRecord> {
        let row = self
            .insert_row(
                "memberships",
                &json!({
                    "customer_id": customer_id,
                    "plan_id": plan_id,
                    "points": points,
                    "active": true,
                }),
            )
            .await?;
        membership_from_row(&row)
    }

    async fn set_customer_plan_label(&self, customer_id: &str, label: &str) -> ServiceResult<()> {
        self.update_rows(
            "customers",
            &[("id", eq_filter(customer_id).as_str())],
            &json!({ "membership_type": label }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let client = DataServiceClient::new("https://db.example.com/", "key");
        assert_eq!(
            client.endpoint("customers"),
            "https://db.example.com/rest/v1/customers"
        );
    }

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq_filter("c-1"), "eq.c-1");
    }

    #[test]
    fn test_typed_insert_json() {
        let mut record = Record::new();
        record.set("name", "Ann".into());
        record.set("birthday", "1990-04-12".into());
        record.set("price", "40.5".into());

        let body = typed_insert_json(&record);
        assert_eq!(body["name"], "Ann");
        assert_eq!(body["birthday"], "1990-04-12");
        assert_eq!(body["price"], 40.5);
    }

    #[test]
    fn test_membership_from_row() {
        let row = json!({
            "id": 7,
            "customer_id": "c-1",
            "plan_id": "plan-gold",
            "points": 120,
            "active": true,
        });
        let membership = membership_from_row(&row).unwrap();
        assert_eq!(membership.id, "7");
        assert_eq!(membership.points, 120);
        assert!(membership.active);

        let bad = json!({ "customer_id": "c-1" });
        assert!(membership_from_row(&bad).is_err());
    }
}
