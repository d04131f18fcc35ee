//! REST API request and response types.
//!
//! All DTOs serialize camelCase for the web client.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{Plan, UpgradeOutcome};
use crate::reports::RevenueBucket;

/// Response after a CSV import request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// Unique job identifier.
    pub job_id: String,

    /// "imported" or "validated" (dry run).
    pub status: String,

    /// Entity the rows were imported into.
    pub entity: String,

    /// Rows inserted into the data service (0 on a dry run).
    pub imported: usize,

    /// Rows parsed from the file.
    pub parsed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// Validation outcome for the parsed rows.
    pub validation: ValidationStats,
}

/// Validation statistics for an import.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStats {
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<RowErrors>,
}

/// Validation errors for one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowErrors {
    /// 0-based index into the parsed rows.
    pub row_index: usize,
    pub errors: Vec<String>,
}

/// Request body for a membership plan change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRequest {
    /// Customer changing plans.
    pub customer_id: String,

    /// Plan the customer is leaving, if any.
    pub old_plan: Option<Plan>,

    /// Plan the customer is joining.
    pub new_plan: Plan,
}

/// Response after a membership plan change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResponse {
    /// Unique job identifier.
    pub job_id: String,

    /// Always "upgraded" on success.
    pub status: String,

    /// Carryover summary.
    pub outcome: UpgradeOutcome,
}

/// Response for a revenue report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    /// Grouping used: "day" or "month".
    pub by: String,

    /// Ordered revenue buckets.
    pub buckets: Vec<RevenueBucket>,

    /// Sale rows skipped as unparseable.
    pub skipped: usize,
}

/// Fresh job identifier for responses.
pub fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shared error payload.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": new_job_id(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_response_camel_case() {
        let response = ImportResponse {
            job_id: "j-1".into(),
            status: "imported".into(),
            entity: "customers".into(),
            imported: 2,
            parsed: 2,
            dry_run: false,
            validation: ValidationStats {
                valid: 2,
                invalid: 0,
                errors: vec![],
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"jobId\""));
        assert!(json.contains("\"dryRun\":false"));
    }

    #[test]
    fn test_upgrade_request_parses() {
        let body = r#"{
            "customerId": "c-1",
            "newPlan": { "id": "plan-gold", "label": "Gold", "grantPoints": 300 }
        }"#;
        let request: UpgradeRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.customer_id, "c-1");
        assert!(request.old_plan.is_none());
        assert_eq!(request.new_plan.grant_points, 300);
    }

    #[test]
    fn test_error_response_shape() {
        let payload = error_response("boom");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error"], "boom");
        assert!(payload["jobId"].is_string());
    }
}
