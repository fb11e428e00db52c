//! Kind-specific document bodies.
//!
//! The workflow treats payloads as opaque JSON; they are only checked once,
//! on submission, then stored as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::document::DocumentKind;
use crate::error::WorkflowError;

/// Body of a goods-receipt report (BAPB).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BapbPayload {
    /// Purchase order the delivery fulfils.
    #[validate(length(min = 1, max = 100))]
    pub order_number: String,
    pub delivery_date: NaiveDate,
    #[validate(length(min = 1, message = "at least one item is required"), nested)]
    pub items: Vec<BapbItem>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BapbItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[validate(length(min = 1, max = 20))]
    pub unit: String,
    /// Condition on arrival, e.g. "baik" / "rusak".
    pub condition: Option<String>,
}

/// Body of a work-completion report (BAPP).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_work_period"))]
pub struct BappPayload {
    #[validate(length(min = 1, max = 100))]
    pub contract_number: String,
    #[validate(length(min = 1, max = 200))]
    pub project_name: String,
    pub work_period_start: Option<NaiveDate>,
    pub work_period_end: Option<NaiveDate>,
    #[validate(length(min = 1, message = "at least one work detail is required"), nested)]
    pub work_details: Vec<WorkDetail>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub attachment_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WorkDetail {
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(range(min = 0, max = 100))]
    pub progress_pct: i32,
}

fn validate_work_period(payload: &BappPayload) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (payload.work_period_start, payload.work_period_end) {
        if end < start {
            return Err(ValidationError::new("work_period")
                .with_message("work_period_end must not be before work_period_start".into()));
        }
    }
    Ok(())
}

/// Parse `raw` as the payload for `kind`, validate it, and return the
/// normalised JSON to store.
pub fn validate_payload(
    kind: DocumentKind,
    raw: serde_json::Value,
) -> Result<serde_json::Value, WorkflowError> {
    match kind {
        DocumentKind::Bapb => check::<BapbPayload>(raw),
        DocumentKind::Bapp => check::<BappPayload>(raw),
    }
}

fn check<T>(raw: serde_json::Value) -> Result<serde_json::Value, WorkflowError>
where
    T: for<'de> Deserialize<'de> + Serialize + Validate,
{
    let parsed: T = serde_json::from_value(raw)
        .map_err(|e| WorkflowError::Validation(format!("invalid payload: {e}")))?;
    parsed
        .validate()
        .map_err(|e| WorkflowError::Validation(e.to_string()))?;
    serde_json::to_value(&parsed)
        .map_err(|e| WorkflowError::Validation(format!("invalid payload: {e}")))
}
