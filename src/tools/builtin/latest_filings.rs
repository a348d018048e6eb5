//! `latest_filings` tool
//!
//! Returns the most recent e-filings from OpenFEC as simplified records,
//! optionally enriched with processed report totals for F3-family reports.

use crate::openfec::{
    FilingRecord, FilingTotals, FilingsQuery, LatestFilings, OpenFecClient, OpenFecConfig,
    SortOrder,
};
use crate::tools::{Tool, ToolDescription, ToolError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const TOOL_NAME: &str = "latest_filings";

/// OpenFEC caps page size at 100
pub const MAX_LIMIT: u32 = 100;

const DEFAULT_LIMIT: u32 = 10;

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

/// Parameters for the latest_filings tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LatestFilingsParams {
    /// Maximum number of filings to return (0-100). Zero returns an empty list.
    #[serde(default = "default_limit")]
    #[schemars(range(min = 0, max = 100))]
    pub limit: u32,

    /// Sort by receipt date: "-receipt_date" for newest first, "receipt_date" for oldest first.
    #[serde(default)]
    pub sort: SortOrder,

    /// Only filings from this committee id, e.g. "C00893149".
    pub committee: Option<String>,

    /// Only this form type, e.g. "F3", "F3X" or "F99". Prefixes match server-side.
    pub form_type: Option<String>,

    /// Minimum receipt date (YYYY-MM-DD or ISO datetime).
    pub since: Option<String>,

    /// Maximum receipt date (YYYY-MM-DD or ISO datetime).
    pub until: Option<String>,

    /// Include fec/pdf/html/csv document URLs when available.
    #[serde(default)]
    pub show_urls: bool,

    /// Attach processed report totals to F3-family filings. Costs one extra request per filing.
    #[serde(default)]
    pub with_totals: bool,
}

impl Default for LatestFilingsParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            sort: SortOrder::default(),
            committee: None,
            form_type: None,
            since: None,
            until: None,
            show_urls: false,
            with_totals: false,
        }
    }
}

impl LatestFilingsParams {
    /// JSON schema advertised to clients and enforced before execution
    pub fn input_schema() -> Value {
        let generator = SchemaSettings::draft07()
            .with(|s| s.inline_subschemas = true)
            .into_generator();
        let schema = generator.into_root_schema_for::<LatestFilingsParams>();
        serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
    }

    /// Semantic checks the schema cannot express (pure function)
    pub fn validate(&self, max_limit: u32) -> Result<(), ToolError> {
        if self.limit > max_limit {
            return Err(ToolError::ValidationError(format!(
                "limit {} exceeds maximum {max_limit}",
                self.limit
            )));
        }

        if let Some(committee) = &self.committee {
            if committee.is_empty() || !committee.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ToolError::ValidationError(format!(
                    "committee must be an alphanumeric FEC id, got '{committee}'"
                )));
            }
        }

        let since = self
            .since
            .as_deref()
            .map(|s| parse_receipt_date("since", s))
            .transpose()?;
        let until = self
            .until
            .as_deref()
            .map(|s| parse_receipt_date("until", s))
            .transpose()?;

        if let (Some(since), Some(until)) = (since, until) {
            if since > until {
                return Err(ToolError::ValidationError(
                    "since must not be after until".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Map tool parameters onto the upstream query (pure function)
    pub fn to_query(&self) -> FilingsQuery {
        FilingsQuery {
            limit: self.limit,
            sort: self.sort,
            committee_id: self.committee.clone(),
            form_type: self.form_type.clone(),
            min_receipt_date: self.since.clone(),
            max_receipt_date: self.until.clone(),
        }
    }
}

/// Accepts YYYY-MM-DD, naive ISO datetimes and RFC 3339 (pure function)
fn parse_receipt_date(field: &str, value: &str) -> Result<NaiveDateTime, ToolError> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(datetime);
        }
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.naive_utc());
    }

    Err(ToolError::ValidationError(format!(
        "{field} must be YYYY-MM-DD or an ISO datetime, got '{value}'"
    )))
}

/// Latest e-filings tool - builtin implementation
pub struct LatestFilingsTool {
    openfec: OpenFecConfig,
    client: Option<OpenFecClient>,
    max_limit: u32,
}

impl LatestFilingsTool {
    pub fn new(openfec: OpenFecConfig) -> Self {
        Self {
            openfec,
            client: None,
            max_limit: MAX_LIMIT,
        }
    }

    /// Extract `max_limit` from tool config, clamped to the API maximum
    /// (pure function)
    fn extract_max_limit(config: Option<&Value>) -> u32 {
        config
            .and_then(|c| c.get("max_limit"))
            .and_then(|v| v.as_u64())
            .map(|v| v.min(MAX_LIMIT as u64) as u32)
            .unwrap_or(MAX_LIMIT)
    }

    async fn attach_totals(
        client: &OpenFecClient,
        records: &mut [FilingRecord],
    ) -> Result<(), ToolError> {
        for record in records.iter_mut() {
            let Some((committee_id, file_number)) = record
                .totals_key()
                .map(|(id, number)| (id.to_string(), number))
            else {
                continue;
            };

            match client.report_totals(&committee_id, file_number).await? {
                Some(report) => record.totals = Some(FilingTotals::from(&report)),
                None => debug!(
                    committee_id = %committee_id,
                    file_number,
                    "Report not processed yet, no totals"
                ),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Tool for LatestFilingsTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: TOOL_NAME.to_string(),
            description: "Retrieve the most recent electronic filings submitted to the FEC, \
                newest first. Filter by committee, form type or receipt date range; \
                optionally include document URLs and processed report totals."
                .to_string(),
            parameters: LatestFilingsParams::input_schema(),
        }
    }

    async fn initialize(&mut self, config: Option<&Value>) -> Result<(), ToolError> {
        self.max_limit = Self::extract_max_limit(config);
        self.client = Some(OpenFecClient::new(self.openfec.clone())?);
        Ok(())
    }

    async fn execute(&self, parameters: &Value) -> Result<Value, ToolError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| ToolError::ExecutionError("Tool not initialized".to_string()))?;

        let params: LatestFilingsParams = serde_json::from_value(parameters.clone())
            .map_err(|e| ToolError::ValidationError(e.to_string()))?;
        params.validate(self.max_limit)?;

        let rows = client.latest_filings(&params.to_query()).await?;

        let mut records: Vec<FilingRecord> = rows
            .iter()
            .map(|row| FilingRecord::from_efile(row, params.show_urls))
            .collect();

        if params.with_totals {
            Self::attach_totals(client, &mut records).await?;
        }

        serde_json::to_value(LatestFilings::new(records))
            .map_err(|e| ToolError::ExecutionError(format!("Failed to serialize result: {e}")))
    }

    async fn shutdown(&mut self) -> Result<(), ToolError> {
        self.client = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_creation() {
        let tool = LatestFilingsTool::new(OpenFecConfig::default());
        assert!(tool.client.is_none());
        assert_eq!(tool.max_limit, MAX_LIMIT);
    }

    #[test]
    fn test_tool_description() {
        let tool = LatestFilingsTool::new(OpenFecConfig::default());
        let description = tool.describe();

        assert_eq!(description.name, "latest_filings");
        assert!(!description.description.is_empty());
        assert_eq!(description.parameters["type"], "object");
        assert_eq!(description.parameters["additionalProperties"], false);

        let properties = &description.parameters["properties"];
        for key in [
            "limit",
            "sort",
            "committee",
            "form_type",
            "since",
            "until",
            "show_urls",
            "with_totals",
        ] {
            assert!(properties[key].is_object(), "missing property {key}");
        }
        assert_eq!(properties["limit"]["default"], 10);
    }

    #[test]
    fn test_schema_has_no_required_parameters() {
        let schema = LatestFilingsParams::input_schema();
        let required = schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|r| r.len())
            .unwrap_or(0);
        assert_eq!(required, 0);
    }

    #[test]
    fn test_params_defaults_from_empty_object() {
        let params: LatestFilingsParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params, LatestFilingsParams::default());
        assert_eq!(params.limit, 10);
        assert_eq!(params.sort, SortOrder::NewestFirst);
    }

    #[test]
    fn test_params_reject_unknown_fields() {
        let result: Result<LatestFilingsParams, _> =
            serde_json::from_value(json!({"pages": 3}));
        assert!(result.is_err());
    }

    #[test]
    fn test_params_to_query() {
        let params: LatestFilingsParams = serde_json::from_value(json!({
            "limit": 25,
            "sort": "receipt_date",
            "committee": "C00893149",
            "form_type": "F3X",
            "since": "2025-09-01",
            "until": "2025-09-30T23:59:59"
        }))
        .unwrap();

        let query = params.to_query();
        assert_eq!(query.limit, 25);
        assert_eq!(query.sort, SortOrder::OldestFirst);
        assert_eq!(query.committee_id.as_deref(), Some("C00893149"));
        assert_eq!(query.form_type.as_deref(), Some("F3X"));
        assert_eq!(query.min_receipt_date.as_deref(), Some("2025-09-01"));
        assert_eq!(query.max_receipt_date.as_deref(), Some("2025-09-30T23:59:59"));
    }

    #[test]
    fn test_validate_limit_against_max() {
        let params = LatestFilingsParams {
            limit: 50,
            ..Default::default()
        };
        assert!(params.validate(100).is_ok());
        assert!(matches!(
            params.validate(20),
            Err(ToolError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_limit_is_allowed() {
        let params = LatestFilingsParams {
            limit: 0,
            ..Default::default()
        };
        assert!(params.validate(MAX_LIMIT).is_ok());
    }

    #[test]
    fn test_validate_dates() {
        let ok = LatestFilingsParams {
            since: Some("2025-09-01".to_string()),
            until: Some("2025-09-21T13:40:55Z".to_string()),
            ..Default::default()
        };
        assert!(ok.validate(MAX_LIMIT).is_ok());

        let malformed = LatestFilingsParams {
            since: Some("09/01/2025".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            malformed.validate(MAX_LIMIT),
            Err(ToolError::ValidationError(_))
        ));

        let inverted = LatestFilingsParams {
            since: Some("2025-10-01".to_string()),
            until: Some("2025-09-01".to_string()),
            ..Default::default()
        };
        assert!(inverted.validate(MAX_LIMIT).is_err());
    }

    #[test]
    fn test_validate_committee_id() {
        let bad = LatestFilingsParams {
            committee: Some("C0089/../x".to_string()),
            ..Default::default()
        };
        assert!(bad.validate(MAX_LIMIT).is_err());
    }

    #[test]
    fn test_extract_max_limit() {
        assert_eq!(LatestFilingsTool::extract_max_limit(None), MAX_LIMIT);
        assert_eq!(
            LatestFilingsTool::extract_max_limit(Some(&json!({"max_limit": 25}))),
            25
        );
        // Never above what OpenFEC accepts
        assert_eq!(
            LatestFilingsTool::extract_max_limit(Some(&json!({"max_limit": 1000}))),
            MAX_LIMIT
        );
    }

    #[tokio::test]
    async fn test_execute_before_initialize_fails() {
        let tool = LatestFilingsTool::new(OpenFecConfig::default());
        let result = tool.execute(&json!({})).await;
        assert!(matches!(result, Err(ToolError::ExecutionError(_))));
    }

    #[tokio::test]
    async fn test_initialize_rejects_empty_api_key() {
        let mut tool = LatestFilingsTool::new(OpenFecConfig {
            api_key: String::new(),
            ..Default::default()
        });
        let result = tool.initialize(None).await;
        assert!(matches!(result, Err(ToolError::InitializationError(_))));
    }
}
