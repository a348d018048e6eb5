//! OpenFEC payload types and the simplified records handed to agents

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Standard OpenFEC response envelope
///
/// Every list endpoint wraps its rows in this shape. Unknown fields are
/// ignored; a missing or null `results` is treated as an empty page.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub results: Option<Vec<T>>,
    pub pagination: Option<Pagination>,
    pub api_version: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub pages: Option<u32>,
    pub per_page: Option<u32>,
    pub count: Option<u64>,
}

/// Sort order for the e-filing listing, serialized as OpenFEC's `sort` value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SortOrder {
    /// Most recently received first
    #[default]
    #[serde(rename = "-receipt_date")]
    NewestFirst,
    /// Oldest received first
    #[serde(rename = "receipt_date")]
    OldestFirst,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "-receipt_date",
            SortOrder::OldestFirst => "receipt_date",
        }
    }
}

/// Query for `GET /efile/filings/`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilingsQuery {
    /// Page size and hard cap on returned rows
    pub limit: u32,
    pub sort: SortOrder,
    pub committee_id: Option<String>,
    pub form_type: Option<String>,
    pub min_receipt_date: Option<String>,
    pub max_receipt_date: Option<String>,
}

impl FilingsQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Query string pairs, excluding the API key (pure function)
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("sort", self.sort.as_param().to_string()),
            ("per_page", self.limit.to_string()),
        ];

        let optional = [
            ("committee_id", &self.committee_id),
            ("form_type", &self.form_type),
            ("min_receipt_date", &self.min_receipt_date),
            ("max_receipt_date", &self.max_receipt_date),
        ];
        for (key, value) in optional {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }

        pairs
    }
}

/// Raw e-filing row as returned by OpenFEC
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EfileFiling {
    pub committee_id: Option<String>,
    pub committee_name: Option<String>,
    pub form_type: Option<String>,
    pub file_number: Option<i64>,
    pub fec_file_id: Option<String>,
    pub receipt_date: Option<String>,
    pub filed_date: Option<String>,
    pub coverage_start_date: Option<String>,
    pub coverage_end_date: Option<String>,
    pub load_timestamp: Option<String>,
    pub amendment_number: Option<i64>,
    pub amends_file: Option<i64>,
    pub beginning_image_number: Option<String>,
    pub ending_image_number: Option<String>,
    pub fec_url: Option<String>,
    pub pdf_url: Option<String>,
    pub html_url: Option<String>,
    pub csv_url: Option<String>,
}

/// Processed report row from `GET /committee/{id}/reports/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitteeReport {
    pub committee_id: Option<String>,
    pub form_type: Option<String>,
    pub report_type_full: Option<String>,
    pub file_number: Option<i64>,
    pub total_receipts: Option<f64>,
    pub total_disbursements: Option<f64>,
    pub cash_on_hand_end_period: Option<f64>,
}

/// Processed totals attached to an F3-family filing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingTotals {
    pub total_receipts: f64,
    pub total_disbursements: f64,
    pub cash_on_hand_end_period: f64,
}

impl From<&CommitteeReport> for FilingTotals {
    fn from(report: &CommitteeReport) -> Self {
        Self {
            total_receipts: report.total_receipts.unwrap_or(0.0),
            total_disbursements: report.total_disbursements.unwrap_or(0.0),
            cash_on_hand_end_period: report.cash_on_hand_end_period.unwrap_or(0.0),
        }
    }
}

/// Simplified filing returned to the agent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingRecord {
    pub committee_id: Option<String>,
    pub committee_name: Option<String>,
    pub form_type: Option<String>,
    pub file_number: Option<i64>,
    pub fec_file_id: Option<String>,
    pub receipt_date: Option<String>,
    pub filed_date: Option<String>,
    pub coverage_start_date: Option<String>,
    pub coverage_end_date: Option<String>,
    pub load_timestamp: Option<String>,
    pub amendment_number: Option<i64>,
    pub amends_file: Option<i64>,
    pub beginning_image_number: Option<String>,
    pub ending_image_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fec_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<FilingTotals>,
}

impl FilingRecord {
    /// Project an upstream row onto the agent-facing record (pure function)
    pub fn from_efile(filing: &EfileFiling, show_urls: bool) -> Self {
        let mut record = Self {
            committee_id: filing.committee_id.clone(),
            committee_name: filing.committee_name.clone(),
            form_type: filing.form_type.clone(),
            file_number: filing.file_number,
            fec_file_id: filing.fec_file_id.clone(),
            receipt_date: filing.receipt_date.clone(),
            filed_date: filing.filed_date.clone(),
            coverage_start_date: filing.coverage_start_date.clone(),
            coverage_end_date: filing.coverage_end_date.clone(),
            load_timestamp: filing.load_timestamp.clone(),
            amendment_number: filing.amendment_number,
            amends_file: filing.amends_file,
            beginning_image_number: filing.beginning_image_number.clone(),
            ending_image_number: filing.ending_image_number.clone(),
            ..Default::default()
        };

        if show_urls {
            record.fec_url = filing.fec_url.clone();
            record.pdf_url = filing.pdf_url.clone();
            record.html_url = filing.html_url.clone();
            record.csv_url = filing.csv_url.clone();
        }

        record
    }

    /// Committee id and file number, when this is an F3-family report
    /// whose processed totals can be looked up
    pub fn totals_key(&self) -> Option<(&str, i64)> {
        let is_f3 = self
            .form_type
            .as_deref()
            .map(|f| f.to_ascii_uppercase().starts_with("F3"))
            .unwrap_or(false);
        if !is_f3 {
            return None;
        }
        match (self.committee_id.as_deref(), self.file_number) {
            (Some(committee_id), Some(file_number)) if !committee_id.is_empty() => {
                Some((committee_id, file_number))
            }
            _ => None,
        }
    }
}

/// Tool result payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestFilings {
    pub count: usize,
    pub filings: Vec<FilingRecord>,
}

impl LatestFilings {
    pub fn new(filings: Vec<FilingRecord>) -> Self {
        Self {
            count: filings.len(),
            filings,
        }
    }
}
