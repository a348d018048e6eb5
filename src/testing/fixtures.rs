//! OpenFEC response fixtures
//!
//! Shapes follow the live `/efile/filings/` and `/committee/{id}/reports/`
//! payloads, trimmed to the fields the crate reads.

use serde_json::{json, Value};

/// One `/efile/filings/` row
pub fn efile_row(committee_id: &str, form_type: &str, file_number: i64, receipt_date: &str) -> Value {
    json!({
        "committee_id": committee_id,
        "committee_name": format!("COMMITTEE {committee_id}"),
        "form_type": form_type,
        "file_number": file_number,
        "fec_file_id": format!("FEC-{file_number}"),
        "receipt_date": receipt_date,
        "filed_date": receipt_date.get(..10).unwrap_or(receipt_date),
        "coverage_start_date": "2025-07-01",
        "coverage_end_date": "2025-09-30",
        "load_timestamp": receipt_date,
        "amendment_number": 0,
        "amends_file": null,
        "beginning_image_number": format!("202510{file_number}"),
        "ending_image_number": format!("202510{file_number}"),
        "fec_url": format!("https://docquery.fec.gov/dcdev/posted/{file_number}.fec"),
        "pdf_url": format!("https://docquery.fec.gov/pdf/{file_number}.pdf"),
        "html_url": format!("https://docquery.fec.gov/cgi-bin/forms/{committee_id}/{file_number}/"),
        "csv_url": format!("https://docquery.fec.gov/csv/{file_number}.csv"),
        "sub_id": 4_100_000_000_i64 + file_number,
        "is_amended": false
    })
}

/// Paged envelope around `results`
pub fn envelope(results: Vec<Value>) -> Value {
    let count = results.len();
    json!({
        "api_version": "1.0",
        "pagination": {
            "page": 1,
            "pages": 1,
            "per_page": count.max(1),
            "count": count
        },
        "results": results
    })
}

/// Three filings, newest first
pub fn sample_filings() -> Vec<Value> {
    vec![
        efile_row("C00893149", "F3", 1_923_456, "2025-10-15T16:20:11"),
        efile_row("C00401224", "F24", 1_923_455, "2025-10-15T15:02:40"),
        efile_row("C00703975", "F3X", 1_923_454, "2025-10-15T11:47:03"),
    ]
}

/// One `/committee/{id}/reports/` row
pub fn committee_report(
    committee_id: &str,
    file_number: i64,
    receipts: f64,
    disbursements: f64,
    cash_on_hand: f64,
) -> Value {
    json!({
        "committee_id": committee_id,
        "form_type": "F3",
        "report_type_full": "OCTOBER QUARTERLY",
        "file_number": file_number,
        "total_receipts": receipts,
        "total_disbursements": disbursements,
        "cash_on_hand_end_period": cash_on_hand
    })
}
