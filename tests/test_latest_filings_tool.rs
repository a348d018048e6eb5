//! Integration tests for the latest_filings tool
//!
//! Exercises the tool through the ToolSystem the way the MCP host does:
//! schema validation, record mapping, URL gating and report totals.


use fec_info_mcp::testing::fixtures::{committee_report, efile_row, envelope, sample_filings};
use fec_info_mcp::tools::ToolError;
use serde_json::json;
use test_helpers::test_tool_system;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_returns_one_record_per_upstream_row() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(sample_filings())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let result = tools.execute_tool("latest_filings", &json!({})).await.unwrap();

    assert_eq!(result["count"], 3);
    let filings = result["filings"].as_array().unwrap();
    assert_eq!(filings.len(), 3);

    let first = &filings[0];
    assert_eq!(first["committee_id"], "C00893149");
    assert_eq!(first["committee_name"], "COMMITTEE C00893149");
    assert_eq!(first["form_type"], "F3");
    assert_eq!(first["file_number"], 1_923_456);
    assert_eq!(first["receipt_date"], "2025-10-15T16:20:11");
    assert_eq!(first["coverage_end_date"], "2025-09-30");

    // URLs and totals are opt-in
    assert!(first.get("pdf_url").is_none());
    assert!(first.get("totals").is_none());
}

#[tokio::test]
async fn test_show_urls_includes_document_links() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![efile_row(
            "C00893149",
            "F3",
            1_923_456,
            "2025-10-15T16:20:11",
        )])))
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let result = tools
        .execute_tool("latest_filings", &json!({"limit": 1, "show_urls": true}))
        .await
        .unwrap();

    let record = &result["filings"][0];
    assert_eq!(record["pdf_url"], "https://docquery.fec.gov/pdf/1923456.pdf");
    assert_eq!(record["fec_url"], "https://docquery.fec.gov/dcdev/posted/1923456.fec");
    assert!(record["html_url"].is_string());
    assert!(record["csv_url"].is_string());
}

#[tokio::test]
async fn test_parameters_map_to_upstream_filters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .and(query_param("per_page", "5"))
        .and(query_param("sort", "receipt_date"))
        .and(query_param("committee_id", "C00401224"))
        .and(query_param("form_type", "F24"))
        .and(query_param("min_receipt_date", "2025-10-01"))
        .and(query_param("max_receipt_date", "2025-10-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let result = tools
        .execute_tool(
            "latest_filings",
            &json!({
                "limit": 5,
                "sort": "receipt_date",
                "committee": "C00401224",
                "form_type": "F24",
                "since": "2025-10-01",
                "until": "2025-10-15"
            }),
        )
        .await
        .unwrap();

    assert_eq!(result, json!({"count": 0, "filings": []}));
}

#[tokio::test]
async fn test_zero_limit_returns_empty_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(sample_filings())))
        .expect(0)
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let result = tools
        .execute_tool("latest_filings", &json!({"limit": 0}))
        .await
        .unwrap();

    assert_eq!(result["count"], 0);
    assert_eq!(result["filings"], json!([]));
}

#[tokio::test]
async fn test_invalid_arguments_rejected_before_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(sample_filings())))
        .expect(0)
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;

    let invalid_arguments = [
        json!({"limit": 101}),
        json!({"limit": -1}),
        json!({"limit": "ten"}),
        json!({"page": 2}),
        json!({"sort": "filed_date"}),
        json!({"since": "last tuesday"}),
        json!({"since": "2025-10-15", "until": "2025-10-01"}),
        json!({"committee": "C0089/../"}),
    ];

    for arguments in invalid_arguments {
        let result = tools.execute_tool("latest_filings", &arguments).await;
        assert!(
            matches!(result, Err(ToolError::ValidationError(_))),
            "expected validation error for {arguments}, got {result:?}"
        );
    }
}

#[tokio::test]
async fn test_upstream_failure_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let err = tools
        .execute_tool("latest_filings", &json!({"limit": 3}))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::NetworkError(_)));
    assert_eq!(err.kind(), "NetworkError");
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let err = tools
        .execute_tool("latest_filings", &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::ParseError(_)));
}

#[tokio::test]
async fn test_with_totals_enriches_f3_reports() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(sample_filings())))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/committee/C00893149/reports/"))
        .and(query_param("file_number", "1923456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![
            committee_report("C00893149", 1_923_456, 125000.0, 40000.5, 85000.0),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // F3X report not processed yet
    Mock::given(method("GET"))
        .and(path("/committee/C00703975/reports/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // F24 filings never trigger a lookup
    Mock::given(method("GET"))
        .and(path("/committee/C00401224/reports/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let result = tools
        .execute_tool("latest_filings", &json!({"with_totals": true}))
        .await
        .unwrap();

    let filings = result["filings"].as_array().unwrap();
    assert_eq!(
        filings[0]["totals"],
        json!({
            "total_receipts": 125000.0,
            "total_disbursements": 40000.5,
            "cash_on_hand_end_period": 85000.0
        })
    );
    assert!(filings[1].get("totals").is_none());
    assert!(filings[2].get("totals").is_none());
}

#[tokio::test]
async fn test_totals_failure_fails_the_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efile/filings/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(vec![efile_row(
            "C00893149",
            "F3",
            1_923_456,
            "2025-10-15T16:20:11",
        )])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/committee/C00893149/reports/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let tools = test_tool_system(&mock_server.uri()).await;
    let err = tools
        .execute_tool("latest_filings", &json!({"with_totals": true}))
        .await
        .unwrap_err();

    assert!(matches!(err, ToolError::NetworkError(_)));
}
