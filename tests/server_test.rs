use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use hospital_analyzer::pipeline::chart::ChartConfig;
use hospital_analyzer::pipeline::Analyzer;
use hospital_analyzer::server::create_server;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    create_server(Arc::new(Analyzer::new(ChartConfig { width: 320, height: 240 })))
}

fn multipart_csv(boundary: &str, csv: &str) -> String {
    format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"visits.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{boundary}--\r\n"
    )
}

async fn body_json(response: axum::response::Response) -> Result<serde_json::Value> {
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_reports_ok() -> Result<()> {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await?;
    assert_eq!(json["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn index_serves_the_upload_form() -> Result<()> {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    let html = String::from_utf8(bytes.to_vec())?;
    assert!(html.contains("Use Sample Data"));
    assert!(html.contains("/analyze"));
    Ok(())
}

#[tokio::test]
async fn sample_endpoint_returns_full_analysis() -> Result<()> {
    let response = app()
        .oneshot(Request::builder().uri("/sample").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await?;
    assert!(json["table_html"].as_str().unwrap().contains("<table"));
    assert!(!json["chart_png_base64"].as_str().unwrap().is_empty());
    assert!(json["summary_text"].as_str().unwrap().contains("Total patients:"));
    assert!(json["aggregate"].as_array().unwrap().len() > 1);
    Ok(())
}

#[tokio::test]
async fn upload_returns_the_three_outputs() -> Result<()> {
    let boundary = "X-ANALYZER-BOUNDARY";
    let csv = "department,patient_id,visit_date\nER,P1,2024-01-01\nICU,P2,2024-01-02\n";
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(multipart_csv(boundary, csv)))?;

    let response = app().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await?;
    assert_eq!(json["aggregate"].as_array().unwrap().len(), 2);
    assert!(json["summary_text"].as_str().unwrap().contains("Total visits: 2"));
    Ok(())
}

#[tokio::test]
async fn missing_columns_map_to_a_schema_error() -> Result<()> {
    let boundary = "X-ANALYZER-BOUNDARY";
    let csv = "department,visit_date\nER,2024-01-01\n";
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(multipart_csv(boundary, csv)))?;

    let response = app().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await?;
    assert_eq!(json["kind"], "schema");
    assert!(json["error"].as_str().unwrap().contains("patient_id"));
    Ok(())
}

#[tokio::test]
async fn upload_without_a_file_field_is_rejected() -> Result<()> {
    let boundary = "X-ANALYZER-BOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))?;

    let response = app().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await?;
    assert_eq!(json["kind"], "request");
    Ok(())
}
