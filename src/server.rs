//! Demo HTTP server: an upload form over the analyze pipeline.

use crate::domain::DepartmentStat;
use crate::error::AnalyzeError;
use crate::observability::metrics as obs;
use crate::pipeline::chart::ChartConfig;
use crate::pipeline::{Analysis, Analyzer};
use axum::{
    extract::{Extension, Multipart},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hyper::Server;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Bundled dataset backing the "try it now" path; embedded so it works
/// regardless of the working directory.
pub const SAMPLE_CSV: &str = include_str!("../sample_data.csv");

/// Success payload: the aggregate (as rendered HTML and as rows), the chart
/// as a base64 PNG for an `<img>` data URI, and the stats text.
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub table_html: String,
    pub aggregate: Vec<DepartmentStat>,
    pub chart_png_base64: String,
    pub summary_text: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hospital-load-analyzer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn metrics_text() -> Response {
    match obs::render_metrics() {
        Some(body) => body.into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

/// Multipart CSV upload; the file travels in a `file` field.
async fn analyze_upload(
    Extension(analyzer): Extension<Arc<Analyzer>>,
    mut multipart: Multipart,
) -> Response {
    let mut file_bytes: Option<Vec<u8>> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some("file") {
                    match field.bytes().await {
                        Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                        Err(e) => return request_error(format!("failed to read upload: {e}")),
                    }
                }
            }
            Ok(None) => break,
            Err(e) => return request_error(format!("malformed multipart body: {e}")),
        }
    }

    match file_bytes {
        Some(bytes) => run_analysis(&analyzer, &bytes),
        None => request_error("Please upload a CSV file or use the sample dataset.".to_string()),
    }
}

async fn analyze_sample(Extension(analyzer): Extension<Arc<Analyzer>>) -> Response {
    run_analysis(&analyzer, SAMPLE_CSV.as_bytes())
}

/// Runs the pipeline and maps the outcome onto the HTTP surface: schema
/// failures are the client's to fix (422), everything else is ours (500).
/// Either way the caller gets a displayable message plus a branchable kind.
fn run_analysis(analyzer: &Analyzer, bytes: &[u8]) -> Response {
    match analyzer.analyze(bytes) {
        Ok(analysis) => {
            info!(rows = analysis.aggregate.len(), "analysis request served");
            Json(to_response(&analysis)).into_response()
        }
        Err(e) => {
            let status = match &e {
                AnalyzeError::MissingColumns(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!(kind = e.kind(), "analysis failed: {}", e);
            (status, Json(ErrorResponse { error: e.to_string(), kind: e.kind() })).into_response()
        }
    }
}

fn request_error(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message, kind: "request" })).into_response()
}

fn to_response(analysis: &Analysis) -> AnalyzeResponse {
    AnalyzeResponse {
        table_html: render_table_html(&analysis.aggregate),
        aggregate: analysis.aggregate.clone(),
        chart_png_base64: BASE64.encode(&analysis.chart_png),
        summary_text: analysis.summary.render_text(),
    }
}

/// HTML rendering of the aggregate, the counts-table pane of the form.
fn render_table_html(stats: &[DepartmentStat]) -> String {
    let mut html = String::from(
        "<table class=\"counts\">\n\
         <thead><tr><th>department</th><th>patient_count</th><th>percentage</th></tr></thead>\n\
         <tbody>\n",
    );
    for stat in stats {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            escape_html(&stat.department),
            stat.patient_count,
            stat.percentage
        ));
    }
    html.push_str("</tbody>\n</table>");
    html
}

fn escape_html(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Create the HTTP server with all routes
pub fn create_server(analyzer: Arc<Analyzer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/analyze", post(analyze_upload))
        .route("/sample", get(analyze_sample))
        .layer(Extension(analyzer))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified host and port
pub async fn start_server(host: &str, port: u16, chart: ChartConfig) -> anyhow::Result<()> {
    obs::init_metrics();

    let analyzer = Arc::new(Analyzer::new(chart));
    let app = create_server(analyzer);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    println!("🏥 Hospital analyzer running on http://{addr}");
    println!("💚 Health check: http://{addr}/health");
    println!("📈 Metrics:      http://{addr}/metrics");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Hospital Department Load Analysis</title>
    <style>
      body { font-family: sans-serif; max-width: 1100px; margin: 24px auto; padding: 0 16px; }
      .row { display: flex; gap: 24px; flex-wrap: wrap; margin-top: 16px; }
      .pane { flex: 1 1 320px; }
      table.counts { border-collapse: collapse; }
      table.counts th, table.counts td { border: 1px solid #999; padding: 4px 10px; }
      pre { background: #f4f4f4; padding: 12px; }
      .error { color: #b00020; }
      img { max-width: 100%; }
    </style>
  </head>
  <body>
    <h1>🏥 Hospital Department Load Analysis</h1>
    <p>Upload a CSV or click <strong>Use Sample Data</strong> to try the app instantly.</p>
    <form id="upload-form">
      <input type="file" id="file" name="file" accept=".csv" />
      <button type="submit">Analyze Uploaded File</button>
      <button type="button" id="sample">Use Sample Data</button>
    </form>
    <p id="error" class="error"></p>
    <div class="row">
      <div class="pane"><h2>Counts table</h2><div id="table"></div></div>
      <div class="pane"><h2>Bar chart</h2><img id="chart" alt="" /></div>
      <div class="pane"><h2>Stats report</h2><pre id="stats"></pre></div>
    </div>
    <script>
      const errorEl = document.getElementById('error');
      function show(data) {
        errorEl.textContent = '';
        document.getElementById('table').innerHTML = data.table_html;
        document.getElementById('chart').src = 'data:image/png;base64,' + data.chart_png_base64;
        document.getElementById('stats').textContent = data.summary_text;
      }
      async function handle(response) {
        const data = await response.json();
        if (response.ok) { show(data); } else { errorEl.textContent = 'Error: ' + data.error; }
      }
      document.getElementById('upload-form').addEventListener('submit', async (event) => {
        event.preventDefault();
        const file = document.getElementById('file').files[0];
        if (!file) { errorEl.textContent = 'Please upload a CSV file or use the sample dataset.'; return; }
        const body = new FormData();
        body.append('file', file);
        handle(await fetch('/analyze', { method: 'POST', body }));
      });
      document.getElementById('sample').addEventListener('click', async () => {
        handle(await fetch('/sample'));
      });
    </script>
  </body>
</html>"##;
