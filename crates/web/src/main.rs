//! Churn Lab web UI
//!
//! One page with a sidebar and three checkbox-gated panels: raw data
//! preview, metrics summary, and a manual prediction form. Every
//! interaction runs the full pipeline (memoized); any failure aborts the
//! interaction and surfaces as an HTTP error instead of partial panels.

mod cache;
mod pipeline;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Form, Router,
};
use churnlab_core::dataset::{COL_GENDER, COL_INTERNET, COL_PAYMENT, COL_SENIOR};
use churnlab_core::{ChurnError, CustomerInput};
use churnlab_trainer::{GbdtConfig, DEFAULT_SEED};
use clap::Parser;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::MemoCache;
use crate::pipeline::{PipelineConfig, PipelineOutput};

#[derive(Parser)]
#[command(name = "churnlab-web")]
#[command(about = "Customer churn demo UI")]
#[command(version)]
struct Cli {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Customer CSV path
    #[arg(long, default_value = "data/churn-demo.csv")]
    dataset: PathBuf,

    /// Model artifact path
    #[arg(long, default_value = "models/churn.json")]
    artifact: PathBuf,
}

struct AppState {
    config: PipelineConfig,
    cache: MemoCache<PipelineOutput>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let state = Arc::new(AppState {
        config: PipelineConfig {
            dataset_path: cli.dataset,
            artifact_path: cli.artifact,
            trainer: GbdtConfig::default(),
            split_seed: DEFAULT_SEED,
        },
        cache: MemoCache::new(),
    });

    match pipeline::warm_from_artifact(&state.config, &state.cache) {
        Ok(true) => tracing::info!("reusing persisted model artifact"),
        Ok(false) => tracing::info!("no reusable artifact, first interaction will train"),
        Err(err) => tracing::warn!(%err, "failed to inspect persisted artifact"),
    }

    let app = Router::new()
        .route("/", get(index))
        .route("/classify", post(classify))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", cli.host, cli.port);
    tracing::info!("Churn Lab UI listening on http://{addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Which panels the user has ticked. Checkbox params arrive only when set.
#[derive(Deserialize, Default)]
struct PanelFlags {
    data: Option<String>,
    metrics: Option<String>,
    predict: Option<String>,
}

impl PanelFlags {
    fn data_on(&self) -> bool {
        self.data.is_some()
    }
    fn metrics_on(&self) -> bool {
        self.metrics.is_some()
    }
    fn predict_on(&self) -> bool {
        self.predict.is_some()
    }
}

type HandlerError = (StatusCode, String);

fn internal_error(err: ChurnError) -> HandlerError {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

async fn index(
    State(state): State<Arc<AppState>>,
    Query(flags): Query<PanelFlags>,
) -> Result<Html<String>, HandlerError> {
    let output = pipeline::run_pipeline(&state.config, &state.cache).map_err(internal_error)?;
    let page = render_page(&flags, &output, None).map_err(internal_error)?;
    Ok(Html(page))
}

async fn classify(
    State(state): State<Arc<AppState>>,
    Form(input): Form<CustomerInput>,
) -> Result<Html<String>, HandlerError> {
    let output = pipeline::run_pipeline(&state.config, &state.cache).map_err(internal_error)?;

    let label = pipeline::classify(&output, &input).map_err(|err| match err {
        ChurnError::UnseenCategory { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        other => internal_error(other),
    })?;

    let flags = PanelFlags {
        predict: Some("1".into()),
        ..PanelFlags::default()
    };
    let page = render_page(&flags, &output, Some(&label)).map_err(internal_error)?;
    Ok(Html(page))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "churnlab-web"
    }))
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn checkbox(name: &str, label: &str, on: bool) -> String {
    let checked = if on { " checked" } else { "" };
    format!(
        r#"<label><input type="checkbox" name="{name}" value="1"{checked}> {label}</label>"#
    )
}

fn select_field(
    output: &PipelineOutput,
    name: &str,
    label: &str,
    column: &str,
) -> Result<String, ChurnError> {
    let mut html = format!("<label>{label}<select name=\"{name}\">");
    // Options come straight from the fitted encoding table, so the form's
    // input domain is exactly the fitted domain.
    for value in output.encoder.values(column)? {
        let escaped = html_escape(value);
        let _ = write!(html, r#"<option value="{escaped}">{escaped}</option>"#);
    }
    html.push_str("</select></label>");
    Ok(html)
}

fn render_page(
    flags: &PanelFlags,
    output: &PipelineOutput,
    prediction: Option<&str>,
) -> Result<String, ChurnError> {
    let mut panels = String::new();

    if flags.data_on() {
        let (rows, cols) = output.table.shape();
        let _ = write!(
            panels,
            "<section><h2>Data preview</h2><p>The dataset has a shape of ({rows}, {cols})</p><p>Columns: {}</p>",
            html_escape(&output.table.headers.join(", "))
        );
        panels.push_str("<table><tr>");
        for header in &output.table.headers {
            let _ = write!(panels, "<th>{}</th>", html_escape(header));
        }
        panels.push_str("</tr>");
        for row in output.table.head(10) {
            panels.push_str("<tr>");
            for cell in row {
                let _ = write!(panels, "<td>{}</td>", html_escape(cell));
            }
            panels.push_str("</tr>");
        }
        panels.push_str("</table></section>");
    }

    if flags.metrics_on() {
        let _ = write!(
            panels,
            "<section><h2>Classifier metrics</h2>\
             <p>Model accuracy: {:.2}%</p><p>AUC score: {}</p></section>",
            output.metrics.accuracy_pct(),
            output.metrics.auc()
        );
    }

    if flags.predict_on() {
        panels.push_str("<section><h2>Classify a customer</h2>");
        if let Some(label) = prediction {
            let _ = write!(
                panels,
                "<p class=\"result\">Is the customer likely to churn? \
                 Classification result: <strong>{}</strong></p>",
                html_escape(label)
            );
        }
        panels.push_str(r#"<form method="post" action="/classify">"#);
        panels.push_str(&select_field(output, "gender", "Gender", COL_GENDER)?);
        panels.push_str(&select_field(output, "senior_citizen", "Senior citizen", COL_SENIOR)?);
        panels.push_str(&select_field(output, "internet_service", "Internet service", COL_INTERNET)?);
        panels.push_str(&select_field(output, "payment_method", "Payment method", COL_PAYMENT)?);
        panels.push_str(
            r#"<label>Tenure (months)<input type="number" name="tenure" value="12" step="any"></label>
<label>Monthly charge<input type="number" name="monthly_charges" value="50.0" step="any"></label>
<button type="submit">Classify</button></form></section>"#,
        );
    }

    let page = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Churn Lab</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; display: flex; background: #f5f5f5; }}
        aside {{ width: 240px; min-height: 100vh; background: #263238; color: #eceff1; padding: 24px; }}
        main {{ flex: 1; padding: 32px; }}
        section {{ background: white; padding: 20px; margin-bottom: 20px; border-radius: 8px;
                   box-shadow: 0 2px 4px rgba(0,0,0,0.1); }}
        h2 {{ color: #333; border-bottom: 3px solid #4CAF50; padding-bottom: 8px; }}
        table {{ border-collapse: collapse; font-size: 0.85em; }}
        th, td {{ border: 1px solid #ddd; padding: 4px 8px; }}
        label {{ display: block; margin: 8px 0; }}
        .panels {{ background: white; padding: 16px 20px; border-radius: 8px; margin-bottom: 20px; }}
        .result {{ background: #e8f5e9; border-left: 4px solid #4CAF50; padding: 10px; }}
    </style>
</head>
<body>
    <aside>
        <h1>Churn Lab</h1>
        <p>A model that assists telecom operators to predict customers who are most likely subject to churn.</p>
    </aside>
    <main>
        <form class="panels" method="get" action="/">
            {data_box}
            {metrics_box}
            {predict_box}
            <button type="submit">Update</button>
        </form>
        {panels}
    </main>
</body>
</html>
"#,
        data_box = checkbox("data", "Display data", flags.data_on()),
        metrics_box = checkbox("metrics", "Display metrics summary", flags.metrics_on()),
        predict_box = checkbox("predict", "Tick to input your values for prediction", flags.predict_on()),
        panels = panels,
    );

    Ok(page)
}
