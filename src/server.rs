//! HTTP surface for the cross-reference engine.
//!
//! Serves `/search`, `/health`, `/refresh` and a small static homepage.
//! Store access and ranking run on the blocking pool; handlers only await.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::engine::XrefEngine;
use crate::errors::{Result, XrefError};
use crate::sync::{refresh_blocking, spawn_initial_load, spawn_refresh_loop};
use crate::types::{ErrorResponse, SearchRequest};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub generation: u64,
    pub records: usize,
    pub identifiers: usize,
    pub edges: usize,
}

/// Delay between initial load attempts when periodic refresh is off.
const INITIAL_LOAD_RETRY: Duration = Duration::from_secs(5);

const HOMEPAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Parts cross-reference</title>
  <style>
    body { font-family: sans-serif; margin: 2rem auto; max-width: 60rem; }
    table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
    th, td { border: 1px solid #ccc; padding: 0.3rem 0.5rem; text-align: left; }
  </style>
</head>
<body>
  <h1>Parts cross-reference</h1>
  <form id="search">
    <input name="query" placeholder="Part or reference number" autofocus>
    <label><input type="checkbox" name="fuzzy" value="true"> fuzzy</label>
    <button type="submit">Search</button>
  </form>
  <p id="count"></p>
  <table id="results"></table>
  <script>
    const columns = ["referenceNumber", "make", "partNumber", "company", "description"];
    document.getElementById("search").addEventListener("submit", async (event) => {
      event.preventDefault();
      const params = new URLSearchParams(new FormData(event.target));
      const response = await fetch("/search?" + params);
      const body = await response.json();
      const table = document.getElementById("results");
      table.innerHTML = "";
      if (body.error) {
        document.getElementById("count").textContent = body.error;
        return;
      }
      document.getElementById("count").textContent = body.count + " result(s)";
      const head = table.insertRow();
      columns.forEach((c) => { head.insertCell().textContent = c; });
      body.results.forEach((row) => {
        const tr = table.insertRow();
        columns.forEach((c) => { tr.insertCell().textContent = row[c] ?? ""; });
      });
    });
  </script>
</body>
</html>
"#;

/// Builds the router over a shared engine.
pub fn router(engine: Arc<XrefEngine>) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/refresh", post(refresh))
        .with_state(engine)
}

async fn homepage() -> Html<&'static str> {
    Html(HOMEPAGE)
}

async fn health(State(engine): State<Arc<XrefEngine>>) -> Response {
    let stats = engine.stats();
    let published = stats.generation > 0;
    let body = HealthResponse {
        status: if published { "ok" } else { "starting" }.to_string(),
        generation: stats.generation,
        records: stats.record_count,
        identifiers: stats.identifier_count,
        edges: stats.edge_count,
    };
    let status = if published {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

async fn search(
    State(engine): State<Arc<XrefEngine>>,
    Query(params): Query<SearchRequest>,
) -> Response {
    let fuzzy = params.is_fuzzy();
    let query = params.query.unwrap_or_default();

    let outcome = tokio::task::spawn_blocking(move || engine.search(&query, fuzzy))
        .await
        .map_err(|e| XrefError::StoreUnavailable {
            message: format!("search task failed: {e}"),
        })
        .and_then(|result| result);

    match outcome {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!(error = %e, "search failed");
            error_response("Search failed")
        }
    }
}

async fn refresh(State(engine): State<Arc<XrefEngine>>) -> Response {
    match refresh_blocking(engine).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!(error = %e, "refresh failed");
            error_response(&e.to_string())
        }
    }
}

fn error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Loads the first snapshot, starts the refresh loop, and serves HTTP on
/// `addr` until Ctrl-C.
///
/// A failing initial load is logged rather than fatal: the server starts,
/// searches fail until a later refresh succeeds. With periodic refresh
/// disabled, the initial load is retried until it succeeds once.
pub async fn serve(engine: Arc<XrefEngine>, addr: SocketAddr) -> Result<()> {
    match refresh_blocking(engine.clone()).await {
        Ok(result) => info!(
            records = result.record_count,
            identifiers = result.identifier_count,
            edges = result.edge_count,
            "initial snapshot loaded"
        ),
        Err(e) => warn!(error = %e, "initial snapshot load failed; will retry"),
    }

    let interval = engine.config().refresh_interval_secs;
    let refresher = if interval > 0 {
        Some(spawn_refresh_loop(engine.clone(), Duration::from_secs(interval)))
    } else if !engine.current_snapshot().is_published() {
        Some(spawn_initial_load(engine.clone(), INITIAL_LOAD_RETRY))
    } else {
        None
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    if let Some(handle) = refresher {
        handle.abort();
    }
    Ok(())
}
