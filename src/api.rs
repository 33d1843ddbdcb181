// 🌐 REST API with Axum
// Routes, JSON bodies and status mapping for the expense tracker

use crate::error::{TrackerError, TrackerResult};
use crate::tracker::ExpenseTracker;
use crate::validator::ExpenseInput;
use crate::VERSION;
use anyhow::anyhow;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequestParts, Query, State},
    http::{request::Parts, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

// ============================================================================
// Request / Response bodies
// ============================================================================

/// Query string as ordered pairs. A repeated key keeps its first value.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// First value for `key`, or an empty string when absent
    pub fn first(&self, key: &str) -> String {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for QueryParams {
    type Rejection = TrackerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| TrackerError::MalformedRequest(e.body_text()))?;

        Ok(QueryParams(pairs))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = match &self {
            TrackerError::Validation(_) | TrackerError::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the log
        let message = match &self {
            TrackerError::Internal(e) => {
                error!(error = %format!("{e:#}"), "request failed");
                "Internal server error".to_string()
            }
            other => {
                debug!(status = status.as_u16(), reason = %other, "request rejected");
                other.to_string()
            }
        };

        let body = ErrorBody {
            error: self.category().to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Run a store-backed tracker call on the blocking pool
async fn run_blocking<T, F>(task: F) -> TrackerResult<T>
where
    F: FnOnce() -> TrackerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| TrackerError::Internal(anyhow!("tracker task failed: {e}")))?
}

// ============================================================================
// API Handlers
// ============================================================================

/// POST /add_expense, /expenses - validate and store one expense
async fn add_expense(
    State(tracker): State<ExpenseTracker>,
    body: Bytes,
) -> Result<Json<MessageBody>, TrackerError> {
    // Content-Type is not checked; an empty body counts as `{}`
    let input: ExpenseInput = if body.iter().all(u8::is_ascii_whitespace) {
        ExpenseInput::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| TrackerError::MalformedRequest(e.to_string()))?
    };

    let expense = run_blocking(move || tracker.add_expense(&input)).await?;

    Ok(Json(MessageBody {
        message: format!(
            "Expense '{}' added to category '{}' for {} on {}.",
            expense.name, expense.category, expense.amount, expense.date
        ),
    }))
}

/// GET /top_category, /categories/top ?month=
async fn top_category(
    State(tracker): State<ExpenseTracker>,
    params: QueryParams,
) -> Result<Json<Value>, TrackerError> {
    let month = params.first("month");

    let lookup = month.clone();
    match run_blocking(move || tracker.top_category(&lookup)).await? {
        Some(category) => Ok(Json(json!({
            "month": month,
            "top_category": category,
        }))),
        None => Err(TrackerError::NotFound(format!(
            "No category with expenses found in month '{}'",
            month
        ))),
    }
}

/// GET /max_expense, /expenses/largest ?month=&category=
async fn max_expense(
    State(tracker): State<ExpenseTracker>,
    params: QueryParams,
) -> Result<Json<Value>, TrackerError> {
    let month = params.first("month");
    let category = params.first("category");

    let (lookup_month, lookup_category) = (month.clone(), category.clone());
    match run_blocking(move || tracker.largest_expense(&lookup_month, &lookup_category)).await? {
        Some(expense) => Ok(Json(json!({
            "month": month,
            "category": category,
            "max_expense": expense.name,
            "amount": expense.amount,
            "date": expense.date,
        }))),
        None => Err(TrackerError::NotFound(format!(
            "No expenses found in month '{}' and category '{}'",
            month, category
        ))),
    }
}

/// GET /full_records, /expenses/full_records
async fn full_records(State(tracker): State<ExpenseTracker>) -> Result<Response, TrackerError> {
    let records = run_blocking(move || tracker.full_records()).await?;
    if records.is_empty() {
        return Err(TrackerError::NotFound("No expense records found".to_string()));
    }

    Ok((StatusCode::OK, Json(records)).into_response())
}

/// GET /expenses/summary ?month=
async fn monthly_summary(
    State(tracker): State<ExpenseTracker>,
    params: QueryParams,
) -> Result<Json<Value>, TrackerError> {
    let month = params.first("month");

    let lookup = month.clone();
    let totals = run_blocking(move || tracker.monthly_summary(&lookup)).await?;
    if totals.is_empty() {
        return Err(TrackerError::NotFound(format!(
            "No expenses found in month '{}'",
            month
        )));
    }

    Ok(Json(json!({
        "month": month,
        "categories": totals,
    })))
}

/// GET /health
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": VERSION }))
}

/// Unknown paths and unsupported methods on known paths
async fn not_found(uri: Uri) -> Response {
    TrackerError::NotFound(format!(
        "Path '{}' was not found on this server",
        uri.path()
    ))
    .into_response()
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    TrackerError::Internal(anyhow!("handler panicked")).into_response()
}

// ============================================================================
// Router
// ============================================================================

/// Build the full application. The tracker is shared by every request.
pub fn router(tracker: ExpenseTracker) -> Router {
    Router::new()
        .route("/add_expense", post(add_expense).fallback(not_found))
        .route("/expenses", post(add_expense).fallback(not_found))
        .route("/top_category", get(top_category).fallback(not_found))
        .route("/categories/top", get(top_category).fallback(not_found))
        .route("/max_expense", get(max_expense).fallback(not_found))
        .route("/expenses/largest", get(max_expense).fallback(not_found))
        .route("/full_records", get(full_records).fallback(not_found))
        .route("/expenses/full_records", get(full_records).fallback(not_found))
        .route("/expenses/summary", get(monthly_summary).fallback(not_found))
        .route("/health", get(health_check).fallback(not_found))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(tracker)
}
