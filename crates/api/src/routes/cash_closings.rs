//! Cash closing routes: finalize a session against the counted drawer.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    routes::{SummaryResponse, cash_error_response},
};
use caja_core::cash::LineInput;
use caja_db::entities::{closing_lines, closing_records};
use caja_db::repositories::closing::{CashClosingRepository, CloseInput, ClosingFilter};

/// Creates the cash closing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales/cash-closings", get(list_closings))
        .route("/sales/cash-closings", post(create_closing))
        .route("/sales/cash-closings/available", get(theoretical_balance))
}

/// Query parameters for the closing history listing.
#[derive(Debug, Deserialize)]
pub struct ListClosingsQuery {
    /// Restrict to the caller's own sessions.
    #[serde(default)]
    pub mine: bool,
    /// Restrict to one session.
    pub session: Option<Uuid>,
}

/// Query parameters for the theoretical-balance endpoint.
#[derive(Debug, Deserialize)]
pub struct AvailableQuery {
    /// Explicit session; the caller's active session when absent.
    pub session: Option<Uuid>,
}

/// Request body for closing a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClosingRequest {
    /// Explicit session; the caller's active session when absent.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    /// Counted cash lines.
    pub lines: Vec<LineInput>,
}

/// Response for a closing record with its counted detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingResponse {
    /// Closing record ID.
    pub id: Uuid,
    /// Session that was closed.
    pub session_id: Uuid,
    /// Closing timestamp.
    pub closed_at: String,
    /// Total value of the counted cash.
    pub counted_total: Decimal,
    /// Counted minus theoretical, rounded to two decimals.
    pub difference: Decimal,
    /// Counted-cash detail.
    pub lines: Vec<ClosingLineResponse>,
}

/// Response for a single counted line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingLineResponse {
    /// Line ID.
    pub id: Uuid,
    /// Denomination code.
    pub denomination: String,
    /// Unit rate at pricing time.
    pub rate: Decimal,
    /// Counted quantity.
    pub quantity: Decimal,
    /// Line value.
    pub amount: Decimal,
}

impl ClosingResponse {
    fn from_parts(record: closing_records::Model, lines: Vec<closing_lines::Model>) -> Self {
        Self {
            id: record.id,
            session_id: record.session_id,
            closed_at: record.closed_at.to_rfc3339(),
            counted_total: record.counted_total,
            difference: record.difference,
            lines: lines
                .into_iter()
                .map(|line| ClosingLineResponse {
                    id: line.id,
                    denomination: line.denomination,
                    rate: line.rate,
                    quantity: line.quantity,
                    amount: line.amount,
                })
                .collect(),
        }
    }
}

/// GET `/sales/cash-closings` - Closing history, newest first.
async fn list_closings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListClosingsQuery>,
) -> impl IntoResponse {
    let repo = CashClosingRepository::new((*state.db).clone());

    let filter = ClosingFilter {
        mine: query.mine,
        session_id: query.session,
    };

    match repo.list(auth.user_id(), filter).await {
        Ok(records) => {
            let items: Vec<ClosingResponse> = records
                .into_iter()
                .map(|(record, lines)| ClosingResponse::from_parts(record, lines))
                .collect();
            (StatusCode::OK, Json(json!({ "closings": items }))).into_response()
        }
        Err(e) => cash_error_response(&e),
    }
}

/// GET `/sales/cash-closings/available` - Theoretical balance the drawer
/// should hold at closing time.
async fn theoretical_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AvailableQuery>,
) -> impl IntoResponse {
    let repo = CashClosingRepository::new((*state.db).clone());

    match repo.available(auth.user_id(), query.session).await {
        Ok((session, summary)) => (
            StatusCode::OK,
            Json(json!({
                "sessionId": session.id,
                "balance": summary.theoretical_balance(),
                "summary": SummaryResponse::from(&summary),
            })),
        )
            .into_response(),
        Err(e) => cash_error_response(&e),
    }
}

/// POST `/sales/cash-closings` - Close the resolved session exactly once.
async fn create_closing(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateClosingRequest>,
) -> impl IntoResponse {
    let repo = CashClosingRepository::new((*state.db).clone());

    let input = CloseInput {
        user_id: auth.user_id(),
        session_id: payload.session_id,
        lines: payload.lines,
    };

    match repo.close(input).await {
        Ok(outcome) => {
            let summary = SummaryResponse::from(&outcome.summary);
            let response = ClosingResponse::from_parts(outcome.record, outcome.lines);
            (
                StatusCode::CREATED,
                Json(json!({
                    "closing": response,
                    "summary": summary,
                })),
            )
                .into_response()
        }
        Err(e) => cash_error_response(&e),
    }
}
