//! Cash opening routes: start a drawer session from a counted float.

use axum::{
    Json, Router,
    extract::State,
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
use caja_db::repositories::opening::{CashOpeningRepository, OpenSessionInput, OpenedSession};

/// Creates the cash opening routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales/cash-openings", get(list_openings))
        .route("/sales/cash-openings", post(create_opening))
}

/// Request body for opening a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpeningRequest {
    /// Drawer to open.
    pub cash_register_id: Uuid,
    /// Accepted for client compatibility; the session state is managed
    /// server-side.
    #[serde(default)]
    #[allow(dead_code)]
    pub state_id: Option<i16>,
    /// Balance carried in from a predecessor session.
    #[serde(default)]
    pub prior_balance: Option<Decimal>,
    /// Counted float lines.
    pub lines: Vec<LineInput>,
}

/// Response for a session with its float detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningResponse {
    /// Session ID.
    pub id: Uuid,
    /// Drawer the session runs on.
    pub cash_register_id: Uuid,
    /// Owning user ID.
    pub user_id: Uuid,
    /// Opening timestamp.
    pub opened_at: String,
    /// Total value of the float.
    pub opening_amount: Decimal,
    /// Carried-in balance.
    pub prior_balance: Decimal,
    /// Whether the session is still open.
    pub active: bool,
    /// Float detail.
    pub lines: Vec<FloatLineResponse>,
    /// Balance breakdown.
    pub summary: SummaryResponse,
}

/// Response for a single float line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloatLineResponse {
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

impl From<OpenedSession> for OpeningResponse {
    fn from(opened: OpenedSession) -> Self {
        Self {
            id: opened.session.id,
            cash_register_id: opened.session.cash_register_id,
            user_id: opened.session.user_id,
            opened_at: opened.session.opened_at.to_rfc3339(),
            opening_amount: opened.session.opening_amount,
            prior_balance: opened.session.prior_balance,
            active: opened.session.is_active(),
            lines: opened
                .float_lines
                .into_iter()
                .map(|line| FloatLineResponse {
                    id: line.id,
                    denomination: line.denomination,
                    rate: line.rate,
                    quantity: line.quantity,
                    amount: line.amount,
                })
                .collect(),
            summary: SummaryResponse::from(&opened.summary),
        }
    }
}

/// GET `/sales/cash-openings` - List the caller's sessions.
async fn list_openings(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = CashOpeningRepository::new((*state.db).clone());

    match repo.list_for_user(auth.user_id()).await {
        Ok(sessions) => {
            let items: Vec<OpeningResponse> =
                sessions.into_iter().map(OpeningResponse::from).collect();
            (StatusCode::OK, Json(json!({ "openings": items }))).into_response()
        }
        Err(e) => cash_error_response(&e),
    }
}

/// POST `/sales/cash-openings` - Open a new session.
async fn create_opening(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateOpeningRequest>,
) -> impl IntoResponse {
    let repo = CashOpeningRepository::new((*state.db).clone());

    let input = OpenSessionInput {
        user_id: auth.user_id(),
        cash_register_id: payload.cash_register_id,
        prior_balance: payload.prior_balance,
        lines: payload.lines,
    };

    match repo.open(input).await {
        Ok(opened) => (StatusCode::CREATED, Json(OpeningResponse::from(opened))).into_response(),
        Err(e) => cash_error_response(&e),
    }
}
