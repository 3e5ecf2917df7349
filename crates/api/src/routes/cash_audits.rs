//! Cash audit routes: mid-session withdrawals against an open drawer.

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
use caja_db::entities::{ledger_entries, sea_orm_active_enums::EntrySign};
use caja_db::repositories::audit::{AuditInput, CashAuditRepository};

/// Creates the cash audit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales/cash-audits", get(list_audits))
        .route("/sales/cash-audits", post(create_audit))
        .route("/sales/cash-audits/available", get(available_balance))
}

/// Query parameters shared by the audit read endpoints.
#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    /// Explicit session; the caller's active session when absent.
    pub session: Option<Uuid>,
}

/// Request body for recording a withdrawal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuditRequest {
    /// Explicit session; the caller's active session when absent.
    #[serde(default)]
    pub session_id: Option<Uuid>,
    /// Why the cash leaves the drawer.
    pub reason: String,
    /// Withdrawal lines.
    pub lines: Vec<LineInput>,
}

/// Response for a single ledger entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Session the entry belongs to.
    pub session_id: Uuid,
    /// Entry timestamp.
    pub entry_at: String,
    /// Reason text, present on the first entry of a withdrawal group.
    pub reason: Option<String>,
    /// "credit" or "debit".
    pub sign: String,
    /// Denomination code, when the entry originated from a priced line.
    pub denomination: Option<String>,
    /// Unit rate at pricing time.
    pub rate: Option<Decimal>,
    /// Quantity withdrawn.
    pub quantity: Option<Decimal>,
    /// Entry magnitude.
    pub amount: Decimal,
}

impl From<ledger_entries::Model> for LedgerEntryResponse {
    fn from(entry: ledger_entries::Model) -> Self {
        Self {
            id: entry.id,
            session_id: entry.session_id,
            entry_at: entry.entry_at.to_rfc3339(),
            reason: entry.reason,
            sign: sign_to_string(&entry.sign),
            denomination: entry.denomination,
            rate: entry.rate,
            quantity: entry.quantity,
            amount: entry.amount,
        }
    }
}

fn sign_to_string(sign: &EntrySign) -> String {
    match sign {
        EntrySign::Credit => "credit".to_string(),
        EntrySign::Debit => "debit".to_string(),
    }
}

/// GET `/sales/cash-audits` - Withdrawal history for the resolved session.
async fn list_audits(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AuditQuery>,
) -> impl IntoResponse {
    let repo = CashAuditRepository::new((*state.db).clone());

    match repo.history(auth.user_id(), query.session).await {
        Ok(entries) => {
            let items: Vec<LedgerEntryResponse> =
                entries.into_iter().map(LedgerEntryResponse::from).collect();
            (StatusCode::OK, Json(json!({ "audits": items }))).into_response()
        }
        Err(e) => cash_error_response(&e),
    }
}

/// GET `/sales/cash-audits/available` - Withdrawable balance for the
/// resolved session.
async fn available_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AuditQuery>,
) -> impl IntoResponse {
    let repo = CashAuditRepository::new((*state.db).clone());

    match repo.available(auth.user_id(), query.session).await {
        Ok((session, summary)) => (
            StatusCode::OK,
            Json(json!({
                "sessionId": session.id,
                "balance": summary.available_balance(),
                "summary": SummaryResponse::from(&summary),
            })),
        )
            .into_response(),
        Err(e) => cash_error_response(&e),
    }
}

/// POST `/sales/cash-audits` - Record a withdrawal.
async fn create_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAuditRequest>,
) -> impl IntoResponse {
    let repo = CashAuditRepository::new((*state.db).clone());

    let input = AuditInput {
        user_id: auth.user_id(),
        session_id: payload.session_id,
        reason: payload.reason,
        lines: payload.lines,
    };

    match repo.record(input).await {
        Ok(outcome) => {
            let ledger: Vec<LedgerEntryResponse> = outcome
                .ledger
                .into_iter()
                .map(LedgerEntryResponse::from)
                .collect();
            (
                StatusCode::CREATED,
                Json(json!({
                    "sessionId": outcome.session.id,
                    "ledger": ledger,
                    "summary": SummaryResponse::from(&outcome.summary),
                })),
            )
                .into_response()
        }
        Err(e) => cash_error_response(&e),
    }
}
