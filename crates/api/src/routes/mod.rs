//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::{AppState, middleware::auth::auth_middleware};
use caja_core::cash::BalanceSummary;
use caja_db::CashError;

pub mod cash_audits;
pub mod cash_closings;
pub mod cash_openings;
pub mod health;

/// Creates the API router: a public health probe plus the protected
/// cash-session routes behind the auth middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(cash_openings::routes())
        .merge(cash_audits::routes())
        .merge(cash_closings::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Transport status and machine-readable code for a cash error.
pub(crate) fn cash_error_parts(err: &CashError) -> (StatusCode, &'static str) {
    match err {
        CashError::Validation(_) | CashError::UnknownDenomination(_) => {
            (StatusCode::BAD_REQUEST, "invalid_request")
        }
        CashError::InsufficientBalance { .. } => (StatusCode::BAD_REQUEST, "insufficient_balance"),
        CashError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
        CashError::OwnershipMismatch(_) => (StatusCode::FORBIDDEN, "ownership_mismatch"),
        CashError::SessionRequired(_) => (StatusCode::CONFLICT, "session_required"),
        CashError::SessionInactive(_) => (StatusCode::CONFLICT, "session_inactive"),
        CashError::AlreadyClosed(_) => (StatusCode::CONFLICT, "already_closed"),
        CashError::Database(_) => (StatusCode::BAD_REQUEST, "database_error"),
    }
}

/// Maps a cash error onto an HTTP response.
pub(crate) fn cash_error_response(err: &CashError) -> Response {
    if let CashError::Database(db_err) = err {
        error!(error = %db_err, "Cash operation failed on persistence");
    }

    let (status, code) = cash_error_parts(err);

    let body = match err {
        CashError::InsufficientBalance { expected, provided } => json!({
            "error": code,
            "message": err.to_string(),
            "expected": expected,
            "provided": provided,
            "difference": provided - expected,
        }),
        _ => json!({
            "error": code,
            "message": err.to_string(),
        }),
    };

    (status, Json(body)).into_response()
}

/// Balance breakdown returned by the advisory endpoints and embedded in
/// mutation responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// Sum of credit magnitudes.
    pub total_credits: Decimal,
    /// Sum of debit magnitudes.
    pub total_debits: Decimal,
    /// Opening amount derived from the float.
    pub opening_amount: Decimal,
    /// Balance carried in from a predecessor session.
    pub prior_balance: Decimal,
    /// What may still be withdrawn mid-session.
    pub available_balance: Decimal,
    /// Expected drawer content at closing time.
    pub theoretical_balance: Decimal,
}

impl From<&BalanceSummary> for SummaryResponse {
    fn from(summary: &BalanceSummary) -> Self {
        Self {
            total_credits: summary.total_credits,
            total_debits: summary.total_debits,
            opening_amount: summary.opening_amount,
            prior_balance: summary.prior_balance,
            available_balance: summary.available_balance(),
            theoretical_balance: summary.theoretical_balance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_error_status_mapping() {
        let id = Uuid::new_v4();
        let cases = [
            (CashError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                CashError::UnknownDenomination("DOGE".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                CashError::InsufficientBalance {
                    expected: dec!(70000),
                    provided: dec!(80000),
                },
                StatusCode::BAD_REQUEST,
            ),
            (CashError::SessionNotFound(id), StatusCode::NOT_FOUND),
            (CashError::OwnershipMismatch(id), StatusCode::FORBIDDEN),
            (CashError::SessionRequired(id), StatusCode::CONFLICT),
            (CashError::SessionInactive(id), StatusCode::CONFLICT),
            (CashError::AlreadyClosed(id), StatusCode::CONFLICT),
        ];

        for (err, expected) in cases {
            assert_eq!(cash_error_parts(&err).0, expected, "for {err:?}");
        }
    }

    #[test]
    fn test_summary_response_carries_both_balances() {
        let summary = BalanceSummary {
            total_credits: dec!(500),
            total_debits: dec!(30000),
            opening_amount: dec!(100000),
            prior_balance: dec!(2000),
        };
        let response = SummaryResponse::from(&summary);
        assert_eq!(response.available_balance, dec!(72500));
        assert_eq!(response.theoretical_balance, dec!(70500));
    }
}
