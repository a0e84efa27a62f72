//! Credit balance and purchase handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use tcraft_engine::ProfileStore;
use tcraft_models::{CreditKind, CreditTransaction};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Credit balance response.
#[derive(Serialize)]
pub struct CreditBalanceResponse {
    pub credits: u32,
}

/// Get the authenticated user's remaining credits.
///
/// Also refreshes the in-memory mirror so a later generation pre-flight
/// sees the persisted balance.
pub async fn get_credits(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<CreditBalanceResponse>> {
    let profile = state
        .store
        .get_or_create_profile(&user.uid, user.email.clone())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    state.ledgers.ledger_for(&user.uid).sync(profile.credits);

    Ok(Json(CreditBalanceResponse {
        credits: profile.credits,
    }))
}

/// Purchase request body.
#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseRequest {
    /// Credits to add; one call is one distinct purchase event.
    #[validate(range(min = 1, max = 1000))]
    pub amount: u32,
}

/// Add purchased credits to the balance.
///
/// Payment capture happens with the payment provider; this endpoint
/// applies the resulting credit grant.
pub async fn purchase_credits(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> ApiResult<Json<CreditBalanceResponse>> {
    body.validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid purchase: {e}")))?;

    let balance = state
        .store
        .adjust_credits(&user.uid, body.amount as i64)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    state.ledgers.ledger_for(&user.uid).sync(balance);

    let tx = CreditTransaction::new(
        &user.uid,
        CreditKind::Purchase,
        body.amount,
        balance,
        format!("Purchased {} credits", body.amount),
    );
    if let Err(e) = state.store.record_transaction(&tx).await {
        warn!(user_id = %user.uid, error = %e, "Failed to record purchase transaction");
    }

    Ok(Json(CreditBalanceResponse { credits: balance }))
}
