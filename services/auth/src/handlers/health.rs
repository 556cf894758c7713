use axum::extract::State;
use axum::http::StatusCode;

use homerent_core::health::readiness;

use crate::state::AppState;

/// `GET /readyz`: ready once the database answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}
