use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::warn;

use crate::broker::Broker;
use crate::error::BrokerError;

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub ask_for_time: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub error: bool,
    pub msg: String,
}

#[derive(Debug, Serialize)]
pub struct TimeResponse {
    pub error: bool,
    pub msg: String,
    pub ts: String,
}

/// GET /client-long-poll/:client_id
///
/// Held open until a command signal arrives or the check-in ceiling elapses.
/// Always 200; the body says whether a command was issued.
pub async fn check_in(
    State(broker): State<Arc<Broker>>,
    Path(client_id): Path<String>,
) -> Json<CheckInResponse> {
    let ask_for_time = broker.check_in(&client_id).await;
    Json(CheckInResponse { ask_for_time })
}

/// GET /client-time/:client_id/:timestamp
///
/// The client's reply to an issued command. 400 with the parser's message
/// when the timestamp does not match the wire layout.
pub async fn submit_time(
    State(broker): State<Arc<Broker>>,
    Path((client_id, timestamp)): Path<(String, String)>,
) -> (StatusCode, Json<SubmitResponse>) {
    match broker.submit_value(&client_id, &timestamp) {
        Ok(()) => (
            StatusCode::OK,
            Json(SubmitResponse {
                error: false,
                msg: String::new(),
            }),
        ),
        Err(err) => {
            warn!(%client_id, %err, "rejected submitted timestamp");
            (
                StatusCode::BAD_REQUEST,
                Json(SubmitResponse {
                    error: true,
                    msg: err.to_string(),
                }),
            )
        }
    }
}

/// GET /clients/:client_id/system-time
///
/// Issues a command to the client and waits for its reply. 404 when the
/// client has never checked in or did not reply within the ceiling.
pub async fn get_time(
    State(broker): State<Arc<Broker>>,
    Path(client_id): Path<String>,
) -> (StatusCode, Json<TimeResponse>) {
    match broker.request_value(&client_id).await {
        Ok(ts) => (
            StatusCode::OK,
            Json(TimeResponse {
                error: false,
                msg: String::new(),
                ts: ts.to_string(),
            }),
        ),
        Err(err @ (BrokerError::UnknownClient { .. } | BrokerError::ReplyTimeout { .. })) => (
            StatusCode::NOT_FOUND,
            Json(TimeResponse {
                error: true,
                msg: err.to_string(),
                ts: String::new(),
            }),
        ),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(TimeResponse {
                error: true,
                msg: err.to_string(),
                ts: String::new(),
            }),
        ),
    }
}
