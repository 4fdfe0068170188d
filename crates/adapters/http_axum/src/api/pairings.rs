//! `/pairings` — record and remove controller pairings.
//!
//! Stands in for the protocol's pair-setup and remove-pairing exchanges: the
//! bridge trusts whatever controller calls these endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use sensorbridge_app::ports::PairingStore;
use sensorbridge_domain::pairing::ControllerPairing;
use sensorbridge_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for recording a pairing.
#[derive(Debug, Deserialize)]
pub struct AddPairingRequest {
    pub controller: String,
    /// Long-term public key of the controller, hex encoded.
    pub public_key: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct PairingBody {
    pub controller: String,
    pub admin: bool,
    pub paired_at: Timestamp,
}

impl PairingBody {
    fn new(controller: String, pairing: &ControllerPairing) -> Self {
        Self {
            controller,
            admin: pairing.admin,
            paired_at: pairing.paired_at,
        }
    }
}

/// Possible responses from the add endpoint.
pub enum AddResponse {
    Created(Json<PairingBody>),
}

impl IntoResponse for AddResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the remove endpoint.
pub enum RemoveResponse {
    NoContent,
}

impl IntoResponse for RemoveResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /pairings`
pub async fn list<P>(State(state): State<AppState<P>>) -> Json<Vec<PairingBody>>
where
    P: PairingStore + 'static,
{
    let records = state.pairings.records().await;
    Json(
        records
            .controllers
            .iter()
            .map(|(controller, pairing)| PairingBody::new(controller.clone(), pairing))
            .collect(),
    )
}

/// `POST /pairings`
pub async fn add<P>(
    State(state): State<AppState<P>>,
    Json(req): Json<AddPairingRequest>,
) -> Result<AddResponse, ApiError>
where
    P: PairingStore + 'static,
{
    let controller = req.controller.trim();
    if controller.is_empty() {
        return Err(ApiError::BadRequest("controller must not be empty".into()));
    }
    let pairing = state
        .pairings
        .add(controller, req.public_key, req.admin)
        .await?;
    Ok(AddResponse::Created(Json(PairingBody::new(
        controller.to_string(),
        &pairing,
    ))))
}

/// `DELETE /pairings/{controller}`
pub async fn remove<P>(
    State(state): State<AppState<P>>,
    Path(controller): Path<String>,
) -> Result<RemoveResponse, ApiError>
where
    P: PairingStore + 'static,
{
    state.pairings.remove(&controller).await?;
    Ok(RemoveResponse::NoContent)
}
