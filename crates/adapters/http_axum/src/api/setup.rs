//! `GET /setup` — what a controller needs to pair.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use sensorbridge_app::ports::PairingStore;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SetupBody {
    pub setup_code: String,
    pub setup_uri: String,
    pub paired: bool,
}

/// `GET /setup`
pub async fn get<P>(State(state): State<AppState<P>>) -> Json<SetupBody>
where
    P: PairingStore + 'static,
{
    Json(SetupBody {
        setup_code: state.setup.code.to_string(),
        setup_uri: state.setup.payload.to_string(),
        paired: state.pairings.is_paired(),
    })
}
