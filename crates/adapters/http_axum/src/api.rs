//! Accessory-protocol JSON handler modules.

pub mod accessories;
#[allow(clippy::missing_errors_doc)]
pub mod characteristics;
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod pairings;
pub mod setup;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{delete, get};

use sensorbridge_app::ports::PairingStore;

use crate::state::AppState;

/// Header carrying the identity of the calling controller.
pub const CONTROLLER_HEADER: &str = "x-controller-id";

const ANONYMOUS: &str = "anonymous";

/// Identity of the calling controller, `anonymous` when the header is absent.
pub(crate) fn controller_id(headers: &HeaderMap) -> String {
    headers
        .get(CONTROLLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// Build the accessory-protocol router.
pub fn routes<P>() -> Router<AppState<P>>
where
    P: PairingStore + 'static,
{
    Router::new()
        .route("/accessories", get(accessories::list::<P>))
        .route(
            "/characteristics",
            get(characteristics::read::<P>).put(characteristics::write::<P>),
        )
        .route("/events", get(events::stream::<P>))
        .route(
            "/pairings",
            get(pairings::list::<P>).post(pairings::add::<P>),
        )
        .route("/pairings/{controller}", delete(pairings::remove::<P>))
        .route("/setup", get(setup::get::<P>))
}
