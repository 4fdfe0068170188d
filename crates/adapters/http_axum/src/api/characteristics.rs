//! `GET /characteristics` and `PUT /characteristics` — read values, write
//! values and toggle subscriptions.
//!
//! Every item of a request is handled on its own. When all items succeed the
//! response is `200` (reads) or `204` (writes); otherwise it is
//! `207 Multi-Status` with a protocol status code per item.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use sensorbridge_app::ports::PairingStore;
use sensorbridge_domain::characteristic::{CharacteristicKind, Value};
use sensorbridge_domain::error::ValidationError;
use sensorbridge_domain::event::SubscriptionChange;
use sensorbridge_domain::id::{AccessoryId, CharacteristicKey, InstanceId};

use crate::api::controller_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Accessory-protocol status codes reported per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolStatus {
    Success,
    ReadOnly,
    WriteOnly,
    NotificationUnsupported,
    ResourceNotFound,
    InvalidValue,
}

impl ProtocolStatus {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ReadOnly => -70404,
            Self::WriteOnly => -70405,
            Self::NotificationUnsupported => -70406,
            Self::ResourceNotFound => -70409,
            Self::InvalidValue => -70410,
        }
    }
}

impl From<&ValidationError> for ProtocolStatus {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::NotWritable(_) => Self::ReadOnly,
            ValidationError::NotNotifiable(_) => Self::NotificationUnsupported,
            _ => Self::InvalidValue,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CharacteristicsBody<T> {
    pub characteristics: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct ReadQuery {
    /// Comma separated `aid.iid` pairs.
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct ReadItem {
    pub aid: AccessoryId,
    pub iid: InstanceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

/// Possible responses from the read endpoint.
pub enum ReadResponse {
    Ok(Json<CharacteristicsBody<ReadItem>>),
    MultiStatus(Json<CharacteristicsBody<ReadItem>>),
}

impl IntoResponse for ReadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::MultiStatus(json) => (StatusCode::MULTI_STATUS, json).into_response(),
        }
    }
}

/// `GET /characteristics?id=1.2,2.10`
pub async fn read<P>(
    State(state): State<AppState<P>>,
    Query(query): Query<ReadQuery>,
) -> Result<ReadResponse, ApiError>
where
    P: PairingStore + 'static,
{
    let keys = query
        .id
        .split(',')
        .map(|raw| CharacteristicKey::from_str(raw.trim()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let results: Vec<(CharacteristicKey, Result<Value, ProtocolStatus>)> = keys
        .into_iter()
        .map(|key| {
            let result = match state.tree.characteristic(key) {
                None => Err(ProtocolStatus::ResourceNotFound),
                Some(c) if !c.permissions().readable => Err(ProtocolStatus::WriteOnly),
                Some(c) => Ok(c.read()),
            };
            (key, result)
        })
        .collect();

    let all_ok = results.iter().all(|(_, result)| result.is_ok());
    let characteristics = results
        .into_iter()
        .map(|(key, result)| {
            let (value, status) = match result {
                Ok(value) => (Some(value), ProtocolStatus::Success),
                Err(status) => (None, status),
            };
            ReadItem {
                aid: key.aid,
                iid: key.iid,
                value,
                status: (!all_ok).then_some(status.code()),
            }
        })
        .collect();

    let body = Json(CharacteristicsBody { characteristics });
    Ok(if all_ok {
        ReadResponse::Ok(body)
    } else {
        ReadResponse::MultiStatus(body)
    })
}

#[derive(Debug, Deserialize)]
pub struct WriteItem {
    pub aid: AccessoryId,
    pub iid: InstanceId,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    /// `true` subscribes the caller, `false` unsubscribes it.
    #[serde(default)]
    pub ev: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct StatusItem {
    pub aid: AccessoryId,
    pub iid: InstanceId,
    pub status: i32,
}

/// Possible responses from the write endpoint.
pub enum WriteResponse {
    NoContent,
    MultiStatus(Json<CharacteristicsBody<StatusItem>>),
}

impl IntoResponse for WriteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::MultiStatus(json) => (StatusCode::MULTI_STATUS, json).into_response(),
        }
    }
}

/// `PUT /characteristics`
pub async fn write<P>(
    State(state): State<AppState<P>>,
    headers: HeaderMap,
    Json(body): Json<CharacteristicsBody<WriteItem>>,
) -> WriteResponse
where
    P: PairingStore + 'static,
{
    let controller = controller_id(&headers);
    let statuses: Vec<StatusItem> = body
        .characteristics
        .iter()
        .map(|item| StatusItem {
            aid: item.aid,
            iid: item.iid,
            status: apply(&state, &controller, item).code(),
        })
        .collect();

    if statuses.iter().all(|s| s.status == ProtocolStatus::Success.code()) {
        WriteResponse::NoContent
    } else {
        WriteResponse::MultiStatus(Json(CharacteristicsBody {
            characteristics: statuses,
        }))
    }
}

fn apply<P>(state: &AppState<P>, controller: &str, item: &WriteItem) -> ProtocolStatus {
    let Some(accessory) = state.tree.accessory(item.aid) else {
        return ProtocolStatus::ResourceNotFound;
    };
    let Some((service, characteristic)) = accessory.characteristic_by_iid(item.iid) else {
        return ProtocolStatus::ResourceNotFound;
    };

    if let Some(json) = &item.value {
        if !characteristic.permissions().writable {
            return ProtocolStatus::ReadOnly;
        }
        let written = Value::from_json(json, characteristic.format()).and_then(|value| {
            characteristic.write_from_controller(value.clone())?;
            Ok(value)
        });
        match written {
            Err(err) => {
                tracing::debug!(key = %characteristic.key(), %controller, error = %err, "write rejected");
                return ProtocolStatus::from(&err);
            }
            Ok(value) => {
                if characteristic.kind() == CharacteristicKind::Identify && value.as_bool() == Some(true)
                {
                    accessory.identify();
                }
            }
        }
    }

    if let Some(ev) = item.ev {
        let change = SubscriptionChange {
            key: characteristic.key(),
            service: service.kind(),
            characteristic: characteristic.kind(),
            subscriber: controller.to_string(),
        };
        if ev {
            match characteristic.subscribe(controller) {
                Ok(true) => state.events.publish_subscribed(change),
                Ok(false) => {}
                Err(err) => return ProtocolStatus::from(&err),
            }
        } else if characteristic.unsubscribe(controller) {
            state.events.publish_unsubscribed(change);
        }
    }

    ProtocolStatus::Success
}
