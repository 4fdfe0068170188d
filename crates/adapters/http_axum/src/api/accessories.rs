//! `GET /accessories` — the full accessory tree.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use sensorbridge_app::ports::PairingStore;
use sensorbridge_domain::accessory::Accessory;
use sensorbridge_domain::characteristic::{Characteristic, Format, Unit, Value};
use sensorbridge_domain::id::{AccessoryId, InstanceId};
use sensorbridge_domain::service::Service;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AccessoriesBody {
    pub accessories: Vec<AccessoryBody>,
}

#[derive(Debug, Serialize)]
pub struct AccessoryBody {
    pub aid: AccessoryId,
    pub services: Vec<ServiceBody>,
}

#[derive(Debug, Serialize)]
pub struct ServiceBody {
    pub iid: InstanceId,
    #[serde(rename = "type")]
    pub type_code: &'static str,
    pub characteristics: Vec<CharacteristicBody>,
}

/// One characteristic with its metadata. Write-only characteristics carry
/// no value.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacteristicBody {
    pub iid: InstanceId,
    #[serde(rename = "type")]
    pub type_code: &'static str,
    pub description: &'static str,
    pub format: Format,
    pub perms: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(rename = "valid-values", skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<&'static [u8]>,
}

impl From<&Characteristic> for CharacteristicBody {
    fn from(characteristic: &Characteristic) -> Self {
        let permissions = characteristic.permissions();
        let constraints = characteristic.constraints();
        Self {
            iid: characteristic.iid(),
            type_code: characteristic.kind().type_code(),
            description: characteristic.kind().as_name(),
            format: characteristic.format(),
            perms: permissions.codes(),
            value: permissions.readable.then(|| characteristic.read()),
            min_value: constraints.min,
            max_value: constraints.max,
            min_step: constraints.step,
            unit: constraints.unit,
            valid_values: constraints.valid_values,
        }
    }
}

impl From<&Service> for ServiceBody {
    fn from(service: &Service) -> Self {
        Self {
            iid: service.iid(),
            type_code: service.kind().type_code(),
            characteristics: service
                .characteristics()
                .iter()
                .map(|c| CharacteristicBody::from(c.as_ref()))
                .collect(),
        }
    }
}

impl From<&Accessory> for AccessoryBody {
    fn from(accessory: &Accessory) -> Self {
        Self {
            aid: accessory.aid(),
            services: accessory.services().iter().map(ServiceBody::from).collect(),
        }
    }
}

/// `GET /accessories`
pub async fn list<P>(State(state): State<AppState<P>>) -> Json<AccessoriesBody>
where
    P: PairingStore + 'static,
{
    Json(AccessoriesBody {
        accessories: state
            .tree
            .accessories()
            .iter()
            .map(AccessoryBody::from)
            .collect(),
    })
}
