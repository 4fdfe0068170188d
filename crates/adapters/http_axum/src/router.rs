//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use sensorbridge_app::ports::PairingStore;

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<P>(state: AppState<P>) -> Router
where
    P: PairingStore + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value as Json, json};
    use tokio::sync::broadcast;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use sensorbridge_app::device_events::DeviceEvents;
    use sensorbridge_domain::accessory::{AccessoryInfo, AccessoryTree, Category};
    use sensorbridge_domain::pairing::{PairingRecords, PairingState, SetupCode, SetupId, SetupPayload};
    use sensorbridge_domain::sensor::SensorDescriptor;

    use super::*;
    use crate::api::CONTROLLER_HEADER;
    use crate::observer::ServerObserver;
    use crate::pairing::PairingRegistry;
    use crate::pairing::tests::MemoryStore;
    use crate::state::SetupInfo;

    // aid 2: CPU thermometer, currentTemperature at iid 9
    // aid 3: Fan-0, powerState at 9, rotationSpeed at 10
    // bridge identify at 1.2
    fn app_state() -> AppState<MemoryStore> {
        let info = AccessoryInfo::builder()
            .name("Bridge")
            .serial_number("0001")
            .build()
            .unwrap();
        let tree = Arc::new(AccessoryTree::build(
            info,
            &[
                SensorDescriptor::temperature("TC0P", "CPU"),
                SensorDescriptor::fan("0", "Fan-0"),
            ],
        ));
        let events = DeviceEvents::default();
        let (pushes, _) = broadcast::channel(16);
        tree.attach_observer(Arc::new(ServerObserver::new(events.clone(), pushes.clone())))
            .unwrap();

        let code: SetupCode = "031-45-154".parse().unwrap();
        let id: SetupId = "TEST".parse().unwrap();
        let payload = SetupPayload::new(&code, &id, Category::Bridge);

        AppState {
            tree,
            pairings: Arc::new(PairingRegistry::new(
                MemoryStore::default(),
                PairingRecords::default(),
                events.clone(),
            )),
            events,
            pushes,
            setup: Arc::new(SetupInfo { code, payload }),
            shutdown: CancellationToken::new(),
        }
    }

    async fn send(state: &AppState<MemoryStore>, request: Request<Body>) -> (StatusCode, Json) {
        let response = build(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Json::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &Json) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header(CONTROLLER_HEADER, "phone")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_answer_health_check() {
        let state = app_state();
        let response = build(state).oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn should_list_accessory_tree() {
        let state = app_state();
        let (status, body) = send(&state, get("/accessories")).await;

        assert_eq!(status, StatusCode::OK);
        let accessories = body["accessories"].as_array().unwrap();
        assert_eq!(accessories.len(), 3);
        assert_eq!(accessories[0]["aid"], 1);
        let temperature = &accessories[1]["services"][1]["characteristics"][0];
        assert_eq!(temperature["iid"], 9);
        assert_eq!(temperature["type"], "11");
        assert_eq!(temperature["perms"], json!(["pr", "ev"]));
        let identify = &accessories[0]["services"][0]["characteristics"][0];
        assert!(identify.get("value").is_none());
    }

    #[tokio::test]
    async fn should_read_characteristics() {
        let state = app_state();
        let (status, body) = send(&state, get("/characteristics?id=2.9,3.9")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"characteristics": [
                {"aid": 2, "iid": 9, "value": 0.0},
                {"aid": 3, "iid": 9, "value": false},
            ]})
        );
    }

    #[tokio::test]
    async fn should_report_per_item_status_when_a_read_fails() {
        let state = app_state();
        let (status, body) = send(&state, get("/characteristics?id=2.9,9.1,1.2")).await;

        assert_eq!(status, StatusCode::MULTI_STATUS);
        let items = body["characteristics"].as_array().unwrap();
        assert_eq!(items[0]["status"], 0);
        assert_eq!(items[1]["status"], -70409);
        assert_eq!(items[2]["status"], -70405);
    }

    #[tokio::test]
    async fn should_reject_malformed_read_ids() {
        let state = app_state();
        let (status, body) = send(&state, get("/characteristics?id=2-9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn should_write_fan_speed() {
        let state = app_state();
        let request = json_request(
            "PUT",
            "/characteristics",
            &json!({"characteristics": [{"aid": 3, "iid": 10, "value": 1500}]}),
        );

        let (status, _) = send(&state, request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let key = "3.10".parse().unwrap();
        assert_eq!(state.tree.characteristic(key).unwrap().read().as_f64(), Some(1500.0));
    }

    #[tokio::test]
    async fn should_report_write_failures_per_item() {
        let state = app_state();
        let request = json_request(
            "PUT",
            "/characteristics",
            &json!({"characteristics": [
                {"aid": 2, "iid": 9, "value": 30.0},
                {"aid": 3, "iid": 9, "value": "on"},
                {"aid": 7, "iid": 1, "value": true},
                {"aid": 3, "iid": 10, "value": 900},
            ]}),
        );

        let (status, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::MULTI_STATUS);
        let codes: Vec<i64> = body["characteristics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["status"].as_i64().unwrap())
            .collect();
        assert_eq!(codes, vec![-70404, -70410, -70409, 0]);
    }

    #[tokio::test]
    async fn should_subscribe_controller_and_publish_subscription() {
        let state = app_state();
        let mut subscribed = state.events.subscribe_subscribed();
        let request = json_request(
            "PUT",
            "/characteristics",
            &json!({"characteristics": [{"aid": 2, "iid": 9, "ev": true}]}),
        );

        let (status, _) = send(&state, request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let change = subscribed.recv().await.unwrap();
        assert_eq!(change.subscriber, "phone");
        let key = "2.9".parse().unwrap();
        assert!(state.tree.characteristic(key).unwrap().is_subscribed("phone"));
    }

    #[tokio::test]
    async fn should_reject_subscription_to_static_characteristic() {
        let state = app_state();
        let request = json_request(
            "PUT",
            "/characteristics",
            &json!({"characteristics": [{"aid": 1, "iid": 5, "ev": true}]}),
        );

        let (status, body) = send(&state, request).await;

        assert_eq!(status, StatusCode::MULTI_STATUS);
        assert_eq!(body["characteristics"][0]["status"], -70406);
    }

    #[tokio::test]
    async fn should_publish_identify_on_identify_write() {
        let state = app_state();
        let mut identify = state.events.subscribe_identify();
        let request = json_request(
            "PUT",
            "/characteristics",
            &json!({"characteristics": [{"aid": 2, "iid": 2, "value": true}]}),
        );

        let (status, _) = send(&state, request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(identify.recv().await.unwrap().aid.get(), 2);
    }

    #[tokio::test]
    async fn should_not_identify_when_identify_is_written_false() {
        let state = app_state();
        let mut identify = state.events.subscribe_identify();
        let request = json_request(
            "PUT",
            "/characteristics",
            &json!({"characteristics": [{"aid": 2, "iid": 2, "value": false}]}),
        );

        let (status, _) = send(&state, request).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(identify.try_recv().is_err());
    }

    #[tokio::test]
    async fn should_pair_and_unpair_controllers() {
        let state = app_state();
        let mut pairing = state.events.subscribe_pairing();

        let (status, body) = send(
            &state,
            json_request(
                "POST",
                "/pairings",
                &json!({"controller": "phone", "public_key": "abcd", "admin": true}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["controller"], "phone");
        assert_eq!(pairing.recv().await.unwrap().to, PairingState::Paired);

        let (_, listed) = send(&state, get("/pairings")).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let delete = Request::builder()
            .method("DELETE")
            .uri("/pairings/phone")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, delete).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(pairing.recv().await.unwrap().to, PairingState::NotPaired);
    }

    #[tokio::test]
    async fn should_reject_pairing_without_controller() {
        let state = app_state();
        let (status, _) = send(
            &state,
            json_request("POST", "/pairings", &json!({"controller": " ", "public_key": "abcd"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_found_when_unpairing_unknown_controller() {
        let state = app_state();
        let delete = Request::builder()
            .method("DELETE")
            .uri("/pairings/ghost")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&state, delete).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_describe_setup() {
        let state = app_state();
        let (status, body) = send(&state, get("/setup")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["setup_code"], "031-45-154");
        assert!(body["setup_uri"].as_str().unwrap().starts_with("X-HM://"));
        assert_eq!(body["paired"], false);
    }
}
