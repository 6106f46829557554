#![allow(clippy::unwrap_used)]
// Integration tests for `EseriesClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storctl_api::eseries::InterfaceUpdate;
use storctl_api::{EseriesClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, EseriesClient) {
    let server = MockServer::start().await;
    let client = EseriesClient::with_client(
        reqwest::Client::new(),
        &format!("{}/devmgr/v2", server.uri()),
        "1".into(),
        "admin".into(),
        SecretString::from("myPass".to_owned()),
    )
    .unwrap();
    (server, client)
}

fn system_path(suffix: &str) -> String {
    format!("/devmgr/v2/storage-systems/1/{suffix}")
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_controllers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(system_path("controllers")))
        .and(basic_auth("admin", "myPass"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "controllerRef": "070000000000000000000002",
                "physicalLocation": { "slot": 2 },
                "networkSettings": { "remoteAccessEnabled": true }
            },
            {
                "controllerRef": "070000000000000000000001",
                "physicalLocation": { "slot": 1 },
                "networkSettings": { "remoteAccessEnabled": false }
            }
        ])))
        .mount(&server)
        .await;

    let controllers = client.list_controllers().await.unwrap();
    assert_eq!(controllers.len(), 2);
    assert_eq!(controllers[0].physical_location.slot, 2);
    assert!(controllers[0].network_settings.remote_access_enabled);
}

#[tokio::test]
async fn test_list_interfaces_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(system_path("configuration/ethernet-interfaces")))
        .respond_with(ResponseTemplate::new(424).set_body_json(json!({ "errorMessage": "offline" })))
        .mount(&server)
        .await;

    let err = client.list_ethernet_interfaces().await.unwrap_err();
    assert!(err.is_unavailable(), "expected 424, got {err:?}");
    assert!(err.to_string().contains("offline"));
}

#[tokio::test]
async fn test_probe_returns_status_without_failing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(system_path("controllers")))
        .respond_with(ResponseTemplate::new(424))
        .mount(&server)
        .await;

    let raw = client.probe_controllers().await.unwrap();
    assert_eq!(raw.status, 424);
    assert!(!raw.is_success());
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_interface_posts_body() {
    let (server, client) = setup().await;

    let update = InterfaceUpdate {
        controller_ref: "070000000000000000000001".into(),
        interface_ref: "2800070000000000000000000001000000000000".into(),
        ipv4_enabled: Some(true),
        ipv4_address_config_method: Some("configDhcp".into()),
        ..InterfaceUpdate::default()
    };

    Mock::given(method("POST"))
        .and(path(system_path("configuration/ethernet-interfaces")))
        .and(body_json(json!({
            "controllerRef": "070000000000000000000001",
            "interfaceRef": "2800070000000000000000000001000000000000",
            "ipv4Enabled": true,
            "ipv4AddressConfigMethod": "configDhcp"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let raw = client.update_ethernet_interface(&update).await.unwrap();
    assert!(raw.is_success());
}

#[tokio::test]
async fn test_update_interface_422_is_returned_raw() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "retcode": "illegalParam",
            "errorMessage": "IPv4 cannot be disabled"
        })))
        .mount(&server)
        .await;

    let raw = client
        .update_ethernet_interface(&InterfaceUpdate::default())
        .await
        .unwrap();
    assert_eq!(raw.status, 422);
    assert_eq!(raw.body["retcode"], "illegalParam");
}

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_controllers().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}
