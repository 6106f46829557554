#![allow(clippy::unwrap_used)]
// Module-level tests for `netapp_e_mgmt_interface` against a wiremock
// SANtricity REST endpoint.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{any, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storctl_core::modules::mgmt_interface::UPDATED_MESSAGE;
use storctl_core::{CoreError, ModuleInvocation, ModuleKind, ModuleRunner, RetryPolicy};

const CONTROLLERS: &str = "/devmgr/v2/storage-systems/1/controllers";
const INTERFACES: &str = "/devmgr/v2/storage-systems/1/configuration/ethernet-interfaces";

const CONTROLLER_A: &str = "070000000000000000000001";
const CONTROLLER_B: &str = "070000000000000000000002";
const WAN0_A: &str = "2800070000000000000000000001000000000000";

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 15,
        delay: Duration::from_millis(1),
    }
}

fn invocation(server: &MockServer, extra: Value, check_mode: bool) -> ModuleInvocation {
    let mut args = json!({
        "api_url": format!("{}/devmgr/v2", server.uri()),
        "api_username": "rw",
        "api_password": "rw-password",
        "ssid": "1",
        "validate_certs": false,
        "controller": "A",
    });
    args.as_object_mut()
        .unwrap()
        .extend(extra.as_object().unwrap().clone());
    args["_ansible_check_mode"] = json!(check_mode);
    ModuleInvocation::from_json_str(&args.to_string()).unwrap()
}

async fn run(server: &MockServer, extra: Value, check_mode: bool) -> Result<Value, CoreError> {
    let runner: ModuleRunner = ModuleRunner::default().with_retry_policy(fast_retry());
    runner
        .run(ModuleKind::MgmtInterface, &invocation(server, extra, check_mode))
        .await
}

fn controllers() -> Value {
    // Listed out of slot order on purpose.
    json!([
        {
            "controllerRef": CONTROLLER_B,
            "physicalLocation": { "slot": 2 },
            "networkSettings": { "remoteAccessEnabled": false }
        },
        {
            "controllerRef": CONTROLLER_A,
            "physicalLocation": { "slot": 1 },
            "networkSettings": { "remoteAccessEnabled": false }
        }
    ])
}

fn interfaces() -> Value {
    json!([
        {
            "interfaceRef": WAN0_A,
            "controllerRef": CONTROLLER_A,
            "controllerSlot": 1,
            "alias": "creG1g-AD-a",
            "interfaceName": "wan0",
            "channel": 1,
            "ipv4Enabled": true,
            "ipv6Enabled": false,
            "ipv4AddressConfigMethod": "configDhcp",
            "ipv4Address": "10.1.1.10",
            "ipv4SubnetMask": "255.255.255.0",
            "ipv4GatewayAddress": "10.1.1.1",
            "dnsProperties": {
                "acquisitionProperties": { "dnsAcquisitionType": "dhcp", "dnsServers": [] }
            },
            "ntpProperties": {
                "acquisitionProperties": { "ntpAcquisitionType": "dhcp", "ntpServers": [] }
            }
        },
        {
            "interfaceRef": "2800070000000000000000000002000000000000",
            "controllerRef": CONTROLLER_B,
            "controllerSlot": 2,
            "alias": "creG1g-AD-b",
            "interfaceName": "wan0",
            "channel": 1,
            "ipv4Enabled": true,
            "ipv4AddressConfigMethod": "configDhcp"
        }
    ])
}

async fn mount_inventory(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(CONTROLLERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(controllers()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(INTERFACES))
        .respond_with(ResponseTemplate::new(200).set_body_json(interfaces()))
        .mount(server)
        .await;
}

async fn mount_update(server: &MockServer, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path(INTERFACES))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

async fn refuse_everything(server: &MockServer) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

fn static_address() -> Value {
    json!({
        "name": "wan0",
        "state": "enable",
        "config_method": "static",
        "address": "10.1.1.20",
        "subnet_mask": "255.255.255.0",
    })
}

// ── Updates ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_static_address_is_posted() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    Mock::given(method("POST"))
        .and(path(INTERFACES))
        .and(body_partial_json(json!({
            "controllerRef": CONTROLLER_A,
            "interfaceRef": WAN0_A,
            "ipv4Enabled": true,
            "ipv4AddressConfigMethod": "configStatic",
            "ipv4Address": "10.1.1.20",
            "ipv4SubnetMask": "255.255.255.0",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let result = run(&server, static_address(), false).await.unwrap();
    assert_eq!(
        result,
        json!({ "changed": true, "msg": UPDATED_MESSAGE, "enabled": true })
    );
}

#[tokio::test]
async fn test_port_can_be_selected_by_channel() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(&server, ResponseTemplate::new(200), 1).await;

    let result = run(
        &server,
        json!({ "channel": 1, "dns_config_method": "static", "dns_address": "192.168.1.1" }),
        false,
    )
    .await
    .unwrap();
    assert_eq!(result["changed"], true);
}

#[tokio::test]
async fn test_matching_settings_make_no_update() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(&server, ResponseTemplate::new(200), 0).await;

    let result = run(
        &server,
        json!({ "name": "creG1g-AD-a", "state": "enable", "config_method": "dhcp" }),
        false,
    )
    .await
    .unwrap();
    assert_eq!(result["changed"], false);
    assert_eq!(result["msg"], UPDATED_MESSAGE);
}

#[tokio::test]
async fn test_check_mode_reports_change_without_update() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(&server, ResponseTemplate::new(200), 0).await;

    let result = run(&server, static_address(), true).await.unwrap();
    assert_eq!(result["changed"], true);
}

#[tokio::test]
async fn test_disabling_last_ip_stack_is_rejected() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(
        &server,
        ResponseTemplate::new(422).set_body_json(json!({
            "retcode": "illegalParam",
            "errorMessage": "Both IPv4 and IPv6 would be disabled",
        })),
        1,
    )
    .await;

    let err = run(
        &server,
        json!({ "name": "wan0", "state": "disable", "config_method": "dhcp" }),
        false,
    )
    .await
    .unwrap_err();
    assert!(
        err.to_string()
            .starts_with("This storage-system already has IPv6 connectivity disabled."),
        "{err}"
    );
    assert!(err.to_string().contains("Array Id [1]"));
}

#[tokio::test]
async fn test_other_update_failure_is_reported() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(
        &server,
        ResponseTemplate::new(422).set_body_json(json!({ "retcode": "invalidAddress" })),
        1,
    )
    .await;

    let err = run(&server, static_address(), false).await.unwrap_err();
    assert!(
        err.to_string()
            .starts_with("We failed to configure the management interface. Array Id [1]"),
        "{err}"
    );
}

#[tokio::test]
async fn test_rejected_credentials_on_update_are_an_auth_failure() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(&server, ResponseTemplate::new(401), 1).await;

    let err = run(&server, static_address(), false).await.unwrap_err();
    assert!(
        matches!(err, CoreError::AuthenticationFailed { .. }),
        "expected AuthenticationFailed, got: {err:?}"
    );
    assert!(!err.to_string().contains("Connection failure"), "{err}");
}

#[tokio::test]
async fn test_name_is_preferred_over_channel() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;

    Mock::given(method("POST"))
        .and(path(INTERFACES))
        .and(body_partial_json(json!({ "interfaceRef": WAN0_A })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut args = static_address();
    args["channel"] = json!(9);
    let result = run(&server, args, false).await.unwrap();
    assert_eq!(result["changed"], true);
}

// ── Lookup failures ─────────────────────────────────────────────────

#[tokio::test]
async fn test_unknown_interface_is_reported() {
    let server = MockServer::start().await;
    mount_inventory(&server).await;
    mount_update(&server, ResponseTemplate::new(200), 0).await;

    let err = run(
        &server,
        json!({ "name": "wan9", "state": "enable", "config_method": "dhcp" }),
        false,
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "We could not find an interface matching [wan9] on Array=[1]."
    );
}

#[tokio::test]
async fn test_missing_controller_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTROLLERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "controllerRef": CONTROLLER_A,
            "physicalLocation": { "slot": 1 }
        }])))
        .mount(&server)
        .await;

    let err = run(
        &server,
        json!({ "controller": "B", "channel": 1, "ssh": true }),
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
    assert_eq!(
        err.to_string(),
        "Controller [B] does not exist on Array=[1]."
    );
}

// ── Unavailability retry ────────────────────────────────────────────

#[tokio::test]
async fn test_offline_system_is_retried_until_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTROLLERS))
        .respond_with(ResponseTemplate::new(424).set_body_json(json!({ "errorMessage": "offline" })))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(CONTROLLERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(controllers()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(INTERFACES))
        .respond_with(ResponseTemplate::new(200).set_body_json(interfaces()))
        .mount(&server)
        .await;
    mount_update(&server, ResponseTemplate::new(200), 1).await;

    let result = run(&server, static_address(), false).await.unwrap();
    assert_eq!(result["changed"], true);
}

#[tokio::test]
async fn test_offline_system_gives_up_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTROLLERS))
        .respond_with(ResponseTemplate::new(424))
        .expect(16)
        .mount(&server)
        .await;
    mount_update(&server, ResponseTemplate::new(200), 0).await;

    let err = run(&server, static_address(), false).await.unwrap_err();
    match &err {
        CoreError::Unavailable { attempts, message } => {
            assert_eq!(*attempts, 16);
            assert!(
                message.starts_with("We failed to pull storage-system information. Array Id [1]"),
                "{message}"
            );
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

// ── Validation ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_static_without_address_makes_no_request() {
    let server = MockServer::start().await;
    refuse_everything(&server).await;

    let err = run(
        &server,
        json!({ "name": "wan0", "state": "enable", "config_method": "static" }),
        false,
    )
    .await
    .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.to_string(),
        "config_method is static but all of the following are missing: address, subnet_mask"
    );
}

#[tokio::test]
async fn test_port_is_required() {
    let server = MockServer::start().await;
    refuse_everything(&server).await;

    let err = run(&server, json!({ "ssh": true }), false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "one of the following is required: name, channel"
    );
}

#[tokio::test]
async fn test_enabling_requires_config_method() {
    let server = MockServer::start().await;
    refuse_everything(&server).await;

    let err = run(&server, json!({ "name": "wan0", "state": "enable" }), false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "state is enable but all of the following are missing: config_method"
    );
}

#[tokio::test]
async fn test_controller_letter_is_checked() {
    let server = MockServer::start().await;
    refuse_everything(&server).await;

    let err = run(&server, json!({ "controller": "C", "name": "wan0" }), false)
        .await
        .unwrap_err();
    assert!(err.is_validation());
}
