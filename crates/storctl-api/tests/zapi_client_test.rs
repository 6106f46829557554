#![allow(clippy::unwrap_used)]
// Integration tests for `ZapiClient` using wiremock.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{basic_auth, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storctl_api::zapi::{CifsServerCreate, EmsEvent, ZAPI_SERVLET_PATH};
use storctl_api::{Error, ZapiClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(vserver: Option<&str>) -> (MockServer, ZapiClient) {
    let server = MockServer::start().await;
    let url = Url::parse(&server.uri()).unwrap().join(ZAPI_SERVLET_PATH).unwrap();
    let client = ZapiClient::with_client(
        reqwest::Client::new(),
        url,
        "admin".into(),
        SecretString::from("netapp1!".to_owned()),
        vserver.map(String::from),
    );
    (server, client)
}

fn passed(inner: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<?xml version='1.0' encoding='UTF-8' ?>\
         <netapp version='1.110' xmlns='http://www.netapp.com/filer/admin'>\
         <results status=\"passed\">{inner}</results></netapp>"
    ))
}

fn failed(errno: &str, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(format!(
        "<netapp version='1.110'><results status=\"failed\" errno=\"{errno}\" reason=\"{reason}\"/></netapp>"
    ))
}

// ── CIFS server ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_cifs_server_found() {
    let (server, client) = setup(Some("svm1")).await;

    Mock::given(method("POST"))
        .and(path(ZAPI_SERVLET_PATH))
        .and(basic_auth("admin", "netapp1!"))
        .and(body_string_contains("<cifs-server-get-iter>"))
        .and(body_string_contains("<cifs-server>data2</cifs-server>"))
        .and(body_string_contains("vfiler=\"svm1\""))
        .respond_with(passed(
            "<attributes-list><cifs-server-config>\
             <cifs-server>DATA2</cifs-server>\
             <administrative-status>down</administrative-status>\
             <domain>example.com</domain>\
             </cifs-server-config></attributes-list>\
             <num-records>1</num-records>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let info = client.get_cifs_server("data2").await.unwrap().unwrap();
    assert_eq!(info.cifs_server, "DATA2");
    assert_eq!(info.administrative_status.as_deref(), Some("down"));
    assert_eq!(info.domain.as_deref(), Some("example.com"));
    assert_eq!(info.workgroup, None);
}

#[tokio::test]
async fn test_get_cifs_server_missing() {
    let (server, client) = setup(Some("svm1")).await;

    Mock::given(method("POST"))
        .and(body_string_contains("<cifs-server-get-iter>"))
        .respond_with(passed("<num-records>0</num-records>"))
        .mount(&server)
        .await;

    assert!(client.get_cifs_server("data2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_cifs_server_sends_options() {
    let (server, client) = setup(Some("svm1")).await;

    Mock::given(method("POST"))
        .and(body_string_contains("<cifs-server-create>"))
        .and(body_string_contains("<administrative-status>up</administrative-status>"))
        .and(body_string_contains("<domain>example.com</domain>"))
        .respond_with(passed(""))
        .expect(1)
        .mount(&server)
        .await;

    client
        .create_cifs_server(&CifsServerCreate {
            cifs_server: "data2".into(),
            administrative_status: "up".into(),
            domain: Some("example.com".into()),
            ..CifsServerCreate::default()
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_vendor_failure_surfaces_errno() {
    let (server, client) = setup(Some("svm1")).await;

    Mock::given(method("POST"))
        .and(body_string_contains("<cifs-server-delete>"))
        .respond_with(failed("15661", "The CIFS server does not exist"))
        .mount(&server)
        .await;

    let err = client.delete_cifs_server().await.unwrap_err();
    assert!(matches!(&err, Error::Zapi { errno, .. } if errno == "15661"), "{err:?}");
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test]
async fn test_ems_log_event() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(body_string_contains("<ems-autosupport-log>"))
        .and(body_string_contains(
            "<event-source>na_ontap_cifs_server</event-source>",
        ))
        .respond_with(passed(""))
        .expect(1)
        .mount(&server)
        .await;

    client
        .ems_log_event(&EmsEvent::setup("na_ontap_cifs_server"))
        .await
        .unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.start_cifs_server().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_http_error_keeps_body() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal failure"))
        .mount(&server)
        .await;

    match client.stop_cifs_server().await {
        Err(Error::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal failure");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}
