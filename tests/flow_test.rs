// Integration tests for the phone login state machine using wiremock.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use intersvyaz_api::{Error, IntersvyazClient, PhoneAuthFlow, Stage};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, IntersvyazClient) {
    let server = MockServer::start().await;
    let client =
        IntersvyazClient::from_reqwest(&server.uri(), &server.uri(), reqwest::Client::new())
            .unwrap();
    (server, client)
}

/// JSON bodies of every request the server saw on the given path, in order.
async fn bodies_for(server: &MockServer, wanted: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == wanted)
        .map(|req| serde_json::from_slice(&req.body).unwrap())
        .collect()
}

fn confirm_response() -> Value {
    json!({
        "authId": "auth-77",
        "addresses": [
            { "ADDRESS": "ул. Ленина, 1", "USER_ID": 101 },
            { "ADDRESS": "ул. Кирова, 5", "USER_ID": "102" },
        ]
    })
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_phone_login() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirm_response()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/get-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "TOKEN": "tok" })))
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    assert_eq!(flow.stage(), Stage::Idle);

    flow.submit_phone(&client, "+79991234567").await.unwrap();
    assert_eq!(flow.stage(), Stage::AwaitingCode);

    let addresses = flow.submit_code(&client, "1234").await.unwrap();
    assert_eq!(flow.stage(), Stage::AwaitingAddress);
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].label, "ул. Ленина, 1");
    assert_eq!(addresses[0].user_id, "101");
    assert_eq!(addresses[1].user_id, "102");

    let token = flow
        .select_address(&client, "ул. Ленина, 1")
        .await
        .unwrap();
    assert_eq!(flow.stage(), Stage::Completed);
    assert_eq!(token.as_str(), "tok");
    assert_eq!(flow.token().map(intersvyaz_api::AuthToken::as_str), Some("tok"));

    // The token exchange carried the chosen address's user id.
    let exchanges = bodies_for(&server, "/mobile/auth/get-token").await;
    assert_eq!(exchanges[0]["userId"], "101");
    assert_eq!(exchanges[0]["authId"], "auth-77");
}

#[tokio::test]
async fn test_device_id_is_stable_within_an_attempt() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirm_response()))
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    flow.submit_phone(&client, "+79991234567").await.unwrap();
    flow.submit_code(&client, "1234").await.unwrap();

    let sms = bodies_for(&server, "/mobile/auth/send-sms").await;
    let confirms = bodies_for(&server, "/mobile/auth/confirm").await;

    let device_id = sms[0]["uniqueDeviceId"].as_str().unwrap();
    assert_eq!(confirms[0]["uniqueDeviceId"].as_str().unwrap(), device_id);

    // uuid4 without hyphens.
    assert_eq!(device_id.len(), 32);
    assert!(device_id.chars().all(|c| c.is_ascii_hexdigit()));

    // The country prefix was stripped before both requests.
    assert_eq!(sms[0]["phone"], "9991234567");
    assert_eq!(confirms[0]["phone"], "9991234567");
}

#[tokio::test]
async fn test_each_attempt_generates_a_fresh_device_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let mut first = PhoneAuthFlow::new();
    first.submit_phone(&client, "9991234567").await.unwrap();
    let mut second = PhoneAuthFlow::new();
    second.submit_phone(&client, "9991234567").await.unwrap();

    let sms = bodies_for(&server, "/mobile/auth/send-sms").await;
    assert_eq!(sms.len(), 2);
    assert_ne!(sms[0]["uniqueDeviceId"], sms[1]["uniqueDeviceId"]);
}

// ── Step failures ───────────────────────────────────────────────────

#[tokio::test]
async fn test_sms_send_failure_stays_idle_with_server_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "Превышен лимит" })),
        )
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    let result = flow.submit_phone(&client, "9991234567").await;

    match result {
        Err(Error::SmsSendFailed { ref message }) => assert_eq!(message, "Превышен лимит"),
        other => panic!("expected SmsSendFailed, got: {other:?}"),
    }
    assert_eq!(flow.stage(), Stage::Idle);
}

#[tokio::test]
async fn test_invalid_code_keeps_device_id_for_the_retry() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    // First confirmation lacks authId, second succeeds.
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "wrong" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirm_response()))
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    flow.submit_phone(&client, "9991234567").await.unwrap();

    let result = flow.submit_code(&client, "0000").await;
    assert!(
        matches!(result, Err(Error::InvalidCode)),
        "expected InvalidCode, got: {result:?}"
    );
    assert_eq!(flow.stage(), Stage::AwaitingCode);

    flow.submit_code(&client, "1234").await.unwrap();
    assert_eq!(flow.stage(), Stage::AwaitingAddress);

    // Both confirmations reused the device id the SMS was requested with.
    let sms = bodies_for(&server, "/mobile/auth/send-sms").await;
    let confirms = bodies_for(&server, "/mobile/auth/confirm").await;
    assert_eq!(confirms.len(), 2);
    assert_eq!(confirms[0]["uniqueDeviceId"], sms[0]["uniqueDeviceId"]);
    assert_eq!(confirms[1]["uniqueDeviceId"], sms[0]["uniqueDeviceId"]);
}

#[tokio::test]
async fn test_unknown_address_label_is_reported_without_state_change() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirm_response()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/get-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "TOKEN": "tok" })))
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    flow.submit_phone(&client, "9991234567").await.unwrap();
    flow.submit_code(&client, "1234").await.unwrap();

    let result = flow.select_address(&client, "ул. Выдуманная, 9").await;
    match result {
        Err(Error::AddressNotFound { ref label }) => assert_eq!(label, "ул. Выдуманная, 9"),
        other => panic!("expected AddressNotFound, got: {other:?}"),
    }
    assert_eq!(flow.stage(), Stage::AwaitingAddress);

    // A valid label still works afterwards.
    flow.select_address(&client, "ул. Кирова, 5").await.unwrap();
    assert_eq!(flow.stage(), Stage::Completed);
}

#[tokio::test]
async fn test_exchange_failure_keeps_awaiting_address() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirm_response()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/get-token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    flow.submit_phone(&client, "9991234567").await.unwrap();
    flow.submit_code(&client, "1234").await.unwrap();

    let result = flow.select_address(&client, "ул. Ленина, 1").await;
    match result {
        Err(Error::TokenExchangeFailed { ref cause }) => {
            assert!(matches!(**cause, Error::Http { status: 500 }));
        }
        other => panic!("expected TokenExchangeFailed, got: {other:?}"),
    }
    assert_eq!(flow.stage(), Stage::AwaitingAddress);
}

// ── Out-of-order calls ──────────────────────────────────────────────

#[tokio::test]
async fn test_select_address_before_code_never_touches_the_network() {
    let (server, client) = setup().await;

    let mut flow = PhoneAuthFlow::new();
    let result = flow.select_address(&client, "ул. Ленина, 1").await;

    match result {
        Err(Error::InvalidTransition { expected, got }) => {
            assert_eq!(expected, "AwaitingAddress");
            assert_eq!(got, "Idle");
        }
        other => panic!("expected InvalidTransition, got: {other:?}"),
    }
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_submit_code_before_phone_is_rejected() {
    let (server, client) = setup().await;

    let mut flow = PhoneAuthFlow::new();
    let result = flow.submit_code(&client, "1234").await;

    assert!(
        matches!(result, Err(Error::InvalidTransition { .. })),
        "expected InvalidTransition, got: {result:?}"
    );
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_completed_flow_is_terminal() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/mobile/auth/send-sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirm_response()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mobile/auth/get-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "TOKEN": "tok" })))
        .mount(&server)
        .await;

    let mut flow = PhoneAuthFlow::new();
    flow.submit_phone(&client, "9991234567").await.unwrap();
    flow.submit_code(&client, "1234").await.unwrap();
    flow.select_address(&client, "ул. Ленина, 1").await.unwrap();

    let result = flow.submit_phone(&client, "9991234567").await;
    match result {
        Err(Error::InvalidTransition { expected, got }) => {
            assert_eq!(expected, "Idle");
            assert_eq!(got, "Completed");
        }
        other => panic!("expected InvalidTransition, got: {other:?}"),
    }
}
