//! End-to-end checkout runs: the real HTTP adapters and file-backed
//! session store wired together against a stub server.

use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use tempfile::TempDir;
use tokio::time::sleep;

use checkout_wizard::{
    build_with_ports, Engine, FormPatch, PaymentPhase, PaymentRecord, PlanPhase, Step,
    WizardConfig, WizardState, WizardUiEvent,
};
use cw_core::ports::{AddressLookupPort, CheckoutApiPort, SessionStorePort, VerificationApiPort};
use cw_infra::{FileSessionStore, HttpCheckoutClient, HttpVerificationClient, ZippopotamClient};

fn fast_config() -> WizardConfig {
    WizardConfig {
        resend_cooldown_secs: 1,
        email_debounce: Duration::from_millis(5),
        stage_duration: Duration::from_millis(5),
        advance_dwell: Duration::from_millis(5),
        notification_lifetime: Duration::from_millis(200),
        redirect_delay: Duration::from_millis(5),
        ..WizardConfig::default()
    }
}

fn engine_against(server: &mockito::ServerGuard, data_dir: &TempDir) -> Engine {
    let api: Arc<dyn CheckoutApiPort> = Arc::new(HttpCheckoutClient::new(server.url()));
    let verification: Arc<dyn VerificationApiPort> =
        Arc::new(HttpVerificationClient::new(server.url()));
    let lookup: Arc<dyn AddressLookupPort> = Arc::new(ZippopotamClient::new(server.url()));
    let store: Arc<dyn SessionStorePort> =
        Arc::new(FileSessionStore::new(data_dir.path().to_path_buf()));
    build_with_ports(fast_config(), api, verification, lookup, store)
}

async fn mock_session_issuing(server: &mut mockito::ServerGuard, id: &str) -> mockito::Mock {
    server
        .mock("GET", "/api/generate-checkout-id")
        .with_status(200)
        .with_body(format!(
            r#"{{"status":"success","message":null,"data":{{"checkout_id":"{id}"}}}}"#
        ))
        .create_async()
        .await
}

async fn mock_cart(server: &mut mockito::ServerGuard, items: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", Matcher::Regex("^/api/cart".into()))
        .with_status(200)
        .with_body(
            json!({
                "status": "success",
                "message": null,
                "data": {"items": items, "subtotal": 99.0, "discount": 9.9, "total": 89.1},
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_happy_path(server: &mut mockito::ServerGuard) {
    server
        .mock("GET", Matcher::Regex("^/api/check-email-availability".into()))
        .with_status(200)
        .with_body(r#"{"status":"success","message":null,"data":{"available":true}}"#)
        .create_async().await;
    server
        .mock("POST", "/verify-phone")
        .with_status(200)
        .with_body(r#"{"status":"success","message":"code sent"}"#)
        .create_async().await;
    server
        .mock("POST", "/verify-code")
        .with_status(200)
        .with_body(r#"{"status":"success","message":"verified"}"#)
        .create_async().await;
    server
        .mock("POST", "/api/checkout")
        .with_status(200)
        .with_body(r#"{"status":"success","message":null}"#)
        .create_async().await;
    server
        .mock("POST", Matcher::Regex("^/api/link-account".into()))
        .with_status(200)
        .with_body(r#"{"status":"success","message":null}"#)
        .create_async().await;
    server
        .mock("PUT", "/api/update-checkout-id")
        .with_status(200)
        .with_body(r#"{"status":"success","message":null}"#)
        .create_async().await;
}

async fn fill_personal(engine: &Engine) {
    engine
        .wizard()
        .update_form(FormPatch {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: Some("ada@example.com".into()),
            phone: Some("(555) 123-4567".into()),
            zip_code: Some("94105".into()),
            state: Some("CA".into()),
            city: Some("San Francisco".into()),
            street: Some("123 Main St".into()),
            ..FormPatch::default()
        })
        .await;
    // Debounced availability probe plus one HTTP round trip.
    sleep(Duration::from_millis(80)).await;
}

async fn verify_phone(engine: &Engine) {
    engine.wizard().request_verification_code().await;
    sleep(Duration::from_millis(50)).await;
    engine.wizard().verification_code_changed("123456".into()).await;
    assert!(engine.wizard().verification().is_verified().await);
}

async fn pass_account(engine: &Engine) {
    engine
        .wizard()
        .update_form(FormPatch {
            password: Some("Secret123!".into()),
            confirm_password: Some("Secret123!".into()),
            ..FormPatch::default()
        })
        .await;
    engine.wizard().submit_account().await;
}

async fn settle(engine: &Engine) {
    sleep(Duration::from_millis(200)).await;
    let _ = engine.wizard().state().await;
}

#[tokio::test]
async fn full_checkout_against_stub_services() {
    let mut server = mockito::Server::new_async().await;
    let data_dir = TempDir::new().unwrap();

    mock_session_issuing(&mut server, "chk_live_1").await;
    mock_happy_path(&mut server).await;
    mock_cart(
        &mut server,
        json!([{"name": "Pro Shield", "description": "Annual plan",
                "price": 99.0, "quantity": 1, "isAnnual": true}]),
    )
    .await;
    // Rotation must flow into the payment submission.
    let payment_mock = server
        .mock("POST", "/api/process-payment")
        .match_body(Matcher::PartialJson(json!({"sessionId": "chk_rotated"})))
        .with_status(200)
        .with_body(r#"{"status":"success","message":null}"#)
        .create_async().await;

    let engine = engine_against(&server, &data_dir);
    let mut events = engine.subscribe().await;
    engine.wizard().start().await;
    assert!(data_dir.path().join("checkout/session.json").exists());

    // Later id mints (the pre-payment rotation) return the rotated id;
    // mockito prefers the newest matching mock.
    mock_session_issuing(&mut server, "chk_rotated").await;

    fill_personal(&engine).await;
    verify_phone(&engine).await;
    engine.wizard().submit_personal().await;
    assert_eq!(engine.wizard().state().await.step(), Step::Account);

    pass_account(&engine).await;
    settle(&engine).await;
    assert_eq!(
        engine.wizard().state().await,
        WizardState::Review {
            loading: false,
            error: None,
        }
    );
    assert!(engine.wizard().cart().await.is_some());

    engine.wizard().review_next().await;
    engine
        .wizard()
        .update_payment(PaymentRecord {
            card_holder_name: "Ada Lovelace".into(),
            card_number: "4111 1111 1111 1111".into(),
            expiry: "12/99".into(),
            cvv: "123".into(),
        })
        .await;
    engine.wizard().submit_payment(true).await;
    settle(&engine).await;

    assert_eq!(
        engine.wizard().state().await,
        WizardState::Payment(PaymentPhase::Succeeded)
    );
    payment_mock.assert_async().await;

    // The redirect fires and tears the session down.
    let mut redirect = None;
    while let Ok(event) = events.try_recv() {
        if let WizardUiEvent::RedirectRequested { url } = event {
            redirect = Some(url);
        }
    }
    assert_eq!(redirect.as_deref(), Some("/confirmation"));
    assert!(!data_dir.path().join("checkout/session.json").exists());
}

#[tokio::test]
async fn empty_cart_blocks_until_retry_finds_items() {
    let mut server = mockito::Server::new_async().await;
    let data_dir = TempDir::new().unwrap();

    mock_session_issuing(&mut server, "chk_live_2").await;
    mock_happy_path(&mut server).await;
    let empty_cart = mock_cart(&mut server, json!([])).await;

    let engine = engine_against(&server, &data_dir);
    engine.wizard().start().await;

    fill_personal(&engine).await;
    verify_phone(&engine).await;
    engine.wizard().submit_personal().await;
    pass_account(&engine).await;
    settle(&engine).await;
    assert_eq!(
        engine.wizard().state().await,
        WizardState::Plan(PlanPhase::EmptyCart)
    );

    empty_cart.remove_async().await;
    mock_cart(
        &mut server,
        json!([{"name": "Pro Shield", "description": "Annual plan",
                "price": 99.0, "quantity": 1, "isAnnual": true}]),
    )
    .await;

    engine.wizard().plan_retry().await;
    settle(&engine).await;
    assert_eq!(
        engine.wizard().state().await,
        WizardState::Review {
            loading: false,
            error: None,
        }
    );
}

#[tokio::test]
async fn persisted_session_is_reused_across_engines() {
    let mut server = mockito::Server::new_async().await;
    let data_dir = TempDir::new().unwrap();

    let issue = mock_session_issuing(&mut server, "chk_live_3").await;

    let first = engine_against(&server, &data_dir);
    first.wizard().start().await;
    issue.assert_async().await;

    // A second engine over the same data dir picks the session up from
    // disk instead of minting a new one.
    let second = engine_against(&server, &data_dir);
    second.wizard().start().await;
    issue.assert_async().await;
}
