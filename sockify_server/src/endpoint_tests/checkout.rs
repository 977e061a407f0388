use actix_web::{http::StatusCode, web, web::ServiceConfig};
use sockify_common::Cents;
use sockify_engine::{
    checkout_objects::CheckoutConfig,
    test_utils::{
        fakes::{FakePaymentGateway, RecordingNotifier},
        prepare_env::new_test_database,
        seed::{count_order_updates, seed_variant, variant_quantity},
    },
    traits::{NotificationError, PaymentGatewayError, PaymentSessionStatus},
    CheckoutApi,
    SqliteDatabase,
};

use super::helpers::{get_request, json, post_request};
use crate::{
    endpoint_tests::mocks::{MockGateway, MockNotifier},
    routes::{CheckoutRoute, ConfirmPaymentRoute},
};

const CHECKOUT_PATH: &str = "/cart/checkout/stripe-session";

fn confirmation_path(session_id: &str) -> String {
    format!("/cart/checkout/stripe-confirmation/{session_id}")
}

#[actix_web::test]
async fn checkout_returns_a_payment_url() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let body = cart_body(&format!(r#"[{{"sockVariantId":{variant},"quantity":2}}]"#));

    let (status, body) = post_request("", CHECKOUT_PATH, &body, configure(db.clone(), gateway.clone(), notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"paymentURL":"https://checkout.test/pay/cs_test_0001"}"#);
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 3);

    let request = gateway.last_request().expect("No session was requested");
    assert_eq!(request.currency, "usd");
    assert_eq!(request.line_items.len(), 1);
    assert_eq!(request.line_items[0].unit_amount, Cents::from(1250));
    assert_eq!(request.line_items[0].quantity, 2);
    assert_eq!(request.success_url, "https://sockify.test/cart/checkout/order-confirmation?session_id={CHECKOUT_SESSION_ID}");
}

#[actix_web::test]
async fn checkout_accepts_cart_items_and_ignores_prices() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Stripes", Cents::from(900), 10).await.unwrap();
    let body = format!(
        r#"{{"cartItems":[{{"sockVariantId":{variant},"quantity":1,"price":0.01}}],"address":{},"contact":{}}}"#,
        ADDRESS, CONTACT
    );
    let (status, _) = post_request("", CHECKOUT_PATH, &body, configure(db.clone(), gateway.clone(), notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let request = gateway.last_request().expect("No session was requested");
    assert_eq!(request.line_items[0].unit_amount, Cents::from(900));
}

#[actix_web::test]
async fn checkout_with_an_empty_cart() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let (status, body) = post_request("", CHECKOUT_PATH, &cart_body("[]"), configure(db, gateway.clone(), notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"The cart is empty"}"#);
    assert!(gateway.requests().is_empty());
}

#[actix_web::test]
async fn checkout_with_too_many_socks() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 1).await.unwrap();
    let body = cart_body(&format!(r#"[{{"sockVariantId":{variant},"quantity":3}}]"#));
    let (status, body) = post_request("", CHECKOUT_PATH, &body, configure(db.clone(), gateway.clone(), notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        format!(
            r#"{{"message":"Sock variant {variant} is out of stock. Requested 3, but only 1 available"}}"#
        )
    );
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 1);
    assert!(gateway.requests().is_empty());
}

#[actix_web::test]
async fn checkout_with_an_unknown_variant() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let body = cart_body(r#"[{"sockVariantId":404,"quantity":1}]"#);
    let (status, body) =
        post_request("", CHECKOUT_PATH, &body, configure(db, gateway, notifier)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Sock variant 404 does not exist"}"#);
}

#[actix_web::test]
async fn checkout_without_a_contact_email() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let body = format!(
        r#"{{"items":[{{"sockVariantId":{variant},"quantity":1}}],"address":{ADDRESS},"contact":{{"firstname":"Ada","lastname":"Lovelace","email":"","phone":"555-0100"}}}}"#
    );
    let (status, body) = post_request("", CHECKOUT_PATH, &body, configure(db.clone(), gateway, notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Invalid request. The email field is required"}"#);
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 5);
}

#[actix_web::test]
async fn checkout_with_malformed_json() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let (status, body) = post_request("", CHECKOUT_PATH, r#"{"items": [ }"#, configure(db, gateway, notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"message":"Invalid JSON payload."#));
}

#[actix_web::test]
async fn checkout_when_stripe_is_down() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    gateway.fail_session_creation(true);
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let body = cart_body(&format!(r#"[{{"sockVariantId":{variant},"quantity":2}}]"#));
    let (status, body) = post_request("", CHECKOUT_PATH, &body, configure(db.clone(), gateway, notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("The payment gateway could not be reached"));
    // The abandoned order gives its socks back
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 5);
}

#[actix_web::test]
async fn confirm_a_completed_payment() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let order_id = place_order(&db, &gateway, &notifier, variant, 2).await;
    let session_id = gateway.session_for_order(order_id).expect("No session for order");
    gateway.set_status(&session_id, PaymentSessionStatus::Complete);

    let path = confirmation_path(&session_id);
    let (status, body) = get_request("", &path, configure(db.clone(), gateway.clone(), notifier.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let confirmation = json(&body);
    assert_eq!(confirmation["status"], "received");
    assert_eq!(confirmation["total"], 25.0);
    assert_eq!(confirmation["address"]["street"], "12 Wool Lane");
    assert_eq!(confirmation["items"][0]["name"], "Argyle");
    assert_eq!(confirmation["items"][0]["quantity"], 2);
    assert_eq!(notifier.sent_count(), 1);
    assert_eq!(notifier.sent()[0].0.email, "ada@example.com");
    // Only the payment confirmation is audited
    assert_eq!(count_order_updates(db.pool(), order_id).await.unwrap(), 1);

    // Customers reload pages. Nothing changes the second time around
    let (status, again) = get_request("", &path, configure(db.clone(), gateway, notifier.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&again)["invoiceNumber"], confirmation["invoiceNumber"]);
    assert_eq!(notifier.sent_count(), 1);
    assert_eq!(count_order_updates(db.pool(), order_id).await.unwrap(), 1);
}

#[actix_web::test]
async fn mail_failures_do_not_undo_a_confirmation() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, recorder) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let order_id = place_order(&db, &gateway, &recorder, variant, 1).await;
    let session_id = gateway.session_for_order(order_id).expect("No session for order");
    gateway.set_status(&session_id, PaymentSessionStatus::Complete);

    let mut notifier = MockNotifier::new();
    notifier
        .expect_send_order_confirmation()
        .withf(|recipient, confirmation| recipient.email == "ada@example.com" && confirmation.items.len() == 1)
        .times(1)
        .returning(|_, _| Err(NotificationError("SendGrid answered 503".into())));
    let configure = {
        let db = db.clone();
        move |cfg: &mut ServiceConfig| {
            let api = CheckoutApi::new(db, gateway, notifier, checkout_config());
            cfg.app_data(web::Data::new(api))
                .service(ConfirmPaymentRoute::<SqliteDatabase, FakePaymentGateway, MockNotifier>::new());
        }
    };
    let (status, body) = get_request("", &confirmation_path(&session_id), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["total"], 12.5);
    assert_eq!(count_order_updates(db.pool(), order_id).await.unwrap(), 1);
}

#[actix_web::test]
async fn confirm_a_pending_payment() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let order_id = place_order(&db, &gateway, &notifier, variant, 1).await;
    let session_id = gateway.session_for_order(order_id).expect("No session for order");

    let path = confirmation_path(&session_id);
    let (status, body) =
        get_request("", &path, configure(db.clone(), gateway, notifier.clone())).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Payment for this order is still pending"}"#);
    assert_eq!(notifier.sent_count(), 0);
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 4);
}

#[actix_web::test]
async fn confirm_an_expired_payment() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let variant = seed_variant(db.pool(), "Argyle", Cents::from(1250), 5).await.unwrap();
    let order_id = place_order(&db, &gateway, &notifier, variant, 3).await;
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 2);
    let session_id = gateway.session_for_order(order_id).expect("No session for order");
    gateway.set_status(&session_id, PaymentSessionStatus::Expired);

    let path = confirmation_path(&session_id);
    for _ in 0..2 {
        let (status, body) = get_request("", &path, configure(db.clone(), gateway.clone(), notifier.clone()))
            .await
            .expect("Request failed");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, r#"{"message":"The checkout session was not completed. The order has been canceled"}"#);
    }
    // Restocked exactly once
    assert_eq!(variant_quantity(db.pool(), variant).await.unwrap(), 5);
    assert_eq!(notifier.sent_count(), 0);
}

#[actix_web::test]
async fn confirm_an_unknown_session() {
    let _ = env_logger::try_init().ok();
    let (db, gateway, notifier) = setup().await;
    let (status, body) = get_request("", &confirmation_path("cs_nobody"), configure(db, gateway, notifier))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"The checkout session ID was not provided or does not exist"}"#);
}

#[actix_web::test]
async fn confirm_when_stripe_is_unreachable() {
    let _ = env_logger::try_init().ok();
    let db = new_test_database().await;
    let mut gateway = MockGateway::new();
    gateway
        .expect_fetch_checkout_session()
        .withf(|id| id == "cs_test_0042")
        .times(1)
        .returning(|_| Err(PaymentGatewayError::Unavailable("connection refused".into())));
    let configure = move |cfg: &mut ServiceConfig| {
        let api = CheckoutApi::new(db, gateway, RecordingNotifier::new(), checkout_config());
        cfg.app_data(web::Data::new(api))
            .service(ConfirmPaymentRoute::<SqliteDatabase, MockGateway, RecordingNotifier>::new());
    };
    let (status, body) = get_request("", &confirmation_path("cs_test_0042"), configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        r#"{"message":"Payment gateway error. The payment gateway could not be reached. connection refused"}"#
    );
}

//----------------------------------------------   Fixtures  ----------------------------------------------------

const ADDRESS: &str = r#"{"street":"12 Wool Lane","aptUnit":"","state":"NY","zipcode":"10001"}"#;
const CONTACT: &str = r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","phone":"555-0100"}"#;

fn cart_body(items: &str) -> String {
    format!(r#"{{"items":{items},"address":{ADDRESS},"contact":{CONTACT}}}"#)
}

fn checkout_config() -> CheckoutConfig {
    CheckoutConfig::for_web_client("https://sockify.test/")
}

async fn setup() -> (SqliteDatabase, FakePaymentGateway, RecordingNotifier) {
    (new_test_database().await, FakePaymentGateway::new(), RecordingNotifier::new())
}

fn configure(
    db: SqliteDatabase,
    gateway: FakePaymentGateway,
    notifier: RecordingNotifier,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CheckoutApi::new(db, gateway, notifier, checkout_config());
        cfg.app_data(web::Data::new(api))
            .service(CheckoutRoute::<SqliteDatabase, FakePaymentGateway, RecordingNotifier>::new())
            .service(ConfirmPaymentRoute::<SqliteDatabase, FakePaymentGateway, RecordingNotifier>::new());
    }
}

/// Checks out through the endpoint and returns the id of the new order.
async fn place_order(
    db: &SqliteDatabase,
    gateway: &FakePaymentGateway,
    notifier: &RecordingNotifier,
    variant: i64,
    quantity: i64,
) -> i64 {
    let body = cart_body(&format!(r#"[{{"sockVariantId":{variant},"quantity":{quantity}}}]"#));
    let (status, _) = post_request("", CHECKOUT_PATH, &body, configure(db.clone(), gateway.clone(), notifier.clone()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let request = gateway.last_request().expect("No session was requested");
    request.metadata.get("orderId").and_then(|id| id.parse().ok()).expect("No order id in session metadata")
}
