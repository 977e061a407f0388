use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, TimeZone, Utc};
use log::debug;
use sockify_common::Cents;
use sockify_engine::{
    db_types::{Actor, Address, Contact, Order, OrderStatusType, OrderUpdate, UpdateAuthor},
    OrderApi,
};

use super::helpers::{get_auth_config, get_request, issue_token, json, patch_request, post_request};
use crate::{
    config::AuthConfig,
    endpoint_tests::mocks::MockOrderManager,
    middleware::AdminAuthMiddlewareFactory,
    routes::{
        AddOrderUpdateRoute,
        OrderByIdRoute,
        OrderByInvoiceRoute,
        OrderUpdatesRoute,
        OrdersRoute,
        UpdateAddressRoute,
        UpdateContactRoute,
        UpdateStatusRoute,
    },
};

//----------------------------------------------   Authentication  ----------------------------------------------------

#[actix_web::test]
async fn fetch_orders_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/orders", configure(MockOrderManager::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"message":"Authentication Error. No access token was provided."}"#);
}

#[actix_web::test]
async fn fetch_orders_with_an_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(3, Duration::hours(-1));
    let (status, body) =
        get_request(&token, "/orders", configure(MockOrderManager::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"message":"Authentication Error. The access token has expired."}"#);
}

#[actix_web::test]
async fn fetch_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = valid_token();
    token.replace_range(token.len() - 10..token.len() - 5, "AAAAA");
    debug!("Calling /orders with invalid token {token}");
    let (status, body) =
        get_request(&token, "/orders", configure(MockOrderManager::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.starts_with(r#"{"message":"Authentication Error. The access token is invalid."#));
}

#[actix_web::test]
async fn tokens_signed_with_another_secret_are_rejected() {
    let _ = env_logger::try_init().ok();
    let other = AuthConfig::new("someone-elses-secret-that-is-also-long-enough");
    let token = crate::auth::issue_admin_token(&crate::auth::AdminClaims::new(3, Duration::hours(1)), &other).unwrap();
    let (status, _) = get_request(&token, "/orders", configure(MockOrderManager::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn token_in_query_string() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_orders().returning(|_, _| Ok(vec![]));
    db.expect_count_orders().returning(|_| Ok(0));
    let path = format!("/orders?token={}", valid_token());
    let (status, body) = get_request("", &path, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"items":[],"total":0,"limit":50,"offset":0}"#);
}

#[actix_web::test]
async fn disabled_auth_acts_as_the_dev_admin() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Received))));
    db.expect_insert_order_update()
        .withf(|id, actor, message| *id == 4 && *actor == Actor::Admin(1) && message == "Called the customer")
        .times(1)
        .returning(|id, _, message| Ok(update(id, message)));
    let mut auth = get_auth_config();
    auth.disable_auth = true;
    auth.dev_admin_id = 1;
    let (status, body) =
        post_request("", "/orders/4/updates", r#"{"message":"Called the customer"}"#, configure_with_auth(db, auth))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Order update created successfully"}"#);
}

//----------------------------------------------   Listing and lookups  ----------------------------------------------------

#[actix_web::test]
async fn fetch_orders_by_status() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_orders()
        .withf(|filter, page| {
            filter.status == Some(OrderStatusType::Shipped) && page.limit == 10 && page.offset == 20
        })
        .returning(|_, _| Ok(vec![order(7, OrderStatusType::Shipped)]));
    db.expect_count_orders().returning(|_| Ok(21));
    let (status, body) = get_request(&valid_token(), "/orders?status=shipped&limit=10&offset=20", configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let page = json(&body);
    assert_eq!(page["total"], 21);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["offset"], 20);
    assert_eq!(page["items"][0]["orderId"], 7);
    assert_eq!(page["items"][0]["status"], "shipped");
    assert_eq!(page["items"][0]["contact"]["email"], "ada@example.com");
}

#[actix_web::test]
async fn fetch_orders_with_silly_paging() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_orders()
        .withf(|filter, page| filter.is_empty() && page.limit == 100 && page.offset == 0)
        .returning(|_, _| Ok(vec![]));
    db.expect_count_orders().returning(|_| Ok(0));
    let (status, _) = get_request(&valid_token(), "/orders?limit=5000&offset=minus-one", configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn fetch_orders_with_unknown_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&valid_token(), "/orders?status=lost", configure(MockOrderManager::new()))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"'lost' is not a valid order status"}"#);
}

#[actix_web::test]
async fn fetch_order_by_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().withf(|id| *id == 12).returning(|id| Ok(Some(order(id, OrderStatusType::Received))));
    let (status, body) = get_request(&valid_token(), "/orders/12", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order = json(&body);
    assert_eq!(order["orderId"], 12);
    assert_eq!(order["invoiceNumber"], "inv-12");
    assert_eq!(order["total"], 25.0);
    assert_eq!(order["address"]["aptUnit"], serde_json::Value::Null);
    assert_eq!(order["paymentConfirmedAt"], serde_json::Value::Null);
}

#[actix_web::test]
async fn fetch_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, body) = get_request(&valid_token(), "/orders/9", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"message":"Order 9 does not exist"}"#);
}

#[actix_web::test]
async fn fetch_order_with_a_bad_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&valid_token(), "/orders/nine", configure(MockOrderManager::new())).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Could not read request path: 'nine' is not a valid order id"}"#);
}

#[actix_web::test]
async fn fetch_order_by_invoice() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_invoice()
        .withf(|invoice| invoice.as_str() == "inv-3")
        .returning(|_| Ok(Some(order(3, OrderStatusType::Delivered))));
    let (status, body) =
        get_request(&valid_token(), "/orders/invoice/inv-3", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["orderId"], 3);

    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_invoice().returning(|_| Ok(None));
    let (status, body) =
        get_request(&valid_token(), "/orders/invoice/nope", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"message":"No order with invoice number nope exists"}"#);
}

//----------------------------------------------   Status changes  ----------------------------------------------------

#[actix_web::test]
async fn ship_an_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Received))));
    db.expect_update_order_status()
        .withf(|id, from, to, actor, message| {
            *id == 5 &&
                *from == OrderStatusType::Received &&
                *to == OrderStatusType::Shipped &&
                *actor == Actor::Admin(3) &&
                message == "Order status changed from 'received' to 'shipped'"
        })
        .times(1)
        .returning(|id, _, to, _, _| Ok(order(id, to)));
    let (status, body) = patch_request(&valid_token(), "/orders/5/status", r#"{"newStatus":"shipped"}"#, configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Order status updated successfully"}"#);
}

#[actix_web::test]
async fn status_change_with_a_message() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Received))));
    db.expect_update_order_status()
        .withf(|_, _, to, _, message| *to == OrderStatusType::Canceled && message == "Customer changed their mind")
        .times(1)
        .returning(|id, _, to, _, _| Ok(order(id, to)));
    let body = r#"{"newStatus":"canceled","message":"Customer changed their mind"}"#;
    let (status, _) =
        patch_request(&valid_token(), "/orders/5/status", body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn illegal_status_change() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Delivered))));
    db.expect_update_order_status().never();
    let (status, body) = patch_request(&valid_token(), "/orders/5/status", r#"{"newStatus":"shipped"}"#, configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Order status can not change from 'delivered' to 'shipped'"}"#);
}

#[actix_web::test]
async fn status_change_for_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    let (status, body) = patch_request(&valid_token(), "/orders/5/status", r#"{"newStatus":"shipped"}"#, configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"message":"Order 5 does not exist"}"#);
}

#[actix_web::test]
async fn status_change_lost_a_race() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Received))));
    db.expect_update_order_status().returning(|order_id, from, _, _, _| {
        Err(sockify_engine::traits::OrderManagementError::StatusChanged {
            order_id,
            expected: from,
            actual: OrderStatusType::Canceled,
        })
    });
    let (status, _) = patch_request(&valid_token(), "/orders/5/status", r#"{"newStatus":"shipped"}"#, configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn status_change_with_a_broken_body() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(&valid_token(), "/orders/5/status", r#"{"newStatus": }"#, configure(MockOrderManager::new()))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"message":"Invalid JSON payload."#));
}

//----------------------------------------------   Address and contact  ----------------------------------------------------

#[actix_web::test]
async fn update_address() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_update_order_address()
        .withf(|id, address, actor| {
            *id == 8 && address.street == "1 Loom Road" && address.apt_unit.is_none() && *actor == Actor::Admin(3)
        })
        .times(1)
        .returning(|id, _, _| Ok(order(id, OrderStatusType::Received)));
    let body = r#"{"street":"1 Loom Road","aptUnit":"  ","state":"MA","zipcode":"01840"}"#;
    let (status, body) =
        patch_request(&valid_token(), "/orders/8/address", body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Order address updated successfully"}"#);
}

#[actix_web::test]
async fn update_address_without_a_state() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_update_order_address().never();
    let body = r#"{"street":"1 Loom Road","state":"","zipcode":"01840"}"#;
    let (status, body) =
        patch_request(&valid_token(), "/orders/8/address", body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Invalid request. The state field is required"}"#);
}

#[actix_web::test]
async fn update_contact() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_update_order_contact()
        .withf(|id, contact, _| *id == 8 && contact.firstname == "Grace" && contact.email == "grace@example.com")
        .times(1)
        .returning(|id, _, _| Ok(order(id, OrderStatusType::Received)));
    let body = r#"{"firstName":"Grace","lastName":"Hopper","email":"grace@example.com","phone":"555-0199"}"#;
    let (status, body) =
        patch_request(&valid_token(), "/orders/8/contact", body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Order contact info updated successfully"}"#);
}

#[actix_web::test]
async fn update_contact_with_a_bad_email() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_update_order_contact().never();
    let body = r#"{"firstname":"Grace","lastname":"Hopper","email":"grace.example.com","phone":"555-0199"}"#;
    let (status, body) =
        patch_request(&valid_token(), "/orders/8/contact", body, configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Invalid request. 'grace.example.com' is not a valid email address"}"#);
}

//----------------------------------------------   Audit trail  ----------------------------------------------------

#[actix_web::test]
async fn fetch_order_updates() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Shipped))));
    db.expect_fetch_order_updates().returning(|id| {
        let mut by_admin = update(id, "Order status changed from 'received' to 'shipped'");
        by_admin.id = 2;
        by_admin.created_by = Some(UpdateAuthor {
            admin_id: 3,
            firstname: "Sam".into(),
            lastname: "Socks".into(),
            username: "sam".into(),
        });
        Ok(vec![by_admin, update(id, "Payment confirmed (checkout session cs_test_0001)")])
    });
    let (status, body) = get_request(&valid_token(), "/orders/6/updates", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let updates = json(&body);
    assert_eq!(updates[0]["id"], 2);
    assert_eq!(updates[0]["createdBy"]["username"], "sam");
    assert_eq!(updates[1]["createdBy"], serde_json::Value::Null);
    assert_eq!(updates[1]["message"], "Payment confirmed (checkout session cs_test_0001)");
}

#[actix_web::test]
async fn fetch_updates_for_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|_| Ok(None));
    db.expect_fetch_order_updates().never();
    let (status, _) = get_request(&valid_token(), "/orders/6/updates", configure(db)).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn add_a_blank_order_update() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_insert_order_update().never();
    let (status, body) = post_request(&valid_token(), "/orders/6/updates", r#"{"message":"   "}"#, configure(db))
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"message":"Invalid request. The message field is required"}"#);
}

#[actix_web::test]
async fn add_an_order_update() {
    let _ = env_logger::try_init().ok();
    let mut db = MockOrderManager::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, OrderStatusType::Shipped))));
    db.expect_insert_order_update()
        .withf(|id, actor, message| *id == 6 && *actor == Actor::Admin(3) && message == "Tracking number sent")
        .times(1)
        .returning(|id, _, message| Ok(update(id, message)));
    let (status, body) =
        post_request(&valid_token(), "/orders/6/updates", r#"{"message":"Tracking number sent"}"#, configure(db))
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"message":"Order update created successfully"}"#);
}

//----------------------------------------------   Fixtures  ----------------------------------------------------

fn valid_token() -> String {
    issue_token(3, Duration::days(1))
}

fn configure(db: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    configure_with_auth(db, get_auth_config())
}

fn configure_with_auth(db: MockOrderManager, auth: AuthConfig) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let orders_api = OrderApi::new(db);
        cfg.app_data(web::Data::new(orders_api)).service(
            web::scope("/orders")
                .wrap(AdminAuthMiddlewareFactory::new(auth))
                .service(OrdersRoute::<MockOrderManager>::new())
                .service(OrderByInvoiceRoute::<MockOrderManager>::new())
                .service(OrderByIdRoute::<MockOrderManager>::new())
                .service(UpdateStatusRoute::<MockOrderManager>::new())
                .service(UpdateAddressRoute::<MockOrderManager>::new())
                .service(UpdateContactRoute::<MockOrderManager>::new())
                .service(OrderUpdatesRoute::<MockOrderManager>::new())
                .service(AddOrderUpdateRoute::<MockOrderManager>::new()),
        );
    }
}

fn order(id: i64, status: OrderStatusType) -> Order {
    let timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    Order {
        id,
        invoice_number: format!("inv-{id}").into(),
        total: Cents::from(2500),
        status,
        address: Address { street: "12 Wool Lane".into(), apt_unit: None, state: "NY".into(), zipcode: "10001".into() },
        contact: Contact {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "555-0100".into(),
        },
        items: vec![],
        payment_confirmed_at: None,
        created_at: timestamp,
        updated_at: timestamp,
    }
}

fn update(order_id: i64, message: &str) -> OrderUpdate {
    OrderUpdate {
        id: 1,
        order_id,
        message: message.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
        created_by: None,
    }
}
