#![allow(dead_code)]
use sockify_engine::{
    checkout_objects::{CartItem, CheckoutConfig, CheckoutRequest},
    db_types::{Address, Cents, Contact},
    test_utils::{
        fakes::{FakePaymentGateway, RecordingNotifier},
        prepare_env::{prepare_test_env, random_db_path},
    },
    CheckoutApi,
    OrderApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub type TestCheckoutApi = CheckoutApi<SqliteDatabase, FakePaymentGateway, RecordingNotifier>;

pub struct TestSystem {
    pub url: String,
    pub db: SqliteDatabase,
    pub gateway: FakePaymentGateway,
    pub notifier: RecordingNotifier,
    pub checkout: TestCheckoutApi,
    pub orders: OrderApi<SqliteDatabase>,
}

impl std::fmt::Debug for TestSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TestSystem ({})", self.url)
    }
}

impl TestSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        let gateway = FakePaymentGateway::new();
        let notifier = RecordingNotifier::new();
        let config = CheckoutConfig::for_web_client("http://shop.test");
        let checkout = CheckoutApi::new(db.clone(), gateway.clone(), notifier.clone(), config);
        let orders = OrderApi::new(db.clone());
        Self { url, db, gateway, notifier, checkout, orders }
    }

    pub async fn teardown(self) {
        self.db.close().await;
        let _ = Sqlite::drop_database(&self.url).await;
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        self.db.pool()
    }
}

pub fn address() -> Address {
    Address {
        street: "12 Argyle Street".into(),
        apt_unit: Some("4B".into()),
        state: "NY".into(),
        zipcode: "10001".into(),
    }
}

pub fn contact() -> Contact {
    Contact {
        firstname: "Ada".into(),
        lastname: "Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "555-0100".into(),
    }
}

pub fn cart(lines: &[(i64, i64)]) -> CheckoutRequest {
    let items = lines
        .iter()
        .map(|(sock_variant_id, quantity)| CartItem { sock_variant_id: *sock_variant_id, quantity: *quantity })
        .collect();
    CheckoutRequest { items, address: address(), contact: contact() }
}

pub fn dollars(d: i64) -> Cents {
    Cents::from_whole_units(d)
}
