use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use sockify_engine::{CheckoutApi, OrderApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    helpers::json_error_handler,
    integrations::{email::EmailNotifier, stripe::StripeGateway},
    middleware::AdminAuthMiddlewareFactory,
    routes::{
        health,
        AddOrderUpdateRoute,
        CheckoutRoute,
        ConfirmPaymentRoute,
        OrderByIdRoute,
        OrderByInvoiceRoute,
        OrderUpdatesRoute,
        OrdersRoute,
        UpdateAddressRoute,
        UpdateContactRoute,
        UpdateStatusRoute,
    },
};

type Checkout = CheckoutApi<SqliteDatabase, StripeGateway, EmailNotifier>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not migrate the database. {e}")))?;
    let gateway = StripeGateway::from_config(config.stripe.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Stripe client. {e}")))?;
    let notifier = EmailNotifier::new(config.email.clone());
    if !config.email.is_enabled() {
        warn!("📧️ No SendGrid API key is set. Order confirmations will only be logged.");
    }
    let srv = create_server_instance(config, db, gateway, notifier)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: StripeGateway,
    notifier: EmailNotifier,
) -> Result<Server, ServerError> {
    let checkout_config = config.checkout_config();
    let auth_config = config.auth.clone();
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), gateway.clone(), notifier.clone(), checkout_config.clone());
        let orders_api = OrderApi::new(db.clone());
        // Admin routes. Every request in this scope must carry a valid admin token
        let orders_scope = web::scope("/orders")
            .wrap(AdminAuthMiddlewareFactory::new(auth_config.clone()))
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(OrderByInvoiceRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateStatusRoute::<SqliteDatabase>::new())
            .service(UpdateAddressRoute::<SqliteDatabase>::new())
            .service(UpdateContactRoute::<SqliteDatabase>::new())
            .service(OrderUpdatesRoute::<SqliteDatabase>::new())
            .service(AddOrderUpdateRoute::<SqliteDatabase>::new());
        let api_scope = web::scope("/api/v1")
            .service(CheckoutRoute::<SqliteDatabase, StripeGateway, EmailNotifier>::new())
            .service(ConfirmPaymentRoute::<SqliteDatabase, StripeGateway, EmailNotifier>::new())
            .service(orders_scope);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sockify::access_log"))
            .app_data(web::Data::<Checkout>::new(checkout_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
