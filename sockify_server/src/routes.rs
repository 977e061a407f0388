//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database and payment gateway calls are all async, so handlers must
//! `await` them rather than block on them.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use sockify_engine::{
    db_types::InvoiceNumber,
    traits::{CheckoutDatabase, NotificationSink, OrderManagement, PaymentGateway},
    CheckoutApi,
    OrderApi,
};

use crate::{
    auth::AdminClaims,
    data_objects::{
        CheckoutBody,
        CheckoutResponse,
        CreateOrderUpdateRequest,
        JsonResponse,
        OrdersQuery,
        UpdateStatusRequest,
    },
    errors::ServerError,
    helpers::parse_order_id,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/cart/checkout/stripe-session" impl CheckoutDatabase, PaymentGateway, NotificationSink);
/// Route handler for the checkout endpoint
///
/// Places an order for the cart in the body and opens a Stripe checkout session for it. The response carries the URL
/// of the hosted payment page, which the web client redirects to.
///
/// Prices in the body (if any) are ignored. The order total is always computed from the inventory.
pub async fn checkout<B, G, N>(
    body: web::Json<CheckoutBody>,
    api: web::Data<CheckoutApi<B, G, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
    N: NotificationSink,
{
    let body = body.into_inner();
    debug!("💻️ POST checkout for {} cart lines", body.items.len());
    let result = api.checkout(body.into()).await?;
    Ok(HttpResponse::Ok().json(CheckoutResponse { payment_url: result.payment_url }))
}

route!(confirm_payment => Get "/cart/checkout/stripe-confirmation/{session_id}" impl CheckoutDatabase, PaymentGateway, NotificationSink);
/// Route handler for the payment confirmation endpoint
///
/// The web client calls this when Stripe redirects the customer back to the store. The order attached to the session
/// is settled according to the session's status, and the order summary is returned once the payment went through.
/// Calling it again for the same session is harmless.
pub async fn confirm_payment<B, G, N>(
    path: web::Path<String>,
    api: web::Data<CheckoutApi<B, G, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
    N: NotificationSink,
{
    let session_id = path.into_inner();
    debug!("💻️ GET payment confirmation for session {session_id}");
    let confirmation = api.confirm_payment(&session_id).await?;
    Ok(HttpResponse::Ok().json(confirmation))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(orders => Get "" impl OrderManagement);
/// Route handler for the order listing
///
/// Supports `status`, `limit` and `offset` query parameters. Orders are listed oldest first.
pub async fn orders<B: OrderManagement>(
    query: web::Query<OrdersQuery>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.filter()?;
    let pagination = query.pagination();
    debug!("💻️ GET orders. {filter}");
    let page = api.fetch_orders(filter, pagination).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(order_by_invoice => Get "/invoice/{invoice_number}" impl OrderManagement);
pub async fn order_by_invoice<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let invoice = InvoiceNumber::from(path.into_inner());
    debug!("💻️ GET order for invoice {invoice}");
    let order = api.order_by_invoice(&invoice).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_id => Get "/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path)?;
    debug!("💻️ GET order #{order_id}");
    let order = api.order_by_id(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_status => Patch "/{order_id}/status" impl OrderManagement);
/// Route handler for order status changes
///
/// Only the moves allowed by the order status machine are accepted. If no message is given, the audit entry records
/// which statuses were involved.
pub async fn update_status<B: OrderManagement>(
    claims: AdminClaims,
    path: web::Path<String>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path)?;
    let actor = claims.actor()?;
    let UpdateStatusRequest { new_status, message } = body.into_inner();
    debug!("💻️ PATCH status of order #{order_id} to '{new_status}' by {actor}");
    api.update_status(order_id, &new_status, message.as_deref(), actor).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Order status updated successfully")))
}

route!(update_address => Patch "/{order_id}/address" impl OrderManagement);
pub async fn update_address<B: OrderManagement>(
    claims: AdminClaims,
    path: web::Path<String>,
    body: web::Json<sockify_engine::db_types::Address>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path)?;
    let actor = claims.actor()?;
    debug!("💻️ PATCH address of order #{order_id} by {actor}");
    api.update_address(order_id, body.into_inner(), actor).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Order address updated successfully")))
}

route!(update_contact => Patch "/{order_id}/contact" impl OrderManagement);
pub async fn update_contact<B: OrderManagement>(
    claims: AdminClaims,
    path: web::Path<String>,
    body: web::Json<sockify_engine::db_types::Contact>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path)?;
    let actor = claims.actor()?;
    debug!("💻️ PATCH contact of order #{order_id} by {actor}");
    api.update_contact(order_id, body.into_inner(), actor).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Order contact info updated successfully")))
}

route!(order_updates => Get "/{order_id}/updates" impl OrderManagement);
/// Route handler for an order's audit trail, newest entry first.
pub async fn order_updates<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path)?;
    debug!("💻️ GET updates for order #{order_id}");
    let updates = api.order_updates(order_id).await?;
    Ok(HttpResponse::Ok().json(updates))
}

route!(add_order_update => Post "/{order_id}/updates" impl OrderManagement);
pub async fn add_order_update<B: OrderManagement>(
    claims: AdminClaims,
    path: web::Path<String>,
    body: web::Json<CreateOrderUpdateRequest>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_order_id(&path)?;
    let actor = claims.actor()?;
    debug!("💻️ POST update for order #{order_id} by {actor}");
    api.add_order_update(order_id, actor, &body.message).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::new("Order update created successfully")))
}
