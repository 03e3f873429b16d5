mod filters;
pub mod handlers;
pub mod models;
mod responder;
mod routes;

use crate::{
    modules::iot::Hub,
    shared::{
        billing::{Bill, PriceRange, RangeCharge},
        config::Configs,
        db::DbPool,
        errors::{handle_rejection, ErrorMessage},
    },
};
use handlers::{
    alerts, auth, customers, devices, health, iot, maintenance, payments, pricing, rbac, tickets, tips, usage, vouchers,
    work_orders,
};
use models::{
    CalculateBody, CreateCustomerBody, CreateMaintenanceBody, CreatePaymentBody, CreateTicketBody, CreateWorkOrderBody,
    EngageBody, HeartbeatBody, LoginBody, PreferencesBody, ReadingBody, RegisterBody, RegisterIotBody,
    TicketStatusBody, ValidateVoucherBody, WorkOrderStatusBody,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::task::JoinHandle;
use utoipa::OpenApi;
use warp::{filters::BoxedFilter, Filter, Reply};

/// State shared by every route.
#[derive(Clone)]
pub struct ApiContext {
    pub pool: DbPool,
    pub configs: Arc<Configs>,
    pub hub: Hub,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "IndoWater API", version = "1.0.0"),
    paths(
        health::health,
        health::test,
        auth::register,
        auth::login,
        auth::me,
        rbac::list_roles,
        customers::list_customers,
        customers::create_customer,
        devices::device_stats,
        iot::register_device,
        iot::list_devices,
        iot::post_reading,
        iot::post_heartbeat,
        iot::realtime_metrics,
        iot::history_metrics,
        usage::list_usage,
        pricing::calculate,
        vouchers::validate_voucher,
        payments::create_payment,
        payments::confirm_payment,
        tickets::create_ticket,
        tickets::update_status,
        tips::list_tips,
        tips::engage_tip,
        alerts::list_alerts,
        alerts::update_preferences,
        work_orders::create_work_order,
        work_orders::update_work_order_status,
        maintenance::create_maintenance,
    ),
    components(schemas(
        ErrorMessage,
        RegisterBody,
        LoginBody,
        CreateCustomerBody,
        RegisterIotBody,
        ReadingBody,
        HeartbeatBody,
        CalculateBody,
        Bill,
        PriceRange,
        RangeCharge,
        ValidateVoucherBody,
        CreatePaymentBody,
        CreateTicketBody,
        TicketStatusBody,
        EngageBody,
        PreferencesBody,
        CreateWorkOrderBody,
        WorkOrderStatusBody,
        CreateMaintenanceBody,
    ))
)]
pub struct IndoWaterApi;

/// The whole `/api` tree with rejection handling and CORS.
pub fn routes(ctx: &ApiContext) -> BoxedFilter<(impl Reply,)> {
    let api_doc = warp::path!("api-doc.json")
        .and(warp::get())
        .map(|| warp::reply::json(&IndoWaterApi::openapi()).into_response());

    warp::path("api")
        .and(api_doc.or(routes::api_routes(ctx)).unify())
        .recover(handle_rejection)
        .with(filters::with_cors(ctx.configs.server.cors_origin.as_deref()))
        .boxed()
}

pub fn start_api(ctx: ApiContext) -> JoinHandle<()> {
    tokio::spawn(async move {
        let addr = SocketAddr::from((ctx.configs.server.host, ctx.configs.server.port));
        let routes = routes(&ctx);
        log::info!("Starting API on {}", addr);
        warp::serve(routes).run(addr).await;
    })
}
