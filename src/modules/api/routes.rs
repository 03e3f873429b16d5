use crate::modules::api::{
    filters::{
        rate_limited, with_auth, with_client_info, with_context, with_db_access_manager, with_json_body,
        with_permission,
    },
    handlers::{
        activities, alerts, auth, customers, devices, health, iot, leaks, maintenance, payments, pricing,
        properties, rbac, tickets, tips, usage, vouchers, work_orders,
    },
    models::{
        ActivityQuery, AlertQuery, HistoryQuery, LeakEventQuery, ListQuery, MaintenanceQuery, PaymentQuery,
        TicketQuery, TipQuery, UsageQuery, VoucherQuery, WorkOrderQuery,
    },
    ApiContext,
};
use warp::{filters::BoxedFilter, reply::Response, Filter};

type ApiRoute = BoxedFilter<(Response,)>;

/// Every `/api` route except the OpenAPI document.
pub fn api_routes(ctx: &ApiContext) -> ApiRoute {
    health_routes(ctx)
        .or(auth_routes(ctx))
        .unify()
        .or(rbac_routes(ctx))
        .unify()
        .or(customer_routes(ctx))
        .unify()
        .or(property_routes(ctx))
        .unify()
        .or(device_routes(ctx))
        .unify()
        .or(iot_routes(ctx))
        .unify()
        .or(usage_routes(ctx))
        .unify()
        .or(pricing_routes(ctx))
        .unify()
        .or(voucher_routes(ctx))
        .unify()
        .or(payment_routes(ctx))
        .unify()
        .or(ticket_routes(ctx))
        .unify()
        .or(tip_routes(ctx))
        .unify()
        .or(alert_routes(ctx))
        .unify()
        .or(activity_routes(ctx))
        .unify()
        .or(work_order_routes(ctx))
        .unify()
        .or(maintenance_routes(ctx))
        .unify()
        .or(leak_routes(ctx))
        .unify()
        .boxed()
}

pub fn health_routes(ctx: &ApiContext) -> ApiRoute {
    let health = warp::path!("health").and(warp::get()).and_then(health::health);

    let test = warp::path!("test")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and_then(health::test);

    health.or(test).unify().boxed()
}

pub fn auth_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let register = warp::path!("auth" / "register")
        .and(warp::post())
        .and(rate_limited(&ctx.configs.rate_limit))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(with_context(ctx.clone()))
        .and(db())
        .and_then(auth::register);

    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(rate_limited(&ctx.configs.rate_limit))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(with_context(ctx.clone()))
        .and(db())
        .and_then(auth::login);

    let me = warp::path!("auth" / "me")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(auth::me);

    let logout = warp::path!("auth" / "logout")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_client_info())
        .and(with_context(ctx.clone()))
        .and(db())
        .and_then(auth::logout);

    let refresh = warp::path!("auth" / "refresh")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_context(ctx.clone()))
        .and(db())
        .and_then(auth::refresh);

    register
        .or(login)
        .unify()
        .or(me)
        .unify()
        .or(logout)
        .unify()
        .or(refresh)
        .unify()
        .boxed()
}

pub fn rbac_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("roles" / "list")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "roles.view"))
        .and(db())
        .and_then(rbac::list_roles);

    let permissions = warp::path!("roles" / "permissions")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "roles.view"))
        .and(db())
        .and_then(rbac::list_permissions);

    let create = warp::path!("roles" / "create")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "roles.create"))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(db())
        .and_then(rbac::create_role);

    let assign = warp::path!("roles" / "assign")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "roles.edit"))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(db())
        .and_then(rbac::assign_roles);

    let users = warp::path!("roles" / "users" / "detailed")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "users.view"))
        .and(db())
        .and_then(rbac::users_detailed);

    let initialize = warp::path!("roles" / "initialize")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "roles.create"))
        .and(db())
        .and_then(rbac::initialize);

    let update = warp::path!("roles" / String)
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "roles.edit"))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(db())
        .and_then(rbac::update_role);

    let delete = warp::path!("roles" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "roles.delete"))
        .and(with_client_info())
        .and(db())
        .and_then(rbac::delete_role);

    list.or(permissions)
        .unify()
        .or(create)
        .unify()
        .or(assign)
        .unify()
        .or(users)
        .unify()
        .or(initialize)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn customer_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("customers")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "customers.view"))
        .and(warp::query::<ListQuery>())
        .and(db())
        .and_then(customers::list_customers);

    let get = warp::path!("customers" / String)
        .and(warp::get())
        .and(with_permission(ctx.clone(), "customers.view"))
        .and(db())
        .and_then(customers::get_customer);

    let create = warp::path!("customers")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "customers.create"))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(db())
        .and_then(customers::create_customer);

    let update = warp::path!("customers" / String)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_permission(ctx.clone(), "customers.edit"))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(db())
        .and_then(customers::update_customer);

    let delete = warp::path!("customers" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "customers.delete"))
        .and(with_client_info())
        .and(db())
        .and_then(customers::delete_customer);

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn property_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("properties")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "properties.view"))
        .and(warp::query::<ListQuery>())
        .and(db())
        .and_then(properties::list_properties);

    let get = warp::path!("properties" / String)
        .and(warp::get())
        .and(with_permission(ctx.clone(), "properties.view"))
        .and(db())
        .and_then(properties::get_property);

    let create = warp::path!("properties")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "properties.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(properties::create_property);

    let update = warp::path!("properties" / String)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_permission(ctx.clone(), "properties.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(properties::update_property);

    let delete = warp::path!("properties" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "properties.delete"))
        .and(db())
        .and_then(properties::delete_property);

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn device_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let stats = warp::path!("devices" / "summary" / "stats")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "devices.view"))
        .and(warp::query::<ListQuery>())
        .and(db())
        .and_then(devices::device_stats);

    let list = warp::path!("devices")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "devices.view"))
        .and(warp::query::<ListQuery>())
        .and(db())
        .and_then(devices::list_devices);

    let get = warp::path!("devices" / String)
        .and(warp::get())
        .and(with_permission(ctx.clone(), "devices.view"))
        .and(db())
        .and_then(devices::get_device);

    let create = warp::path!("devices")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "devices.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(devices::create_device);

    let update = warp::path!("devices" / String)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_permission(ctx.clone(), "devices.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(devices::update_device);

    let delete = warp::path!("devices" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "devices.delete"))
        .and(db())
        .and_then(devices::delete_device);

    stats
        .or(list)
        .unify()
        .or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn iot_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());
    let device_secret = || warp::header::optional::<String>("x-device-secret");

    let register = warp::path!("iot" / "devices" / "register")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "devices.create"))
        .and(with_json_body(limit))
        .and(device_secret())
        .and(db())
        .and_then(iot::register_device);

    let list = warp::path!("iot" / "devices" / "list")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<ListQuery>())
        .and(db())
        .and_then(iot::list_devices);

    let update = warp::path!("iot" / "devices" / String)
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "devices.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(iot::update_device);

    let delete = warp::path!("iot" / "devices" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "devices.delete"))
        .and(db())
        .and_then(iot::delete_device);

    let reading = warp::path!("iot" / "readings")
        .and(warp::post())
        .and(with_json_body(limit))
        .and(device_secret())
        .and(with_context(ctx.clone()))
        .and(db())
        .and_then(iot::post_reading);

    let heartbeat = warp::path!("iot" / "heartbeat")
        .and(warp::post())
        .and(with_json_body(limit))
        .and(device_secret())
        .and(with_context(ctx.clone()))
        .and(db())
        .and_then(iot::post_heartbeat);

    let realtime = warp::path!("iot" / "metrics" / "realtime" / String)
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(iot::realtime_metrics);

    let history = warp::path!("iot" / "metrics" / "history" / String)
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<HistoryQuery>())
        .and(db())
        .and_then(iot::history_metrics);

    let ws = warp::path!("iot" / "ws" / String)
        .and(warp::ws())
        .and(warp::query::raw().or(warp::any().map(String::new)).unify())
        .and(warp::header::optional::<String>("cookie"))
        .and(warp::header::optional::<String>("authorization"))
        .and(with_context(ctx.clone()))
        .and_then(iot::ws_upgrade);

    let ws_without_session = warp::path!("iot" / "ws")
        .and(warp::get())
        .and_then(iot::ws_without_session);

    register
        .or(list)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(reading)
        .unify()
        .or(heartbeat)
        .unify()
        .or(realtime)
        .unify()
        .or(history)
        .unify()
        .or(ws)
        .unify()
        .or(ws_without_session)
        .unify()
        .boxed()
}

pub fn usage_routes(ctx: &ApiContext) -> ApiRoute {
    let db = || with_db_access_manager(ctx.pool.clone());

    let summary = warp::path!("water-usage" / "summary")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "water-usage.view"))
        .and(warp::query::<UsageQuery>())
        .and(db())
        .and_then(usage::usage_summary);

    let export = warp::path!("water-usage" / "export")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "water-usage.export"))
        .and(warp::query::<UsageQuery>())
        .and(db())
        .and_then(usage::export_usage);

    let list = warp::path!("water-usage")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "water-usage.view"))
        .and(warp::query::<UsageQuery>())
        .and(db())
        .and_then(usage::list_usage);

    summary.or(export).unify().or(list).unify().boxed()
}

pub fn pricing_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("pricing" / "tiers")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(pricing::list_tiers);

    let create = warp::path!("pricing" / "tiers")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "settings.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(pricing::create_tier);

    let update = warp::path!("pricing" / "tiers" / String)
        .and(warp::put())
        .and(with_permission(ctx.clone(), "settings.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(pricing::update_tier);

    let delete = warp::path!("pricing" / "tiers" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "settings.edit"))
        .and(db())
        .and_then(pricing::delete_tier);

    let calculate = warp::path!("pricing" / "calculate")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(pricing::calculate);

    let seed = warp::path!("pricing" / "seed-defaults")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "settings.edit"))
        .and(db())
        .and_then(pricing::seed_defaults);

    list.or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(calculate)
        .unify()
        .or(seed)
        .unify()
        .boxed()
}

pub fn voucher_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let validate = warp::path!("vouchers" / "validate")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(vouchers::validate_voucher);

    let list = warp::path!("vouchers")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "vouchers.view"))
        .and(warp::query::<VoucherQuery>())
        .and(db())
        .and_then(vouchers::list_vouchers);

    let get = warp::path!("vouchers" / String)
        .and(warp::get())
        .and(with_permission(ctx.clone(), "vouchers.view"))
        .and(db())
        .and_then(vouchers::get_voucher);

    let create = warp::path!("vouchers")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "vouchers.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(vouchers::create_voucher);

    let update = warp::path!("vouchers" / String)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_permission(ctx.clone(), "vouchers.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(vouchers::update_voucher);

    let delete = warp::path!("vouchers" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "vouchers.delete"))
        .and(db())
        .and_then(vouchers::delete_voucher);

    validate
        .or(list)
        .unify()
        .or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn payment_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("payments")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<PaymentQuery>())
        .and(db())
        .and_then(payments::list_payments);

    let get = warp::path!("payments" / String)
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(payments::get_payment);

    let create = warp::path!("payments")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(with_client_info())
        .and(db())
        .and_then(payments::create_payment);

    let confirm = warp::path!("payments" / String / "confirm")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "payments.process"))
        .and(with_client_info())
        .and(db())
        .and_then(payments::confirm_payment);

    let refund = warp::path!("payments" / String / "refund")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "payments.refund"))
        .and(with_client_info())
        .and(db())
        .and_then(payments::refund_payment);

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(confirm)
        .unify()
        .or(refund)
        .unify()
        .boxed()
}

pub fn ticket_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("tickets")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<TicketQuery>())
        .and(db())
        .and_then(tickets::list_tickets);

    let create = warp::path!("tickets")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "tickets.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tickets::create_ticket);

    let get = warp::path!("tickets" / String)
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(tickets::get_ticket);

    let status = warp::path!("tickets" / String / "status")
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "tickets.resolve"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tickets::update_status);

    let assign = warp::path!("tickets" / String / "assign")
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "tickets.assign"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tickets::assign_ticket);

    let message = warp::path!("tickets" / String / "messages")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tickets::add_message);

    let attachment = warp::path!("tickets" / String / "attachments")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tickets::add_attachment);

    let rating = warp::path!("tickets" / String / "rating")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tickets::rate_ticket);

    list.or(create)
        .unify()
        .or(get)
        .unify()
        .or(status)
        .unify()
        .or(assign)
        .unify()
        .or(message)
        .unify()
        .or(attachment)
        .unify()
        .or(rating)
        .unify()
        .boxed()
}

pub fn tip_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("tips")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<TipQuery>())
        .and(db())
        .and_then(tips::list_tips);

    let random = warp::path!("tips" / "random")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<TipQuery>())
        .and(db())
        .and_then(tips::random_tips);

    let get = warp::path!("tips" / String)
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(tips::get_tip);

    let create = warp::path!("tips")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "tips.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tips::create_tip);

    let update = warp::path!("tips" / String)
        .and(warp::put())
        .and(with_permission(ctx.clone(), "tips.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tips::update_tip);

    let delete = warp::path!("tips" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "tips.delete"))
        .and(db())
        .and_then(tips::delete_tip);

    let engage = warp::path!("tips" / String / "engage")
        .and(warp::post())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(tips::engage_tip);

    list.or(random)
        .unify()
        .or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(engage)
        .unify()
        .boxed()
}

pub fn alert_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let preferences = warp::path!("alerts" / "preferences")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(alerts::get_preferences);

    let update_preferences = warp::path!("alerts" / "preferences")
        .and(warp::put())
        .and(with_auth(ctx.clone()))
        .and(with_json_body(limit))
        .and(db())
        .and_then(alerts::update_preferences);

    let list = warp::path!("alerts")
        .and(warp::get())
        .and(with_auth(ctx.clone()))
        .and(warp::query::<AlertQuery>())
        .and(db())
        .and_then(alerts::list_alerts);

    let read = warp::path!("alerts" / String / "read")
        .and(warp::patch())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(alerts::mark_read);

    let dismiss = warp::path!("alerts" / String / "dismiss")
        .and(warp::patch())
        .and(with_auth(ctx.clone()))
        .and(db())
        .and_then(alerts::dismiss);

    preferences
        .or(update_preferences)
        .unify()
        .or(list)
        .unify()
        .or(read)
        .unify()
        .or(dismiss)
        .unify()
        .boxed()
}

pub fn activity_routes(ctx: &ApiContext) -> ApiRoute {
    warp::path!("activities")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "reports.view"))
        .and(warp::query::<ActivityQuery>())
        .and(with_db_access_manager(ctx.pool.clone()))
        .and_then(activities::list_activities)
        .boxed()
}

pub fn work_order_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("work-orders")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "work-orders.view"))
        .and(warp::query::<WorkOrderQuery>())
        .and(db())
        .and_then(work_orders::list_work_orders);

    let get = warp::path!("work-orders" / String)
        .and(warp::get())
        .and(with_permission(ctx.clone(), "work-orders.view"))
        .and(db())
        .and_then(work_orders::get_work_order);

    let create = warp::path!("work-orders")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "work-orders.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(work_orders::create_work_order);

    let update = warp::path!("work-orders" / String)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_permission(ctx.clone(), "work-orders.create"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(work_orders::update_work_order);

    let assign = warp::path!("work-orders" / String / "assign")
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "work-orders.assign"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(work_orders::assign_work_order);

    let status = warp::path!("work-orders" / String / "status")
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "work-orders.complete"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(work_orders::update_work_order_status);

    let delete = warp::path!("work-orders" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "work-orders.create"))
        .and(db())
        .and_then(work_orders::delete_work_order);

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(assign)
        .unify()
        .or(status)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

/// Maintenance belongs to the meters, so the device permissions gate it.
pub fn maintenance_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;
    let db = || with_db_access_manager(ctx.pool.clone());

    let list = warp::path!("maintenance-schedules")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "devices.view"))
        .and(warp::query::<MaintenanceQuery>())
        .and(db())
        .and_then(maintenance::list_maintenance);

    let get = warp::path!("maintenance-schedules" / String)
        .and(warp::get())
        .and(with_permission(ctx.clone(), "devices.view"))
        .and(db())
        .and_then(maintenance::get_maintenance);

    let create = warp::path!("maintenance-schedules")
        .and(warp::post())
        .and(with_permission(ctx.clone(), "devices.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(maintenance::create_maintenance);

    let update = warp::path!("maintenance-schedules" / String)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_permission(ctx.clone(), "devices.edit"))
        .and(with_json_body(limit))
        .and(db())
        .and_then(maintenance::update_maintenance);

    let delete = warp::path!("maintenance-schedules" / String)
        .and(warp::delete())
        .and(with_permission(ctx.clone(), "devices.delete"))
        .and(db())
        .and_then(maintenance::delete_maintenance);

    list.or(get)
        .unify()
        .or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

pub fn leak_routes(ctx: &ApiContext) -> ApiRoute {
    let limit = ctx.configs.server.body_limit_bytes;

    let list = warp::path!("iot" / "leak-events")
        .and(warp::get())
        .and(with_permission(ctx.clone(), "devices.view"))
        .and(warp::query::<LeakEventQuery>())
        .and(with_db_access_manager(ctx.pool.clone()))
        .and_then(leaks::list_leak_events);

    let update = warp::path!("iot" / "leak-events" / String)
        .and(warp::patch())
        .and(with_permission(ctx.clone(), "devices.edit"))
        .and(with_json_body(limit))
        .and(with_db_access_manager(ctx.pool.clone()))
        .and_then(leaks::update_leak_event);

    list.or(update).unify().boxed()
}
