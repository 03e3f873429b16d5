#![allow(dead_code)]

use indowater_api::{
    modules::{
        api::{routes, ApiContext},
        iot::Hub,
    },
    shared::{
        config::{Configs, SeedConfig},
        db::{db_pool, get_db_access_manager, run_migrations, seed, DBAccessManager},
    },
};
use diesel::RunQueryDsl;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use warp::http::StatusCode;

pub const ADMIN_EMAIL: &str = "admin@indowater.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "secret-password";

pub struct TestApp {
    pub ctx: ApiContext,
    _dir: TempDir,
}

pub struct Registered {
    pub token: String,
    pub user_id: i64,
}

impl TestApp {
    pub fn new() -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let mut configs = Configs::default();
        configs.database.url = dir.path().join("test.db").to_string_lossy().to_string();
        configs.database.max_connections = 4;
        configs.rate_limit.enabled = false;
        configs.auth.jwt_secret = String::from("test-secret");

        let pool = db_pool(&configs.database).unwrap();
        run_migrations(&pool).unwrap();
        let mut db = get_db_access_manager(pool.clone()).unwrap();
        seed::seed_rbac(&mut db).unwrap();
        seed::seed_admin(
            &mut db,
            &SeedConfig {
                admin_email: ADMIN_EMAIL.to_string(),
                admin_password: ADMIN_PASSWORD.to_string(),
                admin_name: String::from("Administrator"),
            },
        )
        .unwrap();

        TestApp {
            ctx: ApiContext {
                pool,
                configs: Arc::new(configs),
                hub: Hub::new(),
            },
            _dir: dir,
        }
    }

    pub fn db(&self) -> DBAccessManager {
        get_db_access_manager(self.ctx.pool.clone()).unwrap()
    }

    /// Runs a raw statement for state the API cannot reach.
    pub fn sql(&self, statement: &str) {
        let mut conn = self.ctx.pool.get().unwrap();
        diesel::sql_query(statement).execute(&mut conn).unwrap();
    }

    pub async fn call(&self, method: &str, path: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        self.call_with(method, path, token, &[], body).await
    }

    pub async fn call_with(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = warp::test::request().method(method).path(path);
        if let Some(token) = token {
            req = req.header("authorization", format!("Bearer {}", token));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.reply(&routes(&self.ctx)).await;
        let status = res.status();
        let json = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.call("GET", path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call("POST", path, Some(token), Some(body)).await
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn register(&self, name: &str, email: &str) -> Registered {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": PASSWORD,
                    "password_confirmation": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        Registered {
            token: body["data"]["token"].as_str().unwrap().to_string(),
            user_id: body["data"]["user"]["id"].as_i64().unwrap(),
        }
    }

    /// Registers a user and gives them a customer profile. Returns the
    /// customer JSON and the user's token.
    pub async fn customer(&self, admin: &str, name: &str, email: &str) -> (Value, String) {
        let user = self.register(name, email).await;
        let (status, body) = self
            .post(
                "/api/customers",
                admin,
                json!({
                    "user_id": user.user_id,
                    "full_name": name,
                    "email": email,
                    "phone": "081234567890",
                    "address": "Jl. Merdeka 1",
                    "city": "Bandung",
                    "province": "Jawa Barat",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "customer failed: {}", body);
        (body["data"].clone(), user.token)
    }

    /// A property and water meter for `customer_id`. Returns the meter JSON.
    pub async fn meter(&self, admin: &str, customer_id: i64) -> Value {
        let (status, property) = self
            .post(
                "/api/properties",
                admin,
                json!({
                    "customer_id": customer_id,
                    "property_name": "Rumah Utama",
                    "property_type": "residential",
                    "address": "Jl. Merdeka 1",
                    "city": "Bandung",
                    "province": "Jawa Barat",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "property failed: {}", property);

        let (status, meter) = self
            .post(
                "/api/devices",
                admin,
                json!({
                    "property_id": property["data"]["id"],
                    "device_name": "Main meter",
                    "device_type": "water_meter",
                    "serial_number": format!("SN-{}", customer_id),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "meter failed: {}", meter);
        meter["data"].clone()
    }

    /// Registers an IoT module on `meter_id` with a known secret.
    pub async fn iot_device(&self, admin: &str, device_key: &str, meter_id: Option<i64>, secret: &str) -> Value {
        let (status, body) = self
            .call_with(
                "POST",
                "/api/iot/devices/register",
                Some(admin),
                &[("x-device-secret", secret)],
                Some(json!({
                    "device_id": device_key,
                    "device_name": "Gateway",
                    "meter_id": meter_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "iot register failed: {}", body);
        body["data"]["device"].clone()
    }

    pub async fn reading(&self, device_key: &str, secret: &str, fields: Value) -> (StatusCode, Value) {
        let mut body = fields;
        body["device_id"] = json!(device_key);
        self.call_with(
            "POST",
            "/api/iot/readings",
            None,
            &[("x-device-secret", secret)],
            Some(body),
        )
        .await
    }
}
