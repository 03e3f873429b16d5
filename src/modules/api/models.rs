//! Request bodies and query strings of the public API.

use crate::shared::{
    billing::PriceRange,
    errors::AppError,
    ticket_flow::{CATEGORIES, PRIORITIES},
    utils::{deserialize_datetime, deserialize_optional_datetime},
    work_order_flow::WORK_TYPES,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

pub const CUSTOMER_STATUSES: &[&str] = &["active", "inactive", "suspended"];
pub const PROPERTY_TYPES: &[&str] = &["residential", "commercial", "industrial", "government"];
pub const PROPERTY_STATUSES: &[&str] = &["active", "inactive"];
pub const DEVICE_TYPES: &[&str] = &[
    "water_meter",
    "flow_sensor",
    "pressure_sensor",
    "quality_sensor",
    "smart_valve",
];
pub const DEVICE_STATUSES: &[&str] = &["active", "inactive", "maintenance", "faulty"];
pub const PAYMENT_METHODS: &[&str] = &[
    "virtual_account",
    "qris",
    "e_wallet",
    "credit_card",
    "bank_transfer",
    "manual",
];
pub const VOUCHER_STATUSES: &[&str] = &["active", "inactive", "expired"];
pub const DISCOUNT_TYPES: &[&str] = &["percentage", "fixed"];
pub const PRICING_MODELS: &[&str] = &["flat", "tiered"];
pub const TIP_DIFFICULTIES: &[&str] = &["easy", "medium", "hard"];
pub const TIP_STATUSES: &[&str] = &["published", "draft"];
pub const MAINTENANCE_TYPES: &[&str] = &["routine", "preventive", "corrective", "emergency"];
pub const MAINTENANCE_STATUSES: &[&str] = &["scheduled", "in_progress", "completed", "cancelled", "rescheduled"];
pub const LEAK_STATUSES: &[&str] = &["detected", "investigating", "confirmed", "false_positive", "resolved"];
pub const ENGAGEMENT_ACTIONS: &[&str] = &[
    "view",
    "like",
    "unlike",
    "bookmark",
    "unbookmark",
    "implement",
];

/// Deserialized bodies still need their field rules checked.
pub fn validated<T: Validate>(body: T) -> Result<T, AppError> {
    body.validate()?;
    Ok(body)
}

fn in_list(value: &str, allowed: &[&str], field: &str) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let mut err = ValidationError::new("in");
    err.message = Some(Cow::from(format!("The selected {} is invalid.", field)));
    Err(err)
}

fn validate_customer_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, CUSTOMER_STATUSES, "status")
}
fn validate_property_type(value: &str) -> Result<(), ValidationError> {
    in_list(value, PROPERTY_TYPES, "property type")
}
fn validate_property_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, PROPERTY_STATUSES, "status")
}
fn validate_device_type(value: &str) -> Result<(), ValidationError> {
    in_list(value, DEVICE_TYPES, "device type")
}
fn validate_device_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, DEVICE_STATUSES, "status")
}
fn validate_payment_method(value: &str) -> Result<(), ValidationError> {
    in_list(value, PAYMENT_METHODS, "payment method")
}
fn validate_voucher_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, VOUCHER_STATUSES, "status")
}
fn validate_discount_type(value: &str) -> Result<(), ValidationError> {
    in_list(value, DISCOUNT_TYPES, "discount type")
}
fn validate_pricing_model(value: &str) -> Result<(), ValidationError> {
    in_list(value, PRICING_MODELS, "pricing model")
}
fn validate_ticket_category(value: &str) -> Result<(), ValidationError> {
    in_list(value, CATEGORIES, "category")
}
fn validate_ticket_priority(value: &str) -> Result<(), ValidationError> {
    in_list(value, PRIORITIES, "priority")
}
fn validate_tip_difficulty(value: &str) -> Result<(), ValidationError> {
    in_list(value, TIP_DIFFICULTIES, "difficulty")
}
fn validate_tip_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, TIP_STATUSES, "status")
}
fn validate_engagement_action(value: &str) -> Result<(), ValidationError> {
    in_list(value, ENGAGEMENT_ACTIONS, "action")
}
fn validate_work_type(value: &str) -> Result<(), ValidationError> {
    in_list(value, WORK_TYPES, "work type")
}
fn validate_maintenance_type(value: &str) -> Result<(), ValidationError> {
    in_list(value, MAINTENANCE_TYPES, "maintenance type")
}
fn validate_maintenance_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, MAINTENANCE_STATUSES, "status")
}
fn validate_leak_status(value: &str) -> Result<(), ValidationError> {
    in_list(value, LEAK_STATUSES, "status")
}

// ---- auth ----

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[serde(default)]
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255)
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    #[validate(must_match(other = "password", message = "The password confirmation does not match."))]
    pub password_confirmation: String,
    #[validate(length(max = 20, message = "The phone may not be greater than 20 characters."))]
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginBody {
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

// ---- rbac ----

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub permissions: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoleBody {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub permissions: Option<Vec<i32>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignRolesBody {
    pub user_id: i32,
    #[serde(default)]
    pub role_ids: Vec<i32>,
}

// ---- customers / properties / devices ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub customer_id: Option<i32>,
    pub property_id: Option<i32>,
    pub property_type: Option<String>,
    pub device_type: Option<String>,
    pub connection_status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerBody {
    pub user_id: i32,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The full name field is required."))]
    pub full_name: String,
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "The phone field is required."))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The address field is required."))]
    pub address: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The city field is required."))]
    pub city: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The province field is required."))]
    pub province: String,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(custom(function = "validate_customer_status"))]
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerBody {
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub province: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    #[validate(custom(function = "validate_customer_status"))]
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePropertyBody {
    pub customer_id: i32,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The property name field is required."))]
    pub property_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_property_type"))]
    pub property_type: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The address field is required."))]
    pub address: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The city field is required."))]
    pub city: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The province field is required."))]
    pub province: String,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[validate(range(min = 0.0))]
    pub area_size: Option<f64>,
    #[validate(range(min = 0))]
    pub occupants: Option<i32>,
    #[validate(custom(function = "validate_property_status"))]
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePropertyBody {
    #[validate(length(min = 1, max = 255))]
    pub property_name: Option<String>,
    #[validate(custom(function = "validate_property_type"))]
    pub property_type: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub province: Option<String>,
    #[validate(length(max = 10))]
    pub postal_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[validate(range(min = 0.0))]
    pub area_size: Option<f64>,
    #[validate(range(min = 0))]
    pub occupants: Option<i32>,
    #[validate(custom(function = "validate_property_status"))]
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDeviceBody {
    pub property_id: i32,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The device name field is required."))]
    pub device_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_device_type"))]
    pub device_type: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The serial number field is required."))]
    pub serial_number: String,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    #[validate(custom(function = "validate_device_status"))]
    pub status: Option<String>,
    #[validate(range(min = 0, max = 100, message = "The health score must be between 0 and 100."))]
    pub health_score: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub installed_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub next_maintenance_at: Option<NaiveDateTime>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDeviceBody {
    pub property_id: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub device_name: Option<String>,
    #[validate(custom(function = "validate_device_type"))]
    pub device_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    #[validate(custom(function = "validate_device_status"))]
    pub status: Option<String>,
    #[validate(range(min = 0, max = 100, message = "The health score must be between 0 and 100."))]
    pub health_score: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub installed_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub last_maintenance_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub next_maintenance_at: Option<NaiveDateTime>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

// ---- iot ----

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterIotBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The device id field is required."))]
    pub device_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The device name field is required."))]
    pub device_name: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 17))]
    pub mac_address: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub device_type: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub meter_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateIotBody {
    #[validate(length(min = 1, max = 255))]
    pub device_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[validate(length(max = 17))]
    pub mac_address: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub device_type: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub meter_id: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub configuration: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadingBody {
    pub device_id: String,
    #[serde(flatten)]
    pub reading: crate::modules::iot::ingest::ReadingInput,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HeartbeatBody {
    pub device_id: String,
    #[serde(flatten)]
    pub heartbeat: crate::modules::iot::ingest::HeartbeatInput,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Hours of history, 1..=168.
    pub hours: Option<i64>,
}

// ---- water usage ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct UsageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub property_id: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub anomaly: Option<bool>,
}

// ---- pricing ----

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PricingTierBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The tier name field is required."))]
    pub tier_name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_property_type"))]
    pub customer_tier: String,
    #[serde(default)]
    #[validate(custom(function = "validate_pricing_model"))]
    pub pricing_model: String,
    #[serde(default)]
    pub price_ranges: Vec<PriceRange>,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub admin_fee: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub minimum_charge: f64,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePricingTierBody {
    #[validate(length(min = 1, max = 255))]
    pub tier_name: Option<String>,
    #[validate(custom(function = "validate_property_type"))]
    pub customer_tier: Option<String>,
    #[validate(custom(function = "validate_pricing_model"))]
    pub pricing_model: Option<String>,
    pub price_ranges: Option<Vec<PriceRange>>,
    #[validate(range(min = 0.0))]
    pub admin_fee: Option<f64>,
    #[validate(range(min = 0.0))]
    pub minimum_charge: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CalculateBody {
    #[serde(default)]
    #[validate(custom(function = "validate_property_type"))]
    pub customer_tier: String,
    #[validate(range(min = 0.0, message = "The usage volume must be at least 0."))]
    pub usage_volume: f64,
}

// ---- vouchers ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct VoucherQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVoucherBody {
    #[serde(default)]
    #[validate(length(min = 3, max = 50, message = "The code must be between 3 and 50 characters."))]
    pub code: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_discount_type"))]
    pub discount_type: String,
    #[validate(range(exclusive_min = 0.0, message = "The discount value must be greater than 0."))]
    pub discount_value: f64,
    #[validate(range(min = 0.0))]
    pub max_discount_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_purchase_amount: Option<f64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i32>,
    #[validate(range(min = 1))]
    pub per_customer_limit: Option<i32>,
    #[serde(deserialize_with = "deserialize_datetime")]
    #[schema(value_type = String)]
    pub valid_from: NaiveDateTime,
    #[serde(deserialize_with = "deserialize_datetime")]
    #[schema(value_type = String)]
    pub valid_until: NaiveDateTime,
    #[validate(custom(function = "validate_voucher_status"))]
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVoucherBody {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_discount_type"))]
    pub discount_type: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub discount_value: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_discount_amount: Option<f64>,
    #[validate(range(min = 0.0))]
    pub min_purchase_amount: Option<f64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i32>,
    #[validate(range(min = 1))]
    pub per_customer_limit: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub valid_from: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub valid_until: Option<NaiveDateTime>,
    #[validate(custom(function = "validate_voucher_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ValidateVoucherBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "The code field is required."))]
    pub code: String,
    #[validate(range(exclusive_min = 0.0, message = "The amount must be greater than 0."))]
    pub amount: f64,
    /// Staff may validate on behalf of a customer.
    pub customer_id: Option<i32>,
}

// ---- payments ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaymentQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub customer_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePaymentBody {
    pub customer_id: Option<i32>,
    #[validate(range(exclusive_min = 0.0, message = "The amount must be greater than 0."))]
    pub amount: f64,
    #[serde(default)]
    #[validate(custom(function = "validate_payment_method"))]
    pub payment_method: String,
    #[validate(length(min = 1, max = 50))]
    pub voucher_code: Option<String>,
    pub description: Option<String>,
}

// ---- tickets ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TicketQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTicketBody {
    pub customer_id: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "validate_ticket_category"))]
    pub category: String,
    #[validate(custom(function = "validate_ticket_priority"))]
    pub priority: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The subject field is required."))]
    pub subject: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TicketStatusBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "The status field is required."))]
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignTicketBody {
    pub assigned_to: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TicketMessageBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "The message field is required."))]
    pub message: String,
    #[serde(default)]
    pub is_internal: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AttachmentBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The file name field is required."))]
    pub file_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The file path field is required."))]
    pub file_path: String,
    pub file_type: Option<String>,
    #[validate(range(min = 0))]
    pub file_size: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub captured_at: Option<NaiveDateTime>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RatingBody {
    #[validate(range(min = 1, max = 5, message = "The rating must be between 1 and 5."))]
    pub rating: i32,
    pub feedback: Option<String>,
}

// ---- tips ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TipQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTipBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The title field is required."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "The category field is required."))]
    pub category: String,
    #[serde(default)]
    #[validate(custom(function = "validate_tip_difficulty"))]
    pub difficulty: String,
    #[validate(range(min = 0, max = 100))]
    pub potential_savings_percentage: Option<i32>,
    pub implementation_time: Option<String>,
    #[serde(default)]
    pub implementation_steps: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub required_tools: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(custom(function = "validate_tip_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTipBody {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_tip_difficulty"))]
    pub difficulty: Option<String>,
    #[validate(range(min = 0, max = 100))]
    pub potential_savings_percentage: Option<i32>,
    pub implementation_time: Option<String>,
    pub implementation_steps: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub required_tools: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    #[validate(custom(function = "validate_tip_status"))]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EngageBody {
    #[serde(default)]
    #[validate(custom(function = "validate_engagement_action"))]
    pub action: String,
    pub notes: Option<String>,
    #[validate(range(min = 1, max = 5, message = "The rating must be between 1 and 5."))]
    pub rating: Option<i32>,
}

// ---- work orders / maintenance / leaks ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct WorkOrderQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub work_type: Option<String>,
    pub priority: Option<String>,
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub assigned_to: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateWorkOrderBody {
    pub customer_id: i32,
    pub property_id: Option<i32>,
    pub device_id: Option<i32>,
    pub support_ticket_id: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "validate_work_type"))]
    pub work_type: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The title field is required."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: String,
    #[validate(custom(function = "validate_ticket_priority"))]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub scheduled_at: Option<NaiveDateTime>,
    #[validate(range(min = 1))]
    pub estimated_duration: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub checklist: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkOrderBody {
    #[validate(custom(function = "validate_work_type"))]
    pub work_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_ticket_priority"))]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub scheduled_at: Option<NaiveDateTime>,
    #[validate(range(min = 1))]
    pub estimated_duration: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub checklist: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignWorkOrderBody {
    pub assigned_to: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct WorkOrderStatusBody {
    #[serde(default)]
    #[validate(length(min = 1, message = "The status field is required."))]
    pub status: String,
    pub work_summary: Option<String>,
    pub parts_used: Option<String>,
    #[validate(range(min = 0.0))]
    pub labor_cost: Option<f64>,
    #[validate(range(min = 0.0))]
    pub parts_cost: Option<f64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct MaintenanceQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub maintenance_type: Option<String>,
    pub device_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceBody {
    pub device_id: i32,
    pub assigned_to: Option<i32>,
    #[serde(default)]
    #[validate(custom(function = "validate_maintenance_type"))]
    pub maintenance_type: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "The title field is required."))]
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "deserialize_datetime")]
    #[schema(value_type = String)]
    pub scheduled_at: NaiveDateTime,
    #[validate(custom(function = "validate_ticket_priority"))]
    pub priority: Option<String>,
    #[validate(range(min = 1))]
    pub estimated_duration: Option<i32>,
    pub notes: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub checklist: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMaintenanceBody {
    pub assigned_to: Option<i32>,
    #[validate(custom(function = "validate_maintenance_type"))]
    pub maintenance_type: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[schema(value_type = Option<String>)]
    pub scheduled_at: Option<NaiveDateTime>,
    #[validate(custom(function = "validate_maintenance_status"))]
    pub status: Option<String>,
    #[validate(custom(function = "validate_ticket_priority"))]
    pub priority: Option<String>,
    #[validate(range(min = 1))]
    pub estimated_duration: Option<i32>,
    #[validate(range(min = 0))]
    pub actual_duration: Option<i32>,
    pub notes: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub checklist: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct LeakEventQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLeakEventBody {
    #[serde(default)]
    #[validate(custom(function = "validate_leak_status"))]
    pub status: String,
    pub notes: Option<String>,
    #[validate(range(min = 0.0))]
    pub estimated_loss: Option<f64>,
    #[validate(range(min = 0.0))]
    pub estimated_cost: Option<f64>,
}

// ---- alerts / activities ----

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AlertQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub unread: Option<bool>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PreferencesBody {
    #[validate(range(min = 0.0))]
    pub low_balance_threshold: Option<f64>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub leak_alerts: Option<bool>,
    pub high_usage_alerts: Option<bool>,
    pub device_offline_alerts: Option<bool>,
    pub maintenance_alerts: Option<bool>,
    pub payment_alerts: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub notification_schedule: Option<Value>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ActivityQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_rules_report_each_field() {
        let body: RegisterBody = serde_json::from_value(json!({
            "email": "not-an-email",
            "password": "short",
            "password_confirmation": "other"
        }))
        .unwrap();
        let err = validated(body).unwrap_err();
        let errors = err.errors.unwrap();
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
        assert!(errors.contains_key("password_confirmation"));
    }

    #[test]
    fn enumerated_fields_reject_unknown_values() {
        let body: CreateTicketBody = serde_json::from_value(json!({
            "category": "weather",
            "priority": "urgent",
            "subject": "Leak",
            "description": "Pipe burst"
        }))
        .unwrap();
        let errors = validated(body).unwrap_err().errors.unwrap();
        assert_eq!(errors["category"], vec!["The selected category is invalid."]);
        assert!(errors.contains_key("priority"));
    }

    #[test]
    fn valid_payment_passes() {
        let body: CreatePaymentBody = serde_json::from_value(json!({
            "amount": 100000.0,
            "payment_method": "qris"
        }))
        .unwrap();
        assert!(validated(body).is_ok());
    }

    #[test]
    fn maintenance_requires_a_known_type() {
        let body: CreateMaintenanceBody = serde_json::from_value(json!({
            "device_id": 1,
            "maintenance_type": "cosmetic",
            "title": "Quarterly check",
            "scheduled_at": "2025-11-01 09:00:00"
        }))
        .unwrap();
        let errors = validated(body).unwrap_err().errors.unwrap();
        assert_eq!(errors["maintenance_type"], vec!["The selected maintenance type is invalid."]);
    }
}
