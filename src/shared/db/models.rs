use super::json::Json;
use super::schema::*;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = users, check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub uuid: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub email_verified_at: Option<NaiveDateTime>,
    pub last_login_at: Option<NaiveDateTime>,
    pub last_login_ip: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub uuid: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = personal_access_tokens, check_for_backend(diesel::sqlite::Sqlite))]
pub struct PersonalAccessToken {
    pub id: i32,
    pub user_id: i32,
    pub token_id: String,
    pub name: String,
    pub last_used_at: Option<NaiveDateTime>,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = personal_access_tokens)]
pub struct NewPersonalAccessToken {
    pub user_id: i32,
    pub token_id: String,
    pub name: String,
    pub expires_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = roles, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Role {
    pub id: i32,
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub is_active: bool,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = roles)]
pub struct NewRole {
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub is_active: bool,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = roles)]
pub struct RoleChangeset {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = permissions, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Permission {
    pub id: i32,
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = permissions)]
pub struct NewPermission {
    pub uuid: String,
    pub name: String,
    pub slug: String,
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = user_roles)]
pub struct NewUserRole {
    pub user_id: i32,
    pub role_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = role_permissions)]
pub struct NewRolePermission {
    pub role_id: i32,
    pub permission_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = customers, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Customer {
    pub id: i32,
    pub uuid: String,
    pub user_id: i32,
    pub customer_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: Option<String>,
    pub balance: f64,
    pub status: String,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomer {
    pub uuid: String,
    pub user_id: i32,
    pub customer_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: Option<String>,
    pub balance: f64,
    pub status: String,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = customers)]
pub struct CustomerChangeset {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub status: Option<String>,
    pub metadata: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = properties, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Property {
    pub id: i32,
    pub uuid: String,
    pub customer_id: i32,
    pub property_name: String,
    pub property_number: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub area_size: Option<f64>,
    pub occupants: Option<i32>,
    pub status: String,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub uuid: String,
    pub customer_id: i32,
    pub property_name: String,
    pub property_number: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub area_size: Option<f64>,
    pub occupants: Option<i32>,
    pub status: String,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = properties)]
pub struct PropertyChangeset {
    pub property_name: Option<String>,
    pub property_type: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub area_size: Option<f64>,
    pub occupants: Option<i32>,
    pub status: Option<String>,
    pub metadata: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = devices, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Device {
    pub id: i32,
    pub uuid: String,
    pub property_id: i32,
    pub customer_id: i32,
    pub device_number: String,
    pub device_name: String,
    pub device_type: String,
    pub serial_number: String,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub status: String,
    pub connection_status: String,
    pub last_reading_at: Option<NaiveDateTime>,
    pub last_reading_value: Option<f64>,
    pub health_score: i32,
    pub installed_at: Option<NaiveDateTime>,
    pub last_maintenance_at: Option<NaiveDateTime>,
    pub next_maintenance_at: Option<NaiveDateTime>,
    pub alert_count: i32,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = devices)]
pub struct NewDevice {
    pub uuid: String,
    pub property_id: i32,
    pub customer_id: i32,
    pub device_number: String,
    pub device_name: String,
    pub device_type: String,
    pub serial_number: String,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub status: String,
    pub connection_status: String,
    pub health_score: i32,
    pub installed_at: Option<NaiveDateTime>,
    pub next_maintenance_at: Option<NaiveDateTime>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = devices)]
pub struct DeviceChangeset {
    pub property_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub device_name: Option<String>,
    pub device_type: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub status: Option<String>,
    pub health_score: Option<i32>,
    pub installed_at: Option<NaiveDateTime>,
    pub last_maintenance_at: Option<NaiveDateTime>,
    pub next_maintenance_at: Option<NaiveDateTime>,
    pub metadata: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = iot_devices, check_for_backend(diesel::sqlite::Sqlite))]
pub struct IotDevice {
    pub id: i32,
    pub uuid: String,
    #[serde(rename = "device_id")]
    pub device_key: String,
    #[serde(rename = "meter_id")]
    pub device_id: Option<i32>,
    pub device_name: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub device_type: String,
    #[serde(skip_serializing)]
    pub secret_hash: String,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub firmware_version: String,
    pub hardware_version: String,
    pub connection_type: String,
    pub connection_status: String,
    pub signal_strength: Option<i32>,
    pub battery_level: Option<i32>,
    pub last_heartbeat_at: Option<NaiveDateTime>,
    pub last_data_at: Option<NaiveDateTime>,
    pub uptime: i64,
    pub reboot_count: i32,
    pub configuration: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = iot_devices)]
pub struct NewIotDevice {
    pub uuid: String,
    pub device_key: String,
    pub device_id: Option<i32>,
    pub device_name: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub device_type: String,
    pub secret_hash: String,
    pub mac_address: Option<String>,
    pub firmware_version: String,
    pub hardware_version: String,
    pub connection_type: String,
    pub connection_status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = iot_devices)]
pub struct IotDeviceChangeset {
    pub device_id: Option<i32>,
    pub device_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub device_type: Option<String>,
    pub mac_address: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub configuration: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Liveness columns refreshed by readings, heartbeats and the sweeper.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = iot_devices)]
pub struct IotStatusChangeset {
    pub connection_status: Option<String>,
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    pub uptime: Option<i64>,
    pub firmware_version: Option<String>,
    pub ip_address: Option<String>,
    pub last_heartbeat_at: Option<NaiveDateTime>,
    pub last_data_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = iot_readings, check_for_backend(diesel::sqlite::Sqlite))]
pub struct IotReading {
    pub id: i32,
    pub iot_device_id: i32,
    pub device_id: Option<i32>,
    pub flow_rate: Option<f64>,
    pub total_volume: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub water_quality: Option<f64>,
    pub valve_status: Option<i32>,
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    pub raw_data: Option<Json>,
    pub reading_timestamp: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = iot_readings)]
pub struct NewIotReading {
    pub iot_device_id: i32,
    pub device_id: Option<i32>,
    pub flow_rate: Option<f64>,
    pub total_volume: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub water_quality: Option<f64>,
    pub valve_status: Option<i32>,
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    pub raw_data: Option<Json>,
    pub reading_timestamp: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = water_usage, check_for_backend(diesel::sqlite::Sqlite))]
pub struct WaterUsage {
    pub id: i32,
    pub uuid: String,
    pub device_id: i32,
    pub customer_id: i32,
    pub property_id: i32,
    pub consumption: f64,
    pub cost: f64,
    pub rate_per_unit: f64,
    pub reading_date: NaiveDateTime,
    pub previous_reading_date: Option<NaiveDateTime>,
    pub previous_reading: Option<f64>,
    pub current_reading: f64,
    pub is_anomaly: bool,
    pub anomaly_type: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = water_usage)]
pub struct NewWaterUsage {
    pub uuid: String,
    pub device_id: i32,
    pub customer_id: i32,
    pub property_id: i32,
    pub consumption: f64,
    pub cost: f64,
    pub rate_per_unit: f64,
    pub reading_date: NaiveDateTime,
    pub previous_reading_date: Option<NaiveDateTime>,
    pub previous_reading: Option<f64>,
    pub current_reading: f64,
    pub is_anomaly: bool,
    pub anomaly_type: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = pricing_tiers, check_for_backend(diesel::sqlite::Sqlite))]
pub struct PricingTier {
    pub id: i32,
    pub uuid: String,
    pub tier_name: String,
    pub customer_tier: String,
    pub pricing_model: String,
    pub price_ranges: Json,
    pub admin_fee: f64,
    pub minimum_charge: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pricing_tiers)]
pub struct NewPricingTier {
    pub uuid: String,
    pub tier_name: String,
    pub customer_tier: String,
    pub pricing_model: String,
    pub price_ranges: Json,
    pub admin_fee: f64,
    pub minimum_charge: f64,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = pricing_tiers)]
pub struct PricingTierChangeset {
    pub tier_name: Option<String>,
    pub customer_tier: Option<String>,
    pub pricing_model: Option<String>,
    pub price_ranges: Option<Json>,
    pub admin_fee: Option<f64>,
    pub minimum_charge: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = vouchers, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Voucher {
    pub id: i32,
    pub uuid: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: f64,
    pub max_discount_amount: Option<f64>,
    pub min_purchase_amount: f64,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub per_customer_limit: i32,
    pub valid_from: NaiveDateTime,
    pub valid_until: NaiveDateTime,
    pub status: String,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = vouchers)]
pub struct NewVoucher {
    pub uuid: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: f64,
    pub max_discount_amount: Option<f64>,
    pub min_purchase_amount: f64,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub per_customer_limit: i32,
    pub valid_from: NaiveDateTime,
    pub valid_until: NaiveDateTime,
    pub status: String,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = vouchers)]
pub struct VoucherChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<String>,
    pub discount_value: Option<f64>,
    pub max_discount_amount: Option<f64>,
    pub min_purchase_amount: Option<f64>,
    pub usage_limit: Option<i32>,
    pub per_customer_limit: Option<i32>,
    pub valid_from: Option<NaiveDateTime>,
    pub valid_until: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = payments, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Payment {
    pub id: i32,
    pub uuid: String,
    pub customer_id: i32,
    pub reference_id: String,
    pub external_id: Option<String>,
    pub amount: f64,
    pub discount_amount: f64,
    pub final_amount: f64,
    pub payment_method: String,
    pub payment_provider: Option<String>,
    pub status: String,
    pub voucher_id: Option<i32>,
    pub paid_at: Option<NaiveDateTime>,
    pub expired_at: Option<NaiveDateTime>,
    pub payment_url: Option<String>,
    pub account_number: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Json>,
    pub callback_data: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPayment {
    pub uuid: String,
    pub customer_id: i32,
    pub reference_id: String,
    pub amount: f64,
    pub discount_amount: f64,
    pub final_amount: f64,
    pub payment_method: String,
    pub payment_provider: Option<String>,
    pub status: String,
    pub voucher_id: Option<i32>,
    pub expired_at: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = voucher_usages, check_for_backend(diesel::sqlite::Sqlite))]
pub struct VoucherUsage {
    pub id: i32,
    pub uuid: String,
    pub voucher_id: i32,
    pub customer_id: i32,
    pub payment_id: Option<i32>,
    pub discount_amount: f64,
    pub used_at: NaiveDateTime,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = voucher_usages)]
pub struct NewVoucherUsage {
    pub uuid: String,
    pub voucher_id: i32,
    pub customer_id: i32,
    pub payment_id: Option<i32>,
    pub discount_amount: f64,
    pub used_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = support_tickets, check_for_backend(diesel::sqlite::Sqlite))]
pub struct SupportTicket {
    pub id: i32,
    pub uuid: String,
    pub ticket_number: String,
    pub customer_id: i32,
    pub user_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub subject: String,
    pub description: String,
    pub opened_at: NaiveDateTime,
    pub assigned_at: Option<NaiveDateTime>,
    pub resolved_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
    pub response_time: Option<i32>,
    pub resolution_time: Option<i32>,
    pub resolution_notes: Option<String>,
    pub customer_rating: Option<i32>,
    pub customer_feedback: Option<String>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = support_tickets)]
pub struct NewSupportTicket {
    pub uuid: String,
    pub ticket_number: String,
    pub customer_id: i32,
    pub user_id: Option<i32>,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub subject: String,
    pub description: String,
    pub opened_at: NaiveDateTime,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Lifecycle columns written on a status change.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = support_tickets)]
pub struct TicketChangeset {
    pub status: Option<String>,
    pub assigned_to: Option<i32>,
    pub assigned_at: Option<NaiveDateTime>,
    pub resolved_at: Option<NaiveDateTime>,
    pub closed_at: Option<NaiveDateTime>,
    pub response_time: Option<i32>,
    pub resolution_time: Option<i32>,
    pub resolution_notes: Option<String>,
    pub customer_rating: Option<i32>,
    pub customer_feedback: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = ticket_messages, check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketMessage {
    pub id: i32,
    pub uuid: String,
    pub ticket_id: i32,
    pub user_id: i32,
    pub message: String,
    pub message_type: String,
    pub is_internal: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ticket_messages)]
pub struct NewTicketMessage {
    pub uuid: String,
    pub ticket_id: i32,
    pub user_id: i32,
    pub message: String,
    pub message_type: String,
    pub is_internal: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = ticket_attachments, check_for_backend(diesel::sqlite::Sqlite))]
pub struct TicketAttachment {
    pub id: i32,
    pub uuid: String,
    pub ticket_id: i32,
    pub uploaded_by: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub captured_at: Option<NaiveDateTime>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ticket_attachments)]
pub struct NewTicketAttachment {
    pub uuid: String,
    pub ticket_id: i32,
    pub uploaded_by: i32,
    pub file_name: String,
    pub file_path: String,
    pub file_type: Option<String>,
    pub file_size: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub captured_at: Option<NaiveDateTime>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = water_conservation_tips, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tip {
    pub id: i32,
    pub uuid: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub potential_savings_percentage: Option<i32>,
    pub implementation_time: Option<String>,
    pub implementation_steps: Option<Json>,
    pub benefits: Option<Json>,
    pub required_tools: Option<Json>,
    pub tags: Option<Json>,
    pub status: String,
    pub view_count: i32,
    pub like_count: i32,
    pub implementation_count: i32,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = water_conservation_tips)]
pub struct NewTip {
    pub uuid: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub difficulty: String,
    pub potential_savings_percentage: Option<i32>,
    pub implementation_time: Option<String>,
    pub implementation_steps: Option<Json>,
    pub benefits: Option<Json>,
    pub required_tools: Option<Json>,
    pub tags: Option<Json>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = water_conservation_tips)]
pub struct TipChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub potential_savings_percentage: Option<i32>,
    pub implementation_time: Option<String>,
    pub implementation_steps: Option<Json>,
    pub benefits: Option<Json>,
    pub required_tools: Option<Json>,
    pub tags: Option<Json>,
    pub status: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = tip_engagements, check_for_backend(diesel::sqlite::Sqlite))]
pub struct TipEngagement {
    pub id: i32,
    pub uuid: String,
    pub tip_id: i32,
    pub customer_id: i32,
    pub viewed: bool,
    pub liked: bool,
    pub bookmarked: bool,
    pub implemented: bool,
    pub viewed_at: Option<NaiveDateTime>,
    pub liked_at: Option<NaiveDateTime>,
    pub bookmarked_at: Option<NaiveDateTime>,
    pub implemented_at: Option<NaiveDateTime>,
    pub implementation_notes: Option<String>,
    pub implementation_rating: Option<i32>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tip_engagements)]
pub struct NewTipEngagement {
    pub uuid: String,
    pub tip_id: i32,
    pub customer_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = tip_engagements, treat_none_as_null = true)]
pub struct TipEngagementState {
    pub viewed: bool,
    pub liked: bool,
    pub bookmarked: bool,
    pub implemented: bool,
    pub viewed_at: Option<NaiveDateTime>,
    pub liked_at: Option<NaiveDateTime>,
    pub bookmarked_at: Option<NaiveDateTime>,
    pub implemented_at: Option<NaiveDateTime>,
    pub implementation_notes: Option<String>,
    pub implementation_rating: Option<i32>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = alerts, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Alert {
    pub id: i32,
    pub uuid: String,
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub iot_device_id: Option<i32>,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<NaiveDateTime>,
    pub is_dismissed: bool,
    pub status: String,
    pub action_data: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = alerts)]
pub struct NewAlert {
    pub uuid: String,
    pub customer_id: Option<i32>,
    pub device_id: Option<i32>,
    pub iot_device_id: Option<i32>,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub is_dismissed: bool,
    pub status: String,
    pub action_data: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = alert_preferences, check_for_backend(diesel::sqlite::Sqlite))]
pub struct AlertPreference {
    pub id: i32,
    pub uuid: String,
    pub customer_id: i32,
    pub low_balance_threshold: f64,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub leak_alerts: bool,
    pub high_usage_alerts: bool,
    pub device_offline_alerts: bool,
    pub maintenance_alerts: bool,
    pub payment_alerts: bool,
    pub notification_schedule: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = alert_preferences)]
pub struct NewAlertPreference {
    pub uuid: String,
    pub customer_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = alert_preferences)]
pub struct AlertPreferenceChangeset {
    pub low_balance_threshold: Option<f64>,
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    pub leak_alerts: Option<bool>,
    pub high_usage_alerts: Option<bool>,
    pub device_offline_alerts: Option<bool>,
    pub maintenance_alerts: Option<bool>,
    pub payment_alerts: Option<bool>,
    pub notification_schedule: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = activities, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Activity {
    pub id: i32,
    pub uuid: String,
    pub user_id: Option<i32>,
    pub subject_type: String,
    pub subject_id: i64,
    pub activity_type: String,
    pub action: String,
    pub description: Option<String>,
    pub properties: Option<Json>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activities)]
pub struct NewActivity {
    pub uuid: String,
    pub user_id: Option<i32>,
    pub subject_type: String,
    pub subject_id: i64,
    pub activity_type: String,
    pub action: String,
    pub description: Option<String>,
    pub properties: Option<Json>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = maintenance_schedules, check_for_backend(diesel::sqlite::Sqlite))]
pub struct MaintenanceSchedule {
    pub id: i32,
    pub uuid: String,
    pub device_id: i32,
    pub assigned_to: Option<i32>,
    pub maintenance_type: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub status: String,
    pub priority: String,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub notes: Option<String>,
    pub checklist: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = maintenance_schedules)]
pub struct NewMaintenanceSchedule {
    pub uuid: String,
    pub device_id: i32,
    pub assigned_to: Option<i32>,
    pub maintenance_type: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub status: String,
    pub priority: String,
    pub estimated_duration: Option<i32>,
    pub notes: Option<String>,
    pub checklist: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = maintenance_schedules)]
pub struct MaintenanceChangeset {
    pub assigned_to: Option<i32>,
    pub maintenance_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub notes: Option<String>,
    pub checklist: Option<Json>,
    pub metadata: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = work_orders, check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkOrder {
    pub id: i32,
    pub uuid: String,
    pub work_order_number: String,
    pub customer_id: i32,
    pub property_id: Option<i32>,
    pub device_id: Option<i32>,
    pub assigned_to: Option<i32>,
    pub support_ticket_id: Option<i32>,
    pub work_type: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub scheduled_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub work_summary: Option<String>,
    pub parts_used: Option<String>,
    pub labor_cost: Option<f64>,
    pub parts_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub checklist: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(skip_serializing)]
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = work_orders)]
pub struct NewWorkOrder {
    pub uuid: String,
    pub work_order_number: String,
    pub customer_id: i32,
    pub property_id: Option<i32>,
    pub device_id: Option<i32>,
    pub support_ticket_id: Option<i32>,
    pub work_type: String,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub scheduled_at: Option<NaiveDateTime>,
    pub estimated_duration: Option<i32>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub checklist: Option<Json>,
    pub metadata: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editable fields plus the lifecycle columns written on assign and status
/// changes.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = work_orders)]
pub struct WorkOrderChangeset {
    pub work_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<i32>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub estimated_duration: Option<i32>,
    pub actual_duration: Option<i32>,
    pub work_summary: Option<String>,
    pub parts_used: Option<String>,
    pub labor_cost: Option<f64>,
    pub parts_cost: Option<f64>,
    pub total_cost: Option<f64>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub checklist: Option<Json>,
    pub metadata: Option<Json>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = leak_detection_events, check_for_backend(diesel::sqlite::Sqlite))]
pub struct LeakDetectionEvent {
    pub id: i32,
    pub uuid: String,
    pub device_id: i32,
    pub customer_id: i32,
    pub alert_id: Option<i32>,
    pub leak_type: String,
    pub severity: String,
    pub detected_flow_rate: f64,
    pub normal_flow_rate: f64,
    pub estimated_loss: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub detected_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub status: String,
    pub notes: Option<String>,
    pub detection_data: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = leak_detection_events)]
pub struct NewLeakDetectionEvent {
    pub uuid: String,
    pub device_id: i32,
    pub customer_id: i32,
    pub alert_id: Option<i32>,
    pub leak_type: String,
    pub severity: String,
    pub detected_flow_rate: f64,
    pub normal_flow_rate: f64,
    pub detected_at: NaiveDateTime,
    pub status: String,
    pub detection_data: Option<Json>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = leak_detection_events)]
pub struct LeakEventChangeset {
    pub status: Option<String>,
    pub notes: Option<String>,
    pub estimated_loss: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub resolved_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
