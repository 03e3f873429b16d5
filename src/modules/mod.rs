pub mod api;
pub mod iot;
pub mod mqtt;
