pub mod billing;
pub mod config;
pub mod db;
pub mod engagement;
pub mod errors;
pub mod security;
pub mod ticket_flow;
pub mod utils;
pub mod work_order_flow;
