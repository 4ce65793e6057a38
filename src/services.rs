pub mod auth;
pub mod catalog_service;
pub mod export_service;
pub mod report_service;
pub mod sale_service;
pub mod session_store;
pub mod user_service;
