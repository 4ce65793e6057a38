pub mod auth;
pub mod batch;
pub mod catalog;
pub mod report;
pub mod sale;
