pub mod cache;
pub mod chart_service;
pub mod data_service;
