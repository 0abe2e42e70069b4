//! COVID-19 dashboard: scheduled covid data and news refreshes served over HTTP

pub mod config;
pub mod dashboard;
pub mod errors;
pub mod job_scheduling;
pub mod services;
pub mod sources;
pub mod sweeper;
pub mod utils;
pub mod web;
