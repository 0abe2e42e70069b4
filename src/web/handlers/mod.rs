//! HTTP request handlers

pub mod api;
pub mod index;
