//! pp-gateway library
//!
//! Cached, failure-isolated access to the Huis pp-rework API and the osu! v1
//! API, plus the sort options for Huis player rankings.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod sort;
