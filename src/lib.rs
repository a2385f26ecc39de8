//! Universal Gear Manager (UGM) Library
//!
//! Gear catalog, pack lists, and the weight conversion and aggregation
//! core behind them.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod weight;
