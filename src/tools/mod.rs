//! UGM Tools module
//!
//! MCP tool implementations for the Universal Gear Manager.

pub mod categories;
pub mod conversions;
pub mod gear_items;
pub mod pack_lists;
pub mod settings;
pub mod sharing;
pub mod status;
