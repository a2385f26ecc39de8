//! UGM Status Tool
//!
//! Provides runtime status information about the UGM service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Gear tracking instructions for AI assistants
pub const GEAR_INSTRUCTIONS: &str = r#"
# UGM Gear & Pack List Instructions

This guide explains how to track backpacking gear and build pack lists using
the Universal Gear Manager (UGM) tools.

## Overview

1. **Categories** - Groups like Shelter, Sleep, Kitchen, Clothing (optional but recommended)
2. **Gear Items** - Your catalog. Each item has one weight, stored in grams
3. **Pack Lists** - A trip's selection of gear, with quantity and flags per item

---

## Weights and Units

- Every weight is stored in grams. Conversions happen only when reading or writing.
- The user's preferred unit (g, kg, oz, lb) is used for display. Check it with `get_settings`,
  change it with `set_weight_unit`.
- When adding or updating gear, pass `weight` together with `weight_unit`. If `weight_unit`
  is omitted the user's preferred unit is assumed.
- Weights must be finite and zero or more.

**Example:** the user says "my tent is 2 lb 3 oz"
1. Convert to a single unit first: 2 × 16 + 3 = 35 oz
2. Call `add_gear_item` with `weight: 35, weight_unit: "oz"`

Use `parse_weight_input` to check raw text a user typed; invalid input comes back with
`grams: null` rather than an error.

---

## Pack List Flags

Each pack list item carries three flags:

| Flag | Meaning | Counts toward |
|------|---------|---------------|
| `is_included` | Actually going on this trip | Everything. Excluded items add no weight |
| `is_worn` | Worn, not carried (shoes, base layer) | total, worn. Not base |
| `is_consumable` | Used up on the trip (food, fuel, water) | total, consumable. Not base |

**Base weight** = included items that are neither worn nor consumable.
An item can be both worn and consumable; it then counts toward both.

Quantity multiplies the gear weight: 4 stakes at 10 g = 40 g.

---

## Building a Pack List

1. `create_pack_list` with a name
2. `add_pack_list_items` to add several gear items at once (all or nothing), or
   `add_pack_list_item` for one
3. `get_pack_list` to see items, totals and the per-category breakdown
4. `get_pack_list_weights` to render the same breakdown in another unit, or with
   `imperial_auto: true` for "2 lb 3.3 oz" style output

A gear item can appear only once per pack list; change its quantity instead.
Gear that is in any pack list cannot be deleted. Use `list_unused_gear_items` to find
cleanup candidates.

---

## Sharing

- `share_pack_list` makes a list public and returns its slug. Sharing again keeps the slug.
- `get_shared_pack_list` reads a public list by slug, formatted in the owner's unit.
- `unshare_pack_list` makes it private; the old slug stops working.
"#;

/// Runtime status of the UGM service
#[derive(Debug, Clone, Serialize)]
pub struct UgmStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Who the tools act on behalf of
    pub active_user: String,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    active_user: String,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, active_user: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            active_user: active_user.into(),
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> UgmStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        UgmStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            active_user: self.active_user.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
