//! Settings MCP Tools
//!
//! The active user's profile and display unit preference.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::models::User;
use crate::weight::WeightUnit;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub user_id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub weight_unit: WeightUnit,
    pub weight_unit_label: &'static str,
    pub available_units: Vec<&'static str>,
}

impl From<User> for SettingsResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
            display_name: user.display_name,
            weight_unit: user.weight_unit,
            weight_unit_label: user.weight_unit.label(),
            available_units: WeightUnit::ALL.iter().map(|u| u.label()).collect(),
        }
    }
}

/// Load the active user or fail with a readable message
pub(crate) fn load_user(conn: &Connection, user_id: i64) -> Result<User, String> {
    User::get_by_id(conn, user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("User not found with id: {}", user_id))
}

/// Parse an optional unit argument, defaulting to the user's preference
pub(crate) fn resolve_unit(unit: Option<&str>, fallback: WeightUnit) -> Result<WeightUnit, String> {
    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => parse_unit(u),
        None => Ok(fallback),
    }
}

pub(crate) fn parse_unit(unit: &str) -> Result<WeightUnit, String> {
    WeightUnit::from_str(unit)
        .ok_or_else(|| format!("Unknown weight unit '{}'. Use one of: g, kg, oz, lb", unit))
}

/// Get the active user's settings
pub fn get_settings(db: &Database, user_id: i64) -> Result<SettingsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Ok(load_user(&conn, user_id)?.into())
}

/// Change the preferred display unit
pub fn set_weight_unit(db: &Database, user_id: i64, unit: &str) -> Result<SettingsResponse, String> {
    let unit = parse_unit(unit)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::set_weight_unit(&conn, user_id, unit)
        .map_err(|e| format!("Failed to update weight unit: {}", e))?
        .ok_or_else(|| format!("User not found with id: {}", user_id))?;

    tracing::info!("User {} now displays weights in {}", user.username, unit);
    Ok(user.into())
}

/// Set or clear the name shown on shared pack lists
pub fn set_display_name(db: &Database, user_id: i64, display_name: Option<&str>) -> Result<SettingsResponse, String> {
    let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::set_display_name(&conn, user_id, display_name)
        .map_err(|e| format!("Failed to update display name: {}", e))?
        .ok_or_else(|| format!("User not found with id: {}", user_id))?;

    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;

    #[test]
    fn test_resolve_unit() {
        assert_eq!(resolve_unit(None, WeightUnit::Ounce), Ok(WeightUnit::Ounce));
        assert_eq!(resolve_unit(Some("  "), WeightUnit::Ounce), Ok(WeightUnit::Ounce));
        assert_eq!(resolve_unit(Some("kg"), WeightUnit::Ounce), Ok(WeightUnit::Kilogram));
        assert!(resolve_unit(Some("stone"), WeightUnit::Gram).is_err());
    }

    #[test]
    fn test_set_weight_unit() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "u")?.0.id)).unwrap();

        let settings = set_weight_unit(&db, user_id, "pounds").unwrap();
        assert_eq!(settings.weight_unit, WeightUnit::Pound);
        assert_eq!(settings.weight_unit_label, "lb");
        assert!(set_weight_unit(&db, user_id, "furlongs").is_err());
        assert_eq!(get_settings(&db, user_id).unwrap().weight_unit, WeightUnit::Pound);
    }

    #[test]
    fn test_display_name_blank_clears() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "u")?.0.id)).unwrap();

        let settings = set_display_name(&db, user_id, Some("Trail Name")).unwrap();
        assert_eq!(settings.display_name.as_deref(), Some("Trail Name"));
        let settings = set_display_name(&db, user_id, Some("   ")).unwrap();
        assert_eq!(settings.display_name, None);
    }
}
