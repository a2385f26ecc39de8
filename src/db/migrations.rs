//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        tracing::info!("Applying schema migration v1");
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Tenants; every catalog row belongs to one
        -- ============================================
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            display_name TEXT,
            weight_unit TEXT NOT NULL DEFAULT 'g' CHECK(weight_unit IN ('g', 'kg', 'oz', 'lb')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- CATEGORIES
        -- User-defined gear groupings (Shelter, Sleep, Kitchen...)
        -- ============================================
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT '#6b7280',
            sort_order INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(user_id, name)
        );

        CREATE INDEX idx_categories_user ON categories(user_id);

        -- ============================================
        -- GEAR ITEMS
        -- The catalog; weight is always grams
        -- ============================================
        CREATE TABLE gear_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            name TEXT NOT NULL,
            brand TEXT,
            description TEXT,
            weight_grams REAL NOT NULL DEFAULT 0 CHECK(weight_grams >= 0),
            url TEXT,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_gear_items_user ON gear_items(user_id);
        CREATE INDEX idx_gear_items_category ON gear_items(category_id);
        CREATE INDEX idx_gear_items_name ON gear_items(name);

        -- ============================================
        -- PACK LISTS
        -- ============================================
        CREATE TABLE pack_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            is_public INTEGER NOT NULL DEFAULT 0,
            share_slug TEXT UNIQUE,             -- set only while shared
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_pack_lists_user ON pack_lists(user_id);

        -- ============================================
        -- PACK LIST ITEMS
        -- Junction table: which gear in which pack list
        -- ============================================
        CREATE TABLE pack_list_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            pack_list_id INTEGER NOT NULL REFERENCES pack_lists(id) ON DELETE CASCADE,
            gear_item_id INTEGER NOT NULL REFERENCES gear_items(id) ON DELETE RESTRICT,
            quantity INTEGER NOT NULL DEFAULT 1 CHECK(quantity >= 1),
            is_included INTEGER NOT NULL DEFAULT 1,
            is_worn INTEGER NOT NULL DEFAULT 0,
            is_consumable INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(pack_list_id, gear_item_id)
        );

        CREATE INDEX idx_pack_list_items_list ON pack_list_items(pack_list_id);
        CREATE INDEX idx_pack_list_items_gear ON pack_list_items(gear_item_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
