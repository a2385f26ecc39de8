//! Category MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{is_valid_color, Category, CategoryCreate, CategoryUpdate, CategoryWithStats};
use crate::weight::format_weight;

use super::settings::load_user;

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub sort_order: i64,
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            color: c.color,
            sort_order: c.sort_order,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    #[serde(flatten)]
    pub stats: CategoryWithStats,
    pub catalog_weight: String,
}

#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub categories: Vec<CategorySummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    pub success: bool,
    pub deleted_id: i64,
    /// Gear items that are now uncategorized
    pub gear_uncategorized: i64,
}

fn validate_color(color: Option<&str>) -> Result<(), String> {
    match color {
        Some(c) if !is_valid_color(c) => Err(format!("Invalid color '{}': use #rgb or #rrggbb", c)),
        _ => Ok(()),
    }
}

/// Create a category
pub fn create_category(db: &Database, user_id: i64, mut data: CategoryCreate) -> Result<CategoryResponse, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    validate_color(data.color.as_deref())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Category::get_by_name(&conn, user_id, &data.name)
        .map_err(|e| format!("Database error: {}", e))?
        .is_some()
    {
        return Err(format!("A category named '{}' already exists", data.name));
    }

    let category = Category::create(&conn, user_id, &data)
        .map_err(|e| format!("Failed to create category: {}", e))?;

    tracing::info!("Created category '{}' (id {})", category.name, category.id);
    Ok(category.into())
}

/// List categories with gear counts, weights shown in the user's unit
pub fn list_categories(db: &Database, user_id: i64) -> Result<ListCategoriesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let unit = load_user(&conn, user_id)?.weight_unit;

    let categories: Vec<CategorySummary> = Category::list_with_stats(&conn, user_id)
        .map_err(|e| format!("Failed to list categories: {}", e))?
        .into_iter()
        .map(|stats| CategorySummary {
            catalog_weight: format_weight(stats.catalog_weight_grams, unit, None, true),
            stats,
        })
        .collect();
    let total = categories.len();

    Ok(ListCategoriesResponse { categories, total })
}

/// Update a category
pub fn update_category(db: &Database, user_id: i64, id: i64, mut data: CategoryUpdate) -> Result<CategoryResponse, String> {
    if let Some(name) = data.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err("Category name cannot be empty".to_string());
        }
    }
    validate_color(data.color.as_deref())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if let Some(name) = data.name.as_deref() {
        let existing = Category::get_by_name(&conn, user_id, name)
            .map_err(|e| format!("Database error: {}", e))?;
        if matches!(existing, Some(ref c) if c.id != id) {
            return Err(format!("A category named '{}' already exists", name));
        }
    }

    Category::update(&conn, user_id, id, &data)
        .map_err(|e| format!("Failed to update category: {}", e))?
        .map(CategoryResponse::from)
        .ok_or_else(|| format!("Category not found with id: {}", id))
}

/// Delete a category; its gear becomes uncategorized
pub fn delete_category(db: &Database, user_id: i64, id: i64) -> Result<DeleteCategoryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Category::get_by_id(&conn, user_id, id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Category not found with id: {}", id));
    }

    let gear_uncategorized = Category::gear_count(&conn, id)
        .map_err(|e| format!("Failed to count gear: {}", e))?;

    Category::delete(&conn, user_id, id)
        .map_err(|e| format!("Failed to delete category: {}", e))?;

    tracing::info!("Deleted category {} ({} gear items uncategorized)", id, gear_uncategorized);
    Ok(DeleteCategoryResponse {
        success: true,
        deleted_id: id,
        gear_uncategorized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::models::{GearItem, GearItemCreate, User};

    fn new_category(name: &str, color: Option<&str>) -> CategoryCreate {
        CategoryCreate {
            name: name.to_string(),
            color: color.map(str::to_string),
            sort_order: None,
        }
    }

    #[test]
    fn test_create_validation() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "u")?.0.id)).unwrap();

        assert!(create_category(&db, user_id, new_category("  ", None)).is_err());
        assert!(create_category(&db, user_id, new_category("Sleep", Some("red"))).is_err());

        let created = create_category(&db, user_id, new_category(" Sleep ", Some("#abc"))).unwrap();
        assert_eq!(created.name, "Sleep");
        assert!(create_category(&db, user_id, new_category("sleep", None)).is_err());
    }

    #[test]
    fn test_delete_uncategorizes_gear() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "u")?.0.id)).unwrap();
        let cat = create_category(&db, user_id, new_category("Kitchen", None)).unwrap();

        let gear_id = db
            .with_conn(|conn| {
                let gear = GearItem::create(
                    conn,
                    user_id,
                    &GearItemCreate {
                        category_id: Some(cat.id),
                        name: "Pot".to_string(),
                        brand: None,
                        description: None,
                        weight_grams: 110.0,
                        url: None,
                        notes: None,
                    },
                )?;
                Ok(gear.id)
            })
            .unwrap();

        let listed = list_categories(&db, user_id).unwrap();
        assert_eq!(listed.categories[0].stats.gear_count, 1);
        assert_eq!(listed.categories[0].catalog_weight, "110 g");

        let resp = delete_category(&db, user_id, cat.id).unwrap();
        assert_eq!(resp.gear_uncategorized, 1);

        let gear = db
            .with_conn(|conn| GearItem::get_by_id(conn, user_id, gear_id))
            .unwrap()
            .unwrap();
        assert_eq!(gear.category_id, None);
        assert!(delete_category(&db, user_id, cat.id).is_err());
    }

    #[test]
    fn test_rename_conflict() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "u")?.0.id)).unwrap();
        let a = create_category(&db, user_id, new_category("A", None)).unwrap();
        create_category(&db, user_id, new_category("B", None)).unwrap();

        let clash = CategoryUpdate {
            name: Some("b".to_string()),
            ..Default::default()
        };
        assert!(update_category(&db, user_id, a.id, clash).is_err());

        let same = CategoryUpdate {
            name: Some("A".to_string()),
            color: Some("#000000".to_string()),
            ..Default::default()
        };
        assert_eq!(update_category(&db, user_id, a.id, same).unwrap().color, "#000000");
    }
}
