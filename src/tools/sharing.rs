//! Sharing MCP Tools
//!
//! Public links for pack lists. A shared list is readable by slug without
//! knowing who owns it; everything else stays owner-only.

use serde::Serialize;

use crate::db::Database;
use crate::models::{load_pack_list_weights, PackList, PackListItemDetail, User};
use crate::weight::{FormatPolicy, WeightBreakdown, WeightSummary};

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub pack_list_id: i64,
    pub name: String,
    pub is_public: bool,
    pub share_slug: Option<String>,
    pub item_count: i64,
}

/// What anyone holding the slug gets to see
#[derive(Debug, Serialize)]
pub struct SharedPackListResponse {
    pub name: String,
    pub description: Option<String>,
    pub owner: String,
    pub share_slug: String,
    pub items: Vec<PackListItemDetail>,
    pub breakdown: WeightBreakdown,
    pub summary: WeightSummary,
    pub updated_at: String,
    /// When this view was computed
    pub as_of: String,
}

/// Make a pack list public and return its slug
pub fn share_pack_list(db: &Database, user_id: i64, id: i64) -> Result<ShareResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = PackList::share(&conn, user_id, id)
        .map_err(|e| format!("Failed to share pack list: {}", e))?
        .ok_or_else(|| format!("Pack list not found with id: {}", id))?;
    let item_count = PackList::item_count(&conn, id).map_err(|e| format!("Database error: {}", e))?;

    Ok(ShareResponse {
        pack_list_id: list.id,
        name: list.name,
        is_public: list.is_public,
        share_slug: list.share_slug,
        item_count,
    })
}

/// Make a pack list private again. Its old slug stops resolving.
pub fn unshare_pack_list(db: &Database, user_id: i64, id: i64) -> Result<ShareResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = PackList::unshare(&conn, user_id, id)
        .map_err(|e| format!("Failed to unshare pack list: {}", e))?
        .ok_or_else(|| format!("Pack list not found with id: {}", id))?;
    let item_count = PackList::item_count(&conn, id).map_err(|e| format!("Database error: {}", e))?;

    tracing::info!("Pack list {} is private again", id);
    Ok(ShareResponse {
        pack_list_id: list.id,
        name: list.name,
        is_public: list.is_public,
        share_slug: list.share_slug,
        item_count,
    })
}

/// Read a public pack list by slug.
///
/// Weights are formatted in the owner's preferred unit unless `policy`
/// overrides it. Returns None for unknown or private slugs.
pub fn get_shared_pack_list(
    db: &Database,
    slug: &str,
    policy: Option<FormatPolicy>,
) -> Result<Option<SharedPackListResponse>, String> {
    let policy = policy
        .map(FormatPolicy::validate)
        .transpose()
        .map_err(|e| e.to_string())?;

    let slug = slug.trim();
    if slug.is_empty() {
        return Ok(None);
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let list = match PackList::get_by_slug(&conn, slug).map_err(|e| format!("Database error: {}", e))? {
        Some(list) => list,
        None => return Ok(None),
    };

    let owner = User::get_by_id(&conn, list.user_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Owner of pack list {} not found", list.id))?;

    let (items, breakdown) = load_pack_list_weights(&conn, list.id)
        .map_err(|e| format!("Failed to compute weights: {}", e))?;
    let policy = policy.unwrap_or_else(|| FormatPolicy::fixed(owner.weight_unit));

    Ok(Some(SharedPackListResponse {
        name: list.name,
        description: list.description,
        owner: owner.public_name().to_string(),
        share_slug: slug.to_string(),
        summary: breakdown.summarize(&policy),
        items,
        breakdown,
        updated_at: list.updated_at,
        as_of: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_database;
    use crate::tools::gear_items::{add_gear_item, GearItemInput};
    use crate::tools::pack_lists::{add_pack_list_item, create_pack_list, PackListItemInput};
    use crate::tools::settings::{set_display_name, set_weight_unit};

    fn shared_list(db: &Database, user_id: i64) -> i64 {
        let gear = add_gear_item(
            db,
            user_id,
            GearItemInput {
                name: "Quilt".to_string(),
                brand: None,
                description: None,
                weight: 1.0,
                weight_unit: Some("kg".to_string()),
                category_id: None,
                url: None,
                notes: None,
            },
        )
        .unwrap();
        let list = create_pack_list(db, user_id, "PCT", None).unwrap();
        add_pack_list_item(
            db,
            user_id,
            list.id,
            PackListItemInput {
                gear_item_id: gear.id,
                quantity: 1,
                is_included: true,
                is_worn: false,
                is_consumable: false,
                notes: None,
            },
        )
        .unwrap();
        list.id
    }

    #[test]
    fn test_share_and_read_by_slug() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "walker")?.0.id)).unwrap();
        set_weight_unit(&db, user_id, "lb").unwrap();
        set_display_name(&db, user_id, Some("Trail Walker")).unwrap();
        let list_id = shared_list(&db, user_id);

        let shared = share_pack_list(&db, user_id, list_id).unwrap();
        assert!(shared.is_public);
        assert_eq!(shared.item_count, 1);
        let slug = shared.share_slug.unwrap();

        let view = get_shared_pack_list(&db, &slug, None).unwrap().unwrap();
        assert_eq!(view.owner, "Trail Walker");
        assert_eq!(view.breakdown.item_count, 1);
        assert_eq!(view.summary.total, "2.20 lb");

        let imperial = get_shared_pack_list(&db, &slug, Some(FormatPolicy::ImperialAuto { precision: 1 }))
            .unwrap()
            .unwrap();
        assert_eq!(imperial.summary.total, "2 lb 3.3 oz");

        let too_precise = FormatPolicy::ImperialAuto { precision: 400 };
        assert!(get_shared_pack_list(&db, &slug, Some(too_precise)).is_err());
    }

    #[test]
    fn test_reshare_keeps_slug_and_unshare_hides() {
        let (_dir, db) = temp_database();
        let user_id = db.with_conn(|conn| Ok(User::get_or_create(conn, "walker")?.0.id)).unwrap();
        let list_id = shared_list(&db, user_id);

        let first = share_pack_list(&db, user_id, list_id).unwrap().share_slug;
        let second = share_pack_list(&db, user_id, list_id).unwrap().share_slug;
        assert_eq!(first, second);

        let slug = first.unwrap();
        let private = unshare_pack_list(&db, user_id, list_id).unwrap();
        assert!(!private.is_public);
        assert!(get_shared_pack_list(&db, &slug, None).unwrap().is_none());
        assert!(get_shared_pack_list(&db, "", None).unwrap().is_none());
    }

    #[test]
    fn test_only_owner_can_share() {
        let (_dir, db) = temp_database();
        let owner = db.with_conn(|conn| Ok(User::get_or_create(conn, "a")?.0.id)).unwrap();
        let other = db.with_conn(|conn| Ok(User::get_or_create(conn, "b")?.0.id)).unwrap();
        let list_id = shared_list(&db, owner);

        assert!(share_pack_list(&db, other, list_id).is_err());
        assert!(unshare_pack_list(&db, other, list_id).is_err());
    }
}
