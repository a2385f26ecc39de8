//! End to end: catalog, pack list, share, public view

use ugm::db::{migrations, Database};
use ugm::models::{CategoryCreate, PackListItemUpdate, User};
use ugm::tools::categories::create_category;
use ugm::tools::gear_items::{add_gear_item, delete_gear_item, update_gear_item, GearItemChanges, GearItemInput};
use ugm::tools::pack_lists::{
    add_pack_list_items, get_pack_list, get_pack_list_weights, update_pack_list_item, PackListItemInput,
};
use ugm::tools::settings::set_weight_unit;
use ugm::tools::sharing::{get_shared_pack_list, share_pack_list, unshare_pack_list};
use ugm::weight::FormatPolicy;

fn open_database(dir: &tempfile::TempDir) -> Database {
    let db = Database::new(dir.path().join("ugm.db")).unwrap();
    db.with_conn(|conn| migrations::run_migrations(conn)).unwrap();
    db
}

fn gear(db: &Database, user_id: i64, name: &str, weight: f64, unit: &str, category_id: Option<i64>) -> i64 {
    add_gear_item(
        db,
        user_id,
        GearItemInput {
            name: name.to_string(),
            brand: None,
            description: None,
            weight,
            weight_unit: Some(unit.to_string()),
            category_id,
            url: None,
            notes: None,
        },
    )
    .unwrap()
    .id
}

fn entry(gear_item_id: i64, quantity: u32, is_worn: bool, is_consumable: bool) -> PackListItemInput {
    PackListItemInput {
        gear_item_id,
        quantity,
        is_included: true,
        is_worn,
        is_consumable,
        notes: None,
    }
}

#[test]
fn test_trip_from_catalog_to_public_view() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_database(&dir);
    let (user, created) = db.with_conn(|conn| User::get_or_create(conn, "thru-hiker")).unwrap();
    assert!(created);

    let shelter = create_category(
        &db,
        user.id,
        CategoryCreate { name: "Shelter".to_string(), color: Some("#2f855a".to_string()), sort_order: None },
    )
    .unwrap()
    .id;

    let tent = gear(&db, user.id, "Tent", 1.0, "kg", Some(shelter));
    let stakes = gear(&db, user.id, "Stakes", 10.0, "g", Some(shelter));
    let shoes = gear(&db, user.id, "Trail runners", 600.0, "g", None);
    let food = gear(&db, user.id, "Food", 700.0, "g", None);

    let list = ugm::tools::pack_lists::create_pack_list(&db, user.id, "JMT", None).unwrap();
    let added = add_pack_list_items(
        &db,
        user.id,
        list.id,
        vec![
            entry(tent, 1, false, false),
            entry(stakes, 6, false, false),
            entry(shoes, 1, true, false),
            entry(food, 3, false, true),
        ],
    )
    .unwrap();
    assert_eq!(added.added.len(), 4);

    let detail = get_pack_list(&db, user.id, list.id, false).unwrap().unwrap();
    let b = &detail.breakdown;
    assert!((b.total_weight - 3760.0).abs() < 1e-9);
    assert!((b.base_weight - 1060.0).abs() < 1e-9);
    assert!((b.worn_weight - 600.0).abs() < 1e-9);
    assert!((b.consumable_weight - 2100.0).abs() < 1e-9);
    assert_eq!(b.category_breakdown.len(), 2);
    assert_eq!(b.category_breakdown[0].category_name, "Shelter");
    assert_eq!(b.category_breakdown[1].category_name, "Uncategorized");
    assert_eq!(b.category_breakdown[1].category_color, "#6b7280");
    let pct: f64 = b.category_breakdown.iter().map(|c| c.percentage).sum();
    assert!((pct - 100.0).abs() < 1e-9);

    // Leaving the food home drops it from every total but not from item_count
    let food_item = detail.items.iter().find(|i| i.gear_item_id == food).unwrap();
    update_pack_list_item(
        &db,
        user.id,
        food_item.id,
        PackListItemUpdate { is_included: Some(false), ..Default::default() },
    )
    .unwrap();

    // Catalog edits flow into the list
    update_gear_item(&db, user.id, tent, GearItemChanges { weight: Some(900.0), weight_unit: Some("g".to_string()), ..Default::default() })
        .unwrap();

    let weights = get_pack_list_weights(&db, user.id, list.id, Some("g"), false, 2).unwrap();
    assert!((weights.breakdown.total_weight - 1560.0).abs() < 1e-9);
    assert_eq!(weights.breakdown.item_count, 4);
    assert_eq!(weights.breakdown.included_item_count, 3);
    assert_eq!(weights.summary.base, "960 g");

    // Gear in a list is protected
    assert!(delete_gear_item(&db, user.id, tent).unwrap().is_err());

    set_weight_unit(&db, user.id, "oz").unwrap();
    let slug = share_pack_list(&db, user.id, list.id).unwrap().share_slug.unwrap();
    assert_eq!(slug.len(), 10);
    assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));

    let public = get_shared_pack_list(&db, &slug, None).unwrap().unwrap();
    assert_eq!(public.owner, "thru-hiker");
    assert_eq!(public.items.len(), 4);
    assert_eq!(public.summary.base, "33.86 oz");

    let imperial = get_shared_pack_list(&db, &slug, Some(FormatPolicy::ImperialAuto { precision: 1 }))
        .unwrap()
        .unwrap();
    assert_eq!(imperial.summary.base, "2 lb 1.9 oz");

    unshare_pack_list(&db, user.id, list.id).unwrap();
    assert!(get_shared_pack_list(&db, &slug, None).unwrap().is_none());
}
