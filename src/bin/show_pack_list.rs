//! Utility to print a shared pack list's weight breakdown
//!
//! Usage: show_pack_list <slug> [--imperial]

use ugm::tools::sharing;
use ugm::weight::FormatPolicy;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut slug = None;
    let mut imperial = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--imperial" => imperial = true,
            _ => slug = Some(arg),
        }
    }
    let slug = slug.ok_or("usage: show_pack_list <slug> [--imperial]")?;

    let db_path = ugm::config::database_path();
    println!("Database path: {}", db_path.display());

    let database = ugm::db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        ugm::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let policy = imperial.then_some(FormatPolicy::ImperialAuto { precision: 1 });
    let list = sharing::get_shared_pack_list(&database, &slug, policy)?
        .ok_or_else(|| format!("No public pack list with slug '{}'", slug))?;

    println!();
    println!("{} (by {})", list.name, list.owner);
    if let Some(description) = &list.description {
        println!("  {}", description);
    }
    println!();

    for item in &list.items {
        let mut flags = Vec::new();
        if !item.is_included {
            flags.push("left home");
        }
        if item.is_worn {
            flags.push("worn");
        }
        if item.is_consumable {
            flags.push("consumable");
        }
        let flags = if flags.is_empty() { String::new() } else { format!(" [{}]", flags.join(", ")) };
        println!("  {:>3} x {:<30} {:<16}{}", item.quantity, item.gear_name, item.category_name, flags);
    }

    let summary = &list.summary;
    println!();
    println!("  Total:      {}", summary.total);
    println!("  Base:       {}", summary.base);
    println!("  Worn:       {}", summary.worn);
    println!("  Consumable: {}", summary.consumable);
    println!();
    for category in &summary.categories {
        println!("  {:<20} {:>12} {:>7}", category.category_name, category.weight, category.percentage);
    }
    println!();
    println!(
        "  {} items, {} included",
        list.breakdown.item_count, list.breakdown.included_item_count
    );

    Ok(())
}
