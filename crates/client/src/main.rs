//! `cura-inventory`: print an owner's filtered inventory with stat cards.
//!
//! Reads `CURA_*` connection settings plus `CURA_OWNER_ID`, `CURA_ROLE`,
//! `CURA_SEARCH`, `CURA_STATUS`, `CURA_CATEGORY`, `CURA_SORT` and `CURA_TAB`.

use anyhow::{Context, Result, bail};
use chrono::Utc;

use cura_client::{ClientConfig, HttpInventoryService, load_inventory};
use cura_core::{OwnerId, SessionContext, UserId, UserRole};
use cura_inventory::{InventoryQuery, InventoryStatus};
use cura_listing::{
    InventoryFilter, InventorySnapshot, InventorySortKey, InventoryStats, InventoryTab,
    InventoryView, Selection, categories,
};

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn filter_from_env() -> Result<InventoryFilter> {
    let mut filter = InventoryFilter::new();
    if let Some(search) = var("CURA_SEARCH") {
        filter.search_query = search;
    }
    if let Some(status) = var("CURA_STATUS") {
        filter.status_filter = status
            .parse::<Selection<InventoryStatus>>()
            .context("CURA_STATUS")?;
    }
    if let Some(category) = var("CURA_CATEGORY") {
        filter.category_filter = category
            .parse::<Selection<String>>()
            .context("CURA_CATEGORY")?;
    }
    if let Some(sort) = var("CURA_SORT") {
        filter.sort_by = sort.parse::<InventorySortKey>().context("CURA_SORT")?;
    }
    Ok(filter)
}

fn print_stats(label: &str, stats: &InventoryStats) {
    println!(
        "{label:<8} items={} in-stock={} low={} out={} expired={} discontinued={} \
         expiring-soon={} units={} value={}",
        stats.total_items,
        stats.in_stock,
        stats.low_stock,
        stats.out_of_stock,
        stats.expired,
        stats.discontinued,
        stats.expiring_soon,
        stats.total_units,
        stats.total_value,
    );
}

fn print_snapshot(snapshot: &InventorySnapshot<'_>, tab: InventoryTab) {
    print_stats("global", &snapshot.global);
    print_stats(tab.as_str(), &snapshot.scoped);
    println!();

    if tab.shows_movements() {
        for row in &snapshot.movements {
            let m = row.movement;
            println!(
                "{}  {:<28} {:<10} {:>6} {:>6} -> {:<6} {}",
                m.timestamp.format("%Y-%m-%d %H:%M"),
                row.product_name,
                m.movement_type,
                m.quantity,
                m.previous_stock,
                m.new_stock,
                m.reason,
            );
        }
        return;
    }

    for row in &snapshot.visible {
        let expiry = row
            .item
            .expiry_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<28} {:<14} {:>6} {:<12} {:<12} {:>10} {}",
            row.product.name,
            row.product.category,
            row.item.current_stock,
            row.item.status,
            row.item.batch_number,
            row.item.value(),
            expiry,
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    cura_observability::init();

    let config = ClientConfig::from_env()?;

    let role: UserRole = var("CURA_ROLE")
        .unwrap_or_else(|| "pharmacy".to_string())
        .parse()
        .context("CURA_ROLE")?;
    let Some(owner) = var("CURA_OWNER_ID") else {
        bail!("CURA_OWNER_ID must be set");
    };
    let owner: OwnerId = owner.parse().context("CURA_OWNER_ID")?;
    let session = SessionContext::new(UserId::new(), role)
        .with_owner(owner)
        .with_language(config.language.clone());
    let owner_id = session.inventory_owner()?;

    let tab: InventoryTab = var("CURA_TAB")
        .map(|t| t.parse::<InventoryTab>())
        .transpose()
        .context("CURA_TAB")?
        .unwrap_or_default();
    let filter = filter_from_env()?;

    let service = HttpInventoryService::new(&config)?;
    if !service.check_connectivity().await {
        bail!("CURA API at {} is unreachable", service.base_url());
    }

    tracing::info!(
        owner_id = %owner_id,
        role = %session.role(),
        dashboard = session.dashboard().title,
        "loading inventory"
    );
    let data = load_inventory(&service, owner_id, &InventoryQuery::all()).await?;

    let mut view = InventoryView::new(config.expiry_window_days);
    view.replace(data.rows, data.movements);
    view.set_filter(filter);
    view.set_tab(tab);

    println!("categories: {}", categories(view.rows()).join(", "));
    print_snapshot(&view.render(Utc::now().date_naive()), tab);
    Ok(())
}
