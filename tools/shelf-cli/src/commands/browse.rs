//! Listing command.

use anyhow::{Context as _, Result};
use serde_json::json;
use shelf_catalog::catalog::ProductCard;
use shelf_shop::{to_query_string, QueryStatus};

use super::BrowseArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    let mut shop = args.shop.controller(ctx)?;
    ctx.output.debug(&format!("request: {}", shop.current_query().cache_key()));

    let spinner = ctx.output.spinner("Loading books...");
    let result = shop.refresh().await;
    spinner.finish_and_clear();
    result.context("Could not load the catalog. Please try again.")?;

    let pagination = shop.pagination();
    let products = shop.page().map(|p| p.products.as_slice()).unwrap_or_default();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "query": to_query_string(shop.state()),
            "status": shop.status().as_str(),
            "activeFilters": shop.state().active_filter_count(),
            "pagination": pagination,
            "products": products.iter().map(product_json).collect::<Vec<_>>(),
            "priceBounds": shop.price_bounds(),
        }));
        return Ok(());
    }

    ctx.output.header("Books");
    ctx.output.kv("status", &status_badge(shop.status()));
    let filters = shop.state().active_filter_count();
    if filters > 0 {
        ctx.output.kv("filters", &filters.to_string());
    }

    if *shop.status() == QueryStatus::Empty {
        ctx.output.info("No books match these filters. Try clearing some of them.");
        return Ok(());
    }

    let widths = [36, 24, 16, 14];
    ctx.output.table_row(&["Title", "Authors", "Price", "Was"], &widths);
    for product in products {
        let authors = product.author_names.join("، ");
        let (price, was) = match product.price_display() {
            Some(display) => {
                let was = match (display.original_price, display.discount_percentage) {
                    (Some(original), Some(pct)) => format!("{} (-{}%)", original.display_amount(), pct),
                    _ => String::new(),
                };
                (display.display_price.display(), was)
            }
            None => ("-".to_string(), String::new()),
        };
        ctx.output.table_row(
            &[product.title.as_str(), authors.as_str(), price.as_str(), was.as_str()],
            &widths,
        );
    }

    println!();
    ctx.output.kv(
        "page",
        &format!(
            "{} of {} ({}-{} of {})",
            pagination.page,
            pagination.total_pages,
            pagination.start_item(),
            pagination.end_item(),
            pagination.total_count
        ),
    );
    let pages: Vec<String> = pagination
        .page_numbers(7)
        .into_iter()
        .map(|n| {
            if n == pagination.page {
                format!("[{}]", n)
            } else {
                n.to_string()
            }
        })
        .collect();
    if pages.len() > 1 {
        ctx.output.kv("pages", &pages.join(" "));
    }

    let query = to_query_string(shop.state());
    if !query.is_empty() {
        ctx.output.kv("url", &format!("?{}", query));
    }

    Ok(())
}

fn product_json(product: &ProductCard) -> serde_json::Value {
    json!({
        "id": product.id,
        "title": product.title,
        "authors": product.author_names,
        "price": product.price_display(),
    })
}
