//! Category tree command.

use anyhow::{Context as _, Result};
use console::style;
use shelf_catalog::catalog::FlatCategory;
use shelf_catalog::ids::CategoryId;
use shelf_shop::ShopAction;

use super::CategoriesArgs;
use crate::context::Context;

/// Run the categories command.
pub async fn run(args: CategoriesArgs, ctx: &Context) -> Result<()> {
    let mut shop = args.shop.controller(ctx)?;

    let spinner = ctx.output.spinner("Loading categories...");
    let result = shop.refresh().await;
    spinner.finish_and_clear();
    result.context("Could not load the catalog. Please try again.")?;

    for id in &args.expand {
        let id = CategoryId::new(id.as_str());
        match shop.category_action(&id) {
            Some(action @ ShopAction::CategoryClicked { has_children: true, .. }) => {
                if !shop.state().expanded_categories.contains(&id) {
                    shop.dispatch_local(action);
                }
            }
            Some(_) => ctx.output.debug(&format!("{} has no subcategories", id)),
            None => ctx.output.warn(&format!("Unknown category: {}", id)),
        }
    }

    let rows = if args.all {
        shop.category_tree().flatten()
    } else {
        shop.visible_categories()
    };

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Categories");
    if rows.is_empty() {
        ctx.output.info("No categories.");
        return Ok(());
    }

    let selected = shop.state().filters.category_id().cloned();
    for row in &rows {
        let expanded = args.all || shop.state().expanded_categories.contains(&row.id);
        println!("{}", render_row(row, expanded, selected.as_ref() == Some(&row.id)));
    }

    Ok(())
}

fn render_row(row: &FlatCategory, expanded: bool, selected: bool) -> String {
    let marker = match (row.has_children, expanded) {
        (true, true) => "▾",
        (true, false) => "▸",
        (false, _) => " ",
    };
    let label = if selected {
        style(&row.label).green().bold().to_string()
    } else {
        row.label.clone()
    };
    format!(
        "  {}{} {} {} {}",
        "  ".repeat(row.depth),
        marker,
        label,
        style(format!("({})", row.count)).dim(),
        style(row.id.as_str()).dim()
    )
}
