//! Price slider bounds command.

use anyhow::{Context as _, Result};
use console::style;
use shelf_catalog::search::PriceBucket;

use super::PriceRangeArgs;
use crate::context::Context;

const BAR_WIDTH: usize = 30;

/// Run the price-range command.
pub async fn run(args: PriceRangeArgs, ctx: &Context) -> Result<()> {
    let mut shop = args.shop.controller(ctx)?;

    let spinner = ctx.output.spinner("Loading price range...");
    if args.live {
        if let Err(err) = shop.refresh().await {
            spinner.finish_and_clear();
            return Err(err).context("Could not load the catalog. Please try again.");
        }
    }
    // The slider still works from the live snapshot or defaults without it.
    if let Err(err) = shop.load_price_range().await {
        ctx.output.debug(&format!("full price range unavailable: {}", err));
    }
    spinner.finish_and_clear();

    let bounds = shop.price_bounds();
    if ctx.output.is_json() {
        ctx.output.json(&bounds);
        return Ok(());
    }

    ctx.output.header("Price range");
    ctx.output.kv("min", &bounds.min.display());
    ctx.output.kv("max", &bounds.max.display());
    ctx.output.kv("source", &format!("{:?}", bounds.source).to_lowercase());

    if let Some(buckets) = bounds.distribution.as_deref().filter(|b| !b.is_empty()) {
        println!();
        for line in histogram(buckets) {
            println!("  {}", line);
        }
    }

    Ok(())
}

fn histogram(buckets: &[PriceBucket]) -> Vec<String> {
    let peak = buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    buckets
        .iter()
        .map(|bucket| {
            let len = (bucket.count as f64 / peak as f64 * BAR_WIDTH as f64).round() as usize;
            format!(
                "{:>12} - {:<12} {} {}",
                bucket.range_start.display_amount(),
                bucket.range_end.display_amount(),
                style("█".repeat(len)).cyan(),
                bucket.count
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_catalog::money::Price;

    #[test]
    fn test_histogram_scales_to_peak() {
        let buckets = [
            PriceBucket {
                range_start: Price::new(0),
                range_end: Price::new(50_000),
                count: 10,
            },
            PriceBucket {
                range_start: Price::new(50_000),
                range_end: Price::new(100_000),
                count: 5,
            },
        ];
        let lines: Vec<String> = histogram(&buckets)
            .iter()
            .map(|l| console::strip_ansi_codes(l).into_owned())
            .collect();
        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
        assert!(lines[1].starts_with("      50,000 - 100,000"));
    }
}
